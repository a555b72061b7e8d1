//! JavaScript minification with oxc.
//!
//! Sources are parsed as classic scripts: bundles are concatenated plain
//! files loaded with a `<script>` tag, so top-level bindings are globals and
//! must survive mangling and dead-code removal.

use std::path::Path;

use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

use super::{Transform, TransformError, utf8};

/// Minify a script bundle.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsMinifier;

impl Transform for JsMinifier {
    fn name(&self) -> &'static str {
        "minify-js"
    }

    fn apply(&self, input: Vec<u8>, source: &Path) -> Result<Vec<u8>, TransformError> {
        let text = utf8(self.name(), input, source)?;
        minify_js(&text)
            .map(String::into_bytes)
            .map_err(|message| TransformError::new(self.name(), source, message))
    }
}

fn minify_js(source: &str) -> Result<String, String> {
    let allocator = Allocator::default();

    let ret = Parser::new(&allocator, source, SourceType::script()).parse();
    if !ret.errors.is_empty() {
        let messages: Vec<String> = ret.errors.iter().map(ToString::to_string).collect();
        return Err(messages.join("\n"));
    }

    // Root-scope names are globals shared with other scripts on the page
    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions {
            top_level: Some(false),
            ..MangleOptions::default()
        }),
        compress: Some(CompressOptions::smallest()),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);

    Ok(Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code)
}

/// Names a script declares in its global scope, in source order.
#[cfg(test)]
pub(crate) fn global_bindings(code: &str) -> Vec<String> {
    use oxc::ast::ast::Statement;

    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, code, SourceType::script()).parse();
    assert!(ret.errors.is_empty(), "minified output does not parse: {code}");

    let mut names = Vec::new();
    for stmt in &ret.program.body {
        match stmt {
            Statement::VariableDeclaration(decl) => names.extend(
                decl.declarations
                    .iter()
                    .filter_map(|d| d.id.get_binding_identifier())
                    .map(|id| id.name.to_string()),
            ),
            Statement::FunctionDeclaration(func) => {
                names.extend(func.id.as_ref().map(|id| id.name.to_string()));
            }
            _ => {}
        }
    }
    names
}
