//! Sass compilation through the external `sass` executable.
//!
//! The source is piped on stdin and compiled CSS read from stdout, with the
//! source's directory on the load path so `@use`/`@import` of partials
//! resolves.

use std::path::Path;

use crate::utils::exec::{Cmd, strip_ansi};

use super::{Transform, TransformError};

#[derive(Debug, Clone)]
pub struct SassCompiler {
    /// Command prefix, e.g. `["sass"]` or `["npx", "sass"]`.
    command: Vec<String>,
}

impl SassCompiler {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }

    /// Check the executable is on PATH.
    pub fn check(&self) -> anyhow::Result<()> {
        let program = self
            .command
            .first()
            .ok_or_else(|| anyhow::anyhow!("`styles.sass_command` is empty"))?;
        which::which(program)
            .map(|_| ())
            .map_err(|_| anyhow::anyhow!("`{program}` not found on PATH (install Dart Sass or set `styles.preprocessor = \"css\"`)"))
    }

    fn cmd(&self, source: &Path) -> Cmd {
        let mut cmd = Cmd::from_slice(&self.command).args([
            "--stdin",
            "--no-source-map",
            "--style=expanded",
        ]);
        if let Some(dir) = source.parent().filter(|d| !d.as_os_str().is_empty()) {
            cmd = cmd.arg(format!("--load-path={}", dir.display())).cwd(dir);
        }
        cmd
    }
}

impl Transform for SassCompiler {
    fn name(&self) -> &'static str {
        "sass"
    }

    fn apply(&self, input: Vec<u8>, source: &Path) -> Result<Vec<u8>, TransformError> {
        if self.command.is_empty() {
            return Err(TransformError::new(self.name(), source, "no sass command configured"));
        }
        self.cmd(source)
            .stdin(input)
            .run()
            .map(|output| output.stdout)
            .map_err(|e| {
                TransformError::new(self.name(), source, strip_ansi(&format!("{e:#}")).into_owned())
            })
    }
}
