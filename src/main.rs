//! assetline - a static asset pipeline with a live-reloading dev server.

mod actor;
mod asset;
mod cli;
mod config;
mod core;
mod embed;
mod freshness;
mod image;
mod logger;
mod reload;
mod stage;
mod transform;
mod utils;
mod watch;

use std::sync::Arc;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::{PipelineConfig, Preprocessor};
use stage::{StageContext, StageId, run_target};

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = PipelineConfig::load(&cli)?;
    debug!("config"; "root {}", config.root.display());
    let ctx = StageContext::new(config);

    match cli.command {
        None => {
            warn_missing_sass(&ctx);
            serve_and_watch(ctx)
        }
        Some(Commands::Serve) => cli::serve::bind_server(&ctx)?.run(),
        Some(command) => {
            let Some(target) = command.stage() else {
                return Ok(());
            };
            if uses_styles(target) {
                warn_missing_sass(&ctx);
            }
            run_target(target, &ctx).map(|_| ())
        }
    }
}

/// Default invocation: serve `tmp/`, run `copy`, then rebuild on change.
fn serve_and_watch(ctx: StageContext) -> Result<()> {
    let server = cli::serve::bind_server(&ctx)?;
    server.run_with_watch(Arc::new(ctx))
}

fn uses_styles(target: StageId) -> bool {
    matches!(
        target,
        StageId::Styles | StageId::StylesBuild | StageId::Build
    )
}

/// Report a missing Sass executable up front instead of on the first compile.
fn warn_missing_sass(ctx: &StageContext) {
    let styles = &ctx.config.styles;
    if styles.preprocessor != Preprocessor::Sass {
        return;
    }
    if let Err(e) = transform::SassCompiler::new(styles.sass_command.clone()).check() {
        log!("warning"; "{}", e);
    }
}
