//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::stage::StageId;

/// Static asset pipeline: a live-reloading dev tree and an optimized dist tree.
///
/// Without a subcommand, serves `tmp/`, runs `copy` and watches `src/`.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path, searched upward from the current directory
    #[arg(short = 'C', long, global = true, default_value = "assetline.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Print debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub serve: ServeArgs,

    /// subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Dev server overrides for the default invocation and `serve`.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
    #[arg(short, long, global = true)]
    pub interface: Option<IpAddr>,

    /// HTTP port number to listen on
    #[arg(short, long, global = true)]
    pub port: Option<u16>,

    /// Live-reload WebSocket port
    #[arg(long, global = true)]
    pub ws_port: Option<u16>,
}

/// Available subcommands, one per pipeline stage plus `serve`.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Serve the staging tree without watching or live reload
    #[command(visible_alias = "s")]
    Serve,

    /// Mirror changed files from src/ into tmp/
    Copy,

    /// Compile stylesheets into tmp/css/style.css
    Styles,

    /// Compile, prefix and minify stylesheets into dist/css/style.css
    #[command(name = "styles:build")]
    StylesBuild,

    /// Pass src/js/main.js through to tmp/js/
    Scripts,

    /// Copy scripts to dist/js/ and bundle them into dist/js/main.min.js
    #[command(name = "scripts:build")]
    ScriptsBuild,

    /// Compress changed images into tmp/img/
    Images,

    /// Compress all images into dist/img/
    #[command(name = "images:build")]
    ImagesBuild,

    /// Empty tmp/
    Clean,

    /// Empty dist/
    #[command(name = "clean:build")]
    CleanBuild,

    /// Copy fonts into dist/fonts/
    #[command(name = "fonts:build")]
    FontsBuild,

    /// Copy top-level markup into dist/
    #[command(name = "html:build")]
    HtmlBuild,

    /// Run the full production pipeline
    #[command(visible_alias = "b")]
    Build,
}

impl Commands {
    /// The pipeline stage this command runs, if any.
    pub const fn stage(self) -> Option<StageId> {
        match self {
            Self::Serve => None,
            Self::Copy => Some(StageId::Copy),
            Self::Styles => Some(StageId::Styles),
            Self::StylesBuild => Some(StageId::StylesBuild),
            Self::Scripts => Some(StageId::Scripts),
            Self::ScriptsBuild => Some(StageId::ScriptsBuild),
            Self::Images => Some(StageId::Images),
            Self::ImagesBuild => Some(StageId::ImagesBuild),
            Self::Clean => Some(StageId::Clean),
            Self::CleanBuild => Some(StageId::CleanBuild),
            Self::FontsBuild => Some(StageId::FontsBuild),
            Self::HtmlBuild => Some(StageId::HtmlBuild),
            Self::Build => Some(StageId::Build),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("assetline").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_is_default() {
        let cli = parse(&[]);
        assert_eq!(cli.command, None);
        assert_eq!(cli.config, PathBuf::from("assetline.toml"));
    }

    #[test]
    fn test_colon_stage_names() {
        assert_eq!(parse(&["styles:build"]).command, Some(Commands::StylesBuild));
        assert_eq!(parse(&["clean:build"]).command, Some(Commands::CleanBuild));
        assert_eq!(parse(&["html:build"]).command, Some(Commands::HtmlBuild));
        assert_eq!(parse(&["copy"]).command, Some(Commands::Copy));
    }

    #[test]
    fn test_every_stage_has_a_command() {
        for stage in StageId::ALL {
            let cli = parse(&[&stage.to_string()]);
            assert_eq!(cli.command.and_then(Commands::stage), Some(stage));
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&["serve", "--port", "8080", "-v", "--ws-port", "9000"]);
        assert_eq!(cli.command, Some(Commands::Serve));
        assert_eq!(cli.serve.port, Some(8080));
        assert_eq!(cli.serve.ws_port, Some(9000));
        assert!(cli.verbose);
    }

    #[test]
    fn test_unknown_stage_rejected() {
        assert!(Cli::try_parse_from(["assetline", "styles:dev"]).is_err());
    }
}
