//! Pipeline configuration from `assetline.toml`.
//!
//! ```text
//! config/
//! ├── section/       # [serve], [styles]
//! ├── error.rs       # ConfigError
//! └── mod.rs         # PipelineConfig (this file)
//! ```
//!
//! The file is optional. When it is missing every section takes its
//! defaults and the current directory is the project root. When found, its
//! parent directory is the root. The `src`/`tmp`/`dist` layout is fixed and
//! has no configuration keys.

mod error;
pub mod section;

pub use error::ConfigError;
pub use section::{Preprocessor, ServeConfig, StylesConfig};

use crate::cli::{Cli, ServeArgs};
use crate::log;
use crate::transform::browser_targets;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Root configuration structure representing assetline.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Absolute path to the config file, empty when none was found
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub serve: ServeConfig,

    #[serde(default)]
    pub styles: StylesConfig,
}

impl PipelineConfig {
    /// Load configuration for a CLI invocation.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(&cwd, &cli.config) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.root = path.parent().map(Path::to_path_buf).unwrap_or_default();
                config.config_path = path;
                config
            }
            None => Self {
                root: cwd,
                ..Self::default()
            },
        };

        config.root = config
            .root
            .canonicalize()
            .with_context(|| format!("Failed to resolve project root {}", config.root.display()))?;
        config.apply_serve_args(&cli.serve);
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    #[cfg(test)]
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::from)?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {} (ignored): {}", display_path, fields.join(", "));
    }

    fn apply_serve_args(&mut self, args: &ServeArgs) {
        if let Some(interface) = args.interface {
            self.serve.interface = interface;
        }
        if let Some(port) = args.port {
            self.serve.port = port;
        }
        if let Some(ws_port) = args.ws_port {
            self.serve.ws_port = ws_port;
        }
    }

    /// Check values that deserialize fine but cannot work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.serve.port == 0 {
            return Err(ConfigError::validation("serve.port", "port must be non-zero"));
        }
        if self.serve.ws_port == 0 {
            return Err(ConfigError::validation("serve.ws_port", "port must be non-zero"));
        }
        if self.serve.port == self.serve.ws_port {
            return Err(ConfigError::validation(
                "serve.ws_port",
                format!("must differ from serve.port ({})", self.serve.port),
            ));
        }
        if self.styles.preprocessor == Preprocessor::Sass && self.styles.sass_command.is_empty() {
            return Err(ConfigError::validation(
                "styles.sass_command",
                "must name the sass executable when preprocessor = \"sass\"",
            ));
        }
        if let Err(e) = browser_targets(&self.styles.browsers) {
            return Err(ConfigError::validation("styles.browsers", e.to_string()));
        }
        Ok(())
    }
}

/// Find the config file: an absolute path as given, otherwise walk up from
/// `cwd` until a directory contains it.
fn find_config_file(cwd: &Path, config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.is_file().then(|| config_name.to_path_buf());
    }

    cwd.ancestors()
        .map(|dir| dir.join(config_name))
        .find(|candidate| candidate.is_file())
}

/// Parse config and panic if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> PipelineConfig {
    let (parsed, ignored) = PipelineConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}
