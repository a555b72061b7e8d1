//! Pipeline stages.
//!
//! Every stage reads a fixed glob of the source tree and writes into the
//! staging (`tmp/`) or distribution (`dist/`) tree:
//!
//! | Stage           | Input                 | Output                         |
//! |-----------------|-----------------------|--------------------------------|
//! | `copy`          | `src/**/*`            | `tmp/` (changed files only)    |
//! | `styles`        | `src/scss/*.scss`     | `tmp/css/style.css`            |
//! | `scripts`       | `src/js/main.js`      | `tmp/js/main.js`               |
//! | `images`        | `src/img/**/*`        | `tmp/img/` (changed files only)|
//! | `clean`         |                       | empties `tmp/`                 |
//! | `styles:build`  | `src/scss/*.scss`     | `dist/css/style.css`           |
//! | `scripts:build` | `src/js/**/*.js`      | `dist/js/`, `dist/js/main.min.js` |
//! | `images:build`  | `src/img/**/*`        | `dist/img/`                    |
//! | `fonts:build`   | `src/fonts/**/*`      | `dist/fonts/`                  |
//! | `html:build`    | `src/*.html`          | `dist/`                        |
//! | `clean:build`   |                       | empties `dist/`                |
//! | `build`         | aggregate of the `:build` stages                         |
//!
//! Dev `scripts` passes only the entry file through while `scripts:build`
//! ships every script plus a minified bundle. The two trees differ on
//! purpose; pages served from `tmp/` load `js/main.js` directly.
//!
//! Dev outputs overlap: `copy` mirrors the whole source tree into `tmp/`,
//! including the files `scripts` and `images` also write.

mod clean;
mod copy;
pub mod graph;
mod images;
mod runner;
mod scripts;
mod styles;

#[cfg(test)]
mod tests;

pub use graph::StageGraph;
pub use runner::run_target;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use thiserror::Error;

use crate::config::PipelineConfig;
use crate::core::Layout;

/// A named pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StageId {
    Copy,
    Styles,
    Scripts,
    Images,
    Clean,
    CleanBuild,
    HtmlBuild,
    StylesBuild,
    ScriptsBuild,
    ImagesBuild,
    FontsBuild,
    Build,
}

impl StageId {
    pub const ALL: [Self; 12] = [
        Self::Copy,
        Self::Styles,
        Self::Scripts,
        Self::Images,
        Self::Clean,
        Self::CleanBuild,
        Self::HtmlBuild,
        Self::StylesBuild,
        Self::ScriptsBuild,
        Self::ImagesBuild,
        Self::FontsBuild,
        Self::Build,
    ];

    /// CLI name of the stage.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Copy => "copy",
            Self::Styles => "styles",
            Self::Scripts => "scripts",
            Self::Images => "images",
            Self::Clean => "clean",
            Self::CleanBuild => "clean:build",
            Self::HtmlBuild => "html:build",
            Self::StylesBuild => "styles:build",
            Self::ScriptsBuild => "scripts:build",
            Self::ImagesBuild => "images:build",
            Self::FontsBuild => "fonts:build",
            Self::Build => "build",
        }
    }

    /// Stages that empty a tree. Their failure is fatal for the invocation.
    pub const fn is_clean(self) -> bool {
        matches!(self, Self::Clean | Self::CleanBuild)
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown stage `{0}`")]
pub struct UnknownStage(pub String);

impl FromStr for StageId {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|stage| stage.name() == s)
            .ok_or_else(|| UnknownStage(s.to_string()))
    }
}

/// Everything a stage needs to run.
#[derive(Debug, Clone)]
pub struct StageContext {
    pub layout: Layout,
    pub config: PipelineConfig,
}

impl StageContext {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            layout: Layout::new(config.root.clone()),
            config,
        }
    }
}

/// Outcome of one stage run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub stage: StageId,
    /// Files written, absolute.
    pub written: Vec<PathBuf>,
    /// Sources left alone because their output was current.
    pub skipped: usize,
}

impl StageReport {
    pub fn new(stage: StageId) -> Self {
        Self {
            stage,
            written: Vec::new(),
            skipped: 0,
        }
    }

    pub fn summary(&self) -> String {
        match (self.written.len(), self.skipped) {
            (0, 0) => format!("{}: nothing to do", self.stage),
            (w, 0) => format!("{}: wrote {w} file{}", self.stage, plural(w)),
            (w, s) => format!(
                "{}: wrote {w} file{}, {s} unchanged",
                self.stage,
                plural(w)
            ),
        }
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Run a single stage, without its dependencies.
pub fn run_stage(stage: StageId, ctx: &StageContext) -> Result<StageReport> {
    let report = match stage {
        StageId::Copy => copy::run_copy(ctx)?,
        StageId::Styles => styles::run_styles(ctx)?,
        StageId::Scripts => scripts::run_scripts(ctx)?,
        StageId::Images => images::run_images(ctx)?,
        StageId::Clean => clean::run_clean(stage, &ctx.layout.staging())?,
        StageId::CleanBuild => clean::run_clean(stage, &ctx.layout.dist())?,
        StageId::HtmlBuild => copy::run_html_build(ctx)?,
        StageId::StylesBuild => styles::run_styles_build(ctx)?,
        StageId::ScriptsBuild => scripts::run_scripts_build(ctx)?,
        StageId::ImagesBuild => images::run_images_build(ctx)?,
        StageId::FontsBuild => copy::run_fonts_build(ctx)?,
        StageId::Build => StageReport::new(stage),
    };
    crate::debug!(stage.name(); "{}", report.summary());
    Ok(report)
}
