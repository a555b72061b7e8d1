//! One-shot pipeline execution.
//!
//! Resolves a target into levels and runs each level on the rayon pool.
//! A failing stage does not stop independent stages; stages that wait on
//! it are skipped. A failing clean aborts the run: later stages would write
//! into a tree in an unknown state.

use anyhow::{Result, bail};
use rayon::prelude::*;
use rustc_hash::FxHashSet;

use crate::log;
use crate::logger::ProgressLine;

use super::{StageContext, StageGraph, StageId, StageReport, run_stage};

/// What a pipeline run did.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub reports: Vec<StageReport>,
    pub failed: Vec<(StageId, String)>,
    pub skipped: Vec<StageId>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty()
    }

    pub fn files_written(&self) -> usize {
        self.reports.iter().map(|r| r.written.len()).sum()
    }
}

/// Run `target` and everything it requires.
///
/// Returns an error when any stage failed, after every runnable stage had
/// its chance.
pub fn run_target(target: StageId, ctx: &StageContext) -> Result<RunSummary> {
    let summary = execute(&StageGraph::standard(), target, ctx)?;

    if !summary.is_success() {
        let names: Vec<&str> = summary.failed.iter().map(|(s, _)| s.name()).collect();
        bail!(
            "{} stage{} failed: {}",
            names.len(),
            if names.len() == 1 { "" } else { "s" },
            names.join(", ")
        );
    }

    let written = summary.files_written();
    log!(target.name(); "done, {} file{} written", written, if written == 1 { "" } else { "s" });
    Ok(summary)
}

/// Run `target` over `graph` and collect per-stage outcomes.
pub(super) fn execute(
    graph: &StageGraph,
    target: StageId,
    ctx: &StageContext,
) -> Result<RunSummary> {
    let levels = graph.levels(target)?;
    let members: FxHashSet<StageId> = levels.iter().flatten().copied().collect();

    let progress = (members.len() > 1)
        .then(|| ProgressLine::new(target.name(), &[("stages", members.len())]));

    let mut summary = RunSummary::default();
    let mut blocked: FxHashSet<StageId> = FxHashSet::default();

    for level in levels {
        let (runnable, waiting): (Vec<_>, Vec<_>) = level.into_iter().partition(|stage| {
            graph
                .predecessors(*stage, &members)
                .iter()
                .all(|dep| !blocked.contains(dep))
        });

        for stage in waiting {
            log!("warning"; "{stage}: skipped, a stage it waits for failed");
            blocked.insert(stage);
            summary.skipped.push(stage);
        }

        let results: Vec<(StageId, Result<StageReport>)> = runnable
            .into_par_iter()
            .map(|stage| (stage, run_stage(stage, ctx)))
            .collect();

        for (stage, result) in results {
            if let Some(progress) = &progress {
                progress.inc("stages");
            }
            match result {
                Ok(report) => summary.reports.push(report),
                Err(e) if stage.is_clean() => {
                    return Err(e.context(format!("{stage} failed")));
                }
                Err(e) => {
                    log!("error"; "{stage}: {e:#}");
                    blocked.insert(stage);
                    summary.failed.push((stage, format!("{e:#}")));
                }
            }
        }
    }

    if let Some(progress) = progress {
        progress.finish();
    }
    Ok(summary)
}
