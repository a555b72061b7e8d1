//! Dispatch Actor
//!
//! Turns debounced change batches into stage runs and stage results into
//! browser updates:
//!
//! ```text
//! Changed(paths) → WatchTable::plan → spawn_blocking(run_stage) → Finished
//!                                                                    │
//!              ReloadHandle ← push_assets / full_reload / error ←────┘
//! ```
//!
//! Stages triggered by one batch run concurrently. A stage triggered again
//! while still running gets exactly one re-run after the current run ends.
//! A failing stage never stops the loop.
//!
//! Concurrent stages are not fully disjoint on disk: `copy` mirrors all of
//! `src/`, so it may write `tmp/js/main.js` while `scripts` does. Both copy
//! the same source bytes unchanged, and the last writer wins.

mod schedule;


use std::sync::Arc;

use rustc_hash::FxHashSet;
use tokio::sync::mpsc;

use super::messages::{DispatchMsg, StageOutcome};
use crate::reload::ReloadHandle;
use crate::stage::{StageContext, StageId, StageReport, run_stage};
use crate::transform::TransformError;
use crate::watch::{ReloadAction, WatchTable};
use schedule::Schedule;

/// Lifecycle of the dispatcher. Watching lasts until the process ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
    Idle,
    Watching,
}

pub struct DispatchActor {
    rx: mpsc::Receiver<DispatchMsg>,
    /// Completion channel handed to stage runs
    tx: mpsc::Sender<DispatchMsg>,
    ctx: Arc<StageContext>,
    table: WatchTable,
    reload: ReloadHandle,
    state: DispatcherState,
    schedule: Schedule,
    /// Stages whose last run failed; the overlay clears once none remain
    failing: FxHashSet<StageId>,
}

impl DispatchActor {
    pub fn new(
        rx: mpsc::Receiver<DispatchMsg>,
        tx: mpsc::Sender<DispatchMsg>,
        ctx: Arc<StageContext>,
        table: WatchTable,
        reload: ReloadHandle,
    ) -> Self {
        Self {
            rx,
            tx,
            ctx,
            table,
            reload,
            state: DispatcherState::Idle,
            schedule: Schedule::default(),
            failing: FxHashSet::default(),
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> DispatcherState {
        self.state
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        self.state = DispatcherState::Watching;
        crate::debug!("watch"; "dispatcher {:?}", self.state);

        while let Some(msg) = self.rx.recv().await {
            match msg {
                DispatchMsg::Changed(paths) => {
                    for (stage, reload) in self.table.plan(&paths) {
                        self.request(stage, reload);
                    }
                }
                DispatchMsg::Finished {
                    stage,
                    reload,
                    outcome,
                } => {
                    self.finished(stage, reload, outcome).await;
                    if let Some(rerun) = self.schedule.complete(stage) {
                        crate::debug!("watch"; "re-running {}", stage);
                        self.spawn(stage, rerun);
                    } else if self.schedule.is_idle() {
                        crate::debug!("watch"; "all stages settled, {} failing", self.failing.len());
                    }
                }
                DispatchMsg::Shutdown => break,
            }
        }

        self.state = DispatcherState::Idle;
        crate::debug!("watch"; "dispatcher {:?}", self.state);
    }

    fn request(&mut self, stage: StageId, reload: ReloadAction) {
        if self.schedule.request(stage, reload) {
            self.spawn(stage, reload);
        } else {
            crate::debug!("watch"; "{} in flight, queued one re-run", stage);
        }
    }

    /// Run a stage on the blocking pool and report back on `tx`.
    fn spawn(&self, stage: StageId, reload: ReloadAction) {
        let ctx = Arc::clone(&self.ctx);
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let joined = tokio::task::spawn_blocking(move || {
                run_stage(stage, &ctx).map_err(|e| failure(stage, &ctx, &e))
            })
            .await;

            let outcome = match joined {
                Ok(Ok(report)) => StageOutcome::Done(report),
                Ok(Err((path, error))) => StageOutcome::Failed { path, error },
                Err(e) => StageOutcome::Failed {
                    path: stage.name().to_string(),
                    error: format!("stage panicked: {e}"),
                },
            };
            let _ = tx
                .send(DispatchMsg::Finished {
                    stage,
                    reload,
                    outcome,
                })
                .await;
        });
    }

    async fn finished(&mut self, stage: StageId, reload: ReloadAction, outcome: StageOutcome) {
        match outcome {
            StageOutcome::Done(report) => {
                self.succeeded(&report, reload).await;
            }
            StageOutcome::Failed { path, error } => {
                self.failing.insert(stage);
                crate::logger::status_error(&format!("{stage} failed"), &error);
                self.reload.error(path, error).await;
            }
        }
    }

    async fn succeeded(&mut self, report: &StageReport, reload: ReloadAction) {
        if self.failing.remove(&report.stage) && self.failing.is_empty() {
            self.reload.clear_error().await;
        }

        match reload {
            ReloadAction::Inject if report.written.is_empty() => {
                crate::logger::status_unchanged(&report.summary());
                return;
            }
            ReloadAction::Inject => self.reload.push_assets(&report.written).await,
            ReloadAction::FullPage => {
                self.reload
                    .full_reload(format!("{} finished", report.stage))
                    .await;
            }
        }
        crate::logger::status_success(&report.summary());
    }
}

/// Overlay location and message for a failed run.
fn failure(stage: StageId, ctx: &StageContext, error: &anyhow::Error) -> (String, String) {
    let path = match error.downcast_ref::<TransformError>() {
        Some(e) => ctx.layout.relative(&e.path).display().to_string(),
        None => stage.name().to_string(),
    };
    (path, format!("{error:#}"))
}
