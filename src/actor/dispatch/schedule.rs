//! In-flight bookkeeping for watch-triggered stage runs.

use rustc_hash::FxHashMap;

use crate::stage::StageId;
use crate::watch::ReloadAction;

/// Tracks which stages are running and which need one more run.
///
/// A stage requested while in flight is not started twice: the request is
/// folded into a single pending re-run, started when the current run ends.
#[derive(Debug, Default)]
pub(super) struct Schedule {
    in_flight: FxHashMap<StageId, ReloadAction>,
    pending: FxHashMap<StageId, ReloadAction>,
}

impl Schedule {
    /// Record a request. Returns `true` if the caller should start the stage now.
    pub(super) fn request(&mut self, stage: StageId, reload: ReloadAction) -> bool {
        if self.in_flight.contains_key(&stage) {
            let entry = self.pending.entry(stage).or_insert(reload);
            *entry = strongest(*entry, reload);
            return false;
        }
        self.in_flight.insert(stage, reload);
        true
    }

    /// Mark a run finished. Returns the reload action of a coalesced re-run
    /// that should start now, if any; the stage stays in flight in that case.
    pub(super) fn complete(&mut self, stage: StageId) -> Option<ReloadAction> {
        match self.pending.remove(&stage) {
            Some(reload) => {
                self.in_flight.insert(stage, reload);
                Some(reload)
            }
            None => {
                self.in_flight.remove(&stage);
                None
            }
        }
    }

    #[cfg(test)]
    pub(super) fn is_running(&self, stage: StageId) -> bool {
        self.in_flight.contains_key(&stage)
    }

    pub(super) fn is_idle(&self) -> bool {
        self.in_flight.is_empty()
    }
}

fn strongest(a: ReloadAction, b: ReloadAction) -> ReloadAction {
    if a == ReloadAction::FullPage || b == ReloadAction::FullPage {
        ReloadAction::FullPage
    } else {
        ReloadAction::Inject
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_request_starts() {
        let mut schedule = Schedule::default();
        assert!(schedule.request(StageId::Styles, ReloadAction::Inject));
        assert!(schedule.is_running(StageId::Styles));
        assert!(!schedule.is_idle());
    }

    #[test]
    fn test_retrigger_coalesces_into_one_rerun() {
        let mut schedule = Schedule::default();
        assert!(schedule.request(StageId::Styles, ReloadAction::Inject));
        assert!(!schedule.request(StageId::Styles, ReloadAction::Inject));
        assert!(!schedule.request(StageId::Styles, ReloadAction::Inject));

        assert_eq!(schedule.complete(StageId::Styles), Some(ReloadAction::Inject));
        assert!(schedule.is_running(StageId::Styles));

        assert_eq!(schedule.complete(StageId::Styles), None);
        assert!(schedule.is_idle());
    }

    #[test]
    fn test_unrelated_stages_run_concurrently() {
        let mut schedule = Schedule::default();
        assert!(schedule.request(StageId::Styles, ReloadAction::Inject));
        assert!(schedule.request(StageId::Copy, ReloadAction::FullPage));
        assert_eq!(schedule.complete(StageId::Copy), None);
        assert!(schedule.is_running(StageId::Styles));
    }

    #[test]
    fn test_pending_keeps_full_page() {
        let mut schedule = Schedule::default();
        assert!(schedule.request(StageId::Copy, ReloadAction::Inject));
        assert!(!schedule.request(StageId::Copy, ReloadAction::FullPage));
        assert!(!schedule.request(StageId::Copy, ReloadAction::Inject));
        assert_eq!(schedule.complete(StageId::Copy), Some(ReloadAction::FullPage));
    }
}
