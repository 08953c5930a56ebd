//! Filter to keep venues linked to the requested time windows.

use crate::traits::Filter;
use anyhow::Result;
use candidates::ScoredCandidate;
use data_loader::TimeWindowId;

/// Removes candidates with no link to any of the given time windows.
pub struct TimeWindowFilter {
    time_window_ids: Vec<TimeWindowId>,
}

impl TimeWindowFilter {
    pub fn new(time_window_ids: Vec<TimeWindowId>) -> Self {
        Self { time_window_ids }
    }
}

impl Filter for TimeWindowFilter {
    fn name(&self) -> &str {
        "TimeWindowFilter"
    }

    fn apply(&self, candidates: Vec<ScoredCandidate>) -> Result<Vec<ScoredCandidate>> {
        Ok(candidates
            .into_iter()
            .filter(|candidate| candidate.venue.is_linked_to_any(&self.time_window_ids))
            .collect())
    }
}
