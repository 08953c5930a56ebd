//! Core traits for the filtering pipeline.
//!
//! This module defines the Filter trait that allows composable,
//! extensible filters to be applied to scored candidate sets.

use anyhow::Result;
use candidates::ScoredCandidate;

/// Core trait for filtering candidates.
///
/// All filters must implement this trait to be used in the FilterPipeline.
///
/// ## Design Note
/// - `Send + Sync` allows one pipeline to serve concurrent requests
/// - Filters take ownership of the Vec<ScoredCandidate> and return a filtered Vec
/// - Everything a filter needs is captured when it is built
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Apply this filter to a set of candidates.
    ///
    /// # Returns
    /// * `Ok(Vec<ScoredCandidate>)` - The surviving candidates, in input order
    /// * `Err` - If filtering fails
    fn apply(&self, candidates: Vec<ScoredCandidate>) -> Result<Vec<ScoredCandidate>>;
}
