//! Diversity Selector - keeps one category from flooding the top-N list
//!
//! ## Algorithm
//! 1. Bucket candidates by category id, in order of first appearance
//! 2. Sort each bucket by score, best first
//! 3. `max_per_category = ceil(N / max(categories, 3))`
//! 4. Round-robin over the buckets for that many rounds. The k-th pick from
//!    a category is penalised by `k * weight * 10`
//! 5. Stop at N picks, then sort by the adjusted score

use candidates::ScoredCandidate;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

pub const DEFAULT_MAX_RESULTS: usize = 12;
pub const DEFAULT_DIVERSITY_WEIGHT: f64 = 0.3;

/// Minimum divisor for the per-category quota
const MIN_CATEGORY_SPREAD: usize = 3;

/// Penalty scale applied per earlier pick from the same category
const PENALTY_SCALE: f64 = 10.0;

/// Re-ranks scored candidates for category variety
#[derive(Debug, Clone)]
pub struct DiversitySelector {
    max_results: usize,
    diversity_weight: f64,
}

impl DiversitySelector {
    pub fn new() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            diversity_weight: DEFAULT_DIVERSITY_WEIGHT,
        }
    }

    /// Configure N, the size of the selected set (default: 12)
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Configure the penalty strength (default: 0.3)
    ///
    /// Negative or non-finite weights are treated as 0.
    pub fn with_diversity_weight(mut self, diversity_weight: f64) -> Self {
        self.diversity_weight = if diversity_weight.is_finite() {
            diversity_weight.max(0.0)
        } else {
            0.0
        };
        self
    }

    /// Per-category quota for the given number of categories
    pub fn max_per_category(&self, num_categories: usize) -> usize {
        self.max_results
            .div_ceil(num_categories.max(MIN_CATEGORY_SPREAD))
    }

    /// Select up to N candidates, sorted by adjusted score
    pub fn select(&self, candidates: Vec<ScoredCandidate>) -> Vec<ScoredCandidate> {
        if self.max_results == 0 || candidates.is_empty() {
            return Vec::new();
        }

        let mut buckets: Vec<Vec<ScoredCandidate>> = Vec::new();
        let mut bucket_of: HashMap<String, usize> = HashMap::new();
        for candidate in candidates {
            let slot = *bucket_of
                .entry(candidate.category_id().to_string())
                .or_insert_with(|| {
                    buckets.push(Vec::new());
                    buckets.len() - 1
                });
            buckets[slot].push(candidate);
        }

        for bucket in &mut buckets {
            bucket.sort_by(by_total_score);
        }

        let max_per_category = self.max_per_category(buckets.len());
        let mut iters: Vec<_> = buckets.into_iter().map(Vec::into_iter).collect();
        let mut selected = Vec::with_capacity(self.max_results);

        'rounds: for round in 0..max_per_category {
            for bucket in iters.iter_mut() {
                let Some(mut candidate) = bucket.next() else {
                    continue;
                };
                let penalty = round as f64 * self.diversity_weight * PENALTY_SCALE;
                candidate.adjusted_score = candidate.total_score - penalty;
                selected.push(candidate);

                if selected.len() == self.max_results {
                    break 'rounds;
                }
            }
        }

        selected.sort_by(by_adjusted_score);

        debug!(
            categories = iters.len(),
            max_per_category,
            selected = selected.len(),
            "Diversity selection complete"
        );
        selected
    }
}

impl Default for DiversitySelector {
    fn default() -> Self {
        Self::new()
    }
}

fn by_total_score(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.total_score
        .total_cmp(&a.total_score)
        .then_with(|| a.venue_id().cmp(&b.venue_id()))
}

/// Adjusted score descending, then raw score, then venue id
pub fn by_adjusted_score(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.adjusted_score
        .total_cmp(&a.adjusted_score)
        .then_with(|| by_total_score(a, b))
}
