//! Engine configuration.
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```json
//! { "maxResults": 8, "tieBreakPool": 1 }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Tunables for recommendation and course assembly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Size of a plain recommendation list
    pub max_results: usize,
    /// Category penalty strength for plain recommendations
    pub diversity_weight: f64,
    /// Candidates requested when assembling courses
    pub course_pool_size: usize,
    /// Category penalty strength for the course candidate pool
    pub course_diversity_weight: f64,
    /// Upper bound on courses returned per request
    pub max_courses: usize,
    /// Attempts per theme before giving up on a duplicate
    pub theme_attempts: usize,
    /// How many top-ranked candidates a stop is drawn from
    pub tie_break_pool: usize,
    /// Fallback themes run while fewer courses than this exist
    pub min_unique_courses: usize,
    /// Lifetime of cached reference data
    pub cache_ttl_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_results: 12,
            diversity_weight: 0.3,
            course_pool_size: 20,
            course_diversity_weight: 0.4,
            max_courses: 4,
            theme_attempts: 3,
            tie_break_pool: 3,
            min_unique_courses: 2,
            cache_ttl_secs: 30 * 60,
        }
    }
}

impl EngineConfig {
    /// Load a JSON config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_diversity_weight(mut self, diversity_weight: f64) -> Self {
        self.diversity_weight = diversity_weight;
        self
    }

    pub fn with_course_pool_size(mut self, course_pool_size: usize) -> Self {
        self.course_pool_size = course_pool_size;
        self
    }

    pub fn with_course_diversity_weight(mut self, course_diversity_weight: f64) -> Self {
        self.course_diversity_weight = course_diversity_weight;
        self
    }

    pub fn with_max_courses(mut self, max_courses: usize) -> Self {
        self.max_courses = max_courses;
        self
    }

    pub fn with_theme_attempts(mut self, theme_attempts: usize) -> Self {
        self.theme_attempts = theme_attempts;
        self
    }

    /// Draw stops from the top `tie_break_pool` candidates (1 means always the best)
    pub fn with_tie_break_pool(mut self, tie_break_pool: usize) -> Self {
        self.tie_break_pool = tie_break_pool;
        self
    }

    pub fn with_min_unique_courses(mut self, min_unique_courses: usize) -> Self {
        self.min_unique_courses = min_unique_courses;
        self
    }

    pub fn with_cache_ttl_secs(mut self, cache_ttl_secs: u64) -> Self {
        self.cache_ttl_secs = cache_ttl_secs;
        self
    }
}
