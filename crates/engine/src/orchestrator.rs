//! # Recommendation Orchestrator
//!
//! This module coordinates the recommendation pipeline:
//! 1. Fetch active venues for the region and time windows
//! 2. Discard venues without coordinates
//! 3. Collapse duplicate records into location groups
//! 4. Score every group
//! 5. Drop candidates not linked to a requested window
//! 6. Select a category-diverse top N
//! 7. Return the ranked list with per-stage counts

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use candidates::{LocationGrouper, ScoredCandidate, Scorer, UserPreferences};
use data_loader::{TimeWindowId, Venue, VenueStore};
use pipeline::diversity::by_adjusted_score;
use pipeline::filters::TimeWindowFilter;
use pipeline::{DiversitySelector, FilterPipeline};

use crate::config::EngineConfig;

/// What to recommend for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    pub region: String,
    pub date: NaiveDate,
    pub time_window_ids: Vec<TimeWindowId>,
    /// Falls back to the configured `max_results`
    #[serde(default)]
    pub max_results: Option<usize>,
    /// Falls back to the configured `diversity_weight`
    #[serde(default)]
    pub diversity_weight: Option<f64>,
    #[serde(default)]
    pub preferences: Option<UserPreferences>,
}

impl RecommendationRequest {
    pub fn new(
        region: impl Into<String>,
        date: NaiveDate,
        time_window_ids: Vec<TimeWindowId>,
    ) -> Self {
        Self {
            region: region.into(),
            date,
            time_window_ids,
            max_results: None,
            diversity_weight: None,
            preferences: None,
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = Some(max_results);
        self
    }

    pub fn with_diversity_weight(mut self, diversity_weight: f64) -> Self {
        self.diversity_weight = Some(diversity_weight);
        self
    }

    pub fn with_preferences(mut self, preferences: UserPreferences) -> Self {
        self.preferences = Some(preferences);
        self
    }
}

/// Candidate counts at each stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationMetadata {
    pub initial_count: usize,
    pub after_grouping: usize,
    pub after_diversity: usize,
    pub final_count: usize,
    pub execution_time_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResult {
    /// Best first, by diversity-adjusted score
    pub candidates: Vec<ScoredCandidate>,
    pub metadata: RecommendationMetadata,
}

/// Drives grouping, scoring and diversity selection over one store
pub struct RecommendationOrchestrator {
    store: Arc<dyn VenueStore>,
    grouper: LocationGrouper,
    scorer: Scorer,
    config: EngineConfig,
}

impl RecommendationOrchestrator {
    /// Create an orchestrator with default components and configuration
    pub fn new(store: Arc<dyn VenueStore>) -> Self {
        Self {
            store,
            grouper: LocationGrouper::new(),
            scorer: Scorer::new(),
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_scorer(mut self, scorer: Scorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn VenueStore> {
        &self.store
    }

    /// Main entry point: ranked, category-diverse candidates for a request
    ///
    /// Store failures are returned unchanged, so callers can downcast to
    /// `DataLoadError`. An empty catalog slice is an empty result.
    #[instrument(
        skip(self, request),
        fields(region = %request.region, date = %request.date, windows = ?request.time_window_ids)
    )]
    pub async fn get_recommendations(
        &self,
        request: &RecommendationRequest,
    ) -> Result<RecommendationResult> {
        let start_time = Instant::now();
        let max_results = request.max_results.unwrap_or(self.config.max_results);
        let diversity_weight = request
            .diversity_weight
            .unwrap_or(self.config.diversity_weight);

        // Fetch
        let venues = self
            .fetch_venues(&request.region, &request.time_window_ids)
            .await?;
        let initial_count = venues.len();
        info!("Fetched {} active venues", initial_count);

        // Discard venues that cannot be placed on a map
        let venues: Vec<Venue> = venues
            .into_iter()
            .filter(|venue| venue.coordinates().is_some())
            .collect();
        if venues.len() < initial_count {
            debug!(
                discarded = initial_count - venues.len(),
                "Discarded venues without coordinates"
            );
        }

        // Group
        let mut groups = self.grouper.group(venues);
        let after_grouping = groups.len();
        info!("Grouped into {} locations", after_grouping);

        // Score
        let scored = self.scorer.score_all(
            &mut groups,
            &request.time_window_ids,
            request.preferences.as_ref(),
        );

        // Filter
        let filtered = self.apply_filters(scored, &request.time_window_ids)?;

        // Diversify
        let selector = DiversitySelector::new()
            .with_max_results(max_results)
            .with_diversity_weight(diversity_weight);
        let mut candidates = selector.select(filtered);
        let after_diversity = candidates.len();
        info!("Diversity selection kept {} candidates", after_diversity);

        // Rank and trim
        candidates.sort_by(by_adjusted_score);
        candidates.truncate(max_results);
        let final_count = candidates.len();

        let elapsed = start_time.elapsed();
        info!(
            "Recommended {} candidates in {:.2?}",
            final_count, elapsed
        );

        Ok(RecommendationResult {
            candidates,
            metadata: RecommendationMetadata {
                initial_count,
                after_grouping,
                after_diversity,
                final_count,
                execution_time_ms: elapsed.as_millis() as u64,
            },
        })
    }

    /// Read from the store off the async runtime
    async fn fetch_venues(
        &self,
        region: &str,
        time_window_ids: &[TimeWindowId],
    ) -> Result<Vec<Venue>> {
        let store = Arc::clone(&self.store);
        let region = region.to_string();
        let time_window_ids = time_window_ids.to_vec();

        let venues = tokio::task::spawn_blocking(move || {
            store.fetch_active_venues(&region, &time_window_ids)
        })
        .await
        .context("Venue fetch task panicked")??;

        Ok(venues)
    }

    fn apply_filters(
        &self,
        candidates: Vec<ScoredCandidate>,
        time_window_ids: &[TimeWindowId],
    ) -> Result<Vec<ScoredCandidate>> {
        let pipeline =
            FilterPipeline::new().add_filter(TimeWindowFilter::new(time_window_ids.to_vec()));
        pipeline.apply(candidates)
    }
}
