//! Filtering and re-ranking of scored venue candidates.
//!
//! This crate provides:
//! - Filter trait and implementations for candidate filtering
//! - FilterPipeline for composing filters
//! - DiversitySelector for category-balanced top-N selection
//!
//! ## Architecture
//! Scored candidates pass through:
//! 1. Filters that drop unwanted venues (wrong time window, off-theme)
//! 2. The diversity selector, which caps each category and re-ranks
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{DiversitySelector, FilterPipeline};
//! use pipeline::filters::TimeWindowFilter;
//!
//! let pipeline = FilterPipeline::new().add_filter(TimeWindowFilter::new(vec![2, 3]));
//! let filtered = pipeline.apply(scored)?;
//!
//! let top = DiversitySelector::new()
//!     .with_max_results(12)
//!     .with_diversity_weight(0.3)
//!     .select(filtered);
//! ```

pub mod diversity;
pub mod filter_pipeline;
pub mod filters;
pub mod traits;

// Re-export main types
pub use diversity::DiversitySelector;
pub use filter_pipeline::FilterPipeline;
pub use traits::Filter;

#[cfg(test)]
pub(crate) mod test_support {
    use candidates::{ScoreBreakdown, ScoredCandidate};
    use data_loader::{Provenance, TimeWindowId, TimeWindowLink, Venue, VenueId};

    /// A candidate whose whole score sits in the rating component
    pub fn candidate(
        id: VenueId,
        category: &str,
        score: f64,
        windows: &[TimeWindowId],
    ) -> ScoredCandidate {
        let venue = Venue {
            id,
            name: format!("Venue {}", id),
            region_id: "seongsu".to_string(),
            latitude: Some(37.5),
            longitude: Some(127.0),
            rating: Some(4.0),
            category_id: category.to_string(),
            category_name: category.to_string(),
            tags: Default::default(),
            price_tier: 2,
            is_partnership: false,
            source: Provenance::User,
            created_at: None,
            active: true,
            time_windows: windows
                .iter()
                .map(|&time_window_id| TimeWindowLink {
                    time_window_id,
                    priority: 1,
                })
                .collect(),
        };
        let breakdown = ScoreBreakdown {
            rating: score,
            ..Default::default()
        };
        ScoredCandidate::new(venue, breakdown, 1, [Provenance::User].into())
    }
}
