//! # Candidates Crate
//!
//! Turns raw venue records into scored recommendation candidates.
//!
//! ## Components
//!
//! ### Location Grouper
//! Collapses records describing the same physical place:
//! - Coordinates snapped to a ~100 m grid
//! - One representative per group, admin-curated records first
//!
//! ### Scorer
//! Multi-factor relevance for each group's representative:
//! - Partnership, rating, time-window fit, popularity, provenance
//! - Optional user preferences (category affinity, price range, tags)
//! - Batch scoring runs in parallel with rayon
//!
//! ## Example Usage
//!
//! ```ignore
//! use candidates::{LocationGrouper, Scorer};
//!
//! let mut groups = LocationGrouper::new().group(venues);
//! let scored = Scorer::new().score_all(&mut groups, &[2, 3], None);
//! ```

pub mod grouping;
pub mod scoring;
pub mod types;

// Re-export commonly used types
pub use grouping::LocationGrouper;
pub use scoring::Scorer;
pub use types::{LocationGroup, PriceRange, ScoreBreakdown, ScoredCandidate, UserPreferences};
