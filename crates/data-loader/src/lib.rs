//! # Data Loader Crate
//!
//! Venue catalog types, loading, and the store boundary the recommendation
//! engine reads through.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Venue, Region, TimeWindow, DataIndex)
//! - **parser**: Parse catalog JSON files into Rust structs
//! - **index**: Build and validate the in-memory catalog
//! - **store**: The `VenueStore` trait and its cached decorator
//! - **cache**: TTL cache for reference data
//! - **geo**: Haversine distance and travel-time estimates
//! - **error**: Error types for data loading and store reads
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{DataIndex, VenueStore};
//! use std::path::Path;
//!
//! let index = DataIndex::load_from_files(Path::new("data/catalog"))?;
//!
//! let venues = index.fetch_active_venues("seongsu", &[2, 3])?;
//! println!("{} venues open for the afternoon", venues.len());
//! ```

#[macro_use]
mod macros;

pub mod cache;
pub mod error;
pub mod geo;
pub mod index;
pub mod parser;
pub mod store;
pub mod types;

// Re-export commonly used types for convenience
pub use cache::{CacheKey, TtlCache};
pub use error::{DataLoadError, Result};
pub use store::{CachedStore, VenueStore};
pub use types::{
    // Type aliases
    RegionId,
    TimeWindowId,
    VenueId,
    // Core types
    DataIndex,
    Provenance,
    Region,
    TimeWindow,
    TimeWindowLink,
    Venue,
};
