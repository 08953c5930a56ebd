//! DataIndex building and validation.
//!
//! Loads a catalog directory into a [`DataIndex`], keeps the secondary
//! indices ordered, and checks referential integrity.

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::*;
use std::path::Path;
use tracing::info;

impl DataIndex {
    /// Load a catalog from a directory
    ///
    /// Steps:
    /// 1. Parse regions, time windows, and venues in parallel
    /// 2. Insert everything (venue inserts maintain the secondary indices)
    /// 3. Sort the secondary indices
    /// 4. Validate data integrity
    pub fn load_from_files(data_dir: &Path) -> Result<Self> {
        info!(data_dir = %data_dir.display(), "Loading venue catalog");

        let regions_path = data_dir.join("regions.json");
        let windows_path = data_dir.join("time_windows.json");
        let venues_path = data_dir.join("venues.json");

        let ((regions, time_windows), venues) = rayon::join(
            || {
                rayon::join(
                    || parser::parse_regions(&regions_path),
                    || parser::parse_time_windows(&windows_path),
                )
            },
            || parser::parse_venues(&venues_path),
        );

        let regions = regions?;
        let time_windows = time_windows?;
        let venues = venues?;

        info!(
            regions = regions.len(),
            time_windows = time_windows.len(),
            venues = venues.len(),
            "Parsed catalog files"
        );

        let mut index = DataIndex::new();
        for region in regions {
            index.insert_region(region);
        }
        for time_window in time_windows {
            index.insert_time_window(time_window);
        }
        for venue in venues {
            index.insert_venue(venue);
        }

        index.sort_secondary_indices();
        index.validate()?;

        info!("Catalog indexed and validated");
        Ok(index)
    }

    /// Sort the id lists of the secondary indices so reads are stable
    pub fn sort_secondary_indices(&mut self) {
        for ids in self.region_index.values_mut() {
            ids.sort_unstable();
        }
        for ids in self.time_window_index.values_mut() {
            ids.sort_unstable();
        }
    }

    /// Validate data integrity
    ///
    /// Check that:
    /// - Every venue's region exists
    /// - Every time-window link points at a known window
    /// - Price tiers are within 1-5 and ratings within 0-5
    pub fn validate(&self) -> Result<()> {
        for venue in self.venues.values() {
            if !self.regions.contains_key(&venue.region_id) {
                return Err(DataLoadError::MissingReference {
                    entity: "Region".to_string(),
                    id: venue.region_id.clone(),
                });
            }
            for link in &venue.time_windows {
                if !self.time_windows.contains_key(&link.time_window_id) {
                    return Err(DataLoadError::MissingReference {
                        entity: "TimeWindow".to_string(),
                        id: link.time_window_id.to_string(),
                    });
                }
            }
            if !(1..=5).contains(&venue.price_tier) {
                return Err(DataLoadError::ValidationError(format!(
                    "venue {} has price tier {}",
                    venue.id, venue.price_tier
                )));
            }
            if let Some(rating) = venue.rating
                && !(0.0..=5.0).contains(&rating)
            {
                return Err(DataLoadError::ValidationError(format!(
                    "venue {} has rating {}",
                    venue.id, rating
                )));
            }
        }
        Ok(())
    }
}
