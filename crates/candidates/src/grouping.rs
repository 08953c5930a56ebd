//! Location Grouper - collapses duplicate venue records
//!
//! Venue records submitted by different users often describe the same
//! place. Coordinates are snapped to a grid (3 decimal places, roughly a
//! 100 m cell) and records sharing a cell form one [`LocationGroup`].
//!
//! ## Representative selection
//! 1. If any member is admin-curated, the highest-rated admin member
//! 2. Otherwise the highest-rated member, ties going to the newest record
//!
//! Cells are never merged with their neighbours, so two copies of one
//! venue that straddle a cell boundary stay separate.

use crate::types::LocationGroup;
use data_loader::Venue;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Buckets venues into location groups by quantized coordinates
pub struct LocationGrouper {
    /// Decimal places kept when quantizing coordinates
    precision: usize,
}

impl LocationGrouper {
    pub fn new() -> Self {
        Self { precision: 3 }
    }

    /// Grid key for a coordinate pair, e.g. `"37.500_127.000"`
    pub fn location_key(&self, latitude: f64, longitude: f64) -> String {
        let p = self.precision;
        format!(
            "{:.*}_{:.*}",
            p,
            quantize(latitude, p),
            p,
            quantize(longitude, p)
        )
    }

    /// Group venues that share a grid cell.
    ///
    /// Venues without finite coordinates are skipped. Groups come back
    /// ordered by location key, so the output does not depend on the
    /// order of `venues`.
    #[instrument(skip(self, venues), fields(venues = venues.len()))]
    pub fn group(&self, venues: Vec<Venue>) -> Vec<LocationGroup> {
        let mut cells: HashMap<String, Vec<Venue>> = HashMap::new();
        let mut skipped = 0usize;

        for venue in venues {
            match venue.coordinates() {
                Some((lat, lng)) => {
                    let key = self.location_key(lat, lng);
                    cells.entry(key).or_default().push(venue);
                }
                None => skipped += 1,
            }
        }

        let mut groups: Vec<LocationGroup> = cells
            .into_iter()
            .filter_map(|(location_key, mut members)| {
                members.sort_by_key(|venue| venue.id);
                let representative = select_representative(&members)?.clone();
                Some(LocationGroup {
                    location_key,
                    members,
                    representative,
                    score: 0.0,
                })
            })
            .collect();

        groups.sort_by(|a, b| a.location_key.cmp(&b.location_key));

        debug!(groups = groups.len(), skipped, "Grouped venues by location");
        groups
    }
}

impl Default for LocationGrouper {
    fn default() -> Self {
        Self::new()
    }
}

fn quantize(value: f64, precision: usize) -> f64 {
    let factor = 10f64.powi(precision as i32);
    // Adding 0.0 folds -0.0 into 0.0 so both print the same key
    (value * factor).round() / factor + 0.0
}

/// Pick the member that stands for the group.
///
/// Returns `None` only for an empty slice.
pub fn select_representative(members: &[Venue]) -> Option<&Venue> {
    let admins = members.iter().filter(|venue| venue.is_admin());
    if let Some(best_admin) = admins.max_by(|a, b| compare_for_representative(a, b)) {
        return Some(best_admin);
    }
    members
        .iter()
        .max_by(|a, b| compare_for_representative(a, b))
}

/// Rating first, then creation time (missing counts as oldest), then the
/// lower id wins so the choice is stable.
fn compare_for_representative(a: &Venue, b: &Venue) -> Ordering {
    let rating_a = a.rating.unwrap_or(f32::NEG_INFINITY);
    let rating_b = b.rating.unwrap_or(f32::NEG_INFINITY);

    rating_a
        .total_cmp(&rating_b)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| b.id.cmp(&a.id))
}
