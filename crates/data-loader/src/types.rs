//! Core domain types for the venue catalog.
//!
//! This module defines the records the engine reads from its data
//! collaborator: venues, the time windows they are linked to, and the
//! regions they belong to. All of them are immutable for the duration of
//! one engine invocation.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a venue
pub type VenueId = u64;

/// Unique identifier for a time window ("lunch", "evening", ...)
pub type TimeWindowId = u32;

/// Region identifiers are slugs such as `"seongsu"`
pub type RegionId = String;

// =============================================================================
// Reference Data
// =============================================================================

/// A named region venues are filed under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: RegionId,
    pub name: String,
}

/// A bookable slice of the day, e.g. "Afternoon 14:00-17:00".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    pub id: TimeWindowId,
    pub name: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default)]
    pub description: Option<String>,
}

impl TimeWindow {
    /// Length of the window in minutes. Windows that wrap past midnight
    /// are measured across the day boundary.
    pub fn duration_minutes(&self) -> i64 {
        let minutes = (self.end_time - self.start_time).num_minutes();
        if minutes < 0 { minutes + 24 * 60 } else { minutes }
    }
}

// =============================================================================
// Venue
// =============================================================================

/// Who registered a venue record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Curated by an operator
    Admin,
    /// Submitted by a user
    User,
}

/// Link between a venue and a time window.
///
/// Lower `priority` means the venue is a stronger fit for that window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindowLink {
    pub time_window_id: TimeWindowId,
    pub priority: u8,
}

/// A place that can appear as a stop in a date course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    pub id: VenueId,
    pub name: String,
    pub region_id: RegionId,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Average rating from 0.0 to 5.0
    #[serde(default)]
    pub rating: Option<f32>,
    pub category_id: String,
    pub category_name: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Price ordinal from 1 (cheap) to 5 (expensive)
    pub price_tier: u8,
    #[serde(default)]
    pub is_partnership: bool,
    pub source: Provenance,
    /// Unix timestamp of record creation
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub time_windows: Vec<TimeWindowLink>,
}

fn default_active() -> bool {
    true
}

impl Venue {
    /// Returns `(latitude, longitude)` when both are present and finite.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => Some((lat, lng)),
            _ => None,
        }
    }

    /// Whether the venue is linked to the given time window.
    pub fn is_linked_to(&self, time_window_id: TimeWindowId) -> bool {
        self.time_windows
            .iter()
            .any(|link| link.time_window_id == time_window_id)
    }

    /// Whether the venue is linked to at least one of the given windows.
    pub fn is_linked_to_any(&self, time_window_ids: &[TimeWindowId]) -> bool {
        time_window_ids.iter().any(|&id| self.is_linked_to(id))
    }

    pub fn is_admin(&self) -> bool {
        self.source == Provenance::Admin
    }
}

// =============================================================================
// DataIndex - The In-Memory Catalog
// =============================================================================

/// In-memory venue catalog with secondary indices.
///
/// This is the reference implementation of the engine's data collaborator
/// (see [`crate::store::VenueStore`]).
#[derive(Debug)]
pub struct DataIndex {
    // Primary data stores
    pub(crate) venues: HashMap<VenueId, Venue>,
    pub(crate) regions: HashMap<RegionId, Region>,
    /// Sorted by id so listings come out in a stable order
    pub(crate) time_windows: BTreeMap<TimeWindowId, TimeWindow>,

    // Secondary indices
    /// Venues filed under each region
    pub(crate) region_index: HashMap<RegionId, Vec<VenueId>>,
    /// Venues linked to each time window
    pub(crate) time_window_index: HashMap<TimeWindowId, Vec<VenueId>>,
}

impl DataIndex {
    /// Creates a new, empty DataIndex
    pub fn new() -> Self {
        Self {
            venues: HashMap::new(),
            regions: HashMap::new(),
            time_windows: BTreeMap::new(),
            region_index: HashMap::new(),
            time_window_index: HashMap::new(),
        }
    }

    /// Get a venue by ID
    pub fn get_venue(&self, id: VenueId) -> Option<&Venue> {
        self.venues.get(&id)
    }

    /// Get a region by ID
    pub fn get_region(&self, id: &str) -> Option<&Region> {
        self.regions.get(id)
    }

    /// Get a time window by ID
    pub fn get_time_window(&self, id: TimeWindowId) -> Option<&TimeWindow> {
        self.time_windows.get(&id)
    }

    /// Get all venues filed under a region
    pub fn get_venues_by_region(&self, region_id: &str) -> &[VenueId] {
        self.region_index
            .get(region_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Get all venues linked to a time window
    pub fn get_venues_by_time_window(&self, time_window_id: TimeWindowId) -> &[VenueId] {
        self.time_window_index
            .get(&time_window_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Insert a venue and update the secondary indices
    pub fn insert_venue(&mut self, venue: Venue) {
        if let Some(previous) = self.venues.remove(&venue.id) {
            self.unindex_venue(&previous);
        }

        self.region_index
            .entry(venue.region_id.clone())
            .or_default()
            .push(venue.id);

        for link in &venue.time_windows {
            let ids = self.time_window_index.entry(link.time_window_id).or_default();
            if !ids.contains(&venue.id) {
                ids.push(venue.id);
            }
        }

        self.venues.insert(venue.id, venue);
    }

    /// Insert a region
    pub fn insert_region(&mut self, region: Region) {
        self.regions.insert(region.id.clone(), region);
    }

    /// Insert a time window
    pub fn insert_time_window(&mut self, time_window: TimeWindow) {
        self.time_windows.insert(time_window.id, time_window);
    }

    fn unindex_venue(&mut self, venue: &Venue) {
        if let Some(ids) = self.region_index.get_mut(&venue.region_id) {
            ids.retain(|&id| id != venue.id);
        }
        for link in &venue.time_windows {
            if let Some(ids) = self.time_window_index.get_mut(&link.time_window_id) {
                ids.retain(|&id| id != venue.id);
            }
        }
    }

    /// Get counts of (regions, time windows, venues)
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.regions.len(), self.time_windows.len(), self.venues.len())
    }
}

impl Default for DataIndex {
    fn default() -> Self {
        Self::new()
    }
}
