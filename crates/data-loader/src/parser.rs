//! Parser for catalog files.
//!
//! A catalog directory holds three JSON arrays:
//! - regions.json: `[{ "id": "seongsu", "name": "Seongsu" }, ...]`
//! - time_windows.json: `[{ "id": 1, "name": "Lunch", "startTime": "11:30:00", ... }]`
//! - venues.json: `[{ "id": 10, "name": "...", "regionId": "seongsu", ... }]`

use crate::error::{DataLoadError, Result};
use crate::types::*;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Read a whole file, mapping a missing file to `FileNotFound`.
fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })
}

fn parse_records<T: DeserializeOwned>(content: &str, file: &str) -> Result<Vec<T>> {
    serde_json::from_str(content).map_err(|e| DataLoadError::ParseError {
        file: file.to_string(),
        reason: e.to_string(),
    })
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Parse regions from a JSON string
pub fn parse_regions_str(content: &str) -> Result<Vec<Region>> {
    parse_records(content, "regions.json")
}

/// Parse time windows from a JSON string
pub fn parse_time_windows_str(content: &str) -> Result<Vec<TimeWindow>> {
    parse_records(content, "time_windows.json")
}

/// Parse venues from a JSON string and check per-record value ranges
pub fn parse_venues_str(content: &str) -> Result<Vec<Venue>> {
    let venues: Vec<Venue> = parse_records(content, "venues.json")?;
    for venue in &venues {
        check_venue_values(venue)?;
    }
    Ok(venues)
}

/// Parse the regions.json file
pub fn parse_regions(path: &Path) -> Result<Vec<Region>> {
    parse_records(&read_file(path)?, &file_label(path))
}

/// Parse the time_windows.json file
pub fn parse_time_windows(path: &Path) -> Result<Vec<TimeWindow>> {
    parse_records(&read_file(path)?, &file_label(path))
}

/// Parse the venues.json file
pub fn parse_venues(path: &Path) -> Result<Vec<Venue>> {
    let venues: Vec<Venue> = parse_records(&read_file(path)?, &file_label(path))?;
    for venue in &venues {
        check_venue_values(venue)?;
    }
    Ok(venues)
}

/// Reject values outside the documented ranges.
fn check_venue_values(venue: &Venue) -> Result<()> {
    if !(1..=5).contains(&venue.price_tier) {
        return Err(DataLoadError::InvalidValue {
            field: format!("venue {} price_tier", venue.id),
            value: venue.price_tier.to_string(),
        });
    }

    if let Some(rating) = venue.rating
        && !(0.0..=5.0).contains(&rating)
    {
        return Err(DataLoadError::InvalidValue {
            field: format!("venue {} rating", venue.id),
            value: rating.to_string(),
        });
    }

    Ok(())
}
