//! Candidate types shared across the recommendation pipeline.

use data_loader::{Provenance, Venue, VenueId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Venues believed to be the same physical place.
///
/// Built fresh for every request and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationGroup {
    /// Quantized `"lat_lng"` grid key shared by all members
    pub location_key: String,
    /// Members ordered by venue id
    pub members: Vec<Venue>,
    /// The member chosen to stand for the group
    pub representative: Venue,
    pub score: f64,
}

impl LocationGroup {
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Distinct provenance sources seen across the members
    pub fn sources(&self) -> BTreeSet<Provenance> {
        self.members.iter().map(|venue| venue.source).collect()
    }

    pub fn has_admin_member(&self) -> bool {
        self.members.iter().any(Venue::is_admin)
    }

    pub fn has_partnership(&self) -> bool {
        self.representative.is_partnership || self.members.iter().any(|v| v.is_partnership)
    }
}

/// Per-criterion contributions to a candidate's total score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub partnership: f64,
    pub rating: f64,
    pub time_slot: f64,
    pub popularity: f64,
    pub source: f64,
    pub preference: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.partnership
            + self.rating
            + self.time_slot
            + self.popularity
            + self.source
            + self.preference
    }
}

/// A location group's representative together with its score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredCandidate {
    pub venue: Venue,
    pub total_score: f64,
    pub breakdown: ScoreBreakdown,
    pub member_count: usize,
    pub sources: BTreeSet<Provenance>,
    /// Ranking score after the diversity penalty; starts equal to `total_score`
    pub adjusted_score: f64,
}

impl ScoredCandidate {
    pub fn new(
        venue: Venue,
        breakdown: ScoreBreakdown,
        member_count: usize,
        sources: BTreeSet<Provenance>,
    ) -> Self {
        let total_score = breakdown.total();
        Self {
            venue,
            total_score,
            breakdown,
            member_count,
            sources,
            adjusted_score: total_score,
        }
    }

    pub fn venue_id(&self) -> VenueId {
        self.venue.id
    }

    pub fn category_id(&self) -> &str {
        &self.venue.category_id
    }
}

/// Inclusive price bounds in the same unit as course cost estimates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    /// Bounds that are finite and ordered
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }
}

/// Optional user weighting applied on top of the base score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPreferences {
    /// Affinity from 0 to 100, keyed by category id
    pub category_affinities: HashMap<String, f64>,
    pub price_range: Option<PriceRange>,
    /// Tags the user would like a venue to carry
    pub theme_tags: Vec<String>,
}

impl UserPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category_affinity(
        mut self,
        category_id: impl Into<String>,
        affinity: f64,
    ) -> Self {
        self.category_affinities.insert(category_id.into(), affinity);
        self
    }

    pub fn with_price_range(mut self, min: f64, max: f64) -> Self {
        self.price_range = Some(PriceRange { min, max });
        self
    }

    pub fn with_theme_tag(mut self, tag: impl Into<String>) -> Self {
        self.theme_tags.push(tag.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.category_affinities.is_empty()
            && self.price_range.is_none()
            && self.theme_tags.is_empty()
    }
}
