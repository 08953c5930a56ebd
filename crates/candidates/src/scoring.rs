//! Scorer - multi-factor relevance for location groups
//!
//! Each component is capped on its own and the total is their sum:
//!
//! | Component   | Range | Rule                                              |
//! |-------------|-------|---------------------------------------------------|
//! | partnership | 0-30  | 30 if the representative or any member partners   |
//! | rating      | 0-25  | `rating / 5 * 25`, 0 when unrated                 |
//! | timeSlot    | 0-20  | `max(11 - priority, 1)` per requested window link |
//! | popularity  | 0-15  | `members * 3`                                     |
//! | source      | 0-10  | 10 if any member is admin-curated                 |
//! | preference  | 0-15  | category affinity, price fit and tag overlap      |
//!
//! Scoring is pure. Malformed preference input only zeroes its own term.

use crate::types::{LocationGroup, PriceRange, ScoreBreakdown, ScoredCandidate, UserPreferences};
use data_loader::{TimeWindowId, Venue};
use rayon::prelude::*;
use std::collections::HashSet;
use tracing::{debug, instrument};

pub const PARTNERSHIP_MAX: f64 = 30.0;
pub const RATING_MAX: f64 = 25.0;
pub const TIME_SLOT_MAX: f64 = 20.0;
pub const POPULARITY_MAX: f64 = 15.0;
pub const SOURCE_MAX: f64 = 10.0;
pub const PREFERENCE_MAX: f64 = 15.0;

const CATEGORY_AFFINITY_MAX: f64 = 8.0;
const PRICE_FIT_MAX: f64 = 4.0;
const PRICE_NEAR_MISS: f64 = 2.0;
const TAG_OVERLAP_MAX: f64 = 3.0;
const TAG_OVERLAP_STEP: f64 = 1.5;

/// Default estimated price per price tier
pub const DEFAULT_PRICE_UNIT: f64 = 15_000.0;

/// Scores location groups against requested time windows and preferences
pub struct Scorer {
    /// Estimated price of one price tier
    price_unit: f64,
}

impl Scorer {
    pub fn new() -> Self {
        Self {
            price_unit: DEFAULT_PRICE_UNIT,
        }
    }

    /// Configure the estimated price per tier (default: 15000)
    pub fn with_price_unit(mut self, price_unit: f64) -> Self {
        self.price_unit = price_unit;
        self
    }

    /// Score one group's representative
    pub fn score(
        &self,
        group: &LocationGroup,
        time_window_ids: &[TimeWindowId],
        preferences: Option<&UserPreferences>,
    ) -> ScoredCandidate {
        let venue = &group.representative;

        let breakdown = ScoreBreakdown {
            partnership: if group.has_partnership() {
                PARTNERSHIP_MAX
            } else {
                0.0
            },
            rating: rating_score(venue),
            time_slot: time_slot_score(venue, time_window_ids),
            popularity: (group.member_count() as f64 * 3.0).min(POPULARITY_MAX),
            source: if group.has_admin_member() {
                SOURCE_MAX
            } else {
                0.0
            },
            preference: preferences
                .map(|prefs| self.preference_score(venue, prefs))
                .unwrap_or(0.0),
        };

        ScoredCandidate::new(
            venue.clone(),
            breakdown,
            group.member_count(),
            group.sources(),
        )
    }

    /// Score a batch of groups in parallel, preserving input order.
    ///
    /// Each group's `score` field is set to its candidate's total.
    #[instrument(skip_all, fields(groups = groups.len()))]
    pub fn score_all(
        &self,
        groups: &mut [LocationGroup],
        time_window_ids: &[TimeWindowId],
        preferences: Option<&UserPreferences>,
    ) -> Vec<ScoredCandidate> {
        let scored: Vec<ScoredCandidate> = groups
            .par_iter_mut()
            .map(|group| {
                let candidate = self.score(group, time_window_ids, preferences);
                group.score = candidate.total_score;
                candidate
            })
            .collect();

        debug!(scored = scored.len(), "Scored location groups");
        scored
    }

    fn preference_score(&self, venue: &Venue, preferences: &UserPreferences) -> f64 {
        let category = preferences
            .category_affinities
            .get(&venue.category_id)
            .filter(|affinity| affinity.is_finite())
            .map(|affinity| affinity.clamp(0.0, 100.0) / 100.0 * CATEGORY_AFFINITY_MAX)
            .unwrap_or(0.0);

        let price = preferences
            .price_range
            .as_ref()
            .map(|range| self.price_fit(venue.price_tier, range))
            .unwrap_or(0.0);

        let tags = tag_overlap_score(venue, &preferences.theme_tags);

        (category + price + tags).min(PREFERENCE_MAX)
    }

    fn price_fit(&self, price_tier: u8, range: &PriceRange) -> f64 {
        if !range.is_valid() {
            return 0.0;
        }

        let estimated = price_tier as f64 * self.price_unit;
        if estimated >= range.min && estimated <= range.max {
            return PRICE_FIT_MAX;
        }

        let outside_by = if estimated < range.min {
            range.min - estimated
        } else {
            estimated - range.max
        };
        if outside_by <= range.width() * 0.5 {
            PRICE_NEAR_MISS
        } else {
            0.0
        }
    }
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new()
    }
}

fn rating_score(venue: &Venue) -> f64 {
    venue
        .rating
        .filter(|rating| rating.is_finite())
        .map(|rating| (rating as f64 / 5.0 * RATING_MAX).clamp(0.0, RATING_MAX))
        .unwrap_or(0.0)
}

fn time_slot_score(venue: &Venue, time_window_ids: &[TimeWindowId]) -> f64 {
    let requested: HashSet<TimeWindowId> = time_window_ids.iter().copied().collect();

    let fit: i32 = venue
        .time_windows
        .iter()
        .filter(|link| requested.contains(&link.time_window_id))
        .map(|link| (11 - link.priority as i32).max(1))
        .sum();

    (fit as f64).min(TIME_SLOT_MAX)
}

fn tag_overlap_score(venue: &Venue, wanted: &[String]) -> f64 {
    let wanted: HashSet<String> = wanted.iter().map(|tag| tag.trim().to_lowercase()).collect();

    let overlap = venue
        .tags
        .iter()
        .filter(|tag| wanted.contains(&tag.to_lowercase()))
        .count();

    (overlap as f64 * TAG_OVERLAP_STEP).min(TAG_OVERLAP_MAX)
}
