//! # Course Assembler
//!
//! Builds themed, time-ordered itineraries from the recommendation pool.
//!
//! ## Algorithm
//! 1. Ask the orchestrator for a larger, more diverse candidate pool
//! 2. Resolve the requested time windows, in request order
//! 3. For each theme (user theme, then primaries, then fallbacks while
//!    too few courses exist):
//!    - keep pool candidates matching the theme
//!    - for each window, greedily place one stop linked to it. After the
//!      first stop, candidates beyond the travel budget are dropped and the
//!      rest ranked by `score - km * 5`
//!    - pick at random among the top few, for variety
//! 4. Skip itineraries visiting the same set of venues as an earlier one

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use candidates::scoring::DEFAULT_PRICE_UNIT;
use candidates::{ScoredCandidate, UserPreferences};
use data_loader::geo::{estimate_travel_minutes, haversine_distance_m};
use data_loader::{TimeWindow, TimeWindowId, VenueId, VenueStore};
use pipeline::Filter;

use crate::config::EngineConfig;
use crate::course::{CourseStop, DateCourse, dwell_minutes};
use crate::orchestrator::{RecommendationOrchestrator, RecommendationRequest};
use crate::themes::{self, Theme};

/// Penalty per kilometre when ranking the next stop
const DISTANCE_PENALTY_PER_KM: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRequest {
    pub region: String,
    pub date: NaiveDate,
    /// Windows to fill, one stop each, in this order
    pub time_window_ids: Vec<TimeWindowId>,
    /// A theme to try before the built-in ones; unknown names are ignored
    #[serde(default)]
    pub theme: Option<String>,
    /// Overrides every theme's travel budget between stops
    #[serde(default)]
    pub max_travel_minutes: Option<u32>,
    #[serde(default)]
    pub preferences: Option<UserPreferences>,
}

impl CourseRequest {
    pub fn new(
        region: impl Into<String>,
        date: NaiveDate,
        time_window_ids: Vec<TimeWindowId>,
    ) -> Self {
        Self {
            region: region.into(),
            date,
            time_window_ids,
            theme: None,
            max_travel_minutes: None,
            preferences: None,
        }
    }

    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = Some(theme.into());
        self
    }

    pub fn with_max_travel_minutes(mut self, minutes: u32) -> Self {
        self.max_travel_minutes = Some(minutes);
        self
    }

    pub fn with_preferences(mut self, preferences: UserPreferences) -> Self {
        self.preferences = Some(preferences);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseMetadata {
    pub candidate_pool_size: usize,
    pub elapsed_ms: u64,
    pub request: CourseRequest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseResult {
    pub courses: Vec<DateCourse>,
    pub metadata: CourseMetadata,
}

/// Turns recommendation pools into date courses
pub struct CourseAssembler {
    orchestrator: Arc<RecommendationOrchestrator>,
    config: EngineConfig,
    price_unit: f64,
}

impl CourseAssembler {
    /// Share an orchestrator; the assembler adopts its configuration
    pub fn new(orchestrator: Arc<RecommendationOrchestrator>) -> Self {
        let config = orchestrator.config().clone();
        Self {
            orchestrator,
            config,
            price_unit: DEFAULT_PRICE_UNIT,
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Configure the estimated spend per price tier (default: 15000)
    pub fn with_price_unit(mut self, price_unit: f64) -> Self {
        self.price_unit = price_unit;
        self
    }

    /// Main entry point: up to `max_courses` distinct courses
    ///
    /// An empty list is a valid answer. Store failures are returned
    /// unchanged.
    #[instrument(
        skip(self, request, rng),
        fields(region = %request.region, date = %request.date, theme = ?request.theme)
    )]
    pub async fn generate_courses<R>(
        &self,
        request: &CourseRequest,
        rng: &mut R,
    ) -> Result<CourseResult>
    where
        R: Rng + ?Sized,
    {
        let start_time = Instant::now();

        // Candidate pool
        let pool_request = RecommendationRequest {
            region: request.region.clone(),
            date: request.date,
            time_window_ids: request.time_window_ids.clone(),
            max_results: Some(self.config.course_pool_size),
            diversity_weight: Some(self.config.course_diversity_weight),
            preferences: request.preferences.clone(),
        };
        let pool = self
            .orchestrator
            .get_recommendations(&pool_request)
            .await?
            .candidates;
        info!("Course candidate pool has {} venues", pool.len());

        // Windows in request order
        let windows = self.resolve_windows(&request.time_window_ids).await?;

        // Themes
        let mut courses: Vec<DateCourse> = Vec::new();
        let mut seen: HashSet<Vec<VenueId>> = HashSet::new();
        let mut tried: HashSet<&'static str> = HashSet::new();

        let user_theme = request.theme.as_deref().and_then(|name| {
            let theme = themes::find_theme(name);
            if theme.is_none() {
                warn!(theme = name, "Ignoring unknown theme");
            }
            theme
        });

        for theme in user_theme.into_iter().chain(themes::PRIMARY_THEMES) {
            if courses.len() >= self.config.max_courses {
                break;
            }
            if tried.insert(theme.name) {
                self.try_theme(&theme, &pool, &windows, request, &mut courses, &mut seen, rng)?;
            }
        }

        for theme in themes::FALLBACK_THEMES {
            if courses.len() >= self.config.min_unique_courses
                || courses.len() >= self.config.max_courses
            {
                break;
            }
            if tried.insert(theme.name) {
                debug!(theme = theme.name, "Trying fallback theme");
                self.try_theme(&theme, &pool, &windows, request, &mut courses, &mut seen, rng)?;
            }
        }

        courses.truncate(self.config.max_courses);

        let elapsed = start_time.elapsed();
        info!("Assembled {} courses in {:.2?}", courses.len(), elapsed);

        Ok(CourseResult {
            courses,
            metadata: CourseMetadata {
                candidate_pool_size: pool.len(),
                elapsed_ms: elapsed.as_millis() as u64,
                request: request.clone(),
            },
        })
    }

    /// Look up the requested windows, skipping unknown and repeated ids
    async fn resolve_windows(&self, ids: &[TimeWindowId]) -> Result<Vec<TimeWindow>> {
        let store = Arc::clone(self.orchestrator.store());
        let all = tokio::task::spawn_blocking(move || store.fetch_time_windows())
            .await
            .context("Time window fetch task panicked")??;

        let by_id: HashMap<TimeWindowId, TimeWindow> =
            all.into_iter().map(|window| (window.id, window)).collect();

        let mut seen = HashSet::new();
        let mut windows = Vec::with_capacity(ids.len());
        for id in ids {
            if !seen.insert(*id) {
                continue;
            }
            match by_id.get(id) {
                Some(window) => windows.push(window.clone()),
                None => warn!(time_window_id = id, "Skipping unknown time window"),
            }
        }
        Ok(windows)
    }

    /// Build up to one new course for `theme`, retrying on duplicates
    #[allow(clippy::too_many_arguments)]
    fn try_theme<R>(
        &self,
        theme: &Theme,
        pool: &[ScoredCandidate],
        windows: &[TimeWindow],
        request: &CourseRequest,
        courses: &mut Vec<DateCourse>,
        seen: &mut HashSet<Vec<VenueId>>,
        rng: &mut R,
    ) -> Result<()>
    where
        R: Rng + ?Sized,
    {
        let themed = theme.filter().apply(pool.to_vec())?;
        if themed.is_empty() {
            debug!(theme = theme.name, "No venues fit theme");
            return Ok(());
        }

        let max_travel = request
            .max_travel_minutes
            .unwrap_or(theme.max_travel_minutes);

        for attempt in 1..=self.config.theme_attempts {
            let stops = self.place_stops(&themed, windows, max_travel, rng);
            if stops.is_empty() {
                debug!(theme = theme.name, "Theme placed no stops");
                return Ok(());
            }

            let id = format!("{}-{}", theme.name, courses.len() + 1);
            let course = DateCourse::from_stops(id, theme, stops, self.price_unit);

            if seen.insert(course.signature()) {
                info!(
                    theme = theme.name,
                    stops = course.stops.len(),
                    distance_m = course.total_distance_meters,
                    "Assembled course"
                );
                courses.push(course);
                return Ok(());
            }
            debug!(theme = theme.name, attempt, "Duplicate course, retrying");
        }
        Ok(())
    }

    /// Greedy placement, one stop per window
    fn place_stops<R>(
        &self,
        themed: &[ScoredCandidate],
        windows: &[TimeWindow],
        max_travel_minutes: u32,
        rng: &mut R,
    ) -> Vec<CourseStop>
    where
        R: Rng + ?Sized,
    {
        let mut remaining: Vec<&ScoredCandidate> = themed.iter().collect();
        let mut stops: Vec<CourseStop> = Vec::new();

        for window in windows {
            let linked: Vec<usize> = (0..remaining.len())
                .filter(|&i| remaining[i].venue.is_linked_to(window.id))
                .collect();
            if linked.is_empty() {
                continue;
            }

            let previous = stops
                .last()
                .and_then(|stop: &CourseStop| stop.venue.coordinates());

            let (chosen, hop) = match previous {
                Some(from) => {
                    self.pick_next(&remaining, &linked, from, max_travel_minutes, rng)
                }
                None => (self.pick_by_score(&remaining, &linked, rng), None),
            };

            let candidate = remaining.remove(chosen);
            let venue = candidate.venue.clone();
            stops.push(CourseStop {
                dwell_minutes: dwell_minutes(&venue.category_id),
                venue,
                time_window: window.clone(),
                order: stops.len() + 1,
                distance_from_previous_meters: hop.map(|(distance, _)| distance),
                travel_minutes_from_previous: hop.map(|(_, minutes)| minutes),
            });
        }

        stops
    }

    /// Choose a stop after `from`. Returns the index into `remaining` and
    /// the hop as `(meters, minutes)`.
    fn pick_next<R>(
        &self,
        remaining: &[&ScoredCandidate],
        linked: &[usize],
        from: (f64, f64),
        max_travel_minutes: u32,
        rng: &mut R,
    ) -> (usize, Option<(u32, u32)>)
    where
        R: Rng + ?Sized,
    {
        let mut reachable: Vec<(usize, f64)> = linked
            .iter()
            .filter_map(|&i| {
                let to = remaining[i].venue.coordinates()?;
                let distance = haversine_distance_m(from, to);
                (estimate_travel_minutes(distance) <= max_travel_minutes).then_some((i, distance))
            })
            .collect();

        let chosen = if reachable.is_empty() {
            debug!("Nothing within travel budget, ranking by score");
            self.pick_by_score(remaining, linked, rng)
        } else {
            reachable.sort_by(|a, b| {
                let rank_a = remaining[a.0].total_score - a.1 / 1000.0 * DISTANCE_PENALTY_PER_KM;
                let rank_b = remaining[b.0].total_score - b.1 / 1000.0 * DISTANCE_PENALTY_PER_KM;
                rank_b
                    .total_cmp(&rank_a)
                    .then_with(|| remaining[a.0].venue_id().cmp(&remaining[b.0].venue_id()))
            });
            let ranked: Vec<usize> = reachable.iter().map(|&(i, _)| i).collect();
            self.pick_among_top(&ranked, rng)
        };

        let hop = remaining[chosen].venue.coordinates().map(|to| {
            let distance = haversine_distance_m(from, to);
            (distance.round() as u32, estimate_travel_minutes(distance))
        });
        (chosen, hop)
    }

    fn pick_by_score<R>(&self, remaining: &[&ScoredCandidate], linked: &[usize], rng: &mut R) -> usize
    where
        R: Rng + ?Sized,
    {
        let mut ranked = linked.to_vec();
        ranked.sort_by(|&a, &b| {
            remaining[b]
                .total_score
                .total_cmp(&remaining[a].total_score)
                .then_with(|| remaining[a].venue_id().cmp(&remaining[b].venue_id()))
        });
        self.pick_among_top(&ranked, rng)
    }

    /// Uniform pick among the first `tie_break_pool` entries of a
    /// non-empty ranking
    fn pick_among_top<R>(&self, ranked: &[usize], rng: &mut R) -> usize
    where
        R: Rng + ?Sized,
    {
        let top = self.config.tie_break_pool.clamp(1, ranked.len());
        ranked[rng.random_range(0..top)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use data_loader::{DataIndex, Provenance, Region, TimeWindowLink, Venue};
    use rand::{RngCore, SeedableRng};
    use rand::rngs::StdRng;

    fn window(id: u32, start: u32) -> TimeWindow {
        TimeWindow {
            id,
            name: format!("Window {}", id),
            start_time: NaiveTime::from_hms_opt(start, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(start + 2, 0, 0).unwrap(),
            description: None,
        }
    }

    fn venue(id: u64, category: &str, lat: f64, lng: f64, windows: &[u32]) -> Venue {
        Venue {
            id,
            name: format!("Venue {}", id),
            region_id: "seongsu".to_string(),
            latitude: Some(lat),
            longitude: Some(lng),
            rating: Some(3.0 + (id % 5) as f32 * 0.4),
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
        }
    }

    fn create_test_index() -> DataIndex {
        let mut index = DataIndex::new();
        index.insert_region(Region {
            id: "seongsu".to_string(),
            name: "Seongsu".to_string(),
        });
        index.insert_time_window(window(1, 11));
        index.insert_time_window(window(2, 14));
        index.insert_time_window(window(3, 18));

        // A 5 x 5 grid of places around Seongsu station, one per cell
        let layout = [
            ("cafe", &[1, 2][..]),
            ("restaurant", &[1, 3][..]),
            ("bar", &[3][..]),
            ("gallery", &[1, 2][..]),
            ("museum", &[2][..]),
            ("cinema", &[2, 3][..]),
            ("workshop", &[1, 2][..]),
            ("bowling", &[2, 3][..]),
        ];
        for id in 1..=24u64 {
            let (category, windows) = layout[(id as usize - 1) % layout.len()];
            let lat = 37.540 + (id / 5) as f64 * 0.002;
            let lng = 127.050 + (id % 5) as f64 * 0.002;
            index.insert_venue(venue(id, category, lat, lng, windows));
        }
        index
    }

    fn assembler(index: DataIndex) -> CourseAssembler {
        let orchestrator = RecommendationOrchestrator::new(Arc::new(index));
        CourseAssembler::new(Arc::new(orchestrator))
    }

    fn request() -> CourseRequest {
        CourseRequest::new(
            "seongsu",
            NaiveDate::from_ymd_opt(2026, 5, 9).unwrap(),
            vec![1, 2, 3],
        )
    }

    #[tokio::test]
    async fn test_courses_are_distinct_and_consistent() {
        let assembler = assembler(create_test_index());
        let mut rng = StdRng::seed_from_u64(7);

        let result = assembler.generate_courses(&request(), &mut rng).await.unwrap();
        assert!(!result.courses.is_empty());
        assert!(result.courses.len() <= 4);
        assert_eq!(result.metadata.candidate_pool_size, 20);

        let mut signatures = HashSet::new();
        for course in &result.courses {
            assert!(signatures.insert(course.signature()), "duplicate course");

            let ids = course.signature();
            let mut unique = ids.clone();
            unique.dedup();
            assert_eq!(ids, unique, "repeated stop in {}", course.id);

            let duration: u32 = course
                .stops
                .iter()
                .map(|s| s.dwell_minutes + s.travel_minutes_from_previous.unwrap_or(0))
                .sum();
            let distance: u32 = course
                .stops
                .iter()
                .skip(1)
                .map(|s| s.distance_from_previous_meters.unwrap_or(0))
                .sum();
            assert_eq!(course.total_duration_minutes, duration);
            assert_eq!(course.total_distance_meters, distance);
            assert!(course.stops[0].distance_from_previous_meters.is_none());

            for (i, stop) in course.stops.iter().enumerate() {
                assert_eq!(stop.order, i + 1);
                assert!(stop.venue.is_linked_to(stop.time_window.id));
            }
        }
    }

    #[tokio::test]
    async fn test_same_seed_same_courses() {
        let assembler = assembler(create_test_index());

        let first = assembler
            .generate_courses(&request(), &mut StdRng::seed_from_u64(42))
            .await
            .unwrap();
        let second = assembler
            .generate_courses(&request(), &mut StdRng::seed_from_u64(42))
            .await
            .unwrap();

        let ids = |r: &CourseResult| -> Vec<Vec<VenueId>> {
            r.courses.iter().map(|c| c.signature()).collect()
        };
        assert_eq!(ids(&first), ids(&second));
    }

    #[tokio::test]
    async fn test_user_theme_goes_first() {
        let assembler = assembler(create_test_index());
        let request = request().with_theme("activity");

        let result = assembler
            .generate_courses(&request, &mut StdRng::seed_from_u64(1))
            .await
            .unwrap();
        assert_eq!(result.courses[0].theme, "activity");
        assert_eq!(result.courses[0].id, "activity-1");
        assert_eq!(result.metadata.request.theme.as_deref(), Some("activity"));
    }

    #[tokio::test]
    async fn test_unknown_windows_are_skipped() {
        let assembler = assembler(create_test_index());
        let request = CourseRequest::new(
            "seongsu",
            NaiveDate::from_ymd_opt(2026, 5, 9).unwrap(),
            vec![2, 99],
        );

        let result = assembler
            .generate_courses(&request, &mut StdRng::seed_from_u64(3))
            .await
            .unwrap();
        for course in &result.courses {
            assert_eq!(course.stops.len(), 1);
            assert_eq!(course.stops[0].time_window.id, 2);
        }
    }

    #[tokio::test]
    async fn test_no_theme_matches_yields_no_courses() {
        let mut index = DataIndex::new();
        index.insert_region(Region {
            id: "seongsu".to_string(),
            name: "Seongsu".to_string(),
        });
        index.insert_time_window(window(1, 11));
        index.insert_venue(venue(1, "laundromat", 37.544, 127.055, &[1]));

        let result = assembler(index)
            .generate_courses(&request(), &mut StdRng::seed_from_u64(0))
            .await
            .unwrap();
        assert!(result.courses.is_empty());
        assert_eq!(result.metadata.candidate_pool_size, 1);
    }

    fn food_only_index() -> DataIndex {
        let mut index = DataIndex::new();
        index.insert_region(Region {
            id: "seongsu".to_string(),
            name: "Seongsu".to_string(),
        });
        index.insert_time_window(window(1, 11));
        index.insert_time_window(window(2, 14));
        index.insert_time_window(window(3, 18));
        index.insert_venue(venue(1, "cafe", 37.540, 127.050, &[1]));
        index.insert_venue(venue(2, "restaurant", 37.542, 127.052, &[2]));
        index.insert_venue(venue(3, "bakery", 37.544, 127.054, &[3]));
        index
    }

    /// Counts words drawn from the wrapped generator
    struct CountingRng {
        inner: StdRng,
        draws: usize,
    }

    impl RngCore for CountingRng {
        fn next_u32(&mut self) -> u32 {
            self.draws += 1;
            self.inner.next_u32()
        }

        fn next_u64(&mut self) -> u64 {
            self.draws += 1;
            self.inner.next_u64()
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            self.draws += 1;
            self.inner.fill_bytes(dest)
        }
    }

    #[tokio::test]
    async fn test_fallback_theme_fills_in_when_primaries_fall_short() {
        // Only romantic among the primaries matches; foodie also takes the bakery
        let result = assembler(food_only_index())
            .generate_courses(&request(), &mut StdRng::seed_from_u64(5))
            .await
            .unwrap();

        let ids: Vec<&str> = result.courses.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["romantic-1", "foodie-2"]);
        assert_eq!(result.courses[0].signature(), vec![1, 2]);
        assert_eq!(result.courses[1].signature(), vec![1, 2, 3]);
        assert!(result.courses.iter().all(|c| c.theme != "healing"));
    }

    #[tokio::test]
    async fn test_duplicate_course_dropped_after_all_attempts() {
        let mut index = DataIndex::new();
        index.insert_region(Region {
            id: "seongsu".to_string(),
            name: "Seongsu".to_string(),
        });
        index.insert_time_window(window(1, 11));
        index.insert_venue(venue(1, "cafe", 37.540, 127.050, &[1]));
        let orchestrator = Arc::new(RecommendationOrchestrator::new(Arc::new(index)));
        let request = CourseRequest::new(
            "seongsu",
            NaiveDate::from_ymd_opt(2026, 5, 9).unwrap(),
            vec![1],
        );

        let mut draws = Vec::new();
        for attempts in [1, 3] {
            let assembler = CourseAssembler::new(Arc::clone(&orchestrator))
                .with_config(EngineConfig::default().with_theme_attempts(attempts));
            let mut rng = CountingRng {
                inner: StdRng::seed_from_u64(9),
                draws: 0,
            };

            let result = assembler.generate_courses(&request, &mut rng).await.unwrap();

            // Foodie can only rebuild the romantic course, so it never lands
            assert_eq!(result.courses.len(), 1);
            assert_eq!(result.courses[0].id, "romantic-1");
            draws.push(rng.draws);
        }

        // One placement for romantic plus one per foodie attempt
        assert!(draws[0] > 0);
        assert_eq!(draws[1], draws[0] * 2);
    }

    #[test]
    fn test_travel_budget_prefers_reachable_venue() {
        let assembler = assembler(DataIndex::new())
            .with_config(EngineConfig::default().with_tie_break_pool(1));

        let near = ScoredCandidate::new(
            venue(1, "cafe", 37.5450, 127.0560, &[2]),
            candidates::ScoreBreakdown {
                rating: 30.0,
                ..Default::default()
            },
            1,
            [Provenance::User].into(),
        );
        // About 11 km away with a better score
        let far = ScoredCandidate::new(
            venue(2, "cafe", 37.6450, 127.0560, &[2]),
            candidates::ScoreBreakdown {
                rating: 90.0,
                ..Default::default()
            },
            1,
            [Provenance::User].into(),
        );
        let remaining = vec![&far, &near];
        let mut rng = StdRng::seed_from_u64(0);

        let (chosen, hop) = assembler.pick_next(&remaining, &[0, 1], (37.5445, 127.0557), 20, &mut rng);
        assert_eq!(remaining[chosen].venue_id(), 1);
        let (distance, minutes) = hop.unwrap();
        assert!(distance < 100);
        assert_eq!(minutes, 1);

        // Nothing reachable: fall back to raw score
        let remaining = vec![&far];
        let (chosen, hop) = assembler.pick_next(&remaining, &[0], (37.5445, 127.0557), 20, &mut rng);
        assert_eq!(remaining[chosen].venue_id(), 2);
        assert!(hop.unwrap().1 > 20);
    }
}
