//! Course model and the metadata derived from a course's stops.

use crate::themes::Theme;
use data_loader::{TimeWindow, Venue, VenueId};
use serde::{Deserialize, Serialize};

/// Fallback dwell time for categories missing from the table
pub const DEFAULT_DWELL_MINUTES: u32 = 60;

const MAX_COURSE_TAGS: usize = 6;
const MAX_DESCRIPTIVE_TAGS: usize = 4;

const INDOOR_CATEGORIES: &[&str] = &[
    "cafe", "restaurant", "bar", "pub", "bakery", "dessert", "museum", "gallery",
    "exhibition", "cinema", "theater", "bookstore", "workshop", "escape_room",
    "bowling", "karaoke", "spa", "shopping",
];

const OUTDOOR_CATEGORIES: &[&str] = &[
    "park", "garden", "trail", "market", "viewpoint", "riverside", "beach", "zoo",
];

/// Suggested time spent at a venue of the given category, in minutes
pub fn dwell_minutes(category_id: &str) -> u32 {
    match category_id {
        "bakery" | "viewpoint" => 30,
        "dessert" | "bookstore" => 45,
        "cafe" | "park" | "garden" | "market" | "escape_room" | "bowling" => 60,
        "restaurant" | "bar" | "pub" | "gallery" | "exhibition" | "karaoke" | "shopping" => 90,
        "museum" | "workshop" | "spa" | "trail" => 120,
        "cinema" | "theater" => 150,
        _ => DEFAULT_DWELL_MINUTES,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn classify(total_distance_meters: u32, total_duration_minutes: u32) -> Self {
        if total_distance_meters < 2_000 && total_duration_minutes < 180 {
            Difficulty::Easy
        } else if total_distance_meters < 5_000 && total_duration_minutes < 300 {
            Difficulty::Medium
        } else {
            Difficulty::Hard
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherSuitability {
    Indoor,
    Outdoor,
    Mixed,
}

impl WeatherSuitability {
    /// One side must outnumber the other at least two to one
    pub fn classify(indoor: usize, outdoor: usize) -> Self {
        if indoor > 0 && indoor >= outdoor * 2 {
            WeatherSuitability::Indoor
        } else if outdoor > 0 && outdoor >= indoor * 2 {
            WeatherSuitability::Outdoor
        } else {
            WeatherSuitability::Mixed
        }
    }
}

/// Estimated spend for a whole course
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostRange {
    pub min: u64,
    pub max: u64,
}

/// One scheduled visit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseStop {
    pub venue: Venue,
    pub time_window: TimeWindow,
    pub dwell_minutes: u32,
    /// 1-based position in the course
    pub order: usize,
    /// Meters from the previous stop; `None` for the first stop
    pub distance_from_previous_meters: Option<u32>,
    pub travel_minutes_from_previous: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateCourse {
    pub id: String,
    pub name: String,
    pub theme: String,
    pub description: String,
    /// Dwell plus travel, in minutes
    pub total_duration_minutes: u32,
    pub total_distance_meters: u32,
    pub stops: Vec<CourseStop>,
    pub estimated_cost: CostRange,
    pub tags: Vec<String>,
    pub difficulty: Difficulty,
    pub weather: WeatherSuitability,
}

impl DateCourse {
    /// Assemble a course from ordered stops, deriving every aggregate.
    ///
    /// `price_unit` is the estimated spend of one price tier.
    pub fn from_stops(
        id: String,
        theme: &Theme,
        stops: Vec<CourseStop>,
        price_unit: f64,
    ) -> Self {
        let total_distance_meters: u32 = stops
            .iter()
            .filter_map(|stop| stop.distance_from_previous_meters)
            .sum();
        let total_duration_minutes: u32 = stops
            .iter()
            .map(|stop| stop.dwell_minutes + stop.travel_minutes_from_previous.unwrap_or(0))
            .sum();

        let estimated_cost = stops.iter().fold(CostRange::default(), |acc, stop| {
            let base = stop.venue.price_tier as f64 * price_unit;
            CostRange {
                min: acc.min + (base * 0.7).round() as u64,
                max: acc.max + (base * 1.3).round() as u64,
            }
        });

        let indoor = stops
            .iter()
            .filter(|stop| INDOOR_CATEGORIES.contains(&stop.venue.category_id.as_str()))
            .count();
        let outdoor = stops
            .iter()
            .filter(|stop| OUTDOOR_CATEGORIES.contains(&stop.venue.category_id.as_str()))
            .count();

        let tags = course_tags(theme, &stops, total_distance_meters);
        let description = format!(
            "{}. {} stops, about {} minutes.",
            theme.description,
            stops.len(),
            total_duration_minutes
        );

        Self {
            id,
            name: format!("{} Course", theme.display_name),
            theme: theme.name.to_string(),
            description,
            total_duration_minutes,
            total_distance_meters,
            difficulty: Difficulty::classify(total_distance_meters, total_duration_minutes),
            weather: WeatherSuitability::classify(indoor, outdoor),
            stops,
            estimated_cost,
            tags,
        }
    }

    /// Sorted venue ids, identifying courses that visit the same places
    pub fn signature(&self) -> Vec<VenueId> {
        let mut ids: Vec<VenueId> = self.stops.iter().map(|stop| stop.venue.id).collect();
        ids.sort_unstable();
        ids
    }
}

/// Theme name, up to four distinct category and tag values, then a
/// distance tag.
fn course_tags(theme: &Theme, stops: &[CourseStop], total_distance_meters: u32) -> Vec<String> {
    let mut tags = vec![theme.name.to_string()];

    let descriptive = stops
        .iter()
        .flat_map(|stop| std::iter::once(&stop.venue.category_id).chain(stop.venue.tags.iter()))
        .map(|value| value.to_lowercase());
    for value in descriptive {
        if tags.len() > MAX_DESCRIPTIVE_TAGS {
            break;
        }
        if !tags.contains(&value) {
            tags.push(value);
        }
    }

    let convenience = match total_distance_meters {
        0..=1_000 => "walkable",
        1_001..=3_000 => "short-hop",
        _ => "transit",
    };
    if !tags.iter().any(|tag| tag == convenience) {
        tags.push(convenience.to_string());
    }

    tags.truncate(MAX_COURSE_TAGS);
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::themes::{CULTURE, ROMANTIC};
    use chrono::NaiveTime;
    use data_loader::Provenance;

    fn window(id: u32) -> TimeWindow {
        TimeWindow {
            id,
            name: format!("Window {}", id),
            start_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
            description: None,
        }
    }

    fn stop(
        id: u64,
        category: &str,
        tier: u8,
        order: usize,
        hop: Option<(u32, u32)>,
    ) -> CourseStop {
        CourseStop {
            venue: Venue {
                id,
                name: format!("Venue {}", id),
                region_id: "seongsu".to_string(),
                latitude: Some(37.5),
                longitude: Some(127.0),
                rating: Some(4.0),
                category_id: category.to_string(),
                category_name: category.to_string(),
                tags: ["cozy".to_string()].into(),
                price_tier: tier,
                is_partnership: false,
                source: Provenance::User,
                created_at: None,
                active: true,
                time_windows: vec![],
            },
            time_window: window(order as u32),
            dwell_minutes: dwell_minutes(category),
            order,
            distance_from_previous_meters: hop.map(|(d, _)| d),
            travel_minutes_from_previous: hop.map(|(_, t)| t),
        }
    }

    #[test]
    fn test_dwell_table() {
        assert_eq!(dwell_minutes("cafe"), 60);
        assert_eq!(dwell_minutes("restaurant"), 90);
        assert_eq!(dwell_minutes("museum"), 120);
        assert_eq!(dwell_minutes("cinema"), 150);
        assert_eq!(dwell_minutes("hot_air_balloon"), DEFAULT_DWELL_MINUTES);
    }

    #[test]
    fn test_difficulty_thresholds() {
        assert_eq!(Difficulty::classify(1_999, 179), Difficulty::Easy);
        assert_eq!(Difficulty::classify(2_000, 179), Difficulty::Medium);
        assert_eq!(Difficulty::classify(1_000, 180), Difficulty::Medium);
        assert_eq!(Difficulty::classify(4_999, 299), Difficulty::Medium);
        assert_eq!(Difficulty::classify(5_000, 100), Difficulty::Hard);
        assert_eq!(Difficulty::classify(100, 300), Difficulty::Hard);
    }

    #[test]
    fn test_weather_ratio() {
        assert_eq!(WeatherSuitability::classify(2, 1), WeatherSuitability::Indoor);
        assert_eq!(WeatherSuitability::classify(3, 0), WeatherSuitability::Indoor);
        assert_eq!(WeatherSuitability::classify(1, 2), WeatherSuitability::Outdoor);
        assert_eq!(WeatherSuitability::classify(3, 2), WeatherSuitability::Mixed);
        assert_eq!(WeatherSuitability::classify(0, 0), WeatherSuitability::Mixed);
    }

    #[test]
    fn test_from_stops_aggregates() {
        let stops = vec![
            stop(1, "cafe", 1, 1, None),
            stop(2, "museum", 2, 2, Some((400, 6))),
            stop(3, "restaurant", 3, 3, Some((1_200, 8))),
        ];

        let course =
            DateCourse::from_stops("culture-1".to_string(), &CULTURE, stops, 15_000.0);

        assert_eq!(course.total_distance_meters, 1_600);
        assert_eq!(course.total_duration_minutes, 60 + 120 + 6 + 90 + 8);
        assert_eq!(
            course.estimated_cost,
            CostRange {
                min: 63_000,
                max: 117_000
            }
        );
        assert_eq!(course.difficulty, Difficulty::Medium);
        assert_eq!(course.weather, WeatherSuitability::Indoor);
        assert_eq!(course.name, "Culture Course");
        assert_eq!(course.signature(), vec![1, 2, 3]);
        assert_eq!(
            course.tags,
            vec!["culture", "cafe", "cozy", "museum", "restaurant", "short-hop"]
        );
    }

    #[test]
    fn test_single_stop_course() {
        let course = DateCourse::from_stops(
            "romantic-1".to_string(),
            &ROMANTIC,
            vec![stop(9, "park", 1, 1, None)],
            15_000.0,
        );

        assert_eq!(course.total_distance_meters, 0);
        assert_eq!(course.total_duration_minutes, 60);
        assert_eq!(course.difficulty, Difficulty::Easy);
        assert_eq!(course.weather, WeatherSuitability::Outdoor);
        assert_eq!(course.tags, vec!["romantic", "park", "cozy", "walkable"]);
    }

    #[test]
    fn test_course_serializes_camel_case() {
        let course = DateCourse::from_stops(
            "romantic-1".to_string(),
            &ROMANTIC,
            vec![stop(9, "cafe", 1, 1, None)],
            15_000.0,
        );
        let json = serde_json::to_value(&course).unwrap();
        assert_eq!(json["totalDurationMinutes"], 60);
        assert_eq!(json["difficulty"], "easy");
        assert_eq!(json["weather"], "indoor");
        assert_eq!(json["totalDistanceMeters"], 0);
        assert!(json["stops"][0]["distanceFromPreviousMeters"].is_null());
    }
}
