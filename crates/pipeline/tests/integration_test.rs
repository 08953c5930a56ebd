//! Integration tests for the pipeline.
//!
//! These tests verify that grouping, scoring, filtering and diversity
//! selection work together on a small catalog.

use candidates::{LocationGrouper, Scorer, ScoredCandidate};
use data_loader::{DataIndex, Provenance, Region, TimeWindowLink, Venue, VenueStore};
use pipeline::filters::*;
use pipeline::{DiversitySelector, FilterPipeline};

fn venue(id: u64, category: &str, lat: f64, rating: f32, windows: &[u32]) -> Venue {
    Venue {
        id,
        name: format!("{} {}", category, id),
        region_id: "seongsu".to_string(),
        latitude: Some(lat),
        longitude: Some(127.05),
        rating: Some(rating),
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
                priority: 2,
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

    let categories = ["cafe", "restaurant", "gallery", "bar"];
    let mut id = 1;
    for (c, category) in categories.iter().enumerate() {
        for i in 0..6 {
            let lat = 37.54 + (c * 10 + i) as f64 * 0.002;
            let rating = 3.0 + i as f32 * 0.3;
            index.insert_venue(venue(id, category, lat, rating, &[2, 3]));
            id += 1;
        }
    }

    // Duplicate record of venue 1, a few meters away
    let mut duplicate = venue(100, "cafe", 37.54001, 4.9, &[2]);
    duplicate.source = Provenance::Admin;
    index.insert_venue(duplicate);

    // Only open late at night
    index.insert_venue(venue(200, "bar", 37.70, 5.0, &[5]));

    index
}

fn scored_candidates(index: &DataIndex, windows: &[u32]) -> Vec<ScoredCandidate> {
    let venues = index.fetch_active_venues("seongsu", windows).unwrap();
    let mut groups = LocationGrouper::new().group(venues);
    Scorer::new().score_all(&mut groups, windows, None)
}

#[test]
fn test_duplicates_collapse_before_scoring() {
    let index = create_test_index();
    let scored = scored_candidates(&index, &[2, 3]);

    // 24 distinct places; venue 100 merged into venue 1's cell
    assert_eq!(scored.len(), 24);

    let merged = scored
        .iter()
        .find(|c| c.member_count == 2)
        .expect("merged group");
    assert_eq!(merged.venue.id, 100);
    assert_eq!(merged.breakdown.source, 10.0);
}

#[test]
fn test_full_pipeline_is_diverse_and_bounded() {
    let index = create_test_index();
    let scored = scored_candidates(&index, &[2, 3]);

    let pipeline = FilterPipeline::new().add_filter(TimeWindowFilter::new(vec![2, 3]));
    let filtered = pipeline.apply(scored).unwrap();

    let selected = DiversitySelector::new().select(filtered);
    assert_eq!(selected.len(), 12);

    // Four categories: at most three entries each
    for category in ["cafe", "restaurant", "gallery", "bar"] {
        let count = selected
            .iter()
            .filter(|c| c.category_id() == category)
            .count();
        assert_eq!(count, 3, "{}", category);
    }

    for pair in selected.windows(2) {
        assert!(pair[0].adjusted_score >= pair[1].adjusted_score);
    }
}

#[test]
fn test_theme_filter_then_diversity() {
    let index = create_test_index();
    let scored = scored_candidates(&index, &[2, 3]);

    let pipeline = FilterPipeline::new().add_filter(ThemeFilter::new(["gallery", "museum"]));
    let filtered = pipeline.apply(scored).unwrap();
    assert_eq!(filtered.len(), 6);

    // A single category is capped at ceil(12 / 3)
    let selected = DiversitySelector::new().select(filtered);
    assert_eq!(selected.len(), 4);
    assert!(selected.iter().all(|c| c.category_id() == "gallery"));
}

#[test]
fn test_late_night_venue_only_for_its_window() {
    let index = create_test_index();

    let scored = scored_candidates(&index, &[5]);
    assert_eq!(scored.len(), 1);
    assert_eq!(scored[0].venue.id, 200);

    let filtered = FilterPipeline::new()
        .add_filter(TimeWindowFilter::new(vec![2]))
        .apply(scored)
        .unwrap();
    assert!(filtered.is_empty());
}
