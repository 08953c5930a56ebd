//! Example: Group and score the venues of one region
//!
//! Run with: cargo run --package candidates --example score_region
//!
//! This example shows how to:
//! 1. Load the venue catalog
//! 2. Fetch the active venues for a region and time windows
//! 3. Collapse duplicate records into location groups
//! 4. Score each group and display the breakdown

use candidates::{LocationGrouper, Scorer};
use data_loader::{DataIndex, VenueStore};
use std::path::Path;
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    println!("=== Date Course Candidate Scoring Example ===\n");

    let index = DataIndex::load_from_files(Path::new("data/catalog"))?;
    let region = "seongsu";
    let windows = [2, 3];

    let venues = index.fetch_active_venues(region, &windows)?;
    println!("Fetched {} active venues in {}\n", venues.len(), region);

    let start = Instant::now();
    let mut groups = LocationGrouper::new().group(venues);
    let mut scored = Scorer::new().score_all(&mut groups, &windows, None);
    let elapsed = start.elapsed();

    scored.sort_by(|a, b| b.total_score.total_cmp(&a.total_score));

    println!("Top 5 of {} location groups ({:?}):", scored.len(), elapsed);
    for (i, candidate) in scored.iter().take(5).enumerate() {
        let b = &candidate.breakdown;
        println!(
            "  {}. {} [{}] total {:.1}",
            i + 1,
            candidate.venue.name,
            candidate.venue.category_id,
            candidate.total_score
        );
        println!(
            "     partnership {:.0} rating {:.1} timeSlot {:.0} popularity {:.0} source {:.0}",
            b.partnership, b.rating, b.time_slot, b.popularity, b.source
        );
        if candidate.member_count > 1 {
            println!("     - merged from {} records", candidate.member_count);
        }
    }

    Ok(())
}
