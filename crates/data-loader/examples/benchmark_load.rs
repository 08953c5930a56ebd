use data_loader::{DataIndex, VenueStore};
use std::path::Path;
use std::time::Instant;

fn main() -> data_loader::Result<()> {
    let data_dir = Path::new("data/catalog");

    println!("Loading venue catalog...\n");

    let start = Instant::now();
    let index = DataIndex::load_from_files(data_dir)?;
    let elapsed = start.elapsed();

    let (regions, windows, venues) = index.counts();

    println!("=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Regions: {}", regions);
    println!("Time windows: {}", windows);
    println!("Venues: {}", venues);

    let window_ids: Vec<_> = index.fetch_time_windows()?.iter().map(|w| w.id).collect();
    for region in index.fetch_regions()? {
        let active = index.fetch_active_venues(&region.id, &window_ids)?;
        println!("  {:<12} {} active", region.id, active.len());
    }

    Ok(())
}
