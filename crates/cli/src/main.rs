use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{CachedStore, DataIndex, TimeWindowId, TtlCache, VenueStore};
use engine::{
    CourseAssembler, CourseRequest, CourseResult, EngineConfig, RecommendationOrchestrator,
    RecommendationRequest, RecommendationResult,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::info;

/// Date Courses - venue recommendation and itinerary engine
#[derive(Parser)]
#[command(name = "date-courses")]
#[command(about = "Recommend venues and assemble themed date courses", long_about = None)]
struct Cli {
    /// Directory holding regions.json, time_windows.json and venues.json
    #[arg(short, long, default_value = "data/catalog")]
    data_dir: PathBuf,

    /// JSON engine configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ranked, category-diverse venues for a region
    Recommend {
        #[arg(long)]
        region: String,

        /// Date of the outing (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Comma-separated time window ids, e.g. 1,3,4
        #[arg(long, value_delimiter = ',', required = true)]
        time_windows: Vec<TimeWindowId>,

        /// Number of venues to return
        #[arg(long)]
        limit: Option<usize>,

        /// Category penalty strength
        #[arg(long)]
        diversity: Option<f64>,

        /// Show the score breakdown for each venue
        #[arg(long)]
        explain: bool,
    },

    /// Assemble themed date courses, one stop per time window
    Courses {
        #[arg(long)]
        region: String,

        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long, value_delimiter = ',', required = true)]
        time_windows: Vec<TimeWindowId>,

        /// Theme to try first (romantic, culture, activity, foodie, healing)
        #[arg(long)]
        theme: Option<String>,

        /// Travel budget between stops, in minutes
        #[arg(long)]
        max_travel: Option<u32>,

        /// Seed for reproducible courses
        #[arg(long)]
        seed: Option<u64>,
    },

    /// List regions
    Regions,

    /// List time windows
    TimeWindows,

    /// Run benchmark to test performance
    Benchmark {
        #[arg(long, default_value = "seongsu")]
        region: String,

        #[arg(long, value_delimiter = ',', default_value = "1,3,4")]
        time_windows: Vec<TimeWindowId>,

        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            let config = EngineConfig::from_file(path)?;
            info!(path = %path.display(), "Loaded engine config");
            config
        }
        None => EngineConfig::default(),
    };

    let start = Instant::now();
    let index = DataIndex::load_from_files(&cli.data_dir)
        .with_context(|| format!("Failed to load catalog from {}", cli.data_dir.display()))?;
    if !cli.json {
        let (regions, windows, venues) = index.counts();
        println!(
            "{} Loaded {} venues, {} regions, {} time windows in {:?}",
            "✓".green(),
            venues,
            regions,
            windows,
            start.elapsed()
        );
    }

    let cache = Arc::new(TtlCache::new(config.cache_ttl()));
    let store: Arc<dyn VenueStore> = Arc::new(CachedStore::new(index, cache));
    let orchestrator =
        Arc::new(RecommendationOrchestrator::new(store.clone()).with_config(config));

    match cli.command {
        Commands::Recommend {
            region,
            date,
            time_windows,
            limit,
            diversity,
            explain,
        } => {
            let mut request = RecommendationRequest::new(region, date_or_today(date), time_windows);
            request.max_results = limit;
            request.diversity_weight = diversity;
            handle_recommend(&orchestrator, &request, explain, cli.json).await?
        }
        Commands::Courses {
            region,
            date,
            time_windows,
            theme,
            max_travel,
            seed,
        } => {
            let mut request = CourseRequest::new(region, date_or_today(date), time_windows);
            request.theme = theme;
            request.max_travel_minutes = max_travel;
            handle_courses(orchestrator, &request, seed, cli.json).await?
        }
        Commands::Regions => handle_regions(&*store, cli.json)?,
        Commands::TimeWindows => handle_time_windows(&*store, cli.json)?,
        Commands::Benchmark {
            region,
            time_windows,
            requests,
            concurrent,
        } => handle_benchmark(orchestrator, region, time_windows, requests, concurrent).await?,
    }

    Ok(())
}

fn date_or_today(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| chrono::Local::now().date_naive())
}

/// Handle the 'recommend' command
async fn handle_recommend(
    orchestrator: &RecommendationOrchestrator,
    request: &RecommendationRequest,
    explain: bool,
    json: bool,
) -> Result<()> {
    let result = orchestrator.get_recommendations(request).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_recommendations(&result, explain);
    }
    Ok(())
}

/// Handle the 'courses' command
async fn handle_courses(
    orchestrator: Arc<RecommendationOrchestrator>,
    request: &CourseRequest,
    seed: Option<u64>,
    json: bool,
) -> Result<()> {
    let assembler = CourseAssembler::new(orchestrator);
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let result = assembler.generate_courses(request, &mut rng).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_courses(&result);
    }
    Ok(())
}

/// Handle the 'regions' command
fn handle_regions(store: &dyn VenueStore, json: bool) -> Result<()> {
    let regions = store.fetch_regions()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&regions)?);
        return Ok(());
    }
    println!("{}", "Regions:".bold().blue());
    for region in regions {
        println!("  {} {}", region.id.green(), region.name);
    }
    Ok(())
}

/// Handle the 'time-windows' command
fn handle_time_windows(store: &dyn VenueStore, json: bool) -> Result<()> {
    let windows = store.fetch_time_windows()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&windows)?);
        return Ok(());
    }
    println!("{}", "Time windows:".bold().blue());
    for window in windows {
        println!(
            "  {}. {} {}-{} [{} min]{}",
            window.id.to_string().green(),
            window.name,
            window.start_time.format("%H:%M"),
            window.end_time.format("%H:%M"),
            window.duration_minutes(),
            window
                .description
                .map(|d| format!(" ({})", d))
                .unwrap_or_default()
        );
    }
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    orchestrator: Arc<RecommendationOrchestrator>,
    region: String,
    time_windows: Vec<TimeWindowId>,
    requests: usize,
    concurrent: usize,
) -> Result<()> {
    if requests == 0 {
        bail!("--requests must be at least 1");
    }

    let assembler = Arc::new(CourseAssembler::new(orchestrator));
    let semaphore = Arc::new(Semaphore::new(concurrent.max(1)));
    let date = chrono::Local::now().date_naive();

    let wall_start = Instant::now();
    let mut handles = Vec::with_capacity(requests);
    for i in 0..requests {
        let assembler = Arc::clone(&assembler);
        let semaphore = Arc::clone(&semaphore);
        let request = CourseRequest::new(region.clone(), date, time_windows.clone());

        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await?;
            let mut rng = StdRng::seed_from_u64(i as u64);
            let start = Instant::now();
            assembler.generate_courses(&request, &mut rng).await?;
            Ok::<_, anyhow::Error>(start.elapsed())
        }));
    }

    let mut timings: Vec<Duration> = Vec::with_capacity(requests);
    for handle in handles {
        timings.push(handle.await??);
    }
    let wall_time = wall_start.elapsed();

    timings.sort();
    let total: Duration = timings.iter().sum();
    let avg_latency = total / timings.len() as u32;
    let percentile = |p: f64| timings[((timings.len() as f64 * p) as usize).min(timings.len() - 1)];
    let throughput = requests as f64 / wall_time.as_secs_f64();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {} ({} concurrent)", requests, concurrent.max(1));
    println!("Total time: {:?}", wall_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

fn print_recommendations(result: &RecommendationResult, explain: bool) {
    println!("{}", "Recommended venues:".bold().blue());
    if result.candidates.is_empty() {
        println!("  {}", "Nothing matched this request".yellow());
    }

    for (rank, candidate) in result.candidates.iter().enumerate() {
        let venue = &candidate.venue;
        println!(
            "{}. {} [{}] - Score: {:.1}",
            (rank + 1).to_string().green(),
            venue.name,
            venue.category_name,
            candidate.adjusted_score
        );
        if explain {
            let b = &candidate.breakdown;
            println!(
                "   partnership {:.1} | rating {:.1} | time slot {:.1} | popularity {:.1} | source {:.1} | preference {:.1}",
                b.partnership, b.rating, b.time_slot, b.popularity, b.source, b.preference
            );
            println!(
                "   {} record(s), raw score {:.1}",
                candidate.member_count, candidate.total_score
            );
        }
    }

    let meta = &result.metadata;
    println!(
        "{}",
        format!(
            "{} fetched → {} locations → {} diverse → {} shown in {} ms",
            meta.initial_count,
            meta.after_grouping,
            meta.after_diversity,
            meta.final_count,
            meta.execution_time_ms
        )
        .dimmed()
    );
}

fn print_courses(result: &CourseResult) {
    if result.courses.is_empty() {
        println!("{}", "No courses could be assembled for this request".yellow());
    }

    for course in &result.courses {
        println!(
            "{} {} ({} min, {} m, {:?}, {:?})",
            "◆".magenta(),
            course.name.bold(),
            course.total_duration_minutes,
            course.total_distance_meters,
            course.difficulty,
            course.weather
        );
        println!("  {}", course.description);
        for stop in &course.stops {
            let travel = match (
                stop.distance_from_previous_meters,
                stop.travel_minutes_from_previous,
            ) {
                (Some(distance), Some(minutes)) => format!(" ← {} m, {} min", distance, minutes),
                _ => String::new(),
            };
            println!(
                "  {}. [{}] {} ({}, {} min){}",
                stop.order.to_string().green(),
                stop.time_window.name,
                stop.venue.name,
                stop.venue.category_name,
                stop.dwell_minutes,
                travel.dimmed()
            );
        }
        println!(
            "  Cost {}-{} | Tags: {}",
            course.estimated_cost.min,
            course.estimated_cost.max,
            course.tags.join(", ")
        );
    }

    println!(
        "{}",
        format!(
            "{} courses from {} candidates in {} ms",
            result.courses.len(),
            result.metadata.candidate_pool_size,
            result.metadata.elapsed_ms
        )
        .dimmed()
    );
}
