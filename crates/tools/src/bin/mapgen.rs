use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use game_core::mapgen::generate_complete_level;
use game_core::rng::generate_runtime_seed;
use game_core::{Config, SeededRng, Strategy, compute_map_id};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Generate one dungeon level and print it")]
struct Args {
    /// Level seed; a fresh runtime seed when omitted
    #[arg(short, long)]
    seed: Option<u64>,
    #[arg(long, default_value_t = Strategy::Default)]
    strategy: Strategy,
    /// TOML file overriding generator and rules defaults
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Print the whole level as JSON instead of ASCII
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    let seed = args.seed.unwrap_or_else(generate_runtime_seed);
    let level = generate_complete_level(args.strategy, &config.generator, &mut SeededRng::new(seed))
        .with_context(|| format!("seed {seed} produced no level"))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&level)?);
        return Ok(());
    }

    print!("{}", level.map.to_ascii());
    let report = &level.report;
    println!();
    println!("Seed: {seed}");
    println!("Map id: {}", compute_map_id(&level.map));
    println!(
        "Strategy: {} (base attempts {}, level attempts {})",
        report.base.strategy, report.base.attempts, report.levels_attempted
    );
    println!(
        "Floor ratio: {:.3}, rooms: {}",
        report.base.floor_ratio, report.base.room_count
    );
    println!("Exit key distance: {}", report.placement.exit_key_distance);
    println!("Locked chests: {}", report.placement.locked_chests);
    println!("Faulty floors: {}", report.placement.faulty_floors);
    println!(
        "Enemies: {} (snakes turned to pots: {})",
        level.enemies.len(),
        report.placement.converted_snakes
    );
    if !report.placement.omitted.is_empty() {
        println!("Omitted: {}", report.placement.omitted.join(", "));
    }
    Ok(())
}
