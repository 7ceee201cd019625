use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use game_core::{ReplayResult, load_journal_from_file, replay_to_end};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the JSONL journal to validate and replay
    #[arg(short, long)]
    journal: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let loaded = load_journal_from_file(&args.journal)
        .with_context(|| format!("failed to load journal {}", args.journal.display()))?;
    tracing::info!(entries = loaded.journal.len(), seed = loaded.journal.seed, "journal loaded");

    let result: ReplayResult = replay_to_end(&loaded.journal).context("replay failed")?;

    println!("Replay complete.");
    println!("Entries: {}", result.entries_applied);
    println!("Final turn: {}", result.final_turn);
    println!("Floor: {}", result.floor_index);
    println!("Outcome: {:?}", result.final_outcome);
    println!("Snapshot hash: {:016x}", result.final_snapshot_hash);

    Ok(())
}
