use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use game_core::{Action, Config, Direction, Game, RunOutcome, Strategy, save_journal};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use tracing_subscriber::EnvFilter;

const ACTIONS: [Action; 11] = [
    Action::Move(Direction::Up),
    Action::Move(Direction::Down),
    Action::Move(Direction::Left),
    Action::Move(Direction::Right),
    Action::Move(Direction::Up),
    Action::Move(Direction::Right),
    Action::UseFood,
    Action::UsePotion,
    Action::ThrowRock,
    Action::ThrowRune,
    Action::ToggleTorch,
];

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 1000)]
    actions: u32,
    #[arg(long, default_value_t = Strategy::Default)]
    strategy: Strategy,
    /// TOML file overriding generator and rules defaults
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Write the session journal here when the run ends
    #[arg(long)]
    journal_out: Option<PathBuf>,
}

fn choose<T: Copy>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p]
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    println!("Starting fuzz harness on seed {} for {} actions...", args.seed, args.actions);
    let config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    let mut game = Game::new(args.seed, config, args.strategy)?;
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut deaths = 0_u32;

    for step in 0..args.actions {
        game.apply(choose(&mut rng, &ACTIONS));
        if rng.next_u64() % 16 == 0 {
            game.advance_clock(500);
        }

        match game.outcome() {
            RunOutcome::Won => game.advance_floor()?,
            RunOutcome::Died => {
                deaths += 1;
                game.revive();
                if game.outcome() == RunOutcome::Died {
                    println!("Died without a checkpoint after {step} actions");
                    break;
                }
            }
            RunOutcome::InProgress => {}
        }
        game.drain_npc_interactions();

        if let Err(err) = game.state().check_invariants() {
            bail!("invariant broken after action {step}: {err}");
        }
    }

    let state = game.state();
    println!(
        "Fuzzing completed: turn {}, floor {}, deaths {}, enemies defeated {}, hash {:016x}",
        state.turn,
        state.floor_index,
        deaths,
        state.stats.enemies_defeated,
        game.snapshot_hash()
    );
    if let Some(path) = &args.journal_out {
        save_journal(path, game.journal())?;
        println!("Journal written to {}", path.display());
    }
    Ok(())
}
