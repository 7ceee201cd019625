pub mod config;
pub mod entities;
pub mod game;
pub mod journal;
pub mod journal_file;
pub mod map;
pub mod mapgen;
pub mod persistence;
pub mod replay;
pub mod rng;
pub mod state;
pub mod types;

pub use config::{Config, ConfigError, GeneratorConfig, RulesConfig};
pub use entities::{Enemy, EnemyId, EnemyKind, Npc, NpcInteractionEvent};
pub use game::{
    Action, AuthoredRoom, FovTier, Game, GameEvent, RoomError, RunOutcome, SessionError, Transition,
};
pub use journal::{ActionJournal, JournalEntry, SessionOrigin};
pub use journal_file::{JournalLoadError, JournalWriter, load_journal_from_file, save_journal};
pub use map::{MapData, RoomLink};
pub use mapgen::{GeneratedLevel, GenerationError, MapGenerator, PlacementError, Strategy};
pub use persistence::{SnapshotError, compute_map_id};
pub use replay::{ReplayError, ReplayResult, replay_to_end};
pub use rng::{GameRng, ScriptedRng, SeededRng};
pub use state::GameState;
pub use types::{Direction, Grid, MapShapeError, Pos, Subtype, SubtypeSet, TileType};
