use crate::game::{Game, RoomError, RunOutcome, SessionError};
use crate::journal::{ActionJournal, JOURNAL_FORMAT_VERSION};
use crate::mapgen::GenerationError;

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ReplayError {
    #[error("unsupported journal version {found}")]
    UnsupportedVersion { found: u16 },
    #[error("invalid journal config: {0}")]
    InvalidConfig(String),
    #[error("level generation failed during replay at entry {entry:?}")]
    Generation {
        entry: Option<usize>,
        #[source]
        source: GenerationError,
    },
    #[error("room entry {entry} could not be replayed")]
    Room {
        entry: usize,
        #[source]
        source: RoomError,
    },
}

#[derive(Debug, PartialEq)]
pub struct ReplayResult {
    pub final_outcome: RunOutcome,
    pub final_snapshot_hash: u64,
    pub final_turn: u64,
    pub floor_index: u32,
    pub entries_applied: usize,
}

/// Rebuilds the session a journal describes and feeds it every entry. The
/// journal carries its own seed, config and origin.
pub fn replay_to_end(journal: &ActionJournal) -> Result<ReplayResult, ReplayError> {
    if journal.format_version != JOURNAL_FORMAT_VERSION {
        return Err(ReplayError::UnsupportedVersion { found: journal.format_version });
    }
    journal.config.validate().map_err(|err| ReplayError::InvalidConfig(err.to_string()))?;

    let mut game = Game::start(journal.seed, journal.config.clone(), journal.origin.clone())
        .map_err(|source| ReplayError::Generation { entry: None, source })?;

    for (index, entry) in journal.entries.iter().enumerate() {
        game.apply_entry(entry.clone()).map_err(|error| match error {
            SessionError::Generation(source) => {
                ReplayError::Generation { entry: Some(index), source }
            }
            SessionError::Room(source) => ReplayError::Room { entry: index, source },
        })?;
    }

    tracing::debug!(
        entries = journal.len(),
        turn = game.current_turn(),
        hash = game.snapshot_hash(),
        "replay finished"
    );
    Ok(ReplayResult {
        final_outcome: game.outcome(),
        final_snapshot_hash: game.snapshot_hash(),
        final_turn: game.current_turn(),
        floor_index: game.state().floor_index,
        entries_applied: journal.len(),
    })
}
