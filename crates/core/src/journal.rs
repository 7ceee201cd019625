use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::game::{Action, AuthoredRoom};
use crate::mapgen::Strategy;

pub const JOURNAL_FORMAT_VERSION: u16 = 1;

/// Where a session's first state came from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionOrigin {
    Generated { strategy: Strategy },
    Room { room: AuthoredRoom },
}

/// Everything a session accepted, in order. Replaying the entries against the
/// same origin reproduces the session exactly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entry", rename_all = "snake_case")]
pub enum JournalEntry {
    Action { action: Action },
    Clock { elapsed_ms: u64 },
    Revive,
    AdvanceFloor,
    EnterRoom { room: AuthoredRoom },
    DrainInteractions,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionJournal {
    pub format_version: u16,
    pub seed: u64,
    pub config: Config,
    pub origin: SessionOrigin,
    pub entries: Vec<JournalEntry>,
}

impl ActionJournal {
    pub fn new(seed: u64, config: Config, origin: SessionOrigin) -> Self {
        Self { format_version: JOURNAL_FORMAT_VERSION, seed, config, origin, entries: Vec::new() }
    }

    pub fn push(&mut self, entry: JournalEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
