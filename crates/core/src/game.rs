//! Session orchestration for one run.
//! This module exists to own the run seed, the shared RNG and the journal of
//! everything the session accepted.
//! It does not own rule semantics; those live in the resolver submodules.

mod action;
mod checkpoint;
mod combat;
mod conditions;
mod hash;
mod interactions;
mod items;
mod movement;
mod projectiles;
mod resolver;
mod rooms;
mod visibility;

#[cfg(test)]
pub(crate) mod test_support;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::entities::NpcInteractionEvent;
use crate::journal::{ActionJournal, JournalEntry, SessionOrigin};
use crate::mapgen::{GenerationError, Strategy, generate_complete_level};
use crate::persistence::compute_map_id;
use crate::rng::{SeededRng, derive_floor_seed};
use crate::state::{GameState, floor_room_id};

pub use action::{Action, GameEvent, Transition};
pub use checkpoint::{create_checkpoint_snapshot, revive_from_last_checkpoint};
pub use conditions::{cancel_full_map_timer, tick_full_map_timer};
pub use hash::state_hash;
pub use interactions::drain_npc_interactions;
pub use resolver::{
    apply_action, move_player, perform_throw_rock, perform_throw_rune, perform_use_food,
    perform_use_potion,
};
pub use rooms::{AuthoredRoom, RoomError, enter_room};
pub use visibility::{FovTier, compute_fov_tiers, fov_tier};

/// Why a journal entry could not be applied to a session.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Room(#[from] RoomError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    InProgress,
    Won,
    Died,
}

impl RunOutcome {
    pub fn of(state: &GameState) -> Self {
        if state.win {
            Self::Won
        } else if state.is_dead() {
            Self::Died
        } else {
            Self::InProgress
        }
    }
}

pub struct Game {
    seed: u64,
    config: Config,
    rng: SeededRng,
    state: GameState,
    log: Vec<GameEvent>,
    journal: ActionJournal,
}

impl Game {
    /// Starts a run on a freshly generated first floor.
    pub fn new(seed: u64, config: Config, strategy: Strategy) -> Result<Self, GenerationError> {
        Self::start(seed, config, SessionOrigin::Generated { strategy })
    }

    /// Starts a run inside a hand-authored room.
    pub fn from_room(seed: u64, config: Config, room: AuthoredRoom) -> Self {
        let state = GameState::from_room(room.clone(), &config.rules);
        let journal = ActionJournal::new(seed, config.clone(), SessionOrigin::Room { room });
        let rng = SeededRng::new(derive_floor_seed(seed, 0));
        Self { seed, config, rng, state, log: Vec::new(), journal }
    }

    pub fn start(
        seed: u64,
        config: Config,
        origin: SessionOrigin,
    ) -> Result<Self, GenerationError> {
        match origin {
            SessionOrigin::Room { room } => Ok(Self::from_room(seed, config, room)),
            SessionOrigin::Generated { strategy } => {
                let mut rng = SeededRng::new(derive_floor_seed(seed, 0));
                let level = generate_complete_level(strategy, &config.generator, &mut rng)?;
                let state = GameState::from_level(&level, &config.rules);
                let journal = ActionJournal::new(
                    seed,
                    config.clone(),
                    SessionOrigin::Generated { strategy },
                );
                let map_id = compute_map_id(&state.map);
                tracing::debug!(seed, %strategy, %map_id, "run started");
                Ok(Self { seed, config, rng, state, log: Vec::new(), journal })
            }
        }
    }

    /// Resolves one action and returns the events it produced.
    pub fn apply(&mut self, action: Action) -> &[GameEvent] {
        let transition = apply_action(&self.state, &action, &self.config.rules, &mut self.rng);
        self.journal.push(JournalEntry::Action { action });
        self.state = transition.state;
        let start = self.log.len();
        self.log.extend(transition.events);
        &self.log[start..]
    }

    /// Feeds wall-clock time to the full-map timer.
    pub fn advance_clock(&mut self, elapsed_ms: u64) {
        tick_full_map_timer(&mut self.state, elapsed_ms);
        self.journal.push(JournalEntry::Clock { elapsed_ms });
    }

    pub fn revive(&mut self) {
        self.state = revive_from_last_checkpoint(&self.state);
        self.journal.push(JournalEntry::Revive);
    }

    /// Generates the next floor. The hero keeps vitals, carried items and
    /// lifetime stats; keys belong to the floor they were found on.
    pub fn advance_floor(&mut self) -> Result<(), GenerationError> {
        let floor_index = self.state.floor_index + 1;
        let mut rng = SeededRng::new(derive_floor_seed(self.seed, floor_index));
        let strategy = self.floor_strategy();
        let level = generate_complete_level(strategy, &self.config.generator, &mut rng)?;

        let mut next = GameState::from_level(&level, &self.config.rules);
        next.hero = self.state.hero;
        next.inventory = self.state.inventory;
        next.inventory.has_key = false;
        next.inventory.has_exit_key = false;
        next.conditions = self.state.conditions;
        next.stats = self.state.stats;
        next.turn = self.state.turn;
        next.floor_index = floor_index;
        next.current_room = floor_room_id(floor_index);

        tracing::debug!(floor_index, attempts = level.report.levels_attempted, "floor advanced");
        self.rng = rng;
        self.state = next;
        self.journal.push(JournalEntry::AdvanceFloor);
        Ok(())
    }

    /// Moves into `room`. A refused room leaves the session and journal as
    /// they were.
    pub fn enter_room(&mut self, room: AuthoredRoom) -> Result<(), RoomError> {
        self.state = enter_room(&self.state, room.clone(), &self.config.rules)?;
        self.journal.push(JournalEntry::EnterRoom { room });
        Ok(())
    }

    pub fn drain_npc_interactions(&mut self) -> Vec<NpcInteractionEvent> {
        self.journal.push(JournalEntry::DrainInteractions);
        drain_npc_interactions(&mut self.state)
    }

    /// Replays one journal entry. Used by replay; live sessions call the
    /// dedicated methods.
    pub fn apply_entry(&mut self, entry: JournalEntry) -> Result<(), SessionError> {
        match entry {
            JournalEntry::Action { action } => {
                self.apply(action);
            }
            JournalEntry::Clock { elapsed_ms } => self.advance_clock(elapsed_ms),
            JournalEntry::Revive => self.revive(),
            JournalEntry::AdvanceFloor => self.advance_floor()?,
            JournalEntry::EnterRoom { room } => self.enter_room(room)?,
            JournalEntry::DrainInteractions => {
                self.drain_npc_interactions();
            }
        }
        Ok(())
    }

    fn floor_strategy(&self) -> Strategy {
        match &self.journal.origin {
            SessionOrigin::Generated { strategy } => *strategy,
            SessionOrigin::Room { .. } => Strategy::default(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn log(&self) -> &[GameEvent] {
        &self.log
    }

    pub fn journal(&self) -> &ActionJournal {
        &self.journal
    }

    pub fn current_turn(&self) -> u64 {
        self.state.turn
    }

    pub fn outcome(&self) -> RunOutcome {
        RunOutcome::of(&self.state)
    }

    pub fn snapshot_hash(&self) -> u64 {
        state_hash(&self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Direction, Subtype};

    fn new_game(seed: u64) -> Game {
        Game::new(seed, Config::default(), Strategy::Default).expect("default config generates")
    }

    #[test]
    fn same_seed_same_first_floor() {
        let a = new_game(31);
        let b = new_game(31);
        assert_eq!(a.snapshot_hash(), b.snapshot_hash());
        assert_eq!(a.state().map, b.state().map);
        assert_eq!(a.outcome(), RunOutcome::InProgress);
    }

    #[test]
    fn every_accepted_input_is_journaled() {
        let mut game = new_game(5);
        game.apply(Action::Move(Direction::Up));
        game.apply(Action::ToggleTorch);
        game.advance_clock(100);
        game.drain_npc_interactions();
        game.revive();
        assert_eq!(game.journal().len(), 5);
        assert!(matches!(game.journal().entries[0], JournalEntry::Action { .. }));
        assert_eq!(game.journal().entries[4], JournalEntry::Revive);
    }

    #[test]
    fn advancing_a_floor_keeps_the_hero_but_not_the_keys() {
        let mut game = new_game(8);
        game.state.inventory.has_key = true;
        game.state.inventory.rock_count = 4;
        game.state.stats.steps = 12;
        game.state.hero.health -= 3;
        let health = game.state.hero.health;

        game.advance_floor().expect("second floor generates");
        let state = game.state();
        assert_eq!(state.floor_index, 1);
        assert_eq!(state.current_room, "floor-1");
        assert!(!state.inventory.has_key);
        assert_eq!(state.inventory.rock_count, 4);
        assert_eq!(state.stats.steps, 12);
        assert_eq!(state.hero.health, health);
        assert_eq!(state.map.count_subtype(Subtype::Player), 1);
        assert_eq!(state.check_invariants(), Ok(()));
    }

    #[test]
    fn apply_returns_only_the_new_events() {
        let mut game = new_game(77);
        let first = game.apply(Action::ToggleTorch).to_vec();
        assert_eq!(first, vec![GameEvent::TorchToggled { lit: false }]);
        let second = game.apply(Action::ToggleTorch).to_vec();
        assert_eq!(second, vec![GameEvent::TorchToggled { lit: true }]);
        assert_eq!(game.log().len(), 2);
    }
}
