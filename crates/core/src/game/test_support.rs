//! Shared test fixtures for the `game` submodule test suites.
//! This module exists to avoid repeating map and state setup across many tests.
//! It does not own production gameplay logic.

use slotmap::SlotMap;

use crate::config::RulesConfig;
use crate::entities::{Enemy, EnemyId, EnemyKind};
use crate::map::MapData;
use crate::state::GameState;
use crate::types::{Pos, Subtype};

pub(crate) fn rules() -> RulesConfig {
    RulesConfig::default()
}

/// State over an ASCII fixture; the `@` glyph marks the hero.
pub(crate) fn state_from(ascii: &str) -> GameState {
    let map = MapData::from_ascii(ascii).expect("fixture should parse");
    let player = map.find_first(Subtype::Player).expect("fixture should contain @");
    GameState::with_map(map, player, SlotMap::with_key(), Vec::new(), &rules())
}

pub(crate) fn spawn_enemy(state: &mut GameState, kind: EnemyKind, pos: Pos) -> EnemyId {
    state.enemies.insert(Enemy::new(kind, pos))
}
