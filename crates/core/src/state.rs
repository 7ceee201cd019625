//! The per-level session record mutated by the action resolver.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use slotmap::SlotMap;

use crate::config::RulesConfig;
use crate::entities::{Enemy, EnemyId, Npc, NpcInteractionEvent};
use crate::map::MapData;
use crate::mapgen::GeneratedLevel;
use crate::types::{Direction, Pos, Subtype};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub has_key: bool,
    pub has_exit_key: bool,
    pub has_sword: bool,
    pub has_shield: bool,
    pub rock_count: u32,
    pub food_count: u32,
    pub potion_count: u32,
    pub rune_count: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hero {
    pub health: i32,
    pub max_health: i32,
    pub attack: i32,
    pub torch_lit: bool,
}

impl Hero {
    pub fn from_rules(rules: &RulesConfig) -> Self {
        Self {
            health: rules.hero_max_health,
            max_health: rules.hero_max_health,
            attack: rules.hero_attack,
            torch_lit: true,
        }
    }

    /// Returns the health actually lost.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let before = self.health;
        self.health = (self.health - amount.max(0)).max(0);
        before - self.health
    }

    /// Returns the health actually restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.health;
        self.health = (self.health + amount.max(0)).min(self.max_health);
        self.health - before
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoisonCondition {
    pub active: bool,
    pub steps_since_last_damage: u32,
    pub damage_per_interval: i32,
    pub step_interval: u32,
}

impl PoisonCondition {
    pub fn from_rules(rules: &RulesConfig) -> Self {
        Self {
            active: false,
            steps_since_last_damage: 0,
            damage_per_interval: rules.poison_damage,
            step_interval: rules.poison_step_interval,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conditions {
    pub poisoned: PoisonCondition,
}

/// Lifetime counters. They only ever grow, across revives and floors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub damage_dealt: u32,
    pub damage_taken: u32,
    pub enemies_defeated: u32,
    pub steps: u32,
    pub revives: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckpointSnapshot {
    pub turn: u64,
    pub pos: Pos,
    /// Full copy of the state at the checkpoint, with its own checkpoint cleared.
    pub state: Box<GameState>,
}

/// A room the hero has left, kept so revisits resume where they ended.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub map: MapData,
    pub enemies: SlotMap<EnemyId, Enemy>,
    pub npcs: Vec<Npc>,
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameState {
    pub map: MapData,
    pub player: Pos,
    pub player_direction: Direction,
    pub inventory: Inventory,
    pub hero: Hero,
    pub show_full_map: bool,
    pub full_map_remaining_ms: u64,
    pub win: bool,
    pub conditions: Conditions,
    pub stats: Stats,
    pub enemies: SlotMap<EnemyId, Enemy>,
    pub npcs: Vec<Npc>,
    pub npc_interaction_queue: Vec<NpcInteractionEvent>,
    pub turn: u64,
    pub floor_index: u32,
    pub last_checkpoint: Option<CheckpointSnapshot>,
    pub current_room: String,
    #[serde(default)]
    pub room_metadata: BTreeMap<String, Value>,
    pub rooms: BTreeMap<String, RoomSnapshot>,
    pub pending_room_transition: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StateInvariantError {
    #[error("expected exactly one player marker, found {found}")]
    PlayerMarkerCount { found: usize },
    #[error("player marker at {marker:?} but player recorded at {player:?}")]
    PlayerMismatch { marker: Pos, player: Pos },
    #[error("hero health {health} outside 0..={max_health}")]
    HealthOutOfRange { health: i32, max_health: i32 },
    #[error("enemy at {pos:?} stands on a blocked cell")]
    EnemyBlocked { pos: Pos },
    #[error("enemy shares the player cell {pos:?}")]
    EnemyOnPlayer { pos: Pos },
}

pub fn floor_room_id(floor_index: u32) -> String {
    format!("floor-{floor_index}")
}

impl GameState {
    /// Fresh state for the hero standing on a generated level's start cell.
    pub fn from_level(level: &GeneratedLevel, rules: &RulesConfig) -> Self {
        let mut enemies = SlotMap::with_key();
        for spawn in &level.enemies {
            enemies.insert(Enemy::new(spawn.kind, spawn.pos));
        }
        Self::with_map(level.map.clone(), level.player_start, enemies, Vec::new(), rules)
    }

    pub(crate) fn with_map(
        map: MapData,
        player: Pos,
        enemies: SlotMap<EnemyId, Enemy>,
        npcs: Vec<Npc>,
        rules: &RulesConfig,
    ) -> Self {
        Self {
            map,
            player,
            player_direction: Direction::default(),
            inventory: Inventory::default(),
            hero: Hero::from_rules(rules),
            show_full_map: false,
            full_map_remaining_ms: 0,
            win: false,
            conditions: Conditions { poisoned: PoisonCondition::from_rules(rules) },
            stats: Stats::default(),
            enemies,
            npcs: npcs
                .into_iter()
                .map(|npc| npc.with_memory_capacity(rules.npc_memory_capacity))
                .collect(),
            npc_interaction_queue: Vec::new(),
            turn: 0,
            floor_index: 0,
            last_checkpoint: None,
            current_room: floor_room_id(0),
            room_metadata: BTreeMap::new(),
            rooms: BTreeMap::new(),
            pending_room_transition: None,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.hero.health <= 0
    }

    /// Won or dead: further actions change nothing.
    pub fn is_over(&self) -> bool {
        self.win || self.is_dead()
    }

    pub fn enemy_at(&self, pos: Pos) -> Option<EnemyId> {
        self.enemies.iter().find(|(_, enemy)| enemy.pos == pos).map(|(id, _)| id)
    }

    pub fn npc_index_at(&self, pos: Pos) -> Option<usize> {
        self.npcs.iter().position(|npc| npc.pos == pos)
    }

    pub fn check_invariants(&self) -> Result<(), StateInvariantError> {
        let markers = self.map.positions_with(Subtype::Player);
        if markers.len() != 1 {
            return Err(StateInvariantError::PlayerMarkerCount { found: markers.len() });
        }
        if markers[0] != self.player {
            return Err(StateInvariantError::PlayerMismatch {
                marker: markers[0],
                player: self.player,
            });
        }
        if !(0..=self.hero.max_health).contains(&self.hero.health) {
            return Err(StateInvariantError::HealthOutOfRange {
                health: self.hero.health,
                max_health: self.hero.max_health,
            });
        }
        for enemy in self.enemies.values() {
            if enemy.pos == self.player {
                return Err(StateInvariantError::EnemyOnPlayer { pos: enemy.pos });
            }
            if !self.map.tile(enemy.pos).is_walkable() {
                return Err(StateInvariantError::EnemyBlocked { pos: enemy.pos });
            }
        }
        Ok(())
    }

    /// Moves the player marker along with the recorded position.
    pub(crate) fn relocate_player(&mut self, to: Pos) {
        self.map.remove_subtype(self.player, Subtype::Player);
        self.map.insert_subtype(to, Subtype::Player);
        self.player = to;
    }
}
