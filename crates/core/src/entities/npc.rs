//! Non-hostile characters with bounded memory and interaction hooks.
//!
//! The engine never touches NPC memory or vitals directly; it goes through
//! [`Npc::set_memory`], [`Npc::take_damage`], [`Npc::heal`] and
//! [`Npc::record_enemy_defeated`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

use crate::types::{Direction, Pos};

use super::EnemyKind;

pub const DEFAULT_MEMORY_CAPACITY: usize = 32;
const DEFAULT_NPC_HEALTH: i32 = 10;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum NpcError {
    #[error("npc memory is full ({capacity} entries)")]
    MemoryFull { capacity: usize },
    #[error("npc memory keys must not be empty")]
    EmptyMemoryKey,
    #[error("npc record holds {entries} memory entries, capacity is {capacity}")]
    RecordMemoryTooLarge { entries: usize, capacity: usize },
    #[error("npc record has max health {max_health}")]
    InvalidMaxHealth { max_health: i32 },
}

/// Scalar memory value. Nested structures are not representable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MemoryValue {
    Null,
    Flag(bool),
    Number(f64),
    Text(String),
}

impl From<bool> for MemoryValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<f64> for MemoryValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for MemoryValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for MemoryValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum HookKind {
    Dialogue,
    EnemyDefeated,
    Quest,
    Custom,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InteractionHook {
    pub id: String,
    pub kind: HookKind,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub payload: Value,
}

impl InteractionHook {
    pub fn new(id: impl Into<String>, kind: HookKind) -> Self {
        Self { id: id.into(), kind, description: String::new(), payload: Value::Null }
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    /// Defeat hooks name their target under `payload.enemy`, either a story tag
    /// or an enemy kind. A hook without a target matches every defeat.
    fn matches_defeat(&self, kind: EnemyKind, tag: Option<&str>) -> bool {
        if self.kind != HookKind::EnemyDefeated {
            return false;
        }
        match self.payload.get("enemy").and_then(Value::as_str) {
            None => true,
            Some(target) => Some(target) == tag || target == kind.to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NpcCapabilities {
    pub can_move: bool,
    pub can_talk: bool,
}

impl Default for NpcCapabilities {
    fn default() -> Self {
        Self { can_move: false, can_talk: true }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum InteractionTrigger {
    Bump,
    Interact,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NpcInteractionEvent {
    pub npc_id: String,
    pub npc_name: String,
    pub hook_id: Option<String>,
    pub available_hooks: Vec<String>,
    pub trigger: InteractionTrigger,
    /// Logical turn the interaction was queued on.
    pub timestamp: u64,
    pub memory: BTreeMap<String, MemoryValue>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(into = "NpcRecord", try_from = "NpcRecord")]
pub struct Npc {
    pub id: String,
    pub name: String,
    pub pos: Pos,
    pub facing: Direction,
    pub capabilities: NpcCapabilities,
    pub hooks: Vec<InteractionHook>,
    pub tags: Vec<String>,
    pub actions: Vec<String>,
    pub metadata: BTreeMap<String, Value>,
    health: i32,
    max_health: i32,
    memory: BTreeMap<String, MemoryValue>,
    memory_capacity: usize,
}

/// Plain serialisable form of an [`Npc`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NpcRecord {
    pub id: String,
    pub name: String,
    pub pos: Pos,
    #[serde(default)]
    pub facing: Direction,
    #[serde(default)]
    pub capabilities: NpcCapabilities,
    pub health: i32,
    pub max_health: i32,
    #[serde(default)]
    pub memory: BTreeMap<String, MemoryValue>,
    #[serde(default = "default_memory_capacity")]
    pub memory_capacity: usize,
    #[serde(default)]
    pub hooks: Vec<InteractionHook>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub actions: Vec<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
}

fn default_memory_capacity() -> usize {
    DEFAULT_MEMORY_CAPACITY
}

impl Npc {
    pub fn new(id: impl Into<String>, name: impl Into<String>, pos: Pos) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            pos,
            facing: Direction::default(),
            capabilities: NpcCapabilities::default(),
            hooks: Vec::new(),
            tags: Vec::new(),
            actions: Vec::new(),
            metadata: BTreeMap::new(),
            health: DEFAULT_NPC_HEALTH,
            max_health: DEFAULT_NPC_HEALTH,
            memory: BTreeMap::new(),
            memory_capacity: DEFAULT_MEMORY_CAPACITY,
        }
    }

    pub fn with_hook(mut self, hook: InteractionHook) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn with_memory_capacity(mut self, capacity: usize) -> Self {
        self.memory_capacity = capacity;
        self
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn max_health(&self) -> i32 {
        self.max_health
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn take_damage(&mut self, amount: i32) -> i32 {
        self.health = (self.health - amount.max(0)).clamp(0, self.max_health);
        self.health
    }

    pub fn heal(&mut self, amount: i32) -> i32 {
        self.health = (self.health + amount.max(0)).clamp(0, self.max_health);
        self.health
    }

    pub fn memory(&self) -> &BTreeMap<String, MemoryValue> {
        &self.memory
    }

    pub fn recall(&self, key: &str) -> Option<&MemoryValue> {
        self.memory.get(key)
    }

    /// Stores a value, returning the previous one. New keys are refused once
    /// the memory is at capacity; overwriting an existing key always succeeds.
    pub fn set_memory(
        &mut self,
        key: impl Into<String>,
        value: impl Into<MemoryValue>,
    ) -> Result<Option<MemoryValue>, NpcError> {
        let key = key.into();
        if key.is_empty() {
            return Err(NpcError::EmptyMemoryKey);
        }
        if !self.memory.contains_key(&key) && self.memory.len() >= self.memory_capacity {
            return Err(NpcError::MemoryFull { capacity: self.memory_capacity });
        }
        Ok(self.memory.insert(key, value.into()))
    }

    /// Bumps the counter stored under each matching defeat hook id and returns
    /// the ids that fired.
    pub fn record_enemy_defeated(&mut self, kind: EnemyKind, tag: Option<&str>) -> Vec<String> {
        let matching: Vec<String> = self
            .hooks
            .iter()
            .filter(|hook| hook.matches_defeat(kind, tag))
            .map(|hook| hook.id.clone())
            .collect();
        for hook_id in &matching {
            let count = match self.memory.get(hook_id) {
                Some(MemoryValue::Number(count)) => count + 1.0,
                _ => 1.0,
            };
            if let Err(err) = self.set_memory(hook_id.clone(), count) {
                tracing::warn!(npc = %self.id, hook = %hook_id, %err, "defeat hook not recorded");
            }
        }
        matching
    }

    /// First dialogue hook, falling back to the first hook of any kind.
    pub fn resolve_hook(&self) -> Option<&InteractionHook> {
        self.hooks
            .iter()
            .find(|hook| hook.kind == HookKind::Dialogue)
            .or_else(|| self.hooks.first())
    }

    pub fn interaction_event(&self, trigger: InteractionTrigger, turn: u64) -> NpcInteractionEvent {
        NpcInteractionEvent {
            npc_id: self.id.clone(),
            npc_name: self.name.clone(),
            hook_id: self.resolve_hook().map(|hook| hook.id.clone()),
            available_hooks: self.hooks.iter().map(|hook| hook.id.clone()).collect(),
            trigger,
            timestamp: turn,
            memory: self.memory.clone(),
        }
    }

    pub fn to_plain(&self) -> NpcRecord {
        NpcRecord::from(self.clone())
    }

    pub fn from_plain(record: NpcRecord) -> Result<Self, NpcError> {
        Self::try_from(record)
    }
}

impl From<Npc> for NpcRecord {
    fn from(npc: Npc) -> Self {
        Self {
            id: npc.id,
            name: npc.name,
            pos: npc.pos,
            facing: npc.facing,
            capabilities: npc.capabilities,
            health: npc.health,
            max_health: npc.max_health,
            memory: npc.memory,
            memory_capacity: npc.memory_capacity,
            hooks: npc.hooks,
            tags: npc.tags,
            actions: npc.actions,
            metadata: npc.metadata,
        }
    }
}

impl TryFrom<NpcRecord> for Npc {
    type Error = NpcError;

    fn try_from(record: NpcRecord) -> Result<Self, Self::Error> {
        if record.max_health <= 0 {
            return Err(NpcError::InvalidMaxHealth { max_health: record.max_health });
        }
        if record.memory.len() > record.memory_capacity {
            return Err(NpcError::RecordMemoryTooLarge {
                entries: record.memory.len(),
                capacity: record.memory_capacity,
            });
        }
        Ok(Self {
            id: record.id,
            name: record.name,
            pos: record.pos,
            facing: record.facing,
            capabilities: record.capabilities,
            hooks: record.hooks,
            tags: record.tags,
            actions: record.actions,
            metadata: record.metadata,
            health: record.health.clamp(0, record.max_health),
            max_health: record.max_health,
            memory: record.memory,
            memory_capacity: record.memory_capacity,
        })
    }
}
