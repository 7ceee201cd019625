use serde::{Deserialize, Serialize};

use crate::entities::{EnemyId, EnemyKind};
use crate::state::GameState;
use crate::types::{Direction, Pos, Subtype};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Move(Direction),
    UseFood,
    UsePotion,
    ThrowRock,
    ThrowRune,
    Interact,
    ToggleTorch,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    Moved { from: Pos, to: Pos },
    Blocked { target: Pos },
    DoorOpened { pos: Pos },
    LockOpened { pos: Pos },
    ExitReached { pos: Pos },
    PickedUp { item: Subtype, pos: Pos },
    FullMapToggled { on: bool },
    CheckpointReached { pos: Pos },
    RoomTransitionPending { room: String },
    FloorCollapsed { pos: Pos },
    PotBroken { pos: Pos, reveal: Subtype },
    PotHeld { pos: Pos },
    ChestOpened { pos: Pos, content: Option<Subtype> },
    ChestLocked { pos: Pos },
    EnemyHit { id: EnemyId, kind: EnemyKind, damage: i32, remaining: i32 },
    EnemyDefeated { id: EnemyId, kind: EnemyKind, hooks_fired: Vec<String> },
    EnemyMoved { id: EnemyId, from: Pos, to: Pos },
    HeroHit { by: EnemyKind, damage: i32 },
    Poisoned,
    PoisonDamage { damage: i32 },
    PoisonCured,
    Healed { item: Subtype, amount: i32 },
    NothingToUse { item: Subtype },
    ProjectileLanded { item: Subtype, pos: Pos },
    ProjectileHit { item: Subtype, pos: Pos, id: EnemyId },
    ProjectileCancelled { item: Subtype, pos: Pos },
    NpcInteraction { npc_id: String },
    NothingToInteract,
    TorchToggled { lit: bool },
    HeroDied,
}

/// Result of resolving one action: the next state plus what happened on the way.
#[derive(Clone, Debug)]
pub struct Transition {
    pub state: GameState,
    pub events: Vec<GameEvent>,
}
