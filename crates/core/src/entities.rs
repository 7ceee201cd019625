//! Enemies and NPCs that share a level with the hero.

mod enemy;
mod npc;

pub use enemy::{Enemy, EnemyId, EnemyKind, EnemyStats};
pub use npc::{
    HookKind, InteractionHook, InteractionTrigger, MemoryValue, Npc, NpcCapabilities, NpcError,
    NpcInteractionEvent, NpcRecord,
};
