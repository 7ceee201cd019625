use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use strum::{Display, EnumIter, EnumString};

use crate::types::Pos;

new_key_type! {
    pub struct EnemyId;
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
    EnumString, EnumIter,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    Snake,
    Goblin,
    Ghost,
    StoneGoblin,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnemyStats {
    pub max_health: i32,
    pub attack: i32,
    pub poisonous: bool,
    pub can_move: bool,
}

impl EnemyKind {
    pub const fn stats(self) -> EnemyStats {
        match self {
            Self::Snake => EnemyStats { max_health: 2, attack: 1, poisonous: true, can_move: true },
            Self::Goblin => {
                EnemyStats { max_health: 3, attack: 1, poisonous: false, can_move: true }
            }
            Self::Ghost => EnemyStats { max_health: 2, attack: 2, poisonous: false, can_move: true },
            Self::StoneGoblin => {
                EnemyStats { max_health: 5, attack: 2, poisonous: false, can_move: false }
            }
        }
    }

    pub(crate) const fn code(self) -> u8 {
        match self {
            Self::Snake => 1,
            Self::Goblin => 2,
            Self::Ghost => 3,
            Self::StoneGoblin => 4,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub pos: Pos,
    pub health: i32,
    pub max_health: i32,
    /// Story tag matched by NPC defeat hooks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl Enemy {
    pub fn new(kind: EnemyKind, pos: Pos) -> Self {
        let max_health = kind.stats().max_health;
        Self { kind, pos, health: max_health, max_health, tag: None }
    }

    pub fn stats(&self) -> EnemyStats {
        self.kind.stats()
    }

    /// Applies non-negative damage and reports whether the enemy is down.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        self.health = (self.health - amount.max(0)).max(0);
        self.is_defeated()
    }

    pub fn is_defeated(&self) -> bool {
        self.health <= 0
    }
}
