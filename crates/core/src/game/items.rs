//! Consumables and bump interactions with pots and chests.
//! This module exists to keep inventory effects apart from movement rules.
//! It does not own projectile flight or enemy damage.

use crate::types::{Pos, Subtype};

use super::action::GameEvent;
use super::resolver::{Resolver, Turn};

const CHEST_CONTENTS: [Subtype; 2] = [Subtype::Sword, Subtype::Shield];

impl Resolver<'_> {
    pub(super) fn use_food(&mut self) -> Turn {
        if self.state.inventory.food_count == 0 {
            self.emit(GameEvent::NothingToUse { item: Subtype::Food });
            return Turn::Free;
        }
        self.state.inventory.food_count -= 1;
        let amount = self.state.hero.heal(self.rules.food_heal);
        self.emit(GameEvent::Healed { item: Subtype::Food, amount });
        Turn::Taken
    }

    /// Cures poison and heals.
    pub(super) fn use_potion(&mut self) -> Turn {
        if self.state.inventory.potion_count == 0 {
            self.emit(GameEvent::NothingToUse { item: Subtype::Med });
            return Turn::Free;
        }
        self.state.inventory.potion_count -= 1;
        let poison = &mut self.state.conditions.poisoned;
        let was_poisoned = poison.active;
        poison.active = false;
        poison.steps_since_last_damage = 0;
        if was_poisoned {
            self.emit(GameEvent::PoisonCured);
        }
        let amount = self.state.hero.heal(self.rules.potion_heal);
        self.emit(GameEvent::Healed { item: Subtype::Med, amount });
        Turn::Taken
    }

    /// A low roll smashes the pot and leaves medicine for a poisoned hero,
    /// food otherwise.
    pub(super) fn bump_pot(&mut self, pos: Pos) {
        let roll = self.rng.next_unit();
        if roll >= self.rules.pot_reveal_threshold {
            self.emit(GameEvent::PotHeld { pos });
            return;
        }
        let reveal =
            if self.state.conditions.poisoned.active { Subtype::Med } else { Subtype::Food };
        self.state.map.remove_subtype(pos, Subtype::Pot);
        self.state.map.insert_subtype(pos, reveal);
        self.emit(GameEvent::PotBroken { pos, reveal });
    }

    pub(super) fn bump_chest(&mut self, pos: Pos) -> Turn {
        let map = &mut self.state.map;
        if map.has(pos, Subtype::Lock) && !self.state.inventory.has_key {
            self.emit(GameEvent::ChestLocked { pos });
            return Turn::Free;
        }
        let content = CHEST_CONTENTS.into_iter().find(|item| map.has(pos, *item));
        for marker in [Subtype::Chest, Subtype::Lock, Subtype::Sword, Subtype::Shield] {
            map.remove_subtype(pos, marker);
        }
        map.insert_subtype(pos, Subtype::OpenChest);
        match content {
            Some(Subtype::Sword) => self.grant_sword(),
            Some(Subtype::Shield) => self.state.inventory.has_shield = true,
            _ => {}
        }
        self.emit(GameEvent::ChestOpened { pos, content });
        Turn::Taken
    }
}
