//! Poison and the full-map timer.

use crate::state::GameState;

use super::action::GameEvent;
use super::resolver::Resolver;

impl Resolver<'_> {
    /// Counts one successful step against an active poison.
    pub(super) fn tick_poison(&mut self) {
        let poison = &mut self.state.conditions.poisoned;
        if !poison.active {
            return;
        }
        poison.steps_since_last_damage += 1;
        if poison.steps_since_last_damage < poison.step_interval {
            return;
        }
        poison.steps_since_last_damage = 0;
        let damage = poison.damage_per_interval;
        let lost = self.state.hero.take_damage(damage);
        self.state.stats.damage_taken += lost.unsigned_abs();
        self.emit(GameEvent::PoisonDamage { damage: lost });
    }

    pub(super) fn apply_poison(&mut self) {
        let poison = &mut self.state.conditions.poisoned;
        if !poison.active {
            poison.active = true;
            poison.steps_since_last_damage = 0;
            self.emit(GameEvent::Poisoned);
        }
    }

    pub(super) fn cancel_full_map(&mut self) {
        cancel_full_map_timer(&mut self.state);
    }
}

/// Counts the full-map reveal down and hides the map once it runs out.
pub fn tick_full_map_timer(state: &mut GameState, elapsed_ms: u64) {
    if !state.show_full_map {
        return;
    }
    state.full_map_remaining_ms = state.full_map_remaining_ms.saturating_sub(elapsed_ms);
    if state.full_map_remaining_ms == 0 {
        state.show_full_map = false;
        tracing::trace!(turn = state.turn, "full map expired");
    }
}

pub fn cancel_full_map_timer(state: &mut GameState) {
    state.show_full_map = false;
    state.full_map_remaining_ms = 0;
}
