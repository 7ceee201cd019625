//! Checkpoint capture and revival.

use crate::state::{CheckpointSnapshot, GameState};

/// Copies the state as it stands now. The copy drops its own checkpoint so
/// snapshots never nest.
pub fn create_checkpoint_snapshot(state: &GameState) -> CheckpointSnapshot {
    let mut copy = state.clone();
    copy.last_checkpoint = None;
    copy.npc_interaction_queue.clear();
    CheckpointSnapshot { turn: state.turn, pos: state.player, state: Box::new(copy) }
}

/// Restores the last checkpoint with full health and no poison. Lifetime
/// stats and the turn counter carry over from the fallen state. Without a
/// checkpoint the state comes back unchanged.
pub fn revive_from_last_checkpoint(state: &GameState) -> GameState {
    let Some(checkpoint) = &state.last_checkpoint else {
        return state.clone();
    };
    let mut revived = (*checkpoint.state).clone();
    revived.stats = state.stats;
    revived.stats.revives += 1;
    revived.turn = state.turn;
    revived.hero.health = revived.hero.max_health;
    revived.conditions.poisoned.active = false;
    revived.conditions.poisoned.steps_since_last_damage = 0;
    revived.last_checkpoint = Some(checkpoint.clone());
    tracing::debug!(turn = state.turn, pos = ?checkpoint.pos, "revived at checkpoint");
    revived
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::resolver::move_player;
    use crate::game::test_support::{rules, state_from};
    use crate::rng::SeededRng;
    use crate::types::{Direction, Pos, Subtype};

    #[test]
    fn stepping_on_a_checkpoint_records_it() {
        let state = state_from("######\n#@c..#\n######");
        let next = move_player(&state, Direction::Right, &rules(), &mut SeededRng::new(0));
        let checkpoint = next.last_checkpoint.as_ref().expect("checkpoint recorded");
        assert_eq!(checkpoint.pos, Pos::new(1, 2));
        assert_eq!(checkpoint.state.player, Pos::new(1, 2));
        assert!(checkpoint.state.last_checkpoint.is_none());
        assert!(next.map.has(Pos::new(1, 2), Subtype::Checkpoint));
    }

    #[test]
    fn revive_restores_position_and_keeps_stats_monotonic() {
        let state = state_from("######\n#@c.x#\n######");
        let mut rng = SeededRng::new(0);
        let mut next = move_player(&state, Direction::Right, &rules(), &mut rng);
        next.inventory.rock_count = 3;
        next = move_player(&next, Direction::Right, &rules(), &mut rng);
        next = move_player(&next, Direction::Right, &rules(), &mut rng);
        assert!(next.is_dead());

        let revived = revive_from_last_checkpoint(&next);
        assert_eq!(revived.player, Pos::new(1, 2));
        assert_eq!(revived.hero.health, revived.hero.max_health);
        assert_eq!(revived.inventory.rock_count, 0, "inventory returns to the snapshot");
        assert_eq!(revived.stats.steps, next.stats.steps);
        assert_eq!(revived.stats.revives, 1);
        assert_eq!(revived.turn, next.turn);
        assert!(revived.last_checkpoint.is_some());
        assert_eq!(revived.check_invariants(), Ok(()));
    }

    #[test]
    fn revive_without_checkpoint_is_identity() {
        let mut state = state_from("####\n#@.#\n####");
        state.hero.health = 0;
        let revived = revive_from_last_checkpoint(&state);
        assert_eq!(revived.hero.health, 0);
        assert_eq!(revived.stats, state.stats);
    }
}
