//! Stepping, wall semantics and everything that happens on arrival.

use crate::entities::InteractionTrigger;
use crate::types::{Direction, Pos, Subtype, TileType};

use super::action::GameEvent;
use super::checkpoint::create_checkpoint_snapshot;
use super::resolver::{Resolver, Turn};

/// Markers collected by stepping onto them.
const PICKUPS: [Subtype; 8] = [
    Subtype::Key,
    Subtype::ExitKey,
    Subtype::Rock,
    Subtype::Food,
    Subtype::Med,
    Subtype::Rune,
    Subtype::Sword,
    Subtype::Shield,
];

impl Resolver<'_> {
    pub(super) fn move_player(&mut self, direction: Direction) -> Turn {
        self.state.player_direction = direction;
        let target = self.state.player.step(direction);
        if !self.state.map.in_bounds(target) {
            self.emit(GameEvent::Blocked { target });
            return Turn::Free;
        }
        if let Some(id) = self.state.enemy_at(target) {
            let damage = self.state.hero.attack;
            self.strike_enemy(id, damage);
            return Turn::Taken;
        }
        if let Some(index) = self.state.npc_index_at(target) {
            self.queue_npc_interaction(index, InteractionTrigger::Bump);
            return Turn::Free;
        }

        let subtypes = self.state.map.subtypes_at(target);
        if subtypes.contains(Subtype::Pot) {
            self.bump_pot(target);
            return Turn::Taken;
        }
        if subtypes.contains(Subtype::Chest) {
            return self.bump_chest(target);
        }

        match self.state.map.tile(target) {
            TileType::Wall => {
                if !self.open_wall(target) {
                    self.emit(GameEvent::Blocked { target });
                    return Turn::Free;
                }
            }
            tile if !tile.is_walkable() => {
                self.emit(GameEvent::Blocked { target });
                return Turn::Free;
            }
            _ => {}
        }
        self.step_to(target);
        Turn::Taken
    }

    /// Doors always give way, locks need the key, the exit needs the exit key.
    fn open_wall(&mut self, target: Pos) -> bool {
        let map = &mut self.state.map;
        if map.has(target, Subtype::Door) {
            map.set_tile(target, TileType::Floor);
            self.emit(GameEvent::DoorOpened { pos: target });
        } else if map.has(target, Subtype::Lock) && self.state.inventory.has_key {
            map.set_tile(target, TileType::Floor);
            map.remove_subtype(target, Subtype::Lock);
            self.emit(GameEvent::LockOpened { pos: target });
        } else if map.has(target, Subtype::Exit) && self.state.inventory.has_exit_key {
            map.set_tile(target, TileType::Floor);
            self.state.inventory.has_exit_key = false;
            self.state.win = true;
            self.emit(GameEvent::ExitReached { pos: target });
        } else {
            return false;
        }
        true
    }

    fn step_to(&mut self, target: Pos) {
        let from = self.state.player;
        self.state.relocate_player(target);
        self.state.stats.steps += 1;
        self.emit(GameEvent::Moved { from, to: target });
        self.collect_pickups(target);
        self.trigger_floor_features(target);
        self.tick_poison();
    }

    fn collect_pickups(&mut self, pos: Pos) {
        for item in PICKUPS {
            if !self.state.map.remove_subtype(pos, item) {
                continue;
            }
            let inventory = &mut self.state.inventory;
            match item {
                Subtype::Key => inventory.has_key = true,
                Subtype::ExitKey => inventory.has_exit_key = true,
                Subtype::Rock => inventory.rock_count += 1,
                Subtype::Food => inventory.food_count += 1,
                Subtype::Med => inventory.potion_count += 1,
                Subtype::Rune => inventory.rune_count += 1,
                Subtype::Shield => inventory.has_shield = true,
                Subtype::Sword => self.grant_sword(),
                _ => {}
            }
            self.emit(GameEvent::PickedUp { item, pos });
        }
    }

    pub(super) fn grant_sword(&mut self) {
        if !self.state.inventory.has_sword {
            self.state.inventory.has_sword = true;
            self.state.hero.attack += self.rules.sword_attack_bonus;
        }
    }

    fn trigger_floor_features(&mut self, pos: Pos) {
        let subtypes = self.state.map.subtypes_at(pos);
        if subtypes.contains(Subtype::Lightswitch) {
            if self.state.show_full_map {
                self.cancel_full_map();
            } else {
                self.state.show_full_map = true;
                self.state.full_map_remaining_ms = self.rules.full_map_duration_ms;
            }
            self.emit(GameEvent::FullMapToggled { on: self.state.show_full_map });
        }
        if subtypes.contains(Subtype::Checkpoint) {
            self.state.last_checkpoint = Some(create_checkpoint_snapshot(&self.state));
            self.emit(GameEvent::CheckpointReached { pos });
        }
        if subtypes.contains(Subtype::RoomTransition) {
            match self.state.map.transition_at(pos).map(str::to_owned) {
                Some(room) => {
                    self.state.pending_room_transition = Some(room.clone());
                    self.emit(GameEvent::RoomTransitionPending { room });
                }
                None => tracing::warn!(?pos, "room transition without a target room"),
            }
        }
        if subtypes.contains(Subtype::FaultyFloor) {
            let lost = self.state.hero.take_damage(self.state.hero.health);
            self.state.stats.damage_taken += lost.unsigned_abs();
            self.emit(GameEvent::FloorCollapsed { pos });
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::game::action::{Action, GameEvent};
    use crate::game::resolver::{apply_action, move_player};
    use crate::game::test_support::{rules, state_from};
    use crate::rng::SeededRng;
    use crate::state::GameState;
    use crate::types::{Direction, Pos, Subtype, TileType};

    fn step(state: &GameState, direction: Direction) -> GameState {
        move_player(state, direction, &rules(), &mut SeededRng::new(0))
    }

    #[test]
    fn doors_open_for_free() {
        let state = state_from("######\n#@D..#\n######");
        let next = step(&state, Direction::Right);
        assert_eq!(next.player, Pos::new(1, 2));
        assert_eq!(next.map.tile(Pos::new(1, 2)), TileType::Floor);
        assert!(next.map.has(Pos::new(1, 2), Subtype::Door));
    }

    #[test]
    fn locks_need_the_key_and_keep_it() {
        let state = state_from("######\n#@L..#\n######");
        let blocked = step(&state, Direction::Right);
        assert_eq!(blocked.player, Pos::new(1, 1));
        assert_eq!(blocked.player_direction, Direction::Right);

        let mut keyed = state.clone();
        keyed.inventory.has_key = true;
        let next = step(&keyed, Direction::Right);
        assert_eq!(next.player, Pos::new(1, 2));
        assert!(!next.map.has(Pos::new(1, 2), Subtype::Lock));
        assert!(next.inventory.has_key);
    }

    #[test]
    fn exit_with_exit_key_wins() {
        let mut state = state_from("#####\n#@..#\n#E###");
        let blocked = step(&state, Direction::Down);
        assert!(!blocked.win);

        state.inventory.has_exit_key = true;
        let next = step(&state, Direction::Down);
        assert!(next.win);
        assert!(!next.inventory.has_exit_key);
        assert_eq!(next.player, Pos::new(2, 1));
    }

    #[test]
    fn stepping_collects_items() {
        let state = state_from("#######\n#@kKrf#\n#######");
        let mut next = state;
        for _ in 0..4 {
            next = step(&next, Direction::Right);
        }
        assert!(next.inventory.has_key);
        assert!(next.inventory.has_exit_key);
        assert_eq!(next.inventory.rock_count, 1);
        assert_eq!(next.inventory.food_count, 1);
        assert_eq!(next.stats.steps, 4);
        for x in 2..=5 {
            assert_eq!(next.map.subtypes_at(Pos::new(1, x)).len(), usize::from(x == 5));
        }
    }

    #[test]
    fn lightswitch_toggles_the_full_map() {
        let state = state_from("#####\n#@l.#\n#####");
        let on = step(&state, Direction::Right);
        assert!(on.show_full_map);
        assert_eq!(on.full_map_remaining_ms, rules().full_map_duration_ms);
        assert!(on.map.has(Pos::new(1, 2), Subtype::Lightswitch));

        let away = step(&on, Direction::Right);
        let off = step(&away, Direction::Left);
        assert!(!off.show_full_map);
        assert_eq!(off.full_map_remaining_ms, 0);
    }

    #[test]
    fn faulty_floor_is_fatal() {
        let state = state_from("#####\n#@x.#\n#####");
        let transition =
            apply_action(&state, &Action::Move(Direction::Right), &rules(), &mut SeededRng::new(0));
        assert!(transition.state.is_dead());
        assert!(transition.events.contains(&GameEvent::HeroDied));
        let after = step(&transition.state, Direction::Right);
        assert_eq!(after.player, transition.state.player);
    }

    #[test]
    fn impassable_terrain_blocks() {
        let state = state_from("#####\n#@~T#\n#####");
        let next = step(&state, Direction::Right);
        assert_eq!(next.player, Pos::new(1, 1));
        assert_eq!(next.turn, 0);
    }

    #[test]
    fn out_of_bounds_only_turns_the_hero() {
        let state = state_from("@..");
        let next = step(&state, Direction::Left);
        assert_eq!(next.player, Pos::new(0, 0));
        assert_eq!(next.player_direction, Direction::Left);
    }
}
