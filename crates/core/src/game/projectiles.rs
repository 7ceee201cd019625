//! Thrown rocks and runes.

use crate::types::{Pos, Subtype};

use super::action::GameEvent;
use super::resolver::{Resolver, Turn};

enum Flight {
    /// Nothing open ahead of the hero.
    Stuck,
    Landed(Pos),
    Hit(Pos),
}

impl Resolver<'_> {
    pub(super) fn throw_rock(&mut self) -> Turn {
        self.throw(Subtype::Rock, self.rules.rock_damage)
    }

    pub(super) fn throw_rune(&mut self) -> Turn {
        self.throw(Subtype::Rune, self.rules.rune_damage)
    }

    fn throw(&mut self, item: Subtype, damage: i32) -> Turn {
        if self.carried(item) == 0 {
            self.emit(GameEvent::NothingToUse { item });
            return Turn::Free;
        }
        match self.trace_flight() {
            Flight::Stuck => Turn::Free,
            Flight::Hit(pos) => {
                let Some(id) = self.state.enemy_at(pos) else {
                    return Turn::Free;
                };
                self.spend(item);
                self.emit(GameEvent::ProjectileHit { item, pos, id });
                self.strike_enemy(id, damage);
                Turn::Taken
            }
            Flight::Landed(pos) => {
                // A reserved landing cell keeps the item in the pouch rather
                // than dropping it short of the cell.
                if self.state.map.subtypes_at(pos).iter().any(Subtype::is_reserved_landing) {
                    self.emit(GameEvent::ProjectileCancelled { item, pos });
                    return Turn::Free;
                }
                self.spend(item);
                self.state.map.insert_subtype(pos, item);
                self.emit(GameEvent::ProjectileLanded { item, pos });
                Turn::Taken
            }
        }
    }

    /// Follows the facing direction over open cells until something stops it.
    fn trace_flight(&self) -> Flight {
        let direction = self.state.player_direction;
        let map = &self.state.map;
        let mut landing = None;
        let mut cursor = self.state.player;
        loop {
            let next = cursor.step(direction);
            if !map.in_bounds(next) {
                break;
            }
            if self.state.enemy_at(next).is_some() {
                return Flight::Hit(next);
            }
            let open = map.tile(next).is_walkable()
                && !map.subtypes_at(next).iter().any(Subtype::is_obstacle)
                && self.state.npc_index_at(next).is_none();
            if !open {
                break;
            }
            landing = Some(next);
            cursor = next;
        }
        landing.map_or(Flight::Stuck, Flight::Landed)
    }

    fn carried(&self, item: Subtype) -> u32 {
        match item {
            Subtype::Rock => self.state.inventory.rock_count,
            Subtype::Rune => self.state.inventory.rune_count,
            _ => 0,
        }
    }

    fn spend(&mut self, item: Subtype) {
        let inventory = &mut self.state.inventory;
        let count = match item {
            Subtype::Rock => &mut inventory.rock_count,
            Subtype::Rune => &mut inventory.rune_count,
            _ => return,
        };
        *count = count.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use crate::entities::EnemyKind;
    use crate::game::resolver::{perform_throw_rock, perform_throw_rune};
    use crate::game::test_support::{rules, spawn_enemy, state_from};
    use crate::types::{Direction, Pos, Subtype, TileType};

    #[test]
    fn open_run_of_four_lands_on_the_last_cell() {
        let mut state = state_from("#######\n#@....#\n#######");
        state.player_direction = Direction::Right;
        state.inventory.rock_count = 2;
        let next = perform_throw_rock(&state, &rules());
        assert!(next.map.has(Pos::new(1, 5), Subtype::Rock));
        assert_eq!(next.inventory.rock_count, 1);
        assert_eq!(next.turn, 1);
    }

    #[test]
    fn reserved_landing_cells_cancel_the_throw() {
        for glyph in ['K', 'c', 'l', 'k', 'R'] {
            let mut state = state_from(&format!("######\n#@..{glyph}#\n######"));
            state.player_direction = Direction::Right;
            state.inventory.rune_count = 1;
            let next = perform_throw_rune(&state, &rules());
            assert_eq!(next.inventory.rune_count, 1, "landing on {glyph}");
            assert!(!next.map.has(Pos::new(1, 4), Subtype::Rune));
            assert_eq!(next.turn, 0);
        }
    }

    #[test]
    fn an_opened_door_is_still_a_reserved_landing() {
        let mut state = state_from("######\n#@..D#\n######");
        let door = Pos::new(1, 4);
        state.map.set_tile(door, TileType::Floor);
        state.player_direction = Direction::Right;
        state.inventory.rock_count = 1;
        let next = perform_throw_rock(&state, &rules());
        assert_eq!(next.inventory.rock_count, 1);
        assert_eq!(next.map, state.map);
        assert_eq!(next.turn, 0);
    }

    #[test]
    fn exit_and_door_walls_stop_the_flight() {
        let mut state = state_from("######\n#@..E#\n######");
        state.player_direction = Direction::Right;
        state.inventory.rock_count = 1;
        let next = perform_throw_rock(&state, &rules());
        assert!(next.map.has(Pos::new(1, 3), Subtype::Rock));
    }

    #[test]
    fn facing_a_wall_is_a_no_op() {
        let mut state = state_from("####\n#@.#\n####");
        state.player_direction = Direction::Up;
        state.inventory.rock_count = 1;
        let next = perform_throw_rock(&state, &rules());
        assert_eq!(next.inventory.rock_count, 1);
        assert_eq!(next.turn, 0);
    }

    #[test]
    fn enemies_in_the_path_take_the_hit() {
        let mut state = state_from("#######\n#@....#\n#######");
        let id = spawn_enemy(&mut state, EnemyKind::StoneGoblin, Pos::new(1, 4));
        state.player_direction = Direction::Right;
        state.inventory.rune_count = 1;
        let next = perform_throw_rune(&state, &rules());
        assert_eq!(next.enemies[id].health, 2);
        assert_eq!(next.inventory.rune_count, 0);
        assert_eq!(next.map.count_subtype(Subtype::Rune), 0);
    }

    #[test]
    fn pots_stop_projectiles_like_walls() {
        let mut state = state_from("#######\n#@..p.#\n#######");
        state.player_direction = Direction::Right;
        state.inventory.rock_count = 1;
        let next = perform_throw_rock(&state, &rules());
        assert!(next.map.has(Pos::new(1, 3), Subtype::Rock));
    }
}
