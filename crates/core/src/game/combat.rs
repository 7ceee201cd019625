//! Hero and enemy damage exchange, enemy movement, and the single defeat path.

use crate::entities::EnemyId;
use crate::types::{Direction, Pos, Subtype};

use super::action::GameEvent;
use super::resolver::Resolver;

impl Resolver<'_> {
    /// Deals damage to one enemy and defeats it when its health runs out.
    pub(super) fn strike_enemy(&mut self, id: EnemyId, damage: i32) {
        let Some(enemy) = self.state.enemies.get_mut(id) else {
            return;
        };
        let before = enemy.health;
        let defeated = enemy.take_damage(damage);
        let dealt = before - enemy.health;
        let (kind, remaining) = (enemy.kind, enemy.health);
        self.state.stats.damage_dealt += dealt.unsigned_abs();
        self.emit(GameEvent::EnemyHit { id, kind, damage: dealt, remaining });
        if defeated {
            self.defeat_enemy(id);
        }
    }

    /// Every enemy removal goes through here so stats and NPC hooks stay in step.
    pub(super) fn defeat_enemy(&mut self, id: EnemyId) {
        let Some(enemy) = self.state.enemies.remove(id) else {
            return;
        };
        self.state.stats.enemies_defeated += 1;
        let mut hooks_fired = Vec::new();
        for npc in &mut self.state.npcs {
            hooks_fired.extend(npc.record_enemy_defeated(enemy.kind, enemy.tag.as_deref()));
        }
        tracing::debug!(kind = %enemy.kind, ?hooks_fired, "enemy defeated");
        self.emit(GameEvent::EnemyDefeated { id, kind: enemy.kind, hooks_fired });
    }

    /// Adjacent enemies attack; mobile enemies in range close in.
    pub(super) fn enemy_turn(&mut self) {
        let ids: Vec<EnemyId> = self.state.enemies.keys().collect();
        for id in ids {
            if self.state.is_dead() {
                break;
            }
            let Some(enemy) = self.state.enemies.get(id) else {
                continue;
            };
            let (kind, pos, stats) = (enemy.kind, enemy.pos, enemy.stats());
            let distance = pos.manhattan(self.state.player);
            if distance == 1 {
                let block =
                    if self.state.inventory.has_shield { self.rules.shield_block } else { 0 };
                let damage = (stats.attack - block).max(0);
                let lost = self.state.hero.take_damage(damage);
                self.state.stats.damage_taken += lost.unsigned_abs();
                self.emit(GameEvent::HeroHit { by: kind, damage: lost });
                if stats.poisonous && damage > 0 {
                    self.apply_poison();
                }
            } else if stats.can_move && distance <= self.rules.enemy_aggro_range {
                if let Some(to) = self.approach_step(pos) {
                    if let Some(enemy) = self.state.enemies.get_mut(id) {
                        enemy.pos = to;
                    }
                    self.emit(GameEvent::EnemyMoved { id, from: pos, to });
                }
            }
        }
    }

    /// First free neighbour that brings `from` closer to the hero, trying the
    /// longer axis first.
    fn approach_step(&self, from: Pos) -> Option<Pos> {
        let player = self.state.player;
        let (dy, dx) = (player.y - from.y, player.x - from.x);
        let vertical = if dy < 0 { Direction::Up } else { Direction::Down };
        let horizontal = if dx < 0 { Direction::Left } else { Direction::Right };
        let order = if dy.abs() >= dx.abs() {
            [(vertical, dy), (horizontal, dx)]
        } else {
            [(horizontal, dx), (vertical, dy)]
        };
        order
            .into_iter()
            .filter(|(_, delta)| *delta != 0)
            .map(|(direction, _)| from.step(direction))
            .find(|next| self.is_free_for_enemy(*next))
    }

    fn is_free_for_enemy(&self, pos: Pos) -> bool {
        let map = &self.state.map;
        map.in_bounds(pos)
            && map.tile(pos).is_walkable()
            && !map.subtypes_at(pos).contains_any(&[
                Subtype::Pot,
                Subtype::Chest,
                Subtype::FaultyFloor,
            ])
            && pos != self.state.player
            && self.state.enemy_at(pos).is_none()
            && self.state.npc_index_at(pos).is_none()
    }
}

#[cfg(test)]
mod tests {
    use crate::entities::{EnemyKind, HookKind, InteractionHook, MemoryValue, Npc};
    use crate::game::action::{Action, GameEvent};
    use crate::game::resolver::{apply_action, move_player};
    use crate::game::test_support::{rules, spawn_enemy, state_from};
    use crate::rng::SeededRng;
    use crate::types::{Direction, Pos};

    #[test]
    fn bump_attack_damages_without_moving() {
        let mut state = state_from("######\n#@...#\n######");
        let id = spawn_enemy(&mut state, EnemyKind::Goblin, Pos::new(1, 2));
        let next = move_player(&state, Direction::Right, &rules(), &mut SeededRng::new(0));
        assert_eq!(next.player, Pos::new(1, 1));
        assert_eq!(next.enemies[id].health, 2);
        assert_eq!(next.stats.damage_dealt, 1);
        assert_eq!(next.hero.health, next.hero.max_health - 1, "goblin strikes back");
    }

    #[test]
    fn defeat_goes_through_one_path_and_notifies_npcs() {
        let mut state = state_from("########\n#@.....#\n########");
        let id = spawn_enemy(&mut state, EnemyKind::Snake, Pos::new(1, 2));
        state.enemies[id].tag = Some("cellar-snake".into());
        state.npcs.push(
            Npc::new("warden", "Warden", Pos::new(1, 6)).with_hook(
                InteractionHook::new("snake-bounty", HookKind::EnemyDefeated)
                    .with_payload(serde_json::json!({ "enemy": "cellar-snake" })),
            ),
        );
        state.hero.attack = 5;
        let transition =
            apply_action(&state, &Action::Move(Direction::Right), &rules(), &mut SeededRng::new(0));
        let next = transition.state;
        assert!(next.enemies.is_empty());
        assert_eq!(next.stats.enemies_defeated, 1);
        assert_eq!(next.npcs[0].recall("snake-bounty"), Some(&MemoryValue::Number(1.0)));
        assert!(transition.events.contains(&GameEvent::EnemyDefeated {
            id,
            kind: EnemyKind::Snake,
            hooks_fired: vec!["snake-bounty".into()],
        }));
    }

    #[test]
    fn snakes_poison_and_shields_block() {
        let mut state = state_from("######\n#@...#\n######");
        spawn_enemy(&mut state, EnemyKind::Snake, Pos::new(1, 2));
        state.hero.attack = 0;
        let next = apply_action(&state, &Action::ToggleTorch, &rules(), &mut SeededRng::new(0));
        assert_eq!(next.state.hero.health, state.hero.health, "free actions give enemies no turn");

        let bitten = move_player(&state, Direction::Right, &rules(), &mut SeededRng::new(0));
        assert!(bitten.conditions.poisoned.active);
        assert_eq!(bitten.hero.health, bitten.hero.max_health - 1);

        let mut shielded = state.clone();
        shielded.inventory.has_shield = true;
        let next = move_player(&shielded, Direction::Right, &rules(), &mut SeededRng::new(0));
        assert_eq!(next.hero.health, next.hero.max_health);
        assert!(!next.conditions.poisoned.active, "no damage means no poison");
    }

    #[test]
    fn goblins_close_in_and_stone_goblins_stay_put() {
        let mut state = state_from("#########\n#@......#\n#########");
        let goblin = spawn_enemy(&mut state, EnemyKind::Goblin, Pos::new(1, 5));
        let statue = spawn_enemy(&mut state, EnemyKind::StoneGoblin, Pos::new(1, 6));
        let next = move_player(&state, Direction::Up, &rules(), &mut SeededRng::new(0));
        assert_eq!(next.turn, 0, "bumping a wall is free");

        let mut rng = SeededRng::new(0);
        let next = move_player(&state, Direction::Right, &rules(), &mut rng);
        assert_eq!(next.enemies[goblin].pos, Pos::new(1, 4));
        assert_eq!(next.enemies[statue].pos, Pos::new(1, 6));
    }
}
