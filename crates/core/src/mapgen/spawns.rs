//! Enemy spawn selection around the player start.

use std::iter::repeat_n;

use crate::config::GeneratorConfig;
use crate::entities::EnemyKind;
use crate::map::MapData;
use crate::rng::{GameRng, shuffle};
use crate::types::{Pos, Subtype};

use super::features::reachability_holds;
use super::model::EnemySpawn;

pub(super) struct SpawnOutcome {
    pub(super) map: MapData,
    pub(super) enemies: Vec<EnemySpawn>,
    pub(super) converted_snakes: usize,
}

/// Goblins first, then snakes. A snake may be swapped for a pot when the pot
/// keeps the level reachable.
pub(super) fn place_enemies(
    mut map: MapData,
    player: Pos,
    config: &GeneratorConfig,
    rng: &mut dyn GameRng,
) -> SpawnOutcome {
    let mut candidates: Vec<Pos> = map
        .eligible_cells()
        .into_iter()
        .filter(|pos| pos.manhattan(player) >= config.min_enemy_distance)
        .collect();
    shuffle(rng, &mut candidates);
    let mut candidates = candidates.into_iter();

    let goblins = rng.range_usize(config.goblins.min, config.goblins.max);
    let snakes = rng.range_usize(config.snakes.min, config.snakes.max);
    let mut enemies = Vec::with_capacity(goblins + snakes);
    let mut converted_snakes = 0;

    let roster = repeat_n(EnemyKind::Goblin, goblins)
        .chain(repeat_n(EnemyKind::Snake, snakes));
    for kind in roster {
        let Some(pos) = candidates.next() else {
            tracing::warn!(placed = enemies.len(), "ran out of enemy spawn cells");
            break;
        };
        if kind == EnemyKind::Snake && rng.chance(config.snake_pot_chance) {
            map.insert_subtype(pos, Subtype::Pot);
            if reachability_holds(&map) {
                converted_snakes += 1;
                continue;
            }
            map.remove_subtype(pos, Subtype::Pot);
        }
        enemies.push(EnemySpawn { kind, pos });
    }
    SpawnOutcome { map, enemies, converted_snakes }
}
