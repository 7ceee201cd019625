use crate::config::CountRange;
use crate::map::MapData;
use crate::rng::{GameRng, shuffle};
use crate::types::{Direction, Pos, Subtype, TileType};

use super::{pick_open_cell, try_place_validated};

/// Drops a random number of `subtype` markers on open cells.
pub fn scatter_items(
    mut map: MapData,
    subtype: Subtype,
    range: CountRange,
    claimed: &[Pos],
    rng: &mut dyn GameRng,
) -> MapData {
    let count = rng.range_usize(range.min, range.max);
    for placed in 0..count {
        let Some(cell) = pick_open_cell(&map, claimed, rng) else {
            tracing::warn!(%subtype, placed, wanted = count, "ran out of open cells");
            break;
        };
        map.insert_subtype(cell, subtype);
    }
    map
}

/// Pots block movement, so each one is re-validated like a hazard.
pub fn scatter_pots(
    mut map: MapData,
    range: CountRange,
    claimed: &[Pos],
    attempts_per_pot: u32,
    rng: &mut dyn GameRng,
) -> MapData {
    let count = rng.range_usize(range.min, range.max);
    let mut placed = 0_usize;
    for _ in 0..count {
        if try_place_validated(&mut map, Subtype::Pot, claimed, attempts_per_pot, rng).is_some() {
            placed += 1;
        }
    }
    if placed < count {
        tracing::warn!(placed, wanted = count, "some pots omitted to keep the level reachable");
    }
    map
}

/// Torches hang on bare walls directly above a floor cell.
pub fn scatter_wall_torches(mut map: MapData, range: CountRange, rng: &mut dyn GameRng) -> MapData {
    let mut candidates: Vec<Pos> = map
        .positions()
        .filter(|pos| {
            map.tile(*pos) == TileType::Wall
                && map.subtypes_at(*pos).is_empty()
                && map.tile(pos.step(Direction::Down)) == TileType::Floor
        })
        .collect();
    shuffle(rng, &mut candidates);
    let count = rng.range_usize(range.min, range.max);
    if candidates.len() < count {
        tracing::warn!(available = candidates.len(), wanted = count, "not enough torch walls");
    }
    for cell in candidates.into_iter().take(count) {
        map.insert_subtype(cell, Subtype::WallTorch);
    }
    map
}
