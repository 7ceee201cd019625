use crate::map::MapData;
use crate::rng::{GameRng, shuffle};
use crate::types::{Subtype, TileType};

use super::super::connectivity::find_strategic_door;
use super::super::grid::is_corridor;

/// Walls off a corridor cell and keeps it as a door when the chokepoint search
/// names that exact cell. Leaves the map untouched if no candidate qualifies.
pub fn place_strategic_door(map: MapData, attempts: u32, rng: &mut dyn GameRng) -> MapData {
    let exit = map.find_first(Subtype::Exit);
    let mut candidates: Vec<_> = map
        .positions()
        .filter(|pos| {
            map.is_eligible(*pos)
                && is_corridor(&map, *pos)
                && exit.is_none_or(|exit| exit.manhattan(*pos) > 1)
        })
        .collect();
    shuffle(rng, &mut candidates);

    for cell in candidates.into_iter().take(attempts as usize) {
        let mut mask = map.floor_mask();
        mask[cell] = false;
        if find_strategic_door(&mask) == Some(cell) {
            let mut map = map;
            map.set_tile(cell, TileType::Wall);
            map.insert_subtype(cell, Subtype::Door);
            tracing::debug!(?cell, "strategic door placed");
            return map;
        }
    }

    tracing::warn!("no corridor cell qualified as a strategic door; door omitted");
    map
}
