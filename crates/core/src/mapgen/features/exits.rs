use crate::map::MapData;
use crate::rng::{GameRng, choose};
use crate::types::{Subtype, TileType};

use super::super::grid::{farthest_eligible_cell, floor_neighbor_count};
use super::PlacementError;

/// Marks a random wall cell that touches exactly one floor cell as the exit.
pub fn place_exit(mut map: MapData, rng: &mut dyn GameRng) -> Result<MapData, PlacementError> {
    let candidates: Vec<_> = map
        .positions()
        .filter(|pos| {
            map.tile(*pos) == TileType::Wall
                && map.subtypes_at(*pos).is_empty()
                && floor_neighbor_count(&map, *pos) == 1
        })
        .collect();
    let exit = *choose(rng, &candidates)
        .ok_or(PlacementError::NoEligibleCell { feature: Subtype::Exit })?;
    map.insert_subtype(exit, Subtype::Exit);
    Ok(map)
}

/// Puts the exit key on the eligible cell farthest from the exit.
pub fn place_exit_key(mut map: MapData, min_distance: u32) -> Result<MapData, PlacementError> {
    let exit = map
        .find_first(Subtype::Exit)
        .ok_or(PlacementError::NoEligibleCell { feature: Subtype::Exit })?;
    let (key, distance) = farthest_eligible_cell(&map, exit)
        .ok_or(PlacementError::NoEligibleCell { feature: Subtype::ExitKey })?;
    if distance < min_distance {
        return Err(PlacementError::ExitKeyTooClose { distance, required: min_distance });
    }
    map.insert_subtype(key, Subtype::ExitKey);
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SeededRng;
    use crate::types::Pos;

    const HALL: &str = "
        ##################
        #................#
        ##################
    ";

    #[test]
    fn exit_touches_exactly_one_floor_cell() {
        let map = MapData::from_ascii(HALL).expect("fixture should parse");
        let mut rng = SeededRng::new(4);
        let map = place_exit(map, &mut rng).expect("hall has exit candidates");
        let exit = map.find_first(Subtype::Exit).expect("exit placed");
        assert_eq!(map.tile(exit), TileType::Wall);
        assert_eq!(floor_neighbor_count(&map, exit), 1);
        assert_eq!(map.count_subtype(Subtype::Exit), 1);
    }

    #[test]
    fn exit_key_lands_on_the_farthest_cell() {
        let mut map = MapData::from_ascii(HALL).expect("fixture should parse");
        map.insert_subtype(Pos::new(1, 0), Subtype::Exit);
        let map = place_exit_key(map, 13).expect("hall is long enough");
        assert!(map.has(Pos::new(1, 16), Subtype::ExitKey));
    }

    #[test]
    fn short_maps_report_exit_key_too_close() {
        let mut map = MapData::from_ascii("#######\n#.....#\n#######").expect("fixture should parse");
        map.insert_subtype(Pos::new(1, 0), Subtype::Exit);
        assert_eq!(
            place_exit_key(map, 13),
            Err(PlacementError::ExitKeyTooClose { distance: 5, required: 13 })
        );
    }
}
