use crate::map::MapData;
use crate::rng::{GameRng, shuffle};
use crate::types::Subtype;

use super::super::grid::is_dead_end;
use super::{PlacementError, pick_open_cell, reachability_holds};

const CHEST_CONTENTS: [Subtype; 2] = [Subtype::Sword, Subtype::Shield];

/// One sword chest and one shield chest, each locked with `lock_chance`.
/// Dead ends are tried first; every chest must leave the level reachable.
pub fn place_chests(
    mut map: MapData,
    lock_chance: f64,
    rng: &mut dyn GameRng,
) -> Result<MapData, PlacementError> {
    for content in CHEST_CONTENTS {
        let locked = rng.chance(lock_chance);
        let (mut dead_ends, mut others): (Vec<_>, Vec<_>) =
            map.eligible_cells().into_iter().partition(|pos| is_dead_end(&map, *pos));
        if dead_ends.is_empty() && others.is_empty() {
            return Err(PlacementError::NoEligibleCell { feature: Subtype::Chest });
        }
        shuffle(rng, &mut dead_ends);
        shuffle(rng, &mut others);

        let placed = dead_ends.into_iter().chain(others).find_map(|cell| {
            let mut candidate = map.clone();
            candidate.insert_subtype(cell, Subtype::Chest);
            candidate.insert_subtype(cell, content);
            if locked {
                candidate.insert_subtype(cell, Subtype::Lock);
            }
            reachability_holds(&candidate).then_some(candidate)
        });
        map = placed.ok_or(PlacementError::WouldDisconnect { feature: Subtype::Chest })?;
    }
    Ok(map)
}

/// Puts one `subtype` marker on a random eligible cell.
pub fn place_single(
    mut map: MapData,
    subtype: Subtype,
    rng: &mut dyn GameRng,
) -> Result<MapData, PlacementError> {
    let cell = pick_open_cell(&map, &[], rng)
        .ok_or(PlacementError::NoEligibleCell { feature: subtype })?;
    map.insert_subtype(cell, subtype);
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{ScriptedRng, SeededRng};
    use crate::types::Pos;

    const ROOM_WITH_NOOK: &str = "
        ########
        #......#
        #......#
        #.######
        ########
    ";

    #[test]
    fn exactly_one_sword_and_one_shield_chest() {
        let map = MapData::from_ascii(ROOM_WITH_NOOK).expect("fixture should parse");
        let mut rng = SeededRng::new(8);
        let map = place_chests(map, 0.5, &mut rng).expect("room has space");
        assert_eq!(map.count_subtype(Subtype::Chest), 2);
        let sword = map.positions_with(Subtype::Sword);
        let shield = map.positions_with(Subtype::Shield);
        assert_eq!(sword.len(), 1);
        assert_eq!(shield.len(), 1);
        assert!(map.has(sword[0], Subtype::Chest));
        assert!(map.has(shield[0], Subtype::Chest));
        assert!(reachability_holds(&map));
    }

    #[test]
    fn dead_ends_are_preferred() {
        let map = MapData::from_ascii(ROOM_WITH_NOOK).expect("fixture should parse");
        // The first roll decides the lock; the rest drive the shuffles.
        let mut rng = ScriptedRng::new([0.9]);
        let map = place_chests(map, 0.5, &mut rng).expect("room has space");
        assert!(map.has(Pos::new(3, 1), Subtype::Chest));
        assert!(!map.has(Pos::new(3, 1), Subtype::Lock));
    }

    #[test]
    fn chest_that_would_seal_another_chest_is_refused() {
        let map = MapData::from_ascii("####\n#..#\n####").expect("fixture should parse");
        let mut rng = SeededRng::new(2);
        assert_eq!(
            place_chests(map, 0.0, &mut rng),
            Err(PlacementError::WouldDisconnect { feature: Subtype::Chest })
        );
    }

    #[test]
    fn single_markers_use_empty_floor() {
        let map = MapData::from_ascii("####\n#.k#\n####").expect("fixture should parse");
        let mut rng = SeededRng::new(0);
        let map = place_single(map, Subtype::Lightswitch, &mut rng).expect("one free cell");
        assert!(map.has(Pos::new(1, 1), Subtype::Lightswitch));
        assert_eq!(
            place_single(map, Subtype::Checkpoint, &mut rng),
            Err(PlacementError::NoEligibleCell { feature: Subtype::Checkpoint })
        );
    }
}
