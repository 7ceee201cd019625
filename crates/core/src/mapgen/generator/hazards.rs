//! Collapsing floor tiles, accepted one at a time against the reachability guard.

use crate::config::CountRange;
use crate::map::MapData;
use crate::rng::GameRng;
use crate::types::Subtype;

use super::super::features::try_place_validated;

pub(super) struct HazardOutcome {
    pub(super) map: MapData,
    pub(super) placed: usize,
    pub(super) wanted: usize,
}

pub(super) fn place_faulty_floors(
    mut map: MapData,
    range: CountRange,
    attempts_per_hazard: u32,
    rng: &mut dyn GameRng,
) -> HazardOutcome {
    let wanted = rng.range_usize(range.min, range.max);
    let mut placed = 0;
    for _ in 0..wanted {
        match try_place_validated(&mut map, Subtype::FaultyFloor, &[], attempts_per_hazard, rng) {
            Some(cell) => {
                tracing::trace!(?cell, "faulty floor placed");
                placed += 1;
            }
            None => break,
        }
    }
    if placed < wanted {
        tracing::warn!(placed, wanted, "faulty floors omitted to keep the level connected");
    }
    HazardOutcome { map, placed, wanted }
}
