//! Placement steps that overlay gameplay markers on a carved base map.
//!
//! Every step consumes a [`MapData`] and hands back a new one. Steps that add
//! obstacles re-validate reachability before accepting a cell.

mod doors;
mod exits;
mod items;
mod scatter;

pub use doors::place_strategic_door;
pub use exits::{place_exit, place_exit_key};
pub use items::{place_chests, place_single};
pub use scatter::{scatter_items, scatter_pots, scatter_wall_torches};

use crate::map::MapData;
use crate::rng::{GameRng, choose};
use crate::types::{Pos, Subtype};

use super::connectivity::is_connected;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    #[error("no eligible cell left for {feature}")]
    NoEligibleCell { feature: Subtype },
    #[error("farthest exit key cell is {distance} tiles from the exit, need {required}")]
    ExitKeyTooClose { distance: u32, required: u32 },
    #[error("placing {feature} would cut off part of the level")]
    WouldDisconnect { feature: Subtype },
}

/// Markers that must keep at least one reachable orthogonal neighbour.
const OBSTACLE_FEATURES: [Subtype; 3] = [Subtype::Exit, Subtype::Chest, Subtype::Pot];

/// The reachability mask is one component and every obstacle feature can
/// still be reached from it.
pub fn reachability_holds(map: &MapData) -> bool {
    let mask = map.reachability_mask();
    if !is_connected(&mask) {
        return false;
    }
    map.positions().filter(|pos| map.subtypes_at(*pos).contains_any(&OBSTACLE_FEATURES)).all(
        |pos| pos.neighbors4().into_iter().any(|next| mask.get(next).copied().unwrap_or(false)),
    )
}

/// Eligible cells not claimed by an enemy spawn.
pub(super) fn open_cells(map: &MapData, claimed: &[Pos]) -> Vec<Pos> {
    map.eligible_cells().into_iter().filter(|pos| !claimed.contains(pos)).collect()
}

pub(super) fn pick_open_cell(
    map: &MapData,
    claimed: &[Pos],
    rng: &mut dyn GameRng,
) -> Option<Pos> {
    choose(rng, &open_cells(map, claimed)).copied()
}

/// Marks a random open cell and keeps the mark only if reachability still
/// holds. Gives up after `attempts` rejected cells.
pub(super) fn try_place_validated(
    map: &mut MapData,
    subtype: Subtype,
    claimed: &[Pos],
    attempts: u32,
    rng: &mut dyn GameRng,
) -> Option<Pos> {
    for _ in 0..attempts {
        let cell = pick_open_cell(map, claimed, rng)?;
        map.insert_subtype(cell, subtype);
        if reachability_holds(map) {
            return Some(cell);
        }
        map.remove_subtype(cell, subtype);
    }
    None
}
