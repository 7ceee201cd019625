//! Feature placement pipeline run over an accepted base map.

use std::iter::repeat_n;

use crate::config::GeneratorConfig;
use crate::map::MapData;
use crate::rng::GameRng;
use crate::types::{Pos, Subtype};

use super::super::features::{
    PlacementError, place_chests, place_exit, place_exit_key, place_single, place_strategic_door,
    scatter_items, scatter_pots, scatter_wall_torches,
};
use super::super::model::{EnemySpawn, PlacementReport};
use super::super::spawns::place_enemies;
use super::hazards::place_faulty_floors;

pub(super) struct PlacedFeatures {
    pub(super) map: MapData,
    pub(super) player_start: Pos,
    pub(super) exit: Pos,
    pub(super) exit_key: Pos,
    pub(super) enemies: Vec<EnemySpawn>,
    pub(super) report: PlacementReport,
}

/// Exit, exit key, door, chests, key, player, hazards, switches, enemies and
/// scatter, in that order.
pub(super) fn place_features(
    base: &MapData,
    config: &GeneratorConfig,
    rng: &mut dyn GameRng,
) -> Result<PlacedFeatures, PlacementError> {
    let mut report = PlacementReport::default();
    let map = place_exit_pair(base, config, rng, &mut report)?;
    let exit = required(&map, Subtype::Exit)?;
    let exit_key = required(&map, Subtype::ExitKey)?;
    report.exit_key_distance = exit.manhattan(exit_key);

    let map = place_strategic_door(map, config.door_attempts, rng);
    report.door = map.find_first(Subtype::Door);
    if report.door.is_none() {
        report.omitted.push(Subtype::Door.to_string());
    }

    let map = place_chests(map, config.chest_lock_chance, rng)?;
    report.locked_chests = map
        .positions_with(Subtype::Chest)
        .into_iter()
        .filter(|pos| map.has(*pos, Subtype::Lock))
        .count();
    let map = place_single(map, Subtype::Key, rng)?;
    let map = place_single(map, Subtype::Player, rng)?;
    let player_start = required(&map, Subtype::Player)?;

    let hazards = place_faulty_floors(map, config.faulty_floors, config.hazard_attempts, rng);
    report.faulty_floors = hazards.placed;
    if hazards.placed < hazards.wanted {
        let missing = hazards.wanted - hazards.placed;
        report.omitted.extend(repeat_n(Subtype::FaultyFloor.to_string(), missing));
    }
    let map = place_single(hazards.map, Subtype::Lightswitch, rng)?;
    let map = place_single(map, Subtype::Checkpoint, rng)?;

    let spawns = place_enemies(map, player_start, config, rng);
    report.converted_snakes = spawns.converted_snakes;
    let claimed: Vec<Pos> = spawns.enemies.iter().map(|spawn| spawn.pos).collect();

    let map = scatter_items(spawns.map, Subtype::Rock, config.rocks, &claimed, rng);
    let map = scatter_pots(map, config.pots, &claimed, config.hazard_attempts, rng);
    let map = scatter_items(map, Subtype::Rune, config.runes, &claimed, rng);
    let map = scatter_wall_torches(map, config.wall_torches, rng);

    Ok(PlacedFeatures { map, player_start, exit, exit_key, enemies: spawns.enemies, report })
}

/// Tries fresh exits on the base map until one leaves room for a distant key.
fn place_exit_pair(
    base: &MapData,
    config: &GeneratorConfig,
    rng: &mut dyn GameRng,
    report: &mut PlacementReport,
) -> Result<MapData, PlacementError> {
    let mut last_error = PlacementError::NoEligibleCell { feature: Subtype::Exit };
    for attempt in 1..=config.exit_attempts.max(1) {
        report.exit_attempts = attempt;
        let with_exit = place_exit(base.clone(), rng)?;
        match place_exit_key(with_exit, config.min_exit_key_distance) {
            Ok(map) => return Ok(map),
            Err(error @ PlacementError::ExitKeyTooClose { .. }) => {
                tracing::debug!(attempt, %error, "exit rejected");
                last_error = error;
            }
            Err(error) => return Err(error),
        }
    }
    Err(last_error)
}

fn required(map: &MapData, subtype: Subtype) -> Result<Pos, PlacementError> {
    map.find_first(subtype).ok_or(PlacementError::NoEligibleCell { feature: subtype })
}
