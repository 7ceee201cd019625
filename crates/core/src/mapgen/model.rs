//! Public data models for base layouts, generated levels, and enemy spawns.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::entities::EnemyKind;
use crate::map::MapData;
use crate::types::{Grid, Pos};

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
    EnumIter,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Random walk carving that keeps the perimeter walled.
    #[default]
    Default,
    /// Overlapping rectangular rooms seeded near the centre.
    CenterOut,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EnemySpawn {
    pub kind: EnemyKind,
    pub pos: Pos,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub strategy: Strategy,
    pub attempts: u32,
    pub floor_ratio: f64,
    pub room_count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BaseMap {
    pub mask: Grid<bool>,
    pub report: GenerationReport,
}

impl BaseMap {
    pub fn to_map_data(&self) -> MapData {
        MapData::from_floor_mask(&self.mask)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlacementReport {
    pub exit_attempts: u32,
    pub exit_key_distance: u32,
    pub door: Option<Pos>,
    pub locked_chests: usize,
    pub faulty_floors: usize,
    pub converted_snakes: usize,
    /// Optional features that could not be placed without breaking reachability.
    pub omitted: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelReport {
    pub base: GenerationReport,
    pub levels_attempted: u32,
    pub placement: PlacementReport,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneratedLevel {
    pub map: MapData,
    pub player_start: Pos,
    pub exit: Pos,
    pub exit_key: Pos,
    pub enemies: Vec<EnemySpawn>,
    pub report: LevelReport,
}

impl GeneratedLevel {
    /// Map bytes followed by the enemy roster, for fingerprinting whole levels.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = self.map.canonical_bytes();
        bytes.extend((self.enemies.len() as u32).to_le_bytes());
        for spawn in &self.enemies {
            bytes.push(spawn.kind.code());
            bytes.extend(spawn.pos.y.to_le_bytes());
            bytes.extend(spawn.pos.x.to_le_bytes());
        }
        bytes
    }
}
