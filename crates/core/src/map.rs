//! Terrain and overlay grids for one level or authored room.

use serde::{Deserialize, Serialize};

use crate::types::{Environment, Grid, MapShapeError, Pos, Subtype, SubtypeSet, TileType};

/// Markers that keep a walkable cell out of the reachability mask.
const REACHABILITY_BLOCKERS: [Subtype; 3] = [Subtype::FaultyFloor, Subtype::Pot, Subtype::Chest];
/// Markers that make a wall cell passable for reachability purposes.
const PASSABLE_WALL_MARKERS: [Subtype; 2] = [Subtype::Door, Subtype::Lock];

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomLink {
    pub pos: Pos,
    pub room_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMapData")]
pub struct MapData {
    tiles: Grid<TileType>,
    subtypes: Grid<SubtypeSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transitions: Vec<RoomLink>,
}

#[derive(Deserialize)]
struct RawMapData {
    tiles: Grid<TileType>,
    subtypes: Grid<SubtypeSet>,
    #[serde(default)]
    environment: Option<Environment>,
    #[serde(default)]
    transitions: Vec<RoomLink>,
}

impl TryFrom<RawMapData> for MapData {
    type Error = MapShapeError;

    fn try_from(raw: RawMapData) -> Result<Self, Self::Error> {
        let mut map = Self::from_parts(raw.tiles, raw.subtypes)?;
        map.environment = raw.environment;
        map.transitions = raw.transitions;
        Ok(map)
    }
}

impl MapData {
    pub fn new(width: usize, height: usize, fill: TileType) -> Self {
        Self {
            tiles: Grid::new(width, height, fill),
            subtypes: Grid::new(width, height, SubtypeSet::EMPTY),
            environment: None,
            transitions: Vec::new(),
        }
    }

    pub fn from_parts(
        tiles: Grid<TileType>,
        subtypes: Grid<SubtypeSet>,
    ) -> Result<Self, MapShapeError> {
        tiles.check_shape()?;
        subtypes.check_shape()?;
        if tiles.width() != subtypes.width() || tiles.height() != subtypes.height() {
            return Err(MapShapeError::DimensionMismatch {
                tiles_width: tiles.width(),
                tiles_height: tiles.height(),
                subtypes_width: subtypes.width(),
                subtypes_height: subtypes.height(),
            });
        }
        Ok(Self { tiles, subtypes, environment: None, transitions: Vec::new() })
    }

    pub fn from_rows(
        tiles: Vec<Vec<TileType>>,
        subtypes: Vec<Vec<SubtypeSet>>,
    ) -> Result<Self, MapShapeError> {
        Self::from_parts(Grid::from_rows(tiles)?, Grid::from_rows(subtypes)?)
    }

    pub fn from_floor_mask(mask: &Grid<bool>) -> Self {
        Self {
            tiles: mask.map(|&floor| if floor { TileType::Floor } else { TileType::Wall }),
            subtypes: mask.map(|_| SubtypeSet::EMPTY),
            environment: None,
            transitions: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.tiles.width()
    }

    pub fn height(&self) -> usize {
        self.tiles.height()
    }

    pub fn tiles(&self) -> &Grid<TileType> {
        &self.tiles
    }

    pub fn subtypes(&self) -> &Grid<SubtypeSet> {
        &self.subtypes
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        self.tiles.in_bounds(pos)
    }

    pub fn positions(&self) -> impl Iterator<Item = Pos> + use<> {
        self.tiles.positions()
    }

    /// Terrain at `pos`; out-of-bounds reads as wall.
    pub fn tile(&self, pos: Pos) -> TileType {
        self.tiles.get(pos).copied().unwrap_or(TileType::Wall)
    }

    pub fn set_tile(&mut self, pos: Pos, tile: TileType) -> bool {
        match self.tiles.get_mut(pos) {
            Some(cell) => {
                *cell = tile;
                true
            }
            None => false,
        }
    }

    pub fn subtypes_at(&self, pos: Pos) -> SubtypeSet {
        self.subtypes.get(pos).copied().unwrap_or_default()
    }

    pub fn has(&self, pos: Pos, subtype: Subtype) -> bool {
        self.subtypes_at(pos).contains(subtype)
    }

    pub fn insert_subtype(&mut self, pos: Pos, subtype: Subtype) -> bool {
        self.subtypes.get_mut(pos).is_some_and(|set| set.insert(subtype))
    }

    pub fn remove_subtype(&mut self, pos: Pos, subtype: Subtype) -> bool {
        self.subtypes.get_mut(pos).is_some_and(|set| set.remove(subtype))
    }

    /// Cells carrying `subtype`, row-major.
    pub fn positions_with(&self, subtype: Subtype) -> Vec<Pos> {
        self.subtypes.iter().filter(|(_, set)| set.contains(subtype)).map(|(pos, _)| pos).collect()
    }

    pub fn find_first(&self, subtype: Subtype) -> Option<Pos> {
        self.subtypes.iter().find(|(_, set)| set.contains(subtype)).map(|(pos, _)| pos)
    }

    pub fn count_subtype(&self, subtype: Subtype) -> usize {
        self.subtypes.iter().filter(|(_, set)| set.contains(subtype)).count()
    }

    pub fn count_tile(&self, tile: TileType) -> usize {
        self.tiles.iter().filter(|(_, cell)| **cell == tile).count()
    }

    pub fn floor_ratio(&self) -> f64 {
        if self.tiles.is_empty() {
            return 0.0;
        }
        self.count_tile(TileType::Floor) as f64 / self.tiles.len() as f64
    }

    /// Floor tile with an empty overlay.
    pub fn is_eligible(&self, pos: Pos) -> bool {
        self.tile(pos) == TileType::Floor && self.subtypes_at(pos).is_empty()
    }

    pub fn eligible_cells(&self) -> Vec<Pos> {
        self.positions().filter(|pos| self.is_eligible(*pos)).collect()
    }

    /// Walkable terrain, ignoring overlays.
    pub fn floor_mask(&self) -> Grid<bool> {
        self.tiles.map(|tile| tile.is_walkable())
    }

    /// Cells a hero could occupy or pass through right now.
    pub fn reachability_mask(&self) -> Grid<bool> {
        let mut mask = Grid::new(self.width(), self.height(), false);
        for pos in self.positions() {
            mask[pos] = self.is_reachable_cell(pos);
        }
        mask
    }

    pub fn is_reachable_cell(&self, pos: Pos) -> bool {
        let tile = self.tile(pos);
        let subtypes = self.subtypes_at(pos);
        if tile.is_walkable() {
            !subtypes.contains_any(&REACHABILITY_BLOCKERS)
        } else {
            tile == TileType::Wall && subtypes.contains_any(&PASSABLE_WALL_MARKERS)
        }
    }

    pub fn transition_at(&self, pos: Pos) -> Option<&str> {
        self.transitions.iter().find(|link| link.pos == pos).map(|link| link.room_id.as_str())
    }

    /// Order-independent byte encoding used for content addressing.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(8 + self.tiles.len() * 9);
        bytes.extend((self.width() as u32).to_le_bytes());
        bytes.extend((self.height() as u32).to_le_bytes());
        for (_, tile) in self.tiles.iter() {
            bytes.push(tile.canonical_code());
        }
        for (_, set) in self.subtypes.iter() {
            bytes.extend(set.bits().to_le_bytes());
        }
        bytes.push(match self.environment {
            None => 0,
            Some(Environment::Cave) => 1,
            Some(Environment::Outdoor) => 2,
            Some(Environment::House) => 3,
        });

        let mut links: Vec<&RoomLink> = self.transitions.iter().collect();
        links.sort_by(|left, right| (left.pos, &left.room_id).cmp(&(right.pos, &right.room_id)));
        bytes.extend((links.len() as u32).to_le_bytes());
        for link in links {
            bytes.extend(link.pos.y.to_le_bytes());
            bytes.extend(link.pos.x.to_le_bytes());
            bytes.extend((link.room_id.len() as u32).to_le_bytes());
            bytes.extend(link.room_id.as_bytes());
        }
        bytes
    }

    pub fn from_ascii(text: &str) -> Result<Self, MapShapeError> {
        let mut tile_rows = Vec::new();
        let mut subtype_rows = Vec::new();
        for (y, line) in text.lines().map(str::trim).filter(|line| !line.is_empty()).enumerate() {
            let mut tile_row = Vec::with_capacity(line.len());
            let mut subtype_row = Vec::with_capacity(line.len());
            for (x, glyph) in line.chars().enumerate() {
                let Some(entry) = ASCII_LEGEND.iter().find(|entry| entry.glyph == glyph) else {
                    return Err(MapShapeError::UnknownGlyph {
                        glyph,
                        pos: Pos::new(y as i32, x as i32),
                    });
                };
                tile_row.push(entry.tile);
                subtype_row.push(SubtypeSet::of(entry.subtypes));
            }
            tile_rows.push(tile_row);
            subtype_rows.push(subtype_row);
        }
        Self::from_rows(tile_rows, subtype_rows)
    }

    /// Renders one glyph per cell. Overlay combinations outside the legend fall
    /// back to the highest-priority marker present.
    pub fn to_ascii(&self) -> String {
        let mut text = String::with_capacity((self.width() + 1) * self.height());
        for y in 0..self.height() {
            for x in 0..self.width() {
                let pos = Pos::new(y as i32, x as i32);
                text.push(self.glyph_at(pos));
            }
            text.push('\n');
        }
        text
    }

    fn glyph_at(&self, pos: Pos) -> char {
        let tile = self.tile(pos);
        let subtypes = self.subtypes_at(pos);
        if let Some(entry) = ASCII_LEGEND
            .iter()
            .find(|entry| entry.tile == tile && SubtypeSet::of(entry.subtypes) == subtypes)
        {
            return entry.glyph;
        }
        ASCII_LEGEND
            .iter()
            .filter(|entry| entry.subtypes.len() == 1)
            .find(|entry| subtypes.contains(entry.subtypes[0]))
            .map_or(tile.display().glyph, |entry| entry.glyph)
    }
}

struct LegendEntry {
    glyph: char,
    tile: TileType,
    subtypes: &'static [Subtype],
}

const fn legend(glyph: char, tile: TileType, subtypes: &'static [Subtype]) -> LegendEntry {
    LegendEntry { glyph, tile, subtypes }
}

/// Single-marker entries are listed in fallback priority order.
const ASCII_LEGEND: &[LegendEntry] = &[
    legend('.', TileType::Floor, &[]),
    legend('#', TileType::Wall, &[]),
    legend('^', TileType::Roof, &[]),
    legend('*', TileType::Flowers, &[]),
    legend('T', TileType::Tree, &[]),
    legend(',', TileType::Grass, &[]),
    legend('~', TileType::Water, &[]),
    legend('@', TileType::Floor, &[Subtype::Player]),
    legend('E', TileType::Wall, &[Subtype::Exit]),
    legend('D', TileType::Wall, &[Subtype::Door]),
    legend('L', TileType::Wall, &[Subtype::Lock]),
    legend('K', TileType::Floor, &[Subtype::ExitKey]),
    legend('k', TileType::Floor, &[Subtype::Key]),
    legend('S', TileType::Floor, &[Subtype::Chest, Subtype::Sword]),
    legend('H', TileType::Floor, &[Subtype::Chest, Subtype::Shield]),
    legend('$', TileType::Floor, &[Subtype::Chest, Subtype::Sword, Subtype::Lock]),
    legend('%', TileType::Floor, &[Subtype::Chest, Subtype::Shield, Subtype::Lock]),
    legend('o', TileType::Floor, &[Subtype::OpenChest]),
    legend('C', TileType::Floor, &[Subtype::Chest]),
    legend('x', TileType::Floor, &[Subtype::FaultyFloor]),
    legend('l', TileType::Floor, &[Subtype::Lightswitch]),
    legend('c', TileType::Floor, &[Subtype::Checkpoint]),
    legend('R', TileType::Floor, &[Subtype::RoomTransition]),
    legend('s', TileType::Floor, &[Subtype::Snake]),
    legend('p', TileType::Floor, &[Subtype::Pot]),
    legend('f', TileType::Floor, &[Subtype::Food]),
    legend('m', TileType::Floor, &[Subtype::Med]),
    legend('r', TileType::Floor, &[Subtype::Rock]),
    legend('u', TileType::Floor, &[Subtype::Rune]),
    legend('w', TileType::Floor, &[Subtype::Sword]),
    legend('h', TileType::Floor, &[Subtype::Shield]),
    legend('t', TileType::Wall, &[Subtype::WallTorch]),
    legend('b', TileType::Floor, &[Subtype::Bed]),
    legend('n', TileType::Wall, &[Subtype::Window]),
    legend('?', TileType::Floor, &[Subtype::Sign]),
    legend('B', TileType::Wall, &[Subtype::Bookshelf]),
    legend('=', TileType::Grass, &[Subtype::RoadStraight]),
    legend('+', TileType::Grass, &[Subtype::RoadCorner]),
    legend('-', TileType::Grass, &[Subtype::RoadEnd]),
];
