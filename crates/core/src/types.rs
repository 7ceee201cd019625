use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter, EnumString, IntoEnumIterator};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub y: i32,
    pub x: i32,
}

impl Pos {
    pub const fn new(y: i32, x: i32) -> Self {
        Self { y, x }
    }

    pub fn step(self, direction: Direction) -> Self {
        let (dy, dx) = direction.delta();
        Self { y: self.y + dy, x: self.x + dx }
    }

    pub fn manhattan(self, other: Pos) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    pub fn chebyshev(self, other: Pos) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    pub fn euclidean(self, other: Pos) -> f64 {
        let dy = f64::from(self.y - other.y);
        let dx = f64::from(self.x - other.x);
        (dy * dy + dx * dx).sqrt()
    }

    /// Orthogonal neighbours in up, right, down, left order.
    pub fn neighbors4(self) -> [Pos; 4] {
        [
            Pos { y: self.y - 1, x: self.x },
            Pos { y: self.y, x: self.x + 1 },
            Pos { y: self.y + 1, x: self.x },
            Pos { y: self.y, x: self.x - 1 },
        ]
    }
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[derive(EnumIter, Display, EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Direction {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Self::Up, Self::Right, Self::Down, Self::Left];

    /// Row/column delta as `(dy, dx)`.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (-1, 0),
            Self::Down => (1, 0),
            Self::Left => (0, -1),
            Self::Right => (0, 1),
        }
    }

    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Direction of a single orthogonal step, if `from` and `to` are adjacent.
    pub fn between(from: Pos, to: Pos) -> Option<Self> {
        Self::iter().find(|direction| from.step(*direction) == to)
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[derive(EnumIter, EnumCount, Display, EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum TileType {
    Floor,
    Wall,
    Roof,
    Flowers,
    Tree,
    Grass,
    Water,
}

impl TileType {
    pub const fn is_walkable(self) -> bool {
        matches!(self, Self::Floor | Self::Flowers | Self::Grass)
    }

    pub const fn display(self) -> TileDisplay {
        let (name, glyph, color) = match self {
            Self::Floor => ("Floor", '.', "#3b3b45"),
            Self::Wall => ("Wall", '#', "#1c1c22"),
            Self::Roof => ("Roof", '^', "#6b2f2a"),
            Self::Flowers => ("Flowers", '*', "#c77dba"),
            Self::Tree => ("Tree", 'T', "#2f6b35"),
            Self::Grass => ("Grass", ',', "#4f8a3c"),
            Self::Water => ("Water", '~', "#2a5d8f"),
        };
        TileDisplay { tile: self, name, glyph, color }
    }

    pub(crate) const fn canonical_code(self) -> u8 {
        match self {
            Self::Floor => 0,
            Self::Wall => 1,
            Self::Roof => 2,
            Self::Flowers => 3,
            Self::Tree => 4,
            Self::Grass => 5,
            Self::Water => 6,
        }
    }
}

/// Presentation metadata for a terrain type, consumed by renderers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileDisplay {
    pub tile: TileType,
    pub name: &'static str,
    pub glyph: char,
    pub color: &'static str,
}

pub fn tile_types() -> BTreeMap<TileType, TileDisplay> {
    TileType::iter().map(|tile| (tile, tile.display())).collect()
}

/// Overlay markers. The discriminant doubles as the bit index inside [`SubtypeSet`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[derive(EnumIter, EnumCount, Display, EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Subtype {
    Player,
    Exit,
    ExitKey,
    Key,
    Lock,
    Door,
    Chest,
    OpenChest,
    Sword,
    Shield,
    Lightswitch,
    FaultyFloor,
    Rock,
    Pot,
    Food,
    Med,
    Rune,
    Snake,
    RoomTransition,
    WallTorch,
    Checkpoint,
    RoadStraight,
    RoadCorner,
    RoadEnd,
    Bed,
    Window,
    Sign,
    Bookshelf,
}

const _: () = assert!(<Subtype as EnumCount>::COUNT <= 64);

impl Subtype {
    const fn bit(self) -> u64 {
        1_u64 << (self as u8)
    }

    /// Markers a thrown item may never land on.
    pub const fn is_reserved_landing(self) -> bool {
        matches!(
            self,
            Self::Exit
                | Self::Door
                | Self::ExitKey
                | Self::Key
                | Self::Lock
                | Self::Chest
                | Self::RoomTransition
                | Self::Checkpoint
                | Self::Lightswitch
                | Self::Rock
                | Self::Rune
        )
    }

    /// Markers that stop movement on an otherwise walkable cell.
    pub const fn is_obstacle(self) -> bool {
        matches!(self, Self::Pot | Self::Chest)
    }
}

#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Subtype>", into = "Vec<Subtype>")]
pub struct SubtypeSet(u64);

impl SubtypeSet {
    pub const EMPTY: Self = Self(0);

    pub fn of(subtypes: &[Subtype]) -> Self {
        subtypes.iter().copied().collect()
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    pub const fn contains(self, subtype: Subtype) -> bool {
        self.0 & subtype.bit() != 0
    }

    pub fn contains_any(self, subtypes: &[Subtype]) -> bool {
        subtypes.iter().any(|subtype| self.contains(*subtype))
    }

    /// Returns true when the subtype was not already present.
    pub fn insert(&mut self, subtype: Subtype) -> bool {
        let added = !self.contains(subtype);
        self.0 |= subtype.bit();
        added
    }

    /// Returns true when the subtype was present.
    pub fn remove(&mut self, subtype: Subtype) -> bool {
        let removed = self.contains(subtype);
        self.0 &= !subtype.bit();
        removed
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(self) -> impl Iterator<Item = Subtype> {
        Subtype::iter().filter(move |subtype| self.contains(*subtype))
    }
}

impl FromIterator<Subtype> for SubtypeSet {
    fn from_iter<I: IntoIterator<Item = Subtype>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for subtype in iter {
            set.insert(subtype);
        }
        set
    }
}

impl From<Vec<Subtype>> for SubtypeSet {
    fn from(subtypes: Vec<Subtype>) -> Self {
        subtypes.into_iter().collect()
    }
}

impl From<SubtypeSet> for Vec<Subtype> {
    fn from(set: SubtypeSet) -> Self {
        set.iter().collect()
    }
}

impl fmt::Debug for SubtypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[derive(Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Cave,
    Outdoor,
    House,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MapShapeError {
    #[error("grid has no rows")]
    Empty,
    #[error("row {row} has width {found}, expected {expected}")]
    RaggedRow { row: usize, expected: usize, found: usize },
    #[error("grid stores {found} cells but declares {width}x{height}")]
    CellCount { width: usize, height: usize, found: usize },
    #[error(
        "tile grid is {tiles_width}x{tiles_height} but subtype grid is {subtypes_width}x{subtypes_height}"
    )]
    DimensionMismatch {
        tiles_width: usize,
        tiles_height: usize,
        subtypes_width: usize,
        subtypes_height: usize,
    },
    #[error("unknown map glyph {glyph:?} at {pos:?}")]
    UnknownGlyph { glyph: char, pos: Pos },
}

/// Row-major rectangular storage addressed by [`Pos`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    pub fn new(width: usize, height: usize, fill: T) -> Self {
        Self { width, height, cells: vec![fill; width * height] }
    }
}

impl<T> Grid<T> {
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, MapShapeError> {
        let height = rows.len();
        let Some(width) = rows.first().map(Vec::len) else {
            return Err(MapShapeError::Empty);
        };
        let mut cells = Vec::with_capacity(width * height);
        for (row_index, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(MapShapeError::RaggedRow {
                    row: row_index,
                    expected: width,
                    found: row.len(),
                });
            }
            cells.extend(row);
        }
        Ok(Self { width, height, cells })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn check_shape(&self) -> Result<(), MapShapeError> {
        if self.cells.len() == self.width * self.height {
            Ok(())
        } else {
            Err(MapShapeError::CellCount {
                width: self.width,
                height: self.height,
                found: self.cells.len(),
            })
        }
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    pub fn is_perimeter(&self, pos: Pos) -> bool {
        self.in_bounds(pos)
            && (pos.x == 0
                || pos.y == 0
                || pos.x as usize == self.width - 1
                || pos.y as usize == self.height - 1)
    }

    pub fn get(&self, pos: Pos) -> Option<&T> {
        self.offset(pos).map(|offset| &self.cells[offset])
    }

    pub fn get_mut(&mut self, pos: Pos) -> Option<&mut T> {
        self.offset(pos).map(|offset| &mut self.cells[offset])
    }

    /// Every position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Pos> + use<T> {
        let width = self.width;
        (0..self.height)
            .flat_map(move |y| (0..width).map(move |x| Pos { y: y as i32, x: x as i32 }))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Pos, &T)> {
        self.positions().zip(self.cells.iter())
    }

    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        self.cells.chunks(self.width.max(1))
    }

    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Grid<U> {
        Grid { width: self.width, height: self.height, cells: self.cells.iter().map(f).collect() }
    }

    fn offset(&self, pos: Pos) -> Option<usize> {
        self.in_bounds(pos).then(|| (pos.y as usize) * self.width + (pos.x as usize))
    }
}

impl Grid<bool> {
    pub fn count_true(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell).count()
    }
}

impl<T> Index<Pos> for Grid<T> {
    type Output = T;

    fn index(&self, pos: Pos) -> &T {
        match self.offset(pos) {
            Some(offset) => &self.cells[offset],
            None => panic!("{pos:?} is outside the {}x{} grid", self.width, self.height),
        }
    }
}

impl<T> IndexMut<Pos> for Grid<T> {
    fn index_mut(&mut self, pos: Pos) -> &mut T {
        match self.offset(pos) {
            Some(offset) => &mut self.cells[offset],
            None => panic!("{pos:?} is outside the {}x{} grid", self.width, self.height),
        }
    }
}
