//! Floor carving for the two base-map strategies.

use crate::config::RatioBand;
use crate::rng::GameRng;
use crate::types::{Direction, Grid, Pos};

use super::connectivity::label_components;
use super::grid::{clamp_interior, floor_ratio};

const BRUSH_CHANCE: f64 = 0.15;
const EDGE_MARGIN: i32 = 2;
const STEP_BUDGET_PER_CELL: usize = 60;
const TARGET_BAND_INSET_LOW: f64 = 0.05;
const TARGET_BAND_INSET_HIGH: f64 = 0.07;

const MIN_ROOMS: usize = 3;
const MAX_ROOMS: usize = 6;
const MIN_ROOM_SIDE: usize = 3;
const MAX_ROOM_SIDE: usize = 10;
const ROOM_CENTER_JITTER: i32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) struct RoomRect {
    pub(super) x: usize,
    pub(super) y: usize,
    pub(super) width: usize,
    pub(super) height: usize,
}

impl RoomRect {
    fn right(self) -> usize {
        self.x + self.width - 1
    }

    fn bottom(self) -> usize {
        self.y + self.height - 1
    }

    pub(super) fn center(self) -> Pos {
        Pos { y: (self.y + (self.height / 2)) as i32, x: (self.x + (self.width / 2)) as i32 }
    }

    /// Room of the given size centred on `center`, shifted to stay off the perimeter.
    fn centered(
        center: Pos,
        width: usize,
        height: usize,
        grid_width: usize,
        grid_height: usize,
    ) -> Self {
        let width = width.min(grid_width - 2);
        let height = height.min(grid_height - 2);
        let max_x = grid_width - 1 - width;
        let max_y = grid_height - 1 - height;
        let x = (center.x - (width / 2) as i32).clamp(1, max_x as i32) as usize;
        let y = (center.y - (height / 2) as i32).clamp(1, max_y as i32) as usize;
        Self { x, y, width, height }
    }

    /// Grows by one row or column on `side` if the grid interior allows it.
    fn grown(self, side: Direction, grid_width: usize, grid_height: usize) -> Option<Self> {
        match side {
            Direction::Up if self.y > 1 => {
                Some(Self { y: self.y - 1, height: self.height + 1, ..self })
            }
            Direction::Down if self.bottom() < grid_height - 2 => {
                Some(Self { height: self.height + 1, ..self })
            }
            Direction::Left if self.x > 1 => {
                Some(Self { x: self.x - 1, width: self.width + 1, ..self })
            }
            Direction::Right if self.right() < grid_width - 2 => {
                Some(Self { width: self.width + 1, ..self })
            }
            _ => None,
        }
    }
}

/// Random walk from the centre until a target ratio inside `band` is carved.
pub(super) fn carve_perimeter_biased(
    width: usize,
    height: usize,
    band: RatioBand,
    rng: &mut dyn GameRng,
) -> Grid<bool> {
    let mut mask = Grid::new(width, height, false);
    let low = (band.min + TARGET_BAND_INSET_LOW).min(band.max);
    let high = (band.max - TARGET_BAND_INSET_HIGH).max(low);
    let target_ratio = rng.range_f64(low, high);
    let target_cells = (target_ratio * mask.len() as f64).ceil() as usize;
    let interior_cells = width.saturating_sub(2) * height.saturating_sub(2);
    let target_cells = target_cells.min(interior_cells);

    let center = Pos::new(height as i32 / 2, width as i32 / 2);
    let mut walker = center;
    mask[walker] = true;
    let mut carved = 1_usize;

    let max_steps = width * height * STEP_BUDGET_PER_CELL;
    for _ in 0..max_steps {
        if carved >= target_cells {
            break;
        }
        let direction = if near_edge(walker, width, height) && rng.chance(0.5) {
            toward(walker, center)
        } else {
            Direction::ALL[rng.range_usize(0, 3)]
        };
        walker = clamp_interior(walker.step(direction), width, height);
        carved += carve_cell(&mut mask, walker);

        if rng.chance(BRUSH_CHANCE) {
            for next in walker.neighbors4() {
                if !mask.is_perimeter(next) {
                    carved += carve_cell(&mut mask, next);
                }
            }
        }
    }
    mask
}

fn carve_cell(mask: &mut Grid<bool>, pos: Pos) -> usize {
    match mask.get_mut(pos) {
        Some(cell) if !*cell => {
            *cell = true;
            1
        }
        _ => 0,
    }
}

fn near_edge(pos: Pos, width: usize, height: usize) -> bool {
    pos.y <= EDGE_MARGIN
        || pos.x <= EDGE_MARGIN
        || pos.y >= height as i32 - 1 - EDGE_MARGIN
        || pos.x >= width as i32 - 1 - EDGE_MARGIN
}

fn toward(from: Pos, to: Pos) -> Direction {
    let dy = to.y - from.y;
    let dx = to.x - from.x;
    if dy.abs() >= dx.abs() {
        if dy < 0 { Direction::Up } else { Direction::Down }
    } else if dx < 0 {
        Direction::Left
    } else {
        Direction::Right
    }
}

#[derive(Clone, Debug)]
pub(super) struct RoomLayout {
    pub(super) mask: Grid<bool>,
    /// Components of the union of room rectangles, corridors excluded.
    pub(super) merged_room_count: usize,
}

/// Seeds rooms near the centre, links them, then grows rooms until the floor
/// ratio reaches `band.min`.
pub(super) fn carve_center_out(
    width: usize,
    height: usize,
    band: RatioBand,
    rng: &mut dyn GameRng,
) -> RoomLayout {
    let center = Pos::new(height as i32 / 2, width as i32 / 2);
    let room_count = rng.range_usize(MIN_ROOMS, MAX_ROOMS);
    let mut rooms = Vec::with_capacity(room_count);
    for _ in 0..room_count {
        let room_width = rng.range_usize(MIN_ROOM_SIDE, MAX_ROOM_SIDE);
        let room_height = rng.range_usize(MIN_ROOM_SIDE, MAX_ROOM_SIDE);
        let room_center = Pos::new(center.y + jitter(rng), center.x + jitter(rng));
        rooms.push(RoomRect::centered(room_center, room_width, room_height, width, height));
    }

    let mut room_mask = Grid::new(width, height, false);
    for room in &rooms {
        carve_room(&mut room_mask, room);
    }
    let mut mask = room_mask.clone();
    for pair in rooms.windows(2) {
        let horizontal_first = rng.chance(0.5);
        carve_l_shaped_corridor(&mut mask, pair[0].center(), pair[1].center(), horizontal_first);
    }

    while floor_ratio(&mask) < band.min {
        let index = rng.range_usize(0, rooms.len() - 1);
        let first_side = rng.range_usize(0, 3);
        let grown = (0..4)
            .map(|offset| Direction::ALL[(first_side + offset) % 4])
            .find_map(|side| rooms[index].grown(side, width, height));
        match grown {
            Some(room) => {
                rooms[index] = room;
                carve_room(&mut room_mask, &room);
                carve_room(&mut mask, &room);
            }
            None if rooms.iter().all(|room| {
                Direction::ALL.iter().all(|side| room.grown(*side, width, height).is_none())
            }) =>
            {
                break;
            }
            None => {}
        }
    }

    let (_, sizes) = label_components(&room_mask);
    RoomLayout { mask, merged_room_count: sizes.len() }
}

fn jitter(rng: &mut dyn GameRng) -> i32 {
    rng.range_usize(0, (ROOM_CENTER_JITTER * 2) as usize) as i32 - ROOM_CENTER_JITTER
}

pub(super) fn carve_room(mask: &mut Grid<bool>, room: &RoomRect) {
    for y in room.y..=room.bottom() {
        for x in room.x..=room.right() {
            mask[Pos { y: y as i32, x: x as i32 }] = true;
        }
    }
}

fn carve_l_shaped_corridor(mask: &mut Grid<bool>, start: Pos, end: Pos, horizontal_first: bool) {
    if horizontal_first {
        carve_horizontal_line(mask, start.y, start.x, end.x);
        carve_vertical_line(mask, end.x, start.y, end.y);
    } else {
        carve_vertical_line(mask, start.x, start.y, end.y);
        carve_horizontal_line(mask, end.y, start.x, end.x);
    }
}

fn carve_horizontal_line(mask: &mut Grid<bool>, y: i32, left_x: i32, right_x: i32) {
    for x in left_x.min(right_x)..=left_x.max(right_x) {
        carve_interior(mask, Pos { y, x });
    }
}

fn carve_vertical_line(mask: &mut Grid<bool>, x: i32, top_y: i32, bottom_y: i32) {
    for y in top_y.min(bottom_y)..=top_y.max(bottom_y) {
        carve_interior(mask, Pos { y, x });
    }
}

fn carve_interior(mask: &mut Grid<bool>, pos: Pos) {
    if mask.in_bounds(pos) && !mask.is_perimeter(pos) {
        mask[pos] = true;
    }
}
