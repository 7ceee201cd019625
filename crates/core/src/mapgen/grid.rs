//! Tile-space helpers used by layout validation and feature placement.

use crate::map::MapData;
use crate::types::{Direction, Grid, Pos, TileType};

pub(super) fn floor_ratio(mask: &Grid<bool>) -> f64 {
    if mask.is_empty() {
        return 0.0;
    }
    mask.count_true() as f64 / mask.len() as f64
}

pub(super) fn perimeter_wall_ratio(mask: &Grid<bool>) -> f64 {
    let mut perimeter = 0_usize;
    let mut walls = 0_usize;
    for pos in mask.positions() {
        if mask.is_perimeter(pos) {
            perimeter += 1;
            walls += usize::from(!mask[pos]);
        }
    }
    if perimeter == 0 {
        return 0.0;
    }
    walls as f64 / perimeter as f64
}

pub(super) fn clamp_interior(pos: Pos, width: usize, height: usize) -> Pos {
    Pos {
        y: pos.y.clamp(1, height as i32 - 2),
        x: pos.x.clamp(1, width as i32 - 2),
    }
}

pub(super) fn floor_neighbor_count(map: &MapData, pos: Pos) -> usize {
    pos.neighbors4().into_iter().filter(|next| map.tile(*next) == TileType::Floor).count()
}

pub(super) fn is_dead_end(map: &MapData, pos: Pos) -> bool {
    floor_neighbor_count(map, pos) == 1
}

/// Floor cell whose only floor neighbours sit on opposite sides.
pub(super) fn is_corridor(map: &MapData, pos: Pos) -> bool {
    let floor = |direction: Direction| map.tile(pos.step(direction)) == TileType::Floor;
    let vertical = floor(Direction::Up) && floor(Direction::Down);
    let horizontal = floor(Direction::Left) && floor(Direction::Right);
    map.tile(pos) == TileType::Floor
        && floor_neighbor_count(map, pos) == 2
        && (vertical || horizontal)
}

/// Eligible cell farthest from `from` by Manhattan distance; the first cell in
/// row-major order wins ties.
pub(super) fn farthest_eligible_cell(map: &MapData, from: Pos) -> Option<(Pos, u32)> {
    let mut best: Option<(Pos, u32)> = None;
    for pos in map.eligible_cells() {
        let distance = pos.manhattan(from);
        if best.is_none_or(|(_, best_distance)| distance > best_distance) {
            best = Some((pos, distance));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn farthest_cell_prefers_first_in_row_major_order() {
        let map = MapData::from_ascii(
            "
            #######
            #.....#
            #.###.#
            #.....#
            ###E###
            ",
        )
        .expect("fixture should parse");
        let (pos, distance) =
            farthest_eligible_cell(&map, Pos::new(4, 3)).expect("floor cells exist");
        assert_eq!(distance, 5);
        assert_eq!(pos, Pos::new(1, 1));
    }

    #[test]
    fn corridor_cells_have_two_opposite_floor_neighbours() {
        let map = MapData::from_ascii(
            "
            #######
            #..#..#
            #.....#
            #..#..#
            #######
            ",
        )
        .expect("fixture should parse");
        assert!(is_corridor(&map, Pos::new(2, 3)));
        assert!(!is_corridor(&map, Pos::new(2, 2)));
        assert!(!is_corridor(&map, Pos::new(1, 1)));
    }

    #[test]
    fn perimeter_ratio_counts_border_walls() {
        let mut mask = Grid::new(4, 4, false);
        mask[Pos::new(0, 1)] = true;
        mask[Pos::new(1, 1)] = true;
        assert_eq!(perimeter_wall_ratio(&mask), 11.0 / 12.0);
        assert_eq!(floor_ratio(&mask), 2.0 / 16.0);
    }
}
