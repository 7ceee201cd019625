//! Flood fill, component labelling, and chokepoint search over passability masks.

use std::collections::{BTreeMap, VecDeque};

use crate::types::{Grid, Pos};

/// Cells 4-connected to `start` through passable cells. Empty when `start`
/// itself is not passable.
pub fn flood_fill(mask: &Grid<bool>, start: Pos) -> Grid<bool> {
    let mut seen = Grid::new(mask.width(), mask.height(), false);
    if !mask.get(start).copied().unwrap_or(false) {
        return seen;
    }

    seen[start] = true;
    let mut open = VecDeque::from([start]);
    while let Some(pos) = open.pop_front() {
        for next in pos.neighbors4() {
            if mask.get(next).copied().unwrap_or(false) && !seen[next] {
                seen[next] = true;
                open.push_back(next);
            }
        }
    }
    seen
}

/// Component id per passable cell and the size of each component. Ids follow
/// the row-major order of each component's first cell.
pub fn label_components(mask: &Grid<bool>) -> (Grid<Option<usize>>, Vec<usize>) {
    let mut labels = Grid::new(mask.width(), mask.height(), None);
    let mut sizes = Vec::new();

    for seed in mask.positions() {
        if !mask[seed] || labels[seed].is_some() {
            continue;
        }
        let id = sizes.len();
        let mut size = 0_usize;
        labels[seed] = Some(id);
        let mut open = VecDeque::from([seed]);
        while let Some(pos) = open.pop_front() {
            size += 1;
            for next in pos.neighbors4() {
                if mask.get(next).copied().unwrap_or(false) && labels[next].is_none() {
                    labels[next] = Some(id);
                    open.push_back(next);
                }
            }
        }
        sizes.push(size);
    }

    (labels, sizes)
}

pub fn is_connected(mask: &Grid<bool>) -> bool {
    let Some(start) = mask.positions().find(|pos| mask[*pos]) else {
        return true;
    };
    flood_fill(mask, start).count_true() == mask.count_true()
}

/// Components with at least two cells; single-cell pockets are noise.
pub fn count_rooms(mask: &Grid<bool>) -> usize {
    let (_, sizes) = label_components(mask);
    sizes.into_iter().filter(|&size| size >= 2).count()
}

/// First interior wall cell (row-major) that is the sole connector between
/// exactly two non-trivial components.
pub fn find_strategic_door(mask: &Grid<bool>) -> Option<Pos> {
    let (labels, sizes) = label_components(mask);

    let mut candidates = Vec::new();
    let mut connectors: BTreeMap<(usize, usize), usize> = BTreeMap::new();
    for pos in mask.positions() {
        if mask[pos] || mask.is_perimeter(pos) {
            continue;
        }
        let mut touching: Vec<usize> = pos
            .neighbors4()
            .into_iter()
            .filter_map(|next| labels.get(next).copied().flatten())
            .collect();
        touching.sort_unstable();
        touching.dedup();
        // A wall beside three regions still joins every pair among them.
        for (i, &first) in touching.iter().enumerate() {
            for &second in &touching[i + 1..] {
                *connectors.entry((first, second)).or_default() += 1;
            }
        }
        if let [first, second] = touching[..] {
            candidates.push((pos, (first, second)));
        }
    }

    candidates
        .into_iter()
        .find(|(_, (first, second))| {
            sizes[*first] >= 2 && sizes[*second] >= 2 && connectors[&(*first, *second)] == 1
        })
        .map(|(pos, _)| pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_from(rows: &[&str]) -> Grid<bool> {
        Grid::from_rows(rows.iter().map(|row| row.chars().map(|c| c == '.').collect()).collect())
            .expect("test masks are rectangular")
    }

    #[test]
    fn flood_fill_stops_at_walls() {
        let mask = mask_from(&["#####", "#..##", "##.##", "###.#", "#####"]);
        let filled = flood_fill(&mask, Pos::new(1, 1));
        assert_eq!(filled.count_true(), 3);
        assert!(!filled[Pos::new(3, 3)]);
    }

    #[test]
    fn flood_fill_from_wall_is_empty() {
        let mask = mask_from(&["###", "#.#", "###"]);
        assert_eq!(flood_fill(&mask, Pos::new(0, 0)).count_true(), 0);
    }

    #[test]
    fn components_are_labelled_in_row_major_order() {
        let mask = mask_from(&["#######", "#..#..#", "#######", "#.#####", "#######"]);
        let (labels, sizes) = label_components(&mask);
        assert_eq!(sizes, vec![2, 2, 1]);
        assert_eq!(labels[Pos::new(1, 1)], Some(0));
        assert_eq!(labels[Pos::new(1, 5)], Some(1));
        assert_eq!(labels[Pos::new(3, 1)], Some(2));
        assert_eq!(count_rooms(&mask), 2);
        assert!(!is_connected(&mask));
    }

    #[test]
    fn empty_mask_is_connected() {
        let mask = mask_from(&["###", "###"]);
        assert!(is_connected(&mask));
        assert_eq!(count_rooms(&mask), 0);
    }

    #[test]
    fn strategic_door_is_the_unique_connector() {
        let mask = mask_from(&[
            "#########",
            "#...#...#",
            "#...#...#",
            "#########",
        ]);
        // Two connectors join the rooms, so neither qualifies.
        assert_eq!(find_strategic_door(&mask), None);

        let mask = mask_from(&[
            "#########",
            "#...#...#",
            "#...#####",
            "#########",
        ]);
        assert_eq!(find_strategic_door(&mask), Some(Pos::new(1, 4)));
    }

    #[test]
    fn walls_beside_three_regions_count_as_connectors() {
        let mask = mask_from(&["#######", "#..#..#", "#..#..#", "###.###", "###.###", "#######"]);
        // (2,3) joins the top rooms as well as the shaft below, so (1,3) is not unique.
        assert_eq!(find_strategic_door(&mask), None);
    }

    #[test]
    fn strategic_door_ignores_single_cell_pockets() {
        let mask = mask_from(&["#######", "#...#.#", "#...###", "#######"]);
        assert_eq!(find_strategic_door(&mask), None);
    }

    #[test]
    fn strategic_door_scans_row_major() {
        let mask = mask_from(&[
            "#########",
            "#..#..#.#",
            "#..#..#.#",
            "####..###",
            "#########",
        ]);
        // (1,3) and (2,3) both join the left pair; (1,6) and (2,6) both join the right pair.
        assert_eq!(find_strategic_door(&mask), None);

        let mask = mask_from(&[
            "#########",
            "#..#..#.#",
            "#..####.#",
            "####..###",
            "#########",
        ]);
        assert_eq!(find_strategic_door(&mask), Some(Pos::new(1, 3)));
    }
}
