//! Grid pathing: bounded BFS, line of sight and the colonist flow field.
//!
//! Every step (orthogonal or diagonal) costs 1. Searches are bounded by a
//! maximum cost so a zombie never plans across the whole map.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};
use shamble_logic::grid::{line_cells, Cell, MapBounds};

use crate::grid::ZombieGrid;

/// Longest path the movement executor will plan
pub const MAX_PATH_COST: u32 = 64;

/// Cost of every walkable cell reachable from `from` within `max_cost`.
/// `from` itself is always included at cost 0.
pub fn path_costs(grid: &ZombieGrid, from: Cell, max_cost: u32) -> HashMap<Cell, u32> {
    let mut costs = HashMap::new();
    let mut queue = VecDeque::new();
    costs.insert(from, 0);
    queue.push_back(from);

    while let Some(current) = queue.pop_front() {
        let cost = costs[&current];
        if cost >= max_cost {
            continue;
        }
        for next in current.neighbors() {
            if !costs.contains_key(&next) && grid.is_walkable(next) {
                costs.insert(next, cost + 1);
                queue.push_back(next);
            }
        }
    }
    costs
}

/// BFS from `from` toward `to`; returns the parent map on success.
fn search(grid: &ZombieGrid, from: Cell, to: Cell, max_cost: u32) -> Option<HashMap<Cell, (Cell, u32)>> {
    if !grid.is_walkable(to) {
        return None;
    }
    let mut parents: HashMap<Cell, (Cell, u32)> = HashMap::new();
    let mut queue = VecDeque::new();
    parents.insert(from, (from, 0));
    queue.push_back(from);

    while let Some(current) = queue.pop_front() {
        let cost = parents[&current].1;
        if current == to {
            return Some(parents);
        }
        if cost >= max_cost {
            continue;
        }
        for next in current.neighbors() {
            if !parents.contains_key(&next) && grid.is_walkable(next) {
                parents.insert(next, (current, cost + 1));
                queue.push_back(next);
            }
        }
    }
    None
}

/// Path cost from `from` to `to`, or `None` if unreachable within `max_cost`.
pub fn path_cost(grid: &ZombieGrid, from: Cell, to: Cell, max_cost: u32) -> Option<u32> {
    if from == to {
        return Some(0);
    }
    search(grid, from, to, max_cost).and_then(|p| p.get(&to).map(|&(_, cost)| cost))
}

/// First hop of a shortest path from `from` to `to`.
///
/// Returns `None` when already there or when no path exists.
pub fn next_step(grid: &ZombieGrid, from: Cell, to: Cell, max_cost: u32) -> Option<Cell> {
    if from == to {
        return None;
    }
    let parents = search(grid, from, to, max_cost)?;
    let mut step = to;
    loop {
        let (parent, _) = parents.get(&step)?;
        if *parent == from {
            return Some(step);
        }
        step = *parent;
    }
}

/// Whether `to` can be seen from `from`: no sight-blocking cell in between.
pub fn line_of_sight(grid: &ZombieGrid, from: Cell, to: Cell) -> bool {
    let cells = line_cells(from, to);
    let between = cells.len().saturating_sub(1);
    cells[..between].iter().all(|&c| !grid.blocks_sight(c))
}

/// Distance from every cell to the nearest living colonist, computed once
/// per tick with a multi-source BFS. Enraged zombies walk down it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowField {
    bounds: MapBounds,
    distances: Vec<u32>,
}

impl FlowField {
    const UNREACHED: u32 = u32::MAX;

    pub fn empty(bounds: MapBounds) -> Self {
        Self {
            bounds,
            distances: vec![Self::UNREACHED; bounds.cell_count()],
        }
    }

    pub fn build(grid: &ZombieGrid, sources: &[Cell], max_cost: u32) -> Self {
        let mut field = Self::empty(grid.bounds());
        let mut queue = VecDeque::new();
        for &source in sources {
            if let Some(i) = field.bounds.index(source) {
                if field.distances[i] != 0 {
                    field.distances[i] = 0;
                    queue.push_back(source);
                }
            }
        }

        while let Some(current) = queue.pop_front() {
            let Some(ci) = field.bounds.index(current) else {
                continue;
            };
            let cost = field.distances[ci];
            if cost >= max_cost {
                continue;
            }
            for next in current.neighbors() {
                if !grid.is_walkable(next) {
                    continue;
                }
                if let Some(ni) = field.bounds.index(next) {
                    if field.distances[ni] == Self::UNREACHED {
                        field.distances[ni] = cost + 1;
                        queue.push_back(next);
                    }
                }
            }
        }
        field
    }

    pub fn distance(&self, cell: Cell) -> Option<u32> {
        self.bounds
            .index(cell)
            .map(|i| self.distances[i])
            .filter(|&d| d != Self::UNREACHED)
    }

    pub fn has_sources(&self) -> bool {
        self.distances.contains(&0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Terrain;

    fn walled_grid() -> ZombieGrid {
        // 7x5 with a vertical rock wall at x=3 except a gap at z=4
        let mut grid = ZombieGrid::new(7, 5);
        for z in 0..4 {
            grid.set_terrain(Cell::new(3, z), Terrain::Rock { hardness: 50 });
        }
        grid
    }

    #[test]
    fn test_path_cost_open() {
        let grid = ZombieGrid::new(10, 10);
        assert_eq!(path_cost(&grid, Cell::new(0, 0), Cell::new(4, 2), 64), Some(4));
        assert_eq!(path_cost(&grid, Cell::new(1, 1), Cell::new(1, 1), 64), Some(0));
        assert_eq!(path_cost(&grid, Cell::new(0, 0), Cell::new(9, 9), 3), None);
    }

    #[test]
    fn test_path_around_wall() {
        let grid = walled_grid();
        let from = Cell::new(1, 1);
        let to = Cell::new(5, 1);
        let cost = path_cost(&grid, from, to, 64).unwrap();
        assert!(cost > 4);
        let step = next_step(&grid, from, to, 64).unwrap();
        assert!(from.is_adjacent_or_same(step));
        assert!(grid.is_walkable(step));
        // first hop must make progress along a shortest path
        assert_eq!(path_cost(&grid, step, to, 64), Some(cost - 1));
    }

    #[test]
    fn test_no_path_to_unwalkable() {
        let grid = walled_grid();
        assert_eq!(next_step(&grid, Cell::new(1, 1), Cell::new(3, 1), 64), None);
        assert_eq!(next_step(&grid, Cell::new(1, 1), Cell::new(1, 1), 64), None);
    }

    #[test]
    fn test_line_of_sight() {
        let grid = walled_grid();
        assert!(line_of_sight(&grid, Cell::new(0, 0), Cell::new(2, 3)));
        assert!(!line_of_sight(&grid, Cell::new(1, 1), Cell::new(5, 1)));
        // the target cell itself does not block
        assert!(line_of_sight(&grid, Cell::new(2, 1), Cell::new(3, 1)));
    }

    #[test]
    fn test_flow_field() {
        let grid = walled_grid();
        let field = FlowField::build(&grid, &[Cell::new(6, 0)], 64);
        assert!(field.has_sources());
        assert_eq!(field.distance(Cell::new(6, 0)), Some(0));
        assert_eq!(field.distance(Cell::new(3, 0)), None);
        let far = field.distance(Cell::new(0, 0)).unwrap();
        let near = field.distance(Cell::new(2, 4)).unwrap();
        assert!(near < far);
        assert!(!FlowField::empty(grid.bounds()).has_sources());
    }
}
