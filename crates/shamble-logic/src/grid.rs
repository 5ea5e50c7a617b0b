//! Grid geometry: cells, facings and map bounds.
//!
//! The world is a flat grid addressed by integer `(x, z)` cells. Distances
//! are Chebyshev (8-connected) unless stated otherwise.

use serde::{Deserialize, Serialize};

/// A grid cell. `Cell::INVALID` is the "no cell" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub z: i32,
}

/// The eight neighbour offsets: orthogonal first (N, E, S, W), then
/// diagonal (NE, SE, SW, NW). Searches expand in this order, so paths
/// prefer straight steps on ties.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (0, 1),
    (1, 0),
    (0, -1),
    (-1, 0),
    (1, 1),
    (1, -1),
    (-1, -1),
    (-1, 1),
];

impl Cell {
    pub const INVALID: Self = Self {
        x: -1000,
        z: -1000,
    };

    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }

    /// Chebyshev distance (diagonal steps cost 1).
    pub fn chebyshev(self, other: Cell) -> u32 {
        (self.x - other.x)
            .unsigned_abs()
            .max((self.z - other.z).unsigned_abs())
    }

    /// Squared euclidean distance, used for "closer to" comparisons.
    pub fn distance_squared(self, other: Cell) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dz = (self.z - other.z) as i64;
        dx * dx + dz * dz
    }

    /// Whether `other` is this cell or one of its eight neighbours.
    pub fn is_adjacent_or_same(self, other: Cell) -> bool {
        self.chebyshev(other) <= 1
    }

    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.z + dz)
    }

    /// The eight neighbours in `NEIGHBOR_OFFSETS` order (may be out of bounds).
    pub fn neighbors(self) -> impl Iterator<Item = Cell> {
        NEIGHBOR_OFFSETS
            .into_iter()
            .map(move |(dx, dz)| self.offset(dx, dz))
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::INVALID
    }
}

/// Four-way facing, as used for rendering and "facing the target" actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rot4 {
    #[default]
    North,
    East,
    South,
    West,
}

impl Rot4 {
    /// Facing that best matches a step from `from` to `to`.
    /// Horizontal movement wins ties, matching how diagonal walks look.
    /// Returns `None` when the cells coincide.
    pub fn facing(from: Cell, to: Cell) -> Option<Self> {
        let dx = to.x - from.x;
        let dz = to.z - from.z;
        if dx == 0 && dz == 0 {
            return None;
        }
        Some(if dx.abs() >= dz.abs() {
            if dx > 0 {
                Rot4::East
            } else {
                Rot4::West
            }
        } else if dz > 0 {
            Rot4::North
        } else {
            Rot4::South
        })
    }
}

/// Rectangular map bounds `[0, width) x [0, height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapBounds {
    pub width: i32,
    pub height: i32,
}

impl MapBounds {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.z >= 0 && cell.x < self.width && cell.z < self.height
    }

    pub fn center(&self) -> Cell {
        Cell::new(self.width / 2, self.height / 2)
    }

    pub fn cell_count(&self) -> usize {
        (self.width.max(0) as usize) * (self.height.max(0) as usize)
    }

    /// Row-major index of an in-bounds cell.
    pub fn index(&self, cell: Cell) -> Option<usize> {
        if self.contains(cell) {
            Some((cell.z * self.width + cell.x) as usize)
        } else {
            None
        }
    }

    /// All in-bounds cells within Chebyshev `radius` of `center`, row by row.
    pub fn cells_within(&self, center: Cell, radius: u32) -> Vec<Cell> {
        let r = radius as i32;
        let mut cells = Vec::new();
        for z in (center.z - r)..=(center.z + r) {
            for x in (center.x - r)..=(center.x + r) {
                let cell = Cell::new(x, z);
                if self.contains(cell) {
                    cells.push(cell);
                }
            }
        }
        cells
    }
}

/// Cells on the straight line from `from` to `to` (Bresenham), excluding `from`.
pub fn line_cells(from: Cell, to: Cell) -> Vec<Cell> {
    let mut cells = Vec::new();
    let dx = (to.x - from.x).abs();
    let dz = -(to.z - from.z).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sz = if from.z < to.z { 1 } else { -1 };
    let mut err = dx + dz;
    let (mut x, mut z) = (from.x, from.z);
    while x != to.x || z != to.z {
        let e2 = 2 * err;
        if e2 >= dz {
            err += dz;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            z += sz;
        }
        cells.push(Cell::new(x, z));
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_sentinel() {
        assert!(!Cell::INVALID.is_valid());
        assert!(Cell::new(0, 0).is_valid());
        assert_eq!(Cell::default(), Cell::INVALID);
    }

    #[test]
    fn test_chebyshev() {
        let a = Cell::new(2, 2);
        assert_eq!(a.chebyshev(Cell::new(5, 3)), 3);
        assert!(a.is_adjacent_or_same(Cell::new(3, 3)));
        assert!(a.is_adjacent_or_same(a));
        assert!(!a.is_adjacent_or_same(Cell::new(4, 2)));
    }

    #[test]
    fn test_neighbors_order() {
        let n: Vec<Cell> = Cell::new(0, 0).neighbors().collect();
        assert_eq!(n.len(), 8);
        assert_eq!(n[0], Cell::new(0, 1));
        assert_eq!(n[1], Cell::new(1, 0));
        assert_eq!(n[4], Cell::new(1, 1));
    }

    #[test]
    fn test_facing() {
        let o = Cell::new(0, 0);
        assert_eq!(Rot4::facing(o, Cell::new(1, 0)), Some(Rot4::East));
        assert_eq!(Rot4::facing(o, Cell::new(0, -1)), Some(Rot4::South));
        assert_eq!(Rot4::facing(o, Cell::new(-1, 1)), Some(Rot4::West));
        assert_eq!(Rot4::facing(o, o), None);
    }

    #[test]
    fn test_bounds() {
        let b = MapBounds::new(10, 5);
        assert!(b.contains(Cell::new(9, 4)));
        assert!(!b.contains(Cell::new(10, 0)));
        assert!(!b.contains(Cell::INVALID));
        assert_eq!(b.index(Cell::new(1, 1)), Some(11));
        assert_eq!(b.cells_within(Cell::new(0, 0), 1).len(), 4);
    }

    #[test]
    fn test_line_cells() {
        let line = line_cells(Cell::new(0, 0), Cell::new(3, 0));
        assert_eq!(line, vec![Cell::new(1, 0), Cell::new(2, 0), Cell::new(3, 0)]);
        let diag = line_cells(Cell::new(0, 0), Cell::new(2, 2));
        assert_eq!(diag.last(), Some(&Cell::new(2, 2)));
    }
}
