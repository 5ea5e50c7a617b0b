//! The grid query surface: terrain, fire, scent and occupancy per cell.
//!
//! Entities live in the ECS world; the grid keeps the per-cell facts the
//! resolver needs without scanning the world (terrain, fire, colonist
//! scent, how many zombies stand there, whether an obstacle blocks it).

use serde::{Deserialize, Serialize};
use shamble_logic::grid::{Cell, MapBounds};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Terrain {
    #[default]
    Floor,
    /// Natural rock, excavatable by miners. `hardness` is dig work needed.
    Rock { hardness: u16 },
    /// Map edge / impassable natural wall
    Wall,
    /// Walkable but deadly (deep chemfuel, lava)
    Lethal,
}

impl Terrain {
    pub fn is_passable(self) -> bool {
        matches!(self, Terrain::Floor | Terrain::Lethal)
    }

    pub fn blocks_sight(self) -> bool {
        matches!(self, Terrain::Rock { .. } | Terrain::Wall)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CellInfo {
    pub terrain: Terrain,
    pub fire: bool,
    /// Tick a colonist last stood here (0 = never)
    pub scent: u64,
    pub zombies: u16,
    /// An obstacle entity stands here
    pub blocked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZombieGrid {
    bounds: MapBounds,
    cells: Vec<CellInfo>,
}

impl ZombieGrid {
    pub fn new(width: i32, height: i32) -> Self {
        let bounds = MapBounds::new(width, height);
        Self {
            bounds,
            cells: vec![CellInfo::default(); bounds.cell_count()],
        }
    }

    pub fn bounds(&self) -> MapBounds {
        self.bounds
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        self.bounds.contains(cell)
    }

    pub fn info(&self, cell: Cell) -> Option<&CellInfo> {
        self.bounds.index(cell).map(|i| &self.cells[i])
    }

    fn info_mut(&mut self, cell: Cell) -> Option<&mut CellInfo> {
        self.bounds.index(cell).map(|i| &mut self.cells[i])
    }

    pub fn terrain(&self, cell: Cell) -> Option<Terrain> {
        self.info(cell).map(|c| c.terrain)
    }

    pub fn set_terrain(&mut self, cell: Cell, terrain: Terrain) {
        if let Some(c) = self.info_mut(cell) {
            c.terrain = terrain;
        }
    }

    /// In bounds, passable terrain and not blocked by an obstacle.
    pub fn is_walkable(&self, cell: Cell) -> bool {
        self.info(cell)
            .is_some_and(|c| c.terrain.is_passable() && !c.blocked)
    }

    pub fn blocks_sight(&self, cell: Cell) -> bool {
        self.info(cell).map_or(true, |c| c.terrain.blocks_sight())
    }

    pub fn is_lethal(&self, cell: Cell) -> bool {
        self.terrain(cell) == Some(Terrain::Lethal)
    }

    pub fn rock_hardness(&self, cell: Cell) -> Option<u16> {
        match self.terrain(cell) {
            Some(Terrain::Rock { hardness }) => Some(hardness),
            _ => None,
        }
    }

    pub fn has_fire(&self, cell: Cell) -> bool {
        self.info(cell).is_some_and(|c| c.fire)
    }

    pub fn set_fire(&mut self, cell: Cell, fire: bool) {
        if let Some(c) = self.info_mut(cell) {
            c.fire = fire;
        }
    }

    pub fn is_blocked(&self, cell: Cell) -> bool {
        self.info(cell).is_some_and(|c| c.blocked)
    }

    pub fn set_blocked(&mut self, cell: Cell, blocked: bool) {
        if let Some(c) = self.info_mut(cell) {
            c.blocked = blocked;
        }
    }

    pub fn scent(&self, cell: Cell) -> u64 {
        self.info(cell).map_or(0, |c| c.scent)
    }

    pub fn mark_scent(&mut self, cell: Cell, tick: u64) {
        if let Some(c) = self.info_mut(cell) {
            c.scent = c.scent.max(tick);
        }
    }

    pub fn zombie_count(&self, cell: Cell) -> u16 {
        self.info(cell).map_or(0, |c| c.zombies)
    }

    pub fn add_zombie(&mut self, cell: Cell) {
        if let Some(c) = self.info_mut(cell) {
            c.zombies = c.zombies.saturating_add(1);
        }
    }

    pub fn remove_zombie(&mut self, cell: Cell) {
        if let Some(c) = self.info_mut(cell) {
            c.zombies = c.zombies.saturating_sub(1);
        }
    }

    pub fn move_zombie(&mut self, from: Cell, to: Cell) {
        self.remove_zombie(from);
        self.add_zombie(to);
    }

    /// Other zombies within `radius` of `center`, not counting one standing
    /// at `center` itself (the asking zombie).
    pub fn herd_size(&self, center: Cell, radius: u32) -> u32 {
        let total: u32 = self
            .bounds
            .cells_within(center, radius)
            .into_iter()
            .map(|c| self.zombie_count(c) as u32)
            .sum();
        total.saturating_sub(1)
    }

    pub fn clear_zombie_counts(&mut self) {
        for c in &mut self.cells {
            c.zombies = 0;
        }
    }

    /// Zombie count summed over every cell
    pub fn total_zombies(&self) -> u32 {
        self.cells.iter().map(|c| c.zombies as u32).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walkability() {
        let mut grid = ZombieGrid::new(5, 5);
        let c = Cell::new(2, 2);
        assert!(grid.is_walkable(c));
        grid.set_terrain(c, Terrain::Rock { hardness: 10 });
        assert!(!grid.is_walkable(c));
        assert_eq!(grid.rock_hardness(c), Some(10));
        grid.set_terrain(c, Terrain::Lethal);
        assert!(grid.is_walkable(c));
        assert!(grid.is_lethal(c));
        grid.set_blocked(c, true);
        assert!(!grid.is_walkable(c));
        assert!(!grid.is_walkable(Cell::new(5, 0)));
        assert!(!grid.is_walkable(Cell::INVALID));
    }

    #[test]
    fn test_herd_size_excludes_self() {
        let mut grid = ZombieGrid::new(10, 10);
        let me = Cell::new(5, 5);
        grid.add_zombie(me);
        assert_eq!(grid.herd_size(me, 2), 0);
        grid.add_zombie(Cell::new(6, 6));
        grid.add_zombie(Cell::new(7, 7));
        grid.add_zombie(Cell::new(9, 9));
        assert_eq!(grid.herd_size(me, 2), 2);
        grid.move_zombie(Cell::new(7, 7), Cell::new(8, 8));
        assert_eq!(grid.herd_size(me, 2), 1);
        assert_eq!(grid.total_zombies(), 4);
    }

    #[test]
    fn test_scent_keeps_latest() {
        let mut grid = ZombieGrid::new(3, 3);
        let c = Cell::new(1, 1);
        grid.mark_scent(c, 50);
        grid.mark_scent(c, 20);
        assert_eq!(grid.scent(c), 50);
    }
}
