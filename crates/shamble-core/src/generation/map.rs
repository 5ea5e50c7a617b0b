//! Map generation: terrain, a walled colony and the initial population

use hecs::{Entity, World};
use rand::Rng;
use serde::{Deserialize, Serialize};
use shamble_logic::grid::Cell;
use shamble_logic::roles::ZombieState;
use shamble_logic::settings::ZombieSettings;

use super::population::*;
use crate::components::*;
use crate::grid::{Terrain, ZombieGrid};

/// Ticks an emerging zombie spends climbing out
pub const EMERGE_TICKS: u32 = 60;
/// Ticks a floating zombie drifts before landing
pub const FLOAT_TICKS: u32 = 120;

const PLACEMENT_ATTEMPTS: u32 = 200;

/// Configuration for map generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    pub width: i32,
    pub height: i32,
    pub zombies: u32,
    pub colonists: u32,
    pub animals: u32,
    pub corpses: u32,
    /// Chance that an open cell outside the colony is rock
    pub rock_density: f32,
    /// Half-size of the walled colony square
    pub colony_radius: i32,
    pub fire_cells: u32,
    pub lethal_cells: u32,
    /// Fraction of zombies that start in the ground
    pub emerging_fraction: f32,
    /// Fraction of zombies that start floating (if floating zombies are enabled)
    pub floating_fraction: f32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 64,
            zombies: 40,
            colonists: 6,
            animals: 8,
            corpses: 4,
            rock_density: 0.08,
            colony_radius: 5,
            fire_cells: 3,
            lethal_cells: 3,
            emerging_fraction: 0.1,
            floating_fraction: 0.05,
        }
    }
}

/// What generation produced
#[derive(Debug, Clone)]
pub struct MapLayout {
    pub colony_center: Cell,
    pub zombies: Vec<Entity>,
    pub colonists: Vec<Entity>,
}

/// Generate a complete map into an empty world and grid.
pub fn generate_map(
    world: &mut World,
    grid: &mut ZombieGrid,
    config: &MapConfig,
    settings: &ZombieSettings,
    rng: &mut impl Rng,
) -> MapLayout {
    let bounds = grid.bounds();
    let center = bounds.center();
    let r = config.colony_radius.max(2);

    // Border
    for x in 0..bounds.width {
        grid.set_terrain(Cell::new(x, 0), Terrain::Wall);
        grid.set_terrain(Cell::new(x, bounds.height - 1), Terrain::Wall);
    }
    for z in 0..bounds.height {
        grid.set_terrain(Cell::new(0, z), Terrain::Wall);
        grid.set_terrain(Cell::new(bounds.width - 1, z), Terrain::Wall);
    }

    // Colony walls with a door in the middle of each side
    for d in -r..=r {
        for cell in [
            center.offset(d, -r),
            center.offset(d, r),
            center.offset(-r, d),
            center.offset(r, d),
        ] {
            if grid.is_walkable(cell) {
                let kind = if d == 0 { ObstacleKind::Door } else { ObstacleKind::Wall };
                spawn_obstacle(world, grid, cell, kind);
            }
        }
    }

    // Rock outside the colony
    for z in 1..bounds.height - 1 {
        for x in 1..bounds.width - 1 {
            let cell = Cell::new(x, z);
            if cell.chebyshev(center) > (r + 2) as u32 && rng.gen::<f32>() < config.rock_density {
                let hardness = rng.gen_range(20..=80);
                grid.set_terrain(cell, Terrain::Rock { hardness });
            }
        }
    }

    let outside = |c: Cell| c.chebyshev(center) > (r + 2) as u32;
    for _ in 0..config.fire_cells {
        if let Some(cell) = random_open_cell(grid, rng, outside) {
            grid.set_fire(cell, true);
        }
    }
    for _ in 0..config.lethal_cells {
        if let Some(cell) = random_open_cell(grid, rng, outside) {
            grid.set_terrain(cell, Terrain::Lethal);
        }
    }

    let inside = |c: Cell| c.chebyshev(center) < r as u32;
    let mut colonists = Vec::with_capacity(config.colonists as usize);
    for _ in 0..config.colonists {
        if let Some(cell) = random_open_cell(grid, rng, inside) {
            colonists.push(spawn_creature(world, cell, CreatureKind::Colonist));
        }
    }

    for _ in 0..config.animals {
        if let Some(cell) = random_open_cell(grid, rng, outside) {
            spawn_creature(world, cell, CreatureKind::Animal);
        }
    }
    for _ in 0..config.corpses {
        if let Some(cell) = random_open_cell(grid, rng, outside) {
            spawn_corpse(world, cell, None);
        }
    }

    let far = |c: Cell| c.chebyshev(center) > (r + 6) as u32;
    let mut zombies = Vec::with_capacity(config.zombies as usize);
    for _ in 0..config.zombies {
        let Some(cell) = random_open_cell(grid, rng, far).or_else(|| random_open_cell(grid, rng, outside))
        else {
            log::warn!("no room left for zombies");
            break;
        };
        let roles = roll_roles(settings, rng);
        let body = roll_body(roles, rng);
        let mut zombie = Zombie::new(roles, body);
        let roll: f32 = rng.gen();
        if roll < config.emerging_fraction {
            zombie = zombie.emerging(EMERGE_TICKS);
        } else if settings.floating_zombies && roll < config.emerging_fraction + config.floating_fraction {
            zombie = zombie.with_state(ZombieState::Floating);
            zombie.emerge_ticks = FLOAT_TICKS;
        }
        zombies.push(spawn_zombie_with(world, grid, cell, zombie, zombie_health(settings)));
    }

    log::info!(
        "generated {}x{} map: {} zombies, {} colonists",
        bounds.width,
        bounds.height,
        zombies.len(),
        colonists.len()
    );

    MapLayout {
        colony_center: center,
        zombies,
        colonists,
    }
}

/// A random walkable, fire-free, non-lethal cell matching `filter`.
fn random_open_cell(grid: &ZombieGrid, rng: &mut impl Rng, filter: impl Fn(Cell) -> bool) -> Option<Cell> {
    let bounds = grid.bounds();
    for _ in 0..PLACEMENT_ATTEMPTS {
        let cell = Cell::new(rng.gen_range(0..bounds.width), rng.gen_range(0..bounds.height));
        if filter(cell) && grid.is_walkable(cell) && !grid.has_fire(cell) && !grid.is_lethal(cell) {
            return Some(cell);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn generate(settings: &ZombieSettings, config: &MapConfig) -> (World, ZombieGrid, MapLayout) {
        let mut world = World::new();
        let mut grid = ZombieGrid::new(config.width, config.height);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let layout = generate_map(&mut world, &mut grid, config, settings, &mut rng);
        (world, grid, layout)
    }

    #[test]
    fn test_generate_map() {
        let config = MapConfig::default();
        let (world, grid, layout) = generate(&ZombieSettings::default(), &config);

        assert_eq!(layout.zombies.len(), config.zombies as usize);
        assert_eq!(layout.colonists.len(), config.colonists as usize);
        assert_eq!(grid.total_zombies(), config.zombies);
        assert!(!grid.is_walkable(Cell::new(0, 0)));

        let doors = world
            .query::<&Obstacle>()
            .iter()
            .filter(|(_, o)| o.is_door())
            .count();
        assert_eq!(doors, 4);

        for &c in &layout.colonists {
            let pos = world.get::<&Position>(c).unwrap().0;
            assert!(pos.chebyshev(layout.colony_center) < config.colony_radius as u32);
        }
    }

    #[test]
    fn test_no_floating_when_disabled() {
        let settings = ZombieSettings {
            floating_zombies: false,
            ..ZombieSettings::default()
        };
        let config = MapConfig {
            floating_fraction: 1.0,
            emerging_fraction: 0.0,
            ..MapConfig::default()
        };
        let (world, _, _) = generate(&settings, &config);
        assert!(world
            .query::<&Zombie>()
            .iter()
            .all(|(_, z)| z.state != ZombieState::Floating));

        let floating = ZombieSettings {
            floating_zombies: true,
            ..ZombieSettings::default()
        };
        let (world, _, _) = generate(&floating, &config);
        assert!(world
            .query::<&Zombie>()
            .iter()
            .all(|(_, z)| z.state == ZombieState::Floating));
    }
}
