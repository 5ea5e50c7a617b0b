//! Spawning zombies, creatures, corpses and obstacles

use hecs::{Entity, World};
use rand::seq::SliceRandom;
use rand::Rng;
use shamble_logic::grid::Cell;
use shamble_logic::roles::{BodyType, ZombieRoles};
use shamble_logic::settings::ZombieSettings;

use crate::components::*;
use crate::grid::ZombieGrid;

pub const ZOMBIE_HEALTH: f32 = 100.0;
/// Health multiplier when zombies die very easily
pub const FRAGILE_FACTOR: f32 = 0.25;
pub const CREATURE_HEALTH: f32 = 100.0;

/// Spawn a wandering zombie and count it on the grid.
pub fn spawn_zombie(
    world: &mut World,
    grid: &mut ZombieGrid,
    cell: Cell,
    roles: ZombieRoles,
    body: BodyType,
) -> Entity {
    spawn_zombie_with(world, grid, cell, Zombie::new(roles, body), ZOMBIE_HEALTH)
}

pub fn spawn_zombie_with(
    world: &mut World,
    grid: &mut ZombieGrid,
    cell: Cell,
    zombie: Zombie,
    health: f32,
) -> Entity {
    grid.add_zombie(cell);
    world.spawn((
        Position(cell),
        Facing::default(),
        zombie,
        StumbleJob::default(),
        Health::new(health),
    ))
}

pub fn spawn_creature(world: &mut World, cell: Cell, kind: CreatureKind) -> Entity {
    world.spawn((
        Creature::new(kind),
        Position(cell),
        Facing::default(),
        Health::new(CREATURE_HEALTH),
    ))
}

pub fn spawn_corpse(world: &mut World, cell: Cell, occupant: Option<Entity>) -> Entity {
    world.spawn((
        Position(cell),
        Corpse {
            occupant,
            flesh: CORPSE_FLESH,
        },
    ))
}

/// Spawn an obstacle and mark its cell blocked.
pub fn spawn_obstacle(world: &mut World, grid: &mut ZombieGrid, cell: Cell, kind: ObstacleKind) -> Entity {
    grid.set_blocked(cell, true);
    world.spawn((Position(cell), Obstacle::new(kind)))
}

/// Roll a zombie's special role from the configured chances. At most one
/// role is assigned; the remainder is the normal-zombie chance.
pub fn roll_roles(settings: &ZombieSettings, rng: &mut impl Rng) -> ZombieRoles {
    let roll: f32 = rng.gen();
    let table = [
        (settings.tanky_operator_chance, ZombieRoles::TANKY),
        (settings.miner_chance, ZombieRoles::MINER),
        (settings.electrifier_chance, ZombieRoles::ELECTRIFIER),
        (settings.albino_chance, ZombieRoles::ALBINO),
        (settings.dark_slimer_chance, ZombieRoles::DARK_SLIMER),
    ];
    let mut acc = 0.0;
    for (chance, role) in table {
        acc += chance;
        if roll < acc {
            return role;
        }
    }
    ZombieRoles::NONE
}

pub fn roll_body(roles: ZombieRoles, rng: &mut impl Rng) -> BodyType {
    if roles.is_tanky() {
        return BodyType::Hulk;
    }
    *BodyType::ALL.choose(rng).unwrap_or(&BodyType::Male)
}

/// Starting health for a new zombie under the current settings.
pub fn zombie_health(settings: &ZombieSettings) -> f32 {
    if settings.zombies_die_very_easily {
        ZOMBIE_HEALTH * FRAGILE_FACTOR
    } else {
        ZOMBIE_HEALTH
    }
}
