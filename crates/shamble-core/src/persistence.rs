//! Save/Load functionality for persisting simulation state
//!
//! Uses bincode for binary serialization. Components are serialized
//! individually together with the entity's id bits, and entities are
//! respawned under the same ids on load so references between them
//! (eat targets, corpse occupants) stay valid.

use std::io::{Read, Write};

use hecs::{Entity, World};
use serde::{Deserialize, Serialize};
use shamble_logic::grid::Cell;
use shamble_logic::settings::SettingsTimeline;
use thiserror::Error;

use crate::components::*;
use crate::engine::SimulationEngine;
use crate::grid::ZombieGrid;
use crate::systems::ActionStats;

/// Version number for save file format (increment when format changes)
const SAVE_VERSION: u32 = 1;

/// Serializable snapshot of the simulation state
#[derive(Serialize, Deserialize)]
pub struct SaveData {
    /// Save format version
    pub version: u32,
    pub tick: u64,
    pub seed: u64,
    pub threat_level: f32,
    pub stats: ActionStats,
    pub colony_center: Option<Cell>,
    pub timeline: SettingsTimeline,
    pub grid: ZombieGrid,
    /// All entities with their components
    pub entities: Vec<SerializableEntity>,
}

/// `StumbleJob` with entity references stored as id bits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedStumbleJob {
    pub destination: Cell,
    pub eat_target: Option<u64>,
    pub last_eat_target: Option<u64>,
    pub eat_delay_counter: u32,
    pub eat_delay: u32,
    pub last_move: MoveResult,
    pub move_progress: f32,
}

impl From<&StumbleJob> for SavedStumbleJob {
    fn from(job: &StumbleJob) -> Self {
        Self {
            destination: job.destination,
            eat_target: job.eat_target.map(to_id),
            last_eat_target: job.last_eat_target.map(to_id),
            eat_delay_counter: job.eat_delay_counter,
            eat_delay: job.eat_delay,
            last_move: job.last_move,
            move_progress: job.move_progress,
        }
    }
}

/// `Corpse` with the occupant stored as id bits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SavedCorpse {
    pub occupant: Option<u64>,
    pub flesh: u8,
}

/// All possible components for an entity, serialized as optionals
#[derive(Serialize, Deserialize, Default)]
pub struct SerializableEntity {
    pub id: u64,

    // Core
    pub position: Option<Position>,
    pub facing: Option<Facing>,
    pub health: Option<Health>,

    // Zombies
    pub zombie: Option<Zombie>,
    pub job: Option<SavedStumbleJob>,
    pub tether: Option<Tether>,

    // World
    pub creature: Option<Creature>,
    pub melee_load: Option<MeleeLoad>,
    pub dead: bool,
    pub corpse: Option<SavedCorpse>,
    pub obstacle: Option<Obstacle>,
}

fn to_id(entity: Entity) -> u64 {
    entity.to_bits().get()
}

/// Extract all entities from a world into serializable form
fn serialize_entities(world: &World) -> Vec<SerializableEntity> {
    let mut entities = Vec::new();

    for entity_ref in world.iter() {
        let mut se = SerializableEntity {
            id: to_id(entity_ref.entity()),
            ..SerializableEntity::default()
        };

        if let Some(c) = entity_ref.get::<&Position>() {
            se.position = Some(*c);
        }
        if let Some(c) = entity_ref.get::<&Facing>() {
            se.facing = Some(*c);
        }
        if let Some(c) = entity_ref.get::<&Health>() {
            se.health = Some(*c);
        }
        if let Some(c) = entity_ref.get::<&Zombie>() {
            se.zombie = Some((*c).clone());
        }
        if let Some(c) = entity_ref.get::<&StumbleJob>() {
            se.job = Some(SavedStumbleJob::from(&*c));
        }
        if let Some(c) = entity_ref.get::<&Tether>() {
            se.tether = Some(*c);
        }
        if let Some(c) = entity_ref.get::<&Creature>() {
            se.creature = Some(*c);
        }
        if let Some(c) = entity_ref.get::<&MeleeLoad>() {
            se.melee_load = Some(*c);
        }
        se.dead = entity_ref.has::<Dead>();
        if let Some(c) = entity_ref.get::<&Corpse>() {
            se.corpse = Some(SavedCorpse {
                occupant: c.occupant.map(to_id),
                flesh: c.flesh,
            });
        }
        if let Some(c) = entity_ref.get::<&Obstacle>() {
            se.obstacle = Some(*c);
        }

        entities.push(se);
    }

    entities
}

/// Look up a saved reference. Dangling references resolve to `None`.
fn resolve(world: &World, id: Option<u64>) -> Option<Entity> {
    let entity = Entity::from_bits(id?)?;
    world.contains(entity).then_some(entity)
}

/// Recreate entities from their serialized form.
///
/// Runs in two passes: every entity is respawned under its saved id first,
/// then components holding references are attached once all ids exist.
fn deserialize_entities(world: &mut World, entities: Vec<SerializableEntity>) {
    let mut deferred = Vec::new();

    for se in entities {
        let Some(entity) = Entity::from_bits(se.id) else {
            log::warn!("skipping saved entity with invalid id {}", se.id);
            continue;
        };
        world.spawn_at(entity, ());

        if let Some(c) = se.position {
            let _ = world.insert_one(entity, c);
        }
        if let Some(c) = se.facing {
            let _ = world.insert_one(entity, c);
        }
        if let Some(c) = se.health {
            let _ = world.insert_one(entity, c);
        }
        if let Some(c) = se.zombie {
            let _ = world.insert_one(entity, c);
        }
        if let Some(c) = se.tether {
            let _ = world.insert_one(entity, c);
        }
        if let Some(c) = se.creature {
            let _ = world.insert_one(entity, c);
        }
        if let Some(c) = se.melee_load {
            let _ = world.insert_one(entity, c);
        }
        if se.dead {
            let _ = world.insert_one(entity, Dead);
        }
        if let Some(c) = se.obstacle {
            let _ = world.insert_one(entity, c);
        }
        if se.job.is_some() || se.corpse.is_some() {
            deferred.push((entity, se.job, se.corpse));
        }
    }

    for (entity, job, corpse) in deferred {
        if let Some(saved) = job {
            let restored = StumbleJob {
                destination: saved.destination,
                eat_target: resolve(world, saved.eat_target),
                last_eat_target: resolve(world, saved.last_eat_target),
                eat_delay_counter: saved.eat_delay_counter,
                eat_delay: saved.eat_delay,
                last_move: saved.last_move,
                move_progress: saved.move_progress,
            };
            let _ = world.insert_one(entity, restored);
        }
        if let Some(saved) = corpse {
            let restored = Corpse {
                occupant: resolve(world, saved.occupant),
                flesh: saved.flesh,
            };
            let _ = world.insert_one(entity, restored);
        }
    }
}

/// Outcome of the occupant-to-corpse normalization pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Targets re-pointed from an occupant to its corpse
    pub migrated: u32,
    /// Targets dropped because no matching corpse was found
    pub cleared: u32,
}

/// Older saves stored the dead creature inside a corpse as the eat target
/// instead of the corpse itself. Point such targets at the corpse lying on
/// the occupant's cell, or drop them when there is none.
pub fn migrate_occupant_targets(world: &mut World) -> MigrationReport {
    let mut report = MigrationReport::default();

    let stale: Vec<(Entity, Entity)> = world
        .query::<&StumbleJob>()
        .iter()
        .filter_map(|(entity, job)| {
            let target = job.eat_target?;
            world.get::<&Dead>(target).is_ok().then_some((entity, target))
        })
        .collect();

    for (entity, occupant) in stale {
        let cell = world.get::<&Position>(occupant).ok().map(|p| p.0);
        let corpse = cell.and_then(|cell| {
            world
                .query::<(&Corpse, &Position)>()
                .iter()
                .find(|(_, (corpse, pos))| pos.0 == cell && corpse.occupant == Some(occupant))
                .map(|(e, _)| e)
        });

        if let Ok(mut job) = world.get::<&mut StumbleJob>(entity) {
            job.eat_target = corpse;
            if corpse.is_none() {
                job.eat_delay_counter = 0;
            }
        }
        match corpse {
            Some(corpse) => {
                report.migrated += 1;
                log::info!("zombie {:?}: eat target {:?} migrated to corpse {:?}", entity, occupant, corpse);
            }
            None => {
                report.cleared += 1;
                log::info!("zombie {:?}: no corpse holds {:?}, eat target cleared", entity, occupant);
            }
        }
    }

    report
}

/// Save the complete simulation to a writer
pub fn save_simulation<W: Write>(writer: W, engine: &SimulationEngine) -> Result<(), SaveError> {
    let save_data = SaveData {
        version: SAVE_VERSION,
        tick: engine.tick,
        seed: engine.seed,
        threat_level: engine.threat_level,
        stats: engine.stats,
        colony_center: engine.colony_center,
        timeline: engine.timeline.clone(),
        grid: engine.grid.clone(),
        entities: serialize_entities(&engine.world),
    };

    bincode::serialize_into(writer, &save_data)?;
    Ok(())
}

/// Load a simulation from a reader
pub fn load_simulation<R: Read>(reader: R) -> Result<LoadedSimulation, SaveError> {
    let save_data: SaveData = bincode::deserialize_from(reader)?;

    if save_data.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: save_data.version,
        });
    }

    let mut world = World::new();
    deserialize_entities(&mut world, save_data.entities);
    let migration = migrate_occupant_targets(&mut world);

    let mut grid = save_data.grid;
    grid.clear_zombie_counts();
    for (_, (_, pos)) in world.query::<(&Zombie, &Position)>().iter() {
        grid.add_zombie(pos.0);
    }

    Ok(LoadedSimulation {
        world,
        grid,
        tick: save_data.tick,
        seed: save_data.seed,
        threat_level: save_data.threat_level,
        stats: save_data.stats,
        colony_center: save_data.colony_center,
        timeline: save_data.timeline,
        migration,
    })
}

/// Result of loading a simulation
pub struct LoadedSimulation {
    pub world: World,
    pub grid: ZombieGrid,
    pub tick: u64,
    pub seed: u64,
    pub threat_level: f32,
    pub stats: ActionStats,
    pub colony_center: Option<Cell>,
    pub timeline: SettingsTimeline,
    pub migration: MigrationReport,
}

/// Errors that can occur during save/load
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Bincode(#[from] Box<bincode::ErrorKind>),
    #[error("Save version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{spawn_corpse, spawn_creature, spawn_zombie, MapConfig};
    use shamble_logic::roles::{BodyType, ZombieRoles};

    #[test]
    fn test_save_load_roundtrip() {
        let mut engine = SimulationEngine::new(11);
        engine.generate(MapConfig {
            width: 32,
            height: 32,
            zombies: 10,
            ..MapConfig::default()
        });
        for _ in 0..20 {
            engine.update();
        }

        let mut save_buffer = Vec::new();
        engine.save(&mut save_buffer).expect("Save failed");

        let mut loaded = SimulationEngine::new(0);
        loaded.load(&save_buffer[..]).expect("Load failed");

        assert_eq!(loaded.tick, engine.tick);
        assert_eq!(loaded.seed, engine.seed);
        assert_eq!(loaded.zombie_count(), engine.zombie_count());
        assert_eq!(loaded.colonist_count(), engine.colonist_count());
        assert_eq!(loaded.grid, engine.grid);
        assert_eq!(loaded.stats, engine.stats);
    }

    #[test]
    fn test_references_survive() {
        let mut engine = SimulationEngine::with_grid(10, 10, 1);
        let z = spawn_zombie(&mut engine.world, &mut engine.grid, Cell::new(1, 1), ZombieRoles::NONE, BodyType::Male);
        let corpse = spawn_corpse(&mut engine.world, Cell::new(3, 1), None);
        {
            let mut job = engine.world.get::<&mut StumbleJob>(z).unwrap();
            job.eat_target = Some(corpse);
            job.eat_delay_counter = 7;
            job.destination = Cell::new(3, 1);
        }

        let mut buf = Vec::new();
        engine.save(&mut buf).unwrap();
        let loaded = load_simulation(&buf[..]).unwrap();

        let job = loaded.world.get::<&StumbleJob>(z).unwrap();
        assert_eq!(job.eat_target, Some(corpse));
        assert_eq!(job.eat_delay_counter, 7);
        assert_eq!(job.destination, Cell::new(3, 1));
        assert_eq!(loaded.migration, MigrationReport::default());
    }

    #[test]
    fn test_migration_both_outcomes() {
        let mut world = World::new();
        let mut grid = ZombieGrid::new(10, 10);

        let occupant = spawn_creature(&mut world, Cell::new(4, 4), CreatureKind::Human);
        world.insert_one(occupant, Dead).unwrap();
        let corpse = spawn_corpse(&mut world, Cell::new(4, 4), Some(occupant));
        let orphan = spawn_creature(&mut world, Cell::new(7, 7), CreatureKind::Animal);
        world.insert_one(orphan, Dead).unwrap();

        let a = spawn_zombie(&mut world, &mut grid, Cell::new(1, 1), ZombieRoles::NONE, BodyType::Male);
        let b = spawn_zombie(&mut world, &mut grid, Cell::new(2, 2), ZombieRoles::NONE, BodyType::Male);
        world.get::<&mut StumbleJob>(a).unwrap().eat_target = Some(occupant);
        world.get::<&mut StumbleJob>(b).unwrap().eat_target = Some(orphan);

        let report = migrate_occupant_targets(&mut world);
        assert_eq!(report, MigrationReport { migrated: 1, cleared: 1 });
        assert_eq!(world.get::<&StumbleJob>(a).unwrap().eat_target, Some(corpse));
        assert_eq!(world.get::<&StumbleJob>(b).unwrap().eat_target, None);

        // idempotent on already-normalized data
        assert_eq!(migrate_occupant_targets(&mut world), MigrationReport::default());
    }

    #[test]
    fn test_version_mismatch() {
        let engine = SimulationEngine::with_grid(4, 4, 1);
        let mut buf = Vec::new();
        engine.save(&mut buf).unwrap();
        // version is the first field
        buf[0] = 99;
        match load_simulation(&buf[..]) {
            Err(SaveError::VersionMismatch { expected, found }) => {
                assert_eq!(expected, SAVE_VERSION);
                assert_eq!(found, 99);
            }
            _ => panic!("expected version mismatch"),
        }
    }
}
