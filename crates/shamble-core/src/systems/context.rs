//! Per-tick context and the working copy of the zombie being resolved.

use hecs::{Entity, World};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use shamble_logic::grid::{Cell, Rot4};
use shamble_logic::settings::ZombieSettings;

use crate::components::*;
use crate::grid::ZombieGrid;
use crate::pathing::FlowField;

/// Everything the resolver may read or touch during one zombie's tick.
pub struct TickContext<'a> {
    pub world: &'a mut World,
    pub grid: &'a mut ZombieGrid,
    pub flow: &'a FlowField,
    pub settings: &'a ZombieSettings,
    pub rng: &'a mut ChaCha8Rng,
    pub tick: u64,
    /// Host threat level; only consulted with dynamic threat enabled
    pub threat_level: f32,
    pub stats: &'a mut ActionStats,
}

/// Running totals of what zombies did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionStats {
    pub zombies_killed: u32,
    pub attacks: u32,
    pub creatures_downed: u32,
    pub creatures_killed: u32,
    pub bites: u32,
    pub corpses_consumed: u32,
    pub smash_hits: u32,
    pub obstacles_destroyed: u32,
    pub rocks_mined: u32,
    pub rages_started: u32,
    pub rages_ended: u32,
    pub electrified: u32,
}

/// Working copy of a zombie, loaded at the start of its tick and written
/// back at the end. The resolver mutates this instead of the world so the
/// world borrow stays free for queries about everything else.
#[derive(Debug, Clone)]
pub struct Agent {
    pub entity: Entity,
    pub pos: Cell,
    pub facing: Rot4,
    pub zombie: Zombie,
    pub job: StumbleJob,
    pub health: Health,
    pub tether: Option<Tether>,
    /// Despawned during this tick; nothing is written back
    pub killed: bool,
}

impl Agent {
    /// Snapshot a zombie. `None` if the entity lacks a zombie's components.
    pub fn load(world: &World, entity: Entity) -> Option<Agent> {
        let e = world.entity(entity).ok()?;
        let pos = e.get::<&Position>()?.0;
        let zombie = (*e.get::<&Zombie>()?).clone();
        let job = (*e.get::<&StumbleJob>()?).clone();
        let facing = e.get::<&Facing>().map(|f| f.0).unwrap_or_default();
        let health = e.get::<&Health>().map(|h| *h).unwrap_or(Health::new(100.0));
        let tether = e.get::<&Tether>().map(|t| *t);
        Some(Agent {
            entity,
            pos,
            facing,
            zombie,
            job,
            health,
            tether,
            killed: false,
        })
    }

    /// Write the working copy back to the world.
    pub fn commit(self, world: &mut World) {
        if self.killed {
            return;
        }
        let entity = self.entity;
        let written = world.insert(
            entity,
            (
                Position(self.pos),
                Facing(self.facing),
                self.zombie,
                self.job,
                self.health,
            ),
        );
        if let Err(e) = written {
            log::debug!("zombie {:?} gone before commit: {}", entity, e);
        }
    }

    pub fn face(&mut self, toward: Cell) {
        if let Some(rot) = Rot4::facing(self.pos, toward) {
            self.facing = rot;
        }
    }

    pub fn is_tanky(&self) -> bool {
        self.zombie.roles.is_tanky()
    }

    pub fn is_miner(&self) -> bool {
        self.zombie.roles.is_miner()
    }

    pub fn is_raging(&self) -> bool {
        self.zombie.is_raging()
    }
}
