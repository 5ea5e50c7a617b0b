//! Simulation engine - main entry point for running the simulation

use std::collections::HashMap;

use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use shamble_logic::grid::Cell;
use shamble_logic::roles::ZombieState;
use shamble_logic::settings::{SettingsTimeline, ZombieSettings};

use crate::components::*;
use crate::generation::{generate_map, MapConfig};
use crate::grid::ZombieGrid;
use crate::pathing::{FlowField, MAX_PATH_COST};
use crate::persistence::{load_simulation, save_simulation, SaveError};
use crate::systems::*;

/// How far the colonist flow field reaches
pub const FLOW_RANGE: u32 = MAX_PATH_COST * 2;

/// Main simulation engine
pub struct SimulationEngine {
    /// ECS world containing all entities
    pub world: World,
    pub grid: ZombieGrid,
    /// Settings over time; `settings` is the snapshot for the current tick
    pub timeline: SettingsTimeline,
    pub settings: ZombieSettings,
    pub flow: FlowField,
    pub tick: u64,
    pub seed: u64,
    /// Host threat level, consulted when dynamic threat is enabled
    pub threat_level: f32,
    pub stats: ActionStats,
    /// How often each guard ended a zombie's tick
    pub step_counts: HashMap<Step, u64>,
    pub colony_center: Option<Cell>,
    rng: ChaCha8Rng,
}

impl SimulationEngine {
    /// Create a new empty simulation
    pub fn new(seed: u64) -> Self {
        let grid = ZombieGrid::new(0, 0);
        Self {
            world: World::new(),
            flow: FlowField::empty(grid.bounds()),
            grid,
            timeline: SettingsTimeline::default(),
            settings: ZombieSettings::default(),
            tick: 0,
            seed,
            threat_level: 1.0,
            stats: ActionStats::default(),
            step_counts: HashMap::new(),
            colony_center: None,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Create an empty simulation on a blank grid, for hand-built scenarios.
    pub fn with_grid(width: i32, height: i32, seed: u64) -> Self {
        let mut engine = Self::new(seed);
        engine.grid = ZombieGrid::new(width, height);
        engine.flow = FlowField::empty(engine.grid.bounds());
        engine
    }

    /// Generate a map with zombies, colonists and obstacles
    pub fn generate(&mut self, config: MapConfig) {
        self.world = World::new();
        self.grid = ZombieGrid::new(config.width, config.height);
        let settings = self.timeline.at(self.tick);
        let layout = generate_map(&mut self.world, &mut self.grid, &config, &settings, &mut self.rng);
        self.colony_center = Some(layout.colony_center);
        self.settings = settings;
        self.rebuild_flow();
    }

    /// Replace the settings with a single constant snapshot.
    pub fn set_settings(&mut self, settings: ZombieSettings) {
        self.timeline = SettingsTimeline::new(settings.clone());
        self.settings = settings;
    }

    pub fn set_timeline(&mut self, timeline: SettingsTimeline) {
        self.settings = timeline.at(self.tick);
        self.timeline = timeline;
    }

    pub fn set_threat_level(&mut self, level: f32) {
        self.threat_level = level;
    }

    /// Advance the simulation by one tick
    pub fn update(&mut self) {
        self.tick += 1;
        self.settings = self.timeline.at(self.tick);

        let colonists = living_colonist_cells(&self.world);
        for &cell in &colonists {
            self.grid.mark_scent(cell, self.tick);
        }
        self.flow = FlowField::build(&self.grid, &colonists, FLOW_RANGE);

        self.animate_hosts();

        let mut zombies: Vec<Entity> = self
            .world
            .query::<&Zombie>()
            .iter()
            .map(|(e, _)| e)
            .collect();
        zombies.sort_by_key(|e| e.to_bits());

        let mut ctx = TickContext {
            world: &mut self.world,
            grid: &mut self.grid,
            flow: &self.flow,
            settings: &self.settings,
            rng: &mut self.rng,
            tick: self.tick,
            threat_level: self.threat_level,
            stats: &mut self.stats,
        };
        for entity in zombies {
            if !ctx.world.contains(entity) {
                continue;
            }
            if let Some(step) = resolve_tick(&mut ctx, entity) {
                *self.step_counts.entry(step).or_insert(0) += 1;
            }
        }
    }

    /// Resolve a single zombie at the current tick, outside the tick loop.
    /// Used by scenario tests and the harness to inspect one decision.
    pub fn resolve_zombie(&mut self, entity: Entity) -> Option<Step> {
        let mut ctx = TickContext {
            world: &mut self.world,
            grid: &mut self.grid,
            flow: &self.flow,
            settings: &self.settings,
            rng: &mut self.rng,
            tick: self.tick,
            threat_level: self.threat_level,
            stats: &mut self.stats,
        };
        resolve_tick(&mut ctx, entity)
    }

    /// Host-side animations the resolver stays out of: zombies climbing
    /// out of the ground or floating down.
    fn animate_hosts(&mut self) {
        let floating_allowed = self.settings.floating_zombies;
        for (_, zombie) in self.world.query_mut::<&mut Zombie>() {
            if !zombie.state.is_transitional() {
                continue;
            }
            if zombie.state == ZombieState::Floating && !floating_allowed {
                zombie.emerge_ticks = 0;
            }
            zombie.emerge_ticks = zombie.emerge_ticks.saturating_sub(1);
            if zombie.emerge_ticks == 0 {
                zombie.state = ZombieState::Wandering;
            }
        }
    }

    /// Rebuild the colonist flow field, e.g. after editing the world by hand.
    pub fn rebuild_flow(&mut self) {
        let colonists = living_colonist_cells(&self.world);
        self.flow = FlowField::build(&self.grid, &colonists, FLOW_RANGE);
    }

    /// Get the current tick
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn zombie_count(&self) -> usize {
        self.world.query::<&Zombie>().iter().count()
    }

    /// Colonists still alive (downed ones included)
    pub fn colonist_count(&self) -> usize {
        self.world
            .query::<(&Creature, Option<&Dead>)>()
            .iter()
            .filter(|(_, (c, dead))| c.kind == CreatureKind::Colonist && dead.is_none())
            .count()
    }

    pub fn corpse_count(&self) -> usize {
        self.world.query::<&Corpse>().iter().count()
    }

    pub fn raging_count(&self) -> usize {
        self.world
            .query::<&Zombie>()
            .iter()
            .filter(|(_, z)| z.is_raging())
            .count()
    }

    /// Save the simulation to a writer
    pub fn save<W: std::io::Write>(&self, writer: W) -> Result<(), SaveError> {
        save_simulation(writer, self)
    }

    /// Load a simulation from a reader, replacing the current state
    pub fn load<R: std::io::Read>(&mut self, reader: R) -> Result<(), SaveError> {
        let loaded = load_simulation(reader)?;
        self.world = loaded.world;
        self.grid = loaded.grid;
        self.timeline = loaded.timeline;
        self.tick = loaded.tick;
        self.seed = loaded.seed;
        self.threat_level = loaded.threat_level;
        self.stats = loaded.stats;
        self.colony_center = loaded.colony_center;
        self.settings = self.timeline.at(self.tick);
        self.step_counts.clear();
        // the generator stream is not saved; reseed from seed and tick
        self.rng = ChaCha8Rng::seed_from_u64(self.seed ^ self.tick);
        self.rebuild_flow();
        Ok(())
    }
}

impl Default for SimulationEngine {
    fn default() -> Self {
        Self::new(0)
    }
}
