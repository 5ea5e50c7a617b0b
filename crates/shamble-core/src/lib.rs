//! Shamble Core - Zombie Behaviour Simulation Engine
//!
//! An ECS-based simulation of zombies stumbling around a grid world full
//! of colonists, animals, corpses, doors and rock. Every tick each zombie
//! runs through a fixed, ordered list of guarded behaviours and does the
//! first one that applies.
//!
//! # Architecture
//!
//! The simulation uses an Entity Component System (ECS) architecture via `hecs`:
//! - **Entities**: Zombies, creatures, corpses, obstacles
//! - **Components**: Pure data attached to entities (Position, Zombie, StumbleJob, etc.)
//! - **Systems**: The per-zombie resolver and the actions it dispatches to
//!
//! Per-cell facts (terrain, fire, scent, crowding) live in [`grid::ZombieGrid`].
//! Pure decision logic lives in the `shamble-logic` crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use shamble_core::prelude::*;
//! use shamble_core::generation::MapConfig;
//!
//! let mut engine = SimulationEngine::new(42);
//! engine.generate(MapConfig::default());
//!
//! for _ in 0..1000 {
//!     engine.update();
//! }
//! ```

pub mod components;
pub mod engine;
pub mod generation;
pub mod grid;
pub mod pathing;
pub mod persistence;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::engine::SimulationEngine;
    pub use crate::grid::{Terrain, ZombieGrid};
    pub use crate::systems::{resolve_tick, ActionStats, Step, TickContext};
    pub use shamble_logic::grid::Cell;
    pub use shamble_logic::roles::{BodyType, ZombieRoles, ZombieState};
    pub use shamble_logic::settings::ZombieSettings;
}
