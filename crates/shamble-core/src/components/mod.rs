//! Component definitions for the ECS simulation.
//!
//! Components are pure data structs attached to entities.
//! They have no behavior - that lives in systems.

mod common;
mod world;
mod zombie;

pub use common::*;
pub use world::*;
pub use zombie::*;
