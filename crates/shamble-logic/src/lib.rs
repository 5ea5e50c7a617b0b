//! Pure zombie decision logic for Shamble.
//!
//! This crate contains the decision pieces that do not need the ECS world:
//! functions take plain data and return results, so they are unit-testable
//! on their own. `shamble-core` wires them to the world each tick.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`eating`] | Consumption target selection and eat-delay countdown |
//! | [`grid`] | Cells, facings, map bounds, line-of-sight cells |
//! | [`rage`] | Rage escalation state machine |
//! | [`roles`] | Zombie states, role bitset, body types |
//! | [`settings`] | Configuration snapshot and settings timeline |
//! | [`wander`] | Wander, rage and tether step selection |

pub mod eating;
pub mod grid;
pub mod rage;
pub mod roles;
pub mod settings;
pub mod wander;
