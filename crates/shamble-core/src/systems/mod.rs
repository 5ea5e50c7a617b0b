//! Systems that operate on components.
//!
//! `stumble` is the per-zombie resolver; the other modules are the pieces
//! it dispatches to.

mod actions;
mod acquisition;
mod context;
mod escalation;
mod movement;
mod stumble;

pub use actions::*;
pub use acquisition::*;
pub use context::*;
pub use escalation::*;
pub use movement::*;
pub use stumble::*;

use hecs::World;
use shamble_logic::grid::Cell;

use crate::components::{Creature, CreatureKind, Dead, Position};

/// Cells of every living, standing colonist
pub fn living_colonist_cells(world: &World) -> Vec<Cell> {
    world
        .query::<(&Creature, &Position, Option<&Dead>)>()
        .iter()
        .filter(|(_, (c, _, dead))| c.kind == CreatureKind::Colonist && !c.downed && dead.is_none())
        .map(|(_, (_, pos, _))| pos.0)
        .collect()
}
