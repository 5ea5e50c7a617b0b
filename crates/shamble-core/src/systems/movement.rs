//! Movement executor - turns a destination into at most one step per tick.

use shamble_logic::grid::Cell;
use shamble_logic::wander::{MoveOption, MAX_CROWD_PER_CELL};

use super::context::{Agent, TickContext};
use crate::components::MoveResult;
use crate::pathing::{next_step, MAX_PATH_COST};

/// Cells walked per tick at speed 1.0
pub const CELLS_PER_TICK: f32 = 0.5;

/// Walking speed in cells per tick for the zombie's current mood.
pub fn speed(agent: &Agent, ctx: &TickContext) -> f32 {
    let factor = if agent.zombie.is_tracking() || agent.is_raging() {
        ctx.settings.move_speed_tracking
    } else {
        ctx.settings.move_speed_idle
    };
    factor.max(0.0) * CELLS_PER_TICK
}

/// Advance toward `destination`.
///
/// Progress accumulates by speed; once a whole cell is banked the zombie
/// takes the first hop of a bounded BFS path. No hop means `Blocked`.
pub fn advance_towards(agent: &mut Agent, destination: Cell, ctx: &mut TickContext) -> MoveResult {
    if agent.pos == destination {
        agent.job.move_progress = 0.0;
        return MoveResult::Arrived;
    }

    agent.job.move_progress = (agent.job.move_progress + speed(agent, ctx)).min(1.0);
    if agent.job.move_progress < 1.0 {
        return MoveResult::Continuing;
    }

    let Some(hop) = next_step(ctx.grid, agent.pos, destination, MAX_PATH_COST) else {
        agent.job.move_progress = 0.0;
        return MoveResult::Blocked;
    };

    agent.job.move_progress -= 1.0;
    ctx.grid.move_zombie(agent.pos, hop);
    agent.face(hop);
    agent.pos = hop;

    if hop == destination {
        agent.job.move_progress = 0.0;
        MoveResult::Arrived
    } else {
        MoveResult::Continuing
    }
}

/// Adjacent cells the zombie could step into: in bounds, walkable, no fire,
/// not lethal and not already crowded.
pub fn possible_moves(agent: &Agent, ctx: &TickContext) -> Vec<MoveOption> {
    agent
        .pos
        .neighbors()
        .filter(|&c| {
            ctx.grid.is_walkable(c)
                && !ctx.grid.has_fire(c)
                && !ctx.grid.is_lethal(c)
                && ctx.grid.zombie_count(c) < MAX_CROWD_PER_CELL
        })
        .map(|cell| MoveOption {
            cell,
            crowd: ctx.grid.zombie_count(cell),
            colony_distance: ctx.flow.distance(cell),
        })
        .collect()
}
