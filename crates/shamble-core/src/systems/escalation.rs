//! Escalation tracker - feeds perception into the rage state machine.

use shamble_logic::rage::{RageTrigger, HERD_RADIUS};

use super::acquisition::sees_living_target;
use super::context::{Agent, TickContext};

/// End the rage episode if it timed out or raging was switched off.
pub fn check_end(agent: &mut Agent, ctx: &mut TickContext) -> bool {
    let ended = agent.zombie.escalation.check_end(ctx.tick, ctx.settings);
    if ended {
        ctx.stats.rages_ended += 1;
        log::debug!("zombie {:?} calmed down", agent.entity);
    }
    ended
}

/// Start a rage episode from sustained contact or a large herd.
pub fn check_begin(agent: &mut Agent, ctx: &mut TickContext) -> bool {
    if agent.is_raging() || !ctx.settings.raging_zombies {
        return false;
    }
    let trigger = RageTrigger {
        herd_size: ctx.grid.herd_size(agent.pos, HERD_RADIUS),
        sees_living_target: sees_living_target(agent, ctx),
    };
    let tanky = agent.is_tanky();
    let began = agent
        .zombie
        .escalation
        .check_begin(ctx.tick, trigger, tanky, ctx.settings, &mut *ctx.rng);
    if began {
        ctx.stats.rages_started += 1;
        log::debug!(
            "zombie {:?} enraged (herd {}, contact {})",
            agent.entity,
            trigger.herd_size,
            trigger.sees_living_target
        );
    }
    began
}
