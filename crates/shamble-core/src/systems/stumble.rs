//! Behaviour resolver - one zombie, one tick.
//!
//! The decision tree is an ordered table of guards. Each guard has a
//! predicate (`applies`) and an action (`run`); the dispatch loop walks the
//! table top to bottom and stops at the first action that ends the tick.
//! Housekeeping guards (rage end, fire, tracking, move enumeration) always
//! continue. The table order is the priority order.

use hecs::Entity;
use rand::Rng;
use shamble_logic::eating::{count_down, may_seek_food, roll_eat_delay, EatProgress};
use shamble_logic::grid::Cell;
use shamble_logic::roles::{overrides_wandering, ZombieState};
use shamble_logic::wander::{
    choose_wander, closest_to, closest_to_colony, tether_destination, MoveOption,
};

use super::acquisition::{
    edible_cell, find_attack_target, find_consumption_target, find_dig_target,
    find_smash_target, freshest_scent,
};
use super::actions::{apply_burn, consume, dig, electrify, kill_agent, melee_attack, smash};
use super::context::{Agent, TickContext};
use super::escalation::{check_begin, check_end};
use super::movement::{advance_towards, possible_moves};
use crate::components::MoveResult;

/// Chance per tick that a calm miner starts digging an adjacent rock
pub const IDLE_DIG_CHANCE: f32 = 0.05;

/// A row of the guard table, named for logs and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Transitional,
    EndRage,
    Mortality,
    Roping,
    Incapacitated,
    Attack,
    ContinueDestination,
    Fire,
    HeavyMining,
    Eat,
    Track,
    Smash,
    CandidateMoves,
    RageMove,
    Wander,
    ExecuteMove,
    BeginRage,
}

enum Flow {
    Continue,
    Done,
}

/// Scratch state for one resolver pass.
struct Stumbler {
    agent: Agent,
    /// Tracking (or being tanky) says smashing is worth a try
    smash_time: bool,
    moves: Vec<MoveOption>,
    /// A destination was picked earlier in this tick
    destination_chosen: bool,
}

struct Guard {
    step: Step,
    applies: fn(&Stumbler, &TickContext) -> bool,
    run: fn(&mut Stumbler, &mut TickContext) -> Flow,
}

const GUARDS: [Guard; 17] = [
    Guard {
        step: Step::Transitional,
        applies: |s, _| s.agent.zombie.state.is_transitional(),
        run: |_, _| Flow::Done,
    },
    Guard {
        step: Step::EndRage,
        applies: |s, _| s.agent.is_raging(),
        run: |s, ctx| {
            check_end(&mut s.agent, ctx);
            Flow::Continue
        },
    },
    Guard {
        step: Step::Mortality,
        applies: should_die,
        run: |s, ctx| {
            kill_agent(&mut s.agent, ctx, "mortality check");
            Flow::Done
        },
    },
    Guard {
        step: Step::Roping,
        applies: |s, _| s.agent.tether.is_some(),
        run: roping,
    },
    Guard {
        step: Step::Incapacitated,
        applies: |s, ctx| {
            s.agent.zombie.state == ZombieState::Downed || s.agent.zombie.is_unconscious(ctx.tick)
        },
        run: |s, _| {
            s.agent.job.clear_destination();
            Flow::Done
        },
    },
    Guard {
        step: Step::Attack,
        applies: |_, _| true,
        run: attack,
    },
    Guard {
        step: Step::ContinueDestination,
        applies: |s, _| s.agent.job.has_destination(),
        run: continue_destination,
    },
    Guard {
        step: Step::Fire,
        applies: |s, ctx| s.agent.zombie.burning > 0 || ctx.grid.has_fire(s.agent.pos),
        run: |s, ctx| {
            apply_burn(&mut s.agent, ctx);
            Flow::Continue
        },
    },
    Guard {
        step: Step::HeavyMining,
        applies: |s, ctx| {
            s.agent.is_miner()
                && s.agent.zombie.body.is_heavy()
                && ctx.settings.dig_eligibility.allows(true)
        },
        run: heavy_mining,
    },
    Guard {
        step: Step::Eat,
        applies: |s, ctx| {
            s.agent.job.eat_target.is_some()
                || may_seek_food(ctx.settings, ctx.grid.zombie_count(s.agent.pos))
        },
        run: eat,
    },
    Guard {
        step: Step::Track,
        applies: |_, _| true,
        run: track,
    },
    Guard {
        step: Step::Smash,
        applies: |s, ctx| {
            s.agent.is_tanky()
                || (s.smash_time
                    && (!ctx.settings.smash_only_when_agitated
                        || s.agent.zombie.is_tracking()
                        || s.agent.is_raging()))
        },
        run: |s, ctx| match find_smash_target(&s.agent, ctx) {
            Some(target) => {
                smash(&mut s.agent, ctx, target);
                Flow::Done
            }
            None => Flow::Continue,
        },
    },
    Guard {
        step: Step::CandidateMoves,
        applies: |_, _| true,
        run: |s, ctx| {
            s.moves = possible_moves(&s.agent, ctx);
            Flow::Continue
        },
    },
    Guard {
        step: Step::RageMove,
        applies: |s, _| {
            !s.moves.is_empty()
                && overrides_wandering(
                    s.agent.zombie.roles,
                    s.agent.zombie.state,
                    s.agent.is_raging(),
                )
        },
        run: rage_move,
    },
    Guard {
        step: Step::Wander,
        applies: |s, _| !s.moves.is_empty() && !s.agent.is_raging(),
        run: wander,
    },
    Guard {
        step: Step::ExecuteMove,
        applies: |s, _| s.agent.job.has_destination(),
        run: |s, ctx| {
            execute_move(&mut s.agent, ctx);
            Flow::Continue
        },
    },
    Guard {
        step: Step::BeginRage,
        applies: |_, _| true,
        run: |s, ctx| {
            check_begin(&mut s.agent, ctx);
            Flow::Done
        },
    },
];

/// Resolve one tick for `entity`.
///
/// Returns the step that ended the tick, or `None` if the entity is not a
/// zombie (logged and skipped).
pub fn resolve_tick(ctx: &mut TickContext, entity: Entity) -> Option<Step> {
    let Some(agent) = Agent::load(ctx.world, entity) else {
        log::error!("resolve_tick: {:?} is not a zombie, skipping", entity);
        return None;
    };

    let mut s = Stumbler {
        agent,
        smash_time: false,
        moves: Vec::new(),
        destination_chosen: false,
    };

    let mut ended = None;
    for guard in &GUARDS {
        if !(guard.applies)(&s, ctx) {
            continue;
        }
        if let Flow::Done = (guard.run)(&mut s, ctx) {
            ended = Some(guard.step);
            break;
        }
    }

    if s.agent.zombie.state.is_transitional() {
        return ended;
    }
    s.agent.commit(ctx.world);
    ended
}

fn should_die(s: &Stumbler, ctx: &TickContext) -> bool {
    let settings = ctx.settings;
    s.agent.health.is_dead()
        || ctx.grid.is_lethal(s.agent.pos)
        || (settings.use_dynamic_threat_level
            && settings.zombies_die_on_zero_threat
            && ctx.threat_level <= 0.0)
}

/// Walk toward the current destination and handle the result.
fn execute_move(agent: &mut Agent, ctx: &mut TickContext) {
    let destination = agent.job.destination;
    if !ctx.grid.in_bounds(destination) {
        agent.job.clear_destination();
        return;
    }
    let result = advance_towards(agent, destination, ctx);
    agent.job.last_move = result;
    match result {
        MoveResult::Arrived => notify_arrived(agent, ctx),
        MoveResult::Blocked => {
            log::debug!("zombie {:?} blocked on the way to {:?}", agent.entity, destination);
            agent.job.clear_destination();
        }
        MoveResult::Continuing => {}
    }
}

/// Arrival: forget the destination, allow one smash check, and discharge
/// if electric.
fn notify_arrived(agent: &mut Agent, ctx: &mut TickContext) {
    agent.job.clear_destination();
    agent.zombie.check_smashable = true;
    if agent.zombie.is_active_electric() {
        electrify(agent, ctx);
    }
}

fn roping(s: &mut Stumbler, ctx: &mut TickContext) -> Flow {
    if let Some(tether) = s.agent.tether {
        let dest = tether_destination(s.agent.pos, tether.anchor, tether.radius, s.agent.job.destination);
        if dest.is_valid() && ctx.grid.in_bounds(dest) {
            s.agent.job.set_destination(dest);
            execute_move(&mut s.agent, ctx);
        } else {
            s.agent.job.clear_destination();
        }
    }
    Flow::Done
}

fn attack(s: &mut Stumbler, ctx: &mut TickContext) -> Flow {
    match find_attack_target(&s.agent, ctx) {
        Some(target) => {
            melee_attack(&mut s.agent, ctx, target);
            s.agent.job.clear_destination();
            Flow::Done
        }
        None => Flow::Continue,
    }
}

fn continue_destination(s: &mut Stumbler, ctx: &mut TickContext) -> Flow {
    let dest = s.agent.job.destination;
    let valid = ctx.grid.is_walkable(dest)
        && s.agent.job.last_move != MoveResult::Blocked
        && dest != s.agent.pos;
    if !valid {
        s.agent.job.clear_destination();
        return Flow::Continue;
    }
    execute_move(&mut s.agent, ctx);
    Flow::Done
}

fn heavy_mining(s: &mut Stumbler, ctx: &mut TickContext) -> Flow {
    let cut_off = ctx.flow.has_sources() && ctx.flow.distance(s.agent.pos).is_none();
    if s.agent.zombie.dig.is_none() && !cut_off {
        return Flow::Continue;
    }
    match find_dig_target(&s.agent, ctx) {
        Some(cell) => {
            dig(&mut s.agent, ctx, cell);
            Flow::Done
        }
        None => {
            s.agent.zombie.dig = None;
            Flow::Continue
        }
    }
}

fn eat(s: &mut Stumbler, ctx: &mut TickContext) -> Flow {
    if let Some(target) = s.agent.job.eat_target {
        return match edible_cell(ctx, target) {
            Some(cell) => approach_or_chew(s, ctx, target, cell),
            None => {
                log::debug!("zombie {:?} lost eat target {:?}", s.agent.entity, target);
                s.agent.job.clear_eat_target();
                Flow::Continue
            }
        };
    }

    if !may_seek_food(ctx.settings, ctx.grid.zombie_count(s.agent.pos)) {
        return Flow::Continue;
    }
    let Some(target) = find_consumption_target(&s.agent, ctx) else {
        return Flow::Continue;
    };
    let Some(cell) = edible_cell(ctx, target) else {
        return Flow::Continue;
    };

    let delay = roll_eat_delay(ctx.settings, &mut *ctx.rng);
    s.agent.job.eat_target = Some(target);
    s.agent.job.eat_delay = delay;
    s.agent.job.eat_delay_counter = delay;
    log::debug!("zombie {:?} going to eat {:?}", s.agent.entity, target);
    approach_or_chew(s, ctx, target, cell)
}

fn approach_or_chew(s: &mut Stumbler, ctx: &mut TickContext, target: Entity, cell: Cell) -> Flow {
    if s.agent.pos.is_adjacent_or_same(cell) {
        s.agent.job.clear_destination();
        s.agent.face(cell);
        if let EatProgress::Complete = count_down(&mut s.agent.job.eat_delay_counter) {
            consume(&mut s.agent, ctx, target);
            s.agent.job.last_eat_target = Some(target);
            s.agent.job.clear_eat_target();
        }
        return Flow::Done;
    }

    s.agent.job.set_destination(cell);
    execute_move(&mut s.agent, ctx);
    if s.agent.job.last_move == MoveResult::Blocked {
        s.agent.job.last_eat_target = Some(target);
        s.agent.job.clear_eat_target();
    }
    Flow::Done
}

fn track(s: &mut Stumbler, ctx: &mut TickContext) -> Flow {
    if s.agent.is_tanky() {
        s.smash_time = true;
        return Flow::Continue;
    }

    match freshest_scent(&s.agent, ctx) {
        Some(cell) => {
            s.agent.zombie.state = ZombieState::Tracking;
            s.agent.job.set_destination(cell);
            s.destination_chosen = true;
            s.smash_time = true;
        }
        None => {
            if s.agent.zombie.state == ZombieState::Tracking {
                s.agent.zombie.state = ZombieState::Wandering;
            }
        }
    }

    // the arrival flag is only spent when tracking wants a smash
    if s.smash_time {
        s.smash_time = s.agent.zombie.take_smashable();
    }
    Flow::Continue
}

fn rage_move(s: &mut Stumbler, ctx: &mut TickContext) -> Flow {
    if let Some(cell) = closest_to_colony(&s.moves) {
        s.agent.job.set_destination(cell);
        s.destination_chosen = true;
        return Flow::Continue;
    }
    if let Some(target) = find_smash_target(&s.agent, ctx) {
        smash(&mut s.agent, ctx, target);
        return Flow::Done;
    }
    if let Some(cell) = closest_to(&s.moves, ctx.grid.bounds().center()) {
        s.agent.job.set_destination(cell);
        s.destination_chosen = true;
    }
    Flow::Continue
}

fn wander(s: &mut Stumbler, ctx: &mut TickContext) -> Flow {
    let may_dig = s.agent.is_miner()
        && ctx
            .settings
            .dig_eligibility
            .allows(s.agent.zombie.body.is_heavy());
    if may_dig && (s.agent.zombie.dig.is_some() || ctx.rng.gen::<f32>() < IDLE_DIG_CHANCE) {
        if let Some(cell) = find_dig_target(&s.agent, ctx) {
            dig(&mut s.agent, ctx, cell);
            return Flow::Done;
        }
        s.agent.zombie.dig = None;
    }

    if s.destination_chosen {
        return Flow::Continue;
    }
    if let Some(cell) = choose_wander(ctx.settings.wandering_style, &s.moves, &mut *ctx.rng) {
        s.agent.job.set_destination(cell);
        s.destination_chosen = true;
    }
    Flow::Continue
}
