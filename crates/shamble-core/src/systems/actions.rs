//! Action primitives - the side effects the resolver can trigger.

use hecs::Entity;
use shamble_logic::grid::Cell;

use super::context::{Agent, TickContext};
use crate::components::*;
use crate::grid::Terrain;

/// Base melee damage of one zombie strike
pub const STRIKE_DAMAGE: f32 = 10.0;
/// Damage per tick while burning
pub const BURN_DAMAGE: f32 = 1.0;
/// Damage dealt to an obstacle by one smash
pub const SMASH_DAMAGE: f32 = 10.0;
/// Tanky zombies hit obstacles this much harder
pub const TANKY_SMASH_MULTIPLIER: f32 = 3.0;
/// Dig work done per tick; heavy bodies dig twice as fast
pub const DIG_WORK: f32 = 1.0;
pub const ELECTRIC_DAMAGE: f32 = 15.0;

/// Remove the zombie from the world.
pub fn kill_agent(agent: &mut Agent, ctx: &mut TickContext, reason: &str) {
    ctx.grid.remove_zombie(agent.pos);
    let _ = ctx.world.despawn(agent.entity);
    agent.killed = true;
    ctx.stats.zombies_killed += 1;
    log::info!(
        "zombie {:?} died at ({}, {}): {}",
        agent.entity,
        agent.pos.x,
        agent.pos.z,
        reason
    );
}

/// Turn a creature into a corpse. The creature entity stays as the
/// corpse's occupant and gets the `Dead` marker. Returns the corpse.
pub fn kill_creature(ctx: &mut TickContext, target: Entity) -> Option<Entity> {
    let cell = ctx.world.get::<&Position>(target).ok()?.0;
    if let Ok(mut creature) = ctx.world.get::<&mut Creature>(target) {
        creature.downed = false;
    }
    ctx.world.insert_one(target, Dead).ok()?;
    let corpse = ctx.world.spawn((
        Position(cell),
        Corpse {
            occupant: Some(target),
            flesh: CORPSE_FLESH,
        },
    ));
    ctx.stats.creatures_killed += 1;
    log::info!("creature {:?} killed, corpse {:?}", target, corpse);
    Some(corpse)
}

/// Apply damage to a creature; it goes down at `DOWNED_HEALTH` and dies at 0.
pub fn damage_creature(ctx: &mut TickContext, target: Entity, amount: f32) {
    let (dead, downed_now) = {
        let Ok(mut query) = ctx.world.query_one::<(&mut Health, &mut Creature)>(target) else {
            return;
        };
        let Some((health, creature)) = query.get() else {
            return;
        };
        health.damage(amount);
        let downed_now = !creature.downed && health.current <= DOWNED_HEALTH;
        if downed_now {
            creature.downed = true;
        }
        (health.is_dead(), downed_now)
    };
    if dead {
        kill_creature(ctx, target);
    } else if downed_now {
        ctx.stats.creatures_downed += 1;
        log::debug!("creature {:?} is down", target);
    }
}

/// Strike an adjacent creature.
pub fn melee_attack(agent: &mut Agent, ctx: &mut TickContext, target: Entity) {
    let tick = ctx.tick;
    let registered = match ctx.world.get::<&mut MeleeLoad>(target) {
        Ok(mut load) => {
            load.register(tick);
            true
        }
        Err(_) => false,
    };
    if !registered {
        let mut load = MeleeLoad::default();
        load.register(tick);
        let _ = ctx.world.insert_one(target, load);
    }

    if let Ok(pos) = ctx.world.get::<&Position>(target) {
        agent.face(pos.0);
    }
    ctx.stats.attacks += 1;
    let damage = STRIKE_DAMAGE * ctx.settings.damage_factor;
    damage_creature(ctx, target, damage);
}

/// Catch fire when standing in it, and take burn damage while burning.
pub fn apply_burn(agent: &mut Agent, ctx: &mut TickContext) {
    if ctx.grid.has_fire(agent.pos) {
        let ticks = if ctx.settings.zombies_burn_longer {
            BURN_TICKS * 2
        } else {
            BURN_TICKS
        };
        agent.zombie.burning = agent.zombie.burning.max(ticks);
    }
    if agent.zombie.burning > 0 {
        agent.zombie.burning -= 1;
        agent.health.damage(BURN_DAMAGE);
    }
}

/// Put one tick of work into an adjacent rock. Returns true once the rock
/// breaks and the cell becomes floor.
pub fn dig(agent: &mut Agent, ctx: &mut TickContext, cell: Cell) -> bool {
    let Some(hardness) = ctx.grid.rock_hardness(cell) else {
        agent.zombie.dig = None;
        return false;
    };
    agent.face(cell);

    let rate = if agent.zombie.body.is_heavy() {
        DIG_WORK * 2.0
    } else {
        DIG_WORK
    };
    let mut progress = match agent.zombie.dig {
        Some(d) if d.cell == cell => d,
        _ => DigProgress { cell, work: 0.0 },
    };
    progress.work += rate;

    if progress.work >= hardness as f32 {
        ctx.grid.set_terrain(cell, Terrain::Floor);
        agent.zombie.dig = None;
        ctx.stats.rocks_mined += 1;
        log::debug!("zombie {:?} mined through ({}, {})", agent.entity, cell.x, cell.z);
        true
    } else {
        agent.zombie.dig = Some(progress);
        false
    }
}

/// Hit an adjacent obstacle. Returns true if it was destroyed.
pub fn smash(agent: &mut Agent, ctx: &mut TickContext, target: Entity) -> bool {
    let multiplier = if agent.is_tanky() { TANKY_SMASH_MULTIPLIER } else { 1.0 };
    let damage = SMASH_DAMAGE * multiplier * ctx.settings.damage_factor;

    let (cell, destroyed) = {
        let Ok(mut query) = ctx.world.query_one::<(&mut Obstacle, &Position)>(target) else {
            return false;
        };
        let Some((obstacle, pos)) = query.get() else {
            return false;
        };
        obstacle.hit_points -= damage;
        (pos.0, obstacle.hit_points <= 0.0)
    };
    agent.face(cell);
    ctx.stats.smash_hits += 1;

    if destroyed {
        let _ = ctx.world.despawn(target);
        ctx.grid.set_blocked(cell, false);
        ctx.stats.obstacles_destroyed += 1;
        log::debug!("zombie {:?} destroyed obstacle at ({}, {})", agent.entity, cell.x, cell.z);
    }
    destroyed
}

/// Finish eating: one bite off a corpse, or kill the downed creature.
pub fn consume(agent: &mut Agent, ctx: &mut TickContext, target: Entity) {
    if let Ok(pos) = ctx.world.get::<&Position>(target) {
        agent.face(pos.0);
    }

    let remaining = match ctx.world.get::<&mut Corpse>(target) {
        Ok(mut corpse) => {
            corpse.flesh = corpse.flesh.saturating_sub(1);
            Some((corpse.flesh, corpse.occupant))
        }
        Err(_) => None,
    };

    match remaining {
        Some((flesh, occupant)) => {
            ctx.stats.bites += 1;
            if flesh == 0 {
                let _ = ctx.world.despawn(target);
                if let Some(occupant) = occupant {
                    if ctx.world.get::<&Dead>(occupant).is_ok() {
                        let _ = ctx.world.despawn(occupant);
                    }
                }
                ctx.stats.corpses_consumed += 1;
                log::info!("corpse {:?} consumed by zombie {:?}", target, agent.entity);
            }
        }
        None => {
            ctx.stats.bites += 1;
            kill_creature(ctx, target);
        }
    }
}

/// Discharge into every living creature next to the zombie.
pub fn electrify(agent: &mut Agent, ctx: &mut TickContext) -> u32 {
    let victims: Vec<Entity> = ctx
        .world
        .query::<(&Creature, &Position, Option<&Dead>)>()
        .iter()
        .filter(|(_, (_, pos, dead))| dead.is_none() && agent.pos.chebyshev(pos.0) <= 1)
        .map(|(entity, _)| entity)
        .collect();

    let damage = ELECTRIC_DAMAGE * ctx.settings.damage_factor;
    for &victim in &victims {
        damage_creature(ctx, victim, damage);
    }
    let shocked = victims.len() as u32;
    ctx.stats.electrified += shocked;
    shocked
}
