//! Target acquisition - scans the surroundings for things to eat, attack,
//! smash, dig or follow.

use hecs::Entity;
use shamble_logic::eating::{select_target, EatCandidate, EAT_SEARCH_RADIUS};
use shamble_logic::grid::Cell;
use shamble_logic::settings::{SmashMode, ZombieSettings};

use super::context::{Agent, TickContext};
use crate::components::*;
use crate::pathing::{line_of_sight, path_costs};

/// Cells scanned for a fresher colonist scent
pub const SCENT_SEARCH_RADIUS: u32 = 3;

fn id_bits(entity: Entity) -> u64 {
    entity.to_bits().get()
}

/// The cell of an eat target if it is still edible, `None` if it was
/// removed, healed or eating it has been disabled.
pub fn edible_cell(ctx: &TickContext, target: Entity) -> Option<Cell> {
    let e = ctx.world.entity(target).ok()?;
    let cell = e.get::<&Position>()?.0;
    if let Some(corpse) = e.get::<&Corpse>() {
        return (ctx.settings.zombies_eat_corpses && corpse.flesh > 0).then_some(cell);
    }
    let creature = e.get::<&Creature>()?;
    let edible = ctx.settings.zombies_eat_downed && creature.downed && !e.has::<Dead>();
    edible.then_some(cell)
}

/// Find something to eat within `EAT_SEARCH_RADIUS`.
///
/// Candidates must be reachable. The previous target is only chosen when it
/// is the only candidate; otherwise the nearest wins, ties on entity id.
pub fn find_consumption_target(agent: &Agent, ctx: &TickContext) -> Option<Entity> {
    let settings: &ZombieSettings = ctx.settings;
    if !settings.zombies_eat_corpses && !settings.zombies_eat_downed {
        return None;
    }

    let mut in_range: Vec<(Entity, Cell)> = Vec::new();
    if settings.zombies_eat_corpses {
        for (entity, (corpse, pos)) in ctx.world.query::<(&Corpse, &Position)>().iter() {
            if corpse.flesh > 0 && pos.0.chebyshev(agent.pos) <= EAT_SEARCH_RADIUS {
                in_range.push((entity, pos.0));
            }
        }
    }
    if settings.zombies_eat_downed {
        for (entity, (creature, pos, dead)) in ctx
            .world
            .query::<(&Creature, &Position, Option<&Dead>)>()
            .iter()
        {
            if creature.downed && dead.is_none() && pos.0.chebyshev(agent.pos) <= EAT_SEARCH_RADIUS {
                in_range.push((entity, pos.0));
            }
        }
    }
    if in_range.is_empty() {
        return None;
    }

    let costs = path_costs(ctx.grid, agent.pos, EAT_SEARCH_RADIUS * 2);
    let candidates: Vec<EatCandidate<u64>> = in_range
        .iter()
        .filter_map(|&(entity, cell)| {
            costs.get(&cell).map(|&path_cost| EatCandidate {
                key: id_bits(entity),
                path_cost,
            })
        })
        .collect();

    let previous = agent.job.last_eat_target.map(id_bits);
    let picked = select_target(&candidates, previous)?;
    in_range
        .iter()
        .map(|&(entity, _)| entity)
        .find(|&entity| id_bits(entity) == picked)
}

/// An adjacent living creature this zombie may strike right now.
pub fn find_attack_target(agent: &Agent, ctx: &TickContext) -> Option<Entity> {
    let limit = ctx.settings.safe_melee_limit;
    ctx.world
        .query::<(&Creature, &Position, Option<&MeleeLoad>, Option<&Dead>)>()
        .iter()
        .filter(|(_, (creature, pos, load, dead))| {
            dead.is_none()
                && !creature.downed
                && creature.attackable_under(ctx.settings.attack_mode)
                && agent.pos.is_adjacent_or_same(pos.0)
                && (limit == 0 || load.map_or(0, |l| l.attackers_at(ctx.tick)) < limit)
        })
        .map(|(entity, (_, pos, _, _))| (pos.0.chebyshev(agent.pos), id_bits(entity), entity))
        .min()
        .map(|(_, _, entity)| entity)
}

/// Whether a living colonist or human is within sense radius and in sight.
pub fn sees_living_target(agent: &Agent, ctx: &TickContext) -> bool {
    let radius = ctx.settings.zombie_instinct.sense_radius();
    ctx.world
        .query::<(&Creature, &Position, Option<&Dead>)>()
        .iter()
        .any(|(_, (creature, pos, dead))| {
            dead.is_none()
                && !creature.downed
                && creature.is_humanlike()
                && pos.0.chebyshev(agent.pos) <= radius
                && line_of_sight(ctx.grid, agent.pos, pos.0)
        })
}

/// An adjacent obstacle the smash mode allows, weakest first.
pub fn find_smash_target(agent: &Agent, ctx: &TickContext) -> Option<Entity> {
    let mode = ctx.settings.smash_mode;
    if mode == SmashMode::Nothing {
        return None;
    }
    ctx.world
        .query::<(&Obstacle, &Position)>()
        .iter()
        .filter(|(_, (obstacle, pos))| {
            agent.pos.chebyshev(pos.0) == 1
                && (mode == SmashMode::AnyBuilding || obstacle.is_door())
        })
        .map(|(entity, (obstacle, _))| (obstacle.hit_points.max(0.0) as u32, id_bits(entity), entity))
        .min()
        .map(|(_, _, entity)| entity)
}

/// An adjacent rock cell to dig into. Work already started is continued;
/// otherwise the rock nearest the destination (or the softest) wins.
pub fn find_dig_target(agent: &Agent, ctx: &TickContext) -> Option<Cell> {
    if let Some(dig) = agent.zombie.dig {
        if agent.pos.chebyshev(dig.cell) == 1 && ctx.grid.rock_hardness(dig.cell).is_some() {
            return Some(dig.cell);
        }
    }
    let goal = agent.job.destination;
    agent
        .pos
        .neighbors()
        .filter_map(|c| ctx.grid.rock_hardness(c).map(|h| (c, h)))
        .min_by_key(|&(c, hardness)| {
            let toward = if goal.is_valid() { c.distance_squared(goal) } else { 0 };
            (toward, hardness, c)
        })
        .map(|(c, _)| c)
}

/// A nearby cell with a fresher colonist scent than the current one, still
/// within scent memory.
pub fn freshest_scent(agent: &Agent, ctx: &TickContext) -> Option<Cell> {
    let memory = ctx.settings.zombie_instinct.scent_memory_ticks();
    let here = ctx.grid.scent(agent.pos);
    ctx.grid
        .bounds()
        .cells_within(agent.pos, SCENT_SEARCH_RADIUS)
        .into_iter()
        .filter(|&c| c != agent.pos && ctx.grid.is_walkable(c))
        .filter_map(|c| {
            let scent = ctx.grid.scent(c);
            let fresh = scent > 0 && scent > here && ctx.tick.saturating_sub(scent) <= memory;
            fresh.then_some((scent, c))
        })
        .max_by(|a, b| {
            a.0.cmp(&b.0)
                .then(b.1.chebyshev(agent.pos).cmp(&a.1.chebyshev(agent.pos)))
                .then(b.1.cmp(&a.1))
        })
        .map(|(_, c)| c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{spawn_corpse, spawn_creature, spawn_obstacle, spawn_zombie};
    use crate::systems::test_support::Fixture;
    use shamble_logic::roles::{BodyType, ZombieRoles};

    #[test]
    fn test_nearest_corpse_chosen() {
        let mut fx = Fixture::new(20, 20);
        let z = spawn_zombie(&mut fx.world, &mut fx.grid, Cell::new(5, 5), ZombieRoles::NONE, BodyType::Male);
        let far = spawn_corpse(&mut fx.world, Cell::new(10, 5), None);
        let near = spawn_corpse(&mut fx.world, Cell::new(7, 5), None);
        let agent = Agent::load(&fx.world, z).unwrap();
        let ctx = fx.ctx();
        assert_eq!(find_consumption_target(&agent, &ctx), Some(near));
        assert_ne!(find_consumption_target(&agent, &ctx), Some(far));
    }

    #[test]
    fn test_previous_target_only_when_alone() {
        let mut fx = Fixture::new(20, 20);
        let z = spawn_zombie(&mut fx.world, &mut fx.grid, Cell::new(5, 5), ZombieRoles::NONE, BodyType::Male);
        let a = spawn_corpse(&mut fx.world, Cell::new(6, 5), None);
        let b = spawn_corpse(&mut fx.world, Cell::new(9, 5), None);
        let mut agent = Agent::load(&fx.world, z).unwrap();
        agent.job.last_eat_target = Some(a);
        {
            let ctx = fx.ctx();
            assert_eq!(find_consumption_target(&agent, &ctx), Some(b));
        }
        fx.world.despawn(b).unwrap();
        let ctx = fx.ctx();
        assert_eq!(find_consumption_target(&agent, &ctx), Some(a));
    }

    #[test]
    fn test_unreachable_and_disabled() {
        let mut fx = Fixture::new(20, 20);
        let z = spawn_zombie(&mut fx.world, &mut fx.grid, Cell::new(5, 5), ZombieRoles::NONE, BodyType::Male);
        let downed = spawn_creature(&mut fx.world, Cell::new(6, 6), CreatureKind::Human);
        fx.world.get::<&mut Creature>(downed).unwrap().downed = true;
        let agent = Agent::load(&fx.world, z).unwrap();
        assert_eq!(find_consumption_target(&agent, &fx.ctx()), Some(downed));

        fx.settings.zombies_eat_downed = false;
        assert_eq!(find_consumption_target(&agent, &fx.ctx()), None);
        assert_eq!(edible_cell(&fx.ctx(), downed), None);

        fx.settings.zombies_eat_downed = true;
        for c in Cell::new(6, 6).neighbors() {
            fx.grid.set_blocked(c, true);
        }
        assert_eq!(find_consumption_target(&agent, &fx.ctx()), None);
    }

    #[test]
    fn test_attack_target_respects_mode_and_limit() {
        let mut fx = Fixture::new(10, 10);
        let z = spawn_zombie(&mut fx.world, &mut fx.grid, Cell::new(5, 5), ZombieRoles::NONE, BodyType::Male);
        let animal = spawn_creature(&mut fx.world, Cell::new(6, 5), CreatureKind::Animal);
        let agent = Agent::load(&fx.world, z).unwrap();
        assert_eq!(find_attack_target(&agent, &fx.ctx()), Some(animal));

        fx.settings.attack_mode = shamble_logic::settings::AttackMode::OnlyHumans;
        assert_eq!(find_attack_target(&agent, &fx.ctx()), None);

        fx.settings.attack_mode = shamble_logic::settings::AttackMode::Everything;
        fx.settings.safe_melee_limit = 1;
        fx.world
            .insert_one(animal, MeleeLoad { tick: fx.tick, attackers: 1 })
            .unwrap();
        assert_eq!(find_attack_target(&agent, &fx.ctx()), None);
    }

    #[test]
    fn test_smash_target_modes() {
        let mut fx = Fixture::new(10, 10);
        let z = spawn_zombie(&mut fx.world, &mut fx.grid, Cell::new(5, 5), ZombieRoles::NONE, BodyType::Male);
        let wall = spawn_obstacle(&mut fx.world, &mut fx.grid, Cell::new(6, 5), ObstacleKind::Wall);
        let agent = Agent::load(&fx.world, z).unwrap();
        assert_eq!(find_smash_target(&agent, &fx.ctx()), None);
        fx.settings.smash_mode = SmashMode::AnyBuilding;
        assert_eq!(find_smash_target(&agent, &fx.ctx()), Some(wall));
        fx.settings.smash_mode = SmashMode::Nothing;
        assert_eq!(find_smash_target(&agent, &fx.ctx()), None);
    }

    #[test]
    fn test_freshest_scent() {
        let mut fx = Fixture::new(10, 10);
        fx.tick = 100;
        let z = spawn_zombie(&mut fx.world, &mut fx.grid, Cell::new(5, 5), ZombieRoles::NONE, BodyType::Male);
        fx.grid.mark_scent(Cell::new(6, 5), 90);
        fx.grid.mark_scent(Cell::new(7, 5), 95);
        let agent = Agent::load(&fx.world, z).unwrap();
        assert_eq!(freshest_scent(&agent, &fx.ctx()), Some(Cell::new(7, 5)));

        fx.tick = 100_000;
        assert_eq!(freshest_scent(&agent, &fx.ctx()), None);
    }
}
