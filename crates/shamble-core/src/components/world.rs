//! Non-zombie world entities: living creatures, corpses and obstacles

use hecs::Entity;
use serde::{Deserialize, Serialize};
use shamble_logic::settings::AttackMode;

/// Health at or below which a creature goes down
pub const DOWNED_HEALTH: f32 = 30.0;

/// Bites a fresh corpse can take before it is gone
pub const CORPSE_FLESH: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CreatureKind {
    Colonist,
    Human,
    Animal,
}

/// A living (or once living) non-zombie creature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creature {
    pub kind: CreatureKind,
    pub downed: bool,
}

impl Creature {
    pub fn new(kind: CreatureKind) -> Self {
        Self { kind, downed: false }
    }

    pub fn is_humanlike(&self) -> bool {
        matches!(self.kind, CreatureKind::Colonist | CreatureKind::Human)
    }

    /// Whether the attack mode lets zombies go after this kind
    pub fn attackable_under(&self, mode: AttackMode) -> bool {
        match mode {
            AttackMode::Everything => true,
            AttackMode::OnlyHumans => self.is_humanlike(),
            AttackMode::OnlyColonists => self.kind == CreatureKind::Colonist,
        }
    }
}

/// Marker for a creature that has died; it stays around as a corpse occupant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dead;

/// How many zombies struck this creature on `tick`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MeleeLoad {
    pub tick: u64,
    pub attackers: u8,
}

impl MeleeLoad {
    pub fn attackers_at(&self, tick: u64) -> u8 {
        if self.tick == tick {
            self.attackers
        } else {
            0
        }
    }

    pub fn register(&mut self, tick: u64) {
        if self.tick != tick {
            self.tick = tick;
            self.attackers = 0;
        }
        self.attackers = self.attackers.saturating_add(1);
    }
}

/// A corpse lying on the ground
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Corpse {
    /// The dead creature inside, if known
    pub occupant: Option<Entity>,
    pub flesh: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    Door,
    Wall,
    Furniture,
}

/// Something built that blocks movement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    pub hit_points: f32,
}

impl Obstacle {
    pub fn new(kind: ObstacleKind) -> Self {
        let hit_points = match kind {
            ObstacleKind::Door => 60.0,
            ObstacleKind::Wall => 300.0,
            ObstacleKind::Furniture => 100.0,
        };
        Self { kind, hit_points }
    }

    pub fn is_door(&self) -> bool {
        self.kind == ObstacleKind::Door
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attack_modes() {
        let colonist = Creature::new(CreatureKind::Colonist);
        let human = Creature::new(CreatureKind::Human);
        let animal = Creature::new(CreatureKind::Animal);

        assert!(animal.attackable_under(AttackMode::Everything));
        assert!(!animal.attackable_under(AttackMode::OnlyHumans));
        assert!(human.attackable_under(AttackMode::OnlyHumans));
        assert!(!human.attackable_under(AttackMode::OnlyColonists));
        assert!(colonist.attackable_under(AttackMode::OnlyColonists));
    }

    #[test]
    fn test_melee_load_resets_per_tick() {
        let mut load = MeleeLoad::default();
        load.register(5);
        load.register(5);
        assert_eq!(load.attackers_at(5), 2);
        assert_eq!(load.attackers_at(6), 0);
        load.register(6);
        assert_eq!(load.attackers_at(6), 1);
    }
}
