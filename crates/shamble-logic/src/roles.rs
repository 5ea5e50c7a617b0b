//! Zombie lifecycle states, role flags and body types.

use serde::{Deserialize, Serialize};

/// Where a zombie is in its lifecycle. Only `Wandering` and `Tracking`
/// make decisions; the others are owned by the host or incapacitated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ZombieState {
    /// Still climbing out of the ground (host animation).
    Emerging,
    /// Being relocated by the host, e.g. drifting in space.
    Floating,
    /// Normal roaming.
    #[default]
    Wandering,
    /// Following a colonist scent trail.
    Tracking,
    /// Knocked down; cannot act.
    Downed,
}

impl ZombieState {
    /// Emerging/Floating zombies are mid-animation and skip the tick entirely.
    pub fn is_transitional(self) -> bool {
        matches!(self, ZombieState::Emerging | ZombieState::Floating)
    }
}

/// Role flags as a small bitset. Branches query membership instead of
/// dispatching on a zombie "subclass".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ZombieRoles(u8);

impl ZombieRoles {
    pub const NONE: Self = Self(0);
    pub const MINER: Self = Self(1 << 0);
    pub const ALBINO: Self = Self(1 << 1);
    pub const TANKY: Self = Self(1 << 2);
    pub const DARK_SLIMER: Self = Self(1 << 3);
    pub const ELECTRIFIER: Self = Self(1 << 4);
    /// Was a player-controlled colonist before turning.
    pub const WAS_COLONIST: Self = Self(1 << 5);

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    #[must_use]
    pub const fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn is_miner(self) -> bool {
        self.contains(Self::MINER)
    }

    pub fn is_tanky(self) -> bool {
        self.contains(Self::TANKY)
    }

    pub fn is_albino(self) -> bool {
        self.contains(Self::ALBINO)
    }

    pub fn is_dark_slimer(self) -> bool {
        self.contains(Self::DARK_SLIMER)
    }

    pub fn is_electrifier(self) -> bool {
        self.contains(Self::ELECTRIFIER)
    }

    pub fn was_colonist(self) -> bool {
        self.contains(Self::WAS_COLONIST)
    }
}

impl std::ops::BitOr for ZombieRoles {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        self.with(rhs)
    }
}

/// Body type of the zombie's original pawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BodyType {
    Thin,
    #[default]
    Male,
    Female,
    Fat,
    Hulk,
}

impl BodyType {
    pub const ALL: [BodyType; 5] = [
        BodyType::Thin,
        BodyType::Male,
        BodyType::Female,
        BodyType::Fat,
        BodyType::Hulk,
    ];

    /// Reinforced bodies dig opportunistically before anything else.
    pub fn is_heavy(self) -> bool {
        matches!(self, BodyType::Fat | BodyType::Hulk)
    }
}

/// Whether a zombie ignores calm wandering and always moves like an enraged one.
///
/// True while raging, for tanky, albino and dark-slimer zombies, and for
/// former colonists that are not currently on a scent trail.
pub fn overrides_wandering(roles: ZombieRoles, state: ZombieState, raging: bool) -> bool {
    raging
        || roles.is_tanky()
        || roles.is_albino()
        || roles.is_dark_slimer()
        || (roles.was_colonist() && state != ZombieState::Tracking)
}
