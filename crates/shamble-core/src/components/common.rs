//! Common components shared by all entity types

use serde::{Deserialize, Serialize};
use shamble_logic::grid::{Cell, Rot4};

/// Grid cell an entity stands on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position(pub Cell);

impl Position {
    pub fn new(x: i32, z: i32) -> Self {
        Self(Cell::new(x, z))
    }

    pub fn cell(&self) -> Cell {
        self.0
    }
}

/// Direction an entity is facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Facing(pub Rot4);

/// Hit points. Zero or below means dead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }

    /// Fraction of max health left (0.0 - 1.0)
    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            0.0
        } else {
            (self.current / self.max).clamp(0.0, 1.0)
        }
    }

    pub fn damage(&mut self, amount: f32) {
        self.current -= amount.max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health() {
        let mut h = Health::new(100.0);
        assert_eq!(h.fraction(), 1.0);
        h.damage(40.0);
        assert!((h.fraction() - 0.6).abs() < 0.001);
        h.damage(-5.0);
        assert!((h.current - 60.0).abs() < 0.001);
        h.damage(70.0);
        assert!(h.is_dead());
        assert_eq!(h.fraction(), 0.0);
    }
}
