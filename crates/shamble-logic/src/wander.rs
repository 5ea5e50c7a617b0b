//! Step selection for calm wandering, rage movement and tethered movement.
//!
//! All functions choose among pre-filtered candidate cells; legality
//! (bounds, walls, fire, crowding) is decided by the caller.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::grid::Cell;
use crate::settings::WanderingStyle;

/// Max zombies in a cell before it stops being a legal step.
pub const MAX_CROWD_PER_CELL: u16 = 4;

/// Chance per decision that a smart wanderer drifts toward the colony.
pub const SMART_DRIFT_CHANCE: f32 = 0.4;

/// A legal step and what the zombie knows about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOption {
    pub cell: Cell,
    /// Zombies already standing there.
    pub crowd: u16,
    /// Flow-field distance to the nearest living colonist, if reachable.
    pub colony_distance: Option<u32>,
}

/// Pick a calm wander step according to the wandering style.
pub fn choose_wander(
    style: WanderingStyle,
    options: &[MoveOption],
    rng: &mut impl Rng,
) -> Option<Cell> {
    if options.is_empty() {
        return None;
    }
    match style {
        WanderingStyle::Off => None,
        WanderingStyle::Simple => options.choose(rng).map(|o| o.cell),
        WanderingStyle::Smart => {
            if rng.gen::<f32>() < SMART_DRIFT_CHANCE {
                if let Some(cell) = closest_to_colony(options) {
                    return Some(cell);
                }
            }
            options
                .choose_weighted(rng, |o| 1.0 / (1.0 + o.crowd as f32))
                .ok()
                .map(|o| o.cell)
        }
    }
}

/// Step that descends the colonist flow field fastest. Ties go to the less
/// crowded cell, then to the earlier option.
pub fn closest_to_colony(options: &[MoveOption]) -> Option<Cell> {
    options
        .iter()
        .filter_map(|o| o.colony_distance.map(|d| (d, o.crowd, o.cell)))
        .min_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)))
        .map(|(_, _, cell)| cell)
}

/// Step that brings the zombie closest to `center`; used by enraged zombies
/// that have no route to the colony.
pub fn closest_to(options: &[MoveOption], center: Cell) -> Option<Cell> {
    options
        .iter()
        .min_by_key(|o| (o.cell.distance_squared(center), o.crowd))
        .map(|o| o.cell)
}

/// Destination for a zombie tethered to `anchor` within `radius` cells.
///
/// A current destination inside the tether range is kept. A zombie outside
/// the range is pulled back to the anchor. Otherwise it stays put.
pub fn tether_destination(pos: Cell, anchor: Cell, radius: u32, current: Cell) -> Cell {
    if current.is_valid() && current.chebyshev(anchor) <= radius {
        return current;
    }
    if pos.chebyshev(anchor) > radius {
        return anchor;
    }
    Cell::INVALID
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn opt(x: i32, crowd: u16, dist: Option<u32>) -> MoveOption {
        MoveOption {
            cell: Cell::new(x, 0),
            crowd,
            colony_distance: dist,
        }
    }

    #[test]
    fn test_off_never_moves() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let options = [opt(1, 0, None)];
        assert_eq!(choose_wander(WanderingStyle::Off, &options, &mut rng), None);
    }

    #[test]
    fn test_wander_picks_from_options() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let options = [opt(1, 0, None), opt(2, 3, Some(4))];
        for style in [WanderingStyle::Simple, WanderingStyle::Smart] {
            for _ in 0..50 {
                let cell = choose_wander(style, &options, &mut rng).unwrap();
                assert!(cell == Cell::new(1, 0) || cell == Cell::new(2, 0));
            }
        }
        assert_eq!(choose_wander(WanderingStyle::Smart, &[], &mut rng), None);
    }

    #[test]
    fn test_closest_to_colony() {
        let options = [opt(1, 0, Some(7)), opt(2, 2, Some(3)), opt(3, 0, Some(3)), opt(4, 0, None)];
        assert_eq!(closest_to_colony(&options), Some(Cell::new(3, 0)));
        assert_eq!(closest_to_colony(&[opt(1, 0, None)]), None);
    }

    #[test]
    fn test_closest_to_center() {
        let options = [opt(1, 0, None), opt(5, 0, None)];
        assert_eq!(closest_to(&options, Cell::new(6, 0)), Some(Cell::new(5, 0)));
    }

    #[test]
    fn test_tether() {
        let anchor = Cell::new(10, 10);
        // outside range: pulled to anchor
        assert_eq!(tether_destination(Cell::new(20, 10), anchor, 3, Cell::INVALID), anchor);
        // inside range, destination outside: stays
        assert_eq!(
            tether_destination(Cell::new(11, 10), anchor, 3, Cell::new(30, 30)),
            Cell::INVALID
        );
        // destination within range is kept
        assert_eq!(
            tether_destination(Cell::new(11, 10), anchor, 3, Cell::new(12, 12)),
            Cell::new(12, 12)
        );
    }
}
