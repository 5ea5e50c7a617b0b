//! Consumption target selection and the eat-delay countdown.

use rand::Rng;

use crate::settings::ZombieSettings;

/// Cells searched around a zombie for something to eat.
pub const EAT_SEARCH_RADIUS: u32 = 8;

/// Zombies skip looking for food while this many zombies share their cell.
pub const EAT_CROWD_LIMIT: u16 = 3;

/// A reachable thing a zombie could eat. `key` is a stable identity used to
/// break ties deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EatCandidate<K> {
    pub key: K,
    pub path_cost: u32,
}

/// Pick the consumption target.
///
/// The previous target is only picked when nothing else is available, so a
/// zombie does not bounce back to the thing it just gave up on. Among the
/// rest the nearest by path cost wins, then the lowest key.
pub fn select_target<K: Ord + Copy>(
    candidates: &[EatCandidate<K>],
    previous: Option<K>,
) -> Option<K> {
    candidates
        .iter()
        .min_by(|a, b| {
            let a_prev = Some(a.key) == previous;
            let b_prev = Some(b.key) == previous;
            a_prev
                .cmp(&b_prev)
                .then(a.path_cost.cmp(&b.path_cost))
                .then(a.key.cmp(&b.key))
        })
        .map(|c| c.key)
}

/// Ticks a zombie must stay next to a freshly acquired target before it bites.
pub fn roll_eat_delay(settings: &ZombieSettings, rng: &mut impl Rng) -> u32 {
    let min = settings.eat_delay_min.max(1);
    let max = settings.eat_delay_max.max(min);
    rng.gen_range(min..=max)
}

/// Result of one countdown step while adjacent to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EatProgress {
    Chewing { remaining: u32 },
    Complete,
}

/// Decrement the eat-delay counter by one tick.
pub fn count_down(counter: &mut u32) -> EatProgress {
    *counter = counter.saturating_sub(1);
    if *counter == 0 {
        EatProgress::Complete
    } else {
        EatProgress::Chewing { remaining: *counter }
    }
}

/// Whether a zombie may look for food at all this tick.
pub fn may_seek_food(settings: &ZombieSettings, zombies_in_cell: u16) -> bool {
    (settings.zombies_eat_corpses || settings.zombies_eat_downed)
        && zombies_in_cell <= EAT_CROWD_LIMIT
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn c(key: u32, path_cost: u32) -> EatCandidate<u32> {
        EatCandidate { key, path_cost }
    }

    #[test]
    fn test_nearest_wins() {
        let picked = select_target(&[c(1, 5), c(2, 3), c(3, 9)], None);
        assert_eq!(picked, Some(2));
    }

    #[test]
    fn test_tie_breaks_on_key() {
        assert_eq!(select_target(&[c(7, 4), c(3, 4)], None), Some(3));
    }

    #[test]
    fn test_previous_avoided_on_equal_cost() {
        assert_eq!(select_target(&[c(1, 4), c(2, 4)], Some(1)), Some(2));
    }

    #[test]
    fn test_previous_avoided_even_when_nearer() {
        assert_eq!(select_target(&[c(1, 1), c(2, 6)], Some(1)), Some(2));
    }

    #[test]
    fn test_previous_taken_when_alone() {
        assert_eq!(select_target(&[c(1, 4)], Some(1)), Some(1));
        assert_eq!(select_target::<u32>(&[], Some(1)), None);
    }

    #[test]
    fn test_count_down() {
        let mut counter = 2;
        assert_eq!(count_down(&mut counter), EatProgress::Chewing { remaining: 1 });
        assert_eq!(count_down(&mut counter), EatProgress::Complete);
        let mut zero = 0;
        assert_eq!(count_down(&mut zero), EatProgress::Complete);
    }

    #[test]
    fn test_eat_delay_within_bounds() {
        let settings = ZombieSettings {
            eat_delay_min: 5,
            eat_delay_max: 8,
            ..ZombieSettings::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..100 {
            let d = roll_eat_delay(&settings, &mut rng);
            assert!((5..=8).contains(&d));
        }
    }

    #[test]
    fn test_may_seek_food() {
        let s = ZombieSettings::default();
        assert!(may_seek_food(&s, 1));
        assert!(!may_seek_food(&s, EAT_CROWD_LIMIT + 1));
        let off = ZombieSettings {
            zombies_eat_corpses: false,
            zombies_eat_downed: false,
            ..ZombieSettings::default()
        };
        assert!(!may_seek_food(&off, 0));
    }
}
