//! Rage escalation state machine.
//!
//! Calm (level 0) → onset → Raging (configured level) → timeout → Calm.
//! Onset comes from sustained visual contact with a living target or from
//! being packed into a large herd. At most one transition happens per tick,
//! and both checks are no-ops when their precondition does not hold.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::settings::ZombieSettings;

/// Radius (cells) counted as "the herd" around a zombie.
pub const HERD_RADIUS: u32 = 2;

/// Contact gaps longer than this reset the exposure clock.
pub const CONTACT_GAP_TICKS: u64 = 60;

// Indexed by rage level - 1 (very low ..= very high).
const HERD_THRESHOLD: [u32; 5] = [14, 11, 8, 6, 4];
const HERD_CHANCE: [f32; 5] = [0.002, 0.005, 0.01, 0.02, 0.04];
const EXPOSURE_TICKS: [u64; 5] = [600, 400, 250, 150, 60];

fn level_index(level: u8) -> usize {
    (level.clamp(1, 5) - 1) as usize
}

/// Herd size that can trigger rage at the given level.
pub fn herd_threshold(level: u8) -> u32 {
    HERD_THRESHOLD[level_index(level)]
}

/// Ticks of continuous contact that trigger rage at the given level.
pub fn exposure_threshold(level: u8) -> u64 {
    EXPOSURE_TICKS[level_index(level)]
}

/// What the zombie perceives this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RageTrigger {
    /// Other zombies within `HERD_RADIUS`.
    pub herd_size: u32,
    /// A living colonist or human is in sight.
    pub sees_living_target: bool,
}

/// Per-zombie escalation state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Escalation {
    /// Rage level, 0 = calm.
    pub level: u8,
    /// Tick at which the current episode ends.
    pub ends_at: u64,
    /// Start of the current run of visual contact.
    pub contact_since: Option<u64>,
    pub last_contact: u64,
    /// Tick of the last transition, used to allow one transition per tick.
    pub changed_at: Option<u64>,
}

impl Escalation {
    pub fn is_raging(&self) -> bool {
        self.level > 0
    }

    fn transitioned_this_tick(&self, tick: u64) -> bool {
        self.changed_at == Some(tick)
    }

    /// End the episode once it has timed out or raging was switched off.
    /// Returns true if the zombie calmed down.
    pub fn check_end(&mut self, tick: u64, settings: &ZombieSettings) -> bool {
        if !self.is_raging() || self.transitioned_this_tick(tick) {
            return false;
        }
        if tick < self.ends_at && settings.raging_zombies {
            return false;
        }
        self.level = 0;
        self.ends_at = 0;
        self.contact_since = None;
        self.changed_at = Some(tick);
        true
    }

    /// Start an episode if the trigger warrants it. Returns true on onset.
    ///
    /// Tanky zombies never rage; they already behave as if they were.
    pub fn check_begin(
        &mut self,
        tick: u64,
        trigger: RageTrigger,
        tanky: bool,
        settings: &ZombieSettings,
        rng: &mut impl Rng,
    ) -> bool {
        if self.is_raging()
            || tanky
            || !settings.raging_zombies
            || self.transitioned_this_tick(tick)
        {
            return false;
        }

        if trigger.sees_living_target {
            let fresh = tick.saturating_sub(self.last_contact) > CONTACT_GAP_TICKS;
            if self.contact_since.is_none() || fresh {
                self.contact_since = Some(tick);
            }
            self.last_contact = tick;
        } else if tick.saturating_sub(self.last_contact) > CONTACT_GAP_TICKS {
            self.contact_since = None;
        }

        let level = settings.zombie_rage_level;
        let exposed = self
            .contact_since
            .is_some_and(|since| tick - since >= exposure_threshold(level));
        let herded = trigger.herd_size >= herd_threshold(level)
            && rng.gen::<f32>() < HERD_CHANCE[level_index(level)];

        if !(exposed || herded) {
            return false;
        }
        self.start(tick, settings, rng);
        true
    }

    /// Enter an episode unconditionally.
    pub fn start(&mut self, tick: u64, settings: &ZombieSettings, rng: &mut impl Rng) {
        let min = settings.rage_duration_min;
        let max = settings.rage_duration_max.max(min);
        let duration = rng.gen_range(min..=max) as u64;
        self.level = settings.zombie_rage_level.clamp(1, 5);
        self.ends_at = tick + duration;
        self.contact_since = None;
        self.changed_at = Some(tick);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(11)
    }

    #[test]
    fn test_thresholds_scale_with_level() {
        assert!(herd_threshold(5) < herd_threshold(1));
        assert!(exposure_threshold(5) < exposure_threshold(1));
        assert_eq!(herd_threshold(0), herd_threshold(1));
        assert_eq!(herd_threshold(9), herd_threshold(5));
    }

    #[test]
    fn test_start_sets_configured_level() {
        let settings = ZombieSettings {
            zombie_rage_level: 4,
            rage_duration_min: 100,
            rage_duration_max: 200,
            ..ZombieSettings::default()
        };
        let mut esc = Escalation::default();
        esc.start(10, &settings, &mut rng());
        assert_eq!(esc.level, 4);
        assert!(esc.ends_at >= 110 && esc.ends_at <= 210);
        assert_eq!(esc.changed_at, Some(10));
    }

    #[test]
    fn test_sustained_contact_triggers() {
        let settings = ZombieSettings::default();
        let mut esc = Escalation::default();
        let mut rng = rng();
        let seen = RageTrigger {
            herd_size: 0,
            sees_living_target: true,
        };
        let needed = exposure_threshold(settings.zombie_rage_level);
        for tick in 1..=needed {
            assert!(!esc.check_begin(tick, seen, false, &settings, &mut rng));
        }
        assert!(esc.check_begin(needed + 1, seen, false, &settings, &mut rng));
        assert!(esc.is_raging());
    }

    #[test]
    fn test_contact_gap_resets_exposure() {
        let settings = ZombieSettings::default();
        let mut esc = Escalation::default();
        let mut rng = rng();
        let seen = RageTrigger {
            herd_size: 0,
            sees_living_target: true,
        };
        esc.check_begin(1, seen, false, &settings, &mut rng);
        esc.check_begin(1 + CONTACT_GAP_TICKS + 5, RageTrigger::default(), false, &settings, &mut rng);
        assert_eq!(esc.contact_since, None);
    }

    #[test]
    fn test_tanky_and_disabled_never_begin() {
        let mut rng = rng();
        let herd = RageTrigger {
            herd_size: 100,
            sees_living_target: true,
        };
        let settings = ZombieSettings {
            zombie_rage_level: 5,
            ..ZombieSettings::default()
        };
        let mut esc = Escalation::default();
        for tick in 0..2000 {
            assert!(!esc.check_begin(tick, herd, true, &settings, &mut rng));
        }
        let off = ZombieSettings {
            raging_zombies: false,
            ..settings
        };
        for tick in 0..2000 {
            assert!(!esc.check_begin(tick, herd, false, &off, &mut rng));
        }
        assert_eq!(esc, Escalation::default());
    }

    #[test]
    fn test_check_end_after_timeout() {
        let settings = ZombieSettings::default();
        let mut esc = Escalation {
            level: 3,
            ends_at: 50,
            ..Escalation::default()
        };
        assert!(!esc.check_end(49, &settings));
        assert!(esc.check_end(50, &settings));
        assert!(!esc.is_raging());
    }

    #[test]
    fn test_check_end_idempotent() {
        let settings = ZombieSettings::default();
        let mut esc = Escalation {
            level: 3,
            ends_at: 10,
            ..Escalation::default()
        };
        assert!(esc.check_end(20, &settings));
        let after_first = esc;
        assert!(!esc.check_end(20, &settings));
        assert_eq!(esc, after_first);
        assert!(!esc.check_end(21, &settings));
        assert_eq!(esc, after_first);
    }

    #[test]
    fn test_one_transition_per_tick() {
        let settings = ZombieSettings {
            zombie_rage_level: 5,
            ..ZombieSettings::default()
        };
        let mut esc = Escalation {
            level: 5,
            ends_at: 10,
            ..Escalation::default()
        };
        assert!(esc.check_end(10, &settings));
        let herd = RageTrigger {
            herd_size: 100,
            sees_living_target: true,
        };
        let mut rng = rng();
        for _ in 0..500 {
            assert!(!esc.check_begin(10, herd, false, &settings, &mut rng));
        }
    }

    #[test]
    fn test_disabling_rage_ends_episode() {
        let mut esc = Escalation {
            level: 2,
            ends_at: 10_000,
            ..Escalation::default()
        };
        let off = ZombieSettings {
            raging_zombies: false,
            ..ZombieSettings::default()
        };
        assert!(esc.check_end(5, &off));
    }
}
