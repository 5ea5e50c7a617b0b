//! Configuration snapshot for zombie behaviour.
//!
//! `ZombieSettings` is the read-only set of knobs the resolver consults each
//! tick. Settings can change over the course of a game: a `SettingsTimeline`
//! holds keyframes and resolves the snapshot for a given tick by
//! interpolating numeric values between neighbouring keyframes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What zombies will attack in melee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AttackMode {
    #[default]
    Everything,
    OnlyHumans,
    OnlyColonists,
}

/// What zombies will smash when they bump into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SmashMode {
    Nothing,
    #[default]
    DoorsOnly,
    AnyBuilding,
}

/// How keen a zombie's senses are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ZombieInstinct {
    Dull,
    #[default]
    Normal,
    Sharp,
}

impl ZombieInstinct {
    /// Radius (cells) within which living targets can be seen.
    pub fn sense_radius(self) -> u32 {
        match self {
            ZombieInstinct::Dull => 6,
            ZombieInstinct::Normal => 10,
            ZombieInstinct::Sharp => 16,
        }
    }

    /// How many ticks a colonist scent stays worth following.
    pub fn scent_memory_ticks(self) -> u64 {
        match self {
            ZombieInstinct::Dull => 300,
            ZombieInstinct::Normal => 900,
            ZombieInstinct::Sharp => 1800,
        }
    }
}

/// How calm zombies pick their next step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WanderingStyle {
    /// Stand still unless something interesting happens.
    Off,
    /// Random legal step.
    Simple,
    /// Drift toward the colony, avoiding crowds.
    #[default]
    Smart,
}

/// Which miners are allowed to dig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DigEligibility {
    Never,
    /// Only miners with a fat or hulk body.
    HeavyOnly,
    #[default]
    AllMiners,
}

impl DigEligibility {
    pub fn allows(self, heavy: bool) -> bool {
        match self {
            DigEligibility::Never => false,
            DigEligibility::HeavyOnly => heavy,
            DigEligibility::AllMiners => true,
        }
    }
}

/// Read-only behaviour configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZombieSettings {
    pub attack_mode: AttackMode,
    pub smash_mode: SmashMode,
    pub smash_only_when_agitated: bool,
    pub zombie_instinct: ZombieInstinct,

    pub raging_zombies: bool,
    /// 1 (very low) ..= 5 (very high)
    pub zombie_rage_level: u8,
    /// Rage episode length bounds, in ticks
    pub rage_duration_min: u32,
    pub rage_duration_max: u32,

    pub zombies_die_very_easily: bool,
    pub zombies_eat_downed: bool,
    pub zombies_eat_corpses: bool,
    /// Ticks spent adjacent to a target before a bite completes
    pub eat_delay_min: u32,
    pub eat_delay_max: u32,
    pub dig_eligibility: DigEligibility,

    pub tanky_operator_chance: f32,
    pub miner_chance: f32,
    pub electrifier_chance: f32,
    pub albino_chance: f32,
    pub dark_slimer_chance: f32,

    pub use_dynamic_threat_level: bool,
    pub zombies_die_on_zero_threat: bool,

    pub move_speed_idle: f32,
    pub move_speed_tracking: f32,
    pub damage_factor: f32,
    /// Max zombies that may strike the same creature per tick (0 = unlimited)
    pub safe_melee_limit: u8,
    pub zombies_burn_longer: bool,
    pub wandering_style: WanderingStyle,
    pub floating_zombies: bool,
}

impl Default for ZombieSettings {
    fn default() -> Self {
        Self {
            attack_mode: AttackMode::Everything,
            smash_mode: SmashMode::DoorsOnly,
            smash_only_when_agitated: true,
            zombie_instinct: ZombieInstinct::Normal,
            raging_zombies: true,
            zombie_rage_level: 3,
            rage_duration_min: 2_500,
            rage_duration_max: 5_000,
            zombies_die_very_easily: false,
            zombies_eat_downed: true,
            zombies_eat_corpses: true,
            eat_delay_min: 60,
            eat_delay_max: 180,
            dig_eligibility: DigEligibility::AllMiners,
            tanky_operator_chance: 0.01,
            miner_chance: 0.01,
            electrifier_chance: 0.01,
            albino_chance: 0.01,
            dark_slimer_chance: 0.01,
            use_dynamic_threat_level: false,
            zombies_die_on_zero_threat: true,
            move_speed_idle: 0.2,
            move_speed_tracking: 1.3,
            damage_factor: 1.0,
            safe_melee_limit: 1,
            zombies_burn_longer: true,
            wandering_style: WanderingStyle::Smart,
            floating_zombies: true,
        }
    }
}

/// Errors from loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("keyframe at tick {tick} is not after the previous keyframe at {previous}")]
    KeyframeOutOfOrder { tick: u64, previous: u64 },
    #[error("settings timeline has no keyframes")]
    EmptyTimeline,
}

fn clamp_f32(name: &str, value: f32, lo: f32, hi: f32) -> f32 {
    let clamped = if value.is_nan() { lo } else { value.clamp(lo, hi) };
    if clamped != value {
        log::warn!("setting {} = {} out of range, using {}", name, value, clamped);
    }
    clamped
}

fn clamp_u32(name: &str, value: u32, lo: u32, hi: u32) -> u32 {
    let clamped = value.clamp(lo, hi);
    if clamped != value {
        log::warn!("setting {} = {} out of range, using {}", name, value, clamped);
    }
    clamped
}

impl ZombieSettings {
    /// Parse settings from JSON. Missing fields take their defaults; the
    /// result is sanitized.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: ZombieSettings = serde_json::from_str(json)?;
        Ok(settings.sanitized())
    }

    /// Clamp every knob into the range the settings sliders allow.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        self.zombie_rage_level =
            clamp_u32("zombie_rage_level", self.zombie_rage_level as u32, 1, 5) as u8;
        self.rage_duration_min = clamp_u32("rage_duration_min", self.rage_duration_min, 60, 60_000);
        self.rage_duration_max = clamp_u32(
            "rage_duration_max",
            self.rage_duration_max,
            self.rage_duration_min,
            60_000,
        );
        self.eat_delay_min = clamp_u32("eat_delay_min", self.eat_delay_min, 1, 10_000);
        self.eat_delay_max =
            clamp_u32("eat_delay_max", self.eat_delay_max, self.eat_delay_min, 10_000);

        self.tanky_operator_chance =
            clamp_f32("tanky_operator_chance", self.tanky_operator_chance, 0.0, 1.0);
        self.miner_chance = clamp_f32("miner_chance", self.miner_chance, 0.0, 1.0);
        self.electrifier_chance = clamp_f32("electrifier_chance", self.electrifier_chance, 0.0, 1.0);
        self.albino_chance = clamp_f32("albino_chance", self.albino_chance, 0.0, 1.0);
        self.dark_slimer_chance = clamp_f32("dark_slimer_chance", self.dark_slimer_chance, 0.0, 1.0);
        let total = self.special_chance_total();
        if total > 1.0 {
            log::warn!("special zombie chances sum to {}, scaling down", total);
            self.tanky_operator_chance /= total;
            self.miner_chance /= total;
            self.electrifier_chance /= total;
            self.albino_chance /= total;
            self.dark_slimer_chance /= total;
        }

        self.move_speed_idle = clamp_f32("move_speed_idle", self.move_speed_idle, 0.01, 2.0);
        self.move_speed_tracking =
            clamp_f32("move_speed_tracking", self.move_speed_tracking, 0.05, 3.0);
        self.damage_factor = clamp_f32("damage_factor", self.damage_factor, 0.1, 4.0);
        self.safe_melee_limit =
            clamp_u32("safe_melee_limit", self.safe_melee_limit as u32, 0, 4) as u8;
        self
    }

    /// Sum of all special zombie chances.
    pub fn special_chance_total(&self) -> f32 {
        self.tanky_operator_chance
            + self.miner_chance
            + self.electrifier_chance
            + self.albino_chance
            + self.dark_slimer_chance
    }

    /// Chance that a spawned zombie has no special role.
    pub fn normal_zombie_chance(&self) -> f32 {
        (1.0 - self.special_chance_total()).max(0.0)
    }

    /// Interpolate between two snapshots. `t` in `[0, 1]`.
    ///
    /// Numeric knobs are blended; flags and modes come from `self` (the
    /// earlier keyframe) until `t` reaches 1.
    pub fn interpolate(&self, next: &ZombieSettings, t: f32) -> ZombieSettings {
        let t = t.clamp(0.0, 1.0);
        if t >= 1.0 {
            return next.clone();
        }
        let f = |a: f32, b: f32| a + (b - a) * t;
        let u = |a: u32, b: u32| (a as f32 + (b as f32 - a as f32) * t).round() as u32;
        ZombieSettings {
            zombie_rage_level: u(self.zombie_rage_level as u32, next.zombie_rage_level as u32)
                as u8,
            rage_duration_min: u(self.rage_duration_min, next.rage_duration_min),
            rage_duration_max: u(self.rage_duration_max, next.rage_duration_max),
            eat_delay_min: u(self.eat_delay_min, next.eat_delay_min),
            eat_delay_max: u(self.eat_delay_max, next.eat_delay_max),
            tanky_operator_chance: f(self.tanky_operator_chance, next.tanky_operator_chance),
            miner_chance: f(self.miner_chance, next.miner_chance),
            electrifier_chance: f(self.electrifier_chance, next.electrifier_chance),
            albino_chance: f(self.albino_chance, next.albino_chance),
            dark_slimer_chance: f(self.dark_slimer_chance, next.dark_slimer_chance),
            move_speed_idle: f(self.move_speed_idle, next.move_speed_idle),
            move_speed_tracking: f(self.move_speed_tracking, next.move_speed_tracking),
            damage_factor: f(self.damage_factor, next.damage_factor),
            safe_melee_limit: u(self.safe_melee_limit as u32, next.safe_melee_limit as u32) as u8,
            ..self.clone()
        }
    }
}

/// Settings in effect from `tick` onwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsKeyFrame {
    pub tick: u64,
    pub values: ZombieSettings,
}

/// Settings over the course of a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsTimeline {
    keyframes: Vec<SettingsKeyFrame>,
}

impl SettingsTimeline {
    /// A timeline with a single keyframe at tick 0.
    pub fn new(values: ZombieSettings) -> Self {
        Self {
            keyframes: vec![SettingsKeyFrame { tick: 0, values }],
        }
    }

    /// Build from keyframes; they must be in strictly increasing tick order.
    pub fn from_keyframes(keyframes: Vec<SettingsKeyFrame>) -> Result<Self, SettingsError> {
        let mut timeline = Self {
            keyframes: Vec::with_capacity(keyframes.len()),
        };
        for kf in keyframes {
            timeline.push(kf.tick, kf.values)?;
        }
        if timeline.keyframes.is_empty() {
            return Err(SettingsError::EmptyTimeline);
        }
        Ok(timeline)
    }

    /// Parse a JSON array of keyframes.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let keyframes: Vec<SettingsKeyFrame> = serde_json::from_str(json)?;
        Self::from_keyframes(keyframes)
    }

    /// Append a keyframe after the last one.
    pub fn push(&mut self, tick: u64, values: ZombieSettings) -> Result<(), SettingsError> {
        if let Some(last) = self.keyframes.last() {
            if tick <= last.tick {
                return Err(SettingsError::KeyframeOutOfOrder {
                    tick,
                    previous: last.tick,
                });
            }
        }
        self.keyframes.push(SettingsKeyFrame {
            tick,
            values: values.sanitized(),
        });
        Ok(())
    }

    pub fn keyframes(&self) -> &[SettingsKeyFrame] {
        &self.keyframes
    }

    /// Resolve the snapshot in effect at `tick`.
    pub fn at(&self, tick: u64) -> ZombieSettings {
        let Some(first) = self.keyframes.first() else {
            return ZombieSettings::default();
        };
        if tick <= first.tick {
            return first.values.clone();
        }
        for pair in self.keyframes.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if tick < b.tick {
                let t = (tick - a.tick) as f32 / (b.tick - a.tick) as f32;
                return a.values.interpolate(&b.values, t);
            }
        }
        self.keyframes
            .last()
            .map(|kf| kf.values.clone())
            .unwrap_or_default()
    }
}

impl Default for SettingsTimeline {
    fn default() -> Self {
        Self::new(ZombieSettings::default())
    }
}
