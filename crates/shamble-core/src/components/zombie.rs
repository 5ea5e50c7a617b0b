//! Zombie components: identity, role flags and the stumble job state

use hecs::Entity;
use serde::{Deserialize, Serialize};
use shamble_logic::grid::Cell;
use shamble_logic::rage::Escalation;
use shamble_logic::roles::{BodyType, ZombieRoles, ZombieState};

/// Ticks a zombie burns after touching fire
pub const BURN_TICKS: u32 = 120;

/// Zombie component - present on every zombie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zombie {
    pub state: ZombieState,
    pub roles: ZombieRoles,
    pub body: BodyType,
    pub escalation: Escalation,
    /// Set on arrival; read and cleared by the tracking step.
    pub check_smashable: bool,
    /// Remaining burn ticks, 0 = not burning
    pub burning: u32,
    /// Unconscious until this tick
    pub stunned_until: u64,
    /// Set by the host when the electric charge is knocked out (EMP)
    pub electric_depleted: bool,
    /// Remaining host animation ticks while `Emerging` or `Floating`
    pub emerge_ticks: u32,
    pub dig: Option<DigProgress>,
}

impl Zombie {
    pub fn new(roles: ZombieRoles, body: BodyType) -> Self {
        Self {
            state: ZombieState::Wandering,
            roles,
            body,
            escalation: Escalation::default(),
            check_smashable: false,
            burning: 0,
            stunned_until: 0,
            electric_depleted: false,
            emerge_ticks: 0,
            dig: None,
        }
    }

    pub fn with_state(mut self, state: ZombieState) -> Self {
        self.state = state;
        self
    }

    /// Start in the ground, climbing out over `ticks`.
    pub fn emerging(mut self, ticks: u32) -> Self {
        self.state = ZombieState::Emerging;
        self.emerge_ticks = ticks;
        self
    }

    pub fn is_raging(&self) -> bool {
        self.escalation.is_raging()
    }

    pub fn is_tracking(&self) -> bool {
        self.state == ZombieState::Tracking
    }

    pub fn is_unconscious(&self, tick: u64) -> bool {
        tick < self.stunned_until
    }

    pub fn is_active_electric(&self) -> bool {
        self.roles.is_electrifier() && !self.electric_depleted
    }

    /// Read the arrival flag and clear it.
    pub fn take_smashable(&mut self) -> bool {
        std::mem::replace(&mut self.check_smashable, false)
    }
}

/// Excavation in progress on a rock cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DigProgress {
    pub cell: Cell,
    pub work: f32,
}

/// Outcome of the last movement step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MoveResult {
    #[default]
    Continuing,
    Arrived,
    Blocked,
}

/// The resolver's persistent job state.
///
/// Holds entity references, so it is saved through
/// `persistence::SavedStumbleJob` rather than serialized directly.
#[derive(Debug, Clone, PartialEq)]
pub struct StumbleJob {
    /// `Cell::INVALID` when there is no destination
    pub destination: Cell,
    pub eat_target: Option<Entity>,
    /// Last thing eaten or given up on
    pub last_eat_target: Option<Entity>,
    pub eat_delay_counter: u32,
    pub eat_delay: u32,
    pub last_move: MoveResult,
    /// Fraction of a cell walked toward the next hop
    pub move_progress: f32,
}

impl StumbleJob {
    pub fn has_destination(&self) -> bool {
        self.destination.is_valid()
    }

    pub fn clear_destination(&mut self) {
        self.destination = Cell::INVALID;
        self.move_progress = 0.0;
    }

    pub fn set_destination(&mut self, cell: Cell) {
        if cell != self.destination {
            self.move_progress = 0.0;
        }
        self.destination = cell;
        self.last_move = MoveResult::Continuing;
    }

    pub fn clear_eat_target(&mut self) {
        self.eat_target = None;
        self.eat_delay_counter = 0;
    }
}

impl Default for StumbleJob {
    fn default() -> Self {
        Self {
            destination: Cell::INVALID,
            eat_target: None,
            last_eat_target: None,
            eat_delay_counter: 0,
            eat_delay: 0,
            last_move: MoveResult::Continuing,
            move_progress: 0.0,
        }
    }
}

/// Roping: the zombie is tied to `anchor` and may not leave `radius`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tether {
    pub anchor: Cell,
    pub radius: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_smashable_clears() {
        let mut z = Zombie::new(ZombieRoles::NONE, BodyType::Male);
        z.check_smashable = true;
        assert!(z.take_smashable());
        assert!(!z.check_smashable);
        assert!(!z.take_smashable());
    }

    #[test]
    fn test_job_destination() {
        let mut job = StumbleJob::default();
        assert!(!job.has_destination());
        job.set_destination(Cell::new(3, 4));
        job.move_progress = 0.5;
        job.set_destination(Cell::new(3, 4));
        assert_eq!(job.move_progress, 0.5);
        job.set_destination(Cell::new(5, 4));
        assert_eq!(job.move_progress, 0.0);
        job.clear_destination();
        assert_eq!(job.destination, Cell::INVALID);
    }

    #[test]
    fn test_electric_depletes() {
        let mut z = Zombie::new(ZombieRoles::ELECTRIFIER, BodyType::Thin);
        assert!(z.is_active_electric());
        z.electric_depleted = true;
        assert!(!z.is_active_electric());
    }
}
