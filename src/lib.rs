//! Goblin Siege - wave-based tower defense simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, combat, waves, rewards, game state)
//! - `tuning`: Data-driven game balance

pub mod sim;
pub mod tuning;

pub use sim::{Command, CommandError, GameState, Mode, Snapshot, tick};
pub use tuning::{Tuning, TuningError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep in milliseconds (60 Hz)
    pub const SIM_DT_MS: f32 = 1000.0 / 60.0;

    /// Distance at which an enemy counts as having reached a waypoint
    pub const WAYPOINT_EPSILON: f32 = 2.0;
    /// Distance at which a projectile counts as having reached its target point
    pub const PROJECTILE_ARRIVE_EPSILON: f32 = 6.0;
    /// Radius around a projectile that registers an enemy hit
    pub const PROJECTILE_HIT_RADIUS: f32 = 16.0;
    /// A slot is occupied if a tower stands closer than this
    pub const SLOT_OCCUPIED_DISTANCE: f32 = 10.0;

    /// Spawn points sit this far before the first waypoint
    pub const SPAWN_OFFSET: f32 = 40.0;
    /// Maximum random jitter applied to spawn points on each axis
    pub const SPAWN_JITTER: f32 = 20.0;
}

/// Move `from` toward `to` by at most `max_step`.
///
/// Returns the new position and whether the destination was reached
/// (within `epsilon`, or because the step would overshoot it).
#[inline]
pub fn step_toward(from: Vec2, to: Vec2, max_step: f32, epsilon: f32) -> (Vec2, bool) {
    let delta = to - from;
    let dist = delta.length();
    if dist <= epsilon || dist <= max_step {
        return (to, true);
    }
    (from + delta / dist * max_step, false)
}

/// True if `a` and `b` are within `radius` of each other (inclusive)
#[inline]
pub fn within(a: Vec2, b: Vec2, radius: f32) -> bool {
    a.distance_squared(b) <= radius * radius
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_toward_partial() {
        let (pos, arrived) = step_toward(Vec2::ZERO, Vec2::new(100.0, 0.0), 10.0, 1.0);
        assert!(!arrived);
        assert!((pos.x - 10.0).abs() < 0.001);
        assert!(pos.y.abs() < 0.001);
    }

    #[test]
    fn test_step_toward_overshoot_snaps() {
        let (pos, arrived) = step_toward(Vec2::ZERO, Vec2::new(5.0, 0.0), 10.0, 1.0);
        assert!(arrived);
        assert_eq!(pos, Vec2::new(5.0, 0.0));
    }

    #[test]
    fn test_within_is_inclusive() {
        assert!(within(Vec2::ZERO, Vec2::new(3.0, 4.0), 5.0));
        assert!(!within(Vec2::ZERO, Vec2::new(3.0, 4.01), 5.0));
    }
}
