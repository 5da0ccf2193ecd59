//! Projectiles in flight
//!
//! A projectile flies at a point captured when it was fired, not at a live
//! enemy. If the enemy dies first the shot still lands at the old position.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::PROJECTILE_ARRIVE_EPSILON;
use crate::step_toward;

/// What happens on impact
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Damages the first enemy it touches
    Direct,
    /// Damages every enemy within `radius` of the impact point
    Splash { radius: f32 },
    /// Damages and slows the enemy it touches
    Slow { multiplier: f32, duration_ms: u64 },
}

impl ProjectileKind {
    /// Slow multiplier and duration applied on impact, if any
    pub fn slow(self) -> Option<(f32, u64)> {
        match self {
            ProjectileKind::Slow {
                multiplier,
                duration_ms,
            } => Some((multiplier, duration_ms)),
            _ => None,
        }
    }
}

/// A projectile entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    pub target: Vec2,
    /// px/s
    pub speed: f32,
    pub damage: f32,
    pub kind: ProjectileKind,
    pub alive: bool,
}

impl Projectile {
    pub fn new(
        id: u32,
        origin: Vec2,
        target: Vec2,
        speed: f32,
        damage: f32,
        kind: ProjectileKind,
    ) -> Self {
        Self {
            id,
            pos: origin,
            target,
            speed,
            damage,
            kind,
            alive: true,
        }
    }

    /// Fly toward the target point; returns true once it has arrived
    pub fn advance(&mut self, delta_ms: f32) -> bool {
        let step = self.speed * delta_ms / 1000.0;
        let (pos, arrived) = step_toward(self.pos, self.target, step, PROJECTILE_ARRIVE_EPSILON);
        self.pos = pos;
        arrived
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_reaches_target() {
        let target = Vec2::new(100.0, 0.0);
        let mut p = Projectile::new(1, Vec2::ZERO, target, 500.0, 5.0, ProjectileKind::Direct);
        assert!(!p.advance(100.0));
        assert!((p.pos.x - 50.0).abs() < 0.001);
        assert!(p.advance(100.0));
        assert_eq!(p.pos, Vec2::new(100.0, 0.0));
    }

    #[test]
    fn test_arrives_within_epsilon() {
        let (origin, target) = (Vec2::new(95.0, 0.0), Vec2::new(100.0, 0.0));
        let mut p = Projectile::new(1, origin, target, 1.0, 5.0, ProjectileKind::Direct);
        assert!(p.advance(1.0));
    }

    #[test]
    fn test_only_frost_shots_slow() {
        let frost = ProjectileKind::Slow {
            multiplier: 0.6,
            duration_ms: 1500,
        };
        assert_eq!(frost.slow(), Some((0.6, 1500)));
        assert_eq!(ProjectileKind::Direct.slow(), None);
        assert_eq!(ProjectileKind::Splash { radius: 70.0 }.slow(), None);
    }
}
