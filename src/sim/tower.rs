//! Tower kinds and their behavior table
//!
//! Each kind fixes its base stats, targeting policy, projectile emission and
//! upgrade increments. Towers only differ by data; the combat resolver in
//! `combat.rs` drives all of them the same way.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::enemy::Enemy;
use super::projectile::ProjectileKind;
use crate::tuning::Tuning;
use crate::within;

/// Upgrade increments shrink by this factor per level already gained
pub const UPGRADE_DECAY: f32 = 0.85;

/// Tower types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TowerKind {
    #[default]
    Basic,
    Splash,
    Sniper,
    Slow,
}

/// Rule a tower uses to pick among enemies in range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetingPolicy {
    Nearest,
    HighestHp,
}

/// Damage, range and fire-rate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TowerStats {
    pub damage: f32,
    pub range: f32,
    pub fire_rate: f32,
}

impl TowerKind {
    pub const ALL: [TowerKind; 4] = [
        TowerKind::Basic,
        TowerKind::Splash,
        TowerKind::Sniper,
        TowerKind::Slow,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TowerKind::Basic => "Ballista",
            TowerKind::Splash => "Mortar",
            TowerKind::Sniper => "Sniper",
            TowerKind::Slow => "Frost",
        }
    }

    pub fn base_stats(self) -> TowerStats {
        let (range, damage, fire_rate) = match self {
            TowerKind::Basic => (200.0, 6.0, 1.2),
            TowerKind::Splash => (260.0, 12.0, 0.45),
            TowerKind::Sniper => (600.0, 25.0, 0.25),
            TowerKind::Slow => (180.0, 2.0, 1.0),
        };
        TowerStats {
            damage,
            range,
            fire_rate,
        }
    }

    /// First-level upgrade increments; later levels decay geometrically
    pub fn upgrade_increments(self) -> TowerStats {
        let (damage, range, fire_rate) = match self {
            TowerKind::Basic => (3.0, 20.0, 0.12),
            TowerKind::Splash => (7.0, 15.0, 0.05),
            TowerKind::Sniper => (10.0, 40.0, 0.03),
            TowerKind::Slow => (1.0, 20.0, 0.1),
        };
        TowerStats {
            damage,
            range,
            fire_rate,
        }
    }

    pub fn targeting(self) -> TargetingPolicy {
        match self {
            TowerKind::Sniper => TargetingPolicy::HighestHp,
            TowerKind::Basic | TowerKind::Splash | TowerKind::Slow => TargetingPolicy::Nearest,
        }
    }

    pub fn projectile_speed(self) -> f32 {
        match self {
            TowerKind::Basic => 500.0,
            TowerKind::Splash => 320.0,
            TowerKind::Sniper => 900.0,
            TowerKind::Slow => 360.0,
        }
    }

    pub fn projectile_kind(self) -> ProjectileKind {
        match self {
            TowerKind::Basic | TowerKind::Sniper => ProjectileKind::Direct,
            TowerKind::Splash => ProjectileKind::Splash { radius: 70.0 },
            TowerKind::Slow => ProjectileKind::Slow {
                multiplier: 0.5,
                duration_ms: 1500,
            },
        }
    }
}

/// A placed tower
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tower {
    pub id: u32,
    pub kind: TowerKind,
    pub pos: Vec2,
    pub range: f32,
    pub damage: f32,
    /// Shots per second
    pub fire_rate: f32,
    /// Seconds until the next shot (never negative)
    pub cooldown: f32,
    pub level: u32,
}

impl Tower {
    pub fn new(id: u32, kind: TowerKind, pos: Vec2) -> Self {
        let stats = kind.base_stats();
        Self {
            id,
            kind,
            pos,
            range: stats.range,
            damage: stats.damage,
            fire_rate: stats.fire_rate,
            cooldown: 0.0,
            level: 1,
        }
    }

    pub fn stats(&self) -> TowerStats {
        TowerStats {
            damage: self.damage,
            range: self.range,
            fire_rate: self.fire_rate,
        }
    }

    pub fn update_cooldown(&mut self, delta_ms: f32) {
        self.cooldown = (self.cooldown - delta_ms / 1000.0).max(0.0);
    }

    pub fn ready(&self) -> bool {
        self.cooldown <= 0.0
    }

    /// Start the cooldown after a shot
    pub fn reset_cooldown(&mut self) {
        self.cooldown = if self.fire_rate > 0.0 {
            1.0 / self.fire_rate
        } else {
            f32::MAX
        };
    }

    pub fn in_range(&self, enemy: &Enemy) -> bool {
        within(self.pos, enemy.pos, self.range)
    }

    /// Pick a target among `enemies` per this kind's policy
    ///
    /// Ties resolve to the earliest enemy in iteration order.
    pub fn select_target(&self, enemies: &[Enemy]) -> Option<usize> {
        let candidates = enemies
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_targetable() && self.in_range(e));

        let mut best: Option<(usize, f32)> = None;
        for (index, enemy) in candidates {
            let score = match self.kind.targeting() {
                TargetingPolicy::Nearest => -self.pos.distance_squared(enemy.pos),
                TargetingPolicy::HighestHp => enemy.hp,
            };
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((index, score));
            }
        }
        best.map(|(index, _)| index)
    }

    /// Stats this tower would have after one more upgrade
    pub fn upgraded_stats(&self) -> TowerStats {
        let inc = self.kind.upgrade_increments();
        let decay = UPGRADE_DECAY.powi(self.level.saturating_sub(1) as i32);
        TowerStats {
            damage: self.damage + inc.damage * decay,
            range: self.range + inc.range * decay,
            fire_rate: self.fire_rate + inc.fire_rate * decay,
        }
    }

    pub fn upgrade(&mut self) {
        let next = self.upgraded_stats();
        self.damage = next.damage;
        self.range = next.range;
        self.fire_rate = next.fire_rate;
        self.level += 1;
    }

    /// Gold needed for the next upgrade; grows with tower and player level
    pub fn upgrade_cost(&self, player_level: u32, tuning: &Tuning) -> u32 {
        let tower_factor = tuning
            .upgrade_cost_growth
            .powi(self.level.saturating_sub(1) as i32);
        let player_factor = tuning
            .upgrade_player_level_growth
            .powi(player_level.saturating_sub(1) as i32);
        (tuning.upgrade_base_cost * tower_factor * player_factor).round() as u32
    }
}
