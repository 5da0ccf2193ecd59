//! Enemy kinds, stats and the per-tick movement/status state machine
//!
//! Lifecycle: `PreSpawn` (waiting out its burst stagger) -> `Traveling`
//! (walking waypoint to waypoint, possibly slowed) <-> `Stunned` ->
//! `ReachedBase` (terminal; the orchestrator removes it and charges the base).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::path::Path;
use crate::consts::WAYPOINT_EPSILON;
use crate::step_toward;

/// Enemy types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EnemyKind {
    #[default]
    Basic,
    Fast,
    Tank,
}

impl EnemyKind {
    /// Movement speed before wave scaling (px/s)
    pub fn base_speed(self) -> f32 {
        match self {
            EnemyKind::Basic => 60.0,
            EnemyKind::Fast => 90.0,
            EnemyKind::Tank => 35.0,
        }
    }

    /// Hit points before wave scaling
    pub fn base_hp(self) -> f32 {
        match self {
            EnemyKind::Basic => 10.0,
            EnemyKind::Fast => 6.0,
            EnemyKind::Tank => 30.0,
        }
    }

    pub fn xp_reward(self) -> u32 {
        match self {
            EnemyKind::Basic => 1,
            EnemyKind::Fast => 2,
            EnemyKind::Tank => 5,
        }
    }

    /// Base health lost when this enemy gets through
    pub fn base_damage(self) -> i32 {
        match self {
            EnemyKind::Basic | EnemyKind::Fast => 1,
            EnemyKind::Tank => 2,
        }
    }
}

/// Observable movement state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyState {
    PreSpawn,
    Traveling,
    Stunned,
    ReachedBase,
}

/// An enemy entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    /// Goes negative when overkilled; removed by the orchestrator at `hp <= 0`
    pub hp: f32,
    pub max_hp: f32,
    pub speed: f32,
    /// Index of the waypoint currently being walked toward (never decreases)
    pub path_index: usize,
    pub xp_reward: u32,
    pub reached_base: bool,
    pub slow_multiplier: f32,
    pub slow_until_ms: u64,
    pub stun_until_ms: u64,
    pub spawn_delay_ms: f32,
    pub spawn_timer_ms: f32,
    spawned: bool,
}

impl Enemy {
    /// Create an enemy with wave scaling applied to its base stats
    pub fn new(id: u32, kind: EnemyKind, pos: Vec2, hp_mult: f32, speed_mult: f32) -> Self {
        let hp = kind.base_hp() * hp_mult;
        Self {
            id,
            kind,
            pos,
            hp,
            max_hp: hp,
            speed: kind.base_speed() * speed_mult,
            path_index: 0,
            xp_reward: kind.xp_reward(),
            reached_base: false,
            slow_multiplier: 1.0,
            slow_until_ms: 0,
            stun_until_ms: 0,
            spawn_delay_ms: 0.0,
            spawn_timer_ms: 0.0,
            spawned: true,
        }
    }

    /// Hold the enemy in pre-spawn until `delay_ms` of ticks have elapsed
    pub fn with_spawn_delay(mut self, delay_ms: f32) -> Self {
        self.spawn_delay_ms = delay_ms.max(0.0);
        self.spawn_timer_ms = 0.0;
        self.spawned = self.spawn_delay_ms <= 0.0;
        self
    }

    pub fn is_spawned(&self) -> bool {
        self.spawned
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0.0
    }

    /// Can be targeted by towers and struck by single-target projectiles
    pub fn is_targetable(&self) -> bool {
        self.spawned && !self.reached_base && !self.is_dead()
    }

    pub fn state(&self, now_ms: u64) -> EnemyState {
        if self.reached_base {
            EnemyState::ReachedBase
        } else if !self.spawned {
            EnemyState::PreSpawn
        } else if now_ms < self.stun_until_ms {
            EnemyState::Stunned
        } else {
            EnemyState::Traveling
        }
    }

    /// Overwrites any current slow
    pub fn apply_slow(&mut self, multiplier: f32, duration_ms: u64, now_ms: u64) {
        self.slow_multiplier = multiplier.clamp(0.0, 1.0);
        self.slow_until_ms = now_ms.saturating_add(duration_ms);
    }

    /// Overwrites any current stun
    pub fn apply_stun(&mut self, duration_ms: u64, now_ms: u64) {
        self.stun_until_ms = now_ms.saturating_add(duration_ms);
    }

    pub fn take_damage(&mut self, amount: f32) {
        self.hp -= amount;
    }

    /// Advance one tick along `path`
    pub fn update(&mut self, delta_ms: f32, now_ms: u64, path: &Path) {
        if !self.spawned {
            self.spawn_timer_ms += delta_ms;
            if self.spawn_timer_ms < self.spawn_delay_ms {
                return;
            }
            self.spawned = true;
        }

        if self.reached_base {
            return;
        }

        if now_ms > self.slow_until_ms {
            self.slow_multiplier = 1.0;
        }

        if now_ms < self.stun_until_ms {
            return;
        }

        let Some(target) = path.get(self.path_index) else {
            self.reached_base = true;
            return;
        };

        let step = self.speed * self.slow_multiplier * delta_ms / 1000.0;
        let (pos, arrived) = step_toward(self.pos, target, step, WAYPOINT_EPSILON);
        self.pos = pos;
        if arrived {
            self.path_index += 1;
            if self.path_index >= path.len() {
                self.reached_base = true;
            }
        }
    }
}
