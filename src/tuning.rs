//! Data-driven game balance
//!
//! Every economy, wave and progression number lives here so a run can be
//! rebalanced from JSON without touching the simulation. Per-kind entity
//! stats are tables on the kind enums in `sim`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("Tuning parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid tuning value for `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Balance parameters for a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Economy ===
    pub starting_gold: u32,
    pub base_health: i32,
    /// Towers the player must place before the first wave moves
    pub starting_towers: u32,
    pub kill_gold: u32,
    pub kill_score: u64,

    // === Waves ===
    pub wave_duration_ms: f32,
    pub wave_duration_per_wave_ms: f32,
    pub max_wave_duration_ms: f32,
    /// Once a wave is cleared, the timer is clamped down to this
    pub rest_time_ms: f32,
    pub spawn_interval_ms: f32,
    pub spawn_interval_per_wave_ms: f32,
    pub min_spawn_interval_ms: f32,
    /// Base of the geometric spawn multiplier (`growth^wave`)
    pub spawn_multiplier_growth: f32,
    pub max_enemies_per_spawn: u32,
    /// Delay between enemies of the same burst
    pub spawn_stagger_ms: f32,
    pub enemy_hp_growth: f32,
    pub enemy_speed_growth: f32,

    // === Progression ===
    pub first_level_xp: u32,
    pub xp_growth: f32,
    pub min_level_xp: u32,

    // === Upgrades / combat ===
    pub upgrade_base_cost: f32,
    pub upgrade_cost_growth: f32,
    pub upgrade_player_level_growth: f32,
    pub crit_multiplier: f32,
    pub max_crit_chance: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            starting_gold: 100,
            base_health: 20,
            starting_towers: 1,
            kill_gold: 5,
            kill_score: 10,

            wave_duration_ms: 10_000.0,
            wave_duration_per_wave_ms: 500.0,
            max_wave_duration_ms: 20_000.0,
            rest_time_ms: 3_000.0,
            spawn_interval_ms: 2_000.0,
            spawn_interval_per_wave_ms: 50.0,
            min_spawn_interval_ms: 600.0,
            spawn_multiplier_growth: 1.08,
            max_enemies_per_spawn: 6,
            spawn_stagger_ms: 300.0,
            enemy_hp_growth: 1.05,
            enemy_speed_growth: 1.01,

            first_level_xp: 10,
            xp_growth: 1.15,
            min_level_xp: 10,

            upgrade_base_cost: 50.0,
            upgrade_cost_growth: 1.5,
            upgrade_player_level_growth: 1.1,
            crit_multiplier: 2.0,
            max_crit_chance: 0.5,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) tuning document; missing fields keep defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        log::info!("Loaded tuning overrides");
        Ok(tuning)
    }

    /// Reject values that would stall or invert the simulation
    pub fn validate(&self) -> Result<(), TuningError> {
        fn invalid(field: &'static str, reason: &'static str) -> Result<(), TuningError> {
            Err(TuningError::Invalid { field, reason })
        }

        if self.base_health <= 0 {
            return invalid("base_health", "must be positive");
        }
        if self.wave_duration_ms <= 0.0 {
            return invalid("wave_duration_ms", "must be positive");
        }
        if self.max_wave_duration_ms < self.wave_duration_ms {
            return invalid("max_wave_duration_ms", "must be at least wave_duration_ms");
        }
        if self.rest_time_ms < 0.0 {
            return invalid("rest_time_ms", "must not be negative");
        }
        if self.min_spawn_interval_ms <= 0.0 {
            return invalid("min_spawn_interval_ms", "must be positive");
        }
        if self.spawn_interval_ms < self.min_spawn_interval_ms {
            return invalid(
                "spawn_interval_ms",
                "must be at least min_spawn_interval_ms",
            );
        }
        if self.spawn_multiplier_growth < 1.0 {
            return invalid("spawn_multiplier_growth", "must be >= 1");
        }
        if self.max_enemies_per_spawn == 0 {
            return invalid("max_enemies_per_spawn", "must be positive");
        }
        if self.first_level_xp == 0 || self.min_level_xp == 0 {
            return invalid("first_level_xp", "level thresholds must be positive");
        }
        if self.xp_growth < 1.0 {
            return invalid("xp_growth", "must be >= 1");
        }
        if self.upgrade_cost_growth < 1.0 || self.upgrade_player_level_growth < 1.0 {
            return invalid("upgrade_cost_growth", "cost growth must be >= 1");
        }
        if !(0.0..=1.0).contains(&self.max_crit_chance) {
            return invalid("max_crit_chance", "must be within 0..=1");
        }
        Ok(())
    }

    /// Wave duration for the given wave number (clamped)
    pub fn wave_duration_for(&self, wave: u32) -> f32 {
        (self.wave_duration_ms + wave as f32 * self.wave_duration_per_wave_ms)
            .min(self.max_wave_duration_ms)
    }

    /// Spawn interval for the given wave number (clamped)
    pub fn spawn_interval_for(&self, wave: u32) -> f32 {
        (self.spawn_interval_ms - wave as f32 * self.spawn_interval_per_wave_ms)
            .max(self.min_spawn_interval_ms)
    }

    /// Spawn multiplier for the given wave number
    pub fn spawn_multiplier_for(&self, wave: u32) -> f32 {
        self.spawn_multiplier_growth.powi(wave as i32)
    }

    /// Next XP threshold after one level-up (never shrinks, never below the
    /// floor, never zero)
    pub fn next_level_xp(&self, current: u32) -> u32 {
        let grown = (current as f32).powf(self.xp_growth.max(1.0)).floor() as u32;
        grown.max(current).max(self.min_level_xp).max(1)
    }
}
