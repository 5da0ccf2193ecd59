//! Timer-driven enemy spawning with an escalating difficulty curve

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::enemy::{Enemy, EnemyKind};
use super::path::Path;
use super::state::EntityIds;
use crate::consts::{SPAWN_JITTER, SPAWN_OFFSET};
use crate::tuning::Tuning;

/// Wave clock and spawn cadence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveScheduler {
    /// Current wave number (1-based)
    pub wave: u32,
    /// Time left in the current wave
    pub timer_ms: f32,
    /// Time until the next spawn burst
    pub next_spawn_ms: f32,
    pub wave_duration_ms: f32,
    pub spawn_interval_ms: f32,
    pub spawn_multiplier: f32,
}

impl WaveScheduler {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            wave: 1,
            timer_ms: 0.0,
            next_spawn_ms: 0.0,
            wave_duration_ms: tuning.wave_duration_ms,
            spawn_interval_ms: tuning.spawn_interval_ms,
            spawn_multiplier: 1.0,
        }
    }

    /// Arm the clock for the current wave; the first burst comes immediately
    pub fn start(&mut self) {
        self.timer_ms = self.wave_duration_ms;
        self.next_spawn_ms = 0.0;
    }

    pub fn time_to_next_wave_secs(&self) -> f32 {
        (self.timer_ms / 1000.0).max(0.0)
    }

    /// Enemies per burst for the current wave (at least one, capped)
    pub fn enemies_per_spawn(&self, tuning: &Tuning) -> u32 {
        let base = 1 + self.wave / 4;
        let scaled = (base as f32 * self.spawn_multiplier).floor() as u32;
        scaled.clamp(1, tuning.max_enemies_per_spawn)
    }

    /// Advance the wave clock by `delta_ms` and return any enemies spawned.
    ///
    /// `alive` is the number of enemies already on the field. Only called
    /// while the run is active.
    pub fn update(
        &mut self,
        delta_ms: f32,
        alive: usize,
        rng: &mut Pcg32,
        ids: &mut EntityIds,
        path: &Path,
        tuning: &Tuning,
    ) -> Vec<Enemy> {
        self.timer_ms -= delta_ms;
        self.next_spawn_ms -= delta_ms;

        let mut spawned = Vec::new();
        if self.next_spawn_ms <= 0.0 {
            spawned = self.spawn_burst(rng, ids, path, tuning);
            self.next_spawn_ms = self.spawn_interval_ms;
        }

        if self.timer_ms <= 0.0 {
            self.advance_wave(tuning);
        }

        // Cleared early: cut the wait down to the rest window
        if alive + spawned.len() == 0 && self.timer_ms > tuning.rest_time_ms {
            self.timer_ms = tuning.rest_time_ms;
        }

        spawned
    }

    fn advance_wave(&mut self, tuning: &Tuning) {
        self.wave += 1;
        self.wave_duration_ms = tuning.wave_duration_for(self.wave);
        self.spawn_interval_ms = tuning.spawn_interval_for(self.wave);
        self.spawn_multiplier = tuning.spawn_multiplier_for(self.wave);
        self.timer_ms = self.wave_duration_ms;
        self.next_spawn_ms = 0.0;
        log::info!(
            "Wave {} begins: duration={}ms interval={}ms multiplier={:.2}",
            self.wave,
            self.wave_duration_ms,
            self.spawn_interval_ms,
            self.spawn_multiplier
        );
    }

    fn spawn_burst(
        &self,
        rng: &mut Pcg32,
        ids: &mut EntityIds,
        path: &Path,
        tuning: &Tuning,
    ) -> Vec<Enemy> {
        let count = self.enemies_per_spawn(tuning);
        let hp_mult = tuning.enemy_hp_growth.powi(self.wave as i32);
        let speed_mult = tuning.enemy_speed_growth.powi(self.wave as i32);
        let entry = path.start() - path.entry_direction() * SPAWN_OFFSET;

        let enemies: Vec<Enemy> = (0..count)
            .map(|i| {
                let kind = choose_enemy_kind(self.wave, i, rng);
                let jitter = Vec2::new(
                    rng.random_range(-SPAWN_JITTER..=SPAWN_JITTER),
                    rng.random_range(-SPAWN_JITTER..=SPAWN_JITTER),
                );
                Enemy::new(ids.next(), kind, entry + jitter, hp_mult, speed_mult)
                    .with_spawn_delay(i as f32 * tuning.spawn_stagger_ms)
            })
            .collect();

        log::debug!("Wave {}: spawned burst of {}", self.wave, enemies.len());
        enemies
    }
}

/// Pick an enemy type for the `index`-th enemy of a burst in `wave`.
///
/// Waves 1-2 are all Basic; later waves roll for Fast and then Tank with
/// growing odds. Every fifth wave leads each burst with a Tank.
pub fn choose_enemy_kind(wave: u32, index: u32, rng: &mut Pcg32) -> EnemyKind {
    if wave >= 5 && wave % 5 == 0 && index == 0 {
        return EnemyKind::Tank;
    }
    if wave < 3 {
        return EnemyKind::Basic;
    }

    let roll = rng.random::<f32>().clamp(0.0, 1.0);
    if wave < 6 {
        return if roll < 0.15 {
            EnemyKind::Fast
        } else {
            EnemyKind::Basic
        };
    }

    let late = (wave - 6) as f32;
    let tank_chance = (0.1 + late * 0.01).min(0.25);
    let fast_chance = (0.2 + late * 0.01).min(0.35);
    if roll < tank_chance {
        EnemyKind::Tank
    } else if roll < tank_chance + fast_chance {
        EnemyKind::Fast
    } else {
        EnemyKind::Basic
    }
}
