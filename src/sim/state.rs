//! Game state and core simulation types
//!
//! `GameState` exclusively owns every entity collection and economy counter.
//! Other modules only mutate it through the tick and the command surface.

use std::collections::VecDeque;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::cards::{self, Card};
use super::enemy::Enemy;
use super::path::{self, Path};
use super::projectile::Projectile;
use super::tower::{Tower, TowerKind, TowerStats};
use super::wave::WaveScheduler;
use crate::consts::SLOT_OCCUPIED_DISTANCE;
use crate::tuning::Tuning;
use crate::within;

/// Monotonic entity ID source shared by towers, enemies and projectiles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityIds {
    next: u32,
}

impl Default for EntityIds {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl EntityIds {
    pub fn next(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// Current interaction mode. Exactly one holds at a time, so at most one
/// modal is ever open and the world only advances in `Running`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Mode {
    /// Not started yet, or paused
    Idle,
    Running,
    /// Choosing one of the offered cards for a level-up
    CardPrompt {
        choices: Vec<Card>,
    },
    /// Waiting for the player to place an owed tower
    TowerPlacement,
    /// Reviewing an upgrade for `tower_id`; `resume` restores `Running` on close
    UpgradePrompt {
        tower_id: u32,
        resume: bool,
    },
    /// Base destroyed; only `reset` leaves this
    GameOver,
}

/// Fieldless view of `Mode` for snapshots and error reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModeKind {
    Idle,
    Running,
    CardPrompt,
    TowerPlacement,
    UpgradePrompt,
    GameOver,
}

impl Mode {
    pub fn kind(&self) -> ModeKind {
        match self {
            Mode::Idle => ModeKind::Idle,
            Mode::Running => ModeKind::Running,
            Mode::CardPrompt { .. } => ModeKind::CardPrompt,
            Mode::TowerPlacement => ModeKind::TowerPlacement,
            Mode::UpgradePrompt { .. } => ModeKind::UpgradePrompt,
            Mode::GameOver => ModeKind::GameOver,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Mode::Running)
    }

    pub fn is_modal(&self) -> bool {
        matches!(
            self,
            Mode::CardPrompt { .. } | Mode::TowerPlacement | Mode::UpgradePrompt { .. }
        )
    }
}

/// Permanent global modifiers granted by cards.
///
/// Applied at two points only: to every placed tower when granted, and to
/// each new tower when it is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Buffs {
    pub damage_bonus: f32,
    pub range_bonus: f32,
    pub fire_rate_mult: f32,
    pub gold_mult: f32,
    pub xp_mult: f32,
    pub crit_chance: f32,
}

impl Default for Buffs {
    fn default() -> Self {
        Self {
            damage_bonus: 0.0,
            range_bonus: 0.0,
            fire_rate_mult: 1.0,
            gold_mult: 1.0,
            xp_mult: 1.0,
            crit_chance: 0.0,
        }
    }
}

impl Buffs {
    pub fn apply_to(&self, tower: &mut Tower) {
        tower.damage += self.damage_bonus;
        tower.range += self.range_bonus;
        tower.fire_rate *= self.fire_rate_mult;
    }
}

/// A timed slow that also hits enemies spawned while it lasts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlobalSlow {
    pub multiplier: f32,
    pub until_ms: u64,
}

impl GlobalSlow {
    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        self.until_ms.saturating_sub(now_ms)
    }
}

/// One unresolved level-up reward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingLevelUp {
    pub level: u32,
}

/// Upgrade dialog contents
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpgradePreview {
    pub tower_id: u32,
    pub kind: TowerKind,
    pub level: u32,
    pub current: TowerStats,
    pub next: TowerStats,
    pub cost: u32,
    pub affordable: bool,
}

/// Complete game state (deterministic for a given seed and command stream)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    pub rng: Pcg32,
    /// Timestamp of the latest tick, used for status-effect expiry
    pub now_ms: u64,
    /// Ticks actually simulated (paused ticks do not count)
    pub time_ticks: u64,
    pub mode: Mode,

    // === Economy / progression ===
    pub gold: u32,
    pub base_health: i32,
    pub max_base_health: i32,
    pub score: u64,
    pub kills: u32,
    pub experience: u32,
    pub level: u32,
    pub next_level_xp: u32,
    pub pending_level_ups: VecDeque<PendingLevelUp>,
    pub buffs: Buffs,
    pub global_slow: Option<GlobalSlow>,
    pub unlocked: Vec<TowerKind>,
    /// Towers owed to the player (starting towers and add-tower rewards)
    pub available_towers: u32,
    /// How many of `available_towers` are still the run's starting towers
    pub starting_towers_left: u32,

    // === World ===
    pub path: Path,
    pub slots: Vec<Vec2>,
    pub towers: Vec<Tower>,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub waves: WaveScheduler,
    pub ids: EntityIds,
    pub(crate) run_started: bool,
}

impl GameState {
    /// Create a new game state with the given seed and default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            now_ms: 0,
            time_ticks: 0,
            mode: Mode::Idle,
            gold: tuning.starting_gold,
            base_health: tuning.base_health,
            max_base_health: tuning.base_health,
            score: 0,
            kills: 0,
            experience: 0,
            level: 1,
            next_level_xp: tuning.first_level_xp.max(1),
            pending_level_ups: VecDeque::new(),
            buffs: Buffs::default(),
            global_slow: None,
            unlocked: vec![TowerKind::Basic],
            available_towers: tuning.starting_towers,
            starting_towers_left: tuning.starting_towers,
            path: Path::classic(),
            slots: path::classic_slots(),
            towers: Vec::new(),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            waves: WaveScheduler::new(&tuning),
            ids: EntityIds::default(),
            run_started: false,
            tuning,
        }
    }

    // === Slots ===

    /// Free iff no tower stands within the occupancy distance of the slot.
    /// Out-of-range indices are never free.
    pub fn is_slot_free(&self, slot: usize) -> bool {
        self.slots.get(slot).is_some_and(|&pos| {
            !self
                .towers
                .iter()
                .any(|t| within(t.pos, pos, SLOT_OCCUPIED_DISTANCE))
        })
    }

    pub fn free_slot_count(&self) -> usize {
        (0..self.slots.len()).filter(|&i| self.is_slot_free(i)).count()
    }

    pub fn first_free_slot(&self) -> Option<usize> {
        (0..self.slots.len()).find(|&i| self.is_slot_free(i))
    }

    pub fn is_unlocked(&self, kind: TowerKind) -> bool {
        self.unlocked.contains(&kind)
    }

    /// Build a tower with the global buffs folded into its base stats
    pub fn build_tower(&mut self, kind: TowerKind, pos: Vec2) -> Tower {
        let mut tower = Tower::new(self.ids.next(), kind, pos);
        self.buffs.apply_to(&mut tower);
        tower
    }

    pub fn tower(&self, tower_id: u32) -> Option<&Tower> {
        self.towers.iter().find(|t| t.id == tower_id)
    }

    pub fn upgrade_preview(&self, tower_id: u32) -> Option<UpgradePreview> {
        let tower = self.tower(tower_id)?;
        let cost = tower.upgrade_cost(self.level, &self.tuning);
        Some(UpgradePreview {
            tower_id,
            kind: tower.kind,
            level: tower.level,
            current: tower.stats(),
            next: tower.upgraded_stats(),
            cost,
            affordable: self.gold >= cost,
        })
    }

    // === Progression ===

    /// Add experience, queueing one pending level-up per threshold crossed.
    ///
    /// Returns the number of level-ups gained.
    pub fn grant_xp(&mut self, amount: u32) -> u32 {
        self.experience = self.experience.saturating_add(amount);
        let mut gained = 0;
        while self.experience >= self.next_level_xp {
            self.experience -= self.next_level_xp;
            self.level += 1;
            self.next_level_xp = self.tuning.next_level_xp(self.next_level_xp);
            self.pending_level_ups.push_back(PendingLevelUp { level: self.level });
            gained += 1;
            log::info!(
                "Level up! level={} next_level_xp={}",
                self.level,
                self.next_level_xp
            );
        }
        gained
    }

    /// Pay out gold, score and XP for a kill
    pub fn reward_kill(&mut self, enemy: &Enemy) {
        let gold = (self.tuning.kill_gold as f32 * self.buffs.gold_mult).round() as u32;
        let xp = (enemy.xp_reward as f32 * self.buffs.xp_mult).round() as u32;
        self.gold = self.gold.saturating_add(gold);
        self.score += self.tuning.kill_score;
        self.kills += 1;
        self.grant_xp(xp);
    }

    /// Mode to enter when a modal closes or the run (re)starts: owed
    /// placements first, then queued level-ups, otherwise `Running`.
    pub(crate) fn resume(&mut self) {
        if self.available_towers > 0 && self.free_slot_count() > 0 {
            self.mode = Mode::TowerPlacement;
        } else if !self.open_next_level_up() {
            self.mode = Mode::Running;
        }
    }

    /// Drain one pending level-up into a card prompt; false if none queued
    pub(crate) fn open_next_level_up(&mut self) -> bool {
        let Some(pending) = self.pending_level_ups.pop_front() else {
            return false;
        };
        let choices = cards::generate_three(self);
        log::info!(
            "Level {} reward: offering {:?}",
            pending.level,
            choices.iter().map(|c| c.id).collect::<Vec<_>>()
        );
        self.mode = Mode::CardPrompt { choices };
        true
    }

    pub fn is_game_over(&self) -> bool {
        self.mode == Mode::GameOver
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_state() {
        let state = GameState::new(12345);
        assert_eq!(state.mode, Mode::Idle);
        assert_eq!(state.gold, 100);
        assert_eq!(state.base_health, 20);
        assert_eq!(state.available_towers, 1);
        assert_eq!(state.level, 1);
        assert_eq!(state.free_slot_count(), 5);
        assert!(state.is_unlocked(TowerKind::Basic));
        assert!(!state.is_unlocked(TowerKind::Sniper));
    }

    #[test]
    fn test_slot_occupancy_uses_distance() {
        let mut state = GameState::new(1);
        let pos = state.slots[2] + Vec2::new(5.0, 0.0);
        let tower = state.build_tower(TowerKind::Basic, pos);
        state.towers.push(tower);
        assert!(!state.is_slot_free(2));
        assert!(state.is_slot_free(1));
        assert!(!state.is_slot_free(99));
        assert_eq!(state.first_free_slot(), Some(0));
    }

    #[test]
    fn test_build_tower_applies_buffs() {
        let mut state = GameState::new(1);
        state.buffs.damage_bonus = 2.0;
        state.buffs.range_bonus = 50.0;
        state.buffs.fire_rate_mult = 1.5;
        let tower = state.build_tower(TowerKind::Basic, Vec2::ZERO);
        assert_eq!(tower.damage, 8.0);
        assert_eq!(tower.range, 250.0);
        assert!((tower.fire_rate - 1.8).abs() < 0.0001);
    }

    #[test]
    fn test_grant_xp_queues_each_threshold() {
        let mut state = GameState::new(1);
        // 10 for level 2, then 14 for level 3
        let gained = state.grant_xp(25);
        assert_eq!(gained, 2);
        assert_eq!(state.level, 3);
        assert_eq!(state.experience, 1);
        assert_eq!(state.pending_level_ups.len(), 2);
        assert_eq!(state.pending_level_ups[0].level, 2);
        assert_eq!(state.pending_level_ups[1].level, 3);
        assert!(state.next_level_xp >= 14);
    }

    #[test]
    fn test_grant_xp_with_zero_thresholds_terminates() {
        let tuning = Tuning {
            first_level_xp: 0,
            min_level_xp: 0,
            ..Tuning::default()
        };
        let mut state = GameState::with_tuning(1, tuning);
        assert_eq!(state.next_level_xp, 1);

        assert_eq!(state.grant_xp(0), 0);
        assert_eq!(state.grant_xp(3), 3);
        assert_eq!(state.level, 4);
        assert_eq!(state.experience, 0);
        assert_eq!(state.pending_level_ups.len(), 3);
        assert!(state.next_level_xp >= 1);
    }

    #[test]
    fn test_reward_kill_scales_with_buffs() {
        use crate::sim::enemy::EnemyKind;

        let mut state = GameState::new(1);
        state.buffs.gold_mult = 2.0;
        let enemy = Enemy::new(1, EnemyKind::Fast, Vec2::ZERO, 1.0, 1.0);
        state.reward_kill(&enemy);
        assert_eq!(state.gold, 110);
        assert_eq!(state.score, 10);
        assert_eq!(state.experience, 2);
        assert_eq!(state.kills, 1);
    }

    #[test]
    fn test_resume_prefers_placement_then_level_ups() {
        let mut state = GameState::new(1);
        state.pending_level_ups.push_back(PendingLevelUp { level: 2 });
        state.resume();
        assert_eq!(state.mode, Mode::TowerPlacement);

        state.available_towers = 0;
        state.resume();
        assert!(matches!(state.mode, Mode::CardPrompt { .. }));
        assert!(state.pending_level_ups.is_empty());

        state.resume();
        assert_eq!(state.mode, Mode::Running);
    }

    #[test]
    fn test_upgrade_preview() {
        let mut state = GameState::new(1);
        let tower = state.build_tower(TowerKind::Basic, Vec2::ZERO);
        let id = tower.id;
        state.towers.push(tower);
        let preview = state.upgrade_preview(id).unwrap();
        assert_eq!(preview.cost, 50);
        assert!(preview.affordable);
        assert!(preview.next.damage > preview.current.damage);
        assert!(state.upgrade_preview(999).is_none());
    }
}
