//! Read-only render snapshot
//!
//! A plain copy of what a renderer or HUD needs after a tick. Holding one
//! never borrows the `GameState`.

use glam::Vec2;
use serde::Serialize;

use super::cards::Card;
use super::enemy::{EnemyKind, EnemyState};
use super::projectile::ProjectileKind;
use super::state::{GameState, Mode, ModeKind, UpgradePreview};
use super::tower::TowerKind;

/// Mode flags as a UI layer expects them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModeFlags {
    pub running: bool,
    pub placing_starting_tower: bool,
    pub awaiting_tower_placement: bool,
    pub show_card_choice: bool,
    pub show_upgrade_modal: bool,
    pub game_over: bool,
}

impl ModeFlags {
    fn of(state: &GameState) -> Self {
        let placing = state.mode == Mode::TowerPlacement;
        Self {
            running: state.mode.is_running(),
            placing_starting_tower: placing && state.starting_towers_left > 0,
            awaiting_tower_placement: placing,
            show_card_choice: matches!(state.mode, Mode::CardPrompt { .. }),
            show_upgrade_modal: matches!(state.mode, Mode::UpgradePrompt { .. }),
            game_over: state.is_game_over(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EconomyView {
    pub gold: u32,
    pub base_health: i32,
    pub max_base_health: i32,
    pub score: u64,
    pub kills: u32,
    pub experience: u32,
    pub level: u32,
    pub next_level_xp: u32,
    pub pending_level_ups: usize,
    pub available_towers: u32,
    pub unlocked: Vec<TowerKind>,
    pub crit_chance: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TowerView {
    pub id: u32,
    pub kind: TowerKind,
    pub pos: Vec2,
    pub range: f32,
    pub damage: f32,
    pub fire_rate: f32,
    pub level: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnemyView {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub hp: f32,
    pub max_hp: f32,
    pub state: EnemyState,
    pub slowed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectileView {
    pub id: u32,
    pub pos: Vec2,
    pub target: Vec2,
    pub kind: ProjectileKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotView {
    pub pos: Vec2,
    pub free: bool,
}

/// Everything observable about the world after a tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub time_ticks: u64,
    pub now_ms: u64,
    pub wave: u32,
    pub time_to_next_wave_secs: f32,
    pub mode: ModeKind,
    pub flags: ModeFlags,
    pub economy: EconomyView,
    pub path: Vec<Vec2>,
    pub slots: Vec<SlotView>,
    pub towers: Vec<TowerView>,
    pub enemies: Vec<EnemyView>,
    pub projectiles: Vec<ProjectileView>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub card_choices: Vec<Card>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upgrade_preview: Option<UpgradePreview>,
}

impl GameState {
    /// Capture the current world for rendering
    pub fn snapshot(&self) -> Snapshot {
        let now = self.now_ms;
        let card_choices = match &self.mode {
            Mode::CardPrompt { choices } => choices.clone(),
            _ => Vec::new(),
        };
        let upgrade_preview = match self.mode {
            Mode::UpgradePrompt { tower_id, .. } => self.upgrade_preview(tower_id),
            _ => None,
        };

        Snapshot {
            time_ticks: self.time_ticks,
            now_ms: now,
            wave: self.waves.wave,
            time_to_next_wave_secs: self.waves.time_to_next_wave_secs(),
            mode: self.mode.kind(),
            flags: ModeFlags::of(self),
            economy: EconomyView {
                gold: self.gold,
                base_health: self.base_health,
                max_base_health: self.max_base_health,
                score: self.score,
                kills: self.kills,
                experience: self.experience,
                level: self.level,
                next_level_xp: self.next_level_xp,
                pending_level_ups: self.pending_level_ups.len(),
                available_towers: self.available_towers,
                unlocked: self.unlocked.clone(),
                crit_chance: self.buffs.crit_chance,
            },
            path: self.path.waypoints.clone(),
            slots: self
                .slots
                .iter()
                .enumerate()
                .map(|(i, &pos)| SlotView {
                    pos,
                    free: self.is_slot_free(i),
                })
                .collect(),
            towers: self
                .towers
                .iter()
                .map(|t| TowerView {
                    id: t.id,
                    kind: t.kind,
                    pos: t.pos,
                    range: t.range,
                    damage: t.damage,
                    fire_rate: t.fire_rate,
                    level: t.level,
                })
                .collect(),
            enemies: self
                .enemies
                .iter()
                .map(|e| EnemyView {
                    id: e.id,
                    kind: e.kind,
                    pos: e.pos,
                    hp: e.hp,
                    max_hp: e.max_hp,
                    state: e.state(now),
                    slowed: e.slow_multiplier < 1.0 && now <= e.slow_until_ms,
                })
                .collect(),
            projectiles: self
                .projectiles
                .iter()
                .map(|p| ProjectileView {
                    id: p.id,
                    pos: p.pos,
                    target: p.target,
                    kind: p.kind,
                })
                .collect(),
            card_choices,
            upgrade_preview,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;

    #[test]
    fn test_snapshot_flags_follow_mode() {
        let mut state = GameState::new(4);
        let snap = state.snapshot();
        assert_eq!(snap.mode, ModeKind::Idle);
        assert!(!snap.flags.running);
        assert_eq!(snap.slots.len(), 5);

        state.start_run().unwrap();
        let snap = state.snapshot();
        assert!(snap.flags.placing_starting_tower);
        assert!(snap.flags.awaiting_tower_placement);
        assert!(!snap.flags.running);

        state.place_tower(0, TowerKind::Basic).unwrap();
        let snap = state.snapshot();
        assert!(snap.flags.running);
        assert!(!snap.slots[0].free);
        assert_eq!(snap.towers.len(), 1);
        assert_eq!(snap.economy.available_towers, 0);
    }

    #[test]
    fn test_every_starting_tower_flagged() {
        let tuning = Tuning {
            starting_towers: 2,
            ..Tuning::default()
        };
        let mut state = GameState::with_tuning(4, tuning);
        state.start_run().unwrap();
        assert!(state.snapshot().flags.placing_starting_tower);

        state.place_tower(0, TowerKind::Basic).unwrap();
        assert_eq!(state.mode, Mode::TowerPlacement);
        assert!(state.snapshot().flags.placing_starting_tower);

        state.place_tower(1, TowerKind::Basic).unwrap();
        assert_eq!(state.starting_towers_left, 0);
        assert!(state.snapshot().flags.running);

        // A reward tower is not a starting tower
        state.available_towers = 1;
        state.mode = Mode::TowerPlacement;
        let snap = state.snapshot();
        assert!(snap.flags.awaiting_tower_placement);
        assert!(!snap.flags.placing_starting_tower);
    }

    #[test]
    fn test_snapshot_carries_upgrade_preview() {
        let mut state = GameState::new(4);
        state.start_run().unwrap();
        state.place_tower(1, TowerKind::Basic).unwrap();
        let id = state.towers[0].id;
        assert!(state.snapshot().upgrade_preview.is_none());

        state.request_upgrade(id).unwrap();
        let snap = state.snapshot();
        assert!(snap.flags.show_upgrade_modal);
        let preview = snap.upgrade_preview.unwrap();
        assert_eq!(preview.tower_id, id);
        assert_eq!(preview.cost, 50);
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut state = GameState::new(4);
        state.start_run().unwrap();
        let json = serde_json::to_value(state.snapshot()).unwrap();
        assert_eq!(json["mode"], "TowerPlacement");
        assert_eq!(json["economy"]["gold"], 100);
        assert!(json.get("card_choices").is_none());
    }
}
