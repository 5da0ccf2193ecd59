//! Property-based tests using proptest
//!
//! Invariants that must hold for all inputs:
//! - Slots: occupancy is exactly "a tower within the distance threshold"
//! - Rewards: every offered card is legal in the state it was offered in
//! - Progression: XP and level only move forward
//! - Splash: damage lands on exactly the enemies inside the radius
//! - Pause: ticking a paused world changes nothing

use glam::Vec2;
use goblin_siege::consts::{SIM_DT_MS, SLOT_OCCUPIED_DISTANCE};
use goblin_siege::sim::cards::{self, CardEffect};
use goblin_siege::sim::combat;
use goblin_siege::sim::{Enemy, EnemyKind, GameState, Mode, TowerKind};
use goblin_siege::tick;
use proptest::prelude::*;

fn arb_point() -> impl Strategy<Value = Vec2> {
    (-100.0f32..1200.0, -100.0f32..800.0).prop_map(|(x, y)| Vec2::new(x, y))
}

fn arb_tower_kind() -> impl Strategy<Value = TowerKind> {
    prop::sample::select(TowerKind::ALL.to_vec())
}

/// Position, health, progress and status timers of every enemy
fn enemy_fingerprint(state: &GameState) -> Vec<(u32, Vec2, f32, usize, f32, u64, u64)> {
    state
        .enemies
        .iter()
        .map(|e| {
            (
                e.id,
                e.pos,
                e.hp,
                e.path_index,
                e.spawn_timer_ms,
                e.slow_until_ms,
                e.stun_until_ms,
            )
        })
        .collect()
}

fn run_ticks(state: &mut GameState, count: u32) {
    for _ in 0..count {
        let now = state.now_ms + 16;
        tick(state, SIM_DT_MS, now);
    }
}

// ============================================================
// Slot occupancy
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_slot_free_iff_no_tower_nearby(
        positions in prop::collection::vec(arb_point(), 0..8),
        near in prop::collection::vec((0usize..5, -15.0f32..15.0, -15.0f32..15.0), 0..4),
    ) {
        let mut state = GameState::new(1);
        let slots = state.slots.clone();
        let mut all: Vec<Vec2> = positions;
        all.extend(near.iter().map(|&(i, dx, dy)| slots[i] + Vec2::new(dx, dy)));
        for pos in all {
            let tower = state.build_tower(TowerKind::Basic, pos);
            state.towers.push(tower);
        }

        for (i, &slot) in slots.iter().enumerate() {
            let limit = SLOT_OCCUPIED_DISTANCE * SLOT_OCCUPIED_DISTANCE;
            let occupied = state
                .towers
                .iter()
                .any(|t| t.pos.distance_squared(slot) <= limit);
            prop_assert_eq!(state.is_slot_free(i), !occupied, "slot {}", i);
        }
    }

    #[test]
    fn prop_placing_occupies_slot(slot in 0usize..5, kind in arb_tower_kind()) {
        let mut state = GameState::new(2);
        state.unlocked = TowerKind::ALL.to_vec();
        state.start_run().unwrap();
        prop_assert!(state.is_slot_free(slot));
        state.place_tower(slot, kind).unwrap();
        prop_assert!(!state.is_slot_free(slot));
        prop_assert_eq!(state.free_slot_count(), 4);
    }
}

// ============================================================
// Reward legality
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn prop_generated_cards_are_legal(
        seed in any::<u64>(),
        unlocked in prop::collection::vec(arb_tower_kind(), 0..4),
        filled in prop::collection::btree_set(0usize..5, 0..=5),
        owed in 0u32..3,
        crit in 0.0f32..0.6,
        damaged in any::<bool>(),
    ) {
        let mut state = GameState::new(seed);
        for kind in unlocked {
            if !state.is_unlocked(kind) {
                state.unlocked.push(kind);
            }
        }
        for &slot in &filled {
            let pos = state.slots[slot];
            let tower = state.build_tower(TowerKind::Basic, pos);
            state.towers.push(tower);
        }
        state.available_towers = owed;
        state.buffs.crit_chance = crit.min(state.tuning.max_crit_chance);
        if damaged {
            state.base_health -= 3;
        }

        let choices = cards::generate_three(&mut state);
        prop_assert!(choices.len() <= cards::CHOICES_PER_OFFER);
        prop_assert!(!choices.is_empty());
        for card in &choices {
            prop_assert!(
                cards::is_offerable(card, &state),
                "illegal card {}",
                card.id
            );
            match card.effect {
                CardEffect::Unlock(kind) => prop_assert!(!state.is_unlocked(kind)),
                CardEffect::AddTower => prop_assert!(state.free_slot_count() > 0),
                CardEffect::UpgradeRandom => prop_assert!(!state.towers.is_empty()),
                _ => {}
            }
        }
        for (i, a) in choices.iter().enumerate() {
            prop_assert!(choices.iter().skip(i + 1).all(|b| b.id != a.id));
        }
    }
}

// ============================================================
// Progression
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_xp_and_level_monotonic(grants in prop::collection::vec(0u32..60, 1..40)) {
        let mut state = GameState::new(3);
        let mut total_levels = 0;
        for amount in grants {
            let (level, threshold) = (state.level, state.next_level_xp);
            let gained = state.grant_xp(amount);
            total_levels += gained;

            prop_assert_eq!(state.level, level + gained);
            prop_assert!(state.next_level_xp >= threshold);
            prop_assert!(state.experience < state.next_level_xp);
            prop_assert!(state.next_level_xp >= state.tuning.min_level_xp);
        }
        prop_assert_eq!(state.pending_level_ups.len() as u32, total_levels);
        let levels: Vec<u32> = state.pending_level_ups.iter().map(|p| p.level).collect();
        prop_assert!(levels.windows(2).all(|w| w[1] == w[0] + 1));
    }
}

// ============================================================
// Splash resolution
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn prop_splash_hits_exactly_enemies_in_radius(
        positions in prop::collection::vec(arb_point(), 1..20),
        center in arb_point(),
        radius in 1.0f32..300.0,
    ) {
        let mut enemies: Vec<Enemy> = positions
            .iter()
            .enumerate()
            .map(|(i, &pos)| Enemy::new(i as u32 + 1, EnemyKind::Tank, pos, 1.0, 1.0))
            .collect();

        let hit = combat::apply_splash(&mut enemies, center, radius, 7.0);

        let mut expected = 0;
        for enemy in &enemies {
            let inside = enemy.pos.distance_squared(center) <= radius * radius;
            if inside {
                expected += 1;
                prop_assert_eq!(enemy.hp, enemy.max_hp - 7.0);
            } else {
                prop_assert_eq!(enemy.hp, enemy.max_hp);
            }
        }
        prop_assert_eq!(hit, expected);
    }
}

// ============================================================
// Pause idempotence
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(40))]

    #[test]
    fn prop_paused_tick_changes_nothing(
        seed in any::<u64>(),
        warmup in 1u32..400,
        paused in 1u32..200,
    ) {
        let mut state = GameState::new(seed);
        state.start_run().unwrap();
        state.place_tower(0, TowerKind::Basic).unwrap();
        run_ticks(&mut state, warmup);
        if state.mode != Mode::Running {
            return Ok(());
        }
        state.pause().unwrap();

        let before = state.snapshot();
        let waves = state.waves.clone();
        let cooldowns: Vec<f32> = state.towers.iter().map(|t| t.cooldown).collect();
        let enemies = enemy_fingerprint(&state);

        run_ticks(&mut state, paused);

        let after = state.snapshot();
        prop_assert_eq!(enemy_fingerprint(&state), enemies);
        prop_assert_eq!(&after.projectiles, &before.projectiles);
        prop_assert_eq!(&after.towers, &before.towers);
        prop_assert_eq!(&after.economy, &before.economy);
        prop_assert_eq!(after.time_ticks, before.time_ticks);
        prop_assert_eq!(&state.waves, &waves);
        let cooled: Vec<f32> = state.towers.iter().map(|t| t.cooldown).collect();
        prop_assert_eq!(cooled, cooldowns);
    }
}
