//! Fixed timestep simulation tick
//!
//! Advances the world one step in a fixed order: waves, enemies (with
//! removal and payout), towers, projectiles, then level-up bookkeeping.

use super::combat::{self, CritRoll};
use super::enemy::Enemy;
use super::state::{GameState, Mode};

/// Advance the game state by `delta_ms`, with `now_ms` as the monotonic
/// clock used for status-effect expiry.
///
/// Outside `Running` this only records the timestamp; entities, cooldowns
/// and wave timers stay frozen.
pub fn tick(state: &mut GameState, delta_ms: f32, now_ms: u64) {
    state.now_ms = now_ms;
    if !state.mode.is_running() {
        return;
    }
    state.time_ticks += 1;

    spawn_enemies(state, delta_ms);

    if !update_enemies(state, delta_ms) {
        return;
    }

    let crit = CritRoll {
        chance: state.buffs.crit_chance,
        multiplier: state.tuning.crit_multiplier,
    };
    combat::fire_towers(
        &mut state.towers,
        &state.enemies,
        &mut state.projectiles,
        &mut state.ids,
        &mut state.rng,
        crit,
        delta_ms,
    );
    combat::resolve_projectiles(&mut state.projectiles, &mut state.enemies, delta_ms, now_ms);

    if state.global_slow.is_some_and(|slow| slow.until_ms <= now_ms) {
        state.global_slow = None;
    }

    if state.mode.is_running() {
        state.open_next_level_up();
    }
}

/// Run the wave clock and add any new arrivals, folding in an active global slow.
/// Enemies killed but not yet swept do not count as alive.
fn spawn_enemies(state: &mut GameState, delta_ms: f32) {
    let alive = state.enemies.iter().filter(|e| !e.is_dead()).count();
    let mut spawned = state.waves.update(
        delta_ms,
        alive,
        &mut state.rng,
        &mut state.ids,
        &state.path,
        &state.tuning,
    );

    if let Some(slow) = state.global_slow {
        let remaining = slow.remaining_ms(state.now_ms);
        if remaining > 0 {
            for enemy in &mut spawned {
                enemy.apply_slow(slow.multiplier, remaining, state.now_ms);
            }
        }
    }
    state.enemies.append(&mut spawned);
}

/// Move enemies, then sweep out the dead and the ones that got through.
///
/// Returns false if the base fell.
fn update_enemies(state: &mut GameState, delta_ms: f32) -> bool {
    let now = state.now_ms;
    for enemy in &mut state.enemies {
        enemy.update(delta_ms, now, &state.path);
    }

    let mut killed: Vec<Enemy> = Vec::new();
    let mut leaked = 0;
    state.enemies.retain(|enemy| {
        if enemy.is_dead() {
            killed.push(enemy.clone());
            false
        } else if enemy.reached_base {
            leaked += enemy.kind.base_damage();
            false
        } else {
            true
        }
    });

    for enemy in &killed {
        state.reward_kill(enemy);
    }

    if leaked > 0 {
        state.base_health -= leaked;
        log::debug!("Base hit for {} (health={})", leaked, state.base_health);
    }

    if state.base_health <= 0 {
        state.mode = Mode::GameOver;
        log::info!(
            "Game over: wave={} score={} kills={}",
            state.waves.wave,
            state.score,
            state.kills
        );
        return false;
    }
    true
}
