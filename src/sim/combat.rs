//! Combat resolution: tower fire and projectile impacts
//!
//! Damage is plain subtraction from `hp`. Nothing here removes enemies; the
//! orchestrator sweeps out `hp <= 0` enemies (and pays for them) on its
//! enemy pass, so a kill is rewarded exactly once.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::enemy::Enemy;
use super::projectile::{Projectile, ProjectileKind};
use super::state::EntityIds;
use super::tower::Tower;
use crate::consts::PROJECTILE_HIT_RADIUS;
use crate::within;

/// Critical hit parameters for a volley
#[derive(Debug, Clone, Copy)]
pub struct CritRoll {
    pub chance: f32,
    pub multiplier: f32,
}

impl CritRoll {
    pub const NONE: CritRoll = CritRoll {
        chance: 0.0,
        multiplier: 1.0,
    };

    fn roll(&self, base: f32, rng: &mut Pcg32) -> f32 {
        if self.chance > 0.0 && rng.random::<f32>() < self.chance {
            base * self.multiplier
        } else {
            base
        }
    }
}

/// Tick tower cooldowns and fire every ready tower that has a target.
///
/// Returns the number of shots fired.
pub fn fire_towers(
    towers: &mut [Tower],
    enemies: &[Enemy],
    projectiles: &mut Vec<Projectile>,
    ids: &mut EntityIds,
    rng: &mut Pcg32,
    crit: CritRoll,
    delta_ms: f32,
) -> usize {
    let mut shots = 0;
    for tower in towers.iter_mut() {
        tower.update_cooldown(delta_ms);
        if !tower.ready() {
            continue;
        }
        let Some(target) = tower.select_target(enemies) else {
            continue;
        };

        let damage = crit.roll(tower.damage, rng);
        projectiles.push(Projectile::new(
            ids.next(),
            tower.pos,
            enemies[target].pos,
            tower.kind.projectile_speed(),
            damage,
            tower.kind.projectile_kind(),
        ));
        tower.reset_cooldown();
        shots += 1;
    }
    shots
}

/// Damage every enemy within `radius` of `center`; returns how many were hit.
///
/// Already-dead enemies still in the list take the damage too; it is harmless.
pub fn apply_splash(enemies: &mut [Enemy], center: Vec2, radius: f32, damage: f32) -> usize {
    let mut hit = 0;
    for enemy in enemies.iter_mut().filter(|e| within(e.pos, center, radius)) {
        enemy.take_damage(damage);
        hit += 1;
    }
    hit
}

fn touches(enemy: &Enemy, point: Vec2) -> bool {
    enemy.is_targetable() && within(enemy.pos, point, PROJECTILE_HIT_RADIUS)
}

/// Move projectiles, resolve impacts and drop resolved ones.
///
/// Each projectile, each tick, is in exactly one of: hit an enemy, reached its
/// target point, or still in flight. Returns the number resolved.
pub fn resolve_projectiles(
    projectiles: &mut Vec<Projectile>,
    enemies: &mut [Enemy],
    delta_ms: f32,
    now_ms: u64,
) -> usize {
    for projectile in projectiles.iter_mut() {
        let arrived = projectile.advance(delta_ms);
        let struck = enemies.iter().position(|e| touches(e, projectile.pos));

        match (projectile.kind, struck) {
            (ProjectileKind::Direct | ProjectileKind::Slow { .. }, Some(index)) => {
                let enemy = &mut enemies[index];
                enemy.take_damage(projectile.damage);
                if let Some((multiplier, duration_ms)) = projectile.kind.slow() {
                    enemy.apply_slow(multiplier, duration_ms, now_ms);
                }
                projectile.alive = false;
            }
            (ProjectileKind::Splash { radius }, struck) if struck.is_some() || arrived => {
                let hit = apply_splash(enemies, projectile.pos, radius, projectile.damage);
                log::debug!("Splash at {:?} hit {} enemies", projectile.pos, hit);
                projectile.alive = false;
            }
            // Reached the point without touching anything
            (_, None) if arrived => projectile.alive = false,
            _ => {}
        }
    }

    let before = projectiles.len();
    projectiles.retain(|p| p.alive);
    before - projectiles.len()
}
