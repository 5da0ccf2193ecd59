//! Level-up reward cards: pool, offer legality and effect application

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;

use super::state::{GameState, GlobalSlow};
use super::tower::TowerKind;

/// Cards offered per reward event
pub const CHOICES_PER_OFFER: usize = 3;

/// Gold granted instead of a tower when an add-tower reward cannot be honored
pub const ADD_TOWER_FALLBACK_GOLD: f32 = 50.0;

/// Stats raised permanently on every tower, current and future
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TowerStat {
    Damage,
    Range,
}

/// Global modifiers and one-off effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GlobalBuff {
    /// Multiplies tower fire rate
    FireRate,
    GoldMultiplier,
    XpMultiplier,
    /// Grants XP on the spot (can chain further level-ups)
    InstantXp,
    CritChance,
    /// Restores base health up to its maximum
    BaseHeal,
    /// Slows all enemies, including ones spawned before it runs out
    Slow {
        duration_ms: u64,
    },
}

/// What selecting a card does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CardEffect {
    StatBuff(TowerStat),
    Gold,
    Unlock(TowerKind),
    OneShotDamage,
    StunAll,
    GlobalBuff(GlobalBuff),
    AddTower,
    UpgradeRandom,
}

/// An offered reward. `value` is the effect's magnitude.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Card {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub effect: CardEffect,
    pub value: f32,
}

const fn card(
    id: &'static str,
    title: &'static str,
    description: &'static str,
    effect: CardEffect,
    value: f32,
) -> Card {
    Card {
        id,
        title,
        description,
        effect,
        value,
    }
}

/// Every card that can ever be offered
pub fn card_pool() -> Vec<Card> {
    use CardEffect as E;
    use GlobalBuff as G;

    vec![
        card(
            "dmg1",
            "Sharpened Tips",
            "All towers deal +2 damage",
            E::StatBuff(TowerStat::Damage),
            2.0,
        ),
        card(
            "rng1",
            "Extended Sights",
            "All towers gain +50 range",
            E::StatBuff(TowerStat::Range),
            50.0,
        ),
        card("gold1", "Treasure Cache", "Get 50 gold", E::Gold, 50.0),
        card(
            "add1",
            "New Ballista",
            "Place an extra tower on a free slot",
            E::AddTower,
            1.0,
        ),
        card(
            "unlock_splash",
            "Unlock Mortar",
            "Unlocks the splash-damage Mortar",
            E::Unlock(TowerKind::Splash),
            0.0,
        ),
        card(
            "unlock_sniper",
            "Unlock Sniper",
            "Unlocks the long-range Sniper",
            E::Unlock(TowerKind::Sniper),
            0.0,
        ),
        card(
            "unlock_slow",
            "Unlock Frost",
            "Unlocks the slowing Frost tower",
            E::Unlock(TowerKind::Slow),
            0.0,
        ),
        card(
            "one_shot",
            "Cleansing Flame",
            "Deal 50 damage to all enemies",
            E::OneShotDamage,
            50.0,
        ),
        card(
            "stun",
            "Bell of Panic",
            "Stun all enemies for 1.5s",
            E::StunAll,
            1500.0,
        ),
        card(
            "proj_speed",
            "Quick Arrows",
            "Towers attack 25% faster",
            E::GlobalBuff(G::FireRate),
            1.25,
        ),
        card(
            "greed",
            "Greed",
            "Earn 25% more gold",
            E::GlobalBuff(G::GoldMultiplier),
            1.25,
        ),
        card(
            "wisdom",
            "Wisdom",
            "Earn 25% more experience",
            E::GlobalBuff(G::XpMultiplier),
            1.25,
        ),
        card(
            "insight",
            "Insight",
            "Gain 15 experience now",
            E::GlobalBuff(G::InstantXp),
            15.0,
        ),
        card(
            "crit",
            "Keen Eye",
            "+10% critical hit chance",
            E::GlobalBuff(G::CritChance),
            0.1,
        ),
        card(
            "mason",
            "Mason",
            "Restore 5 base health",
            E::GlobalBuff(G::BaseHeal),
            5.0,
        ),
        card(
            "frost_nova",
            "Frost Nova",
            "Halve enemy speed for 10s, including new arrivals",
            E::GlobalBuff(G::Slow {
                duration_ms: 10_000,
            }),
            0.5,
        ),
        card(
            "upgrade",
            "Field Upgrade",
            "Upgrade a random tower for free",
            E::UpgradeRandom,
            1.0,
        ),
    ]
}

/// Look up a pool card by ID
pub fn find_card(id: &str) -> Option<Card> {
    card_pool().into_iter().find(|c| c.id == id)
}

/// Whether `card` may be offered in the current state
pub fn is_offerable(card: &Card, state: &GameState) -> bool {
    match card.effect {
        CardEffect::Unlock(kind) => !state.is_unlocked(kind),
        CardEffect::AddTower => state.free_slot_count() > state.available_towers as usize,
        CardEffect::UpgradeRandom => !state.towers.is_empty(),
        CardEffect::GlobalBuff(GlobalBuff::CritChance) => {
            state.buffs.crit_chance < state.tuning.max_crit_chance
        }
        CardEffect::GlobalBuff(GlobalBuff::BaseHeal) => state.base_health < state.max_base_health,
        _ => true,
    }
}

/// Draw up to three distinct legal cards
pub fn generate_three(state: &mut GameState) -> Vec<Card> {
    let mut pool: Vec<Card> = card_pool()
        .into_iter()
        .filter(|c| is_offerable(c, state))
        .collect();
    pool.shuffle(&mut state.rng);
    pool.truncate(CHOICES_PER_OFFER);
    pool
}

/// Apply a selected card's effect to the world
pub fn apply_card(state: &mut GameState, card: &Card) {
    let now = state.now_ms;
    match card.effect {
        CardEffect::StatBuff(TowerStat::Damage) => {
            state.buffs.damage_bonus += card.value;
            state.towers.iter_mut().for_each(|t| t.damage += card.value);
        }
        CardEffect::StatBuff(TowerStat::Range) => {
            state.buffs.range_bonus += card.value;
            state.towers.iter_mut().for_each(|t| t.range += card.value);
        }
        CardEffect::Gold => {
            let gold = (card.value * state.buffs.gold_mult).round() as u32;
            state.gold = state.gold.saturating_add(gold);
        }
        CardEffect::Unlock(kind) => {
            if !state.is_unlocked(kind) {
                state.unlocked.push(kind);
            }
        }
        CardEffect::OneShotDamage => {
            state.enemies.iter_mut().for_each(|e| e.take_damage(card.value));
        }
        CardEffect::StunAll => {
            let duration = card.value.max(0.0) as u64;
            state.enemies.iter_mut().for_each(|e| e.apply_stun(duration, now));
        }
        CardEffect::GlobalBuff(buff) => apply_global_buff(state, buff, card.value),
        CardEffect::AddTower => {
            if state.free_slot_count() > state.available_towers as usize {
                state.available_towers += 1;
            } else {
                let gold = (ADD_TOWER_FALLBACK_GOLD * state.buffs.gold_mult).round() as u32;
                log::warn!(
                    "No free slot for an extra tower; granting {} gold instead",
                    gold
                );
                state.gold = state.gold.saturating_add(gold);
            }
        }
        CardEffect::UpgradeRandom => {
            if !state.towers.is_empty() {
                let index = state.rng.random_range(0..state.towers.len());
                state.towers[index].upgrade();
            }
        }
    }
    log::debug!("Applied card {} ({})", card.id, card.title);
}

fn apply_global_buff(state: &mut GameState, buff: GlobalBuff, value: f32) {
    let now = state.now_ms;
    match buff {
        GlobalBuff::FireRate => {
            state.buffs.fire_rate_mult *= value;
            state.towers.iter_mut().for_each(|t| t.fire_rate *= value);
        }
        GlobalBuff::GoldMultiplier => state.buffs.gold_mult *= value,
        GlobalBuff::XpMultiplier => state.buffs.xp_mult *= value,
        GlobalBuff::InstantXp => {
            state.grant_xp(value.max(0.0).round() as u32);
        }
        GlobalBuff::CritChance => {
            state.buffs.crit_chance =
                (state.buffs.crit_chance + value).min(state.tuning.max_crit_chance);
        }
        GlobalBuff::BaseHeal => {
            state.base_health =
                (state.base_health + value.round() as i32).min(state.max_base_health);
        }
        GlobalBuff::Slow { duration_ms } => {
            state.global_slow = Some(GlobalSlow {
                multiplier: value,
                until_ms: now.saturating_add(duration_ms),
            });
            state
                .enemies
                .iter_mut()
                .for_each(|e| e.apply_slow(value, duration_ms, now));
        }
    }
}
