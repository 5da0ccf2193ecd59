//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied delta and clock only
//! - Seeded RNG only
//! - Stable iteration order (insertion order, IDs ascend)
//! - No rendering, input or platform dependencies

pub mod cards;
pub mod combat;
pub mod commands;
pub mod enemy;
pub mod path;
pub mod projectile;
pub mod snapshot;
pub mod state;
pub mod tick;
pub mod tower;
pub mod wave;

pub use cards::{Card, CardEffect, GlobalBuff, TowerStat};
pub use commands::{Command, CommandError};
pub use enemy::{Enemy, EnemyKind, EnemyState};
pub use path::Path;
pub use projectile::{Projectile, ProjectileKind};
pub use snapshot::Snapshot;
pub use state::{Buffs, GameState, Mode, ModeKind, PendingLevelUp, UpgradePreview};
pub use tick::tick;
pub use tower::{TargetingPolicy, Tower, TowerKind, TowerStats};
pub use wave::WaveScheduler;
