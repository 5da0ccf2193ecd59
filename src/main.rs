//! Goblin Siege headless runner
//!
//! Plays a run with a simple autopilot at the fixed timestep and prints the
//! final snapshot as JSON.
//!
//! Usage: `goblin-siege [seed] [ticks] [tuning.json]`

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::time::{SystemTime, UNIX_EPOCH};

    use anyhow::{Context, Result};
    use goblin_siege::consts::SIM_DT_MS;
    use goblin_siege::sim::{GameState, Mode, TowerKind};
    use goblin_siege::{CommandError, Tuning, tick};

    /// Default run length: ten minutes of simulated time
    const DEFAULT_TICKS: u64 = 36_000;
    /// How often the autopilot considers buying an upgrade
    const UPGRADE_CHECK_TICKS: u64 = 60;
    /// Placement preference, strongest first
    const PLACEMENT_ORDER: [TowerKind; 4] = [
        TowerKind::Splash,
        TowerKind::Sniper,
        TowerKind::Basic,
        TowerKind::Slow,
    ];

    struct Args {
        seed: u64,
        ticks: u64,
        tuning: Tuning,
    }

    fn parse_args() -> Result<Args> {
        let mut args = std::env::args().skip(1);

        let seed = match args.next() {
            Some(s) => s.parse().with_context(|| format!("invalid seed `{}`", s))?,
            None => SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or_default(),
        };
        let ticks = match args.next() {
            Some(s) => s.parse().with_context(|| format!("invalid tick count `{}`", s))?,
            None => DEFAULT_TICKS,
        };
        let tuning = match args.next() {
            Some(path) => {
                let json = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading tuning file {}", path))?;
                Tuning::from_json(&json).with_context(|| format!("loading tuning from {}", path))?
            }
            None => Tuning::default(),
        };

        Ok(Args {
            seed,
            ticks,
            tuning,
        })
    }

    /// Makes the decisions a player would between ticks
    struct Autopilot;

    impl Autopilot {
        fn drive(&self, state: &mut GameState) -> Result<(), CommandError> {
            match &state.mode {
                Mode::Idle => state.start_run(),
                Mode::TowerPlacement => {
                    let Some(slot) = state.first_free_slot() else {
                        return Ok(());
                    };
                    let kind = PLACEMENT_ORDER
                        .into_iter()
                        .find(|&k| state.is_unlocked(k))
                        .unwrap_or_default();
                    state.place_tower(slot, kind)
                }
                Mode::CardPrompt { choices } => match choices.first() {
                    Some(card) => {
                        let id = card.id;
                        state.select_card(id)
                    }
                    None => Ok(()),
                },
                Mode::UpgradePrompt { .. } => state.cancel_upgrade(),
                Mode::Running if state.time_ticks % UPGRADE_CHECK_TICKS == 0 => {
                    self.buy_upgrade(state)
                }
                Mode::Running | Mode::GameOver => Ok(()),
            }
        }

        /// Upgrade the lowest-level tower if it is affordable
        fn buy_upgrade(&self, state: &mut GameState) -> Result<(), CommandError> {
            let Some(weakest) = state.towers.iter().min_by_key(|t| t.level).map(|t| t.id) else {
                return Ok(());
            };
            let affordable = state
                .upgrade_preview(weakest)
                .is_some_and(|preview| preview.affordable);
            if !affordable {
                return Ok(());
            }
            state.request_upgrade(weakest)?;
            state.confirm_upgrade()
        }
    }

    pub fn run() -> Result<()> {
        env_logger::init();
        let args = parse_args()?;
        log::info!("Goblin Siege (headless) starting with seed {}", args.seed);

        let mut state = GameState::with_tuning(args.seed, args.tuning);
        let autopilot = Autopilot;
        let mut now_ms = 0.0f64;

        for step in 0..args.ticks {
            if let Err(err) = autopilot.drive(&mut state) {
                log::warn!("Autopilot command failed: {}", err);
            }
            if state.is_game_over() {
                log::info!("Run ended after {} steps", step);
                break;
            }
            now_ms += f64::from(SIM_DT_MS);
            tick(&mut state, SIM_DT_MS, now_ms as u64);
        }

        let snapshot = state.snapshot();
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        log::info!(
            "Final: wave={} score={} kills={} level={}",
            snapshot.wave,
            snapshot.economy.score,
            snapshot.economy.kills,
            snapshot.economy.level
        );
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No headless runner on the web; embed the library instead
}
