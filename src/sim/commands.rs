//! Player command surface
//!
//! Every command is validated before it touches state. A rejected command
//! returns a `CommandError`, leaves the state exactly as it was, and is
//! logged at debug level; callers are free to ignore the error.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::cards;
use super::state::{GameState, Mode, ModeKind};
use super::tower::TowerKind;

/// Why a command was rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("`{command}` is not allowed in {mode:?} mode")]
    WrongMode {
        command: &'static str,
        mode: ModeKind,
    },
    #[error("the run is over; reset to play again")]
    GameOver,
    #[error("slot {slot} does not exist ({slots} slots)")]
    SlotOutOfRange { slot: usize, slots: usize },
    #[error("slot {0} is occupied")]
    SlotOccupied(usize),
    #[error("{0:?} towers are locked")]
    TowerLocked(TowerKind),
    #[error("no tower available to place")]
    NoTowerAvailable,
    #[error("no tower with id {0}")]
    UnknownTower(u32),
    #[error("insufficient gold: have {have}, need {need}")]
    InsufficientGold { have: u32, need: u32 },
    #[error("card `{0}` is not on offer")]
    CardNotOffered(String),
}

/// Serializable form of the command surface, for input layers and replays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    StartRun,
    Pause,
    Reset,
    PlaceTower { slot: usize, kind: TowerKind },
    SelectCard { card_id: String },
    RequestUpgrade { tower_id: u32 },
    ConfirmUpgrade,
    CancelUpgrade,
}

fn rejected(err: CommandError) -> Result<(), CommandError> {
    log::debug!("Command rejected: {}", err);
    Err(err)
}

impl GameState {
    /// Dispatch a `Command` to its method
    pub fn apply(&mut self, command: Command) -> Result<(), CommandError> {
        match command {
            Command::StartRun => self.start_run(),
            Command::Pause => self.pause(),
            Command::Reset => {
                self.reset();
                Ok(())
            }
            Command::PlaceTower { slot, kind } => self.place_tower(slot, kind),
            Command::SelectCard { card_id } => self.select_card(&card_id),
            Command::RequestUpgrade { tower_id } => self.request_upgrade(tower_id),
            Command::ConfirmUpgrade => self.confirm_upgrade(),
            Command::CancelUpgrade => self.cancel_upgrade(),
        }
    }

    fn wrong_mode(&self, command: &'static str) -> Result<(), CommandError> {
        if self.is_game_over() {
            return rejected(CommandError::GameOver);
        }
        rejected(CommandError::WrongMode {
            command,
            mode: self.mode.kind(),
        })
    }

    /// Start (or resume) the run. Owed towers must be placed first.
    pub fn start_run(&mut self) -> Result<(), CommandError> {
        if self.mode != Mode::Idle {
            return self.wrong_mode("start_run");
        }
        if !self.run_started {
            self.run_started = true;
            self.waves.start();
            log::info!("Run started (seed={})", self.seed);
        }
        self.resume();
        Ok(())
    }

    /// Halt the simulation; entities freeze where they are
    pub fn pause(&mut self) -> Result<(), CommandError> {
        if !self.mode.is_running() {
            return self.wrong_mode("pause");
        }
        self.mode = Mode::Idle;
        log::info!("Paused");
        Ok(())
    }

    /// Throw the run away and start over from the same seed and tuning
    pub fn reset(&mut self) {
        *self = GameState::with_tuning(self.seed, self.tuning.clone());
        log::info!("Reset (seed={})", self.seed);
    }

    /// Place an owed tower of `kind` on `slot`
    pub fn place_tower(&mut self, slot: usize, kind: TowerKind) -> Result<(), CommandError> {
        if self.mode != Mode::TowerPlacement {
            return self.wrong_mode("place_tower");
        }
        if self.available_towers == 0 {
            return rejected(CommandError::NoTowerAvailable);
        }
        let Some(&pos) = self.slots.get(slot) else {
            return rejected(CommandError::SlotOutOfRange {
                slot,
                slots: self.slots.len(),
            });
        };
        if !self.is_slot_free(slot) {
            return rejected(CommandError::SlotOccupied(slot));
        }
        if !self.is_unlocked(kind) {
            return rejected(CommandError::TowerLocked(kind));
        }

        let tower = self.build_tower(kind, pos);
        log::info!("Placed {} tower {} on slot {}", kind.name(), tower.id, slot);
        self.towers.push(tower);
        self.available_towers -= 1;
        self.starting_towers_left = self.starting_towers_left.saturating_sub(1);
        self.resume();
        Ok(())
    }

    /// Take one of the offered cards
    pub fn select_card(&mut self, card_id: &str) -> Result<(), CommandError> {
        let Mode::CardPrompt { choices } = &self.mode else {
            return self.wrong_mode("select_card");
        };
        let Some(card) = choices.iter().find(|c| c.id == card_id).cloned() else {
            return rejected(CommandError::CardNotOffered(card_id.to_string()));
        };

        cards::apply_card(self, &card);
        log::info!("Selected card {}", card.title);
        self.resume();
        Ok(())
    }

    /// Open the upgrade dialog for a tower
    pub fn request_upgrade(&mut self, tower_id: u32) -> Result<(), CommandError> {
        let resume = match self.mode {
            Mode::Running => true,
            Mode::Idle => false,
            _ => return self.wrong_mode("request_upgrade"),
        };
        if self.tower(tower_id).is_none() {
            return rejected(CommandError::UnknownTower(tower_id));
        }
        self.mode = Mode::UpgradePrompt { tower_id, resume };
        Ok(())
    }

    /// Pay for and apply the previewed upgrade
    pub fn confirm_upgrade(&mut self) -> Result<(), CommandError> {
        let Mode::UpgradePrompt { tower_id, resume } = self.mode else {
            return self.wrong_mode("confirm_upgrade");
        };
        let player_level = self.level;
        let Some(tower) = self.towers.iter_mut().find(|t| t.id == tower_id) else {
            return rejected(CommandError::UnknownTower(tower_id));
        };
        let cost = tower.upgrade_cost(player_level, &self.tuning);
        if self.gold < cost {
            return rejected(CommandError::InsufficientGold {
                have: self.gold,
                need: cost,
            });
        }

        tower.upgrade();
        log::info!(
            "Upgraded tower {} to level {} for {} gold",
            tower.id,
            tower.level,
            cost
        );
        self.gold -= cost;
        self.close_upgrade(resume);
        Ok(())
    }

    /// Close the upgrade dialog without buying
    pub fn cancel_upgrade(&mut self) -> Result<(), CommandError> {
        let Mode::UpgradePrompt { resume, .. } = self.mode else {
            return self.wrong_mode("cancel_upgrade");
        };
        self.close_upgrade(resume);
        Ok(())
    }

    fn close_upgrade(&mut self, resume: bool) {
        if resume {
            self.resume();
        } else {
            self.mode = Mode::Idle;
        }
    }
}
