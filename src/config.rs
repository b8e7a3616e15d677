//! Game and session configuration.
//!
//! Both structs deserialize from JSON with every field optional; missing fields
//! take the defaults below.

use crate::game::Chips;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const MIN_SEATS: usize = 2;
pub const MAX_SEATS: usize = 10;

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("blinds must be positive: small {small}, big {big}")]
    ZeroBlind { small: Chips, big: Chips },
    #[error("big blind {big} is smaller than small blind {small}")]
    InvertedBlinds { small: Chips, big: Chips },
    #[error("seat {seat} starts with an empty stack")]
    EmptyStack { seat: usize },
    #[error("seat count {0} outside 2..=10")]
    SeatCount(usize),
    #[error("blind escalation interval must be at least one hand")]
    ZeroEscalationInterval,
    #[error("could not read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Table rules for one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct GameConfig {
    pub starting_stack: Chips,
    pub small_blind: Chips,
    pub big_blind: Chips,
    /// Blinds double after every this many completed hands; `None` keeps them flat.
    pub blind_escalation_hands: Option<u32>,
    pub max_seats: usize,
    /// Seed for the deck RNG. `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_stack: 1000,
            small_blind: 5,
            big_blind: 10,
            blind_escalation_hands: Some(10),
            max_seats: MAX_SEATS,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn with_blinds(mut self, small_blind: Chips, big_blind: Chips) -> Self {
        self.small_blind = small_blind;
        self.big_blind = big_blind;
        self
    }

    pub fn with_starting_stack(mut self, stack: Chips) -> Self {
        self.starting_stack = stack;
        self
    }

    pub fn with_escalation(mut self, every_hands: Option<u32>) -> Self {
        self.blind_escalation_hands = every_hands;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.small_blind == 0 || self.big_blind == 0 {
            return Err(ConfigError::ZeroBlind { small: self.small_blind, big: self.big_blind });
        }
        if self.big_blind < self.small_blind {
            return Err(ConfigError::InvertedBlinds { small: self.small_blind, big: self.big_blind });
        }
        if self.blind_escalation_hands == Some(0) {
            return Err(ConfigError::ZeroEscalationInterval);
        }
        if !(MIN_SEATS..=MAX_SEATS).contains(&self.max_seats) {
            return Err(ConfigError::SeatCount(self.max_seats));
        }
        Ok(())
    }

    pub(crate) fn validate_seats(&self, stacks: &[Chips]) -> Result<(), ConfigError> {
        self.validate()?;
        if !(MIN_SEATS..=self.max_seats).contains(&stacks.len()) {
            return Err(ConfigError::SeatCount(stacks.len()));
        }
        if let Some(seat) = stacks.iter().position(|&s| s == 0) {
            return Err(ConfigError::EmptyStack { seat });
        }
        Ok(())
    }
}

/// Runtime knobs for the per-game autopilot in [`crate::session`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct SessionConfig {
    /// Time budget for one autonomous decision before the safe default is played.
    pub decision_budget_ms: u64,
    /// Stop dealing after this many hands; `None` plays until one seat holds every chip.
    pub max_hands: Option<u64>,
    /// Deal the next hand automatically once the previous one completes.
    pub auto_deal: bool,
    pub event_buffer: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { decision_budget_ms: 2_000, max_hands: None, auto_deal: true, event_buffer: 256 }
    }
}

impl SessionConfig {
    pub fn decision_budget(&self) -> Duration {
        Duration::from_millis(self.decision_budget_ms)
    }

    pub fn with_decision_budget_ms(mut self, ms: u64) -> Self {
        self.decision_budget_ms = ms;
        self
    }

    pub fn with_max_hands(mut self, hands: Option<u64>) -> Self {
        self.max_hands = hands;
        self
    }

    pub fn with_auto_deal(mut self, auto_deal: bool) -> Self {
        self.auto_deal = auto_deal;
        self
    }
}
