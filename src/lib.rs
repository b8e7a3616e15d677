//! holdem-engine: no-limit Texas hold'em betting and pot settlement
//!
//! Goals:
//! - Authoritative game state: every chip accounted for after every action
//! - Strict turn order and bet validation; refused input never mutates state
//! - Side pots for any number of all-ins, with deterministic odd-chip rules
//! - Many games hosted concurrently, with time-boxed autonomous opponents
//!
//! ## Quick start: play a hand
//! ```
//! use holdem_engine::betting::Action;
//! use holdem_engine::config::GameConfig;
//! use holdem_engine::game::{GameState, Stage};
//!
//! let mut game = GameState::new(GameConfig::default().with_seed(42), 3).unwrap();
//! game.start_new_hand().unwrap();
//!
//! // dealer 0, small blind 1, big blind 2: seat 0 opens
//! game.apply_action(0, Action::Fold).unwrap();
//! let result = game.apply_action(1, Action::Fold).unwrap();
//!
//! let summary = result.hand_complete().unwrap();
//! assert_eq!(summary.winners(), vec![(2, 15)]);
//! assert_eq!(game.stage(), Stage::HandComplete);
//! ```
//!
//! ## Simulator
//! Run a game between bots with:
//! ```sh
//! cargo run --bin holdem-sim -- --seats 6 --hands 50
//! ```

pub mod agents;
pub mod betting;
pub mod blinds;
pub mod cards;
pub mod config;
pub mod deck;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod events;
pub mod game;
pub mod hand;
pub mod session;
pub mod settlement;
pub mod turn_order;
pub mod view;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
