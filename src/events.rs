//! Action records, hand summaries and the event stream pushed to observers.

use crate::blinds::{BlindLevel, ButtonPositions};
use crate::cards::Card;
use crate::evaluator::{Category, HandScore};
use crate::game::{Chips, Stage};
use crate::hand::HoleCards;
use crate::settlement::AwardedPot;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionVerb {
    SmallBlind,
    BigBlind,
    Fold,
    Check,
    Call,
    Bet,
    RaiseTo,
}

impl ActionVerb {
    pub fn is_forced(self) -> bool {
        matches!(self, ActionVerb::SmallBlind | ActionVerb::BigBlind)
    }
}

/// One applied action, as it actually happened after capping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub seat: usize,
    pub stage: Stage,
    pub verb: ActionVerb,
    /// Chips moved from stack to pot by this action.
    pub added: Chips,
    /// The seat's street contribution afterwards.
    pub total: Chips,
    pub all_in: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// Everyone else folded; no cards were shown.
    FoldOut,
    Showdown,
}

/// A hand revealed at showdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShownHand {
    pub seat: usize,
    pub hole_cards: HoleCards,
    pub category: Category,
    pub score: HandScore,
}

/// Per-seat accounting of a finished hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatResult {
    pub seat: usize,
    pub name: String,
    pub starting_stack: Chips,
    pub contributed: Chips,
    pub won: Chips,
    /// `won - contributed`.
    pub delta: i64,
    pub folded: bool,
    /// Dealt cards, whether or not they were shown. Not for public views.
    pub hole_cards: Option<HoleCards>,
}

/// Everything that happened in one hand, captured when it completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandSummary {
    pub hand_number: u64,
    pub buttons: ButtonPositions,
    pub blinds: BlindLevel,
    pub community_cards: Vec<Card>,
    pub resolution: Resolution,
    pub pots: Vec<AwardedPot>,
    pub seats: Vec<SeatResult>,
    pub shown: Vec<ShownHand>,
    pub actions: Vec<ActionRecord>,
}

impl HandSummary {
    pub fn total_pot(&self) -> Chips {
        self.pots.iter().map(|p| p.amount).sum()
    }

    /// Seats that took chips out of the pot, with the amounts.
    pub fn winners(&self) -> Vec<(usize, Chips)> {
        self.seats.iter().filter(|s| s.won > 0).map(|s| (s.seat, s.won)).collect()
    }

    pub fn net_deltas(&self) -> Vec<i64> {
        self.seats.iter().map(|s| s.delta).collect()
    }
}

/// A seat's line in the hand history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatHistory {
    pub seat: usize,
    pub name: String,
    /// `None` only for seats that were not dealt in.
    pub hole_cards: Option<HoleCards>,
    pub actions: Vec<ActionRecord>,
    pub result: i64,
}

/// Flattened, publishable history of one hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandRecord {
    pub hand_number: u64,
    pub community_cards: Vec<Card>,
    pub final_pot: Chips,
    pub seats: Vec<SeatHistory>,
    pub winners: Vec<(usize, Chips)>,
}

impl HandRecord {
    pub fn from_summary(summary: &HandSummary) -> Self {
        let seats = summary
            .seats
            .iter()
            .filter(|s| s.starting_stack > 0)
            .map(|s| SeatHistory {
                seat: s.seat,
                name: s.name.clone(),
                hole_cards: s.hole_cards,
                actions: summary.actions.iter().filter(|a| a.seat == s.seat).cloned().collect(),
                result: s.delta,
            })
            .collect();
        Self {
            hand_number: summary.hand_number,
            community_cards: summary.community_cards.clone(),
            final_pot: summary.total_pot(),
            seats,
            winners: summary.winners(),
        }
    }
}

/// Pushed to observers after every state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    StateUpdated { hand_number: u64, stage: Stage, current_player: Option<usize>, pot: Chips },
    StreetAdvanced { hand_number: u64, stage: Stage, community_cards: Vec<Card> },
    HandComplete { summary: Box<HandSummary> },
    PlayerEliminated { seat: usize, hand_number: u64 },
    GameOver { winner: Option<usize> },
}
