use crate::evaluator::EvalError;
use crate::game::{Chips, Stage};

/// Why an action was refused. Refusals never mutate the game.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IllegalAction {
    #[error("no betting round is in progress")]
    NoBettingInProgress,
    #[error("seat does not exist")]
    UnknownSeat,
    #[error("seat cannot act: it is {0}")]
    NotActive(&'static str),
    #[error("cannot check facing a bet of {to_call}")]
    CannotCheckFacingBet { to_call: Chips },
    #[error("nothing to call; check instead")]
    NothingToCall,
    #[error("target {target} must exceed the current bet {current}")]
    TargetTooLow { current: Chips, target: Chips },
    #[error("raise to {got} is below the minimum of {min_to}")]
    BelowMinimumRaise { min_to: Chips, got: Chips },
    #[error("action was not reopened by a full raise; call or fold")]
    ActionNotReopened,
}

/// Engine error taxonomy.
///
/// `OutOfTurn` and `IllegalAction` are input errors: the caller re-prompts. An
/// `IllegalStateTransition` is a dispatch-layer bug and fails only that call. A
/// `ChipConservationViolation` aborts the hand it was detected in.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EngineError {
    #[error("seat {seat} acted out of turn (expected {expected:?})")]
    OutOfTurn { seat: usize, expected: Option<usize> },
    #[error("illegal action from seat {seat}: {reason}")]
    IllegalAction { seat: usize, reason: IllegalAction },
    #[error("cannot {attempted} during {from:?}")]
    IllegalStateTransition { from: Stage, attempted: &'static str },
    #[error("chip conservation violated in hand {hand_number}: expected {expected}, found {actual}")]
    ChipConservationViolation { hand_number: u64, expected: Chips, actual: Chips },
    #[error("showdown evaluation failed: {0}")]
    Evaluation(#[from] EvalError),
}

impl EngineError {
    /// Input errors leave the game untouched and can simply be retried.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, EngineError::OutOfTurn { .. } | EngineError::IllegalAction { .. })
    }
}
