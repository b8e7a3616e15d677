//! Action validation, chip movement and street progression.

use crate::error::{EngineError, IllegalAction};
use crate::events::{ActionRecord, ActionVerb, GameEvent, HandSummary};
use crate::game::{Chips, GameState, PlayerStatus, Stage};
use crate::turn_order::TurnOrder;
use crate::view::LegalActions;
use serde::{Deserialize, Serialize};

/// A player's intent. `BetOrRaise` names the street total to put in front of
/// the seat; amounts above the stack are capped to an all-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "action", content = "to", rename_all = "snake_case")]
pub enum Action {
    Fold,
    Check,
    Call,
    BetOrRaise(Chips),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActionKind {
    Fold,
    Check,
    Call,
    BetOrRaise,
}

impl Action {
    fn kind(self) -> ActionKind {
        match self {
            Action::Fold => ActionKind::Fold,
            Action::Check => ActionKind::Check,
            Action::Call => ActionKind::Call,
            Action::BetOrRaise(_) => ActionKind::BetOrRaise,
        }
    }
}

/// What the action resolves to once validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Plan {
    Fold,
    Check,
    /// Put chips in up to the street total `to`.
    Commit { to: Chips, verb: ActionVerb, full_raise: bool },
}

/// What applying an action did to the hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Same street; `next` is on the clock.
    Continue { next: usize },
    /// The street closed and a new one opened.
    StreetAdvanced { stage: Stage, next: usize },
    HandComplete(Box<HandSummary>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResult {
    pub record: ActionRecord,
    pub transition: Transition,
}

impl ActionResult {
    pub fn hand_complete(&self) -> Option<&HandSummary> {
        match &self.transition {
            Transition::HandComplete(summary) => Some(summary),
            _ => None,
        }
    }
}

/// Legality table keyed by stage, seat status, action kind and the amount owed.
fn legality(
    stage: Stage,
    status: PlayerStatus,
    kind: ActionKind,
    to_call: Chips,
) -> Result<(), IllegalAction> {
    use ActionKind as A;
    use PlayerStatus as S;
    match (stage.is_betting(), status, kind, to_call > 0) {
        (false, ..) => Err(IllegalAction::NoBettingInProgress),
        (true, S::Folded | S::AllIn | S::Eliminated, ..) => {
            Err(IllegalAction::NotActive(status.label()))
        }
        (true, S::Active, A::Check, true) => Err(IllegalAction::CannotCheckFacingBet { to_call }),
        (true, S::Active, A::Call, false) => Err(IllegalAction::NothingToCall),
        (true, S::Active, _, _) => Ok(()),
    }
}

impl GameState {
    /// Validate and apply `action` for `seat`.
    ///
    /// On error nothing changes. On success the turn moves on, possibly closing
    /// the street, running out the board, or completing the hand.
    pub fn apply_action(&mut self, seat: usize, action: Action) -> Result<ActionResult, EngineError> {
        let plan = self.plan(seat, action)?;
        let record = self.commit(seat, plan);
        tracing::debug!(
            hand = self.hand_number,
            seat,
            verb = ?record.verb,
            added = record.added,
            total = record.total,
            all_in = record.all_in,
            "action applied"
        );
        self.verify_conservation()?;
        let transition = self.progress(Some(seat))?;
        if !matches!(transition, Transition::HandComplete(_)) {
            self.emit_state_updated();
        }
        Ok(ActionResult { record, transition })
    }

    fn plan(&self, seat: usize, action: Action) -> Result<Plan, EngineError> {
        let illegal = |reason| EngineError::IllegalAction { seat, reason };
        let Some(p) = self.players.get(seat) else {
            return Err(illegal(IllegalAction::UnknownSeat));
        };
        if !self.stage.is_betting() {
            return Err(illegal(IllegalAction::NoBettingInProgress));
        }
        if self.current_player_index != Some(seat) {
            return Err(EngineError::OutOfTurn { seat, expected: self.current_player_index });
        }
        let to_call = self.current_bet.saturating_sub(p.current_bet);
        legality(self.stage, p.status, action.kind(), to_call).map_err(illegal)?;
        let call_to = self.current_bet.min(p.entitlement());

        match action {
            Action::Fold => Ok(Plan::Fold),
            Action::Check => Ok(Plan::Check),
            Action::Call => Ok(Plan::Commit { to: call_to, verb: ActionVerb::Call, full_raise: false }),
            Action::BetOrRaise(requested) => {
                let to = requested.min(p.entitlement());
                let all_in = to == p.entitlement();
                if to <= self.current_bet {
                    if all_in && to_call > 0 {
                        // short all-in raise attempt is just a call for what's left
                        return Ok(Plan::Commit { to: call_to, verb: ActionVerb::Call, full_raise: false });
                    }
                    return Err(illegal(IllegalAction::TargetTooLow {
                        current: self.current_bet,
                        target: requested,
                    }));
                }
                if to_call > 0 && p.has_acted {
                    return Err(illegal(IllegalAction::ActionNotReopened));
                }
                let min_to = self.current_bet.saturating_add(self.last_raise_size);
                let full_raise = to >= min_to;
                if !full_raise && !all_in {
                    return Err(illegal(IllegalAction::BelowMinimumRaise { min_to, got: requested }));
                }
                let verb = if self.current_bet == 0 { ActionVerb::Bet } else { ActionVerb::RaiseTo };
                Ok(Plan::Commit { to, verb, full_raise })
            }
        }
    }

    fn commit(&mut self, seat: usize, plan: Plan) -> ActionRecord {
        let stage = self.stage;
        let prior_bet = self.current_bet;
        let (verb, added) = match plan {
            Plan::Fold => {
                self.players[seat].status = PlayerStatus::Folded;
                (ActionVerb::Fold, 0)
            }
            Plan::Check => (ActionVerb::Check, 0),
            Plan::Commit { to, verb, full_raise } => {
                let p = &mut self.players[seat];
                let added = to - p.current_bet;
                p.stack -= added;
                p.current_bet = to;
                p.total_contributed += added;
                if p.stack == 0 {
                    p.status = PlayerStatus::AllIn;
                }
                self.pot += added;
                if to > prior_bet {
                    self.current_bet = to;
                    if full_raise {
                        self.last_raise_size = to - prior_bet;
                        // a full raise reopens the betting for everyone else
                        for (i, other) in self.players.iter_mut().enumerate() {
                            if i != seat && other.status == PlayerStatus::Active {
                                other.has_acted = false;
                            }
                        }
                    }
                }
                (verb, added)
            }
        };
        let p = &mut self.players[seat];
        p.has_acted = true;
        let record = ActionRecord {
            seat,
            stage,
            verb,
            added,
            total: p.current_bet,
            all_in: p.status == PlayerStatus::AllIn && added > 0,
        };
        p.last_action = Some(record.clone());
        self.actions.push(record.clone());
        record
    }

    /// Options for `seat` if it is on the clock.
    pub fn legal_actions(&self, seat: usize) -> Option<LegalActions> {
        if !self.stage.is_betting() || self.current_player_index != Some(seat) {
            return None;
        }
        let p = self.players.get(seat)?;
        let to_call = self.current_bet.saturating_sub(p.current_bet);
        let entitlement = p.entitlement();
        let may_raise = entitlement > self.current_bet && !(to_call > 0 && p.has_acted);
        let min_to = self.current_bet.saturating_add(self.last_raise_size).min(entitlement);
        Some(LegalActions {
            may_fold: true,
            may_check: to_call == 0,
            call_amount: (to_call > 0).then(|| to_call.min(p.stack)),
            min_raise_to: may_raise.then_some(min_to),
            max_raise_to: may_raise.then_some(entitlement),
        })
    }

    /// Every Active seat has acted since the last full raise and matched the bet.
    pub(crate) fn round_complete(&self) -> bool {
        self.players
            .iter()
            .filter(|p| p.status == PlayerStatus::Active)
            .all(|p| p.has_acted && p.current_bet == self.current_bet)
    }

    /// Close the betting round and open the next street.
    ///
    /// Fails unless the round is complete. From the river this moves to
    /// showdown without dealing.
    pub fn advance_street(&mut self) -> Result<Stage, EngineError> {
        let Some(next) = self.stage.next_street() else {
            return Err(EngineError::IllegalStateTransition {
                from: self.stage,
                attempted: "advance the street",
            });
        };
        if !self.round_complete() {
            return Err(EngineError::IllegalStateTransition {
                from: self.stage,
                attempted: "advance before the betting round is complete",
            });
        }
        for p in &mut self.players {
            p.current_bet = 0;
            if p.status == PlayerStatus::Active {
                p.has_acted = false;
            }
        }
        self.current_bet = 0;
        self.last_raise_size = self.blinds.big;
        self.current_player_index = None;
        self.open_street(next);
        Ok(next)
    }

    fn open_street(&mut self, stage: Stage) {
        let missing = stage.community_len().saturating_sub(self.community_cards.len());
        let cards = self.deck.draw_n(missing);
        self.community_cards.extend(cards);
        self.stage = stage;
        if stage != Stage::Showdown {
            tracing::debug!(hand = self.hand_number, ?stage, board = ?self.community_cards, "street opened");
            self.emit(GameEvent::StreetAdvanced {
                hand_number: self.hand_number,
                stage,
                community_cards: self.community_cards.as_slice().to_vec(),
            });
        }
    }

    /// Deal the remaining streets with no further betting.
    fn run_out(&mut self) {
        for p in &mut self.players {
            p.current_bet = 0;
        }
        self.current_bet = 0;
        self.current_player_index = None;
        while let Some(next) = self.stage.next_street() {
            self.open_street(next);
        }
    }

    /// Decide what happens after a blind post or an action by `last_actor`.
    pub(crate) fn progress(&mut self, last_actor: Option<usize>) -> Result<Transition, EngineError> {
        let mut last_actor = last_actor;
        let mut opened: Option<Stage> = None;
        loop {
            if self.non_folded_count() <= 1 {
                let summary = self.finish_fold_out()?;
                return Ok(Transition::HandComplete(Box::new(summary)));
            }

            let active: Vec<usize> = (0..self.players.len())
                .filter(|&i| self.players[i].status == PlayerStatus::Active)
                .collect();
            let nobody_left_to_bet = match active.as_slice() {
                [] => true,
                [only] => self.players[*only].current_bet >= self.current_bet,
                _ => false,
            };
            if nobody_left_to_bet {
                self.run_out();
                let summary = self.finish_showdown()?;
                return Ok(Transition::HandComplete(Box::new(summary)));
            }

            if self.round_complete() {
                if self.advance_street()? == Stage::Showdown {
                    let summary = self.finish_showdown()?;
                    return Ok(Transition::HandComplete(Box::new(summary)));
                }
                opened = Some(self.stage);
                last_actor = None;
                continue;
            }

            let order = TurnOrder::new(&self.players);
            let next = match last_actor {
                Some(seat) => order.next_to_act(seat, self.current_bet),
                None => order.first_to_act(
                    self.stage,
                    self.dealer_index,
                    self.big_blind_index,
                    self.current_bet,
                ),
            };
            let Some(next) = next else {
                return Err(EngineError::IllegalStateTransition {
                    from: self.stage,
                    attempted: "find a seat to act in an open round",
                });
            };
            self.current_player_index = Some(next);
            return Ok(match opened {
                Some(stage) => Transition::StreetAdvanced { stage, next },
                None => Transition::Continue { next },
            });
        }
    }
}
