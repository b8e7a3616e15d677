//! Side-pot construction and pot distribution.
//!
//! Pots are layered by the distinct total contributions of the seats still in
//! the hand. Layer `i` holds, from every seat including folded ones, the chips
//! it put in between level `i-1` and level `i`; folded chips above the highest
//! level join the top layer. A layer is contested by the non-folded seats that
//! reached its level, so eligibility shrinks as layers rise.

use crate::error::EngineError;
use crate::evaluator::{best_hand, HandScore};
use crate::events::{HandSummary, Resolution, SeatResult, ShownHand};
use crate::game::{Chips, GameState, PlayerStatus, Stage};
use serde::{Deserialize, Serialize};

/// One seat's stake in the hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stake {
    pub seat: usize,
    pub contributed: Chips,
    pub folded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PotLayer {
    /// Contribution level this layer starts above.
    pub floor: Chips,
    /// Contribution level this layer is filled to.
    pub cap: Chips,
    pub amount: Chips,
    pub eligible: Vec<usize>,
}

/// A layer after distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardedPot {
    pub amount: Chips,
    pub eligible: Vec<usize>,
    /// `(seat, chips)` in the order the chips were handed out.
    pub shares: Vec<(usize, Chips)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub pots: Vec<AwardedPot>,
    /// Chips won, indexed by seat.
    pub payouts: Vec<Chips>,
}

/// Split the committed chips into layered pots.
///
/// ```
/// use holdem_engine::settlement::{build_pot_layers, Stake};
///
/// let stakes = [
///     Stake { seat: 0, contributed: 50, folded: false },
///     Stake { seat: 1, contributed: 100, folded: false },
///     Stake { seat: 2, contributed: 100, folded: false },
/// ];
/// let layers = build_pot_layers(&stakes);
/// assert_eq!(layers[0].amount, 150);
/// assert_eq!(layers[1].amount, 100);
/// assert_eq!(layers[1].eligible, vec![1, 2]);
/// ```
pub fn build_pot_layers(stakes: &[Stake]) -> Vec<PotLayer> {
    let top = stakes.iter().map(|s| s.contributed).max().unwrap_or(0);
    let mut levels: Vec<Chips> = stakes
        .iter()
        .filter(|s| !s.folded && s.contributed > 0)
        .map(|s| s.contributed)
        .collect();
    levels.sort_unstable();
    levels.dedup();
    if levels.is_empty() {
        // only folded seats put chips in
        if top == 0 {
            return Vec::new();
        }
        levels.push(0);
    }

    let last = levels.len() - 1;
    let mut layers = Vec::with_capacity(levels.len());
    let mut floor = 0;
    for (i, &level) in levels.iter().enumerate() {
        let cap = if i == last { top.max(level) } else { level };
        let amount = stakes
            .iter()
            .map(|s| s.contributed.min(cap) - s.contributed.min(floor))
            .sum();
        let eligible = stakes
            .iter()
            .filter(|s| !s.folded && s.contributed >= level)
            .map(|s| s.seat)
            .collect();
        layers.push(PotLayer { floor, cap, amount, eligible });
        floor = cap;
    }
    layers
}

/// Award every layer to its best eligible hands.
///
/// `scores` must cover every non-folded seat. Tied winners split a layer
/// evenly; leftover chips go one at a time to the tied winners in clockwise
/// order starting left of the dealer.
pub fn settle_showdown(
    stakes: &[Stake],
    scores: &[(usize, HandScore)],
    dealer: usize,
    seat_count: usize,
) -> Result<Settlement, EngineError> {
    let mut payouts = vec![0; seat_count];
    let mut pots = Vec::new();
    for layer in build_pot_layers(stakes) {
        let contenders: Vec<(usize, HandScore)> = scores
            .iter()
            .copied()
            .filter(|(seat, _)| layer.eligible.contains(seat))
            .collect();
        let Some(best) = contenders.iter().map(|&(_, score)| score).max() else {
            return Err(EngineError::IllegalStateTransition {
                from: Stage::Showdown,
                attempted: "award a pot without a scored contender",
            });
        };
        let mut winners: Vec<usize> =
            contenders.iter().filter(|&&(_, s)| s == best).map(|&(seat, _)| seat).collect();
        winners.sort_by_key(|&seat| clockwise_distance(dealer, seat, seat_count));

        let shares = split_evenly(layer.amount, &winners);
        for &(seat, chips) in &shares {
            payouts[seat] += chips;
        }
        pots.push(AwardedPot { amount: layer.amount, eligible: layer.eligible, shares });
    }
    Ok(Settlement { pots, payouts })
}

/// The single remaining seat takes every committed chip.
pub fn settle_fold_out(stakes: &[Stake], winner: usize, seat_count: usize) -> Settlement {
    let amount: Chips = stakes.iter().map(|s| s.contributed).sum();
    let mut payouts = vec![0; seat_count];
    payouts[winner] = amount;
    Settlement {
        pots: vec![AwardedPot { amount, eligible: vec![winner], shares: vec![(winner, amount)] }],
        payouts,
    }
}

/// Seats from the one left of the dealer (0) around to the dealer (n-1).
fn clockwise_distance(dealer: usize, seat: usize, seat_count: usize) -> usize {
    (seat + seat_count - dealer - 1) % seat_count
}

fn split_evenly(amount: Chips, winners: &[usize]) -> Vec<(usize, Chips)> {
    let k = winners.len() as Chips;
    let share = amount / k;
    let odd = (amount % k) as usize;
    winners
        .iter()
        .enumerate()
        .map(|(i, &seat)| (seat, share + Chips::from(i < odd)))
        .collect()
}

impl GameState {
    fn stakes(&self) -> Vec<Stake> {
        self.players
            .iter()
            .enumerate()
            .map(|(seat, p)| Stake {
                seat,
                contributed: p.total_contributed,
                folded: !p.status.in_hand(),
            })
            .collect()
    }

    /// Award the pot to the last seat standing.
    pub(crate) fn finish_fold_out(&mut self) -> Result<HandSummary, EngineError> {
        let Some(winner) = self.players.iter().position(|p| p.status.in_hand()) else {
            let err = EngineError::IllegalStateTransition {
                from: self.stage,
                attempted: "award a pot nobody is left to win",
            };
            return Err(self.abort_hand(err));
        };
        let settlement = settle_fold_out(&self.stakes(), winner, self.players.len());
        tracing::debug!(hand = self.hand_number, winner, pot = self.pot, "won uncontested");
        self.complete_hand(settlement, Resolution::FoldOut, Vec::new())
    }

    /// Evaluate every remaining hand and distribute each layer.
    ///
    /// Any failure aborts the hand and refunds every contribution.
    pub(crate) fn finish_showdown(&mut self) -> Result<HandSummary, EngineError> {
        self.stage = Stage::Showdown;
        match self.settle_at_showdown() {
            Ok((settlement, shown)) => self.complete_hand(settlement, Resolution::Showdown, shown),
            Err(err) => Err(self.abort_hand(err)),
        }
    }

    fn settle_at_showdown(&self) -> Result<(Settlement, Vec<ShownHand>), EngineError> {
        let board = self.community_cards.as_slice();
        let mut shown = Vec::new();
        for (seat, p) in self.players.iter().enumerate() {
            if !p.status.in_hand() {
                continue;
            }
            let Some(hole) = p.hole_cards else {
                return Err(EngineError::IllegalStateTransition {
                    from: Stage::Showdown,
                    attempted: "show down a seat without hole cards",
                });
            };
            let eval = best_hand(&hole, board)?;
            shown.push(ShownHand { seat, hole_cards: hole, category: eval.category, score: eval.score });
        }
        let scores: Vec<(usize, HandScore)> = shown.iter().map(|h| (h.seat, h.score)).collect();
        let settlement =
            settle_showdown(&self.stakes(), &scores, self.dealer_index, self.players.len())?;
        Ok((settlement, shown))
    }

    fn complete_hand(
        &mut self,
        settlement: Settlement,
        resolution: Resolution,
        shown: Vec<ShownHand>,
    ) -> Result<HandSummary, EngineError> {
        let paid: Chips = settlement.payouts.iter().sum();
        if paid != self.pot {
            let err = EngineError::ChipConservationViolation {
                hand_number: self.hand_number,
                expected: self.pot,
                actual: paid,
            };
            return Err(self.abort_hand(err));
        }

        let seats: Vec<SeatResult> = self
            .players
            .iter()
            .enumerate()
            .map(|(seat, p)| {
                let won = settlement.payouts[seat];
                SeatResult {
                    seat,
                    name: p.name.clone(),
                    starting_stack: self.hand_start_stacks.get(seat).copied().unwrap_or(0),
                    contributed: p.total_contributed,
                    won,
                    delta: won as i64 - p.total_contributed as i64,
                    folded: p.status == PlayerStatus::Folded,
                    hole_cards: p.hole_cards,
                }
            })
            .collect();

        for (p, won) in self.players.iter_mut().zip(&settlement.payouts) {
            p.stack += won;
            p.total_contributed = 0;
            p.current_bet = 0;
        }
        self.pot = 0;
        self.current_bet = 0;
        self.current_player_index = None;
        self.stage = Stage::HandComplete;
        self.hands_completed += 1;

        let summary = HandSummary {
            hand_number: self.hand_number,
            buttons: crate::blinds::ButtonPositions {
                dealer: self.dealer_index,
                small_blind: self.small_blind_index,
                big_blind: self.big_blind_index,
            },
            blinds: self.blinds,
            community_cards: self.community_cards.as_slice().to_vec(),
            resolution,
            pots: settlement.pots,
            seats,
            shown,
            actions: self.actions.clone(),
        };
        self.verify_conservation()?;
        tracing::info!(
            hand = summary.hand_number,
            pot = summary.total_pot(),
            winners = ?summary.winners(),
            "hand complete"
        );
        self.last_summary = Some(summary.clone());
        self.emit(crate::events::GameEvent::HandComplete { summary: Box::new(summary.clone()) });
        Ok(summary)
    }
}
