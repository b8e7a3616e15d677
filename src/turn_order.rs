//! Clockwise seat traversal and the "who acts next" rules.

use crate::game::{Chips, Player, PlayerStatus, Stage};

/// Read-only view over the seats for ordering questions.
#[derive(Debug, Clone, Copy)]
pub struct TurnOrder<'a> {
    players: &'a [Player],
}

impl<'a> TurnOrder<'a> {
    pub fn new(players: &'a [Player]) -> Self {
        Self { players }
    }

    /// Every seat once, starting left of `seat` and ending with `seat` itself.
    pub fn clockwise_after(&self, seat: usize) -> impl Iterator<Item = usize> {
        let n = self.players.len();
        (1..=n).map(move |step| (seat + step) % n)
    }

    /// First seat after `seat` (exclusive, wrapping) satisfying `pred`.
    pub fn next_where<F>(&self, seat: usize, mut pred: F) -> Option<usize>
    where
        F: FnMut(usize, &Player) -> bool,
    {
        self.clockwise_after(seat).find(|&i| pred(i, &self.players[i]))
    }

    /// An Active seat that has not acted since the last full raise, or still owes chips.
    pub fn needs_action(player: &Player, bet_level: Chips) -> bool {
        player.status == PlayerStatus::Active
            && (!player.has_acted || player.current_bet < bet_level)
    }

    /// Next seat clockwise after `seat` that owes a decision.
    pub fn next_to_act(&self, seat: usize, bet_level: Chips) -> Option<usize> {
        self.next_where(seat, |_, p| Self::needs_action(p, bet_level))
    }

    /// Seats dealt into the current hand.
    pub fn dealt_in(&self) -> usize {
        self.players.iter().filter(|p| p.status != PlayerStatus::Eliminated).count()
    }

    /// Opening seat of a street.
    ///
    /// Preflop action starts left of the big blind; later streets start left of
    /// the dealer. Heads-up the dealer posts the small blind, so it opens preflop
    /// and the other seat opens every later street.
    pub fn first_to_act(
        &self,
        stage: Stage,
        dealer: usize,
        big_blind: usize,
        bet_level: Chips,
    ) -> Option<usize> {
        let n = self.players.len();
        let heads_up = self.dealt_in() == 2;
        // search starts one seat after the anchor
        let anchor = match (stage, heads_up) {
            (Stage::Preflop, true) => (dealer + n - 1) % n,
            (Stage::Preflop, false) => big_blind,
            (_, _) => dealer,
        };
        self.next_to_act(anchor, bet_level)
    }
}
