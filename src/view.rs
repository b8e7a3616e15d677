//! Per-viewer snapshots of a game.

use crate::blinds::BlindLevel;
use crate::cards::Card;
use crate::events::ActionRecord;
use crate::game::{Chips, GameState, PlayerStatus, Stage};
use crate::hand::HoleCards;
use serde::{Deserialize, Serialize};

/// Options open to the seat on the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalActions {
    pub may_fold: bool,
    pub may_check: bool,
    /// Chips a call would add; `None` when there is nothing to call.
    pub call_amount: Option<Chips>,
    /// Smallest legal bet/raise target; all-in when the stack cannot cover a full raise.
    pub min_raise_to: Option<Chips>,
    pub max_raise_to: Option<Chips>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatView {
    pub seat: usize,
    pub name: String,
    pub stack: Chips,
    pub current_bet: Chips,
    pub total_contributed: Chips,
    pub status: PlayerStatus,
    pub has_acted: bool,
    /// Only set for the viewer's own seat.
    pub hole_cards: Option<HoleCards>,
    pub last_action: Option<ActionRecord>,
}

/// What one seat (or a spectator) is allowed to see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicView {
    pub hand_number: u64,
    pub stage: Stage,
    pub community_cards: Vec<Card>,
    pub pot: Chips,
    pub current_bet: Chips,
    pub last_raise_size: Chips,
    pub blinds: BlindLevel,
    pub dealer: usize,
    pub small_blind: usize,
    pub big_blind: usize,
    pub current_player: Option<usize>,
    pub viewer: Option<usize>,
    pub seats: Vec<SeatView>,
    /// The viewer's options when it is the viewer's turn.
    pub legal_actions: Option<LegalActions>,
}

impl PublicView {
    pub fn viewer_seat(&self) -> Option<&SeatView> {
        self.viewer.and_then(|v| self.seats.get(v))
    }

    pub fn is_viewer_turn(&self) -> bool {
        self.viewer.is_some() && self.viewer == self.current_player
    }

    /// Seats other than the viewer still contesting the pot.
    pub fn opponents_in_hand(&self) -> usize {
        self.seats
            .iter()
            .filter(|s| Some(s.seat) != self.viewer && s.status.in_hand())
            .count()
    }
}

impl GameState {
    /// Snapshot for `viewer`; `None` is a spectator who sees no hole cards.
    pub fn get_public_view(&self, viewer: Option<usize>) -> PublicView {
        let seats = self
            .players
            .iter()
            .enumerate()
            .map(|(seat, p)| SeatView {
                seat,
                name: p.name().to_string(),
                stack: p.stack(),
                current_bet: p.current_bet(),
                total_contributed: p.total_contributed(),
                status: p.status(),
                has_acted: p.has_acted(),
                hole_cards: if viewer == Some(seat) { p.hole_cards() } else { None },
                last_action: p.last_action().cloned(),
            })
            .collect();
        PublicView {
            hand_number: self.hand_number,
            stage: self.stage,
            community_cards: self.community_cards.as_slice().to_vec(),
            pot: self.pot,
            current_bet: self.current_bet,
            last_raise_size: self.last_raise_size,
            blinds: self.blinds,
            dealer: self.dealer_index,
            small_blind: self.small_blind_index,
            big_blind: self.big_blind_index,
            current_player: self.current_player_index,
            viewer,
            seats,
            legal_actions: viewer.and_then(|v| self.legal_actions(v)),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::GameConfig;
    use crate::game::GameState;

    #[test]
    fn only_own_hole_cards_are_visible() {
        let mut g = GameState::new(GameConfig::default().with_seed(5), 3).unwrap();
        g.start_new_hand().unwrap();

        let spectator = g.get_public_view(None);
        assert!(spectator.seats.iter().all(|s| s.hole_cards.is_none()));
        assert!(spectator.legal_actions.is_none());

        let own = g.get_public_view(Some(1));
        assert!(own.seats[1].hole_cards.is_some());
        assert!(own.seats[0].hole_cards.is_none() && own.seats[2].hole_cards.is_none());
        assert!(!own.is_viewer_turn());
        assert!(own.legal_actions.is_none());
    }

    #[test]
    fn current_player_sees_options() {
        let mut g = GameState::new(GameConfig::default().with_seed(5), 3).unwrap();
        g.start_new_hand().unwrap();
        let v = g.get_public_view(Some(0));
        assert!(v.is_viewer_turn());
        let legal = v.legal_actions.unwrap();
        assert!(!legal.may_check);
        assert_eq!(legal.call_amount, Some(10));
        assert_eq!(legal.min_raise_to, Some(20));
        assert_eq!(legal.max_raise_to, Some(1000));
        assert_eq!(v.opponents_in_hand(), 2);
    }

    #[test]
    fn view_serializes() {
        let mut g = GameState::new(GameConfig::default().with_seed(5), 2).unwrap();
        g.start_new_hand().unwrap();
        let json = serde_json::to_value(g.get_public_view(Some(0))).unwrap();
        assert_eq!(json["stage"], "preflop");
        assert_eq!(json["seats"].as_array().unwrap().len(), 2);
    }
}
