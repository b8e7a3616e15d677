//! Blind levels and button rotation.

use crate::config::GameConfig;
use crate::game::{Chips, Player, PlayerStatus};
use crate::turn_order::TurnOrder;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlindLevel {
    pub small: Chips,
    pub big: Chips,
}

/// Blinds that double every `double_every` completed hands.
///
/// ```
/// use holdem_engine::blinds::{BlindLevel, BlindSchedule};
///
/// let schedule = BlindSchedule::new(BlindLevel { small: 5, big: 10 }, Some(10));
/// assert_eq!(schedule.level_for(9), BlindLevel { small: 5, big: 10 });
/// assert_eq!(schedule.level_for(10), BlindLevel { small: 10, big: 20 });
/// assert_eq!(schedule.level_for(25), BlindLevel { small: 20, big: 40 });
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlindSchedule {
    base: BlindLevel,
    double_every: Option<u32>,
}

impl BlindSchedule {
    pub fn new(base: BlindLevel, double_every: Option<u32>) -> Self {
        Self { base, double_every }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(
            BlindLevel { small: config.small_blind, big: config.big_blind },
            config.blind_escalation_hands,
        )
    }

    pub fn base(&self) -> BlindLevel {
        self.base
    }

    /// Level in force for the hand dealt after `hands_completed` hands.
    pub fn level_for(&self, hands_completed: u64) -> BlindLevel {
        let doublings = match self.double_every {
            Some(every) if every > 0 => hands_completed / u64::from(every),
            _ => 0,
        };
        let factor = if doublings >= u64::from(Chips::BITS) {
            Chips::MAX
        } else {
            1 << doublings
        };
        BlindLevel {
            small: self.base.small.saturating_mul(factor),
            big: self.base.big.saturating_mul(factor),
        }
    }
}

/// Dealer and blind seats for one hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonPositions {
    pub dealer: usize,
    pub small_blind: usize,
    pub big_blind: usize,
}

/// Move the button to the next seat with chips and place the blinds after it.
///
/// The first hand puts the button on the lowest funded seat. Heads-up the
/// dealer posts the small blind. Returns `None` when fewer than two seats
/// have chips.
pub fn rotate(players: &[Player], previous_dealer: Option<usize>) -> Option<ButtonPositions> {
    let funded = |_: usize, p: &Player| p.stack > 0 && p.status != PlayerStatus::Eliminated;
    let seats = players.iter().enumerate().filter(|&(i, p)| funded(i, p)).count();
    if seats < 2 {
        return None;
    }
    let order = TurnOrder::new(players);
    let dealer = match previous_dealer {
        None => players.iter().enumerate().position(|(i, p)| funded(i, p))?,
        Some(prev) => order.next_where(prev, funded)?,
    };
    let (small_blind, big_blind) = if seats == 2 {
        (dealer, order.next_where(dealer, funded)?)
    } else {
        let sb = order.next_where(dealer, funded)?;
        (sb, order.next_where(sb, funded)?)
    };
    Some(ButtonPositions { dealer, small_blind, big_blind })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameState;

    fn seats(stacks: &[Chips]) -> Vec<Player> {
        let mut ps = GameState::new(GameConfig::default(), stacks.len()).unwrap().players().to_vec();
        for (p, &s) in ps.iter_mut().zip(stacks) {
            p.stack = s;
            if s == 0 {
                p.status = PlayerStatus::Eliminated;
            }
        }
        ps
    }

    #[test]
    fn flat_schedule_never_moves() {
        let s = BlindSchedule::new(BlindLevel { small: 5, big: 10 }, None);
        assert_eq!(s.level_for(1_000), s.base());
    }

    #[test]
    fn escalation_saturates() {
        let s = BlindSchedule::new(BlindLevel { small: 5, big: 10 }, Some(1));
        assert_eq!(s.level_for(200).big, Chips::MAX);
        assert_eq!(s.level_for(3), BlindLevel { small: 40, big: 80 });
    }

    #[test]
    fn first_hand_and_rotation() {
        let ps = seats(&[100, 100, 100, 100]);
        let first = rotate(&ps, None).unwrap();
        assert_eq!(first, ButtonPositions { dealer: 0, small_blind: 1, big_blind: 2 });
        let second = rotate(&ps, Some(first.dealer)).unwrap();
        assert_eq!(second, ButtonPositions { dealer: 1, small_blind: 2, big_blind: 3 });
        let wrap = rotate(&ps, Some(3)).unwrap();
        assert_eq!(wrap, ButtonPositions { dealer: 0, small_blind: 1, big_blind: 2 });
    }

    #[test]
    fn busted_seats_are_skipped() {
        let ps = seats(&[100, 0, 100, 100]);
        let pos = rotate(&ps, Some(0)).unwrap();
        assert_eq!(pos, ButtonPositions { dealer: 2, small_blind: 3, big_blind: 0 });
    }

    #[test]
    fn heads_up_dealer_posts_small_blind() {
        let ps = seats(&[100, 0, 100]);
        let pos = rotate(&ps, Some(0)).unwrap();
        assert_eq!(pos, ButtonPositions { dealer: 2, small_blind: 2, big_blind: 0 });
        let next = rotate(&ps, Some(2)).unwrap();
        assert_eq!(next, ButtonPositions { dealer: 0, small_blind: 0, big_blind: 2 });
    }

    #[test]
    fn needs_two_funded_seats() {
        assert_eq!(rotate(&seats(&[100, 0, 0]), Some(0)), None);
    }
}
