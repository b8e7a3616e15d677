//! Hand ranking: the best five-card combination out of hole + community cards.

use crate::cards::{Card, Rank};
use crate::hand::{validate_disjoint, HandError, HoleCards};
use core::cmp::Ordering;
use serde::{Deserialize, Serialize};

/// Poker hand category from weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Category {
    HighCard = 0,
    Pair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
}

impl Category {
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::HighCard => "high card",
            Category::Pair => "pair",
            Category::TwoPair => "two pair",
            Category::ThreeOfAKind => "three of a kind",
            Category::Straight => "straight",
            Category::Flush => "flush",
            Category::FullHouse => "full house",
            Category::FourOfAKind => "four of a kind",
            Category::StraightFlush => "straight flush",
        }
    }
}

/// Totally ordered hand strength. Equal scores are exact ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandScore(u32);

impl HandScore {
    /// Pack a category and up to five descending tiebreak ranks.
    ///
    /// Layout, most significant first: `category (4 bits) | r0 | r1 | r2 | r3 | r4` with
    /// four bits per rank. Missing tiebreakers are zero.
    fn pack(category: Category, tiebreak: &[Rank]) -> Self {
        let mut v = category as u32;
        for i in 0..5 {
            v = (v << 4) | tiebreak.get(i).map(|r| r.value() as u32).unwrap_or(0);
        }
        HandScore(v)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub fn category(self) -> Category {
        match self.0 >> 20 {
            0 => Category::HighCard,
            1 => Category::Pair,
            2 => Category::TwoPair,
            3 => Category::ThreeOfAKind,
            4 => Category::Straight,
            5 => Category::Flush,
            6 => Category::FullHouse,
            7 => Category::FourOfAKind,
            _ => Category::StraightFlush,
        }
    }
}

/// Detailed evaluation result; ordering is driven by `score` alone.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Evaluation {
    pub category: Category,
    pub best_five: [Card; 5],
    pub score: HandScore,
}

impl Ord for Evaluation {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score.cmp(&other.score)
    }
}

impl PartialOrd for Evaluation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Evaluation {
    fn eq(&self, other: &Self) -> bool {
        self.score == other.score
    }
}

impl Eq for Evaluation {}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EvalError {
    #[error("invalid hand: {0}")]
    InvalidHand(#[from] HandError),
    #[error("need 5 to 7 cards to evaluate, got {0}")]
    CardCount(usize),
}

/// Rank a seat's best five-card hand from its hole cards and the community cards.
///
/// Accepts 3 to 5 community cards (5 to 7 cards in total) and tries every
/// five-card combination.
///
/// ```
/// use holdem_engine::evaluator::{best_hand, Category};
/// use holdem_engine::cards::parse_cards;
///
/// let hole = "As Ah".parse().unwrap();
/// let board = parse_cards("Qc Jd 9h 3s 2c").unwrap();
/// let eval = best_hand(&hole, &board).unwrap();
/// assert_eq!(eval.category, Category::Pair);
/// ```
pub fn best_hand(hole: &HoleCards, community: &[Card]) -> Result<Evaluation, EvalError> {
    validate_disjoint(hole, community)?;
    let mut cards = Vec::with_capacity(7);
    cards.extend_from_slice(&hole.as_array());
    cards.extend_from_slice(community);
    best_of(&cards)
}

/// Best five-card evaluation out of 5..=7 arbitrary cards.
pub fn best_of(cards: &[Card]) -> Result<Evaluation, EvalError> {
    let n = cards.len();
    if !(5..=7).contains(&n) {
        return Err(EvalError::CardCount(n));
    }
    let mut best: Option<Evaluation> = None;
    for a in 0..n {
        for b in (a + 1)..n {
            for c in (b + 1)..n {
                for d in (c + 1)..n {
                    for e in (d + 1)..n {
                        let eval = evaluate_five(&[cards[a], cards[b], cards[c], cards[d], cards[e]]);
                        if best.map_or(true, |cur| eval > cur) {
                            best = Some(eval);
                        }
                    }
                }
            }
        }
    }
    best.ok_or(EvalError::CardCount(n))
}

/// Evaluate exactly five cards.
pub fn evaluate_five(cards: &[Card; 5]) -> Evaluation {
    let mut sorted = *cards;
    sorted.sort_by(|a, b| b.rank().cmp(&a.rank()).then(b.suit().cmp(&a.suit())));

    let mut counts = [0u8; 15];
    for c in &sorted {
        counts[c.rank().value() as usize] += 1;
    }
    let is_flush = sorted.iter().all(|c| c.suit() == sorted[0].suit());
    let straight_top = straight_top(&counts);

    // (rank, multiplicity) ordered by multiplicity then rank, both descending
    let mut groups: Vec<(Rank, u8)> = Rank::ALL
        .iter()
        .rev()
        .filter(|r| counts[r.value() as usize] > 0)
        .map(|&r| (r, counts[r.value() as usize]))
        .collect();
    groups.sort_by(|a, b| b.1.cmp(&a.1).then(b.0.cmp(&a.0)));
    let by_group: Vec<Rank> = groups.iter().map(|g| g.0).collect();
    let shape: Vec<u8> = groups.iter().map(|g| g.1).collect();

    let (category, tiebreak) = match (straight_top, is_flush, shape.as_slice()) {
        (Some(top), true, _) => (Category::StraightFlush, vec![top]),
        (_, _, [4, 1]) => (Category::FourOfAKind, by_group),
        (_, _, [3, 2]) => (Category::FullHouse, by_group),
        (_, true, _) => (Category::Flush, by_group),
        (Some(top), false, _) => (Category::Straight, vec![top]),
        (_, _, [3, 1, 1]) => (Category::ThreeOfAKind, by_group),
        (_, _, [2, 2, 1]) => (Category::TwoPair, by_group),
        (_, _, [2, 1, 1, 1]) => (Category::Pair, by_group),
        _ => (Category::HighCard, by_group),
    };
    Evaluation { category, best_five: sorted, score: HandScore::pack(category, &tiebreak) }
}

/// Top rank of a five-distinct-rank straight, with the wheel (A-2-3-4-5) topping at Five.
fn straight_top(counts: &[u8; 15]) -> Option<Rank> {
    if counts.iter().filter(|&&c| c > 0).count() != 5 {
        return None;
    }
    let present = |v: u8| counts[v as usize] > 0;
    if [14, 2, 3, 4, 5].iter().all(|&v| present(v)) {
        return Some(Rank::Five);
    }
    (6u8..=14).rev().find(|&top| (top - 4..=top).all(present)).and_then(Rank::from_value)
}
