use crate::cards::{Card, Rank, Suit};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// Undealt cards. The top of the deck is the end of the vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// ```
    /// use holdem_engine::deck::Deck;
    ///
    /// let deck = Deck::standard();
    /// assert_eq!(deck.len(), 52);
    /// ```
    pub fn standard() -> Self {
        let cards = Suit::ALL
            .iter()
            .flat_map(|&s| Rank::ALL.iter().map(move |&r| Card::new(r, s)))
            .collect();
        Self { cards }
    }

    /// A standard deck shuffled with the caller's RNG (the game keeps a seeded ChaCha RNG).
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::standard();
        deck.cards.shuffle(rng);
        deck
    }

    /// Build a stacked deck where `in_deal_order[0]` is the first card dealt.
    ///
    /// The remaining cards of a standard deck follow the given ones in their
    /// standard order. Used for replays and deterministic scenarios; see
    /// [`GameState::start_new_hand_with_deck`](crate::game::GameState::start_new_hand_with_deck)
    /// for the order in which hole and community cards are drawn.
    pub fn stacked(in_deal_order: Vec<Card>) -> Self {
        let rest: Vec<Card> = Self::standard()
            .cards
            .into_iter()
            .filter(|c| !in_deal_order.contains(c))
            .collect();
        let mut cards = in_deal_order;
        cards.extend(rest);
        Self::exact(cards)
    }

    /// Exactly these cards, `in_deal_order[0]` on top.
    pub fn exact(in_deal_order: Vec<Card>) -> Self {
        let mut cards = in_deal_order;
        cards.reverse();
        Self { cards }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// First card, in deal order, that appears more than once.
    pub fn repeated_card(&self) -> Option<Card> {
        let mut seen = HashSet::with_capacity(self.cards.len());
        self.cards.iter().rev().copied().find(|&c| !seen.insert(c))
    }

    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    pub fn draw_n(&mut self, n: usize) -> Vec<Card> {
        (0..n).filter_map(|_| self.draw()).collect()
    }
}
