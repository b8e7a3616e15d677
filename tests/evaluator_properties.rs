use holdem_engine::cards::{Card, Rank, Suit};
use holdem_engine::evaluator::{best_hand, best_of, evaluate_five, Category};
use holdem_engine::hand::HoleCards;
use proptest::prelude::*;
use std::cmp::Ordering;

fn full_deck() -> Vec<Card> {
    Suit::ALL.iter().flat_map(|&s| Rank::ALL.iter().map(move |&r| Card::new(r, s))).collect()
}

/// `n` distinct cards in random order.
fn distinct_cards(n: usize) -> impl Strategy<Value = Vec<Card>> {
    prop::sample::subsequence(full_deck(), n).prop_shuffle()
}

fn rank(v: u8) -> Rank {
    Rank::from_value(v).expect("rank value in 2..=14")
}

fn straight_cards(top: u8) -> [Card; 5] {
    let ranks = if top == 5 { [14, 2, 3, 4, 5] } else { [top - 4, top - 3, top - 2, top - 1, top] };
    let suits = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades, Suit::Clubs];
    [0, 1, 2, 3, 4].map(|i| Card::new(rank(ranks[i]), suits[i]))
}

fn flush_rank_set() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::btree_set(2u8..=14u8, 5)
        .prop_map(|set| set.into_iter().rev().collect::<Vec<u8>>())
        .prop_filter("non-straight ranks", |desc| {
            let is_wheel = desc == &vec![14, 5, 4, 3, 2];
            let is_straight = desc.windows(2).all(|w| w[0] == w[1] + 1);
            !(is_straight || is_wheel)
        })
}

proptest! {
    #[test]
    fn five_card_order_ignores_card_order(cards in distinct_cards(5)) {
        let a = [cards[0], cards[1], cards[2], cards[3], cards[4]];
        let b = [cards[4], cards[2], cards[0], cards[3], cards[1]];
        let ea = evaluate_five(&a);
        let eb = evaluate_five(&b);
        prop_assert_eq!(ea, eb);
        prop_assert_eq!(ea.score.category(), ea.category);
    }

    #[test]
    fn seven_card_best_is_at_least_as_good_as_any_five(cards in distinct_cards(7)) {
        let best7 = best_of(&cards).unwrap();
        for i in 0..3 { for j in (i+1)..4 { for k in (j+1)..5 { for l in (k+1)..6 { for m in (l+1)..7 {
            let five = [cards[i], cards[j], cards[k], cards[l], cards[m]];
            prop_assert!(best7 >= evaluate_five(&five));
        }}}}}
    }

    #[test]
    fn hole_cards_and_board_evaluate_like_the_pooled_cards(cards in distinct_cards(7)) {
        let hole = HoleCards::try_new(cards[0], cards[1]).unwrap();
        let with_hole = best_hand(&hole, &cards[2..]).unwrap();
        prop_assert_eq!(with_hole, best_of(&cards).unwrap());
    }

    #[test]
    fn straight_ordering_respects_top_card(top_hi in 6u8..=14u8, top_lo in 5u8..=13u8) {
        prop_assume!(top_hi > top_lo);
        let e_hi = evaluate_five(&straight_cards(top_hi));
        let e_lo = evaluate_five(&straight_cards(top_lo));
        prop_assert_eq!(e_hi.category, Category::Straight);
        prop_assert_eq!(e_lo.category, Category::Straight);
        prop_assert!(e_hi > e_lo);
    }

    #[test]
    fn flush_kicker_ordering(a in flush_rank_set(), b in flush_rank_set()) {
        let e_a = evaluate_five(&[0, 1, 2, 3, 4].map(|i| Card::new(rank(a[i]), Suit::Hearts)));
        let e_b = evaluate_five(&[0, 1, 2, 3, 4].map(|i| Card::new(rank(b[i]), Suit::Spades)));
        prop_assert_eq!(e_a.category, Category::Flush);
        prop_assert_eq!(e_b.category, Category::Flush);
        // both lists are sorted high to low
        match a.cmp(&b) {
            Ordering::Greater => prop_assert!(e_a > e_b),
            Ordering::Less => prop_assert!(e_a < e_b),
            Ordering::Equal => prop_assert_eq!(e_a, e_b),
        }
    }
}
