use holdem_engine::betting::Action;
use holdem_engine::config::GameConfig;
use holdem_engine::error::EngineError;
use holdem_engine::game::{Chips, GameState, PlayerStatus, Stage};
use holdem_engine::settlement::{build_pot_layers, Stake};
use holdem_engine::view::LegalActions;
use proptest::prelude::*;

fn any_stacks() -> impl Strategy<Value = Vec<Chips>> {
    prop::collection::vec(1u64..=400, 2..=6)
}

fn any_moves() -> impl Strategy<Value = Vec<(u8, Chips)>> {
    prop::collection::vec((0u8..8, 0u64..=500), 1..250)
}

/// Turn a random choice into an action the seat is allowed to take.
fn pick(legal: &LegalActions, choice: u8, amount: Chips) -> Action {
    let passive = if legal.may_check { Action::Check } else { Action::Call };
    match (choice, legal.min_raise_to, legal.max_raise_to) {
        (0, _, _) => Action::Fold,
        (5..=7, Some(min), Some(max)) => Action::BetOrRaise(amount.clamp(min, max)),
        _ => passive,
    }
}

fn stack_sum(g: &GameState) -> Chips {
    g.players().iter().map(|p| p.stack()).sum()
}

proptest! {
    #[test]
    fn prop_chips_are_conserved_and_turns_are_enforced(
        stacks in any_stacks(),
        moves in any_moves(),
        seed in any::<u64>(),
    ) {
        let total: Chips = stacks.iter().sum();
        let config = GameConfig::default().with_seed(seed).with_escalation(Some(3));
        let mut g = GameState::with_stacks(config, &stacks).unwrap();
        let n = stacks.len();

        for (choice, amount) in moves {
            if g.is_game_over() {
                break;
            }
            if g.stage() == Stage::HandComplete {
                g.start_new_hand().unwrap();
                prop_assert!(g.check_conservation().is_ok());
                continue;
            }

            let seat = g.current_player().expect("a betting stage always has a seat on the clock");
            prop_assert_eq!(g.players()[seat].status(), PlayerStatus::Active);

            let other = (seat + 1) % n;
            let key = g.turn_key();
            let err = g.apply_action(other, Action::Fold).unwrap_err();
            prop_assert_eq!(err, EngineError::OutOfTurn { seat: other, expected: Some(seat) });
            prop_assert_eq!(g.turn_key(), key);

            let legal = g.legal_actions(seat).expect("seat on the clock has options");
            let result = g.apply_action(seat, pick(&legal, choice, amount));
            prop_assert!(result.is_ok(), "legal pick refused: {:?}", result);

            prop_assert!(g.check_conservation().is_ok());
            prop_assert_eq!(stack_sum(&g) + g.pot(), total);
            prop_assert_eq!(g.chip_total(), total);

            if let Some(summary) = result.ok().and_then(|r| r.hand_complete().cloned()) {
                let contributed: Chips = summary.seats.iter().map(|s| s.contributed).sum();
                prop_assert_eq!(summary.total_pot(), contributed);
                prop_assert_eq!(summary.net_deltas().iter().sum::<i64>(), 0);
                prop_assert_eq!(g.pot(), 0);
            }
        }
    }

    #[test]
    fn prop_passive_hands_finish_within_four_rounds(
        stacks in any_stacks(),
        seed in any::<u64>(),
    ) {
        let mut g = GameState::with_stacks(GameConfig::default().with_seed(seed), &stacks).unwrap();
        g.start_new_hand().unwrap();
        let mut steps = 0;
        while let Some(seat) = g.current_player() {
            let legal = g.legal_actions(seat).unwrap();
            let action = if legal.may_check { Action::Check } else { Action::Call };
            g.apply_action(seat, action).unwrap();
            steps += 1;
            prop_assert!(steps <= 4 * stacks.len(), "hand did not terminate");
        }
        prop_assert_eq!(g.stage(), Stage::HandComplete);
        let summary = g.last_summary().expect("hand finished");
        prop_assert_eq!(summary.community_cards.len(), 5);
    }

    #[test]
    fn prop_pot_layers_cover_every_chip(
        raw in prop::collection::vec((0u64..=300, any::<bool>()), 2..=10),
    ) {
        let mut stakes: Vec<Stake> = raw
            .iter()
            .enumerate()
            .map(|(seat, &(contributed, folded))| Stake { seat, contributed, folded })
            .collect();
        // someone has to be live for the pot to have a home
        stakes[0].folded = false;
        stakes[0].contributed = stakes[0].contributed.max(1);

        let layers = build_pot_layers(&stakes);
        let committed: Chips = stakes.iter().map(|s| s.contributed).sum();
        let layered: Chips = layers.iter().map(|l| l.amount).sum();
        prop_assert_eq!(layered, committed);

        for pair in layers.windows(2) {
            prop_assert!(pair[0].cap < pair[1].cap);
            prop_assert_eq!(pair[0].cap, pair[1].floor);
            prop_assert!(pair[1].eligible.iter().all(|s| pair[0].eligible.contains(s)));
        }
        for layer in &layers {
            prop_assert!(!layer.eligible.is_empty());
            prop_assert!(layer.eligible.iter().all(|&s| !stakes[s].folded));
        }
    }
}
