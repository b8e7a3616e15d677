use holdem_engine::betting::Action;
use holdem_engine::config::GameConfig;
use holdem_engine::error::{EngineError, IllegalAction};
use holdem_engine::game::{Chips, GameState, Stage};

fn mk_game(stacks: &[Chips]) -> GameState {
    let mut g = GameState::with_stacks(GameConfig::default().with_seed(11), stacks).unwrap();
    g.start_new_hand().unwrap();
    g
}

/// Apply an action that must be refused and check nothing moved.
fn refused(g: &mut GameState, seat: usize, action: Action) -> EngineError {
    let before = g.get_public_view(None);
    let key = g.turn_key();
    let err = g.apply_action(seat, action).unwrap_err();
    assert_eq!(g.get_public_view(None), before, "{action:?} by {seat} changed the table");
    assert_eq!(g.turn_key(), key);
    err
}

#[test]
fn out_of_turn_is_refused() {
    let mut g = mk_game(&[1000, 1000, 1000]);
    let err = refused(&mut g, 1, Action::Call);
    assert_eq!(err, EngineError::OutOfTurn { seat: 1, expected: Some(0) });
    assert!(err.is_recoverable());
}

#[test]
fn check_facing_a_bet_is_refused() {
    let mut g = mk_game(&[1000, 1000, 1000]);
    let err = refused(&mut g, 0, Action::Check);
    assert_eq!(
        err,
        EngineError::IllegalAction {
            seat: 0,
            reason: IllegalAction::CannotCheckFacingBet { to_call: 10 }
        }
    );
}

#[test]
fn raise_below_minimum_is_refused() {
    let mut g = mk_game(&[1000, 1000, 1000]);
    let err = refused(&mut g, 0, Action::BetOrRaise(15));
    assert_eq!(
        err,
        EngineError::IllegalAction {
            seat: 0,
            reason: IllegalAction::BelowMinimumRaise { min_to: 20, got: 15 }
        }
    );
    let err = refused(&mut g, 0, Action::BetOrRaise(10));
    assert!(matches!(
        err,
        EngineError::IllegalAction { reason: IllegalAction::TargetTooLow { .. }, .. }
    ));
}

#[test]
fn unknown_seat_and_idle_table_are_refused() {
    let mut g = mk_game(&[1000, 1000, 1000]);
    let err = refused(&mut g, 7, Action::Fold);
    assert!(matches!(err, EngineError::IllegalAction { reason: IllegalAction::UnknownSeat, .. }));

    g.apply_action(0, Action::Fold).unwrap();
    g.apply_action(1, Action::Fold).unwrap();
    assert_eq!(g.stage(), Stage::HandComplete);
    let err = refused(&mut g, 2, Action::Check);
    assert!(matches!(
        err,
        EngineError::IllegalAction { reason: IllegalAction::NoBettingInProgress, .. }
    ));
}

#[test]
fn short_all_in_does_not_reopen_the_raise() {
    let mut g = mk_game(&[1000, 1000, 55]);
    g.apply_action(0, Action::BetOrRaise(40)).unwrap();
    g.apply_action(1, Action::Call).unwrap();
    // the big blind shoves 55: 15 over the bet, short of a full raise of 30
    let result = g.apply_action(2, Action::BetOrRaise(500)).unwrap();
    assert!(result.record.all_in);
    assert_eq!(g.current_bet(), 55);
    assert_eq!(g.last_raise_size(), 30);

    let legal = g.legal_actions(0).unwrap();
    assert_eq!(legal.call_amount, Some(15));
    assert_eq!(legal.min_raise_to, None);
    let err = refused(&mut g, 0, Action::BetOrRaise(200));
    assert_eq!(
        err,
        EngineError::IllegalAction { seat: 0, reason: IllegalAction::ActionNotReopened }
    );

    g.apply_action(0, Action::Call).unwrap();
    g.apply_action(1, Action::Call).unwrap();
    assert_eq!(g.stage(), Stage::Flop);
    assert_eq!(g.pot(), 165);
}

#[test]
fn oversized_bet_is_capped_to_the_stack() {
    let mut g = mk_game(&[1000, 1000, 1000]);
    let result = g.apply_action(0, Action::BetOrRaise(1_000_000)).unwrap();
    assert_eq!(result.record.total, 1000);
    assert!(result.record.all_in);
    assert_eq!(g.players()[0].stack(), 0);
    assert!(g.check_conservation().is_ok());
}

#[test]
fn spectators_see_no_hole_cards() {
    let g = mk_game(&[1000, 1000, 1000]);
    let view = g.get_public_view(None);
    assert!(view.seats.iter().all(|s| s.hole_cards.is_none()));
    assert!(view.legal_actions.is_none());

    let own = g.get_public_view(Some(0));
    assert!(own.seats[0].hole_cards.is_some());
    assert!(own.seats[1].hole_cards.is_none());
    assert!(own.is_viewer_turn());
    assert_eq!(own.legal_actions, g.legal_actions(0));
}
