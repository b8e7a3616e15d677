use holdem_engine::betting::Action;
use holdem_engine::config::GameConfig;
use holdem_engine::events::{ActionVerb, GameEvent, HandRecord};
use holdem_engine::game::{GameState, Stage};

fn mk_game(n: usize) -> GameState {
    GameState::new(GameConfig::default().with_seed(17), n).unwrap()
}

#[test]
fn history_records_blinds_and_actions() {
    let mut game = mk_game(2);
    game.start_new_hand().unwrap();

    let history = game.actions();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].verb, ActionVerb::SmallBlind);
    assert_eq!(history[0].added, 5);
    assert_eq!(history[0].stage, Stage::Preflop);
    assert_eq!(history[1].verb, ActionVerb::BigBlind);
    assert_eq!(history[1].added, 10);
    assert!(history.iter().all(|a| a.verb.is_forced()));

    game.apply_action(0, Action::Call).unwrap();
    let last = game.actions().last().unwrap();
    assert_eq!(last.verb, ActionVerb::Call);
    assert_eq!(last.added, 5);
    assert_eq!(last.total, 10);
    assert_eq!(game.players()[0].last_action(), Some(last));
}

#[test]
fn events_follow_the_hand() {
    let mut game = mk_game(3);
    game.start_new_hand().unwrap();
    let opening = game.drain_events();
    assert!(matches!(
        opening.as_slice(),
        [GameEvent::StateUpdated { hand_number: 1, stage: Stage::Preflop, current_player: Some(0), pot: 15 }]
    ));

    game.apply_action(0, Action::Call).unwrap();
    game.apply_action(1, Action::Call).unwrap();
    game.apply_action(2, Action::Check).unwrap();
    let events = game.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        GameEvent::StreetAdvanced { stage: Stage::Flop, community_cards, .. } if community_cards.len() == 3
    )));
    assert!(matches!(events.last(), Some(GameEvent::StateUpdated { stage: Stage::Flop, .. })));

    game.apply_action(1, Action::BetOrRaise(10)).unwrap();
    game.apply_action(2, Action::Fold).unwrap();
    game.apply_action(0, Action::Fold).unwrap();
    let events = game.drain_events();
    let Some(GameEvent::HandComplete { summary }) = events.last() else {
        panic!("hand should be complete: {events:?}");
    };
    assert_eq!(summary.winners(), vec![(1, 40)]);
    assert!(game.drain_events().is_empty());
}

#[test]
fn fold_out_record_keeps_every_dealt_hand() {
    let mut game = mk_game(3);
    game.set_player_name(2, "river_rat");
    game.start_new_hand().unwrap();
    game.apply_action(0, Action::Fold).unwrap();
    game.apply_action(1, Action::Fold).unwrap();

    let record = HandRecord::from_summary(game.last_summary().unwrap());
    assert_eq!(record.final_pot, 15);
    assert_eq!(record.winners, vec![(2, 15)]);
    for (seat, history) in record.seats.iter().enumerate() {
        assert_eq!(history.seat, seat);
        assert!(history.hole_cards.is_some(), "seat {seat} was dealt in");
        assert_eq!(history.hole_cards, game.players()[seat].hole_cards());
    }
    assert!(game.last_summary().unwrap().shown.is_empty(), "nothing was shown");
    // other seats still see only their own cards
    let view = game.get_public_view(Some(0));
    assert!(view.seats[1].hole_cards.is_none() && view.seats[2].hole_cards.is_none());
    assert_eq!(record.seats[2].name, "river_rat");
    assert_eq!(record.seats[2].result, 5);

    let line = serde_json::to_string(&record).unwrap();
    let back: HandRecord = serde_json::from_str(&line).unwrap();
    assert_eq!(back, record);
}
