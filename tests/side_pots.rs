use holdem_engine::betting::Action;
use holdem_engine::cards::parse_cards;
use holdem_engine::config::GameConfig;
use holdem_engine::deck::Deck;
use holdem_engine::events::Resolution;
use holdem_engine::game::{Chips, GameState, PlayerStatus, Stage};
use holdem_engine::settlement::{build_pot_layers, Stake};

fn mk_game(stacks: &[Chips]) -> GameState {
    GameState::with_stacks(GameConfig::default().with_escalation(None), stacks).unwrap()
}

fn deck(cards: &str) -> Deck {
    Deck::stacked(parse_cards(cards).unwrap())
}

fn stacks(g: &GameState) -> Vec<Chips> {
    g.players().iter().map(|p| p.stack()).collect()
}

#[test]
fn three_all_in_levels_make_three_pots() {
    let mut g = mk_game(&[300, 100, 200]);
    // deal order: seat 1, seat 2, seat 0, twice; then the board
    g.start_new_hand_with_deck(deck("As Ks 7c Ah Kh 2d 3c 8d 9h Js 4c")).unwrap();

    g.apply_action(0, Action::BetOrRaise(300)).unwrap();
    g.apply_action(1, Action::Call).unwrap();
    let result = g.apply_action(2, Action::Call).unwrap();

    let summary = result.hand_complete().expect("everyone is all-in");
    assert_eq!(summary.resolution, Resolution::Showdown);
    assert_eq!(summary.community_cards.len(), 5);

    let amounts: Vec<Chips> = summary.pots.iter().map(|p| p.amount).collect();
    assert_eq!(amounts, vec![300, 200, 100]);
    assert_eq!(summary.pots[0].eligible, vec![0, 1, 2]);
    assert_eq!(summary.pots[0].shares, vec![(1, 300)], "main pot should go to best hand");
    assert_eq!(summary.pots[1].eligible, vec![0, 2]);
    assert_eq!(summary.pots[1].shares, vec![(2, 200)], "side pot should go to next best hand");
    assert_eq!(summary.pots[2].shares, vec![(0, 100)], "uncalled chips go back to the raiser");

    assert_eq!(stacks(&g), vec![100, 300, 200]);
    assert_eq!(summary.net_deltas(), vec![-200, 200, 0]);
    assert!(g.check_conservation().is_ok());
}

#[test]
fn big_blind_calling_its_whole_stack_is_all_in() {
    let mut g = mk_game(&[1000, 1500, 1000, 2000]);
    g.start_new_hand().unwrap();
    g.apply_action(3, Action::BetOrRaise(1000)).unwrap();
    g.apply_action(0, Action::Fold).unwrap();
    g.apply_action(1, Action::Call).unwrap();

    assert_eq!(g.players()[2].stack(), 990);
    assert_eq!(g.players()[2].current_bet(), 10);
    let result = g.apply_action(2, Action::Call).unwrap();
    assert_eq!(result.record.added, 990);
    assert_eq!(result.record.total, 1000);
    assert!(result.record.all_in);

    let bb = &g.players()[2];
    assert_eq!(bb.stack(), 0);
    assert_eq!(bb.total_contributed(), 1000);
    assert_eq!(bb.status(), PlayerStatus::AllIn);
    assert_eq!(g.stage(), Stage::Flop);
    assert_eq!(g.pot(), 3000);
}

#[test]
fn folded_chips_stay_in_the_pot_they_were_put_in() {
    let mut g = mk_game(&[1000, 1000, 30]);
    g.start_new_hand_with_deck(deck("7c As Kc 2d Ah Kd 3h 8s 9d Jc 4s")).unwrap();

    g.apply_action(0, Action::BetOrRaise(100)).unwrap();
    g.apply_action(1, Action::Call).unwrap();
    let result = g.apply_action(2, Action::Call).unwrap();
    assert!(result.record.all_in);
    assert_eq!(g.stage(), Stage::Flop);

    assert_eq!(g.current_player(), Some(1));
    g.apply_action(1, Action::BetOrRaise(200)).unwrap();
    // the all-in seat is skipped
    assert_eq!(g.current_player(), Some(0));
    let result = g.apply_action(0, Action::Fold).unwrap();

    let summary = result.hand_complete().expect("no one left to act");
    assert_eq!(summary.resolution, Resolution::Showdown);
    assert_eq!(summary.pots.len(), 2);
    assert_eq!(summary.pots[0].amount, 90);
    assert_eq!(summary.pots[0].eligible, vec![1, 2]);
    assert_eq!(summary.pots[0].shares, vec![(2, 90)]);
    assert_eq!(summary.pots[1].amount, 340);
    assert_eq!(summary.pots[1].eligible, vec![1]);
    assert_eq!(summary.pots[1].shares, vec![(1, 340)]);

    assert_eq!(stacks(&g), vec![900, 1040, 90]);
    assert_eq!(g.players()[0].status(), PlayerStatus::Folded);
}

#[test]
fn odd_chip_goes_to_first_winner_left_of_dealer() {
    let mut g = mk_game(&[1000, 1000, 1000]);
    // royal flush on board; every hand plays the board
    g.start_new_hand_with_deck(deck("2c 4d 6h 3c 5d 7h As Ks Qs Js Ts")).unwrap();

    g.apply_action(0, Action::Call).unwrap();
    g.apply_action(1, Action::Fold).unwrap();
    g.apply_action(2, Action::Check).unwrap();
    for _ in 0..3 {
        g.apply_action(2, Action::Check).unwrap();
        g.apply_action(0, Action::Check).unwrap();
    }

    assert_eq!(g.stage(), Stage::HandComplete);
    let summary = g.last_summary().unwrap();
    assert_eq!(summary.total_pot(), 25);
    // seat 1 is first left of the dealer but folded; seat 2 is next
    assert_eq!(summary.pots[0].shares, vec![(2, 13), (0, 12)]);
    assert_eq!(stacks(&g), vec![1002, 995, 1003]);
}

#[test]
fn layers_account_for_every_chip() {
    let stakes = [
        Stake { seat: 0, contributed: 120, folded: true },
        Stake { seat: 1, contributed: 40, folded: false },
        Stake { seat: 2, contributed: 100, folded: false },
        Stake { seat: 3, contributed: 0, folded: true },
    ];
    let layers = build_pot_layers(&stakes);
    assert_eq!(layers.len(), 2);
    assert_eq!(layers[0].amount, 120);
    assert_eq!(layers[0].eligible, vec![1, 2]);
    // the folded seat's chips above the top level land in the last layer
    assert_eq!(layers[1].amount, 140);
    assert_eq!(layers[1].eligible, vec![2]);
    let total: Chips = layers.iter().map(|l| l.amount).sum();
    assert_eq!(total, 260);
}
