use holdem_engine::agents::{
    AgentKind, AgentTable, BotAgent, BotProfile, Difficulty, PlayerAgent, ScriptedAgent,
};
use holdem_engine::betting::Action;
use holdem_engine::config::GameConfig;
use holdem_engine::game::{GameState, NewHand, PlayerStatus};

fn mk_game(n: usize, seed: u64) -> GameState {
    GameState::new(GameConfig::default().with_seed(seed).with_starting_stack(300), n).unwrap()
}

fn bot(difficulty: Difficulty, seed: u64) -> Box<dyn PlayerAgent> {
    Box::new(BotAgent::new(BotProfile::for_difficulty(difficulty).with_seed(seed)))
}

#[test]
fn heads_up_small_blind_bot_does_not_fold_to_the_blind() {
    for seed in 0..10 {
        let mut g = mk_game(2, seed);
        g.start_new_hand().unwrap();
        let seat = g.current_player().unwrap();
        let mut agent = BotAgent::new(BotProfile::default().with_seed(seed));
        assert_eq!(agent.kind(), AgentKind::Bot);

        let action = agent.decide(&g.get_public_view(Some(seat)));
        g.apply_action(seat, action).unwrap();
        assert_ne!(g.players()[seat].status(), PlayerStatus::Folded, "seed {seed}");
        assert_ne!(g.current_player(), Some(seat));
    }
}

#[test]
fn bot_table_plays_many_hands_without_leaking_chips() {
    let mut g = mk_game(4, 21);
    let mut table = AgentTable::for_seats(4);
    let tiers = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard, Difficulty::Expert];
    for (seat, tier) in tiers.into_iter().enumerate() {
        table.set_agent(seat, Some(bot(tier, seat as u64 + 100)));
    }
    assert_eq!(format!("{table:?}"), "AgentTable(BBBB)");

    for _ in 0..200 {
        match g.start_new_hand().unwrap() {
            NewHand::GameOver { winner } => {
                let winner = winner.expect("someone holds the chips");
                assert_eq!(g.players()[winner].stack(), 1200);
                break;
            }
            NewHand::Started { hand_number, .. } => {
                // blinds alone can put everyone all-in, finishing the hand on the deal
                table.play_hand(&mut g).unwrap();
                let summary = g.last_summary().expect("all seats are bots");
                assert_eq!(summary.hand_number, hand_number);
                assert_eq!(summary.net_deltas().iter().sum::<i64>(), 0);
            }
        }
        assert!(g.check_conservation().is_ok());
        let held: u64 = g.players().iter().map(|p| p.stack()).sum();
        assert_eq!(held, 1200);
    }
}

#[test]
fn scripted_seat_plays_its_queue_then_the_safe_default() {
    let mut g = mk_game(3, 5);
    g.start_new_hand().unwrap();
    let mut table = AgentTable::for_seats(3);
    table.set_agent(0, Some(Box::new(ScriptedAgent::new([Action::Call]))));
    table.set_agent(1, Some(Box::new(ScriptedAgent::new([Action::Call]))));
    table.set_agent(2, Some(Box::new(ScriptedAgent::default())));

    // everyone limps, then the empty queues check the hand down
    let summary = table.play_hand(&mut g).unwrap().unwrap();
    assert_eq!(summary.total_pot(), 30);
    assert_eq!(summary.community_cards.len(), 5);
    assert_eq!(summary.shown.len(), 3);
}
