//! The authoritative per-game state and the hand lifecycle.
//!
//! Betting lives in [`crate::betting`], payouts in [`crate::settlement`]; both
//! extend [`GameState`] with further `impl` blocks.

use crate::blinds::{self, BlindLevel, BlindSchedule, ButtonPositions};
use crate::config::{ConfigError, GameConfig};
use crate::deck::Deck;
use crate::error::EngineError;
use crate::events::{ActionRecord, ActionVerb, GameEvent, HandSummary};
use crate::hand::{Board, HoleCards};
use crate::turn_order::TurnOrder;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

pub type Chips = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
    HandComplete,
}

impl Stage {
    /// Whether players may act in this stage.
    pub fn is_betting(self) -> bool {
        matches!(self, Stage::Preflop | Stage::Flop | Stage::Turn | Stage::River)
    }

    /// The stage entered when the current betting street closes.
    pub fn next_street(self) -> Option<Stage> {
        match self {
            Stage::Preflop => Some(Stage::Flop),
            Stage::Flop => Some(Stage::Turn),
            Stage::Turn => Some(Stage::River),
            Stage::River => Some(Stage::Showdown),
            Stage::Showdown | Stage::HandComplete => None,
        }
    }

    /// Community cards on the table once this stage is reached.
    pub fn community_len(self) -> usize {
        match self {
            Stage::Preflop | Stage::HandComplete => 0,
            Stage::Flop => 3,
            Stage::Turn => 4,
            Stage::River | Stage::Showdown => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerStatus {
    Active,
    Folded,
    AllIn,
    Eliminated,
}

impl PlayerStatus {
    pub fn label(self) -> &'static str {
        match self {
            PlayerStatus::Active => "active",
            PlayerStatus::Folded => "folded",
            PlayerStatus::AllIn => "all-in",
            PlayerStatus::Eliminated => "eliminated",
        }
    }

    /// Still holding a claim on the pot.
    pub fn in_hand(self) -> bool {
        matches!(self, PlayerStatus::Active | PlayerStatus::AllIn)
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    pub(crate) name: String,
    pub(crate) stack: Chips,
    pub(crate) current_bet: Chips,
    pub(crate) total_contributed: Chips,
    pub(crate) status: PlayerStatus,
    pub(crate) has_acted: bool,
    pub(crate) hole_cards: Option<HoleCards>,
    pub(crate) last_action: Option<ActionRecord>,
}

impl Player {
    fn seated(name: String, stack: Chips) -> Self {
        Self {
            name,
            stack,
            current_bet: 0,
            total_contributed: 0,
            status: PlayerStatus::Active,
            has_acted: false,
            hole_cards: None,
            last_action: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Chips not committed this hand.
    pub fn stack(&self) -> Chips {
        self.stack
    }

    /// Chips committed on the current street.
    pub fn current_bet(&self) -> Chips {
        self.current_bet
    }

    /// Chips committed during the whole hand.
    pub fn total_contributed(&self) -> Chips {
        self.total_contributed
    }

    pub fn status(&self) -> PlayerStatus {
        self.status
    }

    pub fn has_acted(&self) -> bool {
        self.has_acted
    }

    pub fn hole_cards(&self) -> Option<HoleCards> {
        self.hole_cards
    }

    pub fn last_action(&self) -> Option<&ActionRecord> {
        self.last_action.as_ref()
    }

    /// Most this seat can have in front of it on this street.
    pub(crate) fn entitlement(&self) -> Chips {
        self.stack + self.current_bet
    }
}

/// Outcome of [`GameState::start_new_hand`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewHand {
    Started { hand_number: u64, buttons: ButtonPositions, blinds: BlindLevel },
    GameOver { winner: Option<usize> },
}

/// Identifies one pending decision; it changes with every applied action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TurnKey {
    pub hand_number: u64,
    pub action_count: usize,
}

/// One game: fixed seats, the hand in progress, and what has happened so far.
#[derive(Debug)]
pub struct GameState {
    pub(crate) config: GameConfig,
    schedule: BlindSchedule,
    pub(crate) players: Vec<Player>,
    pub(crate) stage: Stage,
    pub(crate) community_cards: Board,
    pub(crate) current_bet: Chips,
    pub(crate) last_raise_size: Chips,
    pub(crate) pot: Chips,
    pub(crate) dealer_index: usize,
    pub(crate) small_blind_index: usize,
    pub(crate) big_blind_index: usize,
    pub(crate) current_player_index: Option<usize>,
    pub(crate) deck: Deck,
    rng: ChaCha8Rng,
    pub(crate) blinds: BlindLevel,
    pub(crate) hand_number: u64,
    pub(crate) hands_completed: u64,
    chip_total: Chips,
    pub(crate) hand_start_stacks: Vec<Chips>,
    pub(crate) actions: Vec<ActionRecord>,
    pub(crate) events: Vec<GameEvent>,
    pub(crate) last_summary: Option<HandSummary>,
    previous_dealer: Option<usize>,
    game_over: bool,
}

impl GameState {
    /// `seats` players, each starting with `config.starting_stack`.
    pub fn new(config: GameConfig, seats: usize) -> Result<Self, ConfigError> {
        let stacks = vec![config.starting_stack; seats];
        Self::with_stacks(config, &stacks)
    }

    /// One seat per entry in `stacks`, in seat order.
    pub fn with_stacks(config: GameConfig, stacks: &[Chips]) -> Result<Self, ConfigError> {
        config.validate_seats(stacks)?;
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::seed_from_u64(rand::rng().random()),
        };
        let players: Vec<Player> = stacks
            .iter()
            .enumerate()
            .map(|(i, &stack)| Player::seated(format!("P{}", i + 1), stack))
            .collect();
        let schedule = BlindSchedule::from_config(&config);
        Ok(Self {
            blinds: schedule.level_for(0),
            schedule,
            chip_total: stacks.iter().sum(),
            hand_start_stacks: stacks.to_vec(),
            players,
            stage: Stage::HandComplete,
            community_cards: Board::new(),
            current_bet: 0,
            last_raise_size: config.big_blind,
            pot: 0,
            dealer_index: 0,
            small_blind_index: 0,
            big_blind_index: 0,
            current_player_index: None,
            deck: Deck::standard(),
            rng,
            hand_number: 0,
            hands_completed: 0,
            actions: Vec::new(),
            events: Vec::new(),
            last_summary: None,
            previous_dealer: None,
            game_over: false,
            config,
        })
    }

    /// Rename a seat; names only appear in views and records.
    pub fn set_player_name(&mut self, seat: usize, name: impl Into<String>) {
        if let Some(p) = self.players.get_mut(seat) {
            p.name = name.into();
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn community_cards(&self) -> &Board {
        &self.community_cards
    }

    /// Highest street contribution any seat has posted.
    pub fn current_bet(&self) -> Chips {
        self.current_bet
    }

    /// Size of the last full raise on this street; the minimum raise increment.
    pub fn last_raise_size(&self) -> Chips {
        self.last_raise_size
    }

    /// Chips committed this hand and not yet paid out.
    pub fn pot(&self) -> Chips {
        self.pot
    }

    pub fn dealer_index(&self) -> usize {
        self.dealer_index
    }

    pub fn small_blind_index(&self) -> usize {
        self.small_blind_index
    }

    pub fn big_blind_index(&self) -> usize {
        self.big_blind_index
    }

    /// Seat entitled to act, or `None` when nobody can.
    pub fn current_player(&self) -> Option<usize> {
        self.current_player_index
    }

    pub fn blinds(&self) -> BlindLevel {
        self.blinds
    }

    /// Number of the hand in progress (or last played); the first hand is 1.
    pub fn hand_number(&self) -> u64 {
        self.hand_number
    }

    pub fn hands_completed(&self) -> u64 {
        self.hands_completed
    }

    /// Every chip at the table; constant for the lifetime of the game.
    pub fn chip_total(&self) -> Chips {
        self.chip_total
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Actions of the hand in progress (or the last hand), blinds included.
    pub fn actions(&self) -> &[ActionRecord] {
        &self.actions
    }

    pub fn last_summary(&self) -> Option<&HandSummary> {
        self.last_summary.as_ref()
    }

    pub fn turn_key(&self) -> TurnKey {
        TurnKey { hand_number: self.hand_number, action_count: self.actions.len() }
    }

    /// Hand events buffered since the last call, oldest first.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Seats still holding a claim on the pot.
    pub(crate) fn non_folded_count(&self) -> usize {
        self.players.iter().filter(|p| p.status.in_hand()).count()
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub(crate) fn emit_state_updated(&mut self) {
        self.emit(GameEvent::StateUpdated {
            hand_number: self.hand_number,
            stage: self.stage,
            current_player: self.current_player_index,
            pot: self.pot,
        });
    }

    /// Deal a new hand from a freshly shuffled deck.
    pub fn start_new_hand(&mut self) -> Result<NewHand, EngineError> {
        let deck = Deck::shuffled(&mut self.rng);
        self.start_new_hand_with_deck(deck)
    }

    /// Deal a new hand from `deck`.
    ///
    /// Hole cards are drawn one at a time, two passes, starting with the first
    /// seat left of the dealer; community cards follow without burns.
    pub fn start_new_hand_with_deck(&mut self, deck: Deck) -> Result<NewHand, EngineError> {
        if self.stage != Stage::HandComplete {
            return Err(EngineError::IllegalStateTransition {
                from: self.stage,
                attempted: "start a new hand",
            });
        }
        if self.game_over {
            return Err(EngineError::IllegalStateTransition {
                from: self.stage,
                attempted: "start a hand after the game ended",
            });
        }
        let funded = self.players.iter().filter(|p| p.stack > 0).count();
        if deck.len() < funded * 2 + Board::MAX_CARDS {
            return Err(EngineError::IllegalStateTransition {
                from: self.stage,
                attempted: "deal from a short deck",
            });
        }
        if let Some(card) = deck.repeated_card() {
            tracing::warn!(%card, "deck refused: card repeated");
            return Err(EngineError::IllegalStateTransition {
                from: self.stage,
                attempted: "deal from a deck with repeated cards",
            });
        }

        self.eliminate_busted();
        let Some(buttons) = blinds::rotate(&self.players, self.previous_dealer) else {
            let winner = self.players.iter().position(|p| p.stack > 0);
            self.game_over = true;
            tracing::info!(hands = self.hands_completed, ?winner, "game over");
            self.emit(GameEvent::GameOver { winner });
            return Ok(NewHand::GameOver { winner });
        };

        self.blinds = self.schedule.level_for(self.hands_completed);
        self.hand_number += 1;
        self.previous_dealer = Some(buttons.dealer);
        self.dealer_index = buttons.dealer;
        self.small_blind_index = buttons.small_blind;
        self.big_blind_index = buttons.big_blind;
        self.reset_for_hand(deck);
        if let Err(err) = self.deal_hole_cards() {
            return Err(self.abort_hand(err));
        }
        tracing::info!(
            hand = self.hand_number,
            dealer = buttons.dealer,
            small_blind = buttons.small_blind,
            big_blind = buttons.big_blind,
            sb = self.blinds.small,
            bb = self.blinds.big,
            "hand started"
        );

        self.post_blind(buttons.small_blind, self.blinds.small, ActionVerb::SmallBlind);
        self.post_blind(buttons.big_blind, self.blinds.big, ActionVerb::BigBlind);
        self.verify_conservation()?;
        self.progress(None)?;
        self.emit_state_updated();
        Ok(NewHand::Started { hand_number: self.hand_number, buttons, blinds: self.blinds })
    }

    fn eliminate_busted(&mut self) {
        let hand_number = self.hand_number;
        let mut busted = Vec::new();
        for (seat, p) in self.players.iter_mut().enumerate() {
            if p.stack == 0 && p.status != PlayerStatus::Eliminated {
                p.status = PlayerStatus::Eliminated;
                busted.push(seat);
            }
        }
        for seat in busted {
            tracing::info!(seat, hand = hand_number, "player eliminated");
            self.emit(GameEvent::PlayerEliminated { seat, hand_number });
        }
    }

    fn reset_for_hand(&mut self, deck: Deck) {
        for p in &mut self.players {
            p.current_bet = 0;
            p.total_contributed = 0;
            p.has_acted = false;
            p.hole_cards = None;
            p.last_action = None;
            if p.status != PlayerStatus::Eliminated {
                p.status = PlayerStatus::Active;
            }
        }
        self.hand_start_stacks = self.players.iter().map(|p| p.stack).collect();
        self.deck = deck;
        self.community_cards.clear();
        self.stage = Stage::Preflop;
        self.pot = 0;
        self.current_bet = 0;
        self.last_raise_size = self.blinds.big;
        self.current_player_index = None;
        self.actions.clear();
    }

    fn deal_hole_cards(&mut self) -> Result<(), EngineError> {
        let misdeal = EngineError::IllegalStateTransition {
            from: Stage::Preflop,
            attempted: "deal a seat two distinct hole cards",
        };
        let order: Vec<usize> = TurnOrder::new(&self.players)
            .clockwise_after(self.dealer_index)
            .filter(|&i| self.players[i].status == PlayerStatus::Active)
            .collect();
        let mut first = vec![None; self.players.len()];
        for &seat in &order {
            first[seat] = self.deck.draw();
        }
        for &seat in &order {
            let (Some(a), Some(b)) = (first[seat], self.deck.draw()) else {
                return Err(misdeal);
            };
            let hole = HoleCards::try_new(a, b).map_err(|_| misdeal.clone())?;
            self.players[seat].hole_cards = Some(hole);
        }
        Ok(())
    }

    /// Forced contribution; short stacks post what they have and are all-in.
    /// Blinds do not count as having acted, so the big blind keeps its option.
    fn post_blind(&mut self, seat: usize, amount: Chips, verb: ActionVerb) {
        let stage = self.stage;
        let p = &mut self.players[seat];
        let paid = p.stack.min(amount);
        p.stack -= paid;
        p.current_bet += paid;
        p.total_contributed += paid;
        if p.stack == 0 {
            p.status = PlayerStatus::AllIn;
        }
        let record = ActionRecord {
            seat,
            stage,
            verb,
            added: paid,
            total: p.current_bet,
            all_in: p.stack == 0,
        };
        p.last_action = Some(record.clone());
        self.pot += paid;
        self.current_bet = self.current_bet.max(self.players[seat].current_bet);
        self.actions.push(record);
    }

    /// Zero-sum check: stacks plus chips committed this hand equal every chip at the table.
    pub fn check_conservation(&self) -> Result<(), EngineError> {
        let stacks: Chips = self.players.iter().map(|p| p.stack).sum();
        let committed = self.committed();
        if stacks + committed != self.chip_total || self.pot != committed {
            return Err(EngineError::ChipConservationViolation {
                hand_number: self.hand_number,
                expected: self.chip_total,
                actual: stacks + self.pot,
            });
        }
        Ok(())
    }

    pub(crate) fn committed(&self) -> Chips {
        self.players.iter().map(|p| p.total_contributed).sum()
    }

    /// Like [`check_conservation`](Self::check_conservation), but aborts the hand on failure.
    pub(crate) fn verify_conservation(&mut self) -> Result<(), EngineError> {
        if let Err(err) = self.check_conservation() {
            return Err(self.abort_hand(err));
        }
        Ok(())
    }

    /// Abandon the hand in progress: every seat takes back what it committed
    /// and the game waits for the next deal. Returns `err` for propagation.
    pub(crate) fn abort_hand(&mut self, err: EngineError) -> EngineError {
        tracing::error!(hand = self.hand_number, stage = ?self.stage, error = %err, "aborting hand");
        for p in &mut self.players {
            p.stack += p.total_contributed;
            p.total_contributed = 0;
            p.current_bet = 0;
        }
        self.pot = 0;
        self.current_bet = 0;
        self.current_player_index = None;
        self.stage = Stage::HandComplete;
        self.emit_state_updated();
        err
    }
}
