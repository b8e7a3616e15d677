// Game engine API boundary. Agents, the session layer and any transport drive
// a game through this trait instead of reaching into `GameState` directly.

use crate::betting::{Action, ActionResult};
use crate::error::EngineError;
use crate::events::GameEvent;
use crate::game::{GameState, NewHand, Stage};
use crate::view::{LegalActions, PublicView};

pub trait GameEngine {
    // Hand lifecycle
    fn start_new_hand(&mut self) -> Result<NewHand, EngineError>;

    // Player actions
    fn apply_action(&mut self, seat: usize, action: Action) -> Result<ActionResult, EngineError>;

    // Queries
    fn public_view(&self, viewer: Option<usize>) -> PublicView;
    fn legal_actions(&self, seat: usize) -> Option<LegalActions>;
    fn current_player(&self) -> Option<usize>;
    fn stage(&self) -> Stage;
    fn num_players(&self) -> usize;
    fn is_game_over(&self) -> bool;

    // Notifications
    fn drain_events(&mut self) -> Vec<GameEvent>;
}

impl GameEngine for GameState {
    fn start_new_hand(&mut self) -> Result<NewHand, EngineError> {
        self.start_new_hand()
    }

    fn apply_action(&mut self, seat: usize, action: Action) -> Result<ActionResult, EngineError> {
        self.apply_action(seat, action)
    }

    fn public_view(&self, viewer: Option<usize>) -> PublicView {
        self.get_public_view(viewer)
    }
    fn legal_actions(&self, seat: usize) -> Option<LegalActions> {
        self.legal_actions(seat)
    }
    fn current_player(&self) -> Option<usize> {
        self.current_player()
    }
    fn stage(&self) -> Stage {
        self.stage()
    }
    fn num_players(&self) -> usize {
        self.players().len()
    }
    fn is_game_over(&self) -> bool {
        self.is_game_over()
    }

    fn drain_events(&mut self) -> Vec<GameEvent> {
        self.drain_events()
    }
}
