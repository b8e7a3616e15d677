//! Hosting many games at once.
//!
//! Each game lives behind a [`GameHandle`]: one async mutex around its
//! [`GameState`] so every mutation is serialized, a broadcast channel for
//! [`GameEvent`]s, and a pause switch. Games never share mutable state, so
//! different games proceed fully in parallel. [`Autopilot`] plays the seats
//! that have agents, giving each decision a time budget.

use crate::agents::{safe_default, PlayerAgent};
use crate::betting::{Action, ActionResult};
use crate::config::{ConfigError, GameConfig, SessionConfig};
use crate::error::EngineError;
use crate::events::GameEvent;
use crate::game::{Chips, GameState, NewHand, Stage, TurnKey};
use crate::view::PublicView;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, watch, Mutex, Notify};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub u64);

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no game with id {0}")]
    UnknownGame(GameId),
    #[error("game {0} has been closed")]
    Closed(GameId),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Running,
    Paused,
}

/// Shared handle to one hosted game.
pub struct GameHandle {
    id: GameId,
    config: SessionConfig,
    state: Mutex<GameState>,
    events: broadcast::Sender<GameEvent>,
    mode: watch::Sender<RunMode>,
    turn: Notify,
    cancel: CancellationToken,
}

impl fmt::Debug for GameHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameHandle")
            .field("id", &self.id)
            .field("mode", &*self.mode.borrow())
            .field("closed", &self.cancel.is_cancelled())
            .finish()
    }
}

impl GameHandle {
    fn new(id: GameId, state: GameState, config: SessionConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_buffer.max(1));
        let (mode, _) = watch::channel(RunMode::Running);
        Self {
            id,
            config,
            state: Mutex::new(state),
            events,
            mode,
            turn: Notify::new(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.events.subscribe()
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn mode(&self) -> RunMode {
        *self.mode.borrow()
    }

    /// Suspend autonomous play; client submissions are still accepted.
    pub fn pause(&self) {
        self.mode.send_replace(RunMode::Paused);
        info!(game = %self.id, "paused");
    }

    pub fn resume(&self) {
        self.mode.send_replace(RunMode::Running);
        info!(game = %self.id, "resumed");
    }

    /// Close the game. The autopilot stops and further submissions fail.
    pub fn quit(&self) {
        if self.cancel.is_cancelled() {
            return;
        }
        self.cancel.cancel();
        let _ = self.events.send(GameEvent::GameOver { winner: None });
        info!(game = %self.id, "closed");
    }

    /// Run `f` against the state without mutating it.
    pub async fn inspect<R>(&self, f: impl FnOnce(&GameState) -> R) -> R {
        let game = self.state.lock().await;
        f(&game)
    }

    pub async fn public_view(&self, viewer: Option<usize>) -> PublicView {
        self.inspect(|g| g.get_public_view(viewer)).await
    }

    /// Mutate under the game lock, then publish whatever events it produced.
    async fn mutate<R>(&self, f: impl FnOnce(&mut GameState) -> R) -> Result<R, SessionError> {
        if self.is_closed() {
            return Err(SessionError::Closed(self.id));
        }
        let mut game = self.state.lock().await;
        // quit may have landed while this call waited for the lock
        if self.is_closed() {
            return Err(SessionError::Closed(self.id));
        }
        let out = f(&mut game);
        let events = game.drain_events();
        drop(game);
        for event in events {
            debug!(game = %self.id, ?event, "event");
            // no subscribers is fine
            let _ = self.events.send(event);
        }
        self.turn.notify_one();
        Ok(out)
    }

    /// The single entry point for client actions.
    pub async fn submit_action(
        &self,
        seat: usize,
        action: Action,
    ) -> Result<ActionResult, SessionError> {
        Ok(self.mutate(|g| g.apply_action(seat, action)).await??)
    }

    pub async fn start_new_hand(&self) -> Result<NewHand, SessionError> {
        Ok(self.mutate(|g| g.start_new_hand()).await??)
    }

    /// Apply an autonomous decision only if the turn it was made for is still pending.
    ///
    /// A refused decision is replaced by the safe default. Returns `None` when the
    /// turn moved on while the agent was thinking.
    async fn submit_if_current(
        &self,
        seat: usize,
        key: TurnKey,
        action: Action,
    ) -> Result<Option<ActionResult>, SessionError> {
        let id = self.id;
        let applied = self
            .mutate(|g| {
                if g.turn_key() != key || g.current_player() != Some(seat) {
                    debug!(game = %id, seat, "stale decision dropped");
                    return Ok(None);
                }
                match g.apply_action(seat, action) {
                    Ok(result) => Ok(Some(result)),
                    Err(err) if err.is_recoverable() => {
                        warn!(game = %id, seat, ?action, error = %err, "decision refused; playing safe default");
                        let fallback = safe_default(g.legal_actions(seat).as_ref());
                        g.apply_action(seat, fallback).map(Some)
                    }
                    Err(err) => Err(err),
                }
            })
            .await?;
        Ok(applied?)
    }
}

/// Registry of hosted games, safe to share across tasks.
#[derive(Debug, Default)]
pub struct GameStore {
    games: DashMap<GameId, Arc<GameHandle>>,
    next_id: AtomicU64,
}

impl GameStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host a new game with one seat per stack.
    pub fn create_game(
        &self,
        config: GameConfig,
        stacks: &[Chips],
        session: SessionConfig,
    ) -> Result<Arc<GameHandle>, SessionError> {
        let state = GameState::with_stacks(config, stacks)?;
        Ok(self.insert(state, session))
    }

    /// Host an already-built game.
    pub fn insert(&self, state: GameState, session: SessionConfig) -> Arc<GameHandle> {
        let id = GameId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        info!(game = %id, seats = state.players().len(), "game created");
        let handle = Arc::new(GameHandle::new(id, state, session));
        self.games.insert(id, Arc::clone(&handle));
        handle
    }

    pub fn get(&self, id: GameId) -> Result<Arc<GameHandle>, SessionError> {
        self.games
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(SessionError::UnknownGame(id))
    }

    pub async fn submit_action(
        &self,
        id: GameId,
        seat: usize,
        action: Action,
    ) -> Result<ActionResult, SessionError> {
        self.get(id)?.submit_action(seat, action).await
    }

    pub async fn public_view(
        &self,
        id: GameId,
        viewer: Option<usize>,
    ) -> Result<PublicView, SessionError> {
        Ok(self.get(id)?.public_view(viewer).await)
    }

    /// Close a game and drop it from the registry.
    pub fn quit(&self, id: GameId) -> Result<(), SessionError> {
        let (_, handle) = self.games.remove(&id).ok_or(SessionError::UnknownGame(id))?;
        handle.quit();
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

/// Why an autopilot stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutopilotExit {
    GameOver { winner: Option<usize> },
    HandLimit,
    Cancelled,
}

type SharedAgent = Arc<parking_lot::Mutex<Box<dyn PlayerAgent>>>;

enum Step {
    Act { seat: usize, key: TurnKey, view: PublicView },
    Deal { hands_completed: u64 },
    Wait,
    Finished,
}

/// Plays the agent-controlled seats of one game until it ends or is closed.
pub struct Autopilot {
    handle: Arc<GameHandle>,
    agents: HashMap<usize, SharedAgent>,
}

impl Autopilot {
    pub fn new(handle: Arc<GameHandle>) -> Self {
        Self { handle, agents: HashMap::new() }
    }

    pub fn with_agent(mut self, seat: usize, agent: Box<dyn PlayerAgent>) -> Self {
        self.agents.insert(seat, Arc::new(parking_lot::Mutex::new(agent)));
        self
    }

    pub fn spawn(self) -> JoinHandle<Result<AutopilotExit, SessionError>> {
        tokio::spawn(self.run())
    }

    pub async fn run(self) -> Result<AutopilotExit, SessionError> {
        let mut mode = self.handle.mode.subscribe();
        loop {
            if !self.wait_until_running(&mut mode).await {
                return Ok(AutopilotExit::Cancelled);
            }
            let step = self
                .handle
                .inspect(|g| {
                    if g.is_game_over() {
                        return Step::Finished;
                    }
                    match g.current_player() {
                        Some(seat) if self.agents.contains_key(&seat) => Step::Act {
                            seat,
                            key: g.turn_key(),
                            view: g.get_public_view(Some(seat)),
                        },
                        None if g.stage() == Stage::HandComplete => {
                            Step::Deal { hands_completed: g.hands_completed() }
                        }
                        _ => Step::Wait,
                    }
                })
                .await;

            match step {
                Step::Finished => {
                    let winner = self.handle.inspect(leader).await;
                    return Ok(AutopilotExit::GameOver { winner });
                }
                Step::Deal { hands_completed } => {
                    if self.handle.config.max_hands.is_some_and(|max| hands_completed >= max) {
                        return Ok(AutopilotExit::HandLimit);
                    }
                    if !self.handle.config.auto_deal {
                        if !self.idle(&mut mode).await {
                            return Ok(AutopilotExit::Cancelled);
                        }
                        continue;
                    }
                    match self.handle.start_new_hand().await {
                        Ok(NewHand::GameOver { winner }) => {
                            return Ok(AutopilotExit::GameOver { winner })
                        }
                        Ok(NewHand::Started { .. }) => {}
                        // someone else dealt first
                        Err(SessionError::Engine(EngineError::IllegalStateTransition { .. })) => {}
                        Err(SessionError::Closed(_)) => return Ok(AutopilotExit::Cancelled),
                        Err(err) => return Err(err),
                    }
                }
                Step::Wait => {
                    if !self.idle(&mut mode).await {
                        return Ok(AutopilotExit::Cancelled);
                    }
                }
                Step::Act { seat, key, view } => {
                    let Some(action) = self.decide(seat, view).await else {
                        return Ok(AutopilotExit::Cancelled);
                    };
                    if !self.wait_until_running(&mut mode).await {
                        return Ok(AutopilotExit::Cancelled);
                    }
                    match self.handle.submit_if_current(seat, key, action).await {
                        Ok(_) => {}
                        Err(SessionError::Closed(_)) => return Ok(AutopilotExit::Cancelled),
                        Err(err) => return Err(err),
                    }
                }
            }
        }
    }

    /// Ask the seat's agent, falling back to the safe default when it overruns the budget.
    ///
    /// An agent still stuck in an earlier, timed-out decision is not asked again
    /// until it returns; the seat plays the safe default meanwhile.
    async fn decide(&self, seat: usize, view: PublicView) -> Option<Action> {
        let agent = Arc::clone(self.agents.get(&seat)?);
        let fallback = safe_default(view.legal_actions.as_ref());
        if agent.is_locked() {
            warn!(game = %self.handle.id, seat, "agent busy with an earlier decision");
            return Some(fallback);
        }
        let budget = self.handle.config.decision_budget();
        let task = tokio::task::spawn_blocking(move || agent.lock().decide(&view));
        tokio::select! {
            _ = self.handle.cancel.cancelled() => None,
            outcome = tokio::time::timeout(budget, task) => Some(match outcome {
                Ok(Ok(action)) => action,
                Ok(Err(err)) => {
                    warn!(game = %self.handle.id, seat, error = %err, "agent task failed");
                    fallback
                }
                Err(_) => {
                    warn!(
                        game = %self.handle.id,
                        seat,
                        budget_ms = budget.as_millis() as u64,
                        "decision timed out"
                    );
                    fallback
                }
            }),
        }
    }

    /// Block while paused. `false` once the game is closed.
    async fn wait_until_running(&self, mode: &mut watch::Receiver<RunMode>) -> bool {
        loop {
            if self.handle.is_closed() {
                return false;
            }
            if *mode.borrow_and_update() == RunMode::Running {
                return true;
            }
            tokio::select! {
                _ = self.handle.cancel.cancelled() => return false,
                changed = mode.changed() => {
                    if changed.is_err() {
                        return false;
                    }
                }
            }
        }
    }

    /// Wait for the game to change. `false` once the game is closed.
    async fn idle(&self, mode: &mut watch::Receiver<RunMode>) -> bool {
        tokio::select! {
            _ = self.handle.cancel.cancelled() => false,
            _ = self.handle.turn.notified() => true,
            changed = mode.changed() => changed.is_ok(),
        }
    }
}

fn leader(game: &GameState) -> Option<usize> {
    let funded: Vec<usize> =
        (0..game.players().len()).filter(|&i| game.players()[i].stack() > 0).collect();
    match funded.as_slice() {
        [only] => Some(*only),
        _ => None,
    }
}
