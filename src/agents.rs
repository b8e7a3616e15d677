//! Agents: pluggable deciders for seats that are not driven by a remote client.
//!
//! An agent only ever sees the [`PublicView`] of its own seat and answers with
//! an [`Action`]. [`AgentTable`] maps seats to agents and drives whichever
//! agent is on the clock; the async autopilot in [`crate::session`] does the
//! same under a time budget.

use crate::betting::{Action, ActionResult};
use crate::engine::GameEngine;
use crate::error::EngineError;
use crate::events::HandSummary;
use crate::view::{LegalActions, PublicView};
use core::fmt;
use std::collections::VecDeque;

/// Kinds of agents attached to seats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum AgentKind {
    Human,
    Bot,
}

/// A seat controller asked for a decision when its seat is on the clock.
pub trait PlayerAgent: Send {
    /// Pick an action from what the seat can see. May block.
    fn decide(&mut self, view: &PublicView) -> Action;
    /// The kind of this agent (human, bot, etc.).
    fn kind(&self) -> AgentKind {
        AgentKind::Human
    }
}

mod bots;

pub use bots::{BotAgent, BotProfile, Difficulty};

/// Check when free, otherwise fold.
pub fn safe_default(legal: Option<&LegalActions>) -> Action {
    match legal {
        Some(l) if l.may_check => Action::Check,
        _ => Action::Fold,
    }
}

/// Replays queued actions, e.g. a human's input relayed from elsewhere.
/// Once the queue is empty it plays the safe default.
#[derive(Debug, Default)]
pub struct ScriptedAgent {
    pending: VecDeque<Action>,
}

impl ScriptedAgent {
    pub fn new(actions: impl IntoIterator<Item = Action>) -> Self {
        Self { pending: actions.into_iter().collect() }
    }

    pub fn push(&mut self, action: Action) {
        self.pending.push_back(action);
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl PlayerAgent for ScriptedAgent {
    fn decide(&mut self, view: &PublicView) -> Action {
        self.pending.pop_front().unwrap_or_else(|| safe_default(view.legal_actions.as_ref()))
    }
}

/// Manages a set of optional agents, one per seat, and drives the agent at the
/// current seat when appropriate.
pub struct AgentTable {
    seats: Vec<Option<Box<dyn PlayerAgent>>>,
}

impl fmt::Debug for AgentTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flags: String = self
            .seats
            .iter()
            .map(|a| match a.as_deref().map(|ag| ag.kind()) {
                Some(AgentKind::Bot) => 'B',
                Some(AgentKind::Human) => 'H',
                None => '-',
            })
            .collect();
        write!(f, "AgentTable({flags})")
    }
}

impl AgentTable {
    /// Create a table with `n` seats, all empty.
    pub fn for_seats(n: usize) -> Self {
        Self { seats: (0..n).map(|_| None).collect() }
    }

    /// Assign an agent to a seat (or remove when `None`).
    pub fn set_agent(&mut self, seat: usize, agent: Option<Box<dyn PlayerAgent>>) {
        if seat >= self.seats.len() {
            self.seats.resize_with(seat + 1, || None);
        }
        self.seats[seat] = agent;
    }

    /// Return the kind of agent at a seat, if any.
    pub fn agent_kind(&self, seat: usize) -> Option<AgentKind> {
        self.seats.get(seat).and_then(|a| a.as_deref().map(|ag| ag.kind()))
    }

    /// Whether a seat currently has an agent assigned.
    pub fn has_agent(&self, seat: usize) -> bool {
        self.seats.get(seat).map(|a| a.is_some()).unwrap_or(false)
    }

    /// Drive the agent assigned to the current seat, if any.
    ///
    /// A refused decision is replaced by [`safe_default`] so the hand never
    /// stalls on a confused agent. Returns `Ok(None)` when nobody is on the
    /// clock or the seat has no agent.
    pub fn on_turn(
        &mut self,
        engine: &mut dyn GameEngine,
    ) -> Result<Option<ActionResult>, EngineError> {
        let Some(seat) = engine.current_player() else {
            return Ok(None);
        };
        let Some(Some(agent)) = self.seats.get_mut(seat) else {
            return Ok(None);
        };
        let view = engine.public_view(Some(seat));
        let action = agent.decide(&view);
        match engine.apply_action(seat, action) {
            Ok(result) => Ok(Some(result)),
            Err(err) if err.is_recoverable() => {
                tracing::warn!(seat, ?action, error = %err, "agent action refused; playing safe default");
                engine.apply_action(seat, safe_default(view.legal_actions.as_ref())).map(Some)
            }
            Err(err) => Err(err),
        }
    }

    /// Let agents act until the hand completes or a seat without an agent is on
    /// the clock. Returns the summary when the hand completed here.
    pub fn play_hand(
        &mut self,
        engine: &mut dyn GameEngine,
    ) -> Result<Option<HandSummary>, EngineError> {
        loop {
            match self.on_turn(engine)? {
                Some(result) => {
                    if let Some(summary) = result.hand_complete() {
                        return Ok(Some(summary.clone()));
                    }
                }
                None => return Ok(None),
            }
        }
    }
}
