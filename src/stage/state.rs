//! Invocation state machine
//!
//! IDLE → LOADED → DIRTY → {DONE | FAILED}
//!
//! LOADED may go straight to DONE when the request changed nothing.

use serde::{Deserialize, Serialize};

/// Lifecycle of one stage invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvocationState {
    /// Nothing loaded yet
    Idle,
    /// Document parsed, not yet modified
    Loaded,
    /// Document modified in memory, not yet persisted
    Dirty,
    /// Completed (persisted, or nothing to persist)
    Done,
    /// Aborted with an error
    Failed,
}

impl InvocationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, InvocationState::Done | InvocationState::Failed)
    }

    /// Check if transition from this state to target is valid
    pub fn can_transition_to(&self, target: InvocationState) -> bool {
        match (self, target) {
            (InvocationState::Idle, InvocationState::Loaded) => true,
            (InvocationState::Loaded, InvocationState::Dirty) => true,
            (InvocationState::Loaded, InvocationState::Done) => true,
            (InvocationState::Dirty, InvocationState::Done) => true,

            // Any non-terminal state can fail
            (from, InvocationState::Failed) => !from.is_terminal(),

            _ => false,
        }
    }
}

/// Errors for invocation state operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid state transition from {from:?} to {to:?}")]
pub struct InvalidTransition {
    pub from: InvocationState,
    pub to: InvocationState,
}

/// Tracks the state of one invocation.
#[derive(Debug, Clone)]
pub struct Invocation {
    state: InvocationState,
}

impl Default for Invocation {
    fn default() -> Self {
        Self::new()
    }
}

impl Invocation {
    pub fn new() -> Self {
        Self {
            state: InvocationState::Idle,
        }
    }

    pub fn state(&self) -> InvocationState {
        self.state
    }

    /// Transition to a new state
    pub fn transition(&mut self, to: InvocationState) -> Result<(), InvalidTransition> {
        if !self.state.can_transition_to(to) {
            return Err(InvalidTransition {
                from: self.state,
                to,
            });
        }
        tracing::trace!(from = ?self.state, ?to, "invocation transition");
        self.state = to;
        Ok(())
    }
}
