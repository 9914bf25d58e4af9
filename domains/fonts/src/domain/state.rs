//! State machine for font status transitions
//!
//! Font states: Draft → Processing → Ready | Failed.
//! Transitions are monotonic forward only; Ready and Failed are terminal.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during state transitions
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StateError {
    #[error("Invalid transition: cannot transition from {from} via {event}")]
    InvalidTransition { from: String, event: String },

    #[error("Terminal state: {0} is a terminal state and cannot transition")]
    TerminalState(String),
}

/// Font lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontState {
    Draft,
    Processing,
    Ready,
    Failed,
}

impl FontState {
    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready | Self::Failed)
    }

    /// Get all valid next states from current state
    pub fn valid_transitions(&self) -> &'static [FontState] {
        match self {
            Self::Draft => &[Self::Processing],
            Self::Processing => &[Self::Ready, Self::Failed],
            Self::Ready => &[],
            Self::Failed => &[],
        }
    }
}

impl std::fmt::Display for FontState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Processing => write!(f, "processing"),
            Self::Ready => write!(f, "ready"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Events that trigger font state transitions
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FontEvent {
    /// An export attempt picked up the draft
    Begin,
    /// Export completed and files were attached
    Complete,
    /// Export failed
    Fail,
}

impl std::fmt::Display for FontEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Begin => write!(f, "begin"),
            Self::Complete => write!(f, "complete"),
            Self::Fail => write!(f, "fail"),
        }
    }
}

/// Font state machine
pub struct FontStateMachine;

impl FontStateMachine {
    /// Attempt a state transition
    pub fn transition(current: FontState, event: FontEvent) -> Result<FontState, StateError> {
        if current.is_terminal() {
            return Err(StateError::TerminalState(current.to_string()));
        }

        let next = match (&current, &event) {
            (FontState::Draft, FontEvent::Begin) => FontState::Processing,
            (FontState::Processing, FontEvent::Complete) => FontState::Ready,
            (FontState::Processing, FontEvent::Fail) => FontState::Failed,
            _ => {
                return Err(StateError::InvalidTransition {
                    from: current.to_string(),
                    event: event.to_string(),
                });
            }
        };

        Ok(next)
    }

    /// Check if a transition is valid without performing it
    pub fn can_transition(current: FontState, event: &FontEvent) -> bool {
        Self::transition(current, *event).is_ok()
    }
}
