//! State transition history tracking.
//!
//! Provides an append-only record of state machine transitions over time.

use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Record of a single state transition.
///
/// # Example
///
/// ```rust
/// use tilt_guesser::core::StateTransition;
/// use tilt_guesser::machine::GuesserState;
/// use chrono::Utc;
///
/// let transition = StateTransition {
///     from: GuesserState::Guessing,
///     to: GuesserState::Reviewing,
///     event: "guess-committed".to_string(),
///     timestamp: Utc::now(),
/// };
/// assert_eq!(transition.event, "guess-committed");
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateTransition<S: State> {
    /// The state being transitioned from
    pub from: S,
    /// The state being transitioned to
    pub to: S,
    /// Name of the event that caused the transition
    pub event: String,
    /// When the transition occurred
    pub timestamp: DateTime<Utc>,
}

/// Ordered, append-only history of state transitions.
///
/// # Example
///
/// ```rust
/// use tilt_guesser::core::{StateHistory, StateTransition};
/// use tilt_guesser::machine::GuesserState;
/// use chrono::Utc;
///
/// let mut history = StateHistory::new();
/// history.push(StateTransition {
///     from: GuesserState::CheckingCapability,
///     to: GuesserState::UnsupportedDevice,
///     event: "start".to_string(),
///     timestamp: Utc::now(),
/// });
///
/// let path = history.get_path();
/// assert_eq!(path, vec![&GuesserState::CheckingCapability, &GuesserState::UnsupportedDevice]);
/// assert!(!history.visited(&GuesserState::Guessing));
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<S: State> {
    transitions: Vec<StateTransition<S>>,
}

impl<S: State> Default for StateHistory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> StateHistory<S> {
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Append a transition.
    pub fn push(&mut self, transition: StateTransition<S>) {
        self.transitions.push(transition);
    }

    /// Get the path of states traversed.
    ///
    /// Returns the initial state followed by the `to` state of each
    /// transition.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(&first.from);
        }
        for transition in &self.transitions {
            path.push(&transition.to);
        }
        path
    }

    /// Whether `state` appears anywhere on the recorded path.
    pub fn visited(&self, state: &S) -> bool {
        self.transitions
            .iter()
            .any(|t| &t.from == state || &t.to == state)
    }

    pub fn transitions(&self) -> &[StateTransition<S>] {
        &self.transitions
    }
}
