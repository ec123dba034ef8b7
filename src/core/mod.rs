//! Core state machine types and logic.
//!
//! This module contains the generic, pure building blocks the guesser
//! machine is assembled from:
//! - State definitions via the `State` trait
//! - Guard predicates for transition control
//! - Immutable history tracking
//!
//! Nothing in this module performs I/O.

mod guard;
mod history;
mod state;

pub use guard::Guard;
pub use history::{StateHistory, StateTransition};
pub use state::State;
