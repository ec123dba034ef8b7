//! Core State trait for state machine states.
//!
//! Every state the guesser can occupy implements this trait, which provides
//! pure methods for inspecting state properties without side effects.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Trait for state machine states.
///
/// All methods are pure. States are immutable values that describe the
/// current position in a state machine.
///
/// # Required Traits
///
/// - `Clone`: states are copied into the transition history
/// - `PartialEq`: states are compared when deciding whether a transition happened
/// - `Debug`: states show up in diagnostics and log lines
/// - `Serialize` + `Deserialize`: states are part of published snapshots
///
/// # Example
///
/// ```rust
/// use tilt_guesser::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum Round {
///     Probing,
///     Aiming,
///     Broken,
/// }
///
/// impl State for Round {
///     fn name(&self) -> &str {
///         match self {
///             Self::Probing => "probing",
///             Self::Aiming => "aiming",
///             Self::Broken => "broken",
///         }
///     }
///
///     fn is_final(&self) -> bool {
///         matches!(self, Self::Broken)
///     }
///
///     fn is_error(&self) -> bool {
///         matches!(self, Self::Broken)
///     }
///
///     fn is_transient(&self) -> bool {
///         matches!(self, Self::Probing)
///     }
/// }
///
/// assert!(Round::Broken.is_final());
/// assert!(Round::Probing.is_transient());
/// ```
pub trait State:
    Clone + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync
{
    /// Get the state's name for display/logging.
    fn name(&self) -> &str;

    /// Check if this is a final (terminal) state.
    ///
    /// Terminal states have no outgoing transitions; leaving one requires
    /// restarting the whole session.
    ///
    /// Default implementation returns `false`.
    fn is_final(&self) -> bool {
        false
    }

    /// Check if this is an error state.
    ///
    /// Error states are the terminal states that explain why the session is
    /// stuck.
    ///
    /// Default implementation returns `false`.
    fn is_error(&self) -> bool {
        false
    }

    /// Check if this state is resolved immediately on entry, without
    /// waiting for an event.
    ///
    /// Default implementation returns `false`.
    fn is_transient(&self) -> bool {
        false
    }
}
