//! Events that drive the guesser machine.
//!
//! User intents come from the UI; the rest are completions reported by the
//! services the machine asked for.

use crate::model::{Guess, OrientationReading};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Event {
    // =========================================================================
    // User intents
    // =========================================================================
    /// The user tapped "request permission". Only user-originated events may
    /// trigger a platform permission prompt.
    RequestPermission,

    /// The user committed the current orientation as a guess.
    GuessCommitted,

    /// The user asked for another round from the scoreboard.
    RestartRequested,

    // =========================================================================
    // Service completions
    // =========================================================================
    /// A frame from the live sensor subscription. Validated by guard.
    OrientationChanged(OrientationReading),

    PermissionGranted,

    PermissionDenied,

    /// The platform cannot decide without a direct user gesture.
    MissingPermissionReported,

    GuessesRestored { guesses: Vec<Guess> },

    /// The sensor responsiveness timer fired.
    SensorTimedOut,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::RequestPermission => "request-permission",
            Event::GuessCommitted => "guess-committed",
            Event::RestartRequested => "restart-requested",
            Event::OrientationChanged(_) => "orientation-changed",
            Event::PermissionGranted => "permission-granted",
            Event::PermissionDenied => "permission-denied",
            Event::MissingPermissionReported => "missing-permission-reported",
            Event::GuessesRestored { .. } => "guesses-restored",
            Event::SensorTimedOut => "sensor-timed-out",
        }
    }

    /// Whether this event originates from a direct user action.
    pub fn is_user_gesture(&self) -> bool {
        matches!(
            self,
            Event::RequestPermission | Event::GuessCommitted | Event::RestartRequested
        )
    }

    pub fn orientation_changed(x: f64, y: f64) -> Self {
        Event::OrientationChanged(OrientationReading::level(x, y))
    }
}
