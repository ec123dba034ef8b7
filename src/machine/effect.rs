//! Effects (side effects as data).
//!
//! The machine never touches the sensor, the timer, or storage itself. It
//! returns effects and the session executes them against real services.

use crate::model::Guess;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    /// Ask the platform for sensor access. `user_initiated` is set only when
    /// the request is made while handling a user gesture.
    RequestPermission { user_initiated: bool },

    /// Open the live orientation subscription.
    StartSensor,

    /// Cancel the live orientation subscription.
    StopSensor,

    /// Schedule `SensorTimedOut` after `after`.
    StartSensorTimeout { after: Duration },

    /// Cancel a pending sensor timeout so it can never fire.
    CancelSensorTimeout,

    /// Load persisted guesses and report them with `GuessesRestored`.
    RestoreGuesses,

    /// Overwrite the persisted guess list.
    PersistGuesses { guesses: Vec<Guess> },
}
