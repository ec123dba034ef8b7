//! Pure transition logic.
//!
//! `transition` decides what an event does in a state: which leaf to move
//! to and which context actions to run. `exit_effects` and `entry_effects`
//! derive the service effects of moving between two leaves from the region
//! hierarchy. Nothing here has side effects.

use super::effect::Effect;
use super::event::Event;
use super::guards::Guards;
use super::state::GuesserState;
use crate::model::{Guess, Orientation, SessionContext};
use crate::services::sensor::Capabilities;
use std::time::Duration;
use tracing::trace;

/// Synchronous context updates fired by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    AssignOrientation(Orientation),
    /// Snapshot the current orientation into a new guess.
    AppendGuess,
    ClearOrientation,
    SeedGuesses(Vec<Guess>),
}

/// What handling an event amounts to.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// Leaf to move to. `None` keeps the current state and runs no entry or
    /// exit effects.
    pub target: Option<GuesserState>,
    pub actions: Vec<Action>,
}

impl Step {
    pub fn to(target: GuesserState) -> Self {
        Self {
            target: Some(target),
            actions: Vec::new(),
        }
    }

    pub fn stay() -> Self {
        Self {
            target: None,
            actions: Vec::new(),
        }
    }

    pub fn with(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }
}

/// Per-machine knobs that shape entry behaviour.
#[derive(Debug, Clone, PartialEq)]
pub struct MachineOptions {
    pub sensor_timeout: Duration,
    /// Resolve `testing-sensor` immediately instead of waiting for a reading.
    pub skip_sensor_check: bool,
    /// Orientation the context starts with.
    pub initial_orientation: Option<Orientation>,
}

impl Default for MachineOptions {
    fn default() -> Self {
        Self {
            sensor_timeout: Duration::from_millis(crate::config::DEFAULT_SENSOR_TIMEOUT_MS),
            skip_sensor_check: false,
            initial_orientation: None,
        }
    }
}

/// Decide how `state` handles `event`.
///
/// Returns `None` when the event is dropped: either the state has no
/// handler for it or a guard rejected it.
pub fn transition(
    state: GuesserState,
    context: &SessionContext,
    event: Event,
    guards: &Guards,
) -> Option<Step> {
    use GuesserState as S;

    match (state, event) {
        (S::CheckingPermission, Event::PermissionGranted) => Some(Step::to(S::TestingSensor)),
        (S::CheckingPermission, Event::PermissionDenied) => Some(Step::to(S::PermissionDenied)),
        (S::CheckingPermission, Event::MissingPermissionReported) => {
            Some(Step::to(S::AwaitingUserGesture))
        }

        (S::AwaitingUserGesture, Event::RequestPermission) => Some(Step::to(S::CheckingPermission)),

        (S::TestingSensor, Event::OrientationChanged(reading)) => {
            if guards.valid_orientation.check(&reading) {
                Some(Step::to(S::RestoringGuesses))
            } else {
                trace!(?reading, "dropping invalid orientation reading");
                None
            }
        }
        (S::TestingSensor, Event::SensorTimedOut) => Some(Step::to(S::SensorUnresponsive)),

        (S::RestoringGuesses, Event::GuessesRestored { guesses }) => {
            Some(Step::to(S::Guessing).with(Action::SeedGuesses(guesses)))
        }

        (S::Guessing, Event::OrientationChanged(reading)) => match reading.orientation() {
            Some(orientation) => Some(Step::stay().with(Action::AssignOrientation(orientation))),
            None => {
                trace!(?reading, "dropping invalid orientation reading");
                None
            }
        },
        (S::Guessing, Event::GuessCommitted) => guards
            .orientation_present
            .check(context)
            .then(|| Step::to(S::Reviewing).with(Action::AppendGuess)),

        (S::Reviewing, Event::RestartRequested) => {
            Some(Step::to(S::Guessing).with(Action::ClearOrientation))
        }

        _ => None,
    }
}

/// Eventless transitions taken as soon as `state` is entered.
pub fn resolve_transient(
    state: GuesserState,
    capabilities: &Capabilities,
    guards: &Guards,
    options: &MachineOptions,
) -> Option<GuesserState> {
    match state {
        GuesserState::CheckingCapability => {
            if guards.device_motion_present.check(capabilities) {
                Some(GuesserState::CheckingPermission)
            } else {
                Some(GuesserState::UnsupportedDevice)
            }
        }
        GuesserState::CheckingPermission if !guards.permission_required.check(capabilities) => {
            Some(GuesserState::TestingSensor)
        }
        GuesserState::TestingSensor if options.skip_sensor_check => {
            Some(GuesserState::RestoringGuesses)
        }
        _ => None,
    }
}

/// Effects of leaving `from` for `to`, innermost first. `to == None` means
/// the whole machine is being torn down.
///
/// `passed_through` is set when `from` resolved on entry, in which case it
/// never started anything of its own to release.
pub fn exit_effects(
    from: GuesserState,
    to: Option<GuesserState>,
    passed_through: bool,
) -> Vec<Effect> {
    let mut effects = Vec::new();

    if from == GuesserState::TestingSensor && to != Some(from) && !passed_through {
        effects.push(Effect::CancelSensorTimeout);
    }

    if from.holds_sensor() && !to.is_some_and(|s| s.holds_sensor()) {
        effects.push(Effect::StopSensor);
    }

    effects
}

/// Effects of entering `to` from `from`, outermost first.
///
/// `user_gesture` tells whether the triggering event came straight from the
/// user, which is the only time a permission prompt may be shown. A state
/// that `passes_through` resolves on entry and invokes nothing itself; only
/// the regions it opens take effect.
pub fn entry_effects(
    from: GuesserState,
    to: GuesserState,
    context: &SessionContext,
    user_gesture: bool,
    passes_through: bool,
    options: &MachineOptions,
) -> Vec<Effect> {
    let mut effects = Vec::new();

    if to.holds_sensor() && !from.holds_sensor() {
        effects.push(Effect::StartSensor);
    }

    if passes_through {
        return effects;
    }

    match to {
        GuesserState::CheckingPermission => effects.push(Effect::RequestPermission {
            user_initiated: user_gesture,
        }),
        GuesserState::TestingSensor => effects.push(Effect::StartSensorTimeout {
            after: options.sensor_timeout,
        }),
        GuesserState::RestoringGuesses => effects.push(Effect::RestoreGuesses),
        GuesserState::Reviewing => effects.push(Effect::PersistGuesses {
            guesses: context.guesses.clone(),
        }),
        _ => {}
    }

    effects
}
