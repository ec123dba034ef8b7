//! The guesser machine: current state, session context, and history.

use super::effect::Effect;
use super::event::Event;
use super::guards::Guards;
use super::state::{GuesserState, Region};
use super::transition::{
    entry_effects, exit_effects, resolve_transient, transition, Action, MachineOptions,
};
use crate::config::GuesserConfig;
use crate::core::{State, StateHistory, StateTransition};
use crate::model::{Guess, Orientation, SessionContext};
use crate::scoring::Scoreboard;
use crate::services::sensor::Capabilities;
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, trace};

/// Orientation the development preset starts with.
pub const DEV_ORIENTATION: Orientation = Orientation { x: 0.1, y: -0.2 };

/// Read-only view of the machine for the UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub state: GuesserState,
    pub orientation: Option<Orientation>,
    pub guesses: Vec<Guess>,
}

impl Snapshot {
    pub fn matches(&self, state: GuesserState) -> bool {
        self.state == state
    }

    pub fn in_region(&self, region: Region) -> bool {
        self.state.in_region(region)
    }

    pub fn scoreboard(&self, size: usize) -> Scoreboard {
        Scoreboard::new(&self.guesses, size)
    }
}

impl From<&GuesserConfig> for MachineOptions {
    fn from(config: &GuesserConfig) -> Self {
        Self {
            sensor_timeout: config.sensor_timeout(),
            skip_sensor_check: config.dev_mode,
            initial_orientation: config.dev_mode.then_some(DEV_ORIENTATION),
        }
    }
}

/// The orientation-guessing control core.
///
/// Feed it events one at a time with [`send`](Self::send); each call runs to
/// completion and returns the effects the caller must execute, in order.
///
/// ```rust
/// use tilt_guesser::machine::{Effect, Event, GuesserMachine, GuesserState, MachineOptions};
/// use tilt_guesser::services::sensor::Capabilities;
///
/// let mut machine = GuesserMachine::new(Capabilities::full(), MachineOptions::default());
/// let effects = machine.start();
/// assert_eq!(machine.state(), GuesserState::CheckingPermission);
/// assert_eq!(effects, vec![Effect::RequestPermission { user_initiated: false }]);
///
/// machine.send(Event::PermissionGranted);
/// assert_eq!(machine.state(), GuesserState::TestingSensor);
/// ```
#[derive(Debug)]
pub struct GuesserMachine {
    state: GuesserState,
    context: SessionContext,
    capabilities: Capabilities,
    guards: Guards,
    options: MachineOptions,
    history: StateHistory<GuesserState>,
    started: bool,
    stopped: bool,
}

impl GuesserMachine {
    pub fn new(capabilities: Capabilities, options: MachineOptions) -> Self {
        let context = SessionContext {
            orientation: options.initial_orientation,
            guesses: Vec::new(),
        };
        Self {
            state: GuesserState::CheckingCapability,
            context,
            capabilities,
            guards: Guards::new(),
            options,
            history: StateHistory::new(),
            started: false,
            stopped: false,
        }
    }

    pub fn state(&self) -> GuesserState {
        self.state
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn guards(&self) -> &Guards {
        &self.guards
    }

    pub fn history(&self) -> &StateHistory<GuesserState> {
        &self.history
    }

    pub fn matches(&self, state: GuesserState) -> bool {
        self.state == state
    }

    pub fn in_region(&self, region: Region) -> bool {
        self.state.in_region(region)
    }

    pub fn is_final(&self) -> bool {
        self.state.is_final()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state,
            orientation: self.context.orientation,
            guesses: self.context.guesses.clone(),
        }
    }

    /// Evaluate the capability check. Calling it again is a no-op.
    pub fn start(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.started || self.stopped {
            return effects;
        }
        self.started = true;
        self.settle("start", false, &mut effects);
        effects
    }

    /// Process one event to completion.
    ///
    /// Events the current state does not handle, or that a guard rejects,
    /// leave state and context untouched and produce no effects.
    ///
    /// # Panics
    ///
    /// Panics if `GuessesRestored` carries a guess with a non-finite
    /// coordinate. Stores validate what they load, so this only happens
    /// when a store breaks that contract.
    pub fn send(&mut self, event: Event) -> Vec<Effect> {
        let mut effects = Vec::new();
        if !self.started || self.stopped {
            debug!(event = event.name(), "machine not running, ignoring event");
            return effects;
        }

        let name = event.name();
        let gesture = event.is_user_gesture();
        let Some(step) = transition(self.state, &self.context, event, &self.guards) else {
            trace!(state = self.state.name(), event = name, "event ignored");
            return effects;
        };

        let Some(target) = step.target else {
            self.apply(step.actions);
            return effects;
        };

        effects.extend(exit_effects(self.state, Some(target), false));
        self.apply(step.actions);
        self.enter(target, name, gesture, &mut effects);
        self.settle(name, gesture, &mut effects);
        effects
    }

    /// Tear the machine down, returning the effects that release whatever
    /// the current state holds. Later events are ignored.
    pub fn stop(&mut self) -> Vec<Effect> {
        if self.stopped {
            return Vec::new();
        }
        self.stopped = true;
        debug!(state = self.state.name(), "stopping machine");
        exit_effects(self.state, None, false)
    }

    fn settle(&mut self, event: &str, gesture: bool, effects: &mut Vec<Effect>) {
        while let Some(next) = self.resolve(self.state) {
            effects.extend(exit_effects(self.state, Some(next), true));
            self.enter(next, event, gesture, effects);
        }
    }

    fn resolve(&self, state: GuesserState) -> Option<GuesserState> {
        resolve_transient(state, &self.capabilities, &self.guards, &self.options)
    }

    fn enter(
        &mut self,
        target: GuesserState,
        event: &str,
        gesture: bool,
        effects: &mut Vec<Effect>,
    ) {
        let from = self.state;
        self.state = target;
        self.history.push(StateTransition {
            from,
            to: target,
            event: event.to_string(),
            timestamp: Utc::now(),
        });
        debug!(from = from.name(), to = target.name(), event, "state transition");
        let passes_through = self.resolve(target).is_some();
        effects.extend(entry_effects(
            from,
            target,
            &self.context,
            gesture,
            passes_through,
            &self.options,
        ));
    }

    fn apply(&mut self, actions: Vec<Action>) {
        for action in actions {
            match action {
                Action::AssignOrientation(orientation) => {
                    self.context.orientation = Some(orientation);
                }
                Action::AppendGuess => {
                    if let Some(orientation) = self.context.orientation {
                        let guess = Guess::capture(orientation);
                        debug!(id = %guess.id, x = guess.x, y = guess.y, "guess committed");
                        self.context.guesses.push(guess);
                    }
                }
                Action::ClearOrientation => {
                    self.context.orientation = None;
                }
                Action::SeedGuesses(guesses) => {
                    assert!(
                        guesses.iter().all(Guess::is_finite),
                        "restored guesses must have finite coordinates"
                    );
                    debug!(count = guesses.len(), "guesses restored");
                    self.context.guesses = guesses;
                }
            }
        }
    }
}
