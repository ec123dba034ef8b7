//! Tilt Guesser: the control core of an orientation-guessing game
//!
//! The player tilts a device and tries to hold it as close to level as they
//! can. Each committed guess is scored by how far it is from level, saved,
//! and ranked against earlier guesses.
//!
//! The crate follows a "pure core, imperative shell" split. The
//! [`machine`] module decides what happens next and describes side effects
//! as data; the [`session`] module executes those effects against a
//! [`SensorService`] and a [`GuessStore`] on tokio.
//!
//! # Core Concepts
//!
//! - **State**: a flat [`GuesserState`] with nested regions for hierarchy queries
//! - **Events**: user intents and service results, see [`Event`]
//! - **Effects**: sensor, timer, and storage requests, see [`Effect`]
//! - **History**: append-only record of every transition taken
//!
//! # Example
//!
//! ```rust
//! use tilt_guesser::machine::{Event, GuesserMachine, GuesserState, MachineOptions};
//! use tilt_guesser::services::sensor::Capabilities;
//!
//! let mut machine = GuesserMachine::new(Capabilities::full(), MachineOptions::default());
//! machine.start();
//! machine.send(Event::PermissionGranted);
//! machine.send(Event::orientation_changed(0.0, 0.0));
//! machine.send(Event::GuessesRestored { guesses: vec![] });
//!
//! machine.send(Event::orientation_changed(0.5, -0.25));
//! machine.send(Event::GuessCommitted);
//!
//! assert_eq!(machine.state(), GuesserState::Reviewing);
//! let guess = &machine.context().guesses[0];
//! assert_eq!(tilt_guesser::scoring::score(guess), 0.375);
//! ```

pub mod config;
pub mod core;
pub mod machine;
pub mod model;
pub mod scoring;
pub mod services;
pub mod session;

// Re-export commonly used types
pub use config::{ConfigError, GuesserConfig};
pub use core::{Guard, State, StateHistory, StateTransition};
pub use machine::{Effect, Event, GuesserMachine, GuesserState, Region, Snapshot};
pub use model::{Guess, Orientation, OrientationReading};
pub use services::{GuessStore, SensorService, StorageError};
pub use session::{Session, SessionError, SessionHandle};
