//! Explicit state machine for one guessing session.
//!
//! The design separates:
//! - **State**: where the session is (`GuesserState`, with its regions)
//! - **Events**: what happened (`Event`)
//! - **Effects**: what the outside world must do (`Effect`)
//! - **Transition**: pure decisions in `transition`, applied by `GuesserMachine`
//!
//! The session runtime executes effects against real services and feeds
//! their results back as events.

mod effect;
mod event;
mod guards;
mod guesser;
mod state;
pub mod transition;

pub use effect::Effect;
pub use event::Event;
pub use guards::Guards;
pub use guesser::{GuesserMachine, Snapshot, DEV_ORIENTATION};
pub use state::{GuesserState, Region};
pub use transition::{Action, MachineOptions, Step};
