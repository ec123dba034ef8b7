//! Guard predicates for controlling state transitions.
//!
//! Guards are pure boolean functions over whatever the transition depends
//! on: platform capabilities, the session context, or an incoming payload.

use std::fmt;

/// Pure predicate that determines if a transition can execute.
///
/// # Example
///
/// ```rust
/// use tilt_guesser::core::Guard;
///
/// let level_enough = Guard::named("level enough", |tilt: &f64| tilt.abs() < 1.0);
///
/// assert!(level_enough.check(&0.5));
/// assert!(!level_enough.check(&-3.0));
/// assert_eq!(level_enough.name(), "level enough");
/// ```
pub struct Guard<T: ?Sized> {
    name: &'static str,
    predicate: Box<dyn Fn(&T) -> bool + Send + Sync>,
}

impl<T: ?Sized> Guard<T> {
    /// Create an anonymous guard from a pure predicate.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self::named("anonymous", predicate)
    }

    /// Create a guard whose name shows up in transition logs.
    pub fn named<F>(name: &'static str, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Guard {
            name,
            predicate: Box::new(predicate),
        }
    }

    /// Check if the guard holds for this input.
    pub fn check(&self, input: &T) -> bool {
        (self.predicate)(input)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T: ?Sized> fmt::Debug for Guard<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard").field("name", &self.name).finish()
    }
}
