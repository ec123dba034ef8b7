//! Orientation readings, guesses, and the session context.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;
use uuid::Uuid;

/// A validated two-axis tilt, in degrees.
///
/// `x` is the forward/back tilt, `y` the side tilt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    pub x: f64,
    pub y: f64,
}

impl Orientation {
    pub const LEVEL: Orientation = Orientation { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => f.write_str("x"),
            Axis::Y => f.write_str("y"),
        }
    }
}

/// Problems found in a raw sensor frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReadingError {
    #[error("{0} axis is missing")]
    Missing(Axis),

    #[error("{0} axis is not a finite number")]
    NotFinite(Axis),
}

/// A raw frame from the tilt sensor.
///
/// Platforms report partial frames (one axis null) and garbage values while
/// the sensor warms up, so both axes are optional until validated.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OrientationReading {
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl OrientationReading {
    pub fn new(x: Option<f64>, y: Option<f64>) -> Self {
        Self { x, y }
    }

    /// A reading with both axes present.
    pub fn level(x: f64, y: f64) -> Self {
        Self::new(Some(x), Some(y))
    }

    /// Validate both axes, collecting every problem rather than stopping at
    /// the first one.
    ///
    /// ```rust
    /// use tilt_guesser::model::{Axis, OrientationReading, ReadingError};
    /// use stillwater::validation::Validation;
    ///
    /// let reading = OrientationReading::new(None, Some(f64::NAN));
    /// match reading.validate() {
    ///     Validation::Failure(errors) => {
    ///         let errors: Vec<_> = errors.iter().copied().collect();
    ///         assert_eq!(
    ///             errors,
    ///             vec![ReadingError::Missing(Axis::X), ReadingError::NotFinite(Axis::Y)]
    ///         );
    ///     }
    ///     Validation::Success(_) => panic!("reading should be rejected"),
    /// }
    /// ```
    pub fn validate(&self) -> Validation<Orientation, NonEmptyVec<ReadingError>> {
        let axes = vec![check_axis(Axis::X, self.x), check_axis(Axis::Y, self.y)];
        Validation::all_vec(axes).map(|values| Orientation::new(values[0], values[1]))
    }

    /// The validated orientation, if this reading is usable.
    pub fn orientation(&self) -> Option<Orientation> {
        match self.validate() {
            Validation::Success(orientation) => Some(orientation),
            Validation::Failure(_) => None,
        }
    }
}

fn check_axis(axis: Axis, value: Option<f64>) -> Validation<f64, NonEmptyVec<ReadingError>> {
    match value {
        None => Validation::fail(ReadingError::Missing(axis)),
        Some(v) if !v.is_finite() => Validation::fail(ReadingError::NotFinite(axis)),
        Some(v) => Validation::success(v),
    }
}

impl From<Orientation> for OrientationReading {
    fn from(orientation: Orientation) -> Self {
        Self::level(orientation.x, orientation.y)
    }
}

/// An immutable snapshot of the orientation at the moment a guess was
/// committed.
///
/// Serialized as `{"x": .., "y": .., "id": "<uuid>", "timestamp": <epoch millis>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guess {
    pub x: f64,
    pub y: f64,
    pub id: Uuid,
    pub timestamp: i64,
}

impl Guess {
    /// Capture a guess now, with a fresh v4 id.
    pub fn capture(orientation: Orientation) -> Self {
        Self::at(orientation, Uuid::new_v4(), Utc::now().timestamp_millis())
    }

    pub fn at(orientation: Orientation, id: Uuid, timestamp: i64) -> Self {
        Self {
            x: orientation.x,
            y: orientation.y,
            id,
            timestamp,
        }
    }

    pub fn orientation(&self) -> Orientation {
        Orientation::new(self.x, self.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Data the machine carries across states.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionContext {
    /// Latest valid live reading. Cleared when a round ends.
    pub orientation: Option<Orientation>,
    /// Every guess of this session, oldest first.
    pub guesses: Vec<Guess>,
}

impl SessionContext {
    pub fn with_orientation(orientation: Orientation) -> Self {
        Self {
            orientation: Some(orientation),
            guesses: Vec::new(),
        }
    }
}
