//! States of the guesser machine.
//!
//! The hierarchy is encoded as a flat enumeration plus a region set per
//! state, so "is this state inside `permission-ok`" is a constant-time match.

use crate::core::State;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Non-leaf states of the hierarchy, outermost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Region {
    /// The device exposes a motion API.
    Capable,
    /// Sensor access was granted. Owns the live sensor subscription.
    PermissionOk,
    /// The sensor produced at least one valid reading.
    SensorConfirmed,
}

impl Region {
    pub fn name(&self) -> &'static str {
        match self {
            Region::Capable => "capable",
            Region::PermissionOk => "permission-ok",
            Region::SensorConfirmed => "sensor-confirmed",
        }
    }
}

/// Leaf states. The UI renders one screen per leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GuesserState {
    CheckingCapability,
    CheckingPermission,
    AwaitingUserGesture,
    TestingSensor,
    RestoringGuesses,
    Guessing,
    Reviewing,
    UnsupportedDevice,
    PermissionDenied,
    SensorUnresponsive,
}

const NONE: &[Region] = &[];
const CAPABLE: &[Region] = &[Region::Capable];
const PERMISSION_OK: &[Region] = &[Region::Capable, Region::PermissionOk];
const SENSOR_CONFIRMED: &[Region] = &[
    Region::Capable,
    Region::PermissionOk,
    Region::SensorConfirmed,
];

impl GuesserState {
    pub const ALL: [GuesserState; 10] = [
        GuesserState::CheckingCapability,
        GuesserState::CheckingPermission,
        GuesserState::AwaitingUserGesture,
        GuesserState::TestingSensor,
        GuesserState::RestoringGuesses,
        GuesserState::Guessing,
        GuesserState::Reviewing,
        GuesserState::UnsupportedDevice,
        GuesserState::PermissionDenied,
        GuesserState::SensorUnresponsive,
    ];

    /// Regions enclosing this leaf, outermost first.
    pub fn regions(&self) -> &'static [Region] {
        match self {
            GuesserState::CheckingCapability | GuesserState::UnsupportedDevice => NONE,
            GuesserState::CheckingPermission
            | GuesserState::AwaitingUserGesture
            | GuesserState::PermissionDenied
            | GuesserState::SensorUnresponsive => CAPABLE,
            GuesserState::TestingSensor => PERMISSION_OK,
            GuesserState::RestoringGuesses | GuesserState::Guessing | GuesserState::Reviewing => {
                SENSOR_CONFIRMED
            }
        }
    }

    pub fn in_region(&self, region: Region) -> bool {
        self.regions().contains(&region)
    }

    /// Whether the live sensor subscription must be held in this state.
    pub fn holds_sensor(&self) -> bool {
        self.in_region(Region::PermissionOk)
    }

    /// Whether the UI should render the "cannot play" screen.
    ///
    /// An unresponsive sensor is reported exactly like a device without a
    /// motion API.
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            GuesserState::UnsupportedDevice | GuesserState::SensorUnresponsive
        )
    }
}

impl State for GuesserState {
    fn name(&self) -> &str {
        match self {
            GuesserState::CheckingCapability => "checking-capability",
            GuesserState::CheckingPermission => "checking-permission",
            GuesserState::AwaitingUserGesture => "awaiting-user-gesture",
            GuesserState::TestingSensor => "testing-sensor",
            GuesserState::RestoringGuesses => "restoring-guesses",
            GuesserState::Guessing => "guessing",
            GuesserState::Reviewing => "reviewing",
            GuesserState::UnsupportedDevice => "unsupported-device",
            GuesserState::PermissionDenied => "permission-denied",
            GuesserState::SensorUnresponsive => "sensor-unresponsive",
        }
    }

    fn is_final(&self) -> bool {
        matches!(
            self,
            GuesserState::UnsupportedDevice
                | GuesserState::PermissionDenied
                | GuesserState::SensorUnresponsive
        )
    }

    fn is_error(&self) -> bool {
        self.is_final()
    }

    fn is_transient(&self) -> bool {
        matches!(self, GuesserState::CheckingCapability)
    }
}

impl fmt::Display for GuesserState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
