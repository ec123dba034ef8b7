//! The guards consulted by the guesser machine.

use crate::core::Guard;
use crate::model::{OrientationReading, SessionContext};
use crate::services::sensor::Capabilities;

/// Named guards, built once per machine.
#[derive(Debug)]
pub struct Guards {
    /// The platform exposes a device motion API at all.
    pub device_motion_present: Guard<Capabilities>,
    /// The platform has an explicit permission-request mechanism. When it
    /// does not, access is granted implicitly.
    pub permission_required: Guard<Capabilities>,
    /// Both axes of a reading are present and finite.
    pub valid_orientation: Guard<OrientationReading>,
    /// A live orientation is available to turn into a guess.
    pub orientation_present: Guard<SessionContext>,
}

impl Guards {
    pub fn new() -> Self {
        Self {
            device_motion_present: Guard::named("device motion API present", |caps: &Capabilities| {
                caps.device_motion
            }),
            permission_required: Guard::named("permission required", |caps: &Capabilities| {
                caps.device_motion && caps.permission_required
            }),
            valid_orientation: Guard::named("valid orientation", |reading: &OrientationReading| {
                reading.validate().is_success()
            }),
            orientation_present: Guard::named("orientation present", |ctx: &SessionContext| {
                ctx.orientation.is_some()
            }),
        }
    }
}

impl Default for Guards {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Orientation;

    #[test]
    fn motion_api_guard_follows_capabilities() {
        let guards = Guards::new();
        assert!(guards.device_motion_present.check(&Capabilities::full()));
        assert!(!guards.device_motion_present.check(&Capabilities::none()));
    }

    #[test]
    fn permission_needs_motion_api() {
        let guards = Guards::new();
        let odd = Capabilities {
            device_motion: false,
            permission_required: true,
        };
        assert!(!guards.permission_required.check(&odd));
        assert!(guards.permission_required.check(&Capabilities::full()));
        assert!(!guards.permission_required.check(&Capabilities::implicit()));
    }

    #[test]
    fn orientation_guards() {
        let guards = Guards::new();
        assert!(guards
            .valid_orientation
            .check(&OrientationReading::level(1.0, 2.0)));
        assert!(!guards
            .valid_orientation
            .check(&OrientationReading::new(Some(1.0), None)));

        assert!(!guards.orientation_present.check(&SessionContext::default()));
        assert!(guards
            .orientation_present
            .check(&SessionContext::with_orientation(Orientation::LEVEL)));
    }
}
