//! Default teleoperated drivetrain command

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::SwerveHandle;
use crate::input::{ControllerParams, InputHandle};
use crate::sched::{Command, CommandError, SubsystemId};
use crate::swerve_ctrl::ChassisMotion;
use util::maths::apply_deadband;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drives the swerve drivetrain from the controller sticks.
///
/// Field-relative by default, with a hold-to-enable robot-centric switch and
/// a hold-to-enable slow mode. Never finishes, it is the drivetrain's
/// default command and runs until something else claims the drivetrain.
pub struct TeleopSwerve {
    swerve: SwerveHandle,
    input: InputHandle,
    controller: ControllerParams,
    requirements: Vec<SubsystemId>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TeleopSwerve {
    pub fn new(
        swerve: SwerveHandle,
        input: InputHandle,
        controller: ControllerParams,
    ) -> Self {
        TeleopSwerve {
            swerve,
            input,
            controller,
            requirements: vec![SubsystemId::Drivetrain],
        }
    }
}

impl Command for TeleopSwerve {
    fn name(&self) -> &'static str {
        "TeleopSwerve"
    }

    fn requirements(&self) -> &[SubsystemId] {
        &self.requirements
    }

    fn execute(&mut self) -> Result<(), CommandError> {
        let frame = *self.input.borrow();
        let deadband = self.controller.stick_deadband;

        let forward =
            apply_deadband(frame.axis(self.controller.translation_axis), deadband);
        let strafe =
            apply_deadband(frame.axis(self.controller.strafe_axis), deadband);
        let rotation =
            apply_deadband(frame.axis(self.controller.rotation_axis), deadband);

        let mut swerve = self.swerve.borrow_mut();
        let (max_speed_ms, max_angular_rads, slow_mode_cap) = {
            let params = swerve.params();
            (
                params.max_chassis_speed_ms,
                params.max_chassis_angular_rads,
                params.slow_mode_cap,
            )
        };

        let motion = ChassisMotion {
            forward_ms: forward * max_speed_ms,
            strafe_ms: strafe * max_speed_ms,
            angular_rads: rotation * max_angular_rads,
        };

        let field_relative =
            !frame.button(self.controller.robot_centric_button);
        let speed_cap = if frame.button(self.controller.slow_mode_button) {
            slow_mode_cap
        } else {
            1.0
        };

        swerve.drive(motion, field_relative, speed_cap);

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
