//! Manual arm command

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::ArmHandle;
use crate::input::{ControllerParams, InputHandle};
use crate::sched::{Command, CommandError, SubsystemId};
use util::maths::apply_deadband;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drives the arm directly from the technician axis. The arm's default
/// command, never finishes.
pub struct ArmControl {
    arm: ArmHandle,
    input: InputHandle,
    controller: ControllerParams,
    requirements: Vec<SubsystemId>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ArmControl {
    pub fn new(
        arm: ArmHandle,
        input: InputHandle,
        controller: ControllerParams,
    ) -> Self {
        ArmControl {
            arm,
            input,
            controller,
            requirements: vec![SubsystemId::Arm],
        }
    }
}

impl Command for ArmControl {
    fn name(&self) -> &'static str {
        "ArmControl"
    }

    fn requirements(&self) -> &[SubsystemId] {
        &self.requirements
    }

    fn execute(&mut self) -> Result<(), CommandError> {
        let demand = apply_deadband(
            self.input.borrow().axis(self.controller.arm_axis),
            self.controller.stick_deadband,
        );
        self.arm.borrow_mut().set_output(demand);
        Ok(())
    }

    fn end(&mut self, _interrupted: bool) {
        self.arm.borrow_mut().set_output(0.0);
    }
}
