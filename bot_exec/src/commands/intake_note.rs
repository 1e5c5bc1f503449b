//! Game piece collection command

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::{ArmHandle, IntakeHandle};
use crate::sched::{Command, CommandError, SubsystemId};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Runs the intake rollers and the arm indexer together to collect a game
/// piece. Bound while-held: runs until the button is released, at which
/// point both mechanisms stop.
pub struct IntakeNote {
    intake: IntakeHandle,
    arm: ArmHandle,
    requirements: Vec<SubsystemId>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl IntakeNote {
    pub fn new(intake: IntakeHandle, arm: ArmHandle) -> Self {
        IntakeNote {
            intake,
            arm,
            requirements: vec![SubsystemId::Intake, SubsystemId::Arm],
        }
    }
}

impl Command for IntakeNote {
    fn name(&self) -> &'static str {
        "IntakeNote"
    }

    fn requirements(&self) -> &[SubsystemId] {
        &self.requirements
    }

    fn execute(&mut self) -> Result<(), CommandError> {
        self.intake.borrow_mut().collect();
        self.arm.borrow_mut().feed();
        Ok(())
    }

    fn end(&mut self, _interrupted: bool) {
        self.intake.borrow_mut().stop();
        self.arm.borrow_mut().stop_indexer();
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
