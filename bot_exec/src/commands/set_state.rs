//! Robot state indication command

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::LightingHandle;
use crate::sched::{Command, CommandError, SubsystemId};
use crate::subsystems::RobotState;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Sets the lighting strip's robot state and finishes immediately. Used by
/// the match-mode chooser options and on disabled entry.
pub struct SetRobotState {
    lighting: LightingHandle,
    state: RobotState,
    requirements: Vec<SubsystemId>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SetRobotState {
    pub fn new(lighting: LightingHandle, state: RobotState) -> Self {
        SetRobotState {
            lighting,
            state,
            requirements: vec![SubsystemId::Lighting],
        }
    }
}

impl Command for SetRobotState {
    fn name(&self) -> &'static str {
        "SetRobotState"
    }

    fn requirements(&self) -> &[SubsystemId] {
        &self.requirements
    }

    fn execute(&mut self) -> Result<(), CommandError> {
        self.lighting.borrow_mut().set_state(self.state);
        Ok(())
    }

    fn is_finished(&self) -> bool {
        true
    }
}
