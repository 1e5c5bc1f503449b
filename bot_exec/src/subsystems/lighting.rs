//! Lighting and robot state indication

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The coarse robot state shown on the lighting strip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RobotState {
    Disabled,
    Enabled,
    TestMode,
}

impl Default for RobotState {
    fn default() -> Self {
        RobotState::Disabled
    }
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The lighting strip, driven purely by the indicated robot state.
#[derive(Default)]
pub struct Lighting {
    state: RobotState,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Lighting {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_state(&mut self, state: RobotState) {
        self.state = state;
    }

    pub fn state(&self) -> RobotState {
        self.state
    }
}
