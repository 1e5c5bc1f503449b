//! Cooperative command scheduler
//!
//! Commands are small state machines that claim exclusive ownership of the
//! subsystems they require. The scheduler runs every active command once per
//! control cycle, resolves ownership conflicts by interrupting the current
//! owner, and keeps idle subsystems busy with their default commands.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod chooser;
mod command;
mod scheduler;
mod trigger;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use chooser::*;
pub use command::*;
pub use scheduler::*;
pub use trigger::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The subsystems a command may claim exclusive ownership of.
///
/// Ordered so that iteration over owner maps is deterministic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SubsystemId {
    Drivetrain,
    Arm,
    Intake,
    Climber,
    Lighting,
}

/// Possible errors that can occur during scheduler configuration.
#[derive(Debug, thiserror::Error)]
pub enum SchedError {
    #[error(
        "A default command for {0:?} must require exactly that subsystem, \
        got {1:?}")]
    InvalidDefault(SubsystemId, Vec<SubsystemId>),

    #[error("No option named {0:?} in chooser {1:?}")]
    UnknownOption(String, &'static str),
}

/// An error raised by a command body during cyclic execution.
///
/// A failing command is interrupted by the scheduler, it never brings the
/// control cycle down.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Command failed: {0}")]
    Failed(String),
}
