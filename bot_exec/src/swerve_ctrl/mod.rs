//! Swerve control module
//!
//! Converts a desired chassis motion (forward, strafe, angular velocity) into
//! four independently steered and driven module commands, and the inverse
//! (measured module states back into an estimated chassis motion) for
//! odometry.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod kinematics;
mod module;
mod params;
mod sim;
mod state;
mod types;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use kinematics::*;
pub use module::*;
pub use params::*;
pub use sim::*;
pub use state::*;
pub use types::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// The number of swerve modules on the robot.
pub const NUM_MODULES: usize = 4;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during SwerveCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum SwerveCtrlError {
    #[error("Cannot load the swerve_ctrl parameters: {0}")]
    ParamLoadError(#[from] util::params::LoadError),

    #[error("Invalid geometry for module {0}: {1}")]
    InvalidGeometry(usize, String),

    #[error("Invalid capability limit: {0}")]
    InvalidLimit(String),

    #[error("Expected {expected} module IO handles, found {found}")]
    WrongIoCount { expected: usize, found: usize },

    #[error("SwerveCtrl has not been initialised")]
    NotInitialised,
}
