//! Subsystem models
//!
//! Interface level models of the robot's mechanisms. Hardware drivers are
//! external collaborators, these structs hold each mechanism's profile
//! parameters and commanded outputs, clamping to soft limits on the way in.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod arm;
mod climber;
mod intake;
mod lighting;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
pub use arm::*;
pub use climber::*;
pub use intake::*;
pub use lighting::*;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Profile parameters for all mechanisms, loaded from one params file.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SubsystemsParams {
    pub arm: ArmParams,
    pub intake: IntakeParams,
    pub climber: ClimberParams,
}
