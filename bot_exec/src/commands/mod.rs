//! Concrete commands
//!
//! Each command captures shared handles to the subsystems it drives and the
//! live input frame, and claims the matching subsystems through its
//! requirement list.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod arm_control;
mod autos;
mod climb_chain;
mod intake_note;
mod set_state;
mod teleop_swerve;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Std
use std::cell::RefCell;
use std::rc::Rc;

// Internal
pub use arm_control::*;
pub use autos::*;
pub use climb_chain::*;
pub use intake_note::*;
pub use set_state::*;
pub use teleop_swerve::*;

use crate::subsystems::{Arm, Climber, Intake, Lighting};
use crate::swerve_ctrl::SwerveCtrl;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Shared handles to the mechanisms, captured by commands at construction.
pub type SwerveHandle = Rc<RefCell<SwerveCtrl>>;
pub type ArmHandle = Rc<RefCell<Arm>>;
pub type IntakeHandle = Rc<RefCell<Intake>>;
pub type ClimberHandle = Rc<RefCell<Climber>>;
pub type LightingHandle = Rc<RefCell<Lighting>>;
