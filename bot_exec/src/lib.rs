//! # Robot library.
//!
//! This library allows other crates in the workspace (and the integration
//! tests) to access items defined inside the robot executable crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Robot container - wires subsystems, commands, triggers and choosers together
pub mod container;

/// Common commands - concrete units of work run by the scheduler
pub mod commands;

/// Input handling - sampled controller frames and scripted input sources
pub mod input;

/// Command scheduler - cooperative per-cycle execution with exclusive
/// subsystem ownership
pub mod sched;

/// Subsystem models - arm, intake, climber and lighting at interface level
pub mod subsystems;

/// Swerve control module - converts chassis motion demands into individual
/// module commands
pub mod swerve_ctrl;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Period of the control cycle.
///
/// Units: seconds
pub const CYCLE_PERIOD_S: f64 = 0.02;
