//! Common data types passed between SwerveCtrl components

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use util::maths::wrap_pi;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A desired motion of the whole chassis, robot-relative by construction.
///
/// A field-fixed intent must be rotated into the robot frame (see
/// [`ChassisMotion::rotated`]) before being consumed by the kinematics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChassisMotion {
    /// Velocity along the robot's forward axis.
    ///
    /// Units: meters/second
    pub forward_ms: f64,

    /// Velocity along the robot's left axis.
    ///
    /// Units: meters/second
    pub strafe_ms: f64,

    /// Angular velocity about the robot's rotation centre, counter-clockwise
    /// positive.
    ///
    /// Units: radians/second
    pub angular_rads: f64,
}

/// Fixed mounting data for one swerve module. Immutable after construction.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct ModuleGeometry {
    /// Offset of the module from the robot's rotation centre, (x forward,
    /// y left).
    ///
    /// Units: meters,
    /// Frame: Robot body
    pub pos_m_rb: [f64; 2],

    /// Angular calibration offset correcting the steer sensor zero to true
    /// forward.
    ///
    /// Units: radians
    pub angle_offset_rad: f64,
}

/// The commanded state for one module, produced every cycle by the
/// kinematics.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ModuleTarget {
    /// Signed wheel speed.
    ///
    /// Units: meters/second
    pub speed_ms: f64,

    /// Wheel direction, wrapped to [-pi, pi).
    ///
    /// Units: radians
    pub angle_rad: f64,
}

/// The latest measured state of one module. Owned exclusively by the module
/// controller, read-only to everything else.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct ModuleState {
    /// Measured wheel speed.
    ///
    /// Units: meters/second
    pub speed_ms: f64,

    /// Measured wheel direction, wrapped to [-pi, pi).
    ///
    /// Units: radians
    pub angle_rad: f64,

    /// True if the module's sensors or actuators are faulted. A degraded
    /// module contributes no actuator demand but the drivetrain keeps
    /// commanding the remaining modules.
    pub degraded: bool,
}

/// The actuator command for one module emitted to the motor layer.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct ModuleDemand {
    /// Steer axis absolute position demand, continuous (unwrapped) in the
    /// steer actuator's own frame.
    ///
    /// Units: radians
    pub steer_abs_pos_rad: f64,

    /// Drive actuator output (feedback plus feedforward).
    ///
    /// Units: volts
    pub drive_volts: f64,
}

/// A drive demand set by the owning command, consumed once per cycle.
#[derive(Clone, Copy, Debug)]
pub struct DriveDemand {
    /// The desired chassis motion.
    pub motion: ChassisMotion,

    /// If true `motion` is expressed in the field frame and must be rotated
    /// by the negative of the current heading reference before use.
    pub field_relative: bool,

    /// Fractional speed cap in (0, 1], applied to all three motion
    /// components before the kinematics run.
    pub speed_cap: f64,
}

/// Estimated robot pose integrated from the inverse kinematics.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct Pose {
    /// Position in the frame the robot was started in.
    ///
    /// Units: meters
    pub pos_m_lm: [f64; 2],

    /// Raw (unreferenced) heading at the time of the last update.
    ///
    /// Units: radians
    pub heading_rad: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ChassisMotion {
    /// Scale all three components by the same factor.
    pub fn scaled(&self, factor: f64) -> Self {
        ChassisMotion {
            forward_ms: self.forward_ms * factor,
            strafe_ms: self.strafe_ms * factor,
            angular_rads: self.angular_rads * factor,
        }
    }

    /// Rotate the linear (forward, strafe) pair by the given angle, leaving
    /// the angular rate untouched.
    ///
    /// Passing the negative of the measured heading converts a field-fixed
    /// intent into a robot-relative one.
    pub fn rotated(&self, angle_rad: f64) -> Self {
        let (sin, cos) = angle_rad.sin_cos();

        ChassisMotion {
            forward_ms: self.forward_ms * cos - self.strafe_ms * sin,
            strafe_ms: self.forward_ms * sin + self.strafe_ms * cos,
            angular_rads: self.angular_rads,
        }
    }

    /// Magnitude of the linear velocity component.
    pub fn linear_speed_ms(&self) -> f64 {
        (self.forward_ms.powi(2) + self.strafe_ms.powi(2)).sqrt()
    }
}

impl ModuleTarget {
    /// A zero-speed target holding the given angle.
    pub fn stationary(angle_rad: f64) -> Self {
        ModuleTarget {
            speed_ms: 0.0,
            angle_rad: wrap_pi(angle_rad),
        }
    }
}
