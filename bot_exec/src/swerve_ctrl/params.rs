//! Parameters structure for SwerveCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;
use super::{ModuleGeometry, NUM_MODULES};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Swerve control.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct Params {

    // ---- GEOMETRY ----

    /// Mounting geometry of each module, in module index order.
    pub modules: [ModuleGeometry; NUM_MODULES],

    // ---- CAPABILITIES ----

    /// Maximum achievable wheel speed. If the kinematics demand more than
    /// this from any module all module speeds are scaled down together.
    ///
    /// Units: meters/second
    pub max_wheel_speed_ms: f64,

    /// Maximum linear chassis speed a command may demand.
    ///
    /// Units: meters/second
    pub max_chassis_speed_ms: f64,

    /// Maximum angular chassis rate a command may demand.
    ///
    /// Units: radians/second
    pub max_chassis_angular_rads: f64,

    /// Fractional speed cap applied while slow mode is held.
    pub slow_mode_cap: f64,

    /// Below this wheel speed the chassis is considered stationary and the
    /// module angles are held rather than recomputed.
    ///
    /// Units: meters/second
    pub stall_epsilon_ms: f64,

    // ---- DRIVE LOOP GAINS ----

    /// Drive velocity loop proportional gain.
    ///
    /// Units: volts per meters/second of error
    pub drive_kp: f64,

    /// Drive velocity loop integral gain.
    pub drive_ki: f64,

    /// Drive velocity loop derivative gain.
    pub drive_kd: f64,

    /// Static friction feedforward.
    ///
    /// Units: volts
    pub drive_ks_v: f64,

    /// Velocity feedforward.
    ///
    /// Units: volts per meters/second
    pub drive_kv_vpms: f64,

    /// Acceleration feedforward.
    ///
    /// Units: volts per meters/second^2
    pub drive_ka_vpms2: f64,

    /// Drive output saturation limit.
    ///
    /// Units: volts
    pub max_drive_volts: f64,
}
