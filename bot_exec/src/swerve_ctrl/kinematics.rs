//! Swerve kinematics engine
//!
//! Bidirectional transform between a chassis motion and four module states.
//! The forward transform decomposes the chassis velocity into per-module
//! wheel vectors, the inverse is a least-squares solve used for odometry.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{DMatrix, DVector, Vector2};

// Internal
use super::{
    ChassisMotion, ModuleState, ModuleTarget, Params, SwerveCtrlError,
    NUM_MODULES};
use util::maths::{ang_dist_pi, wrap_pi};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Modules mounted closer to the rotation centre than this are rejected as a
/// configuration error, since their steer angle under rotation would be
/// undefined.
const MIN_MODULE_OFFSET_M: f64 = 1e-6;

/// Singular value cutoff for the least-squares inverse solve.
const SVD_EPSILON: f64 = 1e-10;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The swerve kinematics engine.
///
/// Owns the mounting geometry of the four modules and the previous cycle's
/// module angles, which are held when the chassis is commanded to a stop.
pub struct SwerveKinematics {
    /// Module offsets from the rotation centre, (x forward, y left).
    offsets: [Vector2<f64>; NUM_MODULES],

    /// Maximum achievable wheel speed, used for normalisation.
    max_wheel_speed_ms: f64,

    /// Wheel speeds below this are treated as a stall.
    stall_epsilon_ms: f64,

    /// Module angles computed on the previous cycle, held during a stall to
    /// avoid wheel jitter at a full stop.
    last_angles_rad: [f64; NUM_MODULES],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SwerveKinematics {
    /// Build the engine from the module parameters.
    ///
    /// Fails with a configuration error if any module sits at the rotation
    /// centre or the configured limits are not positive - the system must
    /// refuse to start rather than produce undefined kinematics.
    pub fn new(params: &Params) -> Result<Self, SwerveCtrlError> {
        let mut offsets = [Vector2::zeros(); NUM_MODULES];

        for (i, geom) in params.modules.iter().enumerate() {
            let offset = Vector2::new(geom.pos_m_rb[0], geom.pos_m_rb[1]);

            if offset.norm() < MIN_MODULE_OFFSET_M {
                return Err(SwerveCtrlError::InvalidGeometry(
                    i,
                    format!(
                        "module offset {:?} m is on the rotation centre",
                        geom.pos_m_rb
                    ),
                ));
            }

            offsets[i] = offset;
        }

        if params.max_wheel_speed_ms <= 0.0 {
            return Err(SwerveCtrlError::InvalidLimit(format!(
                "max_wheel_speed_ms must be positive, got {}",
                params.max_wheel_speed_ms
            )));
        }

        if params.stall_epsilon_ms < 0.0 {
            return Err(SwerveCtrlError::InvalidLimit(format!(
                "stall_epsilon_ms must not be negative, got {}",
                params.stall_epsilon_ms
            )));
        }

        Ok(SwerveKinematics {
            offsets,
            max_wheel_speed_ms: params.max_wheel_speed_ms,
            stall_epsilon_ms: params.stall_epsilon_ms,
            last_angles_rad: [0.0; NUM_MODULES],
        })
    }

    /// Decompose a chassis motion into the four module targets.
    ///
    /// Each module's wheel vector is the chassis linear velocity plus the
    /// tangential contribution of the angular velocity at the module's
    /// offset, `v_i = (fwd, strafe) + w * (-y_i, x_i)`.
    ///
    /// If any module would exceed the maximum wheel speed all four speeds
    /// are scaled down by the same factor so the fastest sits exactly at the
    /// limit, preserving the motion's shape. The returned flag is true when
    /// this normalisation was applied.
    ///
    /// If all four wheel speeds are below the stall epsilon, the previous
    /// cycle's angles are held and all speeds are zero.
    pub fn to_module_targets(
        &mut self,
        motion: &ChassisMotion,
    ) -> ([ModuleTarget; NUM_MODULES], bool) {
        let mut wheel_vels = [Vector2::zeros(); NUM_MODULES];
        let mut max_speed = 0f64;

        for i in 0..NUM_MODULES {
            wheel_vels[i] = Vector2::new(
                motion.forward_ms - motion.angular_rads * self.offsets[i].y,
                motion.strafe_ms + motion.angular_rads * self.offsets[i].x,
            );

            if wheel_vels[i].norm() > max_speed {
                max_speed = wheel_vels[i].norm();
            }
        }

        // Stall - hold the previous angles rather than recomputing them
        // from near-zero vectors, which would make the wheels jitter.
        if max_speed < self.stall_epsilon_ms {
            let mut targets = [ModuleTarget::stationary(0.0); NUM_MODULES];
            for i in 0..NUM_MODULES {
                targets[i] = ModuleTarget::stationary(self.last_angles_rad[i]);
            }
            return (targets, false);
        }

        // Normalise so the fastest wheel is exactly at the limit
        let scale = if max_speed > self.max_wheel_speed_ms {
            self.max_wheel_speed_ms / max_speed
        } else {
            1.0
        };

        let mut targets = [ModuleTarget::stationary(0.0); NUM_MODULES];

        for i in 0..NUM_MODULES {
            let speed = wheel_vels[i].norm();

            // A single stalled wheel within a moving chassis also holds its
            // previous angle.
            let angle = if speed < self.stall_epsilon_ms {
                self.last_angles_rad[i]
            } else {
                wrap_pi(wheel_vels[i].y.atan2(wheel_vels[i].x))
            };

            targets[i] = ModuleTarget {
                speed_ms: speed * scale,
                angle_rad: angle,
            };
            self.last_angles_rad[i] = angle;
        }

        (targets, scale < 1.0)
    }

    /// Estimate the chassis motion from the measured module states.
    ///
    /// This is a least-squares solve over the non-degraded modules only. It
    /// is not exact when wheels slip and is treated as a best estimate for
    /// odometry, never a guarantee.
    pub fn to_chassis_motion(
        &self,
        states: &[ModuleState; NUM_MODULES],
    ) -> ChassisMotion {
        // Each healthy module contributes two rows:
        //   vx_i = fwd - w * y_i
        //   vy_i = strafe + w * x_i
        let mut rows: Vec<f64> = Vec::with_capacity(NUM_MODULES * 6);
        let mut rhs: Vec<f64> = Vec::with_capacity(NUM_MODULES * 2);

        for i in 0..NUM_MODULES {
            if states[i].degraded {
                continue;
            }

            rows.extend_from_slice(&[1.0, 0.0, -self.offsets[i].y]);
            rows.extend_from_slice(&[0.0, 1.0, self.offsets[i].x]);

            let (sin, cos) = states[i].angle_rad.sin_cos();
            rhs.push(states[i].speed_ms * cos);
            rhs.push(states[i].speed_ms * sin);
        }

        // With fewer than two healthy modules the system is underdetermined,
        // report no motion rather than a garbage estimate.
        if rhs.len() < 4 {
            return ChassisMotion::default();
        }

        let matrix = DMatrix::from_row_slice(rhs.len(), 3, &rows);
        let b = DVector::from_row_slice(&rhs);

        match matrix.svd(true, true).solve(&b, SVD_EPSILON) {
            Ok(solution) => ChassisMotion {
                forward_ms: solution[0],
                strafe_ms: solution[1],
                angular_rads: solution[2],
            },
            Err(_) => ChassisMotion::default(),
        }
    }

    /// Optimise a module target against the current wheel angle.
    ///
    /// If the shortest rotation to the target exceeds 90 degrees the
    /// opposite angle is commanded with negated speed instead - a wheel
    /// spinning backwards at the reversed angle produces the same net motion
    /// without a needless half rotation. At exactly 90 degrees no flip is
    /// applied (stability over minimality), which also makes the
    /// optimisation idempotent.
    pub fn optimize_target(
        target: &ModuleTarget,
        current_angle_rad: f64,
    ) -> ModuleTarget {
        let delta = ang_dist_pi(current_angle_rad, target.angle_rad);

        if delta.abs() > std::f64::consts::FRAC_PI_2 {
            ModuleTarget {
                speed_ms: -target.speed_ms,
                angle_rad: wrap_pi(target.angle_rad + std::f64::consts::PI),
            }
        } else {
            *target
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
