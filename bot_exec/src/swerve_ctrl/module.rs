//! Per-module closed-loop controller
//!
//! Drives one drive actuator and one steering actuator to track a
//! `ModuleTarget`. The steering loop closes on angle with a continuous
//! (shortest-path) position demand, the drive loop closes on velocity with
//! PID feedback plus static/velocity/acceleration feedforward. The module
//! owns no scheduling logic - it is called directly by the drivetrain once
//! per cycle.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::{
    ModuleDemand, ModuleGeometry, ModuleState, ModuleTarget, Params,
    SwerveKinematics};
use util::maths::{ang_dist_pi, clamp, wrap_pi};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Hardware boundary for one module.
///
/// The concrete motor controller layer is an external collaborator, the
/// control core only assumes it can report measurements and accept setpoint
/// demands.
pub trait ModuleIo {
    /// Latest measured (drive speed in m/s, raw continuous steer position in
    /// radians), or `None` on sensor dropout. Must never block.
    fn measured(&self) -> Option<(f64, f64)>;

    /// Issue the demand to the actuators.
    fn send(&mut self, demand: &ModuleDemand);
}

/// Heading reference source (gyro), an external collaborator.
pub trait HeadingSensor {
    /// The raw measured heading in radians, counter-clockwise positive. Not
    /// wrapped, never blocks.
    fn heading_rad(&self) -> f64;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Closed-loop controller for a single swerve module.
pub struct SwerveModule {
    id: usize,
    geom: ModuleGeometry,
    io: Box<dyn ModuleIo>,

    // Drive loop gains
    kp: f64,
    ki: f64,
    kd: f64,
    ks_v: f64,
    kv_vpms: f64,
    ka_vpms2: f64,
    max_volts: f64,

    // Drive loop state
    integral: f64,
    prev_error_ms: f64,
    prev_target_speed_ms: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SwerveModule {
    pub fn new(
        id: usize,
        geom: ModuleGeometry,
        params: &Params,
        io: Box<dyn ModuleIo>,
    ) -> Self {
        SwerveModule {
            id,
            geom,
            io,
            kp: params.drive_kp,
            ki: params.drive_ki,
            kd: params.drive_kd,
            ks_v: params.drive_ks_v,
            kv_vpms: params.drive_kv_vpms,
            ka_vpms2: params.drive_ka_vpms2,
            max_volts: params.max_drive_volts,
            integral: 0.0,
            prev_error_ms: 0.0,
            prev_target_speed_ms: 0.0,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// The latest sensor-derived state. Never blocks, a dropout is reported
    /// as a degraded state rather than an error.
    pub fn state(&self) -> ModuleState {
        match self.io.measured() {
            Some((speed_ms, raw_angle_rad)) => ModuleState {
                speed_ms,
                angle_rad: wrap_pi(raw_angle_rad - self.geom.angle_offset_rad),
                degraded: false,
            },
            None => ModuleState {
                speed_ms: 0.0,
                angle_rad: 0.0,
                degraded: true,
            },
        }
    }

    /// Run both closed loops once against the given target and issue the
    /// resulting demand to the actuators.
    pub fn set_target(
        &mut self,
        target: &ModuleTarget,
        dt_s: f64,
    ) -> ModuleDemand {
        let (measured_speed_ms, raw_angle_rad) = match self.io.measured() {
            Some(m) => m,
            None => {
                // Degraded module: contribute nothing, drop loop state so a
                // recovered sensor does not act on a stale integral.
                self.reset_loops();
                return ModuleDemand::default();
            }
        };

        let measured_angle_rad =
            wrap_pi(raw_angle_rad - self.geom.angle_offset_rad);

        let target = SwerveKinematics::optimize_target(target, measured_angle_rad);

        // Steering: continuous position demand, the actuator takes the
        // shortest path from its current raw position.
        let steer_abs_pos_rad =
            raw_angle_rad + ang_dist_pi(measured_angle_rad, target.angle_rad);

        // Drive: PID feedback plus feedforward on the velocity setpoint
        let error_ms = target.speed_ms - measured_speed_ms;

        let (derivative, accel_ms2) = if dt_s > 0.0 {
            (
                (error_ms - self.prev_error_ms) / dt_s,
                (target.speed_ms - self.prev_target_speed_ms) / dt_s,
            )
        } else {
            (0.0, 0.0)
        };

        self.integral += error_ms * dt_s;
        if self.ki != 0.0 {
            let integral_limit = self.max_volts / self.ki.abs();
            self.integral =
                clamp(&self.integral, &-integral_limit, &integral_limit);
        }

        let static_v = if target.speed_ms.abs() > f64::EPSILON {
            self.ks_v * target.speed_ms.signum()
        } else {
            0.0
        };

        let feedforward_v = static_v
            + self.kv_vpms * target.speed_ms
            + self.ka_vpms2 * accel_ms2;

        let feedback_v =
            self.kp * error_ms + self.ki * self.integral + self.kd * derivative;

        let demand = ModuleDemand {
            steer_abs_pos_rad,
            drive_volts: clamp(
                &(feedforward_v + feedback_v),
                &-self.max_volts,
                &self.max_volts,
            ),
        };

        self.prev_error_ms = error_ms;
        self.prev_target_speed_ms = target.speed_ms;

        self.io.send(&demand);

        demand
    }

    fn reset_loops(&mut self) {
        self.integral = 0.0;
        self.prev_error_ms = 0.0;
        self.prev_target_speed_ms = 0.0;
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    const PI: f64 = std::f64::consts::PI;

    /// Test double recording the sent demand and returning a settable
    /// measurement.
    #[derive(Default)]
    struct FakeIo {
        measured: Option<(f64, f64)>,
        sent: Option<ModuleDemand>,
    }

    #[derive(Clone, Default)]
    struct FakeIoHandle(Rc<RefCell<FakeIo>>);

    impl ModuleIo for FakeIoHandle {
        fn measured(&self) -> Option<(f64, f64)> {
            self.0.borrow().measured
        }

        fn send(&mut self, demand: &ModuleDemand) {
            self.0.borrow_mut().sent = Some(*demand);
        }
    }

    fn test_module(io: FakeIoHandle) -> SwerveModule {
        let mut params = Params::default();
        params.drive_kp = 0.5;
        params.drive_ks_v = 0.2;
        params.drive_kv_vpms = 2.0;
        params.max_drive_volts = 12.0;

        SwerveModule::new(
            0,
            ModuleGeometry {
                pos_m_rb: [0.25, 0.25],
                angle_offset_rad: 0.0,
            },
            &params,
            Box::new(io),
        )
    }

    #[test]
    fn test_steer_demand_takes_shortest_path() {
        let io = FakeIoHandle::default();
        // Wheel is several turns into its travel, measured at a wrapped
        // angle of zero
        io.0.borrow_mut().measured = Some((0.0, 4.0 * PI));

        let mut module = test_module(io.clone());
        let demand = module.set_target(
            &ModuleTarget {
                speed_ms: 1.0,
                angle_rad: 0.3,
            },
            0.02,
        );

        // Continuous demand stays near the raw position instead of
        // rewinding to the wrapped target
        assert!((demand.steer_abs_pos_rad - (4.0 * PI + 0.3)).abs() < 1e-9);
        assert!(io.0.borrow().sent.is_some());
    }

    #[test]
    fn test_flip_applied_against_measured_angle() {
        let io = FakeIoHandle::default();
        io.0.borrow_mut().measured = Some((0.0, 0.0));

        let mut module = test_module(io);
        let demand = module.set_target(
            &ModuleTarget {
                speed_ms: 1.0,
                angle_rad: PI - 0.2,
            },
            0.02,
        );

        // Target is more than a quarter turn away: reversed angle, negated
        // speed, so the drive output goes negative
        assert!((demand.steer_abs_pos_rad - (-0.2)).abs() < 1e-9);
        assert!(demand.drive_volts < 0.0);
    }

    #[test]
    fn test_drive_feedforward_tracks_setpoint() {
        let io = FakeIoHandle::default();
        // Already at the target speed: output is pure feedforward
        io.0.borrow_mut().measured = Some((1.5, 0.0));

        let mut module = test_module(io);
        module.prev_target_speed_ms = 1.5;
        let demand = module.set_target(
            &ModuleTarget {
                speed_ms: 1.5,
                angle_rad: 0.0,
            },
            0.02,
        );

        // ks * sign + kv * v = 0.2 + 3.0
        assert!((demand.drive_volts - 3.2).abs() < 1e-9);
    }

    #[test]
    fn test_dropout_reports_degraded_and_zero_demand() {
        let io = FakeIoHandle::default();

        let mut module = test_module(io.clone());
        assert!(module.state().degraded);

        let demand = module.set_target(
            &ModuleTarget {
                speed_ms: 2.0,
                angle_rad: 0.0,
            },
            0.02,
        );

        assert_eq!(demand.drive_volts, 0.0);
        assert_eq!(demand.steer_abs_pos_rad, 0.0);
        // Nothing sent to a faulted actuator
        assert!(io.0.borrow().sent.is_none());
    }

    #[test]
    fn test_angle_offset_calibration() {
        let io = FakeIoHandle::default();
        // Raw sensor reads the calibration offset when the wheel points
        // true forward
        io.0.borrow_mut().measured = Some((0.0, 0.7));

        let mut params = Params::default();
        params.max_drive_volts = 12.0;
        let mut module = SwerveModule::new(
            1,
            ModuleGeometry {
                pos_m_rb: [0.25, -0.25],
                angle_offset_rad: 0.7,
            },
            &params,
            Box::new(io),
        );

        assert!(module.state().angle_rad.abs() < 1e-12);

        // Demanding forward keeps the steer at its raw position
        let demand = module.set_target(
            &ModuleTarget {
                speed_ms: 1.0,
                angle_rad: 0.0,
            },
            0.02,
        );
        assert!((demand.steer_abs_pos_rad - 0.7).abs() < 1e-12);
    }
}
