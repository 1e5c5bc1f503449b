//! Implementations for the SwerveCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;

// Internal
use super::{
    ChassisMotion, DriveDemand, HeadingSensor, ModuleIo,
    ModuleState, Params, Pose, SwerveCtrlError, SwerveKinematics,
    SwerveModule, NUM_MODULES};
use util::{
    archive::{Archived, Archiver},
    maths::{clamp, wrap_pi},
    module::State,
    session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Swerve control module state - the drivetrain.
///
/// Composes the kinematics engine with the four module controllers and owns
/// the heading reference used for field-relative driving.
pub struct SwerveCtrl {
    params: Params,

    report: StatusReport,
    arch_report: Archiver,

    output: Option<OutputData>,
    arch_output: Archiver,

    kinematics: Option<SwerveKinematics>,
    modules: Vec<SwerveModule>,

    /// Module IO handles stashed between construction and `init`.
    pending_io: Vec<Box<dyn ModuleIo>>,

    heading: Box<dyn HeadingSensor>,

    /// Raw heading captured by the last `zero_heading` call. Only affects
    /// the rotational reference for field-relative driving, never odometry.
    heading_ref_rad: f64,

    /// Demand set by the owning command this cycle, consumed by `proc`.
    demand: Option<DriveDemand>,

    pose: Pose,
    last_estimate: ChassisMotion,
}

/// Input data for cyclic processing of SwerveCtrl.
#[derive(Clone, Copy, Debug)]
pub struct CycleInput {
    /// Length of the control cycle.
    ///
    /// Units: seconds
    pub dt_s: f64,
}

/// Output command from SwerveCtrl that the motor layer must execute.
#[derive(Clone, Copy, Serialize, Debug, Default)]
pub struct OutputData {
    /// Steer axis absolute position demands.
    ///
    /// Units: radians
    pub steer_abs_pos_rad: [f64; NUM_MODULES],

    /// Drive actuator output demands.
    ///
    /// Units: volts
    pub drive_volts: [f64; NUM_MODULES],
}

/// Status report for SwerveCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// True if the commanded motion had to be scaled down to respect the
    /// maximum wheel speed.
    pub wheel_speed_limited: bool,

    /// Per-module degraded flags.
    pub module_degraded: [bool; NUM_MODULES],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for SwerveCtrl {
    type InitData = &'static str;
    type InitError = SwerveCtrlError;

    type InputData = CycleInput;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = SwerveCtrlError;

    /// Initialise the SwerveCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>
    {
        let params: Params = util::params::load(init_data)?;

        // Create the arch folder for swerve_ctrl
        let mut arch_path = session.arch_root.clone();
        arch_path.push("swerve_ctrl");
        std::fs::create_dir_all(arch_path).unwrap();

        // Initialise the archivers
        self.arch_report = Archiver::from_path(
            session, "swerve_ctrl/status_report.csv"
        ).unwrap();
        self.arch_output = Archiver::from_path(
            session, "swerve_ctrl/output.csv"
        ).unwrap();

        self.build(params)
    }

    /// Perform cyclic processing of Swerve Control.
    ///
    /// Consumes the demand set by the owning command since the last cycle.
    /// With no demand the drivetrain coasts: zero chassis motion, which by
    /// the stall policy holds the previous steering angles with zero drive.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        // Clear the status report
        self.report = StatusReport::default();

        if self.kinematics.is_none() {
            return Err(SwerveCtrlError::NotInitialised);
        }

        let raw_heading_rad = self.heading.heading_rad();
        let referenced_heading_rad =
            wrap_pi(raw_heading_rad - self.heading_ref_rad);

        // Resolve the demand into a robot-relative, limit-respecting motion
        let motion = match self.demand.take() {
            Some(demand) => {
                let cap = clamp(&demand.speed_cap, &0.0, &1.0);
                let mut motion = demand.motion.scaled(cap);

                if demand.field_relative {
                    motion = motion.rotated(-referenced_heading_rad);
                }

                self.enforce_limits(motion)
            }
            None => ChassisMotion::default(),
        };

        // Forward kinematics
        let (targets, limited) = self
            .kinematics
            .as_mut()
            .unwrap()
            .to_module_targets(&motion);
        self.report.wheel_speed_limited = limited;

        // Close the per-module loops and collect the actuator demands
        let mut output = OutputData::default();
        for i in 0..NUM_MODULES {
            let demand = self.modules[i].set_target(&targets[i], input_data.dt_s);
            output.steer_abs_pos_rad[i] = demand.steer_abs_pos_rad;
            output.drive_volts[i] = demand.drive_volts;
            self.report.module_degraded[i] = self.modules[i].state().degraded;
        }

        // Odometry: inverse kinematics over the measured states, integrated
        // in the raw heading frame so zeroing the heading reference does not
        // move the pose
        let states = self.module_states();
        let estimate = self
            .kinematics
            .as_ref()
            .unwrap()
            .to_chassis_motion(&states);

        let (sin, cos) = raw_heading_rad.sin_cos();
        self.pose.pos_m_lm[0] +=
            (estimate.forward_ms * cos - estimate.strafe_ms * sin) * input_data.dt_s;
        self.pose.pos_m_lm[1] +=
            (estimate.forward_ms * sin + estimate.strafe_ms * cos) * input_data.dt_s;
        self.pose.heading_rad = raw_heading_rad;
        self.last_estimate = estimate;

        trace!("SwerveCtrl output:\n    drv: {:?}\n    str: {:?}",
            output.drive_volts,
            output.steer_abs_pos_rad);

        self.output = Some(output);

        Ok((output, self.report))
    }
}

impl Archived for SwerveCtrl {
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        // Write each one individually
        self.arch_report.serialise(self.report)?;
        self.arch_output.serialise(self.output)?;

        Ok(())
    }
}

impl SwerveCtrl {
    /// Create a new uninitialised drivetrain from its hardware handles.
    ///
    /// `init` (or `init_with_params` in tests) must be called before
    /// processing.
    pub fn new(
        io: Vec<Box<dyn ModuleIo>>,
        heading: Box<dyn HeadingSensor>,
    ) -> Self {
        SwerveCtrl {
            params: Params::default(),
            report: StatusReport::default(),
            arch_report: Archiver::default(),
            output: None,
            arch_output: Archiver::default(),
            kinematics: None,
            modules: Vec::new(),
            pending_io: io,
            heading,
            heading_ref_rad: 0.0,
            demand: None,
            pose: Pose::default(),
            last_estimate: ChassisMotion::default(),
        }
    }

    /// Initialise from an in-memory parameter set, without a session. Used
    /// by the tests.
    pub fn init_with_params(&mut self, params: Params)
        -> Result<(), SwerveCtrlError>
    {
        self.build(params)
    }

    /// Validate the parameters and build the kinematics and modules.
    fn build(&mut self, params: Params) -> Result<(), SwerveCtrlError> {
        let kinematics = SwerveKinematics::new(&params)?;

        if self.pending_io.len() != NUM_MODULES {
            return Err(SwerveCtrlError::WrongIoCount {
                expected: NUM_MODULES,
                found: self.pending_io.len(),
            });
        }

        let mut modules = Vec::with_capacity(NUM_MODULES);
        for (i, io) in self.pending_io.drain(..).enumerate() {
            modules.push(SwerveModule::new(i, params.modules[i], &params, io));
        }

        self.kinematics = Some(kinematics);
        self.modules = modules;
        self.params = params;

        Ok(())
    }

    /// Set the drive demand for this cycle.
    ///
    /// The fractional `speed_cap` multiplies all components of `motion`
    /// before the kinematics run, so angle optimisation and normalisation
    /// always see the final intended speeds.
    pub fn drive(
        &mut self,
        motion: ChassisMotion,
        field_relative: bool,
        speed_cap: f64,
    ) {
        self.demand = Some(DriveDemand {
            motion,
            field_relative,
            speed_cap,
        });
    }

    /// Reset the heading reference to the current physical orientation.
    ///
    /// Does not move any actuator and does not affect the odometry pose,
    /// only the rotational reference used for field-relative driving from
    /// this point.
    pub fn zero_heading(&mut self) {
        self.heading_ref_rad = self.heading.heading_rad();
    }

    /// The current heading relative to the zeroed reference, in [-pi, pi).
    pub fn heading_rad(&self) -> f64 {
        wrap_pi(self.heading.heading_rad() - self.heading_ref_rad)
    }

    /// The estimated pose integrated from odometry.
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// The chassis motion estimated on the last cycle.
    pub fn motion_estimate(&self) -> ChassisMotion {
        self.last_estimate
    }

    /// The latest measured state of all modules.
    pub fn module_states(&self) -> [ModuleState; NUM_MODULES] {
        let mut states = [ModuleState::default(); NUM_MODULES];
        for (i, module) in self.modules.iter().enumerate() {
            states[i] = module.state();
        }
        states
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Clamp the motion's linear speed and angular rate to the configured
    /// chassis maxima, preserving the direction of travel.
    fn enforce_limits(&self, motion: ChassisMotion) -> ChassisMotion {
        let mut limited = motion;

        let linear_speed = motion.linear_speed_ms();
        if linear_speed > self.params.max_chassis_speed_ms && linear_speed > 0.0 {
            let scale = self.params.max_chassis_speed_ms / linear_speed;
            limited.forward_ms *= scale;
            limited.strafe_ms *= scale;
        }

        limited.angular_rads = clamp(
            &limited.angular_rads,
            &-self.params.max_chassis_angular_rads,
            &self.params.max_chassis_angular_rads,
        );

        limited
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::swerve_ctrl::{ModuleGeometry, SimRig};

    const PI: f64 = std::f64::consts::PI;
    const DT_S: f64 = 0.02;

    fn test_params() -> Params {
        let offsets = [
            [0.25, 0.25],
            [0.25, -0.25],
            [-0.25, 0.25],
            [-0.25, -0.25],
        ];

        let mut params = Params::default();
        for i in 0..NUM_MODULES {
            params.modules[i] = ModuleGeometry {
                pos_m_rb: offsets[i],
                angle_offset_rad: 0.0,
            };
        }
        params.max_wheel_speed_ms = 4.0;
        params.max_chassis_speed_ms = 4.0;
        params.max_chassis_angular_rads = 8.0;
        params.slow_mode_cap = 0.5;
        params.stall_epsilon_ms = 1e-3;
        params.drive_kp = 0.0;
        params.drive_kv_vpms = 2.0;
        params.max_drive_volts = 12.0;
        params
    }

    fn test_drivetrain() -> (SwerveCtrl, SimRig) {
        let rig = SimRig::new(2.0);
        let io = (0..NUM_MODULES).map(|i| rig.module_io(i)).collect();
        let mut swerve = SwerveCtrl::new(io, rig.heading_sensor());
        swerve.init_with_params(test_params()).unwrap();
        (swerve, rig)
    }

    #[test]
    fn test_proc_before_init_fails() {
        let rig = SimRig::new(2.0);
        let io = (0..NUM_MODULES).map(|i| rig.module_io(i)).collect();
        let mut swerve = SwerveCtrl::new(io, rig.heading_sensor());

        assert!(matches!(
            swerve.proc(&CycleInput { dt_s: DT_S }),
            Err(SwerveCtrlError::NotInitialised)
        ));
    }

    #[test]
    fn test_zero_heading_neutralises_field_relative() {
        let (mut swerve, mut rig) = test_drivetrain();

        // Robot physically rotated, then the driver re-zeroes "forward"
        rig.set_heading(PI / 3.0);
        swerve.zero_heading();
        assert!(swerve.heading_rad().abs() < 1e-12);

        swerve.drive(
            ChassisMotion {
                forward_ms: 1.0,
                strafe_ms: 0.5,
                angular_rads: 0.0,
            },
            true,
            1.0,
        );
        let (field_out, _) = swerve.proc(&CycleInput { dt_s: DT_S }).unwrap();

        // An identical robot-relative demand must produce identical targets
        let (mut reference, mut ref_rig) = test_drivetrain();
        ref_rig.set_heading(PI / 3.0);
        reference.zero_heading();
        reference.drive(
            ChassisMotion {
                forward_ms: 1.0,
                strafe_ms: 0.5,
                angular_rads: 0.0,
            },
            false,
            1.0,
        );
        let (robot_out, _) = reference.proc(&CycleInput { dt_s: DT_S }).unwrap();

        for i in 0..NUM_MODULES {
            assert!(
                (field_out.steer_abs_pos_rad[i] - robot_out.steer_abs_pos_rad[i])
                    .abs() < 1e-9
            );
            assert!(
                (field_out.drive_volts[i] - robot_out.drive_volts[i]).abs() < 1e-9
            );
        }
    }

    #[test]
    fn test_field_relative_rotates_intent() {
        let (mut swerve, mut rig) = test_drivetrain();

        // Facing left (+90 deg), a field-forward demand must become a
        // robot-relative rightward strafe
        rig.set_heading(PI / 2.0);

        swerve.drive(
            ChassisMotion {
                forward_ms: 1.0,
                strafe_ms: 0.0,
                angular_rads: 0.0,
            },
            true,
            1.0,
        );
        let (output, _) = swerve.proc(&CycleInput { dt_s: DT_S }).unwrap();

        // All wheels demand an angle of -90 deg
        for i in 0..NUM_MODULES {
            assert!((output.steer_abs_pos_rad[i] - (-PI / 2.0)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_speed_cap_applied_before_kinematics() {
        let (mut swerve, _rig) = test_drivetrain();

        swerve.drive(
            ChassisMotion {
                forward_ms: 2.0,
                strafe_ms: 0.0,
                angular_rads: 0.0,
            },
            false,
            0.5,
        );
        let (output, report) = swerve.proc(&CycleInput { dt_s: DT_S }).unwrap();

        // Capped to 1 m/s before the kinematics: no normalisation needed and
        // the feedforward sees the capped setpoint (kv * 1.0 plus the
        // acceleration term)
        assert!(!report.wheel_speed_limited);
        for i in 0..NUM_MODULES {
            assert!(output.drive_volts[i] > 0.0);
            assert!(output.drive_volts[i] <= 12.0);
        }

        // Same demand uncapped drives the wheels harder
        let (mut uncapped, _rig2) = test_drivetrain();
        uncapped.drive(
            ChassisMotion {
                forward_ms: 2.0,
                strafe_ms: 0.0,
                angular_rads: 0.0,
            },
            false,
            1.0,
        );
        let (full_out, _) = uncapped.proc(&CycleInput { dt_s: DT_S }).unwrap();
        for i in 0..NUM_MODULES {
            assert!(full_out.drive_volts[i] > output.drive_volts[i]);
        }
    }

    #[test]
    fn test_no_demand_coasts_with_held_angles() {
        let (mut swerve, _rig) = test_drivetrain();

        // Drive sideways to establish 90 deg steering angles
        swerve.drive(
            ChassisMotion {
                forward_ms: 0.0,
                strafe_ms: 1.0,
                angular_rads: 0.0,
            },
            false,
            1.0,
        );
        swerve.proc(&CycleInput { dt_s: DT_S }).unwrap();

        // No demand this cycle: steering held, drive output only arrests the
        // remaining measured speed (no feedforward towards motion)
        let (output, _) = swerve.proc(&CycleInput { dt_s: DT_S }).unwrap();
        for i in 0..NUM_MODULES {
            assert!((output.steer_abs_pos_rad[i] - PI / 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_degraded_module_reported_and_ignored() {
        let (mut swerve, mut rig) = test_drivetrain();
        rig.set_module_fault(1, true);

        swerve.drive(
            ChassisMotion {
                forward_ms: 1.0,
                strafe_ms: 0.0,
                angular_rads: 0.0,
            },
            false,
            1.0,
        );
        let (output, report) = swerve.proc(&CycleInput { dt_s: DT_S }).unwrap();

        assert!(report.module_degraded[1]);
        assert_eq!(output.drive_volts[1], 0.0);

        // Remaining modules still get best-effort commands
        for i in [0usize, 2, 3].iter() {
            assert!(output.drive_volts[*i] > 0.0);
        }
    }

    #[test]
    fn test_odometry_unaffected_by_zero_heading() {
        let (mut swerve, mut rig) = test_drivetrain();

        // Drive forwards for a few cycles so the sim spins up
        for _ in 0..50 {
            swerve.drive(
                ChassisMotion {
                    forward_ms: 1.0,
                    strafe_ms: 0.0,
                    angular_rads: 0.0,
                },
                false,
                1.0,
            );
            swerve.proc(&CycleInput { dt_s: DT_S }).unwrap();
            rig.step(DT_S);
        }

        let pose_before = swerve.pose();
        assert!(pose_before.pos_m_lm[0] > 0.0);

        swerve.zero_heading();
        let pose_after = swerve.pose();

        assert_eq!(pose_before.pos_m_lm, pose_after.pos_m_lm);
        assert_eq!(pose_before.heading_rad, pose_after.heading_rad);
    }
}
