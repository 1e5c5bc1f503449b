//! Autonomous routine primitives

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::SwerveHandle;
use crate::sched::{command_ref, Command, CommandError, CommandRef, SubsystemId};
use crate::swerve_ctrl::ChassisMotion;
use crate::CYCLE_PERIOD_S;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drives a fixed robot-relative chassis motion for a duration.
///
/// Cycle-counted rather than wall-clocked so the behaviour is deterministic
/// under cycle overruns. The drivetrain coasts when the time is up.
pub struct DriveForTime {
    swerve: SwerveHandle,
    motion: ChassisMotion,
    duration_s: f64,
    elapsed_cycles: usize,
    requirements: Vec<SubsystemId>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DriveForTime {
    pub fn new(
        swerve: SwerveHandle,
        motion: ChassisMotion,
        duration_s: f64,
    ) -> Self {
        DriveForTime {
            swerve,
            motion,
            duration_s,
            elapsed_cycles: 0,
            requirements: vec![SubsystemId::Drivetrain],
        }
    }
}

impl Command for DriveForTime {
    fn name(&self) -> &'static str {
        "DriveForTime"
    }

    fn requirements(&self) -> &[SubsystemId] {
        &self.requirements
    }

    fn initialize(&mut self) {
        self.elapsed_cycles = 0;
    }

    fn execute(&mut self) -> Result<(), CommandError> {
        self.swerve.borrow_mut().drive(self.motion, false, 1.0);
        self.elapsed_cycles += 1;
        Ok(())
    }

    fn is_finished(&self) -> bool {
        self.elapsed_cycles as f64 * CYCLE_PERIOD_S >= self.duration_s
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Cross the line: drive forward for two seconds.
pub fn default_auto(swerve: SwerveHandle) -> CommandRef {
    command_ref(DriveForTime::new(
        swerve,
        ChassisMotion {
            forward_ms: 1.0,
            strafe_ms: 0.0,
            angular_rads: 0.0,
        },
        2.0,
    ))
}

/// Cross the line from the right starting position: forward with a leftward
/// drift to clear the stage leg.
pub fn right_default_auto(swerve: SwerveHandle) -> CommandRef {
    command_ref(DriveForTime::new(
        swerve,
        ChassisMotion {
            forward_ms: 1.0,
            strafe_ms: 0.5,
            angular_rads: 0.0,
        },
        2.0,
    ))
}

/// Back away from the subwoofer.
pub fn back_up_auto(swerve: SwerveHandle) -> CommandRef {
    command_ref(DriveForTime::new(
        swerve,
        ChassisMotion {
            forward_ms: -0.5,
            strafe_ms: 0.0,
            angular_rads: 0.0,
        },
        1.0,
    ))
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::swerve_ctrl::{
        ModuleGeometry, Params, SimRig, SwerveCtrl, NUM_MODULES};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn test_swerve() -> SwerveHandle {
        let mut params = Params::default();
        let offsets = [
            [0.25, 0.25],
            [0.25, -0.25],
            [-0.25, 0.25],
            [-0.25, -0.25],
        ];
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
        params.drive_kv_vpms = 2.0;
        params.max_drive_volts = 12.0;

        let rig = SimRig::new(2.0);
        let io = (0..NUM_MODULES).map(|i| rig.module_io(i)).collect();
        let mut swerve = SwerveCtrl::new(io, rig.heading_sensor());
        swerve.init_with_params(params).unwrap();
        Rc::new(RefCell::new(swerve))
    }

    #[test]
    fn test_finishes_after_duration() {
        let swerve = test_swerve();
        let mut command = DriveForTime::new(
            swerve,
            ChassisMotion {
                forward_ms: 1.0,
                strafe_ms: 0.0,
                angular_rads: 0.0,
            },
            0.1,
        );

        command.initialize();
        let mut cycles = 0;
        while !command.is_finished() {
            command.execute().unwrap();
            cycles += 1;
        }

        // 0.1 s at a 0.02 s period
        assert_eq!(cycles, 5);

        // Re-initialisation restarts the clock
        command.initialize();
        assert!(!command.is_finished());
    }
}
