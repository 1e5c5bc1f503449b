//! Robot container
//!
//! Owns the subsystems, the scheduler and the pre-match choosers, and wires
//! default commands and button bindings together at startup.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::info;

// Std
use std::cell::RefCell;
use std::rc::Rc;

// Internal
use crate::commands::{
    back_up_auto, default_auto, right_default_auto, ArmControl, ArmHandle,
    ClimbChain, ClimberHandle, IntakeHandle, IntakeNote, LightingHandle,
    SetRobotState, SwerveHandle, TeleopSwerve};
use crate::input::{ControllerParams, InputFrame, InputHandle};
use crate::sched::{
    command_ref, BindingKind, Chooser, CommandRef, InstantCommand, SchedError,
    Scheduler, SubsystemId, Trigger};
use crate::subsystems::{
    Arm, Climber, Intake, Lighting, RobotState, SubsystemsParams};
use crate::swerve_ctrl::SwerveCtrl;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Everything the executive needs to run the robot for one session.
pub struct BotContainer {
    pub scheduler: Scheduler,

    /// The live input frame, updated once per cycle before the scheduler
    /// runs. Commands hold clones of this handle.
    pub input: InputHandle,

    pub swerve: SwerveHandle,
    pub arm: ArmHandle,
    pub intake: IntakeHandle,
    pub climber: ClimberHandle,
    pub lighting: LightingHandle,

    /// Autonomous routine selection.
    pub auto_chooser: Chooser<CommandRef>,

    /// Match mode selection (lighting state on startup).
    pub mode_chooser: Chooser<CommandRef>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl BotContainer {
    /// Build the container: wrap the mechanisms in shared handles, register
    /// default commands, bind the buttons and populate the choosers.
    pub fn new(
        swerve: SwerveCtrl,
        controller: ControllerParams,
        subsystems: SubsystemsParams,
    ) -> Result<Self, SchedError> {
        let input: InputHandle = Rc::new(RefCell::new(InputFrame::default()));

        let swerve: SwerveHandle = Rc::new(RefCell::new(swerve));
        let arm: ArmHandle =
            Rc::new(RefCell::new(Arm::new(subsystems.arm)));
        let intake: IntakeHandle =
            Rc::new(RefCell::new(Intake::new(subsystems.intake)));
        let climber: ClimberHandle =
            Rc::new(RefCell::new(Climber::new(subsystems.climber)));
        let lighting: LightingHandle = Rc::new(RefCell::new(Lighting::new()));

        let mut scheduler = Scheduler::new();

        // Default commands
        scheduler.set_default_command(
            SubsystemId::Drivetrain,
            command_ref(TeleopSwerve::new(
                swerve.clone(),
                input.clone(),
                controller.clone(),
            )),
        )?;
        scheduler.set_default_command(
            SubsystemId::Arm,
            command_ref(ArmControl::new(
                arm.clone(),
                input.clone(),
                controller.clone(),
            )),
        )?;

        // Button bindings
        let zero_gyro = {
            let swerve = swerve.clone();
            command_ref(InstantCommand::new(
                "ZeroGyro",
                vec![SubsystemId::Drivetrain],
                move || swerve.borrow_mut().zero_heading(),
            ))
        };
        scheduler.add_trigger(Trigger::new(
            controller.zero_gyro_button,
            BindingKind::OnTrue,
            zero_gyro,
        ));
        scheduler.add_trigger(Trigger::new(
            controller.intake_button,
            BindingKind::WhileTrue,
            command_ref(IntakeNote::new(intake.clone(), arm.clone())),
        ));
        scheduler.add_trigger(Trigger::new(
            controller.climb_button,
            BindingKind::WhileTrue,
            command_ref(ClimbChain::new(climber.clone())),
        ));

        // Pre-match choosers
        let mut auto_chooser = Chooser::new("auto");
        auto_chooser.set_default("Default Auto", default_auto(swerve.clone()));
        auto_chooser.add_option(
            "Right Default",
            right_default_auto(swerve.clone()),
        );
        auto_chooser.add_option("BackUp", back_up_auto(swerve.clone()));

        let mut mode_chooser = Chooser::new("mode");
        mode_chooser.set_default(
            "Match Mode",
            command_ref(SetRobotState::new(
                lighting.clone(),
                RobotState::Enabled,
            )),
        );
        mode_chooser.add_option(
            "Test mode",
            command_ref(SetRobotState::new(
                lighting.clone(),
                RobotState::TestMode,
            )),
        );

        Ok(BotContainer {
            scheduler,
            input,
            swerve,
            arm,
            intake,
            climber,
            lighting,
            auto_chooser,
            mode_chooser,
        })
    }

    /// Schedule the chooser selections at the start of the run.
    pub fn start(&mut self) {
        if let Some(mode) = self.mode_chooser.get() {
            self.scheduler.schedule(&mode.clone());
        }

        if let Some(auto) = self.auto_chooser.get() {
            info!(
                "Running autonomous routine {:?}",
                self.auto_chooser.selected_label().unwrap_or("?")
            );
            self.scheduler.schedule(&auto.clone());
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::swerve_ctrl::{
        ModuleGeometry, Params, SimRig, NUM_MODULES};

    fn test_swerve() -> SwerveCtrl {
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
        swerve
    }

    fn test_controller() -> ControllerParams {
        ControllerParams {
            stick_deadband: 0.1,
            translation_axis: 1,
            strafe_axis: 0,
            rotation_axis: 4,
            arm_axis: 5,
            zero_gyro_button: 3,
            robot_centric_button: 4,
            slow_mode_button: 5,
            intake_button: 0,
            climb_button: 1,
        }
    }

    #[test]
    fn test_mode_selection_sets_lighting_state() {
        let mut container = BotContainer::new(
            test_swerve(),
            test_controller(),
            SubsystemsParams::default(),
        )
        .unwrap();

        container.mode_chooser.select("Test mode").unwrap();
        container.start();
        let input = *container.input.borrow();
        container.scheduler.run(&input);

        assert_eq!(container.lighting.borrow().state(), RobotState::TestMode);
    }

    #[test]
    fn test_intake_binding_drives_and_releases() {
        let mut container = BotContainer::new(
            test_swerve(),
            test_controller(),
            SubsystemsParams {
                intake: crate::subsystems::IntakeParams {
                    collect_output: 0.9,
                },
                ..SubsystemsParams::default()
            },
        )
        .unwrap();

        container.input.borrow_mut().set_button(0, true);
        let input = *container.input.borrow();
        container.scheduler.run(&input);
        assert_eq!(container.intake.borrow().output(), 0.9);

        container.input.borrow_mut().set_button(0, false);
        let input = *container.input.borrow();
        container.scheduler.run(&input);
        assert_eq!(container.intake.borrow().output(), 0.0);
    }
}
