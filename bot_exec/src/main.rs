//! Main robot executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Input acquisition (scripted drive-station frames)
//!         - Scheduler processing (triggers, admissions, command bodies)
//!         - Swerve control processing
//!         - Mechanism integration and simulation stepping
//!         - Archive writing
//!
//! The drivetrain module (`swerve_ctrl`) implements the
//! `util::module::State` trait and is processed once per cycle.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use bot_lib::{
    container::BotContainer,
    input::{ControllerParams, ScriptSource, SourcePoll},
    subsystems::SubsystemsParams,
    swerve_ctrl::{CycleInput, SimRig, SwerveCtrl, NUM_MODULES},
    CYCLE_PERIOD_S};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report};
use log::{debug, info, warn};
use std::env;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use util::{
    archive::Archived,
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("bot_exec", "sessions")
        .wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session)
        .wrap_err("Failed to initialise logging")?;

    info!("Swerve Bot Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let controller: ControllerParams = util::params::load("controller.toml")
        .wrap_err("Could not load controller params")?;
    let subsystems: SubsystemsParams = util::params::load("subsystems.toml")
        .wrap_err("Could not load subsystems params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE INPUT SOURCE ----

    // Collect all arguments
    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    // The script path is required, the chooser selections are optional
    if args.len() < 2 || args.len() > 4 {
        return Err(eyre!(
            "Usage: bot_exec <script> [auto option] [mode option]"
        ));
    }

    info!("Loading input script from \"{}\"", &args[1]);

    let mut script = ScriptSource::from_path(&args[1])
        .wrap_err("Failed to load the input script")?;

    info!("Loaded script lasts {:.02} s\n", script.duration_s());

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    // Simulated hardware backs the module IO and the heading sensor
    let mut rig = SimRig::new(2.0);

    let io = (0..NUM_MODULES).map(|i| rig.module_io(i)).collect();
    let mut swerve = SwerveCtrl::new(io, rig.heading_sensor());
    swerve
        .init("swerve_ctrl.toml", &session)
        .wrap_err("Failed to initialise SwerveCtrl")?;
    info!("SwerveCtrl init complete");

    let mut container = BotContainer::new(swerve, controller, subsystems)
        .wrap_err("Failed to build the robot container")?;
    info!("Container init complete\n");

    // ---- CHOOSER SELECTION ----

    if let Some(auto) = args.get(2) {
        container
            .auto_chooser
            .select(auto)
            .wrap_err("Unknown autonomous option")?;
    }
    if let Some(mode) = args.get(3) {
        container
            .mode_chooser
            .select(mode)
            .wrap_err("Unknown mode option")?;
    }

    container.start();

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let mut num_cycles: u64 = 0;
    let mut num_consec_cycle_overruns: u64 = 0;

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();
        let sim_time_s = num_cycles as f64 * CYCLE_PERIOD_S;

        // ---- INPUT ACQUISITION ----

        match script
            .poll(sim_time_s)
            .wrap_err("Input script processing failed")?
        {
            SourcePoll::Frame(frame) => {
                *container.input.borrow_mut() = frame;
            }
            SourcePoll::EndOfScript => {
                info!("End of input script reached, stopping");
                break;
            }
        }

        // ---- SCHEDULER PROCESSING ----

        let frame = *container.input.borrow();
        container.scheduler.run(&frame);

        // ---- CONTROL ALGORITHM PROCESSING ----

        // SwerveCtrl processing. Errors here usually mean a bad demand, so
        // just issue the warning and continue.
        match container.swerve.borrow_mut().proc(&CycleInput {
            dt_s: CYCLE_PERIOD_S,
        }) {
            Ok(_) => (),
            Err(e) => warn!("Error during SwerveCtrl processing: {}", e),
        }

        // Mechanism integration
        container.climber.borrow_mut().update(CYCLE_PERIOD_S);

        // Step the simulated hardware with the demands just issued
        let angular_rads = container.swerve.borrow().motion_estimate().angular_rads;
        rig.step(CYCLE_PERIOD_S);
        rig.integrate_heading(angular_rads * CYCLE_PERIOD_S);

        // ---- WRITE ARCHIVES ----

        match container.swerve.borrow_mut().write() {
            Ok(_) => (),
            Err(e) => warn!("Could not write SwerveCtrl archives: {}", e),
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(CYCLE_PERIOD_S).checked_sub(cycle_dur) {
            Some(d) => {
                num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - CYCLE_PERIOD_S
                );
                num_consec_cycle_overruns += 1;

                if num_consec_cycle_overruns > 500 {
                    return Err(eyre!(
                        "More than 500 consecutive cycle overruns"
                    ));
                }
            }
        }

        // Increment cycle counter
        num_cycles += 1;
    }

    // ---- SHUTDOWN ----

    let pose = container.swerve.borrow().pose();
    info!(
        "Final pose estimate: [{:.03}, {:.03}] m, {:.03} rad",
        pose.pos_m_lm[0], pose.pos_m_lm[1], pose.heading_rad
    );

    info!("End of execution");

    Ok(())
}
