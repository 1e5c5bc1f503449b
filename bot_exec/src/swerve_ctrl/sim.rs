//! Simulated module and gyro hardware
//!
//! First-order stand-ins for the motor controller and gyro collaborators so
//! the executable can run from an input script with no robot attached.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::cell::RefCell;
use std::rc::Rc;

// Internal
use super::{HeadingSensor, ModuleDemand, ModuleIo, NUM_MODULES};
use util::maths::clamp;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Steer slew rate of the simulated steering actuator.
const SIM_STEER_SLEW_RADS: f64 = 12.0;

/// Time constant of the simulated drive velocity response.
const SIM_DRIVE_TAU_S: f64 = 0.1;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Default)]
struct SimModule {
    speed_ms: f64,
    raw_angle_rad: f64,
    demand: ModuleDemand,
    faulted: bool,
}

/// A bank of simulated modules plus a simulated gyro.
///
/// Hand the IO handles to `SwerveCtrl` and call `step` once per cycle to
/// advance the simulated hardware.
pub struct SimRig {
    modules: Vec<Rc<RefCell<SimModule>>>,
    heading_rad: Rc<RefCell<f64>>,

    /// Volts per meters/second of the simulated drive, used to back out a
    /// speed from the commanded output.
    drive_kv_vpms: f64,
}

/// `ModuleIo` handle onto one simulated module.
pub struct SimModuleIo(Rc<RefCell<SimModule>>);

/// `HeadingSensor` handle onto the simulated gyro.
pub struct SimHeadingSensor(Rc<RefCell<f64>>);

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimRig {
    pub fn new(drive_kv_vpms: f64) -> Self {
        let mut modules = Vec::with_capacity(NUM_MODULES);
        for _ in 0..NUM_MODULES {
            modules.push(Rc::new(RefCell::new(SimModule::default())));
        }

        SimRig {
            modules,
            heading_rad: Rc::new(RefCell::new(0.0)),
            drive_kv_vpms,
        }
    }

    /// Get the IO handle for the given module index.
    pub fn module_io(&self, index: usize) -> Box<dyn ModuleIo> {
        Box::new(SimModuleIo(self.modules[index].clone()))
    }

    /// Get the heading sensor handle.
    pub fn heading_sensor(&self) -> Box<dyn HeadingSensor> {
        Box::new(SimHeadingSensor(self.heading_rad.clone()))
    }

    /// Advance the simulated hardware by one step.
    pub fn step(&mut self, dt_s: f64) {
        for module in &self.modules {
            let mut m = module.borrow_mut();
            if m.faulted {
                continue;
            }

            // Steering follows the position demand at a limited slew rate
            let steer_err = m.demand.steer_abs_pos_rad - m.raw_angle_rad;
            let max_step = SIM_STEER_SLEW_RADS * dt_s;
            m.raw_angle_rad += clamp(&steer_err, &-max_step, &max_step);

            // Drive speed approaches the speed implied by the commanded
            // output with a first-order response
            let implied_speed = if self.drive_kv_vpms > 0.0 {
                m.demand.drive_volts / self.drive_kv_vpms
            } else {
                0.0
            };
            let alpha = (dt_s / SIM_DRIVE_TAU_S).min(1.0);
            m.speed_ms += (implied_speed - m.speed_ms) * alpha;
        }
    }

    /// Integrate the simulated gyro by the given heading delta.
    pub fn integrate_heading(&mut self, delta_rad: f64) {
        *self.heading_rad.borrow_mut() += delta_rad;
    }

    /// Force the simulated gyro to a heading.
    pub fn set_heading(&mut self, heading_rad: f64) {
        *self.heading_rad.borrow_mut() = heading_rad;
    }

    /// Directly force one module's measured state, for tests.
    pub fn set_module_state(&mut self, index: usize, speed_ms: f64, raw_angle_rad: f64) {
        let mut m = self.modules[index].borrow_mut();
        m.speed_ms = speed_ms;
        m.raw_angle_rad = raw_angle_rad;
    }

    /// Fault or recover one module's sensors.
    pub fn set_module_fault(&mut self, index: usize, faulted: bool) {
        self.modules[index].borrow_mut().faulted = faulted;
    }
}

impl ModuleIo for SimModuleIo {
    fn measured(&self) -> Option<(f64, f64)> {
        let m = self.0.borrow();
        if m.faulted {
            None
        } else {
            Some((m.speed_ms, m.raw_angle_rad))
        }
    }

    fn send(&mut self, demand: &ModuleDemand) {
        self.0.borrow_mut().demand = *demand;
    }
}

impl HeadingSensor for SimHeadingSensor {
    fn heading_rad(&self) -> f64 {
        *self.0.borrow()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_heading_sensor_tracks_gyro() {
        let mut rig = SimRig::new(2.0);
        let sensor = rig.heading_sensor();

        assert_eq!(sensor.heading_rad(), 0.0);

        rig.set_heading(1.2);
        assert!((sensor.heading_rad() - 1.2).abs() < 1e-12);

        rig.integrate_heading(0.3);
        assert!((sensor.heading_rad() - 1.5).abs() < 1e-12);
    }
}
