//! Climber mechanism model

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use util::maths::clamp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Climber profile parameters.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct ClimberParams {
    /// Extension soft limit.
    ///
    /// Units: meters
    pub max_height_m: f64,

    /// Extension rate at full output.
    ///
    /// Units: meters/second
    pub rate_mps: f64,
}

/// The climber hooks. Extension is integrated from the commanded output so
/// the soft limit can be enforced without a dedicated sensor.
#[derive(Default)]
pub struct Climber {
    params: ClimberParams,
    output: f64,
    height_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Climber {
    pub fn new(params: ClimberParams) -> Self {
        Climber {
            params,
            output: 0.0,
            height_m: 0.0,
        }
    }

    /// Command the extension output, normalised and clamped. Positive
    /// extends.
    pub fn set_output(&mut self, output: f64) {
        self.output = clamp(&output, &-1.0, &1.0);
    }

    pub fn stop(&mut self) {
        self.output = 0.0;
    }

    /// Integrate the extension estimate over one control cycle, holding at
    /// the travel limits.
    pub fn update(&mut self, dt_s: f64) {
        self.height_m = clamp(
            &(self.height_m + self.output * self.params.rate_mps * dt_s),
            &0.0,
            &self.params.max_height_m,
        );
    }

    pub fn height_m(&self) -> f64 {
        self.height_m
    }

    pub fn output(&self) -> f64 {
        self.output
    }

    pub fn at_max(&self) -> bool {
        self.height_m >= self.params.max_height_m
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
