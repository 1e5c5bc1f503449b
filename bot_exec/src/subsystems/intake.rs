//! Intake mechanism model

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

/// Intake profile parameters.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct IntakeParams {
    /// Output applied to the rollers when collecting.
    pub collect_output: f64,
}

/// The intake rollers.
#[derive(Default)]
pub struct Intake {
    params: IntakeParams,
    output: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Intake {
    pub fn new(params: IntakeParams) -> Self {
        Intake {
            params,
            output: 0.0,
        }
    }

    /// Run the rollers at the configured collect output.
    pub fn collect(&mut self) {
        self.output = self.params.collect_output;
    }

    pub fn stop(&mut self) {
        self.output = 0.0;
    }

    /// Command an arbitrary roller output, normalised and clamped.
    pub fn set_output(&mut self, output: f64) {
        self.output = clamp(&output, &-1.0, &1.0);
    }

    pub fn output(&self) -> f64 {
        self.output
    }
}
