//! Arm mechanism model

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

/// Arm profile parameters.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct ArmParams {
    /// Soft limit on the main arm output magnitude, normalised.
    pub max_output: f64,

    /// Output applied to the indexer rollers when feeding.
    pub indexer_feed_output: f64,
}

/// The arm: a pivoting mechanism with indexer rollers on the end effector.
#[derive(Default)]
pub struct Arm {
    params: ArmParams,
    output: f64,
    indexer_output: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Arm {
    pub fn new(params: ArmParams) -> Self {
        Arm {
            params,
            output: 0.0,
            indexer_output: 0.0,
        }
    }

    /// Command the main arm output. Saturation against the soft limit is
    /// silent.
    pub fn set_output(&mut self, output: f64) {
        self.output = clamp(
            &output,
            &-self.params.max_output,
            &self.params.max_output,
        );
    }

    /// Run the indexer rollers at the configured feed output.
    pub fn feed(&mut self) {
        self.indexer_output = self.params.indexer_feed_output;
    }

    pub fn stop_indexer(&mut self) {
        self.indexer_output = 0.0;
    }

    pub fn output(&self) -> f64 {
        self.output
    }

    pub fn indexer_output(&self) -> f64 {
        self.indexer_output
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
