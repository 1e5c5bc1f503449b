//! Drive-station input handling
//!
//! Input reaches the executive as one [`InputFrame`] per control cycle. In
//! the absence of real hardware frames are replayed from a timestamped
//! script file via [`ScriptSource`].

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Std
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

// Internal
use util::script_interpreter::{PendingEntries, ScriptError, ScriptInterpreter};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of analogue axes on the drive-station controller.
pub const NUM_AXES: usize = 6;

/// Number of buttons in the input frame's bitfield.
pub const NUM_BUTTONS: u8 = 32;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One cycle's worth of controller state.
///
/// Axes are in [-1, 1] and raw, consumers apply their own deadband via
/// `util::maths::apply_deadband`. Buttons are a bitfield indexed by the
/// controller profile.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct InputFrame {
    pub axes: [f64; NUM_AXES],
    pub buttons: u32,
}

/// A shared handle to the frame sampled this cycle.
///
/// Commands capture a clone at construction and read the live frame each
/// `execute`, mirroring how they capture subsystem handles.
pub type InputHandle = Rc<RefCell<InputFrame>>;

/// Controller profile loaded from the params file: which axis or button
/// index carries which function.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ControllerParams {
    /// Deadband applied by consumers of the translation/rotation axes.
    pub stick_deadband: f64,

    pub translation_axis: usize,
    pub strafe_axis: usize,
    pub rotation_axis: usize,
    pub arm_axis: usize,

    pub zero_gyro_button: u8,
    pub robot_centric_button: u8,
    pub slow_mode_button: u8,
    pub intake_button: u8,
    pub climb_button: u8,
}

/// Replays input frames from a timestamped script.
///
/// Each script entry is a JSON object updating the current frame, e.g.
/// `1.5: {"axes": [0.0, 0.8], "buttons": [3]};`. Omitted fields keep their
/// previous value, a present `buttons` list replaces the whole pressed set.
/// The frame persists between entries so a stick deflection holds until the
/// script changes it.
pub struct ScriptSource {
    interpreter: ScriptInterpreter,
    frame: InputFrame,
}

/// Partial frame update parsed from a script entry.
#[derive(Deserialize)]
struct FrameUpdate {
    axes: Option<Vec<f64>>,
    buttons: Option<Vec<u8>>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Result of polling the script source for one cycle.
pub enum SourcePoll {
    /// The frame that applies this cycle.
    Frame(InputFrame),

    /// The script has no further entries, the run should stop.
    EndOfScript,
}

/// Possible errors raised by input processing.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Cannot interpret the input script: {0}")]
    Script(#[from] ScriptError),

    #[error("Invalid frame update at {0} s: {1}")]
    BadFrameUpdate(f64, serde_json::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl InputFrame {
    pub fn axis(&self, index: usize) -> f64 {
        if index < NUM_AXES {
            self.axes[index]
        } else {
            0.0
        }
    }

    pub fn button(&self, index: u8) -> bool {
        if index < NUM_BUTTONS {
            self.buttons & (1u32 << index) != 0
        } else {
            false
        }
    }

    pub fn set_axis(&mut self, index: usize, value: f64) {
        if index < NUM_AXES {
            self.axes[index] = value;
        }
    }

    pub fn set_button(&mut self, index: u8, pressed: bool) {
        if index >= NUM_BUTTONS {
            return;
        }

        if pressed {
            self.buttons |= 1u32 << index;
        } else {
            self.buttons &= !(1u32 << index);
        }
    }
}

impl ScriptSource {
    /// Load the script at the given path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, InputError> {
        Ok(ScriptSource {
            interpreter: ScriptInterpreter::new(path)?,
            frame: InputFrame::default(),
        })
    }

    /// The length of the script in seconds.
    pub fn duration_s(&self) -> f64 {
        self.interpreter.get_duration()
    }

    /// Apply all entries due at `time_s` and return the frame for this
    /// cycle, or `EndOfScript` once the script is exhausted.
    pub fn poll(&mut self, time_s: f64) -> Result<SourcePoll, InputError> {
        match self.interpreter.get_pending_entries(time_s) {
            PendingEntries::None => Ok(SourcePoll::Frame(self.frame)),
            PendingEntries::Some(payloads) => {
                for payload in payloads {
                    let update: FrameUpdate =
                        serde_json::from_value(payload).map_err(|e| {
                            InputError::BadFrameUpdate(time_s, e)
                        })?;
                    self.apply(update);
                }
                Ok(SourcePoll::Frame(self.frame))
            }
            PendingEntries::EndOfScript => Ok(SourcePoll::EndOfScript),
        }
    }

    fn apply(&mut self, update: FrameUpdate) {
        if let Some(axes) = update.axes {
            for (index, value) in axes.iter().enumerate().take(NUM_AXES) {
                self.frame.axes[index] = *value;
            }
        }

        if let Some(buttons) = update.buttons {
            self.frame.buttons = 0;
            for button in buttons {
                self.frame.set_button(button, true);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
