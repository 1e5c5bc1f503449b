//! # Input script interpreter module
//!
//! This module provides an interpreter for timestamped input scripts. A
//! script is a plain text file in which each line has the format
//! `<time_s>: <json payload>;`. The payload is kept as raw JSON so callers
//! can deserialise it into whatever structure they need.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use regex::RegexBuilder;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A payload which is scripted to occur at a specific time.
struct Entry {
    /// The time the payload is supposed to apply at
    exec_time_s: f64,

    /// The raw JSON payload
    payload: serde_json::Value
}

/// A script interpreter.
///
/// After initialising with the path to the script to run use
/// `.get_pending_entries` to acquire the payloads that apply now.
pub struct ScriptInterpreter {
    _script_path: PathBuf,
    entries: VecDeque<Entry>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0}")]
    ScriptNotFound(String),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error(
        "Script contains an invalid timestamp: {0}. \
        Should be a float (like 1.0)")]
    InvalidTimestamp(String),

    #[error("Script contains an invalid payload at {0} s: {1}")]
    InvalidPayload(f64, serde_json::Error)
}

pub enum PendingEntries {
    None,
    Some(Vec<serde_json::Value>),
    EndOfScript
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ScriptInterpreter {

    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {

        // Get the path in a buffer
        let path = PathBuf::from(script_path.as_ref());

        // Check that the script file exists.
        if !path.exists() {
            return Err(
                ScriptError::ScriptNotFound(path.to_str().unwrap().to_string()));
        }

        // Load the script into a string
        let script = match fs::read_to_string(script_path) {
            Ok(s) => s,
            Err(e) => return Err(ScriptError::ScriptLoadError(e))
        };

        // Empty queue of entries
        let mut queue: VecDeque<Entry> = VecDeque::new();

        // Go through the script executing __the magic regex__.
        let re = RegexBuilder::
            new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
            .unwrap();

        let mut num_caps = 0;

        for cap in re.captures_iter(&script) {
            // Parse the exec time
            let exec_time_s: f64 = match cap.get(1).unwrap().as_str().parse() {
                Ok(t) => t,
                Err(e) => return Err(
                    ScriptError::InvalidTimestamp(format!("{}", e)))
            };

            // Parse the payload. The scripts contain JSON only.
            let payload = match serde_json::from_str(
                cap.get(3).unwrap().as_str())
            {
                Ok(p) => p,
                Err(e) => return Err(ScriptError::InvalidPayload(
                    exec_time_s, e
                ))
            };

            // Build an entry from the match
            queue.push_back(Entry {
                exec_time_s,
                payload
            });

            num_caps += 1;
        }

        if num_caps == 0 {
            return Err(ScriptError::ScriptEmpty)
        }

        Ok(ScriptInterpreter {
            _script_path: path,
            entries: queue
        })
    }

    /// Return a vector of pending payloads, or `None` if no payload applies
    /// at `current_time_s`.
    pub fn get_pending_entries(&mut self, current_time_s: f64) -> PendingEntries {

        // If the queue is empty the script is over and we return the end of
        // script variant
        if self.entries.len() == 0 {
            return PendingEntries::EndOfScript
        }

        let mut pending: Vec<serde_json::Value> = vec![];

        // Peek items from the queue, if the head's exec time is lower than
        // the current time add it to the vector, and keep adding entries
        // until the exec times are larger than the current time.
        while
            self.entries.len() > 0
            &&
            self.entries.front().unwrap().exec_time_s < current_time_s
        {
            pending.push(self.entries.pop_front().unwrap().payload);
        }

        // If the vector is longer than 0 return Some, otherwise None
        if pending.len() > 0 {
            PendingEntries::Some(pending)
        }
        else {
            PendingEntries::None
        }
    }

    /// Get the number of entries remaining in the script
    pub fn get_num_entries(&self) -> usize {
        self.entries.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        match self.entries.back() {
            Some(e) => e.exec_time_s,
            None => 0f64
        }
    }
}
