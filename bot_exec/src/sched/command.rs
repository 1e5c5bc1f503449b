//! The command trait and shared command handles

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::cell::RefCell;
use std::rc::Rc;

use super::{CommandError, SubsystemId};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A shared handle to a command.
///
/// Commands are owned by the scheduler and by whichever bindings reference
/// them, so they live behind `Rc<RefCell<_>>`. Identity (for cancellation and
/// ownership tracking) is pointer identity via `Rc::ptr_eq`.
pub type CommandRef = Rc<RefCell<dyn Command>>;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A unit of robot behaviour with a well defined lifecycle.
///
/// The scheduler drives the lifecycle: `initialize` once on admission,
/// `execute` once per cycle while scheduled, then `end` exactly once with
/// `interrupted` describing whether the command ran to completion
/// (`is_finished` returned true) or was forcibly removed.
pub trait Command {
    /// A human readable name for logging.
    fn name(&self) -> &'static str;

    /// The subsystems this command needs exclusive ownership of. Fixed for
    /// the lifetime of the command.
    fn requirements(&self) -> &[SubsystemId];

    /// Called once each time the command is admitted, before its first
    /// `execute`. Restarted commands are re-initialised.
    fn initialize(&mut self) {}

    /// Called once per control cycle while the command is scheduled.
    fn execute(&mut self) -> Result<(), CommandError>;

    /// Checked after each successful `execute`. Return true to complete
    /// naturally.
    fn is_finished(&self) -> bool {
        false
    }

    /// Called exactly once when the command stops running. `interrupted` is
    /// true if the command was cancelled, displaced by a conflicting
    /// command, or failed, and false if it completed naturally.
    fn end(&mut self, _interrupted: bool) {}
}

/// A command that runs a closure once and finishes on the same cycle.
pub struct InstantCommand<F: FnMut()> {
    name: &'static str,
    requirements: Vec<SubsystemId>,
    action: F,
}

impl<F: FnMut()> InstantCommand<F> {
    pub fn new(
        name: &'static str,
        requirements: Vec<SubsystemId>,
        action: F,
    ) -> Self {
        InstantCommand {
            name,
            requirements,
            action,
        }
    }
}

impl<F: FnMut()> Command for InstantCommand<F> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn requirements(&self) -> &[SubsystemId] {
        &self.requirements
    }

    fn execute(&mut self) -> Result<(), CommandError> {
        (self.action)();
        Ok(())
    }

    fn is_finished(&self) -> bool {
        true
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Wrap a command in a shared handle suitable for scheduling and binding.
pub fn command_ref<C: Command + 'static>(command: C) -> CommandRef {
    Rc::new(RefCell::new(command))
}
