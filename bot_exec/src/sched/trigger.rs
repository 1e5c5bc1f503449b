//! Button bindings over the input frame

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::CommandRef;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// How a button edge maps onto a command lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindingKind {
    /// Schedule on the rising edge of the button.
    OnTrue,

    /// Schedule on the falling edge of the button.
    OnFalse,

    /// Schedule on the rising edge and cancel on the falling edge.
    WhileTrue,
}

/// An action a trigger asks the scheduler to perform.
pub enum TriggerAction {
    Schedule(CommandRef),
    Cancel(CommandRef),
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A binding between one controller button and one command.
///
/// Edge detection is performed against the previous cycle's state, so a
/// button that is already held when the binding is created does not fire
/// until it is released and pressed again.
pub struct Trigger {
    /// Button bit index in the input frame.
    button: u8,
    kind: BindingKind,
    command: CommandRef,
    was_pressed: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Trigger {
    pub fn new(button: u8, kind: BindingKind, command: CommandRef) -> Self {
        Trigger {
            button,
            kind,
            command,
            was_pressed: false,
        }
    }

    pub fn button(&self) -> u8 {
        self.button
    }

    /// Evaluate the binding against the button's state this cycle, returning
    /// the action (if any) the scheduler should take.
    pub fn poll(&mut self, pressed: bool) -> Option<TriggerAction> {
        let rising = pressed && !self.was_pressed;
        let falling = !pressed && self.was_pressed;
        self.was_pressed = pressed;

        match self.kind {
            BindingKind::OnTrue if rising => {
                Some(TriggerAction::Schedule(self.command.clone()))
            }
            BindingKind::OnFalse if falling => {
                Some(TriggerAction::Schedule(self.command.clone()))
            }
            BindingKind::WhileTrue if rising => {
                Some(TriggerAction::Schedule(self.command.clone()))
            }
            BindingKind::WhileTrue if falling => {
                Some(TriggerAction::Cancel(self.command.clone()))
            }
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::sched::{command_ref, Command, CommandError, SubsystemId};

    struct Noop;

    impl Command for Noop {
        fn name(&self) -> &'static str {
            "Noop"
        }

        fn requirements(&self) -> &[SubsystemId] {
            &[]
        }

        fn execute(&mut self) -> Result<(), CommandError> {
            Ok(())
        }
    }

    #[test]
    fn test_on_true_fires_on_rising_edge_only() {
        let mut trigger = Trigger::new(0, BindingKind::OnTrue, command_ref(Noop));

        assert!(trigger.poll(false).is_none());
        assert!(matches!(
            trigger.poll(true),
            Some(TriggerAction::Schedule(_))
        ));
        // Held, not a new edge
        assert!(trigger.poll(true).is_none());
        assert!(trigger.poll(false).is_none());
        assert!(matches!(
            trigger.poll(true),
            Some(TriggerAction::Schedule(_))
        ));
    }

    #[test]
    fn test_on_false_fires_on_falling_edge_only() {
        let mut trigger =
            Trigger::new(2, BindingKind::OnFalse, command_ref(Noop));

        assert!(trigger.poll(true).is_none());
        assert!(matches!(
            trigger.poll(false),
            Some(TriggerAction::Schedule(_))
        ));
        assert!(trigger.poll(false).is_none());
    }

    #[test]
    fn test_while_true_schedules_then_cancels() {
        let mut trigger =
            Trigger::new(1, BindingKind::WhileTrue, command_ref(Noop));

        assert!(matches!(
            trigger.poll(true),
            Some(TriggerAction::Schedule(_))
        ));
        assert!(trigger.poll(true).is_none());
        assert!(matches!(
            trigger.poll(false),
            Some(TriggerAction::Cancel(_))
        ));
        assert!(trigger.poll(false).is_none());
    }
}
