//! Chain climb command

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::ClimberHandle;
use crate::sched::{Command, CommandError, SubsystemId};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Extends the climber hooks toward the max-height soft limit, finishing
/// once the limit is reached. Interruption stops the hooks where they are.
pub struct ClimbChain {
    climber: ClimberHandle,
    requirements: Vec<SubsystemId>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ClimbChain {
    pub fn new(climber: ClimberHandle) -> Self {
        ClimbChain {
            climber,
            requirements: vec![SubsystemId::Climber],
        }
    }
}

impl Command for ClimbChain {
    fn name(&self) -> &'static str {
        "ClimbChain"
    }

    fn requirements(&self) -> &[SubsystemId] {
        &self.requirements
    }

    fn execute(&mut self) -> Result<(), CommandError> {
        self.climber.borrow_mut().set_output(1.0);
        Ok(())
    }

    fn is_finished(&self) -> bool {
        self.climber.borrow().at_max()
    }

    fn end(&mut self, _interrupted: bool) {
        self.climber.borrow_mut().stop();
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::subsystems::{Climber, ClimberParams};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_finishes_at_soft_limit() {
        let climber = Rc::new(RefCell::new(Climber::new(ClimberParams {
            max_height_m: 0.1,
            rate_mps: 1.0,
        })));
        let mut command = ClimbChain::new(climber.clone());

        let mut cycles = 0;
        while !command.is_finished() {
            command.execute().unwrap();
            climber.borrow_mut().update(0.02);
            cycles += 1;
            assert!(cycles < 1000, "climber never reached its limit");
        }
        command.end(false);

        assert!(climber.borrow().at_max());
        assert_eq!(climber.borrow().output(), 0.0);
    }
}
