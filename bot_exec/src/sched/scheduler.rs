//! The scheduler itself

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};

// Std
use std::collections::BTreeMap;
use std::rc::Rc;

// Internal
use super::{
    CommandRef, SchedError, SubsystemId, Trigger, TriggerAction};
use crate::input::InputFrame;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Single threaded cooperative command scheduler.
///
/// One `run` call per control cycle. Within a cycle triggers are evaluated
/// first, then admissions are resolved (interrupting any conflicting owner
/// synchronously), then every scheduled command body runs once. A command
/// admitted during the trigger phase executes on the same cycle it was
/// admitted.
#[derive(Default)]
pub struct Scheduler {
    /// All currently scheduled commands, in admission order.
    active: Vec<CommandRef>,

    /// Exclusive subsystem ownership. BTreeMap keeps iteration order
    /// deterministic.
    owners: BTreeMap<SubsystemId, CommandRef>,

    /// Commands restored onto a subsystem whenever nothing else owns it.
    defaults: BTreeMap<SubsystemId, CommandRef>,

    triggers: Vec<Trigger>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit a command, interrupting any command that owns one of its
    /// required subsystems. Scheduling an already scheduled command is a
    /// no-op.
    pub fn schedule(&mut self, command: &CommandRef) {
        if self.is_scheduled(command) {
            return;
        }

        // Clone the requirement list out so no borrow of the command is
        // outstanding while we interrupt the current owners.
        let requirements = command.borrow().requirements().to_vec();

        for subsystem in requirements.iter() {
            let owner = match self.owners.get(subsystem) {
                Some(owner) => owner.clone(),
                None => continue,
            };

            debug!(
                "Interrupting {:?} for {:?}",
                owner.borrow().name(),
                command.borrow().name()
            );
            self.remove(&owner, true);
        }

        debug!("Scheduling {:?}", command.borrow().name());

        self.active.push(command.clone());
        for subsystem in requirements.iter() {
            self.owners.insert(*subsystem, command.clone());
        }

        command.borrow_mut().initialize();
    }

    /// Interrupt a command. Cancelling an unscheduled command is a no-op.
    pub fn cancel(&mut self, command: &CommandRef) {
        if self.is_scheduled(command) {
            debug!("Cancelling {:?}", command.borrow().name());
            self.remove(command, true);
        }
    }

    /// Register the command restored onto `subsystem` whenever it has no
    /// owner. The command must require exactly that subsystem.
    pub fn set_default_command(
        &mut self,
        subsystem: SubsystemId,
        command: CommandRef,
    ) -> Result<(), SchedError> {
        let requirements = command.borrow().requirements().to_vec();
        if requirements != [subsystem] {
            return Err(SchedError::InvalidDefault(subsystem, requirements));
        }

        self.defaults.insert(subsystem, command);
        Ok(())
    }

    /// Register a button binding, evaluated at the start of every cycle.
    pub fn add_trigger(&mut self, trigger: Trigger) {
        self.triggers.push(trigger);
    }

    pub fn is_scheduled(&self, command: &CommandRef) -> bool {
        self.active.iter().any(|c| Rc::ptr_eq(c, command))
    }

    /// Run one scheduler cycle against this cycle's input frame.
    pub fn run(&mut self, input: &InputFrame) {
        // Trigger phase. Actions are collected first so bindings see a
        // consistent pre-admission view of the buttons.
        let actions: Vec<TriggerAction> = self
            .triggers
            .iter_mut()
            .filter_map(|t| {
                let pressed = input.button(t.button());
                t.poll(pressed)
            })
            .collect();

        for action in actions {
            match action {
                TriggerAction::Schedule(command) => self.schedule(&command),
                TriggerAction::Cancel(command) => self.cancel(&command),
            }
        }

        // Any subsystem left without an owner picks its default up before
        // the body phase, so defaults admitted here run this cycle too.
        self.restore_defaults();

        // Body phase over a snapshot of the admitted set. Commands removed
        // mid-phase are skipped via the is_scheduled check.
        let cycle: Vec<CommandRef> = self.active.clone();

        for command in cycle {
            if !self.is_scheduled(&command) {
                continue;
            }

            let result = command.borrow_mut().execute();

            match result {
                Ok(()) => {
                    if command.borrow().is_finished() {
                        debug!("{:?} finished", command.borrow().name());
                        self.remove(&command, false);
                    }
                }
                Err(e) => {
                    warn!(
                        "Command {:?} failed and will be interrupted: {}",
                        command.borrow().name(),
                        e
                    );
                    self.remove(&command, true);
                }
            }
        }

        // Subsystems freed during the body phase get their defaults back
        // now, to first execute on the next cycle.
        self.restore_defaults();
    }

    /// End a command and release everything it owns.
    fn remove(&mut self, command: &CommandRef, interrupted: bool) {
        command.borrow_mut().end(interrupted);
        self.active.retain(|c| !Rc::ptr_eq(c, command));
        self.owners.retain(|_, c| !Rc::ptr_eq(c, command));
    }

    /// Schedule the default command of every subsystem without an owner.
    fn restore_defaults(&mut self) {
        let restorable: Vec<CommandRef> = self
            .defaults
            .iter()
            .filter(|(subsystem, _)| !self.owners.contains_key(subsystem))
            .map(|(_, command)| command.clone())
            .collect();

        for command in restorable {
            self.schedule(&command);
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::sched::{
        command_ref, BindingKind, Command, CommandError};
    use std::cell::RefCell;

    /// Observable lifecycle counters for a test command.
    #[derive(Default)]
    struct Record {
        init: usize,
        exec: usize,
        end_natural: usize,
        end_interrupted: usize,
    }

    struct TestCommand {
        name: &'static str,
        requirements: Vec<SubsystemId>,
        record: Rc<RefCell<Record>>,
        finish_after_execs: Option<usize>,
        fail: bool,
    }

    impl TestCommand {
        fn new(
            name: &'static str,
            requirements: Vec<SubsystemId>,
        ) -> (CommandRef, Rc<RefCell<Record>>) {
            let record = Rc::new(RefCell::new(Record::default()));
            let command = command_ref(TestCommand {
                name,
                requirements,
                record: record.clone(),
                finish_after_execs: None,
                fail: false,
            });
            (command, record)
        }

        fn finishing(
            name: &'static str,
            requirements: Vec<SubsystemId>,
            finish_after_execs: usize,
        ) -> (CommandRef, Rc<RefCell<Record>>) {
            let record = Rc::new(RefCell::new(Record::default()));
            let command = command_ref(TestCommand {
                name,
                requirements,
                record: record.clone(),
                finish_after_execs: Some(finish_after_execs),
                fail: false,
            });
            (command, record)
        }

        fn failing(
            name: &'static str,
            requirements: Vec<SubsystemId>,
        ) -> (CommandRef, Rc<RefCell<Record>>) {
            let record = Rc::new(RefCell::new(Record::default()));
            let command = command_ref(TestCommand {
                name,
                requirements,
                record: record.clone(),
                finish_after_execs: None,
                fail: true,
            });
            (command, record)
        }
    }

    impl Command for TestCommand {
        fn name(&self) -> &'static str {
            self.name
        }

        fn requirements(&self) -> &[SubsystemId] {
            &self.requirements
        }

        fn initialize(&mut self) {
            self.record.borrow_mut().init += 1;
        }

        fn execute(&mut self) -> Result<(), CommandError> {
            self.record.borrow_mut().exec += 1;
            if self.fail {
                Err(CommandError::Failed("sensor offline".into()))
            } else {
                Ok(())
            }
        }

        fn is_finished(&self) -> bool {
            match self.finish_after_execs {
                Some(n) => self.record.borrow().exec >= n,
                None => false,
            }
        }

        fn end(&mut self, interrupted: bool) {
            let mut record = self.record.borrow_mut();
            if interrupted {
                record.end_interrupted += 1;
            } else {
                record.end_natural += 1;
            }
        }
    }

    #[test]
    fn test_conflicting_command_interrupts_owner() {
        let mut sched = Scheduler::new();
        let (a, a_rec) = TestCommand::new("A", vec![SubsystemId::Drivetrain]);
        let (b, b_rec) = TestCommand::new("B", vec![SubsystemId::Drivetrain]);

        sched.schedule(&a);
        sched.run(&InputFrame::default());
        assert_eq!(a_rec.borrow().exec, 1);

        sched.schedule(&b);
        assert!(!sched.is_scheduled(&a));
        assert!(sched.is_scheduled(&b));
        assert_eq!(a_rec.borrow().end_interrupted, 1);
        assert_eq!(a_rec.borrow().end_natural, 0);

        sched.run(&InputFrame::default());
        assert_eq!(a_rec.borrow().exec, 1);
        assert_eq!(b_rec.borrow().exec, 1);
        // end(true) fired exactly once
        assert_eq!(a_rec.borrow().end_interrupted, 1);
    }

    #[test]
    fn test_disjoint_requirements_coexist() {
        let mut sched = Scheduler::new();
        let (drive, drive_rec) =
            TestCommand::new("Drive", vec![SubsystemId::Drivetrain]);
        let (arm, arm_rec) = TestCommand::new("Arm", vec![SubsystemId::Arm]);

        sched.schedule(&drive);
        sched.schedule(&arm);
        sched.run(&InputFrame::default());

        assert_eq!(drive_rec.borrow().exec, 1);
        assert_eq!(arm_rec.borrow().exec, 1);
    }

    #[test]
    fn test_multi_requirement_interrupts_all_owners() {
        let mut sched = Scheduler::new();
        let (drive, drive_rec) =
            TestCommand::new("Drive", vec![SubsystemId::Drivetrain]);
        let (arm, arm_rec) = TestCommand::new("Arm", vec![SubsystemId::Arm]);
        let (both, _) = TestCommand::new(
            "Both",
            vec![SubsystemId::Drivetrain, SubsystemId::Arm],
        );

        sched.schedule(&drive);
        sched.schedule(&arm);
        sched.schedule(&both);

        assert!(!sched.is_scheduled(&drive));
        assert!(!sched.is_scheduled(&arm));
        assert!(sched.is_scheduled(&both));
        assert_eq!(drive_rec.borrow().end_interrupted, 1);
        assert_eq!(arm_rec.borrow().end_interrupted, 1);
    }

    #[test]
    fn test_reschedule_is_noop() {
        let mut sched = Scheduler::new();
        let (a, a_rec) = TestCommand::new("A", vec![SubsystemId::Intake]);

        sched.schedule(&a);
        sched.schedule(&a);

        assert_eq!(a_rec.borrow().init, 1);
        sched.run(&InputFrame::default());
        assert_eq!(a_rec.borrow().exec, 1);
    }

    #[test]
    fn test_trigger_admission_runs_same_cycle() {
        let mut sched = Scheduler::new();
        let (a, a_rec) = TestCommand::new("A", vec![SubsystemId::Intake]);
        sched.add_trigger(Trigger::new(3, BindingKind::WhileTrue, a.clone()));

        let mut input = InputFrame::default();
        input.set_button(3, true);
        sched.run(&input);

        assert_eq!(a_rec.borrow().init, 1);
        assert_eq!(a_rec.borrow().exec, 1);

        // Released: cancelled before the body phase
        input.set_button(3, false);
        sched.run(&input);
        assert_eq!(a_rec.borrow().exec, 1);
        assert_eq!(a_rec.borrow().end_interrupted, 1);
    }

    #[test]
    fn test_default_restored_after_owner_finishes() {
        let mut sched = Scheduler::new();
        let (default, default_rec) =
            TestCommand::new("Default", vec![SubsystemId::Drivetrain]);
        let (auto, auto_rec) = TestCommand::finishing(
            "Auto",
            vec![SubsystemId::Drivetrain],
            2,
        );

        sched
            .set_default_command(SubsystemId::Drivetrain, default.clone())
            .unwrap();

        sched.schedule(&auto);
        sched.run(&InputFrame::default());
        sched.run(&InputFrame::default());

        // Auto completed naturally after its second execute
        assert_eq!(auto_rec.borrow().exec, 2);
        assert_eq!(auto_rec.borrow().end_natural, 1);
        assert_eq!(auto_rec.borrow().end_interrupted, 0);

        // Default was never run while auto owned the drivetrain, and takes
        // over afterwards
        assert_eq!(default_rec.borrow().exec, 0);
        sched.run(&InputFrame::default());
        assert_eq!(default_rec.borrow().exec, 1);
    }

    #[test]
    fn test_failing_command_is_interrupted_not_fatal() {
        let mut sched = Scheduler::new();
        let (bad, bad_rec) =
            TestCommand::failing("Bad", vec![SubsystemId::Climber]);
        let (good, good_rec) =
            TestCommand::new("Good", vec![SubsystemId::Arm]);

        sched.schedule(&bad);
        sched.schedule(&good);
        sched.run(&InputFrame::default());

        assert!(!sched.is_scheduled(&bad));
        assert_eq!(bad_rec.borrow().end_interrupted, 1);
        // The rest of the cycle still ran
        assert_eq!(good_rec.borrow().exec, 1);
    }

    #[test]
    fn test_cancel_releases_ownership() {
        let mut sched = Scheduler::new();
        let (default, default_rec) =
            TestCommand::new("Default", vec![SubsystemId::Arm]);
        let (a, a_rec) = TestCommand::new("A", vec![SubsystemId::Arm]);

        sched
            .set_default_command(SubsystemId::Arm, default.clone())
            .unwrap();
        sched.schedule(&a);
        sched.cancel(&a);

        assert_eq!(a_rec.borrow().end_interrupted, 1);
        sched.run(&InputFrame::default());
        assert_eq!(default_rec.borrow().exec, 1);

        // Cancelling again is a no-op
        sched.cancel(&a);
        assert_eq!(a_rec.borrow().end_interrupted, 1);
    }

    #[test]
    fn test_default_must_require_its_subsystem() {
        let mut sched = Scheduler::new();

        let (none, _) = TestCommand::new("None", vec![]);
        assert!(sched
            .set_default_command(SubsystemId::Lighting, none)
            .is_err());

        let (both, _) = TestCommand::new(
            "Both",
            vec![SubsystemId::Drivetrain, SubsystemId::Arm],
        );
        assert!(sched
            .set_default_command(SubsystemId::Drivetrain, both)
            .is_err());

        let (right, _) = TestCommand::new("Right", vec![SubsystemId::Lighting]);
        assert!(sched
            .set_default_command(SubsystemId::Lighting, right)
            .is_ok());
    }

    #[test]
    fn test_restarted_command_reinitialises() {
        let mut sched = Scheduler::new();
        let (a, a_rec) = TestCommand::new("A", vec![SubsystemId::Intake]);

        sched.schedule(&a);
        sched.cancel(&a);
        sched.schedule(&a);

        assert_eq!(a_rec.borrow().init, 2);
    }
}
