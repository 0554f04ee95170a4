//! End-to-end behavior of the state machine as seen by its owner.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tickstate::{ChangeReason, State, StateMachine, Step, Task};

type Log = Rc<RefCell<Vec<String>>>;

fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

fn push(log: &Log, entry: impl Into<String>) {
    log.borrow_mut().push(entry.into());
}

struct DropLog {
    label: &'static str,
    log: Log,
}

impl DropLog {
    fn touch(&self) {}
}

impl Drop for DropLog {
    fn drop(&mut self) {
        push(&self.log, format!("drop {}", self.label));
    }
}

/// A state that logs every resume and never finishes.
fn logging_state(name: &'static str, log: &Log) -> State {
    let log = Rc::clone(log);
    State::new(name, move |_| {
        push(&log, format!("resume {name}"));
        Ok(Step::Yield)
    })
}

#[test]
fn counter_crosses_threshold_then_switches() {
    let counter = Rc::new(Cell::new(0));
    let log = new_log();

    let s1 = {
        let counter = Rc::clone(&counter);
        let log = Rc::clone(&log);
        let mut registered = false;
        State::new("S1", move |machine: &mut StateMachine| {
            if !registered {
                registered = true;
                let increment = Rc::clone(&counter);
                let threshold = Rc::clone(&counter);
                let target_log = Rc::clone(&log);
                machine
                    .add_transition(
                        move || threshold.get() >= 3,
                        move || logging_state("S2", &target_log),
                    )
                    .add_stateless_task(move || increment.set(increment.get() + 1));
            }
            Ok(Step::Yield)
        })
    };

    let mut machine = StateMachine::new();
    machine.change_to_state(s1);

    // Tick 1 registers; the stateless task has not run yet.
    assert!(machine.run().unwrap());
    assert_eq!(counter.get(), 0);

    assert!(machine.run().unwrap());
    assert_eq!(counter.get(), 1);
    assert!(machine.run().unwrap());
    assert_eq!(counter.get(), 2);
    assert_eq!(machine.current_state(), Some("S1"));

    // Tick 4: counter reaches 3 before the check, so the transition fires.
    assert!(machine.run().unwrap());
    assert_eq!(counter.get(), 3);
    assert_eq!(machine.current_state(), Some("S2"));
    assert!(log.borrow().is_empty());

    // Tick 5: the new state's entry runs for the first time.
    assert!(machine.run().unwrap());
    assert_eq!(*log.borrow(), vec!["resume S2"]);
    assert_eq!(counter.get(), 3);
}

#[test]
fn transitions_are_checked_round_robin() {
    let log = new_log();
    let table_log = Rc::clone(&log);
    let mut registered = false;
    let state = State::new("Patrol", move |machine: &mut StateMachine| {
        if !registered {
            registered = true;
            for name in ["A", "B", "C"] {
                let log = Rc::clone(&table_log);
                machine.add_transition(
                    move || {
                        push(&log, name);
                        false
                    },
                    || State::new("Never", |_| Ok(Step::Yield)),
                );
            }
        }
        Ok(Step::Yield)
    });

    let mut machine = StateMachine::new();
    machine.change_to_state(state);
    machine.run().unwrap();

    for _ in 0..6 {
        assert!(machine.run().unwrap());
    }

    assert_eq!(*log.borrow(), vec!["A", "B", "C", "A", "B", "C"]);
    assert_eq!(machine.transition_count(), 3);
}

#[test]
fn firing_transition_skips_remaining_entries() {
    let log = new_log();
    let table_log = Rc::clone(&log);
    let mut registered = false;
    let state = State::new("Idle", move |machine: &mut StateMachine| {
        if !registered {
            registered = true;
            for (name, fires) in [("A", false), ("B", true), ("C", true)] {
                let log = Rc::clone(&table_log);
                machine.add_transition(
                    move || {
                        push(&log, name);
                        fires
                    },
                    move || State::new(name, |_| Ok(Step::Yield)),
                );
            }
        }
        Ok(Step::Yield)
    });

    let mut machine = StateMachine::new();
    machine.change_to_state(state);
    machine.run().unwrap();
    machine.run().unwrap();
    machine.run().unwrap();

    assert_eq!(*log.borrow(), vec!["A", "B"]);
    assert_eq!(machine.current_state(), Some("B"));
    assert_eq!(machine.transition_count(), 0);
    assert_eq!(
        machine.history().last().map(|change| change.reason),
        Some(ChangeReason::Transition)
    );
}

#[test]
fn exit_runs_before_teardown_and_before_new_entry() {
    let log = new_log();
    let go = Rc::new(Cell::new(false));

    let old = {
        let log = Rc::clone(&log);
        let go = Rc::clone(&go);
        let guard = DropLog {
            label: "old entry",
            log: Rc::clone(&log),
        };
        let mut registered = false;
        State::new("Old", move |machine: &mut StateMachine| {
            guard.touch();
            if registered {
                return Ok(Step::Yield);
            }
            registered = true;
            let exit_log = Rc::clone(&log);
            let target_log = Rc::clone(&log);
            let go = Rc::clone(&go);
            machine
                .on_exit(move || push(&exit_log, "exit Old"))
                .add_transition(move || go.get(), move || logging_state("New", &target_log));

            let nested = DropLog {
                label: "nested",
                log: Rc::clone(&log),
            };
            Ok(Step::Await(Task::from_fn("nested", move |_| {
                nested.touch();
                Ok(Step::Yield)
            })))
        })
    };

    let mut machine = StateMachine::new();
    machine.change_to_state(old);
    machine.run().unwrap();
    machine.run().unwrap();
    assert_eq!(machine.stack_depth(), 1);

    go.set(true);
    machine.run().unwrap();
    machine.run().unwrap();

    assert_eq!(
        *log.borrow(),
        vec!["exit Old", "drop nested", "drop old entry", "resume New"]
    );
}

#[test]
fn exit_callback_runs_exactly_once() {
    let exits = Rc::new(Cell::new(0));
    let counter = Rc::clone(&exits);
    let mut machine = StateMachine::new();
    machine.change_to_state(State::new("Aim", |_| Ok(Step::Yield)).on_exit(move || {
        counter.set(counter.get() + 1);
    }));
    machine.run().unwrap();

    machine.change_to_state(State::new("Strafe", |_| Ok(Step::Yield)));
    machine.change_to_state(State::new("Walk", |_| Ok(Step::Yield)));
    machine.destroy();

    assert_eq!(exits.get(), 1);
}

#[test]
fn nested_tasks_resume_in_lifo_order() {
    let log = new_log();

    fn leaf(log: &Log) -> Task {
        let log = Rc::clone(log);
        let mut started = false;
        Task::from_fn("C", move |_| {
            if !started {
                started = true;
                push(&log, "C start");
                return Ok(Step::Yield);
            }
            push(&log, "C done");
            Ok(Step::Complete)
        })
    }

    fn parent(name: &'static str, log: &Log, child: impl FnOnce() -> Task + 'static) -> Task {
        let log = Rc::clone(log);
        let mut child = Some(child);
        Task::from_fn(name, move |_| match child.take() {
            Some(make_child) => {
                push(&log, format!("{name} start"));
                Ok(Step::Await(make_child()))
            }
            None => {
                push(&log, format!("{name} done"));
                Ok(Step::Complete)
            }
        })
    }

    let b_log = Rc::clone(&log);
    let a = parent("A", &log, move || {
        let c_log = Rc::clone(&b_log);
        parent("B", &b_log, move || leaf(&c_log))
    });

    let mut machine = StateMachine::new();
    machine.change_to_state(State::from_task("Chain", a));

    let mut results = Vec::new();
    for _ in 0..7 {
        results.push(machine.run().unwrap());
    }

    assert_eq!(
        *log.borrow(),
        vec!["A start", "B start", "C start", "C done", "B done", "A done"]
    );
    assert_eq!(results, vec![true, true, true, true, true, true, false]);
    assert_eq!(machine.current_state(), None);
}

#[test]
fn idle_machine_wakes_for_pending_state() {
    let log = new_log();
    let mut machine = StateMachine::new();

    assert!(!machine.run().unwrap());
    assert!(!machine.run().unwrap());

    let target_log = Rc::clone(&log);
    machine.continue_with(move || logging_state("Spawned", &target_log));

    assert!(machine.run().unwrap());
    assert_eq!(machine.current_state(), Some("Spawned"));
    assert!(!machine.has_pending_state());
    assert!(log.borrow().is_empty());

    assert!(machine.run().unwrap());
    assert_eq!(*log.borrow(), vec!["resume Spawned"]);
}

#[test]
fn finished_state_continues_with_follow_up() {
    let log = new_log();
    let exits = Rc::new(Cell::new(0));

    let vault = {
        let log = Rc::clone(&log);
        let exits = Rc::clone(&exits);
        State::new("Vault", move |machine: &mut StateMachine| {
            let target_log = Rc::clone(&log);
            let exits = Rc::clone(&exits);
            machine
                .continue_with(move || logging_state("Locomotion", &target_log))
                .on_exit(move || exits.set(exits.get() + 1));
            Ok(Step::Complete)
        })
    };

    let mut machine = StateMachine::new();
    machine.change_to_state(vault);

    assert!(machine.run().unwrap());
    assert_eq!(machine.current_state(), None);

    assert!(machine.run().unwrap());
    assert_eq!(machine.current_state(), Some("Locomotion"));
    assert_eq!(exits.get(), 0);

    let path = machine.history().get_path();
    assert_eq!(path, vec!["Vault", "Locomotion"]);
}

#[test]
fn finished_state_without_follow_up_goes_idle() {
    let ran = Rc::new(Cell::new(0));
    let counter = Rc::clone(&ran);
    let mut machine = StateMachine::new();
    machine.change_to_state(State::new("OneShot", move |machine: &mut StateMachine| {
        let counter = Rc::clone(&counter);
        machine.add_stateless_task(move || counter.set(counter.get() + 1));
        Ok(Step::Complete)
    }));

    assert!(machine.run().unwrap());
    assert!(!machine.run().unwrap());
    assert!(!machine.run().unwrap());

    assert_eq!(ran.get(), 0);
}

#[test]
fn transition_discards_follow_up_of_old_state() {
    let mut registered = false;
    let mut machine = StateMachine::new();
    machine.change_to_state(State::new("Climb", move |machine: &mut StateMachine| {
        if !registered {
            registered = true;
            machine
                .continue_with(|| State::new("Drop", |_| Ok(Step::Yield)))
                .add_transition(|| true, || State::new("Fall", |_| Ok(Step::Yield)));
        }
        Ok(Step::Yield)
    }));

    machine.run().unwrap();
    assert!(machine.has_pending_state());
    machine.run().unwrap();

    assert_eq!(machine.current_state(), Some("Fall"));
    assert!(!machine.has_pending_state());
}

#[test]
fn destroy_is_idempotent_and_terminal() {
    let ticks = Rc::new(Cell::new(0));
    let counter = Rc::clone(&ticks);
    let mut machine = StateMachine::new();
    machine.change_to_state(State::new("Busy", move |machine: &mut StateMachine| {
        let counter = Rc::clone(&counter);
        machine.add_stateless_task(move || counter.set(counter.get() + 1));
        Ok(Step::Await(Task::wait_ticks(10)))
    }));
    machine.run().unwrap();

    machine.destroy();
    machine.destroy();

    for _ in 0..3 {
        assert!(machine.run().unwrap());
    }
    assert!(machine.is_sleeping());
    assert_eq!(ticks.get(), 0);
    assert_eq!(machine.stack_depth(), 0);
    assert_eq!(machine.active_task(), None);
    assert_eq!(machine.current_state(), None);
}

#[test]
fn destroy_on_dormant_machine_is_harmless() {
    let mut machine = StateMachine::new();

    machine.destroy();

    assert!(machine.is_sleeping());
    assert!(machine.run().unwrap());
}

#[test]
fn change_to_state_wakes_destroyed_machine() {
    let log = new_log();
    let mut machine = StateMachine::new();
    machine.destroy();

    machine.change_to_state(logging_state("Revived", &log));

    assert!(!machine.is_sleeping());
    assert!(machine.run().unwrap());
    assert_eq!(*log.borrow(), vec!["resume Revived"]);
}

#[test]
fn stateless_tasks_run_before_transition_check() {
    let log = new_log();
    let task_log = Rc::clone(&log);
    let mut registered = false;
    let mut machine = StateMachine::new();
    machine.change_to_state(State::new("Run", move |machine: &mut StateMachine| {
        if !registered {
            registered = true;
            let first = Rc::clone(&task_log);
            let second = Rc::clone(&task_log);
            let check = Rc::clone(&task_log);
            machine
                .add_transition(
                    move || {
                        push(&check, "check");
                        false
                    },
                    || State::new("Never", |_| Ok(Step::Yield)),
                )
                .add_stateless_task(move || push(&first, "speed"))
                .add_stateless_task(move || push(&second, "rotation"));
        }
        push(&task_log, "body");
        Ok(Step::Yield)
    }));

    machine.run().unwrap();
    machine.run().unwrap();

    assert_eq!(
        *log.borrow(),
        vec!["body", "speed", "rotation", "check", "body"]
    );
}
