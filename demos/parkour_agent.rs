//! A character controller driven by a tickstate machine.
//!
//! The agent enters `Locomotion` when it spawns, ticks the machine once per
//! frame and destroys it on despawn. Inputs arrive through shared cells, the
//! way an input system would set them between frames.
//!
//! Run with `RUST_LOG=trace cargo run --example parkour_agent` to see every
//! await and teardown.

use std::cell::Cell;
use std::rc::Rc;
use tickstate::{MachineError, State, StateMachine, Step, Task};
use tracing_subscriber::EnvFilter;

const WALK_SPEED: f32 = 200.0;
const SPRINT_SPEED: f32 = 600.0;
const AIRBORNE_TICKS: u32 = 3;

#[derive(Default)]
struct Inputs {
    wants_jump: Cell<bool>,
    wants_sprint: Cell<bool>,
    max_speed: Cell<f32>,
    jumps: Cell<u32>,
}

fn locomotion(inputs: Rc<Inputs>) -> State {
    let mut registered = false;
    State::new("Locomotion", move |machine: &mut StateMachine| {
        if !registered {
            registered = true;
            let speed = Rc::clone(&inputs);
            let jump = Rc::clone(&inputs);
            let target = Rc::clone(&inputs);
            machine
                .add_stateless_task(move || {
                    let max = if speed.wants_sprint.get() {
                        SPRINT_SPEED
                    } else {
                        WALK_SPEED
                    };
                    speed.max_speed.set(max);
                })
                .add_transition(move || jump.wants_jump.get(), move || jumping(target));
        }
        Ok(Step::Yield)
    })
}

fn jumping(inputs: Rc<Inputs>) -> State {
    let mut launched = false;
    State::new("Jump", move |machine: &mut StateMachine| {
        if launched {
            tracing::info!(jumps = inputs.jumps.get(), "landed");
            return Ok(Step::Complete);
        }
        launched = true;
        inputs.wants_jump.set(false);
        inputs.jumps.set(inputs.jumps.get() + 1);

        let back = Rc::clone(&inputs);
        machine.continue_with(move || locomotion(back));
        Ok(Step::Await(Task::wait_ticks(AIRBORNE_TICKS)))
    })
    .on_exit(|| tracing::warn!("jump interrupted"))
}

struct Agent {
    inputs: Rc<Inputs>,
    machine: StateMachine,
}

impl Agent {
    fn spawn() -> Result<Self, Box<dyn std::error::Error>> {
        let inputs = Rc::new(Inputs::default());
        let mut machine = StateMachine::builder()
            .label("parkour-agent")
            .max_stack_depth(8)
            .build()?;
        machine.change_to_state(locomotion(Rc::clone(&inputs)));
        Ok(Self { inputs, machine })
    }

    fn tick(&mut self) -> Result<bool, MachineError> {
        self.machine.run()
    }

    fn despawn(&mut self) {
        self.machine.destroy();
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    let mut agent = Agent::spawn()?;

    for frame in 1..=16 {
        match frame {
            3 => agent.inputs.wants_sprint.set(true),
            5 => agent.inputs.wants_jump.set(true),
            12 => agent.inputs.wants_sprint.set(false),
            _ => {}
        }

        let busy = agent.tick()?;
        tracing::info!(
            frame,
            busy,
            state = agent.machine.current_state().unwrap_or("-"),
            max_speed = agent.inputs.max_speed.get(),
            "tick"
        );
    }

    agent.despawn();
    tracing::info!(path = ?agent.machine.history().get_path(), "agent despawned");
    Ok(())
}
