//! The phase state machine.
//!
//! Owns the current phase, the handler table and a FIFO of requested phases.
//! Requests are drained one at a time by an iterative loop: the current
//! handler's `on_exit`, then the next handler's `on_enter`. Handlers can only
//! request transitions through their [`PhaseContext`], which appends to the
//! queue, so a request made inside a callback is processed after that
//! callback returns.
//!
//! A failing callback stops the drain. The machine stays where it got to
//! (the old phase if `on_exit` failed, the new one if `on_enter` failed) and
//! the requests still queued are retried on the next tick.

use std::collections::VecDeque;

use bevy::prelude::*;

use super::error::TransitionFailure;
use super::handler::{PhaseContext, PhaseHandler};
use super::registry::PhaseHandlers;
use crate::core::Phase;

#[derive(Debug, Clone, Copy)]
enum Callback {
    Update,
    FixedUpdate,
}

/// Current phase, handler table and pending transitions.
#[derive(Resource)]
pub struct PhaseMachine {
    current: Phase,
    /// Whether `current`'s `on_enter` has run
    entered: bool,
    handlers: Option<PhaseHandlers>,
    /// Set once handlers were installed, even after teardown
    sealed: bool,
    queue: VecDeque<Phase>,
    transitioning: bool,
    last_failure: Option<TransitionFailure>,
}

impl Default for PhaseMachine {
    fn default() -> Self {
        Self {
            current: Phase::MainMenu,
            entered: false,
            handlers: None,
            sealed: false,
            queue: VecDeque::new(),
            transitioning: false,
            last_failure: None,
        }
    }
}

impl PhaseMachine {
    pub fn current(&self) -> Phase {
        self.current
    }

    /// Whether the current phase has been entered.
    ///
    /// False until the first transition: the machine starts out at
    /// `MainMenu` without having run its `on_enter`.
    pub fn has_entered(&self) -> bool {
        self.entered
    }

    /// Whether a handler table is installed.
    pub fn is_initialized(&self) -> bool {
        self.handlers.is_some()
    }

    /// True only while the queue is being drained.
    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    pub fn pending(&self) -> impl Iterator<Item = Phase> + '_ {
        self.queue.iter().copied()
    }

    pub fn pending_len(&self) -> usize {
        self.queue.len()
    }

    /// The most recent transition that failed, if any.
    pub fn last_failure(&self) -> Option<&TransitionFailure> {
        self.last_failure.as_ref()
    }

    /// Install the handler table.
    ///
    /// The table can only be installed once per machine; later calls are
    /// ignored and return false.
    pub fn install(&mut self, handlers: PhaseHandlers) -> bool {
        if self.sealed {
            warn!("Phase handlers already installed, ignoring new table");
            return false;
        }
        self.handlers = Some(handlers);
        self.sealed = true;
        true
    }

    /// Queue a transition and drain the queue unless a drain is running.
    ///
    /// Requests made before the handlers are installed are dropped.
    pub fn request_transition(&mut self, world: &mut World, phase: Phase) {
        if self.handlers.is_none() {
            warn!("Phase machine not initialized, dropping transition to {}", phase);
            return;
        }
        self.queue.push_back(phase);
        if self.transitioning {
            return;
        }
        self.drain(world);
    }

    /// Drain whatever is still queued, e.g. after an earlier failure.
    pub fn process_pending(&mut self, world: &mut World) {
        if !self.transitioning && !self.queue.is_empty() {
            self.drain(world);
        }
    }

    /// Per-frame update of the current handler. Never fails.
    pub fn tick(&mut self, world: &mut World) {
        self.process_pending(world);
        self.dispatch(world, Callback::Update);
    }

    /// Fixed-timestep update of the current handler. Never fails.
    pub fn fixed_tick(&mut self, world: &mut World) {
        self.dispatch(world, Callback::FixedUpdate);
    }

    /// The current handler, if it is a `T`.
    pub fn current_handler<T: PhaseHandler>(&self) -> Option<&T> {
        let handlers = self.handlers.as_ref()?;
        handlers.get(self.current).as_any().downcast_ref::<T>()
    }

    pub fn current_handler_mut<T: PhaseHandler>(&mut self) -> Option<&mut T> {
        let handlers = self.handlers.as_mut()?;
        handlers.get_mut(self.current).as_any_mut().downcast_mut::<T>()
    }

    /// Leave the current phase and drop the handler table.
    pub fn teardown(&mut self, world: &mut World) {
        let Some(mut handlers) = self.handlers.take() else {
            return;
        };
        self.queue.clear();
        if self.entered {
            let mut ctx = PhaseContext::new(world, &mut self.queue, self.current).leaving_for(None);
            if let Err(e) = handlers.get_mut(self.current).on_exit(&mut ctx) {
                error!("Error leaving {} during teardown: {}", self.current, e);
            }
        }
        self.queue.clear();
        self.entered = false;
        self.transitioning = false;
        info!("Phase machine torn down");
    }

    fn drain(&mut self, world: &mut World) {
        let Some(handlers) = self.handlers.as_mut() else {
            return;
        };
        self.transitioning = true;

        while let Some(next) = self.queue.pop_front() {
            if self.entered && next == self.current {
                debug!("Already in {}, ignoring transition request", next);
                continue;
            }

            let from = self.current;
            let previous = self.entered.then_some(from);
            info!("Changing phase from {} to {}", from, next);

            if self.entered {
                let mut ctx = PhaseContext::new(world, &mut self.queue, from).leaving_for(Some(next));
                if let Err(cause) = handlers.get_mut(from).on_exit(&mut ctx) {
                    let failure = TransitionFailure { from, to: next, cause };
                    error!("Error during phase change: {}", failure);
                    self.last_failure = Some(failure);
                    break;
                }
            }

            self.current = next;
            self.entered = true;

            let mut ctx = PhaseContext::new(world, &mut self.queue, next).entering_from(previous);
            if let Err(cause) = handlers.get_mut(next).on_enter(&mut ctx) {
                let failure = TransitionFailure { from, to: next, cause };
                error!("Error during phase change: {}", failure);
                self.last_failure = Some(failure);
                break;
            }

            info!("Successfully changed to phase: {}", next);
        }

        self.transitioning = false;
    }

    fn dispatch(&mut self, world: &mut World, callback: Callback) {
        if !self.entered {
            return;
        }
        let Some(handlers) = self.handlers.as_mut() else {
            return;
        };

        let phase = self.current;
        let mut ctx = PhaseContext::new(world, &mut self.queue, phase);
        let handler = handlers.get_mut(phase);
        let result = match callback {
            Callback::Update => handler.on_update(&mut ctx),
            Callback::FixedUpdate => handler.on_fixed_update(&mut ctx),
        };
        if let Err(e) = result {
            error!("Error in {} {:?}: {}", phase, callback, e);
        }

        self.process_pending(world);
    }
}

/// Run condition: true while `phase` is the entered, current phase.
pub fn in_phase(phase: Phase) -> impl FnMut(Option<Res<PhaseMachine>>) -> bool + Clone {
    move |machine: Option<Res<PhaseMachine>>| {
        machine.is_some_and(|machine| machine.has_entered() && machine.current() == phase)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::phase::error::HandlerError;
    use crate::phase::testing::{recording_handlers, CallLog, Recorder};

    fn handlers_with(log: &CallLog, configure: impl Fn(Phase, &mut Recorder)) -> PhaseHandlers {
        Phase::ALL
            .into_iter()
            .fold(PhaseHandlers::builder(), |builder, phase| {
                let mut recorder = Recorder::new(phase, log);
                configure(phase, &mut recorder);
                builder.with(phase, recorder)
            })
            .build()
            .unwrap()
    }

    /// A machine that has entered the main menu, with the log cleared.
    fn started(log: &CallLog, handlers: PhaseHandlers) -> (World, PhaseMachine) {
        let mut world = World::new();
        let mut machine = PhaseMachine::default();
        assert!(machine.install(handlers));
        machine.request_transition(&mut world, Phase::MainMenu);
        assert_eq!(log.take(), vec!["MainMenu.OnEnter"]);
        (world, machine)
    }

    #[test]
    fn initial_entry_has_no_exit() {
        let log = CallLog::default();
        let (_, machine) = started(&log, recording_handlers(&log).unwrap());
        assert!(machine.has_entered());
        assert_eq!(machine.current(), Phase::MainMenu);
    }

    #[test]
    fn requests_before_install_are_dropped() {
        let mut world = World::new();
        let mut machine = PhaseMachine::default();
        machine.request_transition(&mut world, Phase::Town);
        assert_eq!(machine.pending_len(), 0);
        assert!(!machine.has_entered());
    }

    #[test]
    fn same_phase_is_a_no_op() {
        let log = CallLog::default();
        let (mut world, mut machine) = started(&log, recording_handlers(&log).unwrap());

        machine.request_transition(&mut world, Phase::MainMenu);

        assert!(log.take().is_empty());
        assert_eq!(machine.current(), Phase::MainMenu);
        assert!(!machine.is_transitioning());
    }

    #[test]
    fn queued_requests_run_in_order() {
        let log = CallLog::default();
        let handlers = handlers_with(&log, |phase, recorder| {
            if phase == Phase::MainMenu {
                recorder.request_on_update = vec![Phase::Town, Phase::Stage];
            }
        });
        let (mut world, mut machine) = started(&log, handlers);

        // Both requests are queued before either drains.
        machine.tick(&mut world);

        assert_eq!(
            log.take(),
            vec!["MainMenu.OnExit", "Town.OnEnter", "Town.OnExit", "Stage.OnEnter"]
        );
        assert_eq!(machine.current(), Phase::Stage);
    }

    #[test]
    fn request_from_on_enter_waits_for_it_to_return() {
        let log = CallLog::default();
        let handlers = handlers_with(&log, |phase, recorder| {
            if phase == Phase::Town {
                recorder.request_on_enter = vec![Phase::Stage];
                recorder.log_return = true;
            }
        });
        let (mut world, mut machine) = started(&log, handlers);

        machine.request_transition(&mut world, Phase::Town);

        assert_eq!(
            log.take(),
            vec![
                "MainMenu.OnExit",
                "Town.OnEnter",
                "Town.OnEnter returning",
                "Town.OnExit",
                "Stage.OnEnter",
            ]
        );
        assert_eq!(machine.current(), Phase::Stage);
        assert!(!machine.is_transitioning());
    }

    #[test]
    fn failing_exit_clears_flag_and_keeps_phase() {
        let log = CallLog::default();
        let handlers = handlers_with(&log, |phase, recorder| {
            if phase == Phase::MainMenu {
                recorder.fail_exit = true;
            }
        });
        let (mut world, mut machine) = started(&log, handlers);

        machine.request_transition(&mut world, Phase::Town);

        assert_eq!(log.take(), vec!["MainMenu.OnExit"]);
        assert!(!machine.is_transitioning());
        assert_eq!(machine.current(), Phase::MainMenu);
        assert_eq!(
            machine.last_failure(),
            Some(&TransitionFailure {
                from: Phase::MainMenu,
                to: Phase::Town,
                cause: HandlerError::Failed("MainMenu exit".to_string()),
            })
        );

        // The machine still works.
        machine
            .current_handler_mut::<Recorder>()
            .unwrap()
            .fail_exit = false;
        machine.request_transition(&mut world, Phase::Town);
        assert_eq!(log.take(), vec!["MainMenu.OnExit", "Town.OnEnter"]);
        assert_eq!(machine.current(), Phase::Town);
    }

    #[test]
    fn failing_enter_stops_the_drain_and_leftovers_run_next_tick() {
        let log = CallLog::default();
        let handlers = handlers_with(&log, |phase, recorder| match phase {
            Phase::MainMenu => recorder.request_on_update = vec![Phase::Town, Phase::Stage],
            Phase::Town => recorder.fail_enter = true,
            _ => {}
        });
        let (mut world, mut machine) = started(&log, handlers);

        machine.tick(&mut world);

        assert_eq!(log.take(), vec!["MainMenu.OnExit", "Town.OnEnter"]);
        assert_eq!(machine.current(), Phase::Town);
        assert!(!machine.is_transitioning());
        assert_eq!(machine.pending().collect::<Vec<_>>(), vec![Phase::Stage]);

        machine.tick(&mut world);
        assert_eq!(log.take(), vec!["Town.OnExit", "Stage.OnEnter"]);
        assert_eq!(machine.current(), Phase::Stage);
    }

    #[test]
    fn update_errors_are_swallowed() {
        let log = CallLog::default();
        let handlers = handlers_with(&log, |phase, recorder| {
            if phase == Phase::MainMenu {
                recorder.fail_update = true;
            }
        });
        let (mut world, mut machine) = started(&log, handlers);

        machine.tick(&mut world);
        machine.tick(&mut world);

        let recorder = machine.current_handler::<Recorder>().unwrap();
        assert_eq!(recorder.updates, 2);
    }

    #[test]
    fn ticks_are_quiet_before_start() {
        let log = CallLog::default();
        let mut world = World::new();
        let mut machine = PhaseMachine::default();
        machine.tick(&mut world);
        machine.fixed_tick(&mut world);

        machine.install(recording_handlers(&log).unwrap());
        machine.tick(&mut world);
        machine.fixed_tick(&mut world);

        let recorder = machine.current_handler::<Recorder>().unwrap();
        assert_eq!((recorder.updates, recorder.fixed_updates), (0, 0));
        assert!(log.take().is_empty());
    }

    #[test]
    fn fixed_tick_reaches_current_handler() {
        let log = CallLog::default();
        let (mut world, mut machine) = started(&log, recording_handlers(&log).unwrap());
        machine.fixed_tick(&mut world);
        machine.fixed_tick(&mut world);
        assert_eq!(machine.current_handler::<Recorder>().unwrap().fixed_updates, 2);
    }

    #[test]
    fn current_handler_checks_the_type() {
        struct Other;
        impl PhaseHandler for Other {
            fn on_enter(&mut self, _ctx: &mut PhaseContext) -> Result<(), HandlerError> {
                Ok(())
            }
            fn on_exit(&mut self, _ctx: &mut PhaseContext) -> Result<(), HandlerError> {
                Ok(())
            }
        }

        let log = CallLog::default();
        let machine = PhaseMachine::default();
        assert!(machine.current_handler::<Recorder>().is_none());

        let (_, machine) = started(&log, recording_handlers(&log).unwrap());
        assert!(machine.current_handler::<Recorder>().is_some());
        assert!(machine.current_handler::<Other>().is_none());
    }

    #[test]
    fn install_happens_once() {
        let log = CallLog::default();
        let (mut world, mut machine) = started(&log, recording_handlers(&log).unwrap());
        assert!(!machine.install(recording_handlers(&log).unwrap()));

        machine.teardown(&mut world);
        assert_eq!(log.take(), vec!["MainMenu.OnExit"]);
        assert!(!machine.is_initialized());
        assert!(!machine.install(recording_handlers(&log).unwrap()));
    }

    #[test]
    fn in_phase_condition_tracks_the_machine() {
        let log = CallLog::default();
        let mut world = World::new();
        world.init_resource::<PhaseMachine>();
        let condition = world.register_system(in_phase(Phase::MainMenu));
        assert!(!world.run_system(condition).unwrap());

        world.resource_scope(|world, mut machine: Mut<PhaseMachine>| {
            machine.install(recording_handlers(&log).unwrap());
            machine.request_transition(world, Phase::MainMenu);
        });
        assert!(world.run_system(condition).unwrap());
    }

    fn arb_phase() -> impl Strategy<Value = Phase> {
        prop::sample::select(Phase::ALL.to_vec())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Requests queued before a drain enter phases in FIFO order, with
        /// repeats of the then-current phase dropped.
        #[test]
        fn prop_enter_order_is_deduplicated_fifo(requests in prop::collection::vec(arb_phase(), 0..12)) {
            let log = CallLog::default();
            let queued = requests.clone();
            let handlers = handlers_with(&log, move |phase, recorder| {
                if phase == Phase::MainMenu {
                    recorder.request_on_update = queued.clone();
                }
            });
            let (mut world, mut machine) = started(&log, handlers);

            machine.tick(&mut world);

            let mut expected = Vec::new();
            let mut current = Phase::MainMenu;
            for phase in requests {
                if phase != current {
                    expected.push(format!("{}.OnExit", current));
                    expected.push(format!("{}.OnEnter", phase));
                    current = phase;
                }
            }
            prop_assert_eq!(log.take(), expected);
            prop_assert_eq!(machine.current(), current);
            prop_assert!(!machine.is_transitioning());
            prop_assert_eq!(machine.pending_len(), 0);
        }
    }
}
