//! The per-phase behavior contract.

use std::any::Any;
use std::collections::VecDeque;

use bevy::prelude::*;

use super::error::HandlerError;
use crate::core::Phase;

/// Behavior bound to one [`Phase`].
///
/// Handlers must not fail for expected conditions: a missing optional
/// collaborator means the effect is skipped. Errors returned from these
/// callbacks are caught and logged by the phase machine.
pub trait PhaseHandler: AsAny + Send + Sync {
    /// Make the phase's world state active.
    fn on_enter(&mut self, ctx: &mut PhaseContext) -> Result<(), HandlerError>;

    /// Per-frame phase logic.
    fn on_update(&mut self, _ctx: &mut PhaseContext) -> Result<(), HandlerError> {
        Ok(())
    }

    /// Fixed-timestep phase logic.
    fn on_fixed_update(&mut self, _ctx: &mut PhaseContext) -> Result<(), HandlerError> {
        Ok(())
    }

    /// Persist what must survive the phase boundary and stop phase-scoped work.
    fn on_exit(&mut self, ctx: &mut PhaseContext) -> Result<(), HandlerError>;
}

/// Downcasting support for [`PhaseMachine::current_handler`](super::PhaseMachine::current_handler).
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// What a handler callback gets to work with.
pub struct PhaseContext<'a> {
    world: &'a mut World,
    requests: &'a mut VecDeque<Phase>,
    phase: Phase,
    previous: Option<Phase>,
    next: Option<Phase>,
}

impl<'a> PhaseContext<'a> {
    pub(crate) fn new(world: &'a mut World, requests: &'a mut VecDeque<Phase>, phase: Phase) -> Self {
        Self {
            world,
            requests,
            phase,
            previous: None,
            next: None,
        }
    }

    pub(crate) fn entering_from(mut self, previous: Option<Phase>) -> Self {
        self.previous = previous;
        self
    }

    pub(crate) fn leaving_for(mut self, next: Option<Phase>) -> Self {
        self.next = next;
        self
    }

    pub fn world(&mut self) -> &mut World {
        &mut *self.world
    }

    /// Phase whose handler is running.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// In `on_enter`: the phase being left. `None` on the very first entry.
    pub fn previous(&self) -> Option<Phase> {
        self.previous
    }

    /// In `on_exit`: the phase about to be entered. `None` on teardown.
    pub fn next(&self) -> Option<Phase> {
        self.next
    }

    /// Queue a phase change.
    ///
    /// It runs after the current callback returns, never inside it.
    pub fn request_transition(&mut self, phase: Phase) {
        debug!("{} handler requested transition to {}", self.phase, phase);
        self.requests.push_back(phase);
    }
}
