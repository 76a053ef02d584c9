//! Scripted handlers for unit tests.

use std::sync::{Arc, Mutex};

use super::error::{HandlerError, RegistryError};
use super::handler::{PhaseContext, PhaseHandler};
use super::registry::PhaseHandlers;
use crate::core::Phase;

/// Shared record of handler calls, e.g. `"Town.OnEnter"`.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    /// Return and clear everything logged so far.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

/// Logs every callback and can be scripted to request or fail.
pub struct Recorder {
    phase: Phase,
    log: CallLog,
    pub request_on_enter: Vec<Phase>,
    pub request_on_update: Vec<Phase>,
    pub log_return: bool,
    pub fail_enter: bool,
    pub fail_exit: bool,
    pub fail_update: bool,
    pub updates: u32,
    pub fixed_updates: u32,
}

impl Recorder {
    pub fn new(phase: Phase, log: &CallLog) -> Self {
        Self {
            phase,
            log: log.clone(),
            request_on_enter: Vec::new(),
            request_on_update: Vec::new(),
            log_return: false,
            fail_enter: false,
            fail_exit: false,
            fail_update: false,
            updates: 0,
            fixed_updates: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }
}

impl PhaseHandler for Recorder {
    fn on_enter(&mut self, ctx: &mut PhaseContext) -> Result<(), HandlerError> {
        self.log.push(format!("{}.OnEnter", self.phase));
        for phase in self.request_on_enter.drain(..) {
            ctx.request_transition(phase);
        }
        if self.log_return {
            self.log.push(format!("{}.OnEnter returning", self.phase));
        }
        if self.fail_enter {
            return Err(HandlerError::Failed(format!("{} enter", self.phase)));
        }
        Ok(())
    }

    fn on_update(&mut self, ctx: &mut PhaseContext) -> Result<(), HandlerError> {
        self.updates += 1;
        for phase in self.request_on_update.drain(..) {
            ctx.request_transition(phase);
        }
        if self.fail_update {
            return Err(HandlerError::Failed(format!("{} update", self.phase)));
        }
        Ok(())
    }

    fn on_fixed_update(&mut self, _ctx: &mut PhaseContext) -> Result<(), HandlerError> {
        self.fixed_updates += 1;
        Ok(())
    }

    fn on_exit(&mut self, _ctx: &mut PhaseContext) -> Result<(), HandlerError> {
        self.log.push(format!("{}.OnExit", self.phase));
        if self.fail_exit {
            return Err(HandlerError::Failed(format!("{} exit", self.phase)));
        }
        Ok(())
    }
}

/// A full table of recorders sharing one log.
pub fn recording_handlers(log: &CallLog) -> Result<PhaseHandlers, RegistryError> {
    Phase::ALL
        .into_iter()
        .fold(PhaseHandlers::builder(), |builder, phase| {
            builder.with(phase, Recorder::new(phase, log))
        })
        .build()
}
