//! Phase module - the phase state machine and its handler contract.

mod error;
mod handler;
mod machine;
mod plugin;
mod registry;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{HandlerError, RegistryError, TransitionFailure};
pub use handler::{AsAny, PhaseContext, PhaseHandler};
pub use machine::{in_phase, PhaseMachine};
pub use plugin::PhasePlugin;
pub use registry::{PhaseHandlers, PhaseHandlersBuilder};
