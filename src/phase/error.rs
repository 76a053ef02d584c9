//! Error types for phase handlers and transitions.

use thiserror::Error;

use crate::core::Phase;

/// The handler table could not be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("No handler registered for phase {0}")]
    MissingHandler(Phase),
}

/// Unexpected error raised by a phase handler.
///
/// Missing optional collaborators are not errors; handlers skip the effect
/// instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    #[error("{0}")]
    Failed(String),
}

/// A transition stopped part way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Transition {from} -> {to} failed: {cause}")]
pub struct TransitionFailure {
    pub from: Phase,
    pub to: Phase,
    #[source]
    pub cause: HandlerError,
}
