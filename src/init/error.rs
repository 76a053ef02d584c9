//! Error types for the startup pipeline.

use thiserror::Error;

use crate::phase::RegistryError;

/// Why a service was given up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// The service resource does not exist.
    Missing,
    /// The service reported a failure before becoming ready.
    Failed,
    /// The stage's opt-in timeout ran out first.
    TimedOut,
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::Missing => f.write_str("service is missing"),
            FailureReason::Failed => f.write_str("service failed to initialize"),
            FailureReason::TimedOut => f.write_str("service timed out"),
        }
    }
}

/// A required service never became ready.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{stage} stage: '{service}' {reason}")]
pub struct InitFailure {
    pub stage: &'static str,
    pub service: &'static str,
    pub reason: FailureReason,
}

/// Errors that end the startup pipeline without reaching the main menu.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitError {
    /// A service failed while the abort policy was selected.
    #[error("Initialization aborted: {0}")]
    StageFailed(InitFailure),

    /// The phase handlers could not be created.
    #[error("Phase handler creation failed: {0}")]
    Registry(#[from] RegistryError),

    /// There is no phase machine to hand the handlers to.
    #[error("No phase machine resource to install handlers into")]
    MachineMissing,

    /// The phase machine already holds a handler table.
    #[error("Phase handlers are installed once per process")]
    AlreadyInstalled,
}
