//! Init module - staged startup of the game's services.

mod error;
mod orchestrator;
mod pipeline;
mod plugin;
mod service;

pub use error::{FailureReason, InitError, InitFailure};
pub use orchestrator::{FailurePolicy, InitSettings, InitState, Orchestrator, Ready, RegistryFactory};
pub use pipeline::{InitPipeline, InitStage, StageBuilder, CORE_STAGE, DATA_STAGE, GAMEPLAY_STAGE};
pub use plugin::InitPlugin;
pub use service::{Initializable, ServiceHandle, ServiceStatus};
