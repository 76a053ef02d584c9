//! Core module - phases, events, configuration and frame ordering.
//!
//! This module provides the foundation that all other runtime systems build upon.

mod config;
mod error;
mod events;
mod plugin;
mod sets;
mod states;

pub use config::{LoopConfig, CONFIG_PATH, MAX_STAGE_DURATION_SECS};
pub use error::ConfigError;
pub use events::*;
pub use plugin::CorePlugin;
pub use sets::RuntimeSet;
pub use states::*;
