//! Handlers module - what each phase does to the game world.
//!
//! One handler per [`Phase`](crate::core::Phase):
//! - **MainMenu**: title overlay, clears an abandoned run
//! - **Town**: living player, inventory, portal to the stage
//! - **Stage**: timed combat, boss phase, portal home
//! - **Paused**: frozen game time
//! - **GameOver**: death screen, portal back to town

mod common;
mod components;
mod game_over;
mod main_menu;
mod paused;
mod plugin;
mod stage;
mod town;

use bevy::prelude::*;

use crate::core::{LoopConfig, Phase};
use crate::phase::{PhaseHandlers, RegistryError};

pub use components::*;
pub use game_over::GameOverHandler;
pub use main_menu::MainMenuHandler;
pub use paused::PausedHandler;
pub use plugin::HandlersPlugin;
pub use stage::StageHandler;
pub use town::TownHandler;

/// The game's handler table, configured from `config`.
pub fn default_handlers(config: &LoopConfig) -> Result<PhaseHandlers, RegistryError> {
    PhaseHandlers::builder()
        .with(Phase::MainMenu, MainMenuHandler)
        .with(Phase::Town, TownHandler::new(config))
        .with(Phase::Stage, StageHandler::new(config))
        .with(Phase::Paused, PausedHandler)
        .with(Phase::GameOver, GameOverHandler::new(config))
        .build()
}

/// Registry factory for the orchestrator. Reads [`LoopConfig`] from the
/// world, falling back to the defaults.
pub fn registry_factory(world: &mut World) -> Result<PhaseHandlers, RegistryError> {
    match world.get_resource::<LoopConfig>() {
        Some(config) => default_handlers(config),
        None => default_handlers(&LoopConfig::default()),
    }
}
