//! Eternal Warrior - the game-loop runtime.
//!
//! Startup runs through a staged initialization pipeline. When it is done,
//! the game moves through its phases: the title screen, the town hub, timed
//! stages, pause and game over.
//!
//! # Architecture
//!
//! The runtime is organized into plugins, each handling one concern:
//!
//! - **Core**: Phases, global events, configuration, frame ordering
//! - **Init**: Service contract, startup pipeline, orchestrator
//! - **Phase**: Phase machine, transition queue, handler table
//! - **Handlers**: What each phase does to the world

pub mod core;
pub mod handlers;
pub mod init;
pub mod phase;

use bevy::prelude::*;

/// Main runtime plugin that adds all sub-plugins.
///
/// The app still has to insert an [`init::Orchestrator`] describing its
/// services; until then the phase machine stays empty.
pub struct RuntimePlugin;

impl Plugin for RuntimePlugin {
    fn build(&self, app: &mut App) {
        app
            // Core systems (must be first)
            .add_plugins(core::CorePlugin)

            // Startup pipeline
            .add_plugins(init::InitPlugin)

            // Phase machine
            .add_plugins(phase::PhasePlugin)

            // Phase collaborators
            .add_plugins(handlers::HandlersPlugin);
    }
}
