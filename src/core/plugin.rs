//! Core plugin that sets up configuration, global events and frame ordering.

use bevy::prelude::*;

use super::config::LoopConfig;
use super::events::*;
use super::sets::RuntimeSet;

/// Core plugin - must be added first as other plugins depend on it.
///
/// This plugin sets up:
/// - The runtime config (kept if the app already has one)
/// - Global events (PhaseRequest, InitFinished, etc.)
/// - The ordering of [`RuntimeSet`] inside `Update`
pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<LoopConfig>() {
            app.insert_resource(LoopConfig::load());
        }

        app
            // Register global events
            .add_event::<PhaseRequest>()
            .add_event::<InitFinished>()
            .add_event::<BossPhaseStarted>()
            .add_event::<BossDefeated>()
            .add_event::<PlayerSaveRequested>()
            .add_event::<PlayerLoadRequested>()

            // Startup work first, then phase logic
            .configure_sets(
                Update,
                (
                    RuntimeSet::InitBegin,
                    RuntimeSet::Services,
                    RuntimeSet::InitCheck,
                    RuntimeSet::Phases,
                )
                    .chain(),
            );
    }
}
