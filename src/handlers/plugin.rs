//! Handlers plugin - collaborator resources and gameplay event routing.

use bevy::ecs::event::EventCursor;
use bevy::prelude::*;

use super::components::{EnemySpawning, InventoryAccess, SavedPlayer};
use super::stage::StageHandler;
use crate::core::{BossDefeated, RuntimeSet};
use crate::phase::PhaseMachine;

/// Handlers plugin - sets up what the phase handlers switch on and off.
pub struct HandlersPlugin;

impl Plugin for HandlersPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<InventoryAccess>()
            .init_resource::<EnemySpawning>()
            .init_resource::<SavedPlayer>()
            .add_systems(Update, route_boss_defeated.in_set(RuntimeSet::Phases));
    }
}

/// Hand boss kills to the stage handler. Outside the stage they are ignored.
fn route_boss_defeated(world: &mut World, mut cursor: Local<EventCursor<BossDefeated>>) {
    let defeated: Vec<BossDefeated> = world
        .get_resource::<Events<BossDefeated>>()
        .map(|events| cursor.read(events).copied().collect())
        .unwrap_or_default();
    if defeated.is_empty() || !world.contains_resource::<PhaseMachine>() {
        return;
    }

    world.resource_scope(|world, mut machine: Mut<PhaseMachine>| {
        let Some(stage) = machine.current_handler_mut::<StageHandler>() else {
            debug!("Boss defeated outside the stage, ignoring");
            return;
        };
        for BossDefeated { position } in defeated {
            stage.on_boss_defeated(world, position);
        }
    });
}
