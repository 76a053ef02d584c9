//! Phase plugin - drives the phase machine from the frame loop.

use bevy::app::AppExit;
use bevy::ecs::event::EventCursor;
use bevy::prelude::*;

use super::machine::PhaseMachine;
use crate::core::{PhaseRequest, RuntimeSet};

/// Phase plugin - forwards frames to the current handler and turns
/// [`PhaseRequest`] events into transitions.
pub struct PhasePlugin;

impl Plugin for PhasePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PhaseMachine>()
            .add_systems(Update, drive_phase_update.in_set(RuntimeSet::Phases))
            .add_systems(FixedUpdate, drive_phase_fixed_update)
            .add_systems(Last, teardown_on_exit);
    }
}

/// Apply this frame's phase requests, then update the current handler.
///
/// Requests are read through a cursor so other readers still see them.
fn drive_phase_update(world: &mut World, mut cursor: Local<EventCursor<PhaseRequest>>) {
    let requests: Vec<PhaseRequest> = world
        .get_resource::<Events<PhaseRequest>>()
        .map(|events| cursor.read(events).copied().collect())
        .unwrap_or_default();

    if !world.contains_resource::<PhaseMachine>() {
        return;
    }
    world.resource_scope(|world, mut machine: Mut<PhaseMachine>| {
        for PhaseRequest(phase) in requests {
            machine.request_transition(world, phase);
        }
        machine.tick(world);
    });
}

fn drive_phase_fixed_update(world: &mut World) {
    if !world.contains_resource::<PhaseMachine>() {
        return;
    }
    world.resource_scope(|world, mut machine: Mut<PhaseMachine>| {
        machine.fixed_tick(world);
    });
}

/// Leave the current phase cleanly when the app is shutting down.
fn teardown_on_exit(world: &mut World) {
    let exiting = world
        .get_resource::<Events<AppExit>>()
        .is_some_and(|events| !events.is_empty());
    if !exiting || !world.contains_resource::<PhaseMachine>() {
        return;
    }

    world.resource_scope(|world, mut machine: Mut<PhaseMachine>| {
        machine.teardown(world);
    });
}
