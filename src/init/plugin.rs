//! Init plugin - drives the orchestrator from the frame loop.

use std::task::Poll;

use bevy::prelude::*;

use super::orchestrator::Orchestrator;
use crate::core::{InitFinished, RuntimeSet};

/// Init plugin - runs the startup pipeline once per frame until it finishes.
///
/// The app supplies the [`Orchestrator`] resource; without one these systems
/// do nothing.
pub struct InitPlugin;

impl Plugin for InitPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                begin_initialization.in_set(RuntimeSet::InitBegin),
                check_initialization.in_set(RuntimeSet::InitCheck),
            ),
        );
    }
}

/// Start the stage that is due this frame.
fn begin_initialization(world: &mut World) {
    if !world.contains_resource::<Orchestrator>() {
        return;
    }
    world.resource_scope(|world, mut orchestrator: Mut<Orchestrator>| {
        orchestrator.begin_tick(world);
    });
}

/// Poll readiness and announce the outcome once.
fn check_initialization(world: &mut World) {
    if !world.contains_resource::<Orchestrator>() {
        return;
    }
    let finished = world.resource_scope(|world, mut orchestrator: Mut<Orchestrator>| {
        if orchestrator.is_finished() {
            return None;
        }
        match orchestrator.check_tick(world) {
            Poll::Ready(outcome) => Some(outcome),
            Poll::Pending => None,
        }
    });

    if let Some(outcome) = finished {
        world.send_event(InitFinished { outcome });
    }
}
