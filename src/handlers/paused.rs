//! Paused phase - the stage frozen behind an overlay.
//!
//! Leaving the pause screen for anything but the stage ends the stage.

use bevy::prelude::*;

use super::common::*;
use super::components::Overlay;
use crate::core::Phase;
use crate::phase::{HandlerError, PhaseContext, PhaseHandler};

/// Freezes game time until Escape is pressed again.
#[derive(Default)]
pub struct PausedHandler;

impl PhaseHandler for PausedHandler {
    fn on_enter(&mut self, ctx: &mut PhaseContext) -> Result<(), HandlerError> {
        let world = ctx.world();
        set_time_paused(world, true);
        show_overlay(world, Overlay::Pause);
        Ok(())
    }

    fn on_update(&mut self, ctx: &mut PhaseContext) -> Result<(), HandlerError> {
        if key_just_pressed(ctx.world(), KeyCode::Escape) {
            ctx.request_transition(Phase::Stage);
        }
        Ok(())
    }

    fn on_exit(&mut self, ctx: &mut PhaseContext) -> Result<(), HandlerError> {
        let back_to_stage = ctx.next() == Some(Phase::Stage);
        let world = ctx.world();
        set_time_paused(world, false);
        hide_overlay(world, Overlay::Pause);

        // The suspended stage is abandoned unless we return to it
        if !back_to_stage {
            end_stage(world);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::handlers::common::harness::*;
    use crate::handlers::components::{EnemySpawning, Portal, StageRun};

    #[test]
    fn freezes_game_time_while_paused() {
        let mut world = World::new();
        world.insert_resource(Time::<Virtual>::default());
        let mut paused = PausedHandler;

        enter(&mut paused, &mut world, Phase::Paused, Some(Phase::Stage)).unwrap();
        assert!(world.resource::<Time<Virtual>>().is_paused());
        assert_eq!(count::<Overlay>(&mut world), 1);

        press(&mut world, KeyCode::Escape);
        let requested = update(&mut paused, &mut world, Phase::Paused).unwrap();
        assert_eq!(requested, vec![Phase::Stage]);

        exit(&mut paused, &mut world, Phase::Paused, Some(Phase::Stage)).unwrap();
        assert!(!world.resource::<Time<Virtual>>().is_paused());
        assert_eq!(count::<Overlay>(&mut world), 0);
    }

    #[test]
    fn leaving_for_elsewhere_ends_the_stage() {
        for next in [Some(Phase::Town), Some(Phase::MainMenu), None] {
            let mut world = World::new();
            world.insert_resource(EnemySpawning {
                active: true,
                boss_requested: true,
            });
            world.insert_resource(StageRun::new(Duration::from_secs(5)));
            show_overlay(&mut world, Overlay::BossWarning);
            spawn_portal(&mut world, Vec3::ONE, Phase::Town);
            let mut paused = PausedHandler;

            enter(&mut paused, &mut world, Phase::Paused, Some(Phase::Stage)).unwrap();
            exit(&mut paused, &mut world, Phase::Paused, next).unwrap();

            assert!(!world.contains_resource::<StageRun>(), "next: {:?}", next);
            assert!(!world.resource::<EnemySpawning>().active);
            assert!(!world.resource::<EnemySpawning>().boss_requested);
            assert_eq!(count::<Overlay>(&mut world), 0);
            assert_eq!(count::<Portal>(&mut world), 0);
        }
    }

    #[test]
    fn returning_to_the_stage_keeps_it() {
        let mut world = World::new();
        world.insert_resource(StageRun::new(Duration::from_secs(5)));
        let mut paused = PausedHandler;

        enter(&mut paused, &mut world, Phase::Paused, Some(Phase::Stage)).unwrap();
        exit(&mut paused, &mut world, Phase::Paused, Some(Phase::Stage)).unwrap();

        assert!(world.contains_resource::<StageRun>());
    }

    #[test]
    fn works_without_a_clock() {
        let mut world = World::new();
        let mut paused = PausedHandler;

        enter(&mut paused, &mut world, Phase::Paused, Some(Phase::Stage)).unwrap();
        exit(&mut paused, &mut world, Phase::Paused, Some(Phase::Stage)).unwrap();
    }
}
