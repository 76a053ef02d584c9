//! Main menu phase - title screen between runs.

use bevy::prelude::*;

use super::common::*;
use super::components::Overlay;
use crate::core::Phase;
use crate::phase::{HandlerError, PhaseContext, PhaseHandler};

/// Shows the title screen. Enter starts a run in town.
#[derive(Default)]
pub struct MainMenuHandler;

impl PhaseHandler for MainMenuHandler {
    fn on_enter(&mut self, ctx: &mut PhaseContext) -> Result<(), HandlerError> {
        let returning = ctx.previous().is_some();
        let world = ctx.world();
        clear_overlays(world);

        // Nothing of an abandoned run outlives the menu
        if returning {
            despawn_player(world);
            for destination in Phase::ALL {
                despawn_portals(world, destination);
            }
            set_enemy_spawning(world, false);
            set_inventory_accessible(world, false);
        }

        show_overlay(world, Overlay::MainMenu);
        set_time_paused(world, false);
        Ok(())
    }

    fn on_update(&mut self, ctx: &mut PhaseContext) -> Result<(), HandlerError> {
        if key_just_pressed(ctx.world(), KeyCode::Enter) {
            ctx.request_transition(Phase::Town);
        }
        Ok(())
    }

    fn on_exit(&mut self, ctx: &mut PhaseContext) -> Result<(), HandlerError> {
        let world = ctx.world();
        hide_overlay(world, Overlay::MainMenu);
        save_player_state(world, Phase::MainMenu);
        Ok(())
    }
}
