//! Town phase - the safe hub where runs start and end.

use bevy::prelude::*;

use super::common::*;
use super::components::PlayerStatus;
use crate::core::{LoopConfig, Phase};
use crate::phase::{HandlerError, PhaseContext, PhaseHandler};

/// Puts a living player in town, opens the inventory and the stage portal.
pub struct TownHandler {
    spawn: Vec3,
    stage_portal: Vec3,
}

impl TownHandler {
    pub fn new(config: &LoopConfig) -> Self {
        Self {
            spawn: config.town_spawn_point(),
            stage_portal: config.town_portal_point(),
        }
    }
}

impl Default for TownHandler {
    fn default() -> Self {
        Self::new(&LoopConfig::default())
    }
}

impl PhaseHandler for TownHandler {
    fn on_enter(&mut self, ctx: &mut PhaseContext) -> Result<(), HandlerError> {
        let world = ctx.world();
        clear_overlays(world);

        match player_status(world) {
            Some(PlayerStatus::Alive) => {}
            Some(PlayerStatus::Dead) => {
                info!("Respawning dead player in town");
                despawn_player(world);
                spawn_player(world, self.spawn);
            }
            None => {
                spawn_player(world, self.spawn);
            }
        }

        load_player_state(world, Phase::Town);
        set_inventory_accessible(world, true);

        // The portal that brought us here closes; the one to the stage opens
        despawn_portals(world, Phase::Town);
        despawn_portals(world, Phase::Stage);
        spawn_portal(world, self.stage_portal, Phase::Stage);
        Ok(())
    }

    fn on_update(&mut self, ctx: &mut PhaseContext) -> Result<(), HandlerError> {
        if key_just_pressed(ctx.world(), KeyCode::Enter) {
            ctx.request_transition(Phase::Stage);
        }
        Ok(())
    }

    fn on_exit(&mut self, ctx: &mut PhaseContext) -> Result<(), HandlerError> {
        let world = ctx.world();
        save_player_state(world, Phase::Town);
        set_inventory_accessible(world, false);
        despawn_portals(world, Phase::Stage);
        Ok(())
    }
}
