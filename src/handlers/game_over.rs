//! Game over phase - the player has died.

use bevy::prelude::*;

use super::common::*;
use super::components::Overlay;
use crate::core::{LoopConfig, Phase};
use crate::phase::{HandlerError, PhaseContext, PhaseHandler};

/// Shows the death screen and opens a town portal next to the body.
pub struct GameOverHandler {
    portal_offset: Vec3,
    portal_spawned: bool,
}

impl GameOverHandler {
    pub fn new(config: &LoopConfig) -> Self {
        Self {
            portal_offset: config.portal_offset(),
            portal_spawned: false,
        }
    }
}

impl Default for GameOverHandler {
    fn default() -> Self {
        Self::new(&LoopConfig::default())
    }
}

impl PhaseHandler for GameOverHandler {
    fn on_enter(&mut self, ctx: &mut PhaseContext) -> Result<(), HandlerError> {
        let world = ctx.world();
        show_overlay(world, Overlay::GameOver);

        let position = match player_position(world) {
            Some(position) => position,
            None => {
                let position = saved_position(world).unwrap_or(Vec3::ZERO);
                spawn_player(world, position);
                info!("Player respawned at last saved position {}", position);
                position
            }
        };
        load_player_state(world, Phase::GameOver);

        if !self.portal_spawned {
            spawn_portal(world, position + self.portal_offset, Phase::Town);
            self.portal_spawned = true;
        }
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
        hide_overlay(world, Overlay::GameOver);
        self.portal_spawned = false;

        // The body does not follow us out of the game over screen
        despawn_player(world);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PlayerSnapshot;
    use crate::handlers::components::{Player, Portal, SavedPlayer};
    use crate::handlers::common::harness::*;

    #[test]
    fn one_portal_next_to_the_body() {
        let mut world = World::new();
        spawn_player(&mut world, Vec3::new(4.0, 0.0, 1.0));
        let mut game_over = GameOverHandler::default();

        enter(&mut game_over, &mut world, Phase::GameOver, Some(Phase::Stage)).unwrap();
        enter(&mut game_over, &mut world, Phase::GameOver, Some(Phase::Stage)).unwrap();

        let portals: Vec<(Phase, Vec3)> = world
            .query::<(&Portal, &Transform)>()
            .iter(&world)
            .map(|(portal, transform)| (portal.destination, transform.translation))
            .collect();
        assert_eq!(portals, vec![(Phase::Town, Vec3::new(6.0, 0.0, 1.0))]);
        assert_eq!(count::<Overlay>(&mut world), 1);
    }

    #[test]
    fn missing_player_is_recreated() {
        let mut world = World::new();
        let mut game_over = GameOverHandler::default();

        enter(&mut game_over, &mut world, Phase::GameOver, Some(Phase::Stage)).unwrap();

        assert_eq!(count::<Player>(&mut world), 1);
        assert_eq!(count::<Portal>(&mut world), 1);
    }

    #[test]
    fn missing_player_returns_where_last_saved() {
        let mut world = World::new();
        world.insert_resource(SavedPlayer(Some(PlayerSnapshot {
            position: Vec3::new(7.0, 0.0, 3.0),
            inventory: Vec::new(),
        })));
        let mut game_over = GameOverHandler::default();

        enter(&mut game_over, &mut world, Phase::GameOver, Some(Phase::Stage)).unwrap();

        assert_eq!(player_position(&mut world), Some(Vec3::new(7.0, 0.0, 3.0)));
        let portal: Vec<Vec3> = world
            .query_filtered::<&Transform, With<Portal>>()
            .iter(&world)
            .map(|transform| transform.translation)
            .collect();
        assert_eq!(portal, vec![Vec3::new(9.0, 0.0, 3.0)]);
    }

    #[test]
    fn leaving_clears_the_screen() {
        let mut world = World::new();
        let mut game_over = GameOverHandler::default();
        enter(&mut game_over, &mut world, Phase::GameOver, Some(Phase::Stage)).unwrap();

        press(&mut world, KeyCode::Enter);
        let requested = update(&mut game_over, &mut world, Phase::GameOver).unwrap();
        exit(&mut game_over, &mut world, Phase::GameOver, Some(Phase::Town)).unwrap();

        assert_eq!(requested, vec![Phase::Town]);
        assert_eq!(count::<Overlay>(&mut world), 0);
        assert_eq!(count::<Player>(&mut world), 0);
    }
}
