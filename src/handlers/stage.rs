//! Stage phase - timed combat ending in a boss fight.
//!
//! Entering the stage puts the player in the arena, starts the stage timer
//! and switches enemy spawning on. When the timer runs out the boss
//! sub-phase starts, once per visit. Pausing suspends the stage instead of
//! leaving it: the [`StageRun`] stays in the world until the stage ends,
//! either on leaving the stage or on leaving the pause screen elsewhere.

use std::time::Duration;

use bevy::prelude::*;

use super::common::*;
use super::components::{EnemySpawning, Overlay, PlayerStatus, StageRun};
use crate::core::{BossPhaseStarted, LoopConfig, Phase};
use crate::phase::{HandlerError, PhaseContext, PhaseHandler};

pub struct StageHandler {
    duration: Duration,
    spawn: Vec3,
}

impl StageHandler {
    pub fn new(config: &LoopConfig) -> Self {
        let duration = Duration::try_from_secs_f32(config.stage_duration_secs).unwrap_or_else(|e| {
            let fallback = LoopConfig::default().stage_duration_secs;
            warn!(
                "Stage duration {} unusable ({}), using {}s",
                config.stage_duration_secs, e, fallback
            );
            Duration::from_secs_f32(fallback)
        });
        Self {
            duration,
            spawn: config.stage_spawn_point(),
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Open the way back to town where the boss fell.
    pub fn on_boss_defeated(&mut self, world: &mut World, position: Vec3) -> Option<Entity> {
        if !world.contains_resource::<StageRun>() {
            return None;
        }
        hide_overlay(world, Overlay::BossWarning);
        Some(spawn_portal(world, position, Phase::Town))
    }

    fn start_boss_phase(&mut self, world: &mut World) {
        info!("Stage time is up, starting boss phase");
        if let Some(mut run) = world.get_resource_mut::<StageRun>() {
            run.boss_phase = true;
        }
        show_overlay(world, Overlay::BossWarning);

        if let Some(mut spawning) = world.get_resource_mut::<EnemySpawning>() {
            spawning.boss_requested = true;
        }
        if let Some(mut events) = world.get_resource_mut::<Events<BossPhaseStarted>>() {
            events.send(BossPhaseStarted);
        }
    }
}

impl Default for StageHandler {
    fn default() -> Self {
        Self::new(&LoopConfig::default())
    }
}

impl PhaseHandler for StageHandler {
    fn on_enter(&mut self, ctx: &mut PhaseContext) -> Result<(), HandlerError> {
        let resuming = ctx.previous() == Some(Phase::Paused);
        let world = ctx.world();
        if resuming && world.contains_resource::<StageRun>() {
            debug!("Resuming stage");
            return Ok(());
        }

        clear_overlays(world);
        set_inventory_accessible(world, false);

        match player_status(world) {
            Some(PlayerStatus::Alive) => {}
            Some(PlayerStatus::Dead) => {
                despawn_player(world);
                spawn_player(world, self.spawn);
            }
            None => {
                spawn_player(world, self.spawn);
            }
        }
        load_player_state(world, Phase::Stage);

        world.insert_resource(StageRun::new(self.duration));
        set_enemy_spawning(world, true);
        Ok(())
    }

    fn on_update(&mut self, ctx: &mut PhaseContext) -> Result<(), HandlerError> {
        if !ctx.world().contains_resource::<StageRun>() {
            return Ok(());
        }

        if key_just_pressed(ctx.world(), KeyCode::Escape) {
            ctx.request_transition(Phase::Paused);
            return Ok(());
        }

        if player_status(ctx.world()) == Some(PlayerStatus::Dead) {
            info!("Player died! Transitioning to Game Over...");
            ctx.request_transition(Phase::GameOver);
            return Ok(());
        }

        let world = ctx.world();
        let Some(delta) = world.get_resource::<Time>().map(|time| time.delta()) else {
            return Ok(());
        };
        let boss_due = match world.get_resource_mut::<StageRun>() {
            Some(mut run) => {
                run.timer.tick(delta);
                run.timer.finished() && !run.boss_phase
            }
            None => false,
        };
        if boss_due {
            self.start_boss_phase(world);
        }
        Ok(())
    }

    fn on_exit(&mut self, ctx: &mut PhaseContext) -> Result<(), HandlerError> {
        if ctx.next() == Some(Phase::Paused) {
            return Ok(());
        }
        end_stage(ctx.world());
        Ok(())
    }
}
