//! Eternal Warrior - Entry Point
//!
//! Runs the game loop with stand-in services that take a few frames to warm
//! up, so the staged startup can be watched in the log.
//!
//! Controls:
//! - Enter: Start / go to the stage / back to town
//! - Escape: Pause/Unpause
//! - K: Kill the player (debug)
//! - B: Defeat the boss (debug)

use std::marker::PhantomData;

use bevy::prelude::*;
use eternal_warrior::core::{BossDefeated, InitFinished, LoopConfig, Phase, RuntimeSet};
use eternal_warrior::handlers::{registry_factory, Player, PlayerStatus};
use eternal_warrior::init::{
    InitPipeline, InitSettings, Initializable, Orchestrator, CORE_STAGE, DATA_STAGE, GAMEPLAY_STAGE,
};
use eternal_warrior::phase::in_phase;

fn main() {
    let config = LoopConfig::load();
    let settings = InitSettings::from(&config);

    let pipeline = InitPipeline::new()
        .stage(DATA_STAGE, |s| {
            s.named_service::<Warmup<PlayerData>>("player data")
                .named_service::<Warmup<ItemData>>("item data");
        })
        .stage(CORE_STAGE, |s| {
            s.named_service::<Warmup<UiManager>>("ui");
        })
        .stage(GAMEPLAY_STAGE, |s| {
            s.named_service::<Warmup<MonsterManager>>("monsters");
        });

    App::new()
        // Bevy default plugins
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Eternal Warrior".to_string(),
                resolution: (1280.0, 720.0).into(),
                ..default()
            }),
            ..default()
        }))
        .insert_resource(config)

        // Our runtime plugin
        .add_plugins(eternal_warrior::RuntimePlugin)
        .insert_resource(Orchestrator::new(pipeline, registry_factory).with_settings(settings))

        // Stand-in services
        .insert_resource(Warmup::<PlayerData>::new(2))
        .insert_resource(Warmup::<ItemData>::new(1))
        .insert_resource(Warmup::<UiManager>::new(3))
        .insert_resource(Warmup::<MonsterManager>::new(2))
        .add_systems(
            Update,
            (
                advance_warmup::<PlayerData>,
                advance_warmup::<ItemData>,
                advance_warmup::<UiManager>,
                advance_warmup::<MonsterManager>,
            )
                .in_set(RuntimeSet::Services),
        )

        .add_systems(Startup, spawn_camera)
        .add_systems(Update, report_startup)
        .add_systems(
            Update,
            (debug_kill_player, debug_defeat_boss)
                .run_if(in_phase(Phase::Stage))
                .before(RuntimeSet::Phases),
        )

        .run();
}

struct PlayerData;
struct ItemData;
struct UiManager;
struct MonsterManager;

/// A service that becomes ready a fixed number of frames after it starts.
#[derive(Resource)]
struct Warmup<M: Send + Sync + 'static> {
    started: bool,
    frames_left: u32,
    _marker: PhantomData<M>,
}

impl<M: Send + Sync + 'static> Warmup<M> {
    fn new(frames: u32) -> Self {
        Self {
            started: false,
            frames_left: frames,
            _marker: PhantomData,
        }
    }
}

impl<M: Send + Sync + 'static> Initializable for Warmup<M> {
    fn initialize(&mut self) {
        self.started = true;
    }

    fn is_initialized(&self) -> bool {
        self.started && self.frames_left == 0
    }
}

fn advance_warmup<M: Send + Sync + 'static>(mut warmup: ResMut<Warmup<M>>) {
    if warmup.started && warmup.frames_left > 0 {
        warmup.frames_left -= 1;
    }
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

fn report_startup(mut events: EventReader<InitFinished>) {
    for event in events.read() {
        match &event.outcome {
            Ok(ready) if ready.is_degraded() => {
                warn!("Started with {} degraded services", ready.degraded.len());
            }
            Ok(ready) => info!("Started after {} frames", ready.ticks),
            Err(e) => error!("Startup failed: {}", e),
        }
    }
}

fn debug_kill_player(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut players: Query<&mut PlayerStatus, With<Player>>,
) {
    if !keyboard.just_pressed(KeyCode::KeyK) {
        return;
    }
    for mut status in &mut players {
        *status = PlayerStatus::Dead;
    }
}

fn debug_defeat_boss(
    keyboard: Res<ButtonInput<KeyCode>>,
    players: Query<&Transform, With<Player>>,
    mut defeated: EventWriter<BossDefeated>,
) {
    if !keyboard.just_pressed(KeyCode::KeyB) {
        return;
    }
    let position = players
        .iter()
        .next()
        .map(|transform| transform.translation + Vec3::Z * 3.0)
        .unwrap_or_default();
    defeated.send(BossDefeated { position });
}
