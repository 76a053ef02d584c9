//! Components and collaborator resources touched by the phase handlers.

use std::time::Duration;

use bevy::prelude::*;

use crate::core::{Phase, PlayerSnapshot};

/// Marker component for the player entity.
#[derive(Component)]
pub struct Player;

/// Whether the player is still standing.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerStatus {
    #[default]
    Alive,
    Dead,
}

/// Item ids the player carries.
#[derive(Component, Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    pub items: Vec<String>,
}

/// A portal leading to another phase.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Portal {
    pub destination: Phase,
}

/// Full-screen overlays owned by the phase handlers.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    MainMenu,
    Pause,
    GameOver,
    BossWarning,
}

/// Whether the inventory screen may be opened.
#[derive(Resource, Debug, Default)]
pub struct InventoryAccess {
    pub accessible: bool,
}

/// Switch watched by the enemy spawner.
///
/// The spawner itself lives outside this crate; the Stage phase only turns it
/// on and off. When the resource is absent nothing is toggled.
#[derive(Resource, Debug, Default)]
pub struct EnemySpawning {
    pub active: bool,
    /// Set when the stage boss should be spawned
    pub boss_requested: bool,
}

/// Last player snapshot handed to the save/load collaborator.
///
/// Filled on every phase exit. The collaborator may replace it with loaded
/// state; entering a phase applies it to the player.
#[derive(Resource, Debug, Default)]
pub struct SavedPlayer(pub Option<PlayerSnapshot>);

/// A stage in progress.
///
/// Exists from entering the stage until the stage ends. It survives a pause,
/// which is how the stage knows to resume.
#[derive(Resource, Debug)]
pub struct StageRun {
    pub(crate) timer: Timer,
    pub(crate) boss_phase: bool,
}

impl StageRun {
    pub fn new(duration: Duration) -> Self {
        Self {
            timer: Timer::new(duration, TimerMode::Once),
            boss_phase: false,
        }
    }

    /// Time left before the boss appears.
    pub fn remaining(&self) -> Duration {
        self.timer.remaining()
    }

    pub fn is_boss_phase(&self) -> bool {
        self.boss_phase
    }
}
