//! Global events used for cross-system communication.
//!
//! Gameplay code never touches the phase machine or the orchestrator
//! directly. It sends these events instead, and the runtime plugins pick
//! them up at a well-defined point of the frame.

use bevy::prelude::*;

use super::states::Phase;
use crate::init::{InitError, Ready};

/// Asks the phase machine to move to another phase.
///
/// Requests are queued and processed in arrival order. Asking for the
/// current phase is a no-op.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseRequest(pub Phase);

/// Sent once, when the initialization pipeline has finished.
#[derive(Event, Debug, Clone)]
pub struct InitFinished {
    pub outcome: Result<Ready, InitError>,
}

impl InitFinished {
    /// Whether the game reached the main menu.
    pub fn succeeded(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Sent when the stage timer runs out and the boss shows up.
#[derive(Event, Debug, Clone, Copy)]
pub struct BossPhaseStarted;

/// Sent by gameplay when the stage boss dies.
#[derive(Event, Debug, Clone, Copy)]
pub struct BossDefeated {
    /// Where the boss died; the town portal opens here
    pub position: Vec3,
}

/// What survives a phase boundary about the player.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlayerSnapshot {
    pub position: Vec3,
    /// Item ids carried by the player
    pub inventory: Vec<String>,
}

/// Hands the player's state to the save/load collaborator at a phase
/// boundary.
#[derive(Event, Debug, Clone)]
pub struct PlayerSaveRequested {
    /// Phase being left
    pub phase: Phase,
    pub snapshot: PlayerSnapshot,
}

/// Asks the save/load collaborator for the player's saved state on entering
/// a phase.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerLoadRequested {
    /// Phase being entered
    pub phase: Phase,
}
