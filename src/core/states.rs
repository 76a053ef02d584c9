//! The game's top-level phases.
//!
//! Exactly one phase is current at any time. Which one is decided by the
//! [`PhaseMachine`](crate::phase::PhaseMachine); this module only defines the
//! closed set of values it moves between.

use std::fmt;

use serde::Deserialize;

/// Mutually exclusive top-level modes of the game.
///
/// The game starts in `MainMenu` and never terminates on its own:
/// - `MainMenu` -> `Town` when a run starts
/// - `Town` -> `Stage` through the stage portal
/// - `Stage` <-> `Paused` on Escape
/// - `Stage` -> `GameOver` when the player dies
/// - `GameOver` -> `Town` through the town portal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
pub enum Phase {
    /// Title screen
    #[default]
    MainMenu,
    /// Safe hub between runs
    Town,
    /// In-stage combat
    Stage,
    /// Stage frozen behind the pause overlay
    Paused,
    /// Player has died
    GameOver,
}

impl Phase {
    /// Every phase, in declaration order.
    pub const ALL: [Phase; 5] = [
        Phase::MainMenu,
        Phase::Town,
        Phase::Stage,
        Phase::Paused,
        Phase::GameOver,
    ];

    /// Position of this phase in [`Phase::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::MainMenu => "MainMenu",
            Phase::Town => "Town",
            Phase::Stage => "Stage",
            Phase::Paused => "Paused",
            Phase::GameOver => "GameOver",
        };
        f.write_str(name)
    }
}
