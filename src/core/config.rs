//! Runtime configuration loaded from an external RON file.
//!
//! Allows tweaking startup pacing and phase parameters without recompilation.

use std::fs;
use std::path::Path;

use bevy::prelude::*;
use serde::Deserialize;

use super::error::ConfigError;
use crate::init::FailurePolicy;

/// Default location of the runtime configuration.
pub const CONFIG_PATH: &str = "assets/data/game_loop.ron";

/// Longest accepted stage, one day.
pub const MAX_STAGE_DURATION_SECS: f32 = 86_400.0;

/// Runtime configuration loaded from assets/data/game_loop.ron.
///
/// Every field is optional in the file; missing ones keep their defaults.
#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    // Initialization
    /// Ticks to wait after a stage completes before the next one starts (min 1)
    pub settle_ticks: u32,
    /// Give up on a stage's stragglers after this many ticks (None = wait forever)
    pub stage_timeout_ticks: Option<u32>,
    /// What a failed service does to the rest of the pipeline
    pub failure_policy: FailurePolicy,
    // Phases
    /// Seconds before the stage boss appears
    pub stage_duration_secs: f32,
    pub town_spawn: (f32, f32, f32),
    pub stage_spawn: (f32, f32, f32),
    /// Where the town's stage portal opens
    pub town_portal_position: (f32, f32, f32),
    /// Offset from the player at which the game-over town portal opens
    pub portal_offset: (f32, f32, f32),
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            settle_ticks: 1,
            stage_timeout_ticks: None,
            failure_policy: FailurePolicy::Continue,
            stage_duration_secs: 600.0,
            town_spawn: (0.0, 0.0, 0.0),
            stage_spawn: (0.0, 0.0, 0.0),
            town_portal_position: (10.0, 0.0, 0.0),
            portal_offset: (2.0, 0.0, 0.0),
        }
    }
}

impl LoopConfig {
    /// Load the config from [`CONFIG_PATH`], falling back to defaults.
    pub fn load() -> Self {
        match Self::load_from(CONFIG_PATH) {
            Ok(config) => {
                info!("Loaded runtime config from {}", CONFIG_PATH);
                config
            }
            Err(ConfigError::ReadError { details, .. }) => {
                warn!("Could not read {}: {}. Using defaults.", CONFIG_PATH, details);
                Self::default()
            }
            Err(e) => {
                error!("{}. Using defaults.", e);
                Self::default()
            }
        }
    }

    /// Load the config from a specific file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.display().to_string(),
            details: e.to_string(),
        })?;
        Self::parse(&contents, &path.display().to_string())
    }

    /// Parse a config from RON text.
    pub fn from_ron_str(contents: &str) -> Result<Self, ConfigError> {
        Self::parse(contents, "<inline>")
    }

    fn parse(contents: &str, path: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(contents).map_err(|e| ConfigError::ParseError {
            path: path.to_string(),
            details: e.to_string(),
        })?;

        if !(0.0..=MAX_STAGE_DURATION_SECS).contains(&config.stage_duration_secs) {
            return Err(ConfigError::InvalidValue {
                path: path.to_string(),
                field: "stage_duration_secs",
                details: format!(
                    "expected 0 to {} seconds, got {}",
                    MAX_STAGE_DURATION_SECS, config.stage_duration_secs
                ),
            });
        }
        if config.stage_timeout_ticks == Some(0) {
            return Err(ConfigError::InvalidValue {
                path: path.to_string(),
                field: "stage_timeout_ticks",
                details: "use None to wait forever".to_string(),
            });
        }
        Ok(config)
    }

    pub fn town_spawn_point(&self) -> Vec3 {
        Vec3::from(self.town_spawn)
    }

    pub fn stage_spawn_point(&self) -> Vec3 {
        Vec3::from(self.stage_spawn)
    }

    pub fn town_portal_point(&self) -> Vec3 {
        Vec3::from(self.town_portal_position)
    }

    pub fn portal_offset(&self) -> Vec3 {
        Vec3::from(self.portal_offset)
    }
}
