//! Ordered startup stages.

use bevy::prelude::*;

use super::service::{Initializable, ServiceHandle};

/// Stage holding the data managers (player, item and skill data).
pub const DATA_STAGE: &str = "data";
/// Stage holding the core managers (pools, game, camera, UI).
pub const CORE_STAGE: &str = "core";
/// Stage holding the gameplay managers (skills, units, monsters, timers).
pub const GAMEPLAY_STAGE: &str = "gameplay";

/// A group of services that must all be ready before the next stage starts.
#[derive(Debug, Clone)]
pub struct InitStage {
    name: &'static str,
    services: Vec<ServiceHandle>,
}

impl InitStage {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn services(&self) -> &[ServiceHandle] {
        &self.services
    }
}

/// Collects the services of one stage.
#[derive(Default)]
pub struct StageBuilder {
    services: Vec<ServiceHandle>,
}

impl StageBuilder {
    /// Add the resource `T`, named after its type.
    pub fn service<T: Resource + Initializable>(&mut self) -> &mut Self {
        self.services.push(ServiceHandle::of::<T>());
        self
    }

    /// Add the resource `T` under a display name.
    pub fn named_service<T: Resource + Initializable>(&mut self, name: &'static str) -> &mut Self {
        self.services.push(ServiceHandle::named::<T>(name));
        self
    }
}

/// The fixed, ordered list of startup stages.
///
/// ```ignore
/// let pipeline = InitPipeline::new()
///     .stage(DATA_STAGE, |s| {
///         s.service::<PlayerData>().service::<ItemData>();
///     })
///     .stage(CORE_STAGE, |s| {
///         s.service::<UiManager>();
///     });
/// ```
#[derive(Debug, Clone, Default)]
pub struct InitPipeline {
    stages: Vec<InitStage>,
}

impl InitPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage. Stages run in the order they are added.
    pub fn stage(mut self, name: &'static str, build: impl FnOnce(&mut StageBuilder)) -> Self {
        let mut builder = StageBuilder::default();
        build(&mut builder);
        self.stages.push(InitStage {
            name,
            services: builder.services,
        });
        self
    }

    pub fn stages(&self) -> &[InitStage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}
