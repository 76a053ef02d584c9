//! Staged, dependency-ordered startup.
//!
//! The orchestrator walks the [`InitPipeline`] one stage at a time. Starting a
//! stage calls `initialize()` on each of its services; the stage is then
//! polled once per tick until every service is ready. Waiting never blocks:
//! each poll returns and the rest of the frame keeps running.
//!
//! A frame is split in two calls so that services can do their work in
//! between:
//!
//! 1. [`Orchestrator::begin_tick`] starts the stage that is due, if any.
//! 2. Services advance their initialization.
//! 3. [`Orchestrator::check_tick`] polls readiness and moves on.
//!
//! When the last stage is done the orchestrator builds the phase handlers,
//! installs them in the [`PhaseMachine`] and requests [`Phase::MainMenu`].
//!
//! A service that is missing or reports failure does not stop the pipeline
//! under the default [`FailurePolicy::Continue`]: the failure is logged and
//! kept in [`Ready::degraded`], and the remaining stages still run. Whether
//! the game should keep going without the service is an open product
//! question, so the old behaviour stays the default and aborting is opt-in.

use std::task::Poll;

use bevy::prelude::*;
use serde::Deserialize;

use super::error::{FailureReason, InitError, InitFailure};
use super::pipeline::InitPipeline;
use crate::core::{LoopConfig, Phase};
use crate::phase::{PhaseHandlers, PhaseMachine, RegistryError};

/// Builds the phase handlers once every stage has run.
pub type RegistryFactory =
    Box<dyn FnOnce(&mut World) -> Result<PhaseHandlers, RegistryError> + Send + Sync>;

/// What a service failure does to the rest of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum FailurePolicy {
    /// Log the failure and keep initializing later stages.
    #[default]
    Continue,
    /// Stop the pipeline at the first failure.
    Abort,
}

/// Pacing and failure handling of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitSettings {
    /// Ticks between a stage completing and the next one starting (min 1).
    pub settle_ticks: u32,
    /// Give up on unready services after this many ticks. `None` waits forever.
    pub stage_timeout_ticks: Option<u32>,
    pub failure_policy: FailurePolicy,
}

impl Default for InitSettings {
    fn default() -> Self {
        Self {
            settle_ticks: 1,
            stage_timeout_ticks: None,
            failure_policy: FailurePolicy::Continue,
        }
    }
}

impl From<&LoopConfig> for InitSettings {
    fn from(config: &LoopConfig) -> Self {
        Self {
            settle_ticks: config.settle_ticks,
            stage_timeout_ticks: config.stage_timeout_ticks,
            failure_policy: config.failure_policy,
        }
    }
}

/// Successful end of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ready {
    /// Tick on which the pipeline finished
    pub ticks: u64,
    /// Services given up on along the way
    pub degraded: Vec<InitFailure>,
}

impl Ready {
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}

/// Where the pipeline currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    /// Not ticked yet.
    Idle,
    /// Waiting for the settle delay before starting a stage.
    Settling { stage: &'static str },
    /// Polling the services of a stage.
    Stage { index: usize, name: &'static str },
    Complete,
    Failed,
}

#[derive(Debug, Clone, Copy)]
enum Step {
    /// Start stage `index` on tick `at` or later.
    Begin { index: usize, at: u64 },
    /// Stage `index` started on tick `since`.
    Await { index: usize, since: u64 },
    Done,
}

/// Runs the startup pipeline, one tick at a time.
#[derive(Resource)]
pub struct Orchestrator {
    pipeline: InitPipeline,
    settings: InitSettings,
    factory: Option<RegistryFactory>,
    step: Step,
    tick: u64,
    /// Per service of the current stage: ready or given up on.
    settled: Vec<bool>,
    failures: Vec<InitFailure>,
    outcome: Option<Result<Ready, InitError>>,
}

impl Orchestrator {
    pub fn new(
        pipeline: InitPipeline,
        factory: impl FnOnce(&mut World) -> Result<PhaseHandlers, RegistryError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            pipeline,
            settings: InitSettings::default(),
            factory: Some(Box::new(factory)),
            step: Step::Begin { index: 0, at: 1 },
            tick: 0,
            settled: Vec::new(),
            failures: Vec::new(),
            outcome: None,
        }
    }

    pub fn with_settings(mut self, settings: InitSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> InitSettings {
        self.settings
    }

    /// Ticks seen so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn state(&self) -> InitState {
        match (&self.outcome, self.step) {
            (Some(Ok(_)), _) => InitState::Complete,
            (Some(Err(_)), _) => InitState::Failed,
            (None, _) if self.tick == 0 => InitState::Idle,
            (None, Step::Begin { index, .. }) => match self.pipeline.stages().get(index) {
                Some(stage) => InitState::Settling { stage: stage.name() },
                None => InitState::Complete,
            },
            (None, Step::Await { index, .. }) => InitState::Stage {
                index,
                name: self.pipeline.stages()[index].name(),
            },
            (None, Step::Done) => InitState::Complete,
        }
    }

    /// Failures recorded so far, in the order they were observed.
    pub fn failures(&self) -> &[InitFailure] {
        &self.failures
    }

    pub fn outcome(&self) -> Option<&Result<Ready, InitError>> {
        self.outcome.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// Run a whole tick with no service work in between.
    pub fn run_tick(&mut self, world: &mut World) -> Poll<Result<Ready, InitError>> {
        self.begin_tick(world);
        self.check_tick(world)
    }

    /// First half of a tick: start the stage that is due.
    pub fn begin_tick(&mut self, world: &mut World) {
        if self.outcome.is_some() {
            return;
        }
        self.tick += 1;

        if let Step::Begin { index, at } = self.step {
            if self.tick >= at && index < self.pipeline.len() {
                self.start_stage(index, world);
            }
        }
    }

    /// Second half of a tick: poll readiness and advance the pipeline.
    pub fn check_tick(&mut self, world: &mut World) -> Poll<Result<Ready, InitError>> {
        if let Some(outcome) = &self.outcome {
            return Poll::Ready(outcome.clone());
        }

        match self.step {
            Step::Begin { index, .. } if index >= self.pipeline.len() => self.finish(world),
            Step::Await { index, since } => self.poll_stage(index, since, world),
            Step::Begin { .. } | Step::Done => {}
        }

        match &self.outcome {
            Some(outcome) => Poll::Ready(outcome.clone()),
            None => Poll::Pending,
        }
    }

    fn start_stage(&mut self, index: usize, world: &mut World) {
        let stage = &self.pipeline.stages()[index];
        info!(
            "Initializing {} stage ({} services)...",
            stage.name(),
            stage.services().len()
        );

        self.settled.clear();
        let mut missing = Vec::new();
        for service in stage.services() {
            match service.get_mut(world) {
                Some(instance) => {
                    instance.initialize();
                    self.settled.push(false);
                }
                None => {
                    missing.push(InitFailure {
                        stage: stage.name(),
                        service: service.name(),
                        reason: FailureReason::Missing,
                    });
                    self.settled.push(true);
                }
            }
        }

        self.step = Step::Await {
            index,
            since: self.tick,
        };
        self.record(missing);
    }

    fn poll_stage(&mut self, index: usize, since: u64, world: &mut World) {
        let stage = &self.pipeline.stages()[index];
        let mut failures = Vec::new();
        let mut waiting = Vec::new();

        for (slot, service) in stage.services().iter().enumerate() {
            if self.settled[slot] {
                continue;
            }
            let reason = match service.get(world) {
                None => Some(FailureReason::Missing),
                Some(instance) if instance.is_initialized() => {
                    info!("{} initialized", service.name());
                    self.settled[slot] = true;
                    None
                }
                Some(instance) if instance.has_failed() => Some(FailureReason::Failed),
                Some(_) => {
                    waiting.push(slot);
                    None
                }
            };
            if let Some(reason) = reason {
                self.settled[slot] = true;
                failures.push(InitFailure {
                    stage: stage.name(),
                    service: service.name(),
                    reason,
                });
            }
        }

        let timed_out = self
            .settings
            .stage_timeout_ticks
            .is_some_and(|limit| self.tick - since >= u64::from(limit));
        if timed_out {
            for slot in waiting.drain(..) {
                self.settled[slot] = true;
                failures.push(InitFailure {
                    stage: stage.name(),
                    service: stage.services()[slot].name(),
                    reason: FailureReason::TimedOut,
                });
            }
        }

        let stage_name = stage.name();
        self.record(failures);
        if self.outcome.is_some() || !waiting.is_empty() {
            return;
        }

        info!("All {} services initialized", stage_name);
        let next = index + 1;
        if next < self.pipeline.len() {
            self.step = Step::Begin {
                index: next,
                at: self.tick + u64::from(self.settings.settle_ticks.max(1)),
            };
        } else {
            self.finish(world);
        }
    }

    /// Log and keep failures; stop here if the policy says so.
    fn record(&mut self, failures: Vec<InitFailure>) {
        for failure in &failures {
            error!("Initialization failure: {}", failure);
        }
        let first = failures.first().cloned();
        self.failures.extend(failures);

        if let (Some(failure), FailurePolicy::Abort) = (first, self.settings.failure_policy) {
            self.conclude(Err(InitError::StageFailed(failure)));
        }
    }

    fn finish(&mut self, world: &mut World) {
        self.step = Step::Done;
        let Some(factory) = self.factory.take() else {
            return;
        };

        info!("Creating phase handlers...");
        let handlers = match factory(world) {
            Ok(handlers) => handlers,
            Err(e) => {
                error!("Phase handler creation failed: {}", e);
                self.conclude(Err(InitError::Registry(e)));
                return;
            }
        };

        if !world.contains_resource::<PhaseMachine>() {
            error!("No PhaseMachine resource, cannot enter the main menu!");
            self.conclude(Err(InitError::MachineMissing));
            return;
        }
        let installed = world.resource_scope(|world, mut machine: Mut<PhaseMachine>| {
            if !machine.install(handlers) {
                return false;
            }
            machine.request_transition(world, Phase::MainMenu);
            true
        });
        if !installed {
            error!("Phase handlers were already installed, not entering the main menu again");
            self.conclude(Err(InitError::AlreadyInstalled));
            return;
        }

        let ready = Ready {
            ticks: self.tick,
            degraded: self.failures.clone(),
        };
        if ready.is_degraded() {
            warn!(
                "Initialization finished with {} unavailable service(s)",
                ready.degraded.len()
            );
        } else {
            info!("All services initialized successfully");
        }
        self.conclude(Ok(ready));
    }

    fn conclude(&mut self, outcome: Result<Ready, InitError>) {
        self.step = Step::Done;
        self.outcome = Some(outcome);
    }
}
