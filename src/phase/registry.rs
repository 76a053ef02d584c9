//! Phase handler table.
//!
//! One slot per [`Phase`]: a table with an empty slot cannot be built, so
//! dispatching to a phase can never find nothing there.

use super::error::RegistryError;
use super::handler::PhaseHandler;
use crate::core::Phase;

/// Handlers for every phase.
pub struct PhaseHandlers {
    main_menu: Box<dyn PhaseHandler>,
    town: Box<dyn PhaseHandler>,
    stage: Box<dyn PhaseHandler>,
    paused: Box<dyn PhaseHandler>,
    game_over: Box<dyn PhaseHandler>,
}

impl PhaseHandlers {
    pub fn builder() -> PhaseHandlersBuilder {
        PhaseHandlersBuilder::default()
    }

    pub fn get(&self, phase: Phase) -> &dyn PhaseHandler {
        match phase {
            Phase::MainMenu => &*self.main_menu,
            Phase::Town => &*self.town,
            Phase::Stage => &*self.stage,
            Phase::Paused => &*self.paused,
            Phase::GameOver => &*self.game_over,
        }
    }

    pub fn get_mut(&mut self, phase: Phase) -> &mut dyn PhaseHandler {
        match phase {
            Phase::MainMenu => &mut *self.main_menu,
            Phase::Town => &mut *self.town,
            Phase::Stage => &mut *self.stage,
            Phase::Paused => &mut *self.paused,
            Phase::GameOver => &mut *self.game_over,
        }
    }
}

/// Collects handlers before the table is sealed.
#[derive(Default)]
pub struct PhaseHandlersBuilder {
    slots: [Option<Box<dyn PhaseHandler>>; 5],
}

impl PhaseHandlersBuilder {
    /// Bind `handler` to `phase`, replacing any earlier one.
    pub fn with(mut self, phase: Phase, handler: impl PhaseHandler) -> Self {
        self.slots[phase.index()] = Some(Box::new(handler));
        self
    }

    /// Seal the table. Fails on the first phase without a handler.
    pub fn build(self) -> Result<PhaseHandlers, RegistryError> {
        let [main_menu, town, stage, paused, game_over] = self.slots;
        let require = |slot: Option<Box<dyn PhaseHandler>>, phase: Phase| {
            slot.ok_or(RegistryError::MissingHandler(phase))
        };

        Ok(PhaseHandlers {
            main_menu: require(main_menu, Phase::MainMenu)?,
            town: require(town, Phase::Town)?,
            stage: require(stage, Phase::Stage)?,
            paused: require(paused, Phase::Paused)?,
            game_over: require(game_over, Phase::GameOver)?,
        })
    }
}
