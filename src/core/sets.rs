//! Frame ordering shared by the runtime plugins.

use bevy::prelude::*;

/// Ordering of the runtime's work inside `Update`.
///
/// Services that report readiness to the orchestrator advance their work in
/// [`RuntimeSet::Services`]. That way a stage started this frame can already
/// be seen as ready at the end of the same frame.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuntimeSet {
    /// Orchestrator calls `initialize()` on the stage that is due
    InitBegin,
    /// Services do their initialization work
    Services,
    /// Orchestrator polls readiness
    InitCheck,
    /// Phase requests are processed and the current handler updates
    Phases,
}
