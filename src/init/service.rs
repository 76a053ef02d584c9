//! The contract every subsystem taking part in startup implements.
//!
//! Services are ordinary Bevy resources. The orchestrator never owns them; it
//! holds a [`ServiceHandle`] per service and looks the resource up in the
//! `World` whenever it needs it. A resource that is not there when looked up
//! counts as a hard failure.

use std::any::type_name;

use bevy::prelude::*;

/// A subsystem with an asynchronous, idempotent initialization and a
/// monotonic readiness flag.
pub trait Initializable: Send + Sync + 'static {
    /// Begin initialization work.
    ///
    /// Must be a no-op when the service is already initializing or ready.
    fn initialize(&mut self);

    /// Whether initialization has completed. Once true, stays true.
    fn is_initialized(&self) -> bool;

    /// Whether the service gave up on its own initialization.
    fn has_failed(&self) -> bool {
        false
    }
}

type ResolveMut = fn(&mut World) -> Option<&mut dyn Initializable>;
type Resolve = fn(&World) -> Option<&dyn Initializable>;

fn resolve_mut<T: Resource + Initializable>(world: &mut World) -> Option<&mut dyn Initializable> {
    world
        .get_resource_mut::<T>()
        .map(|service| service.into_inner() as &mut dyn Initializable)
}

fn resolve<T: Resource + Initializable>(world: &World) -> Option<&dyn Initializable> {
    world
        .get_resource::<T>()
        .map(|service| service as &dyn Initializable)
}

/// Typed reference to a service resource.
#[derive(Clone, Copy)]
pub struct ServiceHandle {
    name: &'static str,
    resolve_mut: ResolveMut,
    resolve: Resolve,
}

impl ServiceHandle {
    /// Handle to the resource `T`, named after its type.
    pub fn of<T: Resource + Initializable>() -> Self {
        Self::named::<T>(type_name::<T>())
    }

    /// Handle to the resource `T` with a display name for logs and failures.
    pub fn named<T: Resource + Initializable>(name: &'static str) -> Self {
        Self {
            name,
            resolve_mut: resolve_mut::<T>,
            resolve: resolve::<T>,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn get<'w>(&self, world: &'w World) -> Option<&'w dyn Initializable> {
        (self.resolve)(world)
    }

    pub fn get_mut<'w>(&self, world: &'w mut World) -> Option<&'w mut dyn Initializable> {
        (self.resolve_mut)(world)
    }

    /// Snapshot of the service's readiness, if it exists.
    pub fn status(&self, world: &World) -> Option<ServiceStatus> {
        self.get(world).map(|service| ServiceStatus {
            name: self.name,
            ready: service.is_initialized(),
        })
    }
}

impl std::fmt::Debug for ServiceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ServiceHandle").field(&self.name).finish()
    }
}

/// Readiness of a single service as seen by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceStatus {
    pub name: &'static str,
    pub ready: bool,
}
