//! Physical Change Hooks
//!
//! The embedding application reports physical changes to connection point
//! hubs through [`PhysicalListener`]. Hubs do not join the graph on their
//! own: creating or destroying one is acknowledged, and the application then
//! edits the graph through a change set. Load state is not handled yet.

use crate::element::{CptId, Medium};
use crate::error::MeshError;

/// A physical location grouping connection points of several media.
pub trait ConnectionHub {
    /// The hub's connection point in `medium`, if it has one.
    fn connection_point(&self, medium: Medium) -> Option<CptId>;
}

/// A physical change reported by the embedding application.
#[derive(Debug)]
pub enum PhysicalEvent<'a, H: ?Sized> {
    Created(&'a H),
    Destroyed(&'a H),
    Loaded(&'a H),
    Unloaded(&'a H),
}

impl<H: ?Sized> PhysicalEvent<'_, H> {
    pub fn name(&self) -> &'static str {
        match self {
            PhysicalEvent::Created(_) => "created",
            PhysicalEvent::Destroyed(_) => "destroyed",
            PhysicalEvent::Loaded(_) => "loaded",
            PhysicalEvent::Unloaded(_) => "unloaded",
        }
    }
}

/// Receives physical change notifications.
pub trait PhysicalListener<H: ?Sized> {
    fn on_physical_event(&mut self, event: PhysicalEvent<'_, H>) -> Result<(), MeshError>;
}
