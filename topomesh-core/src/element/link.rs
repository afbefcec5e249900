//! Graph Links
//!
//! Links are immutable once created. Rewiring a link means destroying it and
//! creating a new one, which keeps every change visible to the change sets.

use super::id::{CptId, ElementId};

/// An edge of the topology graph carrying an ordered run of waypoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    id: ElementId,
    from: ElementId,
    to: ElementId,
    /// Waypoints, ordered from `from` towards `to`.
    cpts: Vec<CptId>,
}

impl Link {
    pub(crate) fn new(from: ElementId, to: ElementId, cpts: Vec<CptId>) -> Self {
        Self {
            id: ElementId::new(),
            from,
            to,
            cpts,
        }
    }

    /// Get the link's ID.
    pub fn id(&self) -> ElementId {
        self.id
    }

    /// The node this link starts at.
    pub fn from(&self) -> ElementId {
        self.from
    }

    /// The node this link ends at.
    pub fn to(&self) -> ElementId {
        self.to
    }

    /// Waypoints from `from` to `to`.
    pub fn cpts(&self) -> &[CptId] {
        &self.cpts
    }

    /// The endpoint opposite to `end`.
    ///
    /// Any id other than `from` is treated as the `from` side's opposite,
    /// so callers must pass an actual endpoint.
    pub fn other_end(&self, end: ElementId) -> ElementId {
        if end == self.from {
            self.to
        } else {
            self.from
        }
    }

    /// Index of a waypoint, if this link carries it.
    pub fn position(&self, cpt: CptId) -> Option<usize> {
        self.cpts.iter().position(|c| *c == cpt)
    }
}
