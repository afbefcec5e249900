//! Connection Points
//!
//! Connection points are owned by the embedding application. The engine only
//! tells them where they now live, during commit, through a lookup the
//! caller provides.

use std::collections::HashMap;

use crate::element::{CptId, ElementId, MeshId, Medium};

/// Where a connection point lives in the partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshLocation {
    pub mesh: MeshId,
    pub element: ElementId,
}

impl MeshLocation {
    pub fn new(mesh: MeshId, element: ElementId) -> Self {
        Self { mesh, element }
    }
}

/// A live connection point whose location the engine maintains.
pub trait ConnectionPoint {
    fn set_location(&mut self, location: MeshLocation);

    fn location(&self) -> Option<MeshLocation>;
}

/// Resolves connection point ids to live objects during commit.
pub trait ConnectionPointLookup {
    fn lookup(&mut self, cpt: CptId) -> Option<&mut dyn ConnectionPoint>;
}

impl<P> ConnectionPointLookup for HashMap<CptId, P>
where
    P: ConnectionPoint,
{
    fn lookup(&mut self, cpt: CptId) -> Option<&mut dyn ConnectionPoint> {
        self.get_mut(&cpt).map(|point| point as &mut dyn ConnectionPoint)
    }
}

/// A plain pass-through point in one medium.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Passthrough {
    id: CptId,
    medium: Medium,
    location: Option<MeshLocation>,
}

impl Passthrough {
    pub fn new(id: CptId, medium: Medium) -> Self {
        Self {
            id,
            medium,
            location: None,
        }
    }

    pub fn id(&self) -> CptId {
        self.id
    }

    pub fn medium(&self) -> Medium {
        self.medium
    }
}

impl ConnectionPoint for Passthrough {
    fn set_location(&mut self, location: MeshLocation) {
        self.location = Some(location);
    }

    fn location(&self) -> Option<MeshLocation> {
        self.location
    }
}
