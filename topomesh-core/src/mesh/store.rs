//! Mesh Partition Store
//!
//! The store is the only owner of meshes. Alongside the meshes it keeps an
//! element locator so that change sets can fetch the committed version of
//! any element by id, and a connection point index naming the element that
//! holds each connection point.
//!
//! # Mutation
//!
//! Nothing outside the crate can mutate a store directly. Meshes are only
//! created, replaced and destroyed by committing a
//! [`BasicChangeSet`](crate::change::BasicChangeSet), which also bumps the
//! store generation. Change sets remember the [`StoreStamp`] they were
//! computed against, so committing a stale one is caught.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::element::{CptId, Element, ElementId, MeshId};
use crate::error::MeshError;

use super::component::Mesh;

/// Identity and commit generation of a store at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStamp {
    pub store: u64,
    pub generation: u64,
}

/// All meshes of the topology graph, indexed by ID.
#[derive(Debug)]
pub struct MeshStore {
    id: u64,
    generation: u64,
    meshes: HashMap<MeshId, Mesh>,
    locator: HashMap<ElementId, MeshId>,
    holders: HashMap<CptId, ElementId>,
}

impl MeshStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a store with room for `meshes` meshes.
    pub fn with_capacity(meshes: usize) -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self {
            id: COUNTER.fetch_add(1, Ordering::Relaxed),
            generation: 0,
            meshes: HashMap::with_capacity(meshes),
            locator: HashMap::new(),
            holders: HashMap::new(),
        }
    }

    pub fn stamp(&self) -> StoreStamp {
        StoreStamp {
            store: self.id,
            generation: self.generation,
        }
    }

    /// Get a reference to a mesh.
    pub fn mesh(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(&id)
    }

    pub fn contains_mesh(&self, id: MeshId) -> bool {
        self.meshes.contains_key(&id)
    }

    pub fn meshes(&self) -> impl Iterator<Item = &Mesh> + '_ {
        self.meshes.values()
    }

    pub fn mesh_ids(&self) -> impl Iterator<Item = MeshId> + '_ {
        self.meshes.keys().copied()
    }

    /// Get the total number of meshes.
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Get the total number of committed elements.
    pub fn element_count(&self) -> usize {
        self.locator.len()
    }

    /// The mesh owning a committed element.
    pub fn locate(&self, element: ElementId) -> Option<MeshId> {
        self.locator.get(&element).copied()
    }

    /// The committed version of an element.
    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.locate(id)
            .and_then(|mesh| self.meshes.get(&mesh))
            .and_then(|mesh| mesh.element(id))
    }

    /// The committed element holding a connection point.
    pub fn holder(&self, cpt: CptId) -> Option<ElementId> {
        self.holders.get(&cpt).copied()
    }

    /// Insert or replace a mesh without change accounting.
    ///
    /// A replaced mesh's stale locator entries are dropped first.
    pub(crate) fn insert_mesh_raw(&mut self, mesh: Mesh) {
        self.remove_mesh_raw(mesh.id());
        for element in mesh.elements() {
            self.locator.insert(element.id(), mesh.id());
            for cpt in element.connection_points() {
                self.holders.insert(*cpt, element.id());
            }
        }
        self.meshes.insert(mesh.id(), mesh);
    }

    /// Remove a mesh without change accounting.
    ///
    /// Only entries of elements still located in this mesh are dropped, so
    /// elements already registered with another mesh keep theirs.
    pub(crate) fn remove_mesh_raw(&mut self, id: MeshId) -> Option<Mesh> {
        let mesh = self.meshes.remove(&id)?;
        for element in mesh.elements() {
            if self.locator.get(&element.id()) != Some(&id) {
                continue;
            }
            self.locator.remove(&element.id());
            for cpt in element.connection_points() {
                if self.holders.get(cpt) == Some(&element.id()) {
                    self.holders.remove(cpt);
                }
            }
        }
        Some(mesh)
    }

    pub(crate) fn bump_generation(&mut self) {
        self.generation += 1;
    }

    /// Check every invariant of the committed partition.
    ///
    /// Each mesh must be valid on its own, every element must be owned by
    /// exactly one mesh with the locator agreeing, and every connection point
    /// must have one holder with the index agreeing.
    pub fn validate(&self) -> Result<(), MeshError> {
        let mut owners: HashMap<ElementId, MeshId> = HashMap::new();
        let mut held: HashMap<CptId, ElementId> = HashMap::new();

        for mesh in self.meshes.values() {
            mesh.validate()?;
            for element in mesh.elements() {
                let id = element.id();
                if let Some(other) = owners.insert(id, mesh.id()) {
                    return Err(MeshError::InvalidOwnership {
                        element: id,
                        reason: format!("owned by both {} and {}", other, mesh.id()),
                    });
                }
                if self.locator.get(&id) != Some(&mesh.id()) {
                    return Err(MeshError::InvalidOwnership {
                        element: id,
                        reason: format!("locator does not point at {}", mesh.id()),
                    });
                }
                for cpt in element.connection_points() {
                    if let Some(first) = held.insert(*cpt, id) {
                        return Err(MeshError::DuplicateConnectionPoint {
                            cpt: *cpt,
                            first,
                            second: id,
                        });
                    }
                }
            }
        }

        for (cpt, holder) in &held {
            if self.holders.get(cpt) != Some(holder) {
                return Err(MeshError::InvalidOwnership {
                    element: *holder,
                    reason: format!("not indexed as holder of {cpt}"),
                });
            }
        }

        if let Some((cpt, stray)) = self.holders.iter().find(|(cpt, _)| !held.contains_key(*cpt)) {
            return Err(MeshError::InvalidOwnership {
                element: *stray,
                reason: format!("indexed as holder of {cpt} but holds nothing"),
            });
        }

        if let Some(stray) = self.locator.keys().find(|id| !owners.contains_key(id)) {
            return Err(MeshError::InvalidOwnership {
                element: *stray,
                reason: "located but owned by no mesh".to_string(),
            });
        }

        Ok(())
    }
}

impl Default for MeshStore {
    fn default() -> Self {
        Self::new()
    }
}
