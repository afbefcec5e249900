//! Basic Change Sets
//!
//! A basic change set is what applying a primitive change set produces. The
//! element changes have already been resolved into new mesh memberships and
//! per-connection-point transitions, but nothing has touched the store yet.
//!
//! Committing one:
//!
//! 1. Removes destroyed meshes from the store
//! 2. Replaces changed meshes with their new membership
//! 3. Registers created meshes
//! 4. Tells every surviving connection point its new location
//!
//! There is no rollback. Once a primitive change set has been applied, its
//! basic change set must be committed before any other batch is applied.

use tracing::debug;

use crate::connection::{ConnectionPointLookup, MeshLocation};
use crate::element::{CptId, ElementId, MeshId};
use crate::error::{contract_violation, MeshError};
use crate::mesh::{Mesh, MeshStore, StoreStamp};

/// Net transition of one connection point across a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CptChange {
    pub cpt: CptId,
    pub prev_element: Option<ElementId>,
    pub new_element: Option<ElementId>,
    pub prev_mesh: Option<MeshId>,
    pub new_mesh: Option<MeshId>,
}

impl CptChange {
    /// Chain `next` after this change.
    ///
    /// # Panics
    ///
    /// If `next` concerns another connection point or does not start where
    /// this change ends.
    pub fn then(self, next: &CptChange) -> Self {
        if next.cpt != self.cpt {
            contract_violation(MeshError::MismatchedSubject {
                expected: self.cpt.to_string(),
                found: next.cpt.to_string(),
            });
        }
        if next.prev_element != self.new_element || next.prev_mesh != self.new_mesh {
            contract_violation(MeshError::NonConsecutiveChange(self.cpt.to_string()));
        }
        Self {
            new_element: next.new_element,
            new_mesh: next.new_mesh,
            ..self
        }
    }

    /// The connection point did not exist in the graph before.
    pub fn created(&self) -> bool {
        self.prev_element.is_none() && self.prev_mesh.is_none()
    }

    /// The connection point is no longer part of the graph.
    pub fn destroyed(&self) -> bool {
        self.new_element.is_none() && self.new_mesh.is_none()
    }

    pub fn exists(&self) -> bool {
        !self.destroyed()
    }

    pub fn changed(&self) -> bool {
        self.element_changed() || self.mesh_changed()
    }

    pub fn element_changed(&self) -> bool {
        self.prev_element != self.new_element
    }

    pub fn mesh_changed(&self) -> bool {
        self.prev_mesh != self.new_mesh
    }

    /// Location after the batch, if the point still exists.
    pub fn new_location(&self) -> Option<MeshLocation> {
        Some(MeshLocation::new(self.new_mesh?, self.new_element?))
    }
}

/// One mesh whose elements ended up in several meshes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshSplit {
    pub from: MeshId,
    pub into: Vec<MeshId>,
}

/// Several meshes whose elements ended up in one mesh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshMerge {
    pub from: Vec<MeshId>,
    pub into: MeshId,
}

/// Summary of a committed batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeshDelta {
    pub changed: Vec<MeshId>,
    pub created: Vec<MeshId>,
    pub destroyed: Vec<MeshId>,
    pub splits: Vec<MeshSplit>,
    pub merges: Vec<MeshMerge>,
    pub cpt_changes: Vec<CptChange>,
    /// Connection points whose location was written.
    pub relocated: usize,
}

impl MeshDelta {
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
            && self.created.is_empty()
            && self.destroyed.is_empty()
            && self.cpt_changes.is_empty()
    }
}

/// Mesh-level changes computed from element changes, not yet committed.
#[derive(Debug)]
#[must_use = "an applied primitive change set must be committed"]
pub struct BasicChangeSet {
    pub(crate) stamp: StoreStamp,
    pub(crate) cpt_changes: Vec<CptChange>,
    pub(crate) changed: Vec<Mesh>,
    pub(crate) created: Vec<Mesh>,
    pub(crate) destroyed: Vec<MeshId>,
    pub(crate) splits: Vec<MeshSplit>,
    pub(crate) merges: Vec<MeshMerge>,
}

impl BasicChangeSet {
    /// Per-connection-point transitions.
    pub fn cpt_changes(&self) -> &[CptChange] {
        &self.cpt_changes
    }

    /// Meshes that keep their identity but not their membership.
    ///
    /// Each of them keeps at least one element it had before.
    pub fn changed(&self) -> &[Mesh] {
        &self.changed
    }

    pub fn created(&self) -> &[Mesh] {
        &self.created
    }

    pub fn destroyed(&self) -> &[MeshId] {
        &self.destroyed
    }

    pub fn splits(&self) -> &[MeshSplit] {
        &self.splits
    }

    pub fn merges(&self) -> &[MeshMerge] {
        &self.merges
    }

    /// Commit to `store` and relocate every surviving connection point.
    ///
    /// # Panics
    ///
    /// If `store` is not the store this set was computed against, if the
    /// store committed another batch in between, or if `lookup` cannot
    /// resolve a surviving connection point.
    pub fn apply<L>(self, store: &mut MeshStore, lookup: &mut L) -> MeshDelta
    where
        L: ConnectionPointLookup + ?Sized,
    {
        let found = store.stamp();
        if found != self.stamp {
            contract_violation(MeshError::StaleChangeSet {
                expected_store: self.stamp.store,
                expected_generation: self.stamp.generation,
                found_store: found.store,
                found_generation: found.generation,
            });
        }

        let mut delta = MeshDelta {
            changed: self.changed.iter().map(Mesh::id).collect(),
            created: self.created.iter().map(Mesh::id).collect(),
            destroyed: self.destroyed,
            splits: self.splits,
            merges: self.merges,
            cpt_changes: self.cpt_changes,
            relocated: 0,
        };

        for mesh in &delta.destroyed {
            store.remove_mesh_raw(*mesh);
        }
        for mesh in self.changed.into_iter().chain(self.created) {
            store.insert_mesh_raw(mesh);
        }
        store.bump_generation();

        for change in &delta.cpt_changes {
            let Some(location) = change.new_location() else {
                continue;
            };
            match lookup.lookup(change.cpt) {
                Some(point) => point.set_location(location),
                None => contract_violation(MeshError::ConnectionPointNotFound(change.cpt)),
            }
            delta.relocated += 1;
        }

        debug!(
            changed = delta.changed.len(),
            created = delta.created.len(),
            destroyed = delta.destroyed.len(),
            relocated = delta.relocated,
            "committed basic change set"
        );

        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(
        cpt: CptId,
        prev: Option<(ElementId, MeshId)>,
        new: Option<(ElementId, MeshId)>,
    ) -> CptChange {
        CptChange {
            cpt,
            prev_element: prev.map(|(e, _)| e),
            new_element: new.map(|(e, _)| e),
            prev_mesh: prev.map(|(_, m)| m),
            new_mesh: new.map(|(_, m)| m),
        }
    }

    #[test]
    fn derived_flags() {
        let cpt = CptId::new();
        let at = (ElementId::new(), MeshId::new());

        let created = change(cpt, None, Some(at));
        assert!(created.created() && created.exists() && created.changed());

        let destroyed = change(cpt, Some(at), None);
        assert!(destroyed.destroyed() && !destroyed.exists());
        assert_eq!(destroyed.new_location(), None);

        let moved = change(cpt, Some(at), Some((at.0, MeshId::new())));
        assert!(moved.mesh_changed() && !moved.element_changed());

        let still = change(cpt, Some(at), Some(at));
        assert!(!still.changed());
        assert_eq!(still.new_location(), Some(MeshLocation::new(at.1, at.0)));
    }

    #[test]
    fn release_then_acquire_folds_into_a_move() {
        let cpt = CptId::new();
        let mesh = MeshId::new();
        let (node, link) = (ElementId::new(), ElementId::new());

        let folded = change(cpt, Some((node, mesh)), None).then(&change(cpt, None, Some((link, mesh))));
        assert_eq!(folded.prev_element, Some(node));
        assert_eq!(folded.new_element, Some(link));
        assert!(folded.element_changed());
        assert!(!folded.mesh_changed());
    }

    #[test]
    #[should_panic(expected = "non-consecutive")]
    fn two_holders_fail_loudly() {
        let cpt = CptId::new();
        let mesh = MeshId::new();
        change(cpt, Some((ElementId::new(), mesh)), Some((ElementId::new(), mesh)))
            .then(&change(cpt, None, Some((ElementId::new(), mesh))));
    }
}
