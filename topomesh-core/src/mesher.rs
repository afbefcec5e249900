//! Mesher
//!
//! The mesher owns the [`MeshStore`] and drives the change set lifecycle
//! against it:
//!
//! 1. [`Mesher::change_set`] opens a [`PrimitiveChangeSet`] borrowing the
//!    store, so no commit can happen while it is alive.
//!
//! 2. The caller stages edits and applies the primitive change set with a
//!    mesh hint, producing a [`BasicChangeSet`].
//!
//! 3. [`Mesher::commit`] writes the basic change set into the store and
//!    relocates connection points.
//!
//! [`Mesher::edit`] runs all three steps with the exact hint.
//!
//! # Thread Safety
//!
//! A `Mesher` is a plain single-writer value. [`SharedMesher`] wraps one in a
//! mutex so that several threads can submit batches; each batch holds the
//! lock for its whole lifecycle.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::change::{BasicChangeSet, MeshDelta, PrimitiveChangeSet};
use crate::config::MesherConfig;
use crate::connection::ConnectionPointLookup;
use crate::element::{AlwaysCollapse, SimplifyPolicy};
use crate::error::{contract_violation, MeshError};
use crate::listener::{PhysicalEvent, PhysicalListener};
use crate::mesh::MeshStore;

/// Owner of the committed partition.
pub struct Mesher {
    store: MeshStore,
    config: MesherConfig,
    policy: Box<dyn SimplifyPolicy + Send + Sync>,
}

impl Mesher {
    pub fn new(config: MesherConfig) -> Self {
        Self::with_policy(config, AlwaysCollapse)
    }

    /// Create a mesher whose change sets consult `policy` before simplifying.
    pub fn with_policy<P>(config: MesherConfig, policy: P) -> Self
    where
        P: SimplifyPolicy + Send + Sync + 'static,
    {
        info!(
            validate_on_commit = config.validate_on_commit,
            store_capacity = config.store_capacity,
            "mesher created"
        );
        Self {
            store: MeshStore::with_capacity(config.store_capacity),
            config,
            policy: Box::new(policy),
        }
    }

    pub fn store(&self) -> &MeshStore {
        &self.store
    }

    pub fn config(&self) -> &MesherConfig {
        &self.config
    }

    /// Open a change set against the committed store.
    pub fn change_set(&self) -> PrimitiveChangeSet<'_> {
        PrimitiveChangeSet::with_policy(&self.store, &*self.policy)
    }

    /// Commit an applied change set.
    ///
    /// # Panics
    ///
    /// On a stale change set, an unresolvable connection point, or, with
    /// `validate_on_commit`, a store that fails validation afterwards.
    pub fn commit<L>(&mut self, basic: BasicChangeSet, lookup: &mut L) -> MeshDelta
    where
        L: ConnectionPointLookup + ?Sized,
    {
        let delta = basic.apply(&mut self.store, lookup);
        if self.config.validate_on_commit {
            if let Err(error) = self.store.validate() {
                contract_violation(error);
            }
        }
        delta
    }

    /// Stage edits with `f`, then apply and commit them in one go.
    pub fn edit<L, F, R>(&mut self, lookup: &mut L, f: F) -> (R, MeshDelta)
    where
        L: ConnectionPointLookup + ?Sized,
        F: FnOnce(&mut PrimitiveChangeSet<'_>) -> R,
    {
        let (result, basic) = {
            let mut cs = self.change_set();
            let result = f(&mut cs);
            let hint = cs.touched_meshes();
            (result, cs.apply(hint))
        };
        let delta = self.commit(basic, lookup);
        (result, delta)
    }
}

impl Default for Mesher {
    fn default() -> Self {
        Self::new(MesherConfig::default())
    }
}

impl<H: ?Sized> PhysicalListener<H> for Mesher {
    fn on_physical_event(&mut self, event: PhysicalEvent<'_, H>) -> Result<(), MeshError> {
        match event {
            PhysicalEvent::Created(_) | PhysicalEvent::Destroyed(_) => {
                debug!(event = event.name(), "hub change acknowledged");
                Ok(())
            }
            PhysicalEvent::Loaded(_) | PhysicalEvent::Unloaded(_) => {
                Err(MeshError::LoadStateUnsupported)
            }
        }
    }
}

/// A [`Mesher`] shared between threads.
#[derive(Clone)]
pub struct SharedMesher {
    inner: Arc<Mutex<Mesher>>,
}

impl SharedMesher {
    pub fn new(mesher: Mesher) -> Self {
        Self {
            inner: Arc::new(Mutex::new(mesher)),
        }
    }

    /// Run one batch under the lock.
    pub fn edit<L, F, R>(&self, lookup: &mut L, f: F) -> (R, MeshDelta)
    where
        L: ConnectionPointLookup + ?Sized,
        F: FnOnce(&mut PrimitiveChangeSet<'_>) -> R,
    {
        self.inner.lock().edit(lookup, f)
    }

    /// Lock the mesher for reading or a manual lifecycle.
    pub fn lock(&self) -> MutexGuard<'_, Mesher> {
        self.inner.lock()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::connection::Passthrough;
    use crate::element::{CptId, Medium};

    #[test]
    fn edit_commits_with_exact_hint() {
        let mut mesher = Mesher::default();
        let mut points: HashMap<CptId, Passthrough> = HashMap::new();
        let medium = Medium::new();
        let (a, b) = (CptId::new(), CptId::new());
        points.insert(a, Passthrough::new(a, medium));
        points.insert(b, Passthrough::new(b, medium));

        let ((na, nb), delta) = mesher.edit(&mut points, |cs| {
            (cs.create_node(a, medium), cs.create_node(b, medium))
        });
        assert_eq!(delta.created.len(), 2);
        assert_eq!(mesher.store().len(), 2);

        let (_, delta) = mesher.edit(&mut points, |cs| cs.create_link(na, nb, []));
        assert_eq!(delta.merges.len(), 1);
        assert_eq!(mesher.store().len(), 1);
        assert_eq!(mesher.store().validate(), Ok(()));
    }

    #[test]
    fn load_state_is_unsupported() {
        struct Hub;
        let mut mesher = Mesher::default();
        assert_eq!(
            mesher.on_physical_event(PhysicalEvent::Created(&Hub)),
            Ok(())
        );
        assert_eq!(
            mesher.on_physical_event(PhysicalEvent::Loaded(&Hub)),
            Err(MeshError::LoadStateUnsupported)
        );
    }

    #[test]
    #[should_panic(expected = "change set was computed against store")]
    fn stale_commit_panics() {
        let mut mesher = Mesher::default();
        let mut points: HashMap<CptId, Passthrough> = HashMap::new();
        let (cpt, medium) = (CptId::new(), Medium::new());
        points.insert(cpt, Passthrough::new(cpt, medium));
        let stale = mesher.change_set().apply([]);
        mesher.edit(&mut points, |cs| cs.create_node(cpt, medium));
        let _ = mesher.commit(stale, &mut points);
    }
}
