//! Change Sets
//!
//! Edits reach the partition in two staged phases:
//!
//! - A [`PrimitiveChangeSet`] records element-level creations and
//!   destructions (plus `simplify`/`desimplify`, which are expressed in terms
//!   of them) and folds them into net changes
//! - Applying it against the affected meshes yields a [`BasicChangeSet`]
//!   holding the new mesh memberships and connection point transitions
//! - Committing the basic change set writes it into the store
//!
//! Exactly one such lifecycle may run at a time, even for disjoint regions of
//! the graph.

mod basic;
mod primitive;
mod record;

pub use basic::{BasicChangeSet, CptChange, MeshDelta, MeshMerge, MeshSplit};
pub use primitive::{Desimplified, PrimitiveChangeSet};
pub use record::{fold, ElementChange, Toggle};
