//! Meshes
//!
//! The topology graph is partitioned, at every committed instant, into
//! maximal connected components called meshes. This module holds the mesh
//! container and the store that owns all of them.

mod component;
mod store;

pub use component::Mesh;
pub use store::{MeshStore, StoreStamp};
