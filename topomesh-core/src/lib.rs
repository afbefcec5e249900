//! Topomesh Core
//!
//! This crate maintains the partition of an interconnect topology graph into
//! meshes, the connected components of nodes and links. It implements:
//!
//! - Element model (nodes holding one connection point, links carrying
//!   waypoints)
//! - Two-phase change sets that recompute only the meshes an edit touches
//! - Connection point relocation on commit
//! - Link simplification and its inverse
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `element`: Ids, nodes, links and the simplify policy
//! - `mesh`: Connected components and the store that owns them
//! - `change`: Primitive and basic change sets, change records
//! - `connection`: Connection point locations and lookup
//! - `listener`: Physical change hooks
//! - `mesher`: Store owner driving the change set lifecycle
//!
//! # Example
//!
//! ```rust,ignore
//! use std::collections::HashMap;
//! use topomesh_core::{ConnectionPoint, CptId, Medium, Mesher, MesherConfig, Passthrough};
//!
//! let mut mesher = Mesher::new(MesherConfig::default());
//! let mut points = HashMap::new();
//! let power = Medium::new();
//! let (a, b) = (CptId::new(), CptId::new());
//! points.insert(a, Passthrough::new(a, power));
//! points.insert(b, Passthrough::new(b, power));
//!
//! // Two nodes joined by a link form one mesh
//! let (_, delta) = mesher.edit(&mut points, |cs| {
//!     let na = cs.create_node(a, power);
//!     let nb = cs.create_node(b, power);
//!     cs.create_link(na, nb, [])
//! });
//! assert_eq!(delta.created.len(), 1);
//!
//! // Connection points now know where they live
//! assert!(points[&a].location().is_some());
//! ```

pub mod change;
pub mod config;
pub mod connection;
pub mod element;
pub mod error;
pub mod listener;
pub mod mesh;
pub mod mesher;

pub use change::{
    BasicChangeSet, CptChange, Desimplified, ElementChange, MeshDelta, MeshMerge, MeshSplit,
    PrimitiveChangeSet,
};
pub use config::MesherConfig;
pub use connection::{ConnectionPoint, ConnectionPointLookup, MeshLocation, Passthrough};
pub use element::{
    AlwaysCollapse, CptId, Element, ElementId, Link, Medium, MeshId, Node, SimplifyPolicy,
};
pub use error::{MeshError, Result};
pub use listener::{ConnectionHub, PhysicalEvent, PhysicalListener};
pub use mesh::{Mesh, MeshStore, StoreStamp};
pub use mesher::{Mesher, SharedMesher};
