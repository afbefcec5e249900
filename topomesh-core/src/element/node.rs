//! Graph Nodes
//!
//! A node anchors exactly one connection point in one medium and knows the
//! links incident to it. Links are referenced by id only; resolving them is
//! always a lookup through whoever owns the elements.

use indexmap::IndexSet;

use super::id::{CptId, ElementId, Medium};

/// A vertex of the topology graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Unique identifier for this node.
    id: ElementId,

    /// The connection point this node sits on.
    cpt: CptId,

    /// Medium shared by everything passing through this node.
    medium: Medium,

    /// Incident links, in the order they were attached.
    links: IndexSet<ElementId>,
}

impl Node {
    /// Create a new node without any incident links.
    pub(crate) fn new(cpt: CptId, medium: Medium) -> Self {
        Self {
            id: ElementId::new(),
            cpt,
            medium,
            links: IndexSet::new(),
        }
    }

    /// Get the node's ID.
    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Get the connection point this node owns.
    pub fn cpt(&self) -> CptId {
        self.cpt
    }

    /// The owned connection point as a one-element slice.
    pub fn connection_points(&self) -> &[CptId] {
        std::slice::from_ref(&self.cpt)
    }

    /// Get the node's medium.
    pub fn medium(&self) -> Medium {
        self.medium
    }

    /// Get all incident links.
    pub fn links(&self) -> &IndexSet<ElementId> {
        &self.links
    }

    /// Number of incident links.
    pub fn degree(&self) -> usize {
        self.links.len()
    }

    pub(crate) fn add_link_raw(&mut self, link: ElementId) -> bool {
        self.links.insert(link)
    }

    pub(crate) fn remove_link_raw(&mut self, link: ElementId) -> bool {
        self.links.shift_remove(&link)
    }
}

/// Domain hook deciding whether a degree-2 node may be collapsed.
///
/// The degree, distinct far ends and shared medium are checked by the change
/// set itself; a policy only adds domain-specific refusals.
pub trait SimplifyPolicy {
    fn is_collapsible(&self, node: &Node) -> bool;
}

/// Collapses every node that is structurally collapsible.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysCollapse;

impl SimplifyPolicy for AlwaysCollapse {
    fn is_collapsible(&self, _node: &Node) -> bool {
        true
    }
}

impl<F> SimplifyPolicy for F
where
    F: Fn(&Node) -> bool,
{
    fn is_collapsible(&self, node: &Node) -> bool {
        self(node)
    }
}
