//! Topology Elements
//!
//! The topology graph has exactly two kinds of elements:
//!
//! - Nodes sit on a single connection point and join any number of links
//! - Links run between two nodes through an ordered run of waypoints
//!
//! Elements never hold references to each other. A node stores the ids of
//! its incident links and a link stores the ids of its endpoints; adjacency
//! is always resolved by looking ids up in the owning container.

mod id;
mod link;
mod node;

pub use id::{CptId, ElementId, MeshId, Medium};
pub use link::Link;
pub use node::{AlwaysCollapse, Node, SimplifyPolicy};

use smallvec::SmallVec;

/// A graph element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Node(Node),
    Link(Link),
}

impl Element {
    /// Get the element's ID.
    pub fn id(&self) -> ElementId {
        match self {
            Element::Node(node) => node.id(),
            Element::Link(link) => link.id(),
        }
    }

    /// Connection points logically attached to this element.
    pub fn connection_points(&self) -> &[CptId] {
        match self {
            Element::Node(node) => node.connection_points(),
            Element::Link(link) => link.cpts(),
        }
    }

    /// Ids of the elements directly linked to this one.
    pub fn adjacent(&self) -> SmallVec<[ElementId; 4]> {
        match self {
            Element::Node(node) => node.links().iter().copied().collect(),
            Element::Link(link) => SmallVec::from_slice(&[link.from(), link.to()]),
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Element::Node(node) => Some(node),
            Element::Link(_) => None,
        }
    }

    pub fn as_link(&self) -> Option<&Link> {
        match self {
            Element::Link(link) => Some(link),
            Element::Node(_) => None,
        }
    }

    pub(crate) fn as_node_mut(&mut self) -> Option<&mut Node> {
        match self {
            Element::Node(node) => Some(node),
            Element::Link(_) => None,
        }
    }
}

impl From<Node> for Element {
    fn from(node: Node) -> Self {
        Element::Node(node)
    }
}

impl From<Link> for Element {
    fn from(link: Link) -> Self {
        Element::Link(link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn adjacency_and_connection_points() {
        let medium = Medium::new();
        let (c1, c2) = (CptId::new(), CptId::new());
        let mut n1 = Node::new(c1, medium);
        let mut n2 = Node::new(c2, medium);
        let waypoints: Vec<_> = (0..5).map(|_| CptId::new()).collect();
        let l1 = Link::new(n1.id(), n2.id(), waypoints.clone());
        let l2 = Link::new(n2.id(), n1.id(), vec![CptId::new()]);
        for node in [&mut n1, &mut n2] {
            node.add_link_raw(l1.id());
            node.add_link_raw(l2.id());
        }

        let both_links: HashSet<_> = [l1.id(), l2.id()].into_iter().collect();
        let both_nodes: HashSet<_> = [n1.id(), n2.id()].into_iter().collect();
        let (n1, n2, l1, l2) = (
            Element::from(n1),
            Element::from(n2),
            Element::from(l1),
            Element::from(l2),
        );
        assert_eq!(n1.adjacent().into_iter().collect::<HashSet<_>>(), both_links);
        assert_eq!(n2.adjacent().into_iter().collect::<HashSet<_>>(), both_links);
        assert_eq!(l1.adjacent().into_iter().collect::<HashSet<_>>(), both_nodes);
        assert_eq!(l2.adjacent().into_iter().collect::<HashSet<_>>(), both_nodes);

        assert_eq!(n1.connection_points(), &[c1]);
        assert_eq!(n2.connection_points(), &[c2]);
        assert_eq!(l1.connection_points(), waypoints.as_slice());
    }

    #[test]
    fn variant_accessors() {
        let node = Element::from(Node::new(CptId::new(), Medium::new()));
        assert!(node.as_node().is_some());
        assert!(node.as_link().is_none());
    }
}
