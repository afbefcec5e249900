//! Mesh
//!
//! A mesh is one maximal connected component of the topology graph. It owns
//! its member elements; outside an in-flight batch every element lives in
//! exactly one mesh.

use std::collections::{HashSet, VecDeque};

use indexmap::IndexMap;

use crate::element::{Element, ElementId, MeshId};
use crate::error::MeshError;

/// A connected component and the elements it owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mesh {
    id: MeshId,
    elements: IndexMap<ElementId, Element>,
}

impl Mesh {
    /// Create an empty mesh with a fresh id.
    #[cfg(test)]
    pub(crate) fn new() -> Self {
        Self::with_id(MeshId::new())
    }

    pub(crate) fn with_id(id: MeshId) -> Self {
        Self {
            id,
            elements: IndexMap::new(),
        }
    }

    /// Get the mesh's ID.
    pub fn id(&self) -> MeshId {
        self.id
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    /// Member elements in insertion order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> + '_ {
        self.elements.values()
    }

    pub fn element_ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.elements.keys().copied()
    }

    /// Add an element without any change accounting.
    pub(crate) fn add_element_raw(&mut self, element: Element) {
        self.elements.insert(element.id(), element);
    }

    /// Remove an element without any change accounting.
    #[cfg(test)]
    pub(crate) fn remove_element_raw(&mut self, id: ElementId) -> Option<Element> {
        self.elements.shift_remove(&id)
    }

    /// Check whether every member is reachable from the first one.
    pub fn is_connected(&self) -> bool {
        let Some(seed) = self.elements.keys().next().copied() else {
            return true;
        };

        let mut visited = HashSet::from([seed]);
        let mut queue = VecDeque::from([seed]);

        while let Some(id) = queue.pop_front() {
            let Some(element) = self.elements.get(&id) else {
                continue;
            };
            for next in element.adjacent() {
                if self.elements.contains_key(&next) && visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        visited.len() == self.elements.len()
    }

    /// Check the structural invariants of this mesh.
    ///
    /// Expensive; meant for tests and debug validation.
    pub fn validate(&self) -> Result<(), MeshError> {
        let invalid = |reason: String| MeshError::InvalidMesh {
            mesh: self.id,
            reason,
        };

        if self.elements.is_empty() {
            return Err(invalid("mesh has no elements".to_string()));
        }

        for element in self.elements.values() {
            for adjacent in element.adjacent() {
                if !self.elements.contains_key(&adjacent) {
                    return Err(invalid(format!(
                        "{} references {} outside the mesh",
                        element.id(),
                        adjacent
                    )));
                }
            }

            match element {
                Element::Node(node) => {
                    for link in node.links() {
                        let attached = self
                            .elements
                            .get(link)
                            .and_then(Element::as_link)
                            .is_some_and(|l| l.from() == node.id() || l.to() == node.id());
                        if !attached {
                            return Err(invalid(format!(
                                "{} lists {} which does not end at it",
                                node.id(),
                                link
                            )));
                        }
                    }
                }
                Element::Link(link) => {
                    for end in [link.from(), link.to()] {
                        let attached = self
                            .elements
                            .get(&end)
                            .and_then(Element::as_node)
                            .is_some_and(|n| n.links().contains(&link.id()));
                        if !attached {
                            return Err(invalid(format!(
                                "endpoint {} does not list {}",
                                end,
                                link.id()
                            )));
                        }
                    }
                }
            }
        }

        if !self.is_connected() {
            return Err(invalid("elements are not connected".to_string()));
        }

        Ok(())
    }
}
