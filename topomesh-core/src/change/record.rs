//! Change Records
//!
//! Every primitive operation appends one record per element it touches. A
//! record states whether the element existed before and after the operation
//! and, for nodes, which incident links were attached or detached.
//!
//! Records of the same element are folded with [`ElementChange::then`]. The
//! fold only accepts consecutive records; anything else means the caller
//! broke the change-set contract, and it aborts.

use indexmap::map::Entry;
use indexmap::IndexMap;

use crate::element::ElementId;
use crate::error::{contract_violation, MeshError};

/// Before/after state of one boolean fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toggle {
    pub prev: bool,
    pub new: bool,
}

impl Toggle {
    pub fn changed(&self) -> bool {
        self.prev != self.new
    }
}

/// A (possibly folded) change of one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementChange {
    element: ElementId,
    prev: bool,
    new: bool,
    /// Incident-link attachments of a node.
    links: IndexMap<ElementId, Toggle>,
}

impl ElementChange {
    pub(crate) fn created(element: ElementId) -> Self {
        Self::existence(element, false, true)
    }

    pub(crate) fn destroyed(element: ElementId) -> Self {
        Self::existence(element, true, false)
    }

    fn existence(element: ElementId, prev: bool, new: bool) -> Self {
        Self {
            element,
            prev,
            new,
            links: IndexMap::new(),
        }
    }

    /// A link attached to (`attached == true`) or detached from an existing node.
    pub(crate) fn relinked(node: ElementId, link: ElementId, attached: bool) -> Self {
        let mut links = IndexMap::new();
        links.insert(
            link,
            Toggle {
                prev: !attached,
                new: attached,
            },
        );
        Self {
            element: node,
            prev: true,
            new: true,
            links,
        }
    }

    pub fn element(&self) -> ElementId {
        self.element
    }

    /// Whether the element existed before.
    pub fn prev_state(&self) -> bool {
        self.prev
    }

    /// Whether the element exists afterwards.
    pub fn new_state(&self) -> bool {
        self.new
    }

    /// Incident-link toggles recorded for a node.
    pub fn link_changes(&self) -> &IndexMap<ElementId, Toggle> {
        &self.links
    }

    /// Chain `next` after this change.
    ///
    /// # Panics
    ///
    /// If `next` concerns another element or does not start where this
    /// change ends.
    pub fn then(mut self, next: &ElementChange) -> Self {
        if next.element != self.element {
            contract_violation(MeshError::MismatchedSubject {
                expected: self.element.to_string(),
                found: next.element.to_string(),
            });
        }
        if next.prev != self.new {
            contract_violation(MeshError::NonConsecutiveChange(self.element.to_string()));
        }

        for (link, toggle) in &next.links {
            match self.links.get_mut(link) {
                Some(existing) if existing.new != toggle.prev => {
                    contract_violation(MeshError::NonConsecutiveChange(format!(
                        "{} link {}",
                        self.element, link
                    )));
                }
                Some(existing) => existing.new = toggle.new,
                None => {
                    self.links.insert(*link, *toggle);
                }
            }
        }

        self.new = next.new;
        self
    }

    /// Whether anything observable changed.
    ///
    /// An element that ends where it started, including its incident links,
    /// is a no-op.
    pub fn changed(&self) -> bool {
        self.prev != self.new || self.links.values().any(Toggle::changed)
    }

    pub fn is_creation(&self) -> bool {
        !self.prev && self.new
    }

    pub fn is_destruction(&self) -> bool {
        self.prev && !self.new
    }
}

/// Fold raw records into one net change per element.
///
/// Elements keep the order of their first record; no-ops are dropped.
pub fn fold<'a, I>(records: I) -> Vec<ElementChange>
where
    I: IntoIterator<Item = &'a ElementChange>,
{
    let mut acc: IndexMap<ElementId, ElementChange> = IndexMap::new();
    for record in records {
        match acc.entry(record.element) {
            Entry::Occupied(mut slot) => {
                let folded = slot.get().clone().then(record);
                slot.insert(folded);
            }
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
            }
        }
    }
    acc.into_values().filter(ElementChange::changed).collect()
}
