//! Primitive Change Sets
//!
//! A primitive change set stages element-level edits against a committed
//! [`MeshStore`]. It never writes to the store: every element it touches is
//! copied into a private working set first, and every edit is recorded as a
//! list of [`ElementChange`]s.
//!
//! # Algorithm
//!
//! [`PrimitiveChangeSet::apply`] turns the staged edits into mesh changes
//! without recomputing the whole partition:
//!
//! 1. Fold the records into one net change per element
//! 2. Find the previous mesh of every pre-existing touched element among the
//!    hinted meshes; those meshes are the affected ones
//! 3. Walk every surviving element of the affected meshes, then every
//!    surviving touched element, breadth-first over `adjacent()`. Each walk
//!    claims one connected fragment. A fragment reuses the mesh its seed came
//!    from unless an earlier fragment already claimed it, otherwise it gets a
//!    fresh mesh
//! 4. Affected meshes no fragment claimed are destroyed; fresh meshes are
//!    created; claimed meshes are changed
//! 5. Derive the connection point transitions from the net changes and from
//!    untouched elements that moved to another mesh
//!
//! Untouched elements outside the affected meshes cannot be adjacent to
//! anything touched, so they are never visited.

use std::collections::{HashMap, HashSet, VecDeque};

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, trace};

use crate::element::{
    AlwaysCollapse, CptId, Element, ElementId, Link, Medium, MeshId, Node, SimplifyPolicy,
};
use crate::error::{contract_violation, MeshError};
use crate::mesh::{Mesh, MeshStore};

use super::basic::{BasicChangeSet, CptChange, MeshMerge, MeshSplit};
use super::record::{self, ElementChange};

/// Elements created by [`PrimitiveChangeSet::desimplify`].
///
/// ```text
/// [a]=cpts-c-rest=[b]  ->  [a]=first=[node]=second=[b]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Desimplified {
    /// Link from the original `from` endpoint to the new node.
    pub first: ElementId,
    /// The new node, sitting on the split connection point.
    pub node: ElementId,
    /// Link from the new node to the original `to` endpoint.
    pub second: ElementId,
}

/// Working copy of an element.
#[derive(Debug)]
struct Slot {
    element: Element,
    alive: bool,
}

/// Staged element-level edits.
pub struct PrimitiveChangeSet<'s> {
    store: &'s MeshStore,
    policy: &'s dyn SimplifyPolicy,
    slots: HashMap<ElementId, Slot>,
    records: Vec<ElementChange>,
}

impl<'s> PrimitiveChangeSet<'s> {
    /// Open a change set against `store` with the default simplify policy.
    pub fn new(store: &'s MeshStore) -> Self {
        Self::with_policy(store, &AlwaysCollapse)
    }

    pub fn with_policy(store: &'s MeshStore, policy: &'s dyn SimplifyPolicy) -> Self {
        Self {
            store,
            policy,
            slots: HashMap::new(),
            records: Vec::new(),
        }
    }

    // Working set

    fn slot(&mut self, id: ElementId) -> &mut Slot {
        let store = self.store;
        self.slots.entry(id).or_insert_with(|| match store.element(id) {
            Some(element) => Slot {
                element: element.clone(),
                alive: true,
            },
            None => contract_violation(MeshError::UnknownElement(id)),
        })
    }

    fn live(&mut self, id: ElementId) -> &mut Element {
        let slot = self.slot(id);
        if !slot.alive {
            contract_violation(MeshError::ElementDestroyed(id));
        }
        &mut slot.element
    }

    fn live_node(&mut self, id: ElementId) -> &mut Node {
        match self.live(id).as_node_mut() {
            Some(node) => node,
            None => contract_violation(MeshError::NotANode(id)),
        }
    }

    fn live_link(&mut self, id: ElementId) -> &Link {
        match self.live(id).as_link() {
            Some(link) => link,
            None => contract_violation(MeshError::NotALink(id)),
        }
    }

    /// Current working version of an element, dead or alive.
    ///
    /// Falls back to the committed version for untouched elements.
    pub fn element(&self, id: ElementId) -> Option<&Element> {
        match self.slots.get(&id) {
            Some(slot) => Some(&slot.element),
            None => self.store.element(id),
        }
    }

    /// Whether the element exists at this point of the batch.
    pub fn exists(&self, id: ElementId) -> bool {
        match self.slots.get(&id) {
            Some(slot) => slot.alive,
            None => self.store.locate(id).is_some(),
        }
    }

    /// Number of raw records so far.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Net change per element, no-ops removed.
    pub fn net_changes(&self) -> Vec<ElementChange> {
        record::fold(&self.records)
    }

    /// Committed meshes owning any element this change set touched.
    ///
    /// This is the exact hint for [`apply`](Self::apply).
    pub fn touched_meshes(&self) -> IndexSet<MeshId> {
        self.records
            .iter()
            .filter_map(|r| self.store.locate(r.element()))
            .collect()
    }

    // Primitive operations

    fn insert_created(&mut self, element: Element) -> ElementId {
        let id = element.id();
        self.records.push(ElementChange::created(id));
        self.slots.insert(id, Slot { element, alive: true });
        id
    }

    fn attach(&mut self, node: ElementId, link: ElementId) {
        self.live_node(node).add_link_raw(link);
        self.records.push(ElementChange::relinked(node, link, true));
    }

    fn detach(&mut self, node: ElementId, link: ElementId) {
        self.live_node(node).remove_link_raw(link);
        self.records.push(ElementChange::relinked(node, link, false));
    }

    fn kill(&mut self, id: ElementId) {
        self.slot(id).alive = false;
        self.records.push(ElementChange::destroyed(id));
    }

    /// Create an isolated node.
    pub fn create_node(&mut self, cpt: CptId, medium: Medium) -> ElementId {
        self.insert_created(Node::new(cpt, medium).into())
    }

    /// Create a link and attach it to both endpoints.
    ///
    /// # Panics
    ///
    /// If `from == to`, or either endpoint is not a live node.
    pub fn create_link<I>(&mut self, from: ElementId, to: ElementId, cpts: I) -> ElementId
    where
        I: IntoIterator<Item = CptId>,
    {
        if from == to {
            contract_violation(MeshError::SelfLoop(from));
        }
        self.live_node(from);
        self.live_node(to);

        let link = Link::new(from, to, cpts.into_iter().collect());
        self.attach(from, link.id());
        self.attach(to, link.id());
        self.insert_created(link.into())
    }

    /// Detach a link from both endpoints and destroy it.
    pub fn destroy_link(&mut self, link: ElementId) {
        let (from, to) = {
            let link = self.live_link(link);
            (link.from(), link.to())
        };
        self.detach(from, link);
        self.detach(to, link);
        self.kill(link);
    }

    /// Destroy a node and, first, every link still attached to it.
    pub fn destroy_node(&mut self, node: ElementId) {
        let links: Vec<ElementId> = self.live_node(node).links().iter().copied().collect();
        for link in links {
            self.destroy_link(link);
        }
        self.kill(node);
    }

    // Derived operations

    /// Collapse a degree-2 node into a single link.
    ///
    /// The new link runs from the far end of the node's first link to the
    /// far end of its second, and carries the first link's waypoints, the
    /// node's connection point and the second link's waypoints, each run
    /// oriented along the new link.
    ///
    /// Returns `None`, recording nothing, unless the node has exactly two
    /// links, their far ends differ, all three nodes share one medium and
    /// the policy agrees.
    pub fn simplify(&mut self, node: ElementId) -> Option<ElementId> {
        let center = self.live_node(node).clone();
        if center.degree() != 2 {
            trace!(%node, degree = center.degree(), "simplify: not degree 2");
            return None;
        }

        let l1 = self.live_link(center.links()[0]).clone();
        let l2 = self.live_link(center.links()[1]).clone();
        let (far1, far2) = (l1.other_end(node), l2.other_end(node));
        if far1 == far2 {
            trace!(%node, "simplify: both links reach the same node");
            return None;
        }

        let medium = center.medium();
        if self.live_node(far1).medium() != medium || self.live_node(far2).medium() != medium {
            trace!(%node, "simplify: media differ");
            return None;
        }
        if !self.policy.is_collapsible(&center) {
            trace!(%node, "simplify: refused by policy");
            return None;
        }

        let mut cpts = Vec::with_capacity(l1.cpts().len() + 1 + l2.cpts().len());
        if l1.from() == node {
            cpts.extend(l1.cpts().iter().rev());
        } else {
            cpts.extend_from_slice(l1.cpts());
        }
        cpts.push(center.cpt());
        if l2.to() == node {
            cpts.extend(l2.cpts().iter().rev());
        } else {
            cpts.extend_from_slice(l2.cpts());
        }

        self.destroy_node(node);
        let link = self.create_link(far1, far2, cpts);
        trace!(%node, %link, "simplified");
        Some(link)
    }

    /// Split a link at one of its waypoints, the inverse of [`simplify`](Self::simplify).
    ///
    /// Returns `None`, recording nothing, if the link does not carry `cpt`
    /// or its endpoints do not share a medium.
    pub fn desimplify(&mut self, link: ElementId, cpt: CptId) -> Option<Desimplified> {
        let original = self.live_link(link).clone();
        let Some(index) = original.position(cpt) else {
            trace!(%link, %cpt, "desimplify: waypoint not on link");
            return None;
        };

        let medium = self.live_node(original.from()).medium();
        if self.live_node(original.to()).medium() != medium {
            trace!(%link, "desimplify: media differ");
            return None;
        }

        self.destroy_link(link);
        let node = self.create_node(cpt, medium);
        let (before, after) = original.cpts().split_at(index);
        let first = self.create_link(original.from(), node, before.iter().copied());
        let second = self.create_link(node, original.to(), after[1..].iter().copied());
        trace!(%link, %node, "desimplified");
        Some(Desimplified { first, node, second })
    }

    // Application

    /// Resolve the staged edits into mesh changes.
    ///
    /// `hint` must name every committed mesh owning an element this change
    /// set touched; [`touched_meshes`](Self::touched_meshes) is exact. Extra
    /// meshes only cost time. Ids of meshes not in the store are ignored.
    ///
    /// # Panics
    ///
    /// If a touched element that existed before the batch is not owned by any
    /// hinted mesh.
    pub fn apply<I>(self, hint: I) -> BasicChangeSet
    where
        I: IntoIterator<Item = MeshId>,
    {
        let changes = self.net_changes();
        let hinted: IndexMap<MeshId, &Mesh> = hint
            .into_iter()
            .filter_map(|id| self.store.mesh(id).map(|mesh| (id, mesh)))
            .collect();

        let mut affected: IndexSet<MeshId> = IndexSet::new();
        for change in changes.iter().filter(|c| c.prev_state()) {
            let owner = self.store.locate(change.element());
            match owner.filter(|mesh| hinted.contains_key(mesh)) {
                Some(mesh) => {
                    affected.insert(mesh);
                }
                None => contract_violation(MeshError::UnhintedElement(change.element())),
            }
        }

        let before: HashMap<ElementId, MeshId> = affected
            .iter()
            .flat_map(|id| hinted[id].element_ids().map(move |e| (e, *id)))
            .collect();

        let walk = Walk {
            store: self.store,
            slots: &self.slots,
            hinted: &hinted,
            before: &before,
        };

        let seeds = affected
            .iter()
            .flat_map(|id| hinted[id].element_ids())
            .chain(changes.iter().filter(|c| c.new_state()).map(ElementChange::element));

        let mut visited = HashSet::new();
        let mut claimed = HashSet::new();
        let mut fragments = Vec::new();
        for seed in seeds {
            if visited.contains(&seed) || !walk.alive(seed) {
                continue;
            }
            let members = walk.fragment(seed, &mut visited);
            let reused = before.get(&seed).copied().filter(|m| claimed.insert(*m));
            let mesh = reused.unwrap_or_else(MeshId::new);
            let sources: IndexSet<MeshId> =
                members.iter().filter_map(|e| before.get(e)).copied().collect();
            trace!(%mesh, reused = reused.is_some(), members = members.len(), "fragment");
            fragments.push(Fragment {
                mesh,
                reused: reused.is_some(),
                members,
                sources,
            });
        }

        let after: HashMap<ElementId, MeshId> = fragments
            .iter()
            .flat_map(|f| f.members.iter().map(move |e| (*e, f.mesh)))
            .collect();

        let cpt_changes = walk.cpt_changes(&changes, &affected, &after);

        let splits = affected
            .iter()
            .filter_map(|from| {
                let into: Vec<MeshId> = fragments
                    .iter()
                    .filter(|f| f.sources.contains(from))
                    .map(|f| f.mesh)
                    .collect();
                (into.len() > 1).then(|| MeshSplit { from: *from, into })
            })
            .collect();
        let merges = fragments
            .iter()
            .filter(|f| f.sources.len() > 1)
            .map(|f| MeshMerge {
                from: f.sources.iter().copied().collect(),
                into: f.mesh,
            })
            .collect();
        let destroyed: Vec<MeshId> = affected
            .iter()
            .filter(|id| !claimed.contains(*id))
            .copied()
            .collect();

        let stamp = self.store.stamp();
        let mut slots = self.slots;
        let mut changed = Vec::new();
        let mut created = Vec::new();
        for fragment in fragments {
            let mut mesh = Mesh::with_id(fragment.mesh);
            for id in fragment.members {
                let element = match slots.remove(&id) {
                    Some(slot) => slot.element,
                    None => match before.get(&id).and_then(|m| hinted[m].element(id)) {
                        Some(element) => element.clone(),
                        None => contract_violation(MeshError::UnknownElement(id)),
                    },
                };
                mesh.add_element_raw(element);
            }
            if fragment.reused {
                changed.push(mesh);
            } else {
                created.push(mesh);
            }
        }

        debug!(
            net_changes = changes.len(),
            affected = affected.len(),
            changed = changed.len(),
            created = created.len(),
            destroyed = destroyed.len(),
            cpt_changes = cpt_changes.len(),
            "applied primitive change set"
        );

        BasicChangeSet {
            stamp,
            cpt_changes,
            changed,
            created,
            destroyed,
            splits,
            merges,
        }
    }
}

/// One connected group of surviving elements.
struct Fragment {
    mesh: MeshId,
    reused: bool,
    members: Vec<ElementId>,
    /// Affected meshes the members came from.
    sources: IndexSet<MeshId>,
}

/// Post-batch view of the graph used while walking.
struct Walk<'a> {
    store: &'a MeshStore,
    slots: &'a HashMap<ElementId, Slot>,
    hinted: &'a IndexMap<MeshId, &'a Mesh>,
    before: &'a HashMap<ElementId, MeshId>,
}

impl Walk<'_> {
    fn alive(&self, id: ElementId) -> bool {
        match self.slots.get(&id) {
            Some(slot) => slot.alive,
            None => self.before.contains_key(&id),
        }
    }

    fn resolve(&self, id: ElementId) -> &Element {
        let element = match self.slots.get(&id) {
            Some(slot) => Some(&slot.element),
            None => self
                .before
                .get(&id)
                .and_then(|mesh| self.hinted[mesh].element(id)),
        };
        match element {
            Some(element) => element,
            None => contract_violation(MeshError::UnknownElement(id)),
        }
    }

    fn fragment(&self, seed: ElementId, visited: &mut HashSet<ElementId>) -> Vec<ElementId> {
        let mut members = Vec::new();
        let mut queue = VecDeque::from([seed]);
        visited.insert(seed);

        while let Some(id) = queue.pop_front() {
            members.push(id);
            for next in self.resolve(id).adjacent() {
                if self.alive(next) && visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        members
    }

    /// Transitions of every connection point held by a touched or moved element.
    fn cpt_changes(
        &self,
        changes: &[ElementChange],
        affected: &IndexSet<MeshId>,
        after: &HashMap<ElementId, MeshId>,
    ) -> Vec<CptChange> {
        let mut transitions: IndexMap<CptId, Vec<CptChange>> = IndexMap::new();

        let touched: HashSet<ElementId> = changes.iter().map(ElementChange::element).collect();
        for change in changes {
            let id = change.element();
            let (prev, new) = (change.prev_state(), change.new_state());
            for cpt in self.resolve(id).connection_points() {
                transitions.entry(*cpt).or_default().push(CptChange {
                    cpt: *cpt,
                    prev_element: prev.then_some(id),
                    new_element: new.then_some(id),
                    prev_mesh: if prev { self.before.get(&id).copied() } else { None },
                    new_mesh: if new { after.get(&id).copied() } else { None },
                });
            }
        }

        for mesh in affected {
            for element in self.hinted[mesh].elements() {
                let id = element.id();
                let Some(target) = after.get(&id) else {
                    continue;
                };
                if touched.contains(&id) || target == mesh {
                    continue;
                }
                for cpt in element.connection_points() {
                    transitions.entry(*cpt).or_default().push(CptChange {
                        cpt: *cpt,
                        prev_element: Some(id),
                        new_element: Some(id),
                        prev_mesh: Some(*mesh),
                        new_mesh: Some(*target),
                    });
                }
            }
        }

        transitions
            .into_values()
            .filter_map(|mut list| {
                // releases, then persistent holders, then acquisitions
                list.sort_by_key(|c| match (c.prev_element, c.new_element) {
                    (Some(_), None) => 0,
                    (Some(_), Some(_)) => 1,
                    _ => 2,
                });
                let mut list = list.into_iter();
                let first = list.next()?;
                let folded = list.fold(first, |acc, next| {
                    if let (Some(held), None) = (acc.new_element, next.prev_element) {
                        duplicate(acc.cpt, held, next.new_element);
                    }
                    acc.then(&next)
                });
                let committed = self.store.holder(folded.cpt);
                if let (None, Some(holder)) = (folded.prev_element, committed) {
                    duplicate(folded.cpt, holder, folded.new_element);
                }
                Some(folded)
            })
            .collect()
    }
}

/// Abort on a second live holder of one connection point.
fn duplicate(cpt: CptId, first: ElementId, second: Option<ElementId>) -> ! {
    match second {
        Some(second) => {
            contract_violation(MeshError::DuplicateConnectionPoint { cpt, first, second })
        }
        None => contract_violation(MeshError::NonConsecutiveChange(cpt.to_string())),
    }
}
