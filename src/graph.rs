//! Patch topology - owns nodes and links and enforces their invariants.
//!
//! [`Topology`] is generic over the per-node payload so the same structure
//! backs both sides: the control thread keeps a `Topology<()>` mirror for
//! validation and enumeration, the processing thread a
//! `Topology<Box<dyn Object>>` it actually dispatches through.

use hashbrown::HashMap;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::error::PatchError;
use crate::node::{NodeId, ObjectInfo, Shape};
use crate::params::Params;

/// A directed connection from one node's outlet to another node's inlet.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Link {
    pub from: NodeId,
    pub outlet: usize,
    pub to: NodeId,
    pub inlet: usize,
}

impl Link {
    pub fn new(from: NodeId, outlet: usize, to: NodeId, inlet: usize) -> Self {
        Self { from, outlet, to, inlet }
    }

    pub fn touches(&self, id: NodeId) -> bool {
        self.from == id || self.to == id
    }
}

// Edge weight: ports plus insertion order, which fixes fan-out order
#[derive(Clone, Copy, Debug)]
pub(crate) struct Wire {
    outlet: usize,
    inlet: usize,
    seq: u64,
}

/// A node slot: public description plus payload.
#[derive(Debug)]
pub(crate) struct Vertex<T> {
    pub(crate) info: ObjectInfo,
    pub(crate) body: T,
    /// Destinations per outlet, in link insertion order
    fanout: Vec<Vec<(NodeId, usize)>>,
}

type InnerGraph<T> = StableGraph<Vertex<T>, Wire>;

/// Nodes and links of one patch.
pub struct Topology<T> {
    graph: InnerGraph<T>,

    node_indices: HashMap<NodeId, NodeIndex>,
    names: HashMap<String, NodeId>,
    /// Creation order, for enumeration by position
    order: Vec<NodeId>,

    next_node_id: u32,
    next_seq: u64,
}

impl<T> Default for Topology<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Topology<T> {
    pub fn new() -> Self {
        Self {
            graph: StableGraph::new(),
            node_indices: HashMap::new(),
            names: HashMap::new(),
            order: Vec::new(),
            next_node_id: 0,
            next_seq: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node_indices.contains_key(&id)
    }

    pub fn info(&self, id: NodeId) -> Option<&ObjectInfo> {
        let idx = *self.node_indices.get(&id)?;
        self.graph.node_weight(idx).map(|v| &v.info)
    }

    pub(crate) fn body_mut(&mut self, id: NodeId) -> Option<&mut T> {
        let idx = *self.node_indices.get(&id)?;
        self.graph.node_weight_mut(idx).map(|v| &mut v.body)
    }

    /// Node at `pos` in creation order.
    pub fn at(&self, pos: usize) -> Option<&ObjectInfo> {
        self.order.get(pos).and_then(|id| self.info(*id))
    }

    pub(crate) fn id_at(&self, pos: usize) -> Option<NodeId> {
        self.order.get(pos).copied()
    }

    /// Node ids in creation order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.order.iter().copied()
    }

    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    /// Id the next created node gets.
    pub(crate) fn next_id(&self) -> u32 {
        self.next_node_id
    }

    /// Raises the id counter so nothing below `floor` is ever handed out.
    pub(crate) fn reserve_ids(&mut self, floor: u32) {
        self.next_node_id = self.next_node_id.max(floor);
    }

    #[cfg(test)]
    pub(crate) fn allocate_id(&mut self) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        id
    }

    /// Adds a node under the id already stored in `info`.
    pub(crate) fn insert(&mut self, info: ObjectInfo, body: T) -> Result<(), PatchError> {
        let id = info.id;
        if self.contains(id) {
            return Err(PatchError::MalformedDocument(format!("duplicate node id {}", id)));
        }
        if let Some(name) = &info.name {
            if self.names.contains_key(name) {
                return Err(PatchError::NameInUse(name.clone()));
            }
            self.names.insert(name.clone(), id);
        }

        let idx = self.graph.add_node(Vertex { info, body, fanout: Vec::new() });
        self.node_indices.insert(id, idx);
        self.order.push(id);
        self.reserve_ids(id.0.saturating_add(1));
        Ok(())
    }

    /// Removes a node together with every link touching it.
    pub(crate) fn remove(&mut self, id: NodeId) -> Option<T> {
        let idx = self.node_indices.remove(&id)?;
        self.order.retain(|n| *n != id);

        let mut sources = self.graph.neighbors_directed(idx, Direction::Incoming).detach();
        while let Some(source) = sources.next_node(&self.graph) {
            for lane in &mut self.graph[source].fanout {
                lane.retain(|(to, _)| *to != id);
            }
        }
        // StableGraph drops incident edges before the node itself
        let vertex = self.graph.remove_node(idx)?;
        if let Some(name) = &vertex.info.name {
            self.names.remove(name);
        }
        Some(vertex.body)
    }

    /// Drops every node and link. The id counter keeps running.
    pub(crate) fn clear(&mut self) {
        self.graph.clear();
        self.node_indices.clear();
        self.names.clear();
        self.order.clear();
    }

    fn check_endpoints(&self, link: &Link) -> Result<(NodeIndex, NodeIndex), PatchError> {
        let invalid = || PatchError::InvalidEndpoint {
            from: link.from,
            outlet: link.outlet,
            to: link.to,
            inlet: link.inlet,
        };
        let from = self.info(link.from).ok_or_else(invalid)?;
        let to = self.info(link.to).ok_or_else(invalid)?;
        if link.outlet >= from.outlets() || link.inlet >= to.inlets() {
            return Err(invalid());
        }
        Ok((self.node_indices[&link.from], self.node_indices[&link.to]))
    }

    fn find_edge(&self, from: NodeIndex, to: NodeIndex, link: &Link) -> Option<EdgeIndex> {
        self.graph
            .edges_directed(from, Direction::Outgoing)
            .find(|e| e.target() == to && e.weight().outlet == link.outlet && e.weight().inlet == link.inlet)
            .map(|e| e.id())
    }

    /// Validates a link without inserting it.
    pub(crate) fn can_connect(&self, link: &Link) -> Result<(), PatchError> {
        self.check_endpoints(link).map(|_| ())
    }

    /// Inserts a link. Returns `false` when it already existed.
    pub(crate) fn connect(&mut self, link: Link) -> Result<bool, PatchError> {
        let (from, to) = self.check_endpoints(&link)?;
        if self.find_edge(from, to, &link).is_some() {
            return Ok(false);
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.graph.add_edge(from, to, Wire { outlet: link.outlet, inlet: link.inlet, seq });

        let lanes = &mut self.graph[from].fanout;
        if lanes.len() <= link.outlet {
            lanes.resize_with(link.outlet + 1, Vec::new);
        }
        lanes[link.outlet].push((link.to, link.inlet));
        Ok(true)
    }

    /// Removes a link. Returns `false` when there was none.
    pub(crate) fn disconnect(&mut self, link: &Link) -> bool {
        let (Some(&from), Some(&to)) = (self.node_indices.get(&link.from), self.node_indices.get(&link.to)) else {
            return false;
        };
        let Some(edge) = self.find_edge(from, to, link) else {
            return false;
        };
        self.graph.remove_edge(edge);
        self.drop_fanout(from, link);
        true
    }

    fn drop_fanout(&mut self, from: NodeIndex, link: &Link) {
        if let Some(lane) = self.graph[from].fanout.get_mut(link.outlet) {
            lane.retain(|target| *target != (link.to, link.inlet));
        }
    }

    pub fn has_link(&self, link: &Link) -> bool {
        match (self.node_indices.get(&link.from), self.node_indices.get(&link.to)) {
            (Some(&from), Some(&to)) => self.find_edge(from, to, link).is_some(),
            _ => false,
        }
    }

    /// Every link, in insertion order.
    pub fn links(&self) -> Vec<Link> {
        let mut wires: Vec<(u64, Link)> = self
            .graph
            .edge_indices()
            .filter_map(|e| {
                let (from, to) = self.graph.edge_endpoints(e)?;
                let wire = &self.graph[e];
                Some((wire.seq, self.link_of(from, to, wire)))
            })
            .collect();
        wires.sort_by_key(|(seq, _)| *seq);
        wires.into_iter().map(|(_, link)| link).collect()
    }

    pub fn link_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Destinations of `(id, outlet)` as `(node, inlet)`, in insertion order.
    pub(crate) fn targets(&self, id: NodeId, outlet: usize) -> &[(NodeId, usize)] {
        self.node_indices
            .get(&id)
            .and_then(|idx| self.graph.node_weight(*idx))
            .and_then(|vertex| vertex.fanout.get(outlet))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn link_of(&self, from: NodeIndex, to: NodeIndex, wire: &Wire) -> Link {
        Link::new(self.graph[from].info.id, wire.outlet, self.graph[to].info.id, wire.inlet)
    }

    /// Replaces a node's parameters, shape and payload in one step.
    ///
    /// Links that fall outside a shrunk inlet or outlet range are removed and
    /// returned. Growth never removes links.
    pub(crate) fn reshape(&mut self, id: NodeId, params: Params, shape: Shape, body: T) -> Result<(T, Vec<Link>), PatchError> {
        let idx = *self.node_indices.get(&id).ok_or(PatchError::UnknownNode(id))?;

        let mut stale: Vec<(EdgeIndex, NodeIndex, Link)> = Vec::new();
        for e in self.graph.edges_directed(idx, Direction::Outgoing) {
            if e.weight().outlet >= shape.outlets {
                stale.push((e.id(), e.source(), self.link_of(e.source(), e.target(), e.weight())));
            }
        }
        for e in self.graph.edges_directed(idx, Direction::Incoming) {
            // a self-link may already be listed from the outgoing side
            if e.weight().inlet >= shape.inlets && !stale.iter().any(|(edge, _, _)| *edge == e.id()) {
                stale.push((e.id(), e.source(), self.link_of(e.source(), e.target(), e.weight())));
            }
        }
        for (edge, source, link) in &stale {
            self.graph.remove_edge(*edge);
            self.drop_fanout(*source, link);
        }

        let vertex = &mut self.graph[idx];
        vertex.info.params = params;
        vertex.info.shape = shape;
        vertex.fanout.truncate(shape.outlets);
        let old = core::mem::replace(&mut vertex.body, body);

        Ok((old, stale.into_iter().map(|(_, _, link)| link).collect()))
    }

    /// Sets or clears a node's label.
    pub(crate) fn rename(&mut self, id: NodeId, name: Option<String>) -> Result<(), PatchError> {
        let idx = *self.node_indices.get(&id).ok_or(PatchError::UnknownNode(id))?;
        if let Some(new) = &name {
            match self.names.get(new) {
                Some(owner) if *owner != id => return Err(PatchError::NameInUse(new.clone())),
                _ => {}
            }
        }

        let vertex = &mut self.graph[idx];
        if let Some(old) = vertex.info.name.take() {
            self.names.remove(&old);
        }
        if let Some(new) = &name {
            self.names.insert(new.clone(), id);
        }
        vertex.info.name = name;
        Ok(())
    }

    /// Copies the structure with a new payload per node.
    pub(crate) fn map<U>(&self, mut f: impl FnMut(&ObjectInfo, &T) -> U) -> Topology<U> {
        Topology {
            graph: self.graph.map(
                |_, v| Vertex {
                    info: v.info.clone(),
                    body: f(&v.info, &v.body),
                    fanout: v.fanout.clone(),
                },
                |_, w| *w,
            ),
            node_indices: self.node_indices.clone(),
            names: self.names.clone(),
            order: self.order.clone(),
            next_node_id: self.next_node_id,
            next_seq: self.next_seq,
        }
    }
}
