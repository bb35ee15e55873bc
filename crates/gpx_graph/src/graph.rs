//! Labelled bidirectional multigraph with O(1) label-indexed lookup and a
//! partial-involution mating relation to a graph of a different node type.
//!
//! Two instances of [`PlacementGraph`] participate in a PAR run: one over
//! netlist cells/ports (`PlacementGraph<NetlistRef>`), one over device
//! entities (`PlacementGraph<DeviceRef>`). This module only knows about the
//! shape common to both — labels, edges, mating — not what a "netlist cell"
//! or "device entity" actually is; that is `gpx_builder`'s and
//! `gpx_device`'s job respectively (spec §9's arena-index design note).

use gpx_common::{EdgeId, Label, NodeId, ParError, ParResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One directed edge, stored on its source node (spec §3.1: "every edge in
/// `G_N` is stored on its source node and is enumerable from that node in
/// O(deg) time; reverse traversal is not required").
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Edge {
    /// The node this edge originates from (redundant with storage location,
    /// kept for convenience when an edge is handled out of context).
    pub source: NodeId,
    /// Name of the port on the source node this edge leaves from.
    pub source_port: String,
    /// The node this edge terminates at.
    pub dest: NodeId,
    /// Name of the port on the destination node this edge arrives at.
    pub dest_port: String,
}

/// A node in a [`PlacementGraph`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GraphNode<T> {
    /// The node's primary label.
    pub primary_label: Label,
    /// Additional labels this node is substitutable under (spec §3.1).
    pub alternate_labels: Vec<Label>,
    /// Opaque back-reference to the owning domain object.
    pub userdata: T,
    /// Edges leaving this node.
    pub edges: Vec<Edge>,
    /// The node this one is mated to, in the *other* graph's ID space.
    pub mate: Option<NodeId>,
}

impl<T> GraphNode<T> {
    /// Returns `true` if `label` equals the primary label or any alternate.
    fn matches(&self, label: Label) -> bool {
        self.primary_label == label || self.alternate_labels.contains(&label)
    }
}

/// A labelled bidirectional multigraph with label-indexed O(1) lookup.
///
/// Generic over the back-reference type `T` so the same implementation
/// serves both the netlist graph and the device graph.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlacementGraph<T> {
    nodes: Vec<GraphNode<T>>,
    #[serde(skip)]
    label_index: HashMap<Label, Vec<NodeId>>,
    #[serde(skip)]
    index_dirty: bool,
}

impl<T> Default for PlacementGraph<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PlacementGraph<T> {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            label_index: HashMap::new(),
            index_dirty: false,
        }
    }

    /// Adds a node with the given primary label and back-reference.
    /// Invalidates the label index.
    pub fn add_node(&mut self, label: Label, userdata: T) -> NodeId {
        let id = NodeId::from_raw(self.nodes.len() as u32);
        self.nodes.push(GraphNode {
            primary_label: label,
            alternate_labels: Vec::new(),
            userdata,
            edges: Vec::new(),
            mate: None,
        });
        self.index_dirty = true;
        id
    }

    /// Adds an alternate label to a node, encoding substitutability.
    /// Invalidates the label index.
    pub fn add_alternate_label(&mut self, node: NodeId, label: Label) {
        self.node_mut(node).alternate_labels.push(label);
        self.index_dirty = true;
    }

    /// Adds a directed edge from `source` to `dest`, tagged with port names.
    /// Multiple edges between the same pair of nodes with different port
    /// pairs are permitted.
    pub fn add_edge(
        &mut self,
        source: NodeId,
        source_port: impl Into<String>,
        dest: NodeId,
        dest_port: impl Into<String>,
    ) -> EdgeId {
        let edge = Edge {
            source,
            source_port: source_port.into(),
            dest,
            dest_port: dest_port.into(),
        };
        let node = self.node_mut(source);
        let edge_id = EdgeId::from_raw(node.edges.len() as u32);
        node.edges.push(edge);
        edge_id
    }

    /// Returns a reference to the node by ID.
    pub fn node(&self, id: NodeId) -> &GraphNode<T> {
        &self.nodes[id.as_raw() as usize]
    }

    /// Returns a mutable reference to the node by ID.
    pub fn node_mut(&mut self, id: NodeId) -> &mut GraphNode<T> {
        &mut self.nodes[id.as_raw() as usize]
    }

    /// Returns the edges leaving `node`, in O(deg) time.
    pub fn edges(&self, node: NodeId) -> &[Edge] {
        &self.node(node).edges
    }

    /// Removes every edge leaving `node` to `dest` tagged with the given
    /// port pair. Used by helper inference to drop a stale edge after a
    /// load is rewired to a different source (spec §4.3.1 Pass B: "remove
    /// the stale `G_N` edge"). No-op if no such edge exists.
    pub fn remove_edge(&mut self, node: NodeId, source_port: &str, dest: NodeId, dest_port: &str) {
        self.node_mut(node)
            .edges
            .retain(|e| !(e.dest == dest && e.source_port == source_port && e.dest_port == dest_port));
    }

    /// The number of nodes in the graph.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Iterates over all node IDs in allocation order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len() as u32).map(NodeId::from_raw)
    }

    /// Returns `true` if the node's primary or any alternate label equals `label`.
    pub fn matches_label(&self, node: NodeId, label: Label) -> bool {
        self.node(node).matches(label)
    }

    /// The largest primary label allocated to any node, or `Label::from_raw(0)`
    /// if the graph is empty. Used to bound the sequential-fill loop over
    /// label space (spec §4.4.1).
    pub fn max_label(&self) -> Label {
        self.nodes
            .iter()
            .map(|n| n.primary_label)
            .max()
            .unwrap_or(Label::from_raw(0))
    }

    /// Rebuilds the label → node-list index. Idempotent; must be called
    /// after any mutation that adds/removes nodes, adds an alternate label,
    /// or otherwise changes a node's label set (spec §3.1, §4.1).
    pub fn rebuild_label_index(&mut self) {
        self.label_index.clear();
        for (i, node) in self.nodes.iter().enumerate() {
            let id = NodeId::from_raw(i as u32);
            self.label_index.entry(node.primary_label).or_default().push(id);
            for &alt in &node.alternate_labels {
                self.label_index.entry(alt).or_default().push(id);
            }
        }
        self.index_dirty = false;
    }

    /// Returns `true` if the label index needs rebuilding before a label
    /// query can be trusted.
    pub fn index_is_dirty(&self) -> bool {
        self.index_dirty
    }

    /// The i-th node with the given label, in index order. A node appears
    /// once per label it matches (primary or alternate), so a node with an
    /// alternate label is reachable both by its primary label's index and
    /// by the alternate's.
    pub fn node_by_label_and_index(&self, label: Label, i: usize) -> ParResult<NodeId> {
        self.label_index
            .get(&label)
            .and_then(|v| v.get(i))
            .copied()
            .ok_or_else(|| {
                ParError::new(format!(
                    "node_by_label_and_index: no node at index {i} for label {label}"
                ))
            })
    }

    /// The number of nodes carrying the given label (primary or alternate).
    pub fn num_nodes_with_label(&self, label: Label) -> usize {
        self.label_index.get(&label).map(Vec::len).unwrap_or(0)
    }
}

/// Mates a node in graph `a` with a node in graph `b`. The two graphs may
/// hold different back-reference types (netlist vs. device), so `a` and
/// `b` are independent type parameters.
///
/// Fails (programmer error, spec §4.1) if either side is already mated, or
/// if `b_node`'s labels do not include `a_node`'s primary label (the
/// direction required by spec §3.1: "a netlist node with primary label `L`
/// may be mated only to a device node whose primary or any alternate label
/// equals `L`" — callers pass the netlist-side graph as `a`).
pub fn mate<A, B>(
    a: &mut PlacementGraph<A>,
    a_node: NodeId,
    b: &mut PlacementGraph<B>,
    b_node: NodeId,
) -> ParResult<()> {
    if a.node(a_node).mate.is_some() {
        return Err(ParError::new("mate: node in graph a is already mated"));
    }
    if b.node(b_node).mate.is_some() {
        return Err(ParError::new("mate: node in graph b is already mated"));
    }
    let label = a.node(a_node).primary_label;
    if !b.matches_label(b_node, label) {
        return Err(ParError::new(format!(
            "mate: label {label} is not compatible with target node's label set"
        )));
    }
    a.node_mut(a_node).mate = Some(b_node);
    b.node_mut(b_node).mate = Some(a_node);
    Ok(())
}

/// Breaks the mating relation between `a_node` and whatever it is mated to
/// in `b`. No-op if `a_node` is unmated.
pub fn unmate<A, B>(a: &mut PlacementGraph<A>, a_node: NodeId, b: &mut PlacementGraph<B>) {
    if let Some(b_node) = a.node_mut(a_node).mate.take() {
        b.node_mut(b_node).mate = None;
    }
}
