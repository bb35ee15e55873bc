//! Placement cost functions (spec §4.4.2).
//!
//! Two components feed the annealer: a congestion cost over cross-matrix
//! general-fabric edges, and an unroutable-edge penalty that dominates by
//! construction so the annealer always prefers a routable placement over a
//! merely less-congested one.

use gpx_builder::DeviceGraph;
use gpx_builder::NetlistGraph;
use gpx_common::NodeId;
use gpx_device::Device;
use gpx_graph::graph::Edge;

/// Added to the congestion cost once either matrix's bad-edge count exceeds
/// ten (spec §4.4.2: `c0^2 + c1^2 + (20 if max(c0,c1) > 10 else 0)`).
const CONGESTION_STEP_THRESHOLD: u32 = 10;
const CONGESTION_STEP_PENALTY: u32 = 20;

/// Per-edge penalty for an edge whose destination is unreachable from its
/// mated source in the device graph. Large enough to dominate any
/// congestion cost this device family can produce.
pub const UNROUTABLE_PENALTY: u64 = 1_000_000;

/// `true` if `edge`, leaving `source` (already mated), is a "bad edge": it
/// crosses matrices, lands on a general-fabric input, and its source has no
/// dual to re-expose the signal on the other matrix (spec §4.4.2).
fn is_bad_edge(ngraph: &NetlistGraph, dgraph: &DeviceGraph, device: &Device, source: NodeId, edge: &Edge) -> Option<u8> {
    let source_device_node = ngraph.node(source).mate?;
    let dest_device_node = ngraph.node(edge.dest).mate?;
    let source_entity = device.entity(dgraph.node(source_device_node).userdata.entity);
    let dest_entity = device.entity(dgraph.node(dest_device_node).userdata.entity);

    if source_entity.matrix == dest_entity.matrix {
        return None;
    }
    if !dest_entity.is_general_fabric_input(&edge.dest_port) {
        return None;
    }
    if source_entity.dual.is_some() {
        return None;
    }
    Some(source_entity.matrix)
}

/// `true` if a sequence of at most two device-graph edges connects the
/// mated source to the mated destination through `edge.dest_port`: either a
/// direct edge, or one hop through an intermediate node (modeling routing
/// through a cross-connection resource). This predicate is what
/// `find_suboptimal_placements` and the unroutable cost component both
/// query (spec §4.4.2's `is_dest_reachable`).
pub fn is_dest_reachable(dgraph: &DeviceGraph, source: NodeId, dest: NodeId, dest_port: &str) -> bool {
    if dgraph.edges(source).iter().any(|e| e.dest == dest && e.dest_port == dest_port) {
        return true;
    }
    dgraph.edges(source).iter().any(|hop| {
        dgraph
            .edges(hop.dest)
            .iter()
            .any(|e| e.dest == dest && e.dest_port == dest_port)
    })
}

/// `true` if `edge`'s mated endpoints are unroutable: both ends placed, but
/// no path of at most two device edges connects them.
fn is_unroutable_edge(ngraph: &NetlistGraph, dgraph: &DeviceGraph, source: NodeId, edge: &Edge) -> bool {
    let (Some(sd), Some(dd)) = (ngraph.node(source).mate, ngraph.node(edge.dest).mate) else {
        return false;
    };
    !is_dest_reachable(dgraph, sd, dd, &edge.dest_port)
}

/// A netlist-graph edge with no routable path between its mated endpoints,
/// surfaced for diagnostic use (spec §6.3: "the engine returns ... a list of
/// unroutable edges for diagnostic use" on annealing failure).
#[derive(Clone, Debug)]
pub struct UnroutableEdge {
    /// The netlist-graph node the edge leaves from.
    pub source: NodeId,
    /// Source output port name.
    pub source_port: String,
    /// The netlist-graph node the edge arrives at.
    pub dest: NodeId,
    /// Destination input port name.
    pub dest_port: String,
}

/// Every netlist-graph edge currently unroutable given the graphs' mating.
pub fn unroutable_edges(ngraph: &NetlistGraph, dgraph: &DeviceGraph) -> Vec<UnroutableEdge> {
    let mut found = Vec::new();
    for node in ngraph.node_ids() {
        for edge in ngraph.edges(node) {
            if is_unroutable_edge(ngraph, dgraph, node, edge) {
                found.push(UnroutableEdge {
                    source: node,
                    source_port: edge.source_port.clone(),
                    dest: edge.dest,
                    dest_port: edge.dest_port.clone(),
                });
            }
        }
    }
    found
}

/// The congestion component: `c0^2 + c1^2`, plus a step penalty once either
/// matrix's bad-edge count exceeds the threshold.
pub fn congestion_cost(ngraph: &NetlistGraph, dgraph: &DeviceGraph, device: &Device) -> u32 {
    let mut counts = [0u32, 0u32];
    for node in ngraph.node_ids() {
        for edge in ngraph.edges(node) {
            if let Some(matrix) = is_bad_edge(ngraph, dgraph, device, node, edge) {
                counts[matrix as usize] += 1;
            }
        }
    }
    let step = if counts[0].max(counts[1]) > CONGESTION_STEP_THRESHOLD {
        CONGESTION_STEP_PENALTY
    } else {
        0
    };
    counts[0] * counts[0] + counts[1] * counts[1] + step
}

/// The unroutable component: `UNROUTABLE_PENALTY` per edge with no path
/// between its mated endpoints.
pub fn unroutable_cost(ngraph: &NetlistGraph, dgraph: &DeviceGraph) -> u64 {
    unroutable_edges(ngraph, dgraph).len() as u64 * UNROUTABLE_PENALTY
}

/// Total placement cost: congestion plus the dominating unroutable penalty.
pub fn total_cost(ngraph: &NetlistGraph, dgraph: &DeviceGraph, device: &Device) -> u64 {
    congestion_cost(ngraph, dgraph, device) as u64 + unroutable_cost(ngraph, dgraph)
}
