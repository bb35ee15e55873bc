//! Move proposals (spec §4.4.3): find cells sitting on a bad or unroutable
//! edge, then propose relocating one to a compatible site, preferring an
//! opposite-matrix site that resolves the edge, then any same-matrix site,
//! then giving up and taking whatever compatible site remains.

use crate::placement::cost::is_dest_reachable;
use gpx_builder::{DeviceGraph, NetlistGraph, Netlist};
use gpx_common::NodeId;
use gpx_device::Device;
use gpx_graph::{mate, unmate};
use rand::Rng;
use std::collections::HashSet;

/// `true` if the cell mated to `node` may be displaced: it is not
/// `LOC`-locked, and more than one device site can host it.
fn is_movable(netlist: &Netlist, ngraph: &NetlistGraph, dgraph: &DeviceGraph, node: NodeId) -> bool {
    let cell = netlist.cell(ngraph.node(node).userdata.cell);
    if cell.loc().is_some() {
        return false;
    }
    dgraph.num_nodes_with_label(ngraph.node(node).primary_label) > 1
}

fn edge_is_bad_or_unroutable(ngraph: &NetlistGraph, dgraph: &DeviceGraph, device: &Device, node: NodeId, edge: &gpx_graph::graph::Edge) -> bool {
    let Some(source_device) = ngraph.node(node).mate else {
        return false;
    };
    let Some(dest_device) = ngraph.node(edge.dest).mate else {
        return false;
    };
    let source_entity = device.entity(dgraph.node(source_device).userdata.entity);
    let dest_entity = device.entity(dgraph.node(dest_device).userdata.entity);

    let bad = source_entity.matrix != dest_entity.matrix
        && dest_entity.is_general_fabric_input(&edge.dest_port)
        && source_entity.dual.is_none();
    let unroutable = !is_dest_reachable(dgraph, source_device, dest_device, &edge.dest_port);
    bad || unroutable
}

/// Collects every movable netlist node that is an endpoint (source or
/// destination) of a bad or unroutable edge (spec §4.4.3 step 1).
pub fn find_suboptimal_placements(
    netlist: &Netlist,
    ngraph: &NetlistGraph,
    dgraph: &DeviceGraph,
    device: &Device,
) -> Vec<NodeId> {
    let mut found = HashSet::new();
    for node in ngraph.node_ids() {
        for edge in ngraph.edges(node) {
            if !edge_is_bad_or_unroutable(ngraph, dgraph, device, node, edge) {
                continue;
            }
            if is_movable(netlist, ngraph, dgraph, node) {
                found.insert(node);
            }
            if is_movable(netlist, ngraph, dgraph, edge.dest) {
                found.insert(edge.dest);
            }
        }
    }
    found.into_iter().collect()
}

/// What a successful `propose_move` changed, so it can be undone by
/// `revert_move` on rejection.
#[derive(Clone, Copy, Debug)]
pub struct MoveRecord {
    moved_node: NodeId,
    moved_from: NodeId,
    moved_to: NodeId,
    displaced: Option<NodeId>,
}

/// Proposes relocating `candidate`'s mate to a different compatible device
/// site, swapping with whatever already occupies the destination if
/// anything does. Destination preference order: an opposite-matrix site,
/// then any same-matrix site, then any compatible site at all (spec
/// §4.4.3 step 2). Returns `None` if no legal destination exists, or if the
/// occupant of the chosen site is itself `LOC`-locked.
pub fn propose_move(
    netlist: &Netlist,
    ngraph: &mut NetlistGraph,
    dgraph: &mut DeviceGraph,
    device: &Device,
    candidate: NodeId,
    rng: &mut impl Rng,
) -> Option<MoveRecord> {
    let label = ngraph.node(candidate).primary_label;
    let moved_from = ngraph.node(candidate).mate.expect("candidate is placed");
    let current_matrix = device.entity(dgraph.node(moved_from).userdata.entity).matrix;

    let site_count = dgraph.num_nodes_with_label(label);
    let mut opposite = Vec::new();
    let mut same = Vec::new();
    let mut all = Vec::new();
    for i in 0..site_count {
        let site = dgraph
            .node_by_label_and_index(label, i)
            .expect("index within num_nodes_with_label bound");
        if site == moved_from {
            continue;
        }
        all.push(site);
        let site_matrix = device.entity(dgraph.node(site).userdata.entity).matrix;
        if site_matrix == current_matrix {
            same.push(site);
        } else {
            opposite.push(site);
        }
    }

    let pool = if !opposite.is_empty() {
        &opposite
    } else if !same.is_empty() {
        &same
    } else {
        &all
    };
    if pool.is_empty() {
        return None;
    }
    let moved_to = pool[rng.gen_range(0..pool.len())];

    let occupant = dgraph.node(moved_to).mate;
    if let Some(occupant_node) = occupant {
        let occupant_cell = netlist.cell(ngraph.node(occupant_node).userdata.cell);
        if occupant_cell.loc().is_some() {
            return None;
        }
        if !dgraph.matches_label(moved_from, ngraph.node(occupant_node).primary_label) {
            return None;
        }
    }

    unmate(ngraph, candidate, dgraph);
    if let Some(occupant_node) = occupant {
        unmate(ngraph, occupant_node, dgraph);
    }
    mate(ngraph, candidate, dgraph, moved_to).expect("destination drawn from candidate's own label set");
    if let Some(occupant_node) = occupant {
        mate(ngraph, occupant_node, dgraph, moved_from).expect("checked compatible above");
    }

    Some(MoveRecord {
        moved_node: candidate,
        moved_from,
        moved_to,
        displaced: occupant,
    })
}

/// Undoes a move `propose_move` performed, restoring both nodes to their
/// prior sites.
pub fn revert_move(ngraph: &mut NetlistGraph, dgraph: &mut DeviceGraph, record: &MoveRecord) {
    unmate(ngraph, record.moved_node, dgraph);
    if let Some(occupant_node) = record.displaced {
        unmate(ngraph, occupant_node, dgraph);
    }
    mate(ngraph, record.moved_node, dgraph, record.moved_from).expect("reverting a move that was legal when performed");
    if let Some(occupant_node) = record.displaced {
        mate(ngraph, occupant_node, dgraph, record.moved_to).expect("reverting a move that was legal when performed");
    }
}
