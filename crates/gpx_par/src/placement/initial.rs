//! Initial placement (spec §4.4.1): resolve `LOC` constraints first, then
//! fill every remaining netlist node into the first unmated device node of
//! a compatible label, in label and index order.
//!
//! Unlike the teacher's random initial placement, this fill is
//! deterministic: the same netlist and device always produce the same
//! starting placement, which matters for the annealer's seeded
//! reproducibility (spec §5).

use gpx_builder::{DeviceGraph, LabelMap, NetlistGraph, Netlist};
use gpx_common::Label;
use gpx_device::Device;
use gpx_diag::DiagnosticSink;
use gpx_graph::mate;

/// Resolves every `LOC` attribute in the netlist into a mating between the
/// named cell's netlist node and the named site's device node. Reports and
/// fails on an unknown site, a type-incompatible site, or two cells
/// claiming the same site.
pub fn apply_loc(
    netlist: &Netlist,
    ngraph: &mut NetlistGraph,
    dgraph: &mut DeviceGraph,
    device: &Device,
    sink: &DiagnosticSink,
) -> bool {
    for cell in &netlist.cells {
        let Some(loc) = cell.loc() else { continue };
        let netlist_node = cell.node.expect("netlist node created before placement");

        let Some(entity_id) = device.find_by_description(loc) else {
            sink.error(format!(
                "cell '{}' has LOC '{loc}' but no such site exists on this device",
                cell.name
            ));
            return false;
        };
        let device_node = device
            .entity(entity_id)
            .par_node
            .expect("device node created before placement");

        if !dgraph.matches_label(device_node, ngraph.node(netlist_node).primary_label) {
            sink.error(format!(
                "cell '{}' has LOC '{loc}' but that site is not compatible with type '{}'",
                cell.name, cell.type_name
            ));
            return false;
        }

        if let Some(occupant_node) = dgraph.node(device_node).mate {
            let occupant_name = netlist
                .cells
                .iter()
                .find(|c| c.node == Some(occupant_node))
                .map(|c| c.name.as_str())
                .unwrap_or("<unknown>");
            sink.error(format!(
                "LOC site '{loc}' is claimed by both '{occupant_name}' and '{}'",
                cell.name
            ));
            return false;
        }

        if let Err(e) = mate(ngraph, netlist_node, dgraph, device_node) {
            sink.error(format!("cell '{}' LOC failed: {e}", cell.name));
            return false;
        }
    }
    true
}

/// Fills every still-unmated netlist node into the first unmated device
/// node sharing a label, scanning labels in ascending order and, within a
/// label, device sites in index order (spec §4.4.1: "sequential fill ...
/// deterministic (first-fit by index)"). Reports and fails if a label runs
/// out of sites.
pub fn sequential_fill(
    ngraph: &mut NetlistGraph,
    dgraph: &mut DeviceGraph,
    labels: &LabelMap,
    sink: &DiagnosticSink,
) -> bool {
    let max_raw = ngraph.max_label().as_raw().max(dgraph.max_label().as_raw());
    for raw in 0..=max_raw {
        let label = Label::from_raw(raw);
        let netlist_count = ngraph.num_nodes_with_label(label);
        for i in 0..netlist_count {
            let netlist_node = ngraph
                .node_by_label_and_index(label, i)
                .expect("index within num_nodes_with_label bound");
            if ngraph.node(netlist_node).mate.is_some() {
                continue;
            }

            let device_count = dgraph.num_nodes_with_label(label);
            let mut placed = false;
            for j in 0..device_count {
                let device_node = dgraph
                    .node_by_label_and_index(label, j)
                    .expect("index within num_nodes_with_label bound");
                if dgraph.node(device_node).mate.is_some() {
                    continue;
                }
                mate(ngraph, netlist_node, dgraph, device_node)
                    .expect("label compatibility guaranteed by shared label index");
                placed = true;
                break;
            }

            if !placed {
                let type_name = labels.description(label).unwrap_or("<unknown type>");
                sink.error(format!("out of sites of type '{type_name}'"));
                return false;
            }
        }
    }
    true
}

/// Runs initial placement in full: `LOC` resolution, then sequential fill.
pub fn initial_place(
    netlist: &Netlist,
    ngraph: &mut NetlistGraph,
    dgraph: &mut DeviceGraph,
    device: &Device,
    labels: &LabelMap,
    sink: &DiagnosticSink,
) -> bool {
    apply_loc(netlist, ngraph, dgraph, device, sink) && sequential_fill(ngraph, dgraph, labels, sink)
}
