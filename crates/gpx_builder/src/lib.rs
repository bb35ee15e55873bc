//! The graph builder (spec §4.3): turns a netlist and a device into the
//! netlist graph, the device graph, and the label map, then runs helper
//! inference (voltage-reference splitting, dummy comparator synthesis).

#![warn(missing_docs)]

pub mod builder;
pub mod ids;
pub mod labels;
pub mod netlist;

pub use builder::{
    build_device_graph, build_label_map, build_netlist_edges, build_netlist_nodes,
    run_helper_inference, DeviceGraph, DeviceNode, NetlistGraph, NetlistNode,
};
pub use ids::{CellId, NetId, PortId};
pub use labels::LabelMap;
pub use netlist::{Cell, Direction, Net, NetDriver, Netlist, TopPort};

use gpx_diag::DiagnosticSink;

/// Runs the full graph-construction stage (spec §4.3 steps 1-6): builds
/// the label map, both graphs, and runs helper inference. Returns `None`
/// if any step reports a netlist error to `sink`.
pub fn build_graphs(
    device: &mut gpx_device::Device,
    netlist: &mut Netlist,
    sink: &DiagnosticSink,
) -> Option<(DeviceGraph, NetlistGraph, LabelMap)> {
    let labels = build_label_map(device);

    let mut dgraph = match build_device_graph(device, &labels) {
        Ok(g) => g,
        Err(e) => {
            sink.error(e.to_string());
            return None;
        }
    };
    dgraph.rebuild_label_index();

    let mut ngraph = build_netlist_nodes(netlist, &labels, sink)?;
    if !build_netlist_edges(netlist, &mut ngraph, &labels, sink) {
        return None;
    }
    ngraph.rebuild_label_index();

    if !run_helper_inference(netlist, &mut ngraph, &labels, sink) {
        return None;
    }
    ngraph.rebuild_label_index();

    Some((dgraph, ngraph, labels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpx_device::Device;

    #[test]
    fn build_graphs_succeeds_on_empty_netlist() {
        let (mut device, _) = Device::new("SLG46620V");
        let mut netlist = Netlist::new();
        let sink = DiagnosticSink::default();
        let result = build_graphs(&mut device, &mut netlist, &sink);
        assert!(result.is_some());
        let (dgraph, ngraph, _labels) = result.unwrap();
        assert!(dgraph.num_nodes() > 0);
        assert_eq!(ngraph.num_nodes(), 0);
    }
}
