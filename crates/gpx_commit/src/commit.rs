//! Commit and route allocation (spec §4.5): transfers placement decisions
//! into concrete entity configuration, then wires every netlist edge to the
//! device entity input it resolves to, allocating cross-connections as
//! needed.

use gpx_builder::{Cell, DeviceGraph, NetlistGraph, Netlist};
use gpx_device::{Device, EntityConfig, EntityId, EntityKind, Signal};
use gpx_diag::DiagnosticSink;
use std::collections::HashMap;

/// Step 1 (spec §4.5): for every mated netlist cell, copy its parameters
/// into its device entity's configuration. Dispatch is a `match` on the
/// entity's kind rather than the original's chain of downcasts (spec §9).
pub fn commit_changes(
    netlist: &Netlist,
    ngraph: &NetlistGraph,
    dgraph: &DeviceGraph,
    device: &mut Device,
    sink: &DiagnosticSink,
) -> bool {
    for node in ngraph.node_ids() {
        let Some(device_node) = ngraph.node(node).mate else {
            continue;
        };
        let cell = netlist.cell(ngraph.node(node).userdata.cell);
        let entity_id = dgraph.node(device_node).userdata.entity;

        if cell.attrs.get("ignore_no_load").map(String::as_str) == Some("1") {
            device.entity_mut(entity_id).ignore_no_load = true;
        }

        commit_one(cell, entity_id, device, sink);
    }
    true
}

fn commit_one(cell: &Cell, entity_id: EntityId, device: &mut Device, sink: &DiagnosticSink) {
    let kind = device.entity(entity_id).kind;
    match kind {
        EntityKind::Lut2 | EntityKind::Lut3 | EntityKind::Lut4 => {
            if let Some(init) = cell.params.get("INIT") {
                commit_lut_init(init, entity_id, device, sink, &cell.name);
            }
        }
        EntityKind::Dff => {
            let init_value = cell.params.get("INIT").map(|v| v == "1").unwrap_or(false);
            device.entity_mut(entity_id).config = EntityConfig::Dff { init_value };
        }
        EntityKind::Counter8 | EntityKind::Counter14 => {
            let divisor = match cell.params.get("COUNT") {
                Some(v) => match v.parse::<u32>() {
                    Ok(n) => n,
                    Err(_) => {
                        sink.warning(format!(
                            "cell '{}' has non-numeric COUNT parameter '{v}'; ignoring",
                            cell.name
                        ));
                        2
                    }
                },
                None => 2,
            };
            let fsm_extended =
                kind == EntityKind::Counter14 && cell.attrs.get("FSM_MODE").map(String::as_str) == Some("1");
            device.entity_mut(entity_id).config = EntityConfig::Counter { divisor, fsm_extended };
        }
        EntityKind::LfOscillator | EntityKind::RingOscillator | EntityKind::RcOscillator => {
            let enabled = cell.attrs.get("DISABLE").map(String::as_str) != Some("1");
            let existing_power_down_source = match &device.entity(entity_id).config {
                EntityConfig::Oscillator { power_down_source, .. } => power_down_source.clone(),
                _ => None,
            };
            device.entity_mut(entity_id).config = EntityConfig::Oscillator {
                enabled,
                power_down_source: existing_power_down_source,
            };
        }
        EntityKind::Iob => {
            let is_output = matches!(cell.type_name.as_str(), "GP_OBUF" | "GP_IOBUF");
            let analog_input = cell.attrs.get("ANALOG_IN").map(String::as_str) == Some("1");
            device.entity_mut(entity_id).config = EntityConfig::Iob { is_output, analog_input };
        }
        EntityKind::Dac => {
            let value = cell
                .params
                .get("VALUE")
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(0);
            device.entity_mut(entity_id).config = EntityConfig::Dac { value };
        }
        EntityKind::DcmpMux => {
            let selector = cell.params.get("SEL").and_then(|v| v.parse::<u32>().ok());
            device.entity_mut(entity_id).config = EntityConfig::AcmpMux { selector };
        }
        EntityKind::Dcmp => {
            if cell.attrs.get("DISABLE_CHARGE_PUMP").map(String::as_str) == Some("1") {
                device.set_charge_pump_enabled(false);
            }
        }
        // Power rails, voltage references, reset generators, comparators,
        // analog buffers, clock buffers, delays, shift registers, and
        // cross-connections carry no committable cell parameters.
        EntityKind::Vref
        | EntityKind::Acmp
        | EntityKind::Abuf
        | EntityKind::Pga
        | EntityKind::DcmpRef
        | EntityKind::ClockBuffer
        | EntityKind::Delay
        | EntityKind::ShiftRegister
        | EntityKind::Inverter
        | EntityKind::PowerOnReset
        | EntityKind::SystemReset
        | EntityKind::PowerRail
        | EntityKind::CrossConnection
        | EntityKind::Bandgap => {}
    }
}

fn commit_lut_init(init: &str, entity_id: EntityId, device: &mut Device, sink: &DiagnosticSink, cell_name: &str) {
    let table_len = match &device.entity(entity_id).config {
        EntityConfig::Lut { truth_table } => truth_table.len(),
        _ => return,
    };
    let Ok(bits) = init.parse::<u64>() else {
        sink.warning(format!(
            "cell '{cell_name}' has non-numeric INIT parameter '{init}'; ignoring"
        ));
        return;
    };
    let truth_table = (0..table_len).map(|i| (bits >> i) & 1 != 0).collect();
    device.entity_mut(entity_id).config = EntityConfig::Lut { truth_table };
}

/// Per-source cache for cross-connection allocation (spec §4.5 step 3),
/// mirroring the original's `nodemap`.
struct CrossConnectionCache {
    by_source: HashMap<EntityId, EntityId>,
    next_slot: [u32; 2],
}

impl CrossConnectionCache {
    fn new() -> Self {
        Self {
            by_source: HashMap::new(),
            next_slot: [0, 0],
        }
    }

    /// Returns the cross-connection entity carrying `source`'s signal off
    /// its matrix, allocating a fresh one if `source` has not been routed
    /// across before. `Err` once the matrix's slots are exhausted.
    fn get_or_allocate(
        &mut self,
        source: EntityId,
        source_port: &str,
        device: &mut Device,
    ) -> Result<EntityId, ()> {
        if let Some(&xconn) = self.by_source.get(&source) {
            return Ok(xconn);
        }
        let matrix = device.entity(source).matrix;
        let slot = self.next_slot[matrix as usize];
        if slot >= device.cross_connections_per_matrix() {
            return Err(());
        }
        self.next_slot[matrix as usize] += 1;
        let xconn = device
            .cross_connection(matrix, slot)
            .expect("slot bound checked against cross_connections_per_matrix");
        device
            .entity_mut(xconn)
            .set_input("IN", Signal::new(source, source_port.to_string()));
        self.by_source.insert(source, xconn);
        Ok(xconn)
    }
}

/// Steps 2-4 (spec §4.5): wires every netlist edge's mated endpoints,
/// substituting duals and allocating cross-connections as required, then
/// dispatching on the destination entity's known input ports.
pub fn commit_routing(
    netlist: &Netlist,
    ngraph: &NetlistGraph,
    dgraph: &DeviceGraph,
    device: &mut Device,
    sink: &DiagnosticSink,
) -> bool {
    let mut cache = CrossConnectionCache::new();

    for node in ngraph.node_ids() {
        let Some(source_device_node) = ngraph.node(node).mate else {
            continue;
        };
        let source_entity_id = dgraph.node(source_device_node).userdata.entity;

        for edge in ngraph.edges(node) {
            let Some(dest_device_node) = ngraph.node(edge.dest).mate else {
                continue;
            };
            let dest_entity_id = dgraph.node(dest_device_node).userdata.entity;

            let source_matrix = device.entity(source_entity_id).matrix;
            let dest_matrix = device.entity(dest_entity_id).matrix;

            let (effective_source, effective_port) = if source_matrix == dest_matrix {
                (source_entity_id, edge.source_port.clone())
            } else if let Some(dual) = device.entity(source_entity_id).dual {
                (dual, edge.source_port.clone())
            } else {
                match cache.get_or_allocate(source_entity_id, &edge.source_port, device) {
                    Ok(xconn) => (xconn, "OUT".to_string()),
                    Err(()) => {
                        sink.error(format!(
                            "out of cross-connection resources on matrix {source_matrix}: more than 100% of device resources are used routing '{}'",
                            device.entity(source_entity_id).description
                        ));
                        return false;
                    }
                }
            };

            let dest = device.entity(dest_entity_id);
            let port_known = dest.is_general_fabric_input(&edge.dest_port)
                || dest.dedicated_input_ports.iter().any(|p| p == &edge.dest_port);
            if !port_known {
                sink.warning(format!(
                    "ignoring connection to unknown input '{}' on '{}'",
                    edge.dest_port, dest.description
                ));
                continue;
            }

            let signal = Signal::new(effective_source, effective_port);
            device.entity_mut(dest_entity_id).set_input(edge.dest_port.clone(), signal);

            if edge.dest_port == "PWRDN" {
                let source_desc = device.entity(effective_source).description.clone();
                match &mut device.entity_mut(dest_entity_id).config {
                    EntityConfig::Oscillator { power_down_source, .. } => *power_down_source = Some(source_desc),
                    EntityConfig::Dcmp { power_down_source } => *power_down_source = Some(source_desc),
                    _ => {}
                }
            }
        }
    }
    true
}

/// Runs the full commit stage in order (spec §4.5).
pub fn commit(
    netlist: &Netlist,
    ngraph: &NetlistGraph,
    dgraph: &DeviceGraph,
    device: &mut Device,
    sink: &DiagnosticSink,
) -> bool {
    commit_changes(netlist, ngraph, dgraph, device, sink) && commit_routing(netlist, ngraph, dgraph, device, sink)
}
