//! The driver surface (spec §6.3): a single entry point running the full
//! place-and-route pipeline `build_graphs → apply_loc/sequential_fill →
//! anneal → commit → drc` over an injected diagnostic sink.

#![warn(missing_docs)]

use gpx_builder::{build_graphs, Netlist};
use gpx_commit::{commit, run_drc};
use gpx_config::RunConfig;
use gpx_device::Device;
use gpx_diag::DiagnosticSink;
use gpx_par::{anneal, initial_place};

/// Runs place-and-route to completion. Returns `true` iff every stage
/// succeeded and the final configuration passed DRC without errors.
///
/// On success `device` carries the committed configuration. On failure
/// `device` carries a best-effort partial placement (spec §7: "no partial
/// rollback is required") and the caller is expected to discard it.
pub fn do_par(netlist: &mut Netlist, device: &mut Device, config: &RunConfig, sink: &DiagnosticSink) -> bool {
    if config.anneal.seed.is_none() {
        sink.error("run configuration is missing the required annealer seed");
        return false;
    }

    let Some((mut dgraph, mut ngraph, labels)) = build_graphs(device, netlist, sink) else {
        return false;
    };

    if !initial_place(netlist, &mut ngraph, &mut dgraph, device, &labels, sink) {
        return false;
    }

    let anneal_result = anneal(netlist, &mut ngraph, &mut dgraph, device, &config.anneal, sink);
    if anneal_result.final_cost > 0 {
        for edge in &anneal_result.unroutable_edges {
            sink.warning(format!(
                "unroutable: no path from netlist node {:?}.{} to {:?}.{}",
                edge.source, edge.source_port, edge.dest, edge.dest_port
            ));
        }
    }

    if !commit(netlist, &ngraph, &dgraph, device, sink) {
        return false;
    }

    let report = run_drc(netlist, &ngraph, &dgraph, device, sink);
    report.ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpx_builder::ids::{CellId, NetId};
    use gpx_builder::{Cell, Net, NetDriver};
    use gpx_config::{AnnealConfig, DeviceConfig, LoggingConfig};
    use gpx_device::EntityConfig;

    fn run_config() -> RunConfig {
        RunConfig {
            device: DeviceConfig { part: "SLG46620V".to_string() },
            anneal: AnnealConfig {
                seed: Some(1),
                cooling_rate: 0.9,
                min_temperature: 0.01,
                moves_per_temp_multiplier: 4,
                initial_temp_scale: 2.0,
            },
            logging: LoggingConfig::default(),
        }
    }

    fn ibuf(id: u32, name: &str, loc: &str, out_net: NetId) -> Cell {
        let mut c = Cell {
            id: CellId::from_raw(id),
            name: name.to_string(),
            type_name: "GP_IBUF".to_string(),
            params: Default::default(),
            attrs: Default::default(),
            connections: Default::default(),
            node: None,
        };
        c.attrs.insert("LOC".to_string(), loc.to_string());
        c.connections.insert("OUT".to_string(), vec![Some(out_net)]);
        c
    }

    fn obuf(id: u32, name: &str, loc: &str, in_net: NetId) -> Cell {
        let mut c = Cell {
            id: CellId::from_raw(id),
            name: name.to_string(),
            type_name: "GP_OBUF".to_string(),
            params: Default::default(),
            attrs: Default::default(),
            connections: Default::default(),
            node: None,
        };
        c.attrs.insert("LOC".to_string(), loc.to_string());
        c.connections.insert("IN".to_string(), vec![Some(in_net)]);
        c
    }

    fn or_lut(id: u32, name: &str, a: NetId, b: NetId, y: NetId) -> Cell {
        let mut c = Cell {
            id: CellId::from_raw(id),
            name: name.to_string(),
            type_name: "GP_2LUT".to_string(),
            params: Default::default(),
            attrs: Default::default(),
            connections: Default::default(),
            node: None,
        };
        c.params.insert("INIT".to_string(), "14".to_string());
        c.connections.insert("IN0".to_string(), vec![Some(a)]);
        c.connections.insert("IN1".to_string(), vec![Some(b)]);
        c.connections.insert("OUT".to_string(), vec![Some(y)]);
        c
    }

    /// Scenario 1 (spec §8): trivial OR-to-pin, no LOCs forcing a matrix
    /// split, so the LUT should land unconstrained and commit should need
    /// no cross-connection.
    #[test]
    fn trivial_or_to_pin_places_and_commits() {
        let (mut device, _) = Device::new("SLG46620V");
        let mut netlist = Netlist::new();
        let (a, b, y) = (NetId::from_raw(0), NetId::from_raw(1), NetId::from_raw(2));

        netlist.add_cell(ibuf(0, "u_a", "IOB_2", a));
        netlist.add_cell(ibuf(1, "u_b", "IOB_3", b));
        netlist.add_cell(or_lut(2, "u_or", a, b, y));
        netlist.add_cell(obuf(3, "u_y", "IOB_5", y));

        netlist.add_net(Net {
            id: a,
            name: "a".to_string(),
            driver: Some(NetDriver::Cell(CellId::from_raw(0), "OUT".to_string(), 0)),
            loads: vec![(CellId::from_raw(2), "IN0".to_string(), 0)],
        });
        netlist.add_net(Net {
            id: b,
            name: "b".to_string(),
            driver: Some(NetDriver::Cell(CellId::from_raw(1), "OUT".to_string(), 0)),
            loads: vec![(CellId::from_raw(2), "IN1".to_string(), 0)],
        });
        netlist.add_net(Net {
            id: y,
            name: "y".to_string(),
            driver: Some(NetDriver::Cell(CellId::from_raw(2), "OUT".to_string(), 0)),
            loads: vec![(CellId::from_raw(3), "IN".to_string(), 0)],
        });

        let sink = DiagnosticSink::default();
        let ok = do_par(&mut netlist, &mut device, &run_config(), &sink);
        assert!(ok, "diagnostics: {:?}", sink.diagnostics());

        let lut_node = netlist.cell(CellId::from_raw(2)).node.unwrap();
        // Re-derive the device graph's mate via the netlist side is not
        // possible post-hoc without the graphs, so the truth table is
        // checked through the device's entity list directly: the LUT
        // configured as OR must carry the truth table for OR over two
        // inputs (0,1,1,1).
        let _ = lut_node;
        let found_or = device.entities_of_kind(gpx_device::EntityKind::Lut2).into_iter().any(|id| {
            matches!(&device.entity(id).config, EntityConfig::Lut { truth_table } if *truth_table == vec![false, true, true, true])
        });
        assert!(found_or);
    }

    /// Scenario 3 (spec §8): two cells LOC'd to the same site must fail
    /// `do_par` and name both cells in the diagnostic.
    #[test]
    fn conflicting_loc_fails_do_par() {
        let (mut device, _) = Device::new("SLG46620V");
        let mut netlist = Netlist::new();
        let (a, b) = (NetId::from_raw(0), NetId::from_raw(1));
        netlist.add_cell(ibuf(0, "u_a", "IOB_2", a));
        netlist.add_cell(ibuf(1, "u_b", "IOB_2", b));
        netlist.add_net(Net {
            id: a,
            name: "a".to_string(),
            driver: Some(NetDriver::Cell(CellId::from_raw(0), "OUT".to_string(), 0)),
            loads: vec![],
        });
        netlist.add_net(Net {
            id: b,
            name: "b".to_string(),
            driver: Some(NetDriver::Cell(CellId::from_raw(1), "OUT".to_string(), 0)),
            loads: vec![],
        });

        let sink = DiagnosticSink::default();
        let ok = do_par(&mut netlist, &mut device, &run_config(), &sink);
        assert!(!ok);
        assert!(sink.diagnostics().iter().any(|d| d.message.contains("u_a") && d.message.contains("u_b")));
    }

    /// Scenario 4 (spec §8): more 14-bit counters than the device provides
    /// must fail with a message naming the exhausted type.
    #[test]
    fn counter_exhaustion_fails_with_named_type() {
        let (mut device, _) = Device::new("SLG46620V");
        let mut netlist = Netlist::new();
        // SLG46620V has 2 GP_COUNT14 sites; instantiate 3.
        for i in 0..3u32 {
            let mut c = Cell {
                id: CellId::from_raw(i),
                name: format!("u_ctr{i}"),
                type_name: "GP_COUNT14".to_string(),
                params: Default::default(),
                attrs: Default::default(),
                connections: Default::default(),
                node: None,
            };
            c.params.insert("COUNT".to_string(), "100".to_string());
            netlist.add_cell(c);
        }

        let sink = DiagnosticSink::default();
        let ok = do_par(&mut netlist, &mut device, &run_config(), &sink);
        assert!(!ok);
        assert!(sink.diagnostics().iter().any(|d| d.message.contains("GP_COUNT14")));
    }

    /// Scenario 6 (spec §8): a voltage reference driving an output buffer
    /// with no comparator of its own gets a synthesized dummy comparator
    /// that DRC must not warn about.
    #[test]
    fn vref_into_obuf_synthesizes_ignored_dummy_comparator() {
        let (mut device, _) = Device::new("SLG46620V");
        let mut netlist = Netlist::new();
        let vref_out = NetId::from_raw(0);

        let vref = Cell {
            id: CellId::from_raw(0),
            name: "u_vref".to_string(),
            type_name: "GP_VREF".to_string(),
            params: Default::default(),
            attrs: Default::default(),
            connections: Default::default(),
            node: None,
        };
        netlist.add_cell(vref);
        netlist.cell_mut(CellId::from_raw(0)).connections.insert("OUT".to_string(), vec![Some(vref_out)]);
        netlist.add_cell(obuf(1, "u_out", "IOB_5", vref_out));

        netlist.add_net(Net {
            id: vref_out,
            name: "vref_out".to_string(),
            driver: Some(NetDriver::Cell(CellId::from_raw(0), "OUT".to_string(), 0)),
            loads: vec![(CellId::from_raw(1), "IN".to_string(), 0)],
        });

        let sink = DiagnosticSink::default();
        let ok = do_par(&mut netlist, &mut device, &run_config(), &sink);
        assert!(ok, "diagnostics: {:?}", sink.diagnostics());

        let dummy = netlist.cells.iter().find(|c| c.name.contains("DUMMY_ACMP"));
        assert!(dummy.is_some());
        assert!(!sink.diagnostics().iter().any(|d| d.severity == gpx_diag::Severity::Warning && d.message.contains("DUMMY_ACMP")));
    }

    /// Scenario 2 (spec §8): LOCs split the OR gate's two inputs onto
    /// matrix 0 and its output onto matrix 1, so no placement of the LUT
    /// avoids at least one cross-matrix edge. `do_par` must still commit,
    /// routing that edge through exactly one matrix-0 cross-connection.
    #[test]
    fn forced_cross_matrix_split_allocates_one_cross_connection() {
        let (mut device, _) = Device::new("SLG46620V");
        let mut netlist = Netlist::new();
        let (a, b, y) = (NetId::from_raw(0), NetId::from_raw(1), NetId::from_raw(2));

        // IOB_2 and IOB_4 are both on matrix 0 (even index); IOB_1 is on
        // matrix 1 (odd index).
        netlist.add_cell(ibuf(0, "u_a", "IOB_2", a));
        netlist.add_cell(ibuf(1, "u_b", "IOB_4", b));
        netlist.add_cell(or_lut(2, "u_or", a, b, y));
        netlist.add_cell(obuf(3, "u_y", "IOB_1", y));

        netlist.add_net(Net {
            id: a,
            name: "a".to_string(),
            driver: Some(NetDriver::Cell(CellId::from_raw(0), "OUT".to_string(), 0)),
            loads: vec![(CellId::from_raw(2), "IN0".to_string(), 0)],
        });
        netlist.add_net(Net {
            id: b,
            name: "b".to_string(),
            driver: Some(NetDriver::Cell(CellId::from_raw(1), "OUT".to_string(), 0)),
            loads: vec![(CellId::from_raw(2), "IN1".to_string(), 0)],
        });
        netlist.add_net(Net {
            id: y,
            name: "y".to_string(),
            driver: Some(NetDriver::Cell(CellId::from_raw(2), "OUT".to_string(), 0)),
            loads: vec![(CellId::from_raw(3), "IN".to_string(), 0)],
        });

        let sink = DiagnosticSink::default();
        let ok = do_par(&mut netlist, &mut device, &run_config(), &sink);
        assert!(ok, "diagnostics: {:?}", sink.diagnostics());

        let used_on_matrix = |matrix: u8| {
            device
                .entities_of_kind(gpx_device::EntityKind::CrossConnection)
                .into_iter()
                .filter(|&id| device.entity(id).matrix == matrix && device.entity(id).get_input("IN").is_some())
                .count()
        };
        assert_eq!(used_on_matrix(0), 1);
        assert_eq!(used_on_matrix(1), 0);
    }

    /// Scenario 5 (spec §8): a single `GP_VREF` driving both a `GP_ACMP` and
    /// a `GP_DAC` is split by helper inference (spec §4.3.1 Pass B) into two
    /// `GP_VREF` cells, so the DAC and the comparator end up pointing at
    /// different device voltage references after placement, and DRC passes.
    #[test]
    fn vref_shared_by_acmp_and_dac_is_split_into_two_references() {
        let (mut device, _) = Device::new("SLG46620V");
        let mut netlist = Netlist::new();
        let vref_out = NetId::from_raw(0);

        let mut vref = Cell {
            id: CellId::from_raw(0),
            name: "u_vref".to_string(),
            type_name: "GP_VREF".to_string(),
            params: Default::default(),
            attrs: Default::default(),
            connections: Default::default(),
            node: None,
        };
        vref.connections.insert("OUT".to_string(), vec![Some(vref_out)]);
        netlist.add_cell(vref);

        let mut acmp = Cell {
            id: CellId::from_raw(1),
            name: "u_acmp".to_string(),
            type_name: "GP_ACMP".to_string(),
            params: Default::default(),
            attrs: Default::default(),
            connections: Default::default(),
            node: None,
        };
        acmp.connections.insert("VREF".to_string(), vec![Some(vref_out)]);
        netlist.add_cell(acmp);

        let mut dac = Cell {
            id: CellId::from_raw(2),
            name: "u_dac".to_string(),
            type_name: "GP_DAC".to_string(),
            params: Default::default(),
            attrs: Default::default(),
            connections: Default::default(),
            node: None,
        };
        dac.connections.insert("VREF".to_string(), vec![Some(vref_out)]);
        netlist.add_cell(dac);

        netlist.add_net(Net {
            id: vref_out,
            name: "vref_out".to_string(),
            driver: Some(NetDriver::Cell(CellId::from_raw(0), "OUT".to_string(), 0)),
            loads: vec![
                (CellId::from_raw(1), "VREF".to_string(), 0),
                (CellId::from_raw(2), "VREF".to_string(), 0),
            ],
        });

        let sink = DiagnosticSink::default();
        let ok = do_par(&mut netlist, &mut device, &run_config(), &sink);
        assert!(ok, "diagnostics: {:?}", sink.diagnostics());

        let vref_cells: Vec<_> = netlist.cells.iter().filter(|c| c.type_name == "GP_VREF").collect();
        assert_eq!(vref_cells.len(), 2, "helper inference must clone the shared VREF");

        // Only one ACMP and one DAC site end up wired in this design, so
        // the wired one is unambiguous without needing the (internal,
        // not returned) netlist/device graphs to re-derive the mating.
        let acmp_vref = device
            .entities_of_kind(gpx_device::EntityKind::Acmp)
            .into_iter()
            .find_map(|id| device.entity(id).get_input("VREF"))
            .expect("ACMP VREF must be wired")
            .source;
        let dac_vref = device
            .entities_of_kind(gpx_device::EntityKind::Dac)
            .into_iter()
            .find_map(|id| device.entity(id).get_input("VREF"))
            .expect("DAC VREF must be wired")
            .source;
        assert_ne!(acmp_vref, dac_vref, "ACMP and DAC must resolve to distinct device VREFs");
    }

    #[test]
    fn missing_seed_is_rejected_before_any_stage_runs() {
        let (mut device, _) = Device::new("SLG46620V");
        let mut netlist = Netlist::new();
        let mut config = run_config();
        config.anneal.seed = None;
        let sink = DiagnosticSink::default();
        assert!(!do_par(&mut netlist, &mut device, &config, &sink));
        assert_eq!(sink.error_count(), 1);
    }

    #[test]
    fn do_par_is_deterministic_for_a_fixed_seed() {
        let (mut device_a, _) = Device::new("SLG46620V");
        let (mut device_b, _) = Device::new("SLG46620V");
        let mut netlist_a = Netlist::new();
        let mut netlist_b = Netlist::new();
        let (a, b, y) = (NetId::from_raw(0), NetId::from_raw(1), NetId::from_raw(2));
        for netlist in [&mut netlist_a, &mut netlist_b] {
            netlist.add_cell(ibuf(0, "u_a", "IOB_2", a));
            netlist.add_cell(ibuf(1, "u_b", "IOB_3", b));
            netlist.add_cell(or_lut(2, "u_or", a, b, y));
            netlist.add_cell(obuf(3, "u_y", "IOB_5", y));
            netlist.add_net(Net {
                id: a,
                name: "a".to_string(),
                driver: Some(NetDriver::Cell(CellId::from_raw(0), "OUT".to_string(), 0)),
                loads: vec![(CellId::from_raw(2), "IN0".to_string(), 0)],
            });
            netlist.add_net(Net {
                id: b,
                name: "b".to_string(),
                driver: Some(NetDriver::Cell(CellId::from_raw(1), "OUT".to_string(), 0)),
                loads: vec![(CellId::from_raw(2), "IN1".to_string(), 0)],
            });
            netlist.add_net(Net {
                id: y,
                name: "y".to_string(),
                driver: Some(NetDriver::Cell(CellId::from_raw(2), "OUT".to_string(), 0)),
                loads: vec![(CellId::from_raw(3), "IN".to_string(), 0)],
            });
        }

        let sink_a = DiagnosticSink::default();
        let sink_b = DiagnosticSink::default();
        assert!(do_par(&mut netlist_a, &mut device_a, &run_config(), &sink_a));
        assert!(do_par(&mut netlist_b, &mut device_b, &run_config(), &sink_b));

        let json_a = serde_json::to_string(device_a.entities()).unwrap();
        let json_b = serde_json::to_string(device_b.entities()).unwrap();
        assert_eq!(json_a, json_b);
    }
}
