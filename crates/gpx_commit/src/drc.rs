//! Post-PAR design rule checks (spec §4.6): the last gate before a placement
//! is handed off for bitstream serialization. Every check here mirrors one
//! row of the committed-configuration sanity pass a real placer runs once
//! routing is locked in.

use gpx_builder::{DeviceGraph, NetlistGraph, Netlist};
use gpx_device::{Device, EntityConfig, EntityId, EntityKind};
use gpx_diag::DiagnosticSink;

/// Aggregated result of a full DRC pass.
#[derive(Debug, Default)]
pub struct DrcReport {
    /// `true` iff no check reported an error (warnings do not fail a run).
    pub ok: bool,
}

fn is_in_use(device: &Device, dgraph: &DeviceGraph, entity: EntityId) -> bool {
    device
        .entity(entity)
        .par_node
        .map(|n| dgraph.node(n).mate.is_some())
        .unwrap_or(false)
}

fn source_kind(device: &Device, entity: EntityId, port: &str) -> Option<EntityKind> {
    device.entity(entity).get_input(port).map(|s| device.entity(s.source).kind)
}

/// Check 1: every netlist node must be mated to a device node.
fn check_every_node_mated(ngraph: &NetlistGraph, netlist: &Netlist, sink: &DiagnosticSink) -> bool {
    let mut ok = true;
    for cell in &netlist.cells {
        let Some(node) = cell.node else { continue };
        if ngraph.node(node).mate.is_none() {
            sink.error(format!("cell '{}' was never placed", cell.name));
            ok = false;
        }
    }
    ok
}

/// Check 2: every entity with an output in use must have a load, except
/// power rails, IOB outputs, and entities explicitly exempted by helper
/// inference (`ignore_no_load`, spec §4.3.1 Pass A).
fn check_no_load(device: &Device, dgraph: &DeviceGraph, sink: &DiagnosticSink) -> bool {
    for entity in device.entities() {
        if entity.output_ports.is_empty() || !is_in_use(device, dgraph, entity.id) {
            continue;
        }
        if entity.ignore_no_load || matches!(entity.config, EntityConfig::PowerRail { .. }) {
            continue;
        }
        if matches!(entity.config, EntityConfig::Iob { is_output: true, .. }) {
            continue;
        }
        let has_load = device
            .entities()
            .iter()
            .any(|other| other.inputs.values().any(|sig| sig.source == entity.id));
        if !has_load {
            sink.warning(format!("'{}' drives no load", entity.description));
        }
    }
    true
}

/// Check 3: every I/O buffer in use must have been constrained to a pin.
fn check_iob_has_loc(device: &Device, dgraph: &DeviceGraph, netlist: &Netlist, sink: &DiagnosticSink) -> bool {
    for entity in device.entities_of_kind(EntityKind::Iob) {
        if !is_in_use(device, dgraph, entity) {
            continue;
        }
        let node = device.entity(entity).par_node.unwrap();
        let Some(netlist_node) = dgraph.node(node).mate else { continue };
        let cell = netlist
            .cells
            .iter()
            .find(|c| c.node == Some(netlist_node))
            .expect("mated netlist node always has a backing cell");
        if cell.loc().is_none() {
            sink.warning(format!(
                "'{}' (site '{}') has no LOC constraint; placement is not pin-stable",
                cell.name,
                device.entity(entity).description
            ));
        }
    }
    true
}

fn is_analog_source(device: &Device, entity: EntityId) -> bool {
    matches!(device.entity(entity).kind, EntityKind::Vref | EntityKind::Dac)
}

/// Check 4: a pin driven by an analog source (a voltage reference or DAC)
/// must itself be configured for analog input.
fn check_analog_into_digital_pin(device: &Device, dgraph: &DeviceGraph, sink: &DiagnosticSink) -> bool {
    let mut ok = true;
    for entity in device.entities_of_kind(EntityKind::Iob) {
        if !is_in_use(device, dgraph, entity) {
            continue;
        }
        let Some(signal) = device.entity(entity).get_input("IN") else { continue };
        if is_analog_source(device, signal.source) {
            let analog_input = matches!(device.entity(entity).config, EntityConfig::Iob { analog_input: true, .. });
            if !analog_input {
                sink.error(format!(
                    "'{}' is driven by analog source '{}' but is not configured for analog input",
                    device.entity(entity).description,
                    device.entity(signal.source).description
                ));
                ok = false;
            }
        }
    }
    ok
}

/// Check 5: comparators, analog buffers, and PGAs must read from a pad in
/// analog mode.
fn check_analog_blocks_from_analog_pad(device: &Device, dgraph: &DeviceGraph, sink: &DiagnosticSink) -> bool {
    let mut ok = true;
    for kind in [EntityKind::Acmp, EntityKind::Abuf, EntityKind::Pga] {
        for entity in device.entities_of_kind(kind) {
            if !is_in_use(device, dgraph, entity) {
                continue;
            }
            let Some(signal) = device.entity(entity).get_input("IN") else { continue };
            if device.entity(signal.source).kind != EntityKind::Iob {
                continue;
            }
            let analog_input =
                matches!(device.entity(signal.source).config, EntityConfig::Iob { analog_input: true, .. });
            if !analog_input {
                sink.error(format!(
                    "'{}' reads pad '{}' which is not in analog mode",
                    device.entity(entity).description,
                    device.entity(signal.source).description
                ));
                ok = false;
            }
        }
    }
    ok
}

/// Check 6: comparators sharing the device's single ACMP0 input mux must
/// agree on its selector. With at most one `GP_DCMPMUX` entity ever
/// instantiated (`device.rs`'s `from_counts`), there is at most one selector
/// value in play, so this check is structurally satisfied; it stays in
/// place (and is exercised by tests) against the day a device model with
/// more than one shared mux is added.
fn check_shared_acmp0_mux(device: &Device, dgraph: &DeviceGraph, sink: &DiagnosticSink) -> bool {
    for entity in device.entities_of_kind(EntityKind::DcmpMux) {
        if !is_in_use(device, dgraph, entity) {
            continue;
        }
        let in0 = source_kind(device, entity, "IN0");
        let in1 = source_kind(device, entity, "IN1");
        if in0.is_some() && in1.is_some() && in0 != in1 {
            sink.notice(format!(
                "shared input mux '{}' selects between heterogeneous sources; resolved in favor of IN0 at commit",
                device.entity(entity).description
            ));
        }
    }
    true
}

fn power_down_source_of(entity: &gpx_device::Entity) -> Option<&str> {
    match &entity.config {
        EntityConfig::Oscillator { power_down_source, .. } => power_down_source.as_deref(),
        EntityConfig::Dcmp { power_down_source } => power_down_source.as_deref(),
        _ => None,
    }
}

/// Checks 7 and 8: every oscillator (resp. digital comparator) with
/// power-down wired must share the same power-down source as every other
/// one that has it wired.
fn check_shared_power_down(device: &Device, dgraph: &DeviceGraph, kinds: &[EntityKind], sink: &DiagnosticSink) -> bool {
    let mut seen: Option<&str> = None;
    let mut ok = true;
    for &kind in kinds {
        for entity in device.entities_of_kind(kind) {
            if !is_in_use(device, dgraph, entity) {
                continue;
            }
            let Some(source) = power_down_source_of(device.entity(entity)) else { continue };
            match seen {
                None => seen = Some(source),
                Some(existing) if existing == source => {}
                Some(_) => {
                    sink.error(format!(
                        "'{}' powers down from a different source than other entities of its kind; all must share one",
                        device.entity(entity).description
                    ));
                    ok = false;
                }
            }
        }
    }
    ok
}

/// Check 9: on the parts with both a second DAC and a PGA, routing both at
/// once (or DAC0 alongside a PGA in pseudo-differential mode) overloads the
/// shared analog mux. Tracked conservatively: any simultaneous DAC + PGA use
/// on those parts is flagged, without distinguishing pseudo-differential
/// mode (no such mode is modeled on `EntityConfig::Pga`; see `DESIGN.md`).
fn check_dac_pga_hazard(device: &Device, dgraph: &DeviceGraph, sink: &DiagnosticSink) -> bool {
    if !matches!(device.part(), "SLG46620V" | "SLG46621V") {
        return true;
    }
    let dac_in_use = device.entities_of_kind(EntityKind::Dac).into_iter().any(|e| is_in_use(device, dgraph, e));
    let pga_in_use = device.entities_of_kind(EntityKind::Pga).into_iter().any(|e| is_in_use(device, dgraph, e));
    if dac_in_use && pga_in_use {
        sink.error(format!(
            "{}: DAC and PGA cannot be used simultaneously (shared analog resource)",
            device.part()
        ));
        return false;
    }
    true
}

/// Check 10: the power-on reset generator must drive only the device's
/// dedicated reset pin, if this part names one. Parts without a known
/// dedicated reset pin silently skip the check.
fn check_por_dedicated_pin(device: &Device, dgraph: &DeviceGraph, sink: &DiagnosticSink) -> bool {
    let dedicated_reset_site = match device.part() {
        "SLG46620V" | "SLG46621V" => Some("IOB_0"),
        _ => None,
    };
    let Some(dedicated_reset_site) = dedicated_reset_site else {
        return true;
    };
    let Some(por) = device.entities_of_kind(EntityKind::PowerOnReset).into_iter().next() else {
        return true;
    };
    if !is_in_use(device, dgraph, por) {
        return true;
    }
    for iob in device.entities_of_kind(EntityKind::Iob) {
        if !is_in_use(device, dgraph, iob) {
            continue;
        }
        if source_kind(device, iob, "IN") != Some(EntityKind::PowerOnReset) {
            continue;
        }
        if device.entity(iob).description != dedicated_reset_site {
            sink.warning(format!(
                "power-on reset drives '{}', not the dedicated reset pin '{dedicated_reset_site}'",
                device.entity(iob).description
            ));
        }
    }
    true
}

/// Check 11: a design using the power detector requires the on-chip charge
/// pump to remain enabled.
fn check_power_detector_charge_pump(device: &Device, dgraph: &DeviceGraph, sink: &DiagnosticSink) -> bool {
    let Some(detector) = device.power_detector() else { return true };
    if !is_in_use(device, dgraph, detector) {
        return true;
    }
    if !device.charge_pump_enabled() {
        sink.error("power detector is in use but the charge pump is disabled");
        return false;
    }
    true
}

/// Runs every post-PAR DRC check and aggregates the result (spec §4.6).
pub fn run_drc(
    netlist: &Netlist,
    ngraph: &NetlistGraph,
    dgraph: &DeviceGraph,
    device: &Device,
    sink: &DiagnosticSink,
) -> DrcReport {
    let mut ok = true;
    ok &= check_every_node_mated(ngraph, netlist, sink);
    ok &= check_no_load(device, dgraph, sink);
    ok &= check_iob_has_loc(device, dgraph, netlist, sink);
    ok &= check_analog_into_digital_pin(device, dgraph, sink);
    ok &= check_analog_blocks_from_analog_pad(device, dgraph, sink);
    ok &= check_shared_acmp0_mux(device, dgraph, sink);
    ok &= check_shared_power_down(
        device,
        dgraph,
        &[EntityKind::LfOscillator, EntityKind::RingOscillator, EntityKind::RcOscillator],
        sink,
    );
    ok &= check_shared_power_down(device, dgraph, &[EntityKind::Dcmp], sink);
    ok &= check_dac_pga_hazard(device, dgraph, sink);
    ok &= check_por_dedicated_pin(device, dgraph, sink);
    ok &= check_power_detector_charge_pump(device, dgraph, sink);
    DrcReport { ok }
}
