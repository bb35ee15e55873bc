//! Construction and flat enumeration of a GreenPAK-class device (spec §4.2).

use crate::entity::{Entity, EntityConfig, EntityKind};
use crate::ids::EntityId;
use crate::parts::{lookup, PartCounts};
use gpx_common::{ParError, ParResult};

/// One of the two routing regions every device entity belongs to.
pub type Matrix = u8;

/// A hard-wired, non-general-fabric edge the graph builder must install
/// verbatim (spec §3.3 "dedicated edges", §4.2.1).
#[derive(Clone, Copy, Debug)]
pub struct DedicatedEdge {
    /// Source entity.
    pub source: EntityId,
    /// Source output port name.
    pub source_port: &'static str,
    /// Destination entity.
    pub dest: EntityId,
    /// Destination (dedicated) input port name.
    pub dest_port: &'static str,
}

/// A fully constructed device: a fixed, flat arena of entities plus the
/// dedicated edges the builder must install on top of the general fabric.
#[derive(Clone, Debug)]
pub struct Device {
    part: String,
    exact_part_match: bool,
    entities: Vec<Entity>,
    dedicated: Vec<DedicatedEdge>,
    cross_connections_per_matrix: u32,
    charge_pump_enabled: bool,
    iobs: Vec<EntityId>,
    lut2: Vec<EntityId>,
    lut3: Vec<EntityId>,
    lut4: Vec<EntityId>,
    flipflops: Vec<EntityId>,
    shift_registers: Vec<EntityId>,
    counters: Vec<EntityId>,
    inverters: Vec<EntityId>,
    vrefs: Vec<EntityId>,
    acmps: Vec<EntityId>,
    dacs: Vec<EntityId>,
    dcmps: Vec<EntityId>,
    dcmp_refs: Vec<EntityId>,
    dcmp_mux: Option<EntityId>,
    clock_buffers: Vec<EntityId>,
    delays: Vec<EntityId>,
    lf_oscillator: EntityId,
    ring_oscillator: EntityId,
    rc_oscillator: EntityId,
    power_on_reset: EntityId,
    system_reset: EntityId,
    bandgap: EntityId,
    abuf: Option<EntityId>,
    pga: Option<EntityId>,
}

struct Builder {
    entities: Vec<Entity>,
    dedicated: Vec<DedicatedEdge>,
}

impl Builder {
    fn push(&mut self, kind: EntityKind, description: String, matrix: Matrix) -> EntityId {
        let id = EntityId::from_raw(self.entities.len() as u32);
        let (input_ports, output_ports, dedicated_input_ports, power_rail_ports, config) =
            port_template(kind);
        self.entities.push(Entity {
            id,
            kind,
            description,
            matrix,
            dual: None,
            is_dual: false,
            par_node: None,
            output_ports,
            input_ports,
            dedicated_input_ports,
            power_rail_ports,
            inputs: Default::default(),
            config,
            ignore_no_load: false,
        });
        id
    }

    fn push_range(
        &mut self,
        kind: EntityKind,
        prefix: &str,
        count: u32,
    ) -> Vec<EntityId> {
        (0..count)
            .map(|i| {
                let matrix = (i % 2) as Matrix;
                self.push(kind, format!("{prefix}_{i}"), matrix)
            })
            .collect()
    }
}

/// Returns `(general_fabric_inputs, general_fabric_outputs, dedicated_inputs,
/// power_rail_inputs, initial_config)` for a freshly constructed entity of
/// the given kind.
fn port_template(
    kind: EntityKind,
) -> (Vec<String>, Vec<String>, Vec<String>, Vec<String>, EntityConfig) {
    let s = |v: &[&str]| v.iter().map(|x| x.to_string()).collect::<Vec<_>>();
    match kind {
        EntityKind::Iob => (
            s(&["IN"]),
            s(&["OUT"]),
            s(&[]),
            s(&[]),
            EntityConfig::Iob {
                is_output: false,
                analog_input: false,
            },
        ),
        EntityKind::Inverter => (s(&["IN"]), s(&["OUT"]), s(&[]), s(&[]), EntityConfig::None),
        EntityKind::Lut2 => (
            s(&["IN0", "IN1"]),
            s(&["OUT"]),
            s(&[]),
            s(&[]),
            EntityConfig::Lut {
                truth_table: vec![false; 4],
            },
        ),
        EntityKind::Lut3 => (
            s(&["IN0", "IN1", "IN2"]),
            s(&["OUT"]),
            s(&[]),
            s(&[]),
            EntityConfig::Lut {
                truth_table: vec![false; 8],
            },
        ),
        EntityKind::Lut4 => (
            s(&["IN0", "IN1", "IN2", "IN3"]),
            s(&["OUT"]),
            s(&[]),
            s(&[]),
            EntityConfig::Lut {
                truth_table: vec![false; 16],
            },
        ),
        EntityKind::Dff => (
            s(&["D", "nSR"]),
            s(&["Q"]),
            s(&["CLK"]),
            s(&[]),
            EntityConfig::Dff { init_value: false },
        ),
        EntityKind::ShiftRegister => (
            s(&["IN", "RST"]),
            s(&["OUT"]),
            s(&["CLK"]),
            s(&[]),
            EntityConfig::None,
        ),
        EntityKind::Counter8 => (
            s(&["RST"]),
            s(&["OUT", "TC"]),
            s(&["CLK"]),
            s(&[]),
            EntityConfig::Counter {
                divisor: 2,
                fsm_extended: false,
            },
        ),
        EntityKind::Counter14 => (
            s(&["RST"]),
            s(&["OUT", "TC"]),
            s(&["CLK"]),
            s(&[]),
            EntityConfig::Counter {
                divisor: 2,
                fsm_extended: false,
            },
        ),
        EntityKind::LfOscillator | EntityKind::RingOscillator | EntityKind::RcOscillator => (
            s(&["PWRDN"]),
            s(&["CLKOUT"]),
            s(&[]),
            s(&[]),
            EntityConfig::Oscillator {
                enabled: true,
                power_down_source: None,
            },
        ),
        EntityKind::PowerOnReset => (s(&[]), s(&["RST"]), s(&[]), s(&[]), EntityConfig::None),
        EntityKind::SystemReset => (
            s(&["RST"]),
            s(&["OUT"]),
            s(&[]),
            s(&[]),
            EntityConfig::None,
        ),
        EntityKind::Vref => (s(&[]), s(&["OUT"]), s(&[]), s(&[]), EntityConfig::None),
        EntityKind::Acmp => (
            s(&["IN"]),
            s(&["OUT"]),
            s(&["VREF"]),
            s(&["PWREN"]),
            EntityConfig::None,
        ),
        EntityKind::Dac => (
            s(&[]),
            s(&["OUT"]),
            s(&["VREF"]),
            s(&[]),
            EntityConfig::Dac { value: 0 },
        ),
        EntityKind::Abuf => (s(&["IN"]), s(&["OUT"]), s(&[]), s(&[]), EntityConfig::None),
        EntityKind::Pga => (s(&["IN"]), s(&["OUT"]), s(&[]), s(&[]), EntityConfig::None),
        EntityKind::Dcmp => (
            s(&["IN"]),
            s(&["OUT"]),
            s(&["REF", "PWRDN"]),
            s(&[]),
            EntityConfig::Dcmp {
                power_down_source: None,
            },
        ),
        EntityKind::DcmpRef => (s(&[]), s(&["OUT"]), s(&[]), s(&[]), EntityConfig::None),
        EntityKind::DcmpMux => (
            s(&["IN0", "IN1"]),
            s(&["OUT"]),
            s(&[]),
            s(&[]),
            EntityConfig::AcmpMux { selector: None },
        ),
        EntityKind::ClockBuffer => (s(&["IN"]), s(&["OUT"]), s(&[]), s(&[]), EntityConfig::None),
        EntityKind::Delay => (s(&["IN"]), s(&["OUT"]), s(&[]), s(&[]), EntityConfig::None),
        EntityKind::PowerRail => (
            s(&[]),
            s(&["OUT"]),
            s(&[]),
            s(&[]),
            EntityConfig::PowerRail { is_vdd: false },
        ),
        EntityKind::CrossConnection => (s(&["IN"]), s(&["OUT"]), s(&[]), s(&[]), EntityConfig::None),
        EntityKind::Bandgap => (s(&["PWRDN"]), s(&[]), s(&[]), s(&[]), EntityConfig::None),
    }
}

impl Device {
    /// Constructs a device model for the given part number. Falls back to
    /// the smallest known part (with a warning left to the caller to log)
    /// if the exact part is unrecognized; the returned `bool` is `true`
    /// iff the match was exact.
    pub fn new(part: &str) -> (Self, bool) {
        let (counts, exact) = lookup(part);
        (Self::from_counts(counts, exact), exact)
    }

    fn from_counts(counts: PartCounts, exact: bool) -> Self {
        let mut b = Builder {
            entities: Vec::new(),
            dedicated: Vec::new(),
        };

        let iobs = b.push_range(EntityKind::Iob, "IOB", counts.iobs);
        let luts2 = b.push_range(EntityKind::Lut2, "LUT2", counts.lut2);
        let luts3 = b.push_range(EntityKind::Lut3, "LUT3", counts.lut3);
        let luts4 = b.push_range(EntityKind::Lut4, "LUT4", counts.lut4);
        let flipflops = b.push_range(EntityKind::Dff, "DFF", counts.dff);
        let shift_registers = b.push_range(EntityKind::ShiftRegister, "SHREG", counts.shift_registers);
        let counter8s = b.push_range(EntityKind::Counter8, "COUNT8", counts.counter8);
        let counter14s = b.push_range(EntityKind::Counter14, "COUNT14", counts.counter14);
        let counters: Vec<EntityId> = counter8s.iter().chain(counter14s.iter()).copied().collect();
        let inverters = b.push_range(EntityKind::Inverter, "INV", counts.inverters);

        let lf_osc = b.push(EntityKind::LfOscillator, "LFOSC".to_string(), 0);
        let ring_osc = b.push(EntityKind::RingOscillator, "RINGOSC".to_string(), 0);
        let rc_osc = b.push(EntityKind::RcOscillator, "RCOSC".to_string(), 0);
        let oscillators = vec![lf_osc, ring_osc, rc_osc];

        let por = b.push(EntityKind::PowerOnReset, "POR".to_string(), 0);
        let sysrst = b.push(EntityKind::SystemReset, "SYSRESET".to_string(), 0);
        b.dedicated.push(DedicatedEdge {
            source: por,
            source_port: "RST",
            dest: sysrst,
            dest_port: "RST",
        });

        // Bandgap voltage reference: a single always-present entity feeding
        // the analog subsystem's internal bias, not sized by part (spec §4.2,
        // `Greenpak4Bandgap`).
        let bandgap = b.push(EntityKind::Bandgap, "BANDGAP".to_string(), 0);

        let vrefs = b.push_range(EntityKind::Vref, "VREF", counts.vrefs);
        let acmps = b.push_range(EntityKind::Acmp, "ACMP", counts.acmps);
        let dacs = b.push_range(EntityKind::Dac, "DAC", counts.dacs);

        let mut abuf = None;
        let mut pga = None;
        if counts.has_abuf_pga {
            abuf = Some(b.push(EntityKind::Abuf, "ABUF".to_string(), 0));
            pga = Some(b.push(EntityKind::Pga, "PGA".to_string(), 0));
        }

        let dcmps = b.push_range(EntityKind::Dcmp, "DCMP", counts.dcmps);
        let dcmp_refs = b.push_range(EntityKind::DcmpRef, "DCMPREF", counts.dcmps.min(1));
        let dcmp_mux = if counts.dcmps > 1 {
            Some(b.push(EntityKind::DcmpMux, "DCMPMUX".to_string(), 0))
        } else {
            None
        };

        let clock_buffers = b.push_range(EntityKind::ClockBuffer, "CLKBUF", counts.clock_buffers);
        let delays = b.push_range(EntityKind::Delay, "DELAY", counts.delays);

        // Power rails: each has a master on matrix 0 and a dual on matrix 1
        // (spec §3.3: "power rails are always duals of themselves across
        // matrices").
        for (name, is_vdd) in [("VDD", true), ("VSS", false)] {
            let master = b.push(EntityKind::PowerRail, name.to_string(), 0);
            let dual = b.push(EntityKind::PowerRail, format!("{name}_DUAL"), 1);
            b.entities[master.as_raw() as usize].dual = Some(dual);
            b.entities[dual.as_raw() as usize].dual = Some(master);
            b.entities[dual.as_raw() as usize].is_dual = true;
            for id in [master, dual] {
                b.entities[id.as_raw() as usize].config = EntityConfig::PowerRail { is_vdd };
            }
        }

        for matrix in 0..2u32 {
            for slot in 0..counts.cross_connections_per_matrix {
                b.push(
                    EntityKind::CrossConnection,
                    format!("XCONN_{matrix}_{slot}"),
                    matrix as Matrix,
                );
            }
        }

        // Dedicated edges: oscillators feed every counter's CLK directly.
        for &osc in &oscillators {
            for &ctr in counter8s.iter().chain(counter14s.iter()) {
                b.dedicated.push(DedicatedEdge {
                    source: osc,
                    source_port: "CLKOUT",
                    dest: ctr,
                    dest_port: "CLK",
                });
            }
        }

        // VREF reaches comparators and DACs on the same matrix via a
        // dedicated analog bus, not the general switch matrix.
        for &vref in &vrefs {
            let vm = b.entities[vref.as_raw() as usize].matrix;
            for &acmp in &acmps {
                if b.entities[acmp.as_raw() as usize].matrix == vm {
                    b.dedicated.push(DedicatedEdge {
                        source: vref,
                        source_port: "OUT",
                        dest: acmp,
                        dest_port: "VREF",
                    });
                }
            }
            for &dac in &dacs {
                if b.entities[dac.as_raw() as usize].matrix == vm {
                    b.dedicated.push(DedicatedEdge {
                        source: vref,
                        source_port: "OUT",
                        dest: dac,
                        dest_port: "VREF",
                    });
                }
            }
        }

        // DAC output reaches same-matrix IOBs over the dedicated analog bus.
        for &dac in &dacs {
            let dm = b.entities[dac.as_raw() as usize].matrix;
            for &iob in &iobs {
                if b.entities[iob.as_raw() as usize].matrix == dm {
                    b.dedicated.push(DedicatedEdge {
                        source: dac,
                        source_port: "OUT",
                        dest: iob,
                        dest_port: "IN",
                    });
                }
            }
        }

        Self {
            part: counts.part.to_string(),
            exact_part_match: exact,
            entities: b.entities,
            dedicated: b.dedicated,
            cross_connections_per_matrix: counts.cross_connections_per_matrix,
            charge_pump_enabled: true,
            iobs,
            lut2: luts2,
            lut3: luts3,
            lut4: luts4,
            flipflops,
            shift_registers,
            counters,
            inverters,
            vrefs,
            acmps,
            dacs,
            dcmps,
            dcmp_refs,
            dcmp_mux,
            clock_buffers,
            delays,
            lf_oscillator: lf_osc,
            ring_oscillator: ring_osc,
            rc_oscillator: rc_osc,
            power_on_reset: por,
            system_reset: sysrst,
            bandgap,
            abuf,
            pga,
        }
    }

    /// The part number this device was constructed for.
    pub fn part(&self) -> &str {
        &self.part
    }

    /// `true` if `part()` was an exact match for a known part number rather
    /// than a fallback.
    pub fn is_exact_part_match(&self) -> bool {
        self.exact_part_match
    }

    /// Total entity count, for flat enumeration by the graph builder.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Entity by flat index.
    pub fn entity(&self, id: EntityId) -> &Entity {
        &self.entities[id.as_raw() as usize]
    }

    /// Mutable entity by flat index.
    pub fn entity_mut(&mut self, id: EntityId) -> &mut Entity {
        &mut self.entities[id.as_raw() as usize]
    }

    /// All entities, in construction order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// All entities, mutable, in construction order.
    pub fn entities_mut(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    /// The dedicated (hard-IP) edges the builder must install verbatim.
    pub fn dedicated_edges(&self) -> &[DedicatedEdge] {
        &self.dedicated
    }

    /// Number of cross-connection slots available per matrix.
    pub fn cross_connections_per_matrix(&self) -> u32 {
        self.cross_connections_per_matrix
    }

    /// `true` if the on-chip charge pump is enabled. The brownout/power
    /// detector (the device's first digital comparator) requires it; see
    /// the DRC check in `gpx_commit`. Defaults to enabled; a design disables
    /// it via a comparator cell's `DISABLE_CHARGE_PUMP` attribute, applied
    /// at commit time.
    pub fn charge_pump_enabled(&self) -> bool {
        self.charge_pump_enabled
    }

    /// Sets the charge pump enable state (commit-time only).
    pub fn set_charge_pump_enabled(&mut self, enabled: bool) {
        self.charge_pump_enabled = enabled;
    }

    /// The device's power detector, by convention its first digital
    /// comparator, if this part has one.
    pub fn power_detector(&self) -> Option<EntityId> {
        self.entities_of_kind(EntityKind::Dcmp).into_iter().next()
    }

    /// Finds an entity by its exact description string (used by LOC
    /// resolution, spec §4.4.1).
    pub fn find_by_description(&self, description: &str) -> Option<EntityId> {
        self.entities
            .iter()
            .find(|e| e.description == description)
            .map(|e| e.id)
    }

    /// All entities of the given kind, in construction order.
    pub fn entities_of_kind(&self, kind: EntityKind) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.id)
            .collect()
    }

    /// One of the fixed cross-connection resources for `matrix`/`slot`.
    pub fn cross_connection(&self, matrix: Matrix, slot: u32) -> ParResult<EntityId> {
        self.entities
            .iter()
            .find(|e| {
                e.kind == EntityKind::CrossConnection
                    && e.matrix == matrix
                    && e.description == format!("XCONN_{matrix}_{slot}")
            })
            .map(|e| e.id)
            .ok_or_else(|| ParError::new(format!("no cross-connection at matrix {matrix} slot {slot}")))
    }

    /// The power rail entity for `Vdd` (`true`) or `Vss` (`false`), on the
    /// requested matrix. Both matrices always have one since the rails are
    /// mutual duals.
    pub fn power_rail(&self, is_vdd: bool, matrix: Matrix) -> EntityId {
        self.entities
            .iter()
            .find(|e| {
                matches!(e.config, EntityConfig::PowerRail { is_vdd: v } if v == is_vdd)
                    && e.matrix == matrix
            })
            .expect("power rails always exist on both matrices")
            .id
    }

    /// Alias for [`Device::power_rail`] matching spec §4.2's named-accessor
    /// spelling.
    pub fn get_power_rail(&self, is_vdd: bool, matrix: Matrix) -> EntityId {
        self.power_rail(is_vdd, matrix)
    }

    /// Alias for [`Device::cross_connection`] matching spec §4.2's
    /// named-accessor spelling.
    pub fn get_cross_connection(&self, matrix: Matrix, slot: u32) -> ParResult<EntityId> {
        self.cross_connection(matrix, slot)
    }

    /// Every I/O buffer entity, in pin order. Supersedes the original's
    /// `iob_begin`/`iob_end` iterator pair with a plain slice.
    pub fn iobs(&self) -> &[EntityId] {
        &self.iobs
    }

    /// The I/O buffer at `pin`, if the part has that many pins.
    pub fn get_iob(&self, pin: usize) -> Option<EntityId> {
        self.iobs.get(pin).copied()
    }

    /// The flip-flop at `index`, if the part has that many.
    pub fn get_flipflop(&self, index: usize) -> Option<EntityId> {
        self.flipflops.get(index).copied()
    }

    /// The 2-input LUT at `index`, if the part has that many.
    pub fn get_lut2(&self, index: usize) -> Option<EntityId> {
        self.lut2.get(index).copied()
    }

    /// The 3-input LUT at `index`, if the part has that many.
    pub fn get_lut3(&self, index: usize) -> Option<EntityId> {
        self.lut3.get(index).copied()
    }

    /// The 4-input LUT at `index`, if the part has that many.
    pub fn get_lut4(&self, index: usize) -> Option<EntityId> {
        self.lut4.get(index).copied()
    }

    /// The counter at `index`, 8-bit counters first then 14-bit counters,
    /// if the part has that many.
    pub fn get_counter(&self, index: usize) -> Option<EntityId> {
        self.counters.get(index).copied()
    }

    /// The shift register at `index`, if the part has that many.
    pub fn get_shift_register(&self, index: usize) -> Option<EntityId> {
        self.shift_registers.get(index).copied()
    }

    /// The inverter at `index`, if the part has that many.
    pub fn get_inverter(&self, index: usize) -> Option<EntityId> {
        self.inverters.get(index).copied()
    }

    /// The voltage reference at `index`, if the part has that many.
    pub fn get_vref(&self, index: usize) -> Option<EntityId> {
        self.vrefs.get(index).copied()
    }

    /// The analog comparator at `index`, if the part has that many.
    pub fn get_acmp(&self, index: usize) -> Option<EntityId> {
        self.acmps.get(index).copied()
    }

    /// The DAC at `index`, if the part has that many.
    pub fn get_dac(&self, index: usize) -> Option<EntityId> {
        self.dacs.get(index).copied()
    }

    /// The digital comparator at `index`, if the part has that many.
    pub fn get_dcmp(&self, index: usize) -> Option<EntityId> {
        self.dcmps.get(index).copied()
    }

    /// The digital comparator reference register at `index`, if the part
    /// has that many.
    pub fn get_dcmp_ref(&self, index: usize) -> Option<EntityId> {
        self.dcmp_refs.get(index).copied()
    }

    /// The shared digital-comparator input mux, if the part has one.
    pub fn get_dcmp_mux(&self) -> Option<EntityId> {
        self.dcmp_mux
    }

    /// The clock buffer at `index`, if the part has that many.
    pub fn get_clock_buffer(&self, index: usize) -> Option<EntityId> {
        self.clock_buffers.get(index).copied()
    }

    /// The delay line at `index`, if the part has that many.
    pub fn get_delay(&self, index: usize) -> Option<EntityId> {
        self.delays.get(index).copied()
    }

    /// The low-frequency oscillator. Always present.
    pub fn get_lf_oscillator(&self) -> EntityId {
        self.lf_oscillator
    }

    /// The ring oscillator. Always present.
    pub fn get_ring_oscillator(&self) -> EntityId {
        self.ring_oscillator
    }

    /// The RC oscillator. Always present.
    pub fn get_rc_oscillator(&self) -> EntityId {
        self.rc_oscillator
    }

    /// The power-on reset generator. Always present.
    pub fn get_power_on_reset(&self) -> EntityId {
        self.power_on_reset
    }

    /// The system reset generator. Always present.
    pub fn get_system_reset(&self) -> EntityId {
        self.system_reset
    }

    /// The bandgap voltage reference. Always present.
    pub fn get_bandgap(&self) -> EntityId {
        self.bandgap
    }

    /// The buffered analog input, if the part has one.
    pub fn get_abuf(&self) -> Option<EntityId> {
        self.abuf
    }

    /// The programmable-gain amplifier, if the part has one.
    pub fn get_pga(&self) -> Option<EntityId> {
        self.pga
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construct_known_part() {
        let (dev, exact) = Device::new("SLG46620V");
        assert!(exact);
        assert_eq!(dev.part(), "SLG46620V");
        assert!(dev.entity_count() > 0);
    }

    #[test]
    fn unknown_part_falls_back() {
        let (dev, exact) = Device::new("BOGUS_PART");
        assert!(!exact);
        assert_eq!(dev.part(), "SLG46531V");
    }

    #[test]
    fn iob_entities_present() {
        let (dev, _) = Device::new("SLG46620V");
        let iobs = dev.entities_of_kind(EntityKind::Iob);
        assert_eq!(iobs.len(), 20);
    }

    #[test]
    fn power_rails_are_mutual_duals() {
        let (dev, _) = Device::new("SLG46620V");
        let vdd0 = dev.power_rail(true, 0);
        let vdd1 = dev.power_rail(true, 1);
        assert_eq!(dev.entity(vdd0).dual, Some(vdd1));
        assert_eq!(dev.entity(vdd1).dual, Some(vdd0));
        assert!(dev.entity(vdd1).is_dual);
        assert!(!dev.entity(vdd0).is_dual);
    }

    #[test]
    fn cross_connections_split_evenly_by_matrix() {
        let (dev, _) = Device::new("SLG46620V");
        for matrix in 0..2 {
            for slot in 0..dev.cross_connections_per_matrix() {
                let id = dev.cross_connection(matrix as Matrix, slot).unwrap();
                assert_eq!(dev.entity(id).matrix, matrix as Matrix);
            }
        }
    }

    #[test]
    fn find_by_description() {
        let (dev, _) = Device::new("SLG46620V");
        let id = dev.find_by_description("IOB_2").unwrap();
        assert_eq!(dev.entity(id).kind, EntityKind::Iob);
    }

    #[test]
    fn charge_pump_enabled_by_default() {
        let (dev, _) = Device::new("SLG46620V");
        assert!(dev.charge_pump_enabled());
        assert!(dev.power_detector().is_some());
    }

    #[test]
    fn named_accessors_cover_the_public_contract() {
        let (dev, _) = Device::new("SLG46620V");
        assert!(dev.get_iob(0).is_some());
        assert!(dev.get_iob(dev.iobs().len()).is_none());
        assert!(dev.get_lut2(0).is_some());
        assert!(dev.get_lut3(0).is_some());
        assert!(dev.get_lut4(0).is_some());
        assert!(dev.get_flipflop(0).is_some());
        assert!(dev.get_shift_register(0).is_some());
        assert!(dev.get_counter(0).is_some());
        assert_eq!(dev.get_counter(0).map(|e| dev.entity(e).kind), Some(EntityKind::Counter8));
        assert_eq!(dev.get_inverter(0).map(|e| dev.entity(e).kind), Some(EntityKind::Inverter));
        assert!(dev.get_vref(0).is_some());
        assert!(dev.get_acmp(0).is_some());
        assert!(dev.get_dac(0).is_some());
        assert!(dev.get_dcmp(0).is_some());
        assert!(dev.get_dcmp_ref(0).is_some());
        assert!(dev.get_dcmp_mux().is_some());
        assert!(dev.get_clock_buffer(0).is_some());
        assert!(dev.get_delay(0).is_some());
        assert_eq!(dev.entity(dev.get_lf_oscillator()).kind, EntityKind::LfOscillator);
        assert_eq!(dev.entity(dev.get_ring_oscillator()).kind, EntityKind::RingOscillator);
        assert_eq!(dev.entity(dev.get_rc_oscillator()).kind, EntityKind::RcOscillator);
        assert_eq!(dev.entity(dev.get_power_on_reset()).kind, EntityKind::PowerOnReset);
        assert_eq!(dev.entity(dev.get_system_reset()).kind, EntityKind::SystemReset);
        assert_eq!(dev.entity(dev.get_bandgap()).kind, EntityKind::Bandgap);
        assert!(dev.get_abuf().is_some());
        assert!(dev.get_pga().is_some());
        assert_eq!(dev.get_power_rail(true, 0), dev.power_rail(true, 0));
        assert_eq!(
            dev.get_cross_connection(0, 0).unwrap(),
            dev.cross_connection(0, 0).unwrap()
        );
    }

    #[test]
    fn bandgap_is_present_on_every_part() {
        let (dev, _) = Device::new("SLG46531V");
        assert_eq!(dev.entity(dev.get_bandgap()).kind, EntityKind::Bandgap);
    }

    #[test]
    fn dedicated_edges_connect_oscillators_to_counters() {
        let (dev, _) = Device::new("SLG46620V");
        let has_osc_to_counter = dev
            .dedicated_edges()
            .iter()
            .any(|e| e.source_port == "CLKOUT" && e.dest_port == "CLK");
        assert!(has_osc_to_counter);
    }
}
