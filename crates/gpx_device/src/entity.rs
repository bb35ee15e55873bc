//! Device entities: the fixed primitive catalogue of spec §3.3.
//!
//! Rather than the original's `dynamic_cast` chain over a class hierarchy
//! (spec §9), every entity carries a single `EntityKind` tag naming its
//! primitive family, with a matching `EntityConfig` variant holding its
//! mutable configuration state. Dispatch at commit time and in DRC is a
//! `match` on the tag.

use crate::ids::EntityId;
use gpx_common::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The primitive family of a device entity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum EntityKind {
    /// I/O buffer on the named pin.
    Iob,
    /// A plain (non-registered) logic inverter.
    Inverter,
    /// 2-input lookup table.
    Lut2,
    /// 3-input lookup table.
    Lut3,
    /// 4-input lookup table.
    Lut4,
    /// D flip-flop, optionally with set/reset.
    Dff,
    /// Shift register.
    ShiftRegister,
    /// 8-bit counter.
    Counter8,
    /// 14-bit counter, optionally FSM-extended.
    Counter14,
    /// Low-frequency oscillator.
    LfOscillator,
    /// Ring oscillator.
    RingOscillator,
    /// RC oscillator.
    RcOscillator,
    /// Power-on reset generator.
    PowerOnReset,
    /// System reset generator.
    SystemReset,
    /// Voltage reference.
    Vref,
    /// Analog comparator.
    Acmp,
    /// Digital-to-analog converter.
    Dac,
    /// Buffered analog input.
    Abuf,
    /// Programmable-gain amplifier.
    Pga,
    /// Digital comparator.
    Dcmp,
    /// Digital comparator reference register.
    DcmpRef,
    /// Shared digital-comparator input mux.
    DcmpMux,
    /// Clock buffer.
    ClockBuffer,
    /// Programmable delay line.
    Delay,
    /// Power rail (Vdd or Vss).
    PowerRail,
    /// Cross-matrix routing resource.
    CrossConnection,
    /// Bandgap voltage reference feeding the analog subsystem.
    Bandgap,
}

/// Per-primitive mutable configuration, written only by [`commit_changes`]
/// (spec §3.3) or by helper inference.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum EntityConfig {
    /// I/O buffer direction/drive configuration.
    Iob {
        /// `true` once a netlist cell configures this pin as an output.
        is_output: bool,
        /// `true` if the pad is configured for analog (not digital) input.
        analog_input: bool,
    },
    /// LUT truth table, one bit per input combination (`2^n` entries).
    Lut {
        /// Flat truth table, LSB-first over the input combination index.
        truth_table: Vec<bool>,
    },
    /// Flip-flop initial/reset behavior.
    Dff {
        /// Power-up initial value.
        init_value: bool,
    },
    /// Counter divisor and mode.
    Counter {
        /// Division ratio committed from the netlist cell's `COUNT` parameter.
        divisor: u32,
        /// `true` if a 14-bit counter's FSM extension is in use.
        fsm_extended: bool,
    },
    /// Oscillator enable/power-down wiring.
    Oscillator {
        /// `true` if the oscillator core is enabled.
        enabled: bool,
        /// Interned name of the shared power-down source, if any — multiple
        /// oscillators with power-down enabled must share one (spec §4.6).
        power_down_source: Option<String>,
    },
    /// DAC output configuration.
    Dac {
        /// Committed output code.
        value: u32,
    },
    /// Shared ACMP0 input mux setting (spec §4.6 / §9 open question).
    AcmpMux {
        /// The mux selector value every comparator sharing it must agree on.
        selector: Option<u32>,
    },
    /// Digital comparator power-down wiring, mirroring oscillators.
    Dcmp {
        /// Interned name of the shared power-down source.
        power_down_source: Option<String>,
    },
    /// Power rail value.
    PowerRail {
        /// `true` for Vdd, `false` for Vss.
        is_vdd: bool,
    },
    /// Entities with no committable configuration state.
    None,
}

/// A signal reference: the output port of some source entity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Signal {
    /// The entity driving this signal.
    pub source: EntityId,
    /// The name of the output port on `source`.
    pub output_port: String,
}

impl Signal {
    /// Creates a signal reference.
    pub fn new(source: EntityId, output_port: impl Into<String>) -> Self {
        Self {
            source,
            output_port: output_port.into(),
        }
    }
}

/// A physical device primitive.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Entity {
    /// This entity's index in the device's flat arena.
    pub id: EntityId,
    /// The primitive family.
    pub kind: EntityKind,
    /// Human-readable description, e.g. `"LUT3_1"`, `"IOB_12"`.
    pub description: String,
    /// Which routing region (0 or 1) this entity's output lives on.
    pub matrix: u8,
    /// The shadow entity on the opposite matrix re-exposing this entity's
    /// outputs, if any (spec §4.2.2).
    pub dual: Option<EntityId>,
    /// `true` if this entity is itself a dual (skeleton) rather than a master.
    pub is_dual: bool,
    /// Back-reference to this entity's node in the device graph, filled in
    /// once the graph builder creates it.
    pub par_node: Option<NodeId>,
    /// Names of ports reachable through the general fabric, source side.
    pub output_ports: Vec<String>,
    /// Names of ports reachable through the general fabric, destination side.
    pub input_ports: Vec<String>,
    /// Names of dedicated-only input ports (spec §4.2.1), not general-fabric.
    pub dedicated_input_ports: Vec<String>,
    /// Names of power-rail input ports, tied at commit time.
    pub power_rail_ports: Vec<String>,
    /// Currently wired input signals, by port name.
    pub inputs: BTreeMap<String, Signal>,
    /// Mutable configuration state, set by `commit_changes`.
    pub config: EntityConfig,
    /// Set by helper inference (spec §4.3.1 Pass A) on synthesized dummy
    /// comparators: DRC must not warn about their having no load.
    pub ignore_no_load: bool,
}

impl Entity {
    /// Returns `true` if `port` is a general-fabric input (spec §4.2.1).
    pub fn is_general_fabric_input(&self, port: &str) -> bool {
        self.input_ports.iter().any(|p| p == port)
    }

    /// Wires `port` to `signal`. Fails silently on an unknown port name the
    /// same way commit's port dispatch does (spec §4.5 step 4: "unknown
    /// destination ports warn and skip") — callers are expected to validate
    /// the port name with `is_general_fabric_input`/`dedicated_input_ports`
    /// first and log a warning themselves if it's unknown.
    pub fn set_input(&mut self, port: impl Into<String>, signal: Signal) {
        self.inputs.insert(port.into(), signal);
    }

    /// Looks up the currently wired source for `port`.
    pub fn get_input(&self, port: &str) -> Option<Signal> {
        self.inputs.get(port).copied()
    }
}
