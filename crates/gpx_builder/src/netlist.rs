//! The netlist model the core consumes (spec §3.2). The frontend that
//! parses the JSON mapped-netlist dialect into this shape lives outside
//! the core; this module only defines the object graph it hands us.

use crate::ids::{CellId, NetId, PortId};
use gpx_common::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Port direction, shared by top-level ports and cell ports.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Direction {
    /// Drives into the design.
    Input,
    /// Driven by the design.
    Output,
    /// Bidirectional.
    InOut,
}

/// What drives a net: either a cell's output port/bit, or a top-level
/// input port directly.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum NetDriver {
    /// Driven by `(cell, port, bit)`.
    Cell(CellId, String, usize),
    /// Driven directly by a top-level input port (spec §4.3 step 5).
    TopPort(PortId),
}

/// A `(cell, port, bit)` load reference.
pub type Load = (CellId, String, usize);

/// A named, typed cell instance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Cell {
    /// This cell's index in the netlist's cell arena.
    pub id: CellId,
    /// Instance name, unique within the netlist.
    pub name: String,
    /// Library type name, e.g. `"GP_2LUT"`, `"GP_DFFSR"`.
    pub type_name: String,
    /// String-valued parameters (e.g. LUT truth table, counter divisor).
    pub params: BTreeMap<String, String>,
    /// String-valued attributes (e.g. `LOC`).
    pub attrs: BTreeMap<String, String>,
    /// Port name to ordered-bit-list connection map. Each entry is the net
    /// driving/loading that bit, or `None` for an unconnected bit.
    pub connections: BTreeMap<String, Vec<Option<NetId>>>,
    /// Back-reference to this cell's node in the netlist graph, set once
    /// the builder creates it.
    pub node: Option<NodeId>,
}

impl Cell {
    /// The `LOC` attribute value, if present.
    pub fn loc(&self) -> Option<&str> {
        self.attrs.get("LOC").map(String::as_str)
    }

    /// The net connected to `port` bit `bit`, if any.
    pub fn connection(&self, port: &str, bit: usize) -> Option<NetId> {
        self.connections.get(port).and_then(|bits| bits.get(bit).copied().flatten())
    }
}

/// A top-level input/output/inout port.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TopPort {
    /// This port's index in the netlist's port arena.
    pub id: PortId,
    /// Port name.
    pub name: String,
    /// Direction.
    pub direction: Direction,
    /// The net this port drives (input/inout) or is driven by (output),
    /// one per bit.
    pub bits: Vec<Option<NetId>>,
}

/// A maximal connected set of bit-slices: one driver, any number of loads.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Net {
    /// This net's index in the netlist's net arena.
    pub id: NetId,
    /// Net name, for diagnostics.
    pub name: String,
    /// The unique driver, if any (a driverless net with loads is a netlist
    /// error caught by the builder).
    pub driver: Option<NetDriver>,
    /// Loads, in the order they were connected.
    pub loads: Vec<Load>,
}

/// A parsed, in-memory netlist: the shape the frontend hands the core.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Netlist {
    /// Cell instances.
    pub cells: Vec<Cell>,
    /// Nets.
    pub nets: Vec<Net>,
    /// Top-level ports.
    pub ports: Vec<TopPort>,
}

impl Netlist {
    /// An empty netlist.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a cell, assigning it the next `CellId`.
    pub fn add_cell(&mut self, mut cell: Cell) -> CellId {
        let id = CellId::from_raw(self.cells.len() as u32);
        cell.id = id;
        self.cells.push(cell);
        id
    }

    /// Adds a net, assigning it the next `NetId`.
    pub fn add_net(&mut self, mut net: Net) -> NetId {
        let id = NetId::from_raw(self.nets.len() as u32);
        net.id = id;
        self.nets.push(net);
        id
    }

    /// Adds a top-level port, assigning it the next `PortId`.
    pub fn add_port(&mut self, mut port: TopPort) -> PortId {
        let id = PortId::from_raw(self.ports.len() as u32);
        port.id = id;
        self.ports.push(port);
        id
    }

    /// Cell by id.
    pub fn cell(&self, id: CellId) -> &Cell {
        &self.cells[id.as_raw() as usize]
    }

    /// Mutable cell by id.
    pub fn cell_mut(&mut self, id: CellId) -> &mut Cell {
        &mut self.cells[id.as_raw() as usize]
    }

    /// Net by id.
    pub fn net(&self, id: NetId) -> &Net {
        &self.nets[id.as_raw() as usize]
    }

    /// Mutable net by id.
    pub fn net_mut(&mut self, id: NetId) -> &mut Net {
        &mut self.nets[id.as_raw() as usize]
    }

    /// Top-level port by id.
    pub fn port(&self, id: PortId) -> &TopPort {
        &self.ports[id.as_raw() as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_cell(name: &str, type_name: &str) -> Cell {
        Cell {
            id: CellId::from_raw(0),
            name: name.to_string(),
            type_name: type_name.to_string(),
            params: BTreeMap::new(),
            attrs: BTreeMap::new(),
            connections: BTreeMap::new(),
            node: None,
        }
    }

    #[test]
    fn add_cell_assigns_sequential_ids() {
        let mut nl = Netlist::new();
        let a = nl.add_cell(bare_cell("a", "GP_2LUT"));
        let b = nl.add_cell(bare_cell("b", "GP_2LUT"));
        assert_eq!(a.as_raw(), 0);
        assert_eq!(b.as_raw(), 1);
    }

    #[test]
    fn loc_attribute_roundtrip() {
        let mut c = bare_cell("u1", "GP_IOB");
        c.attrs.insert("LOC".to_string(), "IOB_2".to_string());
        assert_eq!(c.loc(), Some("IOB_2"));
    }

    #[test]
    fn net_driver_cell_variant() {
        let d = NetDriver::Cell(CellId::from_raw(0), "OUT".to_string(), 0);
        assert_eq!(d, NetDriver::Cell(CellId::from_raw(0), "OUT".to_string(), 0));
    }

    #[test]
    fn connection_lookup() {
        let mut c = bare_cell("u1", "GP_2LUT");
        let net = NetId::from_raw(3);
        c.connections.insert("IN0".to_string(), vec![Some(net)]);
        assert_eq!(c.connection("IN0", 0), Some(net));
        assert_eq!(c.connection("IN1", 0), None);
    }
}
