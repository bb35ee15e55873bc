//! Opaque IDs for netlist-model objects.

gpx_common::define_id!(
    /// Index of a [`Cell`](crate::netlist::Cell) in a [`Netlist`](crate::netlist::Netlist).
    CellId
);
gpx_common::define_id!(
    /// Index of a [`Net`](crate::netlist::Net) in a [`Netlist`](crate::netlist::Netlist).
    NetId
);
gpx_common::define_id!(
    /// Index of a [`TopPort`](crate::netlist::TopPort) in a [`Netlist`](crate::netlist::Netlist).
    PortId
);
