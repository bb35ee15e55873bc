//! Opaque `u32` ID newtypes shared by the graph, device and builder crates.
//!
//! Every arena-owned object (graph node, graph edge, device entity, netlist
//! cell, netlist net) is addressed by one of these instead of a pointer or
//! reference, so that the whole pipeline is free of cyclic ownership.

use serde::{Deserialize, Serialize};

/// Defines a `Copy + Hash` `u32`-backed ID newtype with `from_raw`/`as_raw`/`Display`.
#[macro_export]
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, serde::Serialize, serde::Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Index of a node in a [`PlacementGraph`](gpx_graph). Shared numbering
    /// space between netlist-graph and device-graph instances, since each
    /// graph owns its own arena.
    NodeId
);

define_id!(
    /// Index of an edge in a [`PlacementGraph`](gpx_graph), local to the
    /// node that owns it (edges are stored on their source node).
    EdgeId
);

define_id!(
    /// A small integer naming the "type" of a graph node (e.g. `GP_DFF`).
    /// Allocated monotonically by the graph builder.
    Label
);
