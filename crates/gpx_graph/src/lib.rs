//! L1: labelled bidirectional multigraph model shared by the netlist graph
//! and the device graph, plus the partial-involution mating relation
//! between them.

#![warn(missing_docs)]

pub mod graph;

pub use gpx_common::{EdgeId, Label, NodeId};
pub use graph::{mate, unmate, Edge, GraphNode, PlacementGraph};
