//! L4: the PAR engine (spec §4.4). Consumes the device graph, netlist
//! graph, and label map `gpx_builder` produces, and mates every netlist
//! node to a device node: first by resolving `LOC` constraints and
//! sequential fill, then by simulated-annealing refinement.

#![warn(missing_docs)]

pub mod placement;

pub use placement::anneal::{anneal, AnnealResult};
pub use placement::cost::{
    congestion_cost, is_dest_reachable, total_cost, unroutable_cost, unroutable_edges, UnroutableEdge,
};
pub use placement::initial::{apply_loc, initial_place, sequential_fill};
pub use placement::moves::{find_suboptimal_placements, propose_move, revert_move, MoveRecord};
