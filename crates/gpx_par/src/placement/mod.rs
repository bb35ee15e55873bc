//! The placement engine (spec §4.4): initial placement, cost functions,
//! move proposals, and simulated-annealing refinement.

pub mod anneal;
pub mod cost;
pub mod initial;
pub mod moves;
