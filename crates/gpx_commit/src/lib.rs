//! L5: commit and post-PAR DRC (spec §4.5/§4.6). Consumes a fully annealed
//! placement and turns it into a concrete device configuration, then
//! validates that configuration against the design-rule checks a real
//! bitstream must satisfy.

#![warn(missing_docs)]

pub mod commit;
pub mod drc;

pub use commit::{commit, commit_changes, commit_routing};
pub use drc::{run_drc, DrcReport};
