//! Foundational types shared across the place-and-route core.
//!
//! This crate provides the arena-index ID newtype macro and the internal
//! (programmer-error) result type used by every other crate in the
//! workspace.

#![warn(missing_docs)]

pub mod ids;
pub mod result;

pub use ids::{EdgeId, Label, NodeId};
pub use result::{ParError, ParResult};
