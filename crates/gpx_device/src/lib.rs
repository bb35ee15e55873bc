//! The device model (spec §3.3/§4.2): a fixed catalogue of device entities,
//! their matrix/dual/port structure, and per-part entity counts.

#![warn(missing_docs)]

pub mod device;
pub mod entity;
pub mod ids;
pub mod parts;

pub use device::{DedicatedEdge, Device, Matrix};
pub use entity::{Entity, EntityConfig, EntityKind, Signal};
pub use ids::EntityId;
pub use parts::{lookup, PartCounts, PARTS};
