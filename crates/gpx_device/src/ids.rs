//! Opaque ID for a device entity.

gpx_common::define_id!(
    /// Opaque, copyable index into a [`Device`](crate::Device)'s flat entity
    /// arena (spec §4.2's `get_entity_count`/`get_entity`).
    EntityId
);
