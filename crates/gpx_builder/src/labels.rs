//! The label map: type name → label, with alias support (spec §3.4).

use gpx_common::{Label, ParError, ParResult};
use std::collections::HashMap;

/// Maps library type names to labels, and labels to their canonical
/// description string. A single label may be reachable under several
/// aliased type names (e.g. `GP_DFFR`/`GP_DFFS` alias `GP_DFF`).
#[derive(Clone, Debug, Default)]
pub struct LabelMap {
    by_type: HashMap<String, Label>,
    descriptions: HashMap<u32, String>,
    next: u32,
}

impl LabelMap {
    /// An empty label map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh label for `canonical_type`, recording its
    /// description. Idempotent: calling this again with the same type name
    /// returns the already-allocated label instead of minting a new one.
    pub fn allocate(&mut self, canonical_type: &str) -> Label {
        if let Some(&label) = self.by_type.get(canonical_type) {
            return label;
        }
        let label = Label::from_raw(self.next);
        self.next += 1;
        self.by_type.insert(canonical_type.to_string(), label);
        self.descriptions.insert(label.as_raw(), canonical_type.to_string());
        label
    }

    /// Maps `alias_type` to the label already allocated for
    /// `canonical_type`. Fails if the canonical type has no label yet.
    pub fn alias(&mut self, alias_type: &str, canonical_type: &str) -> ParResult<()> {
        let label = self.by_type.get(canonical_type).copied().ok_or_else(|| {
            ParError::new(format!(
                "cannot alias '{alias_type}' to unallocated canonical type '{canonical_type}'"
            ))
        })?;
        self.by_type.insert(alias_type.to_string(), label);
        Ok(())
    }

    /// The label for a type name, following aliases transparently.
    pub fn label_for(&self, type_name: &str) -> Option<Label> {
        self.by_type.get(type_name).copied()
    }

    /// The canonical description recorded for a label, if any.
    pub fn description(&self, label: Label) -> Option<&str> {
        self.descriptions.get(&label.as_raw()).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_is_idempotent() {
        let mut m = LabelMap::new();
        let a = m.allocate("GP_2LUT");
        let b = m.allocate("GP_2LUT");
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_types_get_distinct_labels() {
        let mut m = LabelMap::new();
        let a = m.allocate("GP_2LUT");
        let b = m.allocate("GP_3LUT");
        assert_ne!(a, b);
    }

    #[test]
    fn alias_resolves_to_canonical_label() {
        let mut m = LabelMap::new();
        let canonical = m.allocate("GP_DFF");
        m.alias("GP_DFFR", "GP_DFF").unwrap();
        m.alias("GP_DFFS", "GP_DFF").unwrap();
        assert_eq!(m.label_for("GP_DFFR"), Some(canonical));
        assert_eq!(m.label_for("GP_DFFS"), Some(canonical));
    }

    #[test]
    fn alias_to_unknown_canonical_fails() {
        let mut m = LabelMap::new();
        assert!(m.alias("GP_DFFR", "GP_DFF").is_err());
    }

    #[test]
    fn unknown_type_has_no_label() {
        let m = LabelMap::new();
        assert_eq!(m.label_for("GP_NOPE"), None);
    }

    #[test]
    fn description_roundtrip() {
        let mut m = LabelMap::new();
        let l = m.allocate("GP_VREF");
        assert_eq!(m.description(l), Some("GP_VREF"));
    }
}
