//! Per-part-number entity counts, table-driven the way the teacher's
//! per-family resource tables are (e.g. Cyclone IV's LUT/BRAM/DSP counts).
//!
//! Counts are representative of the real SLG466xx GreenPAK4 family rather
//! than transcribed from a datasheet: this core's contract is the *shape*
//! of the device model (§3.3/§4.2), not bit-exact hardware fidelity.

/// The fixed entity counts for one device part.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PartCounts {
    /// Part number, e.g. `"SLG46620V"`.
    pub part: &'static str,
    /// Number of I/O buffers (also the pin count).
    pub iobs: u32,
    /// Number of 2-input LUTs.
    pub lut2: u32,
    /// Number of 3-input LUTs.
    pub lut3: u32,
    /// Number of 4-input LUTs.
    pub lut4: u32,
    /// Number of flip-flops (each capable of plain DFF or DFFSR, aliased).
    pub dff: u32,
    /// Number of shift registers.
    pub shift_registers: u32,
    /// Number of 8-bit counters.
    pub counter8: u32,
    /// Number of 14-bit counters.
    pub counter14: u32,
    /// Number of inverters.
    pub inverters: u32,
    /// Number of voltage references.
    pub vrefs: u32,
    /// Number of analog comparators.
    pub acmps: u32,
    /// Number of DACs.
    pub dacs: u32,
    /// Number of digital comparators.
    pub dcmps: u32,
    /// Number of clock buffers.
    pub clock_buffers: u32,
    /// Number of delay lines.
    pub delays: u32,
    /// Number of cross-connection slots, per matrix (spec §3.3: "typically 10").
    pub cross_connections_per_matrix: u32,
    /// `true` if this part has a buffered analog input and PGA.
    pub has_abuf_pga: bool,
}

/// Known parts, smallest first (the fallback target on an unrecognized
/// part number — mirrors `aion_arch::load_architecture`'s smallest-device
/// fallback idiom).
pub const PARTS: &[PartCounts] = &[
    PartCounts {
        part: "SLG46531V",
        iobs: 8,
        lut2: 4,
        lut3: 2,
        lut4: 1,
        dff: 4,
        shift_registers: 1,
        counter8: 2,
        counter14: 1,
        inverters: 2,
        vrefs: 1,
        acmps: 2,
        dacs: 1,
        dcmps: 1,
        clock_buffers: 1,
        delays: 1,
        cross_connections_per_matrix: 10,
        has_abuf_pga: false,
    },
    PartCounts {
        part: "SLG46620V",
        iobs: 20,
        lut2: 8,
        lut3: 4,
        lut4: 4,
        dff: 8,
        shift_registers: 2,
        counter8: 4,
        counter14: 2,
        inverters: 4,
        vrefs: 2,
        acmps: 4,
        dacs: 2,
        dcmps: 2,
        clock_buffers: 2,
        delays: 2,
        cross_connections_per_matrix: 10,
        has_abuf_pga: true,
    },
    PartCounts {
        part: "SLG46621V",
        iobs: 20,
        lut2: 8,
        lut3: 4,
        lut4: 4,
        dff: 10,
        shift_registers: 2,
        counter8: 4,
        counter14: 3,
        inverters: 4,
        vrefs: 2,
        acmps: 4,
        dacs: 2,
        dcmps: 2,
        clock_buffers: 2,
        delays: 2,
        cross_connections_per_matrix: 10,
        has_abuf_pga: true,
    },
];

/// Looks up a part by exact, case-insensitive part number. Returns the
/// smallest known part (with `exact = false`) if not found.
pub fn lookup(part: &str) -> (PartCounts, bool) {
    for &p in PARTS {
        if p.part.eq_ignore_ascii_case(part) {
            return (p, true);
        }
    }
    (PARTS[0], false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_exact() {
        let (counts, exact) = lookup("SLG46620V");
        assert!(exact);
        assert_eq!(counts.part, "SLG46620V");
    }

    #[test]
    fn lookup_case_insensitive() {
        let (counts, exact) = lookup("slg46620v");
        assert!(exact);
        assert_eq!(counts.part, "SLG46620V");
    }

    #[test]
    fn lookup_unknown_falls_back_to_smallest() {
        let (counts, exact) = lookup("NOT_A_PART");
        assert!(!exact);
        assert_eq!(counts.part, PARTS[0].part);
    }
}
