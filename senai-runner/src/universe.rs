//! Built-in symbol universes.

/// VN30 constituents, alphabetical.
pub const VN30: [&str; 30] = [
    "ACB", "BCM", "BID", "BVH", "CTG", "FPT", "GAS", "GVR", "HDB", "HPG", "MBB", "MSN", "MWG",
    "PLX", "POW", "SAB", "SHB", "SSB", "SSI", "STB", "TCB", "TPB", "VCB", "VHM", "VIB", "VIC",
    "VJC", "VNM", "VPB", "VRE",
];

pub fn vn30() -> Vec<String> {
    VN30.iter().map(|s| s.to_string()).collect()
}
