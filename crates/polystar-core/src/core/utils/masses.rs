use phf::{Map, phf_map};

/// Per-bead masses for common coarse-grained models, keyed by preset name.
static MASS_PRESETS: Map<&'static str, f64> = phf_map! {
    "lj" => 1.0,
    "carbon" => 12.011,
    "ch2" => 14.027,
    "styrene" => 104.15,
};

/// Looks up a mass preset by name, ignoring case and surrounding whitespace.
pub fn preset_mass(name: &str) -> Option<f64> {
    MASS_PRESETS
        .get(name.trim().to_ascii_lowercase().as_str())
        .copied()
}

/// Names of all known presets, sorted.
pub fn preset_names() -> Vec<&'static str> {
    let mut names: Vec<_> = MASS_PRESETS.keys().copied().collect();
    names.sort_unstable();
    names
}
