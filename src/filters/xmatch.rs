//! Cross-match label whitelists.

use std::collections::HashSet;

use once_cell::sync::Lazy;

/// Catalogue labels of galaxy-type hosts.
pub const GALAXY_LABELS: [&str; 16] = [
    "galaxy",
    "Galaxy",
    "EmG",
    "Seyfert",
    "Seyfert_1",
    "Seyfert_2",
    "BlueCompG",
    "StarburstG",
    "LSB_G",
    "HII_G",
    "High_z_G",
    "GinPair",
    "GinGroup",
    "BClG",
    "GinCl",
    "PartofG",
];

const NO_COUNTERPART: [&str; 3] = ["Unknown", "Transient", "Fail"];

const SUPERNOVA_LABELS: [&str; 2] = ["Candidate_SN*", "SN"];

static KILONOVA_KEEP: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    NO_COUNTERPART
        .iter()
        .chain(GALAXY_LABELS.iter())
        .copied()
        .collect()
});

static SUPERNOVA_KEEP: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    KILONOVA_KEEP
        .iter()
        .copied()
        .chain(SUPERNOVA_LABELS.iter().copied())
        .collect()
});

/// Labels compatible with an extragalactic transient without a known counterpart.
pub fn keep_for_kilonova(label: &str) -> bool {
    KILONOVA_KEEP.contains(label)
}

/// Kilonova whitelist plus labels already tagging a supernova.
pub fn keep_for_supernova(label: &str) -> bool {
    SUPERNOVA_KEEP.contains(label)
}
