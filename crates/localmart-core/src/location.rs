use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Pincode value reserved to mean "no pincode". Never a serviceable key.
pub const NULL_PINCODE_SENTINEL: &str = "000000";

/// A row from the pincode lookup table, offered to the user as a possible
/// serviceable area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationCandidate {
    pub pincode: String,
    pub city: String,
    pub state: String,
    pub area_locality: Option<String>,
}

/// Returns `true` if `pincode` can be used as a geographic filter.
///
/// Blank values and [`NULL_PINCODE_SENTINEL`] are not usable.
#[must_use]
pub fn is_usable_pincode(pincode: &str) -> bool {
    let trimmed = pincode.trim();
    !trimmed.is_empty() && trimmed != NULL_PINCODE_SENTINEL
}

/// Drops candidates whose pincode has already been seen.
///
/// The first occurrence of each pincode wins and the relative order of the
/// survivors is preserved.
#[must_use]
pub fn dedupe_by_pincode(candidates: Vec<LocationCandidate>) -> Vec<LocationCandidate> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.pincode.clone()))
        .collect()
}
