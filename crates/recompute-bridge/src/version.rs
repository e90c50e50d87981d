//! Content-derived request versions.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use panel_types::Operation;

/// Identifies a recompute by the content of its operation snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(String);

impl Version {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Two independently seeded 64-bit lanes give a 128-bit digest.
const LANE_SEEDS: [u64; 2] = [0x243f_6a88_85a3_08d3, 0x1319_8a2e_0370_7344];

/// Hash an operation snapshot into a 32-character hex version.
///
/// Equal snapshots (same ids, kinds, parameters and order) produce the same
/// version within one build of the program. `DefaultHasher` output may change
/// between Rust releases, so versions are not meant to be persisted or compared
/// across builds.
pub fn compute_version(ops: &[Operation]) -> Version {
    let bytes = serde_json::to_vec(ops).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "snapshot did not serialize, hashing debug form");
        format!("{ops:?}").into_bytes()
    });

    let lane = |seed: u64| {
        let mut hasher = DefaultHasher::new();
        seed.hash(&mut hasher);
        bytes.hash(&mut hasher);
        hasher.finish()
    };

    Version(format!("{:016x}{:016x}", lane(LANE_SEEDS[0]), lane(LANE_SEEDS[1])))
}
