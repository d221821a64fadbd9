//! Scanner tunables: the options spec §9 calls out as "must be gated
//! behind an explicit configuration option, not silently clamped" rather
//! than picked automatically.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation;

/// Configuration for the Wu–Manber engines. Everything here has a default
/// reproducing the spec's own automatic behavior: block size auto-selected
/// per §4.3, Bloom filtering off, false-positive rate `0.01`.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct ScannerConfig {
    /// Forces a specific Wu–Manber block size instead of the automatic
    /// `min_length`/`pattern_count`/`avg_length` heuristic. `None` means
    /// "let the engine choose".
    #[serde(default)]
    #[validate(custom(function = validation::validate_block_size))]
    pub wm_block_size_override: Option<u8>,

    /// Enables the Bloom prefix filter ahead of the Wu–Manber hash-chain
    /// walk. Spec §9 requires this gate to be explicit: `B=4`'s 16 MiB
    /// tables and Bloom's extra probe are both opt-in costs.
    #[serde(default = "default_bloom_enabled")]
    pub wm_bloom_enabled: bool,

    /// Target false-positive rate for the Bloom filter, used only when
    /// `wm_bloom_enabled` is true.
    #[serde(default = "default_false_positive_rate")]
    #[validate(custom(function = validation::validate_false_positive_rate))]
    pub bloom_false_positive_rate: f64,
}

fn default_bloom_enabled() -> bool {
    false
}

fn default_false_positive_rate() -> f64 {
    0.01
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            wm_block_size_override: None,
            wm_bloom_enabled: default_bloom_enabled(),
            bloom_false_positive_rate: default_false_positive_rate(),
        }
    }
}
