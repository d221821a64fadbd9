//! ## vakthund-detection::stats
//! **Per-scan counters, replacing the global mutable counters observed in
//! the algorithms this crate is benchmarking.**
//!
//! Every engine returns a fresh [`Stats`] value from its `scan` call;
//! nothing is retained between scans, so concurrent scans over the same
//! immutable tables from distinct threads need no locking.

use std::time::Duration;

/// Per-scan instrumentation. Counters are populated only where semantically
/// meaningful for the algorithm that produced them (see spec §4.6): AC
/// uses `transitions`/`fail_steps`/`matches`; WM uses
/// `windows`/`sum_shift`/`hash_hits`/`chain_steps`/`bloom_*`/`exact_matches`;
/// SH uses `windows`/`comparisons`/`matches`/`shifts`; BM uses
/// `comparisons`/`shifts`/`exact_matches`.
#[derive(Debug, Clone, PartialEq)]
pub struct Stats {
    pub algorithm: &'static str,
    pub input_len: usize,
    pub windows: u64,
    pub sum_shift: u64,
    pub hash_hits: u64,
    pub chain_steps: u64,
    pub exact_matches: u64,
    pub bloom_checks: u64,
    pub bloom_pass: u64,
    pub comparisons: u64,
    pub transitions: u64,
    pub fail_steps: u64,
    pub shifts: u64,
    pub matches: u64,
    pub elapsed_sec: f64,
}

impl Stats {
    pub fn new(algorithm: &'static str, input_len: usize) -> Self {
        Self {
            algorithm,
            input_len,
            windows: 0,
            sum_shift: 0,
            hash_hits: 0,
            chain_steps: 0,
            exact_matches: 0,
            bloom_checks: 0,
            bloom_pass: 0,
            comparisons: 0,
            transitions: 0,
            fail_steps: 0,
            shifts: 0,
            matches: 0,
            elapsed_sec: 0.0,
        }
    }

    /// Stamps the elapsed wall-clock time measured from `start` with a
    /// monotonic clock (`std::time::Instant`).
    pub fn set_elapsed(&mut self, elapsed: Duration) {
        self.elapsed_sec = elapsed.as_secs_f64();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_stats_are_zeroed() {
        let stats = Stats::new("ac", 0);
        assert_eq!(stats.matches, 0);
        assert_eq!(stats.elapsed_sec, 0.0);
    }

    #[test]
    fn set_elapsed_converts_to_seconds() {
        let mut stats = Stats::new("ac", 0);
        stats.set_elapsed(Duration::from_millis(500));
        assert!((stats.elapsed_sec - 0.5).abs() < 1e-9);
    }
}
