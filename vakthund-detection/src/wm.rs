//! ## vakthund-detection::wm
//! **Wu–Manber engine: block-hashed shift table, suffix hash chains, and an
//! optional Bloom prefix filter.**
//!
//! Like [`crate::ac`], a mixed-case signature set is split into a
//! case-sensitive and a case-insensitive sub-table, each built and scanned
//! independently — this is the "maintain separate WM instances per case
//! mode" option spec §4.3/§9 allows, and it sidesteps Bloom/mixed-case
//! unsoundness structurally rather than disabling Bloom after the fact.
//!
//! The direct-addressed key space `256^B` is only tractable for `B=2`
//! (65536 slots). For `B=3`/`B=4` every block key is folded into a fixed
//! [`WM_TABLE_SIZE`]-slot table by masking its low bits — this is the
//! "hash[k]" Wu–Manber design spec §3 already names (a hash table, not a
//! dense array); collisions only make a shift more conservative or lengthen
//! a chain, they never cause a missed match. See DESIGN.md for the
//! reasoning behind not replicating the `256^B`-entries-per-B literal
//! sizing implied by spec §9's (self-inconsistent) memory-budget prose.

use std::time::Instant;

use crate::bloom::BloomFilter;
use crate::engine::{Engine, Match, ScanControl};
use crate::error::DetectionError;
use crate::fnv::fnv1a;
use crate::signature::{fold_byte, fold_bytes, Signature, SignatureSet};
use crate::stats::Stats;

/// Slots in the shift/hash tables. Exactly `256^2`, so `B=2` is addressed
/// directly with no collisions; larger blocks hash down into this space.
const WM_TABLE_SIZE: usize = 1 << 16;
const WM_TABLE_MASK: usize = WM_TABLE_SIZE - 1;

/// Tunables the spec leaves as explicit configuration rather than silent
/// defaults (§9: "gated behind an explicit configuration option").
#[derive(Debug, Clone)]
pub struct WmConfig {
    /// Forces a specific block size instead of the automatic §4.3 choice.
    pub block_size_override: Option<u8>,
    /// Target false-positive rate for the Bloom filter (default `0.01`).
    pub bloom_false_positive_rate: f64,
}

impl Default for WmConfig {
    fn default() -> Self {
        Self {
            block_size_override: None,
            bloom_false_positive_rate: 0.01,
        }
    }
}

fn choose_block_size(pattern_count: usize, min_length: usize, avg_length: f64) -> u8 {
    if min_length < 4 || pattern_count > 5000 {
        2
    } else if avg_length > 30.0 {
        4
    } else {
        3
    }
}

/// Little-endian block key (spec §6): `sum_{i<B} b[i] << (8*i)`.
fn block_key(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .enumerate()
        .fold(0u32, |acc, (i, &b)| acc | ((b as u32) << (8 * i)))
}

/// Bytes at pattern position `j..j+b`, zero-padded past the pattern's own
/// length (needed when the pattern is shorter than the shared window `m`).
fn pattern_block(pattern: &[u8], j: usize, b: usize, fold: bool) -> Vec<u8> {
    let mut block = vec![0u8; b];
    for (k, slot) in block.iter_mut().enumerate() {
        if let Some(&raw) = pattern.get(j + k) {
            *slot = if fold { fold_byte(raw) } else { raw };
        }
    }
    block
}

fn fold_slice(bytes: &[u8], fold: bool) -> Vec<u8> {
    if fold {
        fold_bytes(bytes)
    } else {
        bytes.to_vec()
    }
}

struct WmSubTable {
    fold: bool,
    b: usize,
    m: usize,
    shift: Vec<u32>,
    hash_head: Vec<Option<u32>>,
    next: Vec<Option<u32>>,
    prefix_hash: Vec<u32>,
    bloom: Option<BloomFilter>,
    /// Patterns shorter than the block size `b`: the block-hash table's key
    /// space assumes every probe covers exactly `b` real bytes, so a
    /// pattern with fewer bytes than that can never produce a matching
    /// `prefix_hash` and is verified by direct scan instead (spec §4.7).
    short_patterns: Vec<u32>,
}

impl WmSubTable {
    fn build(
        signatures: &[&Signature],
        global_count: usize,
        fold: bool,
        bloom_enabled: bool,
        config: &WmConfig,
    ) -> Self {
        let min_length = signatures.iter().map(|s| s.len()).min().unwrap_or(0);
        let total_length: usize = signatures.iter().map(|s| s.len()).sum();
        let avg_length = total_length as f64 / signatures.len().max(1) as f64;
        let b = config
            .block_size_override
            .unwrap_or_else(|| choose_block_size(signatures.len(), min_length, avg_length))
            as usize;
        let m = min_length.max(b);

        let mut shift = vec![(m - b + 1) as u32; WM_TABLE_SIZE];
        let mut hash_head: Vec<Option<u32>> = vec![None; WM_TABLE_SIZE];
        let mut next: Vec<Option<u32>> = vec![None; global_count];
        let mut prefix_hash: Vec<u32> = vec![0; global_count];
        let mut bloom = bloom_enabled.then(|| BloomFilter::new(signatures.len(), config.bloom_false_positive_rate));
        let mut short_patterns = Vec::new();

        for sig in signatures {
            let pid = sig.id as usize;

            // A pattern shorter than `b` has no `b`-byte prefix to hash: the
            // scan-time probe always reads exactly `b` real text bytes, so
            // hashing a zero-padded or truncated prefix here would never
            // collide with it. Route it to the brute-force fallback instead
            // of inserting it into tables it can never be found through.
            if sig.len() < b {
                short_patterns.push(sig.id);
                continue;
            }

            let prefix_len = b;
            prefix_hash[pid] = fnv1a(&fold_slice(&sig.pattern[..prefix_len], fold));

            let mut suffix_idx = 0usize;
            for j in 0..=(m - b) {
                let block = pattern_block(&sig.pattern, j, b, fold);
                let key = block_key(&block);
                let idx = (key as usize) & WM_TABLE_MASK;
                let new_shift = (m - j - b) as u32;
                if new_shift < shift[idx] {
                    shift[idx] = new_shift;
                }
                if j == m - b {
                    suffix_idx = idx;
                }
            }
            next[pid] = hash_head[suffix_idx];
            hash_head[suffix_idx] = Some(sig.id);

            if let Some(bloom) = bloom.as_mut() {
                bloom.insert(&fold_slice(&sig.pattern[..prefix_len], fold));
            }
        }

        Self {
            fold,
            b,
            m,
            shift,
            hash_head,
            next,
            prefix_hash,
            bloom,
            short_patterns,
        }
    }

    /// Brute-force verification for patterns shorter than the block size,
    /// which the windowed block-hash scan in [`Self::scan_into`] can never
    /// address through `prefix_hash` (see the `short_patterns` field doc).
    fn scan_short(
        &self,
        text: &[u8],
        pat_len: &[u32],
        pat_cmp_bytes: &[Vec<u8>],
        nocase: &[bool],
        stats: &mut Stats,
        on_match: &mut impl FnMut(Match) -> ScanControl,
    ) -> ScanControl {
        let n = text.len();
        for &pid in &self.short_patterns {
            let len = pat_len[pid as usize] as usize;
            if len == 0 || len > n {
                continue;
            }
            for start in 0..=(n - len) {
                stats.windows += 1;
                let candidate = &text[start..start + len];
                let matched = if nocase[pid as usize] {
                    fold_bytes(candidate) == pat_cmp_bytes[pid as usize]
                } else {
                    candidate == pat_cmp_bytes[pid as usize].as_slice()
                };
                if matched {
                    stats.exact_matches += 1;
                    stats.matches += 1;
                    let m = Match {
                        pid,
                        start: start as u64,
                    };
                    if on_match(m) == ScanControl::Stop {
                        return ScanControl::Stop;
                    }
                }
            }
        }
        ScanControl::Continue
    }

    #[allow(clippy::too_many_arguments)]
    fn scan_into(
        &self,
        text: &[u8],
        pat_len: &[u32],
        pat_cmp_bytes: &[Vec<u8>],
        nocase: &[bool],
        stats: &mut Stats,
        on_match: &mut impl FnMut(Match) -> ScanControl,
    ) -> ScanControl {
        let n = text.len();

        if !self.short_patterns.is_empty()
            && self.scan_short(text, pat_len, pat_cmp_bytes, nocase, stats, on_match) == ScanControl::Stop
        {
            return ScanControl::Stop;
        }

        if n < self.m {
            return ScanControl::Continue;
        }

        let mut i = self.m - 1;
        while i < n {
            stats.windows += 1;
            let block_start = i + 1 - self.b;
            let raw_block = &text[block_start..=i];
            let block = fold_slice(raw_block, self.fold);
            let key = block_key(&block);
            let idx = (key as usize) & WM_TABLE_MASK;
            let shift = self.shift[idx];

            if shift > 0 {
                stats.sum_shift += shift as u64;
                i += shift as usize;
                continue;
            }

            let window_start = i + 1 - self.m;

            if let Some(bloom) = &self.bloom {
                stats.bloom_checks += 1;
                let probe = fold_slice(&text[window_start..window_start + self.b], self.fold);
                if !bloom.check(&probe) {
                    i += 1;
                    continue;
                }
                stats.bloom_pass += 1;
            }

            let hash_probe = fold_slice(&text[window_start..window_start + self.b], self.fold);
            let h = fnv1a(&hash_probe);
            stats.hash_hits += 1;

            let mut cursor = self.hash_head[idx];
            while let Some(pid) = cursor {
                stats.chain_steps += 1;
                if self.prefix_hash[pid as usize] == h {
                    let len = pat_len[pid as usize] as usize;
                    if window_start + len <= n {
                        let candidate = &text[window_start..window_start + len];
                        let matched = if nocase[pid as usize] {
                            fold_bytes(candidate) == pat_cmp_bytes[pid as usize]
                        } else {
                            candidate == pat_cmp_bytes[pid as usize].as_slice()
                        };
                        if matched {
                            stats.exact_matches += 1;
                            stats.matches += 1;
                            let m = Match {
                                pid,
                                start: window_start as u64,
                            };
                            if on_match(m) == ScanControl::Stop {
                                return ScanControl::Stop;
                            }
                        }
                    }
                }
                cursor = self.next[pid as usize];
            }
            i += 1;
        }
        ScanControl::Continue
    }
}

/// Shared implementation behind both the deterministic and Bloom-filtered
/// Wu–Manber engines.
struct WmCore {
    subtables: Vec<WmSubTable>,
    pat_len: Vec<u32>,
    pat_cmp_bytes: Vec<Vec<u8>>,
    nocase: Vec<bool>,
}

impl WmCore {
    fn build(set: &SignatureSet, bloom_enabled: bool, config: &WmConfig) -> Result<Self, DetectionError> {
        if set.is_empty() {
            return Err(DetectionError::EmptySet);
        }

        let mut pat_len = vec![0u32; set.len()];
        let mut pat_cmp_bytes = vec![Vec::new(); set.len()];
        let mut nocase = vec![false; set.len()];
        for sig in set.signatures() {
            let pid = sig.id as usize;
            pat_len[pid] = sig.len() as u32;
            nocase[pid] = sig.nocase;
            pat_cmp_bytes[pid] = fold_slice(&sig.pattern, sig.nocase);
        }

        let nocase_sigs: Vec<&Signature> = set.signatures().iter().filter(|s| s.nocase).collect();
        let case_sigs: Vec<&Signature> = set.signatures().iter().filter(|s| !s.nocase).collect();

        let mut subtables = Vec::with_capacity(2);
        if !nocase_sigs.is_empty() {
            subtables.push(WmSubTable::build(&nocase_sigs, set.len(), true, bloom_enabled, config));
        }
        if !case_sigs.is_empty() {
            subtables.push(WmSubTable::build(&case_sigs, set.len(), false, bloom_enabled, config));
        }

        Ok(Self {
            subtables,
            pat_len,
            pat_cmp_bytes,
            nocase,
        })
    }

    fn scan(&self, name: &'static str, text: &[u8], mut on_match: impl FnMut(Match) -> ScanControl) -> Stats {
        let mut stats = Stats::new(name, text.len());
        let start = Instant::now();
        for table in &self.subtables {
            let ctrl = table.scan_into(
                text,
                &self.pat_len,
                &self.pat_cmp_bytes,
                &self.nocase,
                &mut stats,
                &mut on_match,
            );
            if ctrl == ScanControl::Stop {
                break;
            }
        }
        stats.set_elapsed(start.elapsed());
        stats
    }
}

/// Deterministic Wu–Manber: suffix hash chain verified by prefix-hash
/// comparison only, no Bloom filter.
pub struct WuManberDetEngine(WmCore);

impl WuManberDetEngine {
    pub fn preprocess_with_config(set: &SignatureSet, config: &WmConfig) -> Result<Self, DetectionError> {
        Ok(Self(WmCore::build(set, false, config)?))
    }
}

impl Engine for WuManberDetEngine {
    const NAME: &'static str = "wu-manber-det";

    fn preprocess(set: &SignatureSet) -> Result<Self, DetectionError> {
        Self::preprocess_with_config(set, &WmConfig::default())
    }

    fn scan(&self, text: &[u8], on_match: impl FnMut(Match) -> ScanControl) -> Stats {
        self.0.scan(Self::NAME, text, on_match)
    }
}

/// Probabilistic Wu–Manber: adds a Bloom prefix filter ahead of the hash
/// chain walk. Never produces false negatives (spec §8 Universality).
pub struct WuManberProbEngine(WmCore);

impl WuManberProbEngine {
    pub fn preprocess_with_config(set: &SignatureSet, config: &WmConfig) -> Result<Self, DetectionError> {
        Ok(Self(WmCore::build(set, true, config)?))
    }
}

impl Engine for WuManberProbEngine {
    const NAME: &'static str = "wu-manber-prob";

    fn preprocess(set: &SignatureSet) -> Result<Self, DetectionError> {
        Self::preprocess_with_config(set, &WmConfig::default())
    }

    fn scan(&self, text: &[u8], on_match: impl FnMut(Match) -> ScanControl) -> Stats {
        self.0.scan(Self::NAME, text, on_match)
    }
}
