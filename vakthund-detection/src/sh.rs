//! ## vakthund-detection::sh
//! **Set–Horspool engine: one unified bad-character shift table over the
//! shortest-pattern window, plus a per-end-character candidate bucket.**
//!
//! Verification is restricted to `bucket[e]` — the patterns whose
//! position-`m-1` character is `e` — rather than re-testing every pattern
//! whenever `shift==0`, which spec §4.4 identifies as the source of
//! quadratic behavior in a naive implementation.

use std::time::Instant;

use crate::engine::{Engine, Match, ScanControl};
use crate::error::DetectionError;
use crate::signature::{fold_byte, SignatureSet};
use crate::stats::Stats;

pub struct SetHorspoolEngine {
    m: usize,
    shift: [usize; 256],
    bucket: Vec<Vec<u32>>,
    pat_len: Vec<u32>,
    pat_cmp_bytes: Vec<Vec<u8>>,
    nocase: Vec<bool>,
}

impl Engine for SetHorspoolEngine {
    const NAME: &'static str = "set-horspool";

    fn preprocess(set: &SignatureSet) -> Result<Self, DetectionError> {
        if set.is_empty() {
            return Err(DetectionError::EmptySet);
        }

        let m = set.min_length();
        let mut shift = [m; 256];
        let mut bucket: Vec<Vec<u32>> = vec![Vec::new(); 256];
        let mut pat_len = vec![0u32; set.len()];
        let mut pat_cmp_bytes = vec![Vec::new(); set.len()];
        let mut nocase = vec![false; set.len()];

        for sig in set.signatures() {
            let pid = sig.id as usize;
            pat_len[pid] = sig.len() as u32;
            nocase[pid] = sig.nocase;
            pat_cmp_bytes[pid] = sig.pattern.clone();

            for i in 0..m.saturating_sub(1) {
                let c = sig.pattern[i];
                let d = m - 1 - i;
                update_shift(&mut shift, c, d);
                if sig.nocase && c.is_ascii_alphabetic() {
                    update_shift(&mut shift, other_case(c), d);
                }
            }

            let end_byte = sig.pattern[m - 1];
            bucket[end_byte as usize].push(sig.id);
            if sig.nocase && end_byte.is_ascii_alphabetic() {
                bucket[other_case(end_byte) as usize].push(sig.id);
            }
        }

        Ok(Self {
            m,
            shift,
            bucket,
            pat_len,
            pat_cmp_bytes,
            nocase,
        })
    }

    fn scan(&self, text: &[u8], mut on_match: impl FnMut(Match) -> ScanControl) -> Stats {
        let mut stats = Stats::new(Self::NAME, text.len());
        let start = Instant::now();
        let n = text.len();

        if self.m == 0 || n < self.m {
            stats.set_elapsed(start.elapsed());
            return stats;
        }

        let mut pos = 0usize;
        while pos + self.m <= n {
            stats.windows += 1;
            let e = text[pos + self.m - 1];
            let s = self.shift[e as usize];

            // `shift[e]` is built only from interior pattern positions
            // (preprocess loops `0..m-1`), so an end-only character — one
            // that appears as some pattern's last byte but never at an
            // interior position of any pattern — keeps the default shift
            // `m` even though `bucket[e]` holds real candidates here.
            // Verification must not be gated on `s`; `bucket[e]` is empty
            // for every other character, so checking it unconditionally
            // stays cheap.
            let mut any_match = false;
            for &pid in &self.bucket[e as usize] {
                stats.comparisons += 1;
                let len = self.pat_len[pid as usize] as usize;
                if pos + len > n {
                    continue;
                }
                let candidate = &text[pos..pos + len];
                let matched = if self.nocase[pid as usize] {
                    candidate
                        .iter()
                        .zip(self.pat_cmp_bytes[pid as usize].iter())
                        .all(|(&a, &b)| fold_byte(a) == fold_byte(b))
                } else {
                    candidate == self.pat_cmp_bytes[pid as usize].as_slice()
                };
                if matched {
                    any_match = true;
                    stats.matches += 1;
                    let m = Match {
                        pid,
                        start: pos as u64,
                    };
                    if on_match(m) == ScanControl::Stop {
                        stats.set_elapsed(start.elapsed());
                        return stats;
                    }
                }
            }

            stats.shifts += 1;
            if any_match {
                pos += 1;
            } else {
                pos += s.max(1);
            }
        }

        stats.set_elapsed(start.elapsed());
        stats
    }
}

fn update_shift(shift: &mut [usize; 256], c: u8, d: usize) {
    let slot = &mut shift[c as usize];
    if d < *slot {
        *slot = d;
    }
}

fn other_case(c: u8) -> u8 {
    if c.is_ascii_uppercase() {
        c + (b'a' - b'A')
    } else {
        c - (b'a' - b'A')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn build(entries: Vec<(&str, bool)>) -> SetHorspoolEngine {
        let set = SignatureSet::build(
            entries
                .into_iter()
                .map(|(p, nocase)| (p.as_bytes().to_vec(), nocase, None))
                .collect(),
        )
        .unwrap();
        SetHorspoolEngine::preprocess(&set).unwrap()
    }

    #[test]
    fn classic_he_she_his_hers() {
        let engine = build(vec![("he", false), ("she", false), ("his", false), ("hers", false)]);
        let (matches, stats) = engine.scan_all(b"ushers");
        let got: HashSet<(u32, u64)> = matches.iter().map(|m| (m.pid, m.start)).collect();
        let expected: HashSet<(u32, u64)> = [(1, 1), (0, 2), (3, 2)].into_iter().collect();
        assert_eq!(got, expected);
        assert!(stats.comparisons > 0);
    }

    #[test]
    fn overlap_aa_in_aaaa() {
        let engine = build(vec![("aa", false)]);
        let (matches, _) = engine.scan_all(b"aaaa");
        let mut starts: Vec<u64> = matches.iter().map(|m| m.start).collect();
        starts.sort_unstable();
        assert_eq!(starts, vec![0, 1, 2]);
    }

    #[test]
    fn nocase_matches_every_case_variant() {
        let engine = build(vec![("abc", true)]);
        let (matches, _) = engine.scan_all(b"xxABcyyabCzz");
        let mut starts: Vec<u64> = matches.iter().map(|m| m.start).collect();
        starts.sort_unstable();
        assert_eq!(starts, vec![2, 7]);
    }

    #[test]
    fn case_sensitive_pattern_rejects_other_cases() {
        let engine = build(vec![("AbC", false)]);
        let (matches, _) = engine.scan_all(b"abcABCAbC");
        let starts: Vec<u64> = matches.iter().map(|m| m.start).collect();
        assert_eq!(starts, vec![6]);
    }

    #[test]
    fn empty_input_yields_no_matches() {
        let engine = build(vec![("needle", false)]);
        let (matches, stats) = engine.scan_all(b"");
        assert!(matches.is_empty());
        assert!(stats.elapsed_sec >= 0.0);
    }

    #[test]
    fn cancellation_stops_scan_early() {
        let engine = build(vec![("a", false)]);
        let mut seen = 0;
        let _ = engine.scan(b"aaaa", |_| {
            seen += 1;
            ScanControl::Stop
        });
        assert_eq!(seen, 1);
    }
}
