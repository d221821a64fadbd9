//! ## vakthund-detection::bm
//! **Per-pattern Boyer–Moore engine.**
//!
//! No cross-pattern sharing: each signature gets its own bad-character and
//! good-suffix tables and is scanned independently. This is the slowest of
//! the four engines by design (spec §4.5: "comparative... the worst of the
//! four") but must still be fully correct, including on the overlapping-
//! match case after a full match.

use std::time::Instant;

use crate::engine::{Engine, Match, ScanControl};
use crate::error::DetectionError;
use crate::signature::{fold_byte, SignatureSet};
use crate::stats::Stats;

/// Classic Boyer–Moore-Horspool "suffixes" helper (Charras & Lecroq):
/// `suff[i]` is the length of the longest suffix of `pattern[0..=i]` that
/// is also a suffix of the whole pattern.
fn suffixes(pattern: &[u8]) -> Vec<usize> {
    let m = pattern.len();
    let mut suff = vec![0usize; m];
    suff[m - 1] = m;
    if m == 1 {
        return suff;
    }

    let mut g: isize = (m - 1) as isize;
    let mut f: isize = 0;
    for i in (0..=(m - 2)).rev() {
        let ii = i as isize;
        if ii > g && suff[(ii + m as isize - 1 - f) as usize] < ii - g {
            suff[i] = suff[(ii + m as isize - 1 - f) as usize];
        } else {
            if ii < g {
                g = ii;
            }
            f = ii;
            while g >= 0 && pattern[g as usize] == pattern[(g + m as isize - 1 - f) as usize] {
                g -= 1;
            }
            suff[i] = (f - g) as usize;
        }
    }
    suff
}

/// Strong good-suffix shift table, indexed by mismatch position `j`
/// (0-based, counting from the left): `bm_gs[j]` is the safe shift when
/// the suffix `pattern[j+1..]` has already matched.
fn good_suffix_shifts(pattern: &[u8]) -> Vec<usize> {
    let m = pattern.len();
    let suff = suffixes(pattern);
    let mut bm_gs = vec![m; m];

    let mut j = 0usize;
    for i in (0..m).rev() {
        if suff[i] == i + 1 {
            while j < m - 1 - i {
                if bm_gs[j] == m {
                    bm_gs[j] = m - 1 - i;
                }
                j += 1;
            }
        }
    }
    if m >= 2 {
        for i in 0..=(m - 2) {
            bm_gs[m - 1 - suff[i]] = m - 1 - i;
        }
    }
    bm_gs
}

/// Length of the longest proper border (prefix that is also a suffix) of
/// the whole pattern, via the standard KMP prefix function. This is the
/// quantity spec §4.5 calls `border[0]`, used to advance after a full
/// match: `shift += max(1, L - border[0])`.
fn whole_pattern_border(pattern: &[u8]) -> usize {
    let l = pattern.len();
    if l == 0 {
        return 0;
    }
    let mut pi = vec![0usize; l];
    let mut k = 0usize;
    for i in 1..l {
        while k > 0 && pattern[i] != pattern[k] {
            k = pi[k - 1];
        }
        if pattern[i] == pattern[k] {
            k += 1;
        }
        pi[i] = k;
    }
    pi[l - 1]
}

struct BmTable {
    pid: u32,
    pattern: Vec<u8>,
    nocase: bool,
    bad: [i64; 256],
    /// `good[k]`, `k = 0..=len`: safe shift when suffix `pattern[k..]` has
    /// already matched. `good[0]` is unused (mismatches always leave at
    /// least the position-0 character unmatched, i.e. `k >= 1`); the full
    /// pattern match case uses `border0` instead, per spec §4.5.
    good: Vec<usize>,
    border0: usize,
}

impl BmTable {
    fn build(pid: u32, pattern: Vec<u8>, nocase: bool) -> Self {
        let cmp_pattern: Vec<u8> = if nocase {
            pattern.iter().map(|&b| fold_byte(b)).collect()
        } else {
            pattern
        };

        let mut bad = [-1i64; 256];
        for (j, &b) in cmp_pattern.iter().enumerate() {
            bad[b as usize] = j as i64;
        }

        let bm_gs = good_suffix_shifts(&cmp_pattern);
        let mut good = vec![cmp_pattern.len(); cmp_pattern.len() + 1];
        for (j, &shift) in bm_gs.iter().enumerate() {
            good[j + 1] = shift;
        }
        let border0 = whole_pattern_border(&cmp_pattern);

        Self {
            pid,
            pattern: cmp_pattern,
            nocase,
            bad,
            good,
            border0,
        }
    }

    fn len(&self) -> usize {
        self.pattern.len()
    }

    fn scan_into(&self, text: &[u8], stats: &mut Stats, on_match: &mut impl FnMut(Match) -> ScanControl) -> ScanControl {
        let n = text.len();
        let l = self.len();
        if l > n {
            return ScanControl::Continue;
        }

        let mut shift = 0usize;
        while shift + l <= n {
            let mut j: isize = l as isize - 1;
            while j >= 0 {
                stats.comparisons += 1;
                let raw = text[shift + j as usize];
                let cmp = if self.nocase { fold_byte(raw) } else { raw };
                if cmp != self.pattern[j as usize] {
                    break;
                }
                j -= 1;
            }

            stats.shifts += 1;
            if j < 0 {
                stats.exact_matches += 1;
                stats.matches += 1;
                let m = Match {
                    pid: self.pid,
                    start: shift as u64,
                };
                if on_match(m) == ScanControl::Stop {
                    return ScanControl::Stop;
                }
                let advance = (l as isize - self.border0 as isize).max(1) as usize;
                shift += advance;
            } else {
                let j = j as usize;
                let raw = text[shift + j];
                let cmp = if self.nocase { fold_byte(raw) } else { raw };
                let bad_idx = self.bad[cmp as usize];
                let bad_skip: isize = if bad_idx < 0 {
                    (j + 1) as isize
                } else {
                    j as isize - bad_idx
                };
                let good_skip = self.good[j + 1] as isize;
                let advance = bad_skip.max(good_skip).max(1) as usize;
                shift += advance;
            }
        }
        ScanControl::Continue
    }
}

pub struct BoyerMooreEngine {
    tables: Vec<BmTable>,
}

impl Engine for BoyerMooreEngine {
    const NAME: &'static str = "boyer-moore";

    fn preprocess(set: &SignatureSet) -> Result<Self, DetectionError> {
        if set.is_empty() {
            return Err(DetectionError::EmptySet);
        }
        let tables = set
            .signatures()
            .iter()
            .map(|sig| BmTable::build(sig.id, sig.pattern.clone(), sig.nocase))
            .collect();
        Ok(Self { tables })
    }

    fn scan(&self, text: &[u8], mut on_match: impl FnMut(Match) -> ScanControl) -> Stats {
        let mut stats = Stats::new(Self::NAME, text.len());
        let start = Instant::now();
        for table in &self.tables {
            if table.scan_into(text, &mut stats, &mut on_match) == ScanControl::Stop {
                break;
            }
        }
        stats.set_elapsed(start.elapsed());
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn build(entries: Vec<(&str, bool)>) -> BoyerMooreEngine {
        let set = SignatureSet::build(
            entries
                .into_iter()
                .map(|(p, nocase)| (p.as_bytes().to_vec(), nocase, None))
                .collect(),
        )
        .unwrap();
        BoyerMooreEngine::preprocess(&set).unwrap()
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
    fn periodic_pattern_finds_overlapping_occurrence_after_full_match() {
        // "abab" has a proper border "ab" (period 2); a naive full-match
        // shift of the whole pattern length would skip the occurrence at
        // offset 2.
        let engine = build(vec![("abab", false)]);
        let (matches, _) = engine.scan_all(b"ababab");
        let mut starts: Vec<u64> = matches.iter().map(|m| m.start).collect();
        starts.sort_unstable();
        assert_eq!(starts, vec![0, 2]);
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
    fn empty_input_yields_no_matches() {
        let engine = build(vec![("needle", false)]);
        let (matches, stats) = engine.scan_all(b"");
        assert!(matches.is_empty());
        assert!(stats.elapsed_sec >= 0.0);
    }

    #[test]
    fn pattern_longer_than_buffer_never_matches() {
        let engine = build(vec![("a much longer needle than the haystack", false)]);
        let (matches, _) = engine.scan_all(b"short");
        assert!(matches.is_empty());
    }
}
