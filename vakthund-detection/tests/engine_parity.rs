//! Cross-engine agreement and the concrete scenarios spec'd for this
//! scanner: every engine must report the same multiset of `(pid, start)`
//! pairs over the same `(SignatureSet, buffer)` pair.

use std::collections::HashMap;

use proptest::prelude::*;

use vakthund_detection::{
    AhoCorasickEngine, BoyerMooreEngine, Engine, SetHorspoolEngine, SignatureSet,
    WuManberDetEngine, WuManberProbEngine,
};

fn build_set(entries: &[(&str, bool)]) -> SignatureSet {
    SignatureSet::build(
        entries
            .iter()
            .map(|&(p, nocase)| (p.as_bytes().to_vec(), nocase, None))
            .collect(),
    )
    .unwrap()
}

fn multiset(matches: &[vakthund_detection::Match]) -> HashMap<(u32, u64), usize> {
    let mut counts = HashMap::new();
    for m in matches {
        *counts.entry((m.pid, m.start)).or_insert(0) += 1;
    }
    counts
}

/// Scans `text` with all five engines built over `set` and asserts every
/// one reports the identical match multiset (spec §8 Universality).
fn assert_all_engines_agree(set: &SignatureSet, text: &[u8]) {
    let ac = AhoCorasickEngine::preprocess(set).unwrap();
    let wm_det = WuManberDetEngine::preprocess(set).unwrap();
    let wm_prob = WuManberProbEngine::preprocess(set).unwrap();
    let sh = SetHorspoolEngine::preprocess(set).unwrap();
    let bm = BoyerMooreEngine::preprocess(set).unwrap();

    let (ac_matches, _) = ac.scan_all(text);
    let (wm_det_matches, _) = wm_det.scan_all(text);
    let (wm_prob_matches, _) = wm_prob.scan_all(text);
    let (sh_matches, _) = sh.scan_all(text);
    let (bm_matches, _) = bm.scan_all(text);

    let reference = multiset(&ac_matches);
    assert_eq!(multiset(&wm_det_matches), reference, "wu-manber-det disagrees with aho-corasick");
    assert_eq!(multiset(&wm_prob_matches), reference, "wu-manber-prob disagrees with aho-corasick (Bloom unsoundness)");
    assert_eq!(multiset(&sh_matches), reference, "set-horspool disagrees with aho-corasick");
    assert_eq!(multiset(&bm_matches), reference, "boyer-moore disagrees with aho-corasick");
}

#[test]
fn scenario_1_classic_he_she_his_hers() {
    let set = build_set(&[("he", false), ("she", false), ("his", false), ("hers", false)]);
    let text = b"ushers";
    assert_all_engines_agree(&set, text);

    let ac = AhoCorasickEngine::preprocess(&set).unwrap();
    let (matches, _) = ac.scan_all(text);
    let got: std::collections::HashSet<(u32, u64)> = matches.iter().map(|m| (m.pid, m.start)).collect();
    let expected: std::collections::HashSet<(u32, u64)> = [(1u32, 1u64), (0, 2), (3, 2)].into_iter().collect();
    assert_eq!(got, expected);
}

#[test]
fn scenario_2_malware_evil_bad() {
    let set = build_set(&[("MALWARE", false), ("EVIL", false), ("BAD", false)]);
    let text = b"THISBADFILEHASAVIRUSEVILMALWAREINSIDE";
    assert_all_engines_agree(&set, text);

    let ac = AhoCorasickEngine::preprocess(&set).unwrap();
    let (matches, _) = ac.scan_all(text);
    let got: std::collections::HashSet<(u32, u64)> = matches.iter().map(|m| (m.pid, m.start)).collect();
    let expected: std::collections::HashSet<(u32, u64)> =
        [(2u32, 4u64), (1, 20), (0, 24)].into_iter().collect();
    assert_eq!(got, expected);
}

#[test]
fn scenario_3_overlap_aa_in_aaaa() {
    let set = build_set(&[("aa", false)]);
    let text = b"aaaa";
    assert_all_engines_agree(&set, text);

    let ac = AhoCorasickEngine::preprocess(&set).unwrap();
    let (matches, _) = ac.scan_all(text);
    let mut starts: Vec<u64> = matches.iter().map(|m| m.start).collect();
    starts.sort_unstable();
    assert_eq!(starts, vec![0, 1, 2]);
}

#[test]
fn scenario_4_nocase_abc() {
    let set = build_set(&[("abc", true)]);
    let text = b"xxABcyyabCzz";
    assert_all_engines_agree(&set, text);

    let ac = AhoCorasickEngine::preprocess(&set).unwrap();
    let (matches, _) = ac.scan_all(text);
    let mut starts: Vec<u64> = matches.iter().map(|m| m.start).collect();
    starts.sort_unstable();
    assert_eq!(starts, vec![2, 7]);
}

#[test]
fn scenario_5_raw_bytes_not_restricted_to_text() {
    let set = SignatureSet::build(vec![(vec![0x00, 0x01, 0x02], false, None)]).unwrap();
    let text: &[u8] = &[0xff, 0x00, 0x01, 0x02, 0x00, 0x01, 0x02];
    assert_all_engines_agree(&set, text);

    let ac = AhoCorasickEngine::preprocess(&set).unwrap();
    let (matches, _) = ac.scan_all(text);
    let mut starts: Vec<u64> = matches.iter().map(|m| m.start).collect();
    starts.sort_unstable();
    assert_eq!(starts, vec![1, 4]);
}

#[test]
fn scenario_6_http_request_smuggled_credentials() {
    let set = build_set(&[("/etc/passwd", false), ("cmd.exe", false), ("USER anonymous", false)]);
    let text = b"GET /etc/passwd HTTP/1.0\r\nUSER anonymous\r\n";
    assert_all_engines_agree(&set, text);

    let ac = AhoCorasickEngine::preprocess(&set).unwrap();
    let (matches, _) = ac.scan_all(text);
    let mut starts: Vec<u64> = matches.iter().map(|m| m.start).collect();
    starts.sort_unstable();
    assert_eq!(starts, vec![4, 26]);
}

#[test]
fn boundary_matches_prefix_suffix_and_whole_buffer() {
    let text = b"abcdefgh";

    let prefix_set = build_set(&[("abc", false)]);
    let ac = AhoCorasickEngine::preprocess(&prefix_set).unwrap();
    let (matches, _) = ac.scan_all(text);
    assert!(matches.iter().any(|m| m.pid == 0 && m.start == 0));

    let suffix_set = build_set(&[("fgh", false)]);
    let ac = AhoCorasickEngine::preprocess(&suffix_set).unwrap();
    let (matches, _) = ac.scan_all(text);
    assert!(matches.iter().any(|m| m.pid == 0 && m.start == (text.len() - 3) as u64));

    let whole_set = build_set(&[("abcdefgh", false)]);
    let ac = AhoCorasickEngine::preprocess(&whole_set).unwrap();
    let (matches, _) = ac.scan_all(text);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].start, 0);
}

#[test]
fn empty_input_is_well_formed_across_engines() {
    let set = build_set(&[("needle", false)]);

    let (ac_matches, ac_stats) = AhoCorasickEngine::preprocess(&set).unwrap().scan_all(b"");
    let (wm_det_matches, wm_det_stats) = WuManberDetEngine::preprocess(&set).unwrap().scan_all(b"");
    let (wm_prob_matches, wm_prob_stats) = WuManberProbEngine::preprocess(&set).unwrap().scan_all(b"");
    let (sh_matches, sh_stats) = SetHorspoolEngine::preprocess(&set).unwrap().scan_all(b"");
    let (bm_matches, bm_stats) = BoyerMooreEngine::preprocess(&set).unwrap().scan_all(b"");

    for matches in [&ac_matches, &wm_det_matches, &wm_prob_matches, &sh_matches, &bm_matches] {
        assert!(matches.is_empty());
    }
    for stats in [&ac_stats, &wm_det_stats, &wm_prob_stats, &sh_stats, &bm_stats] {
        assert!(stats.elapsed_sec >= 0.0);
    }
}

#[test]
fn determinism_repeated_scans_match() {
    let set = build_set(&[("he", false), ("she", false), ("his", false), ("hers", false)]);
    let wm = WuManberProbEngine::preprocess(&set).unwrap();
    let (first, first_stats) = wm.scan_all(b"ushers and his hat");
    let (second, second_stats) = wm.scan_all(b"ushers and his hat");
    assert_eq!(first, second);
    assert_eq!(first_stats.matches, second_stats.matches);
    assert_eq!(first_stats.hash_hits, second_stats.hash_hits);
}

proptest! {
    /// Arbitrary short ASCII literals scanned over arbitrary ASCII text:
    /// every engine must still agree (spec §8 Universality), not just the
    /// six hand-picked scenarios above.
    #[test]
    fn universality_over_random_ascii_inputs(
        patterns in prop::collection::vec("[a-d]{1,4}", 1..5),
        text in "[a-d]{0,40}",
    ) {
        let entries: Vec<(&str, bool)> = patterns.iter().map(|p| (p.as_str(), false)).collect();
        let set = build_set(&entries);
        assert_all_engines_agree(&set, text.as_bytes());
    }
}
