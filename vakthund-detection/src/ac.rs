//! ## vakthund-detection::ac
//! **Aho–Corasick engine: trie + failure links + output sets, linear-time
//! scan.**
//!
//! A mixed-case signature set is split into two independent automata (one
//! case-folded, one case-sensitive) that are advanced in lockstep over the
//! same input, per spec §4.2: "If the set is mixed, a separate
//! case-sensitive AC must be maintained for the case-sensitive patterns."

use std::rc::Rc;
use std::time::Instant;

use crate::engine::{Engine, Match, ScanControl};
use crate::error::DetectionError;
use crate::signature::{fold_byte, SignatureSet};
use crate::stats::Stats;

const NO_STATE: u32 = u32::MAX;
const ROOT: u32 = 0;

struct Node {
    trans: Box<[u32]>,
    fail: u32,
    /// Pattern ids ending exactly at this state.
    own: Vec<u32>,
    /// `own` merged with the failure node's output, shared by `Rc` so that
    /// states on the same failure chain don't duplicate the pattern-id
    /// list (spec §9: share output sets by reference).
    output: Rc<Vec<u32>>,
}

impl Node {
    fn new() -> Self {
        Self {
            trans: vec![NO_STATE; 256].into_boxed_slice(),
            fail: ROOT,
            own: Vec::new(),
            output: Rc::new(Vec::new()),
        }
    }
}

/// One case-homogeneous trie. `fold` selects whether inserted and scanned
/// bytes are case-folded before use.
struct Automaton {
    nodes: Vec<Node>,
    fold: bool,
}

impl Automaton {
    fn build(patterns: &[(u32, &[u8])], fold: bool) -> Self {
        let mut nodes = vec![Node::new()];
        for &(pid, pattern) in patterns {
            let mut cur = ROOT;
            for &raw in pattern {
                let b = if fold { fold_byte(raw) } else { raw } as usize;
                let next = nodes[cur as usize].trans[b];
                cur = if next != NO_STATE {
                    next
                } else {
                    nodes.push(Node::new());
                    let new_id = (nodes.len() - 1) as u32;
                    nodes[cur as usize].trans[b] = new_id;
                    new_id
                };
            }
            nodes[cur as usize].own.push(pid);
        }

        let mut automaton = Self { nodes, fold };
        automaton.build_failure_links();
        automaton.gapfill_root();
        automaton
    }

    /// Breadth-first failure-link construction (spec §4.2): for root's
    /// children, failure = root; for any other node reached via byte `c`
    /// from parent `p`, failure = the already-resolved transition function
    /// applied to `(fail(p), c)`.
    fn build_failure_links(&mut self) {
        use std::collections::VecDeque;

        let mut queue = VecDeque::new();
        for b in 0..256 {
            let child = self.nodes[ROOT as usize].trans[b];
            if child != NO_STATE {
                self.nodes[child as usize].fail = ROOT;
                self.merge_output(child);
                queue.push_back(child);
            }
        }

        while let Some(state) = queue.pop_front() {
            // Snapshot this state's direct transitions before mutating
            // descendants, since `goto` below may touch other nodes.
            let transitions: Vec<(usize, u32)> = self.nodes[state as usize]
                .trans
                .iter()
                .enumerate()
                .filter(|&(_, &next)| next != NO_STATE)
                .map(|(b, &next)| (b, next))
                .collect();

            for (b, child) in transitions {
                let parent_fail = self.nodes[state as usize].fail;
                let fail = self.goto(parent_fail, b as u8);
                self.nodes[child as usize].fail = fail;
                self.merge_output(child);
                queue.push_back(child);
            }
        }
    }

    /// `δ*(state, byte)`: follows failure links until a defined transition
    /// is found, or until root (which is always total once constructed via
    /// insertion so far — root's still-missing slots resolve to the
    /// self-loop only after [`Self::gapfill_root`], but during failure-link
    /// construction undefined root slots fall back to root itself, matching
    /// the standard textbook formulation).
    fn goto(&self, mut state: u32, byte: u8) -> u32 {
        loop {
            let next = self.nodes[state as usize].trans[byte as usize];
            if next != NO_STATE {
                return next;
            }
            if state == ROOT {
                return ROOT;
            }
            state = self.nodes[state as usize].fail;
        }
    }

    fn merge_output(&mut self, state: u32) {
        let fail = self.nodes[state as usize].fail;
        let own_empty = self.nodes[state as usize].own.is_empty();
        let fail_output = Rc::clone(&self.nodes[fail as usize].output);
        self.nodes[state as usize].output = if own_empty {
            fail_output
        } else {
            let mut combined = self.nodes[state as usize].own.clone();
            combined.extend_from_slice(&fail_output);
            Rc::new(combined)
        };
    }

    fn gapfill_root(&mut self) {
        for b in 0..256 {
            if self.nodes[ROOT as usize].trans[b] == NO_STATE {
                self.nodes[ROOT as usize].trans[b] = ROOT;
            }
        }
    }

    /// Advances `state` by one byte, returning the new state and the
    /// number of failure hops taken.
    fn step(&self, state: u32, byte: u8) -> (u32, u64) {
        let b = if self.fold { fold_byte(byte) } else { byte } as usize;
        let mut s = state;
        let mut fail_steps = 0u64;
        while s != ROOT && self.nodes[s as usize].trans[b] == NO_STATE {
            s = self.nodes[s as usize].fail;
            fail_steps += 1;
        }
        let next = self.nodes[s as usize].trans[b];
        (if next == NO_STATE { ROOT } else { next }, fail_steps)
    }

    fn output(&self, state: u32) -> &[u32] {
        &self.nodes[state as usize].output
    }
}

pub struct AhoCorasickEngine {
    case_sensitive: Option<Automaton>,
    case_insensitive: Option<Automaton>,
    pat_len: Vec<u32>,
}

impl Engine for AhoCorasickEngine {
    const NAME: &'static str = "aho-corasick";

    fn preprocess(set: &SignatureSet) -> Result<Self, DetectionError> {
        if set.is_empty() {
            return Err(DetectionError::EmptySet);
        }

        let mut pat_len = vec![0u32; set.len()];
        for sig in set.signatures() {
            pat_len[sig.id as usize] = sig.len() as u32;
        }

        let nocase_patterns: Vec<(u32, &[u8])> = set
            .signatures()
            .iter()
            .filter(|s| s.nocase)
            .map(|s| (s.id, s.pattern.as_slice()))
            .collect();
        let case_patterns: Vec<(u32, &[u8])> = set
            .signatures()
            .iter()
            .filter(|s| !s.nocase)
            .map(|s| (s.id, s.pattern.as_slice()))
            .collect();

        let case_insensitive = if nocase_patterns.is_empty() {
            None
        } else {
            Some(Automaton::build(&nocase_patterns, true))
        };
        let case_sensitive = if case_patterns.is_empty() {
            None
        } else {
            Some(Automaton::build(&case_patterns, false))
        };

        Ok(Self {
            case_sensitive,
            case_insensitive,
            pat_len,
        })
    }

    fn scan(&self, text: &[u8], mut on_match: impl FnMut(Match) -> ScanControl) -> Stats {
        let mut stats = Stats::new(Self::NAME, text.len());
        let mut cs_state = ROOT;
        let mut ci_state = ROOT;
        let start = Instant::now();

        for (i, &byte) in text.iter().enumerate() {
            if let Some(auto) = &self.case_sensitive {
                let (next, fail_steps) = auto.step(cs_state, byte);
                cs_state = next;
                stats.transitions += 1;
                stats.fail_steps += fail_steps;
                for &pid in auto.output(cs_state) {
                    let len = self.pat_len[pid as usize] as u64;
                    stats.matches += 1;
                    let m = Match {
                        pid,
                        start: (i as u64 + 1).saturating_sub(len),
                    };
                    if on_match(m) == ScanControl::Stop {
                        stats.set_elapsed(start.elapsed());
                        return stats;
                    }
                }
            }
            if let Some(auto) = &self.case_insensitive {
                let (next, fail_steps) = auto.step(ci_state, byte);
                ci_state = next;
                stats.transitions += 1;
                stats.fail_steps += fail_steps;
                for &pid in auto.output(ci_state) {
                    let len = self.pat_len[pid as usize] as u64;
                    stats.matches += 1;
                    let m = Match {
                        pid,
                        start: (i as u64 + 1).saturating_sub(len),
                    };
                    if on_match(m) == ScanControl::Stop {
                        stats.set_elapsed(start.elapsed());
                        return stats;
                    }
                }
            }
        }

        stats.set_elapsed(start.elapsed());
        stats
    }
}
