//! Shared engine contract implemented by every matcher in this crate
//! (spec §6: `preprocess(SignatureSet) -> Engine`, `scan(Engine, bytes) ->
//! stream of (pid, start_offset) + Stats`, `free(Engine)`).
//!
//! `free` is realized as `Drop`, since tables are owned for the lifetime
//! of the engine value and released when it goes out of scope — there is
//! no separate handle to invalidate.

use crate::error::DetectionError;
use crate::signature::SignatureSet;
use crate::stats::Stats;

/// A single reported occurrence. `start + pat_len[pid] <= buffer_len` is
/// guaranteed by every engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub pid: u32,
    pub start: u64,
}

/// Cooperative cancellation sentinel returned from a match callback.
/// Scans terminate at the next safe point: after the current byte in AC,
/// after the current window in WM/SH, after the current position in BM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanControl {
    Continue,
    Stop,
}

/// Implemented by every matching engine. Tables are built once per
/// `SignatureSet` and are read-only during scans.
pub trait Engine: Sized {
    const NAME: &'static str;

    /// Builds this engine's scan tables from a signature set.
    fn preprocess(set: &SignatureSet) -> Result<Self, DetectionError>;

    /// Scans `text`, invoking `on_match` for every occurrence found in
    /// nondecreasing start order per spec §4. Scanning is infallible;
    /// `on_match` returning `ScanControl::Stop` ends the scan early. The
    /// `Stats` record is always returned, even on early termination.
    fn scan(&self, text: &[u8], on_match: impl FnMut(Match) -> ScanControl) -> Stats;

    /// Convenience wrapper collecting every match into a `Vec`, for tests
    /// and callers that do not need cancellation.
    fn scan_all(&self, text: &[u8]) -> (Vec<Match>, Stats) {
        let mut out = Vec::new();
        let stats = self.scan(text, |m| {
            out.push(m);
            ScanControl::Continue
        });
        (out, stats)
    }
}
