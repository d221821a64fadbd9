//! ## vakthund-telemetry::metrics
//! **Prometheus recorder fed from each scan's `Stats` record.**
//!
//! This is telemetry *about* the per-scan `Stats` the engine already
//! returns (spec §4.6), not a replacement for it — `Stats` remains the
//! authoritative record handed back to the caller; `MetricsRecorder` just
//! accumulates it into a process-wide `Registry` so a long-running CLI
//! benchmarking session can export `/metrics`-style output across many
//! scans.

use prometheus::{CounterVec, HistogramOpts, HistogramVec, Opts, Registry};

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    pub matches_total: CounterVec,
    pub scan_latency_seconds: HistogramVec,
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRecorder {
    pub fn new() -> Self {
        let registry = Registry::new();

        let matches_total = CounterVec::new(
            Opts::new("vakthund_matches_total", "Total signature matches reported"),
            &["algorithm"],
        )
        .unwrap();

        let scan_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "vakthund_scan_latency_seconds",
                "Wall-clock duration of a single scan call",
            )
            .buckets(vec![1e-6, 1e-5, 1e-4, 1e-3, 1e-2, 1e-1, 1.0]),
            &["algorithm"],
        )
        .unwrap();

        registry
            .register(Box::new(matches_total.clone()))
            .unwrap();
        registry
            .register(Box::new(scan_latency_seconds.clone()))
            .unwrap();

        Self {
            registry,
            matches_total,
            scan_latency_seconds,
        }
    }

    /// Records one scan's `Stats` (matches and elapsed time) under its
    /// algorithm label.
    pub fn record_scan(&self, algorithm: &str, matches: u64, elapsed_sec: f64) {
        self.matches_total
            .with_label_values(&[algorithm])
            .inc_by(matches as f64);
        self.scan_latency_seconds
            .with_label_values(&[algorithm])
            .observe(elapsed_sec);
    }

    pub fn gather_text(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer).unwrap())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_scan_increments_labeled_counters() {
        let recorder = MetricsRecorder::new();
        recorder.record_scan("aho-corasick", 3, 0.002);
        recorder.record_scan("boyer-moore", 1, 0.01);

        let text = recorder.gather_text().unwrap();
        assert!(text.contains("vakthund_matches_total"));
        assert!(text.contains("algorithm=\"aho-corasick\""));
        assert!(text.contains("algorithm=\"boyer-moore\""));
    }
}
