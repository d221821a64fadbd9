//! ## vakthund-telemetry::logging
//! **`tracing`-based structured logger for the scanner CLI.**
//!
//! The core itself never logs (scans are infallible and return a `Stats`
//! value, not a log line); this is the ambient layer `vakthund-cli` installs
//! once at startup so that preprocessing errors, chosen algorithm, and
//! scan summaries are emitted as structured events rather than bare
//! `println!`s.

#[derive(Clone)]
pub struct EventLogger;

impl EventLogger {
    /// Installs a `tracing-subscriber` `EnvFilter` layer, honoring
    /// `RUST_LOG` and defaulting to `info`.
    pub fn init() {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let fmt_layer = fmt::layer().with_target(false).with_thread_names(true);

        let filter_layer = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let _ = tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer)
            .try_init();
    }

    /// Emits a single structured scan-summary event. Scans themselves are
    /// infallible (spec §7); this simply surfaces the `Stats` the engine
    /// already returned.
    pub fn log_scan_summary(algorithm: &str, input_len: usize, matches: u64, elapsed_sec: f64) {
        tracing::info!(
            algorithm,
            input_len,
            matches,
            elapsed_sec,
            "scan complete"
        );
    }
}
