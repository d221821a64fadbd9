//! # Vakthund Telemetry
//!
//! Structured logging and Prometheus-backed metrics for the signature
//! scanner. This crate is deliberately synchronous, mirroring the core's
//! own single-threaded, non-async scan path (spec §5): `EventLogger::init`
//! installs a `tracing-subscriber` layer once at process start, and
//! `MetricsRecorder` records each scan's returned `Stats` into Prometheus
//! histograms/counters labeled by algorithm.

pub mod logging;
pub mod metrics;

pub use logging::EventLogger;
pub use metrics::MetricsRecorder;
