//! # Vakthund Detection Engine
//!
//! Multi-pattern signature scanning: four interchangeable matching engines
//! behind a single [`Engine`] trait, sharing a [`SignatureSet`] input and a
//! per-scan [`Stats`] output.

pub mod ac;
pub mod bloom;
pub mod bm;
pub mod engine;
pub mod error;
pub mod fnv;
pub mod sh;
pub mod signature;
pub mod stats;
pub mod wm;

pub use ac::AhoCorasickEngine;
pub use bm::BoyerMooreEngine;
pub use engine::{Engine, Match, ScanControl};
pub use error::DetectionError;
pub use sh::SetHorspoolEngine;
pub use signature::{Signature, SignatureMeta, SignatureSet};
pub use stats::Stats;
pub use wm::{WmConfig, WuManberDetEngine, WuManberProbEngine};
