//! Top-level CLI error, mapped to the spec's two-exit-code contract
//! (§6: exit `0` on success, `1` on argument error or unreadable
//! ruleset/capture).

use crate::capture::CaptureLoadError;
use crate::rules::RuleLoadError;
use thiserror::Error;
use vakthund_detection::DetectionError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("unknown algorithm selector '{0}', expected one of a,d,p,h,b")]
    UnknownAlgorithm(String),
    #[error(transparent)]
    Rules(#[from] RuleLoadError),
    #[error(transparent)]
    Capture(#[from] CaptureLoadError),
    #[error(transparent)]
    Detection(#[from] DetectionError),
}
