//! Error taxonomy for signature-set construction and engine preprocessing.
//!
//! Scans themselves never fail (see [`crate::stats`]): malformed input is
//! always "no match". Errors are only surfaced at build time.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("signature set is empty")]
    EmptySet,

    #[error("signature {id} has zero length")]
    BadSignature { id: u32 },

    #[error("signature set exceeds the implementation limit of {limit} patterns")]
    TooManySignatures { limit: usize },

    #[error("failed to allocate scan tables: {0}")]
    Allocation(String),

    #[error("scan called on a dropped engine")]
    InvalidHandle,
}
