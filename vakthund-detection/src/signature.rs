//! ## vakthund-detection::signature
//! **Canonical signature container shared by every matching engine**
//!
//! A [`SignatureSet`] is built once from the literals extracted upstream
//! (by the rule parser, out of scope here) and handed read-only to each
//! engine's `preprocess`. No case folding happens at build time: every
//! engine folds bytes at compare time according to each pattern's
//! `nocase` flag.

use crate::error::DetectionError;

/// Opaque metadata carried through untouched alongside a signature, e.g.
/// the originating rule's message text and numeric ID.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SignatureMeta {
    pub message: Option<String>,
    pub rule_id: Option<u32>,
}

/// A single literal signature: an arbitrary byte string, a case-folding
/// flag, and a position-assigned id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub id: u32,
    pub pattern: Vec<u8>,
    pub nocase: bool,
    pub meta: Option<SignatureMeta>,
}

impl Signature {
    pub fn len(&self) -> usize {
        self.pattern.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pattern.is_empty()
    }
}

/// Ordered, immutable collection of [`Signature`]s. `id` equals position.
#[derive(Debug, Clone)]
pub struct SignatureSet {
    signatures: Vec<Signature>,
    min_length: usize,
    avg_length: f64,
}

impl SignatureSet {
    /// Builds a signature set from `(bytes, nocase, metadata)` triples.
    ///
    /// Rejects an empty list ([`DetectionError::EmptySet`]) and any
    /// zero-length pattern ([`DetectionError::BadSignature`]).
    pub fn build(
        entries: Vec<(Vec<u8>, bool, Option<SignatureMeta>)>,
    ) -> Result<Self, DetectionError> {
        if entries.is_empty() {
            return Err(DetectionError::EmptySet);
        }

        let mut signatures = Vec::with_capacity(entries.len());
        for (id, (pattern, nocase, meta)) in entries.into_iter().enumerate() {
            if pattern.is_empty() {
                return Err(DetectionError::BadSignature { id: id as u32 });
            }
            signatures.push(Signature {
                id: id as u32,
                pattern,
                nocase,
                meta,
            });
        }

        let min_length = signatures.iter().map(Signature::len).min().unwrap_or(0);
        let total: usize = signatures.iter().map(Signature::len).sum();
        let avg_length = total as f64 / signatures.len() as f64;

        Ok(Self {
            signatures,
            min_length,
            avg_length,
        })
    }

    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    pub fn avg_length(&self) -> f64 {
        self.avg_length
    }

    /// `true` if every signature is case-insensitive.
    pub fn all_nocase(&self) -> bool {
        self.signatures.iter().all(|s| s.nocase)
    }

    /// `true` if the set mixes case-sensitive and case-insensitive patterns.
    pub fn mixed_case(&self) -> bool {
        let any_nocase = self.signatures.iter().any(|s| s.nocase);
        let any_case_sensitive = self.signatures.iter().any(|s| !s.nocase);
        any_nocase && any_case_sensitive
    }
}

/// Folds a single byte to lowercase if it is an ASCII letter, leaving all
/// other bytes untouched. Used by every engine's `nocase` compare path.
#[inline]
pub fn fold_byte(b: u8) -> u8 {
    if b.is_ascii_uppercase() {
        b + (b'a' - b'A')
    } else {
        b
    }
}

/// Folds every byte in `bytes` through [`fold_byte`].
pub fn fold_bytes(bytes: &[u8]) -> Vec<u8> {
    bytes.iter().copied().map(fold_byte).collect()
}
