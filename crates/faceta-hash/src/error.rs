//! Error types for hash and digest-encoding operations

use thiserror::Error;

use crate::encode::DigestFormat;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown hash algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("Digest of {len} bytes cannot be encoded as {format:?}")]
    UnencodableDigest { format: DigestFormat, len: usize },

    #[error("Digest length mismatch: expected {expected}, got {actual}")]
    DigestLength { expected: usize, actual: usize },
}
