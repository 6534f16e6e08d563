//! The hash algorithm contract

use std::fmt;
use std::str::FromStr;

use crate::encode::DigestFormat;
use crate::{Error, Result};

/// Identifies a registered hash algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HashAlgorithmId {
    Md5,
    Sha1,
    Sha256,
    Blake3,
    Crc32,
}

impl HashAlgorithmId {
    /// Canonical lowercase name, as accepted on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Blake3 => "blake3",
            Self::Crc32 => "crc32",
        }
    }

    /// All registered algorithm identifiers.
    pub fn all() -> &'static [Self] {
        &[Self::Md5, Self::Sha1, Self::Sha256, Self::Blake3, Self::Crc32]
    }
}

impl fmt::Display for HashAlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithmId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "md5" => Ok(Self::Md5),
            "sha1" | "sha-1" => Ok(Self::Sha1),
            "sha256" | "sha-256" => Ok(Self::Sha256),
            "blake3" => Ok(Self::Blake3),
            "crc32" => Ok(Self::Crc32),
            other => Err(Error::UnknownAlgorithm(other.to_string())),
        }
    }
}

/// An in-progress digest computation.
///
/// One sink is attached per algorithm to each hashed stream; sinks are never
/// shared between streams.
pub trait DigestSink: Send {
    fn update(&mut self, data: &[u8]);

    fn finish(self: Box<Self>) -> Vec<u8>;
}

/// Adapts any RustCrypto digest to the object-safe sink interface.
pub(crate) struct DigestAdapter<D>(pub(crate) D);

impl<D> DigestSink for DigestAdapter<D>
where
    D: digest::Digest + Send,
{
    fn update(&mut self, data: &[u8]) {
        digest::Digest::update(&mut self.0, data);
    }

    fn finish(self: Box<Self>) -> Vec<u8> {
        self.0.finalize().to_vec()
    }
}

/// A registered hash algorithm.
///
/// Implementations are stateless; per-stream state lives in the sinks they
/// hand out.
pub trait HashAlgorithm: Send + Sync {
    fn id(&self) -> HashAlgorithmId;

    /// URI prefix, e.g. `urn:md5:` or `ni:///sha-256;`.
    fn uri_prefix(&self) -> &'static str;

    /// How digests are rendered inside URIs.
    fn digest_format(&self) -> DigestFormat;

    /// Digest size in bytes.
    fn size_hint(&self) -> usize;

    /// Begin a fresh digest computation.
    fn hasher(&self) -> Box<dyn DigestSink>;

    /// Content-addressed URI for a digest produced by this algorithm.
    fn uri_for(&self, digest: &[u8]) -> Result<String> {
        if digest.len() != self.size_hint() {
            return Err(Error::DigestLength {
                expected: self.size_hint(),
                actual: digest.len(),
            });
        }
        let encoded = self.digest_format().encode(digest)?;
        Ok(format!("{}{encoded}", self.uri_prefix()))
    }

    /// One-shot digest of an in-memory buffer.
    fn compute(&self, data: &[u8]) -> Vec<u8> {
        let mut sink = self.hasher();
        sink.update(data);
        sink.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for id in HashAlgorithmId::all() {
            assert_eq!(id.name().parse::<HashAlgorithmId>().unwrap(), *id);
        }
    }

    #[test]
    fn dashed_aliases_accepted() {
        assert_eq!("sha-256".parse::<HashAlgorithmId>().unwrap(), HashAlgorithmId::Sha256);
    }

    #[test]
    fn unknown_name_is_an_error() {
        assert!("sha512".parse::<HashAlgorithmId>().is_err());
    }
}
