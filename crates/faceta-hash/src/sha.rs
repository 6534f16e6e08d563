//! SHA-1 and SHA-256 content identification

use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::algorithm::{DigestAdapter, DigestSink, HashAlgorithm, HashAlgorithmId};
use crate::encode::DigestFormat;

pub struct Sha1Algorithm;

impl HashAlgorithm for Sha1Algorithm {
    fn id(&self) -> HashAlgorithmId {
        HashAlgorithmId::Sha1
    }

    fn uri_prefix(&self) -> &'static str {
        "urn:sha1:"
    }

    fn digest_format(&self) -> DigestFormat {
        DigestFormat::Base32
    }

    fn size_hint(&self) -> usize {
        20
    }

    fn hasher(&self) -> Box<dyn DigestSink> {
        Box::new(DigestAdapter(Sha1::new()))
    }
}

/// SHA-256 identified through RFC 6920 `ni` URIs.
pub struct Sha256Algorithm;

impl HashAlgorithm for Sha256Algorithm {
    fn id(&self) -> HashAlgorithmId {
        HashAlgorithmId::Sha256
    }

    fn uri_prefix(&self) -> &'static str {
        "ni:///sha-256;"
    }

    fn digest_format(&self) -> DigestFormat {
        DigestFormat::Base64Url
    }

    fn size_hint(&self) -> usize {
        32
    }

    fn hasher(&self) -> Box<dyn DigestSink> {
        Box::new(DigestAdapter(Sha256::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha1_uri_is_base32() {
        let algo = Sha1Algorithm;
        let digest = algo.compute(b"hi\n");
        assert_eq!(hex::encode(&digest), "55ca6286e3e4f4fba5d0448333fa99fc5a404a73");
        assert_eq!(
            algo.uri_for(&digest).unwrap(),
            "urn:sha1:KXFGFBXD4T2PXJOQISBTH6UZ7RNEASTT"
        );
    }

    #[test]
    fn sha256_uri_is_ni_base64url() {
        let algo = Sha256Algorithm;
        let digest = algo.compute(b"hi\n");
        assert_eq!(
            algo.uri_for(&digest).unwrap(),
            "ni:///sha-256;mOpuTyFvL7S2n_-bOkSELDhobKaF8_VdxIxdP7EQe-Q"
        );
    }

    #[test]
    fn digest_length_is_checked() {
        let algo = Sha256Algorithm;
        assert!(algo.uri_for(&[0u8; 16]).is_err());
    }
}
