//! MD5 content identification
//!
//! MD5 is kept for interoperability with existing content catalogues; it is
//! an identifier here, not an integrity guarantee.

use md5::{Digest, Md5};

use crate::algorithm::{DigestAdapter, DigestSink, HashAlgorithm, HashAlgorithmId};
use crate::encode::DigestFormat;

pub struct Md5Algorithm;

impl HashAlgorithm for Md5Algorithm {
    fn id(&self) -> HashAlgorithmId {
        HashAlgorithmId::Md5
    }

    fn uri_prefix(&self) -> &'static str {
        "urn:md5:"
    }

    fn digest_format(&self) -> DigestFormat {
        DigestFormat::Hex
    }

    fn size_hint(&self) -> usize {
        16
    }

    fn hasher(&self) -> Box<dyn DigestSink> {
        Box::new(DigestAdapter(Md5::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_digest() {
        let algo = Md5Algorithm;
        let digest = algo.compute(b"hi\n");
        assert_eq!(hex::encode(&digest), "764efa883dda1e11db47671c4a3bbd9e");
    }

    #[test]
    fn uri_is_uppercase_hex() {
        let algo = Md5Algorithm;
        let digest = algo.compute(b"hi\n");
        assert_eq!(
            algo.uri_for(&digest).unwrap(),
            "urn:md5:764EFA883DDA1E11DB47671C4A3BBD9E"
        );
    }

    #[test]
    fn empty_input_digest() {
        let algo = Md5Algorithm;
        let digest = algo.compute(b"");
        assert_eq!(hex::encode(&digest), "d41d8cd98f00b204e9800998ecf8427e");
    }
}
