//! CRC-32 checksums
//!
//! Not a cryptographic identity; carried because downstream tooling groups
//! objects by checksum URNs emitted from legacy catalogues.

use crate::algorithm::{DigestSink, HashAlgorithm, HashAlgorithmId};
use crate::encode::DigestFormat;

pub struct Crc32Algorithm;

struct Crc32Sink(crc32fast::Hasher);

impl DigestSink for Crc32Sink {
    fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    fn finish(self: Box<Self>) -> Vec<u8> {
        self.0.finalize().to_be_bytes().to_vec()
    }
}

impl HashAlgorithm for Crc32Algorithm {
    fn id(&self) -> HashAlgorithmId {
        HashAlgorithmId::Crc32
    }

    fn uri_prefix(&self) -> &'static str {
        "urn:crc32:"
    }

    fn digest_format(&self) -> DigestFormat {
        DigestFormat::Decimal
    }

    fn size_hint(&self) -> usize {
        4
    }

    fn hasher(&self) -> Box<dyn DigestSink> {
        Box::new(Crc32Sink(crc32fast::Hasher::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_checksum() {
        let algo = Crc32Algorithm;
        let digest = algo.compute(b"hi\n");
        assert_eq!(algo.uri_for(&digest).unwrap(), "urn:crc32:3983506042");
    }

    #[test]
    fn digest_is_big_endian() {
        let algo = Crc32Algorithm;
        let digest = algo.compute(b"hi\n");
        assert_eq!(digest, 3_983_506_042u32.to_be_bytes().to_vec());
    }
}
