//! BLAKE3 content identification

use crate::algorithm::{DigestSink, HashAlgorithm, HashAlgorithmId};
use crate::encode::DigestFormat;

pub struct Blake3Algorithm;

struct Blake3Sink(blake3::Hasher);

impl DigestSink for Blake3Sink {
    fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    fn finish(self: Box<Self>) -> Vec<u8> {
        self.0.finalize().as_bytes().to_vec()
    }
}

impl HashAlgorithm for Blake3Algorithm {
    fn id(&self) -> HashAlgorithmId {
        HashAlgorithmId::Blake3
    }

    fn uri_prefix(&self) -> &'static str {
        "urn:blake3:"
    }

    fn digest_format(&self) -> DigestFormat {
        DigestFormat::Base32
    }

    fn size_hint(&self) -> usize {
        blake3::OUT_LEN
    }

    fn hasher(&self) -> Box<dyn DigestSink> {
        Box::new(Blake3Sink(blake3::Hasher::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_reference_hasher() {
        let algo = Blake3Algorithm;
        let digest = algo.compute(b"hi\n");
        assert_eq!(digest, blake3::hash(b"hi\n").as_bytes().to_vec());
    }

    #[test]
    fn uri_has_blake3_prefix() {
        let algo = Blake3Algorithm;
        let digest = algo.compute(b"");
        let uri = algo.uri_for(&digest).unwrap();
        assert!(uri.starts_with("urn:blake3:"));
        assert_eq!(uri.len(), "urn:blake3:".len() + 52);
    }
}
