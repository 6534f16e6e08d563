//! Registered algorithm lookup

use std::sync::Arc;

use crate::algorithm::{HashAlgorithm, HashAlgorithmId};
use crate::blake3_algo::Blake3Algorithm;
use crate::crc32::Crc32Algorithm;
use crate::md5::Md5Algorithm;
use crate::sha::{Sha1Algorithm, Sha256Algorithm};

/// Look up the implementation for an algorithm identifier.
pub fn algorithm(id: HashAlgorithmId) -> Arc<dyn HashAlgorithm> {
    match id {
        HashAlgorithmId::Md5 => Arc::new(Md5Algorithm),
        HashAlgorithmId::Sha1 => Arc::new(Sha1Algorithm),
        HashAlgorithmId::Sha256 => Arc::new(Sha256Algorithm),
        HashAlgorithmId::Blake3 => Arc::new(Blake3Algorithm),
        HashAlgorithmId::Crc32 => Arc::new(Crc32Algorithm),
    }
}

/// The algorithm set applied when the caller does not choose one.
pub fn default_set() -> Vec<Arc<dyn HashAlgorithm>> {
    [HashAlgorithmId::Md5, HashAlgorithmId::Sha1, HashAlgorithmId::Sha256]
        .into_iter()
        .map(algorithm)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_id_resolves() {
        for id in HashAlgorithmId::all() {
            assert_eq!(algorithm(*id).id(), *id);
        }
    }

    #[test]
    fn default_set_is_stable() {
        let ids: Vec<_> = default_set().iter().map(|a| a.id()).collect();
        assert_eq!(
            ids,
            vec![HashAlgorithmId::Md5, HashAlgorithmId::Sha1, HashAlgorithmId::Sha256]
        );
    }
}
