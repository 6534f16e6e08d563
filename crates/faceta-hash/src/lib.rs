//! Hash algorithm contract and content-addressed URIs
//!
//! Every data object described by faceta is identified by the digests of its
//! content. This crate defines the algorithm contract ([`HashAlgorithm`]),
//! the digest-to-text encodings ([`DigestFormat`]) and the registered
//! algorithm set (MD5, SHA-1, SHA-256, BLAKE3, CRC-32).
//!
//! A content-addressed URI is formed as `prefix + encode(digest, format)`,
//! so two runs over byte-identical input always mint the same identifier:
//!
//! ```
//! use faceta_hash::{registry, HashAlgorithm, HashAlgorithmId};
//!
//! let md5 = registry::algorithm(HashAlgorithmId::Md5);
//! let digest = md5.compute(b"hi\n");
//! assert_eq!(
//!     md5.uri_for(&digest).unwrap(),
//!     "urn:md5:764EFA883DDA1E11DB47671C4A3BBD9E"
//! );
//! ```

mod algorithm;
mod blake3_algo;
mod crc32;
mod encode;
mod error;
mod md5;
mod sha;

pub mod registry;

pub use algorithm::{DigestSink, HashAlgorithm, HashAlgorithmId};
pub use encode::DigestFormat;
pub use error::Error;

pub type Result<T> = std::result::Result<T, Error>;
