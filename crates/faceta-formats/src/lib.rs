//! File format detection for faceta
//!
//! A [`FileFormat`] describes one detectable format: its header signature,
//! media type, and a `match_stream` parser producing a [`ParsedFormat`]
//! payload. The [`FormatRegistry`] indexes signatures in a prefix trie so an
//! unknown byte stream is matched against the whole plugin set with a single
//! walk over its header window.
//!
//! Individual parsers stay thin on purpose: they surface just enough parsed
//! structure (archive entries, image dimensions, XML identity) for the
//! pipeline to describe and descend; deep per-format semantics belong to
//! external plugins implementing the same trait.

mod error;
mod format;
mod registry;

pub mod encoding;
pub mod gzip;
pub mod improvised;
pub mod png;
pub mod tar_format;
pub mod xml;
pub mod zip_format;

pub use error::Error;
pub use format::{
    ArchiveContents, ArchiveEntry, CompressedPayload, EntryKind, FileFormat, FormatKind,
    FormatMatch, FormatStream, ImageMeta, MatchContext, MatchInput, ParsedFormat, XmlInfo,
    XmlSubFormat,
};
pub use improvised::ImprovisedFormat;
pub use registry::FormatRegistry;

pub type Result<T> = std::result::Result<T, Error>;

/// Largest header window a detector may ask for. At least as long as every
/// registered signature, including the tar magic at offset 257.
pub const MAX_HEADER_BYTES: usize = 4096;

/// Decompressed payloads beyond this size are treated as resource
/// exhaustion rather than silently buffered.
pub const MAX_EXPANDED_BYTES: u64 = 256 * 1024 * 1024;
