//! The format descriptor contract and parsed payload types

use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::Result;

/// Readable, seekable byte source handed to detectors.
///
/// Detectors always get seekability: the pipeline buffers non-seekable
/// inputs before any detector sees them.
pub enum FormatStream {
    File(File),
    Memory(Cursor<Bytes>),
}

impl FormatStream {
    pub fn from_path(path: &Path) -> io::Result<Self> {
        Ok(Self::File(File::open(path)?))
    }

    pub fn from_bytes(bytes: Bytes) -> Self {
        Self::Memory(Cursor::new(bytes))
    }
}

impl Read for FormatStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::File(file) => file.read(buf),
            Self::Memory(cursor) => cursor.read(buf),
        }
    }
}

impl Seek for FormatStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            Self::File(file) => file.seek(pos),
            Self::Memory(cursor) => cursor.seek(pos),
        }
    }
}

/// Whether a format may claim text data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    /// Only offered binary data.
    BinaryOnly,
    /// Also offered data classified as text.
    TextAllowed,
}

/// Detector input: the header window plus a fresh stream positioned at the
/// start of the data.
pub struct MatchInput<'a> {
    pub header: &'a [u8],
    /// True when the source ended inside the header window.
    pub is_short: bool,
    pub stream: FormatStream,
}

/// Context shared across one match attempt.
#[derive(Debug, Clone, Default)]
pub struct MatchContext {
    /// Path of the entity inside its container hierarchy.
    pub path: String,
    /// Name of the format this data was extracted from, if any.
    pub parent_format: Option<String>,
    /// Namespaces harvested from enclosing documents.
    pub namespaces: Vec<(String, String)>,
}

impl MatchContext {
    pub fn with_path(&self, segment: &str) -> Self {
        let mut derived = self.clone();
        if derived.path.is_empty() {
            derived.path = segment.to_string();
        } else {
            derived.path = format!("{}/{segment}", derived.path);
        }
        derived
    }

    pub fn with_parent_format(&self, format: &str) -> Self {
        let mut derived = self.clone();
        derived.parent_format = Some(format.to_string());
        derived
    }
}

/// A detectable file format.
pub trait FileFormat: Send + Sync {
    /// Short stable name, e.g. `zip`.
    fn name(&self) -> &'static str;

    /// Header byte signatures, if any. Signature-less formats are offered
    /// every binary stream after all signatured candidates.
    fn signatures(&self) -> &[&'static [u8]] {
        &[]
    }

    fn media_type(&self) -> &'static str;

    fn extension(&self) -> &'static str;

    fn kind(&self) -> FormatKind {
        FormatKind::BinaryOnly
    }

    /// Cheap veto ahead of `match_stream`. `header` holds up to
    /// [`crate::MAX_HEADER_BYTES`] bytes; `is_short` is set when the source
    /// ended inside the window.
    fn check_header(&self, header: &[u8], is_binary: bool, is_short: bool) -> bool;

    /// Attempt a full parse. `Ok(None)` means "not this format" without
    /// being an error; `Err` means the data looked like this format but is
    /// corrupt.
    fn match_stream(&self, input: MatchInput<'_>, ctx: &MatchContext) -> Result<Option<ParsedFormat>>;
}

/// Kind of a container entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// One member of a parsed container.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    /// Slash-separated path inside the container.
    pub path: String,
    pub kind: EntryKind,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
    /// Entry content; `None` when extraction failed (e.g. encrypted entry),
    /// in which case the entry is still described structurally.
    pub data: Option<Bytes>,
}

/// A parsed container.
#[derive(Debug, Clone)]
pub struct ArchiveContents {
    pub entries: Vec<ArchiveEntry>,
}

/// A decompressed single payload (gzip and friends).
#[derive(Debug, Clone)]
pub struct CompressedPayload {
    pub method: &'static str,
    /// Original file name recorded in the compression header.
    pub original_name: Option<String>,
    pub data: Bytes,
}

/// Image dimensions and sample structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageMeta {
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
}

/// Identity of an XML document.
#[derive(Debug, Clone, Default)]
pub struct XmlInfo {
    pub version: Option<String>,
    pub encoding: Option<String>,
    pub root_name: String,
    pub root_namespace: Option<String>,
    pub doctype_public: Option<String>,
    pub doctype_system: Option<String>,
    pub namespaces: Vec<(String, String)>,
    /// Sub-format selected by root namespace or DOCTYPE public id.
    pub sub_format: Option<XmlSubFormat>,
}

/// A specialized XML document format (SVG, XHTML, …).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlSubFormat {
    pub name: String,
    pub media_type: String,
    pub extension: String,
    /// Marks vector image documents for classing.
    pub is_image: bool,
}

/// The payload of a successful format match.
#[derive(Debug, Clone)]
pub enum ParsedFormat {
    Archive(ArchiveContents),
    Compressed(CompressedPayload),
    Image(ImageMeta),
    Xml(XmlInfo),
}

/// A successful detector invocation: descriptor plus parsed value, with the
/// effective media type and extension (XML sub-formats override their host
/// format's defaults).
pub struct FormatMatch {
    pub format: std::sync::Arc<dyn FileFormat>,
    pub parsed: ParsedFormat,
    pub media_type: String,
    pub extension: String,
}

impl FormatMatch {
    pub fn new(format: std::sync::Arc<dyn FileFormat>, parsed: ParsedFormat) -> Self {
        let (media_type, extension) = match &parsed {
            ParsedFormat::Xml(info) => info.sub_format.as_ref().map_or_else(
                || (format.media_type().to_string(), format.extension().to_string()),
                |sub| (sub.media_type.clone(), sub.extension.clone()),
            ),
            _ => (format.media_type().to_string(), format.extension().to_string()),
        };
        Self {
            format,
            parsed,
            media_type,
            extension,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_context_path_accumulates() {
        let root = MatchContext::default();
        let inner = root.with_path("a.zip").with_path("b/c.txt");
        assert_eq!(inner.path, "a.zip/b/c.txt");
    }
}
