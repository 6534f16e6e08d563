//! The entity model
//!
//! Everything the pipeline describes is an [`Entity`]. Entities are created
//! at the pipeline edge (filesystem walk, archive reader) or synthesized by
//! analyzers (decompressed payloads, parsed sub-documents); their node
//! identities outlive them as plain URIs.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};

use faceta_formats::{FileFormat, FormatMatch, FormatStream};

/// Opens fresh, independent streams over one byte source.
///
/// The hashing multiplexer owns its stream exclusively; every other reader
/// (format matchers, materialization) opens its own through the factory.
pub trait StreamFactory: Send + Sync {
    fn open(&self) -> io::Result<FormatStream>;

    /// Expected length, when known without reading.
    fn len_hint(&self) -> Option<u64> {
        None
    }
}

/// Streams backed by a file on disk.
pub struct FileStreamFactory {
    path: PathBuf,
}

impl FileStreamFactory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StreamFactory for FileStreamFactory {
    fn open(&self) -> io::Result<FormatStream> {
        FormatStream::from_path(&self.path)
    }

    fn len_hint(&self) -> Option<u64> {
        std::fs::metadata(&self.path).ok().map(|meta| meta.len())
    }
}

/// Streams over bytes already in memory (archive entries, decompressed
/// payloads).
pub struct BytesStreamFactory {
    bytes: Bytes,
}

impl BytesStreamFactory {
    pub fn new(bytes: Bytes) -> Self {
        Self { bytes }
    }
}

impl StreamFactory for BytesStreamFactory {
    fn open(&self) -> io::Result<FormatStream> {
        Ok(FormatStream::from_bytes(self.bytes.clone()))
    }

    fn len_hint(&self) -> Option<u64> {
        Some(self.bytes.len() as u64)
    }
}

/// An opaque byte blob awaiting description.
pub struct DataObject {
    /// Where the bytes came from, for logging and error description.
    pub label: String,
    pub stream_factory: Arc<dyn StreamFactory>,
}

impl DataObject {
    pub fn new(label: impl Into<String>, stream_factory: Arc<dyn StreamFactory>) -> Self {
        Self {
            label: label.into(),
            stream_factory,
        }
    }
}

impl fmt::Debug for DataObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataObject")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Position of a file node in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Regular,
    ArchiveItem,
    Embedded,
    Directory,
}

/// A named file with timestamps, wherever it lives.
pub struct FileNode {
    pub name: String,
    pub path: PathBuf,
    pub kind: FileKind,
    pub size: Option<u64>,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
    pub accessed: Option<DateTime<Utc>>,
    pub revision: Option<String>,
    /// Content source; directories and unextractable entries carry none.
    pub data: Option<Arc<dyn StreamFactory>>,
}

impl FileNode {
    /// File node for an on-disk path, timestamps from filesystem metadata.
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let meta = std::fs::metadata(path)?;
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        let kind = if meta.is_dir() {
            FileKind::Directory
        } else {
            FileKind::Regular
        };
        let data: Option<Arc<dyn StreamFactory>> = if meta.is_file() {
            Some(Arc::new(FileStreamFactory::new(path)))
        } else {
            None
        };
        Ok(Self {
            name,
            path: path.to_path_buf(),
            kind,
            size: meta.is_file().then(|| meta.len()),
            created: meta.created().ok().map(DateTime::<Utc>::from),
            modified: meta.modified().ok().map(DateTime::<Utc>::from),
            accessed: meta.accessed().ok().map(DateTime::<Utc>::from),
            revision: None,
            data,
        })
    }
}

impl fmt::Debug for FileNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileNode")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// A directory with its ordered children.
#[derive(Debug)]
pub struct DirectoryNode {
    pub file: FileNode,
    pub children: Vec<Entity>,
}

/// A successful format match wrapped as an entity of its own.
pub struct FormatObject {
    pub matched: FormatMatch,
    /// Node of the data object this format was detected in.
    pub source: faceta_rdf::LinkedNode,
}

impl fmt::Debug for FormatObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatObject")
            .field("format", &self.matched.format.name())
            .field("media_type", &self.matched.media_type)
            .finish_non_exhaustive()
    }
}

/// Anything the pipeline describes.
#[derive(Debug, Clone)]
pub enum Entity {
    Data(Arc<DataObject>),
    File(Arc<FileNode>),
    Directory(Arc<DirectoryNode>),
    Format(Arc<FormatObject>),
}

impl Entity {
    /// Human-readable identification for log lines.
    pub fn describe(&self) -> String {
        match self {
            Self::Data(data) => data.label.clone(),
            Self::File(file) => file.path.display().to_string(),
            Self::Directory(dir) => dir.file.path.display().to_string(),
            Self::Format(format) => format!("{} format", format.matched.format.name()),
        }
    }
}
