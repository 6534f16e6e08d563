//! The faceta extraction pipeline
//!
//! Turns files, archives and containers into a stream of RDF triples
//! describing every discovered object, its cryptographic identity, its
//! formats and its place in the container hierarchy.
//!
//! The flow: raw bytes enter through a [`stream::HashStream`], which feeds
//! every configured digest while exposing a header window; the data
//! analyzer matches the window against the format registry and recurses
//! into every successful parse; container payloads re-enter the pipeline
//! through the descent engine with parent linkage intact; every fact is
//! emitted through [`faceta_rdf::NodeFactory`] under content-addressed
//! identities, so independent runs over identical bytes produce identical
//! graphs.

mod analyzer;
mod container;
mod context;
mod data;
mod entity;
mod error;
mod format_analyzer;
mod fs;
mod inspector;
mod query;
mod stream;

pub use analyzer::{AnalysisResult, AnalyzerHub, EntityAnalyzer};
pub use container::descend_archive;
pub use context::{AnalysisContext, TraversalDirective};
pub use data::DataAnalyzer;
pub use format_analyzer::FormatAnalyzer;
pub use fs::{DirectoryAnalyzer, FileAnalyzer, FileUriFormatter};
pub use entity::{
    BytesStreamFactory, DataObject, DirectoryNode, Entity, FileKind, FileNode, FileStreamFactory,
    FormatObject, StreamFactory,
};
pub use error::Error;
pub use inspector::{Inspector, InspectorConfig, RunSummary};
pub use query::NodeQueryTester;
pub use stream::HashStream;

pub type Result<T> = std::result::Result<T, Error>;
