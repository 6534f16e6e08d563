//! The inspection engine
//!
//! Owns the registries, the node factory and the analyzer hub; feeds
//! filesystem roots into the pipeline and reports the run summary.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use faceta_formats::FormatRegistry;
use faceta_hash::{registry as hash_registry, HashAlgorithmId};
use faceta_rdf::{NodeFactory, TripleSink};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::analyzer::{AnalyzerHub, EntityAnalyzer};
use crate::context::AnalysisContext;
use crate::data::DataAnalyzer;
use crate::entity::{DirectoryNode, Entity, FileNode};
use crate::format_analyzer::FormatAnalyzer;
use crate::fs::{DirectoryAnalyzer, FileAnalyzer};
use crate::query::NodeQueryTester;
use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct InspectorConfig {
    /// Digest algorithms, first one minting the content identity.
    pub algorithms: Vec<HashAlgorithmId>,
    /// Container nesting limit.
    pub max_depth: u32,
    /// Text content up to this size is inlined into the graph.
    pub inline_limit: u64,
    /// Where claimed entities are materialized.
    pub extract_dir: Option<PathBuf>,
    /// Restricted SPARQL ASK query selecting entities to materialize.
    pub query: Option<String>,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            algorithms: vec![
                HashAlgorithmId::Md5,
                HashAlgorithmId::Sha1,
                HashAlgorithmId::Sha256,
            ],
            max_depth: 16,
            inline_limit: 1024,
            extract_dir: None,
            query: None,
        }
    }
}

/// Counters for one finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub entities: u64,
    pub triples: u64,
    pub errors: u64,
}

pub struct Inspector {
    hub: AnalyzerHub,
    cancellation: CancellationToken,
}

impl Inspector {
    /// Build an engine over a triple sink. Configuration problems surface
    /// here, before any entity is processed.
    pub fn new(config: InspectorConfig, sink: Box<dyn TripleSink>) -> Result<Self> {
        if config.algorithms.is_empty() {
            return Err(Error::InvalidConfig(
                "at least one hash algorithm is required".into(),
            ));
        }
        if config.query.is_some() && config.extract_dir.is_none() {
            return Err(Error::InvalidConfig(
                "a node query requires an extraction directory".into(),
            ));
        }
        let tester = config
            .query
            .as_deref()
            .map(NodeQueryTester::parse)
            .transpose()?
            .map(Arc::new);

        let algorithms: Vec<_> = config
            .algorithms
            .iter()
            .map(|id| hash_registry::algorithm(*id))
            .collect();
        let formats = Arc::new(FormatRegistry::with_defaults());
        let factory = NodeFactory::new(sink);

        let analyzers: Vec<Arc<dyn EntityAnalyzer>> = vec![
            Arc::new(DataAnalyzer::new(
                Arc::clone(&formats),
                algorithms,
                config.inline_limit,
                config.max_depth,
                tester,
                config.extract_dir.clone(),
            )),
            Arc::new(FormatAnalyzer),
            Arc::new(FileAnalyzer),
            Arc::new(DirectoryAnalyzer),
        ];

        Ok(Self {
            hub: AnalyzerHub::new(factory, analyzers),
            cancellation: CancellationToken::new(),
        })
    }

    /// Token cancelling every in-flight analysis when triggered.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    pub fn hub(&self) -> &AnalyzerHub {
        &self.hub
    }

    /// Inspect one filesystem root (file or directory tree).
    pub async fn inspect_path(&self, path: &Path) -> Result<()> {
        let canonical = path.canonicalize()?;
        info!(path = %canonical.display(), "inspecting");
        let entity = if canonical.is_dir() {
            build_directory(&canonical)?
        } else {
            Entity::File(Arc::new(FileNode::from_path(&canonical)?))
        };
        let ctx = AnalysisContext::root(self.cancellation.clone());
        self.hub.analyze(entity, ctx).await;
        Ok(())
    }

    /// Close the output and report counters.
    pub fn finish(&self) -> Result<RunSummary> {
        self.hub.factory().finish()?;
        let summary = RunSummary {
            entities: self.hub.entity_count(),
            triples: self.hub.factory().triple_count(),
            errors: self.hub.error_count(),
        };
        info!(
            entities = summary.entities,
            triples = summary.triples,
            errors = summary.errors,
            "run finished"
        );
        Ok(summary)
    }
}

fn build_directory(path: &Path) -> Result<Entity> {
    let file = FileNode::from_path(path)?;
    let mut children = Vec::new();
    for entry in WalkDir::new(path)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .follow_links(false)
    {
        let entry = entry.map_err(|err| Error::Io(err.into()))?;
        let child = if entry.file_type().is_dir() {
            build_directory(entry.path())?
        } else {
            Entity::File(Arc::new(FileNode::from_path(entry.path())?))
        };
        children.push(child);
    }
    debug!(path = %path.display(), children = children.len(), "directory tree built");
    Ok(Entity::Directory(Arc::new(DirectoryNode { file, children })))
}
