//! File and directory analysis
//!
//! File nodes carry the naming, timestamps and position of an entity; the
//! bytes themselves are described by the data analyzer through a derived
//! data object. Root-level files are identified by their `file://` URI;
//! members of containers hang off their container's content node.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use faceta_rdf::vocab::{Class, Prop};
use faceta_rdf::{LinkedNode, LiteralValue, UriFormatter};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::analyzer::{AnalysisResult, AnalyzerHub, EntityAnalyzer};
use crate::context::{AnalysisContext, TraversalDirective};
use crate::entity::{DataObject, Entity, FileKind, FileNode};
use crate::Result;

/// Structural URIs for on-disk paths.
pub struct FileUriFormatter;

impl UriFormatter<PathBuf> for FileUriFormatter {
    fn format(&self, key: &PathBuf) -> Option<String> {
        url::Url::from_file_path(key).ok().map(String::from)
    }
}

fn mint_file_node(file: &FileNode, ctx: &AnalysisContext, hub: &AnalyzerHub) -> Option<LinkedNode> {
    // on-disk paths get their own file:// identity; container members are
    // relative to their container's node
    if file.path.is_absolute() {
        return hub.factory().node_from_key(&FileUriFormatter, &file.path);
    }
    ctx.parent.as_ref().map(|parent| parent.child(&file.name))
}

fn describe_file(file: &FileNode, node: &LinkedNode) -> Result<()> {
    let class = match file.kind {
        FileKind::Directory => Class::Folder,
        FileKind::ArchiveItem => Class::ArchiveItem,
        FileKind::Embedded => Class::EmbeddedFileDataObject,
        FileKind::Regular => Class::FileDataObject,
    };
    node.classify(class)?;
    node.set(Prop::FileName, LiteralValue::String(file.name.clone()))?;
    node.set(
        Prop::FilePath,
        LiteralValue::String(file.path.display().to_string()),
    )?;
    if let Some(size) = file.size {
        node.set(Prop::ByteSize, LiteralValue::ULong(size))?;
    }
    if let Some(created) = file.created {
        node.set(Prop::FileCreated, LiteralValue::DateTime(created))?;
    }
    if let Some(modified) = file.modified {
        node.set(Prop::FileLastModified, LiteralValue::DateTime(modified))?;
    }
    if let Some(accessed) = file.accessed {
        node.set(Prop::FileLastAccessed, LiteralValue::DateTime(accessed))?;
    }
    if let Some(revision) = &file.revision {
        node.set(Prop::Label, LiteralValue::String(revision.clone()))?;
    }
    Ok(())
}

pub struct FileAnalyzer;

#[async_trait]
impl EntityAnalyzer for FileAnalyzer {
    fn name(&self) -> &'static str {
        "file"
    }

    fn accepts(&self, entity: &Entity) -> bool {
        matches!(entity, Entity::File(_))
    }

    async fn analyze(
        &self,
        entity: &Entity,
        ctx: &AnalysisContext,
        hub: &AnalyzerHub,
    ) -> Result<AnalysisResult> {
        let Entity::File(file) = entity else {
            return Ok(AnalysisResult::none());
        };
        let Some(node) = mint_file_node(file, ctx, hub) else {
            warn!(path = %file.path.display(), "file path yields no identity, skipping");
            return Ok(AnalysisResult::none());
        };
        describe_file(file, &node)?;

        if let Some(factory) = &file.data {
            let data = Entity::Data(Arc::new(DataObject::new(
                file.path.display().to_string(),
                Arc::clone(factory),
            )));
            let child_ctx = if ctx.match_context.path.is_empty() {
                ctx.with_parent_link(node.clone(), Prop::IsStoredAs)
                    .with_path(&file.name)
            } else {
                ctx.with_parent_link(node.clone(), Prop::IsStoredAs)
            };
            hub.analyze(data, child_ctx).await;
        }

        let directive = if file.kind == FileKind::Directory {
            TraversalDirective::FollowChildren
        } else {
            TraversalDirective::None
        };
        Ok(AnalysisResult {
            node: Some(node),
            label: Some(file.name.clone()),
            directive,
        })
    }
}

pub struct DirectoryAnalyzer;

#[async_trait]
impl EntityAnalyzer for DirectoryAnalyzer {
    fn name(&self) -> &'static str {
        "directory"
    }

    fn accepts(&self, entity: &Entity) -> bool {
        matches!(entity, Entity::Directory(_))
    }

    async fn analyze(
        &self,
        entity: &Entity,
        ctx: &AnalysisContext,
        hub: &AnalyzerHub,
    ) -> Result<AnalysisResult> {
        let Entity::Directory(dir) = entity else {
            return Ok(AnalysisResult::none());
        };
        let Some(node) = mint_file_node(&dir.file, ctx, hub) else {
            warn!(path = %dir.file.path.display(), "directory path yields no identity, skipping");
            return Ok(AnalysisResult::none());
        };
        describe_file(&dir.file, &node)?;

        // directory children are independent files: burst them onto the pool
        let mut tasks: JoinSet<AnalysisResult> = JoinSet::new();
        for child in &dir.children {
            if ctx.is_cancelled() {
                break;
            }
            let name = match child {
                Entity::File(file) => file.name.clone(),
                Entity::Directory(sub) => sub.file.name.clone(),
                other => other.describe(),
            };
            let child_ctx = ctx
                .with_parent_link(node.clone(), Prop::HasPart)
                .with_path(&name);
            let hub = hub.clone();
            let child = child.clone();
            tasks.spawn(async move { hub.analyze(child, child_ctx).await });
        }
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => {
                    if let Some(child_node) = &result.node {
                        child_node.link(Prop::BelongsToContainer, &node)?;
                    }
                }
                Err(err) => {
                    debug!(%err, "directory child task failed to join");
                }
            }
        }

        Ok(AnalysisResult {
            node: Some(node),
            label: Some(dir.file.name.clone()),
            directive: TraversalDirective::BurstChildren,
        })
    }
}
