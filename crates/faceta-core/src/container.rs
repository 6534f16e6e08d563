//! Container descent
//!
//! Walks the member tree of a parsed container, routes every member back
//! through the analyzer hub, and asserts the structural links: `hasPart`
//! from each level to its children (via the dispatcher's parent link) and
//! `belongsToContainer` from every member to the container's content node.
//!
//! Archives list members as flat paths and sometimes omit the directory
//! entries; the tree built here synthesizes the missing intermediates, and
//! each path maps to exactly one directory node per descent. The tree owns
//! its entries (`Bytes` payloads are refcounted) so `BurstChildren` can
//! move subtrees onto spawned tasks.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::task::JoinSet;
use tracing::{debug, trace};

use faceta_formats::{ArchiveContents, ArchiveEntry, EntryKind};
use faceta_rdf::vocab::Prop;
use faceta_rdf::LinkedNode;

use crate::analyzer::AnalyzerHub;
use crate::context::{AnalysisContext, TraversalDirective};
use crate::entity::{BytesStreamFactory, Entity, FileKind, FileNode, StreamFactory};
use crate::Result;

#[derive(Default)]
struct TreeNode {
    entry: Option<ArchiveEntry>,
    children: BTreeMap<String, TreeNode>,
}

fn build_tree(contents: &ArchiveContents) -> TreeNode {
    let mut root = TreeNode::default();
    for entry in &contents.entries {
        let mut node = &mut root;
        for segment in entry.path.split('/').filter(|s| !s.is_empty()) {
            node = node.children.entry(segment.to_string()).or_default();
        }
        node.entry = Some(entry.clone());
    }
    root
}

/// Descend a parsed container, re-entering the pipeline for each member.
/// `container_node` is the content node of the container's own bytes.
pub async fn descend_archive(
    contents: &ArchiveContents,
    container_node: &LinkedNode,
    ctx: &AnalysisContext,
    hub: &AnalyzerHub,
) -> Result<TraversalDirective> {
    let tree = build_tree(contents);
    debug!(
        members = contents.entries.len(),
        container = %container_node.uri(),
        "descending container"
    );
    walk_level(hub, container_node, container_node, tree.children, ctx).await?;
    Ok(TraversalDirective::FollowChildren)
}

fn walk_level<'a>(
    hub: &'a AnalyzerHub,
    container_node: &'a LinkedNode,
    parent_node: &'a LinkedNode,
    level: BTreeMap<String, TreeNode>,
    ctx: &'a AnalysisContext,
) -> BoxFuture<'a, Result<TraversalDirective>> {
    async move {
        for (name, member) in level {
            if ctx.is_cancelled() {
                return Ok(TraversalDirective::Cancelled);
            }

            let entity = Entity::File(Arc::new(member_file_node(&name, &member, ctx)));
            let child_ctx = ctx
                .with_parent_link(parent_node.clone(), Prop::HasPart)
                .with_path(&name);
            let result = hub.analyze(entity, child_ctx).await;

            let directive = result.directive;
            if let Some(child_node) = &result.node {
                child_node.link(Prop::BelongsToContainer, container_node)?;
            }

            match directive {
                TraversalDirective::Cancelled => return Ok(TraversalDirective::Cancelled),
                TraversalDirective::SkipSiblings => {
                    trace!(member = name.as_str(), "skipping remaining siblings");
                    return Ok(TraversalDirective::SkipSiblings);
                }
                TraversalDirective::BurstChildren if !member.children.is_empty() => {
                    let Some(child_node) = result.node else {
                        continue;
                    };
                    let sub =
                        burst_level(hub, container_node, &child_node, member.children, ctx, &name)
                            .await?;
                    if sub == TraversalDirective::Cancelled {
                        return Ok(TraversalDirective::Cancelled);
                    }
                }
                directive if directive.descends() && !member.children.is_empty() => {
                    let Some(child_node) = result.node else {
                        continue;
                    };
                    let dir_ctx = ctx.with_path(&name);
                    let sub =
                        walk_level(hub, container_node, &child_node, member.children, &dir_ctx)
                            .await?;
                    if sub == TraversalDirective::Cancelled {
                        return Ok(TraversalDirective::Cancelled);
                    }
                }
                _ => {}
            }
        }
        Ok(TraversalDirective::None)
    }
    .boxed()
}

/// `BurstChildren`: the members of one level are parallel-safe, so each one
/// walks on its own task.
async fn burst_level(
    hub: &AnalyzerHub,
    container_node: &LinkedNode,
    parent_node: &LinkedNode,
    level: BTreeMap<String, TreeNode>,
    ctx: &AnalysisContext,
    dir_name: &str,
) -> Result<TraversalDirective> {
    let dir_ctx = ctx.with_path(dir_name);
    let mut tasks: JoinSet<Result<TraversalDirective>> = JoinSet::new();
    for (name, member) in level {
        if dir_ctx.is_cancelled() {
            break;
        }
        let hub = hub.clone();
        let container = container_node.clone();
        let parent = parent_node.clone();
        let task_ctx = dir_ctx.clone();
        tasks.spawn(async move {
            let mut single = BTreeMap::new();
            single.insert(name, member);
            walk_level(&hub, &container, &parent, single, &task_ctx).await
        });
    }

    let mut cancelled = false;
    let mut failure = None;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(TraversalDirective::Cancelled)) => cancelled = true,
            Ok(Ok(_)) => {}
            Ok(Err(err)) => {
                if failure.is_none() {
                    failure = Some(err);
                }
            }
            Err(err) => {
                debug!(%err, "burst member task failed to join");
            }
        }
    }
    if let Some(err) = failure {
        return Err(err);
    }
    if cancelled {
        return Ok(TraversalDirective::Cancelled);
    }
    Ok(TraversalDirective::None)
}

fn member_file_node(name: &str, member: &TreeNode, ctx: &AnalysisContext) -> FileNode {
    let path = if ctx.match_context.path.is_empty() {
        name.to_string()
    } else {
        format!("{}/{name}", ctx.match_context.path)
    };
    match &member.entry {
        Some(entry) => {
            let is_dir = entry.kind == EntryKind::Directory || !member.children.is_empty();
            FileNode {
                name: name.to_string(),
                path: path.into(),
                kind: if is_dir {
                    FileKind::Directory
                } else {
                    FileKind::ArchiveItem
                },
                size: (entry.kind == EntryKind::File).then_some(entry.size),
                created: None,
                modified: entry.modified,
                accessed: None,
                revision: None,
                data: entry.data.clone().map(|bytes| {
                    let factory: Arc<dyn StreamFactory> = Arc::new(BytesStreamFactory::new(bytes));
                    factory
                }),
            }
        }
        // intermediate directory the archive never listed explicitly
        None => FileNode {
            name: name.to_string(),
            path: path.into(),
            kind: FileKind::Directory,
            size: None,
            created: None,
            modified: None,
            accessed: None,
            revision: None,
            data: None,
        },
    }
}
