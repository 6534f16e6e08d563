//! Entity analyzer dispatch
//!
//! The hub holds every registered analyzer and routes each entity to all
//! analyzers that claim it, in registration order. The first analyzer to
//! produce a node makes it the entity's primary node; later analyzers see
//! it through the context. An analyzer failure is recorded and attached to
//! the entity's node, and the remaining analyzers still run.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use faceta_rdf::vocab::Prop;
use faceta_rdf::{LinkedNode, LiteralValue, NodeFactory};
use tracing::{debug, warn};

use crate::context::{AnalysisContext, TraversalDirective};
use crate::entity::Entity;
use crate::{Error, Result};

/// What one analyzer produced for one entity.
#[derive(Default)]
pub struct AnalysisResult {
    pub node: Option<LinkedNode>,
    pub label: Option<String>,
    pub directive: TraversalDirective,
}

impl AnalysisResult {
    pub fn node(node: LinkedNode) -> Self {
        Self {
            node: Some(node),
            ..Self::default()
        }
    }

    /// "Not applicable" without being an error.
    pub fn none() -> Self {
        Self::default()
    }
}

/// An analyzer claiming some subset of entities.
#[async_trait]
pub trait EntityAnalyzer: Send + Sync {
    fn name(&self) -> &'static str;

    fn accepts(&self, entity: &Entity) -> bool;

    /// Describe the entity, emitting triples through the context's node
    /// factory. May recurse into sub-entities via `hub.analyze`.
    async fn analyze(
        &self,
        entity: &Entity,
        ctx: &AnalysisContext,
        hub: &AnalyzerHub,
    ) -> Result<AnalysisResult>;
}

struct HubInner {
    analyzers: Vec<Arc<dyn EntityAnalyzer>>,
    factory: NodeFactory,
    entity_count: AtomicU64,
    error_count: AtomicU64,
}

/// Dispatches entities to their analyzers. Cheap to clone; clones share all
/// state.
#[derive(Clone)]
pub struct AnalyzerHub {
    inner: Arc<HubInner>,
}

impl AnalyzerHub {
    pub fn new(factory: NodeFactory, analyzers: Vec<Arc<dyn EntityAnalyzer>>) -> Self {
        Self {
            inner: Arc::new(HubInner {
                analyzers,
                factory,
                entity_count: AtomicU64::new(0),
                error_count: AtomicU64::new(0),
            }),
        }
    }

    pub fn factory(&self) -> &NodeFactory {
        &self.inner.factory
    }

    pub fn entity_count(&self) -> u64 {
        self.inner.entity_count.load(Ordering::Relaxed)
    }

    pub fn error_count(&self) -> u64 {
        self.inner.error_count.load(Ordering::Relaxed)
    }

    /// Route an entity through every analyzer claiming it.
    pub async fn analyze(&self, entity: Entity, ctx: AnalysisContext) -> AnalysisResult {
        if ctx.is_cancelled() {
            return AnalysisResult {
                directive: TraversalDirective::Cancelled,
                ..AnalysisResult::default()
            };
        }
        self.inner.entity_count.fetch_add(1, Ordering::Relaxed);

        let mut primary: Option<LinkedNode> = None;
        let mut label: Option<String> = None;
        let mut combined = TraversalDirective::None;
        let mut current_ctx = ctx.clone();

        for analyzer in &self.inner.analyzers {
            if !analyzer.accepts(&entity) {
                continue;
            }
            if current_ctx.is_cancelled() {
                combined = combined.combine(TraversalDirective::Cancelled);
                break;
            }
            debug!(analyzer = analyzer.name(), entity = %entity.describe(), "dispatching");
            match analyzer.analyze(&entity, &current_ctx, self).await {
                Ok(result) => {
                    combined = combined.combine(result.directive);
                    if label.is_none() {
                        label = result.label;
                    }
                    if primary.is_none() {
                        if let Some(node) = result.node {
                            self.apply_parent_link(&ctx, &node);
                            current_ctx = current_ctx.with_node(node.clone());
                            primary = Some(node);
                        }
                    }
                    if combined == TraversalDirective::Cancelled {
                        break;
                    }
                }
                Err(err) => {
                    self.record_error(&entity, analyzer.name(), &err, primary.as_ref(), &ctx);
                }
            }
        }

        AnalysisResult {
            node: primary,
            label,
            directive: combined,
        }
    }

    fn apply_parent_link(&self, ctx: &AnalysisContext, node: &LinkedNode) {
        if let (Some(parent), Some(prop)) = (&ctx.parent, ctx.parent_link) {
            if let Err(err) = parent.link(prop, node) {
                warn!(%err, "failed to assert parent link");
                self.inner.error_count.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Record a contained per-entity failure: log it, count it, and attach
    /// it to the entity's node when one exists.
    pub fn record_error(
        &self,
        entity: &Entity,
        stage: &str,
        err: &Error,
        node: Option<&LinkedNode>,
        ctx: &AnalysisContext,
    ) {
        warn!(
            entity = %entity.describe(),
            path = %ctx.match_context.path,
            stage,
            %err,
            "entity analysis failure contained"
        );
        self.inner.error_count.fetch_add(1, Ordering::Relaxed);
        if let Some(node) = node {
            let description = format!("{stage}: {err}");
            let _ = node.set(Prop::Description, LiteralValue::String(description));
            if let Some(parent) = &ctx.parent {
                let _ = node.set_iri(Prop::WasDerivedFrom, parent.uri().clone());
            }
        }
    }
}
