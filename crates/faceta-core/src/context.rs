//! Analysis context and traversal directives
//!
//! The context is immutable; every descent derives a new one. It carries
//! the parent node, the link property the dispatcher applies, the match
//! context, the cancellation token, and the set of content URIs on the
//! current descent stack (cycle avoidance).

use std::sync::Arc;

use faceta_formats::MatchContext;
use faceta_rdf::vocab::Prop;
use faceta_rdf::LinkedNode;
use tokio_util::sync::CancellationToken;

/// Governs container descent. Directives combine by maximum: a veto from
/// one collaborator beats an invitation from another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum TraversalDirective {
    #[default]
    None,
    FollowChildren,
    /// Children are independent and may run in parallel.
    BurstChildren,
    SkipChildren,
    /// Abandon the rest of the current level.
    SkipSiblings,
    Cancelled,
}

impl TraversalDirective {
    pub fn combine(self, other: Self) -> Self {
        self.max(other)
    }

    /// Whether children should be analyzed at all.
    pub fn descends(self) -> bool {
        matches!(self, Self::FollowChildren | Self::BurstChildren)
    }
}

// one frame per container/derived payload on the descent stack
struct VisitedFrame {
    key: String,
    parent: Option<Arc<VisitedFrame>>,
}

#[derive(Clone)]
pub struct AnalysisContext {
    /// Node of the enclosing entity, if any.
    pub parent: Option<LinkedNode>,
    /// Property the dispatcher asserts from `parent` to the primary node.
    pub parent_link: Option<Prop>,
    /// Primary node produced by an earlier analyzer of the same entity.
    pub node: Option<LinkedNode>,
    pub match_context: MatchContext,
    pub cancellation: CancellationToken,
    pub depth: u32,
    visited: Option<Arc<VisitedFrame>>,
}

impl AnalysisContext {
    pub fn root(cancellation: CancellationToken) -> Self {
        Self {
            parent: None,
            parent_link: None,
            node: None,
            match_context: MatchContext::default(),
            cancellation,
            depth: 0,
            visited: None,
        }
    }

    /// Derive a context for a child linked from `parent` via `prop`.
    pub fn with_parent_link(&self, parent: LinkedNode, prop: Prop) -> Self {
        let mut derived = self.clone();
        derived.parent = Some(parent);
        derived.parent_link = Some(prop);
        derived.node = None;
        derived
    }

    /// Derive a context under `parent` with no dispatcher-asserted link;
    /// the caller emits the structural link itself.
    pub fn with_parent(&self, parent: LinkedNode) -> Self {
        let mut derived = self.clone();
        derived.parent = Some(parent);
        derived.parent_link = None;
        derived.node = None;
        derived
    }

    /// Derive a context one path segment deeper.
    pub fn with_path(&self, segment: &str) -> Self {
        let mut derived = self.clone();
        derived.match_context = self.match_context.with_path(segment);
        derived.depth = self.depth + 1;
        derived
    }

    /// Derive a context with the primary node visible to later analyzers.
    pub fn with_node(&self, node: LinkedNode) -> Self {
        let mut derived = self.clone();
        derived.node = Some(node);
        derived
    }

    /// Push a descent key (a content URI) onto the stack.
    pub fn with_visited(&self, key: &str) -> Self {
        let mut derived = self.clone();
        derived.visited = Some(Arc::new(VisitedFrame {
            key: key.to_string(),
            parent: self.visited.clone(),
        }));
        derived
    }

    /// Whether a descent key is already on the current stack.
    pub fn already_visited(&self, key: &str) -> bool {
        let mut frame = self.visited.as_ref();
        while let Some(current) = frame {
            if current.key == key {
                return true;
            }
            frame = current.parent.as_ref();
        }
        false
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_combine_by_maximum() {
        use TraversalDirective::{Cancelled, FollowChildren, None, SkipChildren, SkipSiblings};
        assert_eq!(None.combine(FollowChildren), FollowChildren);
        assert_eq!(FollowChildren.combine(SkipChildren), SkipChildren);
        assert_eq!(SkipChildren.combine(FollowChildren), SkipChildren);
        assert_eq!(SkipSiblings.combine(SkipChildren), SkipSiblings);
        assert_eq!(Cancelled.combine(SkipSiblings), Cancelled);
    }

    #[test]
    fn only_follow_variants_descend() {
        assert!(TraversalDirective::FollowChildren.descends());
        assert!(TraversalDirective::BurstChildren.descends());
        assert!(!TraversalDirective::SkipChildren.descends());
        assert!(!TraversalDirective::None.descends());
    }

    #[test]
    fn visited_keys_are_scoped_to_the_stack() {
        let root = AnalysisContext::root(CancellationToken::new());
        let inner = root.with_visited("urn:md5:A");
        let deeper = inner.with_visited("urn:md5:B");

        assert!(deeper.already_visited("urn:md5:A"));
        assert!(deeper.already_visited("urn:md5:B"));
        assert!(!inner.already_visited("urn:md5:B"));
        assert!(!root.already_visited("urn:md5:A"));
    }

    #[test]
    fn derived_context_extends_path_and_depth() {
        let root = AnalysisContext::root(CancellationToken::new());
        let child = root.with_path("outer.zip").with_path("inner.txt");
        assert_eq!(child.match_context.path, "outer.zip/inner.txt");
        assert_eq!(child.depth, 2);
    }
}
