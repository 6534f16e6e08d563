//! Linked-node factory
//!
//! Mints the URI-identified subjects of the output graph, deduplicates them,
//! and routes every emitted triple to the sink owning its graph. Nodes are
//! value-like handles; cloning one is cheap and all clones emit through the
//! same factory.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::{DashMap, DashSet};
use parking_lot::Mutex;
use tracing::trace;

use faceta_hash::HashAlgorithm;

use crate::sink::TripleSink;
use crate::term::{Iri, Literal, LiteralValue, Term, Triple};
use crate::uri::relative_node_uri;
use crate::vocab::{Class, Prop, Vocabulary};
use crate::Result;

/// Produces a URI from a typed key. `None` means the value carries no usable
/// identity and no node should be minted for it.
pub trait UriFormatter<K> {
    fn format(&self, key: &K) -> Option<String>;
}

struct NamedGraph {
    iri: Iri,
    sink: Mutex<Box<dyn TripleSink>>,
}

struct Inner {
    default_sink: Mutex<Box<dyn TripleSink>>,
    named: Vec<NamedGraph>,
    // graph IRI → index into `named`; kept as a back-index so sinks never
    // hold references to the factory
    graph_index: HashMap<String, usize>,
    // namespace IRI → registered prefix
    namespaces: DashMap<String, String>,
    auto_prefix: AtomicUsize,
    minted: DashSet<String>,
    triple_count: AtomicU64,
}

/// Mints node identities and routes triples. Cheap to clone.
#[derive(Clone)]
pub struct NodeFactory {
    inner: Arc<Inner>,
}

impl NodeFactory {
    pub fn new(default_sink: Box<dyn TripleSink>) -> Self {
        Self {
            inner: Arc::new(Inner {
                default_sink: Mutex::new(default_sink),
                named: Vec::new(),
                graph_index: HashMap::new(),
                namespaces: DashMap::new(),
                auto_prefix: AtomicUsize::new(0),
                minted: DashSet::new(),
                triple_count: AtomicU64::new(0),
            }),
        }
    }

    /// Build a factory with named graphs routed to their own sinks.
    pub fn with_graphs(
        default_sink: Box<dyn TripleSink>,
        graphs: Vec<(Iri, Box<dyn TripleSink>)>,
    ) -> Self {
        let mut named = Vec::with_capacity(graphs.len());
        let mut graph_index = HashMap::with_capacity(graphs.len());
        for (iri, sink) in graphs {
            graph_index.insert(iri.as_str().to_string(), named.len());
            named.push(NamedGraph {
                iri,
                sink: Mutex::new(sink),
            });
        }
        Self {
            inner: Arc::new(Inner {
                default_sink: Mutex::new(default_sink),
                named,
                graph_index,
                namespaces: DashMap::new(),
                auto_prefix: AtomicUsize::new(0),
                minted: DashSet::new(),
                triple_count: AtomicU64::new(0),
            }),
        }
    }

    /// Node identified by an explicit URI, in the default graph.
    pub fn node(&self, uri: impl Into<Iri>) -> LinkedNode {
        let uri = uri.into();
        let is_new = self.inner.minted.insert(uri.as_str().to_string());
        LinkedNode {
            uri,
            graph: None,
            factory: self.clone(),
            is_new,
        }
    }

    /// Node whose triples route to a named graph.
    pub fn node_in_graph(&self, uri: impl Into<Iri>, graph: Iri) -> LinkedNode {
        let mut node = self.node(uri);
        node.graph = Some(graph);
        node
    }

    /// Content-addressed node for a digest.
    pub fn node_for_digest(
        &self,
        algo: &dyn HashAlgorithm,
        digest: &[u8],
    ) -> Result<LinkedNode> {
        let uri = algo.uri_for(digest)?;
        Ok(self.node(Iri::new(uri)))
    }

    /// Child node under a parent's URI; inherits the parent's graph.
    pub fn child_node(&self, parent: &LinkedNode, segment: &str) -> LinkedNode {
        let uri = relative_node_uri(&parent.uri, segment);
        let mut node = self.node(uri);
        node.graph = parent.graph.clone();
        node
    }

    /// Node from a typed key via a structural URI formatter.
    pub fn node_from_key<K>(&self, formatter: &impl UriFormatter<K>, key: &K) -> Option<LinkedNode> {
        formatter.format(key).map(|uri| self.node(Iri::new(uri)))
    }

    /// Total triples routed so far.
    pub fn triple_count(&self) -> u64 {
        self.inner.triple_count.load(Ordering::Relaxed)
    }

    /// Register a namespace, propagating the prefix to every sink.
    ///
    /// Known vocabularies keep their preferred prefix; anything else gets a
    /// generated `ns<n>` prefix. Returns the prefix in effect.
    pub fn ensure_namespace(&self, iri: &str) -> Result<String> {
        if let Some(existing) = self.inner.namespaces.get(iri) {
            return Ok(existing.clone());
        }
        let prefix = Vocabulary::all()
            .iter()
            .find(|v| v.iri() == iri)
            .map_or_else(
                || {
                    let n = self.inner.auto_prefix.fetch_add(1, Ordering::Relaxed);
                    format!("ns{n}")
                },
                |v| v.prefix().to_string(),
            );
        // compare-and-set; a racing registration wins and we use its prefix
        match self.inner.namespaces.entry(iri.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(e) => return Ok(e.get().clone()),
            dashmap::mapref::entry::Entry::Vacant(e) => {
                e.insert(prefix.clone());
            }
        }
        trace!(prefix, iri, "registering namespace");
        self.inner.default_sink.lock().namespace(&prefix, iri)?;
        for graph in &self.inner.named {
            graph.sink.lock().namespace(&prefix, iri)?;
        }
        Ok(prefix)
    }

    fn ensure_vocabulary(&self, vocab: Vocabulary) -> Result<()> {
        self.ensure_namespace(vocab.iri())?;
        Ok(())
    }

    fn emit(&self, triple: Triple, graph: Option<&Iri>) -> Result<()> {
        // register namespaces before the triple that needs them
        if let Some(vocab) = vocabulary_of(&triple.predicate) {
            self.ensure_vocabulary(vocab)?;
        }
        if let Term::Literal(lit) = &triple.object {
            if let Some(dt) = &lit.datatype {
                if let Some(vocab) = vocabulary_of(dt) {
                    self.ensure_vocabulary(vocab)?;
                }
            }
        }
        if let Term::Iri(obj) = &triple.object {
            if let Some(vocab) = vocabulary_of(obj) {
                self.ensure_vocabulary(vocab)?;
            }
        }

        self.inner.triple_count.fetch_add(1, Ordering::Relaxed);
        match graph.and_then(|g| self.inner.graph_index.get(g.as_str())) {
            Some(&idx) => {
                let named = &self.inner.named[idx];
                named.sink.lock().triple(&triple, Some(&named.iri))
            }
            None => self.inner.default_sink.lock().triple(&triple, graph),
        }
    }

    /// Close every sink.
    pub fn finish(&self) -> Result<()> {
        self.inner.default_sink.lock().end()?;
        for graph in &self.inner.named {
            graph.sink.lock().end()?;
        }
        Ok(())
    }
}

fn vocabulary_of(iri: &Iri) -> Option<Vocabulary> {
    Vocabulary::all()
        .iter()
        .copied()
        .find(|v| iri.as_str().starts_with(v.iri()))
}

/// The identity of an entity inside the output graph.
///
/// Two nodes with equal URIs refer to the same subject; the factory hands
/// out `is_new() == false` for the second minting so callers can skip
/// re-describing an already-described entity.
#[derive(Clone)]
pub struct LinkedNode {
    uri: Iri,
    graph: Option<Iri>,
    factory: NodeFactory,
    is_new: bool,
}

impl LinkedNode {
    pub fn uri(&self) -> &Iri {
        &self.uri
    }

    pub fn graph(&self) -> Option<&Iri> {
        self.graph.as_ref()
    }

    /// Whether this URI was minted for the first time by this factory.
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// Assert `rdf:type`.
    pub fn classify(&self, class: Class) -> Result<()> {
        self.factory.ensure_vocabulary(class.vocabulary())?;
        self.emit(Prop::Type.iri(), Term::Iri(class.iri()))
    }

    /// Assert a literal-valued property.
    pub fn set(&self, prop: Prop, value: LiteralValue) -> Result<()> {
        self.emit(prop.iri(), Term::Literal(value.to_literal()))
    }

    /// Assert a property with a pre-formed literal.
    pub fn set_literal(&self, prop: Prop, literal: Literal) -> Result<()> {
        self.emit(prop.iri(), Term::Literal(literal))
    }

    /// Assert an IRI-valued property.
    pub fn set_iri(&self, prop: Prop, iri: Iri) -> Result<()> {
        self.emit(prop.iri(), Term::Iri(iri))
    }

    /// Link this node to another.
    pub fn link(&self, prop: Prop, other: &Self) -> Result<()> {
        self.emit(prop.iri(), Term::Iri(other.uri.clone()))
    }

    /// Derive a child node under this node's URI.
    pub fn child(&self, segment: &str) -> Self {
        self.factory.child_node(self, segment)
    }

    pub fn factory(&self) -> &NodeFactory {
        &self.factory
    }

    fn emit(&self, predicate: Iri, object: Term) -> Result<()> {
        self.factory.emit(
            Triple::new(self.uri.clone(), predicate, object),
            self.graph.as_ref(),
        )
    }
}

impl fmt::Debug for LinkedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkedNode")
            .field("uri", &self.uri)
            .field("graph", &self.graph)
            .finish_non_exhaustive()
    }
}

impl PartialEq for LinkedNode {
    fn eq(&self, other: &Self) -> bool {
        self.uri == other.uri
    }
}

impl Eq for LinkedNode {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;

    fn memory_factory() -> NodeFactory {
        NodeFactory::new(Box::new(MemorySink::new()))
    }

    #[test]
    fn second_minting_is_not_new() {
        let factory = memory_factory();
        assert!(factory.node("urn:x").is_new());
        assert!(!factory.node("urn:x").is_new());
    }

    #[test]
    fn child_uri_hangs_off_fragment() {
        let factory = memory_factory();
        let parent = factory.node("urn:md5:AB");
        let child = parent.child("entry.txt");
        assert_eq!(child.uri().as_str(), "urn:md5:AB#entry.txt");
    }

    #[test]
    fn known_namespace_keeps_preferred_prefix() {
        let factory = memory_factory();
        let prefix = factory.ensure_namespace(Vocabulary::Nie.iri()).unwrap();
        assert_eq!(prefix, "nie");
    }

    #[test]
    fn unknown_namespace_gets_counter_prefix() {
        let factory = memory_factory();
        let first = factory.ensure_namespace("http://example.org/a#").unwrap();
        let second = factory.ensure_namespace("http://example.org/b#").unwrap();
        assert_eq!(first, "ns0");
        assert_eq!(second, "ns1");
        // re-registration returns the same prefix
        assert_eq!(factory.ensure_namespace("http://example.org/a#").unwrap(), "ns0");
    }

    #[test]
    fn triples_route_to_named_graph_sink() {
        let graph = Iri::new("urn:graph:meta");
        let factory = NodeFactory::with_graphs(
            Box::new(MemorySink::new()),
            vec![(graph.clone(), Box::new(MemorySink::new()))],
        );
        let node = factory.node_in_graph("urn:x", graph);
        node.set(Prop::ByteSize, LiteralValue::ULong(1)).unwrap();
        // the default graph saw nothing, so the count still reflects routing
        assert_eq!(factory.triple_count(), 1);
    }

    struct EvenFormatter;

    impl UriFormatter<u32> for EvenFormatter {
        fn format(&self, key: &u32) -> Option<String> {
            (key % 2 == 0).then(|| format!("urn:even:{key}"))
        }
    }

    #[test]
    fn formatter_none_means_no_identity() {
        let factory = memory_factory();
        assert!(factory.node_from_key(&EvenFormatter, &4).is_some());
        assert!(factory.node_from_key(&EvenFormatter, &3).is_none());
    }
}
