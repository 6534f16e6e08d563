//! The triple sink contract
//!
//! A sink is the boundary between the pipeline and an RDF serialization.
//! Sinks accept triples in any order; per-entity ordering is the emitters'
//! concern. Sinks are externally synchronized — the node factory wraps each
//! one in a mutex and serializes all calls.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::term::{Iri, Triple};
use crate::Result;

pub trait TripleSink: Send {
    /// Register a namespace prefix. Called once per prefix per sink, before
    /// the first triple using the namespace.
    fn namespace(&mut self, prefix: &str, iri: &str) -> Result<()>;

    /// Accept one triple. `graph` is set when the triple belongs to a named
    /// graph the sink is expected to represent (quad syntaxes); sinks for
    /// triple syntaxes may ignore it.
    fn triple(&mut self, triple: &Triple, graph: Option<&Iri>) -> Result<()>;

    /// Signal the end of the stream. Flushes buffered output.
    fn end(&mut self) -> Result<()>;
}

/// Collects triples in memory. Test and query support.
#[derive(Default)]
pub struct MemorySink {
    pub namespaces: Vec<(String, String)>,
    pub triples: Vec<(Triple, Option<Iri>)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All triples about a subject, in emission order.
    pub fn about<'a>(&'a self, subject: &'a Iri) -> impl Iterator<Item = &'a Triple> {
        self.triples
            .iter()
            .map(|(t, _)| t)
            .filter(move |t| &t.subject == subject)
    }
}

impl TripleSink for MemorySink {
    fn namespace(&mut self, prefix: &str, iri: &str) -> Result<()> {
        self.namespaces.push((prefix.to_string(), iri.to_string()));
        Ok(())
    }

    fn triple(&mut self, triple: &Triple, graph: Option<&Iri>) -> Result<()> {
        self.triples.push((triple.clone(), graph.cloned()));
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Hands a sink to the factory while keeping a handle to read the collected
/// output afterwards.
pub struct SharedSink<S>(pub Arc<Mutex<S>>);

impl<S> SharedSink<S> {
    pub fn new(sink: S) -> (Self, Arc<Mutex<S>>) {
        let shared = Arc::new(Mutex::new(sink));
        (Self(Arc::clone(&shared)), shared)
    }
}

impl<S: TripleSink> TripleSink for SharedSink<S> {
    fn namespace(&mut self, prefix: &str, iri: &str) -> Result<()> {
        self.0.lock().namespace(prefix, iri)
    }

    fn triple(&mut self, triple: &Triple, graph: Option<&Iri>) -> Result<()> {
        self.0.lock().triple(triple, graph)
    }

    fn end(&mut self) -> Result<()> {
        self.0.lock().end()
    }
}
