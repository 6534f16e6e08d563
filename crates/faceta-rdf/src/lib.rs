//! RDF emission layer for faceta
//!
//! The extraction pipeline does not build an in-memory graph; analyzers emit
//! triples as they discover facts, and this crate turns those emissions into
//! serialized RDF. It provides:
//!
//! - the term model ([`Iri`], [`Term`], [`Literal`]) with literal formation
//!   restricted to a tagged union of supported value types,
//! - the vocabulary tables ([`vocab`]) mapping properties and classes to
//!   their namespace and local name,
//! - the [`TripleSink`] contract plus Turtle / N-Triples / N-Quads writers,
//! - the [`NodeFactory`], which mints deduplicated [`LinkedNode`] identities
//!   and routes triples to the right output graph.

mod error;
mod factory;
mod safety;
mod sink;
mod term;
mod uri;

pub mod vocab;
pub mod writer;

pub use error::Error;
pub use factory::{LinkedNode, NodeFactory, UriFormatter};
pub use safety::{is_safe_string, string_literal};
pub use sink::{MemorySink, SharedSink, TripleSink};
pub use term::{Iri, Literal, LiteralValue, Term, Triple};
pub use uri::{media_type_uri, relative_node_uri};

pub type Result<T> = std::result::Result<T, Error>;
