//! Error types for RDF emission

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid IRI: {0}")]
    InvalidIri(String),

    #[error("Graph {0} is not registered")]
    UnknownGraph(String),

    #[error("Hash error: {0}")]
    Hash(#[from] faceta_hash::Error),
}
