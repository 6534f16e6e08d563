//! Error types for the extraction pipeline

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Format error: {0}")]
    Format(#[from] faceta_formats::Error),

    #[error("Hash error: {0}")]
    Hash(#[from] faceta_hash::Error),

    #[error("RDF error: {0}")]
    Rdf(#[from] faceta_rdf::Error),

    #[error("Format matcher {format} panicked on {path}")]
    MatcherPanic { format: &'static str, path: String },

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Analysis was cancelled")]
    Cancelled,

    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}
