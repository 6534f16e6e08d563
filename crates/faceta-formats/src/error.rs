//! Error types for format detection and container parsing

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Corrupt {format} data: {detail}")]
    Corrupt { format: &'static str, detail: String },

    #[error("Expanded payload exceeds {limit} bytes")]
    ExpandedTooLarge { limit: u64 },
}
