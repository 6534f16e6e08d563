//! `faceta inspect` — run the extraction pipeline over a set of paths

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use tracing::error;

use faceta_core::{Error as CoreError, Inspector, InspectorConfig, RunSummary};
use faceta_hash::HashAlgorithmId;
use faceta_rdf::writer::{NQuadsWriter, NTriplesWriter, TurtleWriter};
use faceta_rdf::TripleSink;

use crate::{exit, Syntax};

pub struct InspectArgs {
    pub paths: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub syntax: Syntax,
    pub hashes: Vec<String>,
    pub query: Option<PathBuf>,
    pub extract_dir: Option<PathBuf>,
    pub max_depth: u32,
}

/// Returns the process exit code.
pub async fn handle(args: InspectArgs) -> i32 {
    let mut config = InspectorConfig {
        max_depth: args.max_depth,
        extract_dir: args.extract_dir.clone(),
        ..InspectorConfig::default()
    };

    if !args.hashes.is_empty() {
        let mut algorithms = Vec::new();
        for name in &args.hashes {
            match name.parse::<HashAlgorithmId>() {
                Ok(id) => algorithms.push(id),
                Err(err) => {
                    error!(%err, "unknown hash algorithm");
                    return exit::CONFIG_ERROR;
                }
            }
        }
        config.algorithms = algorithms;
    }

    if let Some(query_path) = &args.query {
        match std::fs::read_to_string(query_path) {
            Ok(text) => config.query = Some(text),
            Err(err) => {
                error!(path = %query_path.display(), %err, "cannot read query file");
                return exit::CONFIG_ERROR;
            }
        }
    }

    let sink = match open_sink(args.output.as_deref(), args.syntax) {
        Ok(sink) => sink,
        Err(err) => {
            error!(%err, "cannot open output");
            return exit::IO_ERROR;
        }
    };

    let inspector = match Inspector::new(config, sink) {
        Ok(inspector) => inspector,
        Err(err) => {
            error!(%err, "invalid configuration");
            return exit::CONFIG_ERROR;
        }
    };

    for path in &args.paths {
        if let Err(err) = inspector.inspect_path(path).await {
            error!(path = %path.display(), %err, "cannot inspect path");
            return match err {
                CoreError::Io(_) => exit::IO_ERROR,
                _ => exit::PARTIAL_FAILURE,
            };
        }
    }

    match inspector.finish() {
        Ok(summary) => {
            report(&summary);
            if summary.errors > 0 {
                exit::PARTIAL_FAILURE
            } else {
                exit::SUCCESS
            }
        }
        Err(err) => {
            error!(%err, "cannot finish output");
            exit::IO_ERROR
        }
    }
}

fn open_sink(
    output: Option<&std::path::Path>,
    syntax: Syntax,
) -> std::io::Result<Box<dyn TripleSink>> {
    let writer: Box<dyn Write + Send> = match output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(std::io::stdout()),
    };
    Ok(match syntax {
        Syntax::Turtle => Box::new(TurtleWriter::new(writer)),
        Syntax::Ntriples => Box::new(NTriplesWriter::new(writer)),
        Syntax::Nquads => Box::new(NQuadsWriter::new(writer)),
    })
}

fn report(summary: &RunSummary) {
    eprintln!(
        "{} entities, {} triples, {} errors",
        summary.entities, summary.triples, summary.errors
    );
}
