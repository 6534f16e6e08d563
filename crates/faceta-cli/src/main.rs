use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;

use faceta_cli::commands::{formats, inspect};
use faceta_cli::Syntax;

#[derive(Parser)]
#[command(
    name = "faceta",
    about = "Describe files, archives and containers as RDF",
    version,
    author,
    long_about = "faceta extracts semantic descriptions from arbitrary files, \
                  archives and containers, emitting an RDF graph that links every \
                  discovered object, hash, format and metadata property under \
                  content-addressed identifiers."
)]
struct Cli {
    /// Set the logging level
    #[arg(short, long, value_enum, default_value = "warn")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect paths and emit their RDF description
    Inspect {
        /// Files or directories to describe
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output RDF syntax
        #[arg(short, long, value_enum, default_value = "turtle")]
        syntax: Syntax,

        /// Hash algorithms, first one mints content identities
        #[arg(long = "hash")]
        hashes: Vec<String>,

        /// SPARQL ASK file selecting entities to materialize
        #[arg(short, long)]
        query: Option<PathBuf>,

        /// Directory for materialized entities
        #[arg(long)]
        extract_dir: Option<PathBuf>,

        /// Container nesting limit
        #[arg(long, default_value_t = 16)]
        max_depth: u32,
    },

    /// List registered formats and hash algorithms
    Formats,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(Level::from(cli.log_level))
        .with_writer(std::io::stderr)
        .init();

    let code = match cli.command {
        Commands::Inspect {
            paths,
            output,
            syntax,
            hashes,
            query,
            extract_dir,
            max_depth,
        } => {
            inspect::handle(inspect::InspectArgs {
                paths,
                output,
                syntax,
                hashes,
                query,
                extract_dir,
                max_depth,
            })
            .await
        }
        Commands::Formats => {
            formats::handle();
            faceta_cli::exit::SUCCESS
        }
    };

    std::process::exit(code);
}
