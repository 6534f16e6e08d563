//! Library surface of the `faceta` command-line tool

pub mod commands;

use clap::ValueEnum;

/// Output RDF syntax.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Syntax {
    Turtle,
    Ntriples,
    Nquads,
}

/// Process exit codes, fixed contract for scripting callers.
pub mod exit {
    pub const SUCCESS: i32 = 0;
    pub const PARTIAL_FAILURE: i32 = 1;
    pub const IO_ERROR: i32 = 2;
    pub const CONFIG_ERROR: i32 = 3;
}
