//! N-Quads serializer

use std::io::Write;

use crate::term::{Iri, Triple};
use crate::{Result, TripleSink};

use super::format_term;

pub struct NQuadsWriter<W: Write> {
    out: W,
}

impl<W: Write> NQuadsWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> TripleSink for NQuadsWriter<W> {
    fn namespace(&mut self, _prefix: &str, _iri: &str) -> Result<()> {
        Ok(())
    }

    fn triple(&mut self, triple: &Triple, graph: Option<&Iri>) -> Result<()> {
        match graph {
            Some(g) => writeln!(
                self.out,
                "<{}> <{}> {} <{g}> .",
                triple.subject,
                triple.predicate,
                format_term(&triple.object)
            )?,
            None => writeln!(
                self.out,
                "<{}> <{}> {} .",
                triple.subject,
                triple.predicate,
                format_term(&triple.object)
            )?,
        }
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}
