//! N-Triples serializer

use std::io::Write;

use crate::term::{Iri, Triple};
use crate::{Result, TripleSink};

use super::format_term;

pub struct NTriplesWriter<W: Write> {
    out: W,
}

impl<W: Write> NTriplesWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> TripleSink for NTriplesWriter<W> {
    fn namespace(&mut self, _prefix: &str, _iri: &str) -> Result<()> {
        // N-Triples has no prefix mechanism
        Ok(())
    }

    fn triple(&mut self, triple: &Triple, _graph: Option<&Iri>) -> Result<()> {
        writeln!(
            self.out,
            "<{}> <{}> {} .",
            triple.subject,
            triple.predicate,
            format_term(&triple.object)
        )?;
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Literal, LiteralValue};
    use pretty_assertions::assert_eq;

    #[test]
    fn writes_one_statement_per_line() {
        let mut writer = NTriplesWriter::new(Vec::new());
        writer
            .triple(
                &Triple::new(
                    Iri::new("urn:a"),
                    Iri::new("urn:p"),
                    LiteralValue::ULong(2).to_literal(),
                ),
                None,
            )
            .unwrap();
        writer
            .triple(
                &Triple::new(Iri::new("urn:a"), Iri::new("urn:q"), Literal::plain("hi")),
                None,
            )
            .unwrap();
        writer.end().unwrap();

        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(
            text,
            "<urn:a> <urn:p> \"2\"^^<http://www.w3.org/2001/XMLSchema#unsignedLong> .\n\
             <urn:a> <urn:q> \"hi\" .\n"
        );
    }
}
