//! Turtle serializer
//!
//! Prefix directives are interleaved with the data: the factory registers a
//! namespace before the first triple that uses it, and Turtle permits
//! `@prefix` anywhere at the top level. IRIs that fit a registered prefix
//! are abbreviated; everything else is written in full.

use std::io::Write;

use crate::term::{Iri, Term, Triple};
use crate::{Result, TripleSink};

use super::escape_literal;

pub struct TurtleWriter<W: Write> {
    out: W,
    // (namespace iri, prefix), longest namespace first
    prefixes: Vec<(String, String)>,
}

impl<W: Write> TurtleWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            prefixes: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn abbreviate(&self, iri: &Iri) -> Option<String> {
        for (ns, prefix) in &self.prefixes {
            if let Some(local) = iri.as_str().strip_prefix(ns.as_str()) {
                if is_pn_local(local) {
                    return Some(format!("{prefix}:{local}"));
                }
            }
        }
        None
    }

    fn write_iri(&mut self, iri: &Iri) -> Result<()> {
        match self.abbreviate(iri) {
            Some(prefixed) => write!(self.out, "{prefixed}")?,
            None => write!(self.out, "<{iri}>")?,
        }
        Ok(())
    }

    fn write_term(&mut self, term: &Term) -> Result<()> {
        match term {
            Term::Iri(iri) => self.write_iri(iri),
            Term::Literal(lit) => {
                let mut rendered = String::with_capacity(lit.lexical.len() + 2);
                rendered.push('"');
                escape_literal(&lit.lexical, &mut rendered);
                rendered.push('"');
                write!(self.out, "{rendered}")?;
                if let Some(lang) = &lit.language {
                    write!(self.out, "@{lang}")?;
                } else if let Some(dt) = &lit.datatype {
                    write!(self.out, "^^")?;
                    self.write_iri(dt)?;
                }
                Ok(())
            }
        }
    }
}

// Conservative subset of Turtle's PN_LOCAL: never abbreviate a name the
// grammar might reject.
fn is_pn_local(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return false;
    }
    if s.ends_with('.') {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
}

impl<W: Write + Send> TripleSink for TurtleWriter<W> {
    fn namespace(&mut self, prefix: &str, iri: &str) -> Result<()> {
        writeln!(self.out, "@prefix {prefix}: <{iri}> .")?;
        self.prefixes.push((iri.to_string(), prefix.to_string()));
        // longest namespace wins when one is a prefix of another
        self.prefixes.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        Ok(())
    }

    fn triple(&mut self, triple: &Triple, _graph: Option<&Iri>) -> Result<()> {
        self.write_iri(&triple.subject)?;
        write!(self.out, " ")?;
        self.write_iri(&triple.predicate)?;
        write!(self.out, " ")?;
        self.write_term(&triple.object)?;
        writeln!(self.out, " .")?;
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
    use crate::vocab::{Prop, Vocabulary};
    use crate::LiteralValue;
    use pretty_assertions::assert_eq;

    #[test]
    fn registered_prefix_abbreviates() {
        let mut writer = TurtleWriter::new(Vec::new());
        writer
            .namespace("nie", Vocabulary::Nie.iri())
            .unwrap();
        writer
            .triple(
                &Triple::new(
                    Iri::new("urn:md5:AB"),
                    Prop::ByteSize.iri(),
                    LiteralValue::ULong(3).to_literal(),
                ),
                None,
            )
            .unwrap();
        writer.end().unwrap();

        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert!(text.contains("@prefix nie: <http://www.semanticdesktop.org/ontologies/2007/01/19/nie#> ."));
        assert!(text.contains("<urn:md5:AB> nie:byteSize"));
    }

    #[test]
    fn unregistered_iri_written_in_full() {
        let mut writer = TurtleWriter::new(Vec::new());
        writer
            .triple(
                &Triple::new(Iri::new("urn:a"), Iri::new("urn:p"), Iri::new("urn:b")),
                None,
            )
            .unwrap();
        writer.end().unwrap();

        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(text, "<urn:a> <urn:p> <urn:b> .\n");
    }

    #[test]
    fn awkward_local_names_are_not_abbreviated() {
        let mut writer = TurtleWriter::new(Vec::new());
        writer.namespace("ex", "http://example.org/").unwrap();
        writer
            .triple(
                &Triple::new(
                    Iri::new("http://example.org/a b"),
                    Iri::new("urn:p"),
                    Iri::new("http://example.org/ok"),
                ),
                None,
            )
            .unwrap();
        writer.end().unwrap();

        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert!(text.contains("<http://example.org/a b> <urn:p> ex:ok ."));
    }
}
