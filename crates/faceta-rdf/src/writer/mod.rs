//! RDF serializers
//!
//! Each writer implements [`crate::TripleSink`] over any `std::io::Write`.
//! The pipeline holds the sink behind a mutex, so writers are free to keep
//! internal state without their own locking.

mod ntriples;
mod nquads;
mod turtle;

pub use ntriples::NTriplesWriter;
pub use nquads::NQuadsWriter;
pub use turtle::TurtleWriter;

/// Escape a literal's lexical form for the N-Triples family and Turtle.
pub(crate) fn escape_literal(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04X}", c as u32));
            }
            c => out.push(c),
        }
    }
}

/// Render a term in N-Triples syntax.
pub(crate) fn format_term(term: &crate::Term) -> String {
    match term {
        crate::Term::Iri(iri) => format!("<{iri}>"),
        crate::Term::Literal(lit) => {
            let mut rendered = String::with_capacity(lit.lexical.len() + 2);
            rendered.push('"');
            escape_literal(&lit.lexical, &mut rendered);
            rendered.push('"');
            if let Some(lang) = &lit.language {
                rendered.push('@');
                rendered.push_str(lang);
            } else if let Some(dt) = &lit.datatype {
                rendered.push_str("^^<");
                rendered.push_str(dt.as_str());
                rendered.push('>');
            }
            rendered
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Literal, Term};

    #[test]
    fn quotes_and_backslashes_escape() {
        let mut out = String::new();
        escape_literal("a\"b\\c", &mut out);
        assert_eq!(out, "a\\\"b\\\\c");
    }

    #[test]
    fn low_controls_become_unicode_escapes() {
        let mut out = String::new();
        escape_literal("x\u{01}y", &mut out);
        assert_eq!(out, "x\\u0001y");
    }

    #[test]
    fn typed_literal_renders_with_datatype() {
        let term = Term::Literal(Literal::typed("3", crate::Iri::new("http://example.org/int")));
        assert_eq!(format_term(&term), "\"3\"^^<http://example.org/int>");
    }

    #[test]
    fn language_tag_wins_over_datatype() {
        let term = Term::Literal(Literal::tagged("bonjour", "fr"));
        assert_eq!(format_term(&term), "\"bonjour\"@fr");
    }
}
