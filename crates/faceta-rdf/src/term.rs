//! RDF term model
//!
//! Literal formation goes through [`LiteralValue`], a closed union of the
//! value types the pipeline is allowed to emit. There is no dynamic "format
//! whatever this is" path; a value outside the union does not compile.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::vocab::{Vocabulary, XSD_ANY_URI, XSD_BASE64_BINARY, XSD_BOOLEAN, XSD_DATE_TIME, XSD_DECIMAL, XSD_DOUBLE, XSD_FLOAT, XSD_INT, XSD_LONG, XSD_UNSIGNED_INT, XSD_UNSIGNED_LONG};

/// An absolute IRI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Iri(String);

impl Iri {
    pub fn new(iri: impl Into<String>) -> Self {
        Self(iri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Iri {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A literal: lexical form plus optional datatype or language tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub lexical: String,
    pub datatype: Option<Iri>,
    pub language: Option<String>,
}

impl Literal {
    /// A plain string literal.
    pub fn plain(lexical: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: None,
            language: None,
        }
    }

    /// A typed literal.
    pub fn typed(lexical: impl Into<String>, datatype: Iri) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: Some(datatype),
            language: None,
        }
    }

    /// A language-tagged string.
    pub fn tagged(lexical: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: None,
            language: Some(language.into()),
        }
    }

    /// An `xsd:base64Binary` literal over raw bytes.
    pub fn base64(bytes: &[u8]) -> Self {
        use base64::Engine;
        Self::typed(
            base64::engine::general_purpose::STANDARD.encode(bytes),
            Vocabulary::Xsd.term(XSD_BASE64_BINARY),
        )
    }
}

/// Subject or object position term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    Iri(Iri),
    Literal(Literal),
}

impl From<Iri> for Term {
    fn from(value: Iri) -> Self {
        Self::Iri(value)
    }
}

impl From<Literal> for Term {
    fn from(value: Literal) -> Self {
        Self::Literal(value)
    }
}

/// The closed union of values the pipeline may turn into literals.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Bool(bool),
    Int(i32),
    Long(i64),
    UInt(u32),
    ULong(u64),
    Float(f32),
    Double(f64),
    /// Pre-rendered `xsd:decimal` lexical form.
    Decimal(String),
    String(String),
    DateTime(DateTime<Utc>),
    Uri(String),
}

impl LiteralValue {
    /// Render this value as an RDF literal.
    ///
    /// String values pass through [`crate::string_literal`], so unsafe
    /// content is wrapped losslessly rather than emitted raw.
    pub fn to_literal(&self) -> Literal {
        let xsd = |local| Vocabulary::Xsd.term(local);
        match self {
            Self::Bool(v) => Literal::typed(v.to_string(), xsd(XSD_BOOLEAN)),
            Self::Int(v) => Literal::typed(v.to_string(), xsd(XSD_INT)),
            Self::Long(v) => Literal::typed(v.to_string(), xsd(XSD_LONG)),
            Self::UInt(v) => Literal::typed(v.to_string(), xsd(XSD_UNSIGNED_INT)),
            Self::ULong(v) => Literal::typed(v.to_string(), xsd(XSD_UNSIGNED_LONG)),
            Self::Float(v) => Literal::typed(v.to_string(), xsd(XSD_FLOAT)),
            Self::Double(v) => Literal::typed(v.to_string(), xsd(XSD_DOUBLE)),
            Self::Decimal(v) => Literal::typed(v.clone(), xsd(XSD_DECIMAL)),
            Self::String(v) => crate::string_literal(v),
            Self::DateTime(v) => Literal::typed(
                v.to_rfc3339_opts(SecondsFormat::Secs, true),
                xsd(XSD_DATE_TIME),
            ),
            Self::Uri(v) => Literal::typed(v.clone(), xsd(XSD_ANY_URI)),
        }
    }
}

impl From<&str> for LiteralValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for LiteralValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<u64> for LiteralValue {
    fn from(value: u64) -> Self {
        Self::ULong(value)
    }
}

impl From<bool> for LiteralValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// One statement about a subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triple {
    pub subject: Iri,
    pub predicate: Iri,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: Iri, predicate: Iri, object: impl Into<Term>) -> Self {
        Self {
            subject,
            predicate,
            object: object.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_literal_is_xsd_boolean() {
        let lit = LiteralValue::Bool(true).to_literal();
        assert_eq!(lit.lexical, "true");
        assert_eq!(
            lit.datatype.unwrap().as_str(),
            "http://www.w3.org/2001/XMLSchema#boolean"
        );
    }

    #[test]
    fn datetime_literal_is_rfc3339_utc() {
        use chrono::TimeZone;
        let ts = Utc.with_ymd_and_hms(2024, 5, 17, 9, 30, 0).unwrap();
        let lit = LiteralValue::DateTime(ts).to_literal();
        assert_eq!(lit.lexical, "2024-05-17T09:30:00Z");
    }

    #[test]
    fn base64_literal_encodes_bytes() {
        let lit = Literal::base64(&[0x76, 0x4e, 0xfa]);
        assert_eq!(lit.lexical, "dk76");
        assert_eq!(
            lit.datatype.unwrap().as_str(),
            "http://www.w3.org/2001/XMLSchema#base64Binary"
        );
    }

    #[test]
    fn plain_string_has_no_datatype() {
        let lit = LiteralValue::from("hello").to_literal();
        assert_eq!(lit.lexical, "hello");
        assert!(lit.datatype.is_none());
    }
}
