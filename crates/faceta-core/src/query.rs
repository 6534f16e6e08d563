//! Node query testing
//!
//! A restricted SPARQL ASK filter over a single entity's triples, used to
//! decide whether the entity's bytes are materialized to disk. Supported:
//! `PREFIX` declarations, basic graph patterns with `?var` joins, IRIs,
//! prefixed names, the `a` shorthand, and plain or numeric literals. The
//! variable `?node` is pre-bound to the entity's node.
//!
//! Queries are validated at startup; an unparseable query is a
//! configuration error, raised before any entity is processed.

use std::collections::HashMap;

use faceta_rdf::vocab::Vocabulary;
use faceta_rdf::{Iri, Term, Triple};

use crate::{Error, Result};

const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

#[derive(Debug, Clone, PartialEq, Eq)]
enum PatternTerm {
    Var(String),
    Iri(String),
    Literal(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Bound {
    Iri(String),
    Literal(String),
}

pub struct NodeQueryTester {
    patterns: Vec<[PatternTerm; 3]>,
}

impl NodeQueryTester {
    pub fn parse(text: &str) -> Result<Self> {
        Parser::new(text).parse()
    }

    /// Evaluate the pattern against one entity's triples, with `?node`
    /// bound to the entity node.
    pub fn matches(&self, node: &Iri, triples: &[Triple]) -> bool {
        let mut bindings = HashMap::new();
        bindings.insert("node".to_string(), Bound::Iri(node.as_str().to_string()));
        self.solve(0, &bindings, triples)
    }

    fn solve(&self, index: usize, bindings: &HashMap<String, Bound>, triples: &[Triple]) -> bool {
        let Some(pattern) = self.patterns.get(index) else {
            return true;
        };
        for triple in triples {
            let mut candidate = bindings.clone();
            if unify(&pattern[0], &Bound::Iri(triple.subject.as_str().to_string()), &mut candidate)
                && unify(
                    &pattern[1],
                    &Bound::Iri(triple.predicate.as_str().to_string()),
                    &mut candidate,
                )
                && unify(&pattern[2], &object_value(&triple.object), &mut candidate)
                && self.solve(index + 1, &candidate, triples)
            {
                return true;
            }
        }
        false
    }
}

fn object_value(term: &Term) -> Bound {
    match term {
        Term::Iri(iri) => Bound::Iri(iri.as_str().to_string()),
        Term::Literal(lit) => Bound::Literal(lit.lexical.clone()),
    }
}

fn unify(pattern: &PatternTerm, value: &Bound, bindings: &mut HashMap<String, Bound>) -> bool {
    match pattern {
        PatternTerm::Var(name) => match bindings.get(name) {
            Some(existing) => existing == value,
            None => {
                bindings.insert(name.clone(), value.clone());
                true
            }
        },
        PatternTerm::Iri(iri) => matches!(value, Bound::Iri(v) if v == iri),
        PatternTerm::Literal(lexical) => matches!(value, Bound::Literal(v) if v == lexical),
    }
}

struct Parser<'a> {
    rest: &'a str,
    prefixes: HashMap<String, String>,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        let mut prefixes = HashMap::new();
        // well-known prefixes are available without declaration
        for vocab in Vocabulary::all() {
            prefixes.insert(vocab.prefix().to_string(), vocab.iri().to_string());
        }
        Self {
            rest: text,
            prefixes,
        }
    }

    fn parse(mut self) -> Result<NodeQueryTester> {
        while self.eat_keyword("PREFIX") {
            let name = self.take_until(':')?.trim().to_string();
            self.expect(':')?;
            let iri = self.take_iri()?;
            self.prefixes.insert(name, iri);
        }
        if !self.eat_keyword("ASK") {
            return Err(Error::InvalidQuery("expected ASK".into()));
        }
        self.expect('{')?;

        let mut patterns = Vec::new();
        loop {
            self.skip_ws();
            if self.rest.starts_with('}') {
                self.rest = &self.rest[1..];
                break;
            }
            if self.rest.is_empty() {
                return Err(Error::InvalidQuery("unterminated pattern block".into()));
            }
            let subject = self.take_term()?;
            let predicate = self.take_term()?;
            let object = self.take_term()?;
            patterns.push([subject, predicate, object]);
            self.skip_ws();
            if self.rest.starts_with('.') {
                self.rest = &self.rest[1..];
            }
        }
        if patterns.is_empty() {
            return Err(Error::InvalidQuery("empty pattern block".into()));
        }
        Ok(NodeQueryTester { patterns })
    }

    fn skip_ws(&mut self) {
        self.rest = self.rest.trim_start();
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        self.skip_ws();
        if self.rest.len() >= keyword.len()
            && self.rest[..keyword.len()].eq_ignore_ascii_case(keyword)
        {
            self.rest = &self.rest[keyword.len()..];
            true
        } else {
            false
        }
    }

    fn expect(&mut self, ch: char) -> Result<()> {
        self.skip_ws();
        if self.rest.starts_with(ch) {
            self.rest = &self.rest[ch.len_utf8()..];
            Ok(())
        } else {
            Err(Error::InvalidQuery(format!("expected '{ch}'")))
        }
    }

    fn take_until(&mut self, ch: char) -> Result<&'a str> {
        self.skip_ws();
        match self.rest.find(ch) {
            Some(pos) => {
                let taken = &self.rest[..pos];
                self.rest = &self.rest[pos..];
                Ok(taken)
            }
            None => Err(Error::InvalidQuery(format!("expected '{ch}'"))),
        }
    }

    fn take_iri(&mut self) -> Result<String> {
        self.expect('<')?;
        let iri = self.take_until('>')?.to_string();
        self.expect('>')?;
        Ok(iri)
    }

    fn take_term(&mut self) -> Result<PatternTerm> {
        self.skip_ws();
        let mut chars = self.rest.chars();
        match chars.next() {
            Some('?') => {
                self.rest = &self.rest[1..];
                let name = self.take_name();
                if name.is_empty() {
                    return Err(Error::InvalidQuery("empty variable name".into()));
                }
                Ok(PatternTerm::Var(name))
            }
            Some('<') => Ok(PatternTerm::Iri(self.take_iri()?)),
            Some('"') => {
                self.rest = &self.rest[1..];
                let end = self
                    .rest
                    .find('"')
                    .ok_or_else(|| Error::InvalidQuery("unterminated string literal".into()))?;
                let lexical = self.rest[..end].to_string();
                self.rest = &self.rest[end + 1..];
                Ok(PatternTerm::Literal(lexical))
            }
            Some(c) if c.is_ascii_digit() => {
                let number = self.take_name();
                Ok(PatternTerm::Literal(number))
            }
            Some('a') if self.rest[1..].starts_with(|c: char| c.is_whitespace()) => {
                self.rest = &self.rest[1..];
                Ok(PatternTerm::Iri(RDF_TYPE.to_string()))
            }
            Some(_) => {
                let name = self.take_name();
                let (prefix, local) = name.split_once(':').ok_or_else(|| {
                    Error::InvalidQuery(format!("expected a prefixed name, got {name}"))
                })?;
                let namespace = self.prefixes.get(prefix).ok_or_else(|| {
                    Error::InvalidQuery(format!("undeclared prefix {prefix}"))
                })?;
                Ok(PatternTerm::Iri(format!("{namespace}{local}")))
            }
            None => Err(Error::InvalidQuery("unexpected end of query".into())),
        }
    }

    fn take_name(&mut self) -> String {
        let end = self
            .rest
            .find(|c: char| c.is_whitespace() || "{}.<>\"".contains(c))
            .unwrap_or(self.rest.len());
        let name = self.rest[..end].to_string();
        self.rest = &self.rest[end..];
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faceta_rdf::vocab::Prop;
    use faceta_rdf::{Literal, LiteralValue};

    fn triples() -> Vec<Triple> {
        let node = Iri::new("urn:md5:AB");
        vec![
            Triple::new(
                node.clone(),
                Prop::ByteSize.iri(),
                LiteralValue::ULong(2).to_literal(),
            ),
            Triple::new(node.clone(), Prop::MimeType.iri(), Literal::plain("text/plain")),
            Triple::new(
                node,
                Prop::HasFormat.iri(),
                Iri::new("urn:md5:AB#xml"),
            ),
        ]
    }

    #[test]
    fn node_variable_is_prebound() {
        let tester = NodeQueryTester::parse("ASK { ?node nie:mimeType \"text/plain\" }").unwrap();
        assert!(tester.matches(&Iri::new("urn:md5:AB"), &triples()));
        assert!(!tester.matches(&Iri::new("urn:md5:other"), &triples()));
    }

    #[test]
    fn joins_bind_across_patterns() {
        let tester = NodeQueryTester::parse(
            "ASK { ?node nie:byteSize ?size . ?node dcterms:hasFormat ?f }",
        )
        .unwrap();
        assert!(tester.matches(&Iri::new("urn:md5:AB"), &triples()));
    }

    #[test]
    fn declared_prefix_overrides_nothing_but_works() {
        let tester = NodeQueryTester::parse(
            "PREFIX x: <http://www.semanticdesktop.org/ontologies/2007/01/19/nie#>\n\
             ASK { ?node x:mimeType \"text/plain\" }",
        )
        .unwrap();
        assert!(tester.matches(&Iri::new("urn:md5:AB"), &triples()));
    }

    #[test]
    fn unmatched_literal_fails() {
        let tester = NodeQueryTester::parse("ASK { ?node nie:mimeType \"image/png\" }").unwrap();
        assert!(!tester.matches(&Iri::new("urn:md5:AB"), &triples()));
    }

    #[test]
    fn numeric_literals_match_lexically() {
        let tester = NodeQueryTester::parse("ASK { ?node nie:byteSize 2 }").unwrap();
        assert!(tester.matches(&Iri::new("urn:md5:AB"), &triples()));
    }

    #[test]
    fn malformed_queries_are_configuration_errors() {
        assert!(NodeQueryTester::parse("SELECT * WHERE { }").is_err());
        assert!(NodeQueryTester::parse("ASK { ?node }").is_err());
        assert!(NodeQueryTester::parse("ASK { ?node nie:mimeType \"x\"").is_err());
        assert!(NodeQueryTester::parse("ASK { }").is_err());
        assert!(NodeQueryTester::parse("ASK { ?node unknown:p ?x }").is_err());
    }
}
