//! Literal string safety
//!
//! RDF serializations disagree on which codepoints survive a round trip
//! through their escaping rules. Every literal string passes through
//! [`is_safe_string`]; strings that fail are wrapped as an `rdf:JSON`
//! literal whose `@value` field preserves the exact content.

use std::sync::LazyLock;

use regex::Regex;

use crate::term::Literal;
use crate::vocab::rdf_json;

// C0/C1 controls except tab, LF, CR; unassigned codepoints; a leading
// combining mark cannot start a well-formed literal.
static UNSAFE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x7F-\x9F]|\p{Cn}|\A\p{M}").unwrap()
});

/// Whether a string may be emitted as a plain literal.
pub fn is_safe_string(s: &str) -> bool {
    !UNSAFE.is_match(s)
}

/// Form a literal from an arbitrary string, wrapping unsafe content.
pub fn string_literal(s: &str) -> Literal {
    if is_safe_string(s) {
        Literal::plain(s)
    } else {
        let wrapped = serde_json::json!({ "@value": s });
        Literal::typed(wrapped.to_string(), rdf_json())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinary_text_is_safe() {
        assert!(is_safe_string("hello.txt"));
        assert!(is_safe_string("multi\nline\ttext\r\n"));
        assert!(is_safe_string("čeština få 中文"));
    }

    #[test]
    fn controls_are_unsafe() {
        assert!(!is_safe_string("nul\u{0}byte"));
        assert!(!is_safe_string("escape\u{1b}[0m"));
        assert!(!is_safe_string("c1\u{85}control"));
    }

    #[test]
    fn leading_combining_mark_is_unsafe() {
        assert!(!is_safe_string("\u{0301}abc"));
        // the same mark after a base character is fine
        assert!(is_safe_string("e\u{0301}"));
    }

    #[test]
    fn unsafe_string_wraps_losslessly() {
        let lit = string_literal("a\u{0}b");
        assert_eq!(
            lit.datatype.as_ref().unwrap().as_str(),
            "http://www.w3.org/1999/02/22-rdf-syntax-ns#JSON"
        );
        let value: serde_json::Value = serde_json::from_str(&lit.lexical).unwrap();
        assert_eq!(value["@value"], "a\u{0}b");
    }

    #[test]
    fn safe_string_stays_plain() {
        let lit = string_literal("plain");
        assert!(lit.datatype.is_none());
        assert_eq!(lit.lexical, "plain");
    }
}
