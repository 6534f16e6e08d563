//! URI formatting helpers

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::term::Iri;

// RFC 3986 fragment-safe set: encode everything outside unreserved + a few
// sub-delims that stay readable in practice.
const FRAGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'#')
    .add(b'%')
    .add(b'{')
    .add(b'}')
    .add(b'\\')
    .add(b'^')
    .add(b'|');

/// Media-type URN, e.g. `urn:urim:text%2Fplain`.
pub fn media_type_uri(media_type: &str) -> Iri {
    let escaped: String = utf8_percent_encode(media_type, FRAGMENT)
        .to_string()
        .replace('/', "%2F");
    Iri::new(format!("urn:urim:{escaped}"))
}

/// A child URI under a parent node.
///
/// The first level of descent hangs off a fragment; deeper levels extend the
/// fragment path, so the container hierarchy stays readable in the URI.
pub fn relative_node_uri(parent: &Iri, segment: &str) -> Iri {
    let escaped = utf8_percent_encode(segment, FRAGMENT).to_string();
    if parent.as_str().contains('#') {
        Iri::new(format!("{parent}/{escaped}"))
    } else {
        Iri::new(format!("{parent}#{escaped}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_type_slash_is_escaped() {
        assert_eq!(media_type_uri("text/plain").as_str(), "urn:urim:text%2Fplain");
    }

    #[test]
    fn first_descent_uses_fragment() {
        let parent = Iri::new("urn:md5:AB");
        assert_eq!(relative_node_uri(&parent, "hello.txt").as_str(), "urn:md5:AB#hello.txt");
    }

    #[test]
    fn nested_descent_extends_the_fragment_path() {
        let parent = Iri::new("urn:md5:AB#inner.zip");
        assert_eq!(
            relative_node_uri(&parent, "hello.txt").as_str(),
            "urn:md5:AB#inner.zip/hello.txt"
        );
    }

    #[test]
    fn unsafe_segment_characters_are_escaped() {
        let parent = Iri::new("urn:md5:AB");
        assert_eq!(
            relative_node_uri(&parent, "a b#c").as_str(),
            "urn:md5:AB#a%20b%23c"
        );
    }
}
