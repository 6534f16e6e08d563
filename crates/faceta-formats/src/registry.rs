//! Format registry and header matching
//!
//! Signatures are indexed in a byte-prefix trie; one walk over the header
//! window collects every signatured candidate, deepest match first. Formats
//! without signatures are appended after all signatured candidates, in
//! registration order, and only for binary data. `check_header` vetoes a
//! candidate before it is returned.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use crate::format::{FileFormat, FormatKind};
use crate::{gzip::GzipFormat, png::PngFormat, tar_format::TarFormat, xml::XmlFormat, zip_format::ZipFormat};

#[derive(Default)]
struct TrieNode {
    children: HashMap<u8, TrieNode>,
    /// Indices of formats whose signature ends at this node.
    terminals: Vec<usize>,
}

pub struct FormatRegistry {
    formats: Vec<Arc<dyn FileFormat>>,
    root: TrieNode,
    max_signature_len: usize,
}

impl FormatRegistry {
    pub fn new() -> Self {
        Self {
            formats: Vec::new(),
            root: TrieNode::default(),
            max_signature_len: 0,
        }
    }

    /// Registry holding the built-in detector set.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ZipFormat));
        registry.register(Arc::new(GzipFormat));
        registry.register(Arc::new(PngFormat));
        registry.register(Arc::new(XmlFormat::new()));
        registry.register(Arc::new(TarFormat));
        registry
    }

    pub fn register(&mut self, format: Arc<dyn FileFormat>) {
        let index = self.formats.len();
        for signature in format.signatures() {
            let mut node = &mut self.root;
            for byte in *signature {
                node = node.children.entry(*byte).or_default();
            }
            node.terminals.push(index);
            self.max_signature_len = self.max_signature_len.max(signature.len());
        }
        self.formats.push(format);
    }

    pub fn formats(&self) -> &[Arc<dyn FileFormat>] {
        &self.formats
    }

    /// Longest registered signature; the header window must cover it.
    pub fn max_signature_len(&self) -> usize {
        self.max_signature_len
    }

    /// Candidate formats for a header window, most specific first.
    pub fn candidates(
        &self,
        header: &[u8],
        is_binary: bool,
        is_short: bool,
    ) -> Vec<Arc<dyn FileFormat>> {
        // walk the trie; deeper terminals are more specific
        let mut signatured: Vec<(usize, usize)> = Vec::new();
        let mut node = &self.root;
        for (depth, byte) in header.iter().enumerate() {
            match node.children.get(byte) {
                Some(next) => {
                    node = next;
                    for &index in &next.terminals {
                        signatured.push((depth + 1, index));
                    }
                }
                None => break,
            }
        }
        signatured.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

        let mut seen = vec![false; self.formats.len()];
        let mut candidates = Vec::new();
        for (_, index) in signatured {
            if seen[index] {
                continue;
            }
            seen[index] = true;
            candidates.push(index);
        }
        // signature-less formats run last; the kind filter below drops the
        // binary-only ones for text data
        for (index, format) in self.formats.iter().enumerate() {
            if format.signatures().is_empty() && !seen[index] {
                candidates.push(index);
            }
        }

        let result: Vec<_> = candidates
            .into_iter()
            .map(|index| Arc::clone(&self.formats[index]))
            .filter(|format| is_binary || format.kind() == FormatKind::TextAllowed)
            .filter(|format| format.check_header(header, is_binary, is_short))
            .collect();
        trace!(
            candidates = result.len(),
            header_len = header.len(),
            is_binary,
            "format candidates selected"
        );
        result
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(candidates: &[Arc<dyn FileFormat>]) -> Vec<&'static str> {
        candidates.iter().map(|f| f.name()).collect()
    }

    #[test]
    fn zip_header_selects_zip_first() {
        let registry = FormatRegistry::with_defaults();
        let header = b"PK\x03\x04rest of the file";
        let candidates = registry.candidates(header, true, false);
        assert_eq!(names(&candidates)[0], "zip");
    }

    #[test]
    fn unknown_binary_gets_only_signatureless_candidates() {
        let registry = FormatRegistry::with_defaults();
        let candidates = registry.candidates(b"WASM\0\0\0\0", true, false);
        // tar is signature-less but its check_header rejects this window
        assert!(names(&candidates).is_empty());
    }

    #[test]
    fn text_data_is_not_offered_binary_formats() {
        let registry = FormatRegistry::with_defaults();
        let candidates = registry.candidates(b"<?xml version=\"1.0\"?><a/>", false, false);
        assert_eq!(names(&candidates), vec!["xml"]);
    }

    #[test]
    fn longer_signature_wins_over_shorter() {
        struct Short;
        struct Long;
        impl FileFormat for Short {
            fn name(&self) -> &'static str {
                "short"
            }
            fn signatures(&self) -> &[&'static [u8]] {
                &[b"AB"]
            }
            fn media_type(&self) -> &'static str {
                "application/x-short"
            }
            fn extension(&self) -> &'static str {
                "sh"
            }
            fn check_header(&self, _: &[u8], _: bool, _: bool) -> bool {
                true
            }
            fn match_stream(
                &self,
                _: crate::MatchInput<'_>,
                _: &crate::MatchContext,
            ) -> crate::Result<Option<crate::ParsedFormat>> {
                Ok(None)
            }
        }
        impl FileFormat for Long {
            fn name(&self) -> &'static str {
                "long"
            }
            fn signatures(&self) -> &[&'static [u8]] {
                &[b"ABCD"]
            }
            fn media_type(&self) -> &'static str {
                "application/x-long"
            }
            fn extension(&self) -> &'static str {
                "lg"
            }
            fn check_header(&self, _: &[u8], _: bool, _: bool) -> bool {
                true
            }
            fn match_stream(
                &self,
                _: crate::MatchInput<'_>,
                _: &crate::MatchContext,
            ) -> crate::Result<Option<crate::ParsedFormat>> {
                Ok(None)
            }
        }

        let mut registry = FormatRegistry::new();
        registry.register(Arc::new(Short));
        registry.register(Arc::new(Long));
        let candidates = registry.candidates(b"ABCDEF", true, false);
        assert_eq!(names(&candidates), vec!["long", "short"]);
    }

    #[test]
    fn header_window_covers_every_signature() {
        let registry = FormatRegistry::with_defaults();
        assert!(registry.max_signature_len() <= crate::MAX_HEADER_BYTES);
    }
}
