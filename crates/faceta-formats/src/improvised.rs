//! Improvised formats
//!
//! When no registered format claims a data object, a descriptor is
//! synthesized from the data's own magic bytes or interpreter directive.
//! Downstream tooling can then still group objects of the same unknown
//! kind.

use tracing::debug;

/// A synthesized format descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImprovisedFormat {
    /// Signature-derived tag, e.g. `WASM`.
    pub extension: String,
    /// `application/x.sig.<tag>` or `application/x.exec.<interpreter>`.
    pub media_type: String,
    /// Interpreter binary name for shebang scripts.
    pub interpreter: Option<String>,
}

const MAX_TAG_LEN: usize = 8;
const MIN_TAG_LEN: usize = 2;

/// Derive an improvised format from a header window, if the data carries a
/// usable magic tag or shebang. Empty data never yields a format.
pub fn derive(header: &[u8], is_binary: bool) -> Option<ImprovisedFormat> {
    if header.is_empty() {
        return None;
    }
    if header.starts_with(b"#!") {
        return derive_shebang(header);
    }
    if is_binary {
        return derive_magic(header);
    }
    None
}

fn derive_shebang(header: &[u8]) -> Option<ImprovisedFormat> {
    let line_end = header
        .iter()
        .position(|&b| b == b'\n')
        .unwrap_or(header.len());
    let line = std::str::from_utf8(&header[2..line_end]).ok()?.trim();
    let mut words = line.split_whitespace();
    let program = words.next()?;
    let binary = program.rsplit('/').next()?;
    // `#!/usr/bin/env python` names the interpreter in the first argument
    let interpreter = if binary == "env" {
        words.next()?.to_string()
    } else {
        binary.to_string()
    };
    if interpreter.is_empty() {
        return None;
    }
    debug!(interpreter, "improvised format from shebang");
    Some(ImprovisedFormat {
        extension: interpreter.clone(),
        media_type: format!("application/x.exec.{}", sanitize(&interpreter)),
        interpreter: Some(interpreter),
    })
}

fn derive_magic(header: &[u8]) -> Option<ImprovisedFormat> {
    let tag: String = header
        .iter()
        .take(MAX_TAG_LEN)
        .take_while(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        .map(|&b| b as char)
        .collect();
    if tag.len() < MIN_TAG_LEN {
        return None;
    }
    // the tag must be delimited, not a prefix of longer printable data
    match header.get(tag.len()) {
        Some(next) if next.is_ascii_graphic() && tag.len() < MAX_TAG_LEN => return None,
        _ => {}
    }
    debug!(tag, "improvised format from magic bytes");
    Some(ImprovisedFormat {
        extension: tag.clone(),
        media_type: format!("application/x.sig.{}", sanitize(&tag)),
        interpreter: None,
    })
}

fn sanitize(tag: &str) -> String {
    tag.to_ascii_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magic_tag_from_binary_header() {
        let improvised = derive(b"WASM\0\0\x01\x02", true).unwrap();
        assert_eq!(improvised.extension, "WASM");
        assert_eq!(improvised.media_type, "application/x.sig.wasm");
        assert!(improvised.interpreter.is_none());
    }

    #[test]
    fn shebang_direct_interpreter() {
        let improvised = derive(b"#!/bin/sh\necho hi\n", false).unwrap();
        assert_eq!(improvised.interpreter.as_deref(), Some("sh"));
        assert_eq!(improvised.media_type, "application/x.exec.sh");
    }

    #[test]
    fn shebang_env_resolves_argument() {
        let improvised = derive(b"#!/usr/bin/env python\nprint()\n", false).unwrap();
        assert_eq!(improvised.interpreter.as_deref(), Some("python"));
    }

    #[test]
    fn short_or_missing_tag_yields_nothing() {
        assert!(derive(b"\x7fELF\x02\x01", true).is_none());
        assert!(derive(b"A\0\0\0", true).is_none());
        assert!(derive(b"", true).is_none());
    }

    #[test]
    fn text_without_shebang_yields_nothing() {
        assert!(derive(b"plain text here", false).is_none());
    }
}
