//! Character encoding detection over the header window
//!
//! A pluggable step distinct from hashing and format matching; it reads the
//! same head bytes the format matcher sees. The default detector trusts
//! byte-order marks first and falls back to UTF-8 validation.

use encoding_rs::Encoding;

/// Detects the character encoding of text data from its header window.
pub trait EncodingDetector: Send + Sync {
    /// Name of the detected encoding, or `None` when the data does not look
    /// like text in any encoding this detector knows.
    fn detect(&self, header: &[u8], is_short: bool) -> Option<&'static str>;
}

/// BOM sniffing plus UTF-8 validation.
pub struct DefaultEncodingDetector;

impl EncodingDetector for DefaultEncodingDetector {
    fn detect(&self, header: &[u8], is_short: bool) -> Option<&'static str> {
        if header.is_empty() {
            return None;
        }
        if let Some((encoding, _bom_len)) = Encoding::for_bom(header) {
            return Some(encoding.name());
        }
        match std::str::from_utf8(header) {
            Ok(text) => {
                if text.is_ascii() {
                    Some("US-ASCII")
                } else {
                    Some("UTF-8")
                }
            }
            // the window may cut a multi-byte sequence at its very end
            Err(err) if !is_short && err.valid_up_to() + 4 > header.len() => Some("UTF-8"),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_is_reported_as_ascii() {
        assert_eq!(
            DefaultEncodingDetector.detect(b"hello world", true),
            Some("US-ASCII")
        );
    }

    #[test]
    fn utf8_multibyte_is_utf8() {
        assert_eq!(
            DefaultEncodingDetector.detect("čau světe".as_bytes(), true),
            Some("UTF-8")
        );
    }

    #[test]
    fn utf8_bom_wins() {
        assert_eq!(
            DefaultEncodingDetector.detect(b"\xef\xbb\xbfhello", true),
            Some("UTF-8")
        );
    }

    #[test]
    fn utf16_bom_detected() {
        assert_eq!(
            DefaultEncodingDetector.detect(b"\xff\xfeh\0i\0", true),
            Some("UTF-16LE")
        );
    }

    #[test]
    fn sequence_cut_at_window_edge_is_still_utf8() {
        let mut data = b"text ".to_vec();
        data.extend_from_slice("ž".as_bytes());
        // drop the continuation byte, as a full header window would
        data.pop();
        assert_eq!(DefaultEncodingDetector.detect(&data, false), Some("UTF-8"));
    }

    #[test]
    fn binary_garbage_is_not_text() {
        assert_eq!(DefaultEncodingDetector.detect(b"\x00\x01\x02\xfe", true), None);
    }
}
