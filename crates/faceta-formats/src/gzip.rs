//! GZIP detection and transparent decompression
//!
//! A gzip match surfaces its decompressed payload so the pipeline can
//! describe the derived data object (and descend further, e.g. `.tar.gz`).

use std::io::Read;

use bytes::Bytes;
use flate2::read::GzDecoder;
use tracing::debug;

use crate::format::{CompressedPayload, FileFormat, MatchContext, MatchInput, ParsedFormat};
use crate::{Error, Result, MAX_EXPANDED_BYTES};

pub struct GzipFormat;

const SIGNATURES: &[&[u8]] = &[b"\x1f\x8b"];

impl FileFormat for GzipFormat {
    fn name(&self) -> &'static str {
        "gzip"
    }

    fn signatures(&self) -> &[&'static [u8]] {
        SIGNATURES
    }

    fn media_type(&self) -> &'static str {
        "application/gzip"
    }

    fn extension(&self) -> &'static str {
        "gz"
    }

    fn check_header(&self, header: &[u8], _is_binary: bool, _is_short: bool) -> bool {
        header.starts_with(b"\x1f\x8b")
    }

    fn match_stream(
        &self,
        input: MatchInput<'_>,
        ctx: &MatchContext,
    ) -> Result<Option<ParsedFormat>> {
        let mut decoder = GzDecoder::new(input.stream);
        let mut data = Vec::new();
        let read = decoder
            .by_ref()
            .take(MAX_EXPANDED_BYTES + 1)
            .read_to_end(&mut data);
        match read {
            Ok(_) if data.len() as u64 > MAX_EXPANDED_BYTES => {
                return Err(Error::ExpandedTooLarge {
                    limit: MAX_EXPANDED_BYTES,
                });
            }
            Ok(_) => {}
            // signature matched but the stream is not a valid deflate body
            Err(_) => return Ok(None),
        }

        let original_name = decoder.header().and_then(|header| {
            header
                .filename()
                .map(|name| String::from_utf8_lossy(name).into_owned())
        });

        debug!(path = %ctx.path, expanded = data.len(), "gzip payload decompressed");
        Ok(Some(ParsedFormat::Compressed(CompressedPayload {
            method: "gzip",
            original_name,
            data: Bytes::from(data),
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FormatStream;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn sample_gzip(payload: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(payload).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn decompresses_payload() {
        let data = sample_gzip(b"inner text");
        let input = MatchInput {
            header: &data[..data.len().min(64)],
            is_short: false,
            stream: FormatStream::from_bytes(Bytes::from(data.clone())),
        };
        let parsed = GzipFormat
            .match_stream(input, &MatchContext::default())
            .unwrap()
            .unwrap();
        let ParsedFormat::Compressed(payload) = parsed else {
            panic!("expected compressed payload");
        };
        assert_eq!(payload.method, "gzip");
        assert_eq!(payload.data.as_ref(), b"inner text");
    }

    #[test]
    fn garbage_after_magic_is_not_claimed() {
        let data = b"\x1f\x8bnot really gzip".to_vec();
        let input = MatchInput {
            header: &data,
            is_short: false,
            stream: FormatStream::from_bytes(Bytes::from(data.clone())),
        };
        assert!(GzipFormat
            .match_stream(input, &MatchContext::default())
            .unwrap()
            .is_none());
    }
}
