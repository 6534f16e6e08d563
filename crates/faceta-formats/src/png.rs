//! PNG image detection
//!
//! Only the IHDR header is parsed; pixel data is out of scope. Width,
//! height and bit depth are enough for the image metadata the graph
//! carries.

use std::io::Read;

use byteorder::{BigEndian, ReadBytesExt};

use crate::format::{FileFormat, ImageMeta, MatchContext, MatchInput, ParsedFormat};
use crate::Result;

pub struct PngFormat;

const SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
const SIGNATURES: &[&[u8]] = &[SIGNATURE];

impl FileFormat for PngFormat {
    fn name(&self) -> &'static str {
        "png"
    }

    fn signatures(&self) -> &[&'static [u8]] {
        SIGNATURES
    }

    fn media_type(&self) -> &'static str {
        "image/png"
    }

    fn extension(&self) -> &'static str {
        "png"
    }

    fn check_header(&self, header: &[u8], _is_binary: bool, is_short: bool) -> bool {
        if is_short && header.len() < SIGNATURE.len() {
            return false;
        }
        header.starts_with(SIGNATURE)
    }

    fn match_stream(
        &self,
        input: MatchInput<'_>,
        _ctx: &MatchContext,
    ) -> Result<Option<ParsedFormat>> {
        let mut stream = input.stream;

        let mut signature = [0u8; 8];
        if stream.read_exact(&mut signature).is_err() || signature != SIGNATURE {
            return Ok(None);
        }

        // IHDR must be the first chunk
        let _length = match stream.read_u32::<BigEndian>() {
            Ok(length) => length,
            Err(_) => return Ok(None),
        };
        let mut chunk_type = [0u8; 4];
        if stream.read_exact(&mut chunk_type).is_err() || &chunk_type != b"IHDR" {
            return Ok(None);
        }

        let width = stream.read_u32::<BigEndian>()?;
        let height = stream.read_u32::<BigEndian>()?;
        let bit_depth = stream.read_u8()?;

        Ok(Some(ParsedFormat::Image(ImageMeta {
            width,
            height,
            bit_depth,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FormatStream;
    use bytes::Bytes;

    /// Minimal PNG prefix: signature + IHDR for a 3x2, 8-bit image.
    pub(crate) fn sample_png_header(width: u32, height: u32) -> Vec<u8> {
        let mut data = SIGNATURE.to_vec();
        data.extend_from_slice(&13u32.to_be_bytes()); // IHDR length
        data.extend_from_slice(b"IHDR");
        data.extend_from_slice(&width.to_be_bytes());
        data.extend_from_slice(&height.to_be_bytes());
        data.push(8); // bit depth
        data.push(2); // color type: truecolor
        data.extend_from_slice(&[0, 0, 0]); // compression, filter, interlace
        data.extend_from_slice(&[0, 0, 0, 0]); // crc (unchecked here)
        data
    }

    #[test]
    fn parses_dimensions_from_ihdr() {
        let data = sample_png_header(3, 2);
        let input = MatchInput {
            header: &data,
            is_short: false,
            stream: FormatStream::from_bytes(Bytes::from(data.clone())),
        };
        let parsed = PngFormat
            .match_stream(input, &MatchContext::default())
            .unwrap()
            .unwrap();
        let ParsedFormat::Image(meta) = parsed else {
            panic!("expected image payload");
        };
        assert_eq!((meta.width, meta.height, meta.bit_depth), (3, 2, 8));
    }

    #[test]
    fn non_ihdr_first_chunk_is_rejected() {
        let mut data = SIGNATURE.to_vec();
        data.extend_from_slice(&0u32.to_be_bytes());
        data.extend_from_slice(b"IEND");
        let input = MatchInput {
            header: &data,
            is_short: false,
            stream: FormatStream::from_bytes(Bytes::from(data.clone())),
        };
        assert!(PngFormat
            .match_stream(input, &MatchContext::default())
            .unwrap()
            .is_none());
    }
}
