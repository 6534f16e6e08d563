//! ZIP archive detection

use std::io::Read;

use bytes::Bytes;
use chrono::{TimeZone, Utc};
use tracing::{debug, warn};

use crate::format::{
    ArchiveContents, ArchiveEntry, EntryKind, FileFormat, MatchContext, MatchInput, ParsedFormat,
};
use crate::FormatStream;
use crate::Result;

pub struct ZipFormat;

const SIGNATURES: &[&[u8]] = &[
    b"PK\x03\x04",
    // empty archive
    b"PK\x05\x06",
    // spanned archive marker
    b"PK\x07\x08",
];

impl FileFormat for ZipFormat {
    fn name(&self) -> &'static str {
        "zip"
    }

    fn signatures(&self) -> &[&'static [u8]] {
        SIGNATURES
    }

    fn media_type(&self) -> &'static str {
        "application/zip"
    }

    fn extension(&self) -> &'static str {
        "zip"
    }

    fn check_header(&self, header: &[u8], _is_binary: bool, _is_short: bool) -> bool {
        SIGNATURES.iter().any(|sig| header.starts_with(sig))
    }

    fn match_stream(
        &self,
        input: MatchInput<'_>,
        ctx: &MatchContext,
    ) -> Result<Option<ParsedFormat>> {
        let mut archive = match zip::ZipArchive::new(input.stream) {
            Ok(archive) => archive,
            Err(zip::result::ZipError::InvalidArchive(_)) => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let mut entries = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let mut file = match archive.by_index(index) {
                Ok(file) => file,
                Err(err) => {
                    // password-protected or unreadable entry metadata
                    warn!(path = %ctx.path, index, %err, "zip entry skipped");
                    continue;
                }
            };
            let path = file.name().trim_end_matches('/').to_string();
            let kind = if file.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            let modified = file.last_modified().and_then(zip_datetime_to_utc);

            let data = if kind == EntryKind::File {
                let mut buf = Vec::with_capacity(usize::try_from(file.size()).unwrap_or(0));
                match file.read_to_end(&mut buf) {
                    Ok(_) => Some(Bytes::from(buf)),
                    Err(err) => {
                        // encrypted or damaged entry: keep the structural
                        // description, drop the content
                        warn!(path = %ctx.path, entry = %path, %err, "zip entry not extractable");
                        None
                    }
                }
            } else {
                None
            };

            entries.push(ArchiveEntry {
                path,
                kind,
                size: file.size(),
                modified,
                data,
            });
        }

        debug!(path = %ctx.path, entries = entries.len(), "zip archive parsed");
        Ok(Some(ParsedFormat::Archive(ArchiveContents { entries })))
    }
}

fn zip_datetime_to_utc(dt: zip::DateTime) -> Option<chrono::DateTime<Utc>> {
    Utc.with_ymd_and_hms(
        i32::from(dt.year()),
        u32::from(dt.month()),
        u32::from(dt.day()),
        u32::from(dt.hour()),
        u32::from(dt.minute()),
        u32::from(dt.second()),
    )
    .single()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;

    fn sample_zip() -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("hello.txt", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"hi").unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn header_check_accepts_zip_magic() {
        assert!(ZipFormat.check_header(b"PK\x03\x04....", true, false));
        assert!(!ZipFormat.check_header(b"PNG.....", true, false));
    }

    #[test]
    fn parses_entries_with_content() {
        let data = sample_zip();
        let input = MatchInput {
            header: &data[..data.len().min(64)],
            is_short: false,
            stream: FormatStream::from_bytes(Bytes::from(data.clone())),
        };
        let parsed = ZipFormat
            .match_stream(input, &MatchContext::default())
            .unwrap()
            .unwrap();
        let ParsedFormat::Archive(contents) = parsed else {
            panic!("expected archive payload");
        };
        assert_eq!(contents.entries.len(), 1);
        let entry = &contents.entries[0];
        assert_eq!(entry.path, "hello.txt");
        assert_eq!(entry.kind, EntryKind::File);
        assert_eq!(entry.size, 2);
        assert_eq!(entry.data.as_deref(), Some(&b"hi"[..]));
    }

    #[test]
    fn truncated_zip_is_not_claimed() {
        let input = MatchInput {
            header: b"PK\x03\x04",
            is_short: true,
            stream: FormatStream::from_bytes(Bytes::from_static(b"PK\x03\x04")),
        };
        let result = ZipFormat.match_stream(input, &MatchContext::default());
        // either "not this format" or a corrupt-archive error; never a panic
        match result {
            Ok(None) | Err(_) => {}
            Ok(Some(_)) => panic!("truncated zip must not parse"),
        }
    }
}
