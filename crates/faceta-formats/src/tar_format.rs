//! TAR archive detection
//!
//! TAR has no leading magic; the `ustar` marker sits at offset 257 of the
//! first header block, so this format is registered without a signature and
//! relies on `check_header` over the header window.

use std::io::Read;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::format::{
    ArchiveContents, ArchiveEntry, EntryKind, FileFormat, MatchContext, MatchInput, ParsedFormat,
};
use crate::Result;

pub struct TarFormat;

const USTAR_OFFSET: usize = 257;
const USTAR_MAGIC: &[u8] = b"ustar";

impl FileFormat for TarFormat {
    fn name(&self) -> &'static str {
        "tar"
    }

    fn media_type(&self) -> &'static str {
        "application/x-tar"
    }

    fn extension(&self) -> &'static str {
        "tar"
    }

    fn check_header(&self, header: &[u8], _is_binary: bool, _is_short: bool) -> bool {
        header.len() >= USTAR_OFFSET + USTAR_MAGIC.len()
            && &header[USTAR_OFFSET..USTAR_OFFSET + USTAR_MAGIC.len()] == USTAR_MAGIC
    }

    fn match_stream(
        &self,
        input: MatchInput<'_>,
        ctx: &MatchContext,
    ) -> Result<Option<ParsedFormat>> {
        let mut archive = tar::Archive::new(input.stream);
        let mut entries = Vec::new();

        for entry in archive.entries()? {
            let mut entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(path = %ctx.path, %err, "tar entry unreadable, stopping walk");
                    break;
                }
            };
            let path = match entry.path() {
                Ok(path) => path.to_string_lossy().trim_end_matches('/').to_string(),
                Err(err) => {
                    warn!(path = %ctx.path, %err, "tar entry has unusable path");
                    continue;
                }
            };
            let kind = if entry.header().entry_type().is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            let size = entry.size();
            let modified = entry
                .header()
                .mtime()
                .ok()
                .and_then(|secs| DateTime::<Utc>::from_timestamp(i64::try_from(secs).ok()?, 0));

            let data = if kind == EntryKind::File {
                let mut buf = Vec::with_capacity(usize::try_from(size).unwrap_or(0));
                match entry.read_to_end(&mut buf) {
                    Ok(_) => Some(Bytes::from(buf)),
                    Err(err) => {
                        warn!(path = %ctx.path, entry = %path, %err, "tar entry not extractable");
                        None
                    }
                }
            } else {
                None
            };

            entries.push(ArchiveEntry {
                path,
                kind,
                size,
                modified,
                data,
            });
        }

        if entries.is_empty() {
            // a lone ustar marker with no parseable entries is not a tar
            return Ok(None);
        }
        debug!(path = %ctx.path, entries = entries.len(), "tar archive parsed");
        Ok(Some(ParsedFormat::Archive(ArchiveContents { entries })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FormatStream;

    fn sample_tar() -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        let mut header = tar::Header::new_ustar();
        header.set_size(2);
        header.set_mode(0o644);
        header.set_mtime(1_715_000_000);
        header.set_cksum();
        builder.append_data(&mut header, "hello.txt", &b"hi"[..]).unwrap();
        builder.into_inner().unwrap()
    }

    #[test]
    fn ustar_magic_is_found_at_offset() {
        let data = sample_tar();
        assert!(TarFormat.check_header(&data[..512.min(data.len())], true, false));
        assert!(!TarFormat.check_header(b"short window", true, true));
    }

    #[test]
    fn parses_entries_with_content() {
        let data = sample_tar();
        let input = MatchInput {
            header: &data[..data.len().min(4096)],
            is_short: false,
            stream: FormatStream::from_bytes(Bytes::from(data.clone())),
        };
        let parsed = TarFormat
            .match_stream(input, &MatchContext::default())
            .unwrap()
            .unwrap();
        let ParsedFormat::Archive(contents) = parsed else {
            panic!("expected archive payload");
        };
        assert_eq!(contents.entries.len(), 1);
        assert_eq!(contents.entries[0].path, "hello.txt");
        assert_eq!(contents.entries[0].data.as_deref(), Some(&b"hi"[..]));
        assert!(contents.entries[0].modified.is_some());
    }
}
