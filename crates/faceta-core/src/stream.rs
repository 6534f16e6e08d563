//! Hashing stream multiplexer
//!
//! Wraps a byte source and fans every byte to one digest sink per
//! configured algorithm while exposing a replayable header window. Bytes
//! are fed to the sinks exactly once, at the moment they are first read
//! from the source; the header window serves repeated reads from its
//! buffer, and [`HashStream::finalize`] drains whatever the consumer never
//! asked for.

use std::collections::BTreeMap;
use std::io::{self, Read};
use std::sync::Arc;

use faceta_formats::{FormatStream, MAX_HEADER_BYTES};
use faceta_hash::{DigestSink, HashAlgorithm, HashAlgorithmId};
use tracing::trace;

const CHUNK: usize = 64 * 1024;

pub struct HashStream {
    source: FormatStream,
    sinks: Vec<(HashAlgorithmId, Box<dyn DigestSink>)>,
    head: Vec<u8>,
    source_exhausted: bool,
    /// Bytes read from the source so far; every one of them has been fed to
    /// every sink.
    fed: u64,
    consumer_pos: u64,
}

impl HashStream {
    /// Attach one digest sink per algorithm to a source.
    pub fn open(source: FormatStream, algorithms: &[Arc<dyn HashAlgorithm>]) -> Self {
        let sinks = algorithms
            .iter()
            .map(|algo| (algo.id(), algo.hasher()))
            .collect();
        Self {
            source,
            sinks,
            head: Vec::new(),
            source_exhausted: false,
            fed: 0,
            consumer_pos: 0,
        }
    }

    fn feed(sinks: &mut [(HashAlgorithmId, Box<dyn DigestSink>)], data: &[u8]) {
        for (_, sink) in sinks.iter_mut() {
            sink.update(data);
        }
    }

    /// Non-destructive read of the first `n` bytes, capped at
    /// [`MAX_HEADER_BYTES`]. Idempotent; repeated calls serve the same
    /// buffer. May return fewer bytes when the source is shorter.
    pub fn read_head(&mut self, n: usize) -> io::Result<&[u8]> {
        let wanted = n.min(MAX_HEADER_BYTES);
        while self.head.len() < wanted && !self.source_exhausted {
            let old = self.head.len();
            self.head.resize(wanted, 0);
            let read = self.source.read(&mut self.head[old..])?;
            self.head.truncate(old + read);
            if read == 0 {
                self.source_exhausted = true;
                break;
            }
            Self::feed(&mut self.sinks, &self.head[old..]);
            self.fed += read as u64;
        }
        Ok(&self.head[..wanted.min(self.head.len())])
    }

    /// True when the source ended inside the header window, i.e. the head
    /// buffer holds the complete data.
    pub fn is_short(&self) -> bool {
        self.source_exhausted && self.head.len() < MAX_HEADER_BYTES
    }

    /// Drain the rest of the source through the sinks and return every
    /// digest plus the total length.
    pub fn finalize(mut self) -> io::Result<(BTreeMap<HashAlgorithmId, Vec<u8>>, u64)> {
        let mut chunk = vec![0u8; CHUNK];
        loop {
            let read = self.source.read(&mut chunk)?;
            if read == 0 {
                break;
            }
            Self::feed(&mut self.sinks, &chunk[..read]);
            self.fed += read as u64;
        }
        let length = self.fed;
        let digests = self
            .sinks
            .into_iter()
            .map(|(id, sink)| (id, sink.finish()))
            .collect();
        trace!(length, "hash stream finalized");
        Ok((digests, length))
    }
}

impl Read for HashStream {
    /// Consuming read: serves the header buffer first, then reads on
    /// through the source, advancing the digests.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        // replay region: inside the buffered head
        if (self.consumer_pos as usize) < self.head.len() {
            let start = self.consumer_pos as usize;
            let available = &self.head[start..];
            let n = available.len().min(buf.len());
            buf[..n].copy_from_slice(&available[..n]);
            self.consumer_pos += n as u64;
            return Ok(n);
        }
        if self.source_exhausted {
            return Ok(0);
        }
        let read = self.source.read(buf)?;
        if read == 0 {
            self.source_exhausted = true;
            return Ok(0);
        }
        Self::feed(&mut self.sinks, &buf[..read]);
        self.fed += read as u64;
        self.consumer_pos += read as u64;
        Ok(read)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use faceta_hash::registry;

    fn algos() -> Vec<Arc<dyn HashAlgorithm>> {
        registry::default_set()
    }

    fn memory(data: &[u8]) -> FormatStream {
        FormatStream::from_bytes(Bytes::copy_from_slice(data))
    }

    #[test]
    fn digests_match_one_shot_hashing_when_only_head_is_read() {
        let data = b"hi\n";
        let mut stream = HashStream::open(memory(data), &algos());
        let head = stream.read_head(4096).unwrap();
        assert_eq!(head, data);
        assert!(stream.is_short());

        let (digests, length) = stream.finalize().unwrap();
        assert_eq!(length, 3);
        assert_eq!(
            hex::encode(&digests[&HashAlgorithmId::Md5]),
            "764efa883dda1e11db47671c4a3bbd9e"
        );
    }

    #[test]
    fn read_head_is_idempotent() {
        let mut stream = HashStream::open(memory(b"abcdef"), &algos());
        let first = stream.read_head(4).unwrap().to_vec();
        let second = stream.read_head(4).unwrap().to_vec();
        assert_eq!(first, second);
        // the bytes were fed to the sinks once, not twice
        let (digests, _) = stream.finalize().unwrap();
        let md5 = registry::algorithm(HashAlgorithmId::Md5);
        assert_eq!(digests[&HashAlgorithmId::Md5], md5.compute(b"abcdef"));
    }

    #[test]
    fn sequential_read_replays_head_then_continues() {
        let data: Vec<u8> = (0u8..=255).cycle().take(10_000).collect();
        let mut stream = HashStream::open(memory(&data), &algos());
        stream.read_head(4096).unwrap();

        let mut consumed = Vec::new();
        stream.read_to_end(&mut consumed).unwrap();
        assert_eq!(consumed, data);

        let (digests, length) = stream.finalize().unwrap();
        assert_eq!(length, data.len() as u64);
        let sha256 = registry::algorithm(HashAlgorithmId::Sha256);
        assert_eq!(digests[&HashAlgorithmId::Sha256], sha256.compute(&data));
    }

    #[test]
    fn unread_tail_is_drained_at_finalize() {
        let data: Vec<u8> = vec![7u8; 100_000];
        let mut stream = HashStream::open(memory(&data), &algos());
        stream.read_head(16).unwrap();
        // consumer never reads past the head window
        let (digests, length) = stream.finalize().unwrap();
        assert_eq!(length, 100_000);
        let sha1 = registry::algorithm(HashAlgorithmId::Sha1);
        assert_eq!(digests[&HashAlgorithmId::Sha1], sha1.compute(&data));
    }

    #[test]
    fn empty_source_still_produces_digests() {
        let mut stream = HashStream::open(memory(b""), &algos());
        assert!(stream.read_head(4096).unwrap().is_empty());
        assert!(stream.is_short());
        let (digests, length) = stream.finalize().unwrap();
        assert_eq!(length, 0);
        assert_eq!(
            hex::encode(&digests[&HashAlgorithmId::Md5]),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
    }

    #[test]
    fn head_window_is_capped() {
        let data = vec![1u8; MAX_HEADER_BYTES * 2];
        let mut stream = HashStream::open(memory(&data), &algos());
        let head = stream.read_head(usize::MAX).unwrap();
        assert_eq!(head.len(), MAX_HEADER_BYTES);
        assert!(!stream.is_short());
    }
}
