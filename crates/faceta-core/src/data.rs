//! Data object analysis
//!
//! For every opaque byte blob: open the hashing multiplexer, classify
//! binary vs text from the header window, run the format candidates in
//! specificity order (each over a fresh stream), finalize the digests, and
//! only then emit the object's triples in their fixed order — identity
//! class, size, inline content, hashes, encoding, format links — before
//! recursing into each successful format match.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use faceta_formats::encoding::{DefaultEncodingDetector, EncodingDetector};
use faceta_formats::{
    improvised, FileFormat, FormatMatch, FormatRegistry, MatchInput, MAX_HEADER_BYTES,
};
use faceta_hash::HashAlgorithm;
use faceta_rdf::vocab::{Class, Prop};
use faceta_rdf::{media_type_uri, LinkedNode, Literal, LiteralValue, Term, Triple};
use tracing::{debug, warn};

use crate::analyzer::{AnalysisResult, AnalyzerHub, EntityAnalyzer};
use crate::context::AnalysisContext;
use crate::entity::{DataObject, Entity, FormatObject, StreamFactory};
use crate::query::NodeQueryTester;
use crate::stream::HashStream;
use crate::{Error, Result};

/// Mirrors every assertion into a local buffer so the node query tester can
/// evaluate the entity in isolation.
struct EntityEmitter<'a> {
    node: &'a LinkedNode,
    log: Vec<Triple>,
}

impl<'a> EntityEmitter<'a> {
    fn new(node: &'a LinkedNode) -> Self {
        Self {
            node,
            log: Vec::new(),
        }
    }

    fn classify(&mut self, class: Class) -> Result<()> {
        self.node.classify(class)?;
        self.log.push(Triple::new(
            self.node.uri().clone(),
            Prop::Type.iri(),
            Term::Iri(class.iri()),
        ));
        Ok(())
    }

    fn set(&mut self, prop: Prop, value: LiteralValue) -> Result<()> {
        self.node.set(prop, value.clone())?;
        self.log.push(Triple::new(
            self.node.uri().clone(),
            prop.iri(),
            Term::Literal(value.to_literal()),
        ));
        Ok(())
    }

    fn set_literal(&mut self, prop: Prop, literal: Literal) -> Result<()> {
        self.node.set_literal(prop, literal.clone())?;
        self.log.push(Triple::new(
            self.node.uri().clone(),
            prop.iri(),
            Term::Literal(literal),
        ));
        Ok(())
    }

    fn set_iri(&mut self, prop: Prop, iri: faceta_rdf::Iri) -> Result<()> {
        self.node.set_iri(prop, iri.clone())?;
        self.log.push(Triple::new(
            self.node.uri().clone(),
            prop.iri(),
            Term::Iri(iri),
        ));
        Ok(())
    }

    fn link(&mut self, prop: Prop, other: &LinkedNode) -> Result<()> {
        self.node.link(prop, other)?;
        self.log.push(Triple::new(
            self.node.uri().clone(),
            prop.iri(),
            Term::Iri(other.uri().clone()),
        ));
        Ok(())
    }
}

pub struct DataAnalyzer {
    formats: Arc<FormatRegistry>,
    algorithms: Vec<Arc<dyn HashAlgorithm>>,
    encoding: Arc<dyn EncodingDetector>,
    inline_limit: u64,
    max_depth: u32,
    tester: Option<Arc<NodeQueryTester>>,
    extract_dir: Option<PathBuf>,
}

impl DataAnalyzer {
    pub fn new(
        formats: Arc<FormatRegistry>,
        algorithms: Vec<Arc<dyn HashAlgorithm>>,
        inline_limit: u64,
        max_depth: u32,
        tester: Option<Arc<NodeQueryTester>>,
        extract_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            formats,
            algorithms,
            encoding: Arc::new(DefaultEncodingDetector),
            inline_limit,
            max_depth,
            tester,
            extract_dir,
        }
    }

    fn primary_algorithm(&self) -> &Arc<dyn HashAlgorithm> {
        // the set is validated non-empty at configuration time
        &self.algorithms[0]
    }
}

/// Binary classification: a NUL byte followed by any nonzero byte. Trailing
/// NUL padding alone does not make data binary.
fn detect_binary(header: &[u8]) -> bool {
    let Some(first_nul) = header.iter().position(|&b| b == 0) else {
        return false;
    };
    header[first_nul..].iter().any(|&b| b != 0)
}

#[async_trait]
impl EntityAnalyzer for DataAnalyzer {
    fn name(&self) -> &'static str {
        "data"
    }

    fn accepts(&self, entity: &Entity) -> bool {
        matches!(entity, Entity::Data(_))
    }

    async fn analyze(
        &self,
        entity: &Entity,
        ctx: &AnalysisContext,
        hub: &AnalyzerHub,
    ) -> Result<AnalysisResult> {
        let Entity::Data(data) = entity else {
            return Ok(AnalysisResult::none());
        };
        debug!(label = %data.label, "analyzing data object");

        // single pass: header window + all digests
        let mut hashed = HashStream::open(data.stream_factory.open()?, &self.algorithms);
        let header = hashed.read_head(MAX_HEADER_BYTES)?.to_vec();
        let is_short = hashed.is_short();
        let is_binary = detect_binary(&header);
        let charset = if is_binary {
            None
        } else {
            self.encoding.detect(&header, is_short)
        };

        // format matching over fresh streams, in specificity order,
        // serialized: the candidates share one data object
        let mut matches: Vec<FormatMatch> = Vec::new();
        let mut match_errors: Vec<(&'static str, Error)> = Vec::new();
        for candidate in self.formats.candidates(&header, is_binary, is_short) {
            if ctx.is_cancelled() {
                break;
            }
            let stream = data.stream_factory.open()?;
            let input = MatchInput {
                header: &header,
                is_short,
                stream,
            };
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                candidate.match_stream(input, &ctx.match_context)
            }));
            match outcome {
                Ok(Ok(Some(parsed))) => {
                    debug!(format = candidate.name(), "format matched");
                    matches.push(FormatMatch::new(Arc::clone(&candidate), parsed));
                }
                Ok(Ok(None)) => {}
                Ok(Err(err)) => match_errors.push((candidate.name(), err.into())),
                Err(_) => match_errors.push((
                    candidate.name(),
                    Error::MatcherPanic {
                        format: candidate.name(),
                        path: ctx.match_context.path.clone(),
                    },
                )),
            }
        }

        // digests must be complete before any triple mentions the node
        let (digests, length) = hashed.finalize()?;

        let primary = self.primary_algorithm();
        let node = hub
            .factory()
            .node_for_digest(primary.as_ref(), &digests[&primary.id()])?;

        // the same content already described, or sitting on the current
        // descent stack (self-referencing container): link, do not re-enter
        if ctx.already_visited(node.uri().as_str()) {
            debug!(uri = %node.uri(), "content already on descent stack");
            return Ok(AnalysisResult::node(node));
        }
        if !node.is_new() {
            debug!(uri = %node.uri(), "content already described, merging");
            return Ok(AnalysisResult::node(node));
        }

        let mut emitter = EntityEmitter::new(&node);
        emitter.classify(Class::DataObject)?;
        if !is_binary && matches.is_empty() {
            emitter.classify(Class::PlainTextDocument)?;
        }

        emitter.set(Prop::ByteSize, LiteralValue::ULong(length))?;
        // inline only content the header buffer holds in full; the limit is
        // caller-controlled and may exceed the header window
        if !is_binary && is_short && length <= self.inline_limit {
            let text = String::from_utf8_lossy(&header[..length as usize]);
            emitter.set(Prop::PlainTextContent, LiteralValue::String(text.into_owned()))?;
        }

        // hash nodes are themselves content-addressed; the primary one is
        // this node, the others hang off nfo:hasHash
        for algorithm in &self.algorithms {
            let digest = &digests[&algorithm.id()];
            let hash_node = hub.factory().node_for_digest(algorithm.as_ref(), digest)?;
            let is_primary = hash_node.uri() == node.uri();
            if is_primary {
                emitter.set(
                    Prop::HashAlgorithm,
                    LiteralValue::String(algorithm.id().name().to_string()),
                )?;
                emitter.set_literal(Prop::HashValue, Literal::base64(digest))?;
            } else {
                hash_node.classify(Class::FileHash)?;
                hash_node.set(
                    Prop::HashAlgorithm,
                    LiteralValue::String(algorithm.id().name().to_string()),
                )?;
                hash_node.set_literal(Prop::HashValue, Literal::base64(digest))?;
                emitter.link(Prop::HasHash, &hash_node)?;
            }
        }

        if let Some(charset) = charset {
            emitter.set(Prop::CharacterSet, LiteralValue::String(charset.to_string()))?;
        }
        let effective_media_type = matches
            .first()
            .map(|matched| matched.media_type.clone())
            .or_else(|| (!is_binary).then(|| "text/plain".to_string()));
        if let Some(media_type) = &effective_media_type {
            emitter.set(Prop::MimeType, LiteralValue::String(media_type.clone()))?;
            emitter.set_iri(Prop::Format, media_type_uri(media_type))?;
        }

        // format links precede the per-format children they point at; the
        // child URI is deterministic (format name under the content node)
        let had_matches = !matches.is_empty();
        for matched in &matches {
            let format_node = node.child(matched.format.name());
            emitter.link(Prop::HasFormat, &format_node)?;
        }
        if ctx.depth >= self.max_depth {
            if had_matches {
                warn!(path = %ctx.match_context.path, depth = ctx.depth, "max depth reached, not descending");
            }
        } else {
            let child_ctx = ctx
                .with_parent(node.clone())
                .with_visited(node.uri().as_str());
            for matched in matches {
                if ctx.is_cancelled() {
                    break;
                }
                let format_entity = Entity::Format(Arc::new(FormatObject {
                    matched,
                    source: node.clone(),
                }));
                hub.analyze(format_entity, child_ctx.clone()).await;
            }
        }

        // nothing claimed the data: improvise a descriptor from its own
        // magic bytes or shebang
        if !had_matches && length > 0 {
            if let Some(improvised) = improvised::derive(&header, is_binary) {
                let format_node = node.child("format");
                format_node.classify(Class::ImprovisedFormat)?;
                format_node.set(
                    Prop::Extension,
                    LiteralValue::String(improvised.extension.clone()),
                )?;
                format_node.set(
                    Prop::MimeType,
                    LiteralValue::String(improvised.media_type.clone()),
                )?;
                format_node.set_iri(Prop::Format, media_type_uri(&improvised.media_type))?;
                if let Some(interpreter) = &improvised.interpreter {
                    format_node.set(Prop::Interpreter, LiteralValue::String(interpreter.clone()))?;
                }
                emitter.link(Prop::HasFormat, &format_node)?;
            }
        }

        // contained matcher failures surface on the finished node
        for (stage, err) in match_errors {
            hub.record_error(entity, stage, &err, Some(&node), ctx);
        }

        self.materialize(data, &node, &emitter.log, &effective_media_type)?;

        Ok(AnalysisResult::node(node))
    }
}

impl DataAnalyzer {
    /// Write the entity's bytes to the extraction directory when the node
    /// query claims it.
    fn materialize(
        &self,
        data: &DataObject,
        node: &LinkedNode,
        triples: &[Triple],
        media_type: &Option<String>,
    ) -> Result<()> {
        let (Some(tester), Some(dir)) = (&self.tester, &self.extract_dir) else {
            return Ok(());
        };
        if !tester.matches(node.uri(), triples) {
            return Ok(());
        }
        std::fs::create_dir_all(dir)?;
        let extension = match media_type.as_deref() {
            Some("text/plain") => "txt",
            Some(mt) => mt.rsplit('/').next().unwrap_or("bin"),
            None => "bin",
        };
        let name = node
            .uri()
            .as_str()
            .rsplit(['/', ':', ';'])
            .next()
            .unwrap_or("artifact")
            .to_string();
        let target = dir.join(format!("{name}.{extension}"));
        let mut source = data.stream_factory.open()?;
        let mut out = std::fs::File::create(&target)?;
        std::io::copy(&mut source, &mut out)?;
        debug!(target = %target.display(), "entity materialized");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nul_followed_by_nonzero_is_binary() {
        assert!(detect_binary(b"WASM\0\x01asm"));
        assert!(detect_binary(b"\0x"));
    }

    #[test]
    fn text_and_padding_are_not_binary() {
        assert!(!detect_binary(b"hello world\n"));
        assert!(!detect_binary(b"padded\0\0\0"));
        assert!(!detect_binary(b""));
    }
}
