//! Format object analysis
//!
//! Describes each successful format match as its own node under the data
//! object, hands archive payloads to the descent engine, and re-enters the
//! pipeline for derived payloads (decompressed streams).

use std::sync::Arc;

use async_trait::async_trait;
use faceta_formats::{FileFormat, ParsedFormat};
use faceta_rdf::vocab::{Class, Prop};
use faceta_rdf::{media_type_uri, LiteralValue};
use tracing::debug;

use crate::analyzer::{AnalysisResult, AnalyzerHub, EntityAnalyzer};
use crate::container::descend_archive;
use crate::context::{AnalysisContext, TraversalDirective};
use crate::entity::{BytesStreamFactory, DataObject, Entity};
use crate::Result;

pub struct FormatAnalyzer;

#[async_trait]
impl EntityAnalyzer for FormatAnalyzer {
    fn name(&self) -> &'static str {
        "format"
    }

    fn accepts(&self, entity: &Entity) -> bool {
        matches!(entity, Entity::Format(_))
    }

    async fn analyze(
        &self,
        entity: &Entity,
        ctx: &AnalysisContext,
        hub: &AnalyzerHub,
    ) -> Result<AnalysisResult> {
        let Entity::Format(format_object) = entity else {
            return Ok(AnalysisResult::none());
        };
        let matched = &format_object.matched;
        let source = &format_object.source;

        // at most one match per format per data object, so the format name
        // is a unique fragment under the content node
        let node = hub
            .factory()
            .child_node(source, matched.format.name());

        let class = match &matched.parsed {
            ParsedFormat::Archive(_) | ParsedFormat::Compressed(_) => Class::Archive,
            ParsedFormat::Image(_) => Class::RasterImage,
            ParsedFormat::Xml(info) => {
                if info.sub_format.as_ref().is_some_and(|sub| sub.is_image) {
                    Class::VectorImage
                } else {
                    Class::XmlDocument
                }
            }
        };
        node.classify(class)?;
        node.set(Prop::MimeType, LiteralValue::String(matched.media_type.clone()))?;
        node.set_iri(Prop::Format, media_type_uri(&matched.media_type))?;

        // the media-type descriptor node is shared by every object of this
        // format; describe it on first sight only
        let descriptor = hub.factory().node(media_type_uri(&matched.media_type));
        if descriptor.is_new() {
            descriptor.classify(Class::MediaFormat)?;
            descriptor.set(
                Prop::PrefLabel,
                LiteralValue::String(matched.format.name().to_string()),
            )?;
            descriptor.set(Prop::Extension, LiteralValue::String(matched.extension.clone()))?;
        }

        let mut directive = TraversalDirective::None;
        match &matched.parsed {
            ParsedFormat::Image(meta) => {
                node.set(Prop::Width, LiteralValue::UInt(meta.width))?;
                node.set(Prop::Height, LiteralValue::UInt(meta.height))?;
                node.set(Prop::BitDepth, LiteralValue::UInt(u32::from(meta.bit_depth)))?;
            }
            ParsedFormat::Xml(info) => {
                if let Some(version) = &info.version {
                    node.set(Prop::XmlVersion, LiteralValue::String(version.clone()))?;
                }
                if let Some(encoding) = &info.encoding {
                    node.set(Prop::XmlEncoding, LiteralValue::String(encoding.clone()))?;
                }
                if let Some(namespace) = &info.root_namespace {
                    node.set(Prop::XmlNamespace, LiteralValue::Uri(namespace.clone()))?;
                }
                if let Some(public) = &info.doctype_public {
                    node.set(Prop::Notation, LiteralValue::String(public.clone()))?;
                }
                // harvested namespaces become prefixes of the output graph
                for (_, namespace) in &info.namespaces {
                    hub.factory().ensure_namespace(namespace)?;
                }
            }
            ParsedFormat::Archive(contents) => {
                directive = descend_archive(contents, source, ctx, hub).await?;
            }
            ParsedFormat::Compressed(payload) => {
                let label = payload.original_name.clone().unwrap_or_else(|| {
                    format!("{}!{}", ctx.match_context.path, payload.method)
                });
                debug!(label = %label, "analyzing decompressed payload");
                let derived = Entity::Data(Arc::new(DataObject::new(
                    label.clone(),
                    Arc::new(BytesStreamFactory::new(payload.data.clone())),
                )));
                let child_ctx = ctx
                    .with_parent_link(node.clone(), Prop::HasPart)
                    .with_path(&label);
                let result = hub.analyze(derived, child_ctx).await;
                if let Some(derived_node) = &result.node {
                    derived_node.set_iri(Prop::WasDerivedFrom, source.uri().clone())?;
                }
                directive = TraversalDirective::FollowChildren;
            }
        }

        Ok(AnalysisResult {
            node: Some(node),
            label: Some(matched.format.name().to_string()),
            directive,
        })
    }
}
