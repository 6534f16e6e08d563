//! XML document detection
//!
//! XML is dispatched by content, not by leading signature: the declaration
//! is optional and a byte-order mark or whitespace may precede the first
//! tag. Once the root element is known, sub-formats are selected by root
//! namespace URI or DOCTYPE PUBLIC identifier; documents in an unregistered
//! namespace get a synthetic media type derived from that namespace.

use std::io::BufReader;

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

use crate::format::{
    FileFormat, FormatKind, MatchContext, MatchInput, ParsedFormat, XmlInfo, XmlSubFormat,
};
use crate::Result;

struct DispatchRule {
    namespace: Option<&'static str>,
    public_id_prefix: Option<&'static str>,
    name: &'static str,
    media_type: &'static str,
    extension: &'static str,
    is_image: bool,
}

pub struct XmlFormat {
    rules: Vec<DispatchRule>,
}

impl XmlFormat {
    pub fn new() -> Self {
        Self {
            rules: vec![
                DispatchRule {
                    namespace: Some("http://www.w3.org/2000/svg"),
                    public_id_prefix: Some("-//W3C//DTD SVG"),
                    name: "svg",
                    media_type: "image/svg+xml",
                    extension: "svg",
                    is_image: true,
                },
                DispatchRule {
                    namespace: Some("http://www.w3.org/1999/xhtml"),
                    public_id_prefix: Some("-//W3C//DTD XHTML"),
                    name: "xhtml",
                    media_type: "application/xhtml+xml",
                    extension: "xhtml",
                    is_image: false,
                },
            ],
        }
    }

    fn dispatch(&self, info: &XmlInfo) -> Option<XmlSubFormat> {
        for rule in &self.rules {
            let ns_hit = match (rule.namespace, info.root_namespace.as_deref()) {
                (Some(expected), Some(actual)) => expected == actual,
                _ => false,
            };
            let public_hit = match (rule.public_id_prefix, info.doctype_public.as_deref()) {
                (Some(prefix), Some(public)) => public.starts_with(prefix),
                _ => false,
            };
            if ns_hit || public_hit {
                return Some(XmlSubFormat {
                    name: rule.name.to_string(),
                    media_type: rule.media_type.to_string(),
                    extension: rule.extension.to_string(),
                    is_image: rule.is_image,
                });
            }
        }
        // unregistered namespace: synthesize a media type so documents of
        // the same vocabulary still group together downstream
        info.root_namespace.as_deref().map(|ns| XmlSubFormat {
            name: info.root_name.clone(),
            media_type: synthetic_media_type(ns, &info.root_name),
            extension: "xml".to_string(),
            is_image: false,
        })
    }
}

impl Default for XmlFormat {
    fn default() -> Self {
        Self::new()
    }
}

impl FileFormat for XmlFormat {
    fn name(&self) -> &'static str {
        "xml"
    }

    fn media_type(&self) -> &'static str {
        "application/xml"
    }

    fn extension(&self) -> &'static str {
        "xml"
    }

    fn kind(&self) -> FormatKind {
        FormatKind::TextAllowed
    }

    fn check_header(&self, header: &[u8], is_binary: bool, _is_short: bool) -> bool {
        if is_binary {
            return false;
        }
        let stripped = strip_bom(header);
        let trimmed: &[u8] = match stripped.iter().position(|b| !b.is_ascii_whitespace()) {
            Some(pos) => &stripped[pos..],
            None => return false,
        };
        trimmed.first() == Some(&b'<')
    }

    fn match_stream(
        &self,
        input: MatchInput<'_>,
        ctx: &MatchContext,
    ) -> Result<Option<ParsedFormat>> {
        let mut reader = Reader::from_reader(BufReader::new(input.stream));
        let mut buf = Vec::new();
        let mut info = XmlInfo::default();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Decl(decl)) => {
                    info.version = decl
                        .version()
                        .ok()
                        .map(|v| String::from_utf8_lossy(&v).into_owned());
                    info.encoding = decl
                        .encoding()
                        .and_then(std::result::Result::ok)
                        .map(|v| String::from_utf8_lossy(&v).into_owned());
                }
                Ok(Event::DocType(doctype)) => {
                    let text = String::from_utf8_lossy(doctype.as_ref()).into_owned();
                    let (public, system) = parse_doctype_ids(&text);
                    info.doctype_public = public;
                    info.doctype_system = system;
                }
                Ok(Event::Start(root)) | Ok(Event::Empty(root)) => {
                    let name = String::from_utf8_lossy(root.name().as_ref()).into_owned();
                    let mut declared: Vec<(String, String)> = Vec::new();
                    for attr in root.attributes().flatten() {
                        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                        let value = String::from_utf8_lossy(&attr.value).into_owned();
                        if key == "xmlns" {
                            declared.push((String::new(), value));
                        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                            declared.push((prefix.to_string(), value));
                        }
                    }
                    let root_prefix = name.split_once(':').map_or("", |(prefix, _)| prefix);
                    info.root_namespace = declared
                        .iter()
                        .find(|(prefix, _)| prefix == root_prefix)
                        .map(|(_, uri)| uri.clone());
                    info.root_name = name
                        .split_once(':')
                        .map_or(name.clone(), |(_, local)| local.to_string());
                    info.namespaces = declared;
                    break;
                }
                Ok(Event::Comment(_) | Event::PI(_) | Event::Text(_)) => {}
                Ok(Event::Eof) => return Ok(None),
                // not well-formed up to the root element: not XML
                Err(_) => return Ok(None),
                Ok(_) => {}
            }
            buf.clear();
        }

        if info.root_name.is_empty() {
            return Ok(None);
        }
        info.sub_format = self.dispatch(&info);
        debug!(
            path = %ctx.path,
            root = %info.root_name,
            sub = info.sub_format.as_ref().map(|s| s.name.as_str()).unwrap_or("generic"),
            "xml document matched"
        );
        Ok(Some(ParsedFormat::Xml(info)))
    }
}

fn strip_bom(data: &[u8]) -> &[u8] {
    data.strip_prefix(b"\xef\xbb\xbf".as_slice()).unwrap_or(data)
}

/// Extract PUBLIC and SYSTEM identifiers from DOCTYPE internal text.
fn parse_doctype_ids(text: &str) -> (Option<String>, Option<String>) {
    let mut quoted = text.split('"');
    if let Some(before) = quoted.next() {
        if before.contains("PUBLIC") {
            let public = quoted.next().map(str::to_string);
            // skip the separator between the two identifiers
            quoted.next();
            let system = quoted.next().map(str::to_string);
            return (public, system);
        }
        if before.contains("SYSTEM") {
            let system = quoted.next().map(str::to_string);
            return (None, system);
        }
    }
    (None, None)
}

/// Media type for an unregistered XML vocabulary:
/// `application/x.ns.<reversed.host.path>.<root>+xml`.
fn synthetic_media_type(namespace: &str, root: &str) -> String {
    let mut segments: Vec<String> = Vec::new();
    if let Ok(parsed) = url::Url::parse(namespace) {
        if let Some(host) = parsed.host_str() {
            segments.extend(host.split('.').rev().map(sanitize_segment));
        }
        segments.extend(
            parsed
                .path()
                .split('/')
                .filter(|s| !s.is_empty())
                .map(sanitize_segment),
        );
        if let Some(fragment) = parsed.fragment() {
            if !fragment.is_empty() {
                segments.push(sanitize_segment(fragment));
            }
        }
    } else {
        segments.push(sanitize_segment(namespace));
    }
    segments.push(sanitize_segment(root));
    format!("application/x.ns.{}+xml", segments.join("."))
}

fn sanitize_segment(segment: &str) -> String {
    segment
        .to_ascii_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}
