//! Vocabulary tables
//!
//! Properties and classes are declared as enum variants mapped to a
//! `(namespace, local name)` pair through a match table. URI formation looks
//! the pair up here; nothing is derived from attribute reflection.

use crate::term::Iri;

/// A namespace the pipeline can emit terms from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vocabulary {
    Rdf,
    Rdfs,
    Xsd,
    /// Dublin Core terms.
    Dcterms,
    /// NEPOMUK Information Element ontology.
    Nie,
    /// NEPOMUK File Ontology.
    Nfo,
    Skos,
    Prov,
    /// faceta's own terms, for facts no standard vocabulary covers.
    Faceta,
}

impl Vocabulary {
    /// Preferred prefix, used when a writer can abbreviate.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Rdf => "rdf",
            Self::Rdfs => "rdfs",
            Self::Xsd => "xsd",
            Self::Dcterms => "dcterms",
            Self::Nie => "nie",
            Self::Nfo => "nfo",
            Self::Skos => "skos",
            Self::Prov => "prov",
            Self::Faceta => "faceta",
        }
    }

    /// Namespace IRI.
    pub fn iri(self) -> &'static str {
        match self {
            Self::Rdf => "http://www.w3.org/1999/02/22-rdf-syntax-ns#",
            Self::Rdfs => "http://www.w3.org/2000/01/rdf-schema#",
            Self::Xsd => "http://www.w3.org/2001/XMLSchema#",
            Self::Dcterms => "http://purl.org/dc/terms/",
            Self::Nie => "http://www.semanticdesktop.org/ontologies/2007/01/19/nie#",
            Self::Nfo => "http://www.semanticdesktop.org/ontologies/2007/03/22/nfo#",
            Self::Skos => "http://www.w3.org/2004/02/skos/core#",
            Self::Prov => "http://www.w3.org/ns/prov#",
            Self::Faceta => "https://faceta.dev/ns/v1#",
        }
    }

    /// Full IRI of a term in this namespace.
    pub fn term(self, local: &str) -> Iri {
        Iri::new(format!("{}{local}", self.iri()))
    }

    /// All namespaces with a preferred prefix, for prefix lookup.
    pub fn all() -> &'static [Self] {
        &[
            Self::Rdf,
            Self::Rdfs,
            Self::Xsd,
            Self::Dcterms,
            Self::Nie,
            Self::Nfo,
            Self::Skos,
            Self::Prov,
            Self::Faceta,
        ]
    }
}

// xsd local names used by literal formation
pub const XSD_BOOLEAN: &str = "boolean";
pub const XSD_INT: &str = "int";
pub const XSD_LONG: &str = "long";
pub const XSD_UNSIGNED_INT: &str = "unsignedInt";
pub const XSD_UNSIGNED_LONG: &str = "unsignedLong";
pub const XSD_FLOAT: &str = "float";
pub const XSD_DOUBLE: &str = "double";
pub const XSD_DECIMAL: &str = "decimal";
pub const XSD_DATE_TIME: &str = "dateTime";
pub const XSD_ANY_URI: &str = "anyURI";
pub const XSD_BASE64_BINARY: &str = "base64Binary";

/// Properties the pipeline emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prop {
    Type,
    Label,
    /// Links a data object to each of its successful format matches.
    HasFormat,
    /// Links a format match to its media-type descriptor node.
    Format,
    BelongsToContainer,
    HasPart,
    /// Links a file node to the content it stores.
    IsStoredAs,
    HasHash,
    HashAlgorithm,
    HashValue,
    ByteSize,
    MimeType,
    CharacterSet,
    PlainTextContent,
    FileName,
    FilePath,
    FileCreated,
    FileLastModified,
    FileLastAccessed,
    Description,
    WasDerivedFrom,
    PrefLabel,
    Notation,
    XmlVersion,
    XmlEncoding,
    XmlNamespace,
    Width,
    Height,
    BitDepth,
    Interpreter,
    Extension,
}

impl Prop {
    fn table(self) -> (Vocabulary, &'static str) {
        match self {
            Self::Type => (Vocabulary::Rdf, "type"),
            Self::Label => (Vocabulary::Rdfs, "label"),
            Self::HasFormat => (Vocabulary::Dcterms, "hasFormat"),
            Self::Format => (Vocabulary::Dcterms, "format"),
            Self::BelongsToContainer => (Vocabulary::Nfo, "belongsToContainer"),
            Self::HasPart => (Vocabulary::Nie, "hasPart"),
            Self::IsStoredAs => (Vocabulary::Nie, "isStoredAs"),
            Self::HasHash => (Vocabulary::Nfo, "hasHash"),
            Self::HashAlgorithm => (Vocabulary::Nfo, "hashAlgorithm"),
            Self::HashValue => (Vocabulary::Nfo, "hashValue"),
            Self::ByteSize => (Vocabulary::Nie, "byteSize"),
            Self::MimeType => (Vocabulary::Nie, "mimeType"),
            Self::CharacterSet => (Vocabulary::Nie, "characterSet"),
            Self::PlainTextContent => (Vocabulary::Nie, "plainTextContent"),
            Self::FileName => (Vocabulary::Nfo, "fileName"),
            Self::FilePath => (Vocabulary::Faceta, "filePath"),
            Self::FileCreated => (Vocabulary::Nfo, "fileCreated"),
            Self::FileLastModified => (Vocabulary::Nfo, "fileLastModified"),
            Self::FileLastAccessed => (Vocabulary::Nfo, "fileLastAccessed"),
            Self::Description => (Vocabulary::Dcterms, "description"),
            Self::WasDerivedFrom => (Vocabulary::Prov, "wasDerivedFrom"),
            Self::PrefLabel => (Vocabulary::Skos, "prefLabel"),
            Self::Notation => (Vocabulary::Skos, "notation"),
            Self::XmlVersion => (Vocabulary::Faceta, "xmlVersion"),
            Self::XmlEncoding => (Vocabulary::Faceta, "xmlEncoding"),
            Self::XmlNamespace => (Vocabulary::Faceta, "xmlNamespace"),
            Self::Width => (Vocabulary::Nfo, "width"),
            Self::Height => (Vocabulary::Nfo, "height"),
            Self::BitDepth => (Vocabulary::Nfo, "bitDepth"),
            Self::Interpreter => (Vocabulary::Faceta, "interpreter"),
            Self::Extension => (Vocabulary::Faceta, "extension"),
        }
    }

    pub fn vocabulary(self) -> Vocabulary {
        self.table().0
    }

    pub fn iri(self) -> Iri {
        let (vocab, local) = self.table();
        vocab.term(local)
    }
}

/// Classes the pipeline assigns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Class {
    DataObject,
    FileHash,
    FileDataObject,
    Folder,
    Archive,
    ArchiveItem,
    EmbeddedFileDataObject,
    PlainTextDocument,
    XmlDocument,
    RasterImage,
    VectorImage,
    MediaFormat,
    /// Synthesized descriptor for data no registered format claimed.
    ImprovisedFormat,
}

impl Class {
    fn table(self) -> (Vocabulary, &'static str) {
        match self {
            Self::DataObject => (Vocabulary::Nie, "DataObject"),
            Self::FileHash => (Vocabulary::Nfo, "FileHash"),
            Self::FileDataObject => (Vocabulary::Nfo, "FileDataObject"),
            Self::Folder => (Vocabulary::Nfo, "Folder"),
            Self::Archive => (Vocabulary::Nfo, "Archive"),
            Self::ArchiveItem => (Vocabulary::Nfo, "ArchiveItem"),
            Self::EmbeddedFileDataObject => (Vocabulary::Nfo, "EmbeddedFileDataObject"),
            Self::PlainTextDocument => (Vocabulary::Nfo, "PlainTextDocument"),
            Self::XmlDocument => (Vocabulary::Faceta, "XmlDocument"),
            Self::RasterImage => (Vocabulary::Nfo, "RasterImage"),
            Self::VectorImage => (Vocabulary::Nfo, "VectorImage"),
            Self::MediaFormat => (Vocabulary::Faceta, "MediaFormat"),
            Self::ImprovisedFormat => (Vocabulary::Faceta, "ImprovisedFormat"),
        }
    }

    pub fn vocabulary(self) -> Vocabulary {
        self.table().0
    }

    pub fn iri(self) -> Iri {
        let (vocab, local) = self.table();
        vocab.term(local)
    }
}

/// Datatype IRI for JSON-wrapped unsafe string literals.
pub fn rdf_json() -> Iri {
    Vocabulary::Rdf.term("JSON")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prop_iris_resolve_through_table() {
        assert_eq!(
            Prop::ByteSize.iri().as_str(),
            "http://www.semanticdesktop.org/ontologies/2007/01/19/nie#byteSize"
        );
        assert_eq!(
            Prop::HashValue.iri().as_str(),
            "http://www.semanticdesktop.org/ontologies/2007/03/22/nfo#hashValue"
        );
    }

    #[test]
    fn prefixes_are_distinct() {
        let mut seen = std::collections::HashSet::new();
        for vocab in Vocabulary::all() {
            assert!(seen.insert(vocab.prefix()), "duplicate prefix {}", vocab.prefix());
        }
    }
}
