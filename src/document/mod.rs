//! Document model - high-level API over the package layer

mod body;
mod drawing;
mod paragraph;
mod run;
mod section;
mod styles;

pub use body::{BlockContent, Body};
pub use drawing::{Drawing, EMU_PER_PIXEL};
pub use paragraph::{Hyperlink, Paragraph, ParagraphContent};
pub use run::{BreakType, Run, RunContent};
pub use section::{Orientation, PageSetup, SectionProperties};
pub use styles::{Style, Styles};

use crate::error::{Error, Result};
use crate::opc::{rel_types, well_known, Package, Part, PartUri, Relationships};
use crate::xml;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::{BufRead, Cursor};
use std::path::Path;

/// A word-processing document: an open package plus its parsed body.
///
/// The body is mutated in memory; `save` serializes it back into the main
/// document part and persists the whole container atomically.
#[derive(Debug)]
pub struct Document {
    package: Package,
    body: Body,
}

impl Document {
    /// Open a document from a file path
    pub fn open<P: AsRef<Path>>(path: P, editable: bool) -> Result<Self> {
        let package = Package::open(path, editable)?;
        Self::from_package(package)
    }

    /// Open a document from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let package = Package::from_bytes(bytes)?;
        Self::from_package(package)
    }

    /// Build a document over an already-open package
    pub fn from_package(package: Package) -> Result<Self> {
        let doc_part = package
            .main_document_part()
            .ok_or_else(|| Error::MissingPart("main document part".into()))?;

        let xml = doc_part.data_as_str()?;
        let body = parse_document_xml(xml)?;

        Ok(Self { package, body })
    }

    /// Create a new empty document
    pub fn new() -> Self {
        Self {
            package: Package::new(),
            body: Body::default(),
        }
    }

    /// Save the document to a file, atomically
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.sync_package()?;
        self.package.save(path)
    }

    /// Serialize the document to bytes
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.sync_package()?;
        self.package.to_bytes()
    }

    /// Release the document's in-memory contents. Idempotent.
    pub fn close(&mut self) {
        self.body = Body::default();
        self.package.close();
    }

    /// Whether `close` has been called
    pub fn is_closed(&self) -> bool {
        self.package.is_closed()
    }

    /// Serialize the current body into the main document part, creating
    /// the part and its package relationship on first save
    fn sync_package(&mut self) -> Result<()> {
        let xml = serialize_document_xml(&self.body)?;
        let uri = self
            .package
            .main_document_uri()
            .unwrap_or_else(well_known::document);

        match self.package.part_mut(&uri) {
            // Existing part: swap the bytes, keep its relationships
            Some(part) => part.set_data(xml.into_bytes()),
            None => {
                self.package.add_part(Part::new(
                    uri.clone(),
                    crate::opc::MAIN_DOCUMENT,
                    xml.into_bytes(),
                ));
                self.package
                    .add_relationship(rel_types::OFFICE_DOCUMENT, &uri.as_str()[1..]);
            }
        }

        Ok(())
    }

    /// URI of the main document part
    pub fn document_part_uri(&self) -> PartUri {
        self.package
            .main_document_uri()
            .unwrap_or_else(well_known::document)
    }

    /// Materialize the main document part if it does not exist yet, so
    /// relationships can be attached to it
    pub fn ensure_document_part(&mut self) -> Result<PartUri> {
        self.sync_package()?;
        Ok(self.document_part_uri())
    }

    /// Relationships of the main document part
    pub fn document_relationships(&self) -> Option<&Relationships> {
        self.package.main_document_part()?.relationships()
    }

    /// Relationships of the main document part, created on demand
    pub fn document_relationships_mut(&mut self) -> Result<&mut Relationships> {
        let uri = self.ensure_document_part()?;
        let part = self
            .package
            .part_mut(&uri)
            .ok_or_else(|| Error::MissingPart("main document part".into()))?;
        Ok(part.ensure_relationships())
    }

    /// URI of the style-definitions part, if the document has one
    pub fn styles_part_uri(&self) -> Option<PartUri> {
        let doc_uri = self.document_part_uri();
        if let Some(rel) = self
            .document_relationships()
            .and_then(|rels| rels.by_type(rel_types::STYLES))
        {
            return doc_uri.resolve(&rel.target).ok();
        }
        let fallback = well_known::styles();
        self.package.part(&fallback).map(|_| fallback)
    }

    /// Parse the style-definitions part, if present
    pub fn styles(&self) -> Result<Option<Styles>> {
        let Some(uri) = self.styles_part_uri() else {
            return Ok(None);
        };
        let Some(part) = self.package.part(&uri) else {
            return Ok(None);
        };
        Ok(Some(Styles::from_xml(part.data_as_str()?)?))
    }

    /// Write the style-definitions part, creating it (and its
    /// relationship) if absent
    pub fn set_styles(&mut self, styles: &Styles) -> Result<()> {
        let xml = styles.to_xml()?;
        let uri = self.styles_part_uri().unwrap_or_else(well_known::styles);

        match self.package.part_mut(&uri) {
            Some(part) => part.set_data(xml.into_bytes()),
            None => {
                self.package
                    .add_part(Part::new(uri.clone(), crate::opc::STYLES, xml.into_bytes()));
                let doc_uri = self.document_part_uri();
                let target = uri.target_from(&doc_uri);
                let rels = self.document_relationships_mut()?;
                if rels.by_type(rel_types::STYLES).is_none() {
                    rels.add(rel_types::STYLES, &target);
                }
            }
        }

        Ok(())
    }

    /// Get the document body
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Get the document body mutably
    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    /// Get the underlying package
    pub fn package(&self) -> &Package {
        &self.package
    }

    /// Get the underlying package mutably
    pub fn package_mut(&mut self) -> &mut Package {
        &mut self.package
    }

    /// All paragraphs
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.body.paragraphs()
    }

    /// Paragraph count (section-break markers excluded)
    pub fn paragraph_count(&self) -> usize {
        self.body.paragraphs().count()
    }

    /// All text in the document body
    pub fn text(&self) -> String {
        self.body
            .paragraphs()
            .map(|p| p.text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Append a paragraph with text
    pub fn add_paragraph(&mut self, text: impl Into<String>) {
        self.body.add_paragraph(Paragraph::new(text));
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse document.xml content
fn parse_document_xml(xml: &str) -> Result<Body> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut body = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = e.name();
                let local = name.local_name();

                match local.as_ref() {
                    b"body" => {
                        body = Some(Body::from_reader(&mut reader)?);
                    }
                    b"document" => {
                        // Continue to find body
                    }
                    _ => {
                        skip_element(&mut reader, &e)?;
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    body.ok_or_else(|| Error::InvalidDocument("missing w:body element".into()))
}

/// Serialize body to document.xml content
fn serialize_document_xml(body: &Body) -> Result<String> {
    let mut buffer = Cursor::new(Vec::new());
    let mut writer = Writer::new(&mut buffer);

    writer.write_event(Event::Decl(BytesDecl::new(
        "1.0",
        Some("UTF-8"),
        Some("yes"),
    )))?;

    let mut doc_start = BytesStart::new("w:document");
    for (attr, value) in xml::document_namespaces() {
        doc_start.push_attribute((attr, value));
    }
    writer.write_event(Event::Start(doc_start))?;

    body.write_to(&mut writer)?;

    writer.write_event(Event::End(BytesEnd::new("w:document")))?;

    let xml_bytes = buffer.into_inner();
    String::from_utf8(xml_bytes).map_err(|e| Error::InvalidDocument(e.to_string()))
}

/// Skip an element and all its children
fn skip_element<R: BufRead>(
    reader: &mut Reader<R>,
    start: &quick_xml::events::BytesStart,
) -> Result<()> {
    let target = start.name().as_ref().to_vec();
    let mut depth = 1;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.name().as_ref() == target => depth += 1,
            Event::End(e) if e.name().as_ref() == target => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}
