//! Paragraph element (w:p)

use crate::document::Run;
use crate::error::Result;
use crate::xml::{attrs_of, RawXmlElement, RawXmlNode};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::BufRead;

/// Paragraph element (w:p)
///
/// Properties (w:pPr) are preserved as a raw subtree; the only piece the
/// engine inspects is a nested w:sectPr, which marks a section break.
#[derive(Clone, Debug, Default)]
pub struct Paragraph {
    /// Paragraph properties (w:pPr), preserved verbatim
    pub properties: Option<RawXmlElement>,
    /// Paragraph content (runs, hyperlinks, preserved unknowns)
    pub content: Vec<ParagraphContent>,
    /// Attributes on the w:p tag, preserved
    pub attrs: Vec<(String, String)>,
}

/// Content within a paragraph
#[derive(Clone, Debug)]
pub enum ParagraphContent {
    /// Text run
    Run(Run),
    /// Hyperlink wrapping runs
    Hyperlink(Hyperlink),
    /// Unknown element (preserved)
    Unknown(RawXmlNode),
}

/// Hyperlink element (w:hyperlink)
#[derive(Clone, Debug, Default)]
pub struct Hyperlink {
    /// Relationship ID (external links)
    pub r_id: Option<String>,
    /// Anchor (internal links)
    pub anchor: Option<String>,
    /// Content runs
    pub runs: Vec<Run>,
}

impl Paragraph {
    /// Create a paragraph holding one plain text run
    pub fn new(text: impl Into<String>) -> Self {
        Paragraph {
            content: vec![ParagraphContent::Run(Run::new(text))],
            ..Default::default()
        }
    }

    /// Create a paragraph holding one run
    pub fn with_run(run: Run) -> Self {
        Paragraph {
            content: vec![ParagraphContent::Run(run)],
            ..Default::default()
        }
    }

    /// Parse paragraph from reader (after w:p start tag)
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<Self> {
        let mut para = Paragraph {
            attrs: attrs_of(start),
            ..Default::default()
        };

        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let name = e.name();
                    let local = name.local_name();

                    match local.as_ref() {
                        b"pPr" => {
                            para.properties = Some(RawXmlElement::from_reader(reader, &e)?);
                        }
                        b"r" => {
                            let run = Run::from_reader(reader, &e)?;
                            para.content.push(ParagraphContent::Run(run));
                        }
                        b"hyperlink" => {
                            let link = Hyperlink::from_reader(reader, &e)?;
                            para.content.push(ParagraphContent::Hyperlink(link));
                        }
                        _ => {
                            let raw = RawXmlElement::from_reader(reader, &e)?;
                            para.content
                                .push(ParagraphContent::Unknown(RawXmlNode::Element(raw)));
                        }
                    }
                }
                Event::Empty(e) => {
                    let name = e.name();
                    let local = name.local_name();

                    match local.as_ref() {
                        b"r" => {
                            para.content.push(ParagraphContent::Run(Run::from_empty(&e)));
                        }
                        b"pPr" => {}
                        _ => {
                            let raw = RawXmlElement::from_empty(&e);
                            para.content
                                .push(ParagraphContent::Unknown(RawXmlNode::Element(raw)));
                        }
                    }
                }
                Event::End(e) => {
                    if e.name().local_name().as_ref() == b"p" {
                        break;
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(para)
    }

    /// Create from a self-closing w:p
    pub fn from_empty(start: &BytesStart) -> Self {
        Paragraph {
            attrs: attrs_of(start),
            ..Default::default()
        }
    }

    /// All text in this paragraph
    pub fn text(&self) -> String {
        let mut result = String::new();
        for content in &self.content {
            match content {
                ParagraphContent::Run(run) => result.push_str(&run.text()),
                ParagraphContent::Hyperlink(link) => {
                    for run in &link.runs {
                        result.push_str(&run.text());
                    }
                }
                ParagraphContent::Unknown(_) => {}
            }
        }
        result
    }

    /// Runs directly in this paragraph (not inside hyperlinks)
    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.content.iter().filter_map(|c| {
            if let ParagraphContent::Run(r) = c {
                Some(r)
            } else {
                None
            }
        })
    }

    /// Append a run
    pub fn add_run(&mut self, run: Run) {
        self.content.push(ParagraphContent::Run(run));
    }

    /// The w:sectPr nested in this paragraph's properties, if any
    pub fn section_properties(&self) -> Option<&RawXmlElement> {
        self.properties.as_ref()?.children.iter().find_map(|c| {
            if let RawXmlNode::Element(e) = c {
                if e.local_name() == "sectPr" {
                    return Some(e);
                }
            }
            None
        })
    }

    /// Whether this paragraph is a pure section-break marker: no content,
    /// just a sectPr in its properties
    pub fn is_section_break_marker(&self) -> bool {
        self.content.is_empty() && self.section_properties().is_some()
    }

    /// Remove any w:sectPr from this paragraph's properties, returning
    /// whether one was removed
    pub fn strip_section_properties(&mut self) -> bool {
        let Some(props) = self.properties.as_mut() else {
            return false;
        };
        let before = props.children.len();
        props.children.retain(|c| {
            !matches!(c, RawXmlNode::Element(e) if e.local_name() == "sectPr")
        });
        let removed = props.children.len() != before;
        if props.children.is_empty() {
            self.properties = None;
        }
        removed
    }

    /// Write to XML writer
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new("w:p");
        for (key, value) in &self.attrs {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.properties.is_none() && self.content.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;

        if let Some(props) = &self.properties {
            props.write_to(writer)?;
        }

        for content in &self.content {
            match content {
                ParagraphContent::Run(run) => run.write_to(writer)?,
                ParagraphContent::Hyperlink(link) => link.write_to(writer)?,
                ParagraphContent::Unknown(node) => node.write_to(writer)?,
            }
        }

        writer.write_event(Event::End(BytesEnd::new("w:p")))?;

        Ok(())
    }
}

impl Hyperlink {
    /// Parse from reader (after w:hyperlink start tag)
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<Self> {
        let mut link = Hyperlink {
            r_id: crate::xml::get_attr(start, "r:id"),
            anchor: crate::xml::get_attr(start, "w:anchor")
                .or_else(|| crate::xml::get_attr(start, "anchor")),
            runs: Vec::new(),
        };

        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    if e.name().local_name().as_ref() == b"r" {
                        link.runs.push(Run::from_reader(reader, &e)?);
                    } else {
                        // Nested unknowns are rare in hyperlinks; skip them
                        RawXmlElement::from_reader(reader, &e)?;
                    }
                }
                Event::Empty(e) => {
                    if e.name().local_name().as_ref() == b"r" {
                        link.runs.push(Run::from_empty(&e));
                    }
                }
                Event::End(e) => {
                    if e.name().local_name().as_ref() == b"hyperlink" {
                        break;
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(link)
    }

    /// Write to XML writer
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new("w:hyperlink");
        if let Some(r_id) = &self.r_id {
            start.push_attribute(("r:id", r_id.as_str()));
        }
        if let Some(anchor) = &self.anchor {
            start.push_attribute(("w:anchor", anchor.as_str()));
        }

        writer.write_event(Event::Start(start))?;
        for run in &self.runs {
            run.write_to(writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new("w:hyperlink")))?;

        Ok(())
    }
}
