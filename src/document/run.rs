//! Run element (w:r) - a contiguous span of content with uniform formatting

use crate::document::Drawing;
use crate::error::Result;
use crate::xml::{attrs_of, RawXmlElement, RawXmlNode};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::BufRead;

/// Run element (w:r)
///
/// Formatting (w:rPr) is preserved as a raw subtree; the engine never edits
/// formatting, only text and drawings.
#[derive(Clone, Debug, Default)]
pub struct Run {
    /// Run properties (w:rPr), preserved verbatim
    pub properties: Option<RawXmlElement>,
    /// Run content
    pub content: Vec<RunContent>,
    /// Attributes on the w:r tag (rsid* and friends), preserved
    pub attrs: Vec<(String, String)>,
}

/// Content within a run
#[derive(Clone, Debug)]
pub enum RunContent {
    /// Text (w:t)
    Text(String),
    /// Tab (w:tab)
    Tab,
    /// Break (w:br)
    Break(BreakType),
    /// Carriage return (w:cr)
    CarriageReturn,
    /// Inline drawing (w:drawing)
    Drawing(Drawing),
    /// Unknown (preserved)
    Unknown(RawXmlNode),
}

/// Break type
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum BreakType {
    #[default]
    TextWrapping,
    Page,
    Column,
}

impl Run {
    /// Create a new run holding one text node
    pub fn new(text: impl Into<String>) -> Self {
        Run {
            content: vec![RunContent::Text(text.into())],
            ..Default::default()
        }
    }

    /// Create a run holding one drawing
    pub fn with_drawing(drawing: Drawing) -> Self {
        Run {
            content: vec![RunContent::Drawing(drawing)],
            ..Default::default()
        }
    }

    /// Parse from reader (after w:r start tag)
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<Self> {
        let mut run = Run {
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
                        b"rPr" => {
                            run.properties = Some(RawXmlElement::from_reader(reader, &e)?);
                        }
                        b"t" => {
                            let text = read_text_content(reader)?;
                            run.content.push(RunContent::Text(text));
                        }
                        b"drawing" => {
                            let drawing = Drawing::from_reader(reader, &e)?;
                            run.content.push(RunContent::Drawing(drawing));
                        }
                        _ => {
                            let raw = RawXmlElement::from_reader(reader, &e)?;
                            run.content
                                .push(RunContent::Unknown(RawXmlNode::Element(raw)));
                        }
                    }
                }
                Event::Empty(e) => {
                    let name = e.name();
                    let local = name.local_name();

                    match local.as_ref() {
                        b"t" => {
                            run.content.push(RunContent::Text(String::new()));
                        }
                        b"tab" => {
                            run.content.push(RunContent::Tab);
                        }
                        b"br" => {
                            let break_type = match crate::xml::get_attr(&e, "w:type")
                                .or_else(|| crate::xml::get_attr(&e, "type"))
                                .as_deref()
                            {
                                Some("page") => BreakType::Page,
                                Some("column") => BreakType::Column,
                                _ => BreakType::TextWrapping,
                            };
                            run.content.push(RunContent::Break(break_type));
                        }
                        b"cr" => {
                            run.content.push(RunContent::CarriageReturn);
                        }
                        b"rPr" => {}
                        _ => {
                            let raw = RawXmlElement::from_empty(&e);
                            run.content
                                .push(RunContent::Unknown(RawXmlNode::Element(raw)));
                        }
                    }
                }
                Event::End(e) => {
                    if e.name().local_name().as_ref() == b"r" {
                        break;
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(run)
    }

    /// Create from a self-closing w:r
    pub fn from_empty(start: &BytesStart) -> Self {
        Run {
            attrs: attrs_of(start),
            ..Default::default()
        }
    }

    /// All text in this run
    pub fn text(&self) -> String {
        let mut result = String::new();
        for content in &self.content {
            match content {
                RunContent::Text(t) => result.push_str(t),
                RunContent::Tab => result.push('\t'),
                RunContent::Break(BreakType::TextWrapping) => result.push('\n'),
                RunContent::CarriageReturn => result.push('\n'),
                _ => {}
            }
        }
        result
    }

    /// Drawings in this run
    pub fn drawings(&self) -> impl Iterator<Item = &Drawing> {
        self.content.iter().filter_map(|c| {
            if let RunContent::Drawing(d) = c {
                Some(d)
            } else {
                None
            }
        })
    }

    /// Write to XML writer
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new("w:r");
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
            content.write_to(writer)?;
        }

        writer.write_event(Event::End(BytesEnd::new("w:r")))?;

        Ok(())
    }
}

impl RunContent {
    /// Write to XML writer
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        match self {
            RunContent::Text(text) => {
                let mut start = BytesStart::new("w:t");
                // Word drops unprotected edge whitespace on load
                if text.starts_with(' ') || text.ends_with(' ') || text.contains("  ") {
                    start.push_attribute(("xml:space", "preserve"));
                }
                writer.write_event(Event::Start(start))?;
                writer.write_event(Event::Text(BytesText::new(text)))?;
                writer.write_event(Event::End(BytesEnd::new("w:t")))?;
            }
            RunContent::Tab => {
                writer.write_event(Event::Empty(BytesStart::new("w:tab")))?;
            }
            RunContent::Break(break_type) => {
                let mut start = BytesStart::new("w:br");
                match break_type {
                    BreakType::Page => start.push_attribute(("w:type", "page")),
                    BreakType::Column => start.push_attribute(("w:type", "column")),
                    BreakType::TextWrapping => {}
                }
                writer.write_event(Event::Empty(start))?;
            }
            RunContent::CarriageReturn => {
                writer.write_event(Event::Empty(BytesStart::new("w:cr")))?;
            }
            RunContent::Drawing(drawing) => {
                drawing.write_to(writer)?;
            }
            RunContent::Unknown(node) => {
                node.write_to(writer)?;
            }
        }
        Ok(())
    }
}

/// Read text content from a w:t element
fn read_text_content<R: BufRead>(reader: &mut Reader<R>) -> Result<String> {
    let mut text = String::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Text(t) => {
                text.push_str(&t.unescape()?);
            }
            Event::End(e) => {
                if e.name().local_name().as_ref() == b"t" {
                    break;
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(text)
}
