//! Document body and block-level content

use crate::document::{Paragraph, SectionProperties};
use crate::error::Result;
use crate::xml::{RawXmlElement, RawXmlNode};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::BufRead;

/// Block-level content in a document body
#[derive(Clone, Debug)]
pub enum BlockContent {
    /// Paragraph
    Paragraph(Paragraph),
    /// Section-break marker (an empty paragraph carrying a sectPr)
    SectionBreak(SectionProperties),
    /// Unknown element, e.g. a table (preserved for round-trip)
    Unknown(RawXmlNode),
}

/// Document body (w:body)
#[derive(Clone, Debug, Default)]
pub struct Body {
    /// Block-level content
    pub content: Vec<BlockContent>,
    /// Trailing body-level sectPr (the final section's layout)
    pub section_properties: Option<RawXmlElement>,
}

impl Body {
    /// Parse body from XML reader (after w:body start tag)
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>) -> Result<Self> {
        let mut body = Body::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let name = e.name();
                    let local = name.local_name();

                    match local.as_ref() {
                        b"p" => {
                            let para = Paragraph::from_reader(reader, &e)?;
                            body.content.push(classify(para));
                        }
                        b"sectPr" => {
                            body.section_properties =
                                Some(RawXmlElement::from_reader(reader, &e)?);
                        }
                        _ => {
                            let raw = RawXmlElement::from_reader(reader, &e)?;
                            body.content
                                .push(BlockContent::Unknown(RawXmlNode::Element(raw)));
                        }
                    }
                }
                Event::Empty(e) => {
                    let name = e.name();
                    let local = name.local_name();

                    match local.as_ref() {
                        b"p" => {
                            body.content
                                .push(BlockContent::Paragraph(Paragraph::from_empty(&e)));
                        }
                        _ => {
                            let raw = RawXmlElement::from_empty(&e);
                            body.content
                                .push(BlockContent::Unknown(RawXmlNode::Element(raw)));
                        }
                    }
                }
                Event::End(e) => {
                    if e.name().local_name().as_ref() == b"body" {
                        break;
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(body)
    }

    /// All paragraphs (section-break markers excluded)
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.content.iter().filter_map(|c| {
            if let BlockContent::Paragraph(p) = c {
                Some(p)
            } else {
                None
            }
        })
    }

    /// All paragraphs, mutably
    pub fn paragraphs_mut(&mut self) -> impl Iterator<Item = &mut Paragraph> {
        self.content.iter_mut().filter_map(|c| {
            if let BlockContent::Paragraph(p) = c {
                Some(p)
            } else {
                None
            }
        })
    }

    /// Append a block
    pub fn push(&mut self, block: BlockContent) {
        self.content.push(block);
    }

    /// Append a paragraph
    pub fn add_paragraph(&mut self, para: Paragraph) {
        self.content.push(BlockContent::Paragraph(para));
    }

    /// Write body to XML writer
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        writer.write_event(Event::Start(BytesStart::new("w:body")))?;

        for content in &self.content {
            content.write_to(writer)?;
        }

        if let Some(sect_pr) = &self.section_properties {
            sect_pr.write_to(writer)?;
        }

        writer.write_event(Event::End(BytesEnd::new("w:body")))?;
        Ok(())
    }
}

impl BlockContent {
    /// Write to XML writer
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        match self {
            BlockContent::Paragraph(para) => para.write_to(writer),
            BlockContent::SectionBreak(sect) => sect.write_marker_to(writer),
            BlockContent::Unknown(node) => node.write_to(writer),
        }
    }
}

/// A parsed paragraph that is nothing but a sectPr carrier is a
/// section-break marker, not content
fn classify(para: Paragraph) -> BlockContent {
    if para.is_section_break_marker() {
        let sect = para
            .section_properties()
            .expect("marker paragraph has sectPr")
            .clone();
        BlockContent::SectionBreak(SectionProperties::from_raw(sect))
    } else {
        BlockContent::Paragraph(para)
    }
}
