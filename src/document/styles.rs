//! Style definitions part (w:styles)
//!
//! Parsed just deeply enough to merge by style ID: each w:style is kept as
//! a raw subtree keyed by its w:styleId, everything else in the part
//! (docDefaults, latentStyles) rides along untouched.

use crate::error::Result;
use crate::xml::{RawXmlElement, RawXmlNode};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::Cursor;

/// A single style definition
#[derive(Clone, Debug)]
pub struct Style {
    /// Unique style ID (w:styleId)
    pub style_id: String,
    /// The w:style element, preserved verbatim
    pub raw: RawXmlElement,
}

/// The style-definitions part
#[derive(Clone, Debug, Default)]
pub struct Styles {
    /// Non-style children of w:styles, in document order
    pub prelude: Vec<RawXmlNode>,
    /// Style definitions, in document order
    pub styles: Vec<Style>,
}

impl Styles {
    /// Parse from the styles part's XML
    pub fn from_xml(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut styles = Styles::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let name = e.name();
                    let local = name.local_name();

                    match local.as_ref() {
                        b"styles" => {}
                        b"style" => {
                            let raw = RawXmlElement::from_reader(&mut reader, &e)?;
                            styles.push_parsed(raw);
                        }
                        _ => {
                            let raw = RawXmlElement::from_reader(&mut reader, &e)?;
                            styles.prelude.push(RawXmlNode::Element(raw));
                        }
                    }
                }
                Event::Empty(e) => {
                    let raw = RawXmlElement::from_empty(&e);
                    if e.name().local_name().as_ref() == b"style" {
                        styles.push_parsed(raw);
                    } else {
                        styles.prelude.push(RawXmlNode::Element(raw));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(styles)
    }

    fn push_parsed(&mut self, raw: RawXmlElement) {
        match raw.attr("w:styleId") {
            Some(id) => {
                let style_id = id.to_string();
                self.styles.push(Style { style_id, raw });
            }
            // A style without an ID cannot be deduplicated; carry it as-is
            None => self.prelude.push(RawXmlNode::Element(raw)),
        }
    }

    /// Serialize back to the styles part's XML
    pub fn to_xml(&self) -> Result<String> {
        let mut buffer = Cursor::new(Vec::new());
        let mut writer = Writer::new(&mut buffer);

        writer.write_event(Event::Decl(BytesDecl::new(
            "1.0",
            Some("UTF-8"),
            Some("yes"),
        )))?;

        let mut root = BytesStart::new("w:styles");
        root.push_attribute(("xmlns:w", crate::xml::W));
        root.push_attribute(("xmlns:r", crate::xml::R));
        writer.write_event(Event::Start(root))?;

        for node in &self.prelude {
            node.write_to(&mut writer)?;
        }
        for style in &self.styles {
            style.raw.write_to(&mut writer)?;
        }

        writer.write_event(Event::End(BytesEnd::new("w:styles")))?;

        let bytes = buffer.into_inner();
        Ok(String::from_utf8(bytes).expect("styles XML is valid UTF-8"))
    }

    /// Whether a style with this ID exists
    pub fn contains(&self, style_id: &str) -> bool {
        self.styles.iter().any(|s| s.style_id == style_id)
    }

    /// Merge definitions from another styles part, first writer wins.
    ///
    /// Returns the number of duplicate IDs skipped. Never an error: a
    /// duplicate is expected when merging documents built from the same
    /// template.
    pub fn merge_from(&mut self, other: &Styles) -> usize {
        let mut skipped = 0;
        for style in &other.styles {
            if self.contains(&style.style_id) {
                log::debug!("style '{}' already defined, skipping", style.style_id);
                skipped += 1;
            } else {
                self.styles.push(style.clone());
            }
        }
        skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const STYLES_XML: &str = r#"<?xml version="1.0"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:docDefaults><w:rPrDefault/></w:docDefaults>
  <w:style w:type="paragraph" w:styleId="Normal"><w:name w:val="Normal"/></w:style>
  <w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/></w:style>
</w:styles>"#;

    #[test]
    fn test_parse() {
        let styles = Styles::from_xml(STYLES_XML).unwrap();
        assert_eq!(styles.styles.len(), 2);
        assert_eq!(styles.prelude.len(), 1);
        assert!(styles.contains("Normal"));
        assert!(styles.contains("Heading1"));
    }

    #[test]
    fn test_roundtrip() {
        let styles = Styles::from_xml(STYLES_XML).unwrap();
        let xml = styles.to_xml().unwrap();
        let styles2 = Styles::from_xml(&xml).unwrap();
        assert_eq!(styles2.styles.len(), 2);
        assert!(styles2.contains("Heading1"));
    }

    #[test]
    fn test_merge_first_writer_wins() {
        let mut dest = Styles::from_xml(STYLES_XML).unwrap();
        let src = Styles::from_xml(
            r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:style w:type="paragraph" w:styleId="Normal"><w:name w:val="Other Normal"/></w:style>
  <w:style w:type="character" w:styleId="Emphasis"><w:name w:val="Emphasis"/></w:style>
</w:styles>"#,
        )
        .unwrap();

        let skipped = dest.merge_from(&src);

        assert_eq!(skipped, 1);
        assert_eq!(dest.styles.len(), 3);
        // First writer wins: the original Normal is untouched
        let normal = dest.styles.iter().find(|s| s.style_id == "Normal").unwrap();
        assert_eq!(
            normal.raw.find_descendant("name").unwrap().attr("w:val"),
            Some("Normal")
        );
    }
}
