//! Section properties (w:sectPr) and the section-break markers the merge
//! engine fabricates between sources

use crate::error::Result;
use crate::xml::RawXmlElement;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Writer;

/// Page orientation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Page size and orientation for a fabricated section break.
///
/// Dimensions are in twentieths of a point, the unit w:pgSz uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageSetup {
    pub width: u32,
    pub height: u32,
    pub orientation: Orientation,
}

impl Default for PageSetup {
    /// US Letter, portrait
    fn default() -> Self {
        Self {
            width: 12240,
            height: 15840,
            orientation: Orientation::Portrait,
        }
    }
}

impl PageSetup {
    /// US Letter, landscape
    pub fn landscape() -> Self {
        Self {
            width: 15840,
            height: 12240,
            orientation: Orientation::Landscape,
        }
    }
}

/// A section-properties element.
///
/// Parsed ones keep their raw subtree; fabricated ones carry just a w:pgSz
/// built from a [`PageSetup`].
#[derive(Clone, Debug)]
pub struct SectionProperties {
    /// The w:sectPr element
    pub raw: RawXmlElement,
}

impl SectionProperties {
    /// Wrap a parsed w:sectPr subtree
    pub fn from_raw(raw: RawXmlElement) -> Self {
        Self { raw }
    }

    /// Build a fresh w:sectPr for a fabricated section break
    pub fn new(setup: &PageSetup) -> Self {
        let mut pg_sz = RawXmlElement::new("w:pgSz")
            .with_attr("w:w", setup.width.to_string())
            .with_attr("w:h", setup.height.to_string());
        if setup.orientation == Orientation::Landscape {
            pg_sz = pg_sz.with_attr("w:orient", "landscape");
        }

        Self {
            raw: RawXmlElement::new("w:sectPr").with_child(pg_sz.empty()),
        }
    }

    /// Page size in twips, if a w:pgSz is present
    pub fn page_size(&self) -> Option<(u32, u32)> {
        let pg_sz = self.raw.find_descendant("pgSz")?;
        let w = pg_sz.attr("w:w")?.parse().ok()?;
        let h = pg_sz.attr("w:h")?.parse().ok()?;
        Some((w, h))
    }

    /// Write as a body-level marker: an empty paragraph whose pPr carries
    /// this sectPr
    pub fn write_marker_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        writer.write_event(Event::Start(BytesStart::new("w:p")))?;
        writer.write_event(Event::Start(BytesStart::new("w:pPr")))?;
        self.raw.write_to(writer)?;
        writer.write_event(Event::End(BytesEnd::new("w:pPr")))?;
        writer.write_event(Event::End(BytesEnd::new("w:p")))?;
        Ok(())
    }
}
