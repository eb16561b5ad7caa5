//! Inline drawing element (w:drawing)
//!
//! The drawing subtree is kept raw for round-trip fidelity; this wrapper
//! exposes the two pieces the engine cares about: the blip relationship ID
//! pointing at the image part, and the alternate-text description used to
//! address a drawing by name.

use crate::error::Result;
use crate::xml::RawXmlElement;
use quick_xml::events::BytesStart;
use quick_xml::{Reader, Writer};
use std::io::BufRead;

/// EMUs per pixel at 96 DPI (914400 EMU/inch / 96 px/inch)
pub const EMU_PER_PIXEL: i64 = 9525;

/// An inline drawing within a run
#[derive(Clone, Debug)]
pub struct Drawing {
    /// The w:drawing element, preserved verbatim
    pub raw: RawXmlElement,
}

impl Drawing {
    /// Parse from reader (after the w:drawing start tag)
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<Self> {
        Ok(Self {
            raw: RawXmlElement::from_reader(reader, start)?,
        })
    }

    /// Wrap an already-built w:drawing element
    pub fn from_raw(raw: RawXmlElement) -> Self {
        Self { raw }
    }

    /// Relationship ID of the embedded image (a:blip r:embed)
    pub fn rel_id(&self) -> Option<&str> {
        self.raw.find_descendant("blip")?.attr("r:embed")
    }

    /// Point the drawing at a different image part
    pub fn set_rel_id(&mut self, id: &str) {
        self.raw.visit_elements_mut(&mut |e| {
            if e.local_name() == "blip" && e.attr("r:embed").is_some() {
                e.set_attr("r:embed", id);
            }
        });
    }

    /// Alternate-text description (wp:docPr descr), if present
    pub fn description(&self) -> Option<&str> {
        self.raw.find_descendant("docPr")?.attr("descr")
    }

    /// Extent in EMUs (wp:extent cx/cy)
    pub fn extent_emu(&self) -> Option<(i64, i64)> {
        let extent = self.raw.find_descendant("extent")?;
        let cx = extent.attr("cx")?.parse().ok()?;
        let cy = extent.attr("cy")?.parse().ok()?;
        Some((cx, cy))
    }

    /// Write to XML writer
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        self.raw.write_to(writer)
    }

    /// Build an inline picture drawing referencing an image part.
    ///
    /// `cx`/`cy` are EMUs; `doc_pr_id` must be unique within the document
    /// body. The produced subtree mirrors what word processors emit for a
    /// plain inline picture.
    pub fn inline_image(
        rel_id: &str,
        cx: i64,
        cy: i64,
        doc_pr_id: u32,
        name: &str,
        description: Option<&str>,
    ) -> Self {
        let cx = cx.to_string();
        let cy = cy.to_string();

        let extent = RawXmlElement::new("wp:extent")
            .with_attr("cx", cx.as_str())
            .with_attr("cy", cy.as_str())
            .empty();

        let effect_extent = RawXmlElement::new("wp:effectExtent")
            .with_attr("l", "0")
            .with_attr("t", "0")
            .with_attr("r", "0")
            .with_attr("b", "0")
            .empty();

        let mut doc_pr = RawXmlElement::new("wp:docPr")
            .with_attr("id", doc_pr_id.to_string())
            .with_attr("name", name);
        if let Some(descr) = description {
            doc_pr = doc_pr.with_attr("descr", descr);
        }

        let frame_props = RawXmlElement::new("wp:cNvGraphicFramePr").with_child(
            RawXmlElement::new("a:graphicFrameLocks")
                .with_attr("xmlns:a", crate::xml::A)
                .with_attr("noChangeAspect", "1")
                .empty(),
        );

        let pic = RawXmlElement::new("pic:pic")
            .with_attr("xmlns:pic", crate::xml::PIC)
            .with_child(
                RawXmlElement::new("pic:nvPicPr")
                    .with_child(
                        RawXmlElement::new("pic:cNvPr")
                            .with_attr("id", "0")
                            .with_attr("name", name)
                            .empty(),
                    )
                    .with_child(RawXmlElement::new("pic:cNvPicPr").empty()),
            )
            .with_child(
                RawXmlElement::new("pic:blipFill")
                    .with_child(
                        RawXmlElement::new("a:blip")
                            .with_attr("r:embed", rel_id)
                            .empty(),
                    )
                    .with_child(
                        RawXmlElement::new("a:stretch")
                            .with_child(RawXmlElement::new("a:fillRect").empty()),
                    ),
            )
            .with_child(
                RawXmlElement::new("pic:spPr")
                    .with_child(
                        RawXmlElement::new("a:xfrm")
                            .with_child(
                                RawXmlElement::new("a:off")
                                    .with_attr("x", "0")
                                    .with_attr("y", "0")
                                    .empty(),
                            )
                            .with_child(
                                RawXmlElement::new("a:ext")
                                    .with_attr("cx", cx.as_str())
                                    .with_attr("cy", cy.as_str())
                                    .empty(),
                            ),
                    )
                    .with_child(
                        RawXmlElement::new("a:prstGeom")
                            .with_attr("prst", "rect")
                            .with_child(RawXmlElement::new("a:avLst").empty()),
                    ),
            );

        let graphic = RawXmlElement::new("a:graphic")
            .with_attr("xmlns:a", crate::xml::A)
            .with_child(
                RawXmlElement::new("a:graphicData")
                    .with_attr("uri", crate::xml::PIC)
                    .with_child(pic),
            );

        let inline = RawXmlElement::new("wp:inline")
            .with_attr("distT", "0")
            .with_attr("distB", "0")
            .with_attr("distL", "0")
            .with_attr("distR", "0")
            .with_child(extent)
            .with_child(effect_extent)
            .with_child(doc_pr)
            .with_child(frame_props)
            .with_child(graphic);

        Self {
            raw: RawXmlElement::new("w:drawing").with_child(inline),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_image_fields() {
        let drawing = Drawing::inline_image("rId5", 990000, 792000, 1, "Picture 1", Some("logo"));

        assert_eq!(drawing.rel_id(), Some("rId5"));
        assert_eq!(drawing.description(), Some("logo"));
        assert_eq!(drawing.extent_emu(), Some((990000, 792000)));
    }

    #[test]
    fn test_set_rel_id() {
        let mut drawing = Drawing::inline_image("rId5", 100, 100, 1, "Picture 1", None);
        drawing.set_rel_id("rId12");
        assert_eq!(drawing.rel_id(), Some("rId12"));
    }
}
