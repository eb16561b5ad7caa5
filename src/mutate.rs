//! In-place document mutation: text substitution, image replacement, and
//! image insertion

use crate::document::{
    BlockContent, Document, Drawing, Paragraph, ParagraphContent, Run, RunContent, EMU_PER_PIXEL,
};
use crate::error::Result;
use crate::opc::{rel_types, well_known, Part};
use crate::xml::RawXmlNode;

/// Image formats the mutator can insert
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
}

impl ImageFormat {
    /// MIME content type for the image part
    pub fn content_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Bmp => "image/bmp",
        }
    }

    /// Part-name extension
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Gif => "gif",
            ImageFormat::Bmp => "bmp",
        }
    }

    /// Guess from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "gif" => Some(ImageFormat::Gif),
            "bmp" => Some(ImageFormat::Bmp),
            _ => None,
        }
    }
}

/// Replace every occurrence of `search` with `replacement` in the
/// document's text nodes.
///
/// Plain substring match, per text node: a match never spans run
/// boundaries. Text inside preserved raw content (tables, field results)
/// is covered too. Returns the number of occurrences replaced; zero is a
/// valid, silent outcome.
pub fn replace_text(doc: &mut Document, search: &str, replacement: &str) -> usize {
    if search.is_empty() {
        return 0;
    }

    let mut count = 0;
    for block in &mut doc.body_mut().content {
        match block {
            BlockContent::Paragraph(para) => {
                count += replace_in_paragraph(para, search, replacement);
            }
            BlockContent::Unknown(node) => {
                count += replace_in_node(node, search, replacement);
            }
            BlockContent::SectionBreak(_) => {}
        }
    }
    count
}

fn replace_in_paragraph(para: &mut Paragraph, search: &str, replacement: &str) -> usize {
    let mut count = 0;
    for content in &mut para.content {
        match content {
            ParagraphContent::Run(run) => count += replace_in_run(run, search, replacement),
            ParagraphContent::Hyperlink(link) => {
                for run in &mut link.runs {
                    count += replace_in_run(run, search, replacement);
                }
            }
            ParagraphContent::Unknown(node) => {
                count += replace_in_node(node, search, replacement);
            }
        }
    }
    count
}

fn replace_in_run(run: &mut Run, search: &str, replacement: &str) -> usize {
    let mut count = 0;
    for content in &mut run.content {
        match content {
            RunContent::Text(text) => {
                let n = text.matches(search).count();
                if n > 0 {
                    *text = text.replace(search, replacement);
                    count += n;
                }
            }
            RunContent::Unknown(node) => {
                count += replace_in_node(node, search, replacement);
            }
            _ => {}
        }
    }
    count
}

fn replace_in_node(node: &mut RawXmlNode, search: &str, replacement: &str) -> usize {
    let RawXmlNode::Element(element) = node else {
        return 0;
    };

    let mut count = 0;
    element.visit_elements_mut(&mut |e| {
        if e.local_name() != "t" {
            return;
        }
        for child in &mut e.children {
            if let RawXmlNode::Text(text) = child {
                let n = text.matches(search).count();
                if n > 0 {
                    *text = text.replace(search, replacement);
                    count += n;
                }
            }
        }
    });
    count
}

/// Overwrite image part bytes, preserving part names, relationship IDs,
/// and content types.
///
/// With `alt = None` every image part in the package is overwritten (zero
/// images is a valid, silent outcome). With `alt = Some(tag)` only the
/// part reached through the drawing whose alternate-text description
/// equals `tag` is touched. Returns the number of parts overwritten.
pub fn replace_image_bytes(doc: &mut Document, bytes: &[u8], alt: Option<&str>) -> Result<usize> {
    let Some(tag) = alt else {
        let mut touched = 0;
        for part in doc.package_mut().image_parts_mut() {
            part.set_data(bytes.to_vec());
            touched += 1;
        }
        return Ok(touched);
    };

    let Some(rel_id) = find_drawing_rel_by_alt(doc, tag) else {
        return Ok(0);
    };

    let doc_uri = doc.document_part_uri();
    let Some(target) = doc
        .document_relationships()
        .and_then(|rels| rels.get(&rel_id))
        .map(|rel| rel.target.clone())
    else {
        return Ok(0);
    };

    let part_uri = doc_uri.resolve(&target)?;
    match doc.package_mut().part_mut(&part_uri) {
        Some(part) => {
            part.set_data(bytes.to_vec());
            Ok(1)
        }
        None => Ok(0),
    }
}

/// Add a new image part and append a drawing-bearing paragraph at the end
/// of the body.
///
/// Pixel dimensions are converted to EMUs at 9525 EMU per pixel (96 DPI).
pub fn insert_image(
    doc: &mut Document,
    bytes: Vec<u8>,
    format: ImageFormat,
    px_width: u32,
    px_height: u32,
) -> Result<()> {
    let uri = doc
        .package()
        .next_part_uri(well_known::MEDIA_DIR, "image", format.extension());
    doc.package_mut()
        .add_part(Part::new(uri.clone(), format.content_type(), bytes));

    let doc_uri = doc.document_part_uri();
    let target = uri.target_from(&doc_uri);
    let rel_id = doc
        .document_relationships_mut()?
        .add(rel_types::IMAGE, &target);

    let doc_pr_id = next_doc_pr_id(doc);
    let name = format!("Picture {}", doc_pr_id);
    let drawing = Drawing::inline_image(
        &rel_id,
        px_width as i64 * EMU_PER_PIXEL,
        px_height as i64 * EMU_PER_PIXEL,
        doc_pr_id,
        &name,
        None,
    );

    doc.body_mut()
        .add_paragraph(Paragraph::with_run(Run::with_drawing(drawing)));

    Ok(())
}

/// Drawing relationship ID addressed by alternate text, searching typed
/// runs (directly in paragraphs and inside hyperlinks)
fn find_drawing_rel_by_alt(doc: &Document, tag: &str) -> Option<String> {
    for para in doc.body().paragraphs() {
        for content in &para.content {
            let runs: Vec<&Run> = match content {
                ParagraphContent::Run(run) => vec![run],
                ParagraphContent::Hyperlink(link) => link.runs.iter().collect(),
                ParagraphContent::Unknown(_) => continue,
            };
            for run in runs {
                for drawing in run.drawings() {
                    if drawing.description() == Some(tag) {
                        return drawing.rel_id().map(String::from);
                    }
                }
            }
        }
    }
    None
}

/// Next unused wp:docPr id in the body
fn next_doc_pr_id(doc: &Document) -> u32 {
    let mut max = 0;
    for para in doc.body().paragraphs() {
        for run in para.runs() {
            for drawing in run.drawings() {
                if let Some(id) = drawing
                    .raw
                    .find_descendant("docPr")
                    .and_then(|e| e.attr("id"))
                    .and_then(|v| v.parse::<u32>().ok())
                {
                    max = max.max(id);
                }
            }
        }
    }
    max + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_replace_text_single_run() {
        let mut doc = Document::new();
        doc.add_paragraph("Hi there");

        let count = replace_text(&mut doc, "Hi", "Hello");

        assert_eq!(count, 1);
        assert_eq!(doc.text(), "Hello there");
    }

    #[test]
    fn test_replace_text_no_match_is_silent() {
        let mut doc = Document::new();
        doc.add_paragraph("nothing to see");

        assert_eq!(replace_text(&mut doc, "Hi", "Hello"), 0);
        assert_eq!(doc.text(), "nothing to see");
    }

    #[test]
    fn test_replace_text_empty_search_is_noop() {
        let mut doc = Document::new();
        doc.add_paragraph("abc");
        assert_eq!(replace_text(&mut doc, "", "x"), 0);
    }

    #[test]
    fn test_swapped_replacement_does_not_round_trip() {
        // When the document already contains the replacement text, applying
        // the substitution and then its swap does not restore the original.
        let mut doc = Document::new();
        doc.add_paragraph("Hello Hi");

        replace_text(&mut doc, "Hi", "Hello");
        assert_eq!(doc.text(), "Hello Hello");

        replace_text(&mut doc, "Hello", "Hi");
        assert_eq!(doc.text(), "Hi Hi"); // not "Hello Hi"
    }

    #[test]
    fn test_repeated_replacement_is_not_idempotent() {
        // A replacement containing its own search keeps growing
        let mut doc = Document::new();
        doc.add_paragraph("a");

        replace_text(&mut doc, "a", "aa");
        assert_eq!(doc.text(), "aa");

        replace_text(&mut doc, "a", "aa");
        assert_eq!(doc.text(), "aaaa");
    }

    #[test]
    fn test_image_format_from_extension() {
        assert_eq!(ImageFormat::from_extension("PNG"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_extension("jpg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_extension("tiff"), None);
    }

    #[test]
    fn test_insert_image_adds_part_rel_and_paragraph() {
        let mut doc = Document::new();
        doc.add_paragraph("intro");

        insert_image(&mut doc, vec![0x89, 0x50], ImageFormat::Png, 104, 83).unwrap();

        // Part exists
        let uri = crate::opc::PartUri::new("/word/media/image1.png").unwrap();
        assert!(doc.package().part(&uri).is_some());

        // Relationship exists and the drawing points at it
        let rels = doc.document_relationships().unwrap();
        let rel = rels.by_type(rel_types::IMAGE).unwrap();
        assert_eq!(rel.target, "media/image1.png");

        let last = doc.body().paragraphs().last().unwrap();
        let drawing = last.runs().next().unwrap().drawings().next().unwrap();
        assert_eq!(drawing.rel_id(), Some(rel.id.as_str()));
        assert_eq!(
            drawing.extent_emu(),
            Some((104 * EMU_PER_PIXEL, 83 * EMU_PER_PIXEL))
        );
    }

    #[test]
    fn test_blind_replace_overwrites_every_image_part() {
        let mut doc = Document::new();
        insert_image(&mut doc, vec![1], ImageFormat::Png, 10, 10).unwrap();
        insert_image(&mut doc, vec![2], ImageFormat::Jpeg, 10, 10).unwrap();

        let touched = replace_image_bytes(&mut doc, &[9, 9, 9], None).unwrap();
        assert_eq!(touched, 2);

        for (_, part) in doc.package().parts() {
            if part.is_image() {
                assert_eq!(part.data(), &[9, 9, 9]);
            }
        }
    }

    #[test]
    fn test_blind_replace_with_no_images_is_silent() {
        let mut doc = Document::new();
        doc.add_paragraph("text only");
        assert_eq!(replace_image_bytes(&mut doc, &[1], None).unwrap(), 0);
    }
}
