//! Integration test: in-place mutation through a save/reopen cycle

use docx_weld::document::{Drawing, Paragraph, Run, EMU_PER_PIXEL};
use docx_weld::opc::{rel_types, Part, PartUri};
use docx_weld::{insert_image, replace_image_bytes, replace_text, Document, ImageFormat};

#[test]
fn test_replace_text_survives_save_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc.docx");

    let mut doc = Document::new();
    doc.add_paragraph("Hi there");
    doc.save(&path).unwrap();

    let mut doc = Document::open(&path, true).unwrap();
    let count = replace_text(&mut doc, "Hi", "Hello");
    assert_eq!(count, 1);
    doc.save(&path).unwrap();

    let reopened = Document::open(&path, false).unwrap();
    assert_eq!(reopened.text(), "Hello there");
}

#[test]
fn test_replace_text_zero_matches_preserves_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc.docx");

    let mut doc = Document::new();
    doc.add_paragraph("untouched content");
    doc.save(&path).unwrap();

    let mut doc = Document::open(&path, true).unwrap();
    assert_eq!(replace_text(&mut doc, "Hi", "Hello"), 0);
    doc.save(&path).unwrap();

    let reopened = Document::open(&path, false).unwrap();
    assert_eq!(reopened.text(), "untouched content");
}

#[test]
fn test_replace_text_inside_preserved_table() {
    // Tables are preserved as raw content; their text nodes are still
    // reachable by the mutator.
    let mut doc = Document::new();
    doc.add_paragraph("Hi outside");
    let bytes = doc.to_bytes().unwrap();

    // Splice a table into the document part by hand
    let xml = {
        let pkg = docx_weld::Package::from_bytes(&bytes).unwrap();
        let part = pkg.main_document_part().unwrap();
        part.data_as_str().unwrap().replace(
            "</w:body>",
            "<w:tbl><w:tr><w:tc><w:p><w:r><w:t>Hi inside</w:t></w:r></w:p></w:tc></w:tr></w:tbl></w:body>",
        )
    };
    let mut pkg = docx_weld::Package::from_bytes(&bytes).unwrap();
    pkg.main_document_part_mut()
        .unwrap()
        .set_data(xml.into_bytes());
    let mut doc = Document::from_package(pkg).unwrap();

    let count = replace_text(&mut doc, "Hi", "Hello");
    assert_eq!(count, 2);

    let out = doc.to_bytes().unwrap();
    let reopened = Document::from_bytes(&out).unwrap();
    assert!(reopened.text().contains("Hello outside"));
    let part = reopened.package().main_document_part().unwrap();
    assert!(part.data_as_str().unwrap().contains("Hello inside"));
}

#[test]
fn test_insert_image_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc.docx");

    let mut doc = Document::new();
    doc.add_paragraph("before the picture");
    insert_image(&mut doc, vec![1, 2, 3, 4], ImageFormat::Jpeg, 200, 100).unwrap();
    doc.save(&path).unwrap();

    let reopened = Document::open(&path, false).unwrap();

    let uri = PartUri::new("/word/media/image1.jpeg").unwrap();
    let part = reopened.package().part(&uri).expect("image part");
    assert_eq!(part.data(), &[1, 2, 3, 4]);
    assert_eq!(part.content_type(), "image/jpeg");

    let drawing = reopened
        .paragraphs()
        .flat_map(|p| p.runs())
        .flat_map(|r| r.drawings())
        .next()
        .expect("drawing in body");
    assert_eq!(
        drawing.extent_emu(),
        Some((200 * EMU_PER_PIXEL, 100 * EMU_PER_PIXEL))
    );

    let rel_id = drawing.rel_id().unwrap();
    let rel = reopened
        .document_relationships()
        .unwrap()
        .get(rel_id)
        .expect("image relationship");
    assert_eq!(rel.target, "media/image1.jpeg");
}

#[test]
fn test_blind_image_replace_touches_every_part() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc.docx");

    let mut doc = Document::new();
    insert_image(&mut doc, vec![1], ImageFormat::Png, 10, 10).unwrap();
    insert_image(&mut doc, vec![2], ImageFormat::Png, 10, 10).unwrap();
    doc.save(&path).unwrap();

    let mut doc = Document::open(&path, true).unwrap();
    let touched = replace_image_bytes(&mut doc, &[7, 7], None).unwrap();
    assert_eq!(touched, 2);
    doc.save(&path).unwrap();

    let reopened = Document::open(&path, false).unwrap();
    for (_, part) in reopened.package().parts() {
        if part.is_image() {
            assert_eq!(part.data(), &[7, 7]);
        }
    }
}

#[test]
fn test_alt_text_replace_touches_only_the_addressed_part() {
    let mut doc = Document::new();

    // One image inserted normally (no alt text)
    insert_image(&mut doc, vec![1], ImageFormat::Png, 10, 10).unwrap();

    // A second image addressed by alternate text, wired up by hand
    let uri = doc
        .package()
        .next_part_uri("/word/media", "image", "png");
    doc.package_mut()
        .add_part(Part::new(uri.clone(), "image/png", vec![2]));
    let doc_uri = doc.document_part_uri();
    let target = uri.target_from(&doc_uri);
    let rel_id = doc
        .document_relationships_mut()
        .unwrap()
        .add(rel_types::IMAGE, &target);
    let drawing = Drawing::inline_image(&rel_id, 95250, 95250, 2, "Picture 2", Some("logo"));
    doc.body_mut()
        .add_paragraph(Paragraph::with_run(Run::with_drawing(drawing)));

    let touched = replace_image_bytes(&mut doc, &[9, 9], Some("logo")).unwrap();
    assert_eq!(touched, 1);

    let plain = doc
        .package()
        .part(&PartUri::new("/word/media/image1.png").unwrap())
        .unwrap();
    assert_eq!(plain.data(), &[1]);

    let tagged = doc.package().part(&uri).unwrap();
    assert_eq!(tagged.data(), &[9, 9]);
}

#[test]
fn test_alt_text_with_no_match_is_silent() {
    let mut doc = Document::new();
    insert_image(&mut doc, vec![1], ImageFormat::Png, 10, 10).unwrap();

    let touched = replace_image_bytes(&mut doc, &[9], Some("no such tag")).unwrap();
    assert_eq!(touched, 0);
}
