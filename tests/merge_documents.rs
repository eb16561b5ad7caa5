//! Integration test: merging documents

use docx_weld::document::{BlockContent, Styles};
use docx_weld::{
    insert_image, merge_files, Document, Error, ImageFormat, MergeOptions, PageSetup,
};
use std::path::{Path, PathBuf};

fn write_doc(dir: &Path, name: &str, paragraphs: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut doc = Document::new();
    for text in paragraphs {
        doc.add_paragraph(*text);
    }
    doc.save(&path).expect("save fixture");
    path
}

fn write_doc_with_style(dir: &Path, name: &str, text: &str, style_xml: &str) -> PathBuf {
    let path = dir.join(name);
    let mut doc = Document::new();
    doc.add_paragraph(text);
    let styles = Styles::from_xml(style_xml).expect("parse fixture styles");
    doc.set_styles(&styles).expect("set fixture styles");
    doc.save(&path).expect("save fixture");
    path
}

#[test]
fn test_merge_two_documents_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_doc(dir.path(), "a.docx", &["Hello"]);
    let b = write_doc(dir.path(), "b.docx", &["World"]);
    let dest = dir.path().join("merged.docx");

    let report = merge_files(&dest, &[&a, &b], &MergeOptions::default()).unwrap();

    assert_eq!(report.sources_merged, 2);
    assert_eq!(report.blocks_appended, 2);

    let merged = Document::open(&dest, false).unwrap();
    let blocks = &merged.body().content;

    // [Paragraph("Hello"), SectionBreak, Paragraph("World"), SectionBreak]
    assert_eq!(blocks.len(), 4);
    match (&blocks[0], &blocks[1], &blocks[2], &blocks[3]) {
        (
            BlockContent::Paragraph(p1),
            BlockContent::SectionBreak(_),
            BlockContent::Paragraph(p2),
            BlockContent::SectionBreak(_),
        ) => {
            assert_eq!(p1.text(), "Hello");
            assert_eq!(p2.text(), "World");
        }
        _ => panic!("unexpected block sequence"),
    }
}

#[test]
fn test_merged_block_count_is_sum_plus_markers() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_doc(dir.path(), "a.docx", &["one", "two", "three"]);
    let b = write_doc(dir.path(), "b.docx", &["four"]);
    let c = write_doc(dir.path(), "c.docx", &["five", "six"]);
    let dest = dir.path().join("merged.docx");

    merge_files(&dest, &[&a, &b, &c], &MergeOptions::default()).unwrap();

    let merged = Document::open(&dest, false).unwrap();
    assert_eq!(merged.body().content.len(), 6 + 3);
    assert_eq!(merged.paragraph_count(), 6);
    assert_eq!(
        merged.text(),
        "one\ntwo\nthree\nfour\nfive\nsix"
    );
}

#[test]
fn test_merge_without_section_breaks() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_doc(dir.path(), "a.docx", &["Hello"]);
    let b = write_doc(dir.path(), "b.docx", &["World"]);
    let dest = dir.path().join("merged.docx");

    let options = MergeOptions {
        section_break: None,
        ..Default::default()
    };
    merge_files(&dest, &[&a, &b], &options).unwrap();

    let merged = Document::open(&dest, false).unwrap();
    assert_eq!(merged.body().content.len(), 2);
    assert!(merged
        .body()
        .content
        .iter()
        .all(|b| matches!(b, BlockContent::Paragraph(_))));
}

#[test]
fn test_merge_with_template() {
    let dir = tempfile::tempdir().unwrap();
    let template = write_doc(dir.path(), "template.docx", &["Cover page"]);
    let a = write_doc(dir.path(), "a.docx", &["Body"]);
    let dest = dir.path().join("merged.docx");

    let options = MergeOptions {
        template: Some(template),
        ..Default::default()
    };
    merge_files(&dest, &[&a], &options).unwrap();

    let merged = Document::open(&dest, false).unwrap();
    assert_eq!(merged.text(), "Cover page\nBody");
}

#[test]
fn test_section_break_uses_configured_page_setup() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_doc(dir.path(), "a.docx", &["wide"]);
    let dest = dir.path().join("merged.docx");

    let options = MergeOptions {
        section_break: Some(PageSetup::landscape()),
        ..Default::default()
    };
    merge_files(&dest, &[&a], &options).unwrap();

    let merged = Document::open(&dest, false).unwrap();
    let Some(BlockContent::SectionBreak(sect)) = merged.body().content.last() else {
        panic!("expected trailing section break");
    };
    assert_eq!(sect.page_size(), Some((15840, 12240)));
}

#[test]
fn test_style_dedup_across_sources() {
    const QUOTE_A: &str = r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:style w:type="paragraph" w:styleId="Quote"><w:name w:val="Quote A"/></w:style>
</w:styles>"#;
    const QUOTE_B: &str = r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:style w:type="paragraph" w:styleId="Quote"><w:name w:val="Quote B"/></w:style>
  <w:style w:type="character" w:styleId="Emphasis"><w:name w:val="Emphasis"/></w:style>
</w:styles>"#;

    let dir = tempfile::tempdir().unwrap();
    let a = write_doc_with_style(dir.path(), "a.docx", "first", QUOTE_A);
    let b = write_doc_with_style(dir.path(), "b.docx", "second", QUOTE_B);
    let dest = dir.path().join("merged.docx");

    let report = merge_files(&dest, &[&a, &b], &MergeOptions::default()).unwrap();
    assert_eq!(report.styles_skipped, 1);

    let merged = Document::open(&dest, false).unwrap();
    let styles = merged.styles().unwrap().expect("merged styles part");

    let quotes: Vec<_> = styles
        .styles
        .iter()
        .filter(|s| s.style_id == "Quote")
        .collect();
    assert_eq!(quotes.len(), 1);

    // First writer wins
    assert_eq!(
        quotes[0].raw.find_descendant("name").unwrap().attr("w:val"),
        Some("Quote A")
    );
    assert!(styles.contains("Emphasis"));
}

#[test]
fn test_merged_image_references_resolve() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_doc(dir.path(), "a.docx", &["text only"]);

    let b = dir.path().join("b.docx");
    let mut doc_b = Document::new();
    doc_b.add_paragraph("with image");
    insert_image(&mut doc_b, vec![0x89, 0x50, 0x4e, 0x47], ImageFormat::Png, 10, 10).unwrap();
    doc_b.save(&b).unwrap();

    let dest = dir.path().join("merged.docx");
    let report = merge_files(&dest, &[&a, &b], &MergeOptions::default()).unwrap();

    assert_eq!(report.images_copied, 1);
    assert_eq!(report.unmapped_references, 0);

    let merged = Document::open(&dest, false).unwrap();
    let doc_uri = merged.document_part_uri();
    let rels = merged.document_relationships().expect("document rels");

    // Every drawing in the merged body points at a live image part
    let mut drawings = 0;
    for para in merged.paragraphs() {
        for run in para.runs() {
            for drawing in run.drawings() {
                drawings += 1;
                let rel_id = drawing.rel_id().expect("drawing has rel id");
                let rel = rels.get(rel_id).expect("relationship exists");
                let part_uri = doc_uri.resolve(&rel.target).unwrap();
                let part = merged.package().part(&part_uri).expect("image part exists");
                assert!(part.is_image());
            }
        }
    }
    assert_eq!(drawings, 1);
}

#[test]
fn test_failing_source_aborts_whole_merge() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_doc(dir.path(), "a.docx", &["Hello"]);
    let missing = dir.path().join("missing.docx");
    let dest = dir.path().join("merged.docx");

    let err = merge_files(&dest, &[a.clone(), missing], &MergeOptions::default()).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));

    // No partial destination was written
    assert!(!dest.exists());
}

#[test]
fn test_failing_merge_leaves_existing_destination_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_doc(dir.path(), "a.docx", &["Hello"]);
    let missing = dir.path().join("missing.docx");
    let dest = write_doc(dir.path(), "merged.docx", &["previous contents"]);

    let result = merge_files(&dest, &[a, missing], &MergeOptions::default());
    assert!(result.is_err());

    let untouched = Document::open(&dest, false).unwrap();
    assert_eq!(untouched.text(), "previous contents");
}

#[test]
fn test_source_section_breaks_are_dropped() {
    // A source that itself ends in a merge-produced section break should
    // contribute only its paragraphs when merged again.
    let dir = tempfile::tempdir().unwrap();
    let a = write_doc(dir.path(), "a.docx", &["Hello"]);
    let once = dir.path().join("once.docx");
    merge_files(&once, &[&a], &MergeOptions::default()).unwrap();

    let twice = dir.path().join("twice.docx");
    let report = merge_files(&twice, &[&once], &MergeOptions::default()).unwrap();

    // The section break inside once.docx is layout-local and excluded
    assert_eq!(report.blocks_appended, 1);

    let merged = Document::open(&twice, false).unwrap();
    assert_eq!(merged.body().content.len(), 2);
    assert_eq!(merged.text(), "Hello");
}
