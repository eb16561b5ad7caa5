//! Integration test: package open/save semantics

use docx_weld::opc::rel_types;
use docx_weld::{Document, Error, Package, PartUri};

fn sample_doc_bytes() -> Vec<u8> {
    let mut doc = Document::new();
    doc.add_paragraph("Hello, World!");
    doc.add_paragraph("Second paragraph");
    doc.to_bytes().expect("serialize sample document")
}

#[test]
fn test_open_roundtrip() {
    let bytes = sample_doc_bytes();

    let pkg = Package::from_bytes(&bytes).expect("open package");

    // Main document part is reachable through the officeDocument relationship
    let doc_rel = pkg.relationships().by_type(rel_types::OFFICE_DOCUMENT);
    assert!(doc_rel.is_some());
    assert_eq!(doc_rel.unwrap().target, "word/document.xml");

    let doc_part = pkg.main_document_part().expect("main document part");
    let xml = doc_part.data_as_str().expect("document is UTF-8");
    assert!(xml.contains("Hello, World!"));

    // And content types know about it
    let uri = PartUri::new("/word/document.xml").unwrap();
    assert!(pkg.content_types().get(&uri).is_some());
}

#[test]
fn test_open_missing_path_is_not_found() {
    let err = Package::open("no/such/file.docx", true).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));

    let err = Document::open("no/such/file.docx", true).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn test_open_garbage_is_corrupt_package() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("garbage.docx");
    std::fs::write(&path, b"not a zip container at all").unwrap();

    let err = Package::open(&path, true).unwrap_err();
    assert!(matches!(err, Error::CorruptPackage(_)));
}

#[test]
fn test_save_and_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.docx");

    let mut doc = Document::new();
    doc.add_paragraph("persisted");
    doc.save(&path).expect("save");

    let doc2 = Document::open(&path, false).expect("reopen");
    assert_eq!(doc2.text(), "persisted");
}

#[test]
fn test_read_only_package_refuses_to_save() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ro.docx");
    std::fs::write(&path, sample_doc_bytes()).unwrap();

    let mut doc = Document::open(&path, false).expect("open read-only");
    let err = doc.save(&path).unwrap_err();
    assert!(matches!(err, Error::ReadOnly));

    // On-disk contents are untouched
    let doc2 = Document::open(&path, false).unwrap();
    assert!(doc2.text().contains("Hello, World!"));
}

#[test]
fn test_close_is_idempotent_and_blocks_save() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("closed.docx");

    let mut doc = Document::from_bytes(&sample_doc_bytes()).unwrap();
    doc.close();
    doc.close();
    assert!(doc.is_closed());

    let err = doc.save(&path).unwrap_err();
    assert!(matches!(err, Error::PackageClosed));
    assert!(!path.exists());
}

#[test]
fn test_save_overwrites_previous_file_atomically() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.docx");

    let mut first = Document::new();
    first.add_paragraph("version one");
    first.save(&path).unwrap();

    let mut second = Document::new();
    second.add_paragraph("version two");
    second.save(&path).unwrap();

    let reopened = Document::open(&path, false).unwrap();
    assert_eq!(reopened.text(), "version two");
}
