//! Error types for docx-weld

use std::path::PathBuf;
use thiserror::Error;

/// Main error type
#[derive(Debug, Error)]
pub enum Error {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("corrupt package: {0}")]
    CorruptPackage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML encoding error: {0}")]
    XmlEncoding(#[from] quick_xml::encoding::EncodingError),

    #[error("XML attribute error: {0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("package is read-only")]
    ReadOnly,

    #[error("package has been closed")]
    PackageClosed,

    #[error("missing required part: {0}")]
    MissingPart(String),

    #[error("invalid part URI: {0}")]
    InvalidPartUri(String),

    #[error("invalid relationship: {0}")]
    InvalidRelationship(String),

    #[error("missing attribute '{attr}' on element '{element}'")]
    MissingAttribute { element: String, attr: String },

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("unsupported image format: {0}")]
    UnsupportedImage(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
