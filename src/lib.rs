//! # docx-weld
//!
//! A merge and edit engine for WordprocessingML (DOCX) packages.
//!
//! ## Features
//!
//! - Open, edit, and save DOCX containers (atomic save, round-trip
//!   preservation of content the typed model does not understand)
//! - Merge multiple documents into one: styles deduplicated by ID, images
//!   and headers/footers copied with relationship IDs rewritten, section
//!   breaks inserted between sources
//! - Find/replace text, replace image bytes in place, insert images
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use docx_weld::{merge_files, replace_text, Document, MergeOptions};
//!
//! // Merge two documents
//! merge_files("merged.docx", &["a.docx", "b.docx"], &MergeOptions::default())?;
//!
//! // Edit one in place
//! let mut doc = Document::open("merged.docx", true)?;
//! replace_text(&mut doc, "Hi", "Hello");
//! doc.save("merged.docx")?;
//! ```

pub mod document;
pub mod error;
pub mod merge;
pub mod mutate;
pub mod opc;
pub mod xml;

pub use document::{Body, Document, PageSetup, Paragraph, Run};
pub use error::{Error, Result};
pub use merge::{merge_files, MergeOptions, MergeReport, RelationshipMap};
pub use mutate::{insert_image, replace_image_bytes, replace_text, ImageFormat};
pub use opc::{Package, Part, PartUri};
