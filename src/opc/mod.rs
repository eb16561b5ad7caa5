//! Open Packaging Conventions layer
//!
//! A DOCX file is a ZIP container holding named parts, a content-type map,
//! and relationship files linking parts together. This module owns that
//! container level; the typed document model sits on top of it.

mod content_types;
mod package;
mod part;
mod part_uri;
mod relationships;

pub use content_types::{ContentTypes, MAIN_DOCUMENT, RELATIONSHIPS, STYLES, XML};
pub use package::Package;
pub use part::Part;
pub use part_uri::{well_known, PartUri};
pub use relationships::{rel_types, Relationship, Relationships, TargetMode};
