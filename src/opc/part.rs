//! Part representation for OPC packages

use crate::opc::{PartUri, Relationships};

/// A named, typed byte stream within a package.
///
/// XML parts carry their relationships alongside the data; binary parts
/// (images) usually have none.
#[derive(Clone, Debug)]
pub struct Part {
    uri: PartUri,
    content_type: String,
    data: Vec<u8>,
    relationships: Option<Relationships>,
}

impl Part {
    /// Create a new part
    pub fn new(uri: PartUri, content_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            uri,
            content_type: content_type.into(),
            data,
            relationships: None,
        }
    }

    /// Get the part URI
    pub fn uri(&self) -> &PartUri {
        &self.uri
    }

    /// Get the content type
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Whether this part holds image data
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }

    /// Get the raw data
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get data as UTF-8 string
    pub fn data_as_str(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.data)
    }

    /// Replace the part's bytes, keeping URI, content type, and
    /// relationships untouched
    pub fn set_data(&mut self, data: Vec<u8>) {
        self.data = data;
    }

    /// Get relationships
    pub fn relationships(&self) -> Option<&Relationships> {
        self.relationships.as_ref()
    }

    /// Set relationships
    pub fn set_relationships(&mut self, rels: Relationships) {
        self.relationships = Some(rels);
    }

    /// Relationships, created empty on first access
    pub fn ensure_relationships(&mut self) -> &mut Relationships {
        self.relationships
            .get_or_insert_with(Relationships::new)
    }

    /// The `.rels` URI for this part
    pub fn relationships_uri(&self) -> PartUri {
        self.uri.relationships_uri()
    }
}
