//! Part URI handling for OPC packages

use crate::error::{Error, Result};
use std::fmt;

/// A URI addressing one part inside a package.
///
/// Always stored as an absolute path with a leading '/', e.g.
/// `/word/document.xml`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartUri {
    path: String,
}

impl PartUri {
    /// Create a new PartUri, normalizing the leading '/' and rejecting
    /// obviously malformed paths.
    pub fn new(path: &str) -> Result<Self> {
        let path = path.trim();

        if path.is_empty() {
            return Err(Error::InvalidPartUri("empty path".into()));
        }

        let normalized = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };

        let normalized = normalized.trim_end_matches('/').to_string();

        if normalized.contains("//") {
            return Err(Error::InvalidPartUri(format!(
                "invalid path '{}': contains double slashes",
                path
            )));
        }

        Ok(Self { path: normalized })
    }

    /// Create a PartUri without validation (for internal constants)
    pub(crate) fn from_string_unchecked(path: String) -> Self {
        Self { path }
    }

    /// Get the path as a string slice
    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// File name portion of the path
    pub fn file_name(&self) -> Option<&str> {
        self.path.rsplit('/').next()
    }

    /// File extension, if any
    pub fn extension(&self) -> Option<&str> {
        self.file_name()
            .and_then(|name| name.rsplit('.').next())
            .filter(|ext| !ext.is_empty() && !ext.contains('/'))
    }

    /// Parent directory URI
    pub fn parent(&self) -> Option<PartUri> {
        let pos = self.path.rfind('/')?;
        if pos == 0 {
            None
        } else {
            Some(PartUri {
                path: self.path[..pos].to_string(),
            })
        }
    }

    /// The `.rels` URI describing this part's relationships.
    ///
    /// For `/word/document.xml`, returns `/word/_rels/document.xml.rels`
    pub fn relationships_uri(&self) -> PartUri {
        let file_name = self.file_name().unwrap_or("");
        let parent = self.parent().map(|p| p.path).unwrap_or_default();

        let rels_path = format!("{}/_rels/{}.rels", parent, file_name);
        PartUri { path: rels_path }
    }

    /// Resolve a relationship target against this URI.
    ///
    /// Targets in `.rels` files are relative to the owning part's directory:
    /// for `/word/document.xml` and `media/image1.png`, returns
    /// `/word/media/image1.png`.
    pub fn resolve(&self, relative: &str) -> Result<PartUri> {
        if relative.starts_with('/') {
            return PartUri::new(relative);
        }

        let base_dir = self.parent().map(|p| p.path).unwrap_or_default();
        let mut parts: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();

        for segment in relative.split('/') {
            match segment {
                "" | "." => continue,
                ".." => {
                    parts.pop();
                }
                s => parts.push(s),
            }
        }

        let resolved = format!("/{}", parts.join("/"));
        PartUri::new(&resolved)
    }

    /// The relationship target string addressing this part from `owner`.
    ///
    /// Inverse of [`resolve`](Self::resolve) for the common case where the
    /// target lives under the owner's directory; falls back to the absolute
    /// path otherwise.
    pub fn target_from(&self, owner: &PartUri) -> String {
        let base = owner
            .parent()
            .map(|p| format!("{}/", p.path))
            .unwrap_or_else(|| "/".to_string());
        match self.path.strip_prefix(&base) {
            Some(rel) => rel.to_string(),
            None => self.path.clone(),
        }
    }

    /// Whether this URI names a `.rels` file
    pub fn is_relationships(&self) -> bool {
        self.path.contains("/_rels/") && self.path.ends_with(".rels")
    }
}

impl fmt::Display for PartUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)
    }
}

/// Well-known part URIs
pub mod well_known {
    use super::PartUri;

    pub fn document() -> PartUri {
        PartUri::from_string_unchecked("/word/document.xml".into())
    }

    pub fn styles() -> PartUri {
        PartUri::from_string_unchecked("/word/styles.xml".into())
    }

    /// Directory holding image parts
    pub const MEDIA_DIR: &str = "/word/media";
}
