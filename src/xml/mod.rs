//! XML utilities and raw element preservation

mod namespace;
mod raw;

pub use namespace::*;
pub use raw::{RawXmlElement, RawXmlNode};

pub(crate) use raw::attrs_of;

use quick_xml::events::BytesStart;

/// Helper to get an attribute value from a start tag by exact name
pub fn get_attr(element: &BytesStart, name: &str) -> Option<String> {
    element
        .attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.as_ref() == name.as_bytes())
        .map(|a| String::from_utf8_lossy(&a.value).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_constants() {
        assert!(W.contains("wordprocessingml"));
        assert!(R.contains("relationships"));
    }
}
