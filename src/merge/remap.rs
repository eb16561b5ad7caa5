//! Relationship remapping for cloned content
//!
//! Relationship IDs are local to the part that owns them, so content cloned
//! from one package into another must have every embedded reference
//! rewritten to the destination's IDs. References absent from the map are
//! left as-is and counted; the caller reports them as integrity warnings.

use crate::document::{BlockContent, Paragraph, Run, RunContent};
use crate::xml::{RawXmlElement, RawXmlNode};
use std::collections::HashMap;

/// Attributes that carry relationship references
const REF_ATTRS: [&str; 3] = ["r:embed", "r:id", "r:link"];

/// Old source-local relationship ID -> new destination ID.
///
/// Built fresh for each merged source, never persisted.
#[derive(Clone, Debug, Default)]
pub struct RelationshipMap {
    map: HashMap<String, String>,
}

impl RelationshipMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an old -> new pairing
    pub fn insert(&mut self, old_id: impl Into<String>, new_id: impl Into<String>) {
        self.map.insert(old_id.into(), new_id.into());
    }

    /// Look up the destination ID for a source ID
    pub fn get(&self, old_id: &str) -> Option<&str> {
        self.map.get(old_id).map(|s| s.as_str())
    }

    /// Number of pairings
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Rewrite every relationship reference in a cloned block.
    ///
    /// Returns the number of references that looked like relationship IDs
    /// but had no mapping; those are left pointing at their old IDs.
    pub fn remap_block(&self, block: &mut BlockContent) -> usize {
        match block {
            BlockContent::Paragraph(para) => self.remap_paragraph(para),
            BlockContent::SectionBreak(_) => 0,
            BlockContent::Unknown(node) => self.remap_node(node),
        }
    }

    fn remap_paragraph(&self, para: &mut Paragraph) -> usize {
        let mut unmapped = 0;

        if let Some(props) = para.properties.as_mut() {
            unmapped += self.remap_element(props);
        }

        for content in &mut para.content {
            match content {
                crate::document::ParagraphContent::Run(run) => {
                    unmapped += self.remap_run(run);
                }
                crate::document::ParagraphContent::Hyperlink(link) => {
                    if let Some(r_id) = link.r_id.as_mut() {
                        match self.map.get(r_id.as_str()) {
                            Some(new_id) => *r_id = new_id.clone(),
                            None => {
                                if looks_like_rel_id(r_id) {
                                    unmapped += 1;
                                }
                            }
                        }
                    }
                    for run in &mut link.runs {
                        unmapped += self.remap_run(run);
                    }
                }
                crate::document::ParagraphContent::Unknown(node) => {
                    unmapped += self.remap_node(node);
                }
            }
        }

        unmapped
    }

    fn remap_run(&self, run: &mut Run) -> usize {
        let mut unmapped = 0;
        for content in &mut run.content {
            match content {
                RunContent::Drawing(drawing) => {
                    unmapped += self.remap_element(&mut drawing.raw);
                }
                RunContent::Unknown(node) => {
                    unmapped += self.remap_node(node);
                }
                _ => {}
            }
        }
        unmapped
    }

    fn remap_node(&self, node: &mut RawXmlNode) -> usize {
        match node {
            RawXmlNode::Element(e) => self.remap_element(e),
            _ => 0,
        }
    }

    /// Rewrite reference attributes throughout a raw subtree
    fn remap_element(&self, element: &mut RawXmlElement) -> usize {
        let mut unmapped = 0;
        element.visit_elements_mut(&mut |e| {
            for (key, value) in e.attributes.iter_mut() {
                if !REF_ATTRS.contains(&key.as_str()) {
                    continue;
                }
                match self.map.get(value.as_str()) {
                    Some(new_id) => *value = new_id.clone(),
                    None => {
                        if looks_like_rel_id(value) {
                            unmapped += 1;
                        }
                    }
                }
            }
        });
        unmapped
    }
}

/// Conventional relationship IDs are "rId" plus digits; anything else in a
/// reference attribute is not worth warning about
fn looks_like_rel_id(value: &str) -> bool {
    value
        .strip_prefix("rId")
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}
