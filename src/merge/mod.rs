//! Content merge engine
//!
//! Combines the bodies of an ordered list of source documents into one
//! destination, carrying styles, images, headers/footers, and hyperlinks
//! across and rewriting relationship IDs on the way. The destination is
//! assembled entirely in memory and persisted once at the end, so a source
//! failing to open never leaves a half-written file behind.

mod remap;
mod resources;

pub use remap::RelationshipMap;
pub use resources::{copy_external_links, merge_headers_footers, merge_images, merge_styles};

use crate::document::{BlockContent, Document, PageSetup, SectionProperties};
use crate::error::Result;
use std::path::{Path, PathBuf};

/// Merge configuration
#[derive(Clone, Debug)]
pub struct MergeOptions {
    /// Start the destination as a copy of this document instead of empty
    pub template: Option<PathBuf>,
    /// Page setup for the section-break marker appended after each source;
    /// `None` appends no markers
    pub section_break: Option<PageSetup>,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            template: None,
            section_break: Some(PageSetup::default()),
        }
    }
}

/// What a merge did, for diagnostics
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub sources_merged: usize,
    pub blocks_appended: usize,
    /// Duplicate style IDs skipped (first writer wins)
    pub styles_skipped: usize,
    pub images_copied: usize,
    pub headers_copied: usize,
    pub footers_copied: usize,
    pub external_links_copied: usize,
    /// References left pointing at unmapped IDs (integrity warnings)
    pub unmapped_references: usize,
}

/// Merge `sources`, in order, into a new document at `dest_path`.
///
/// Any source failing to open aborts the merge before anything is written.
pub fn merge_files<P: AsRef<Path>>(
    dest_path: impl AsRef<Path>,
    sources: &[P],
    options: &MergeOptions,
) -> Result<MergeReport> {
    let mut dest = match &options.template {
        Some(template) => Document::open(template, true)?,
        None => Document::new(),
    };

    let mut report = MergeReport::default();

    for source in sources {
        let mut src = Document::open(source.as_ref(), false)?;
        append_document(&mut dest, &src, options.section_break.as_ref(), &mut report)?;
        src.close();
    }

    dest.save(dest_path)?;

    log::debug!(
        "merged {} sources: {} blocks, {} images, {} duplicate styles skipped",
        report.sources_merged,
        report.blocks_appended,
        report.images_copied,
        report.styles_skipped
    );

    Ok(report)
}

/// Append one source document to the destination: resources first, then
/// the remapped body clone, then the optional section-break marker.
pub fn append_document(
    dest: &mut Document,
    src: &Document,
    section_break: Option<&PageSetup>,
    report: &mut MergeReport,
) -> Result<()> {
    report.styles_skipped += merge_styles(dest, src)?;

    let mut map = RelationshipMap::new();
    report.images_copied += merge_images(dest, src, &mut map)?;
    let (headers, footers) = merge_headers_footers(dest, src, &mut map)?;
    report.headers_copied += headers;
    report.footers_copied += footers;
    report.external_links_copied += copy_external_links(dest, src, &mut map)?;

    let mut unmapped = 0;
    for block in &src.body().content {
        // Source section layout is local to the source; drop it
        if matches!(block, BlockContent::SectionBreak(_)) {
            continue;
        }

        let mut clone = block.clone();
        if let BlockContent::Paragraph(para) = &mut clone {
            para.strip_section_properties();
        }

        unmapped += map.remap_block(&mut clone);
        dest.body_mut().push(clone);
        report.blocks_appended += 1;
    }

    if unmapped > 0 {
        log::warn!(
            "{} relationship reference(s) in merged content have no mapping and may point at missing parts",
            unmapped
        );
    }
    report.unmapped_references += unmapped;

    if let Some(setup) = section_break {
        dest.body_mut()
            .push(BlockContent::SectionBreak(SectionProperties::new(setup)));
    }

    report.sources_merged += 1;
    Ok(())
}
