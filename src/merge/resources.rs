//! Style and resource copying between packages
//!
//! Styles are deduplicated by ID (first writer wins); image, header, and
//! footer parts are copied unconditionally, each copy getting a fresh part
//! name and a fresh relationship on the destination document part.

use crate::document::{Document, Styles};
use crate::error::Result;
use crate::merge::RelationshipMap;
use crate::opc::{rel_types, well_known, Part, TargetMode};

/// Merge the source's style definitions into the destination.
///
/// Returns the number of duplicate style IDs skipped.
pub fn merge_styles(dest: &mut Document, src: &Document) -> Result<usize> {
    let Some(src_styles) = src.styles()? else {
        return Ok(0);
    };

    let mut dest_styles = match dest.styles()? {
        Some(s) => s,
        // First contributor also supplies docDefaults and friends
        None => Styles {
            prelude: src_styles.prelude.clone(),
            styles: Vec::new(),
        },
    };

    let skipped = dest_styles.merge_from(&src_styles);
    dest.set_styles(&dest_styles)?;
    Ok(skipped)
}

/// Copy every image part referenced by the source document part.
///
/// No dedup by content: each source image becomes a fresh destination part.
/// Old -> new relationship IDs are recorded in `map`.
pub fn merge_images(
    dest: &mut Document,
    src: &Document,
    map: &mut RelationshipMap,
) -> Result<usize> {
    let src_doc_uri = src.document_part_uri();
    let Some(src_rels) = src.document_relationships() else {
        return Ok(0);
    };

    let image_rels: Vec<(String, String)> = src_rels
        .all_by_type(rel_types::IMAGE)
        .into_iter()
        .map(|r| (r.id.clone(), r.target.clone()))
        .collect();

    let dest_doc_uri = dest.document_part_uri();
    let mut copied = 0;

    for (old_id, target) in image_rels {
        let part_uri = src_doc_uri.resolve(&target)?;
        let Some(part) = src.package().part(&part_uri) else {
            log::warn!("image relationship {} targets missing part {}", old_id, part_uri);
            continue;
        };

        let ext = part_uri.extension().unwrap_or("bin").to_string();
        let new_uri = dest
            .package()
            .next_part_uri(well_known::MEDIA_DIR, "image", &ext);
        dest.package_mut().add_part(Part::new(
            new_uri.clone(),
            part.content_type().to_string(),
            part.data().to_vec(),
        ));

        let new_target = new_uri.target_from(&dest_doc_uri);
        let new_id = dest
            .document_relationships_mut()?
            .add(rel_types::IMAGE, &new_target);

        log::debug!("copied image {} -> {} ({} -> {})", part_uri, new_uri, old_id, new_id);
        map.insert(old_id, new_id);
        copied += 1;
    }

    Ok(copied)
}

/// Copy every header and footer part of the source, unconditionally.
///
/// Returns (headers, footers) copied; old -> new IDs land in `map`.
pub fn merge_headers_footers(
    dest: &mut Document,
    src: &Document,
    map: &mut RelationshipMap,
) -> Result<(usize, usize)> {
    let headers = copy_referenced_parts(dest, src, rel_types::HEADER, "header", map)?;
    let footers = copy_referenced_parts(dest, src, rel_types::FOOTER, "footer", map)?;
    Ok((headers, footers))
}

/// Copy the source's external relationships (hyperlinks) so cloned content
/// that references them stays resolvable.
pub fn copy_external_links(
    dest: &mut Document,
    src: &Document,
    map: &mut RelationshipMap,
) -> Result<usize> {
    let Some(src_rels) = src.document_relationships() else {
        return Ok(0);
    };

    let external: Vec<(String, String, String)> = src_rels
        .iter()
        .filter(|r| r.target_mode == TargetMode::External)
        .map(|r| (r.id.clone(), r.rel_type.clone(), r.target.clone()))
        .collect();

    let mut copied = 0;
    for (old_id, rel_type, target) in external {
        let new_id = dest
            .document_relationships_mut()?
            .add_external(&rel_type, &target);
        map.insert(old_id, new_id);
        copied += 1;
    }

    Ok(copied)
}

fn copy_referenced_parts(
    dest: &mut Document,
    src: &Document,
    rel_type: &str,
    stem: &str,
    map: &mut RelationshipMap,
) -> Result<usize> {
    let src_doc_uri = src.document_part_uri();
    let Some(src_rels) = src.document_relationships() else {
        return Ok(0);
    };

    let rels: Vec<(String, String)> = src_rels
        .all_by_type(rel_type)
        .into_iter()
        .map(|r| (r.id.clone(), r.target.clone()))
        .collect();

    let dest_doc_uri = dest.document_part_uri();
    let mut copied = 0;

    for (old_id, target) in rels {
        let part_uri = src_doc_uri.resolve(&target)?;
        let Some(part) = src.package().part(&part_uri) else {
            log::warn!("{} relationship {} targets missing part {}", stem, old_id, part_uri);
            continue;
        };

        let new_uri = dest.package().next_part_uri("/word", stem, "xml");
        dest.package_mut().add_part(Part::new(
            new_uri.clone(),
            part.content_type().to_string(),
            part.data().to_vec(),
        ));

        let new_target = new_uri.target_from(&dest_doc_uri);
        let new_id = dest.document_relationships_mut()?.add(rel_type, &new_target);

        map.insert(old_id, new_id);
        copied += 1;
    }

    Ok(copied)
}
