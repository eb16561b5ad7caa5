//! OPC package reader/writer
//!
//! Opens and persists the ZIP container. The whole package is loaded into
//! memory on open and written back in one pass on save; there is no
//! streaming mutation.

use crate::error::{Error, Result};
use crate::opc::relationships::rel_types;
use crate::opc::{ContentTypes, Part, PartUri, Relationships};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, Write};
use std::path::Path;
use zip::read::ZipArchive;
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

/// An open handle to a ZIP-based document container.
///
/// Parts are kept in a BTreeMap so the container is written in a stable
/// order. A package opened with `editable = false` refuses to save.
#[derive(Debug)]
pub struct Package {
    parts: BTreeMap<PartUri, Part>,
    /// Package-level relationships (/_rels/.rels)
    relationships: Relationships,
    /// Content types ([Content_Types].xml)
    content_types: ContentTypes,
    editable: bool,
    closed: bool,
}

impl Package {
    /// Create a new empty, editable package
    pub fn new() -> Self {
        Self {
            parts: BTreeMap::new(),
            relationships: Relationships::new(),
            content_types: ContentTypes::new(),
            editable: true,
            closed: false,
        }
    }

    /// Open a package from a file path.
    ///
    /// A missing path is `Error::NotFound`; a container that cannot be
    /// parsed is `Error::CorruptPackage`.
    pub fn open<P: AsRef<Path>>(path: P, editable: bool) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::NotFound(path.to_path_buf()));
        }

        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut package = Self::from_reader(reader)?;
        package.editable = editable;
        Ok(package)
    }

    /// Open a package from bytes (always editable)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let cursor = Cursor::new(bytes);
        Self::from_reader(cursor)
    }

    /// Open a package from a reader
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive =
            ZipArchive::new(reader).map_err(|e| Error::CorruptPackage(e.to_string()))?;
        let mut package = Self::new();

        package.content_types = Self::read_content_types(&mut archive)?;
        package.relationships = Self::read_package_rels(&mut archive)?;
        package.read_parts(&mut archive)?;
        package.read_part_relationships(&mut archive)?;

        Ok(package)
    }

    /// Persist the package to `path` atomically.
    ///
    /// The container is written to a temporary file in the destination
    /// directory and renamed over the target, so a failure mid-write leaves
    /// any prior file at `path` untouched.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if self.closed {
            return Err(Error::PackageClosed);
        }
        if !self.editable {
            return Err(Error::ReadOnly);
        }

        let path = path.as_ref();
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        self.write_to(tmp.as_file_mut())?;
        tmp.persist(path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }

    /// Serialize the package to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        if self.closed {
            return Err(Error::PackageClosed);
        }
        let mut buf = Vec::new();
        let cursor = Cursor::new(&mut buf);
        self.write_to(cursor)?;
        Ok(buf)
    }

    /// Write the package to a writer
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let options: FileOptions<()> =
            FileOptions::default().compression_method(CompressionMethod::Deflated);

        zip.start_file("[Content_Types].xml", options)?;
        self.content_types.write_to(&mut zip)?;

        if !self.relationships.is_empty() {
            zip.start_file("_rels/.rels", options)?;
            self.relationships.write_to(&mut zip)?;
        }

        for (uri, part) in &self.parts {
            let path = &uri.as_str()[1..]; // Remove leading '/'
            zip.start_file(path, options)?;
            zip.write_all(part.data())?;

            if let Some(rels) = part.relationships() {
                if !rels.is_empty() {
                    let rels_uri = uri.relationships_uri();
                    let rels_path = &rels_uri.as_str()[1..];
                    zip.start_file(rels_path, options)?;
                    rels.write_to(&mut zip)?;
                }
            }
        }

        zip.finish()?;
        Ok(())
    }

    /// Release the handle's in-memory contents. Idempotent; saving after
    /// close is an error.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.parts.clear();
        self.relationships = Relationships::new();
        self.content_types = ContentTypes::new();
        self.closed = true;
    }

    /// Whether `close` has been called
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Whether the package was opened for editing
    pub fn is_editable(&self) -> bool {
        self.editable
    }

    /// Get a part by URI
    pub fn part(&self, uri: &PartUri) -> Option<&Part> {
        self.parts.get(uri)
    }

    /// Get a mutable part by URI
    pub fn part_mut(&mut self, uri: &PartUri) -> Option<&mut Part> {
        self.parts.get_mut(uri)
    }

    /// Add a part, registering its content type override
    pub fn add_part(&mut self, part: Part) {
        let uri = part.uri().clone();
        self.content_types.add_override(&uri, part.content_type());
        self.parts.insert(uri, part);
    }

    /// Remove a part from the package
    pub fn remove_part(&mut self, uri: &PartUri) -> Option<Part> {
        self.content_types.remove_override(uri);
        self.parts.remove(uri)
    }

    /// Get all part URIs
    pub fn part_uris(&self) -> impl Iterator<Item = &PartUri> {
        self.parts.keys()
    }

    /// Get all parts
    pub fn parts(&self) -> impl Iterator<Item = (&PartUri, &Part)> {
        self.parts.iter()
    }

    /// All image parts, mutably (for in-place byte replacement)
    pub fn image_parts_mut(&mut self) -> impl Iterator<Item = &mut Part> {
        self.parts.values_mut().filter(|p| p.is_image())
    }

    /// Allocate the next unused numbered part URI in a directory.
    ///
    /// `next_part_uri("/word/media", "image", "png")` returns
    /// `/word/media/image3.png` when `image2.png` is the highest occupied
    /// suffix. Deterministic given the current part set.
    pub fn next_part_uri(&self, dir: &str, stem: &str, ext: &str) -> PartUri {
        let prefix = format!("{}/{}", dir, stem);
        let max = self
            .parts
            .keys()
            .filter_map(|u| {
                let rest = u.as_str().strip_prefix(&prefix)?;
                rest.split('.').next()?.parse::<u32>().ok()
            })
            .max()
            .unwrap_or(0);

        PartUri::from_string_unchecked(format!("{}{}.{}", prefix, max + 1, ext))
    }

    /// Get package-level relationships
    pub fn relationships(&self) -> &Relationships {
        &self.relationships
    }

    /// Get mutable package-level relationships
    pub fn relationships_mut(&mut self) -> &mut Relationships {
        &mut self.relationships
    }

    /// Get content types
    pub fn content_types(&self) -> &ContentTypes {
        &self.content_types
    }

    /// The URI of the main document part, located via the officeDocument
    /// relationship
    pub fn main_document_uri(&self) -> Option<PartUri> {
        let rel = self.relationships.by_type(rel_types::OFFICE_DOCUMENT)?;
        PartUri::new(&rel.target).ok()
    }

    /// Get the main document part
    pub fn main_document_part(&self) -> Option<&Part> {
        let uri = self.main_document_uri()?;
        self.parts.get(&uri)
    }

    /// Get the main document part mutably
    pub fn main_document_part_mut(&mut self) -> Option<&mut Part> {
        let uri = self.main_document_uri()?;
        self.parts.get_mut(&uri)
    }

    /// Add a package-level relationship
    pub fn add_relationship(&mut self, rel_type: &str, target: &str) -> String {
        self.relationships.add(rel_type, target)
    }

    // === Private methods ===

    fn read_content_types<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<ContentTypes> {
        let mut file = archive
            .by_name("[Content_Types].xml")
            .map_err(|_| Error::CorruptPackage("missing [Content_Types].xml".into()))?;

        let mut content = String::new();
        file.read_to_string(&mut content)?;

        ContentTypes::from_xml(&content)
    }

    fn read_package_rels<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Relationships> {
        match archive.by_name("_rels/.rels") {
            Ok(mut file) => {
                let mut content = String::new();
                file.read_to_string(&mut content)?;
                Relationships::from_xml(&content)
            }
            Err(_) => Ok(Relationships::new()),
        }
    }

    fn read_parts<R: Read + Seek>(&mut self, archive: &mut ZipArchive<R>) -> Result<()> {
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let name = file.name().to_string();

            if name.ends_with('/') {
                continue;
            }
            if name == "[Content_Types].xml" {
                continue;
            }
            // Relationship files are attached to their owning part below
            if name.contains("_rels/") && name.ends_with(".rels") {
                continue;
            }

            let uri = PartUri::new(&format!("/{}", name))?;

            let content_type = self
                .content_types
                .get(&uri)
                .unwrap_or("application/octet-stream")
                .to_string();

            let mut data = Vec::new();
            file.read_to_end(&mut data)?;

            let part = Part::new(uri.clone(), content_type, data);
            self.parts.insert(uri, part);
        }

        Ok(())
    }

    fn read_part_relationships<R: Read + Seek>(
        &mut self,
        archive: &mut ZipArchive<R>,
    ) -> Result<()> {
        let part_uris: Vec<PartUri> = self.parts.keys().cloned().collect();

        for uri in part_uris {
            let rels_path = uri.relationships_uri();
            let rels_zip_path = rels_path.as_str()[1..].to_string();

            if let Ok(mut file) = archive.by_name(&rels_zip_path) {
                let mut content = String::new();
                file.read_to_string(&mut content)?;
                let rels = Relationships::from_xml(&content)?;

                if let Some(part) = self.parts.get_mut(&uri) {
                    part.set_relationships(rels);
                }
            }
        }

        Ok(())
    }
}

impl Default for Package {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_package() {
        let pkg = Package::new();
        assert!(pkg.parts.is_empty());
        assert!(pkg.relationships.is_empty());
        assert!(pkg.is_editable());
    }

    #[test]
    fn test_add_part() {
        let mut pkg = Package::new();
        let uri = PartUri::new("/word/document.xml").unwrap();
        let part = Part::new(uri.clone(), "application/xml", b"<doc/>".to_vec());

        pkg.add_part(part);

        assert!(pkg.part(&uri).is_some());
        assert_eq!(pkg.part(&uri).unwrap().data(), b"<doc/>");
    }

    #[test]
    fn test_roundtrip_with_parts() {
        let mut pkg = Package::new();

        let doc_uri = PartUri::new("/word/document.xml").unwrap();
        let doc_part = Part::new(
            doc_uri.clone(),
            crate::opc::MAIN_DOCUMENT,
            b"<?xml version=\"1.0\"?><document/>".to_vec(),
        );
        pkg.add_part(doc_part);
        pkg.relationships_mut()
            .add(rel_types::OFFICE_DOCUMENT, "word/document.xml");

        let bytes = pkg.to_bytes().unwrap();
        let pkg2 = Package::from_bytes(&bytes).unwrap();

        assert!(pkg2.part(&doc_uri).is_some());
        assert!(pkg2.main_document_part().is_some());
    }

    #[test]
    fn test_open_missing_path_is_not_found() {
        let err = Package::open("definitely/not/here.docx", false).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_garbage_bytes_is_corrupt_package() {
        let err = Package::from_bytes(b"this is not a zip file").unwrap_err();
        assert!(matches!(err, Error::CorruptPackage(_)));
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut pkg = Package::new();
        pkg.close();
        pkg.close();
        assert!(pkg.is_closed());
        assert!(matches!(pkg.to_bytes(), Err(Error::PackageClosed)));
    }

    #[test]
    fn test_next_part_uri() {
        let mut pkg = Package::new();
        assert_eq!(
            pkg.next_part_uri("/word/media", "image", "png").as_str(),
            "/word/media/image1.png"
        );

        let uri = PartUri::new("/word/media/image4.jpeg").unwrap();
        pkg.add_part(Part::new(uri, "image/jpeg", vec![0xff]));
        assert_eq!(
            pkg.next_part_uri("/word/media", "image", "png").as_str(),
            "/word/media/image5.png"
        );
    }
}
