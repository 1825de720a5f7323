//! Provides in-memory access to a downloaded model archive.
//!
//! [`ModelArchive`] lists the ZIP's entries up front and reads their bytes on
//! demand. [`ArchiveIndex`] classifies the entries into OBJ, MTL and texture
//! candidates by extension, and lazily builds the filename lookup used when a
//! texture reference misses the per-load texture map.
//!
//! # Examples
//! ```
//! use objzip::archive::ModelArchive;
//! use objzip::error::LoadError;
//!
//! let result = ModelArchive::from_bytes(b"not a zip".to_vec());
//! assert!(matches!(result, Err(LoadError::Archive(_))));
//! ```

use std::cell::{OnceCell, RefCell};
use std::collections::HashMap;
use std::io::{Cursor, Read};

use zip::ZipArchive;

use crate::error::LoadError;
use crate::formats::shared::path;

/// One file record inside the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Full path of the entry inside the archive.
    pub path: String,
    pub is_dir: bool,
    /// Position of the entry in the ZIP central directory.
    pub index: usize,
}

impl ArchiveEntry {
    /// Returns the entry's path with every directory component removed.
    pub fn bare_name(&self) -> &str {
        path::bare_filename(&self.path)
    }
}

/// A loaded ZIP archive with lazily read entries.
pub struct ModelArchive {
    zip: RefCell<ZipArchive<Cursor<Vec<u8>>>>,
    entries: Vec<ArchiveEntry>,
}

impl ModelArchive {
    /// Opens a ZIP archive held in memory.
    ///
    /// # Errors
    /// Returns [`LoadError::Archive`] if the bytes are not a readable ZIP.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, LoadError> {
        let mut zip = ZipArchive::new(Cursor::new(bytes))?;

        let mut entries = Vec::with_capacity(zip.len());
        for index in 0..zip.len() {
            let file = zip.by_index_raw(index)?;
            entries.push(ArchiveEntry {
                path: file.name().to_string(),
                is_dir: file.is_dir(),
                index,
            });
        }

        Ok(Self {
            zip: RefCell::new(zip),
            entries,
        })
    }

    /// Returns every entry in archive order.
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /// Reads an entry's raw bytes.
    ///
    /// # Errors
    /// Returns [`LoadError::Archive`] if the entry is corrupt or unreadable.
    pub fn read_bytes(&self, entry: &ArchiveEntry) -> Result<Vec<u8>, LoadError> {
        let mut zip = self.zip.borrow_mut();
        let mut file = zip.by_index(entry.index)?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|e| LoadError::Archive(format!("Failed to read {}: {}", entry.path, e)))?;
        Ok(bytes)
    }

    /// Reads an entry as text. Invalid UTF-8 is replaced, not rejected,
    /// since OBJ/MTL exporters often write Latin-1 comments.
    ///
    /// # Errors
    /// Returns [`LoadError::Archive`] if the entry is corrupt or unreadable.
    pub fn read_text(&self, entry: &ArchiveEntry) -> Result<String, LoadError> {
        let bytes = self.read_bytes(entry)?;
        Ok(match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        })
    }
}

/// Per-load classification of archive entries.
///
/// Candidate lists hold indices into [`ModelArchive::entries`], in archive
/// order. Directories are never candidates.
pub struct ArchiveIndex {
    obj: Vec<usize>,
    mtl: Vec<usize>,
    textures: Vec<usize>,
    lookup: OnceCell<TextureLookup>,
}

impl ArchiveIndex {
    /// Classifies entries by extension, ignoring case.
    pub fn classify(archive: &ModelArchive) -> Self {
        let mut obj = Vec::new();
        let mut mtl = Vec::new();
        let mut textures = Vec::new();

        for (i, entry) in archive.entries().iter().enumerate() {
            if entry.is_dir {
                continue;
            }
            if path::has_extension(&entry.path, "obj") {
                obj.push(i);
            } else if path::has_extension(&entry.path, "mtl") {
                mtl.push(i);
            } else if path::is_image(&entry.path) {
                textures.push(i);
            }
        }

        log::debug!(
            "Archive index: {} obj, {} mtl, {} texture entries",
            obj.len(),
            mtl.len(),
            textures.len()
        );

        Self {
            obj,
            mtl,
            textures,
            lookup: OnceCell::new(),
        }
    }

    /// Returns the first OBJ entry, which is the model's geometry.
    pub fn primary_obj<'a>(&self, archive: &'a ModelArchive) -> Option<&'a ArchiveEntry> {
        self.obj.first().map(|&i| &archive.entries()[i])
    }

    /// Returns the first MTL entry, if any.
    pub fn primary_mtl<'a>(&self, archive: &'a ModelArchive) -> Option<&'a ArchiveEntry> {
        self.mtl.first().map(|&i| &archive.entries()[i])
    }

    /// Returns every texture candidate in archive order.
    pub fn texture_entries<'a>(&self, archive: &'a ModelArchive) -> Vec<&'a ArchiveEntry> {
        let entries = archive.entries();
        self.textures.iter().map(|&i| &entries[i]).collect()
    }

    pub fn obj_count(&self) -> usize {
        self.obj.len()
    }

    pub fn mtl_count(&self) -> usize {
        self.mtl.len()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Finds an image entry matching `requested` by bare filename, then by
    /// stem, then by stem ignoring case.
    ///
    /// The lookup tables are built on first call and reused for the rest of
    /// the load.
    pub fn find_image<'a>(
        &self,
        archive: &'a ModelArchive,
        requested: &str,
    ) -> Option<&'a ArchiveEntry> {
        let lookup = self
            .lookup
            .get_or_init(|| TextureLookup::build(archive, &self.textures));
        lookup.find(requested).map(|i| &archive.entries()[i])
    }
}

/// Filename lookup over the archive's image entries. First entry wins on
/// collisions.
struct TextureLookup {
    by_name: HashMap<String, usize>,
    by_stem: HashMap<String, usize>,
    by_lower_stem: HashMap<String, usize>,
}

impl TextureLookup {
    fn build(archive: &ModelArchive, textures: &[usize]) -> Self {
        let mut by_name = HashMap::new();
        let mut by_stem = HashMap::new();
        let mut by_lower_stem = HashMap::new();

        for &i in textures {
            let entry = &archive.entries()[i];
            let name = entry.bare_name();
            let stem = path::file_stem(name);
            by_name.entry(name.to_string()).or_insert(i);
            by_stem.entry(stem.to_string()).or_insert(i);
            by_lower_stem.entry(stem.to_lowercase()).or_insert(i);
        }

        Self {
            by_name,
            by_stem,
            by_lower_stem,
        }
    }

    fn find(&self, requested: &str) -> Option<usize> {
        let name = path::bare_filename(requested);
        if name.is_empty() {
            return None;
        }
        let stem = path::file_stem(name);
        self.by_name
            .get(name)
            .or_else(|| self.by_stem.get(stem))
            .or_else(|| self.by_lower_stem.get(&stem.to_lowercase()))
            .copied()
    }
}
