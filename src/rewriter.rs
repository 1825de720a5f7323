//! Provides the reference rewriter that turns texture names written inside
//! MTL text into texture handles.
//!
//! References in the wild are unreliable: foreign path separators, another
//! extension than the file in the archive actually has, different case. The
//! parsers never see the archive; they hand each name to a
//! [`ResourceResolver`] and always get a usable texture back.
//!
//! # Examples
//! ```
//! use std::sync::Arc;
//!
//! use objzip::rewriter::{ResourceResolver, StaticResolver};
//! use objzip::textures::{Texture, TextureMap};
//!
//! let mut map = TextureMap::new();
//! map.insert("wood.png".into(), Arc::new(Texture::from_rgba("wood.png", 0, 0, vec![])));
//! let placeholder = Arc::new(Texture::from_rgba("placeholder", 0, 0, vec![]));
//! let resolver = StaticResolver::new(map, placeholder.clone());
//!
//! assert_eq!(resolver.resolve("C:\\tex\\wood.png").name, "wood.png");
//! assert!(Arc::ptr_eq(&resolver.resolve("missing.png"), &placeholder));
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use crate::archive::{ArchiveIndex, ModelArchive};
use crate::formats::shared::path::{self, CANDIDATE_EXTENSIONS};
use crate::textures::{decode_texture, TextureHandle, TextureMap};

/// Maps a reference name from model text to a texture. Never fails.
pub trait ResourceResolver {
    /// Resolves `requested` to a texture, falling back to a placeholder.
    fn resolve(&self, requested: &str) -> TextureHandle;
}

/// Looks a name up in a texture map: exact bare filename first, then the
/// stem with each candidate extension.
fn lookup_in_map(map: &TextureMap, requested: &str) -> Option<TextureHandle> {
    let name = path::bare_filename(requested);
    if name.is_empty() {
        return None;
    }
    if let Some(texture) = map.get(name) {
        return Some(texture.clone());
    }

    let stem = path::file_stem(name);
    CANDIDATE_EXTENSIONS
        .iter()
        .find_map(|ext| map.get(&format!("{}.{}", stem, ext)))
        .cloned()
}

/// Resolver over a fixed texture map, without archive access.
///
/// Lets [`parse_materials`](crate::formats::mtl::parse_materials) run on MTL
/// text that does not come from an archive, with textures the caller
/// decoded itself.
pub struct StaticResolver {
    textures: TextureMap,
    placeholder: TextureHandle,
}

impl StaticResolver {
    pub fn new(textures: TextureMap, placeholder: TextureHandle) -> Self {
        Self {
            textures,
            placeholder,
        }
    }
}

impl ResourceResolver for StaticResolver {
    fn resolve(&self, requested: &str) -> TextureHandle {
        lookup_in_map(&self.textures, requested).unwrap_or_else(|| self.placeholder.clone())
    }
}

/// Resolver for one archive load.
///
/// Resolution order, first hit wins:
/// 1. exact bare filename in the texture map;
/// 2. the stem with `.jpeg`, `.jpg`, `.png`, `.bmp`, `.tga`, `.webp` in the map;
/// 3. an image entry in the archive matching by name, stem, or stem ignoring
///    case; the map's texture when that entry is already mapped, otherwise
///    decoded on demand;
/// 4. the placeholder.
///
/// Textures decoded in step 3 are kept for the rest of this load only.
pub struct ArchiveResolver<'a> {
    archive: &'a ModelArchive,
    index: &'a ArchiveIndex,
    textures: &'a TextureMap,
    placeholder: TextureHandle,
    ephemeral: RefCell<HashMap<usize, TextureHandle>>,
}

impl<'a> ArchiveResolver<'a> {
    pub fn new(
        archive: &'a ModelArchive,
        index: &'a ArchiveIndex,
        textures: &'a TextureMap,
        placeholder: TextureHandle,
    ) -> Self {
        Self {
            archive,
            index,
            textures,
            placeholder,
            ephemeral: RefCell::new(HashMap::new()),
        }
    }

    fn decode_from_archive(&self, requested: &str) -> Option<TextureHandle> {
        let entry = self.index.find_image(self.archive, requested)?;
        if let Some(texture) = self.textures.get(entry.bare_name()) {
            return Some(texture.clone());
        }

        if let Some(texture) = self.ephemeral.borrow().get(&entry.index) {
            return Some(texture.clone());
        }

        let texture = match self
            .archive
            .read_bytes(entry)
            .map_err(|e| e.to_string())
            .and_then(|bytes| decode_texture(entry.bare_name(), &bytes))
        {
            Ok(texture) => Arc::new(texture),
            Err(e) => {
                log::warn!("Failed to decode {} for {}: {}", entry.path, requested, e);
                self.placeholder.clone()
            }
        };

        self.ephemeral
            .borrow_mut()
            .insert(entry.index, texture.clone());
        Some(texture)
    }
}

impl ResourceResolver for ArchiveResolver<'_> {
    fn resolve(&self, requested: &str) -> TextureHandle {
        if let Some(texture) = lookup_in_map(self.textures, requested) {
            return texture;
        }

        if let Some(texture) = self.decode_from_archive(requested) {
            log::debug!("Resolved {} by archive scan", requested);
            return texture;
        }

        log::warn!("Texture {:?} not found; using placeholder", requested);
        self.placeholder.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::tests::build_zip;
    use crate::textures::tests::encode_solid;
    use crate::textures::{build_texture_map, Texture, TextureCache};

    fn tex(name: &str) -> TextureHandle {
        Arc::new(Texture::from_rgba(name, 1, 1, vec![0, 0, 0, 255]))
    }

    #[test]
    fn test_map_lookup_order() {
        let mut map = TextureMap::new();
        map.insert("wood.jpg".into(), tex("wood.jpg"));
        map.insert("wood.png".into(), tex("wood.png"));
        map.insert("stone.png".into(), tex("stone.png"));

        assert_eq!(lookup_in_map(&map, "a\\b/wood.png").unwrap().name, "wood.png");
        // `.jpg` precedes `.png` in the candidate list.
        assert_eq!(lookup_in_map(&map, "wood.dds").unwrap().name, "wood.jpg");
        assert_eq!(lookup_in_map(&map, "stone").unwrap().name, "stone.png");
        assert!(lookup_in_map(&map, "").is_none());
        assert!(lookup_in_map(&map, "dir/").is_none());
    }

    #[test]
    fn test_archive_scan_matches_case_insensitively() {
        let png = encode_solid(1, 1, [9, 9, 9, 255], image::ImageFormat::Png);
        let archive = ModelArchive::from_bytes(build_zip(&[("tex/Bark.PNG", &png)])).unwrap();
        let index = ArchiveIndex::classify(&archive);
        // An empty map forces step 3.
        let map = TextureMap::new();
        let placeholder = tex("placeholder");
        let resolver = ArchiveResolver::new(&archive, &index, &map, placeholder.clone());

        let first = resolver.resolve("bark.tga");
        assert!(!Arc::ptr_eq(&first, &placeholder));
        assert_eq!(&first.data[..3], &[9, 9, 9]);
        // Memoised for the rest of the load.
        assert!(Arc::ptr_eq(&first, &resolver.resolve("BARK.jpg")));
    }

    #[test]
    fn test_case_mismatch_reuses_mapped_texture() {
        let png = encode_solid(1, 1, [40, 50, 60, 255], image::ImageFormat::Png);
        let archive = ModelArchive::from_bytes(build_zip(&[("tex/wood.png", &png)])).unwrap();
        let index = ArchiveIndex::classify(&archive);
        let mut cache = TextureCache::new(8, 4);
        let map = build_texture_map(&archive, &index, &mut cache);
        let resolver = ArchiveResolver::new(&archive, &index, &map, cache.placeholder());

        let exact = resolver.resolve("wood.png");
        assert!(Arc::ptr_eq(&exact, &map["wood.png"]));
        assert!(Arc::ptr_eq(&exact, &resolver.resolve("Wood.png")));
        assert!(Arc::ptr_eq(&exact, &resolver.resolve("C:\\maps\\WOOD.tga")));
        assert!(resolver.ephemeral.borrow().is_empty());
    }

    #[test]
    fn test_resolution_is_total() {
        let png = encode_solid(1, 1, [0, 0, 0, 255], image::ImageFormat::Png);
        let archive = ModelArchive::from_bytes(build_zip(&[
            ("a.png", &png),
            ("bad.webp", b"nope"),
        ]))
        .unwrap();
        let index = ArchiveIndex::classify(&archive);
        let mut cache = TextureCache::new(8, 4);
        let map = build_texture_map(&archive, &index, &mut cache);
        let resolver = ArchiveResolver::new(&archive, &index, &map, cache.placeholder());

        for name in ["", " ", "/", "\\", "missing", "missing.png", "a.bmp", "bad", "..", "ä.png"] {
            let texture = resolver.resolve(name);
            assert!(texture.width > 0, "{:?} resolved to an empty texture", name);
        }
        assert!(resolver.resolve("").is_placeholder());
        assert!(resolver.resolve("missing.png").is_placeholder());
        assert!(!resolver.resolve("A.BMP").is_placeholder());
        assert!(resolver.resolve("bad.png").is_placeholder());
    }
}
