//! Builds the per-load texture map from an archive's image entries.
//!
//! Every image in the archive is decoded, whether or not a material ends up
//! referencing it. Entries already in the session cache are reused without
//! touching the archive, and a broken image turns into the placeholder
//! instead of failing the load.

use std::sync::Arc;

use super::{decode_texture, TextureCache, TextureMap};
use crate::archive::{ArchiveIndex, ModelArchive};

/// Resolves every texture candidate in the archive.
///
/// Candidates are processed one at a time in archive order; when two entries
/// share a bare filename the first one wins.
///
/// # Examples
/// ```no_run
/// use objzip::archive::{ArchiveIndex, ModelArchive};
/// use objzip::textures::{build_texture_map, TextureCache};
///
/// let bytes = std::fs::read("model.zip").unwrap();
/// let archive = ModelArchive::from_bytes(bytes).unwrap();
/// let index = ArchiveIndex::classify(&archive);
/// let mut cache = TextureCache::new(256, 256);
/// let textures = build_texture_map(&archive, &index, &mut cache);
/// println!("{} textures", textures.len());
/// ```
pub fn build_texture_map(
    archive: &ModelArchive,
    index: &ArchiveIndex,
    cache: &mut TextureCache,
) -> TextureMap {
    let mut map = TextureMap::new();

    for entry in index.texture_entries(archive) {
        let name = entry.bare_name();
        if map.contains_key(name) {
            log::debug!("Skipping duplicate texture name {}", entry.path);
            continue;
        }

        if let Some(texture) = cache.get(name) {
            log::debug!("Texture cache hit: {}", name);
            map.insert(name.to_string(), texture);
            continue;
        }

        let decoded = archive
            .read_bytes(entry)
            .map_err(|e| e.to_string())
            .and_then(|bytes| decode_texture(name, &bytes));

        let texture = match decoded {
            Ok(texture) => {
                log::debug!(
                    "Decoded texture {} ({}x{})",
                    name,
                    texture.width,
                    texture.height
                );
                Arc::new(texture)
            }
            Err(e) => {
                log::warn!("Failed to decode texture {}: {}; using placeholder", entry.path, e);
                cache.placeholder()
            }
        };

        cache.insert(name, texture.clone());
        map.insert(name.to_string(), texture);
    }

    log::info!("Resolved {} textures", map.len());
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::tests::build_zip;
    use crate::textures::tests::encode_solid;

    fn load(files: &[(&str, &[u8])], cache: &mut TextureCache) -> TextureMap {
        let archive = ModelArchive::from_bytes(build_zip(files)).unwrap();
        let index = ArchiveIndex::classify(&archive);
        build_texture_map(&archive, &index, cache)
    }

    #[test]
    fn test_decodes_every_image_with_bare_names() {
        let png = encode_solid(1, 1, [255, 0, 0, 255], image::ImageFormat::Png);
        let bmp = encode_solid(1, 1, [0, 255, 0, 255], image::ImageFormat::Bmp);
        let mut cache = TextureCache::new(16, 8);
        let map = load(
            &[("tex/red.png", &png), ("C/green.bmp", &bmp), ("model.obj", b"")],
            &mut cache,
        );

        assert_eq!(map.len(), 2);
        assert_eq!(&map["red.png"].data[..4], &[255, 0, 0, 255]);
        assert_eq!(&map["green.bmp"].data[..4], &[0, 255, 0, 255]);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_bad_image_becomes_placeholder() {
        let mut cache = TextureCache::new(16, 8);
        let map = load(&[("broken.jpg", b"garbage")], &mut cache);
        assert!(map["broken.jpg"].is_placeholder());
        assert!(cache.get("broken.jpg").unwrap().is_placeholder());
    }

    #[test]
    fn test_cache_reuse_across_loads() {
        let png = encode_solid(1, 1, [1, 2, 3, 255], image::ImageFormat::Png);
        let mut cache = TextureCache::new(16, 8);
        let first = load(&[("a/wood.png", &png)], &mut cache);
        // Second archive holds different bytes under the same name; the
        // cached texture wins, so no decode happens.
        let second = load(&[("b/wood.png", b"not even an image")], &mut cache);
        assert!(Arc::ptr_eq(&first["wood.png"], &second["wood.png"]));
        assert!(!second["wood.png"].is_placeholder());
    }

    #[test]
    fn test_duplicate_names_first_wins() {
        let red = encode_solid(1, 1, [255, 0, 0, 255], image::ImageFormat::Png);
        let blue = encode_solid(1, 1, [0, 0, 255, 255], image::ImageFormat::Png);
        let mut cache = TextureCache::new(16, 8);
        let map = load(&[("x/a.png", &red), ("y/a.png", &blue)], &mut cache);
        assert_eq!(map.len(), 1);
        assert_eq!(&map["a.png"].data[..3], &[255, 0, 0]);
    }
}
