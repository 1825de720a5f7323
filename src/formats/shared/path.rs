//! Provides filename helpers for references found inside archives and MTL text.
//!
//! Paths written by authoring tools mix `/` and `\` separators, so nothing
//! here goes through `std::path`, which only knows the host convention.
//!
//! # Examples
//! ```
//! use objzip::formats::shared::path::{bare_filename, file_stem};
//!
//! assert_eq!(bare_filename("C:\\textures\\wood.png"), "wood.png");
//! assert_eq!(file_stem("textures/wood.png"), "wood");
//! ```

/// Image extensions treated as texture candidates, lowercase and without dot.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tga", "webp"];

/// Extensions tried, in order, when a reference's own extension misses.
pub const CANDIDATE_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "bmp", "tga", "webp"];

/// Strips every directory component, accepting both separators.
///
/// # Examples
/// ```
/// use objzip::formats::shared::path::bare_filename;
///
/// assert_eq!(bare_filename("a/b\\c.tga"), "c.tga");
/// assert_eq!(bare_filename("plain.jpg"), "plain.jpg");
/// assert_eq!(bare_filename(""), "");
/// ```
pub fn bare_filename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Returns the extension of the bare filename, without the dot.
///
/// A leading dot (`.hidden`) is not treated as an extension separator.
///
/// # Examples
/// ```
/// use objzip::formats::shared::path::extension;
///
/// assert_eq!(extension("dir/wood.PNG"), Some("PNG"));
/// assert_eq!(extension("README"), None);
/// assert_eq!(extension(".hidden"), None);
/// ```
pub fn extension(path: &str) -> Option<&str> {
    let name = bare_filename(path);
    match name.rfind('.') {
        Some(0) | None => None,
        Some(pos) => Some(&name[pos + 1..]),
    }
}

/// Returns the bare filename without its extension.
///
/// # Examples
/// ```
/// use objzip::formats::shared::path::file_stem;
///
/// assert_eq!(file_stem("C:\\maps\\stone.tga"), "stone");
/// assert_eq!(file_stem("archive.tar.gz"), "archive.tar");
/// assert_eq!(file_stem("noext"), "noext");
/// ```
pub fn file_stem(path: &str) -> &str {
    let name = bare_filename(path);
    match name.rfind('.') {
        Some(0) | None => name,
        Some(pos) => &name[..pos],
    }
}

/// Checks whether a path ends in the given extension, ignoring case.
pub fn has_extension(path: &str, ext: &str) -> bool {
    extension(path).is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

/// Checks whether a path names a supported image file.
///
/// # Examples
/// ```
/// use objzip::formats::shared::path::is_image;
///
/// assert!(is_image("tex/Diffuse.JPEG"));
/// assert!(!is_image("model.obj"));
/// ```
pub fn is_image(path: &str) -> bool {
    IMAGE_EXTENSIONS.iter().any(|ext| has_extension(path, ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_filename_mixed_separators() {
        assert_eq!(bare_filename("C:\\Users\\me/export\\tex/wood.png"), "wood.png");
        assert_eq!(bare_filename("trailing/"), "");
        assert_eq!(bare_filename("\\\\server\\share\\a.bmp"), "a.bmp");
    }

    #[test]
    fn test_stem_and_extension_ignore_directories() {
        // A dot in a directory name must not count as an extension.
        assert_eq!(extension("v1.2/texture"), None);
        assert_eq!(file_stem("v1.2/texture"), "texture");
        assert_eq!(extension("v1.2\\texture.webp"), Some("webp"));
    }

    #[test]
    fn test_is_image_covers_all_extensions() {
        for ext in IMAGE_EXTENSIONS {
            assert!(is_image(&format!("a.{}", ext)));
            assert!(is_image(&format!("a.{}", ext.to_uppercase())));
        }
        assert!(!is_image("a.mtl"));
        assert!(!is_image("png"));
    }
}
