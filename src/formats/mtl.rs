//! Provides the Wavefront MTL loader.
//!
//! Material files exported on one machine usually reference textures by the
//! author's absolute paths. [`preprocess_mtl`] reduces every texture directive
//! to a bare filename before [`parse_materials`] parses the text with `tobj`
//! and asks a [`ResourceResolver`] for each referenced map.
//!
//! # Examples
//! ```
//! use objzip::formats::mtl::preprocess_mtl;
//!
//! let text = "newmtl wood\nmap_Kd C:\\textures\\wood.png\n";
//! assert_eq!(preprocess_mtl(text), "newmtl wood\nmap_Kd wood.png\n");
//! ```

use std::collections::HashMap;

use crate::error::LoadError;
use crate::formats::shared::path;
use crate::rewriter::ResourceResolver;
use crate::scene::material::{
    MaterialDescription, Shading, DEFAULT_SHININESS, DEFAULT_SPECULAR,
};

/// Rewrites texture directives to bare filenames.
///
/// A line whose first token starts with `map_` or is `bump`, and which has
/// at least one argument, becomes `<directive> <bare name of last token>`.
/// Line terminators are kept and every other line is returned untouched.
pub fn preprocess_mtl(text: &str) -> String {
    let mut out = String::with_capacity(text.len());

    for line in text.split_inclusive('\n') {
        let (body, ending) = split_line_ending(line);
        match rewrite_texture_directive(body) {
            Some(rewritten) => {
                out.push_str(&rewritten);
                out.push_str(ending);
            }
            None => out.push_str(line),
        }
    }

    out
}

fn split_line_ending(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}

fn rewrite_texture_directive(line: &str) -> Option<String> {
    let mut tokens = line.split_whitespace();
    let directive = tokens.next()?;
    if !(directive.starts_with("map_") || directive == "bump") {
        return None;
    }

    let name = path::bare_filename(tokens.last()?);
    if name.is_empty() {
        return None;
    }
    Some(format!("{} {}", directive, name))
}

/// Materials parsed from one MTL file, looked up by `newmtl` name.
#[derive(Debug, Clone, Default)]
pub struct MaterialTable {
    materials: Vec<MaterialDescription>,
    by_name: HashMap<String, usize>,
    library: String,
}

impl MaterialTable {
    pub fn get(&self, name: &str) -> Option<&MaterialDescription> {
        self.by_name.get(name).map(|&i| &self.materials[i])
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// The preprocessed MTL text the table was parsed from.
    pub fn library(&self) -> &str {
        &self.library
    }
}

/// Preprocesses and parses MTL text, resolving every texture reference.
///
/// Fails only if the text cannot be parsed as MTL; missing textures resolve
/// to the placeholder.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use objzip::formats::mtl::parse_materials;
/// use objzip::rewriter::StaticResolver;
/// use objzip::textures::{Texture, TextureMap};
///
/// let placeholder = Arc::new(Texture::from_rgba("placeholder", 1, 1, vec![255; 4]));
/// let resolver = StaticResolver::new(TextureMap::new(), placeholder.clone());
/// let table = parse_materials("newmtl red\nKd 1 0 0\nmap_Kd /abs/red.png\n", &resolver).unwrap();
///
/// let red = table.get("red").unwrap();
/// assert_eq!(red.color, [1.0, 0.0, 0.0]);
/// assert!(Arc::ptr_eq(red.map.as_ref().unwrap(), &placeholder));
/// ```
pub fn parse_materials(
    text: &str,
    resolver: &dyn ResourceResolver,
) -> Result<MaterialTable, LoadError> {
    let library = preprocess_mtl(text);
    let (parsed, _) = tobj::load_mtl_buf(&mut library.as_bytes())
        .map_err(|e| LoadError::Material(format!("Failed to parse MTL: {}", e)))?;

    let mut table = MaterialTable {
        materials: Vec::with_capacity(parsed.len()),
        by_name: HashMap::new(),
        library: String::new(),
    };

    for material in &parsed {
        let description = describe(material, resolver);
        log::debug!(
            "Material {}: {:?}, map {:?}, normal map {:?}",
            description.name,
            description.shading,
            description.map_name,
            description.normal_map.as_ref().map(|t| t.name.as_str())
        );
        if table.by_name.contains_key(&description.name) {
            log::warn!("Duplicate material {}; keeping the first", description.name);
            continue;
        }
        table
            .by_name
            .insert(description.name.clone(), table.materials.len());
        table.materials.push(description);
    }

    table.library = library;
    Ok(table)
}

fn describe(material: &tobj::Material, resolver: &dyn ResourceResolver) -> MaterialDescription {
    let param = |key: &str| -> Option<f32> {
        material
            .unknown_param
            .get(key)
            .and_then(|v| v.split_whitespace().next())
            .and_then(|v| v.parse().ok())
    };

    let shading = match material.illumination_model {
        Some(0) => Shading::Unlit,
        Some(1) => Shading::Lambert,
        _ if material.unknown_param.contains_key("Pr")
            || material.unknown_param.contains_key("Pm") =>
        {
            Shading::Standard {
                roughness: param("Pr").unwrap_or(1.0),
                metalness: param("Pm").unwrap_or(0.0),
            }
        }
        _ => Shading::Phong {
            specular: material.specular.unwrap_or(DEFAULT_SPECULAR),
            shininess: material.shininess.unwrap_or(DEFAULT_SHININESS),
        },
    };

    let opacity = material
        .dissolve
        .or_else(|| param("Tr").map(|tr| 1.0 - tr))
        .unwrap_or(1.0)
        .clamp(0.0, 1.0);

    let map_name = material.diffuse_texture.clone().filter(|n| !n.is_empty());
    let map = map_name.as_deref().map(|name| resolver.resolve(name));
    let normal_map = material
        .normal_texture
        .as_deref()
        .filter(|n| !n.is_empty())
        .map(|name| resolver.resolve(name));

    MaterialDescription {
        name: material.name.clone(),
        shading,
        color: material.diffuse.unwrap_or([1.0, 1.0, 1.0]),
        opacity,
        transparent: opacity < 1.0,
        map,
        normal_map,
        map_name,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::rewriter::StaticResolver;
    use crate::textures::{Texture, TextureHandle, TextureMap};

    fn resolver() -> (StaticResolver, TextureHandle) {
        let mut map = TextureMap::new();
        map.insert(
            "wood.png".into(),
            Arc::new(Texture::from_rgba("wood.png", 1, 1, vec![0, 0, 0, 255])),
        );
        let placeholder = Arc::new(Texture::from_rgba("placeholder", 1, 1, vec![128; 4]));
        (StaticResolver::new(map, placeholder.clone()), placeholder)
    }

    #[test]
    fn test_preprocess_rewrites_only_texture_directives() {
        let text = "# comment C:\\x\\y.png\r\n\
                    newmtl a\r\n\
                    Kd 1 0 0\r\n\
                    map_Kd -s 1 1 1 /home/me/tex/wood.png\r\n\
                    bump ..\\n.png\r\n\
                    map_Bump\r\n\
                    bumpiness 3\n\
                    \x20\x20map_d dir/alpha.tga";
        let expected = "# comment C:\\x\\y.png\r\n\
                        newmtl a\r\n\
                        Kd 1 0 0\r\n\
                        map_Kd wood.png\r\n\
                        bump n.png\r\n\
                        map_Bump\r\n\
                        bumpiness 3\n\
                        map_d alpha.tga";
        assert_eq!(preprocess_mtl(text), expected);
    }

    #[test]
    fn test_preprocess_windows_path() {
        assert_eq!(
            preprocess_mtl("map_Kd C:\\textures\\wood.png\n"),
            "map_Kd wood.png\n"
        );
    }

    #[test]
    fn test_shading_from_directives() {
        let text = "newmtl flat\nillum 0\nKd 1 0 0\n\
                    newmtl matte\nillum 1\n\
                    newmtl pbr\nillum 2\nPr 0.1\nPm 0.9\n\
                    newmtl shiny\nillum 2\nKs 0.5 0.5 0.5\nNs 80\n";
        let (resolver, _) = resolver();
        let table = parse_materials(text, &resolver).unwrap();

        assert_eq!(table.len(), 4);
        assert_eq!(table.get("flat").unwrap().shading, Shading::Unlit);
        assert_eq!(table.get("flat").unwrap().color, [1.0, 0.0, 0.0]);
        assert_eq!(table.get("matte").unwrap().shading, Shading::Lambert);
        assert_eq!(
            table.get("pbr").unwrap().shading,
            Shading::Standard {
                roughness: 0.1,
                metalness: 0.9
            }
        );
        assert_eq!(
            table.get("shiny").unwrap().shading,
            Shading::Phong {
                specular: [0.5, 0.5, 0.5],
                shininess: 80.0
            }
        );
    }

    #[test]
    fn test_textures_and_opacity() {
        let text = "newmtl a\nmap_Kd D:\\art\\wood.jpg\nd 0.25\n\
                    newmtl b\nmap_Kd nothing_here.png\n\
                    newmtl c\nKd 0.5 0.5 0.5\nmap_Bump C:\\art\\wood.png\n";
        let (resolver, placeholder) = resolver();
        let table = parse_materials(text, &resolver).unwrap();

        let a = table.get("a").unwrap();
        assert_eq!(a.map_name.as_deref(), Some("wood.jpg"));
        assert_eq!(a.map.as_ref().unwrap().name, "wood.png");
        assert_eq!(a.opacity, 0.25);
        assert!(a.transparent);

        let b = table.get("b").unwrap();
        assert!(Arc::ptr_eq(b.map.as_ref().unwrap(), &placeholder));
        assert_eq!(b.opacity, 1.0);

        let c = table.get("c").unwrap();
        assert!(c.map.is_none());
        assert_eq!(c.normal_map.as_ref().unwrap().name, "wood.png");
        assert!(a.normal_map.is_none());
        assert!(!c.transparent);
        assert!(table.library().contains("map_Kd wood.jpg"));
    }
}
