//! Provides the Wavefront OBJ geometry loader.
//!
//! Faces are triangulated and every object or material group becomes one
//! mesh under a single root node. Materials are bound by `usemtl` name
//! against a [`MaterialTable`] that was parsed beforehand; the OBJ's own
//! `mtllib` path is never followed.
//!
//! # Examples
//! ```
//! use objzip::formats::obj::parse_geometry;
//! use objzip::scene::resources::ResourceTracker;
//!
//! let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
//! let mut resources = ResourceTracker::new();
//! let root = parse_geometry("quad.obj", text, None, &mut resources).unwrap();
//! assert_eq!(root.mesh_count(), 1);
//! ```

use std::borrow::Cow;
use std::path::Path;

use crate::error::LoadError;
use crate::formats::mtl::MaterialTable;
use crate::scene::material::Material;
use crate::scene::resources::{ResourceKind, ResourceTracker};
use crate::scene::{Geometry, Mesh, Node};

/// A parsed material table and the filename it was read from.
#[derive(Debug, Clone, Copy)]
pub struct MaterialBinding<'a> {
    pub table: &'a MaterialTable,
    pub library_name: &'a str,
}

/// Returns true if any line declares a material library.
pub fn declares_material_library(text: &str) -> bool {
    text.lines()
        .any(|line| line.split_whitespace().next() == Some("mtllib"))
}

/// Parses OBJ text into a model.
///
/// With a binding, faces take the described material named by their
/// `usemtl` group, or a default Phong if the name is unknown. Without one,
/// every mesh gets a grey Lambert. Resources are allocated only after the
/// text parsed, so a failure leaves `resources` untouched.
pub fn parse_geometry(
    name: &str,
    text: &str,
    materials: Option<MaterialBinding<'_>>,
    resources: &mut ResourceTracker,
) -> Result<Node, LoadError> {
    let source = match materials {
        Some(binding) if !declares_material_library(text) => {
            log::debug!("{} has no mtllib line; binding {}", name, binding.library_name);
            Cow::Owned(format!("mtllib {}\n{}", binding.library_name, text))
        }
        _ => Cow::Borrowed(text),
    };

    let options = tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    };
    let (models, material_result) =
        tobj::load_obj_buf(&mut source.as_bytes(), &options, |_: &Path| match materials {
            Some(binding) => tobj::load_mtl_buf(&mut binding.table.library().as_bytes()),
            None => Err(tobj::LoadError::OpenFileFailed),
        })
        .map_err(|e| LoadError::Geometry(format!("Failed to parse OBJ: {}", e)))?;

    // Material ids in the models index this list.
    let group_names: Vec<String> = match material_result {
        Ok(list) => list.into_iter().map(|m| m.name).collect(),
        Err(e) => {
            if materials.is_some() {
                log::warn!("Material library unavailable to {}: {}", name, e);
            }
            Vec::new()
        }
    };

    let models: Vec<tobj::Model> = models
        .into_iter()
        .filter(|m| !m.mesh.indices.is_empty())
        .collect();
    if models.is_empty() {
        return Err(LoadError::NoGeometry);
    }

    let children = models
        .into_iter()
        .map(|model| {
            let material = match materials {
                None => Material::default_lambert(resources),
                Some(binding) => model
                    .mesh
                    .material_id
                    .and_then(|id| group_names.get(id))
                    .and_then(|group| binding.table.get(group))
                    .map(|desc| Material::from_description(desc, resources))
                    .unwrap_or_else(|| Material::default_phong(resources)),
            };
            let geometry = convert_mesh(model.mesh, resources);
            Node::mesh(Mesh::new(&model.name, geometry, vec![material]))
        })
        .collect();

    Ok(Node::group(name, children))
}

fn convert_mesh(mesh: tobj::Mesh, resources: &mut ResourceTracker) -> Geometry {
    let positions: Vec<[f32; 3]> = mesh
        .positions
        .chunks_exact(3)
        .map(|p| [p[0], p[1], p[2]])
        .collect();
    let normals = mesh
        .normals
        .chunks_exact(3)
        .map(|n| [n[0], n[1], n[2]])
        .collect();
    let uvs = mesh
        .texcoords
        .chunks_exact(2)
        .map(|t| [t[0], t[1]])
        .collect();

    Geometry {
        id: resources.allocate(ResourceKind::Geometry),
        positions: (!positions.is_empty()).then_some(positions),
        normals,
        uvs,
        indices: Some(mesh.indices),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::formats::mtl::parse_materials;
    use crate::rewriter::StaticResolver;
    use crate::scene::material::{Shading, DEFAULT_COLOR};
    use crate::textures::{Texture, TextureMap};

    const TWO_GROUPS: &str = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
usemtl red
f 1/1 2/2 3/3 4/4
usemtl ghost
f 1/1 3/3 4/4
";

    fn table(text: &str) -> MaterialTable {
        let placeholder = Arc::new(Texture::from_rgba("p", 1, 1, vec![0; 4]));
        parse_materials(text, &StaticResolver::new(TextureMap::new(), placeholder)).unwrap()
    }

    fn materials_of(root: &Node) -> Vec<Material> {
        let mut out = Vec::new();
        root.for_each_mesh(&mut |mesh| out.extend(mesh.materials.iter().cloned()));
        out
    }

    #[test]
    fn test_geometry_only_uses_grey_lambert() {
        let mut resources = ResourceTracker::new();
        let root = parse_geometry("m.obj", TWO_GROUPS, None, &mut resources).unwrap();
        assert_eq!(root.name, "m.obj");

        let materials = materials_of(&root);
        assert!(!materials.is_empty());
        for m in &materials {
            assert_eq!(m.shading, Shading::Lambert);
            assert_eq!(m.color, DEFAULT_COLOR);
        }
        assert_eq!(resources.live_count(), root.resource_ids().len());
    }

    #[test]
    fn test_binds_by_name_without_mtllib_line() {
        let table = table("newmtl red\nKd 1 0 0\nillum 1\n");
        let binding = MaterialBinding {
            table: &table,
            library_name: "model.mtl",
        };
        let mut resources = ResourceTracker::new();
        let root = parse_geometry("m.obj", TWO_GROUPS, Some(binding), &mut resources).unwrap();

        let materials = materials_of(&root);
        assert_eq!(materials.len(), 2);
        let red = materials.iter().find(|m| m.name == "red").unwrap();
        assert_eq!(red.color, [1.0, 0.0, 0.0]);
        assert_eq!(red.shading, Shading::Lambert);
        // Unknown group name falls back to a default Phong.
        assert!(materials
            .iter()
            .any(|m| m.name == "default" && matches!(m.shading, Shading::Phong { .. })));

        let mut triangles = 0;
        root.for_each_mesh(&mut |mesh| {
            triangles += mesh.geometry.triangle_count().unwrap();
            assert_eq!(mesh.geometry.uvs.len(), mesh.geometry.vertex_count());
        });
        assert_eq!(triangles, 3);
    }

    #[test]
    fn test_existing_mtllib_path_is_ignored() {
        let table = table("newmtl red\nKd 1 0 0\n");
        let binding = MaterialBinding {
            table: &table,
            library_name: "model.mtl",
        };
        let text = format!("mtllib C:\\elsewhere\\other.mtl\n{}", TWO_GROUPS);
        let mut resources = ResourceTracker::new();
        let root = parse_geometry("m.obj", &text, Some(binding), &mut resources).unwrap();
        assert!(materials_of(&root).iter().any(|m| m.name == "red"));
    }

    #[test]
    fn test_no_faces_is_no_geometry() {
        let mut resources = ResourceTracker::new();
        let err = parse_geometry("m.obj", "v 0 0 0\nv 1 0 0\n", None, &mut resources).unwrap_err();
        assert!(matches!(err, LoadError::NoGeometry));
        assert_eq!(resources.live_count(), 0);
    }

    #[test]
    fn test_bad_face_index_fails_without_allocating() {
        let mut resources = ResourceTracker::new();
        let err = parse_geometry("m.obj", "v 0 0 0\nf 1 2 3\n", None, &mut resources).unwrap_err();
        assert!(matches!(err, LoadError::Geometry(_)));
        assert_eq!(resources.live_count(), 0);
    }

    #[test]
    fn test_declares_material_library() {
        assert!(declares_material_library("# x\n  mtllib a.mtl\nv 0 0 0\n"));
        assert!(!declares_material_library("# mtllib a.mtl\nusemtl a\n"));
    }
}
