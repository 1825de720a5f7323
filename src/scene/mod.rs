//! Provides the scene graph the viewer draws.
//!
//! A loaded model is a tree of [`Node`]s whose leaves are [`Mesh`]es. The
//! [`Scene`] holds at most one model at a time together with the
//! [`ResourceTracker`] that owns the ids of every geometry buffer and
//! material instance; installing a new model disposes the old one first.
//!
//! # Examples
//! ```
//! use objzip::scene::{Geometry, Mesh, Node, Scene};
//! use objzip::scene::material::Material;
//! use objzip::scene::resources::ResourceKind;
//!
//! let mut scene = Scene::new();
//! let geometry = Geometry::new(
//!     scene.resources.allocate(ResourceKind::Geometry),
//!     vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
//! );
//! let material = Material::default_lambert(&mut scene.resources);
//! let model = Node::group("model", vec![Node::mesh(Mesh::new("tri", geometry, vec![material]))]);
//!
//! scene.install(model);
//! assert_eq!(scene.resources.live_count(), 2);
//! assert!(scene.dispose_current());
//! assert_eq!(scene.resources.live_count(), 0);
//! ```

pub mod display;
pub mod material;
pub mod reconcile;
pub mod resources;

use glam::Vec3;

use self::material::Material;
use self::resources::{ResourceId, ResourceTracker};

/// Vertex data of one mesh.
#[derive(Debug, Clone)]
pub struct Geometry {
    pub id: ResourceId,
    /// `None` when the source had no position attribute.
    pub positions: Option<Vec<[f32; 3]>>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    /// `None` for non-indexed geometry.
    pub indices: Option<Vec<u32>>,
}

impl Geometry {
    /// Non-indexed geometry with positions only.
    pub fn new(id: ResourceId, positions: Vec<[f32; 3]>) -> Self {
        Self {
            id,
            positions: Some(positions),
            normals: Vec::new(),
            uvs: Vec::new(),
            indices: None,
        }
    }

    pub fn with_indices(mut self, indices: Vec<u32>) -> Self {
        self.indices = Some(indices);
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.as_ref().map_or(0, Vec::len)
    }

    /// Number of triangles, or `None` without positions.
    ///
    /// # Examples
    /// ```
    /// use objzip::scene::Geometry;
    /// use objzip::scene::resources::{ResourceKind, ResourceTracker};
    ///
    /// let mut resources = ResourceTracker::new();
    /// let id = resources.allocate(ResourceKind::Geometry);
    /// let quad = Geometry::new(id, vec![[0.0; 3]; 4]).with_indices(vec![0, 1, 2, 0, 2, 3]);
    /// assert_eq!(quad.triangle_count(), Some(2));
    /// ```
    pub fn triangle_count(&self) -> Option<usize> {
        let positions = self.positions.as_ref()?;
        Some(match &self.indices {
            Some(indices) => indices.len() / 3,
            None => positions.len() / 3,
        })
    }

    /// Vertex index triples, skipping any that point outside the buffers.
    pub fn triangles(&self) -> Vec<[usize; 3]> {
        let count = self.vertex_count();
        let in_range = |t: &[usize; 3]| t.iter().all(|&i| i < count);
        match &self.indices {
            Some(indices) => indices
                .chunks_exact(3)
                .map(|c| [c[0] as usize, c[1] as usize, c[2] as usize])
                .filter(in_range)
                .collect(),
            None => (0..count / 3)
                .map(|t| [t * 3, t * 3 + 1, t * 3 + 2])
                .collect(),
        }
    }

    /// Axis-aligned bounds of the positions.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let positions = self.positions.as_ref()?;
        let mut iter = positions.iter().map(|p| Vec3::from_array(*p));
        let first = iter.next()?;
        Some(iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p))))
    }
}

/// A drawable leaf of the scene graph.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,
    pub geometry: Geometry,
    /// One entry per material group; empty when the mesh has no material.
    pub materials: Vec<Material>,
    pub wireframe: bool,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl Mesh {
    pub fn new(name: &str, geometry: Geometry, materials: Vec<Material>) -> Self {
        Self {
            name: name.to_string(),
            geometry,
            materials,
            wireframe: false,
            cast_shadow: false,
            receive_shadow: false,
        }
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Group(Vec<Node>),
    Mesh(Box<Mesh>),
}

/// Scene graph node.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
}

impl Node {
    pub fn group(name: &str, children: Vec<Node>) -> Self {
        Self {
            name: name.to_string(),
            kind: NodeKind::Group(children),
        }
    }

    pub fn mesh(mesh: Mesh) -> Self {
        Self {
            name: mesh.name.clone(),
            kind: NodeKind::Mesh(Box::new(mesh)),
        }
    }

    /// Visits every mesh depth-first.
    pub fn for_each_mesh<'a>(&'a self, f: &mut impl FnMut(&'a Mesh)) {
        match &self.kind {
            NodeKind::Group(children) => {
                for child in children {
                    child.for_each_mesh(f);
                }
            }
            NodeKind::Mesh(mesh) => f(&**mesh),
        }
    }

    pub fn for_each_mesh_mut(&mut self, f: &mut impl FnMut(&mut Mesh)) {
        match &mut self.kind {
            NodeKind::Group(children) => {
                for child in children {
                    child.for_each_mesh_mut(f);
                }
            }
            NodeKind::Mesh(mesh) => f(&mut **mesh),
        }
    }

    pub fn meshes(&self) -> Vec<&Mesh> {
        let mut meshes = Vec::new();
        self.for_each_mesh(&mut |mesh| meshes.push(mesh));
        meshes
    }

    pub fn mesh_count(&self) -> usize {
        let mut count = 0;
        self.for_each_mesh(&mut |_| count += 1);
        count
    }

    /// Ids of every geometry and material below this node.
    pub fn resource_ids(&self) -> Vec<ResourceId> {
        let mut ids = Vec::new();
        self.for_each_mesh(&mut |mesh| {
            ids.push(mesh.geometry.id);
            ids.extend(mesh.materials.iter().map(|m| m.id));
        });
        ids
    }

    /// Bounds over every mesh that has positions.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut bounds: Option<(Vec3, Vec3)> = None;
        self.for_each_mesh(&mut |mesh| {
            if let Some((lo, hi)) = mesh.geometry.bounds() {
                bounds = Some(match bounds {
                    Some((min, max)) => (min.min(lo), max.max(hi)),
                    None => (lo, hi),
                });
            }
        });
        bounds
    }
}

/// The displayed model and the resources it owns.
#[derive(Debug, Default)]
pub struct Scene {
    current: Option<Node>,
    pub resources: ResourceTracker,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&Node> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut Node> {
        self.current.as_mut()
    }

    /// Replaces the displayed model, disposing the previous one.
    pub fn install(&mut self, model: Node) {
        self.dispose_current();
        log::debug!("Installed model {}", model.name);
        self.current = Some(model);
    }

    /// Removes the displayed model and releases its geometries and
    /// materials. Returns false if nothing was displayed.
    pub fn dispose_current(&mut self) -> bool {
        let Some(model) = self.current.take() else {
            return false;
        };
        let ids = model.resource_ids();
        for id in &ids {
            self.resources.release(*id);
        }
        log::debug!("Disposed model {} ({} resources)", model.name, ids.len());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::material::Material;
    use super::resources::ResourceKind;
    use super::*;

    fn triangle_model(scene: &mut Scene, name: &str) -> Node {
        let geometry = Geometry::new(
            scene.resources.allocate(ResourceKind::Geometry),
            vec![[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 3.0, -1.0]],
        );
        let material = Material::default_lambert(&mut scene.resources);
        Node::group(name, vec![Node::mesh(Mesh::new("tri", geometry, vec![material]))])
    }

    #[test]
    fn test_install_disposes_previous_model() {
        let mut scene = Scene::new();
        let first = triangle_model(&mut scene, "first");
        let first_ids = first.resource_ids();
        scene.install(first);

        let second = triangle_model(&mut scene, "second");
        let second_ids = second.resource_ids();
        scene.install(second);

        assert!(first_ids.iter().all(|id| !scene.resources.is_live(*id)));
        assert!(second_ids.iter().all(|id| scene.resources.is_live(*id)));
        assert_eq!(scene.resources.live_count(), 2);
        assert_eq!(scene.current().unwrap().name, "second");
    }

    #[test]
    fn test_bounds_and_triangles() {
        let mut scene = Scene::new();
        let model = triangle_model(&mut scene, "m");
        let (min, max) = model.bounds().unwrap();
        assert_eq!(min, Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(max, Vec3::new(2.0, 3.0, 0.0));

        let mut tris = Vec::new();
        model.for_each_mesh(&mut |mesh| tris.extend(mesh.geometry.triangles()));
        assert_eq!(tris, vec![[0, 1, 2]]);
    }

    #[test]
    fn test_out_of_range_indices_are_skipped() {
        let mut resources = ResourceTracker::new();
        let geometry = Geometry::new(resources.allocate(ResourceKind::Geometry), vec![[0.0; 3]; 3])
            .with_indices(vec![0, 1, 2, 0, 1, 9]);
        assert_eq!(geometry.triangle_count(), Some(2));
        assert_eq!(geometry.triangles(), vec![[0, 1, 2]]);
    }

    #[test]
    fn test_dispose_empty_scene() {
        let mut scene = Scene::new();
        assert!(!scene.dispose_current());
    }
}
