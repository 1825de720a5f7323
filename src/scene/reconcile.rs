//! Normalises the materials of a freshly parsed model before it is shown.
//!
//! After reconciliation every material in the model reacts to scene lights,
//! every mesh carries the current wireframe and shadow flags, and the counts
//! for the stats line are known.

use super::display::DisplayOptions;
use super::material::{Material, Shading};
use super::resources::{ResourceKind, ResourceTracker};
use super::{Mesh, Node};

const ROUGHNESS_RANGE: (f32, f32) = (0.4, 1.0);
const METALNESS_RANGE: (f32, f32) = (0.0, 0.5);

/// Counts gathered while reconciling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub mesh_count: usize,
    pub triangle_count: usize,
    pub vertex_count: usize,
    /// Unlit materials replaced by Lambert.
    pub converted_materials: usize,
}

/// Reconciles every mesh below `root`. Cannot fail.
///
/// Meshes without a material get a default Lambert. They, and meshes without
/// positions, still count as meshes but add no triangles.
///
/// # Examples
/// ```
/// use objzip::scene::{Geometry, Mesh, Node};
/// use objzip::scene::display::DisplayOptions;
/// use objzip::scene::reconcile::reconcile;
/// use objzip::scene::resources::{ResourceKind, ResourceTracker};
///
/// let mut resources = ResourceTracker::new();
/// let geometry = Geometry::new(resources.allocate(ResourceKind::Geometry), vec![[0.0; 3]; 6]);
/// let mut root = Node::group("m", vec![Node::mesh(Mesh::new("bare", geometry, vec![]))]);
///
/// let stats = reconcile(&mut root, &DisplayOptions::new(), &mut resources);
/// assert_eq!(stats.mesh_count, 1);
/// assert_eq!(stats.triangle_count, 0);
/// ```
pub fn reconcile(
    root: &mut Node,
    display: &DisplayOptions,
    resources: &mut ResourceTracker,
) -> ReconcileStats {
    let mut stats = ReconcileStats::default();

    root.for_each_mesh_mut(&mut |mesh| {
        stats.mesh_count += 1;
        apply_display(mesh, display);

        if mesh.materials.is_empty() {
            log::debug!("Mesh {} has no material; using default", mesh.name);
            mesh.materials.push(Material::default_lambert(resources));
            return;
        }

        for material in &mut mesh.materials {
            if reconcile_material(material, resources) {
                stats.converted_materials += 1;
            }
        }

        if let Some(triangles) = mesh.geometry.triangle_count() {
            stats.triangle_count += triangles;
            stats.vertex_count += mesh.geometry.vertex_count();
        }
    });

    log::debug!(
        "Reconciled {} meshes, {} triangles, {} materials converted",
        stats.mesh_count,
        stats.triangle_count,
        stats.converted_materials
    );
    stats
}

/// Applies the wireframe and shadow flags to one mesh.
pub fn apply_display(mesh: &mut Mesh, display: &DisplayOptions) {
    mesh.wireframe = display.wireframe;
    mesh.cast_shadow = display.shadows;
    mesh.receive_shadow = display.shadows;
}

/// Returns true if the material was replaced.
fn reconcile_material(material: &mut Material, resources: &mut ResourceTracker) -> bool {
    match material.shading {
        Shading::Unlit => {
            let replacement = Material {
                id: resources.allocate(ResourceKind::Material),
                name: material.name.clone(),
                shading: Shading::Lambert,
                color: material.color,
                opacity: material.opacity,
                transparent: material.transparent,
                map: material.map.clone(),
                double_sided: true,
            };
            resources.release(material.id);
            *material = replacement;
            true
        }
        Shading::Standard {
            roughness,
            metalness,
        } => {
            material.shading = Shading::Standard {
                roughness: roughness.clamp(ROUGHNESS_RANGE.0, ROUGHNESS_RANGE.1),
                metalness: metalness.clamp(METALNESS_RANGE.0, METALNESS_RANGE.1),
            };
            false
        }
        Shading::Lambert | Shading::Phong { .. } => false,
    }
}
