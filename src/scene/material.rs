//! Provides material types for the scene.
//!
//! A [`MaterialDescription`] is what the MTL parser produces: plain data,
//! owned by one load. A [`Material`] is a description instantiated onto a
//! mesh, with its own tracked resource id.
//!
//! The shading model is a tag fixed at construction time, and
//! [`Shading::is_light_reactive`] is the capability check used by the
//! reconciler.
//!
//! # Examples
//! ```
//! use objzip::scene::material::Shading;
//!
//! assert!(!Shading::Unlit.is_light_reactive());
//! assert!(Shading::Lambert.is_light_reactive());
//! ```

use crate::scene::resources::{ResourceId, ResourceKind, ResourceTracker};
use crate::textures::TextureHandle;

/// Grey used for meshes loaded without any material information.
pub const DEFAULT_COLOR: [f32; 3] = [0x88 as f32 / 255.0; 3];

/// Specular color for Phong materials that leave out `Ks`.
pub const DEFAULT_SPECULAR: [f32; 3] = [0x11 as f32 / 255.0; 3];
/// Phong exponent for materials that leave out `Ns`.
pub const DEFAULT_SHININESS: f32 = 30.0;

/// Surface shading model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shading {
    /// Flat color, ignores scene lights.
    Unlit,
    /// Diffuse only.
    Lambert,
    /// Diffuse plus specular highlight.
    Phong { specular: [f32; 3], shininess: f32 },
    /// Metallic-roughness.
    Standard { roughness: f32, metalness: f32 },
}

impl Shading {
    /// Returns true if the rendered color depends on scene lighting.
    pub fn is_light_reactive(&self) -> bool {
        !matches!(self, Shading::Unlit)
    }

    pub fn default_phong() -> Self {
        Shading::Phong {
            specular: DEFAULT_SPECULAR,
            shininess: DEFAULT_SHININESS,
        }
    }
}

/// Material as declared by the MTL file.
#[derive(Debug, Clone)]
pub struct MaterialDescription {
    pub name: String,
    pub shading: Shading,
    pub color: [f32; 3],
    pub opacity: f32,
    pub transparent: bool,
    pub map: Option<TextureHandle>,
    pub normal_map: Option<TextureHandle>,
    /// Diffuse map reference as written in the MTL, after preprocessing.
    pub map_name: Option<String>,
}

/// A material bound to a mesh.
#[derive(Debug, Clone)]
pub struct Material {
    pub id: ResourceId,
    pub name: String,
    pub shading: Shading,
    pub color: [f32; 3],
    pub opacity: f32,
    pub transparent: bool,
    pub map: Option<TextureHandle>,
    pub double_sided: bool,
}

impl Material {
    /// Instantiates a described material.
    pub fn from_description(desc: &MaterialDescription, resources: &mut ResourceTracker) -> Self {
        Self {
            id: resources.allocate(ResourceKind::Material),
            name: desc.name.clone(),
            shading: desc.shading,
            color: desc.color,
            opacity: desc.opacity,
            transparent: desc.transparent,
            map: desc.map.clone(),
            double_sided: false,
        }
    }

    /// Grey Lambert used when a model is loaded without materials.
    ///
    /// # Examples
    /// ```
    /// use objzip::scene::material::Material;
    /// use objzip::scene::resources::ResourceTracker;
    ///
    /// let mut resources = ResourceTracker::new();
    /// let material = Material::default_lambert(&mut resources);
    /// assert!(material.is_light_reactive());
    /// assert!(resources.is_live(material.id));
    /// ```
    pub fn default_lambert(resources: &mut ResourceTracker) -> Self {
        Self {
            id: resources.allocate(ResourceKind::Material),
            name: "default".to_string(),
            shading: Shading::Lambert,
            color: DEFAULT_COLOR,
            opacity: 1.0,
            transparent: false,
            map: None,
            double_sided: false,
        }
    }

    /// White Phong used for faces whose `usemtl` names no known material.
    pub fn default_phong(resources: &mut ResourceTracker) -> Self {
        Self {
            id: resources.allocate(ResourceKind::Material),
            name: "default".to_string(),
            shading: Shading::default_phong(),
            color: [1.0, 1.0, 1.0],
            opacity: 1.0,
            transparent: false,
            map: None,
            double_sided: false,
        }
    }

    pub fn is_light_reactive(&self) -> bool {
        self.shading.is_light_reactive()
    }
}
