//! Provides a software rasterizer for the viewer scene.
//!
//! This module takes the current model, a camera and the lighting settings
//! and produces RGBA pixels using a perspective projection, flat shading per
//! face and a z-buffer. The light rig is an ambient light plus a main and a
//! fill directional light.
//!
//! No GPU is required; it runs entirely on the CPU.
//!
//! # Examples
//! ```
//! use objzip::camera::Camera;
//! use objzip::renderer::{render_scene, RenderSettings};
//!
//! let settings = RenderSettings::new(4, 4);
//! let pixels = render_scene(None, &Camera::default(), &settings);
//! assert_eq!(pixels.len(), 4 * 4 * 4);
//! assert_eq!(&pixels[..4], &[0x0a, 0x0a, 0x12, 0xff]);
//! ```

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::camera::Camera;
use crate::scene::material::{Material, Shading, DEFAULT_COLOR};
use crate::scene::{Mesh, Node};
use crate::textures::TextureHandle;

/// Clear color, `#0a0a12`.
pub const BACKGROUND: [f32; 3] = [
    0x0a as f32 / 255.0,
    0x0a as f32 / 255.0,
    0x12 as f32 / 255.0,
];

const AMBIENT: f32 = 0.6;
const MAIN_LIGHT: (Vec3, f32) = (Vec3::new(10.0, 20.0, 10.0), 0.8);
const FILL_LIGHT: (Vec3, f32) = (Vec3::new(-10.0, 10.0, -10.0), 0.3);
const FOG_NEAR: f32 = 500.0;
const FOG_FAR: f32 = 3000.0;
/// Edge half-width in output pixels for wireframe drawing.
const WIRE_WIDTH: f32 = 0.75;

/// Output size and lighting for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    /// Supersampling factor per axis; 1 renders one sample per pixel.
    pub samples_per_axis: u32,
    /// Multiplier on the directional lights; 1.0 is the default rig.
    pub light_scale: f32,
}

impl RenderSettings {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            samples_per_axis: 1,
            light_scale: 1.0,
        }
    }
}

/// Renders the model (or just the background) into RGBA8 pixels.
///
/// Opaque meshes are drawn first, then transparent ones blended over them
/// without writing depth.
pub fn render_scene(model: Option<&Node>, camera: &Camera, settings: &RenderSettings) -> Vec<u8> {
    let samples = settings.samples_per_axis.max(1);
    let w = (settings.width * samples) as usize;
    let h = (settings.height * samples) as usize;

    // ---- Framebuffer ----
    let mut target = Target {
        width: w,
        height: h,
        color: vec![BACKGROUND; w * h],
        depth: vec![f32::INFINITY; w * h],
    };

    if let Some(model) = model.filter(|_| w > 0 && h > 0) {
        let pass = Pass {
            view_proj: camera.view_proj(w as f32 / h as f32),
            eye: camera.position,
            lights: [
                (MAIN_LIGHT.0.normalize(), MAIN_LIGHT.1 * settings.light_scale),
                (FILL_LIGHT.0.normalize(), FILL_LIGHT.1 * settings.light_scale),
            ],
            wire_width: WIRE_WIDTH * samples as f32,
        };

        let mut meshes = model.meshes();
        meshes.sort_by_key(|mesh| mesh.materials.first().is_some_and(|m| m.transparent));
        for mesh in meshes {
            draw_mesh(&mut target, mesh, &pass);
        }
    }

    target.resolve(settings.width as usize, settings.height as usize, samples as usize)
}

struct Target {
    width: usize,
    height: usize,
    color: Vec<[f32; 3]>,
    depth: Vec<f32>,
}

impl Target {
    /// Box-filters the supersampled buffer down and converts to RGBA8.
    fn resolve(&self, width: usize, height: usize, samples: usize) -> Vec<u8> {
        let mut pixels = vec![0u8; width * height * 4];
        let weight = 1.0 / (samples * samples) as f32;

        for y in 0..height {
            for x in 0..width {
                let mut sum = [0.0_f32; 3];
                for sy in 0..samples {
                    for sx in 0..samples {
                        let c = self.color[(y * samples + sy) * self.width + x * samples + sx];
                        for i in 0..3 {
                            sum[i] += c[i];
                        }
                    }
                }
                let out = (y * width + x) * 4;
                for i in 0..3 {
                    pixels[out + i] = ((sum[i] * weight).clamp(0.0, 1.0) * 255.0).round() as u8;
                }
                pixels[out + 3] = 255;
            }
        }

        pixels
    }
}

struct Pass {
    view_proj: Mat4,
    eye: Vec3,
    lights: [(Vec3, f32); 2],
    wire_width: f32,
}

/// The material properties the rasterizer reads.
struct Surface {
    shading: Shading,
    color: Vec3,
    opacity: f32,
    transparent: bool,
    double_sided: bool,
    map: Option<TextureHandle>,
}

impl Surface {
    fn of(material: Option<&Material>) -> Self {
        match material {
            Some(m) => Self {
                shading: m.shading,
                color: Vec3::from_array(m.color),
                opacity: m.opacity,
                transparent: m.transparent,
                double_sided: m.double_sided,
                map: m.map.clone(),
            },
            None => Self {
                shading: Shading::Lambert,
                color: Vec3::from_array(DEFAULT_COLOR),
                opacity: 1.0,
                transparent: false,
                double_sided: false,
                map: None,
            },
        }
    }

    /// Specular color and exponent, if the model has a highlight.
    fn specular(&self) -> Option<(Vec3, f32)> {
        match self.shading {
            Shading::Phong {
                specular,
                shininess,
            } => Some((Vec3::from_array(specular), shininess.max(1.0))),
            Shading::Standard { roughness, .. } => {
                let gloss = (1.0 - roughness).clamp(0.0, 1.0);
                Some((Vec3::splat(gloss), 2.0 + gloss * 98.0))
            }
            Shading::Unlit | Shading::Lambert => None,
        }
    }

    /// Returns the diffuse factor and the specular term for a face.
    fn light(&self, normal: Vec3, to_eye: Vec3, lights: &[(Vec3, f32); 2]) -> (f32, Vec3) {
        if !self.shading.is_light_reactive() {
            return (1.0, Vec3::ZERO);
        }

        let specular = self.specular();
        let mut diffuse = AMBIENT;
        let mut highlight = Vec3::ZERO;
        for &(dir, intensity) in lights {
            let ndl = normal.dot(dir).max(0.0);
            diffuse += ndl * intensity;
            if let Some((color, exponent)) = specular.filter(|_| ndl > 0.0) {
                let half = (dir + to_eye).normalize_or_zero();
                highlight += color * normal.dot(half).max(0.0).powf(exponent) * intensity;
            }
        }
        (diffuse, highlight)
    }
}

fn draw_mesh(target: &mut Target, mesh: &Mesh, pass: &Pass) {
    let Some(positions) = mesh.geometry.positions.as_ref() else {
        return;
    };
    let uvs = (mesh.geometry.uvs.len() == positions.len()).then_some(&mesh.geometry.uvs);
    let surface = Surface::of(mesh.materials.first());
    let (w, h) = (target.width, target.height);

    for tri in mesh.geometry.triangles() {
        let world = tri.map(|i| Vec3::from_array(positions[i]));

        let mut screen = [Vec3::ZERO; 3];
        let mut visible = true;
        for i in 0..3 {
            let clip: Vec4 = pass.view_proj * world[i].extend(1.0);
            if clip.w <= 0.0 {
                visible = false;
                break;
            }
            let inv_w = 1.0 / clip.w;
            screen[i] = Vec3::new(
                (clip.x * inv_w * 0.5 + 0.5) * w as f32,
                (0.5 - clip.y * inv_w * 0.5) * h as f32,
                clip.z * inv_w,
            );
        }
        if !visible {
            continue;
        }

        // Face normal in world space (flat shading)
        let centroid = (world[0] + world[1] + world[2]) / 3.0;
        let to_eye = (pass.eye - centroid).normalize_or_zero();
        let mut normal = (world[1] - world[0])
            .cross(world[2] - world[0])
            .normalize_or_zero();
        if normal.dot(to_eye) < 0.0 {
            if !surface.double_sided {
                continue;
            }
            normal = -normal;
        }

        let (diffuse, highlight) = surface.light(normal, to_eye, &pass.lights);
        let fog = ((pass.eye.distance(centroid) - FOG_NEAR) / (FOG_FAR - FOG_NEAR)).clamp(0.0, 1.0);
        let edges = EdgeMetrics::new(screen);

        // Screen-space bounding box
        let min_x = screen[0].x.min(screen[1].x).min(screen[2].x).max(0.0) as usize;
        let max_x = (screen[0].x.max(screen[1].x).max(screen[2].x).ceil().max(0.0) as usize).min(w);
        let min_y = screen[0].y.min(screen[1].y).min(screen[2].y).max(0.0) as usize;
        let max_y = (screen[0].y.max(screen[1].y).max(screen[2].y).ceil().max(0.0) as usize).min(h);

        for y in min_y..max_y {
            for x in min_x..max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                let bary = barycentric(screen, px, py);
                if bary.iter().any(|b| *b < 0.0) {
                    continue;
                }
                if mesh.wireframe && edges.distance(bary) > pass.wire_width {
                    continue;
                }

                let z = bary[0] * screen[0].z + bary[1] * screen[1].z + bary[2] * screen[2].z;
                let idx = y * w + x;
                if z >= target.depth[idx] {
                    continue;
                }

                let (texel, texel_alpha) = match (&surface.map, uvs) {
                    (Some(tex), Some(uvs)) => {
                        let uv = bary[0] * Vec2::from_array(uvs[tri[0]])
                            + bary[1] * Vec2::from_array(uvs[tri[1]])
                            + bary[2] * Vec2::from_array(uvs[tri[2]]);
                        let v = if tex.sampler.flip_y { 1.0 - uv.y } else { uv.y };
                        let s = tex.sample(uv.x, v);
                        (Vec3::new(s[0], s[1], s[2]), s[3])
                    }
                    _ => (Vec3::ONE, 1.0),
                };

                let lit = (surface.color * texel * diffuse + highlight).min(Vec3::ONE);
                let shaded = lit.lerp(Vec3::from_array(BACKGROUND), fog);

                if surface.transparent {
                    let alpha = (surface.opacity * texel_alpha).clamp(0.0, 1.0);
                    let dst = Vec3::from_array(target.color[idx]);
                    target.color[idx] = dst.lerp(shaded, alpha).to_array();
                } else {
                    target.depth[idx] = z;
                    target.color[idx] = shaded.to_array();
                }
            }
        }
    }
}

// ===========================================================================
// Rasterization helpers
// ===========================================================================

fn barycentric(tri: [Vec3; 3], px: f32, py: f32) -> [f32; 3] {
    let v0x = tri[1].x - tri[0].x;
    let v0y = tri[1].y - tri[0].y;
    let v1x = tri[2].x - tri[0].x;
    let v1y = tri[2].y - tri[0].y;
    let v2x = px - tri[0].x;
    let v2y = py - tri[0].y;

    let d00 = v0x * v0x + v0y * v0y;
    let d01 = v0x * v1x + v0y * v1y;
    let d11 = v1x * v1x + v1y * v1y;
    let d20 = v2x * v0x + v2y * v0y;
    let d21 = v2x * v1x + v2y * v1y;

    let denom = d00 * d11 - d01 * d01;
    if denom.abs() < 1e-10 {
        return [-1.0, -1.0, -1.0];
    }

    let inv = 1.0 / denom;
    let v = (d11 * d20 - d01 * d21) * inv;
    let w = (d00 * d21 - d01 * d20) * inv;
    let u = 1.0 - v - w;

    [u, v, w]
}

/// Converts barycentric weights into a pixel distance to the nearest edge.
struct EdgeMetrics {
    /// Twice the screen area over the length of the edge opposite each vertex.
    heights: [f32; 3],
}

impl EdgeMetrics {
    fn new(tri: [Vec3; 3]) -> Self {
        let p = tri.map(|v| v.truncate());
        let area2 = (p[1] - p[0]).perp_dot(p[2] - p[0]).abs();
        let opposite = [p[2] - p[1], p[0] - p[2], p[1] - p[0]];
        Self {
            heights: opposite.map(|e| {
                let len = e.length();
                if len > 0.0 {
                    area2 / len
                } else {
                    0.0
                }
            }),
        }
    }

    fn distance(&self, bary: [f32; 3]) -> f32 {
        (0..3)
            .map(|i| bary[i] * self.heights[i])
            .fold(f32::INFINITY, f32::min)
    }
}
