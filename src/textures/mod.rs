//! Provides decoded textures, their sampling configuration, and the
//! per-load texture resolution that feeds the material parser.
//!
//! # Examples
//! ```
//! use objzip::textures::{SamplerSettings, Texture, TextureOrigin};
//!
//! let tex = Texture::from_rgba("white.png", 1, 1, vec![255, 255, 255, 255]);
//! assert_eq!(tex.origin, TextureOrigin::Decoded);
//! assert_eq!(tex.sampler, SamplerSettings::default());
//! assert_eq!(tex.sample(0.5, 0.5), [1.0, 1.0, 1.0, 1.0]);
//! ```

pub mod cache;
pub mod placeholder;
pub mod resolver;

use std::collections::HashMap;
use std::sync::Arc;

use crate::formats::shared::path;

pub use cache::TextureCache;
pub use resolver::build_texture_map;

/// Shared handle to a decoded texture. Identity is `Arc` pointer identity.
pub type TextureHandle = Arc<Texture>;

/// Per-load mapping from bare filename to texture.
pub type TextureMap = HashMap<String, TextureHandle>;

/// Texture coordinate wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wrap {
    Repeat,
    ClampToEdge,
}

/// Texture filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Nearest,
    Linear,
    LinearMipmapLinear,
}

/// How texel values are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    Srgb,
    Linear,
}

/// Upload and sampling parameters attached to every texture.
///
/// The default is the fixed configuration applied to textures from OBJ
/// archives: no vertical flip, mipmaps on, trilinear minification, linear
/// magnification, repeat wrapping, sRGB.
///
/// # Examples
/// ```
/// use objzip::textures::{ColorSpace, Filter, SamplerSettings, Wrap};
///
/// let s = SamplerSettings::default();
/// assert!(!s.flip_y);
/// assert!(s.generate_mipmaps);
/// assert_eq!(s.min_filter, Filter::LinearMipmapLinear);
/// assert_eq!(s.mag_filter, Filter::Linear);
/// assert_eq!((s.wrap_s, s.wrap_t), (Wrap::Repeat, Wrap::Repeat));
/// assert_eq!(s.color_space, ColorSpace::Srgb);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerSettings {
    pub flip_y: bool,
    pub generate_mipmaps: bool,
    pub min_filter: Filter,
    pub mag_filter: Filter,
    pub wrap_s: Wrap,
    pub wrap_t: Wrap,
    pub color_space: ColorSpace,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            flip_y: false,
            generate_mipmaps: true,
            min_filter: Filter::LinearMipmapLinear,
            mag_filter: Filter::Linear,
            wrap_s: Wrap::Repeat,
            wrap_t: Wrap::Repeat,
            color_space: ColorSpace::Srgb,
        }
    }
}

/// Where a texture's pixels came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureOrigin {
    /// Decoded from an archive entry.
    Decoded,
    /// Generated because the real image was missing or unreadable.
    Placeholder,
}

/// A decoded RGBA8 image plus its sampling configuration.
#[derive(Debug, Clone)]
pub struct Texture {
    /// Bare filename the texture was registered under.
    pub name: String,
    /// The texture width in pixels.
    pub width: u32,
    /// The texture height in pixels.
    pub height: u32,
    /// RGBA pixel data stored row-major.
    pub data: Vec<u8>,
    pub sampler: SamplerSettings,
    pub origin: TextureOrigin,
}

impl Texture {
    /// Wraps raw RGBA8 pixels with the default sampler settings.
    pub fn from_rgba(name: &str, width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            width,
            height,
            data,
            sampler: SamplerSettings::default(),
            origin: TextureOrigin::Decoded,
        }
    }

    /// Returns true for generated fallback textures.
    pub fn is_placeholder(&self) -> bool {
        self.origin == TextureOrigin::Placeholder
    }

    /// Samples the texture at UV coordinates.
    ///
    /// Wrapping follows `sampler.wrap_s`/`wrap_t`; `mag_filter` picks nearest
    /// or bilinear lookup.
    ///
    /// # Examples
    /// ```
    /// use objzip::textures::Texture;
    ///
    /// let tex = Texture::from_rgba("checker.png", 2, 1, vec![0, 0, 0, 255, 255, 255, 255, 255]);
    /// // Repeat wrapping: 1.25 lands on the same texel as 0.25.
    /// assert_eq!(tex.sample(1.25, 0.0), tex.sample(0.25, 0.0));
    /// ```
    pub fn sample(&self, u: f32, v: f32) -> [f32; 4] {
        if self.width == 0 || self.height == 0 {
            return [1.0, 1.0, 1.0, 1.0];
        }

        let u = wrap_coord(u, self.sampler.wrap_s);
        let v = wrap_coord(v, self.sampler.wrap_t);

        match self.sampler.mag_filter {
            Filter::Nearest => {
                let x = ((u * self.width as f32) as u32).min(self.width - 1);
                let y = ((v * self.height as f32) as u32).min(self.height - 1);
                self.texel(x, y)
            }
            Filter::Linear | Filter::LinearMipmapLinear => {
                let fx = (u * self.width as f32 - 0.5).max(0.0);
                let fy = (v * self.height as f32 - 0.5).max(0.0);
                let x0 = (fx as u32).min(self.width - 1);
                let y0 = (fy as u32).min(self.height - 1);
                let x1 = (x0 + 1).min(self.width - 1);
                let y1 = (y0 + 1).min(self.height - 1);
                let tx = fx - x0 as f32;
                let ty = fy - y0 as f32;

                let a = self.texel(x0, y0);
                let b = self.texel(x1, y0);
                let c = self.texel(x0, y1);
                let d = self.texel(x1, y1);
                let mut out = [0.0; 4];
                for i in 0..4 {
                    let top = a[i] + (b[i] - a[i]) * tx;
                    let bottom = c[i] + (d[i] - c[i]) * tx;
                    out[i] = top + (bottom - top) * ty;
                }
                out
            }
        }
    }

    fn texel(&self, x: u32, y: u32) -> [f32; 4] {
        let idx = ((y * self.width + x) * 4) as usize;
        if idx + 3 < self.data.len() {
            [
                self.data[idx] as f32 / 255.0,
                self.data[idx + 1] as f32 / 255.0,
                self.data[idx + 2] as f32 / 255.0,
                self.data[idx + 3] as f32 / 255.0,
            ]
        } else {
            [1.0, 1.0, 1.0, 1.0]
        }
    }
}

fn wrap_coord(t: f32, wrap: Wrap) -> f32 {
    match wrap {
        Wrap::Repeat => {
            let t = t.fract();
            if t < 0.0 {
                t + 1.0
            } else {
                t
            }
        }
        Wrap::ClampToEdge => t.clamp(0.0, 1.0),
    }
}

/// Decodes image bytes into a texture carrying the default sampler settings.
///
/// The format is taken from the filename's extension when it names one the
/// `image` crate knows (TGA has no magic bytes), with content sniffing as the
/// fallback.
///
/// # Errors
/// Returns the decoder's message if the bytes are not a readable image.
///
/// # Examples
/// ```
/// use objzip::textures::decode_texture;
///
/// assert!(decode_texture("broken.png", b"definitely not a png").is_err());
/// ```
pub fn decode_texture(name: &str, bytes: &[u8]) -> Result<Texture, String> {
    let format = path::extension(name).and_then(image::ImageFormat::from_extension);
    let img = match format {
        Some(format) => image::load_from_memory_with_format(bytes, format)
            .or_else(|_| image::load_from_memory(bytes)),
        None => image::load_from_memory(bytes),
    }
    .map_err(|e| e.to_string())?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(Texture::from_rgba(
        path::bare_filename(name),
        width,
        height,
        rgba.into_raw(),
    ))
}
