//! Provides the objzip viewer core for OBJ/MTL models packaged in ZIP archives.
//!
//! A model archive is fetched, unpacked in memory and indexed. Its images are
//! decoded through a bounded texture cache, the MTL library is rewritten so
//! that every texture reference points at archive content, and the OBJ is
//! parsed against the rewritten materials. Materials are then reconciled to
//! light-reactive shading before the model is installed in the scene and
//! drawn by a software rasterizer.
//!
//! Material problems never abort a load; the model falls back to geometry
//! with default materials.
//!
//! # Examples
//! ```no_run
//! use objzip::config::ViewerConfig;
//! use objzip::viewer::Viewer;
//!
//! let mut viewer = Viewer::new(ViewerConfig::default());
//! if let Some(Ok(stats)) = viewer.start("?file=https%3A%2F%2Fexample.com%2Fchair.zip") {
//!     println!("{}", stats);
//! }
//! let pixels = viewer.render(512, 512);
//! assert_eq!(pixels.len(), 512 * 512 * 4);
//! ```

pub mod archive;
pub mod camera;
pub mod config;
pub mod error;
pub mod fetch;
pub mod formats;
pub mod loader;
pub mod query;
pub mod renderer;
pub mod rewriter;
pub mod scene;
pub mod textures;
pub mod viewer;

pub use config::ViewerConfig;
pub use error::LoadError;
pub use viewer::Viewer;
