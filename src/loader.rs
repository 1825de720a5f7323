//! Provides the load pipeline that turns an archive location into a
//! reconciled model.
//!
//! The stages run in a fixed order and each one is reported through a
//! callback before it starts:
//!
//! 1. download the archive bytes;
//! 2. open the ZIP and classify its entries;
//! 3. decode every texture into the per-load map (through the session cache);
//! 4. parse the MTL, if there is one, resolving its texture references;
//! 5. parse the OBJ with the material table, or without one;
//! 6. reconcile materials and count what was loaded.
//!
//! A material failure never ends a load. It downgrades the load to
//! geometry-only, and only a geometry failure on that path is fatal.
//!
//! # Examples
//! ```no_run
//! use objzip::fetch::DefaultFetcher;
//! use objzip::loader::{load_model, LoadContext};
//! use objzip::scene::display::DisplayOptions;
//! use objzip::scene::resources::ResourceTracker;
//! use objzip::textures::TextureCache;
//!
//! let mut cache = TextureCache::new(256, 256);
//! let mut resources = ResourceTracker::new();
//! let display = DisplayOptions::new();
//! let mut ctx = LoadContext {
//!     cache: &mut cache,
//!     resources: &mut resources,
//!     display: &display,
//! };
//!
//! let fetcher = DefaultFetcher::new(64 * 1024 * 1024);
//! let loaded = load_model("chair.zip", &fetcher, &mut ctx, &mut |stage| {
//!     println!("{:?}", stage)
//! })
//! .unwrap();
//! println!("{}", loaded.stats);
//! ```

use std::fmt;

use crate::archive::{ArchiveEntry, ArchiveIndex, ModelArchive};
use crate::error::LoadError;
use crate::fetch::Fetch;
use crate::formats::mtl::{parse_materials, MaterialTable};
use crate::formats::obj::{parse_geometry, MaterialBinding};
use crate::rewriter::ArchiveResolver;
use crate::scene::display::DisplayOptions;
use crate::scene::reconcile::reconcile;
use crate::scene::resources::ResourceTracker;
use crate::scene::Node;
use crate::textures::{build_texture_map, TextureCache};

/// Where a load currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStage {
    #[default]
    Idle,
    Downloading,
    Unzipping,
    ResolvingTextures,
    LoadingMaterials,
    LoadingGeometry {
        with_materials: bool,
    },
    Reconciling,
    Displayed,
    Error,
}

impl LoadStage {
    /// Returns true between the start of a load and its outcome.
    pub fn is_in_flight(self) -> bool {
        !matches!(self, LoadStage::Idle | LoadStage::Displayed | LoadStage::Error)
    }

    /// Text for the loading indicator, or `None` when it should be hidden.
    pub fn progress_message(self) -> Option<&'static str> {
        match self {
            LoadStage::Downloading => Some("Downloading archive..."),
            LoadStage::Unzipping => Some("Processing ZIP..."),
            LoadStage::ResolvingTextures => Some("Loading textures..."),
            LoadStage::LoadingMaterials => Some("Loading materials..."),
            LoadStage::LoadingGeometry {
                with_materials: true,
            } => Some("Loading geometry..."),
            LoadStage::LoadingGeometry {
                with_materials: false,
            } => Some("Loading basic geometry..."),
            LoadStage::Reconciling => Some("Preparing materials..."),
            LoadStage::Idle | LoadStage::Displayed | LoadStage::Error => None,
        }
    }

    /// One-line status for in-flight stages.
    pub fn status_message(self) -> Option<&'static str> {
        match self {
            LoadStage::Downloading => Some("Connecting to server..."),
            LoadStage::Unzipping => Some("Extracting files..."),
            LoadStage::ResolvingTextures => Some("Decoding textures..."),
            LoadStage::LoadingMaterials => Some("Processing MTL..."),
            LoadStage::LoadingGeometry {
                with_materials: true,
            } => Some("Building model..."),
            LoadStage::LoadingGeometry {
                with_materials: false,
            } => Some("Using fallback..."),
            LoadStage::Reconciling => Some("Adjusting materials..."),
            LoadStage::Idle | LoadStage::Displayed | LoadStage::Error => None,
        }
    }
}

/// How materials ended up bound to the loaded model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialMode {
    /// The MTL parsed and the OBJ loaded against it.
    WithMaterials,
    /// The archive had no MTL.
    GeometryOnly,
    /// The MTL or the OBJ-with-materials failed; loaded without materials.
    Fallback,
}

impl fmt::Display for MaterialMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MaterialMode::WithMaterials => "with materials",
            MaterialMode::GeometryOnly => "without materials",
            MaterialMode::Fallback => "without materials (fallback)",
        })
    }
}

/// Counts shown on the stats line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub mesh_count: usize,
    pub triangle_count: usize,
    pub texture_count: usize,
    pub vertex_count: usize,
}

impl fmt::Display for LoadStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Meshes: {} | Triangles: {} | Vertices: {} | Textures: {}",
            self.mesh_count, self.triangle_count, self.vertex_count, self.texture_count
        )
    }
}

/// Session state a load reads and writes.
pub struct LoadContext<'a> {
    pub cache: &'a mut TextureCache,
    pub resources: &'a mut ResourceTracker,
    pub display: &'a DisplayOptions,
}

/// A model ready to be installed.
#[derive(Debug)]
pub struct LoadedModel {
    pub root: Node,
    pub stats: LoadStats,
    pub mode: MaterialMode,
}

/// Fetches `location` and runs the full pipeline on it.
///
/// # Errors
/// Returns the first fatal error. Material errors are logged and recovered.
pub fn load_model(
    location: &str,
    fetcher: &dyn Fetch,
    ctx: &mut LoadContext<'_>,
    on_stage: &mut dyn FnMut(LoadStage),
) -> Result<LoadedModel, LoadError> {
    on_stage(LoadStage::Downloading);
    let bytes = fetcher.fetch(location)?;
    log::info!("Downloaded {} ({} bytes)", location, bytes.len());

    load_archive(bytes, ctx, on_stage)
}

/// Runs the pipeline on archive bytes that are already in memory.
pub fn load_archive(
    bytes: Vec<u8>,
    ctx: &mut LoadContext<'_>,
    on_stage: &mut dyn FnMut(LoadStage),
) -> Result<LoadedModel, LoadError> {
    on_stage(LoadStage::Unzipping);
    let archive = ModelArchive::from_bytes(bytes)?;
    let index = ArchiveIndex::classify(&archive);
    log::info!(
        "Archive holds {} OBJ, {} MTL, {} texture entries",
        index.obj_count(),
        index.mtl_count(),
        index.texture_count()
    );
    let obj_entry = index.primary_obj(&archive).ok_or(LoadError::ObjNotFound)?;

    on_stage(LoadStage::ResolvingTextures);
    let textures = build_texture_map(&archive, &index, ctx.cache);

    let mut material_failed = false;
    let materials = match index.primary_mtl(&archive) {
        None => {
            log::info!("No MTL in archive; loading geometry only");
            None
        }
        Some(mtl_entry) => {
            on_stage(LoadStage::LoadingMaterials);
            let resolver =
                ArchiveResolver::new(&archive, &index, &textures, ctx.cache.placeholder());
            match load_materials(&archive, mtl_entry, &resolver) {
                Ok(table) => {
                    log::info!("Loaded {} materials from {}", table.len(), mtl_entry.path);
                    Some((table, mtl_entry.bare_name()))
                }
                Err(e) => {
                    log::warn!("{}; continuing without materials", e);
                    material_failed = true;
                    None
                }
            }
        }
    };

    let (mut root, mode) = match &materials {
        Some((table, library_name)) => {
            on_stage(LoadStage::LoadingGeometry {
                with_materials: true,
            });
            let binding = MaterialBinding {
                table,
                library_name: *library_name,
            };
            match load_geometry(&archive, obj_entry, Some(binding), ctx.resources) {
                Ok(root) => (root, MaterialMode::WithMaterials),
                Err(e) => {
                    log::warn!("Geometry with materials failed: {}; retrying without", e);
                    on_stage(LoadStage::LoadingGeometry {
                        with_materials: false,
                    });
                    let root = load_geometry(&archive, obj_entry, None, ctx.resources)
                        .map_err(|e| LoadError::GeometryFallbackFailed(e.to_string()))?;
                    (root, MaterialMode::Fallback)
                }
            }
        }
        None => {
            on_stage(LoadStage::LoadingGeometry {
                with_materials: false,
            });
            match load_geometry(&archive, obj_entry, None, ctx.resources) {
                Ok(root) if material_failed => (root, MaterialMode::Fallback),
                Ok(root) => (root, MaterialMode::GeometryOnly),
                Err(e) if material_failed => {
                    return Err(LoadError::GeometryFallbackFailed(e.to_string()))
                }
                Err(e) => return Err(e),
            }
        }
    };

    on_stage(LoadStage::Reconciling);
    let reconciled = reconcile(&mut root, ctx.display, ctx.resources);
    let stats = LoadStats {
        mesh_count: reconciled.mesh_count,
        triangle_count: reconciled.triangle_count,
        texture_count: textures.len(),
        vertex_count: reconciled.vertex_count,
    };
    log::info!("Loaded {} {}: {}", obj_entry.path, mode, stats);

    Ok(LoadedModel { root, stats, mode })
}

fn load_materials(
    archive: &ModelArchive,
    entry: &ArchiveEntry,
    resolver: &ArchiveResolver<'_>,
) -> Result<MaterialTable, LoadError> {
    let text = archive
        .read_text(entry)
        .map_err(|e| LoadError::Material(e.to_string()))?;
    parse_materials(&text, resolver)
}

fn load_geometry(
    archive: &ModelArchive,
    entry: &ArchiveEntry,
    materials: Option<MaterialBinding<'_>>,
    resources: &mut ResourceTracker,
) -> Result<Node, LoadError> {
    let text = archive
        .read_text(entry)
        .map_err(|e| LoadError::Geometry(e.to_string()))?;
    parse_geometry(entry.bare_name(), &text, materials, resources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::tests::build_zip;

    const TRIANGLE: &[u8] = b"v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";

    fn run(files: &[(&str, &[u8])]) -> (Result<LoadedModel, LoadError>, Vec<LoadStage>) {
        let mut cache = TextureCache::new(8, 4);
        let mut resources = ResourceTracker::new();
        let display = DisplayOptions::new();
        let mut ctx = LoadContext {
            cache: &mut cache,
            resources: &mut resources,
            display: &display,
        };
        let mut stages = Vec::new();
        let result = load_archive(build_zip(files), &mut ctx, &mut |s| stages.push(s));
        (result, stages)
    }

    #[test]
    fn test_stage_order_with_materials() {
        let (result, stages) = run(&[
            ("m.obj", TRIANGLE),
            ("m.mtl", b"newmtl a\nKd 1 0 0\n"),
        ]);
        let loaded = result.unwrap();
        assert_eq!(loaded.mode, MaterialMode::WithMaterials);
        assert_eq!(
            stages,
            vec![
                LoadStage::Unzipping,
                LoadStage::ResolvingTextures,
                LoadStage::LoadingMaterials,
                LoadStage::LoadingGeometry {
                    with_materials: true
                },
                LoadStage::Reconciling,
            ]
        );
        assert_eq!(loaded.stats.triangle_count, 1);
    }

    #[test]
    fn test_missing_obj() {
        let (result, stages) = run(&[("m.mtl", b"newmtl a\n")]);
        assert!(matches!(result, Err(LoadError::ObjNotFound)));
        assert_eq!(stages, vec![LoadStage::Unzipping]);
    }

    #[test]
    fn test_geometry_failure_with_materials_is_fallback_error() {
        let (result, stages) = run(&[("m.obj", b"v 0 0 0\n"), ("m.mtl", b"newmtl a\n")]);
        assert!(matches!(result, Err(LoadError::GeometryFallbackFailed(_))));
        assert_eq!(
            stages.last(),
            Some(&LoadStage::LoadingGeometry {
                with_materials: false
            })
        );
    }

    #[test]
    fn test_geometry_only_failure_keeps_its_error() {
        let (result, _) = run(&[("m.obj", b"v 0 0 0\n")]);
        assert!(matches!(result, Err(LoadError::NoGeometry)));
    }

    #[test]
    fn test_stage_messages() {
        assert!(LoadStage::Downloading.is_in_flight());
        assert!(!LoadStage::Displayed.is_in_flight());
        assert_eq!(LoadStage::Error.progress_message(), None);
        assert_eq!(
            LoadStage::LoadingGeometry {
                with_materials: false
            }
            .status_message(),
            Some("Using fallback...")
        );
    }

    #[test]
    fn test_stats_line() {
        let stats = LoadStats {
            mesh_count: 2,
            triangle_count: 10,
            texture_count: 1,
            vertex_count: 12,
        };
        assert_eq!(
            stats.to_string(),
            "Meshes: 2 | Triangles: 10 | Vertices: 12 | Textures: 1"
        );
    }
}
