//! Provides the viewer session.
//!
//! A [`Viewer`] owns everything that outlives a single load: the texture
//! cache, the scene with the current model, the camera, display toggles,
//! lighting and the status lines shown to the user. Controls may be invoked
//! at any time and apply to whatever model is current.
//!
//! # Examples
//! ```
//! use objzip::config::ViewerConfig;
//! use objzip::viewer::Viewer;
//!
//! let mut viewer = Viewer::new(ViewerConfig::default());
//! assert!(viewer.start("?other=1").is_none());
//! assert_eq!(viewer.status().status, "Use: ?file=URL_OF_YOUR_MODEL.zip");
//!
//! // Rendering works with nothing loaded.
//! let pixels = viewer.render(8, 8);
//! assert_eq!(pixels.len(), 8 * 8 * 4);
//! ```

use glam::Vec3;

use crate::camera::{Camera, INSTALL_FRAMING, MOVE_STEP, RESET_FRAMING};
use crate::config::{QualityMode, ViewerConfig};
use crate::error::LoadError;
use crate::fetch::{DefaultFetcher, Fetch};
use crate::loader::{load_model, LoadContext, LoadStage, LoadStats};
use crate::query::{model_url_from_query, USAGE_HINT};
use crate::renderer::{render_scene, RenderSettings};
use crate::scene::display::DisplayOptions;
use crate::scene::reconcile::apply_display;
use crate::scene::Scene;
use crate::textures::TextureCache;

/// The three text channels of the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusBoard {
    /// Loading indicator text; `None` hides the indicator.
    pub progress: Option<String>,
    /// One-line status message.
    pub status: String,
    /// Stats line for the current model.
    pub stats: String,
}

/// A viewer session.
pub struct Viewer {
    fetcher: Box<dyn Fetch>,
    cache: TextureCache,
    scene: Scene,
    camera: Camera,
    display: DisplayOptions,
    light_intensity: u8,
    quality: QualityMode,
    stage: LoadStage,
    status: StatusBoard,
    stats: Option<LoadStats>,
}

impl Viewer {
    /// Creates a viewer that fetches over HTTP or from disk.
    pub fn new(config: ViewerConfig) -> Self {
        let fetcher = DefaultFetcher::new(config.max_archive_bytes);
        Self::with_fetcher(config, Box::new(fetcher))
    }

    /// Creates a viewer with a custom byte source.
    pub fn with_fetcher(config: ViewerConfig, fetcher: Box<dyn Fetch>) -> Self {
        Self {
            fetcher,
            cache: TextureCache::new(config.texture_cache_capacity, config.placeholder_size),
            scene: Scene::new(),
            camera: Camera::default(),
            display: DisplayOptions::from_config(&config),
            light_intensity: config.light_intensity.min(100),
            quality: config.quality,
            stage: LoadStage::Idle,
            status: StatusBoard::default(),
            stats: None,
        }
    }

    // ---- Loading ----

    /// Loads the archive named by the `file` query parameter.
    ///
    /// Returns `None` and shows the usage hint when the parameter is absent.
    pub fn start(&mut self, query: &str) -> Option<Result<LoadStats, LoadError>> {
        match model_url_from_query(query) {
            Some(url) => Some(self.load(&url)),
            None => {
                log::info!("No file parameter in query");
                self.status.progress = None;
                self.status.status = USAGE_HINT.to_string();
                None
            }
        }
    }

    /// Loads an archive and installs it as the current model.
    ///
    /// On failure the previous model stays displayed and the status line
    /// carries the error.
    ///
    /// # Errors
    /// Returns [`LoadError::Busy`] while another load is in flight, or the
    /// load's fatal error.
    pub fn load(&mut self, location: &str) -> Result<LoadStats, LoadError> {
        // Loads complete within this call, so this does not guard reentrancy;
        // it only trips when the stage was left in flight.
        if self.stage.is_in_flight() {
            log::warn!("Rejected load of {}: {:?} in progress", location, self.stage);
            return Err(LoadError::Busy);
        }
        log::info!("Loading {}", location);

        let Viewer {
            fetcher,
            cache,
            scene,
            display,
            stage,
            status,
            ..
        } = self;
        let mut ctx = LoadContext {
            cache,
            resources: &mut scene.resources,
            display,
        };
        let result = load_model(location, &**fetcher, &mut ctx, &mut |next| {
            log::info!("Stage: {:?}", next);
            *stage = next;
            status.progress = next.progress_message().map(str::to_string);
            if let Some(message) = next.status_message() {
                status.status = message.to_string();
            }
        });

        match result {
            Ok(loaded) => {
                self.scene.install(loaded.root);
                if let Some(bounds) = self.scene.current().and_then(|m| m.bounds()) {
                    self.camera.frame(bounds, INSTALL_FRAMING);
                }
                self.stage = LoadStage::Displayed;
                self.status.progress = None;
                self.status.status = format!("Model loaded {}!", loaded.mode);
                self.status.stats = loaded.stats.to_string();
                self.stats = Some(loaded.stats);
                Ok(loaded.stats)
            }
            Err(e) => {
                log::error!("Failed to load {}: {}", location, e);
                self.stage = LoadStage::Error;
                self.status.progress = None;
                self.status.status = format!("Failed to load: {}", e);
                Err(e)
            }
        }
    }

    // ---- Controls ----

    /// Frames the current model, or returns to the home position.
    pub fn reset_camera(&mut self) {
        match self.scene.current().and_then(|m| m.bounds()) {
            Some(bounds) => {
                self.camera.frame(bounds, RESET_FRAMING);
                self.status.status = "Camera reset".to_string();
            }
            None => {
                self.camera.go_home();
                self.status.status = "Camera at home position".to_string();
            }
        }
    }

    pub fn toggle_wireframe(&mut self) -> bool {
        self.display.wireframe = !self.display.wireframe;
        self.sync_display();
        self.status.status = if self.display.wireframe {
            "Wireframe mode on"
        } else {
            "Solid mode on"
        }
        .to_string();
        self.display.wireframe
    }

    pub fn toggle_shadows(&mut self) -> bool {
        self.display.shadows = !self.display.shadows;
        self.sync_display();
        self.status.status = if self.display.shadows {
            "Shadows on"
        } else {
            "Shadows off"
        }
        .to_string();
        self.display.shadows
    }

    /// Removes the current model and releases its resources.
    pub fn dispose_current_model(&mut self) {
        self.scene.dispose_current();
        self.stats = None;
        self.status.status = "Scene cleared".to_string();
        self.status.stats = "Ready for new model".to_string();
    }

    pub fn toggle_ui(&mut self) -> bool {
        self.display.ui_visible = !self.display.ui_visible;
        self.display.ui_visible
    }

    /// Sets the light intensity in percent, clamped to 0-100.
    pub fn set_light_intensity(&mut self, percent: u8) {
        self.light_intensity = percent.min(100);
        self.status.status = format!("Light intensity {}%", self.light_intensity);
    }

    pub fn toggle_quality_mode(&mut self) -> QualityMode {
        self.quality = self.quality.toggled();
        self.status.status = match self.quality {
            QualityMode::Performance => "Performance mode",
            QualityMode::Quality => "Quality mode",
        }
        .to_string();
        self.quality
    }

    /// Keyboard shortcuts: `w`/`s`, `a`/`d` and `q`/`e` move the camera
    /// along z, x and y; `r` resets it; `h` toggles the UI. Returns false for
    /// unbound keys.
    pub fn handle_key(&mut self, key: char) -> bool {
        let step = match key.to_ascii_lowercase() {
            'w' => Vec3::new(0.0, 0.0, -MOVE_STEP),
            's' => Vec3::new(0.0, 0.0, MOVE_STEP),
            'a' => Vec3::new(-MOVE_STEP, 0.0, 0.0),
            'd' => Vec3::new(MOVE_STEP, 0.0, 0.0),
            'q' => Vec3::new(0.0, -MOVE_STEP, 0.0),
            'e' => Vec3::new(0.0, MOVE_STEP, 0.0),
            'r' => {
                self.reset_camera();
                return true;
            }
            'h' => {
                self.toggle_ui();
                return true;
            }
            _ => return false,
        };
        self.camera.translate(step);
        true
    }

    fn sync_display(&mut self) {
        let display = &self.display;
        if let Some(model) = self.scene.current_mut() {
            model.for_each_mesh_mut(&mut |mesh| apply_display(mesh, display));
        }
    }

    // ---- Rendering ----

    /// Renders the current model, or the empty scene, to RGBA8 pixels.
    pub fn render(&self, width: u32, height: u32) -> Vec<u8> {
        let settings = RenderSettings {
            width,
            height,
            samples_per_axis: self.quality.samples_per_axis(),
            light_scale: self.light_intensity as f32 / 50.0,
        };
        render_scene(self.scene.current(), &self.camera, &settings)
    }

    // ---- Accessors ----

    pub fn status(&self) -> &StatusBoard {
        &self.status
    }

    pub fn stage(&self) -> LoadStage {
        self.stage
    }

    /// Stats of the displayed model.
    pub fn stats(&self) -> Option<LoadStats> {
        self.stats
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn display(&self) -> &DisplayOptions {
        &self.display
    }

    pub fn cache(&self) -> &TextureCache {
        &self.cache
    }

    /// Clears the texture cache, keeping the placeholder.
    pub fn clear_texture_cache(&mut self) {
        log::info!(
            "Clearing texture cache ({} of {} entries used)",
            self.cache.len(),
            self.cache.capacity()
        );
        self.cache.clear();
    }

    pub fn light_intensity(&self) -> u8 {
        self.light_intensity
    }

    pub fn quality(&self) -> QualityMode {
        self.quality
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NeverFetch;

    impl Fetch for NeverFetch {
        fn fetch(&self, _: &str) -> Result<Vec<u8>, LoadError> {
            Err(LoadError::Http {
                status: 500,
                reason: "Internal Server Error".into(),
            })
        }
    }

    fn viewer() -> Viewer {
        Viewer::with_fetcher(ViewerConfig::default(), Box::new(NeverFetch))
    }

    #[test]
    fn test_rejects_load_while_in_flight() {
        let mut viewer = viewer();
        viewer.stage = LoadStage::ResolvingTextures;
        assert!(matches!(viewer.load("a.zip"), Err(LoadError::Busy)));
        assert_eq!(viewer.stage(), LoadStage::ResolvingTextures);
    }

    #[test]
    fn test_http_error_reaches_status() {
        let mut viewer = viewer();
        let err = viewer.start("?file=http%3A%2F%2Fhost%2Fm.zip").unwrap().unwrap_err();
        assert!(matches!(err, LoadError::Http { status: 500, .. }));
        assert_eq!(viewer.stage(), LoadStage::Error);
        assert_eq!(viewer.status().progress, None);
        assert_eq!(
            viewer.status().status,
            "Failed to load: HTTP error 500: Internal Server Error"
        );
        // A finished load does not block the next one.
        assert!(!matches!(viewer.load("again.zip"), Err(LoadError::Busy)));
    }

    #[test]
    fn test_controls_without_model() {
        let mut viewer = viewer();
        viewer.handle_key('w');
        assert_eq!(viewer.camera().position, Vec3::new(5.0, 5.0, 4.5));
        viewer.reset_camera();
        assert_eq!(*viewer.camera(), Camera::default());

        assert!(viewer.toggle_wireframe());
        assert!(!viewer.toggle_shadows());
        assert!(!viewer.toggle_ui());
        assert!(viewer.handle_key('H'));
        assert!(viewer.display().ui_visible);
        assert!(!viewer.handle_key('x'));

        viewer.set_light_intensity(250);
        assert_eq!(viewer.light_intensity(), 100);
        assert_eq!(viewer.toggle_quality_mode(), QualityMode::Quality);

        viewer.dispose_current_model();
        assert_eq!(viewer.status().stats, "Ready for new model");
    }
}
