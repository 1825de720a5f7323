//! Display options for controlling how the current model is drawn.

use crate::config::ViewerConfig;

/// Display toggles shared by the controls, the reconciler and the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayOptions {
    /// Whether meshes are drawn as triangle edges only.
    pub wireframe: bool,
    /// Whether meshes cast and receive shadows.
    pub shadows: bool,
    /// Whether the control panel is shown.
    pub ui_visible: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            wireframe: false,
            shadows: true,
            ui_visible: true,
        }
    }
}

impl DisplayOptions {
    /// Create display options with the defaults: solid, shadows on, UI shown.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create display options from the session configuration.
    pub fn from_config(config: &ViewerConfig) -> Self {
        Self {
            wireframe: config.wireframe,
            shadows: config.shadows,
            ui_visible: true,
        }
    }

    /// Get whether wireframe mode is on.
    pub fn wireframe(&self) -> bool {
        self.wireframe
    }

    /// Set whether wireframe mode is on.
    pub fn set_wireframe(&mut self, on: bool) {
        self.wireframe = on;
    }

    /// Get whether shadows are enabled.
    pub fn shadows(&self) -> bool {
        self.shadows
    }

    /// Set whether shadows are enabled.
    pub fn set_shadows(&mut self, on: bool) {
        self.shadows = on;
    }

    /// Get whether the UI is visible.
    pub fn ui_visible(&self) -> bool {
        self.ui_visible
    }

    /// Set whether the UI is visible.
    pub fn set_ui_visible(&mut self, visible: bool) {
        self.ui_visible = visible;
    }
}
