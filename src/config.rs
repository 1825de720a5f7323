//! Provides the viewer configuration.
//!
//! Every field has a default, so a config file only needs to name what it
//! overrides.
//!
//! # Examples
//! ```
//! use objzip::config::{QualityMode, ViewerConfig};
//!
//! let config = ViewerConfig::from_json_str(r#"{ "light_intensity": 75 }"#).unwrap();
//! assert_eq!(config.light_intensity, 75);
//! assert_eq!(config.quality, QualityMode::Performance);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Render quality trade-off.
///
/// # Examples
/// ```
/// use objzip::config::QualityMode;
///
/// assert_eq!(QualityMode::Performance.toggled(), QualityMode::Quality);
/// assert_eq!(QualityMode::Quality.samples_per_axis(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityMode {
    /// One sample per pixel.
    #[default]
    Performance,
    /// 2x2 supersampling.
    Quality,
}

impl QualityMode {
    /// Returns the other mode.
    pub fn toggled(self) -> Self {
        match self {
            QualityMode::Performance => QualityMode::Quality,
            QualityMode::Quality => QualityMode::Performance,
        }
    }

    /// Returns the supersampling factor along each screen axis.
    pub fn samples_per_axis(self) -> u32 {
        match self {
            QualityMode::Performance => 1,
            QualityMode::Quality => 2,
        }
    }
}

/// Settings for a viewer session.
///
/// # Examples
/// ```
/// use objzip::config::ViewerConfig;
///
/// let config = ViewerConfig::default();
/// assert_eq!(config.texture_cache_capacity, 256);
/// assert!(config.shadows);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Maximum number of textures kept in the session cache.
    pub texture_cache_capacity: usize,
    /// Edge length of the generated placeholder texture, in pixels.
    pub placeholder_size: u32,
    /// Initial light intensity in percent (0-100).
    pub light_intensity: u8,
    /// Initial render quality mode.
    pub quality: QualityMode,
    /// Whether meshes start in wireframe mode.
    pub wireframe: bool,
    /// Whether meshes start casting and receiving shadows.
    pub shadows: bool,
    /// Upper bound for a downloaded archive body, in bytes.
    pub max_archive_bytes: u64,
    /// Edge length of images rendered by the CLI.
    pub render_size: u32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            texture_cache_capacity: 256,
            placeholder_size: 256,
            light_intensity: 50,
            quality: QualityMode::Performance,
            wireframe: false,
            shadows: true,
            max_archive_bytes: 256 * 1024 * 1024,
            render_size: 512,
        }
    }
}

impl ViewerConfig {
    /// Parses a configuration from JSON text.
    ///
    /// # Errors
    /// Returns an error if the JSON is malformed or a value is out of range.
    ///
    /// # Examples
    /// ```
    /// use objzip::config::{QualityMode, ViewerConfig};
    ///
    /// let config = ViewerConfig::from_json_str(r#"{ "quality": "quality" }"#).unwrap();
    /// assert_eq!(config.quality, QualityMode::Quality);
    /// ```
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: ViewerConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a configuration from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    ///
    /// # Examples
    /// ```
    /// use std::path::Path;
    ///
    /// use objzip::config::ViewerConfig;
    ///
    /// assert!(ViewerConfig::from_path(Path::new("does_not_exist.json")).is_err());
    /// ```
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.light_intensity > 100 {
            return Err(ConfigError::Invalid {
                field: "light_intensity",
                reason: format!("{} is above 100", self.light_intensity),
            });
        }
        if self.placeholder_size == 0 {
            return Err(ConfigError::Invalid {
                field: "placeholder_size",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.texture_cache_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "texture_cache_capacity",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = ViewerConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ViewerConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = ViewerConfig::from_json_str(
            r#"{ "wireframe": true, "shadows": false, "texture_cache_capacity": 8 }"#,
        )
        .unwrap();
        assert!(config.wireframe);
        assert!(!config.shadows);
        assert_eq!(config.texture_cache_capacity, 8);
        assert_eq!(config.placeholder_size, 256);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let err = ViewerConfig::from_json_str(r#"{ "light_intensity": 101 }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "light_intensity",
                ..
            }
        ));

        let err = ViewerConfig::from_json_str(r#"{ "texture_cache_capacity": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_from_path() {
        let path = std::env::temp_dir().join("objzip_config_test.json");
        std::fs::write(&path, r#"{ "render_size": 128 }"#).unwrap();
        let config = ViewerConfig::from_path(&path);
        let _ = std::fs::remove_file(&path);
        assert_eq!(config.unwrap().render_size, 128);
    }
}
