//! Provides the error types shared by the load pipeline and configuration.
//!
//! Only a subset of [`LoadError`] ever reaches the user: material and texture
//! failures are recovered where they happen and merely logged.
//!
//! # Examples
//! ```
//! use objzip::error::LoadError;
//!
//! let err = LoadError::ObjNotFound;
//! assert_eq!(format!("{}", err), "OBJ not found in archive");
//! ```

/// Errors that can occur while loading a model archive.
///
/// # Examples
/// ```
/// use objzip::error::LoadError;
///
/// let err = LoadError::Http { status: 404, reason: "Not Found".into() };
/// assert_eq!(err.to_string(), "HTTP error 404: Not Found");
/// assert!(err.is_fatal());
/// ```
#[derive(Debug, Clone, thiserror::Error)]
pub enum LoadError {
    /// The server answered with a non-success status.
    #[error("HTTP error {status}: {reason}")]
    Http { status: u16, reason: String },

    /// The request never produced a response (DNS, connection, IO).
    #[error("Network error: {0}")]
    Network(String),

    /// The downloaded bytes are not a readable ZIP archive.
    #[error("Invalid archive: {0}")]
    Archive(String),

    /// The archive holds no `.obj` entry.
    #[error("OBJ not found in archive")]
    ObjNotFound,

    /// The MTL file could not be read or parsed. Recovered by loading
    /// geometry without materials.
    #[error("Material loading failed: {0}")]
    Material(String),

    /// The OBJ file could not be read or parsed.
    #[error("Geometry loading failed: {0}")]
    Geometry(String),

    /// The OBJ parsed but produced no meshes.
    #[error("No geometry found")]
    NoGeometry,

    /// Geometry failed on the materials-free fallback path as well.
    #[error("Could not load model even without materials: {0}")]
    GeometryFallbackFailed(String),

    /// Another load is still in flight on this viewer.
    #[error("A model is already loading")]
    Busy,
}

impl LoadError {
    /// Returns true for errors that terminate a load.
    ///
    /// Material errors are the only recoverable kind that travels as a
    /// `LoadError`; the orchestrator downgrades them to warnings.
    ///
    /// # Examples
    /// ```
    /// use objzip::error::LoadError;
    ///
    /// assert!(!LoadError::Material("bad Kd".into()).is_fatal());
    /// assert!(LoadError::ObjNotFound.is_fatal());
    /// ```
    pub fn is_fatal(&self) -> bool {
        !matches!(self, LoadError::Material(_))
    }
}

impl From<zip::result::ZipError> for LoadError {
    fn from(e: zip::result::ZipError) -> Self {
        LoadError::Archive(e.to_string())
    }
}

/// Errors that can occur while reading a viewer configuration.
///
/// # Examples
/// ```
/// use objzip::config::ViewerConfig;
/// use objzip::error::ConfigError;
///
/// let err = ViewerConfig::from_json_str("{ not json").unwrap_err();
/// assert!(matches!(err, ConfigError::Parse(_)));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}
