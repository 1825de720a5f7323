//! Retrieves archive bytes from a URL or the local filesystem.

use std::path::Path;

use crate::error::LoadError;

/// Source of archive bytes.
pub trait Fetch {
    /// Returns the full body stored at `location`.
    fn fetch(&self, location: &str) -> Result<Vec<u8>, LoadError>;
}

/// Fetches `http://` and `https://` URLs over the network and anything else
/// from disk, with `file://` stripped.
///
/// # Examples
/// ```
/// use objzip::error::LoadError;
/// use objzip::fetch::{DefaultFetcher, Fetch};
///
/// let fetcher = DefaultFetcher::new(1024);
/// let err = fetcher.fetch("file:///does/not/exist.zip").unwrap_err();
/// assert!(matches!(err, LoadError::Network(_)));
/// ```
#[derive(Debug, Clone)]
pub struct DefaultFetcher {
    max_bytes: u64,
}

impl DefaultFetcher {
    /// Creates a fetcher that refuses bodies larger than `max_bytes`.
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    fn fetch_http(&self, url: &str) -> Result<Vec<u8>, LoadError> {
        let mut response = ureq::get(url).call().map_err(http_error)?;
        response
            .body_mut()
            .with_config()
            .limit(self.max_bytes)
            .read_to_vec()
            .map_err(http_error)
    }

    fn fetch_file(&self, path: &Path) -> Result<Vec<u8>, LoadError> {
        let io_error = |e: std::io::Error| LoadError::Network(format!("{}: {}", path.display(), e));

        let len = std::fs::metadata(path).map_err(io_error)?.len();
        if len > self.max_bytes {
            return Err(LoadError::Network(format!(
                "{} is {} bytes, limit is {}",
                path.display(),
                len,
                self.max_bytes
            )));
        }
        std::fs::read(path).map_err(io_error)
    }
}

impl Fetch for DefaultFetcher {
    fn fetch(&self, location: &str) -> Result<Vec<u8>, LoadError> {
        let lower = location.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            log::debug!("GET {}", location);
            self.fetch_http(location)
        } else {
            let path = location.strip_prefix("file://").unwrap_or(location);
            self.fetch_file(Path::new(path))
        }
    }
}

fn http_error(e: ureq::Error) -> LoadError {
    match e {
        ureq::Error::StatusCode(status) => LoadError::Http {
            status,
            reason: ureq::http::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("Unknown")
                .to_string(),
        },
        other => LoadError::Network(other.to_string()),
    }
}
