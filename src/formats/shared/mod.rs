//! Provides shared utilities for the OBJ and MTL loaders.
//!
//! # Examples
//! ```
//! use objzip::formats::shared::path::bare_filename;
//!
//! assert_eq!(bare_filename("textures/wood.png"), "wood.png");
//! ```

pub mod path;

pub use path::{bare_filename, file_stem, is_image};
