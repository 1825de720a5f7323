//! Provides the MTL and OBJ text loaders.
//!
//! The MTL side rewrites texture directives and builds a [`mtl::MaterialTable`];
//! the OBJ side turns geometry into scene nodes bound to that table.

pub mod mtl;
pub mod obj;
pub mod shared;
