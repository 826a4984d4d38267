//! Reading image and layer archives.
//!
//! This module provides functionality for:
//! - Reading the path records of a single (optionally gzip-compressed) layer tarball
//! - Parsing the `manifest.json` of an image archive for the authoritative layer order
//! - Driving the layer fold over a whole `docker save` image archive

mod image;
mod layer;
mod manifest;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use image::*;
pub use layer::*;
pub use manifest::*;
