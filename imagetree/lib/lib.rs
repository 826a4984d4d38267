//! `imagetree` shows the merged filesystem of a container image as a directory tree.
//!
//! # Overview
//!
//! A container image is a stack of layers. Each layer is a tar archive that adds, changes or
//! deletes files relative to the layers below it. Deletions are recorded with whiteout markers:
//!
//! - `.wh.<name>` deletes `<name>` from the layers below
//! - `.wh..wh..opq` hides everything the layers below put in its directory
//!
//! imagetree reads an image archive written by `docker save`, builds a tree from every layer,
//! merges the trees in the order `manifest.json` lists them and renders the result:
//!
//! ```text
//! /
//! ├── bin/
//! │   └── sh
//! └── etc/
//!     └── hosts
//! ```
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use imagetree::{
//!     archive::ImageArchive,
//!     config::{ImageOptions, RenderOptions},
//!     tree,
//! };
//!
//! fn main() -> anyhow::Result<()> {
//!     let merged = ImageArchive::open("alpine.tar")?.merged_tree(&ImageOptions::default())?;
//!     let etc = tree::resolve(&merged, "/etc")?;
//!
//!     let options = RenderOptions::builder().show_links(true).max_depth(Some(1)).build();
//!     print!("{}", tree::render(etc, &options));
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`archive`] - Reading image archives and their layers
//! - [`tree`] - The file tree, the layer merge and rendering
//! - [`config`] - Options and defaults
//! - [`cli`] - Command-line interface and argument parsing

#![warn(missing_docs)]

mod error;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub mod archive;
pub mod cli;
pub mod config;
pub mod tree;

pub use error::*;
pub use tree::{EntryKind, FileTreeNode};
