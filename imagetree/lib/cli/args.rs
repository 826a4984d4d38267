use std::path::PathBuf;

use clap::Parser;
use typed_path::Utf8UnixPathBuf;

use crate::config::{ImageOptions, RenderOptions, TreeOptions, DEFAULT_TREE_ROOT};

use super::styles;

//-------------------------------------------------------------------------------------------------
// Constants
//-------------------------------------------------------------------------------------------------

/// The archive argument that reads the image archive from standard input.
pub const STDIN_ARCHIVE: &str = "-";

//-------------------------------------------------------------------------------------------------
// Types
//-------------------------------------------------------------------------------------------------

/// imagetree displays the directory tree of a container image, like `tree` does for a directory
///
/// The image is read from an archive written by `docker save` (or `podman save`). Provide a
/// directory to see the tree relative to it.
#[derive(Debug, Parser)]
#[command(name = "imagetree", author, version, styles=styles::styles())]
pub struct ImageTreeArgs {
    /// Path to the image archive, or `-` to read it from standard input
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Directory inside the image to show the tree of
    #[arg(value_name = "DIRECTORY", default_value = DEFAULT_TREE_ROOT)]
    pub directory: Utf8UnixPathBuf,

    /// Show symlink destinations
    #[arg(short, long)]
    pub links: bool,

    /// Descend at most this many levels below the directory
    #[arg(short = 'L', long, value_name = "LEVEL")]
    pub level: Option<usize>,

    /// Pick the image with this repo tag when the archive holds several
    #[arg(short, long, value_name = "REPO:TAG")]
    pub tag: Option<String>,

    /// Suppress status output
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

//-------------------------------------------------------------------------------------------------
// Methods
//-------------------------------------------------------------------------------------------------

impl ImageTreeArgs {
    /// Returns `true` if the archive should be read from standard input.
    pub fn reads_stdin(&self) -> bool {
        self.archive.as_os_str() == STDIN_ARCHIVE
    }

    /// Builds the tree options the arguments ask for.
    pub fn tree_options(&self) -> TreeOptions {
        TreeOptions::builder()
            .root(self.directory.as_str())
            .image(ImageOptions::builder().repo_tag(self.tag.clone()).build())
            .render(
                RenderOptions::builder()
                    .show_links(self.links)
                    .max_depth(self.level)
                    .build(),
            )
            .build()
    }
}

//-------------------------------------------------------------------------------------------------
// Tests
//-------------------------------------------------------------------------------------------------
