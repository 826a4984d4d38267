use getset::{CopyGetters, Getters};
use typed_builder::TypedBuilder;

use super::DEFAULT_TREE_ROOT;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Options controlling how a tree is rendered.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, TypedBuilder, CopyGetters)]
#[getset(get_copy = "pub with_prefix")]
pub struct RenderOptions {
    /// Append ` -> target` to symlinks.
    #[builder(default)]
    show_links: bool,

    /// The maximum number of edges to descend from the rendered root. `None` is unbounded.
    #[builder(default)]
    max_depth: Option<usize>,
}

/// Options controlling how an image archive is turned into a merged tree.
#[derive(Debug, Default, Clone, PartialEq, Eq, TypedBuilder, Getters)]
#[getset(get = "pub with_prefix")]
pub struct ImageOptions {
    /// The `repo:tag` of the manifest item to merge. The first item is used when unset.
    #[builder(default)]
    repo_tag: Option<String>,
}

/// Options for rendering a subtree of an image archive in one call.
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder, Getters)]
#[getset(get = "pub with_prefix")]
pub struct TreeOptions {
    /// The path of the subtree to render.
    #[builder(default = DEFAULT_TREE_ROOT.to_string(), setter(into))]
    root: String,

    /// How to select the image inside the archive.
    #[builder(default)]
    image: ImageOptions,

    /// How to render the subtree.
    #[builder(default)]
    render: RenderOptions,
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Default for TreeOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
