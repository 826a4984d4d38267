//! File trees of image layers and the union merge that combines them.
//!
//! A layer's archive entries are built into a [`FileTreeNode`] fragment, fragments are folded
//! bottom-to-top with [`merge`] (honoring OCI whiteout and opaque markers), and the result can
//! be navigated with [`resolve`] and printed with [`render`].

mod builder;
mod fold;
mod merge;
mod node;
mod render;
mod resolve;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use fold::*;
pub use merge::*;
pub use node::*;
pub use render::*;
pub use resolve::*;
