use crate::{ImageTreeError, ImageTreeResult};

use super::FileTreeNode;

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl FileTreeNode {
    /// Finds the node at `path` below this node.
    ///
    /// Empty segments from leading, trailing or repeated `/` are skipped, so `""`, `"/"` and
    /// `"//"` all resolve to this node.
    pub fn find(&self, path: &str) -> Option<&FileTreeNode> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(self, |node, segment| node.get_child(segment))
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Resolves `path` in `tree`, failing with [`ImageTreeError::PathNotFound`] if it is absent.
pub fn resolve<'a>(tree: &'a FileTreeNode, path: &str) -> ImageTreeResult<&'a FileTreeNode> {
    tree.find(path)
        .ok_or_else(|| ImageTreeError::PathNotFound(path.to_string()))
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
