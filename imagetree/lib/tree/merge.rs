use std::collections::BTreeMap;

use super::FileTreeNode;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The prefix for whiteout files
pub const WHITEOUT_PREFIX: &str = ".wh.";

/// The marker for opaque directories
pub const OPAQUE_MARKER: &str = ".wh..wh..opq";

/// Names with this prefix are reserved for union filesystem metadata (e.g. `.wh..wh.plnk`).
const WHITEOUT_META_PREFIX: &str = ".wh..wh.";

/// Self-referential entry some archive producers emit for the layer root.
const PSEUDO_ENTRY: &str = ".";

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// What a reserved overlay entry asks the merge to do.
#[derive(Debug, PartialEq, Eq)]
enum Marker<'a> {
    /// Discard every pre-existing child of the directory.
    Opaque,

    /// Delete the named sibling.
    Whiteout(&'a str),

    /// Union filesystem bookkeeping; dropped without effect.
    Meta,
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Merges `overlay` on top of `base` and returns the result.
///
/// Per directory level, the overlay is applied in this order:
/// 1. `.` entries are ignored.
/// 2. An opaque marker (`.wh..wh..opq`) discards every existing child of the directory.
/// 3. A whiteout (`.wh.<name>`) deletes the existing child `<name>` and its subtree.
/// 4. Every other entry is inserted when new, merged recursively when a child of the same name
///    and kind exists, or replaces the existing child wholesale when the kind differs.
///
/// Markers never end up in the result, and markers naming entries that do not exist are no-ops.
/// The root of `base` is kept as is.
///
/// ## Examples
///
/// ```
/// use imagetree::{tree, FileTreeNode};
///
/// let base = FileTreeNode::root()
///     .with_child(FileTreeNode::dir("etc").with_child(FileTreeNode::file("motd")));
/// let overlay = FileTreeNode::root()
///     .with_child(FileTreeNode::dir("etc").with_child(FileTreeNode::file(".wh.motd")));
///
/// let merged = tree::merge(base, overlay);
/// assert!(merged.find("/etc").unwrap().is_empty());
/// ```
pub fn merge(mut base: FileTreeNode, overlay: FileTreeNode) -> FileTreeNode {
    merge_into(&mut base, overlay);
    base
}

/// Merges `overlay` on top of `base` in place. See [`merge`].
pub fn merge_into(base: &mut FileTreeNode, overlay: FileTreeNode) {
    merge_children(base, overlay.into_children());
}

fn merge_children(base: &mut FileTreeNode, overlay: BTreeMap<String, FileTreeNode>) {
    let (markers, entries): (Vec<_>, Vec<_>) = overlay
        .into_iter()
        .filter(|(name, _)| name != PSEUDO_ENTRY)
        .partition(|(name, _)| marker(name).is_some());

    let markers: Vec<_> = markers.iter().filter_map(|(name, _)| marker(name)).collect();

    if markers.contains(&Marker::Opaque) {
        tracing::trace!(
            "opaque marker resets {} ({} children)",
            base.get_name(),
            base.get_children().len()
        );
        base.children_mut().clear();
    }

    for found in markers {
        if let Marker::Whiteout(target) = found {
            if base.remove_child(target).is_none() {
                tracing::trace!("whiteout for missing entry {target} in {}", base.get_name());
            }
        }
    }

    for (name, child) in entries {
        match base.children_mut().get_mut(&name) {
            Some(existing) => merge_node(existing, child),
            None => {
                base.insert_child(settle(child));
            }
        }
    }
}

fn merge_node(base: &mut FileTreeNode, overlay: FileTreeNode) {
    if base.get_kind() != overlay.get_kind() {
        *base = settle(overlay);
        return;
    }

    base.set_attributes(*overlay.get_kind(), overlay.get_link_target().clone());
    merge_children(base, overlay.into_children());
}

/// Drops every marker and pseudo entry from a subtree that has no base counterpart.
fn settle(mut node: FileTreeNode) -> FileTreeNode {
    settle_in_place(&mut node);
    node
}

fn settle_in_place(node: &mut FileTreeNode) {
    let children = node.children_mut();
    children.retain(|name, _| name != PSEUDO_ENTRY && marker(name).is_none());
    for child in children.values_mut() {
        settle_in_place(child);
    }
}

fn marker(name: &str) -> Option<Marker<'_>> {
    if name == OPAQUE_MARKER {
        Some(Marker::Opaque)
    } else if name.starts_with(WHITEOUT_META_PREFIX) {
        Some(Marker::Meta)
    } else {
        name.strip_prefix(WHITEOUT_PREFIX).map(Marker::Whiteout)
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
