use std::{
    collections::BTreeMap,
    fmt::{self, Display},
};

use getset::Getters;

use crate::config::RenderOptions;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The name of the root node of every tree.
pub const ROOT_NAME: &str = "/";

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The kind of filesystem entry a node or path record stands for.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// A directory.
    #[default]
    Directory,

    /// A regular file.
    RegularFile,

    /// A symbolic link.
    Symlink,

    /// Anything else: hard links, devices, FIFOs.
    Other,
}

/// One path segment of a file tree.
///
/// A node owns its children, keyed and ordered by name. The ordering is the byte order of the
/// names, so any traversal of `children` is already sorted.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
#[getset(get = "pub with_prefix")]
pub struct FileTreeNode {
    /// The segment name. `/` for the root.
    name: String,

    /// What kind of entry this is.
    kind: EntryKind,

    /// The symlink target. Empty unless `kind` is [`EntryKind::Symlink`].
    link_target: String,

    /// The children of this node, by name.
    children: BTreeMap<String, FileTreeNode>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl EntryKind {
    /// Returns `true` for [`EntryKind::Directory`].
    pub fn is_dir(&self) -> bool {
        matches!(self, EntryKind::Directory)
    }
}

impl FileTreeNode {
    /// Creates an empty root directory.
    pub fn root() -> Self {
        Self::dir(ROOT_NAME)
    }

    /// Creates an empty directory node.
    pub fn dir(name: impl Into<String>) -> Self {
        Self::new(name, EntryKind::Directory)
    }

    /// Creates a regular file node.
    pub fn file(name: impl Into<String>) -> Self {
        Self::new(name, EntryKind::RegularFile)
    }

    /// Creates a symlink node pointing at `target`.
    pub fn symlink(name: impl Into<String>, target: impl Into<String>) -> Self {
        let mut node = Self::new(name, EntryKind::Symlink);
        node.link_target = target.into();
        node
    }

    /// Creates a childless node of the given kind.
    pub fn new(name: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
            link_target: String::new(),
            children: BTreeMap::new(),
        }
    }

    /// Adds `child` under its own name, replacing any existing child of that name.
    pub fn with_child(mut self, child: FileTreeNode) -> Self {
        self.insert_child(child);
        self
    }

    /// Inserts `child` under its own name and returns the node it replaced, if any.
    pub fn insert_child(&mut self, child: FileTreeNode) -> Option<FileTreeNode> {
        self.children.insert(child.name.clone(), child)
    }

    /// Removes the child called `name` together with its subtree.
    pub fn remove_child(&mut self, name: &str) -> Option<FileTreeNode> {
        self.children.remove(name)
    }

    /// Returns the child called `name`.
    pub fn get_child(&self, name: &str) -> Option<&FileTreeNode> {
        self.children.get(name)
    }

    /// Returns `true` if this node is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }

    /// Returns `true` if this node is the root of a tree.
    pub fn is_root(&self) -> bool {
        self.name == ROOT_NAME
    }

    /// Counts this node and all of its descendants.
    pub fn len(&self) -> usize {
        1 + self.children.values().map(FileTreeNode::len).sum::<usize>()
    }

    /// Returns `true` if this node has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Overwrites kind and link target, keeping name and children.
    pub(crate) fn set_attributes(&mut self, kind: EntryKind, link_target: String) {
        self.kind = kind;
        self.link_target = link_target;
    }

    pub(crate) fn children_mut(&mut self) -> &mut BTreeMap<String, FileTreeNode> {
        &mut self.children
    }

    pub(crate) fn into_children(self) -> BTreeMap<String, FileTreeNode> {
        self.children
    }

    /// Returns the child called `name`, creating it as an empty directory if it is missing.
    pub(crate) fn child_or_dir(&mut self, name: &str) -> &mut FileTreeNode {
        self.children
            .entry(name.to_string())
            .or_insert_with(|| FileTreeNode::dir(name))
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Default for FileTreeNode {
    fn default() -> Self {
        Self::root()
    }
}

impl Display for FileTreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&super::render(self, &RenderOptions::default()))
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
