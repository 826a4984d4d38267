use crate::archive::PathRecord;

use super::FileTreeNode;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

const CURRENT_DIR: &str = ".";

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl FileTreeNode {
    /// Builds the tree fragment of one layer from its path records.
    ///
    /// Every record creates the missing directories along its path and then stamps its kind and
    /// link target onto the terminal node. Whiteout and opaque markers are stored like any other
    /// entry; they are interpreted by [`merge`](super::merge), not here.
    ///
    /// ## Examples
    ///
    /// ```
    /// use imagetree::{archive::PathRecord, EntryKind, FileTreeNode};
    ///
    /// let tree = FileTreeNode::from_records([
    ///     PathRecord::new("etc/", EntryKind::Directory),
    ///     PathRecord::new("etc/hosts", EntryKind::RegularFile),
    /// ]);
    ///
    /// assert!(tree.find("/etc/hosts").is_some());
    /// ```
    pub fn from_records(records: impl IntoIterator<Item = PathRecord>) -> Self {
        let mut root = FileTreeNode::root();
        for record in records {
            root.insert_record(record);
        }

        root
    }

    /// Adds a single path record to this tree.
    ///
    /// A record that revisits an existing path overwrites its kind and link target. Empty and
    /// `.` segments are skipped, so `./srv/app` lands at `srv/app`. Records addressing the root
    /// itself (`/`, `./`) are ignored.
    pub fn insert_record(&mut self, record: PathRecord) {
        let (path, kind, link_target) = record.into_parts();
        let mut segments = path
            .split('/')
            .filter(|segment| !segment.is_empty() && *segment != CURRENT_DIR)
            .peekable();

        if segments.peek().is_none() {
            tracing::trace!("ignoring record for the layer root: {path:?}");
            return;
        }

        let mut current = self;
        for segment in segments {
            current = current.child_or_dir(segment);
        }

        current.set_attributes(kind, link_target);
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
