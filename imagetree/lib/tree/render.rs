use std::fmt::Write;

use crate::config::RenderOptions;

use super::{EntryKind, FileTreeNode};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

const SPACE: &str = "    ";
const BRANCH: &str = "│   ";
const MIDDLE: &str = "├── ";
const LAST: &str = "└── ";
const LINK: &str = " -> ";

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Renders `node` and its descendants as an ASCII-art tree.
///
/// The rendered root is printed bare; every other line carries a connector, and directories
/// other than the rendered root get a trailing `/`. Children come out in their stored order.
///
/// ## Examples
///
/// ```
/// use imagetree::{tree, config::RenderOptions, FileTreeNode};
///
/// let root = FileTreeNode::root()
///     .with_child(FileTreeNode::dir("etc").with_child(FileTreeNode::file("file")))
///     .with_child(FileTreeNode::file("other_file"));
///
/// assert_eq!(
///     tree::render(&root, &RenderOptions::default()),
///     "/\n├── etc/\n│   └── file\n└── other_file\n"
/// );
/// ```
pub fn render(node: &FileTreeNode, options: &RenderOptions) -> String {
    let mut output = String::new();
    output.push_str(node.get_name());
    push_link(&mut output, node, options);
    output.push('\n');

    render_children(&mut output, node, "", 0, options);
    output
}

fn render_children(
    output: &mut String,
    node: &FileTreeNode,
    prefix: &str,
    depth: usize,
    options: &RenderOptions,
) {
    if options.get_max_depth().is_some_and(|max| depth >= max) {
        return;
    }

    let count = node.get_children().len();
    for (index, child) in node.get_children().values().enumerate() {
        let is_last = index + 1 == count;
        let (connector, continuation) = if is_last {
            (LAST, SPACE)
        } else {
            (MIDDLE, BRANCH)
        };

        output.push_str(prefix);
        output.push_str(connector);
        output.push_str(child.get_name());
        if child.is_dir() {
            output.push('/');
        }
        push_link(output, child, options);
        output.push('\n');

        let child_prefix = format!("{prefix}{continuation}");
        render_children(output, child, &child_prefix, depth + 1, options);
    }
}

fn push_link(output: &mut String, node: &FileTreeNode, options: &RenderOptions) {
    if options.get_show_links()
        && *node.get_kind() == EntryKind::Symlink
        && !node.get_link_target().is_empty()
    {
        let _ = write!(output, "{LINK}{}", node.get_link_target());
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
