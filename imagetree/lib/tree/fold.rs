use std::collections::HashMap;

use getset::Getters;

use crate::{ImageTreeError, ImageTreeResult};

use super::{merge_into, FileTreeNode};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The tree fragment of one image layer.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
#[getset(get = "pub with_prefix")]
pub struct Layer {
    /// The layer's id: its path inside the image archive, as the manifest lists it.
    id: String,

    /// Everything the layer adds, changes or deletes.
    tree: FileTreeNode,
}

/// Folds layers into a cumulative tree in manifest order, whatever order they arrive in.
///
/// Layers are merged as soon as every layer below them has been merged, and dropped right
/// after. Layers that arrive before the manifest order is known are held until it is.
///
/// ## Examples
///
/// ```
/// use imagetree::{tree::{Layer, LayerFold}, FileTreeNode};
///
/// let mut fold = LayerFold::new();
/// fold.offer(Layer::new("top", FileTreeNode::root().with_child(FileTreeNode::file(".wh.a"))));
/// fold.offer(Layer::new("bottom", FileTreeNode::root().with_child(FileTreeNode::file("a"))));
/// fold.set_order(vec!["bottom".to_string(), "top".to_string()]);
///
/// let merged = fold.finish()?;
/// assert!(merged.is_empty());
/// # Ok::<(), imagetree::ImageTreeError>(())
/// ```
#[derive(Debug, Default)]
pub struct LayerFold {
    cumulative: FileTreeNode,
    order: Option<Vec<String>>,
    next: usize,
    pending: HashMap<String, FileTreeNode>,
    aliases: HashMap<String, String>,
    folded: usize,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Layer {
    /// Creates a new layer.
    pub fn new(id: impl Into<String>, tree: FileTreeNode) -> Self {
        Self {
            id: id.into(),
            tree,
        }
    }

    /// Splits the layer into its id and tree.
    pub fn into_parts(self) -> (String, FileTreeNode) {
        (self.id, self.tree)
    }
}

impl LayerFold {
    /// Creates a fold with an empty cumulative tree and no known order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the bottom-to-top layer order and folds whatever is already available.
    pub fn set_order(&mut self, order: Vec<String>) {
        if self.order.is_some() {
            tracing::warn!("layer order already set, ignoring the new one");
            return;
        }

        self.order = Some(order);
        self.advance();
    }

    /// Returns `true` once the layer order is known.
    pub fn has_order(&self) -> bool {
        self.order.is_some()
    }

    /// Records that the layer `alias` has the same content as the layer `target`.
    pub fn add_alias(&mut self, alias: impl Into<String>, target: impl Into<String>) {
        self.aliases.insert(alias.into(), target.into());
        self.advance();
    }

    /// Hands a layer to the fold.
    pub fn offer(&mut self, layer: Layer) {
        let (id, tree) = layer.into_parts();
        if self.pending.insert(id.clone(), tree).is_some() {
            tracing::warn!("layer {id} offered twice, keeping the last one");
        }

        self.advance();
    }

    /// Returns `true` if the layer `id` still has a place in the order, or the order is unknown.
    pub fn wants(&self, id: &str) -> bool {
        match &self.order {
            Some(order) => order
                .iter()
                .skip(self.next)
                .any(|entry| self.resolve(entry) == id),
            None => true,
        }
    }

    /// Returns the number of layers merged so far.
    pub fn folded(&self) -> usize {
        self.folded
    }

    /// Merges the remaining layers and returns the cumulative tree.
    ///
    /// Layers listed in the order but never offered are skipped with a warning.
    ///
    /// ## Errors
    ///
    /// [`ImageTreeError::MissingManifestOrder`] if no order was set or it is empty.
    pub fn finish(mut self) -> ImageTreeResult<FileTreeNode> {
        let total = match &self.order {
            Some(order) if !order.is_empty() => order.len(),
            _ => return Err(ImageTreeError::MissingManifestOrder),
        };

        while self.next < total {
            self.advance();
            if self.next < total {
                let id = self.order_id(self.next).unwrap_or_default();
                tracing::warn!("layer {id} listed in the manifest was not found, skipping");
                self.next += 1;
            }
        }

        for id in self.pending.keys() {
            tracing::debug!("layer {id} is not part of the manifest order");
        }

        tracing::debug!("folded {} of {total} layers", self.folded);
        Ok(self.cumulative)
    }

    /// Folds layers while the next one in order is available.
    fn advance(&mut self) {
        while let Some(id) = self.order_id(self.next) {
            if !self.pending.contains_key(&id) {
                break;
            }

            let needed_later = self
                .order
                .iter()
                .flatten()
                .skip(self.next + 1)
                .any(|later| self.resolve(later) == id);

            let tree = if needed_later {
                self.pending.get(&id).cloned()
            } else {
                self.pending.remove(&id)
            };

            if let Some(tree) = tree {
                tracing::info!("applying layer {}: {id}", self.next);
                merge_into(&mut self.cumulative, tree);
                self.folded += 1;
            }

            self.next += 1;
        }
    }

    /// Returns the resolved id of the layer at `position` in the order.
    fn order_id(&self, position: usize) -> Option<String> {
        let id = self.order.as_ref()?.get(position)?;
        Some(self.resolve(id).to_string())
    }

    fn resolve<'a>(&'a self, id: &'a str) -> &'a str {
        let mut current = id;
        for _ in 0..=self.aliases.len() {
            match self.aliases.get(current) {
                Some(target) => current = target,
                None => break,
            }
        }

        current
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Folds layers that are already in bottom-to-top order into one tree.
///
/// The first layer is merged into an empty root like every other layer, so markers it carries
/// are dropped too.
pub fn fold_layers(layers: impl IntoIterator<Item = Layer>) -> FileTreeNode {
    layers
        .into_iter()
        .enumerate()
        .fold(FileTreeNode::root(), |mut cumulative, (index, layer)| {
            let (id, tree) = layer.into_parts();
            tracing::info!("applying layer {index}: {id}");
            merge_into(&mut cumulative, tree);
            cumulative
        })
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
