use getset::Getters;
use serde::{Deserialize, Serialize};

use crate::{ImageTreeError, ImageTreeResult};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

const DEFAULT_TAG: &str = "latest";

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// One image entry of an image archive's `manifest.json`.
///
/// `Layers` holds the archive paths of the image's layers, bottom to top. It is the
/// authoritative layer order.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "PascalCase")]
#[getset(get = "pub with_prefix")]
pub struct ImageManifest {
    /// Archive path of the image configuration.
    #[serde(default)]
    config: String,

    /// The tags the image was saved with. `null` for untagged images.
    #[serde(default)]
    repo_tags: Option<Vec<String>>,

    /// Archive paths of the layers, bottom to top.
    #[serde(default)]
    layers: Vec<String>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl ImageManifest {
    /// Creates a manifest item from a config path, tags and layer paths.
    pub fn new(
        config: impl Into<String>,
        repo_tags: Option<Vec<String>>,
        layers: Vec<String>,
    ) -> Self {
        Self {
            config: config.into(),
            repo_tags,
            layers,
        }
    }

    /// Parses the contents of a `manifest.json` file.
    pub fn parse_all(bytes: &[u8]) -> ImageTreeResult<Vec<ImageManifest>> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Picks the manifest item tagged `repo_tag`, or the first item when no tag is given.
    ///
    /// A tag without an explicit version matches `:latest`, as it does for container engines.
    ///
    /// ## Errors
    ///
    /// - [`ImageTreeError::MissingManifestOrder`] if `items` is empty.
    /// - [`ImageTreeError::ImageTagNotFound`] if no item carries `repo_tag`.
    pub fn select(
        items: Vec<ImageManifest>,
        repo_tag: Option<&str>,
    ) -> ImageTreeResult<ImageManifest> {
        let Some(repo_tag) = repo_tag else {
            return items
                .into_iter()
                .next()
                .ok_or(ImageTreeError::MissingManifestOrder);
        };

        if items.is_empty() {
            return Err(ImageTreeError::MissingManifestOrder);
        }

        let wanted = with_default_tag(repo_tag);
        items
            .into_iter()
            .find(|item| item.has_tag(&wanted))
            .ok_or_else(|| ImageTreeError::ImageTagNotFound(repo_tag.to_string()))
    }

    /// Returns `true` if the image was saved with `repo_tag`.
    pub fn has_tag(&self, repo_tag: &str) -> bool {
        self.repo_tags
            .iter()
            .flatten()
            .any(|tag| with_default_tag(tag) == repo_tag)
    }

    /// Consumes the manifest item and returns its layer order.
    pub fn into_layers(self) -> Vec<String> {
        self.layers
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

fn with_default_tag(repo_tag: &str) -> String {
    let name = repo_tag.rsplit('/').next().unwrap_or(repo_tag);
    if name.contains(':') || name.contains('@') {
        repo_tag.to_string()
    } else {
        format!("{repo_tag}:{DEFAULT_TAG}")
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
