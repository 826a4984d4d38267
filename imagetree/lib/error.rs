use thiserror::Error;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The result of an imagetree-related operation.
pub type ImageTreeResult<T> = Result<T, ImageTreeError>;

/// An error that occurred while reading, merging or rendering an image tree.
#[derive(pretty_error_debug::Debug, Error)]
pub enum ImageTreeError {
    /// An I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A candidate layer blob is not a tar archive. Callers skip such blobs.
    #[error("not a tar archive: {0}")]
    NotAnArchive(String),

    /// The image archive itself is truncated or not a tar archive.
    #[error("corrupt image archive: {0}")]
    CorruptImage(String),

    /// The image carries no manifest, or the manifest lists no layers.
    #[error("image manifest with layer order is missing or empty")]
    MissingManifestOrder,

    /// The manifest could not be parsed.
    #[error("error parsing image manifest: {0}")]
    ManifestParse(#[from] serde_json::Error),

    /// No manifest item carries the requested repo tag.
    #[error("no image tagged {0} in the archive")]
    ImageTagNotFound(String),

    /// The requested path does not exist in the merged tree.
    #[error("there is no such path in the image: {0}")]
    PathNotFound(String),
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl ImageTreeError {
    /// Returns `true` if the error only means the blob was not a layer and can be skipped.
    pub fn is_skippable(&self) -> bool {
        matches!(self, ImageTreeError::NotAnArchive(_))
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
