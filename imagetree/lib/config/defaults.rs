//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The path rendered when no directory is requested.
pub const DEFAULT_TREE_ROOT: &str = "/";

/// The environment variable holding the log filter for the `imagetree` binary.
pub const IMAGETREE_LOG_ENV_VAR: &str = "IMAGETREE_LOG";

/// The log filter used when [`IMAGETREE_LOG_ENV_VAR`] is not set.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// The log filter used in verbose mode.
pub const VERBOSE_LOG_FILTER: &str = "imagetree=debug";

/// The name of the image manifest inside an image archive.
pub const MANIFEST_FILENAME: &str = "manifest.json";

/// Suffix of layer payloads in the legacy `docker save` layout.
pub const LAYER_TAR_SUFFIX: &str = "layer.tar";

/// Prefix of content-addressed blobs in the OCI image layout.
pub const BLOBS_PREFIX: &str = "blobs/sha256/";
