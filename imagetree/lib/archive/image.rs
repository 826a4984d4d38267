use std::{
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

use getset::Getters;
use tar::EntryType;
use typed_path::{Utf8UnixComponent, Utf8UnixPath};

use crate::{
    config::{ImageOptions, TreeOptions, BLOBS_PREFIX, LAYER_TAR_SUFFIX, MANIFEST_FILENAME},
    tree::{self, Layer, LayerFold},
    FileTreeNode, ImageTreeError, ImageTreeResult,
};

use super::{read_layer, ImageManifest};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// An image archive on disk, as written by `docker save`.
///
/// Both the legacy layout (`<id>/layer.tar`) and the OCI layout (`blobs/sha256/<digest>`) are
/// supported. The layer order always comes from `manifest.json`.
#[derive(Debug, Clone, Getters)]
#[getset(get = "pub with_prefix")]
pub struct ImageArchive {
    /// Path of the archive file.
    path: PathBuf,
}

/// What a cheap pass over an image archive finds without reading any layer.
#[derive(Debug, Default)]
struct Survey {
    manifest: Option<Vec<ImageManifest>>,
    aliases: Vec<(String, String)>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl ImageArchive {
    /// Opens the image archive at `path`.
    pub fn open(path: impl AsRef<Path>) -> ImageTreeResult<Self> {
        let path = path.as_ref().to_path_buf();
        File::open(&path)?;
        Ok(Self { path })
    }

    /// Reads the manifest item selected by `options`.
    pub fn manifest(&self, options: &ImageOptions) -> ImageTreeResult<ImageManifest> {
        let survey = self.survey()?;
        let items = survey.manifest.ok_or(ImageTreeError::MissingManifestOrder)?;
        ImageManifest::select(items, options.get_repo_tag().as_deref())
    }

    /// Merges the layers of the selected image into one tree.
    ///
    /// The archive is read twice: once for the manifest and layer aliases, then once more to
    /// build and fold each layer in turn, so only one layer is held in memory at a time.
    pub fn merged_tree(&self, options: &ImageOptions) -> ImageTreeResult<FileTreeNode> {
        let survey = self.survey()?;
        let items = survey.manifest.ok_or(ImageTreeError::MissingManifestOrder)?;
        let manifest = ImageManifest::select(items, options.get_repo_tag().as_deref())?;

        let mut fold = LayerFold::new();
        for (alias, target) in survey.aliases {
            fold.add_alias(alias, target);
        }
        fold.set_order(manifest.into_layers());

        scan(self.reader()?, &mut fold, options, true)?;
        fold.finish()
    }

    fn survey(&self) -> ImageTreeResult<Survey> {
        let mut survey = Survey::default();
        let mut archive = tar::Archive::new(self.reader()?);

        for entry in archive.entries().map_err(outer_error)? {
            let mut entry = entry.map_err(outer_error)?;
            let name = entry_name(&entry)?;

            if name == MANIFEST_FILENAME {
                let mut bytes = Vec::new();
                entry.read_to_end(&mut bytes).map_err(outer_error)?;
                survey.manifest = Some(ImageManifest::parse_all(&bytes)?);
            } else if is_layer_candidate(&name) && entry.header().entry_type() == EntryType::Symlink
            {
                if let Some(target) = entry.link_name().map_err(outer_error)? {
                    let target = resolve_link(&name, &target.to_string_lossy());
                    survey.aliases.push((name, target));
                }
            }
        }

        Ok(survey)
    }

    fn reader(&self) -> ImageTreeResult<BufReader<File>> {
        Ok(BufReader::new(File::open(&self.path)?))
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Merges the layers of an image archive read from a stream, e.g. standard input.
///
/// The stream is read once. Layers that come before `manifest.json` in the archive are kept
/// until the manifest is found.
pub fn read_image<R: Read>(reader: R, options: &ImageOptions) -> ImageTreeResult<FileTreeNode> {
    let mut fold = LayerFold::new();
    scan(reader, &mut fold, options, false)?;
    fold.finish()
}

/// Renders the subtree `options.root` of the image archive at `path`.
///
/// ## Examples
///
/// ```rust,no_run
/// use imagetree::{archive, config::TreeOptions};
///
/// # fn main() -> imagetree::ImageTreeResult<()> {
/// let text = archive::image_tree("alpine.tar", &TreeOptions::builder().root("/etc").build())?;
/// print!("{text}");
/// # Ok(())
/// # }
/// ```
pub fn image_tree(path: impl AsRef<Path>, options: &TreeOptions) -> ImageTreeResult<String> {
    let merged = ImageArchive::open(path)?.merged_tree(options.get_image())?;
    render_subtree(&merged, options)
}

/// Renders the subtree `options.root` of an image archive read from a stream.
pub fn image_tree_from_reader<R: Read>(
    reader: R,
    options: &TreeOptions,
) -> ImageTreeResult<String> {
    let merged = read_image(reader, options.get_image())?;
    render_subtree(&merged, options)
}

fn render_subtree(merged: &FileTreeNode, options: &TreeOptions) -> ImageTreeResult<String> {
    let node = tree::resolve(merged, options.get_root())?;
    Ok(tree::render(node, options.get_render()))
}

/// Walks the outer image archive once and feeds every layer to `fold`.
fn scan<R: Read>(
    reader: R,
    fold: &mut LayerFold,
    options: &ImageOptions,
    skip_unreferenced: bool,
) -> ImageTreeResult<()> {
    let mut archive = tar::Archive::new(reader);

    for entry in archive.entries().map_err(outer_error)? {
        let mut entry = entry.map_err(outer_error)?;
        let name = entry_name(&entry)?;
        let entry_type = entry.header().entry_type();

        if name == MANIFEST_FILENAME {
            if fold.has_order() {
                continue;
            }

            let mut bytes = Vec::new();
            entry.read_to_end(&mut bytes).map_err(outer_error)?;
            let items = ImageManifest::parse_all(&bytes)?;
            let manifest = ImageManifest::select(items, options.get_repo_tag().as_deref())?;
            tracing::debug!("manifest lists {} layers", manifest.get_layers().len());
            fold.set_order(manifest.into_layers());
            continue;
        }

        if !is_layer_candidate(&name) {
            continue;
        }

        match entry_type {
            EntryType::Symlink => {
                if skip_unreferenced {
                    continue;
                }

                if let Some(target) = entry.link_name().map_err(outer_error)? {
                    let target = resolve_link(&name, &target.to_string_lossy());
                    tracing::debug!("layer {name} is a link to {target}");
                    fold.add_alias(name, target);
                }
            }
            EntryType::Regular | EntryType::Continuous => {
                if skip_unreferenced && !fold.wants(&name) {
                    tracing::debug!("skipping {name}: not a layer of the selected image");
                    continue;
                }

                match read_layer(&mut entry) {
                    Ok(records) => {
                        tracing::debug!("read layer {name} with {} entries", records.len());
                        fold.offer(Layer::new(name, FileTreeNode::from_records(records)));
                    }
                    Err(error) if error.is_skippable() => {
                        tracing::debug!("skipping {name}: {error}");
                    }
                    Err(error) => return Err(error),
                }
            }
            _ => {}
        }
    }

    Ok(())
}

fn entry_name<R: Read>(entry: &tar::Entry<'_, R>) -> ImageTreeResult<String> {
    let path = entry.path().map_err(outer_error)?;
    let name = path.to_string_lossy();
    Ok(name.strip_prefix("./").unwrap_or(&name).to_string())
}

fn is_layer_candidate(name: &str) -> bool {
    name.ends_with(LAYER_TAR_SUFFIX) || name.starts_with(BLOBS_PREFIX)
}

/// Resolves the target of a symlinked archive entry to an archive path.
fn resolve_link(name: &str, target: &str) -> String {
    let parent = Utf8UnixPath::new(name)
        .parent()
        .unwrap_or_else(|| Utf8UnixPath::new(""));
    let joined = parent.join(target);

    let mut segments = Vec::new();
    for component in joined.components() {
        match component {
            Utf8UnixComponent::Normal(segment) => segments.push(segment),
            Utf8UnixComponent::ParentDir => {
                segments.pop();
            }
            Utf8UnixComponent::RootDir | Utf8UnixComponent::CurDir => {}
        }
    }

    segments.join("/")
}

fn outer_error(error: std::io::Error) -> ImageTreeError {
    ImageTreeError::CorruptImage(error.to_string())
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
