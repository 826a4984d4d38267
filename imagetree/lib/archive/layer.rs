use std::io::{BufRead, BufReader, Read};

use flate2::read::GzDecoder;
use getset::Getters;
use tar::EntryType;

use crate::{EntryKind, ImageTreeError, ImageTreeResult};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The first two bytes of every gzip stream.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// One entry of a layer archive.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
#[getset(get = "pub with_prefix")]
pub struct PathRecord {
    /// The full path of the entry, as stored in the archive.
    path: String,

    /// What kind of entry it is.
    kind: EntryKind,

    /// The symlink target. Empty for anything but symlinks.
    link_target: String,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl PathRecord {
    /// Creates a record without a link target.
    pub fn new(path: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            path: path.into(),
            kind,
            link_target: String::new(),
        }
    }

    /// Sets the symlink target of the record.
    pub fn with_link_target(mut self, target: impl Into<String>) -> Self {
        self.link_target = target.into();
        self
    }

    /// Splits the record into path, kind and link target.
    pub fn into_parts(self) -> (String, EntryKind, String) {
        (self.path, self.kind, self.link_target)
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Reads the path records of one layer archive, in archive order.
///
/// The stream may be a plain tar archive or a gzip-compressed one. Whiteout and opaque markers
/// come back as ordinary records.
///
/// ## Errors
///
/// - [`ImageTreeError::NotAnArchive`] if the stream is not a (compressed) tar archive, e.g. an
///   image config blob. Callers are expected to skip such blobs.
/// - [`ImageTreeError::Io`] if the underlying stream cannot be read at all.
pub fn read_layer<R: Read>(reader: R) -> ImageTreeResult<Vec<PathRecord>> {
    let mut reader = BufReader::new(reader);
    let is_gzip = reader.fill_buf()?.starts_with(&GZIP_MAGIC);

    if is_gzip {
        tracing::trace!("layer is gzip-compressed");
        read_tar(GzDecoder::new(reader))
    } else {
        read_tar(reader)
    }
}

fn read_tar<R: Read>(reader: R) -> ImageTreeResult<Vec<PathRecord>> {
    let mut archive = tar::Archive::new(reader);
    let mut records = Vec::new();

    for entry in archive.entries().map_err(not_an_archive)? {
        let entry = entry.map_err(not_an_archive)?;
        let kind = match entry.header().entry_type() {
            EntryType::Directory => EntryKind::Directory,
            EntryType::Regular | EntryType::Continuous | EntryType::GNUSparse => {
                EntryKind::RegularFile
            }
            EntryType::Symlink => EntryKind::Symlink,
            EntryType::XGlobalHeader
            | EntryType::XHeader
            | EntryType::GNULongName
            | EntryType::GNULongLink => continue,
            _ => EntryKind::Other,
        };

        let path = entry.path().map_err(not_an_archive)?;
        let mut record = PathRecord::new(path.to_string_lossy(), kind);

        if kind == EntryKind::Symlink {
            if let Some(target) = entry.link_name().map_err(not_an_archive)? {
                record = record.with_link_target(target.to_string_lossy());
            }
        }

        records.push(record);
    }

    Ok(records)
}

fn not_an_archive(error: std::io::Error) -> ImageTreeError {
    ImageTreeError::NotAnArchive(error.to_string())
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
