use std::{fs, io::Write, path::PathBuf};

use flate2::{write::GzEncoder, Compression};
use serde_json::json;
use tar::{Builder, EntryType, Header};
use tempfile::{tempdir, TempDir};

use imagetree::{
    archive::{self, ImageArchive},
    config::{ImageOptions, RenderOptions, TreeOptions},
    ImageTreeError,
};

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

const MERGED: &str = "\
/
├── bin/
│   ├── ash -> sh
│   └── sh
├── etc/
│   ├── hosts
│   └── os-release
└── usr/
    └── lib/
        └── libz.so
";

#[test_log::test]
fn test_image_legacy_layout() -> anyhow::Result<()> {
    let bytes = save(vec![
        Member::file("manifest.json", manifest(&["l0/layer.tar", "l1/layer.tar", "l2/layer.tar"])),
        Member::file("cfg.json", br#"{"os":"linux"}"#.to_vec()),
        Member::file("l0/VERSION", b"1.0".to_vec()),
        Member::file("l0/json", b"{}".to_vec()),
        Member::file("l0/layer.tar", base_layer()),
        Member::file("l1/layer.tar", middle_layer()),
        Member::file("l2/layer.tar", gzip(&top_layer())?),
    ])?;

    let options = links();
    assert_eq!(render_both(&bytes, &options)?, MERGED);
    Ok(())
}

#[test_log::test]
fn test_image_oci_layout_manifest_last() -> anyhow::Result<()> {
    let bytes = save(vec![
        Member::file("oci-layout", br#"{"imageLayoutVersion":"1.0.0"}"#.to_vec()),
        Member::file("index.json", br#"{"schemaVersion":2,"manifests":[]}"#.to_vec()),
        Member::file("blobs/sha256/top", gzip(&top_layer())?),
        Member::file("blobs/sha256/config", br#"{"architecture":"amd64","os":"linux"}"#.to_vec()),
        Member::file("blobs/sha256/base", gzip(&base_layer())?),
        Member::file("blobs/sha256/middle", middle_layer()),
        Member::file(
            "manifest.json",
            manifest(&["blobs/sha256/base", "blobs/sha256/middle", "blobs/sha256/top"]),
        ),
    ])?;

    assert_eq!(render_both(&bytes, &links())?, MERGED);
    Ok(())
}

#[test_log::test]
fn test_image_missing_manifest() -> anyhow::Result<()> {
    let bytes = save(vec![Member::file("l0/layer.tar", base_layer())])?;
    let (_dir, path) = write_archive(&bytes)?;

    let from_file = archive::image_tree(&path, &TreeOptions::default());
    assert!(matches!(from_file, Err(ImageTreeError::MissingManifestOrder)));

    let from_stream = archive::image_tree_from_reader(bytes.as_slice(), &TreeOptions::default());
    assert!(matches!(from_stream, Err(ImageTreeError::MissingManifestOrder)));
    Ok(())
}

#[test_log::test]
fn test_image_select_by_tag() -> anyhow::Result<()> {
    let manifest = json!([
        {
            "Config": "a.json",
            "RepoTags": ["base:1.0"],
            "Layers": ["l0/layer.tar"]
        },
        {
            "Config": "b.json",
            "RepoTags": ["app:latest"],
            "Layers": ["l0/layer.tar", "l1/layer.tar"]
        }
    ]);
    let bytes = save(vec![
        Member::file("manifest.json", serde_json::to_vec(&manifest)?),
        Member::file("l0/layer.tar", base_layer()),
        Member::file("l1/layer.tar", middle_layer()),
    ])?;
    let (_dir, path) = write_archive(&bytes)?;

    let first = archive::image_tree(&path, &TreeOptions::default())?;
    assert!(first.contains("motd"));
    assert!(!first.contains("usr/"));

    let options = TreeOptions::builder()
        .image(ImageOptions::builder().repo_tag(Some("app".to_string())).build())
        .build();
    let tagged = render_both(&bytes, &options)?;
    assert!(!tagged.contains("motd"));
    assert!(tagged.contains("libc.so"));

    let selected = ImageArchive::open(&path)?.manifest(options.get_image())?;
    assert_eq!(selected.get_config(), "b.json");

    let options = TreeOptions::builder()
        .image(ImageOptions::builder().repo_tag(Some("app:2.0".to_string())).build())
        .build();
    assert!(matches!(
        archive::image_tree(&path, &options),
        Err(ImageTreeError::ImageTagNotFound(tag)) if tag == "app:2.0"
    ));
    Ok(())
}

#[test_log::test]
fn test_image_symlinked_layer() -> anyhow::Result<()> {
    let removes_sh = layer(&[("bin/.wh.sh", EntryType::Regular, None)]);
    let bytes = save(vec![
        Member::file("manifest.json", manifest(&["l0/layer.tar", "l1/layer.tar", "l2/layer.tar"])),
        Member::link("l2/layer.tar", "../l0/layer.tar"),
        Member::file("l0/layer.tar", base_layer()),
        Member::file("l1/layer.tar", removes_sh),
    ])?;

    let options = TreeOptions::builder().root("/bin").build();
    assert_eq!(render_both(&bytes, &options)?, "bin\n├── ash\n└── sh\n");
    Ok(())
}

#[test_log::test]
fn test_image_skips_layer_listed_but_absent() -> anyhow::Result<()> {
    let bytes = save(vec![
        Member::file("manifest.json", manifest(&["l0/layer.tar", "gone/layer.tar"])),
        Member::file("l0/layer.tar", base_layer()),
    ])?;

    let options = TreeOptions::builder()
        .render(RenderOptions::builder().max_depth(Some(1)).build())
        .build();
    assert_eq!(render_both(&bytes, &options)?, "/\n├── bin/\n└── etc/\n");
    Ok(())
}

#[test_log::test]
fn test_image_subtree_and_missing_path() -> anyhow::Result<()> {
    let bytes = save(vec![
        Member::file("manifest.json", manifest(&["l0/layer.tar", "l1/layer.tar", "l2/layer.tar"])),
        Member::file("l0/layer.tar", base_layer()),
        Member::file("l1/layer.tar", middle_layer()),
        Member::file("l2/layer.tar", top_layer()),
    ])?;

    let options = TreeOptions::builder().root("/usr/").build();
    assert_eq!(render_both(&bytes, &options)?, "usr\n└── lib/\n    └── libz.so\n");

    let options = TreeOptions::builder().root("/etc/motd").build();
    let (_dir, path) = write_archive(&bytes)?;
    assert!(matches!(
        archive::image_tree(&path, &options),
        Err(ImageTreeError::PathNotFound(missing)) if missing == "/etc/motd"
    ));
    Ok(())
}

#[test_log::test]
fn test_image_corrupt_archive_is_fatal() -> anyhow::Result<()> {
    let garbage = b"not an image at all, just text".to_vec();
    let saved = save(vec![
        Member::file("manifest.json", manifest(&["l0/layer.tar"])),
        Member::file("l0/layer.tar", base_layer()),
    ])?;
    // Drop the end-of-archive blocks and the tail of the last layer.
    let truncated = saved[..saved.len() - 1024 - 300].to_vec();

    for bytes in [garbage, truncated] {
        let (_dir, path) = write_archive(&bytes)?;
        let results = [
            archive::image_tree(&path, &TreeOptions::default()),
            archive::image_tree_from_reader(bytes.as_slice(), &TreeOptions::default()),
        ];

        for result in results {
            let error = result.expect_err("a corrupt image archive must fail");
            assert!(matches!(error, ImageTreeError::CorruptImage(_)), "{error}");
            assert!(!error.is_skippable());
        }
    }
    Ok(())
}

#[test_log::test]
fn test_image_layer_with_current_dir_prefix() -> anyhow::Result<()> {
    let dotted = raw_layer(&[
        ("./", EntryType::Directory),
        ("./srv/", EntryType::Directory),
        ("./srv/app", EntryType::Regular),
    ]);
    let bytes = save(vec![
        Member::file("manifest.json", manifest(&["l0/layer.tar", "l1/layer.tar"])),
        Member::file("l0/layer.tar", base_layer()),
        Member::file("l1/layer.tar", dotted),
    ])?;

    let options = TreeOptions::builder().root("/srv").build();
    assert_eq!(render_both(&bytes, &options)?, "srv\n└── app\n");
    Ok(())
}

//--------------------------------------------------------------------------------------------------
// Types: Helpers
//--------------------------------------------------------------------------------------------------

/// A member of an image archive.
enum Member {
    File(String, Vec<u8>),
    Link(String, String),
}

impl Member {
    fn file(path: &str, data: Vec<u8>) -> Self {
        Self::File(path.to_string(), data)
    }

    fn link(path: &str, target: &str) -> Self {
        Self::Link(path.to_string(), target.to_string())
    }
}

//--------------------------------------------------------------------------------------------------
// Functions: Helpers
//--------------------------------------------------------------------------------------------------

/// bin/{sh, ash -> sh}, etc/{hosts, motd}
fn base_layer() -> Vec<u8> {
    layer(&[
        ("bin", EntryType::Directory, None),
        ("bin/sh", EntryType::Regular, None),
        ("bin/ash", EntryType::Symlink, Some("sh")),
        ("etc", EntryType::Directory, None),
        ("etc/hosts", EntryType::Regular, None),
        ("etc/motd", EntryType::Regular, None),
    ])
}

/// Deletes etc/motd, adds etc/os-release and usr/lib/libc.so.
fn middle_layer() -> Vec<u8> {
    layer(&[
        ("etc/.wh.motd", EntryType::Regular, None),
        ("etc/os-release", EntryType::Regular, None),
        ("usr", EntryType::Directory, None),
        ("usr/lib", EntryType::Directory, None),
        ("usr/lib/libc.so", EntryType::Regular, None),
    ])
}

/// Replaces the contents of usr/lib with libz.so.
fn top_layer() -> Vec<u8> {
    layer(&[
        ("usr/lib", EntryType::Directory, None),
        ("usr/lib/.wh..wh..opq", EntryType::Regular, None),
        ("usr/lib/libz.so", EntryType::Regular, None),
    ])
}

fn layer(entries: &[(&str, EntryType, Option<&str>)]) -> Vec<u8> {
    let mut builder = Builder::new(Vec::new());
    for (path, kind, link) in entries {
        let mut header = Header::new_gnu();
        header.set_entry_type(*kind);
        header.set_size(0);
        header.set_mode(if kind.is_dir() { 0o755 } else { 0o644 });
        if let Some(link) = link {
            header.set_link_name(link).unwrap();
        }
        builder.append_data(&mut header, path, std::io::empty()).unwrap();
    }
    builder.into_inner().unwrap()
}

/// Writes entry names verbatim, `./` prefix included, the way `tar -C rootfs -cf layer.tar .` does.
fn raw_layer(entries: &[(&str, EntryType)]) -> Vec<u8> {
    let mut builder = Builder::new(Vec::new());
    for (path, kind) in entries {
        let mut header = Header::new_gnu();
        header.as_old_mut().name[..path.len()].copy_from_slice(path.as_bytes());
        header.set_entry_type(*kind);
        header.set_size(0);
        header.set_mode(if kind.is_dir() { 0o755 } else { 0o644 });
        header.set_cksum();
        builder.append(&header, std::io::empty()).unwrap();
    }
    builder.into_inner().unwrap()
}

fn manifest(layers: &[&str]) -> Vec<u8> {
    let manifest = json!([{
        "Config": "cfg.json",
        "RepoTags": ["test:latest"],
        "Layers": layers,
    }]);
    serde_json::to_vec(&manifest).unwrap()
}

fn gzip(bytes: &[u8]) -> anyhow::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?)
}

/// Builds an image archive the way `docker save` lays one out.
fn save(members: Vec<Member>) -> anyhow::Result<Vec<u8>> {
    let mut builder = Builder::new(Vec::new());
    for member in members {
        let mut header = Header::new_gnu();
        header.set_mode(0o644);
        match member {
            Member::File(path, data) => {
                header.set_entry_type(EntryType::Regular);
                header.set_size(data.len() as u64);
                builder.append_data(&mut header, path, data.as_slice())?;
            }
            Member::Link(path, target) => {
                header.set_entry_type(EntryType::Symlink);
                header.set_size(0);
                header.set_link_name(target)?;
                builder.append_data(&mut header, path, std::io::empty())?;
            }
        }
    }
    Ok(builder.into_inner()?)
}

fn write_archive(bytes: &[u8]) -> anyhow::Result<(TempDir, PathBuf)> {
    let dir = tempdir()?;
    let path = dir.path().join("image.tar");
    fs::write(&path, bytes)?;
    Ok((dir, path))
}

/// Renders the archive from a file and from a stream, and checks both agree.
fn render_both(bytes: &[u8], options: &TreeOptions) -> anyhow::Result<String> {
    let (_dir, path) = write_archive(bytes)?;
    let from_file = archive::image_tree(&path, options)?;
    let from_stream = archive::image_tree_from_reader(bytes, options)?;
    assert_eq!(from_file, from_stream);
    Ok(from_file)
}

fn links() -> TreeOptions {
    TreeOptions::builder()
        .render(RenderOptions::builder().show_links(true).build())
        .build()
}
