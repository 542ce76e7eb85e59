//! Release archive extraction.

use std::collections::BTreeSet;
use std::io::Cursor;
use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Context, Result};
use flate2::read::GzDecoder;
use tar::{Archive, EntryType};

fn open(data: &[u8]) -> Archive<GzDecoder<Cursor<&[u8]>>> {
    Archive::new(GzDecoder::new(Cursor::new(data)))
}

/// Metadata entries that carry no file of their own.
fn is_metadata(entry_type: EntryType) -> bool {
    matches!(
        entry_type,
        EntryType::XGlobalHeader | EntryType::XHeader | EntryType::GNULongName | EntryType::GNULongLink
    )
}

/// Find the single top-level directory shared by every entry.
///
/// Fails when entries live under different roots or directly at the top level.
pub fn archive_root(data: &[u8]) -> Result<String> {
    let mut archive = open(data);
    let mut roots = BTreeSet::new();

    for entry in archive.entries().context("failed to read archive entries")? {
        let entry = entry.context("failed to read archive entry")?;
        if is_metadata(entry.header().entry_type()) {
            continue;
        }
        let path = entry.path().context("failed to get entry path")?;
        let mut components = path.components().filter(|c| !matches!(c, Component::CurDir));

        let Some(Component::Normal(first)) = components.next() else {
            bail!("archive entry has an invalid path: {}", path.display());
        };
        let is_top_level_file =
            components.next().is_none() && entry.header().entry_type() != EntryType::Directory;
        if is_top_level_file {
            bail!(
                "cannot strip root: file `{}` is at the top level of the archive",
                path.display()
            );
        }
        roots.insert(first.to_string_lossy().into_owned());
    }

    match roots.len() {
        0 => bail!("archive is empty"),
        1 => Ok(roots.into_iter().next().unwrap_or_default()),
        _ => bail!(
            "cannot strip root: archive has {} top-level directories ({})",
            roots.len(),
            roots.into_iter().collect::<Vec<_>>().join(", ")
        ),
    }
}

/// Map an archive path to its destination, optionally dropping the first
/// component. Returns `None` for the stripped root itself.
fn output_path(dest: &Path, entry_path: &Path, strip_root: bool) -> Result<Option<PathBuf>> {
    let mut relative = PathBuf::new();
    let mut skipped_root = !strip_root;

    for component in entry_path.components() {
        match component {
            Component::CurDir => {}
            Component::Normal(part) => {
                if skipped_root {
                    relative.push(part);
                } else {
                    skipped_root = true;
                }
            }
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                bail!(
                    "archive entry escapes destination directory: {}",
                    entry_path.display()
                );
            }
        }
    }

    if relative.as_os_str().is_empty() {
        return Ok(None);
    }
    Ok(Some(dest.join(relative)))
}

/// Resolve a symlink target against the link's folder inside the
/// destination. Absolute targets and targets that climb above the
/// destination are rejected.
fn check_symlink_target(dest: &Path, link: &Path, target: &Path) -> Result<()> {
    let mut resolved: Vec<&std::ffi::OsStr> = link
        .parent()
        .and_then(|parent| parent.strip_prefix(dest).ok())
        .map(|relative| relative.iter().collect())
        .unwrap_or_default();

    for component in target.components() {
        match component {
            Component::CurDir => {}
            Component::Normal(part) => resolved.push(part),
            Component::ParentDir if resolved.pop().is_some() => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                bail!(
                    "archive symlink {} points outside the destination directory: {}",
                    link.display(),
                    target.display()
                );
            }
        }
    }
    Ok(())
}

/// Make sure `path`, with links resolved, still lives under `dest`.
fn check_inside(dest: &Path, path: &Path) -> Result<()> {
    let resolved = path
        .canonicalize()
        .with_context(|| format!("failed to resolve path: {}", path.display()))?;
    if !resolved.starts_with(dest) {
        bail!(
            "archive entry escapes destination directory: {}",
            path.display()
        );
    }
    Ok(())
}

/// Extract a gzip-compressed tarball into `dest`.
///
/// With `strip_root`, the single top-level directory of the archive (for
/// release tarballs, `RmlUi-6.1/`) is removed from every path. Link entries
/// must point inside `dest`, and nothing is ever written through a link that
/// leaves it.
pub fn extract_tarball(data: &[u8], dest: &Path, strip_root: bool) -> Result<()> {
    if strip_root {
        let root = archive_root(data)?;
        tracing::debug!("stripping archive root `{}`", root);
    }

    std::fs::create_dir_all(dest)
        .with_context(|| format!("failed to create destination directory: {}", dest.display()))?;
    let dest = dest
        .canonicalize()
        .with_context(|| format!("failed to resolve path: {}", dest.display()))?;
    let dest = dest.as_path();

    let mut archive = open(data);
    let mut extracted = 0usize;

    for entry in archive.entries().context("failed to read archive entries")? {
        let mut entry = entry.context("failed to read archive entry")?;
        let entry_type = entry.header().entry_type();
        if is_metadata(entry_type) {
            continue;
        }

        let entry_path = entry.path().context("failed to get entry path")?.into_owned();
        let Some(output) = output_path(dest, &entry_path, strip_root)? else {
            continue;
        };

        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
            check_inside(dest, parent)?;
        }

        match entry_type {
            EntryType::Directory => {
                std::fs::create_dir_all(&output).with_context(|| {
                    format!("failed to create directory: {}", output.display())
                })?;
                check_inside(dest, &output)?;
            }
            EntryType::Regular | EntryType::Continuous => {
                entry
                    .unpack(&output)
                    .with_context(|| format!("failed to extract file: {}", output.display()))?;
                extracted += 1;
            }
            EntryType::Link => {
                let target = entry
                    .link_name()
                    .context("failed to read link name")?
                    .map(|name| name.into_owned());
                let source = match target {
                    Some(target) => output_path(dest, &target, strip_root)?,
                    None => None,
                };
                let Some(source) = source else {
                    bail!("archive hard link has no target: {}", entry_path.display());
                };
                check_inside(dest, &source)?;
                std::fs::hard_link(&source, &output)
                    .with_context(|| format!("failed to create hard link: {}", output.display()))?;
                extracted += 1;
            }
            EntryType::Symlink => {
                let Some(target) = entry.link_name().context("failed to read link name")? else {
                    continue;
                };
                check_symlink_target(dest, &output, &target)?;
                #[cfg(unix)]
                {
                    std::os::unix::fs::symlink(target.as_ref(), &output).with_context(|| {
                        format!("failed to create symlink: {}", output.display())
                    })?;
                }
                #[cfg(windows)]
                {
                    tracing::debug!("Skipping symlink on Windows: {}", entry_path.display());
                }
            }
            _ => {
                tracing::debug!(
                    "Skipping unsupported entry type {:?}: {}",
                    entry_type,
                    entry_path.display()
                );
            }
        }
    }

    tracing::debug!("extracted {} files to {}", extracted, dest.display());
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use tar::Builder;
    use tempfile::TempDir;

    /// Build a `.tar.gz` in memory from `(path, contents)` pairs.
    pub(crate) fn tarball(files: &[(&str, &str)]) -> Vec<u8> {
        let mut tar_data = Vec::new();
        {
            let encoder = GzEncoder::new(&mut tar_data, Compression::default());
            let mut builder = Builder::new(encoder);

            for (path, contents) in files {
                let mut header = tar::Header::new_gnu();
                header.set_path(path).unwrap();
                header.set_size(contents.len() as u64);
                header.set_mode(0o644);
                header.set_cksum();
                builder
                    .append(&header, std::io::Cursor::new(contents.as_bytes()))
                    .unwrap();
            }

            builder.into_inner().unwrap().finish().unwrap();
        }
        tar_data
    }

    /// Build a `.tar.gz` holding one link entry after `files`.
    fn tarball_with_link(files: &[(&str, &str)], link: (&str, &Path, EntryType)) -> Vec<u8> {
        let mut tar_data = Vec::new();
        {
            let encoder = GzEncoder::new(&mut tar_data, Compression::default());
            let mut builder = Builder::new(encoder);

            for (path, contents) in files {
                let mut header = tar::Header::new_gnu();
                header.set_path(path).unwrap();
                header.set_size(contents.len() as u64);
                header.set_mode(0o644);
                header.set_cksum();
                builder
                    .append(&header, std::io::Cursor::new(contents.as_bytes()))
                    .unwrap();
            }

            let (path, target, entry_type) = link;
            let mut header = tar::Header::new_gnu();
            header.set_path(path).unwrap();
            header.set_link_name(target).unwrap();
            header.set_entry_type(entry_type);
            header.set_size(0);
            header.set_mode(0o777);
            header.set_cksum();
            builder.append(&header, std::io::empty()).unwrap();

            builder.into_inner().unwrap().finish().unwrap();
        }
        tar_data
    }

    /// Append `(path, contents)` files after an existing archive's entries.
    fn append_files(data: &[u8], files: &[(&str, &str)]) -> Vec<u8> {
        let mut tar_data = Vec::new();
        {
            let encoder = GzEncoder::new(&mut tar_data, Compression::default());
            let mut builder = Builder::new(encoder);

            let mut source = open(data);
            for entry in source.entries().unwrap() {
                let mut entry = entry.unwrap();
                let header = entry.header().clone();
                builder.append(&header, &mut entry).unwrap();
            }
            for (path, contents) in files {
                let mut header = tar::Header::new_gnu();
                header.set_path(path).unwrap();
                header.set_size(contents.len() as u64);
                header.set_mode(0o644);
                header.set_cksum();
                builder
                    .append(&header, std::io::Cursor::new(contents.as_bytes()))
                    .unwrap();
            }

            builder.into_inner().unwrap().finish().unwrap();
        }
        tar_data
    }

    #[test]
    fn test_symlink_out_of_destination_is_rejected() {
        let outside = TempDir::new().unwrap();
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("src");

        let data = tarball_with_link(
            &[("RmlUi-6.1/LICENSE.txt", "MIT")],
            ("RmlUi-6.1/evil", outside.path(), EntryType::Symlink),
        );
        let data = append_files(&data, &[("RmlUi-6.1/evil/escaped.txt", "pwned")]);

        let err = extract_tarball(&data, &dest, true).unwrap_err();
        assert!(err.to_string().contains("outside the destination"));
        assert!(!outside.path().join("escaped.txt").exists());
    }

    #[test]
    fn test_relative_symlink_climbing_out_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("src");

        let data = tarball_with_link(
            &[("RmlUi-6.1/Include/a.h", "")],
            ("RmlUi-6.1/Include/up", Path::new("../../.."), EntryType::Symlink),
        );
        assert!(extract_tarball(&data, &dest, true).is_err());
        assert!(!dest.join("Include/up").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_inside_destination() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("src");

        let data = tarball_with_link(
            &[("RmlUi-6.1/Include/a.h", "header")],
            ("RmlUi-6.1/Include/b.h", Path::new("a.h"), EntryType::Symlink),
        );
        extract_tarball(&data, &dest, true).unwrap();
        assert_eq!(std::fs::read_to_string(dest.join("Include/b.h")).unwrap(), "header");
    }

    #[test]
    fn test_hard_link_out_of_destination_is_rejected() {
        let outside = TempDir::new().unwrap();
        let secret = outside.path().join("secret.txt");
        std::fs::write(&secret, "secret").unwrap();
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("src");

        let data = tarball_with_link(
            &[("RmlUi-6.1/LICENSE.txt", "MIT")],
            ("RmlUi-6.1/copy.txt", &secret, EntryType::Link),
        );
        assert!(extract_tarball(&data, &dest, true).is_err());
        assert!(!dest.join("copy.txt").exists());

        let data = tarball_with_link(
            &[("RmlUi-6.1/LICENSE.txt", "MIT")],
            ("RmlUi-6.1/copy.txt", Path::new("RmlUi-6.1/../../x"), EntryType::Link),
        );
        assert!(extract_tarball(&data, &dest, true).is_err());
    }

    #[test]
    fn test_hard_link_inside_destination() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("src");

        let data = tarball_with_link(
            &[("RmlUi-6.1/LICENSE.txt", "MIT")],
            ("RmlUi-6.1/COPYING.txt", Path::new("RmlUi-6.1/LICENSE.txt"), EntryType::Link),
        );
        extract_tarball(&data, &dest, true).unwrap();
        assert_eq!(std::fs::read_to_string(dest.join("COPYING.txt")).unwrap(), "MIT");
    }

    #[test]
    fn test_extract_without_strip() {
        let data = tarball(&[("test.txt", "hello")]);
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("extracted");

        extract_tarball(&data, &dest, false).unwrap();

        assert_eq!(std::fs::read_to_string(dest.join("test.txt")).unwrap(), "hello");
    }

    #[test]
    fn test_extract_strips_root() {
        let data = tarball(&[
            ("RmlUi-6.1/LICENSE.txt", "MIT"),
            ("RmlUi-6.1/Source/Core/CMakeLists.txt", "unset(rmlui_core_TYPE)\n"),
        ]);
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("src");

        assert_eq!(archive_root(&data).unwrap(), "RmlUi-6.1");
        extract_tarball(&data, &dest, true).unwrap();

        assert_eq!(std::fs::read_to_string(dest.join("LICENSE.txt")).unwrap(), "MIT");
        assert!(dest.join("Source/Core/CMakeLists.txt").exists());
        assert!(!dest.join("RmlUi-6.1").exists());
    }

    #[test]
    fn test_strip_rejects_multiple_roots() {
        let data = tarball(&[("a/one.txt", "1"), ("b/two.txt", "2")]);
        let tmp = TempDir::new().unwrap();

        let err = extract_tarball(&data, tmp.path(), true).unwrap_err();
        assert!(err.to_string().contains("2 top-level directories"));
        assert!(!tmp.path().join("one.txt").exists());
    }

    #[test]
    fn test_strip_rejects_top_level_file() {
        let data = tarball(&[("README.md", "readme"), ("RmlUi-6.1/LICENSE.txt", "MIT")]);
        let err = archive_root(&data).unwrap_err();
        assert!(err.to_string().contains("top level"));
    }

    #[test]
    fn test_output_path_rejects_escape() {
        let dest = Path::new("/tmp/dest");
        assert!(output_path(dest, Path::new("root/../../etc/passwd"), true).is_err());
        assert_eq!(output_path(dest, Path::new("root/"), true).unwrap(), None);
        assert_eq!(
            output_path(dest, Path::new("root/a.txt"), true).unwrap(),
            Some(PathBuf::from("/tmp/dest/a.txt"))
        );
    }
}
