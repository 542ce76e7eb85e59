//! Implementation of the source step: fetch, extract, patch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tempfile::TempDir;

use crate::core::layout::Layout;
use crate::sources::archive::extract_tarball;
use crate::sources::fetch::{Fetcher, SourceSpec};
use crate::sources::patch::{apply_patch, default_patches, PatchOutcome};
use crate::util::fs::{ensure_dir, remove_dir_all_if_exists};

/// Options for the source step.
#[derive(Debug, Clone)]
pub struct SourceOptions {
    /// Archive to fetch
    pub spec: SourceSpec,

    /// Download cache
    pub cache_dir: PathBuf,

    /// Only use local or cached archives
    pub offline: bool,

    /// Fail when `spec` has no checksum
    pub require_checksum: bool,

    /// Re-extract even when the source folder already exists
    pub force: bool,
}

/// What the source step did.
#[derive(Debug, Clone)]
pub struct SourceResult {
    pub source_dir: PathBuf,

    /// Whether a fresh archive was unpacked
    pub extracted: bool,

    /// Outcome of each default patch, in order
    pub patches: Vec<PatchOutcome>,
}

impl SourceResult {
    pub fn already_patched(&self) -> bool {
        self.patches
            .iter()
            .all(|outcome| *outcome == PatchOutcome::AlreadyPatched)
    }
}

/// Fetch, extract and patch the sources into the layout's source folder.
///
/// An existing source folder is reused unless `force` is set; the patches
/// are applied either way and are no-ops on an already patched tree.
pub fn source(layout: &Layout, opts: &SourceOptions) -> Result<SourceResult> {
    let source_dir = layout.source_folder();
    let reuse = source_dir.exists() && !opts.force;

    if reuse {
        tracing::info!("Reusing sources in {}", source_dir.display());
    } else {
        let fetcher = Fetcher::new(&opts.cache_dir)
            .offline(opts.offline)
            .require_checksum(opts.require_checksum);
        let data = fetcher.fetch(&opts.spec)?;

        // Unpack next to the final location so a failed extraction never
        // leaves a half-populated source folder behind.
        ensure_dir(layout.root())?;
        let staging = TempDir::new_in(layout.root())
            .context("failed to create staging directory")?;
        extract_tarball(&data, staging.path(), true)?;

        remove_dir_all_if_exists(&source_dir)?;
        std::fs::rename(staging.path(), &source_dir).with_context(|| {
            format!(
                "failed to move sources from {} to {}",
                staging.path().display(),
                source_dir.display()
            )
        })?;
        tracing::info!("Extracted sources to {}", source_dir.display());
    }

    let mut patches = Vec::new();
    for strategy in default_patches() {
        patches.push(apply_patch(&source_dir, strategy.as_ref())?);
    }

    Ok(SourceResult {
        source_dir,
        extracted: !reuse,
        patches,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::{ErrorKind, RecipeError};
    use crate::core::recipe::RMLUI;
    use crate::core::settings::BuildType;
    use crate::sources::archive::tests::tarball;
    use crate::util::hash::sha256_bytes;

    const CORE_CMAKE: &str = "add_library(rmlui_core)\nunset(rmlui_core_TYPE)\n";

    fn archive(tmp: &TempDir, core_cmake: &str) -> (PathBuf, Vec<u8>) {
        let data = tarball(&[
            ("RmlUi-6.1/LICENSE.txt", "MIT License"),
            ("RmlUi-6.1/CMakeLists.txt", "project(RmlUi)\n"),
            ("RmlUi-6.1/Source/Core/CMakeLists.txt", core_cmake),
        ]);
        let path = tmp.path().join("RmlUi-6.1.tar.gz");
        std::fs::write(&path, &data).unwrap();
        (path, data)
    }

    fn options(tmp: &TempDir, archive: &std::path::Path) -> SourceOptions {
        SourceOptions {
            spec: SourceSpec::for_recipe(&RMLUI).with_url(archive.to_string_lossy()),
            cache_dir: tmp.path().join("cache"),
            offline: true,
            require_checksum: false,
            force: false,
        }
    }

    #[test]
    fn test_source_extracts_and_patches() {
        let tmp = TempDir::new().unwrap();
        let (path, _) = archive(&tmp, CORE_CMAKE);
        let layout = Layout::new(tmp.path().join("work"), BuildType::Release);

        let result = source(&layout, &options(&tmp, &path)).unwrap();
        assert!(result.extracted);
        assert_eq!(result.patches, vec![PatchOutcome::Applied]);

        let core = std::fs::read_to_string(layout.source_folder().join("Source/Core/CMakeLists.txt"))
            .unwrap();
        assert!(core.contains("recipe helper: thirdparty container include dirs"));
        assert!(layout.source_folder().join("LICENSE.txt").exists());

        let again = source(&layout, &options(&tmp, &path)).unwrap();
        assert!(!again.extracted);
        assert!(again.already_patched());
    }

    #[test]
    fn test_force_re_extracts() {
        let tmp = TempDir::new().unwrap();
        let (path, _) = archive(&tmp, CORE_CMAKE);
        let layout = Layout::new(tmp.path().join("work"), BuildType::Release);

        source(&layout, &options(&tmp, &path)).unwrap();
        let mut opts = options(&tmp, &path);
        opts.force = true;
        let result = source(&layout, &opts).unwrap();
        assert!(result.extracted);
        assert_eq!(result.patches, vec![PatchOutcome::Applied]);
    }

    #[test]
    fn test_incompatible_upstream() {
        let tmp = TempDir::new().unwrap();
        let (path, _) = archive(&tmp, "add_library(rmlui_core)\n");
        let layout = Layout::new(tmp.path().join("work"), BuildType::Release);

        let err = source(&layout, &options(&tmp, &path)).unwrap_err();
        let err = err.downcast_ref::<RecipeError>().unwrap();
        assert_eq!(err.kind(), ErrorKind::UpstreamIncompatible);
    }

    #[test]
    fn test_checksum_errors_write_nothing() {
        let tmp = TempDir::new().unwrap();
        let (path, data) = archive(&tmp, CORE_CMAKE);
        let layout = Layout::new(tmp.path().join("work"), BuildType::Release);

        let mut opts = options(&tmp, &path);
        opts.require_checksum = true;
        assert!(source(&layout, &opts).is_err());
        assert!(!layout.root().exists());

        opts.spec = opts.spec.clone().with_sha256("ab".repeat(32));
        assert!(source(&layout, &opts).is_err());
        assert!(!layout.source_folder().exists());

        opts.spec = opts.spec.clone().with_sha256(sha256_bytes(&data));
        assert!(source(&layout, &opts).is_ok());
    }
}
