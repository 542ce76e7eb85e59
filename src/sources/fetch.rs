//! Release archive acquisition.
//!
//! Archives come from an HTTP(S) URL, a `file://` URL or a plain local path.
//! Downloads are kept in a cache directory keyed by URL so a second run does
//! not hit the network.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use url::Url;

use crate::core::errors::RecipeError;
use crate::core::recipe::RecipeInfo;
use crate::util::fs::ensure_dir;
use crate::util::hash::{digest_eq, sha256_bytes, sha256_str};

/// Where the sources come from and how to verify them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    /// Archive location (URL or local path)
    pub url: String,

    /// Expected SHA256 of the archive bytes
    pub sha256: Option<String>,
}

impl SourceSpec {
    /// The release archive for a recipe, without a pinned checksum.
    pub fn for_recipe(info: &RecipeInfo) -> Self {
        SourceSpec {
            url: info.source_url(),
            sha256: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_sha256(mut self, sha256: impl Into<String>) -> Self {
        self.sha256 = Some(sha256.into());
        self
    }
}

/// Resolved location of an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Location {
    Local(PathBuf),
    Remote(Url),
}

fn locate(spec: &str) -> Result<Location> {
    let as_path = Path::new(spec);
    if as_path.exists() {
        return Ok(Location::Local(as_path.to_path_buf()));
    }

    match Url::parse(spec) {
        Ok(url) if url.scheme() == "file" => url
            .to_file_path()
            .map(Location::Local)
            .map_err(|_| anyhow::anyhow!("invalid file URL: {}", spec)),
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(Location::Remote(url)),
        Ok(url) => bail!("unsupported URL scheme `{}` in {}", url.scheme(), spec),
        Err(_) => bail!("archive not found: {}", spec),
    }
}

/// Check archive bytes against an expected digest.
pub fn verify_checksum(url: &str, data: &[u8], expected: &str) -> Result<(), RecipeError> {
    let actual = sha256_bytes(data);
    if !digest_eq(&actual, expected) {
        return Err(RecipeError::ChecksumMismatch {
            url: url.to_string(),
            expected: expected.trim().to_lowercase(),
            actual,
        });
    }
    tracing::debug!("archive hash verified: {}", &actual[..16]);
    Ok(())
}

/// Downloads and verifies release archives.
#[derive(Debug, Clone)]
pub struct Fetcher {
    cache_dir: PathBuf,
    offline: bool,
    require_checksum: bool,
}

impl Fetcher {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Fetcher {
            cache_dir: cache_dir.into(),
            offline: false,
            require_checksum: false,
        }
    }

    /// Refuse network access; only local or cached archives are used.
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// Fail when the spec carries no checksum.
    pub fn require_checksum(mut self, require: bool) -> Self {
        self.require_checksum = require;
        self
    }

    /// Cache file for a remote URL.
    fn cache_path(&self, url: &Url) -> PathBuf {
        let file_name = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|name| !name.is_empty())
            .unwrap_or("archive.tar.gz");
        let key = &sha256_str(url.as_str())[..16];
        self.cache_dir.join(format!("{}-{}", key, file_name))
    }

    /// Fetch the archive bytes described by `spec`, verifying the checksum
    /// when one is set.
    pub fn fetch(&self, spec: &SourceSpec) -> Result<Vec<u8>> {
        match spec.sha256 {
            None if self.require_checksum => {
                return Err(RecipeError::ChecksumRequired {
                    url: spec.url.clone(),
                }
                .into());
            }
            None => tracing::debug!(
                "no sha256 configured for {}; the archive is not verified",
                spec.url
            ),
            Some(_) => {}
        }

        let data = match locate(&spec.url)? {
            Location::Local(path) => {
                tracing::info!("Using local archive {}", path.display());
                std::fs::read(&path)
                    .with_context(|| format!("failed to read archive: {}", path.display()))?
            }
            Location::Remote(url) => self.fetch_remote(&url, spec.sha256.as_deref())?,
        };

        if let Some(expected) = &spec.sha256 {
            verify_checksum(&spec.url, &data, expected)?;
        }

        Ok(data)
    }

    fn fetch_remote(&self, url: &Url, sha256: Option<&str>) -> Result<Vec<u8>> {
        let cached = self.cache_path(url);

        if cached.exists() {
            let data = std::fs::read(&cached)
                .with_context(|| format!("failed to read cached archive: {}", cached.display()))?;
            let usable = sha256.map_or(true, |expected| digest_eq(&sha256_bytes(&data), expected));
            if usable {
                tracing::info!("Using cached archive {}", cached.display());
                return Ok(data);
            }
            tracing::warn!("cached archive {} is stale, downloading again", cached.display());
        }

        if self.offline {
            bail!("offline mode: {} is not cached", url);
        }

        let data = download(url)?;

        ensure_dir(&self.cache_dir)?;
        if let Err(e) = std::fs::write(&cached, &data) {
            tracing::warn!("failed to cache archive at {}: {}", cached.display(), e);
        }

        Ok(data)
    }
}

/// Download a URL into memory with a progress bar.
fn download(url: &Url) -> Result<Vec<u8>> {
    tracing::info!("Fetching {}", url);

    let download_error = |message: String| RecipeError::Download {
        url: url.to_string(),
        message,
    };

    let response = reqwest::blocking::get(url.as_str()).map_err(|e| download_error(e.to_string()))?;

    if !response.status().is_success() {
        return Err(download_error(format!("HTTP {}", response.status())).into());
    }

    let progress = match response.content_length() {
        Some(len) => {
            let pb = ProgressBar::new(len);
            pb.set_style(
                ProgressStyle::with_template("{bar:40} {bytes}/{total_bytes} ({eta})")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            pb
        }
        None => ProgressBar::new_spinner(),
    };

    let mut data = Vec::new();
    progress
        .wrap_read(response)
        .read_to_end(&mut data)
        .map_err(|e| download_error(e.to_string()))?;
    progress.finish_and_clear();

    tracing::debug!("downloaded {} bytes from {}", data.len(), url);
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::ErrorKind;
    use crate::core::recipe::RMLUI;
    use tempfile::TempDir;

    #[test]
    fn test_locate() {
        assert!(matches!(
            locate("https://github.com/mikke89/RmlUi/archive/refs/tags/6.1.tar.gz").unwrap(),
            Location::Remote(_)
        ));
        assert!(locate("ftp://example.com/a.tar.gz").is_err());
        assert!(locate("does/not/exist.tar.gz").is_err());
    }

    #[test]
    fn test_cache_path_is_stable() {
        let fetcher = Fetcher::new("/cache");
        let url = Url::parse(&RMLUI.source_url()).unwrap();
        let path = fetcher.cache_path(&url);
        assert_eq!(path, fetcher.cache_path(&url));
        assert!(path.to_string_lossy().ends_with("-6.1.tar.gz"));
    }

    #[test]
    fn test_fetch_local_verifies_checksum() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("rmlui.tar.gz");
        std::fs::write(&archive, b"archive bytes").unwrap();
        let url = archive.to_string_lossy().into_owned();

        let fetcher = Fetcher::new(tmp.path().join("cache"));

        let good = SourceSpec::for_recipe(&RMLUI)
            .with_url(url.clone())
            .with_sha256(sha256_bytes(b"archive bytes"));
        assert_eq!(fetcher.fetch(&good).unwrap(), b"archive bytes");

        let bad = good.clone().with_sha256("00".repeat(32));
        let err = fetcher.fetch(&bad).unwrap_err();
        let err = err.downcast_ref::<RecipeError>().unwrap();
        assert_eq!(err.kind(), ErrorKind::Acquisition);
    }

    #[test]
    fn test_require_checksum() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("rmlui.tar.gz");
        std::fs::write(&archive, b"archive bytes").unwrap();

        let spec = SourceSpec::for_recipe(&RMLUI).with_url(archive.to_string_lossy());

        let lenient = Fetcher::new(tmp.path().join("cache"));
        assert!(lenient.fetch(&spec).is_ok());

        let strict = Fetcher::new(tmp.path().join("cache")).require_checksum(true);
        let err = strict.fetch(&spec).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RecipeError>(),
            Some(RecipeError::ChecksumRequired { .. })
        ));
    }

    #[test]
    fn test_offline_uses_cache() {
        let tmp = TempDir::new().unwrap();
        let fetcher = Fetcher::new(tmp.path()).offline(true);
        let url = Url::parse("https://example.com/RmlUi-6.1.tar.gz").unwrap();

        let spec = SourceSpec::for_recipe(&RMLUI).with_url(url.as_str());
        assert!(fetcher.fetch(&spec).unwrap_err().to_string().contains("offline"));

        std::fs::write(fetcher.cache_path(&url), b"cached").unwrap();
        assert_eq!(fetcher.fetch(&spec).unwrap(), b"cached");
    }
}
