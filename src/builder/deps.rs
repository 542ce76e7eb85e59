//! Host-supplied dependency locations.
//!
//! The recipe does not build its dependencies. Whoever drives it describes
//! where they live in a small TOML file:
//!
//! ```toml
//! [freetype]
//! root = "/opt/freetype"
//! include_dirs = ["include/freetype2"]
//! version = "2.13.2"
//!
//! [robin-hood-hashing]
//! include_dirs = ["/opt/robin-hood/include"]
//! ```
//!
//! Relative `include_dirs`/`lib_dirs` are resolved against `root`, and a
//! relative `root` against the directory holding the file. When `root` is
//! given without explicit dirs, `root/include` and `root/lib` are assumed.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use semver::Version;
use serde::Deserialize;

use crate::core::dependency::Requirement;
use crate::core::errors::RecipeError;
use crate::util::fs::read_to_string;

/// Location of one dependency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DependencyInfo {
    /// Install prefix of the dependency
    pub root: Option<PathBuf>,

    /// Header directories
    pub include_dirs: Vec<PathBuf>,

    /// Library directories
    pub lib_dirs: Vec<PathBuf>,

    /// Version of the provided package, checked against the requirement
    pub version: Option<Version>,
}

impl DependencyInfo {
    /// Make every path absolute relative to `base`.
    fn resolve(mut self, base: &Path) -> Self {
        let root = self.root.take().map(|root| base.join(root));
        let anchor = root.clone().unwrap_or_else(|| base.to_path_buf());

        if let Some(root) = &root {
            if self.include_dirs.is_empty() {
                self.include_dirs.push(root.join("include"));
            }
            if self.lib_dirs.is_empty() {
                self.lib_dirs.push(root.join("lib"));
            }
        }

        DependencyInfo {
            include_dirs: self.include_dirs.iter().map(|d| anchor.join(d)).collect(),
            lib_dirs: self.lib_dirs.iter().map(|d| anchor.join(d)).collect(),
            root,
            version: self.version,
        }
    }
}

/// Search paths handed to CMake.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPaths {
    pub prefix: Vec<PathBuf>,
    pub include: Vec<PathBuf>,
    pub library: Vec<PathBuf>,
}

impl SearchPaths {
    pub fn is_empty(&self) -> bool {
        self.prefix.is_empty() && self.include.is_empty() && self.library.is_empty()
    }
}

/// Dependency infos keyed by package name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyInfos {
    deps: BTreeMap<String, DependencyInfo>,
}

impl DependencyInfos {
    /// Load a dependency info file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = read_to_string(path)?;
        let base = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        Self::parse(&contents, base)
            .with_context(|| format!("failed to parse dependency info: {}", path.display()))
    }

    /// Parse dependency info, resolving relative paths against `base`.
    pub fn parse(contents: &str, base: &Path) -> Result<Self> {
        let raw: BTreeMap<String, DependencyInfo> = toml::from_str(contents)?;
        let deps = raw
            .into_iter()
            .map(|(name, info)| (name, info.resolve(base)))
            .collect();
        Ok(DependencyInfos { deps })
    }

    pub fn get(&self, name: &str) -> Option<&DependencyInfo> {
        self.deps.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.deps.is_empty()
    }

    /// Check provided versions against the requirements.
    ///
    /// A requirement with no info only warns; CMake may still find the
    /// package on the system.
    pub fn check(&self, requirements: &[Requirement]) -> Result<(), RecipeError> {
        for req in requirements {
            let Some(info) = self.deps.get(&req.name) else {
                tracing::warn!(
                    "no location given for {}; relying on the system to provide it",
                    req
                );
                continue;
            };

            if let Some(version) = &info.version {
                if !req.version.matches(version) {
                    return Err(RecipeError::DependencyVersionMismatch {
                        name: req.name.clone(),
                        found: version.to_string(),
                        required: req.version.to_string(),
                    });
                }
            }
        }

        for name in self.deps.keys() {
            if !requirements.iter().any(|req| &req.name == name) {
                tracing::debug!("ignoring dependency info for `{}`: not required", name);
            }
        }

        Ok(())
    }

    /// Search paths for the required dependencies, in requirement order.
    pub fn search_paths(&self, requirements: &[Requirement]) -> SearchPaths {
        let mut paths = SearchPaths::default();

        for info in requirements.iter().filter_map(|req| self.deps.get(&req.name)) {
            if let Some(root) = &info.root {
                push_unique(&mut paths.prefix, root);
            }
            for dir in &info.include_dirs {
                push_unique(&mut paths.include, dir);
            }
            for dir in &info.lib_dirs {
                push_unique(&mut paths.library, dir);
            }
        }

        paths
    }
}

fn push_unique(list: &mut Vec<PathBuf>, path: &Path) {
    if !list.iter().any(|p| p == path) {
        list.push(path.to_path_buf());
    }
}
