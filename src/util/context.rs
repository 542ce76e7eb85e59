//! Global context for recipe operations.
//!
//! Provides centralized access to configuration and paths.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::layout::Layout;
use crate::core::settings::BuildType;
use crate::util::config::{global_config_path, load_config, project_config_path, Config};

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Folder holding `recipe.toml` and the layout
    root: PathBuf,

    /// Global config file, if a home directory is known
    global_config: Option<PathBuf>,

    /// Colored diagnostics on stderr
    color: bool,
}

impl GlobalContext {
    /// Create a context rooted at the current directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;

        Ok(GlobalContext {
            root: cwd.clone(),
            cwd,
            global_config: global_config_path(),
            color: false,
        })
    }

    /// Use another root folder; relative paths are taken from the cwd.
    pub fn with_root(mut self, root: Option<&Path>) -> Self {
        if let Some(root) = root {
            self.root = self.cwd.join(root);
        }
        self
    }

    /// Use another global config file.
    pub fn with_global_config(mut self, path: Option<PathBuf>) -> Self {
        self.global_config = path;
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn color(&self) -> bool {
        self.color
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the project config (`<root>/recipe.toml`).
    pub fn project_config_path(&self) -> PathBuf {
        project_config_path(&self.root)
    }

    /// Merged global and project configuration.
    pub fn config(&self) -> Result<Config> {
        load_config(self.global_config.as_deref(), &self.project_config_path())
    }

    /// Resolve a path given on the command line or in `recipe.toml`.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        self.cwd.join(path)
    }

    /// Folder layout for a build type.
    pub fn layout(&self, build_type: BuildType) -> Layout {
        Layout::new(&self.root, build_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_root_and_layout() {
        let ctx = GlobalContext::new()
            .unwrap()
            .with_root(Some(Path::new("/work/rmlui")))
            .with_global_config(None);

        assert_eq!(ctx.root(), Path::new("/work/rmlui"));
        assert_eq!(ctx.project_config_path(), PathBuf::from("/work/rmlui/recipe.toml"));
        assert_eq!(
            ctx.layout(BuildType::Debug).build_folder(),
            PathBuf::from("/work/rmlui/build/Debug")
        );
    }

    #[test]
    fn test_config_from_root() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("recipe.toml"), "[build]\njobs = 3\n").unwrap();

        let ctx = GlobalContext::new()
            .unwrap()
            .with_root(Some(tmp.path()))
            .with_global_config(None);
        assert_eq!(ctx.config().unwrap().build.jobs, Some(3));

        std::fs::write(tmp.path().join("recipe.toml"), "[options]\nshared = 1\n").unwrap();
        assert!(ctx.config().is_err());
    }
}
