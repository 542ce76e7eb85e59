//! Implementation of the build step.

use anyhow::{bail, Result};

use crate::builder::cmake::CMakeBuilder;
use crate::core::layout::Layout;
use crate::util::diagnostic::suggestions;

/// Options for the build step.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Number of parallel jobs (None = CMake decides)
    pub jobs: Option<usize>,

    /// CMake generator
    pub generator: Option<String>,
}

impl BuildOptions {
    pub(crate) fn builder(&self, layout: &Layout) -> Result<CMakeBuilder> {
        Ok(CMakeBuilder::new(layout)?
            .generator(self.generator.clone())
            .jobs(self.jobs))
    }
}

/// Configure and build the patched sources.
pub fn build(layout: &Layout, opts: &BuildOptions) -> Result<()> {
    let source_dir = layout.source_folder();
    if !source_dir.exists() {
        bail!(
            "source folder not found: {}\n{}",
            source_dir.display(),
            suggestions::RUN_SOURCE_FIRST
        );
    }

    let cmake = opts.builder(layout)?;
    cmake.configure()?;
    cmake.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::settings::BuildType;
    use tempfile::TempDir;

    #[test]
    fn test_build_requires_sources() {
        let tmp = TempDir::new().unwrap();
        let layout = Layout::new(tmp.path(), BuildType::Release);

        let err = build(&layout, &BuildOptions::default()).unwrap_err();
        assert!(err.to_string().contains("rmlui-recipe source"));
        assert!(!layout.build_folder().exists());
    }
}
