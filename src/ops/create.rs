//! Implementation of the full recipe run.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::builder::variables::CacheValue;
use crate::core::layout::Layout;
use crate::ops::build::{build, BuildOptions};
use crate::ops::configure::ResolvedRecipe;
use crate::ops::generate::{generate, load_deps, GenerateOptions};
use crate::ops::package::{package, PackageInfo};
use crate::ops::source::{source, SourceOptions};

/// Options for [`create`].
#[derive(Debug, Clone)]
pub struct CreateOptions {
    pub source: SourceOptions,

    /// Dependency info file
    pub deps: Option<PathBuf>,

    /// Extra cache variables
    pub variables: Vec<(String, CacheValue)>,

    pub build: BuildOptions,
}

/// Run source, generate, build and package for a resolved configuration.
///
/// Dependency info is loaded and checked before the first step touches the
/// layout. Each step stops the run on failure, so `package-info.json` only
/// appears after a complete run.
pub fn create(recipe: &ResolvedRecipe, layout: &Layout, opts: &CreateOptions) -> Result<PackageInfo> {
    let deps = load_deps(opts.deps.as_deref(), recipe)?;

    remove_stale_metadata(layout)?;

    source(layout, &opts.source)?;

    let generate_opts = GenerateOptions {
        deps,
        variables: opts.variables.clone(),
    };
    generate(recipe, layout, &generate_opts)?;

    build(layout, &opts.build)?;

    package(recipe, layout, &opts.build)
}

fn remove_stale_metadata(layout: &Layout) -> Result<()> {
    let path = layout.package_info_file();
    if path.exists() {
        tracing::debug!("removing stale {}", path.display());
        std::fs::remove_file(&path)
            .with_context(|| format!("failed to remove {}", path.display()))?;
    }
    Ok(())
}
