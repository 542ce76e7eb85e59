//! Implementation of the package step.
//!
//! Installs the build tree into the package folder, copies the license files
//! and records what consumers need in `package-info.json`.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::core::errors::RecipeError;
use crate::core::layout::Layout;
use crate::core::recipe::{CMAKE_FILE_NAME, CMAKE_TARGET_NAME, STATIC_LIB_DEFINE};
use crate::ops::build::BuildOptions;
use crate::ops::configure::ResolvedRecipe;
use crate::util::diagnostic::suggestions;
use crate::util::fs::{copy_flat, read_to_string, remove_dir_all_if_exists, write_string};

/// Library file extensions picked up from the install tree.
const LIB_EXTENSIONS: &[&str] = &["so", "lib", "a", "dylib", "bc"];

/// Consumer-facing metadata of an installed package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    /// Recipe reference, e.g. `rmlui/6.1`
    pub reference: String,
    pub cmake_file_name: String,
    pub cmake_target_name: String,
    /// Library names without prefix or extension
    pub libs: Vec<String>,
    /// Preprocessor defines consumers must set
    pub defines: Vec<String>,
    pub options: BTreeMap<String, String>,
    pub requirements: Vec<String>,
}

impl PackageInfo {
    /// Metadata for a configuration and a set of installed libraries.
    pub fn new(recipe: &ResolvedRecipe, libs: Vec<String>) -> Self {
        let mut defines = Vec::new();
        if !recipe.recipe_options.shared {
            defines.push(STATIC_LIB_DEFINE.to_string());
        }

        PackageInfo {
            reference: recipe.info.reference(),
            cmake_file_name: CMAKE_FILE_NAME.to_string(),
            cmake_target_name: CMAKE_TARGET_NAME.to_string(),
            libs,
            defines,
            options: recipe.option_map(),
            requirements: recipe.requirement_refs(),
        }
    }

    /// Load `package-info.json`.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = read_to_string(path)?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse package info: {}", path.display()))
    }

    /// Write `package-info.json`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize package info")?;
        write_string(path, &format!("{}\n", json))
    }
}

/// Library names in `dir`, the way linkers expect them.
///
/// Only direct children count. The `lib` prefix is dropped except for `.lib`
/// files; versioned names such as `libfoo.so.6` are ignored.
pub fn collect_libs(dir: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        tracing::warn!("library folder {} does not exist", dir.display());
        return Ok(Vec::new());
    }

    let mut libs = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry =
            entry.with_context(|| format!("failed to read library folder: {}", dir.display()))?;
        let path = entry.path();
        if path.is_dir() {
            continue;
        }

        let (Some(stem), Some(ext)) = (
            path.file_stem().and_then(|s| s.to_str()),
            path.extension().and_then(|e| e.to_str()),
        ) else {
            continue;
        };
        if !LIB_EXTENSIONS.contains(&ext) {
            continue;
        }

        let name = match stem.strip_prefix("lib") {
            Some(rest) if ext != "lib" && !rest.is_empty() => rest,
            _ => stem,
        };
        libs.push(name.to_string());
    }

    libs.sort();
    libs.dedup();
    Ok(libs)
}

/// Install, copy licenses and publish `package-info.json`.
///
/// The package folder is rebuilt from scratch; the metadata file is written
/// last, so it only exists when every earlier step succeeded.
pub fn package(recipe: &ResolvedRecipe, layout: &Layout, opts: &BuildOptions) -> Result<PackageInfo> {
    let build_dir = layout.build_folder();
    if !build_dir.join("CMakeCache.txt").exists() {
        bail!(
            "build folder not configured: {}\n{}",
            build_dir.display(),
            suggestions::RUN_BUILD_FIRST
        );
    }

    check_generated_options(recipe, layout)?;

    let package_dir = layout.package_folder();
    remove_dir_all_if_exists(&package_dir)?;

    opts.builder(layout)?.install(&package_dir)?;
    finish_package(recipe, layout)
}

/// Fail unless `recipe` resolves to the options the build tree was generated
/// with, so the published defines describe what was actually built.
pub fn check_generated_options(recipe: &ResolvedRecipe, layout: &Layout) -> Result<()> {
    let path = layout.generated_options_file();
    if !path.exists() {
        bail!(
            "generated options not found: {}\nRun `rmlui-recipe generate` first",
            path.display()
        );
    }
    let generated: BTreeMap<String, String> = serde_json::from_str(&read_to_string(&path)?)
        .with_context(|| format!("failed to parse generated options: {}", path.display()))?;

    let requested = recipe.option_map();
    let names = generated.keys().chain(requested.keys());
    for name in names {
        let (was, now) = (generated.get(name), requested.get(name));
        if was != now {
            let unset = || "unset".to_string();
            return Err(RecipeError::GeneratedOptionsMismatch {
                option: name.clone(),
                requested: now.cloned().unwrap_or_else(unset),
                generated: was.cloned().unwrap_or_else(unset),
            }
            .into());
        }
    }
    Ok(())
}

/// Everything after the native install.
fn finish_package(recipe: &ResolvedRecipe, layout: &Layout) -> Result<PackageInfo> {
    let licenses = copy_flat(&layout.source_folder(), &["LICENSE*"], &layout.licenses_folder())?;
    if licenses.is_empty() {
        tracing::warn!("no license files found in {}", layout.source_folder().display());
    }

    let libs = collect_libs(&layout.package_folder().join("lib"))?;
    let info = PackageInfo::new(recipe, libs);
    info.save(&layout.package_info_file())?;

    tracing::info!(
        "Packaged {} ({} libraries) into {}",
        info.reference,
        info.libs.len(),
        layout.package_folder().display()
    );
    Ok(info)
}
