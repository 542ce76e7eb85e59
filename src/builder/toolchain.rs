//! Generated CMake toolchain file.
//!
//! Everything the native build needs to know about a configuration ends up in
//! one `recipe_toolchain.cmake`, passed to CMake via `CMAKE_TOOLCHAIN_FILE`.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::builder::deps::SearchPaths;
use crate::builder::variables::{BuildVariables, CacheValue};
use crate::core::language::CppStd;
use crate::core::settings::BuildType;
use crate::util::fs::write_string;

/// Contents of the toolchain file for one configuration.
#[derive(Debug, Clone)]
pub struct Toolchain {
    pub build_type: BuildType,
    /// `BUILD_SHARED_LIBS`
    pub shared: bool,
    /// `CMAKE_POSITION_INDEPENDENT_CODE`, omitted when `None`
    pub fpic: Option<bool>,
    pub cppstd: Option<CppStd>,
    pub search_paths: SearchPaths,
    pub variables: BuildVariables,
}

impl Toolchain {
    /// Render the toolchain file.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("# Generated by rmlui-recipe. Changes are overwritten.\n");
        out.push_str("include_guard()\n\n");

        out.push_str("# Toolchain\n");
        cache_line(
            &mut out,
            "CMAKE_BUILD_TYPE",
            &CacheValue::String(self.build_type.as_str().to_string()),
        );
        cache_line(&mut out, "BUILD_SHARED_LIBS", &CacheValue::Bool(self.shared));
        if let Some(fpic) = self.fpic {
            cache_line(
                &mut out,
                "CMAKE_POSITION_INDEPENDENT_CODE",
                &CacheValue::Bool(fpic),
            );
        }
        if let Some(cppstd) = &self.cppstd {
            let _ = writeln!(
                out,
                "set(CMAKE_CXX_STANDARD {})",
                cppstd.standard.as_cmake_value()
            );
            let _ = writeln!(out, "set(CMAKE_CXX_STANDARD_REQUIRED ON)");
            let _ = writeln!(
                out,
                "set(CMAKE_CXX_EXTENSIONS {})",
                CacheValue::Bool(cppstd.gnu_extensions)
            );
        }

        if !self.search_paths.is_empty() {
            out.push_str("\n# Dependencies\n");
            path_list(&mut out, "CMAKE_PREFIX_PATH", &self.search_paths.prefix);
            path_list(&mut out, "CMAKE_INCLUDE_PATH", &self.search_paths.include);
            path_list(&mut out, "CMAKE_LIBRARY_PATH", &self.search_paths.library);
        }

        out.push_str("\n# RmlUi\n");
        for (name, value) in self.variables.iter() {
            cache_line(&mut out, name, value);
        }

        out
    }

    /// Render and write the toolchain file.
    pub fn write(&self, path: &Path) -> Result<PathBuf> {
        write_string(path, &self.render())?;
        tracing::info!("Generated {}", path.display());
        Ok(path.to_path_buf())
    }
}

fn cache_line(out: &mut String, name: &str, value: &CacheValue) {
    let rendered = match value {
        CacheValue::Bool(_) => value.to_string(),
        CacheValue::String(s) => quote(s),
    };
    let _ = writeln!(
        out,
        "set({} {} CACHE {} \"\" FORCE)",
        name,
        rendered,
        value.cmake_type()
    );
}

fn path_list(out: &mut String, name: &str, paths: &[PathBuf]) {
    if paths.is_empty() {
        return;
    }
    let quoted: Vec<String> = paths.iter().map(|p| quote(&cmake_path(p))).collect();
    let _ = writeln!(out, "list(PREPEND {} {})", name, quoted.join(" "));
}

/// CMake wants forward slashes, even on Windows.
fn cmake_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn quote(s: &str) -> String {
    let escaped = s
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('$', "\\$");
    format!("\"{}\"", escaped)
}
