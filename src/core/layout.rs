//! Folder layout for one recipe run.
//!
//! ```text
//! <root>/
//! ├── src/                       # extracted, patched sources
//! ├── build/<build_type>/        # CMake binary dir
//! │   └── generators/            # recipe_toolchain.cmake, options.json
//! └── package/                   # install prefix
//!     ├── licenses/
//!     └── package-info.json
//! ```

use std::path::{Path, PathBuf};

use crate::core::settings::BuildType;

pub const TOOLCHAIN_FILE_NAME: &str = "recipe_toolchain.cmake";
pub const GENERATED_OPTIONS_FILE_NAME: &str = "options.json";
pub const PACKAGE_INFO_FILE_NAME: &str = "package-info.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: PathBuf,
    build_type: BuildType,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>, build_type: BuildType) -> Self {
        Layout {
            root: root.into(),
            build_type,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn build_type(&self) -> BuildType {
        self.build_type
    }

    pub fn source_folder(&self) -> PathBuf {
        self.root.join("src")
    }

    pub fn build_folder(&self) -> PathBuf {
        self.root.join("build").join(self.build_type.as_str())
    }

    pub fn generators_folder(&self) -> PathBuf {
        self.build_folder().join("generators")
    }

    pub fn toolchain_file(&self) -> PathBuf {
        self.generators_folder().join(TOOLCHAIN_FILE_NAME)
    }

    /// Options the toolchain file was generated with.
    pub fn generated_options_file(&self) -> PathBuf {
        self.generators_folder().join(GENERATED_OPTIONS_FILE_NAME)
    }

    pub fn package_folder(&self) -> PathBuf {
        self.root.join("package")
    }

    pub fn licenses_folder(&self) -> PathBuf {
        self.package_folder().join("licenses")
    }

    pub fn package_info_file(&self) -> PathBuf {
        self.package_folder().join(PACKAGE_INFO_FILE_NAME)
    }
}
