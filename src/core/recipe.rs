//! Recipe identity and configuration checks for RmlUi.

use serde::Serialize;

use crate::core::errors::RecipeError;
use crate::core::language::CppStandard;
use crate::core::settings::Settings;

/// Static description of the packaged library.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RecipeInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub package_type: &'static str,
    pub license: &'static str,
    pub homepage: &'static str,
    pub description: &'static str,
    pub topics: &'static [&'static str],
}

impl RecipeInfo {
    /// Reference form, e.g. `rmlui/6.1`.
    pub fn reference(&self) -> String {
        format!("{}/{}", self.name, self.version)
    }

    /// Release archive URL for this version.
    pub fn source_url(&self) -> String {
        format!("{}/archive/refs/tags/{}.tar.gz", self.homepage, self.version)
    }
}

pub const RMLUI: RecipeInfo = RecipeInfo {
    name: "rmlui",
    version: "6.1",
    package_type: "library",
    license: "MIT",
    homepage: "https://github.com/mikke89/RmlUi",
    description: "RmlUi is a C++ user interface library based on HTML/CSS.",
    topics: &["ui", "html", "css"],
};

/// Oldest C++ standard the recipe accepts.
pub const MIN_CPPSTD: CppStandard = CppStandard::Cpp14;

/// Name consumers pass to `find_package`.
pub const CMAKE_FILE_NAME: &str = "RmlUi";

/// Imported target consumers link against.
pub const CMAKE_TARGET_NAME: &str = "RmlUi::RmlUi";

/// Define required when consuming the static library.
pub const STATIC_LIB_DEFINE: &str = "RMLUI_STATIC_LIB";

/// Reject settings the recipe cannot build for.
pub fn validate(settings: &Settings) -> Result<(), RecipeError> {
    if let Some(cppstd) = settings.cppstd {
        if !cppstd.satisfies(MIN_CPPSTD) {
            return Err(RecipeError::CppStdTooLow {
                found: cppstd.to_string(),
                required: MIN_CPPSTD.to_string(),
            });
        }
    }
    Ok(())
}
