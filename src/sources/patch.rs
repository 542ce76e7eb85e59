//! Guarded text patches over upstream build files.
//!
//! A patch strategy names one file, an anchor line inside it, and the text to
//! insert right after that anchor. A helper tag embedded in the inserted text
//! marks the file as patched, so applying a strategy twice is a no-op.
//!
//! | file state                      | outcome                          |
//! |---------------------------------|----------------------------------|
//! | helper tag present              | [`PatchOutcome::AlreadyPatched`] |
//! | anchor present once, no tag     | [`PatchOutcome::Applied`]        |
//! | anchor missing or repeated      | [`RecipeError`], file untouched  |

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::errors::RecipeError;
use crate::util::fs::{read_to_string, write_string};

/// An anchor-based insertion into one upstream file.
pub trait PatchStrategy {
    /// File to patch, relative to the source root.
    fn target(&self) -> PathBuf;

    /// Literal text the insertion follows.
    fn anchor(&self) -> &str;

    /// Text that identifies an already-patched file.
    fn helper_tag(&self) -> &str;

    /// Text inserted directly after the anchor. Must contain the helper tag.
    fn injection(&self) -> String;
}

/// Result of applying a patch strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    Applied,
    AlreadyPatched,
}

/// Compute the patched contents without touching the filesystem.
///
/// Returns `None` when the contents already carry the helper tag.
pub fn patch_contents(
    contents: &str,
    strategy: &dyn PatchStrategy,
    path: &Path,
) -> Result<Option<String>, RecipeError> {
    if contents.contains(strategy.helper_tag()) {
        return Ok(None);
    }

    let anchor = strategy.anchor();
    let count = contents.matches(anchor).count();
    let position = match (count, contents.find(anchor)) {
        (1, Some(position)) => position,
        (0, _) | (_, None) => {
            return Err(RecipeError::UpstreamIncompatible {
                marker: anchor.to_string(),
                path: path.to_path_buf(),
            })
        }
        (count, _) => {
            return Err(RecipeError::AmbiguousAnchor {
                marker: anchor.to_string(),
                path: path.to_path_buf(),
                count,
            })
        }
    };

    let insert_at = position + anchor.len();
    let injection = strategy.injection();

    let mut patched = String::with_capacity(contents.len() + injection.len());
    patched.push_str(&contents[..insert_at]);
    patched.push_str(&injection);
    patched.push_str(&contents[insert_at..]);

    Ok(Some(patched))
}

/// Apply a patch strategy to a source tree in place.
pub fn apply_patch(source_dir: &Path, strategy: &dyn PatchStrategy) -> Result<PatchOutcome> {
    let path = source_dir.join(strategy.target());
    let contents = read_to_string(&path)?;

    match patch_contents(&contents, strategy, &path)? {
        None => {
            tracing::info!("{} is already patched", path.display());
            Ok(PatchOutcome::AlreadyPatched)
        }
        Some(patched) => {
            write_string(&path, &patched)?;
            tracing::info!("Patched {}", path.display());
            Ok(PatchOutcome::Applied)
        }
    }
}

/// Makes the core target find the external robin_hood and itlib headers when
/// `RMLUI_THIRDPARTY_CONTAINERS` is on.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThirdPartyContainersPatch;

impl ThirdPartyContainersPatch {
    pub const ANCHOR: &'static str = "unset(rmlui_core_TYPE)";
    pub const HELPER_TAG: &'static str = "recipe helper: thirdparty container include dirs";
}

impl PatchStrategy for ThirdPartyContainersPatch {
    fn target(&self) -> PathBuf {
        Path::new("Source").join("Core").join("CMakeLists.txt")
    }

    fn anchor(&self) -> &str {
        Self::ANCHOR
    }

    fn helper_tag(&self) -> &str {
        Self::HELPER_TAG
    }

    fn injection(&self) -> String {
        format!(
            r#"
# --- {tag} ---
if(RMLUI_THIRDPARTY_CONTAINERS)
find_path(ROBIN_HOOD_INCLUDE_DIR robin_hood.h)
if(NOT ROBIN_HOOD_INCLUDE_DIR)
message(FATAL_ERROR "RmlUi: robin_hood.h not found. Provide robin-hood-hashing (e.g. via --deps).")
endif()
target_include_directories(rmlui_core PUBLIC ${{ROBIN_HOOD_INCLUDE_DIR}})

find_path(ITLIB_INCLUDE_DIR itlib/flat_map.hpp)
if(NOT ITLIB_INCLUDE_DIR)
message(FATAL_ERROR "RmlUi: itlib headers not found. Provide itlib (e.g. via --deps).")
endif()
target_include_directories(rmlui_core PUBLIC ${{ITLIB_INCLUDE_DIR}})
endif()
# --- end {tag} ---
"#,
            tag = Self::HELPER_TAG
        )
    }
}

/// Patches applied to every fresh RmlUi source tree, in order.
pub fn default_patches() -> Vec<Box<dyn PatchStrategy>> {
    vec![Box::new(ThirdPartyContainersPatch)]
}
