//! Core data structures for the recipe.
//!
//! This module contains the types every phase works with:
//! - Settings and C++ standards (what the package is built for)
//! - Options and their typed view
//! - Dependency requirements derived from options
//! - Recipe identity and the folder layout

pub mod dependency;
pub mod errors;
pub mod language;
pub mod layout;
pub mod options;
pub mod recipe;
pub mod settings;

pub use dependency::{requirements, Requirement, VersionSpec};
pub use errors::{ErrorKind, RecipeError};
pub use language::{CppStandard, CppStd};
pub use layout::Layout;
pub use options::{FontEngine, OptionSet, OptionValue, RecipeOptions};
pub use recipe::{RecipeInfo, RMLUI};
pub use settings::{BuildType, Os, Settings};
