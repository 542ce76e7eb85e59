//! rmlui-recipe - packaging recipe for the RmlUi C++ UI library
//!
//! This crate resolves recipe options into dependency requirements, fetches
//! and patches the upstream sources, and drives CMake to build and package
//! them.

pub mod builder;
pub mod core;
pub mod ops;
pub mod sources;
pub mod util;

pub use core::{
    errors::RecipeError, layout::Layout, options::OptionSet, options::RecipeOptions,
    recipe::RMLUI, settings::Settings,
};

pub use ops::{PackageInfo, ResolvedRecipe};
pub use util::context::GlobalContext;
