//! High-level operations.
//!
//! One module per recipe phase. The CLI commands are thin wrappers around
//! these.

pub mod build;
pub mod configure;
pub mod create;
pub mod generate;
pub mod package;
pub mod source;

pub use build::{build, BuildOptions};
pub use configure::{configure, ConfigureOptions, ResolvedRecipe};
pub use create::{create, CreateOptions};
pub use generate::{generate, load_deps, GenerateOptions};
pub use package::{collect_libs, package, PackageInfo};
pub use source::{source, SourceOptions, SourceResult};
