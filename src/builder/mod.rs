//! Native build driver.
//!
//! Turns a resolved configuration into CMake inputs (cache variables and a
//! toolchain file) and runs CMake over the patched sources.

pub mod cmake;
pub mod deps;
pub mod toolchain;
pub mod variables;

pub use cmake::CMakeBuilder;
pub use deps::{DependencyInfo, DependencyInfos, SearchPaths};
pub use toolchain::Toolchain;
pub use variables::{BuildVariables, CacheValue};
