//! Source acquisition.
//!
//! Fetching the release archive, unpacking it into the source folder and
//! applying the build-file patches.

pub mod archive;
pub mod fetch;
pub mod patch;

pub use archive::extract_tarball;
pub use fetch::{Fetcher, SourceSpec};
pub use patch::{apply_patch, PatchOutcome, PatchStrategy, ThirdPartyContainersPatch};
