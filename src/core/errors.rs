//! Recipe error types and diagnostics.

use std::path::PathBuf;

use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Broad category of a [`RecipeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected before anything is downloaded or built.
    Configuration,
    /// The upstream sources no longer match what the recipe expects.
    UpstreamIncompatible,
    /// CMake refused to configure the project.
    NativeConfigure,
    /// Fetching the sources failed.
    Acquisition,
}

/// Error raised by one of the recipe phases.
#[derive(Debug, Error)]
pub enum RecipeError {
    #[error("invalid value '{value}' for option '{option}' (possible values: {allowed})")]
    InvalidOption {
        option: String,
        value: String,
        allowed: String,
    },

    #[error("option '{option}' doesn't exist for {os}")]
    UnknownOption { option: String, os: String },

    #[error("invalid setting '{setting}': {message}")]
    InvalidSetting { setting: String, message: String },

    #[error("current cppstd ({found}) is lower than the required C++ standard ({required})")]
    CppStdTooLow { found: String, required: String },

    #[error("no sha256 checksum configured for {url}")]
    ChecksumRequired { url: String },

    #[error("`{name}` {found} does not satisfy requirement {required}")]
    DependencyVersionMismatch {
        name: String,
        found: String,
        required: String,
    },

    #[error("option '{option}' is {requested}, but the build tree was generated with {generated}")]
    GeneratedOptionsMismatch {
        option: String,
        requested: String,
        generated: String,
    },

    #[error("upstream changed; cannot patch {} (marker '{marker}' not found)", path.display())]
    UpstreamIncompatible { marker: String, path: PathBuf },

    #[error("upstream changed; cannot patch {} (marker '{marker}' found {count} times)", path.display())]
    AmbiguousAnchor {
        marker: String,
        path: PathBuf,
        count: usize,
    },

    #[error("CMake configuration failed: {header} not found")]
    NativeConfigure { header: String, message: String },

    #[error("archive hash mismatch for {url}:\n  expected: {expected}\n  actual:   {actual}")]
    ChecksumMismatch {
        url: String,
        expected: String,
        actual: String,
    },

    #[error("failed to download {url}: {message}")]
    Download { url: String, message: String },
}

impl RecipeError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RecipeError::InvalidOption { .. }
            | RecipeError::UnknownOption { .. }
            | RecipeError::InvalidSetting { .. }
            | RecipeError::CppStdTooLow { .. }
            | RecipeError::ChecksumRequired { .. }
            | RecipeError::DependencyVersionMismatch { .. }
            | RecipeError::GeneratedOptionsMismatch { .. } => ErrorKind::Configuration,
            RecipeError::UpstreamIncompatible { .. } | RecipeError::AmbiguousAnchor { .. } => {
                ErrorKind::UpstreamIncompatible
            }
            RecipeError::NativeConfigure { .. } => ErrorKind::NativeConfigure,
            RecipeError::ChecksumMismatch { .. } | RecipeError::Download { .. } => {
                ErrorKind::Acquisition
            }
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string());

        match self {
            RecipeError::InvalidOption { option, .. } => diag.with_suggestion(format!(
                "Pass one of the listed values, e.g. `-o {}=<value>`",
                option
            )),

            RecipeError::UnknownOption { .. } => {
                diag.with_suggestion(suggestions::LIST_OPTIONS)
            }

            RecipeError::InvalidSetting { .. } => diag,

            RecipeError::CppStdTooLow { required, .. } => diag.with_suggestion(format!(
                "Raise the standard with `-s compiler.cppstd={}` or newer",
                required.trim_start_matches("C++")
            )),

            RecipeError::ChecksumRequired { .. } => diag
                .with_context("checksum verification is mandatory with require_checksum")
                .with_suggestion("Add `sha256 = \"...\"` under [source] in recipe.toml"),

            RecipeError::DependencyVersionMismatch { name, .. } => diag.with_suggestion(format!(
                "Provide a version of `{}` that matches the requirement in the deps file",
                name
            )),

            RecipeError::GeneratedOptionsMismatch { option, generated, .. } => diag
                .with_suggestion(format!("Package with `-o {}={}`", option, generated))
                .with_suggestion("Re-run `rmlui-recipe generate` and `rmlui-recipe build` with the new options"),

            RecipeError::UpstreamIncompatible { path, .. }
            | RecipeError::AmbiguousAnchor { path, .. } => diag
                .with_location(path)
                .with_context("the upstream build layout no longer matches this recipe")
                .with_suggestion("Update the patch strategy for the new upstream release"),

            RecipeError::NativeConfigure { message, .. } => diag
                .with_context(message.clone())
                .with_suggestion(suggestions::PROVIDE_DEPS),

            RecipeError::ChecksumMismatch { .. } => diag
                .with_suggestion("Check that the configured sha256 matches the release archive"),

            RecipeError::Download { .. } => diag.with_suggestion(suggestions::FETCH_FAILED),
        }
    }
}
