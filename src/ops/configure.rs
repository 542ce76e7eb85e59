//! Resolve settings and options into one validated configuration.
//!
//! Everything here is pure: an invalid configuration is rejected before a
//! single byte is downloaded or written.

use std::collections::BTreeMap;

use crate::core::dependency::{requirements, Requirement};
use crate::core::errors::RecipeError;
use crate::core::options::{OptionSet, RecipeOptions, DECLARED_OPTIONS};
use crate::core::recipe::{validate, RecipeInfo, RMLUI};
use crate::core::settings::Settings;

/// Inputs for [`configure`].
#[derive(Debug, Clone, Default)]
pub struct ConfigureOptions {
    /// `name=value` settings, applied in order over the host defaults
    pub settings: Vec<String>,

    /// `name=value` options from config files
    pub config_options: Vec<String>,

    /// `name=value` options from the command line
    pub options: Vec<String>,
}

/// A validated configuration of the recipe.
#[derive(Debug, Clone)]
pub struct ResolvedRecipe {
    pub info: RecipeInfo,
    pub settings: Settings,
    pub options: OptionSet,
    pub recipe_options: RecipeOptions,
    pub requirements: Vec<Requirement>,
}

impl ResolvedRecipe {
    /// Effective options keyed by name.
    pub fn option_map(&self) -> BTreeMap<String, String> {
        self.options.to_map()
    }

    /// Requirement references, e.g. `itlib/1.11.4`.
    pub fn requirement_refs(&self) -> Vec<String> {
        self.requirements.iter().map(Requirement::reference).collect()
    }
}

/// Resolve and validate a configuration.
///
/// Config-file options that the target OS prunes (e.g. `fPIC` on Windows) are
/// skipped with a warning; the same option on the command line is an error,
/// and so is a name no configuration declares.
pub fn configure(opts: &ConfigureOptions) -> Result<ResolvedRecipe, RecipeError> {
    let mut settings = Settings::detect();
    settings.apply_assignments(opts.settings.iter().map(String::as_str))?;
    validate(&settings)?;

    let mut options = OptionSet::for_settings(&settings);
    for assignment in &opts.config_options {
        match options.apply_assignments([assignment.as_str()]) {
            Err(RecipeError::UnknownOption { option, os }) if is_declared(&option) => {
                tracing::warn!("ignoring configured option `{}`: not available on {}", option, os);
            }
            other => other?,
        }
    }
    options.apply_assignments(opts.options.iter().map(String::as_str))?;

    let recipe_options = options.to_recipe_options();
    let requirements = requirements(&recipe_options);

    tracing::debug!(
        "configured {} for {} {} ({})",
        RMLUI.reference(),
        settings.os,
        settings.arch,
        settings.build_type
    );

    Ok(ResolvedRecipe {
        info: RMLUI,
        settings,
        options,
        recipe_options,
        requirements,
    })
}

fn is_declared(name: &str) -> bool {
    DECLARED_OPTIONS.iter().any(|decl| decl.name == name)
}
