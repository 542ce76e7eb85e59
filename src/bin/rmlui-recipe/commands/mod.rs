//! Command implementations

pub mod build;
pub mod completions;
pub mod create;
pub mod generate;
pub mod info;
pub mod options;
pub mod package;
pub mod requirements;
pub mod source;

use std::path::PathBuf;

use anyhow::Result;

use crate::cli::{CMakeFlags, ConfigArgs, SourceFlags};
use rmlui_recipe::builder::CacheValue;
use rmlui_recipe::ops::{configure, BuildOptions, ConfigureOptions, ResolvedRecipe, SourceOptions};
use rmlui_recipe::sources::SourceSpec;
use rmlui_recipe::util::diagnostic::emit;
use rmlui_recipe::util::{Config, Diagnostic, GlobalContext};
use rmlui_recipe::RMLUI;

/// Resolve the configuration: host defaults < config files < command line.
pub fn resolve(config: &Config, args: &ConfigArgs) -> Result<ResolvedRecipe> {
    let mut settings = config.setting_assignments();
    settings.extend(args.settings.iter().cloned());

    let opts = ConfigureOptions {
        settings,
        config_options: config.option_assignments(),
        options: args.options.clone(),
    };
    Ok(configure(&opts)?)
}

pub fn source_options(ctx: &GlobalContext, config: &Config, flags: &SourceFlags) -> SourceOptions {
    let mut spec = SourceSpec::for_recipe(&RMLUI);

    if let Some(url) = flags.archive.as_ref().or(config.source.url.as_ref()) {
        spec = spec.with_url(url.clone());
    }
    // A configured checksum belongs to the configured URL, not to --archive.
    let sha256 = match (&flags.sha256, &flags.archive) {
        (Some(sha), _) => Some(sha.clone()),
        (None, None) => config.source.sha256.clone(),
        (None, Some(_)) => None,
    };
    if let Some(sha) = sha256 {
        spec = spec.with_sha256(sha);
    }

    let require_checksum = flags.require_checksum || config.source.require_checksum;
    if spec.sha256.is_none() && !require_checksum {
        let warning = Diagnostic::warning(format!("{} will not be verified", spec.url))
            .with_context("no sha256 checksum is configured for the release archive")
            .with_suggestion("Pass `--sha256 <digest>` or set `sha256` under [source] in recipe.toml");
        emit(&warning, ctx.color());
    }

    SourceOptions {
        spec,
        cache_dir: ctx.resolve_path(&config.cache_dir()),
        offline: flags.offline || config.source.offline,
        require_checksum,
        force: flags.force,
    }
}

pub fn build_options(config: &Config, flags: &CMakeFlags) -> BuildOptions {
    BuildOptions {
        jobs: flags.jobs.or(config.build.jobs),
        generator: flags.generator.clone().or_else(|| config.build.generator.clone()),
    }
}

/// Dependency info file: command line first, then `[build] deps`, which is
/// relative to the root folder.
pub fn deps_path(ctx: &GlobalContext, config: &Config, cli: Option<&PathBuf>) -> Option<PathBuf> {
    match cli {
        Some(path) => Some(ctx.resolve_path(path)),
        None => config.build.deps.as_ref().map(|path| ctx.root().join(path)),
    }
}

pub fn extra_variables(config: &Config) -> Vec<(String, CacheValue)> {
    config
        .build
        .variables
        .iter()
        .map(|(name, value)| (name.clone(), CacheValue::from(value)))
        .collect()
}
