//! Implementation of the generate step.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::builder::deps::DependencyInfos;
use crate::builder::toolchain::Toolchain;
use crate::builder::variables::{BuildVariables, CacheValue};
use crate::core::layout::Layout;
use crate::ops::configure::ResolvedRecipe;
use crate::util::fs::write_string;

/// Options for the generate step.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Where the required packages live
    pub deps: DependencyInfos,

    /// Extra cache variables, merged under the recipe's forced ones
    pub variables: Vec<(String, CacheValue)>,
}

/// Load and check a dependency info file.
///
/// Version mismatches are configuration errors, so this runs before any
/// other step writes to the layout.
pub fn load_deps(path: Option<&Path>, recipe: &ResolvedRecipe) -> Result<DependencyInfos> {
    let deps = match path {
        Some(path) => DependencyInfos::load(path)?,
        None => DependencyInfos::default(),
    };
    deps.check(&recipe.requirements)?;
    Ok(deps)
}

/// Build the toolchain description for a configuration.
pub fn toolchain(recipe: &ResolvedRecipe, opts: &GenerateOptions) -> Toolchain {
    let mut variables = BuildVariables::from_options(&recipe.recipe_options);
    variables.merge(opts.variables.iter().cloned());

    Toolchain {
        build_type: recipe.settings.build_type,
        shared: recipe.recipe_options.shared,
        fpic: recipe.recipe_options.fpic,
        cppstd: recipe.settings.cppstd,
        search_paths: opts.deps.search_paths(&recipe.requirements),
        variables,
    }
}

/// Write `recipe_toolchain.cmake` into the layout's generators folder, next
/// to `options.json` recording the options it was generated with.
pub fn generate(recipe: &ResolvedRecipe, layout: &Layout, opts: &GenerateOptions) -> Result<PathBuf> {
    let path = toolchain(recipe, opts).write(&layout.toolchain_file())?;

    let json = serde_json::to_string_pretty(&recipe.option_map())
        .context("failed to serialize generated options")?;
    write_string(&layout.generated_options_file(), &format!("{}\n", json))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::RecipeError;
    use crate::ops::configure::{configure, ConfigureOptions};
    use tempfile::TempDir;

    fn recipe(options: &[&str]) -> ResolvedRecipe {
        configure(&ConfigureOptions {
            settings: vec!["os=Linux".into(), "build_type=Debug".into()],
            config_options: Vec::new(),
            options: options.iter().map(|s| s.to_string()).collect(),
        })
        .unwrap()
    }

    #[test]
    fn test_generate_writes_toolchain() {
        let tmp = TempDir::new().unwrap();
        let recipe = recipe(&["shared=True"]);
        let layout = Layout::new(tmp.path(), recipe.settings.build_type);

        let path = generate(&recipe, &layout, &GenerateOptions::default()).unwrap();
        assert_eq!(path, tmp.path().join("build/Debug/generators/recipe_toolchain.cmake"));

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("set(BUILD_SHARED_LIBS ON CACHE BOOL \"\" FORCE)"));
        assert!(text.contains("set(CMAKE_BUILD_TYPE \"Debug\" CACHE STRING \"\" FORCE)"));
        assert!(text.contains("set(RMLUI_WARNINGS_AS_ERRORS OFF CACHE BOOL \"\" FORCE)"));

        let options = std::fs::read_to_string(layout.generated_options_file()).unwrap();
        let options: std::collections::BTreeMap<String, String> =
            serde_json::from_str(&options).unwrap();
        assert_eq!(options, recipe.option_map());
        assert_eq!(options.get("shared").map(String::as_str), Some("True"));
    }

    #[test]
    fn test_extra_variables_cannot_enable_warnings_as_errors() {
        let opts = GenerateOptions {
            deps: DependencyInfos::default(),
            variables: vec![
                ("RMLUI_WARNINGS_AS_ERRORS".into(), CacheValue::Bool(true)),
                ("RMLUI_SVG_PLUGIN".into(), CacheValue::Bool(true)),
            ],
        };
        let text = toolchain(&recipe(&[]), &opts).render();
        assert!(text.contains("set(RMLUI_WARNINGS_AS_ERRORS OFF CACHE BOOL \"\" FORCE)"));
        assert!(text.contains("set(RMLUI_SVG_PLUGIN ON CACHE BOOL \"\" FORCE)"));
    }

    #[test]
    fn test_load_deps_checks_versions() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("deps.toml");
        std::fs::write(&path, "[lua]\nversion = \"5.3.6\"\n").unwrap();

        // Lua is not required by default, so its version is not checked.
        assert!(load_deps(Some(&path), &recipe(&[])).is_ok());

        let err = load_deps(Some(&path), &recipe(&["with_lua_bindings=True"])).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RecipeError>(),
            Some(RecipeError::DependencyVersionMismatch { .. })
        ));
    }

    #[test]
    fn test_search_paths_from_deps() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("deps.toml");
        std::fs::write(&path, "[itlib]\nroot = \"/opt/itlib\"\n").unwrap();

        let recipe = recipe(&[]);
        let opts = GenerateOptions {
            deps: load_deps(Some(&path), &recipe).unwrap(),
            variables: Vec::new(),
        };
        let text = toolchain(&recipe, &opts).render();
        assert!(text.contains("list(PREPEND CMAKE_PREFIX_PATH \"/opt/itlib\")"));
        assert!(text.contains("list(PREPEND CMAKE_INCLUDE_PATH \"/opt/itlib/include\")"));
    }
}
