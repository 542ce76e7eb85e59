//! `rmlui-recipe generate` command

use anyhow::Result;

use super::{deps_path, extra_variables, resolve};
use crate::cli::GenerateArgs;
use rmlui_recipe::ops::{generate, load_deps, GenerateOptions};
use rmlui_recipe::util::GlobalContext;

pub fn execute(args: GenerateArgs, ctx: &GlobalContext) -> Result<()> {
    let config = ctx.config()?;
    let recipe = resolve(&config, &args.config)?;
    let layout = ctx.layout(recipe.settings.build_type);

    let deps_file = deps_path(ctx, &config, args.deps.as_ref());
    let opts = GenerateOptions {
        deps: load_deps(deps_file.as_deref(), &recipe)?,
        variables: extra_variables(&config),
    };

    let path = generate(&recipe, &layout, &opts)?;
    eprintln!("   Generated {}", path.display());

    Ok(())
}
