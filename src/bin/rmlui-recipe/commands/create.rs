//! `rmlui-recipe create` command

use anyhow::Result;

use super::{build_options, deps_path, extra_variables, resolve, source_options};
use crate::cli::CreateArgs;
use rmlui_recipe::ops::{create, CreateOptions};
use rmlui_recipe::util::GlobalContext;

pub fn execute(args: CreateArgs, ctx: &GlobalContext) -> Result<()> {
    let config = ctx.config()?;
    let recipe = resolve(&config, &args.config)?;
    let layout = ctx.layout(recipe.settings.build_type);

    let opts = CreateOptions {
        source: source_options(ctx, &config, &args.source),
        deps: deps_path(ctx, &config, args.deps.as_ref()),
        variables: extra_variables(&config),
        build: build_options(&config, &args.cmake),
    };

    let info = create(&recipe, &layout, &opts)?;

    eprintln!(
        "    Finished {} ({} libraries) in {}",
        info.reference,
        info.libs.len(),
        layout.package_folder().display()
    );

    Ok(())
}
