//! `rmlui-recipe build` command

use anyhow::Result;

use super::{build_options, resolve};
use crate::cli::BuildArgs;
use rmlui_recipe::ops::build;
use rmlui_recipe::util::GlobalContext;

pub fn execute(args: BuildArgs, ctx: &GlobalContext) -> Result<()> {
    let config = ctx.config()?;
    let recipe = resolve(&config, &args.config)?;
    let layout = ctx.layout(recipe.settings.build_type);

    build(&layout, &build_options(&config, &args.cmake))?;

    eprintln!(
        "    Finished {} build in {}",
        recipe.settings.build_type,
        layout.build_folder().display()
    );

    Ok(())
}
