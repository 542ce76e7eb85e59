//! `rmlui-recipe package` command

use anyhow::Result;

use super::{build_options, resolve};
use crate::cli::PackageArgs;
use rmlui_recipe::ops::package;
use rmlui_recipe::util::GlobalContext;

pub fn execute(args: PackageArgs, ctx: &GlobalContext) -> Result<()> {
    let config = ctx.config()?;
    let recipe = resolve(&config, &args.config)?;
    let layout = ctx.layout(recipe.settings.build_type);

    let info = package(&recipe, &layout, &build_options(&config, &args.cmake))?;

    eprintln!("    Packaged {} into {}", info.reference, layout.package_folder().display());
    for lib in &info.libs {
        eprintln!("             {}", lib);
    }

    Ok(())
}
