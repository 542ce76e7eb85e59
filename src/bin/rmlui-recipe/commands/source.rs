//! `rmlui-recipe source` command

use anyhow::Result;

use super::{resolve, source_options};
use crate::cli::SourceArgs;
use rmlui_recipe::ops::source;
use rmlui_recipe::util::GlobalContext;

pub fn execute(args: SourceArgs, ctx: &GlobalContext) -> Result<()> {
    let config = ctx.config()?;
    let recipe = resolve(&config, &args.config)?;
    let layout = ctx.layout(recipe.settings.build_type);

    let result = source(&layout, &source_options(ctx, &config, &args.source))?;

    if result.already_patched() {
        eprintln!("     Sources already patched in {}", result.source_dir.display());
    } else {
        eprintln!("     Patched sources in {}", result.source_dir.display());
    }

    Ok(())
}
