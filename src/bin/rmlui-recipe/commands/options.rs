//! `rmlui-recipe options` command

use anyhow::Result;

use super::resolve;
use crate::cli::OptionsArgs;
use rmlui_recipe::util::GlobalContext;

pub fn execute(args: OptionsArgs, ctx: &GlobalContext) -> Result<()> {
    let recipe = resolve(&ctx.config()?, &args.config)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&recipe.option_map())?);
    } else {
        print!("{}", recipe.options);
    }

    Ok(())
}
