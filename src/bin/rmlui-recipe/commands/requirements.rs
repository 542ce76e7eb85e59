//! `rmlui-recipe requirements` command

use anyhow::Result;

use super::resolve;
use crate::cli::RequirementsArgs;
use rmlui_recipe::util::GlobalContext;

pub fn execute(args: RequirementsArgs, ctx: &GlobalContext) -> Result<()> {
    let recipe = resolve(&ctx.config()?, &args.config)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&recipe.requirements)?);
    } else {
        for req in &recipe.requirements {
            println!("{}", req);
        }
    }

    Ok(())
}
