//! rmlui-recipe CLI - build and package RmlUi

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use rmlui_recipe::util::diagnostic::emit;
use rmlui_recipe::util::GlobalContext;
use rmlui_recipe::RecipeError;

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color && std::io::stderr().is_terminal();

    if let Err(e) = run(cli, color) {
        match e.chain().find_map(|cause| cause.downcast_ref::<RecipeError>()) {
            Some(err) => emit(&err.to_diagnostic(), color),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli, color: bool) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("rmlui_recipe=debug")
    } else {
        EnvFilter::new("rmlui_recipe=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_ansi(color)
        .with_writer(std::io::stderr)
        .init();

    let ctx = GlobalContext::new()?
        .with_root(cli.root.as_deref())
        .with_color(color);

    // Execute command
    match cli.command {
        Commands::Options(args) => commands::options::execute(args, &ctx),
        Commands::Requirements(args) => commands::requirements::execute(args, &ctx),
        Commands::Source(args) => commands::source::execute(args, &ctx),
        Commands::Generate(args) => commands::generate::execute(args, &ctx),
        Commands::Build(args) => commands::build::execute(args, &ctx),
        Commands::Package(args) => commands::package::execute(args, &ctx),
        Commands::Create(args) => commands::create::execute(args, &ctx),
        Commands::Info(args) => commands::info::execute(args, &ctx),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
