//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// rmlui-recipe - build and package the RmlUi C++ UI library
#[derive(Parser)]
#[command(name = "rmlui-recipe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Folder holding recipe.toml and the src/build/package layout
    #[arg(long, global = true, value_name = "DIR", env = "RMLUI_RECIPE_ROOT")]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the effective options
    Options(OptionsArgs),

    /// List the dependency requirements
    Requirements(RequirementsArgs),

    /// Fetch, extract and patch the upstream sources
    Source(SourceArgs),

    /// Write the CMake toolchain file
    Generate(GenerateArgs),

    /// Configure and build with CMake
    Build(BuildArgs),

    /// Install into the package folder and write package-info.json
    Package(PackageArgs),

    /// Run source, generate, build and package in one go
    Create(CreateArgs),

    /// Show the recipe, its configuration and the layout
    Info(InfoArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Options and settings shared by every command.
#[derive(Args, Clone, Default)]
pub struct ConfigArgs {
    /// Set an option (e.g. -o shared=True)
    #[arg(short = 'o', long = "option", value_name = "NAME=VALUE")]
    pub options: Vec<String>,

    /// Set a setting (e.g. -s build_type=Debug)
    #[arg(short = 's', long = "setting", value_name = "NAME=VALUE")]
    pub settings: Vec<String>,
}

#[derive(Args)]
pub struct OptionsArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct RequirementsArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

/// Source acquisition flags.
#[derive(Args, Clone, Default)]
pub struct SourceFlags {
    /// Archive to use instead of the release URL (path, file:// or http(s) URL)
    #[arg(long, value_name = "PATH|URL")]
    pub archive: Option<String>,

    /// Expected SHA256 of the archive
    #[arg(long)]
    pub sha256: Option<String>,

    /// Fail when no checksum is configured
    #[arg(long)]
    pub require_checksum: bool,

    /// Never access the network
    #[arg(long)]
    pub offline: bool,

    /// Re-extract even if the source folder exists
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct SourceArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(flatten)]
    pub source: SourceFlags,
}

#[derive(Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Dependency info file (TOML)
    #[arg(long, value_name = "FILE")]
    pub deps: Option<PathBuf>,
}

/// CMake driver flags.
#[derive(Args, Clone, Default)]
pub struct CMakeFlags {
    /// Number of parallel jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// CMake generator (e.g. Ninja)
    #[arg(short = 'G', long)]
    pub generator: Option<String>,
}

#[derive(Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(flatten)]
    pub cmake: CMakeFlags,
}

#[derive(Args)]
pub struct PackageArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(flatten)]
    pub cmake: CMakeFlags,
}

#[derive(Args)]
pub struct CreateArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(flatten)]
    pub source: SourceFlags,

    /// Dependency info file (TOML)
    #[arg(long, value_name = "FILE")]
    pub deps: Option<PathBuf>,

    #[command(flatten)]
    pub cmake: CMakeFlags,
}

#[derive(Args)]
pub struct InfoArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
