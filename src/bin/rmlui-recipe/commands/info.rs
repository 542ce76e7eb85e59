//! `rmlui-recipe info` command

use anyhow::Result;
use serde_json::json;

use super::{extra_variables, resolve};
use crate::cli::InfoArgs;
use rmlui_recipe::builder::BuildVariables;
use rmlui_recipe::ops::PackageInfo;
use rmlui_recipe::util::GlobalContext;

pub fn execute(args: InfoArgs, ctx: &GlobalContext) -> Result<()> {
    let config = ctx.config()?;
    let recipe = resolve(&config, &args.config)?;
    let layout = ctx.layout(recipe.settings.build_type);

    let mut variables = BuildVariables::from_options(&recipe.recipe_options);
    variables.merge(extra_variables(&config));

    let package_file = layout.package_info_file();
    let package = if package_file.exists() {
        Some(PackageInfo::load(&package_file)?)
    } else {
        None
    };

    let settings = &recipe.settings;
    let cppstd = settings.cppstd.map(|s| s.to_string());

    if args.json {
        let value = json!({
            "recipe": recipe.info,
            "settings": {
                "os": settings.os.as_str(),
                "arch": settings.arch,
                "build_type": settings.build_type.as_str(),
                "compiler": settings.compiler,
                "compiler.cppstd": cppstd,
            },
            "options": recipe.option_map(),
            "requirements": recipe.requirement_refs(),
            "cmake_variables": variables.to_cmake_args(),
            "layout": {
                "source": layout.source_folder(),
                "build": layout.build_folder(),
                "toolchain": layout.toolchain_file(),
                "package": layout.package_folder(),
            },
            "package": package,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{} - {}", recipe.info.reference(), recipe.info.description);
    println!("  license:  {}", recipe.info.license);
    println!("  homepage: {}", recipe.info.homepage);
    println!();
    println!("settings:");
    println!("  os={}", settings.os);
    println!("  arch={}", settings.arch);
    println!("  build_type={}", settings.build_type);
    if let Some(compiler) = &settings.compiler {
        println!("  compiler={}", compiler);
    }
    if let Some(cppstd) = &cppstd {
        println!("  compiler.cppstd={}", cppstd);
    }
    println!();
    println!("options:");
    for (name, value) in recipe.options.iter() {
        println!("  {}={}", name, value);
    }
    println!();
    println!("requirements:");
    for req in &recipe.requirements {
        println!("  {}", req);
    }
    println!();
    println!("cmake variables:");
    for arg in variables.to_cmake_args() {
        println!("  {}", arg);
    }
    println!();
    println!("layout:");
    println!("  source:    {}", layout.source_folder().display());
    println!("  build:     {}", layout.build_folder().display());
    println!("  toolchain: {}", layout.toolchain_file().display());
    println!("  package:   {}", layout.package_folder().display());

    match package {
        Some(info) => {
            println!();
            println!("package:");
            println!("  cmake: find_package({}) -> {}", info.cmake_file_name, info.cmake_target_name);
            println!("  libs: {}", info.libs.join(", "));
            if !info.defines.is_empty() {
                println!("  defines: {}", info.defines.join(", "));
            }
        }
        None => {
            println!();
            println!("package: not built yet");
        }
    }

    Ok(())
}
