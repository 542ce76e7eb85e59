//! CLI integration tests for rmlui-recipe.
//!
//! These exercise the commands that need no compiler: option and requirement
//! resolution, source acquisition with patching, and toolchain generation.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use flate2::write::GzEncoder;
use flate2::Compression;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the rmlui-recipe binary command, isolated from the user's config.
fn recipe(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("rmlui-recipe").unwrap();
    cmd.env("HOME", home)
        .env_remove("CMAKE")
        .env_remove("RMLUI_RECIPE_ROOT");
    cmd
}

/// Create a temporary directory for test projects.
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

/// Write a release-shaped tarball and return its path.
fn release_archive(dir: &Path, core_cmake: &str) -> PathBuf {
    let files = [
        ("RmlUi-6.1/LICENSE.txt", "MIT License"),
        ("RmlUi-6.1/CMakeLists.txt", "project(RmlUi)\n"),
        ("RmlUi-6.1/Source/Core/CMakeLists.txt", core_cmake),
    ];

    let mut data = Vec::new();
    {
        let encoder = GzEncoder::new(&mut data, Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (path, contents) in files {
            let mut header = tar::Header::new_gnu();
            header.set_path(path).unwrap();
            header.set_size(contents.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append(&header, contents.as_bytes()).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    let path = dir.join("RmlUi-6.1.tar.gz");
    fs::write(&path, data).unwrap();
    path
}

const CORE_CMAKE: &str = "add_library(rmlui_core)\nunset(rmlui_core_TYPE)\n";

// ============================================================================
// rmlui-recipe options
// ============================================================================

#[test]
fn test_options_defaults() {
    let tmp = temp_dir();

    recipe(tmp.path())
        .args(["options", "-s", "os=Linux"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("shared=False"))
        .stdout(predicate::str::contains("fPIC=True"))
        .stdout(predicate::str::contains("font_engine=freetype"))
        .stdout(predicate::str::contains("with_thirdparty_containers=True"));
}

#[test]
fn test_options_windows_has_no_fpic() {
    let tmp = temp_dir();

    recipe(tmp.path())
        .args(["options", "-s", "os=Windows"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("fPIC").not())
        .stdout(predicate::str::contains("shared=False"));
}

#[test]
fn test_fpic_on_windows_is_rejected() {
    let tmp = temp_dir();

    recipe(tmp.path())
        .args(["options", "-s", "os=Windows", "-o", "fPIC=True"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("fPIC"))
        .stderr(predicate::str::contains("doesn't exist"));
}

#[test]
fn test_invalid_option_value() {
    let tmp = temp_dir();

    recipe(tmp.path())
        .args(["options", "-o", "font_engine=harfbuzz"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'harfbuzz'"))
        .stderr(predicate::str::contains("freetype, none"));
}

#[test]
fn test_options_from_project_config() {
    let tmp = temp_dir();
    fs::write(
        tmp.path().join("recipe.toml"),
        "[options]\nshared = true\nfont_engine = \"none\"\n",
    )
    .unwrap();

    recipe(tmp.path())
        .args(["options", "--json"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"shared\": \"True\""))
        .stdout(predicate::str::contains("\"font_engine\": \"none\""));
}

#[test]
fn test_invalid_project_config_is_an_error() {
    let tmp = temp_dir();
    fs::write(
        tmp.path().join("recipe.toml"),
        "[options]\nshared = 1\n\n[source]\nrequire_checksum = true\n",
    )
    .unwrap();

    recipe(tmp.path())
        .args(["options"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse config file"))
        .stderr(predicate::str::contains("recipe.toml"));
}

// ============================================================================
// rmlui-recipe requirements
// ============================================================================

#[test]
fn test_requirements_defaults() {
    let tmp = temp_dir();

    let output = recipe(tmp.path())
        .args(["requirements", "-s", "os=Linux"])
        .current_dir(tmp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "freetype/[>=2.10.4 <3]",
            "robin-hood-hashing/3.11.3",
            "itlib/1.11.4"
        ]
    );
}

#[test]
fn test_requirements_follow_options() {
    let tmp = temp_dir();

    recipe(tmp.path())
        .args([
            "requirements",
            "-o",
            "font_engine=none",
            "-o",
            "with_thirdparty_containers=False",
            "-o",
            "with_lua_bindings=True",
        ])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::eq("lua/5.4.7\n"));
}

#[test]
fn test_cppstd_too_low() {
    let tmp = temp_dir();

    recipe(tmp.path())
        .args(["requirements", "-s", "compiler.cppstd=11"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("C++14"));
}

// ============================================================================
// rmlui-recipe source
// ============================================================================

#[test]
fn test_source_patches_and_is_idempotent() {
    let tmp = temp_dir();
    let archive = release_archive(tmp.path(), CORE_CMAKE);
    let archive = archive.to_str().unwrap();

    recipe(tmp.path())
        .args(["source", "--offline", "--archive", archive])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("will not be verified"))
        .stderr(predicate::str::contains("Patched sources"));

    let core = fs::read_to_string(tmp.path().join("src/Source/Core/CMakeLists.txt")).unwrap();
    assert!(core.contains("recipe helper: thirdparty container include dirs"));
    assert!(core.contains("find_path(ROBIN_HOOD_INCLUDE_DIR robin_hood.h)"));

    recipe(tmp.path())
        .args(["source", "--offline", "--archive", archive])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("already patched"));

    let again = fs::read_to_string(tmp.path().join("src/Source/Core/CMakeLists.txt")).unwrap();
    assert_eq!(core, again);
}

#[test]
fn test_source_incompatible_upstream() {
    let tmp = temp_dir();
    let archive = release_archive(tmp.path(), "add_library(rmlui_core)\n");

    recipe(tmp.path())
        .args(["source", "--offline", "--archive", archive.to_str().unwrap()])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("upstream changed"))
        .stderr(predicate::str::contains("unset(rmlui_core_TYPE)"));
}

#[test]
fn test_source_require_checksum() {
    let tmp = temp_dir();
    let archive = release_archive(tmp.path(), CORE_CMAKE);

    recipe(tmp.path())
        .args([
            "source",
            "--offline",
            "--require-checksum",
            "--archive",
            archive.to_str().unwrap(),
        ])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no sha256 checksum"));

    assert!(!tmp.path().join("src").exists());
}

#[test]
fn test_source_checksum_mismatch() {
    let tmp = temp_dir();
    let archive = release_archive(tmp.path(), CORE_CMAKE);
    let wrong = "0".repeat(64);

    recipe(tmp.path())
        .args([
            "source",
            "--offline",
            "--archive",
            archive.to_str().unwrap(),
            "--sha256",
            &wrong,
        ])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("hash mismatch"));

    assert!(!tmp.path().join("src").exists());
}

#[test]
fn test_invalid_option_fails_before_download() {
    let tmp = temp_dir();
    let archive = release_archive(tmp.path(), CORE_CMAKE);

    recipe(tmp.path())
        .args([
            "source",
            "--offline",
            "--archive",
            archive.to_str().unwrap(),
            "-o",
            "shared=maybe",
        ])
        .current_dir(tmp.path())
        .assert()
        .failure();

    assert!(!tmp.path().join("src").exists());
}

// ============================================================================
// rmlui-recipe generate
// ============================================================================

#[test]
fn test_generate_writes_toolchain() {
    let tmp = temp_dir();

    recipe(tmp.path())
        .args([
            "generate",
            "-s",
            "os=Linux",
            "-s",
            "build_type=Debug",
            "-o",
            "font_engine=none",
        ])
        .current_dir(tmp.path())
        .assert()
        .success();

    let toolchain = fs::read_to_string(
        tmp.path()
            .join("build/Debug/generators/recipe_toolchain.cmake"),
    )
    .unwrap();
    assert!(toolchain.contains("set(RMLUI_FONT_ENGINE \"none\" CACHE STRING \"\" FORCE)"));
    assert!(toolchain.contains("set(RMLUI_WARNINGS_AS_ERRORS OFF CACHE BOOL \"\" FORCE)"));
    assert!(toolchain.contains("set(CMAKE_BUILD_TYPE \"Debug\" CACHE STRING \"\" FORCE)"));
}

#[test]
fn test_generate_rejects_dependency_version() {
    let tmp = temp_dir();
    fs::write(
        tmp.path().join("deps.toml"),
        "[robin-hood-hashing]\nversion = \"3.9.0\"\n",
    )
    .unwrap();

    recipe(tmp.path())
        .args(["generate", "--deps", "deps.toml"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("robin-hood-hashing"));

    assert!(!tmp.path().join("build").exists());
}

// ============================================================================
// rmlui-recipe package
// ============================================================================

#[test]
fn test_package_rejects_options_not_used_by_generate() {
    let tmp = temp_dir();

    recipe(tmp.path())
        .args(["generate", "-s", "build_type=Release", "-o", "shared=True"])
        .current_dir(tmp.path())
        .assert()
        .success();
    fs::write(tmp.path().join("build/Release/CMakeCache.txt"), "").unwrap();

    recipe(tmp.path())
        .args(["package", "-s", "build_type=Release"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "option 'shared' is False, but the build tree was generated with True",
        ));

    assert!(!tmp.path().join("package/package-info.json").exists());
}

// ============================================================================
// rmlui-recipe build / info / completions
// ============================================================================

#[test]
fn test_build_without_sources() {
    let tmp = temp_dir();

    recipe(tmp.path())
        .args(["build"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("rmlui-recipe source"));
}

#[test]
fn test_info_json() {
    let tmp = temp_dir();

    let output = recipe(tmp.path())
        .args(["info", "--json", "-s", "os=Linux"])
        .current_dir(tmp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["recipe"]["name"], "rmlui");
    assert_eq!(value["recipe"]["version"], "6.1");
    assert_eq!(value["settings"]["os"], "Linux");
    assert!(value["package"].is_null());
    assert_eq!(value["requirements"].as_array().unwrap().len(), 3);
}

#[test]
fn test_completions() {
    let tmp = temp_dir();

    recipe(tmp.path())
        .args(["completions", "bash"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("rmlui-recipe"));
}
