//! CMake driver for the upstream build.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::core::errors::RecipeError;
use crate::core::layout::Layout;
use crate::core::settings::BuildType;
use crate::util::diagnostic::suggestions;
use crate::util::fs::ensure_dir;
use crate::util::process::{find_cmake, ProcessBuilder};

/// Configure-time messages that mean a header-only dependency was not found.
const MISSING_HEADER_MARKERS: &[(&str, &str)] = &[
    ("robin_hood.h not found", "robin_hood.h"),
    ("itlib headers not found", "itlib headers"),
];

/// CMake build adapter.
#[derive(Debug, Clone)]
pub struct CMakeBuilder {
    cmake: PathBuf,
    source_dir: PathBuf,
    build_dir: PathBuf,
    toolchain_file: PathBuf,
    build_type: BuildType,
    generator: Option<String>,
    jobs: Option<usize>,
}

impl CMakeBuilder {
    /// Create a builder for a layout, locating CMake on the way.
    pub fn new(layout: &Layout) -> Result<Self> {
        let Some(cmake) = find_cmake() else {
            bail!(
                "CMake not found\n\
                 \n\
                 CMake is required to build RmlUi.\n\
                 Install CMake and ensure it's in your PATH, or point the CMAKE \
                 environment variable at it."
            );
        };
        Ok(Self::with_program(cmake, layout))
    }

    /// Create a builder using an explicit CMake executable.
    pub fn with_program(cmake: impl Into<PathBuf>, layout: &Layout) -> Self {
        CMakeBuilder {
            cmake: cmake.into(),
            source_dir: layout.source_folder(),
            build_dir: layout.build_folder(),
            toolchain_file: layout.toolchain_file(),
            build_type: layout.build_type(),
            generator: None,
            jobs: None,
        }
    }

    /// CMake generator, e.g. `Ninja`.
    pub fn generator(mut self, generator: Option<String>) -> Self {
        self.generator = generator;
        self
    }

    /// Parallel jobs for `cmake --build`.
    pub fn jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    fn command(&self) -> ProcessBuilder {
        ProcessBuilder::new(&self.cmake)
    }

    pub(crate) fn configure_command(&self) -> ProcessBuilder {
        let mut cmd = self
            .command()
            .arg("-S")
            .arg(&self.source_dir)
            .arg("-B")
            .arg(&self.build_dir);

        if let Some(generator) = &self.generator {
            cmd = cmd.arg("-G").arg(generator);
        }

        cmd.arg(format!(
            "-DCMAKE_TOOLCHAIN_FILE={}",
            self.toolchain_file.display()
        ))
        .cwd(&self.source_dir)
    }

    pub(crate) fn build_command(&self) -> ProcessBuilder {
        let mut cmd = self
            .command()
            .arg("--build")
            .arg(&self.build_dir)
            .arg("--config")
            .arg(self.build_type.as_str())
            .arg("--parallel");

        if let Some(jobs) = self.jobs {
            cmd = cmd.arg(jobs.to_string());
        }

        cmd
    }

    pub(crate) fn install_command(&self, prefix: &Path) -> ProcessBuilder {
        self.command()
            .arg("--install")
            .arg(&self.build_dir)
            .arg("--config")
            .arg(self.build_type.as_str())
            .arg("--prefix")
            .arg(prefix)
    }

    /// Run CMake configuration.
    pub fn configure(&self) -> Result<()> {
        tracing::info!("Configuring CMake project");

        if !self.toolchain_file.exists() {
            bail!(
                "toolchain file not found: {}\nRun `rmlui-recipe generate` first",
                self.toolchain_file.display()
            );
        }
        ensure_dir(&self.build_dir)?;

        let output = self.configure_command().exec()?;
        log_output(&output.stdout);

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if let Some(err) = classify_configure_failure(&stderr) {
                return Err(err.into());
            }
            bail!("CMake configuration failed:\n{}", stderr);
        }

        Ok(())
    }

    /// Run CMake build.
    pub fn build(&self) -> Result<()> {
        tracing::info!("Building CMake project ({})", self.build_type);

        let output = self.build_command().exec()?;
        log_output(&output.stdout);

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            bail!(
                "CMake build failed:\n{}{}\n{}",
                stdout,
                stderr,
                suggestions::BUILD_FAILED
            );
        }

        Ok(())
    }

    /// Install the build tree into `prefix`.
    pub fn install(&self, prefix: &Path) -> Result<()> {
        tracing::info!("Installing to {}", prefix.display());

        let output = self
            .install_command(prefix)
            .exec_and_check()
            .context("CMake install failed")?;
        log_output(&output.stdout);

        Ok(())
    }
}

fn log_output(stdout: &[u8]) {
    for line in String::from_utf8_lossy(stdout).lines() {
        tracing::debug!("cmake: {}", line);
    }
}

/// Map a configure error that names missing container headers.
fn classify_configure_failure(stderr: &str) -> Option<RecipeError> {
    MISSING_HEADER_MARKERS
        .iter()
        .find(|(marker, _)| stderr.contains(marker))
        .map(|(_, header)| RecipeError::NativeConfigure {
            header: header.to_string(),
            message: stderr
                .lines()
                .find(|line| line.contains("RmlUi:"))
                .unwrap_or("")
                .trim()
                .to_string(),
        })
}
