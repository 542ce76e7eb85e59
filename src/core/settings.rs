//! Target settings: operating system, architecture, build type and compiler.
//!
//! Settings describe *where* the package is built for. They are not options:
//! the recipe reads them but never declares them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::errors::RecipeError;
use crate::core::language::CppStd;

/// Target operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Os {
    Linux,
    Windows,
    Macos,
    FreeBSD,
    Android,
    #[serde(rename = "iOS")]
    Ios,
}

impl Os {
    /// The operating system this binary was compiled for.
    pub fn host() -> Self {
        match std::env::consts::OS {
            "windows" => Os::Windows,
            "macos" => Os::Macos,
            "freebsd" => Os::FreeBSD,
            "android" => Os::Android,
            "ios" => Os::Ios,
            _ => Os::Linux,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Os::Linux => "Linux",
            Os::Windows => "Windows",
            Os::Macos => "Macos",
            Os::FreeBSD => "FreeBSD",
            Os::Android => "Android",
            Os::Ios => "iOS",
        }
    }

    /// Whether the native toolchain exposes a position-independent-code switch.
    pub fn supports_fpic(&self) -> bool {
        !matches!(self, Os::Windows)
    }
}

impl FromStr for Os {
    type Err = RecipeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linux" => Ok(Os::Linux),
            "windows" => Ok(Os::Windows),
            "macos" | "darwin" => Ok(Os::Macos),
            "freebsd" => Ok(Os::FreeBSD),
            "android" => Ok(Os::Android),
            "ios" => Ok(Os::Ios),
            _ => Err(RecipeError::InvalidSetting {
                setting: "os".to_string(),
                message: format!(
                    "unknown operating system '{}' (expected Linux, Windows, Macos, FreeBSD, Android or iOS)",
                    s
                ),
            }),
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CMake build type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BuildType {
    Debug,
    #[default]
    Release,
    RelWithDebInfo,
    MinSizeRel,
}

impl BuildType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildType::Debug => "Debug",
            BuildType::Release => "Release",
            BuildType::RelWithDebInfo => "RelWithDebInfo",
            BuildType::MinSizeRel => "MinSizeRel",
        }
    }
}

impl FromStr for BuildType {
    type Err = RecipeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(BuildType::Debug),
            "release" => Ok(BuildType::Release),
            "relwithdebinfo" => Ok(BuildType::RelWithDebInfo),
            "minsizerel" => Ok(BuildType::MinSizeRel),
            _ => Err(RecipeError::InvalidSetting {
                setting: "build_type".to_string(),
                message: format!(
                    "unknown build type '{}' (expected Debug, Release, RelWithDebInfo or MinSizeRel)",
                    s
                ),
            }),
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The settings a recipe is configured against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub os: Os,
    pub arch: String,
    pub build_type: BuildType,
    /// Compiler name (e.g., "gcc", "msvc"), if known
    pub compiler: Option<String>,
    /// `compiler.cppstd`, if the consumer pins one
    pub cppstd: Option<CppStd>,
}

impl Settings {
    /// Settings for the host machine with a Release build and no pinned standard.
    pub fn detect() -> Self {
        Settings {
            os: Os::host(),
            arch: std::env::consts::ARCH.to_string(),
            build_type: BuildType::default(),
            compiler: None,
            cppstd: None,
        }
    }

    /// Settings for a given OS, otherwise detected from the host.
    pub fn for_os(os: Os) -> Self {
        Settings {
            os,
            ..Settings::detect()
        }
    }

    /// Set a single setting by name.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), RecipeError> {
        match key {
            "os" => self.os = value.parse()?,
            "arch" => self.arch = value.to_string(),
            "build_type" => self.build_type = value.parse()?,
            "compiler" => self.compiler = Some(value.to_string()),
            "compiler.cppstd" => {
                let cppstd = value
                    .parse::<CppStd>()
                    .map_err(|e| RecipeError::InvalidSetting {
                        setting: key.to_string(),
                        message: e.to_string(),
                    })?;
                self.cppstd = Some(cppstd);
            }
            _ => {
                return Err(RecipeError::InvalidSetting {
                    setting: key.to_string(),
                    message: "unknown setting (expected os, arch, build_type, compiler or compiler.cppstd)"
                        .to_string(),
                })
            }
        }
        Ok(())
    }

    /// Apply `name=value` assignments in order.
    pub fn apply_assignments<'a>(
        &mut self,
        assignments: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), RecipeError> {
        for assignment in assignments {
            let (key, value) = split_assignment(assignment, "setting")?;
            self.set(key, value)?;
        }
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings::detect()
    }
}

/// Split a `name=value` pair, trimming whitespace around both halves.
pub(crate) fn split_assignment<'a>(
    assignment: &'a str,
    what: &str,
) -> Result<(&'a str, &'a str), RecipeError> {
    match assignment.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value.trim())),
        _ => Err(RecipeError::InvalidSetting {
            setting: assignment.to_string(),
            message: format!("expected {}=value", what),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::language::CppStandard;

    #[test]
    fn test_parse_os() {
        assert_eq!("Windows".parse::<Os>().unwrap(), Os::Windows);
        assert_eq!("darwin".parse::<Os>().unwrap(), Os::Macos);
        assert!("Plan9".parse::<Os>().is_err());
        assert!(!Os::Windows.supports_fpic());
        assert!(Os::Linux.supports_fpic());
    }

    #[test]
    fn test_settings_assignments() {
        let mut settings = Settings::for_os(Os::Linux);
        settings
            .apply_assignments(["os=Windows", "build_type=Debug", "compiler.cppstd=gnu17"])
            .unwrap();

        assert_eq!(settings.os, Os::Windows);
        assert_eq!(settings.build_type, BuildType::Debug);
        assert_eq!(settings.cppstd, Some(CppStd::gnu(CppStandard::Cpp17)));
    }

    #[test]
    fn test_settings_rejects_unknown() {
        let mut settings = Settings::detect();
        assert!(settings.set("compiler.libcxx", "libstdc++11").is_err());
        assert!(settings.apply_assignments(["os"]).is_err());
        assert!(settings.set("compiler.cppstd", "fortran").is_err());
    }
}
