//! Recipe options.
//!
//! Options are the build-time toggles a consumer may set on the package.
//! Each option has a closed domain and a default; the effective set depends
//! on the target settings (`fPIC` does not exist on Windows).

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::errors::RecipeError;
use crate::core::settings::{Os, Settings};

/// Domain of values an option accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionDomain {
    Bool,
    Choice(&'static [&'static str]),
}

impl OptionDomain {
    /// Parse a raw value against this domain.
    pub fn parse(&self, raw: &str) -> Option<OptionValue> {
        match self {
            OptionDomain::Bool => parse_bool(raw).map(OptionValue::Bool),
            OptionDomain::Choice(choices) => choices
                .iter()
                .find(|c| **c == raw)
                .map(|c| OptionValue::Str((*c).to_string())),
        }
    }

    fn describe(&self) -> String {
        match self {
            OptionDomain::Bool => "True, False".to_string(),
            OptionDomain::Choice(choices) => choices.join(", "),
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "True" | "true" => Some(true),
        "False" | "false" => Some(false),
        _ => None,
    }
}

/// A concrete option value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OptionValue {
    Bool(bool),
    Str(String),
}

impl OptionValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            OptionValue::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Str(s) => Some(s),
            OptionValue::Bool(_) => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(true) => f.write_str("True"),
            OptionValue::Bool(false) => f.write_str("False"),
            OptionValue::Str(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DefaultValue {
    Bool(bool),
    Str(&'static str),
}

/// Declaration of one option: name, domain and default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionDecl {
    pub name: &'static str,
    pub domain: OptionDomain,
    default: DefaultValue,
}

impl OptionDecl {
    const fn boolean(name: &'static str, default: bool) -> Self {
        OptionDecl {
            name,
            domain: OptionDomain::Bool,
            default: DefaultValue::Bool(default),
        }
    }

    const fn choice(
        name: &'static str,
        choices: &'static [&'static str],
        default: &'static str,
    ) -> Self {
        OptionDecl {
            name,
            domain: OptionDomain::Choice(choices),
            default: DefaultValue::Str(default),
        }
    }

    pub fn default_value(&self) -> OptionValue {
        match self.default {
            DefaultValue::Bool(b) => OptionValue::Bool(b),
            DefaultValue::Str(s) => OptionValue::Str(s.to_string()),
        }
    }
}

pub const SHARED: &str = "shared";
pub const FPIC: &str = "fPIC";
pub const BUILD_SAMPLES: &str = "build_samples";
pub const WITH_LUA_BINDINGS: &str = "with_lua_bindings";
pub const FONT_ENGINE: &str = "font_engine";
pub const MATRIX_ROW_MAJOR: &str = "matrix_row_major";
pub const WITH_THIRDPARTY_CONTAINERS: &str = "with_thirdparty_containers";
pub const ENABLE_PRECOMPILED_HEADERS: &str = "enable_precompiled_headers";
pub const ENABLE_TRACY_PROFILING: &str = "enable_tracy_profiling";

/// Every option the recipe declares, in declaration order.
pub const DECLARED_OPTIONS: &[OptionDecl] = &[
    OptionDecl::boolean(SHARED, false),
    OptionDecl::boolean(FPIC, true),
    OptionDecl::boolean(BUILD_SAMPLES, false),
    OptionDecl::boolean(WITH_LUA_BINDINGS, false),
    OptionDecl::choice(FONT_ENGINE, FontEngine::NAMES, "freetype"),
    OptionDecl::boolean(MATRIX_ROW_MAJOR, false),
    OptionDecl::boolean(WITH_THIRDPARTY_CONTAINERS, true),
    OptionDecl::boolean(ENABLE_PRECOMPILED_HEADERS, true),
    OptionDecl::boolean(ENABLE_TRACY_PROFILING, false),
];

/// Font rendering backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontEngine {
    #[default]
    Freetype,
    #[serde(rename = "none")]
    Disabled,
}

impl FontEngine {
    pub const NAMES: &'static [&'static str] = &["freetype", "none"];

    pub fn as_str(&self) -> &'static str {
        match self {
            FontEngine::Freetype => "freetype",
            FontEngine::Disabled => "none",
        }
    }
}

impl FromStr for FontEngine {
    type Err = RecipeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "freetype" => Ok(FontEngine::Freetype),
            "none" => Ok(FontEngine::Disabled),
            _ => Err(RecipeError::InvalidOption {
                option: FONT_ENGINE.to_string(),
                value: s.to_string(),
                allowed: FontEngine::NAMES.join(", "),
            }),
        }
    }
}

impl fmt::Display for FontEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The effective options for one configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSet {
    os: Os,
    entries: Vec<(&'static OptionDecl, OptionValue)>,
}

impl OptionSet {
    /// The declared options with their defaults, pruned for the target OS.
    pub fn for_settings(settings: &Settings) -> Self {
        Self::for_os(settings.os)
    }

    pub fn for_os(os: Os) -> Self {
        let entries = DECLARED_OPTIONS
            .iter()
            .filter(|decl| decl.name != FPIC || os.supports_fpic())
            .map(|decl| (decl, decl.default_value()))
            .collect();

        OptionSet { os, entries }
    }

    /// Whether an option exists in this configuration.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(decl, _)| decl.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.entries
            .iter()
            .find(|(decl, _)| decl.name == name)
            .map(|(_, value)| value)
    }

    /// Iterate over `(name, value)` in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &OptionValue)> {
        self.entries.iter().map(|(decl, value)| (decl.name, value))
    }

    /// Set an option from its textual form.
    pub fn set(&mut self, name: &str, raw: &str) -> Result<(), RecipeError> {
        let os = self.os;
        let (decl, slot) = self.slot_mut(name, os)?;
        *slot = decl.domain.parse(raw).ok_or_else(|| RecipeError::InvalidOption {
            option: name.to_string(),
            value: raw.to_string(),
            allowed: decl.domain.describe(),
        })?;
        Ok(())
    }

    /// Apply `name=value` assignments in order.
    pub fn apply_assignments<'a>(
        &mut self,
        assignments: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), RecipeError> {
        for assignment in assignments {
            let (name, value) = match assignment.split_once('=') {
                Some((name, value)) if !name.trim().is_empty() => (name.trim(), value.trim()),
                _ => {
                    return Err(RecipeError::InvalidOption {
                        option: assignment.to_string(),
                        value: String::new(),
                        allowed: "name=value".to_string(),
                    })
                }
            };
            self.set(name, value)?;
        }
        Ok(())
    }

    fn slot_mut(
        &mut self,
        name: &str,
        os: Os,
    ) -> Result<(&'static OptionDecl, &mut OptionValue), RecipeError> {
        self.entries
            .iter_mut()
            .find(|(decl, _)| decl.name == name)
            .map(|(decl, value)| (*decl, value))
            .ok_or_else(|| RecipeError::UnknownOption {
                option: name.to_string(),
                os: os.to_string(),
            })
    }

    fn flag(&self, name: &str) -> bool {
        self.get(name).and_then(OptionValue::as_bool).unwrap_or(false)
    }

    /// Typed view of the effective options.
    pub fn to_recipe_options(&self) -> RecipeOptions {
        let font_engine = self
            .get(FONT_ENGINE)
            .and_then(OptionValue::as_str)
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();

        RecipeOptions {
            shared: self.flag(SHARED),
            fpic: self.get(FPIC).and_then(OptionValue::as_bool),
            build_samples: self.flag(BUILD_SAMPLES),
            with_lua_bindings: self.flag(WITH_LUA_BINDINGS),
            font_engine,
            matrix_row_major: self.flag(MATRIX_ROW_MAJOR),
            with_thirdparty_containers: self.flag(WITH_THIRDPARTY_CONTAINERS),
            enable_precompiled_headers: self.flag(ENABLE_PRECOMPILED_HEADERS),
            enable_tracy_profiling: self.flag(ENABLE_TRACY_PROFILING),
        }
    }

    /// Options rendered as strings, keyed by name.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }
}

impl fmt::Display for OptionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.iter() {
            writeln!(f, "{}={}", name, value)?;
        }
        Ok(())
    }
}

/// Strongly-typed options, derived from a validated [`OptionSet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeOptions {
    pub shared: bool,
    /// `None` when the target OS has no position-independent-code switch
    pub fpic: Option<bool>,
    pub build_samples: bool,
    pub with_lua_bindings: bool,
    pub font_engine: FontEngine,
    pub matrix_row_major: bool,
    pub with_thirdparty_containers: bool,
    pub enable_precompiled_headers: bool,
    pub enable_tracy_profiling: bool,
}

impl RecipeOptions {
    /// Default options for a target OS.
    pub fn defaults_for(os: Os) -> Self {
        OptionSet::for_os(os).to_recipe_options()
    }
}
