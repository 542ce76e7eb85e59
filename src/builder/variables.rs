//! CMake cache variables derived from recipe options.

use std::collections::BTreeMap;
use std::fmt;

use crate::core::options::RecipeOptions;
use crate::util::config::ConfigValue;

pub const RMLUI_SAMPLES: &str = "RMLUI_SAMPLES";
pub const RMLUI_LUA_BINDINGS: &str = "RMLUI_LUA_BINDINGS";
pub const RMLUI_FONT_ENGINE: &str = "RMLUI_FONT_ENGINE";
pub const RMLUI_MATRIX_ROW_MAJOR: &str = "RMLUI_MATRIX_ROW_MAJOR";
pub const RMLUI_THIRDPARTY_CONTAINERS: &str = "RMLUI_THIRDPARTY_CONTAINERS";
pub const RMLUI_PRECOMPILED_HEADERS: &str = "RMLUI_PRECOMPILED_HEADERS";
pub const RMLUI_TRACY_PROFILING: &str = "RMLUI_TRACY_PROFILING";
pub const RMLUI_WARNINGS_AS_ERRORS: &str = "RMLUI_WARNINGS_AS_ERRORS";

/// Variables the recipe always sets, whatever the options or extra variables say.
const FORCED: &[(&str, CacheValue)] = &[(RMLUI_WARNINGS_AS_ERRORS, CacheValue::Bool(false))];

/// A typed CMake cache value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheValue {
    Bool(bool),
    String(String),
}

impl CacheValue {
    /// CMake cache type name.
    pub fn cmake_type(&self) -> &'static str {
        match self {
            CacheValue::Bool(_) => "BOOL",
            CacheValue::String(_) => "STRING",
        }
    }
}

impl fmt::Display for CacheValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheValue::Bool(true) => write!(f, "ON"),
            CacheValue::Bool(false) => write!(f, "OFF"),
            CacheValue::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<&ConfigValue> for CacheValue {
    fn from(value: &ConfigValue) -> Self {
        match value {
            ConfigValue::Bool(b) => CacheValue::Bool(*b),
            ConfigValue::Str(s) => CacheValue::String(s.clone()),
        }
    }
}

/// Native build variables for one configuration, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildVariables {
    vars: BTreeMap<String, CacheValue>,
}

impl BuildVariables {
    /// Map the typed options onto RmlUi's CMake variables.
    ///
    /// `shared` and `fPIC` are toolchain-level and handled by the toolchain
    /// file, not here.
    pub fn from_options(options: &RecipeOptions) -> Self {
        let mut vars = BTreeMap::new();

        vars.insert(RMLUI_SAMPLES.to_string(), CacheValue::Bool(options.build_samples));
        vars.insert(
            RMLUI_LUA_BINDINGS.to_string(),
            CacheValue::Bool(options.with_lua_bindings),
        );
        vars.insert(
            RMLUI_FONT_ENGINE.to_string(),
            CacheValue::String(options.font_engine.as_str().to_string()),
        );
        vars.insert(
            RMLUI_MATRIX_ROW_MAJOR.to_string(),
            CacheValue::Bool(options.matrix_row_major),
        );
        vars.insert(
            RMLUI_THIRDPARTY_CONTAINERS.to_string(),
            CacheValue::Bool(options.with_thirdparty_containers),
        );
        vars.insert(
            RMLUI_PRECOMPILED_HEADERS.to_string(),
            CacheValue::Bool(options.enable_precompiled_headers),
        );
        vars.insert(
            RMLUI_TRACY_PROFILING.to_string(),
            CacheValue::Bool(options.enable_tracy_profiling),
        );

        let mut variables = BuildVariables { vars };
        variables.apply_forced();
        variables
    }

    /// Merge caller-supplied variables. Forced variables keep their value.
    pub fn merge(&mut self, extra: impl IntoIterator<Item = (String, CacheValue)>) {
        for (name, value) in extra {
            if FORCED.iter().any(|(forced, _)| *forced == name) {
                tracing::warn!("ignoring {}={}: the recipe always sets it", name, value);
                continue;
            }
            self.vars.insert(name, value);
        }
        self.apply_forced();
    }

    fn apply_forced(&mut self) {
        for (name, value) in FORCED {
            self.vars.insert(name.to_string(), value.clone());
        }
    }

    pub fn get(&self, name: &str) -> Option<&CacheValue> {
        self.vars.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CacheValue)> {
        self.vars.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Render as `-DNAME:TYPE=VALUE` command-line definitions.
    pub fn to_cmake_args(&self) -> Vec<String> {
        self.iter()
            .map(|(name, value)| format!("-D{}:{}={}", name, value.cmake_type(), value))
            .collect()
    }
}
