//! C++ language standards.
//!
//! The `compiler.cppstd` setting uses the usual package-manager spelling:
//! a bare year (`17`) or a `gnu`-prefixed year (`gnu17`) when GNU extensions
//! are wanted.

use serde::{Deserialize, Serialize};

/// C++ standard version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CppStandard {
    /// C++98
    #[serde(rename = "98", alias = "c++98", alias = "cpp98")]
    Cpp98,
    /// C++11
    #[serde(rename = "11", alias = "c++11", alias = "cpp11")]
    Cpp11,
    /// C++14
    #[serde(rename = "14", alias = "c++14", alias = "cpp14")]
    Cpp14,
    /// C++17
    #[serde(rename = "17", alias = "c++17", alias = "cpp17")]
    Cpp17,
    /// C++20
    #[serde(rename = "20", alias = "c++20", alias = "cpp20")]
    Cpp20,
    /// C++23
    #[serde(rename = "23", alias = "c++23", alias = "cpp23")]
    Cpp23,
}

impl CppStandard {
    /// Year suffix used by `CMAKE_CXX_STANDARD` (e.g., "17").
    pub fn as_cmake_value(&self) -> &'static str {
        match self {
            CppStandard::Cpp98 => "98",
            CppStandard::Cpp11 => "11",
            CppStandard::Cpp14 => "14",
            CppStandard::Cpp17 => "17",
            CppStandard::Cpp20 => "20",
            CppStandard::Cpp23 => "23",
        }
    }
}

impl std::str::FromStr for CppStandard {
    type Err = CppStandardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "98" | "c++98" | "cpp98" => Ok(CppStandard::Cpp98),
            "11" | "c++11" | "cpp11" => Ok(CppStandard::Cpp11),
            "14" | "c++14" | "cpp14" => Ok(CppStandard::Cpp14),
            "17" | "c++17" | "cpp17" => Ok(CppStandard::Cpp17),
            "20" | "c++20" | "cpp20" => Ok(CppStandard::Cpp20),
            "23" | "c++23" | "cpp23" => Ok(CppStandard::Cpp23),
            _ => Err(CppStandardParseError(s.to_string())),
        }
    }
}

impl std::fmt::Display for CppStandard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "C++{}", self.as_cmake_value())
    }
}

/// Error returned when parsing an invalid C++ standard string.
#[derive(Debug, Clone)]
pub struct CppStandardParseError(pub String);

impl std::fmt::Display for CppStandardParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid C++ standard '{}', valid values: 98, 11, 14, 17, 20, 23 (optionally prefixed with gnu)",
            self.0
        )
    }
}

impl std::error::Error for CppStandardParseError {}

/// The `compiler.cppstd` setting: a standard plus the GNU extensions flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CppStd {
    pub standard: CppStandard,
    pub gnu_extensions: bool,
}

impl CppStd {
    pub fn new(standard: CppStandard) -> Self {
        CppStd {
            standard,
            gnu_extensions: false,
        }
    }

    pub fn gnu(standard: CppStandard) -> Self {
        CppStd {
            standard,
            gnu_extensions: true,
        }
    }

    /// Check that this standard is at least `min`.
    pub fn satisfies(&self, min: CppStandard) -> bool {
        self.standard >= min
    }
}

impl std::str::FromStr for CppStd {
    type Err = CppStandardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.strip_prefix("gnu") {
            Some(rest) => rest
                .parse()
                .map(CppStd::gnu)
                .map_err(|_| CppStandardParseError(s.to_string())),
            None => trimmed.parse().map(CppStd::new),
        }
    }
}

impl std::fmt::Display for CppStd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.gnu_extensions {
            write!(f, "gnu{}", self.standard.as_cmake_value())
        } else {
            write!(f, "{}", self.standard.as_cmake_value())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cppstd() {
        let std: CppStd = "17".parse().unwrap();
        assert_eq!(std, CppStd::new(CppStandard::Cpp17));

        let std: CppStd = "gnu14".parse().unwrap();
        assert_eq!(std, CppStd::gnu(CppStandard::Cpp14));
        assert_eq!(std.to_string(), "gnu14");

        assert!("gnu".parse::<CppStd>().is_err());
        assert!("15".parse::<CppStd>().is_err());
    }

    #[test]
    fn test_ordering() {
        assert!(CppStandard::Cpp98 < CppStandard::Cpp11);
        assert!(CppStd::new(CppStandard::Cpp20).satisfies(CppStandard::Cpp14));
        assert!(!CppStd::gnu(CppStandard::Cpp11).satisfies(CppStandard::Cpp14));
    }
}
