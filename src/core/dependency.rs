//! Dependency requirements.
//!
//! The packages RmlUi needs at build time are a pure function of the
//! recipe options. Requirements are rendered in reference form:
//! `name/1.2.3` for an exact pin, `name/[>=1.2 <2]` for a range.

use std::fmt;

use semver::{Comparator, Op, Prerelease, Version, VersionReq};
use serde::{Serialize, Serializer};

use crate::core::options::{FontEngine, RecipeOptions};

/// Version constraint of a requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSpec {
    /// Exactly this version
    Exact(Version),
    /// Any version matching the range
    Range(VersionReq),
}

impl VersionSpec {
    /// `>= lower` and `< below_major`.
    pub fn major_range(lower: Version, below_major: u64) -> Self {
        VersionSpec::Range(VersionReq {
            comparators: vec![
                Comparator {
                    op: Op::GreaterEq,
                    major: lower.major,
                    minor: Some(lower.minor),
                    patch: Some(lower.patch),
                    pre: Prerelease::EMPTY,
                },
                Comparator {
                    op: Op::Less,
                    major: below_major,
                    minor: None,
                    patch: None,
                    pre: Prerelease::EMPTY,
                },
            ],
        })
    }

    /// Check whether a concrete version satisfies this constraint.
    pub fn matches(&self, version: &Version) -> bool {
        match self {
            VersionSpec::Exact(v) => v == version,
            VersionSpec::Range(req) => req.matches(version),
        }
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionSpec::Exact(v) => write!(f, "{}", v),
            VersionSpec::Range(req) => {
                let parts: Vec<String> = req.comparators.iter().map(|c| c.to_string()).collect();
                write!(f, "[{}]", parts.join(" "))
            }
        }
    }
}

/// A declared need for another package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub name: String,
    pub version: VersionSpec,
}

impl Requirement {
    pub fn exact(name: impl Into<String>, version: Version) -> Self {
        Requirement {
            name: name.into(),
            version: VersionSpec::Exact(version),
        }
    }

    pub fn range(name: impl Into<String>, version: VersionSpec) -> Self {
        Requirement {
            name: name.into(),
            version,
        }
    }

    /// Reference form, e.g. `itlib/1.11.4`.
    pub fn reference(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)
    }
}

impl Serialize for Requirement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.reference())
    }
}

pub const FREETYPE: &str = "freetype";
pub const ROBIN_HOOD_HASHING: &str = "robin-hood-hashing";
pub const ITLIB: &str = "itlib";
pub const LUA: &str = "lua";

/// Requirements for a set of options, in declaration order, without duplicates.
pub fn requirements(options: &RecipeOptions) -> Vec<Requirement> {
    let mut reqs = Vec::new();

    if options.font_engine == FontEngine::Freetype {
        push_unique(
            &mut reqs,
            Requirement::range(
                FREETYPE,
                VersionSpec::major_range(Version::new(2, 10, 4), 3),
            ),
        );
    }

    // Header-only containers used instead of the bundled copies
    if options.with_thirdparty_containers {
        push_unique(
            &mut reqs,
            Requirement::exact(ROBIN_HOOD_HASHING, Version::new(3, 11, 3)),
        );
        push_unique(&mut reqs, Requirement::exact(ITLIB, Version::new(1, 11, 4)));
    }

    if options.with_lua_bindings {
        push_unique(&mut reqs, Requirement::exact(LUA, Version::new(5, 4, 7)));
    }

    reqs
}

fn push_unique(reqs: &mut Vec<Requirement>, req: Requirement) {
    if reqs.iter().any(|r| r.name == req.name) {
        tracing::debug!("requirement `{}` already declared", req.name);
        return;
    }
    reqs.push(req);
}
