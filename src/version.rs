//! Schema versioning utilities
//!
//! Schema versions are written `slug@vMAJOR.MINOR.PATCH` (e.g. `article@v1.2.0`)
//! so that a version identifier names the schema it belongs to. A version
//! without a slug renders as the bare `vMAJOR.MINOR.PATCH`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};

static SEMVER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^v?(\d+)\.(\d+)\.(\d+)$").expect("semver pattern compiles"));

/// Severity of a schema change, doubling as a bump instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeLevel {
    /// Nothing changed
    #[default]
    None,
    /// Cosmetic change (titles, descriptions, defaults)
    Patch,
    /// Backward compatible addition or loosening
    Minor,
    /// Breaking change
    Major,
}

impl ChangeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeLevel::None => "none",
            ChangeLevel::Patch => "patch",
            ChangeLevel::Minor => "minor",
            ChangeLevel::Major => "major",
        }
    }
}

impl fmt::Display for ChangeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeLevel {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(ChangeLevel::None),
            "patch" => Ok(ChangeLevel::Patch),
            "minor" => Ok(ChangeLevel::Minor),
            "major" => Ok(ChangeLevel::Major),
            other => Err(SchemaError::InvalidFormat(format!("unknown change level '{}'", other))),
        }
    }
}

/// A schema version bound to the slug of the schema it describes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SchemaVersion {
    /// Owning schema slug (e.g. "article"); empty for a bare version
    pub slug: String,
    /// Semantic version triple
    pub version: Version,
}

impl SchemaVersion {
    /// Create a new schema version
    pub fn new(slug: impl Into<String>, major: u64, minor: u64, patch: u64) -> Self {
        Self {
            slug: slug.into(),
            version: Version::new(major, minor, patch),
        }
    }

    /// The initial version every schema starts at (`slug@v1.0.0`)
    pub fn initial(slug: impl Into<String>) -> Self {
        Self::new(slug, 1, 0, 0)
    }

    /// Parse a `slug@vX.Y.Z` identifier.
    ///
    /// Both halves must be present; the leading `v` of the semver half is optional.
    pub fn parse(value: &str) -> Result<Self> {
        let (slug, semver) = value
            .split_once('@')
            .ok_or_else(|| SchemaError::InvalidSchemaVersion(format!("'{}' is missing '@'", value)))?;
        let slug = slug.trim();
        let semver = semver.trim();
        if slug.is_empty() || semver.is_empty() {
            return Err(SchemaError::InvalidSchemaVersion(format!(
                "'{}' must have the form slug@vX.Y.Z",
                value
            )));
        }
        let version = parse_semver(semver)?;
        Ok(Self {
            slug: slug.to_string(),
            version,
        })
    }

    /// Parse a bare `vX.Y.Z` (or `X.Y.Z`) version without a slug
    pub fn parse_bare(value: &str) -> Result<Self> {
        Ok(Self {
            slug: String::new(),
            version: parse_semver(value.trim())?,
        })
    }

    /// Return a copy bound to another slug
    pub fn with_slug(&self, slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            version: self.version.clone(),
        }
    }

    pub fn major(&self) -> u64 {
        self.version.major
    }

    pub fn minor(&self) -> u64 {
        self.version.minor
    }

    pub fn patch(&self) -> u64 {
        self.version.patch
    }

    /// Get the semver half with its `v` prefix (e.g., "v1.2.3")
    pub fn tag_string(&self) -> String {
        format!("v{}.{}.{}", self.version.major, self.version.minor, self.version.patch)
    }

    /// Bump according to a change level; `None` leaves the version as is.
    ///
    /// Fails when the bumped component would overflow.
    pub fn bump(&self, level: ChangeLevel) -> Result<Self> {
        let v = &self.version;
        let next = |component: u64| {
            component.checked_add(1).ok_or_else(|| {
                SchemaError::InvalidSchemaVersion(format!("cannot apply a {} bump to {}", level, self))
            })
        };
        let version = match level {
            ChangeLevel::Major => Version::new(next(v.major)?, 0, 0),
            ChangeLevel::Minor => Version::new(v.major, next(v.minor)?, 0),
            ChangeLevel::Patch => Version::new(v.major, v.minor, next(v.patch)?),
            ChangeLevel::None => Version::new(v.major, v.minor, v.patch),
        };
        Ok(Self {
            slug: self.slug.clone(),
            version,
        })
    }

    /// Bump major version
    pub fn bump_major(&self) -> Result<Self> {
        self.bump(ChangeLevel::Major)
    }

    /// Bump minor version
    pub fn bump_minor(&self) -> Result<Self> {
        self.bump(ChangeLevel::Minor)
    }

    /// Bump patch version
    pub fn bump_patch(&self) -> Result<Self> {
        self.bump(ChangeLevel::Patch)
    }

    /// Check if this is a major version bump from another version
    pub fn is_major_bump_from(&self, other: &SchemaVersion) -> bool {
        self.version.major > other.version.major
    }

    /// Check if this is a minor version bump from another version
    pub fn is_minor_bump_from(&self, other: &SchemaVersion) -> bool {
        self.version.major == other.version.major && self.version.minor > other.version.minor
    }

    /// Check if this is a patch version bump from another version
    pub fn is_patch_bump_from(&self, other: &SchemaVersion) -> bool {
        self.version.major == other.version.major
            && self.version.minor == other.version.minor
            && self.version.patch > other.version.patch
    }
}

/// Parse a version identifier and bump it.
///
/// Accepts both `slug@vX.Y.Z` and bare `vX.Y.Z`; anything without a valid
/// semver triple is rejected.
pub fn bump_version(value: &str, level: ChangeLevel) -> Result<SchemaVersion> {
    let base = if value.contains('@') {
        SchemaVersion::parse(value)?
    } else {
        SchemaVersion::parse_bare(value)?
    };
    base.bump(level)
}

fn parse_semver(value: &str) -> Result<Version> {
    let caps = SEMVER_PATTERN
        .captures(value)
        .ok_or_else(|| SchemaError::InvalidSchemaVersion(format!("'{}' is not a vX.Y.Z version", value)))?;
    let part = |i: usize| -> Result<u64> {
        caps[i]
            .parse::<u64>()
            .map_err(|_| SchemaError::InvalidSchemaVersion(format!("'{}' has an out of range component", value)))
    };
    Ok(Version::new(part(1)?, part(2)?, part(3)?))
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.slug.is_empty() {
            write!(f, "{}", self.tag_string())
        } else {
            write!(f, "{}@{}", self.slug, self.tag_string())
        }
    }
}

impl FromStr for SchemaVersion {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SchemaVersion {
    type Error = SchemaError;

    fn try_from(value: String) -> Result<Self> {
        if value.contains('@') {
            Self::parse(&value)
        } else {
            Self::parse_bare(&value)
        }
    }
}

impl From<SchemaVersion> for String {
    fn from(value: SchemaVersion) -> Self {
        value.to_string()
    }
}

impl PartialOrd for SchemaVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SchemaVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.version
            .cmp(&other.version)
            .then_with(|| self.slug.cmp(&other.slug))
    }
}
