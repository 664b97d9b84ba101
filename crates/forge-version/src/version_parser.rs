//! Version text validation and stability detection

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

/// Stability of a published version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stability {
    /// Mutable pre-release build (`-SNAPSHOT`)
    Snapshot,
    /// Immutable release
    Release,
}

impl Stability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stability::Snapshot => "snapshot",
            Stability::Release => "release",
        }
    }
}

impl std::fmt::Display for Stability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error type for version and version-spec parsing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionParserError {
    #[error("Invalid version string \"{0}\"")]
    InvalidVersion(String),
    #[error("Invalid version range \"{range}\": {reason}")]
    InvalidRange { range: String, reason: String },
}

lazy_static! {
    static ref VERSION_TEXT_RE: Regex = Regex::new(r"^[^\s:]+$").unwrap();
    static ref SNAPSHOT_RE: Regex = Regex::new(r"(?i)-snapshot$").unwrap();
}

/// Version text helpers
pub struct VersionParser;

impl VersionParser {
    /// Create a new version parser
    pub fn new() -> Self {
        VersionParser
    }

    /// Check that a version string can appear inside a coordinate
    pub fn is_valid(&self, version: &str) -> bool {
        VERSION_TEXT_RE.is_match(version)
    }

    /// Validate a version string, returning it trimmed
    pub fn validate<'a>(&self, version: &'a str) -> Result<&'a str, VersionParserError> {
        let trimmed = version.trim();
        if self.is_valid(trimmed) {
            Ok(trimmed)
        } else {
            Err(VersionParserError::InvalidVersion(version.to_string()))
        }
    }

    /// Returns the stability of a version
    pub fn parse_stability(version: &str) -> Stability {
        if Self::is_snapshot(version) {
            Stability::Snapshot
        } else {
            Stability::Release
        }
    }

    /// True for `-SNAPSHOT` versions (case-insensitive)
    pub fn is_snapshot(version: &str) -> bool {
        SNAPSHOT_RE.is_match(version.trim())
    }
}

impl Default for VersionParser {
    fn default() -> Self {
        Self::new()
    }
}
