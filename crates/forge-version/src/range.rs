//! Version specs: exact versions, symbolic markers and bracket ranges

use std::fmt;

use crate::version::Version;
use crate::version_parser::{VersionParser, VersionParserError};

/// One interval of a range, e.g. `[1.0,2.0)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restriction {
    pub lower: Option<Version>,
    pub lower_inclusive: bool,
    pub upper: Option<Version>,
    pub upper_inclusive: bool,
}

impl Restriction {
    pub fn contains(&self, version: &Version) -> bool {
        if let Some(lower) = &self.lower {
            match version.cmp(lower) {
                std::cmp::Ordering::Less => return false,
                std::cmp::Ordering::Equal if !self.lower_inclusive => return false,
                _ => {}
            }
        }
        if let Some(upper) = &self.upper {
            match version.cmp(upper) {
                std::cmp::Ordering::Greater => return false,
                std::cmp::Ordering::Equal if !self.upper_inclusive => return false,
                _ => {}
            }
        }
        true
    }
}

/// A union of intervals such as `[1.0,2.0),[3.0,)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    spec: String,
    restrictions: Vec<Restriction>,
}

impl VersionRange {
    /// Parse bracket range syntax
    pub fn parse(spec: &str) -> Result<Self, VersionParserError> {
        let spec = spec.trim();
        let invalid = |reason: &str| VersionParserError::InvalidRange {
            range: spec.to_string(),
            reason: reason.to_string(),
        };

        let mut restrictions = Vec::new();
        let mut rest = spec;

        while !rest.is_empty() {
            if !rest.starts_with('[') && !rest.starts_with('(') {
                return Err(invalid("expected '[' or '('"));
            }
            let close = rest
                .find([']', ')'])
                .ok_or_else(|| invalid("unbounded interval"))?;
            restrictions.push(Self::parse_restriction(&rest[..=close], spec)?);

            rest = rest[close + 1..].trim_start();
            if let Some(stripped) = rest.strip_prefix(',') {
                rest = stripped.trim_start();
                if rest.is_empty() {
                    return Err(invalid("trailing ','"));
                }
            } else if !rest.is_empty() {
                return Err(invalid("intervals must be separated by ','"));
            }
        }

        if restrictions.is_empty() {
            return Err(invalid("empty range"));
        }

        Ok(Self {
            spec: spec.to_string(),
            restrictions,
        })
    }

    fn parse_restriction(text: &str, spec: &str) -> Result<Restriction, VersionParserError> {
        let invalid = |reason: &str| VersionParserError::InvalidRange {
            range: spec.to_string(),
            reason: reason.to_string(),
        };

        let lower_inclusive = text.starts_with('[');
        let upper_inclusive = text.ends_with(']');
        let inner = text[1..text.len() - 1].trim();

        match inner.split_once(',') {
            None => {
                if !lower_inclusive || !upper_inclusive {
                    return Err(invalid("single version must use inclusive brackets"));
                }
                if inner.is_empty() {
                    return Err(invalid("empty interval"));
                }
                let version = Version::parse(inner);
                Ok(Restriction {
                    lower: Some(version.clone()),
                    lower_inclusive: true,
                    upper: Some(version),
                    upper_inclusive: true,
                })
            }
            Some((lower, upper)) => {
                let parser = VersionParser::new();
                let bound = |s: &str| -> Result<Option<Version>, VersionParserError> {
                    let s = s.trim();
                    if s.is_empty() {
                        Ok(None)
                    } else {
                        parser.validate(s).map(|v| Some(Version::parse(v)))
                    }
                };
                let lower = bound(lower)?;
                let upper = bound(upper)?;
                if let (Some(l), Some(u)) = (&lower, &upper) {
                    if l > u {
                        return Err(invalid("lower bound is greater than upper bound"));
                    }
                }
                Ok(Restriction {
                    lower,
                    lower_inclusive,
                    upper,
                    upper_inclusive,
                })
            }
        }
    }

    pub fn restrictions(&self) -> &[Restriction] {
        &self.restrictions
    }

    pub fn contains(&self, version: &Version) -> bool {
        self.restrictions.iter().any(|r| r.contains(version))
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.spec)
    }
}

/// What a coordinate's version field asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSpec {
    /// A concrete version (may still be a snapshot)
    Exact(String),
    /// Newest available version, snapshots included
    Latest,
    /// Newest non-snapshot version
    Release,
    /// Newest version inside the range
    Range(VersionRange),
}

impl VersionSpec {
    pub fn parse(spec: &str) -> Result<Self, VersionParserError> {
        let trimmed = spec.trim();
        if trimmed.is_empty() {
            return Err(VersionParserError::InvalidVersion(spec.to_string()));
        }
        if trimmed.eq_ignore_ascii_case("latest") {
            return Ok(VersionSpec::Latest);
        }
        if trimmed.eq_ignore_ascii_case("release") {
            return Ok(VersionSpec::Release);
        }
        if trimmed.starts_with('[') || trimmed.starts_with('(') {
            return VersionRange::parse(trimmed).map(VersionSpec::Range);
        }
        VersionParser::new()
            .validate(trimmed)
            .map(|v| VersionSpec::Exact(v.to_string()))
    }

    /// Exact, non-snapshot versions never change once published
    pub fn is_exact(&self) -> bool {
        matches!(self, VersionSpec::Exact(v) if !VersionParser::is_snapshot(v))
    }

    /// Whether `version` satisfies this spec
    pub fn matches(&self, version: &str) -> bool {
        match self {
            VersionSpec::Exact(v) => Version::parse(v) == Version::parse(version),
            VersionSpec::Latest => true,
            VersionSpec::Release => !VersionParser::is_snapshot(version),
            VersionSpec::Range(range) => range.contains(&Version::parse(version)),
        }
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionSpec::Exact(v) => write!(f, "{}", v),
            VersionSpec::Latest => write!(f, "LATEST"),
            VersionSpec::Release => write!(f, "RELEASE"),
            VersionSpec::Range(range) => write!(f, "{}", range),
        }
    }
}
