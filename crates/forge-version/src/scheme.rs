//! Pluggable version ordering

use std::cmp::Ordering;

use crate::range::VersionSpec;
use crate::version::Version;
use crate::version_parser::{VersionParser, VersionParserError};

/// Ordering and spec grammar used by a resolver.
///
/// The default implementation is [`DefaultVersionScheme`]; a resolver can be
/// handed any other implementation to change how versions sort or how
/// version specs are read.
pub trait VersionScheme: Send + Sync {
    /// Three-way comparison of two concrete versions
    fn compare(&self, a: &str, b: &str) -> Ordering;

    /// Parse the version field of a coordinate
    fn parse_spec(&self, spec: &str) -> Result<VersionSpec, VersionParserError>;

    fn is_snapshot(&self, version: &str) -> bool {
        VersionParser::is_snapshot(version)
    }

    fn matches(&self, spec: &VersionSpec, version: &str) -> bool {
        match spec {
            VersionSpec::Exact(v) => self.compare(v, version) == Ordering::Equal,
            VersionSpec::Latest => true,
            VersionSpec::Release => !self.is_snapshot(version),
            VersionSpec::Range(range) => range.contains(&Version::parse(version)),
        }
    }

    /// Sort newest first; ties keep their input order
    fn sort_descending(&self, versions: &mut Vec<String>) {
        versions.sort_by(|a, b| self.compare(b, a));
    }

    /// Newest candidate satisfying `spec`
    fn select(&self, spec: &VersionSpec, candidates: &[String]) -> Option<String> {
        candidates
            .iter()
            .filter(|v| self.matches(spec, v))
            .fold(None, |best: Option<&String>, v| match best {
                Some(b) if self.compare(b, v) != Ordering::Less => Some(b),
                _ => Some(v),
            })
            .cloned()
    }
}

/// Ordering provided by [`Version`]
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultVersionScheme;

impl VersionScheme for DefaultVersionScheme {
    fn compare(&self, a: &str, b: &str) -> Ordering {
        Version::parse(a).cmp(&Version::parse(b))
    }

    fn parse_spec(&self, spec: &str) -> Result<VersionSpec, VersionParserError> {
        VersionSpec::parse(spec)
    }
}
