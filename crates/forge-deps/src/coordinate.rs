//! Artifact coordinates
//!
//! The compact textual form is `group:artifact[:packaging[:classifier]]:version`.
//! The version may be omitted (`group:artifact`) for version-lookup queries,
//! and may be an exact version, `LATEST`/`RELEASE`, or a bracket range.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ResolveError, Result};
use forge_version::VersionParser;

pub const DEFAULT_PACKAGING: &str = "jar";

fn id_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^[A-Za-z0-9_.\-]+$").unwrap())
}

fn validate_id(input: &str, field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(ResolveError::coordinate_format(input, format!("{} is empty", field)));
    }
    if !id_regex().is_match(value) {
        return Err(ResolveError::coordinate_format(
            input,
            format!("{} \"{}\" contains invalid characters", field, value),
        ));
    }
    Ok(())
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Identifies one artifact: group, artifact, version, packaging and classifier.
///
/// Equality and hashing cover all five fields. Two coordinates that differ
/// only in version denote the same logical artifact in conflicting versions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Coordinate {
    group_id: String,
    artifact_id: String,
    version: Option<String>,
    packaging: String,
    classifier: Option<String>,
}

impl Coordinate {
    /// Create a versionless `jar` coordinate
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: None,
            packaging: DEFAULT_PACKAGING.to_string(),
            classifier: None,
        }
    }

    /// Parse `group:artifact[:packaging[:classifier]]:version`
    pub fn parse(text: &str) -> Result<Self> {
        let input = text.trim();
        let parts: Vec<&str> = input.split(':').map(str::trim).collect();

        let (group_id, artifact_id, packaging, classifier, version) = match parts.as_slice() {
            [g, a] => (*g, *a, "", "", ""),
            [g, a, v] => (*g, *a, "", "", *v),
            [g, a, p, v] => (*g, *a, *p, "", *v),
            [g, a, p, c, v] => (*g, *a, *p, *c, *v),
            _ => {
                return Err(ResolveError::coordinate_format(
                    text,
                    "expected group:artifact[:packaging[:classifier]]:version",
                ))
            }
        };

        validate_id(text, "group id", group_id)?;
        validate_id(text, "artifact id", artifact_id)?;
        if !packaging.is_empty() {
            validate_id(text, "packaging", packaging)?;
        }
        if !classifier.is_empty() {
            validate_id(text, "classifier", classifier)?;
        }

        let version = match non_empty(version) {
            Some(v) => {
                VersionParser::new()
                    .validate(&v)
                    .map_err(|e| ResolveError::coordinate_format(text, e.to_string()))?;
                Some(v)
            }
            None => None,
        };

        Ok(Self {
            group_id: group_id.to_string(),
            artifact_id: artifact_id.to_string(),
            version,
            packaging: non_empty(packaging).unwrap_or_else(|| DEFAULT_PACKAGING.to_string()),
            classifier: non_empty(classifier),
        })
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn packaging(&self) -> &str {
        &self.packaging
    }

    pub fn classifier(&self) -> Option<&str> {
        self.classifier.as_deref()
    }

    /// The version-agnostic group+artifact pair
    pub fn ga(&self) -> CoordinateGA {
        CoordinateGA::new(&self.group_id, &self.artifact_id)
    }

    /// Copy of this coordinate with another version
    pub fn with_version(&self, version: impl Into<String>) -> Self {
        Self {
            version: non_empty(&version.into()),
            ..self.clone()
        }
    }

    /// Copy of this coordinate without a version
    pub fn without_version(&self) -> Self {
        Self {
            version: None,
            ..self.clone()
        }
    }

    /// `group:artifact:version`, the key under which repositories store
    /// descriptors, shared by every packaging and classifier of a version
    pub fn gav(&self) -> String {
        format!(
            "{}:{}:{}",
            self.group_id,
            self.artifact_id,
            self.version.as_deref().unwrap_or("")
        )
    }

    /// Same logical artifact: everything but the version matches
    pub fn same_artifact(&self, other: &Coordinate) -> bool {
        self.group_id == other.group_id
            && self.artifact_id == other.artifact_id
            && self.packaging == other.packaging
            && self.classifier == other.classifier
    }

    /// Normalized string form, used as cache key
    pub fn to_key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.version.is_none() && self.classifier.is_none() && self.packaging == DEFAULT_PACKAGING {
            return write!(f, "{}:{}", self.group_id, self.artifact_id);
        }
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.packaging)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{}", classifier)?;
        }
        write!(f, ":{}", self.version.as_deref().unwrap_or(""))
    }
}

impl TryFrom<String> for Coordinate {
    type Error = ResolveError;

    fn try_from(value: String) -> Result<Self> {
        Coordinate::parse(&value)
    }
}

impl From<Coordinate> for String {
    fn from(coordinate: Coordinate) -> Self {
        coordinate.to_string()
    }
}

impl std::str::FromStr for Coordinate {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self> {
        Coordinate::parse(s)
    }
}

/// Group+artifact pair used for exclusion, cycle and conflict matching.
///
/// A `*` in either position matches anything when used as an exclusion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CoordinateGA {
    group_id: String,
    artifact_id: String,
}

impl CoordinateGA {
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
        }
    }

    /// Parse `group:artifact`, wildcards allowed
    pub fn parse(text: &str) -> Result<Self> {
        let (group_id, artifact_id) = text
            .trim()
            .split_once(':')
            .ok_or_else(|| ResolveError::coordinate_format(text, "expected group:artifact"))?;
        let (group_id, artifact_id) = (group_id.trim(), artifact_id.trim());
        if group_id != "*" {
            validate_id(text, "group id", group_id)?;
        }
        if artifact_id != "*" {
            validate_id(text, "artifact id", artifact_id)?;
        }
        Ok(Self::new(group_id, artifact_id))
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    /// Whether this pattern (possibly wildcarded) matches `other`
    pub fn matches(&self, other: &CoordinateGA) -> bool {
        (self.group_id == "*" || self.group_id == other.group_id)
            && (self.artifact_id == "*" || self.artifact_id == other.artifact_id)
    }
}

impl fmt::Display for CoordinateGA {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)
    }
}

impl TryFrom<String> for CoordinateGA {
    type Error = ResolveError;

    fn try_from(value: String) -> Result<Self> {
        CoordinateGA::parse(&value)
    }
}

impl From<CoordinateGA> for String {
    fn from(ga: CoordinateGA) -> Self {
        ga.to_string()
    }
}

impl From<&Coordinate> for CoordinateGA {
    fn from(coordinate: &Coordinate) -> Self {
        coordinate.ga()
    }
}

/// Value builder for [`Coordinate`].
///
/// Every setter consumes the builder and returns the updated value; clone a
/// builder to derive several coordinates from a common base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinateBuilder {
    coordinate: Coordinate,
}

impl CoordinateBuilder {
    /// Start from the compact textual form
    pub fn create(pattern: &str) -> Result<Self> {
        Ok(Self {
            coordinate: Coordinate::parse(pattern)?,
        })
    }

    /// Start from a versionless `jar` coordinate
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self {
            coordinate: Coordinate::new(group_id, artifact_id),
        }
    }

    pub fn with_group_id(mut self, group_id: impl Into<String>) -> Self {
        self.coordinate.group_id = group_id.into();
        self
    }

    pub fn with_artifact_id(mut self, artifact_id: impl Into<String>) -> Self {
        self.coordinate.artifact_id = artifact_id.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.coordinate.version = non_empty(&version.into());
        self
    }

    pub fn with_packaging(mut self, packaging: impl Into<String>) -> Self {
        self.coordinate.packaging =
            non_empty(&packaging.into()).unwrap_or_else(|| DEFAULT_PACKAGING.to_string());
        self
    }

    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.coordinate.classifier = non_empty(&classifier.into());
        self
    }

    /// Validate the assembled fields
    pub fn try_build(self) -> Result<Coordinate> {
        let text = self.coordinate.to_string();
        let parsed = Coordinate::parse(&text)?;
        Ok(parsed)
    }

    pub fn build(self) -> Coordinate {
        self.coordinate
    }
}

impl From<CoordinateBuilder> for Coordinate {
    fn from(builder: CoordinateBuilder) -> Self {
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        let c = Coordinate::parse("org.jboss.forge:dependencies-api").unwrap();
        assert_eq!(c.group_id(), "org.jboss.forge");
        assert_eq!(c.artifact_id(), "dependencies-api");
        assert_eq!(c.version(), None);
        assert_eq!(c.packaging(), "jar");

        let c = Coordinate::parse("org.jboss.forge:example:2.0.0-SNAPSHOT").unwrap();
        assert_eq!(c.version(), Some("2.0.0-SNAPSHOT"));
        assert_eq!(c.classifier(), None);

        let c = Coordinate::parse("org.jboss.forge:example:war:2.0.0").unwrap();
        assert_eq!(c.packaging(), "war");
        assert_eq!(c.version(), Some("2.0.0"));

        let c = Coordinate::parse("org.jboss.forge:example:jar:forge-addon:2.0.0-SNAPSHOT").unwrap();
        assert_eq!(c.classifier(), Some("forge-addon"));
        assert_eq!(c.version(), Some("2.0.0-SNAPSHOT"));
    }

    #[test]
    fn test_parse_ranges_and_symbols() {
        let c = Coordinate::parse("org.example:lib:[1.0,2.0)").unwrap();
        assert_eq!(c.version(), Some("[1.0,2.0)"));
        let c = Coordinate::parse("org.example:lib:LATEST").unwrap();
        assert_eq!(c.version(), Some("LATEST"));
    }

    #[test]
    fn test_parse_errors() {
        for bad in [
            "",
            "justone",
            "a:b:c:d:e:f",
            ":artifact:1.0",
            "group::1.0",
            "gr oup:artifact:1.0",
            "group:art/ifact:1.0",
        ] {
            let err = Coordinate::parse(bad).unwrap_err();
            assert!(
                matches!(err, ResolveError::CoordinateFormat { .. }),
                "{} should fail with a format error",
                bad
            );
        }
    }

    #[test]
    fn test_display_round_trip() {
        for text in [
            "org.example:lib",
            "org.example:lib:jar:1.0",
            "org.example:lib:war:1.0",
            "org.example:lib:jar:tests:1.0",
            "org.example:lib:war:",
            "org.example:lib:jar:tests:",
        ] {
            let c = Coordinate::parse(text).unwrap();
            assert_eq!(c.to_string(), text);
            assert_eq!(Coordinate::parse(&c.to_string()).unwrap(), c);
        }
        assert_eq!(
            Coordinate::parse("org.example:lib:1.0").unwrap().to_string(),
            "org.example:lib:jar:1.0"
        );
    }

    #[test]
    fn test_equality_covers_all_fields() {
        let a = Coordinate::parse("g:a:jar:1.0").unwrap();
        let b = Coordinate::parse("g:a:jar:tests:1.0").unwrap();
        let c = Coordinate::parse("g:a:jar:2.0").unwrap();
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert!(a.same_artifact(&c));
        assert!(!a.same_artifact(&b));
        assert_eq!(a.ga(), b.ga());
    }

    #[test]
    fn test_builder_is_a_value() {
        let base = CoordinateBuilder::create("org.jboss.forge:example:2.0.0-SNAPSHOT").unwrap();
        let addon = base.clone().with_classifier("forge-addon").build();
        let plain = base.build();

        assert_eq!(addon.classifier(), Some("forge-addon"));
        assert_eq!(plain.classifier(), None);
    }

    #[test]
    fn test_builder_try_build_validates() {
        let err = CoordinateBuilder::new("org.example", "bad artifact")
            .with_version("1.0")
            .try_build();
        assert!(err.is_err());

        let ok = CoordinateBuilder::new("org.example", "lib")
            .with_packaging("war")
            .with_version("1.0")
            .try_build()
            .unwrap();
        assert_eq!(ok.to_string(), "org.example:lib:war:1.0");
    }

    #[test]
    fn test_ga_wildcards() {
        let any = CoordinateGA::parse("*:*").unwrap();
        let group = CoordinateGA::parse("org.example:*").unwrap();
        let exact = CoordinateGA::parse("org.example:lib").unwrap();
        let target = CoordinateGA::new("org.example", "lib");

        assert!(any.matches(&target));
        assert!(group.matches(&target));
        assert!(exact.matches(&target));
        assert!(!CoordinateGA::parse("org.other:*").unwrap().matches(&target));
        assert!(CoordinateGA::parse("nocolon").is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let c = Coordinate::parse("g:a:jar:tests:1.0").unwrap();
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, "\"g:a:jar:tests:1.0\"");
        let back: Coordinate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }
}
