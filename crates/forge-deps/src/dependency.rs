use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::coordinate::{Coordinate, CoordinateGA};

/// Lifecycle phase(s) in which a dependency is required
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ScopeType {
    #[default]
    Compile,
    Runtime,
    Test,
    Provided,
    System,
    Other,
}

impl ScopeType {
    /// Parse a scope name; unknown names map to [`ScopeType::Other`]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "" | "compile" => ScopeType::Compile,
            "runtime" => ScopeType::Runtime,
            "test" => ScopeType::Test,
            "provided" => ScopeType::Provided,
            "system" => ScopeType::System,
            _ => ScopeType::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeType::Compile => "compile",
            ScopeType::Runtime => "runtime",
            ScopeType::Test => "test",
            ScopeType::Provided => "provided",
            ScopeType::System => "system",
            ScopeType::Other => "other",
        }
    }

    /// Whether dependencies in this scope belong to a runtime closure
    pub fn is_runtime_relevant(&self) -> bool {
        matches!(self, ScopeType::Compile | ScopeType::Runtime)
    }
}

impl fmt::Display for ScopeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for ScopeType {
    fn from(s: String) -> Self {
        ScopeType::parse(&s)
    }
}

impl From<ScopeType> for String {
    fn from(scope: ScopeType) -> Self {
        scope.as_str().to_string()
    }
}

/// Local file holding a retrieved artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactHandle {
    path: PathBuf,
}

impl ArtifactHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}

/// A dependency edge: the target coordinate plus scope, optionality and
/// the exclusions it imposes on its own subtree.
///
/// Equality and hashing use the full coordinate only, so collections of
/// dependencies deduplicate by coordinate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dependency {
    coordinate: Coordinate,
    #[serde(default)]
    scope: ScopeType,
    #[serde(default)]
    optional: bool,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    exclusions: BTreeSet<CoordinateGA>,
    #[serde(skip)]
    artifact: Option<ArtifactHandle>,
}

impl Dependency {
    /// A required `compile` dependency on `coordinate`
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            scope: ScopeType::Compile,
            optional: false,
            exclusions: BTreeSet::new(),
            artifact: None,
        }
    }

    pub fn with_scope(mut self, scope: ScopeType) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn with_exclusion(mut self, exclusion: CoordinateGA) -> Self {
        self.exclusions.insert(exclusion);
        self
    }

    pub fn with_exclusions(mut self, exclusions: impl IntoIterator<Item = CoordinateGA>) -> Self {
        self.exclusions.extend(exclusions);
        self
    }

    pub fn with_artifact(mut self, artifact: ArtifactHandle) -> Self {
        self.artifact = Some(artifact);
        self
    }

    pub(crate) fn with_coordinate(mut self, coordinate: Coordinate) -> Self {
        self.coordinate = coordinate;
        self
    }

    pub fn coordinate(&self) -> &Coordinate {
        &self.coordinate
    }

    pub fn scope(&self) -> ScopeType {
        self.scope
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn exclusions(&self) -> &BTreeSet<CoordinateGA> {
        &self.exclusions
    }

    /// The retrieved artifact, set by artifact resolution
    pub fn artifact(&self) -> Option<&ArtifactHandle> {
        self.artifact.as_ref()
    }
}

impl PartialEq for Dependency {
    fn eq(&self, other: &Self) -> bool {
        self.coordinate == other.coordinate
    }
}

impl Eq for Dependency {}

impl Hash for Dependency {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.coordinate.hash(state);
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.coordinate, self.scope)?;
        if self.optional {
            write!(f, " (optional)")?;
        }
        Ok(())
    }
}

impl From<Coordinate> for Dependency {
    fn from(coordinate: Coordinate) -> Self {
        Dependency::new(coordinate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn dep(text: &str) -> Dependency {
        Dependency::new(Coordinate::parse(text).unwrap())
    }

    #[test]
    fn test_scope_parse() {
        assert_eq!(ScopeType::parse("COMPILE"), ScopeType::Compile);
        assert_eq!(ScopeType::parse(""), ScopeType::Compile);
        assert_eq!(ScopeType::parse("provided"), ScopeType::Provided);
        assert_eq!(ScopeType::parse("import"), ScopeType::Other);
        assert!(!ScopeType::System.is_runtime_relevant());
        assert!(ScopeType::Runtime.is_runtime_relevant());
    }

    #[test]
    fn test_equality_is_by_coordinate() {
        let a = dep("g:a:1.0").with_scope(ScopeType::Test);
        let b = dep("g:a:1.0").with_optional(true);
        let c = dep("g:a:2.0");

        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<Dependency> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_display() {
        let d = dep("g:a:1.0").with_scope(ScopeType::Runtime).with_optional(true);
        assert_eq!(d.to_string(), "g:a:jar:1.0 (runtime) (optional)");
    }

    #[test]
    fn test_serde() {
        let d = dep("g:a:1.0")
            .with_scope(ScopeType::Provided)
            .with_exclusion(CoordinateGA::new("x", "y"));
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["coordinate"], "g:a:jar:1.0");
        assert_eq!(json["scope"], "provided");
        assert_eq!(json["exclusions"][0], "x:y");

        let back: Dependency = serde_json::from_value(json).unwrap();
        assert_eq!(back.scope(), ScopeType::Provided);
        assert_eq!(back.exclusions().len(), 1);
    }

    #[test]
    fn test_artifact_handle_exists() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        assert!(ArtifactHandle::new(temp.path()).exists());
        assert!(!ArtifactHandle::new("/definitely/not/here.jar").exists());
    }
}
