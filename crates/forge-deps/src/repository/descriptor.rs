//! JSON descriptor format shared by every repository layout.
//!
//! ```json
//! {"dependencies": [
//!   {"coordinate": "org.example:lib:1.0", "scope": "compile", "optional": false, "exclusions": ["g:a"]}
//! ]}
//! ```

use serde::{Deserialize, Serialize};

use super::traits::RepositoryError;
use crate::dependency::Dependency;

/// File name of the descriptor stored beside an artifact
pub(crate) fn descriptor_file_name(artifact_id: &str, version: &str) -> String {
    format!("{}-{}.deps.json", artifact_id, version)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Descriptor {
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl Descriptor {
    pub fn new(dependencies: Vec<Dependency>) -> Self {
        Self { dependencies }
    }

    pub fn parse(bytes: &[u8]) -> Result<Self, RepositoryError> {
        serde_json::from_slice(bytes).map_err(|e| RepositoryError::Malformed(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::ScopeType;

    #[test]
    fn test_parse_descriptor() {
        let json = br#"{"dependencies": [
            {"coordinate": "org.example:a:1.0"},
            {"coordinate": "org.example:b:jar:tests:2.0", "scope": "TEST", "optional": true, "exclusions": ["x:*"]}
        ]}"#;
        let descriptor = Descriptor::parse(json).unwrap();
        assert_eq!(descriptor.dependencies.len(), 2);

        let a = &descriptor.dependencies[0];
        assert_eq!(a.coordinate().artifact_id(), "a");
        assert_eq!(a.scope(), ScopeType::Compile);
        assert!(!a.is_optional());

        let b = &descriptor.dependencies[1];
        assert_eq!(b.coordinate().classifier(), Some("tests"));
        assert_eq!(b.scope(), ScopeType::Test);
        assert!(b.is_optional());
        assert_eq!(b.exclusions().len(), 1);
    }

    #[test]
    fn test_empty_document() {
        assert!(Descriptor::parse(b"{}").unwrap().dependencies.is_empty());
    }

    #[test]
    fn test_malformed() {
        for bad in [&b"not json"[..], br#"{"dependencies": [{"coordinate": "broken"}]}"#] {
            assert!(matches!(Descriptor::parse(bad), Err(RepositoryError::Malformed(_))));
        }
    }

    #[test]
    fn test_file_name() {
        assert_eq!(descriptor_file_name("lib", "1.0"), "lib-1.0.deps.json");
    }
}
