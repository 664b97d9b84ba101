//! Maven-style storage layout shared by local and remote repositories:
//! `<group as path>/<artifact>/<version>/<artifact>-<version>[-<classifier>].<packaging>`

use crate::coordinate::{Coordinate, CoordinateGA};

use super::descriptor::descriptor_file_name;

/// Path segments of the group+artifact directory
pub(crate) fn ga_segments(ga: &CoordinateGA) -> Vec<String> {
    let mut segments: Vec<String> = ga.group_id().split('.').map(str::to_string).collect();
    segments.push(ga.artifact_id().to_string());
    segments
}

/// Path segments of the directory holding one version
pub(crate) fn version_segments(coordinate: &Coordinate, version: &str) -> Vec<String> {
    let mut segments = ga_segments(&coordinate.ga());
    segments.push(version.to_string());
    segments
}

pub(crate) fn artifact_file_name(coordinate: &Coordinate, version: &str) -> String {
    match coordinate.classifier() {
        Some(classifier) => format!(
            "{}-{}-{}.{}",
            coordinate.artifact_id(),
            version,
            classifier,
            coordinate.packaging()
        ),
        None => format!("{}-{}.{}", coordinate.artifact_id(), version, coordinate.packaging()),
    }
}

/// Relative path of the artifact file, `/`-separated
pub(crate) fn artifact_path(coordinate: &Coordinate, version: &str) -> String {
    let mut segments = version_segments(coordinate, version);
    segments.push(artifact_file_name(coordinate, version));
    segments.join("/")
}

/// Relative path of the descriptor, `/`-separated
pub(crate) fn descriptor_path(coordinate: &Coordinate, version: &str) -> String {
    let mut segments = version_segments(coordinate, version);
    segments.push(descriptor_file_name(coordinate.artifact_id(), version));
    segments.join("/")
}

/// Relative path of the version index used by remote repositories
pub(crate) fn versions_index_path(ga: &CoordinateGA) -> String {
    let mut segments = ga_segments(ga);
    segments.push("versions.json".to_string());
    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let c = Coordinate::parse("org.jboss.forge:example:jar:forge-addon:2.0.0").unwrap();
        assert_eq!(
            artifact_path(&c, "2.0.0"),
            "org/jboss/forge/example/2.0.0/example-2.0.0-forge-addon.jar"
        );
        assert_eq!(
            descriptor_path(&c, "2.0.0"),
            "org/jboss/forge/example/2.0.0/example-2.0.0.deps.json"
        );
        assert_eq!(
            versions_index_path(&c.ga()),
            "org/jboss/forge/example/versions.json"
        );

        let war = Coordinate::parse("g:web:war:1.0").unwrap();
        assert_eq!(artifact_file_name(&war, "1.0"), "web-1.0.war");
    }
}
