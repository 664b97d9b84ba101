//! Sorting facade over version strings

use crate::version::Version;

/// High-level helpers for lists of versions
pub struct Versions;

impl Versions {
    /// Sort versions in ascending order
    pub fn sort(versions: &[&str]) -> Vec<String> {
        Self::usort(versions, true)
    }

    /// Sort versions in descending order (newest first)
    pub fn rsort(versions: &[&str]) -> Vec<String> {
        Self::usort(versions, false)
    }

    /// Newest of the given versions
    pub fn newest<'a>(versions: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
        versions
            .into_iter()
            .map(|v| (Version::parse(v), v))
            .max_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(_, v)| v)
    }

    fn usort(versions: &[&str], ascending: bool) -> Vec<String> {
        let mut parsed: Vec<(Version, usize)> = versions
            .iter()
            .enumerate()
            .map(|(i, v)| (Version::parse(v), i))
            .collect();

        // Stable on ties so equal versions keep their input order
        parsed.sort_by(|(a, ai), (b, bi)| {
            let ord = if ascending { a.cmp(b) } else { b.cmp(a) };
            ord.then(ai.cmp(bi))
        });

        parsed
            .into_iter()
            .map(|(_, i)| versions[i].to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort() {
        let sorted = Versions::sort(&["1.10", "1.2", "1.2-SNAPSHOT", "0.9"]);
        assert_eq!(sorted, vec!["0.9", "1.2-SNAPSHOT", "1.2", "1.10"]);
    }

    #[test]
    fn test_rsort() {
        let sorted = Versions::rsort(&["2.0.0-SNAPSHOT", "1.0.0", "2.0.0-beta", "2.0.0"]);
        assert_eq!(sorted, vec!["2.0.0", "2.0.0-SNAPSHOT", "2.0.0-beta", "1.0.0"]);
    }

    #[test]
    fn test_rsort_keeps_ties_in_input_order() {
        let sorted = Versions::rsort(&["1.0", "1", "1.0.0"]);
        assert_eq!(sorted, vec!["1.0", "1", "1.0.0"]);
    }

    #[test]
    fn test_newest() {
        assert_eq!(Versions::newest(["1.0", "1.5", "1.2"]), Some("1.5"));
        assert_eq!(Versions::newest(Vec::<&str>::new()), None);
    }
}
