//! Version comparison utilities

use std::cmp::Ordering;

use crate::version::Version;

/// Comparator for comparing version strings
pub struct Comparator;

impl Comparator {
    /// Check if version1 > version2
    pub fn greater_than(version1: &str, version2: &str) -> bool {
        Self::compare(version1, ">", version2)
    }

    /// Check if version1 >= version2
    pub fn greater_than_or_equal_to(version1: &str, version2: &str) -> bool {
        Self::compare(version1, ">=", version2)
    }

    /// Check if version1 < version2
    pub fn less_than(version1: &str, version2: &str) -> bool {
        Self::compare(version1, "<", version2)
    }

    /// Check if version1 <= version2
    pub fn less_than_or_equal_to(version1: &str, version2: &str) -> bool {
        Self::compare(version1, "<=", version2)
    }

    /// Check if version1 == version2
    pub fn equal_to(version1: &str, version2: &str) -> bool {
        Self::compare(version1, "==", version2)
    }

    /// Check if version1 != version2
    pub fn not_equal_to(version1: &str, version2: &str) -> bool {
        Self::compare(version1, "!=", version2)
    }

    /// Three-way comparison of two version strings
    pub fn order(version1: &str, version2: &str) -> Ordering {
        Version::parse(version1).cmp(&Version::parse(version2))
    }

    /// Compare version1 to version2 using the given operator.
    /// Unknown operators never match.
    pub fn compare(version1: &str, operator: &str, version2: &str) -> bool {
        let ord = Self::order(version1, version2);
        match operator {
            ">" | "gt" => ord == Ordering::Greater,
            ">=" | "ge" => ord != Ordering::Less,
            "<" | "lt" => ord == Ordering::Less,
            "<=" | "le" => ord != Ordering::Greater,
            "==" | "=" | "eq" => ord == Ordering::Equal,
            "!=" | "<>" | "ne" => ord != Ordering::Equal,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greater_than() {
        assert!(Comparator::greater_than("1.25.0", "1.24.0"));
        assert!(!Comparator::greater_than("1.25.0", "1.25.0"));
        assert!(!Comparator::greater_than("1.25.0", "1.26.0"));
        assert!(Comparator::greater_than("2.0.0", "2.0.0-SNAPSHOT"));
    }

    #[test]
    fn test_less_than() {
        assert!(Comparator::less_than("1.0-beta", "1.0"));
        assert!(Comparator::less_than_or_equal_to("1.0", "1.0.0"));
        assert!(!Comparator::less_than("1.1", "1.0.9"));
    }

    #[test]
    fn test_equality() {
        assert!(Comparator::equal_to("1.0", "1"));
        assert!(Comparator::not_equal_to("1.0", "1.0.1"));
        assert!(Comparator::greater_than_or_equal_to("3.0", "3.0-ga"));
    }

    #[test]
    fn test_unknown_operator() {
        assert!(!Comparator::compare("1.0", "~", "1.0"));
    }
}
