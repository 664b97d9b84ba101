//! Ordered artifact versions
//!
//! Versions are split into items on `.`, `-` and `_` separators and on every
//! transition between digits and letters, so `1.0rc1` reads as
//! `1`, `0`, `rc`, `1`. Numeric items compare numerically, qualifiers by
//! their well-known rank, and a number always sorts above a qualifier.
//! Trailing zeros and release qualifiers are insignificant.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A single component of a parsed version
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Item {
    /// Digits with leading zeros removed (`"0"` for zero)
    Number(String),
    /// Lowercased qualifier with aliases expanded (`""` for a release)
    Qualifier(String),
}

impl Item {
    fn number(digits: &str) -> Self {
        let trimmed = digits.trim_start_matches('0');
        if trimmed.is_empty() {
            Item::Number("0".to_string())
        } else {
            Item::Number(trimmed.to_string())
        }
    }

    fn qualifier(text: &str) -> Self {
        let lower = text.to_lowercase();
        let canonical = match lower.as_str() {
            "a" => "alpha",
            "b" => "beta",
            "m" => "milestone",
            "cr" => "rc",
            "ga" | "final" | "release" => "",
            other => other,
        };
        Item::Qualifier(canonical.to_string())
    }

    fn is_null(&self) -> bool {
        match self {
            Item::Number(n) => n == "0",
            Item::Qualifier(q) => q.is_empty(),
        }
    }
}

/// Rank of a qualifier; unknown qualifiers share the highest rank and fall
/// back to lexical order.
fn qualifier_rank(qualifier: &str) -> u8 {
    match qualifier {
        "alpha" => 0,
        "beta" => 1,
        "milestone" => 2,
        "rc" => 3,
        "snapshot" => 4,
        "" => 5,
        "sp" => 6,
        _ => 7,
    }
}

fn compare_numbers(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn compare_qualifiers(a: &str, b: &str) -> Ordering {
    let (ra, rb) = (qualifier_rank(a), qualifier_rank(b));
    if ra == 7 && rb == 7 {
        return a.cmp(b);
    }
    ra.cmp(&rb)
}

fn compare_items(left: Option<&Item>, right: Option<&Item>) -> Ordering {
    match (left, right) {
        (None, None) => Ordering::Equal,
        (Some(Item::Number(n)), None) => {
            if n == "0" {
                Ordering::Equal
            } else {
                Ordering::Greater
            }
        }
        (Some(Item::Qualifier(q)), None) => compare_qualifiers(q, ""),
        (None, Some(_)) => compare_items(right, left).reverse(),
        (Some(Item::Number(a)), Some(Item::Number(b))) => compare_numbers(a, b),
        (Some(Item::Number(_)), Some(Item::Qualifier(_))) => Ordering::Greater,
        (Some(Item::Qualifier(_)), Some(Item::Number(_))) => Ordering::Less,
        (Some(Item::Qualifier(a)), Some(Item::Qualifier(b))) => compare_qualifiers(a, b),
    }
}

/// A parsed, totally ordered version
#[derive(Debug, Clone)]
pub struct Version {
    original: String,
    items: Vec<Item>,
}

impl Version {
    /// Parse a version string. Parsing never fails: any text orders somewhere.
    pub fn parse(version: &str) -> Self {
        let original = version.trim().to_string();
        let items = Self::tokenize(&original);
        Self { original, items }
    }

    fn tokenize(version: &str) -> Vec<Item> {
        let mut items = Vec::new();
        let mut token = String::new();
        let mut token_is_digit = false;

        let flush = |token: &mut String, is_digit: bool, items: &mut Vec<Item>| {
            if token.is_empty() {
                items.push(Item::number("0"));
            } else if is_digit {
                items.push(Item::number(token));
            } else {
                items.push(Item::qualifier(token));
            }
            token.clear();
        };

        for c in version.chars() {
            if matches!(c, '.' | '-' | '_') {
                flush(&mut token, token_is_digit, &mut items);
                continue;
            }
            let is_digit = c.is_ascii_digit();
            if !token.is_empty() && is_digit != token_is_digit {
                flush(&mut token, token_is_digit, &mut items);
            }
            token_is_digit = is_digit;
            token.push(c);
        }
        if !token.is_empty() {
            flush(&mut token, token_is_digit, &mut items);
        }

        while items.last().is_some_and(Item::is_null) {
            items.pop();
        }
        items
    }

    /// The version text as given (trimmed)
    pub fn as_str(&self) -> &str {
        &self.original
    }

    /// Normalized items
    pub fn items(&self) -> &[Item] {
        &self.items
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.items.hash(state);
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.items.len().max(other.items.len());
        for i in 0..len {
            let ord = compare_items(self.items.get(i), other.items.get(i));
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.original)
    }
}

impl From<&str> for Version {
    fn from(version: &str) -> Self {
        Version::parse(version)
    }
}
