//! Artifact version ordering and version-spec parsing
//!
//! This crate provides the version model used by `forge-deps`: a totally
//! ordered [`Version`], symbolic and range version specs ([`VersionSpec`]),
//! and the [`VersionScheme`] seam through which a resolver can swap in a
//! different ordering or range grammar.

mod comparator;
mod range;
mod scheme;
mod version;
mod version_parser;
mod versions;

pub use comparator::Comparator;
pub use range::{Restriction, VersionRange, VersionSpec};
pub use scheme::{DefaultVersionScheme, VersionScheme};
pub use version::{Item, Version};
pub use version_parser::{Stability, VersionParser, VersionParserError};
pub use versions::Versions;
