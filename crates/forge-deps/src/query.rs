//! Dependency queries
//!
//! A [`DependencyQuery`] is an immutable value: a coordinate pattern plus
//! optional include/exclude predicates and root exclusions. Build one with
//! [`DependencyQueryBuilder`], whose setters consume and return the builder.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::coordinate::{Coordinate, CoordinateBuilder, CoordinateGA};
use crate::dependency::{Dependency, ScopeType};
use crate::error::Result;

/// Predicate over dependencies, shared between concurrent expansion tasks
pub type DependencyFilter = Arc<dyn Fn(&Dependency) -> bool + Send + Sync>;

#[derive(Clone)]
pub struct DependencyQuery {
    coordinate: Coordinate,
    filter: Option<DependencyFilter>,
    exclude_filter: Option<DependencyFilter>,
    exclusions: BTreeSet<CoordinateGA>,
    scope: Option<ScopeType>,
    refresh: bool,
}

impl DependencyQuery {
    pub fn coordinate(&self) -> &Coordinate {
        &self.coordinate
    }

    pub fn filter(&self) -> Option<&DependencyFilter> {
        self.filter.as_ref()
    }

    pub fn exclude_filter(&self) -> Option<&DependencyFilter> {
        self.exclude_filter.as_ref()
    }

    /// Group+artifact pairs excluded from the whole tree
    pub fn exclusions(&self) -> &BTreeSet<CoordinateGA> {
        &self.exclusions
    }

    /// Scope given to the root dependency
    pub fn scope(&self) -> ScopeType {
        self.scope.unwrap_or_default()
    }

    /// Whether cached repository answers should be bypassed
    pub fn is_refresh(&self) -> bool {
        self.refresh
    }

    /// True when there is no include filter or it accepts `dependency`
    pub fn accepts(&self, dependency: &Dependency) -> bool {
        self.filter.as_ref().map_or(true, |f| f(dependency))
    }

    /// True when the exclude filter rejects `dependency`
    pub fn excludes(&self, dependency: &Dependency) -> bool {
        self.exclude_filter.as_ref().is_some_and(|f| f(dependency))
    }
}

impl fmt::Debug for DependencyQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyQuery")
            .field("coordinate", &self.coordinate.to_string())
            .field("filter", &self.filter.as_ref().map(|_| "<fn>"))
            .field("exclude_filter", &self.exclude_filter.as_ref().map(|_| "<fn>"))
            .field("exclusions", &self.exclusions)
            .field("scope", &self.scope)
            .field("refresh", &self.refresh)
            .finish()
    }
}

impl From<Coordinate> for DependencyQuery {
    fn from(coordinate: Coordinate) -> Self {
        DependencyQueryBuilder::create(coordinate).build()
    }
}

impl From<CoordinateBuilder> for DependencyQuery {
    fn from(builder: CoordinateBuilder) -> Self {
        DependencyQueryBuilder::create(builder).build()
    }
}

impl From<DependencyQueryBuilder> for DependencyQuery {
    fn from(builder: DependencyQueryBuilder) -> Self {
        builder.build()
    }
}

/// Value builder for [`DependencyQuery`]
#[derive(Clone, Debug)]
pub struct DependencyQueryBuilder {
    query: DependencyQuery,
}

impl DependencyQueryBuilder {
    pub fn create(coordinate: impl Into<Coordinate>) -> Self {
        Self {
            query: DependencyQuery {
                coordinate: coordinate.into(),
                filter: None,
                exclude_filter: None,
                exclusions: BTreeSet::new(),
                scope: None,
                refresh: false,
            },
        }
    }

    /// Start from the compact textual coordinate form
    pub fn parse(coordinate: &str) -> Result<Self> {
        Ok(Self::create(Coordinate::parse(coordinate)?))
    }

    /// Keep only dependencies the predicate accepts
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&Dependency) -> bool + Send + Sync + 'static,
    {
        self.query.filter = Some(Arc::new(filter));
        self
    }

    /// Drop dependencies (and their subtrees) the predicate accepts
    pub fn with_exclude_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&Dependency) -> bool + Send + Sync + 'static,
    {
        self.query.exclude_filter = Some(Arc::new(filter));
        self
    }

    pub fn with_exclusions(mut self, exclusions: impl IntoIterator<Item = CoordinateGA>) -> Self {
        self.query.exclusions = exclusions.into_iter().collect();
        self
    }

    pub fn with_exclusion(mut self, exclusion: CoordinateGA) -> Self {
        self.query.exclusions.insert(exclusion);
        self
    }

    pub fn with_scope(mut self, scope: ScopeType) -> Self {
        self.query.scope = Some(scope);
        self
    }

    pub fn with_refresh(mut self, refresh: bool) -> Self {
        self.query.refresh = refresh;
        self
    }

    pub fn build(self) -> DependencyQuery {
        self.query
    }
}

/// Ready-made predicates for [`DependencyQueryBuilder::with_filter`]
pub mod filters {
    use super::*;

    pub fn classifier(classifier: impl Into<String>) -> impl Fn(&Dependency) -> bool + Send + Sync + Clone + 'static {
        let classifier = classifier.into();
        move |d: &Dependency| d.coordinate().classifier() == Some(classifier.as_str())
    }

    pub fn packaging(packaging: impl Into<String>) -> impl Fn(&Dependency) -> bool + Send + Sync + Clone + 'static {
        let packaging = packaging.into();
        move |d: &Dependency| d.coordinate().packaging() == packaging
    }

    pub fn group(group_id: impl Into<String>) -> impl Fn(&Dependency) -> bool + Send + Sync + Clone + 'static {
        let group_id = group_id.into();
        move |d: &Dependency| d.coordinate().group_id() == group_id
    }

    pub fn scope(scope: ScopeType) -> impl Fn(&Dependency) -> bool + Send + Sync + Clone + 'static {
        move |d: &Dependency| d.scope() == scope
    }

    pub fn non_optional() -> impl Fn(&Dependency) -> bool + Send + Sync + Clone + 'static {
        |d: &Dependency| !d.is_optional()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dep(text: &str) -> Dependency {
        Dependency::new(Coordinate::parse(text).unwrap())
    }

    #[test]
    fn test_builder_does_not_alias() {
        let base = DependencyQueryBuilder::parse("org.jboss.forge:example:2.0.0-SNAPSHOT").unwrap();
        let filtered = base.clone().with_filter(filters::classifier("forge-addon")).build();
        let plain = base.build();

        assert!(filtered.filter().is_some());
        assert!(plain.filter().is_none());
    }

    #[test]
    fn test_accepts_and_excludes() {
        let query = DependencyQueryBuilder::parse("g:a:1.0")
            .unwrap()
            .with_filter(filters::classifier("forge-addon"))
            .with_exclude_filter(filters::group("org.unwanted"))
            .build();

        assert!(query.accepts(&dep("g:x:jar:forge-addon:1.0")));
        assert!(!query.accepts(&dep("g:x:1.0")));
        assert!(query.excludes(&dep("org.unwanted:x:1.0")));
        assert!(!query.excludes(&dep("g:x:1.0")));
    }

    #[test]
    fn test_defaults() {
        let query: DependencyQuery = Coordinate::parse("g:a:1.0").unwrap().into();
        assert!(query.accepts(&dep("any:thing:1.0")));
        assert!(!query.excludes(&dep("any:thing:1.0")));
        assert_eq!(query.scope(), ScopeType::Compile);
        assert!(!query.is_refresh());
        assert!(query.exclusions().is_empty());
    }

    #[test]
    fn test_from_coordinate_builder() {
        let coordinate = CoordinateBuilder::create("org.jboss.forge:example:2.0.0-SNAPSHOT")
            .unwrap()
            .with_classifier("forge-addon");
        let query = DependencyQueryBuilder::create(coordinate)
            .with_exclusion(CoordinateGA::new("commons-lang", "commons-lang"))
            .with_scope(ScopeType::Runtime)
            .build();

        assert_eq!(query.coordinate().classifier(), Some("forge-addon"));
        assert_eq!(query.exclusions().len(), 1);
        assert_eq!(query.scope(), ScopeType::Runtime);
    }

    #[test]
    fn test_other_filters() {
        assert!(filters::packaging("war")(&dep("g:a:war:1.0")));
        assert!(filters::scope(ScopeType::Test)(&dep("g:a:1.0").with_scope(ScopeType::Test)));
        assert!(!filters::non_optional()(&dep("g:a:1.0").with_optional(true)));
    }

    #[test]
    fn test_parse_rejects_bad_text() {
        assert!(DependencyQueryBuilder::parse("not a coordinate").is_err());
    }
}
