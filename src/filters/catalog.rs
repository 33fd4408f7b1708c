//! Ordered catalog of named filters with a single active entry.

use std::sync::Arc;

use crate::error::FilterError;

use super::ImageFilter;

/// Ordered collection of filters, exactly one of which is active.
///
/// Lookup and selection are by name only. The first registered entry is
/// active by default.
pub struct FilterCatalog {
    filters: Vec<Arc<dyn ImageFilter>>,
    active: usize,
}

impl FilterCatalog {
    /// Build a catalog from an ordered, non-empty list of filters.
    pub fn new(filters: Vec<Arc<dyn ImageFilter>>) -> Result<Self, FilterError> {
        if filters.is_empty() {
            return Err(FilterError::EmptyCatalog);
        }
        Ok(Self { filters, active: 0 })
    }

    /// Filter names in registration order.
    pub fn names_in_order(&self) -> Vec<String> {
        self.filters.iter().map(|f| f.name().to_string()).collect()
    }

    /// Name of the currently active filter.
    pub fn active_name(&self) -> &str {
        self.filters[self.active].name()
    }

    /// The currently active filter.
    pub fn active_filter(&self) -> Arc<dyn ImageFilter> {
        self.filters[self.active].clone()
    }

    /// Look up a filter by name.
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn ImageFilter>> {
        self.filters.iter().find(|f| f.name() == name).cloned()
    }

    /// Check whether a filter name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.filters.iter().any(|f| f.name() == name)
    }

    /// Make `name` the active filter.
    ///
    /// An unknown name is rejected and the active entry is left unchanged.
    pub fn set_active(&mut self, name: &str) -> Result<(), FilterError> {
        match self.filters.iter().position(|f| f.name() == name) {
            Some(index) => {
                self.active = index;
                Ok(())
            }
            None => Err(FilterError::UnknownFilter(name.to_string())),
        }
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;

    struct NamedFilter(&'static str);

    impl ImageFilter for NamedFilter {
        fn name(&self) -> &str {
            self.0
        }

        fn apply(&self, frame: Frame) -> Frame {
            frame
        }
    }

    fn catalog(names: &[&'static str]) -> FilterCatalog {
        let filters = names
            .iter()
            .map(|n| Arc::new(NamedFilter(n)) as Arc<dyn ImageFilter>)
            .collect();
        FilterCatalog::new(filters).unwrap()
    }

    #[test]
    fn test_empty_catalog_rejected() {
        assert!(matches!(
            FilterCatalog::new(Vec::new()),
            Err(FilterError::EmptyCatalog)
        ));
    }

    #[test]
    fn test_first_entry_active_by_default() {
        let catalog = catalog(&["None", "Blur"]);
        assert_eq!(catalog.active_name(), "None");
        assert_eq!(catalog.names_in_order(), vec!["None", "Blur"]);
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_set_active_then_reject_unknown() {
        let mut catalog = catalog(&["None", "Blur"]);

        catalog.set_active("Blur").unwrap();
        assert_eq!(catalog.active_name(), "Blur");

        let err = catalog.set_active("Nope").unwrap_err();
        assert_eq!(err, FilterError::UnknownFilter("Nope".to_string()));
        assert_eq!(catalog.active_name(), "Blur");
    }

    #[test]
    fn test_lookup_by_name() {
        let catalog = catalog(&["None", "Blur"]);
        assert!(catalog.lookup("Blur").is_some());
        assert_eq!(catalog.lookup("Blur").unwrap().name(), "Blur");
        assert!(catalog.lookup("missing").is_none());
        assert!(catalog.contains("None"));
        assert!(!catalog.contains("missing"));
    }

    #[test]
    fn test_active_filter_matches_active_name() {
        let mut catalog = catalog(&["None", "Blur"]);
        catalog.set_active("Blur").unwrap();
        assert_eq!(catalog.active_filter().name(), catalog.active_name());
    }
}
