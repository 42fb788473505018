//! PlaceSelectionSet - ordered set of chosen place names

use tracing::debug;

/// Places chosen for the draft trip
///
/// Keeps first-insertion order for display. Never holds duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceSelectionSet {
    places: Vec<String>,
}

impl PlaceSelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `place` unless it is already selected
    ///
    /// Returns true if the set changed.
    pub fn add(&mut self, place: impl Into<String>) -> bool {
        let place = place.into();
        if self.contains(&place) {
            debug!(%place, "PlaceSelectionSet::add: already selected");
            return false;
        }
        debug!(%place, "PlaceSelectionSet::add: appended");
        self.places.push(place);
        true
    }

    /// Remove `place` if present
    ///
    /// Returns true if the set changed.
    pub fn remove(&mut self, place: &str) -> bool {
        let before = self.places.len();
        self.places.retain(|p| p != place);
        let removed = self.places.len() != before;
        debug!(%place, removed, "PlaceSelectionSet::remove: called");
        removed
    }

    pub fn contains(&self, place: &str) -> bool {
        self.places.iter().any(|p| p == place)
    }

    pub fn clear(&mut self) {
        self.places.clear();
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.places.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.places
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.places.clone()
    }
}

impl<S: Into<String>> FromIterator<S> for PlaceSelectionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for place in iter {
            set.add(place);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_add_preserves_insertion_order() {
        let mut set = PlaceSelectionSet::new();
        set.add("Louvre");
        set.add("Eiffel Tower");
        set.add("Orsay");
        assert_eq!(set.as_slice(), ["Louvre", "Eiffel Tower", "Orsay"]);
    }

    #[test]
    fn test_add_duplicate_is_noop() {
        let mut set = PlaceSelectionSet::new();
        assert!(set.add("Louvre"));
        assert!(set.add("Orsay"));
        assert!(!set.add("Louvre"));
        assert_eq!(set.as_slice(), ["Louvre", "Orsay"]);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut set: PlaceSelectionSet = ["Louvre"].into_iter().collect();
        assert!(!set.remove("Orsay"));
        assert!(set.remove("Louvre"));
        assert!(set.is_empty());
    }

    #[test]
    fn test_from_iter_drops_duplicates() {
        let set: PlaceSelectionSet = ["a", "b", "a", "c", "b"].into_iter().collect();
        assert_eq!(set.as_slice(), ["a", "b", "c"]);
    }

    proptest! {
        #[test]
        fn prop_add_twice_equals_add_once(places in prop::collection::vec("[a-e]{1,2}", 0..20), extra in "[a-e]{1,2}") {
            let mut once: PlaceSelectionSet = places.iter().cloned().collect();
            once.add(extra.clone());
            let mut twice = once.clone();
            twice.add(extra.clone());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_keeps_first_insertion_order(places in prop::collection::vec("[a-e]{1,2}", 0..20)) {
            let set: PlaceSelectionSet = places.iter().cloned().collect();
            let mut expected: Vec<String> = Vec::new();
            for p in &places {
                if !expected.contains(p) {
                    expected.push(p.clone());
                }
            }
            prop_assert_eq!(set.to_vec(), expected);
        }
    }
}
