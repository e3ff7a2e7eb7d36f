//! Location names
//!
//! Locations are plain strings referenced by name from hives and tasks.
//! The set keeps insertion order so the data file is written back in the
//! order it was read.

use serde::Serialize;

/// Insertion-ordered set of location names
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Locations(Vec<String>);

impl Locations {
    /// Create an empty set
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Add a location unless it is already present
    ///
    /// Returns `true` if the location was inserted.
    pub fn insert(&mut self, location: impl Into<String>) -> bool {
        let location = location.into();
        if self.contains(&location) {
            return false;
        }
        self.0.push(location);
        true
    }

    /// Remove a location, returning whether it was present
    pub fn remove(&mut self, location: &str) -> bool {
        match self.0.iter().position(|l| l == location) {
            Some(idx) => {
                self.0.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Whether `location` is in the set
    pub fn contains(&self, location: &str) -> bool {
        self.0.iter().any(|l| l == location)
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of locations
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Locations {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut locations = Locations::new();
        for location in iter {
            locations.insert(location);
        }
        locations
    }
}
