//! Section markers of the data file

/// Prefix shared by every section marker line
pub const MARKER_PREFIX: &str = "===";

/// A record collection in the data file, in write order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// `===USERS===`
    Accounts,
    /// `===LOCATIONS===`
    Locations,
    /// `===HIVES===`
    Hives,
    /// `===TASKS===`
    Tasks,
}

impl Section {
    /// All sections in the order they are written
    pub const ALL: [Section; 4] = [
        Section::Accounts,
        Section::Locations,
        Section::Hives,
        Section::Tasks,
    ];

    /// The marker line that opens this section
    pub fn marker(&self) -> &'static str {
        match self {
            Section::Accounts => "===USERS===",
            Section::Locations => "===LOCATIONS===",
            Section::Hives => "===HIVES===",
            Section::Tasks => "===TASKS===",
        }
    }

    /// Resolve a marker line; `None` for markers this version does not know
    pub fn from_marker(line: &str) -> Option<Section> {
        Section::ALL.into_iter().find(|s| s.marker() == line)
    }
}

/// Whether `line` is a section marker (known or not)
pub fn is_marker(line: &str) -> bool {
    line.starts_with(MARKER_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_resolve() {
        for section in Section::ALL {
            assert_eq!(Section::from_marker(section.marker()), Some(section));
            assert!(is_marker(section.marker()));
        }
    }

    #[test]
    fn test_unknown_marker() {
        assert!(is_marker("===ARCHIVE==="));
        assert_eq!(Section::from_marker("===ARCHIVE==="), None);
        assert_eq!(Section::from_marker("===users==="), None);
        assert!(!is_marker("==USERS=="));
    }
}
