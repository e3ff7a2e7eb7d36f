//! Hive records
//!
//! A hive carries free-text notes, an ordered set of required actions and a
//! queen sub-state driven by two sentinel actions:
//!
//! ```text
//! HasQueen --set_has_queen(false)--> Missing   [NEED_QUEEN]
//! Missing  --mark_queen_acquired--> Acquired  [QUEEN_ACQUIRED]
//! Acquired --mark_queen_installed--> HasQueen  (notes += "Queen installed")
//! ```
//!
//! `mark_queen_acquired` and `mark_queen_installed` do nothing while the
//! queen is present.

use serde::Serialize;

/// Sentinel action inserted when the queen goes missing
pub const NEED_QUEEN: &str = "Need to acquire queen";

/// Sentinel action replacing [`NEED_QUEEN`] once a queen is acquired
pub const QUEEN_ACQUIRED: &str = "Queen acquired - needs installation";

/// Note appended when a queen is installed
pub const QUEEN_INSTALLED_NOTE: &str = "Queen installed";

/// Separator used when appending notes
pub const NOTES_SEPARATOR: &str = "; ";

/// Highest valid honey level
pub const MAX_HONEY_LEVEL: i32 = 100;

/// Honey level below which a hive needs attention
pub const LOW_HONEY_LEVEL: i32 = 10;

/// Well-known hive status values; any other text is also accepted
pub mod status {
    /// Default status of a new hive
    pub const UNKNOWN: &str = "unknown";
    /// Nothing to do
    pub const HEALTHY: &str = "healthy";
    /// Flagged for a visit
    pub const NEEDS_ATTENTION: &str = "needs attention";
    /// No queen in the hive
    pub const QUEENLESS: &str = "queenless";
    /// Colony gone
    pub const EMPTY: &str = "empty";
}

/// Append `addition` to `notes`, joining with [`NOTES_SEPARATOR`]
pub fn append_note(notes: &mut String, addition: &str) {
    if !notes.is_empty() {
        notes.push_str(NOTES_SEPARATOR);
    }
    notes.push_str(addition);
}

/// Insertion-ordered list of distinct action strings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RequiredActions(Vec<String>);

impl RequiredActions {
    /// Create an empty action list
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append an action unless it is already present
    ///
    /// Returns `true` if the action was inserted.
    pub fn insert(&mut self, action: impl Into<String>) -> bool {
        let action = action.into();
        if self.contains(&action) {
            return false;
        }
        self.0.push(action);
        true
    }

    /// Remove an action, returning whether it was present
    pub fn remove(&mut self, action: &str) -> bool {
        match self.0.iter().position(|a| a == action) {
            Some(idx) => {
                self.0.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Whether `action` is present
    pub fn contains(&self, action: &str) -> bool {
        self.0.iter().any(|a| a == action)
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of actions
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no actions
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Actions as a slice
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl<S: Into<String>> FromIterator<S> for RequiredActions {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut actions = RequiredActions::new();
        for action in iter {
            actions.insert(action);
        }
        actions
    }
}

/// A beehive
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hive {
    id: u32,
    tag_number: u32,
    tag_color: String,
    location: String,
    status: String,
    honey_level: i32,
    has_queen: bool,
    notes: String,
    required_actions: RequiredActions,
}

impl Hive {
    /// Create a hive with default state: status `unknown`, no honey,
    /// queen present, no notes or actions
    pub fn new(
        id: u32,
        tag_number: u32,
        tag_color: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            id,
            tag_number,
            tag_color: tag_color.into(),
            location: location.into(),
            status: status::UNKNOWN.to_string(),
            honey_level: 0,
            has_queen: true,
            notes: String::new(),
            required_actions: RequiredActions::new(),
        }
    }

    /// Rebuild a hive from persisted fields
    ///
    /// Unlike the mutators this applies no transitions: the queen flag and
    /// the action list are taken as stored. An out-of-range honey level
    /// falls back to 0, the same as a rejected `set_honey_level` on a new hive.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: u32,
        tag_number: u32,
        tag_color: String,
        location: String,
        status: String,
        honey_level: i32,
        has_queen: bool,
        notes: String,
        required_actions: RequiredActions,
    ) -> Self {
        let mut hive = Self {
            id,
            tag_number,
            tag_color,
            location,
            status,
            honey_level: 0,
            has_queen,
            notes,
            required_actions,
        };
        hive.set_honey_level(honey_level);
        hive
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Allocator-assigned id
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Number on the hive tag
    pub fn tag_number(&self) -> u32 {
        self.tag_number
    }

    /// Color of the hive tag
    pub fn tag_color(&self) -> &str {
        &self.tag_color
    }

    /// Location name
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Status text
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Honey level, 0 to 100
    pub fn honey_level(&self) -> i32 {
        self.honey_level
    }

    /// Whether the hive has a queen
    pub fn has_queen(&self) -> bool {
        self.has_queen
    }

    /// Accumulated notes
    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Outstanding actions in insertion order
    pub fn required_actions(&self) -> &RequiredActions {
        &self.required_actions
    }

    // =========================================================================
    // Mutators
    // =========================================================================

    /// Set the tag number
    pub fn set_tag_number(&mut self, tag_number: u32) {
        self.tag_number = tag_number;
    }

    /// Set the tag color
    pub fn set_tag_color(&mut self, tag_color: impl Into<String>) {
        self.tag_color = tag_color.into();
    }

    /// Move the hive; callers holding a snapshot should prefer
    /// `Snapshot::relocate_hive`, which also registers the location
    pub fn set_location(&mut self, location: impl Into<String>) {
        self.location = location.into();
    }

    /// Set the status text
    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    /// Set the honey level
    ///
    /// Values outside `0..=100` are ignored and the previous level is kept.
    /// Returns whether the value was accepted.
    pub fn set_honey_level(&mut self, level: i32) -> bool {
        if (0..=MAX_HONEY_LEVEL).contains(&level) {
            self.honey_level = level;
            true
        } else {
            false
        }
    }

    /// Set the queen flag
    ///
    /// Clearing it inserts [`NEED_QUEEN`] into the required actions once.
    pub fn set_has_queen(&mut self, has_queen: bool) {
        self.has_queen = has_queen;
        if !has_queen {
            self.required_actions.insert(NEED_QUEEN);
        }
    }

    /// Replace the notes
    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    /// Append to the notes, `"; "`-joined
    pub fn add_notes(&mut self, notes: &str) {
        append_note(&mut self.notes, notes);
    }

    /// Add a required action; duplicates are rejected
    ///
    /// Returns `true` if the action was inserted.
    pub fn add_required_action(&mut self, action: impl Into<String>) -> bool {
        self.required_actions.insert(action)
    }

    /// Remove a required action, returning whether it was present
    pub fn remove_required_action(&mut self, action: &str) -> bool {
        self.required_actions.remove(action)
    }

    /// Record that a replacement queen was obtained
    pub fn mark_queen_acquired(&mut self) {
        if self.has_queen {
            return;
        }
        self.required_actions.remove(NEED_QUEEN);
        self.required_actions.insert(QUEEN_ACQUIRED);
    }

    /// Record that the replacement queen was installed
    pub fn mark_queen_installed(&mut self) {
        if self.has_queen {
            return;
        }
        self.has_queen = true;
        self.required_actions.remove(QUEEN_ACQUIRED);
        self.add_notes(QUEEN_INSTALLED_NOTE);
    }

    /// Whether the hive should be visited
    ///
    /// True for the statuses `needs attention`, `queenless` and `empty`,
    /// for honey below [`LOW_HONEY_LEVEL`], a missing queen, or any
    /// outstanding action.
    pub fn needs_attention(&self) -> bool {
        matches!(
            self.status.as_str(),
            status::NEEDS_ATTENTION | status::QUEENLESS | status::EMPTY
        ) || self.honey_level < LOW_HONEY_LEVEL
            || !self.has_queen
            || !self.required_actions.is_empty()
    }
}
