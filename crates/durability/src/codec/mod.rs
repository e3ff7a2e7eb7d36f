//! Record codec for the apiary data file
//!
//! Pure text encoding, no I/O. The file is UTF-8, newline-delimited, with
//! one section per collection in fixed order:
//!
//! ```text
//! ===USERS===
//! <username>|<password>|<display name>|<role>
//! ===LOCATIONS===
//! <location>
//! ===HIVES===
//! NEXT_HIVE_ID:<int>
//! <id>|<tag>|<color>|<location>|<status>|<honey>|<true|false>|<notes>
//! ACTIONS:<id>          (only when the hive has actions)
//! <action>
//! ENDACTIONS:<id>
//! ===TASKS===
//! NEXT_TASK_ID:<int>
//! <id>|<name>|<description>|<location>|<status>|<notes>
//! ```
//!
//! ## Limitations
//!
//! There is no escaping. A field containing `|` or a line break will not
//! decode back to the same record. [`delimiter_hazards`] finds such fields
//! so the caller can warn before writing.

pub mod reader;
pub mod record;
pub mod section;
pub mod writer;

pub use reader::decode_snapshot;
pub use record::{DecodeContext, RecordCodec, DELIMITER};
pub use section::Section;
pub use writer::encode_snapshot;

use apiary_core::{Error, Snapshot};

/// Prefix of the hive next-id hint line
pub const NEXT_HIVE_ID_PREFIX: &str = "NEXT_HIVE_ID:";
/// Prefix of the task next-id hint line
pub const NEXT_TASK_ID_PREFIX: &str = "NEXT_TASK_ID:";
/// Opens a hive's actions block; followed by the hive id
pub const ACTIONS_PREFIX: &str = "ACTIONS:";
/// Closes a hive's actions block; followed by the hive id
pub const END_ACTIONS_PREFIX: &str = "ENDACTIONS:";

/// Next-id values written into the hint lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextIds {
    /// Written as `NEXT_HIVE_ID:`
    pub hive: u32,
    /// Written as `NEXT_TASK_ID:`
    pub task: u32,
}

/// Result of decoding a data file
#[derive(Debug, Default)]
pub struct Decoded {
    /// Records that decoded cleanly
    pub snapshot: Snapshot,
    /// Value of the last valid `NEXT_HIVE_ID:` line
    pub next_hive_id: Option<u32>,
    /// Value of the last valid `NEXT_TASK_ID:` line
    pub next_task_id: Option<u32>,
    /// One `Error::Parse` per skipped line
    pub issues: Vec<Error>,
}

/// A field value that cannot be written without corrupting its line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldHazard {
    /// Record description, e.g. `hive 3` or `account 'pavel'`
    pub record: String,
    /// Field name
    pub field: &'static str,
}

impl std::fmt::Display for FieldHazard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} field '{}'", self.record, self.field)
    }
}

fn breaks_line(value: &str) -> bool {
    value.contains(DELIMITER) || value.contains('\n') || value.contains('\r')
}

fn breaks_whole_line(value: &str) -> bool {
    value.contains('\n') || value.contains('\r') || section::is_marker(value)
}

/// List every field that cannot be written back unchanged
///
/// Delimited fields break on the delimiter or a line break. Whole-line
/// values break on a line break or when they look like a section marker.
/// A blank location is dropped on read, and an action equal to its
/// hive's `ENDACTIONS:` footer closes the block early.
pub fn delimiter_hazards(snapshot: &Snapshot) -> Vec<FieldHazard> {
    let mut hazards = Vec::new();
    let mut check = |record: &dyn Fn() -> String, field: &'static str, bad: bool| {
        if bad {
            hazards.push(FieldHazard {
                record: record(),
                field,
            });
        }
    };

    for a in &snapshot.accounts {
        let name = || format!("account '{}'", a.username);
        check(&name, "username", breaks_line(&a.username));
        check(&name, "password", breaks_line(&a.password));
        check(&name, "display_name", breaks_line(&a.display_name));
    }
    for loc in snapshot.locations.iter() {
        let bad = breaks_whole_line(loc) || loc.trim().is_empty();
        check(&|| format!("location '{}'", loc), "name", bad);
    }
    for h in &snapshot.hives {
        let name = || format!("hive {}", h.id());
        check(&name, "tag_color", breaks_line(h.tag_color()));
        check(&name, "location", breaks_line(h.location()));
        check(&name, "status", breaks_line(h.status()));
        check(&name, "notes", breaks_line(h.notes()));
        let footer = format!("{}{}", END_ACTIONS_PREFIX, h.id());
        for action in h.required_actions().iter() {
            let bad = breaks_whole_line(action) || action == footer;
            check(&name, "required_actions", bad);
        }
    }
    for t in &snapshot.tasks {
        let name = || format!("task {}", t.id());
        check(&name, "name", breaks_line(t.name()));
        check(&name, "description", breaks_line(t.description()));
        check(&name, "location", breaks_line(t.location()));
        check(&name, "notes", breaks_line(t.notes()));
    }
    hazards
}
