//! Snapshot encoding

use super::record::RecordCodec;
use super::section::Section;
use super::{NextIds, ACTIONS_PREFIX, END_ACTIONS_PREFIX, NEXT_HIVE_ID_PREFIX, NEXT_TASK_ID_PREFIX};
use apiary_core::{Hive, Snapshot};
use std::fmt::Write;

/// Encode a snapshot as the full text of a data file
///
/// Sections are written in fixed order (accounts, locations, hives, tasks)
/// and every line ends with `\n`. The hive and task sections open with
/// their next-id hint lines.
pub fn encode_snapshot(snapshot: &Snapshot, next_ids: NextIds) -> String {
    let mut out = String::new();

    push_line(&mut out, Section::Accounts.marker());
    for account in &snapshot.accounts {
        push_line(&mut out, &account.encode_line());
    }

    push_line(&mut out, Section::Locations.marker());
    for location in snapshot.locations.iter() {
        push_line(&mut out, location);
    }

    push_line(&mut out, Section::Hives.marker());
    push_line(&mut out, &format!("{}{}", NEXT_HIVE_ID_PREFIX, next_ids.hive));
    for hive in &snapshot.hives {
        encode_hive(&mut out, hive);
    }

    push_line(&mut out, Section::Tasks.marker());
    push_line(&mut out, &format!("{}{}", NEXT_TASK_ID_PREFIX, next_ids.task));
    for task in &snapshot.tasks {
        push_line(&mut out, &task.encode_line());
    }

    out
}

/// Append a hive line plus its `ACTIONS` block, if it has actions
fn encode_hive(out: &mut String, hive: &Hive) {
    push_line(out, &hive.encode_line());
    let actions = hive.required_actions();
    if actions.is_empty() {
        return;
    }
    // Writing to a String cannot fail
    let _ = writeln!(out, "{}{}", ACTIONS_PREFIX, hive.id());
    for action in actions.iter() {
        push_line(out, action);
    }
    let _ = writeln!(out, "{}{}", END_ACTIONS_PREFIX, hive.id());
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}
