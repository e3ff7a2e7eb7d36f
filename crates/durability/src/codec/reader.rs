//! Snapshot decoding
//!
//! Decoding is tolerant. A line that fails validation is reported as a
//! parse issue and skipped; the rest of the file still loads. The reader is
//! a small state machine over the current section:
//!
//! - a known marker switches section
//! - an unknown marker switches to "no section"; lines are dropped until
//!   the next known marker
//! - blank lines outside an actions block are ignored
//! - a hive line may be followed by `ACTIONS:<id>` ... `ENDACTIONS:<id>`

use super::record::{DecodeContext, RecordCodec};
use super::section::{is_marker, Section};
use super::{Decoded, ACTIONS_PREFIX, END_ACTIONS_PREFIX, NEXT_HIVE_ID_PREFIX, NEXT_TASK_ID_PREFIX};
use apiary_core::{Account, Error, Hive, RequiredActions, Task};
use std::iter::Peekable;
use std::str::Lines;

/// Decode the full text of a data file
pub fn decode_snapshot(text: &str, ctx: &DecodeContext) -> Decoded {
    let mut reader = Reader {
        lines: text.lines().peekable(),
        line_no: 0,
        ctx,
        out: Decoded::default(),
    };
    reader.run();
    reader.out
}

struct Reader<'a> {
    lines: Peekable<Lines<'a>>,
    /// 1-based number of the line last returned by `next_line`
    line_no: usize,
    ctx: &'a DecodeContext,
    out: Decoded,
}

impl<'a> Reader<'a> {
    fn next_line(&mut self) -> Option<&'a str> {
        let line = self.lines.next()?;
        self.line_no += 1;
        Some(line)
    }

    fn issue(&mut self, line: usize, reason: impl Into<String>) {
        self.out.issues.push(Error::parse(line, reason));
    }

    fn run(&mut self) {
        let mut section: Option<Section> = None;

        while let Some(line) = self.next_line() {
            if is_marker(line) {
                section = Section::from_marker(line);
                continue;
            }
            if line.trim().is_empty() {
                continue;
            }

            match section {
                None => {}
                Some(Section::Accounts) => self.account_line(line),
                Some(Section::Locations) => {
                    self.out.snapshot.locations.insert(line);
                }
                Some(Section::Hives) => {
                    if let Some(value) = line.strip_prefix(NEXT_HIVE_ID_PREFIX) {
                        self.out.next_hive_id = self.hint(value).or(self.out.next_hive_id);
                    } else if let Some(id) = line.strip_prefix(ACTIONS_PREFIX) {
                        let start = self.line_no;
                        self.issue(start, format!("actions block for unknown hive '{}'", id));
                        let _ = self.actions_block(id);
                    } else {
                        self.hive_line(line);
                    }
                }
                Some(Section::Tasks) => {
                    if let Some(value) = line.strip_prefix(NEXT_TASK_ID_PREFIX) {
                        self.out.next_task_id = self.hint(value).or(self.out.next_task_id);
                    } else {
                        self.task_line(line);
                    }
                }
            }
        }
    }

    fn hint(&mut self, value: &str) -> Option<u32> {
        match value.trim().parse::<u32>() {
            Ok(next) => Some(next),
            Err(_) => {
                let line = self.line_no;
                self.issue(line, format!("next-id hint '{}' is not a valid integer", value));
                None
            }
        }
    }

    fn account_line(&mut self, line: &str) {
        let line_no = self.line_no;
        match Account::decode_line(line, self.ctx) {
            Ok(account) => {
                if self.out.snapshot.account(&account.username).is_some() {
                    self.issue(
                        line_no,
                        format!("duplicate username '{}'", account.username),
                    );
                } else {
                    self.out.snapshot.accounts.push(account);
                }
            }
            Err(reason) => self.issue(line_no, reason),
        }
    }

    fn hive_line(&mut self, line: &str) {
        let line_no = self.line_no;
        let hive = match Hive::decode_line(line, self.ctx) {
            Ok(hive) => hive,
            Err(reason) => {
                // A following ACTIONS block is reported as orphaned by `run`
                self.issue(line_no, reason);
                return;
            }
        };

        let id = hive.id().to_string();
        let header = format!("{}{}", ACTIONS_PREFIX, id);
        let actions = if self.lines.peek() == Some(&header.as_str()) {
            self.next_line();
            self.actions_block(&id)
        } else {
            RequiredActions::new()
        };

        if self.out.snapshot.hive(hive.id()).is_some() {
            self.issue(line_no, format!("duplicate hive id {}", hive.id()));
            return;
        }
        let mut hive = hive;
        for action in actions.iter() {
            hive.add_required_action(action);
        }
        self.out.snapshot.hives.push(hive);
    }

    /// Consume action lines up to `ENDACTIONS:<id>`
    ///
    /// The block also ends at a section marker or end of input; both are
    /// reported and the actions read so far are kept.
    fn actions_block(&mut self, id: &str) -> RequiredActions {
        let start = self.line_no;
        let footer = format!("{}{}", END_ACTIONS_PREFIX, id);
        let mut actions = RequiredActions::new();

        loop {
            match self.lines.peek() {
                None => break,
                Some(next) if is_marker(next) => break,
                Some(_) => {}
            }
            let Some(line) = self.next_line() else { break };
            if line == footer {
                return actions;
            }
            actions.insert(line);
        }

        self.issue(start, format!("actions block for hive {} is not terminated", id));
        actions
    }

    fn task_line(&mut self, line: &str) {
        let line_no = self.line_no;
        match Task::decode_line(line, self.ctx) {
            Ok(task) => {
                if self.out.snapshot.task(task.id()).is_some() {
                    self.issue(line_no, format!("duplicate task id {}", task.id()));
                } else {
                    self.out.snapshot.tasks.push(task);
                }
            }
            Err(reason) => self.issue(line_no, reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiary_core::{ErrorKind, TaskStatus, NEED_QUEEN, QUEEN_ACQUIRED};

    fn decode(text: &str) -> Decoded {
        decode_snapshot(text, &DecodeContext::now())
    }

    fn issue_lines(decoded: &Decoded) -> Vec<usize> {
        decoded
            .issues
            .iter()
            .map(|e| match e {
                Error::Parse { line, .. } => *line,
                other => panic!("unexpected issue {:?}", other),
            })
            .collect()
    }

    #[test]
    fn test_hive_only_file_with_hint() {
        let decoded = decode("===HIVES===\nNEXT_HIVE_ID:5\n3|101|Yellow|ForestLoc|healthy|50|true|\n");
        assert!(decoded.issues.is_empty());
        assert_eq!(decoded.snapshot.hives.len(), 1);
        assert_eq!(decoded.snapshot.hives[0].id(), 3);
        assert_eq!(decoded.next_hive_id, Some(5));
        assert_eq!(decoded.next_task_id, None);
        assert!(decoded.snapshot.accounts.is_empty());
        assert!(decoded.snapshot.locations.is_empty());
    }

    #[test]
    fn test_malformed_task_line_skipped() {
        let text = "===TASKS===\n\
NEXT_TASK_ID:4\n\
1|Check|Inspect|Forest|pending|\n\
abc|def\n\
2|Harvest|Collect|Meadow|completed|done\n";
        let decoded = decode(text);
        let ids: Vec<u32> = decoded.snapshot.tasks.iter().map(|t| t.id()).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(issue_lines(&decoded), vec![4]);
        assert_eq!(decoded.issues[0].kind(), ErrorKind::Parse);
        assert_eq!(decoded.snapshot.tasks[1].status(), TaskStatus::Completed);
        assert!(decoded.snapshot.tasks[1].completed().is_some());
    }

    #[test]
    fn test_unknown_marker_drops_lines_until_known_marker() {
        let text = "===USERS===\n\
pavel|pw|Pavel|admin\n\
===ARCHIVE===\n\
ghost|pw|Ghost|admin\n\
===LOCATIONS===\n\
Forest\n";
        let decoded = decode(text);
        assert!(decoded.issues.is_empty());
        assert_eq!(decoded.snapshot.accounts.len(), 1);
        assert_eq!(decoded.snapshot.locations.iter().collect::<Vec<_>>(), vec!["Forest"]);
    }

    #[test]
    fn test_lines_before_any_marker_ignored() {
        let decoded = decode("stray line\n===LOCATIONS===\nForest\n");
        assert!(decoded.issues.is_empty());
        assert_eq!(decoded.snapshot.locations.len(), 1);
    }

    #[test]
    fn test_blank_lines_and_crlf() {
        let decoded = decode("===LOCATIONS===\r\n\r\nForest\r\n   \r\nMeadow\r\n");
        assert_eq!(
            decoded.snapshot.locations.iter().collect::<Vec<_>>(),
            vec!["Forest", "Meadow"]
        );
    }

    #[test]
    fn test_actions_block_preserves_order() {
        let text = "===HIVES===\n\
NEXT_HIVE_ID:3\n\
1|101|Yellow|Forest|queenless|20|false|\n\
ACTIONS:1\n\
Queen acquired - needs installation\n\
Feed syrup\n\
ENDACTIONS:1\n\
2|102|Blue|Forest|healthy|80|true|\n";
        let decoded = decode(text);
        assert!(decoded.issues.is_empty());
        let hive = &decoded.snapshot.hives[0];
        assert!(!hive.has_queen());
        // Stored as-is: no sentinel re-inserted for the missing queen
        assert!(!hive.required_actions().contains(NEED_QUEEN));
        assert_eq!(
            hive.required_actions().as_slice(),
            &[QUEEN_ACQUIRED.to_string(), "Feed syrup".to_string()]
        );
        assert!(decoded.snapshot.hives[1].required_actions().is_empty());
    }

    #[test]
    fn test_actions_header_must_match_id_exactly() {
        // ACTIONS:12 must not be taken as the block of hive 1
        let text = "===HIVES===\n\
1|101|Yellow|Forest|healthy|20|true|\n\
ACTIONS:12\n\
Add super\n\
ENDACTIONS:12\n\
2|102|Blue|Forest|healthy|80|true|\n";
        let decoded = decode(text);
        assert_eq!(decoded.snapshot.hives.len(), 2);
        assert!(decoded.snapshot.hives[0].required_actions().is_empty());
        assert_eq!(issue_lines(&decoded), vec![3]);
    }

    #[test]
    fn test_actions_of_rejected_hive_are_skipped() {
        let text = "===HIVES===\n\
1|101|Yellow|Forest|healthy|lots|true|\n\
ACTIONS:1\n\
Add super\n\
ENDACTIONS:1\n\
2|102|Blue|Forest|healthy|80|true|\n";
        let decoded = decode(text);
        assert_eq!(decoded.snapshot.hives.len(), 1);
        assert_eq!(decoded.snapshot.hives[0].id(), 2);
        assert_eq!(issue_lines(&decoded), vec![2, 3]);
    }

    #[test]
    fn test_unterminated_actions_block_stops_at_marker() {
        let text = "===HIVES===\n\
1|101|Yellow|Forest|healthy|20|true|\n\
ACTIONS:1\n\
Add super\n\
===TASKS===\n\
1|Check|Look|Forest|pending|\n";
        let decoded = decode(text);
        assert_eq!(
            decoded.snapshot.hives[0].required_actions().as_slice(),
            &["Add super".to_string()]
        );
        assert_eq!(decoded.snapshot.tasks.len(), 1);
        assert_eq!(issue_lines(&decoded), vec![3]);
    }

    #[test]
    fn test_bad_hint_reported() {
        let decoded = decode("===HIVES===\nNEXT_HIVE_ID:many\n===TASKS===\nNEXT_TASK_ID:9\n");
        assert_eq!(decoded.next_hive_id, None);
        assert_eq!(decoded.next_task_id, Some(9));
        assert_eq!(issue_lines(&decoded), vec![2]);
    }

    #[test]
    fn test_duplicates_reported_and_first_kept() {
        let text = "===USERS===\n\
pavel|a|Pavel|admin\n\
pavel|b|Other|employee\n\
===HIVES===\n\
1|101|Yellow|Forest|healthy|20|true|first\n\
1|999|Blue|Forest|healthy|20|true|second\n\
===TASKS===\n\
1|Check|Look|Forest|pending|\n\
1|Again|Look|Forest|pending|\n";
        let decoded = decode(text);
        assert_eq!(decoded.snapshot.accounts[0].password, "a");
        assert_eq!(decoded.snapshot.hives.len(), 1);
        assert_eq!(decoded.snapshot.hives[0].notes(), "first");
        assert_eq!(decoded.snapshot.tasks.len(), 1);
        assert_eq!(issue_lines(&decoded), vec![3, 6, 9]);
    }

    #[test]
    fn test_unknown_task_status_rejected() {
        let decoded = decode("===TASKS===\n1|Check|Look|Forest|archived|\n");
        assert!(decoded.snapshot.tasks.is_empty());
        assert_eq!(issue_lines(&decoded), vec![2]);
    }
}
