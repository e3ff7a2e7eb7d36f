//! Load scenarios against real files
//!
//! - Missing file falls back to the bootstrap dataset, byte for byte
//! - Next-id hints win over observed ids when larger
//! - Malformed lines are skipped without losing their neighbours

use apiary_core::{ErrorKind, Role, TaskStatus};
use apiary_durability::{encode_snapshot, DataStore, LoadSource};
use std::fs;
use tempfile::TempDir;

const BOOTSTRAP_FILE: &str = "===USERS===
pavel|password123|Pavel|admin
worker1|worker123|Worker One|employee
worker2|worker123|Worker Two|employee
===LOCATIONS===
Forest Location
Meadow Location
Garden Location
===HIVES===
NEXT_HIVE_ID:6
1|101|Yellow|Forest Location|unknown|0|true|
2|102|Blue|Forest Location|unknown|0|true|
3|201|Red|Meadow Location|unknown|0|true|
4|202|Green|Meadow Location|unknown|0|true|
5|301|Orange|Garden Location|unknown|0|true|
===TASKS===
NEXT_TASK_ID:4
1|Check Hive 101|Inspect hive 101 for queen presence and honey levels|Forest Location|pending|
2|Harvest Honey|Collect honey from hives in Meadow Location|Meadow Location|pending|
3|Replace Queen|Queen missing in Hive 201, install new queen|Meadow Location|pending|
";

#[test]
fn test_missing_file_returns_bootstrap() {
    let temp_dir = TempDir::new().unwrap();
    let store = DataStore::new(temp_dir.path().join("DataFile.txt"));

    let (snapshot, report) = store.load_report().unwrap();
    assert_eq!(report.source, LoadSource::Bootstrap);
    assert!(report.is_clean());
    assert_eq!(encode_snapshot(&snapshot, store.next_ids()), BOOTSTRAP_FILE);

    assert_eq!(snapshot.accounts[0].role, Role::Admin);
    assert!(snapshot.hives.iter().all(|h| h.has_queen()));
    assert!(snapshot
        .tasks
        .iter()
        .all(|t| t.status() == TaskStatus::Pending));

    // Bootstrap data is not written back on its own
    assert!(!store.path().exists());
}

#[test]
fn test_repeated_bootstrap_loads_are_identical() {
    let temp_dir = TempDir::new().unwrap();
    let store = DataStore::new(temp_dir.path().join("DataFile.txt"));

    let first = store.load().unwrap();
    let second = store.load().unwrap();
    let hive_ids: Vec<u32> = second.hives.iter().map(|h| h.id()).collect();
    assert_eq!(hive_ids, vec![1, 2, 3, 4, 5]);
    assert_eq!(first, second);
    assert_eq!(encode_snapshot(&second, store.next_ids()), BOOTSTRAP_FILE);

    // Fresh ids still move past the bootstrap records
    assert_eq!(store.allocate_hive_id().unwrap(), 6);
    assert_eq!(store.allocate_task_id().unwrap(), 4);
}

#[test]
fn test_bootstrap_saved_then_reloaded_is_identical() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("DataFile.txt");

    let store = DataStore::new(&path);
    let snapshot = store.load().unwrap();
    store.save(&snapshot).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), BOOTSTRAP_FILE);

    let reopened = DataStore::new(&path);
    let (reloaded, report) = reopened.load_report().unwrap();
    assert_eq!(report.source, LoadSource::Disk);
    assert!(report.is_clean());
    assert_eq!(reloaded, snapshot);
    assert_eq!(reopened.allocate_hive_id().unwrap(), 6);
    assert_eq!(reopened.allocate_task_id().unwrap(), 4);
}

#[test]
fn test_hint_larger_than_observed_id_wins() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("DataFile.txt");
    fs::write(
        &path,
        "===HIVES===\nNEXT_HIVE_ID:5\n3|101|Yellow|ForestLoc|healthy|50|true|\n",
    )
    .unwrap();

    let store = DataStore::new(&path);
    let snapshot = store.load().unwrap();
    assert_eq!(snapshot.hives.len(), 1);
    assert_eq!(snapshot.hives[0].id(), 3);
    assert!(snapshot.accounts.is_empty());
    assert!(snapshot.tasks.is_empty());
    assert_eq!(store.allocate_hive_id().unwrap(), 5);
    assert_eq!(store.allocate_task_id().unwrap(), 1);
}

#[test]
fn test_stale_hint_loses_to_observed_id() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("DataFile.txt");
    fs::write(
        &path,
        "===TASKS===\nNEXT_TASK_ID:2\n1|a|b|c|pending|\n9|d|e|f|completed|\n",
    )
    .unwrap();

    let store = DataStore::new(&path);
    store.load().unwrap();
    assert_eq!(store.allocate_task_id().unwrap(), 10);
}

#[test]
fn test_malformed_task_line_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("DataFile.txt");
    fs::write(
        &path,
        "===TASKS===\n\
NEXT_TASK_ID:3\n\
1|Check|Inspect|Forest|pending|\n\
abc|def\n\
2|Harvest|Collect|Meadow|in progress|\n",
    )
    .unwrap();

    let store = DataStore::new(&path);
    let (snapshot, report) = store.load_report().unwrap();
    let ids: Vec<u32> = snapshot.tasks.iter().map(|t| t.id()).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].kind(), ErrorKind::Parse);
    assert!(report.issues[0].to_string().contains("line 4"));
}

#[test]
fn test_unknown_role_and_status_dropped_by_next_save() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("DataFile.txt");
    fs::write(
        &path,
        "===USERS===\n\
pavel|password123|Pavel|admin\n\
guest|guest|Guest|visitor\n\
===TASKS===\n\
NEXT_TASK_ID:3\n\
1|Check|Inspect|Forest|pending|\n\
2|Harvest|Collect|Meadow|on hold|\n",
    )
    .unwrap();

    let store = DataStore::new(&path);
    let (snapshot, report) = store.load_report().unwrap();
    let lines: Vec<String> = report.issues.iter().map(|e| e.to_string()).collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("line 3") && lines[0].contains("visitor"));
    assert!(lines[1].contains("line 7") && lines[1].contains("on hold"));
    assert!(snapshot.account("guest").is_none());
    assert!(snapshot.task(2).is_none());

    store.save(&snapshot).unwrap();
    let written = fs::read_to_string(&path).unwrap();
    assert!(!written.contains("guest"));
    assert!(!written.contains("on hold"));
    assert_eq!(store.allocate_task_id().unwrap(), 3);
}

#[test]
fn test_non_utf8_file_falls_back_to_bootstrap() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("DataFile.txt");
    fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).unwrap();

    let store = DataStore::new(&path);
    let (snapshot, report) = store.load_report().unwrap();
    assert_eq!(report.source, LoadSource::Bootstrap);
    assert_eq!(snapshot.hives.len(), 5);
}
