//! Fresh-install dataset
//!
//! Returned by the store when the data file is missing or unreadable. The
//! values are fixed; only the ids come from the caller's allocators, so a
//! fresh store hands out hives 1..=5 and tasks 1..=3.

use apiary_core::{Account, Hive, Result, Role, SequenceAllocator, Snapshot, Task};

/// Seed accounts: `(username, password, display name, role)`
pub const ACCOUNTS: [(&str, &str, &str, Role); 3] = [
    ("pavel", "password123", "Pavel", Role::Admin),
    ("worker1", "worker123", "Worker One", Role::Employee),
    ("worker2", "worker123", "Worker Two", Role::Employee),
];

/// Seed locations, in file order
pub const LOCATIONS: [&str; 3] = ["Forest Location", "Meadow Location", "Garden Location"];

/// Seed hives: `(tag number, tag color, location)`
pub const HIVES: [(u32, &str, &str); 5] = [
    (101, "Yellow", "Forest Location"),
    (102, "Blue", "Forest Location"),
    (201, "Red", "Meadow Location"),
    (202, "Green", "Meadow Location"),
    (301, "Orange", "Garden Location"),
];

/// Seed tasks: `(name, description, location)`
pub const TASKS: [(&str, &str, &str); 3] = [
    (
        "Check Hive 101",
        "Inspect hive 101 for queen presence and honey levels",
        "Forest Location",
    ),
    (
        "Harvest Honey",
        "Collect honey from hives in Meadow Location",
        "Meadow Location",
    ),
    (
        "Replace Queen",
        "Queen missing in Hive 201, install new queen",
        "Meadow Location",
    ),
];

/// Build the bootstrap snapshot, drawing ids from the given allocators
pub fn bootstrap_snapshot(
    hive_ids: &SequenceAllocator,
    task_ids: &SequenceAllocator,
) -> Result<Snapshot> {
    let mut snapshot = Snapshot::new();

    for (username, password, display_name, role) in ACCOUNTS {
        snapshot.add_account(Account::new(username, password, display_name, role))?;
    }
    for location in LOCATIONS {
        snapshot.locations.insert(location);
    }
    for (tag_number, tag_color, location) in HIVES {
        snapshot.add_hive(Hive::new(hive_ids.next()?, tag_number, tag_color, location))?;
    }
    for (name, description, location) in TASKS {
        snapshot.add_task(Task::new(task_ids.next()?, name, description, location))?;
    }

    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_ids() {
        let hives = SequenceAllocator::new();
        let tasks = SequenceAllocator::new();
        let snap = bootstrap_snapshot(&hives, &tasks).unwrap();

        assert_eq!(snap.accounts.len(), 3);
        assert_eq!(snap.locations.len(), 3);
        let hive_ids: Vec<u32> = snap.hives.iter().map(|h| h.id()).collect();
        assert_eq!(hive_ids, vec![1, 2, 3, 4, 5]);
        let task_ids: Vec<u32> = snap.tasks.iter().map(|t| t.id()).collect();
        assert_eq!(task_ids, vec![1, 2, 3]);
        assert_eq!(hives.peek(), 6);
        assert_eq!(tasks.peek(), 4);
    }

    #[test]
    fn test_one_admin() {
        let snap =
            bootstrap_snapshot(&SequenceAllocator::new(), &SequenceAllocator::new()).unwrap();
        assert_eq!(snap.accounts_by_role(Role::Admin).len(), 1);
        assert!(snap.authenticate("pavel", "password123").is_some());
        assert!(snap.authenticate("worker1", "worker123").is_some());
    }

    #[test]
    fn test_ids_follow_allocator() {
        let hives = SequenceAllocator::starting_at(40);
        let snap = bootstrap_snapshot(&hives, &SequenceAllocator::new()).unwrap();
        assert_eq!(snap.hives[0].id(), 40);
        assert_eq!(snap.hives[4].id(), 44);
    }
}
