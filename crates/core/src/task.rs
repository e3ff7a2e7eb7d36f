//! Task records
//!
//! The data file stores no timestamps for tasks, so `created_at` and
//! `completed_at` only live for the lifetime of the process. Equality
//! compares the persisted fields and ignores both timestamps.

use crate::hive::append_note;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// A pending task older than this is overdue
pub const OVERDUE_AFTER_DAYS: i64 = 7;

/// Display format for task timestamps
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Lifecycle state of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TaskStatus {
    /// Not started
    #[serde(rename = "pending")]
    Pending,
    /// Someone is working on it
    #[serde(rename = "in progress")]
    InProgress,
    /// Done
    #[serde(rename = "completed")]
    Completed,
}

impl TaskStatus {
    /// On-disk name of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in progress",
            TaskStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "in progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            other => Err(format!("unknown task status '{}'", other)),
        }
    }
}

/// A unit of work at a location
#[derive(Debug, Clone, Serialize)]
pub struct Task {
    id: u32,
    name: String,
    description: String,
    location: String,
    status: TaskStatus,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    notes: String,
}

impl Task {
    /// Create a pending task created now
    pub fn new(
        id: u32,
        name: impl Into<String>,
        description: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self::created_at(id, name, description, location, Utc::now())
    }

    /// Create a pending task with an explicit creation time
    pub fn created_at(
        id: u32,
        name: impl Into<String>,
        description: impl Into<String>,
        location: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            location: location.into(),
            status: TaskStatus::Pending,
            created_at,
            completed_at: None,
            notes: String::new(),
        }
    }

    /// Rebuild a task from persisted fields
    ///
    /// `loaded_at` becomes the creation time, and also the completion time
    /// when the stored status is completed.
    pub fn restore(
        id: u32,
        name: String,
        description: String,
        location: String,
        status: TaskStatus,
        notes: String,
        loaded_at: DateTime<Utc>,
    ) -> Self {
        let mut task = Self::created_at(id, name, description, location, loaded_at);
        task.notes = notes;
        task.set_status_at(status, loaded_at);
        task
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Allocator-assigned id
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Short name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Longer description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Location name
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Current status
    pub fn status(&self) -> TaskStatus {
        self.status
    }

    /// When the task was created (or loaded)
    pub fn created(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When the task first became completed
    pub fn completed(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Accumulated notes
    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Creation time as `YYYY-MM-DD HH:MM`
    pub fn formatted_created(&self) -> String {
        self.created_at.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Completion time as `YYYY-MM-DD HH:MM`, or `Not completed`
    pub fn formatted_completed(&self) -> String {
        match self.completed_at {
            Some(at) => at.format(TIMESTAMP_FORMAT).to_string(),
            None => "Not completed".to_string(),
        }
    }

    // =========================================================================
    // Mutators
    // =========================================================================

    /// Set the name
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Set the description
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Move the task; callers holding a snapshot should prefer
    /// `Snapshot::relocate_task`, which also registers the location
    pub fn set_location(&mut self, location: impl Into<String>) {
        self.location = location.into();
    }

    /// Change the status
    ///
    /// The completion time is recorded the first time the task becomes
    /// completed and never changes afterwards.
    pub fn set_status(&mut self, status: TaskStatus) {
        self.set_status_at(status, Utc::now());
    }

    fn set_status_at(&mut self, status: TaskStatus, at: DateTime<Utc>) {
        self.status = status;
        if status == TaskStatus::Completed && self.completed_at.is_none() {
            self.completed_at = Some(at);
        }
    }

    /// Mark the task completed
    pub fn complete(&mut self) {
        self.set_status(TaskStatus::Completed);
    }

    /// Replace the notes
    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    /// Append to the notes, `"; "`-joined
    pub fn add_notes(&mut self, notes: &str) {
        append_note(&mut self.notes, notes);
    }

    /// Whether the task is pending and older than [`OVERDUE_AFTER_DAYS`]
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        self.status == TaskStatus::Pending
            && self.created_at < now - Duration::days(OVERDUE_AFTER_DAYS)
    }

    /// [`Task::is_overdue_at`] evaluated against the current time
    pub fn is_overdue(&self) -> bool {
        self.is_overdue_at(Utc::now())
    }
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.description == other.description
            && self.location == other.location
            && self.status == other.status
            && self.notes == other.notes
    }
}

impl Eq for Task {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [
            TaskStatus::Pending,
            TaskStatus::InProgress,
            TaskStatus::Completed,
        ] {
            assert_eq!(status.as_str().parse::<TaskStatus>().unwrap(), status);
        }
        assert!("done".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_new_task_is_pending() {
        let task = Task::new(1, "Harvest Honey", "Collect honey", "Meadow");
        assert_eq!(task.status(), TaskStatus::Pending);
        assert!(task.completed().is_none());
        assert_eq!(task.formatted_completed(), "Not completed");
    }

    #[test]
    fn test_completed_time_set_exactly_once() {
        let mut task = Task::created_at(1, "Check", "Check hive", "Forest", fixed(1));
        task.set_status_at(TaskStatus::Completed, fixed(2));
        assert_eq!(task.completed(), Some(fixed(2)));

        task.set_status_at(TaskStatus::InProgress, fixed(3));
        task.set_status_at(TaskStatus::Completed, fixed(4));
        assert_eq!(task.completed(), Some(fixed(2)));
        assert_eq!(task.status(), TaskStatus::Completed);
    }

    #[test]
    fn test_complete_sets_completed_time() {
        let mut task = Task::new(2, "Replace Queen", "Install queen", "Meadow");
        task.complete();
        let first = task.completed().unwrap();
        task.complete();
        assert_eq!(task.completed(), Some(first));
    }

    #[test]
    fn test_overdue_only_when_pending_and_old() {
        let now = fixed(20);
        let mut task = Task::created_at(1, "Old", "", "Forest", fixed(1));
        assert!(task.is_overdue_at(now));

        task.set_status(TaskStatus::InProgress);
        assert!(!task.is_overdue_at(now));

        let fresh = Task::created_at(2, "Fresh", "", "Forest", fixed(15));
        assert!(!fresh.is_overdue_at(now));
    }

    #[test]
    fn test_formatted_created() {
        let task = Task::created_at(1, "Check", "", "Forest", fixed(3));
        assert_eq!(task.formatted_created(), "2024-05-03 09:30");
    }

    #[test]
    fn test_equality_ignores_timestamps() {
        let a = Task::created_at(1, "Check", "desc", "Forest", fixed(1));
        let b = Task::created_at(1, "Check", "desc", "Forest", fixed(9));
        assert_eq!(a, b);

        let mut c = b.clone();
        c.add_notes("smoke first");
        assert_ne!(a, c);
    }

    #[test]
    fn test_restore_completed_task_gets_completion_time() {
        let task = Task::restore(
            3,
            "Harvest".to_string(),
            "Collect".to_string(),
            "Meadow".to_string(),
            TaskStatus::Completed,
            "done early".to_string(),
            fixed(5),
        );
        assert_eq!(task.completed(), Some(fixed(5)));
        assert_eq!(task.created(), fixed(5));
        assert_eq!(task.notes(), "done early");
    }
}
