//! The in-memory collections exchanged with the store
//!
//! A [`Snapshot`] is an owned, independently mutable copy of everything in
//! the data file. The store hands one out on load and takes one back on
//! save; nothing is shared between the two, so edits only reach disk when
//! the caller resubmits the snapshot.
//!
//! The fields are public so that decoders can rebuild a file verbatim. The
//! `add_*` and `relocate_*` helpers apply the collection rules used by
//! interactive callers:
//! - usernames and record ids are unique within their collection
//! - adding or moving a hive/task to an unknown location registers it

use crate::account::{Account, Role};
use crate::error::{Error, Result};
use crate::hive::Hive;
use crate::location::Locations;
use crate::task::{Task, TaskStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Counts reported by [`Snapshot::task_statistics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskStatistics {
    /// All tasks
    pub total: usize,
    /// Tasks with status pending
    pub pending: usize,
    /// Tasks with status completed
    pub completed: usize,
    /// Pending tasks older than the overdue threshold
    pub overdue: usize,
}

/// Accounts, locations, hives and tasks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// Login accounts
    pub accounts: Vec<Account>,
    /// Known location names
    pub locations: Locations,
    /// Hives in file order
    pub hives: Vec<Hive>,
    /// Tasks in file order
    pub tasks: Vec<Task>,
}

impl Snapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Find the account matching both username and password exactly
    pub fn authenticate(&self, username: &str, password: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.matches(username, password))
    }

    /// Look up an account by username
    pub fn account(&self, username: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.username == username)
    }

    /// Accounts with the given role
    pub fn accounts_by_role(&self, role: Role) -> Vec<&Account> {
        self.accounts.iter().filter(|a| a.role == role).collect()
    }

    /// Add an account
    ///
    /// # Errors
    ///
    /// Returns a validation error if the username is taken.
    pub fn add_account(&mut self, account: Account) -> Result<()> {
        if self.account(&account.username).is_some() {
            return Err(Error::validation(format!(
                "username '{}' already exists",
                account.username
            )));
        }
        self.accounts.push(account);
        Ok(())
    }

    /// Remove an account by username
    pub fn remove_account(&mut self, username: &str) -> Option<Account> {
        let idx = self.accounts.iter().position(|a| a.username == username)?;
        Some(self.accounts.remove(idx))
    }

    // =========================================================================
    // Hives
    // =========================================================================

    /// Add a hive, registering its location if unknown
    ///
    /// # Errors
    ///
    /// Returns a validation error if a hive with the same id exists.
    pub fn add_hive(&mut self, hive: Hive) -> Result<()> {
        if self.hive(hive.id()).is_some() {
            return Err(Error::validation(format!(
                "hive {} already exists",
                hive.id()
            )));
        }
        self.locations.insert(hive.location());
        self.hives.push(hive);
        Ok(())
    }

    /// Look up a hive by id
    pub fn hive(&self, id: u32) -> Option<&Hive> {
        self.hives.iter().find(|h| h.id() == id)
    }

    /// Look up a hive by id for mutation
    pub fn hive_mut(&mut self, id: u32) -> Option<&mut Hive> {
        self.hives.iter_mut().find(|h| h.id() == id)
    }

    /// Move a hive, registering the new location if unknown
    ///
    /// Returns `false` if no hive has the given id.
    pub fn relocate_hive(&mut self, id: u32, location: &str) -> bool {
        match self.hives.iter_mut().find(|h| h.id() == id) {
            Some(hive) => {
                hive.set_location(location);
                self.locations.insert(location);
                true
            }
            None => false,
        }
    }

    /// Remove a hive by id
    pub fn remove_hive(&mut self, id: u32) -> Option<Hive> {
        let idx = self.hives.iter().position(|h| h.id() == id)?;
        Some(self.hives.remove(idx))
    }

    /// Hives at a location
    pub fn hives_by_location(&self, location: &str) -> Vec<&Hive> {
        self.hives
            .iter()
            .filter(|h| h.location() == location)
            .collect()
    }

    /// Hives for which [`Hive::needs_attention`] holds
    pub fn hives_needing_attention(&self) -> Vec<&Hive> {
        self.hives.iter().filter(|h| h.needs_attention()).collect()
    }

    // =========================================================================
    // Tasks
    // =========================================================================

    /// Add a task, registering its location if unknown
    ///
    /// # Errors
    ///
    /// Returns a validation error if a task with the same id exists.
    pub fn add_task(&mut self, task: Task) -> Result<()> {
        if self.task(task.id()).is_some() {
            return Err(Error::validation(format!(
                "task {} already exists",
                task.id()
            )));
        }
        self.locations.insert(task.location());
        self.tasks.push(task);
        Ok(())
    }

    /// Look up a task by id
    pub fn task(&self, id: u32) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id() == id)
    }

    /// Look up a task by id for mutation
    pub fn task_mut(&mut self, id: u32) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id() == id)
    }

    /// Move a task, registering the new location if unknown
    ///
    /// Returns `false` if no task has the given id.
    pub fn relocate_task(&mut self, id: u32, location: &str) -> bool {
        match self.tasks.iter_mut().find(|t| t.id() == id) {
            Some(task) => {
                task.set_location(location);
                self.locations.insert(location);
                true
            }
            None => false,
        }
    }

    /// Remove a task by id
    pub fn remove_task(&mut self, id: u32) -> Option<Task> {
        let idx = self.tasks.iter().position(|t| t.id() == id)?;
        Some(self.tasks.remove(idx))
    }

    /// Tasks at a location
    pub fn tasks_by_location(&self, location: &str) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| t.location() == location)
            .collect()
    }

    /// Tasks with the given status
    pub fn tasks_by_status(&self, status: TaskStatus) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.status() == status).collect()
    }

    /// Pending tasks
    pub fn pending_tasks(&self) -> Vec<&Task> {
        self.tasks_by_status(TaskStatus::Pending)
    }

    /// Completed tasks
    pub fn completed_tasks(&self) -> Vec<&Task> {
        self.tasks_by_status(TaskStatus::Completed)
    }

    /// Tasks overdue at `now`
    pub fn overdue_tasks_at(&self, now: DateTime<Utc>) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.is_overdue_at(now)).collect()
    }

    /// Tasks overdue right now
    pub fn overdue_tasks(&self) -> Vec<&Task> {
        self.overdue_tasks_at(Utc::now())
    }

    /// Task counts evaluated at `now`
    pub fn task_statistics_at(&self, now: DateTime<Utc>) -> TaskStatistics {
        TaskStatistics {
            total: self.tasks.len(),
            pending: self.pending_tasks().len(),
            completed: self.completed_tasks().len(),
            overdue: self.overdue_tasks_at(now).len(),
        }
    }

    /// Task counts evaluated right now
    pub fn task_statistics(&self) -> TaskStatistics {
        self.task_statistics_at(Utc::now())
    }
}
