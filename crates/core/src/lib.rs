//! Core types for the apiary store
//!
//! This crate defines the records kept in the data file and the pieces the
//! store is built from:
//! - Account, Role: login accounts
//! - Hive, RequiredActions: hives and their queen state machine
//! - Task, TaskStatus: tasks and their completion time
//! - Locations: the flat set of location names
//! - Snapshot: the four collections exchanged with the store
//! - SequenceAllocator: monotonic per-kind id counter
//! - Error, ErrorKind: the single error type

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod account;
pub mod error;
pub mod hive;
pub mod location;
pub mod sequence;
pub mod snapshot;
pub mod task;

pub use account::{Account, Role};
pub use error::{Error, ErrorKind, Result};
pub use hive::{Hive, RequiredActions, NEED_QUEEN, QUEEN_ACQUIRED, QUEEN_INSTALLED_NOTE};
pub use location::Locations;
pub use sequence::SequenceAllocator;
pub use snapshot::{Snapshot, TaskStatistics};
pub use task::{Task, TaskStatus};
