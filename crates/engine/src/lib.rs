//! Engine for the apiary store
//!
//! This crate wires the durability layer into a handle for the
//! presentation layer:
//! - Apiary: open/load/save/refresh/close over one data file
//! - ApiaryConfig: `apiary.toml` settings
//! - SaveQueue: single-worker FIFO queue for asynchronous saves
//! - ChangeDetector: reload on external modification
//!
//! The interactive menu itself lives outside this crate.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod apiary;
pub mod background;
pub mod detector;

pub use apiary::{Apiary, ApiaryConfig, CONFIG_FILE_NAME, DEFAULT_DATA_FILE};
pub use background::{SaveQueue, SaveQueueStats, SaveTicket};
pub use detector::ChangeDetector;
