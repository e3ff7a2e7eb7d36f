//! Apiary - flat-file persistence for beehive records
//!
//! One text file holds four record collections (accounts, locations, hives,
//! tasks). This crate re-exports the public API of the workspace crates.
//!
//! # Quick Start
//!
//! ```no_run
//! use apiary::{Apiary, Hive};
//!
//! # fn main() -> apiary::Result<()> {
//! let apiary = Apiary::open_path("DataFile.txt")?;
//!
//! // Missing file: the bootstrap dataset is returned
//! let mut snapshot = apiary.load()?;
//!
//! let id = apiary.allocate_hive_id()?;
//! snapshot.add_hive(Hive::new(id, 401, "White", "Orchard"))?;
//! apiary.submit_save(&snapshot)?;
//!
//! // Before each interaction, pick up edits from other processes
//! apiary.refresh(&mut snapshot)?;
//!
//! // Waits for queued saves
//! apiary.close();
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - `apiary-core`: record types, `Snapshot`, `SequenceAllocator`, `Error`
//! - `apiary-durability`: codec, `DataStore`, bootstrap dataset
//! - `apiary-engine`: `Apiary` handle, `SaveQueue`, `ChangeDetector`, config

pub use apiary_core::*;
pub use apiary_durability::{
    bootstrap_snapshot, decode_snapshot, delimiter_hazards, encode_snapshot, DataStore,
    DecodeContext, Decoded, FieldHazard, LoadReport, LoadSource, NextIds,
};
pub use apiary_engine::{
    Apiary, ApiaryConfig, ChangeDetector, SaveQueue, SaveQueueStats, SaveTicket,
    CONFIG_FILE_NAME, DEFAULT_DATA_FILE,
};
