//! Apiary handle and open/close logic
//!
//! This module provides the `Apiary` struct that the presentation layer
//! talks to. It ties together:
//! - the `DataStore` for one data file
//! - the background `SaveQueue`
//! - the `ChangeDetector` for external edits
//!
//! ## Usage
//!
//! Load once, mutate the returned snapshot, and resubmit it after every
//! change. Before each unit of interactive work call `refresh` so edits
//! made by another process are picked up. Call `close` (or drop the handle)
//! on exit so queued saves reach disk.
//!
//! The snapshot handed out is an independent copy: edits to it are not
//! visible to the store until submitted.

pub mod config;

pub use config::{ApiaryConfig, CONFIG_FILE_NAME, DEFAULT_DATA_FILE};

use crate::background::{SaveQueue, SaveQueueStats, SaveTicket};
use crate::detector::ChangeDetector;
use apiary_core::{Result, Snapshot};
use apiary_durability::{DataStore, LoadReport};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Open handle on one data file
pub struct Apiary {
    config: ApiaryConfig,
    store: Arc<DataStore>,
    queue: SaveQueue,
    detector: ChangeDetector,
}

impl Apiary {
    /// Open the store described by `config`.
    ///
    /// Nothing is read until `load`. Starts the save worker.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid or the worker thread
    /// cannot be spawned.
    pub fn open(config: ApiaryConfig) -> Result<Self> {
        config.validate()?;
        let path = config.data_path();
        let store = Arc::new(DataStore::new(&path).with_sync_on_save(config.sync_on_save));
        let queue = SaveQueue::new(Arc::clone(&store))?;
        let detector = ChangeDetector::new(Arc::clone(&store));

        info!(
            target: "apiary::store",
            path = %path.display(),
            sync_on_save = config.sync_on_save,
            "Apiary opened"
        );
        Ok(Self {
            config,
            store,
            queue,
            detector,
        })
    }

    /// Open a data file with default settings
    pub fn open_path(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open(ApiaryConfig::for_data_file(path))
    }

    /// The config this handle was opened with
    pub fn config(&self) -> &ApiaryConfig {
        &self.config
    }

    /// Path of the data file
    pub fn path(&self) -> &Path {
        self.store.path()
    }

    // =========================================================================
    // Load and save
    // =========================================================================

    /// Load the data file, or the bootstrap dataset if it is missing
    pub fn load(&self) -> Result<Snapshot> {
        self.store.load()
    }

    /// Load and report the source and any skipped lines
    pub fn load_report(&self) -> Result<(Snapshot, LoadReport)> {
        self.store.load_report()
    }

    /// Queue a save of a copy of `snapshot`; returns without touching disk
    pub fn submit_save(&self, snapshot: &Snapshot) -> Result<SaveTicket> {
        self.queue.submit(snapshot.clone())
    }

    /// Write `snapshot` now, after any queued saves
    ///
    /// Unlike `submit_save`, the outcome is returned to the caller.
    pub fn save_now(&self, snapshot: &Snapshot) -> Result<()> {
        self.queue.drain();
        self.store.save(snapshot)
    }

    /// Block until every queued save has finished
    pub fn drain(&self) {
        self.queue.drain();
    }

    /// Save queue metrics
    pub fn save_stats(&self) -> SaveQueueStats {
        self.queue.stats()
    }

    // =========================================================================
    // Change detection
    // =========================================================================

    /// Whether another writer changed the data file since the last save or load
    pub fn is_modified(&self) -> bool {
        self.detector.is_modified()
    }

    /// Reload into `working` if the data file changed; returns whether it did
    pub fn refresh(&self, working: &mut Snapshot) -> Result<bool> {
        self.detector.refresh(working)
    }

    // =========================================================================
    // Id allocation
    // =========================================================================

    /// Allocate an id for a new hive
    pub fn allocate_hive_id(&self) -> Result<u32> {
        self.store.allocate_hive_id()
    }

    /// Allocate an id for a new task
    pub fn allocate_task_id(&self) -> Result<u32> {
        self.store.allocate_task_id()
    }

    /// Drain pending saves and stop the worker
    pub fn close(self) {
        self.queue.shutdown();
        let stats = self.queue.stats();
        info!(
            target: "apiary::store",
            path = %self.store.path().display(),
            saves_completed = stats.saves_completed,
            saves_failed = stats.saves_failed,
            "Apiary closed"
        );
    }
}

impl std::fmt::Debug for Apiary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Apiary")
            .field("path", &self.store.path())
            .field("stats", &self.queue.stats())
            .finish()
    }
}
