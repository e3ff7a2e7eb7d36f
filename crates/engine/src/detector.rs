//! Poll-driven reload of an externally modified data file
//!
//! Called before each unit of interactive work. When another process has
//! written the data file since our last save or load, the working snapshot
//! is replaced wholesale by a fresh load. Unsaved changes in the working
//! copy are discarded; there is no merge.

use apiary_core::{Result, Snapshot};
use apiary_durability::DataStore;
use std::sync::Arc;
use tracing::info;

/// Reloads the working snapshot when the data file changed on disk
#[derive(Debug, Clone)]
pub struct ChangeDetector {
    store: Arc<DataStore>,
}

impl ChangeDetector {
    /// Watch the file behind `store`
    pub fn new(store: Arc<DataStore>) -> Self {
        Self { store }
    }

    /// Whether the data file changed since the last save or load
    pub fn is_modified(&self) -> bool {
        self.store.is_modified_since_last_read()
    }

    /// Replace `working` with a fresh load if the file changed
    ///
    /// Returns whether a reload happened.
    pub fn refresh(&self, working: &mut Snapshot) -> Result<bool> {
        if !self.is_modified() {
            return Ok(false);
        }
        *working = self.store.load()?;
        info!(
            target: "apiary::detector",
            path = %self.store.path().display(),
            "Data file changed on disk, reloaded"
        );
        Ok(true)
    }
}
