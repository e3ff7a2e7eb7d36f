//! Lock-guarded data file store
//!
//! `DataStore` owns one data file and the two id allocators for it.
//!
//! ## Locking
//!
//! - An in-process `RwLock` serializes `save` (exclusive) against `load`
//!   and the staleness check (shared).
//! - `save` additionally holds an advisory OS lock on the sidecar
//!   `<file>.lock` so a second process cannot write at the same time.
//!
//! ## Atomic writes
//!
//! `save` writes the full text to `<file>.tmp`, optionally fsyncs it, then
//! renames it over the data file. A failed write removes the temp file and
//! leaves the previous data file intact, so no reader ever sees a partial
//! file.
//!
//! ## Staleness
//!
//! The modification time seen at the last `save` or `load` is kept. The
//! file counts as modified when its current mtime is later. Filesystems with
//! coarse timestamps can hide a write that lands in the same tick.

use crate::bootstrap::bootstrap_snapshot;
use crate::codec::{decode_snapshot, delimiter_hazards, encode_snapshot, DecodeContext, NextIds};
use apiary_core::{Error, Result, SequenceAllocator, Snapshot};
use fs2::FileExt;
use parking_lot::{Mutex, RwLock};
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, error, info, warn};

/// Where a loaded snapshot came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// Decoded from the data file
    Disk,
    /// The data file was missing or unreadable; bootstrap data was returned
    Bootstrap,
}

/// Outcome of a load beyond the snapshot itself
#[derive(Debug)]
pub struct LoadReport {
    /// Where the snapshot came from
    pub source: LoadSource,
    /// Skipped lines, one `Error::Parse` each
    pub issues: Vec<Error>,
}

impl LoadReport {
    /// Whether every line decoded
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Store for one data file
#[derive(Debug)]
pub struct DataStore {
    path: PathBuf,
    lock_path: PathBuf,
    temp_path: PathBuf,
    sync_on_save: bool,
    io_lock: RwLock<()>,
    /// Data file mtime at the last save or load
    last_seen: Mutex<Option<SystemTime>>,
    hive_ids: SequenceAllocator,
    task_ids: SequenceAllocator,
}

impl DataStore {
    /// Create a store for `path`; nothing is read until `load`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            lock_path: sidecar(&path, ".lock"),
            temp_path: sidecar(&path, ".tmp"),
            path,
            sync_on_save: true,
            io_lock: RwLock::new(()),
            last_seen: Mutex::new(None),
            hive_ids: SequenceAllocator::new(),
            task_ids: SequenceAllocator::new(),
        }
    }

    /// Set whether `save` fsyncs the temp file before renaming it
    pub fn with_sync_on_save(mut self, sync_on_save: bool) -> Self {
        self.sync_on_save = sync_on_save;
        self
    }

    /// Path of the data file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the advisory lock file
    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    // =========================================================================
    // Id allocation
    // =========================================================================

    /// Allocate the next hive id
    pub fn allocate_hive_id(&self) -> Result<u32> {
        self.hive_ids.next()
    }

    /// Allocate the next task id
    pub fn allocate_task_id(&self) -> Result<u32> {
        self.task_ids.next()
    }

    /// The values the next `save` would write into the hint lines
    pub fn next_ids(&self) -> NextIds {
        NextIds {
            hive: self.hive_ids.peek(),
            task: self.task_ids.peek(),
        }
    }

    // =========================================================================
    // Save
    // =========================================================================

    /// Write the snapshot to the data file
    ///
    /// Every id in the snapshot is observed first, so the hint lines never
    /// fall below a written id. Fields that break the line format are logged
    /// and written anyway.
    pub fn save(&self, snapshot: &Snapshot) -> Result<()> {
        self.observe_ids(snapshot);
        for hazard in delimiter_hazards(snapshot) {
            warn!(
                target: "apiary::codec",
                path = %self.path.display(),
                %hazard,
                "Field contains a delimiter or line break and will not read back intact"
            );
        }
        let text = encode_snapshot(snapshot, self.next_ids());

        let _guard = self.io_lock.write();
        let lock_file = self.acquire_file_lock()?;

        let result = self.write_atomic(text.as_bytes());
        // Closing the handle would release it too
        let _ = FileExt::unlock(&lock_file);
        result?;

        let mtime = fs::metadata(&self.path).and_then(|m| m.modified()).ok();
        *self.last_seen.lock() = mtime;

        info!(
            target: "apiary::store",
            path = %self.path.display(),
            accounts = snapshot.accounts.len(),
            hives = snapshot.hives.len(),
            tasks = snapshot.tasks.len(),
            bytes = text.len(),
            "Data saved"
        );
        Ok(())
    }

    fn acquire_file_lock(&self) -> Result<File> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&self.lock_path)
            .map_err(|e| Error::lock(format!("failed to open lock file: {}", e)))?;
        FileExt::lock_exclusive(&lock_file).map_err(|e| {
            Error::lock(format!(
                "failed to lock '{}': {}",
                self.lock_path.display(),
                e
            ))
        })?;
        Ok(lock_file)
    }

    /// Write to the temp path, then rename over the data file
    fn write_atomic(&self, bytes: &[u8]) -> Result<()> {
        if self.temp_path.exists() {
            warn!(target: "apiary::store", path = %self.temp_path.display(), "Removing stale temp file");
            let _ = fs::remove_file(&self.temp_path);
        }

        let written = (|| -> std::io::Result<()> {
            let mut file = File::create(&self.temp_path)?;
            file.write_all(bytes)?;
            if self.sync_on_save {
                file.sync_all()?;
            }
            Ok(())
        })();

        if let Err(e) = written.and_then(|()| fs::rename(&self.temp_path, &self.path)) {
            warn!(
                target: "apiary::store",
                temp_path = %self.temp_path.display(),
                error = %e,
                "Save failed, cleaning up temp file"
            );
            let _ = fs::remove_file(&self.temp_path);
            return Err(Error::Io(e));
        }

        debug!(target: "apiary::store", path = %self.path.display(), "Atomic rename completed");
        Ok(())
    }

    // =========================================================================
    // Load
    // =========================================================================

    /// Load the data file, or the bootstrap dataset if it cannot be read
    pub fn load(&self) -> Result<Snapshot> {
        self.load_report().map(|(snapshot, _)| snapshot)
    }

    /// Load the data file and report where the data came from
    ///
    /// Both allocators are rebased past every decoded id and hint. The
    /// bootstrap dataset always carries the same ids; the allocators are
    /// rebased past them as well.
    pub fn load_report(&self) -> Result<(Snapshot, LoadReport)> {
        let _guard = self.io_lock.read();

        let (text, mtime) = match read_file(&self.path) {
            Ok(read) => read,
            Err(e) => {
                warn!(
                    target: "apiary::store",
                    path = %self.path.display(),
                    error = %e,
                    "Data file unreadable, using bootstrap data"
                );
                *self.last_seen.lock() = None;
                let snapshot =
                    bootstrap_snapshot(&SequenceAllocator::new(), &SequenceAllocator::new())?;
                self.observe_ids(&snapshot);
                let report = LoadReport {
                    source: LoadSource::Bootstrap,
                    issues: Vec::new(),
                };
                return Ok((snapshot, report));
            }
        };

        let decoded = decode_snapshot(&text, &DecodeContext::now());
        for issue in &decoded.issues {
            warn!(target: "apiary::codec", path = %self.path.display(), error = %issue, "Skipped line");
        }
        if !decoded.issues.is_empty() {
            error!(
                target: "apiary::store",
                path = %self.path.display(),
                skipped = decoded.issues.len(),
                "Skipped lines are not kept; the next save drops them from the data file"
            );
        }

        if let Some(next) = decoded.next_hive_id {
            self.hive_ids.observe_hint(next);
        }
        if let Some(next) = decoded.next_task_id {
            self.task_ids.observe_hint(next);
        }
        self.observe_ids(&decoded.snapshot);
        *self.last_seen.lock() = mtime;

        info!(
            target: "apiary::store",
            path = %self.path.display(),
            accounts = decoded.snapshot.accounts.len(),
            hives = decoded.snapshot.hives.len(),
            tasks = decoded.snapshot.tasks.len(),
            skipped = decoded.issues.len(),
            "Data loaded"
        );

        let report = LoadReport {
            source: LoadSource::Disk,
            issues: decoded.issues,
        };
        Ok((decoded.snapshot, report))
    }

    fn observe_ids(&self, snapshot: &Snapshot) {
        for hive in &snapshot.hives {
            self.hive_ids.observe(hive.id());
        }
        for task in &snapshot.tasks {
            self.task_ids.observe(task.id());
        }
    }

    // =========================================================================
    // Staleness
    // =========================================================================

    /// Whether the data file changed since the last `save` or `load`
    ///
    /// A file that appeared after a bootstrap load counts as modified; a
    /// file that disappeared does not.
    pub fn is_modified_since_last_read(&self) -> bool {
        let _guard = self.io_lock.read();
        let current = match fs::metadata(&self.path).and_then(|m| m.modified()) {
            Ok(mtime) => mtime,
            Err(_) => return false,
        };
        match *self.last_seen.lock() {
            Some(seen) => current > seen,
            None => true,
        }
    }
}

/// Read the whole file and the mtime of the handle that was read
fn read_file(path: &Path) -> std::io::Result<(String, Option<SystemTime>)> {
    let mut file = File::open(path)?;
    let mtime = file.metadata().and_then(|m| m.modified()).ok();
    let mut text = String::new();
    file.read_to_string(&mut text)?;
    Ok((text, mtime))
}

/// `path` with `suffix` appended to its final component
fn sidecar(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}
