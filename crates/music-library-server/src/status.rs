//! Shared scan status store.
//!
//! Single source of truth for the scan state: polled by any number of HTTP
//! clients, written only by the running scan. Also owns the single-flight
//! guard and the cooperative cancel flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Milliseconds since the Unix epoch.
pub fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Snapshot of the current (or last finished) scan.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScanStatus {
    /// True while a scan is running.
    pub is_scanning: bool,
    /// 0 while running (no total file count exists in a streaming walk),
    /// 100 once the scan finishes.
    pub progress: u8,
    /// Files successfully processed so far.
    pub scanned_files: u64,
    /// Per-file failures so far (probe or store).
    pub errors: u64,
    /// Most recently attempted path.
    pub current_path: String,
    /// Scan start, milliseconds since the epoch.
    pub start_time: Option<i64>,
}

/// Cloneable handle to the process-wide scan status.
#[derive(Clone)]
pub struct ScanStatusStore {
    inner: Arc<Mutex<ScanStatus>>,
    cancel: Arc<AtomicBool>,
}

impl Default for ScanStatusStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanStatusStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(ScanStatus::default())),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Claim the single scan slot. Returns false when a scan is already
    /// running. On success the previous snapshot is replaced wholesale with
    /// a fresh running record.
    pub fn try_begin(&self, start_time_ms: i64) -> bool {
        let Ok(mut s) = self.inner.lock() else {
            return false;
        };
        if s.is_scanning {
            return false;
        }
        *s = ScanStatus {
            is_scanning: true,
            start_time: Some(start_time_ms),
            ..ScanStatus::default()
        };
        self.cancel.store(false, Ordering::SeqCst);
        true
    }

    /// Publish progress after each attempted file (success or failure).
    pub fn on_file(&self, scanned_files: u64, errors: u64, current_path: &str) {
        if let Ok(mut s) = self.inner.lock() {
            s.scanned_files = scanned_files;
            s.errors = errors;
            s.current_path = current_path.to_string();
        }
    }

    /// Mark the scan finished and release the slot.
    pub fn finish(&self, scanned_files: u64, errors: u64) {
        if let Ok(mut s) = self.inner.lock() {
            s.is_scanning = false;
            s.progress = 100;
            s.scanned_files = scanned_files;
            s.errors = errors;
        }
    }

    /// Ask the running scan to stop at the next file boundary.
    /// Returns whether a scan was running.
    pub fn request_cancel(&self) -> bool {
        let running = self
            .inner
            .lock()
            .map(|s| s.is_scanning)
            .unwrap_or(false);
        if running {
            self.cancel.store(true, Ordering::SeqCst);
        }
        running
    }

    pub fn cancel_requested(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> ScanStatus {
        self.inner
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }
}
