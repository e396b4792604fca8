//! Shared application state.
//!
//! Holds the catalog handle, the scan status store, and the resolved
//! configuration used by the handlers and the background scan thread.

use std::path::PathBuf;

use crate::catalog::CatalogDb;
use crate::library::WalkOptions;
use crate::status::ScanStatusStore;

/// Shared state for Actix handlers and background workers.
pub struct AppState {
    /// Artist/album/track catalog.
    pub catalog: CatalogDb,
    /// Scan status, polled by clients and written by the scan thread.
    pub scan_status: ScanStatusStore,
    /// Settings file holding the configured scan roots.
    pub settings_path: PathBuf,
    /// Fallback roots from the server config until a settings file exists.
    pub default_paths: Vec<String>,
    /// Traversal options applied to every scan.
    pub walk_options: WalkOptions,
}
