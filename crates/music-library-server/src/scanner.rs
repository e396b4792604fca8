//! Library scan orchestration.
//!
//! Walks the configured roots, probes each candidate file, and upserts the
//! results into the catalog. A bad file or an unavailable root is counted
//! and skipped; nothing below the scan invocation is fatal.

use std::path::{Path, PathBuf};
use std::time::Instant;

use thiserror::Error;

use crate::catalog::{CatalogDb, TrackFields};
use crate::library::{WalkOptions, Walker};
use crate::probe;
use crate::status::ScanStatusStore;

/// Control errors surfaced to the scan endpoints.
#[derive(Debug, Error)]
pub enum ScanError {
    /// At most one scan may run at a time, process-wide.
    #[error("a scan is already in progress")]
    AlreadyRunning,
    /// Starting a scan requires at least one configured root.
    #[error("no scan paths configured")]
    NoPathsConfigured,
}

/// Totals for one finished scan pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub scanned_files: u64,
    pub errors: u64,
    pub cancelled: bool,
}

/// Drives one scan at a time over a set of roots. Constructed with its
/// catalog and status sinks; nothing is injected after construction.
pub struct Scanner {
    catalog: CatalogDb,
    status: ScanStatusStore,
    options: WalkOptions,
}

impl Scanner {
    pub fn new(catalog: CatalogDb, status: ScanStatusStore, options: WalkOptions) -> Self {
        Self {
            catalog,
            status,
            options,
        }
    }

    /// Run a full scan over `roots`. The single-flight slot must already be
    /// held (`ScanStatusStore::try_begin`); this always releases it.
    pub fn scan_all(&self, roots: &[PathBuf]) -> ScanSummary {
        let started = Instant::now();
        let mut summary = ScanSummary::default();

        'roots: for root in roots {
            tracing::info!(root = %root.display(), "scanning root");
            let walker = match Walker::new(root, self.options) {
                Ok(walker) => walker,
                Err(err) => {
                    tracing::error!(error = %err, root = %root.display(), "scan root unavailable");
                    summary.errors += 1;
                    self.status.on_file(
                        summary.scanned_files,
                        summary.errors,
                        &root.to_string_lossy(),
                    );
                    continue;
                }
            };

            for path in walker {
                if self.status.cancel_requested() {
                    summary.cancelled = true;
                    tracing::info!("scan cancelled");
                    break 'roots;
                }
                match self.process_file(&path) {
                    Ok(()) => summary.scanned_files += 1,
                    Err(err) => {
                        summary.errors += 1;
                        tracing::warn!(error = %err, path = %path.display(), "file skipped");
                    }
                }
                self.status.on_file(
                    summary.scanned_files,
                    summary.errors,
                    &path.to_string_lossy(),
                );
            }
        }

        self.status.finish(summary.scanned_files, summary.errors);
        tracing::info!(
            files = summary.scanned_files,
            errors = summary.errors,
            cancelled = summary.cancelled,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "scan complete"
        );
        summary
    }

    fn process_file(&self, path: &Path) -> anyhow::Result<()> {
        let probe = probe::probe_file(path)?;

        let artist_id = self.catalog.ensure_artist(&probe.artist)?;
        let album_id = self.catalog.ensure_album(
            &probe.album,
            artist_id,
            probe.year,
            probe.genre.as_deref(),
        )?;

        let file_path = path.to_string_lossy();
        let existing = self.catalog.find_track_by_path(&file_path)?;
        let fields = TrackFields {
            title: probe.title,
            artist_id: Some(artist_id),
            album_id: Some(album_id),
            duration: probe.duration,
            track_number: probe.track_number,
            disc_number: probe.disc_number,
            bitrate: probe.bitrate,
            sample_rate: probe.sample_rate,
            format: Some(probe.format),
            file_size: Some(probe.file_size),
        };
        let track_id = self.catalog.upsert_track(&file_path, &fields)?;

        if existing.is_some() {
            tracing::debug!(track_id, path = %path.display(), "track updated");
        } else {
            tracing::debug!(track_id, path = %path.display(), "track added");
        }
        Ok(())
    }
}
