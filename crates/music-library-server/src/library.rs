//! Library walking and the supported-format allow-list.
//!
//! Enumerates candidate audio files under a scan root.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// File extensions the scanner considers, lowercased, without the dot.
/// Compiled in; not user-editable at runtime.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["mp3", "flac", "m4a", "ogg", "wav", "wma", "aac"];

/// Return true when the (lowercased) extension is a supported audio format.
pub fn is_supported_extension(ext: &str) -> bool {
    SUPPORTED_EXTENSIONS.contains(&ext)
}

/// Traversal options for one scan pass.
#[derive(Clone, Copy, Debug)]
pub struct WalkOptions {
    /// Descend into subdirectories.
    pub recursive: bool,
    /// Descend into symlinked directories. When disabled, symlinks are not
    /// traversed at all.
    pub follow_symlinks: bool,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            recursive: true,
            follow_symlinks: false,
        }
    }
}

/// Depth-first iterator over supported audio files under a single root.
///
/// Entry order within a directory is filesystem-native. Unreadable
/// subdirectories are logged and skipped; only an unreadable root fails
/// construction, so callers can count it as a per-root error.
pub struct Walker {
    options: WalkOptions,
    stack: Vec<fs::ReadDir>,
}

impl Walker {
    /// Open a walker rooted at `root`.
    pub fn new(root: &Path, options: WalkOptions) -> Result<Self> {
        let read_dir = fs::read_dir(root).with_context(|| format!("read root {:?}", root))?;
        Ok(Self {
            options,
            stack: vec![read_dir],
        })
    }
}

impl Iterator for Walker {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            let read_dir = self.stack.last_mut()?;
            let entry = match read_dir.next() {
                Some(Ok(entry)) => entry,
                Some(Err(err)) => {
                    tracing::warn!(error = %err, "unreadable directory entry; skipping");
                    continue;
                }
                None => {
                    self.stack.pop();
                    continue;
                }
            };

            let path = entry.path();
            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(err) => {
                    tracing::warn!(error = %err, path = %path.display(), "stat failed; skipping");
                    continue;
                }
            };

            let (is_dir, is_file) = if file_type.is_symlink() {
                if !self.options.follow_symlinks {
                    continue;
                }
                (path.is_dir(), path.is_file())
            } else {
                (file_type.is_dir(), file_type.is_file())
            };

            if is_dir {
                if self.options.recursive {
                    match fs::read_dir(&path) {
                        Ok(next) => self.stack.push(next),
                        Err(err) => {
                            tracing::warn!(error = %err, path = %path.display(), "unreadable directory; skipping");
                        }
                    }
                }
                continue;
            }
            if !is_file {
                continue;
            }

            let ext = path
                .extension()
                .and_then(OsStr::to_str)
                .unwrap_or("")
                .to_ascii_lowercase();
            if is_supported_extension(&ext) {
                return Some(path);
            }
        }
    }
}
