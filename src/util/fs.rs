//! Filesystem utilities.
//!
//! Home of the [`Cleaner`], which removes a build tree while honouring an
//! exclusion predicate and the symlink and error-handling switches of the
//! clean step.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use walkdir::{DirEntry, WalkDir};

/// Pause before retrying a failed deletion.
const RETRY_DELAY: Duration = Duration::from_millis(10);

/// Switches for the clean step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanOptions {
    /// Descend into symlinked directories and delete their contents.
    pub follow_symlinks: bool,
    /// Stop at the first failure instead of logging it and carrying on.
    pub fail_on_error: bool,
    /// Retry each failed deletion once before classifying it as a failure.
    pub retry_on_error: bool,
}

impl Default for CleanOptions {
    fn default() -> Self {
        CleanOptions {
            follow_symlinks: false,
            fail_on_error: true,
            retry_on_error: true,
        }
    }
}

/// What a clean removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    /// Files, links and directories deleted.
    pub removed: usize,
    /// Excluded paths left in place.
    pub kept: usize,
    /// Paths that could not be deleted (only when not failing on error).
    pub failed: Vec<PathBuf>,
}

/// Recursive directory deletion.
pub struct Cleaner<'a> {
    options: CleanOptions,
    exclude: Option<Box<dyn Fn(&Path) -> bool + 'a>>,
}

impl<'a> Cleaner<'a> {
    /// Create a cleaner with the given options and no exclusions.
    pub fn new(options: CleanOptions) -> Self {
        Cleaner {
            options,
            exclude: None,
        }
    }

    /// Keep every path for which `predicate` returns true, together with
    /// everything below it and the directories above it.
    pub fn exclude(mut self, predicate: impl Fn(&Path) -> bool + 'a) -> Self {
        self.exclude = Some(Box::new(predicate));
        self
    }

    /// Delete `root` and everything below it. A missing root is not an error.
    /// When `root` is a symlink and symlinks are not followed, only the link
    /// is removed.
    pub fn delete(&self, root: &Path) -> Result<CleanReport> {
        let mut report = CleanReport::default();

        if fs::symlink_metadata(root).is_err() {
            tracing::debug!("nothing to clean at {}", root.display());
            return Ok(report);
        }

        let mut kept_dirs: HashSet<PathBuf> = HashSet::new();
        let mut kept = 0;
        let mut entries: Vec<DirEntry> = Vec::new();

        let walker = WalkDir::new(root)
            .follow_links(self.options.follow_symlinks)
            .follow_root_links(self.options.follow_symlinks)
            .into_iter()
            .filter_entry(|entry| {
                let excluded = entry.depth() > 0 && self.is_excluded(entry.path());
                if excluded {
                    kept += 1;
                    for ancestor in entry.path().ancestors().skip(1) {
                        kept_dirs.insert(ancestor.to_path_buf());
                        if ancestor == root {
                            break;
                        }
                    }
                }
                !excluded
            });

        for entry in walker {
            match entry {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
                    let e = io::Error::from(e);
                    self.failure(&mut report, &path, e)?;
                }
            }
        }
        report.kept = kept;

        // Pre-order reversed: children always come before their parent.
        for entry in entries.iter().rev() {
            let path = entry.path();

            if kept_dirs.contains(path) {
                continue;
            }

            match self.remove_with_retry(entry) {
                Ok(()) => {
                    tracing::debug!("deleted {}", path.display());
                    report.removed += 1;
                }
                Err(e) => self.failure(&mut report, path, e)?,
            }
        }

        Ok(report)
    }

    fn is_excluded(&self, path: &Path) -> bool {
        self.exclude.as_ref().is_some_and(|predicate| predicate(path))
    }

    fn remove_with_retry(&self, entry: &DirEntry) -> io::Result<()> {
        match remove_entry(entry) {
            Err(e) if self.options.retry_on_error => {
                tracing::debug!("retrying deletion of {}: {}", entry.path().display(), e);
                thread::sleep(RETRY_DELAY);
                remove_entry(entry)
            }
            result => result,
        }
    }

    fn failure(&self, report: &mut CleanReport, path: &Path, error: io::Error) -> Result<()> {
        if self.options.fail_on_error {
            return Err(error).with_context(|| format!("failed to delete {}", path.display()));
        }

        tracing::warn!("failed to delete {}: {}", path.display(), error);
        report.failed.push(path.to_path_buf());
        Ok(())
    }
}

fn remove_entry(entry: &DirEntry) -> io::Result<()> {
    let path = entry.path();

    if entry.path_is_symlink() {
        // The link itself, never its target.
        return fs::remove_file(path).or_else(|_| fs::remove_dir(path));
    }

    if entry.file_type().is_dir() {
        fs::remove_dir(path)
    } else {
        fs::remove_file(path)
    }
}
