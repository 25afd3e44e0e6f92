//! Directory crawler producing metadata snapshots
//!
//! Walks a local directory breadth-first within fixed bounds and turns every
//! regular file into a [`FileRecord`] whose path is relative to the root.

use std::collections::VecDeque;
use std::fs::{self, DirEntry};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::{debug, trace, warn};

use crate::config::ScanConfig;
use crate::error::{Error, Result};
use crate::source::{MetadataSource, SNAPSHOT_FILE_NAME, is_folder_marker};
use crate::types::FileRecord;

/// Maximum path length in bytes
pub const MAX_PATH_LENGTH: usize = 4_096;

/// Compile exclude patterns, matched against root-relative paths
fn compile_excludes(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| Error::pattern(&format!("{pattern}: {e}")))?;
        builder.add(glob);
    }
    builder.build().map_err(|e| Error::pattern(&e.to_string()))
}

/// Directory crawler that enforces depth, file count and path length bounds
#[derive(Debug)]
pub struct Crawler {
    /// Root every record path is relative to
    root:       PathBuf,
    /// Queue of directories to process with their depths
    queue:      VecDeque<(PathBuf, usize)>,
    /// Paths to leave out
    exclude:    GlobSet,
    /// Deepest directory level allowed below the root
    max_depth:  usize,
    /// Largest number of files allowed
    max_files:  usize,
    /// Number of files recorded
    file_count: usize,
    /// Total number of directories discovered
    dir_count:  usize,
}

impl Crawler {
    /// Create a new crawler starting at `root`
    ///
    /// # Errors
    /// Returns error if:
    /// - `root` is not a directory
    /// - Path length exceeds `MAX_PATH_LENGTH`
    /// - An exclude pattern is invalid
    pub fn new(root: &Path, config: &ScanConfig) -> Result<Self> {
        Self::validate_path(root)?;
        if !root.is_dir() {
            return Err(Error::snapshot(&format!("Not a directory: {}", root.display())));
        }

        let mut queue = VecDeque::new();
        queue.push_back((root.to_path_buf(), 0));

        Ok(Self {
            root: root.to_path_buf(),
            queue,
            exclude: compile_excludes(&config.exclude)?,
            max_depth: config.max_depth,
            max_files: config.max_files,
            file_count: 0,
            dir_count: 1,
        })
    }

    /// Get the current progress of the crawl
    ///
    /// Returns a tuple of:
    /// - Number of files recorded so far
    /// - Maximum number of files allowed
    /// - Number of directories discovered
    #[must_use = "Progress information should be used for monitoring"]
    pub const fn progress(&self) -> (usize, usize, usize) {
        (self.file_count, self.max_files, self.dir_count)
    }

    /// Process the next directory in the queue
    ///
    /// Unreadable subdirectories and entries are logged and skipped.
    ///
    /// # Errors
    /// Returns error if:
    /// - The root directory cannot be read
    /// - File count exceeds the configured maximum
    /// - Directory depth exceeds the configured maximum
    /// - A path exceeds `MAX_PATH_LENGTH`
    pub fn process_next(&mut self) -> Result<Option<Vec<FileRecord>>> {
        let Some((dir, depth)) = self.queue.pop_front() else {
            return Ok(None);
        };

        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if depth == 0 => return Err(e.into()),
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "skipping unreadable directory");
                return Ok(Some(Vec::new()));
            },
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "skipping unreadable entry");
                    continue;
                },
            };
            let path = entry.path();
            Self::validate_path(&path)?;

            let relative = self.relative(&path);
            if self.exclude.is_match(&relative) {
                trace!(path = %relative, "excluded by pattern");
                continue;
            }

            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(e) => {
                    warn!(path = %relative, error = %e, "skipping entry without file type");
                    continue;
                },
            };

            if file_type.is_dir() {
                let new_depth = depth + 1;
                if new_depth > self.max_depth {
                    return Err(Error::DepthExceeded(self.max_depth));
                }
                self.queue.push_back((path, new_depth));
                self.dir_count += 1;
            } else if file_type.is_file() {
                let name = entry.file_name();
                let name = name.to_string_lossy();
                if is_folder_marker(&name) || name == SNAPSHOT_FILE_NAME {
                    continue;
                }
                if self.file_count >= self.max_files {
                    return Err(Error::FileCountExceeded(self.max_files));
                }
                match Self::record(&entry, &relative) {
                    Ok(record) => {
                        files.push(record);
                        self.file_count += 1;
                    },
                    Err(e) => warn!(path = %relative, error = %e, "skipping unreadable file"),
                }
            } else {
                trace!(path = %relative, "skipping non-regular file");
            }
        }

        Ok(Some(files))
    }

    /// Forward-slash path of `path` relative to the root
    fn relative(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Build a record from a directory entry
    fn record(entry: &DirEntry, relative: &str) -> Result<FileRecord> {
        let metadata = entry.metadata()?;
        let modified = metadata.modified().map_or_else(|_| Utc::now(), DateTime::<Utc>::from);
        Ok(FileRecord::from_path(relative, metadata.len(), modified))
    }

    /// Validate a path against constraints
    fn validate_path(path: &Path) -> Result<()> {
        if path.as_os_str().len() > MAX_PATH_LENGTH {
            return Err(Error::PathTooLong(MAX_PATH_LENGTH));
        }
        Ok(())
    }
}

/// Metadata source backed by a local directory tree
#[derive(Debug, Clone)]
pub struct DirectorySource {
    /// Directory to walk
    root:   PathBuf,
    /// Walk bounds and exclusions
    config: ScanConfig,
}

impl DirectorySource {
    /// Source over `root` with the given scan settings
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, config: ScanConfig) -> Self {
        Self { root: root.into(), config }
    }

    /// Directory being walked
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl MetadataSource for DirectorySource {
    fn list(&self) -> Result<Vec<FileRecord>> {
        let mut crawler = Crawler::new(&self.root, &self.config)?;
        let mut records = Vec::new();
        while let Some(batch) = crawler.process_next()? {
            records.extend(batch);
        }

        let (files, _, dirs) = crawler.progress();
        debug!(root = %self.root.display(), files, dirs, "directory listed");
        Ok(records)
    }
}
