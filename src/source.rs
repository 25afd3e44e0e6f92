//! Metadata sources
//!
//! A source produces the complete, flat snapshot of one scope that a search
//! runs over. Folder markers never reach the snapshot.

use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};
use crate::types::FileRecord;

/// Suffix of the placeholder objects that mark empty folders
pub const FOLDER_MARKER_SUFFIX: &str = ".folder";

/// Snapshot file written into an indexed directory
pub const SNAPSHOT_FILE_NAME: &str = ".snaprank_snapshot.json";

/// Anything that can list every file of a scope
pub trait MetadataSource {
    /// List the full snapshot, without folder markers
    ///
    /// # Errors
    /// Returns error if the underlying storage cannot be read.
    fn list(&self) -> Result<Vec<FileRecord>>;
}

impl<T: MetadataSource + ?Sized> MetadataSource for &T {
    fn list(&self) -> Result<Vec<FileRecord>> {
        (**self).list()
    }
}

/// True for folder markers and nameless entries
#[must_use]
pub fn is_folder_marker(name: &str) -> bool {
    name.is_empty() || name.ends_with(FOLDER_MARKER_SUFFIX)
}

/// Snapshot held in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    /// Listed files
    files: Vec<FileRecord>,
}

impl MemorySource {
    /// Wrap an existing listing
    #[must_use]
    pub const fn new(files: Vec<FileRecord>) -> Self {
        Self { files }
    }
}

impl MetadataSource for MemorySource {
    fn list(&self) -> Result<Vec<FileRecord>> {
        Ok(self.files.iter().filter(|file| !is_folder_marker(&file.name)).cloned().collect())
    }
}

/// Snapshot stored on disk as a JSON array of records
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    /// Location of the JSON file
    path: PathBuf,
}

impl SnapshotFile {
    /// Refer to the snapshot at `path`; nothing is read yet
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Refer to the snapshot kept inside the indexed directory `dir`
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(SNAPSHOT_FILE_NAME))
    }

    /// Location of the JSON file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record in the file
    ///
    /// # Errors
    /// Returns error if:
    /// - The file does not exist
    /// - The file is not a JSON array of records
    pub fn load(&self) -> Result<Vec<FileRecord>> {
        let file = File::open(&self.path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                Error::snapshot(&format!(
                    "No snapshot found at {}. Run 'snaprank index' first.",
                    self.path.display()
                ))
            } else {
                Error::Io(e)
            }
        })?;

        let records: Vec<FileRecord> = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| Error::snapshot(&format!("Failed to parse snapshot: {e}")))?;
        debug!(path = %self.path.display(), records = records.len(), "snapshot loaded");
        Ok(records)
    }

    /// Replace the file with `records`
    ///
    /// # Errors
    /// Returns error if the file cannot be created or written.
    pub fn save(&self, records: &[FileRecord]) -> Result<()> {
        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, records)
            .map_err(|e| Error::snapshot(&format!("Failed to write snapshot: {e}")))?;
        writer.flush()?;
        debug!(path = %self.path.display(), records = records.len(), "snapshot saved");
        Ok(())
    }
}

impl MetadataSource for SnapshotFile {
    fn list(&self) -> Result<Vec<FileRecord>> {
        let mut records = self.load()?;
        records.retain(|file| !is_folder_marker(&file.name));
        Ok(records)
    }
}
