//! Common types and constants for `SnapRank`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::category::{self, Category};

/// Result limit for generic search flows
pub const DEFAULT_LIMIT: usize = 10;

/// Result limit for flows that go on to read the matched documents
pub const CONTENT_QUESTION_LIMIT: usize = 5;

/// Reason attached to files included without any positive contribution
pub const LISTED_ALL_REASON: &str = "Listed all files";

/// Content type assumed when the storage layer does not report one
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Separator between reason fragments
pub const REASON_SEPARATOR: &str = "; ";

/// Metadata of one stored file, as listed by the storage layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    /// Final path segment
    pub name:          String,
    /// Forward-slash path relative to the owner's namespace
    pub path:          String,
    /// Size in bytes
    pub size:          u64,
    /// MIME-like content type
    #[serde(default = "default_content_type")]
    pub content_type:  String,
    /// Time of the last write
    pub last_modified: DateTime<Utc>,
}

fn default_content_type() -> String {
    DEFAULT_CONTENT_TYPE.to_string()
}

impl FileRecord {
    /// Build a record from its path, guessing the content type from the extension
    #[must_use]
    pub fn from_path(path: &str, size: u64, last_modified: DateTime<Utc>) -> Self {
        let name = category::name_of(path);
        let content_type = mime_guess::from_path(name)
            .first_raw()
            .map_or_else(default_content_type, str::to_string);

        Self {
            name: name.to_string(),
            path: path.to_string(),
            size,
            content_type,
            last_modified,
        }
    }
}

/// A ranked file with its relevance score and explanation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredResult {
    /// Final path segment
    pub name:          String,
    /// Full path
    pub path:          String,
    /// Path without the file name, or `/` at the root
    pub folder:        String,
    /// Lowercase extension without the dot
    pub extension:     String,
    /// Category derived from the extension
    pub category:      Category,
    /// Size in bytes
    pub size:          u64,
    /// MIME-like content type
    pub content_type:  String,
    /// Time of the last write
    pub last_modified: DateTime<Utc>,
    /// Relevance score (0.0 to 1.0)
    pub score:         f32,
    /// Semicolon-joined explanations
    pub reason:        String,
}
