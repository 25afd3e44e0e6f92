//! Error types for `SnapRank`
//!
//! The ranking core itself never fails; these errors come from the edges
//! around it: decoding filters, reading snapshots, walking directories and
//! loading configuration.

use arrayvec::ArrayString;
use thiserror::Error;

/// Maximum length of error messages
pub const MAX_ERROR_LENGTH: usize = 256;

/// Custom result type for `SnapRank` operations
pub type Result<T> = std::result::Result<T, Error>;

/// Fixed-size message buffer carried by the free-form variants
pub type Message = Box<ArrayString<MAX_ERROR_LENGTH>>;

/// Error types for `SnapRank`
#[derive(Debug, Error)]
pub enum Error {
    /// IO operation failed
    #[error("Error: {0}")]
    Io(#[from] std::io::Error),

    /// Search filters could not be decoded or are inconsistent
    #[error("Error: Invalid filter: {0}")]
    InvalidFilter(Message),

    /// Metadata snapshot could not be read or written
    #[error("Error: Snapshot: {0}")]
    Snapshot(Message),

    /// Configuration file could not be loaded
    #[error("Error: Config: {0}")]
    Config(Message),

    /// Exclude pattern failed to compile
    #[error("Error: Invalid pattern: {0}")]
    Pattern(Message),

    /// Directory depth exceeded the configured limit
    #[error("Error: Maximum directory depth of {0} exceeded")]
    DepthExceeded(usize),

    /// File count exceeded the configured limit
    #[error("Error: Maximum file count of {0} exceeded")]
    FileCountExceeded(usize),

    /// Path length exceeded the maximum limit
    #[error("Error: Path length exceeded {0} characters")]
    PathTooLong(usize),
}

/// Copy `msg` into a bounded buffer, cutting at a char boundary when too long
fn bounded(msg: &str) -> Message {
    let mut buf = ArrayString::new();
    for ch in msg.chars() {
        if buf.try_push(ch).is_err() {
            break;
        }
    }
    Box::new(buf)
}

impl Error {
    /// Create a new invalid filter error
    pub fn invalid_filter(msg: &str) -> Self {
        Self::InvalidFilter(bounded(msg))
    }

    /// Create a new snapshot error
    pub fn snapshot(msg: &str) -> Self {
        Self::Snapshot(bounded(msg))
    }

    /// Create a new config error
    pub fn config(msg: &str) -> Self {
        Self::Config(bounded(msg))
    }

    /// Create a new pattern error
    pub fn pattern(msg: &str) -> Self {
        Self::Pattern(bounded(msg))
    }

    /// Get a user-friendly error message with action items
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Io(e) => format!("Error: {e}\nTip: Check file permissions and try again"),
            Self::InvalidFilter(msg) => format!(
                "Error: Invalid filter: {msg}\nTip: Dates must look like 2024-06-01 or \
                 2024-06-01T00:00:00Z and ranges must not be inverted"
            ),
            Self::Snapshot(msg) => {
                if msg.contains("No snapshot found") {
                    msg.to_string()
                } else {
                    format!(
                        "Error: Snapshot: {msg}\nTip: Re-run 'snaprank index' to rebuild the \
                         snapshot"
                    )
                }
            },
            Self::Config(msg) => {
                format!("Error: Config: {msg}\nTip: Check the TOML syntax of your config file")
            },
            Self::Pattern(msg) => format!(
                "Error: Invalid pattern: {msg}\nTip: Exclude patterns use glob syntax such as \
                 **/target/**"
            ),
            Self::DepthExceeded(limit) => format!(
                "Error: Directory structure too deep (max {limit} levels)\nTip: Try indexing a \
                 shallower directory"
            ),
            Self::FileCountExceeded(limit) => format!(
                "Error: Too many files (max {limit})\nTip: Try indexing a smaller directory or \
                 raise scan.max_files"
            ),
            Self::PathTooLong(limit) => format!(
                "Error: Path too long (max {limit} characters)\nTip: Try moving files to a \
                 shorter path"
            ),
        }
    }
}
