//! `SnapRank` - Ranks file metadata against structured search filters.
//!
//! The core is two operations: [`score`] decides whether one file survives a
//! filter set and explains why, and [`search`] runs it over a whole snapshot,
//! sorts by score then recency, and truncates to a limit. Both are pure.
//! Everything that touches storage sits behind [`MetadataSource`].

#![deny(
    missing_debug_implementations,
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo
)]

pub mod category;
pub mod config;
pub mod crawler;
pub mod error;
pub mod filters;
pub mod fuzzy;
pub mod matcher;
pub mod search;
pub mod source;
pub mod types;

pub use error::{Error, Result};
pub use filters::SearchFilters;
pub use matcher::{MatchOutcome, score};
pub use search::{SearchEngine, search};
pub use source::MetadataSource;
pub use types::{FileRecord, ScoredResult};
