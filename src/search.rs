//! Search orchestration
//!
//! [`search`] is the pure ranking pass over a pre-fetched snapshot.
//! [`SearchEngine`] pairs it with a [`MetadataSource`] that produces the
//! snapshot, so callers hold one explicitly constructed handle per scope.

use std::cmp::Ordering;

use tracing::{debug, trace};

use crate::error::Result;
use crate::filters::SearchFilters;
use crate::matcher::{self, Classified, MatchOutcome};
use crate::source::MetadataSource;
use crate::types::{FileRecord, ScoredResult};

/// Ranking order: score descending, then most recently modified first
///
/// Files with equal score and equal modification time keep their snapshot
/// order, since the sort is stable.
fn rank_order(a: &ScoredResult, b: &ScoredResult) -> Ordering {
    b.score.total_cmp(&a.score).then_with(|| b.last_modified.cmp(&a.last_modified))
}

/// Rank `snapshot` against `filters` and keep the best `limit` entries
///
/// Pure and infallible. Filters are used as given; see
/// [`SearchFilters::normalized`] and [`SearchFilters::validate`] for the
/// boundary checks [`SearchEngine::search`] applies first.
#[must_use]
pub fn search(
    snapshot: &[FileRecord],
    filters: &SearchFilters,
    limit: usize,
) -> Vec<ScoredResult> {
    let mut results: Vec<ScoredResult> = snapshot
        .iter()
        .filter_map(|file| {
            let classified = Classified::new(file);
            let outcome = matcher::score_classified(&classified, filters);
            if let Some(exclusion) = outcome.exclusion {
                trace!(path = %file.path, %exclusion, "excluded");
                return None;
            }
            trace!(path = %file.path, score = outcome.score, "candidate");
            Some(to_result(&classified, &outcome))
        })
        .collect();

    let matched = results.len();
    results.sort_by(rank_order);
    results.truncate(limit);

    debug!(scanned = snapshot.len(), matched, returned = results.len(), "search finished");
    results
}

fn to_result(classified: &Classified<'_>, outcome: &MatchOutcome) -> ScoredResult {
    let file = classified.file;
    ScoredResult {
        name:          file.name.clone(),
        path:          file.path.clone(),
        folder:        classified.folder.to_string(),
        extension:     classified.extension.clone(),
        category:      classified.category,
        size:          file.size,
        content_type:  file.content_type.clone(),
        last_modified: file.last_modified,
        score:         outcome.score,
        reason:        outcome.reason(),
    }
}

/// Search handle bound to one metadata source
#[derive(Debug)]
pub struct SearchEngine<S> {
    /// Where snapshots come from
    source: S,
}

impl<S: MetadataSource> SearchEngine<S> {
    /// Creates an engine over `source`
    #[must_use = "SearchEngine must be used to run searches"]
    pub const fn new(source: S) -> Self {
        Self { source }
    }

    /// The underlying metadata source
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Fetch a complete snapshot from the source
    ///
    /// # Errors
    /// Returns error if the source cannot be listed.
    pub fn snapshot(&self) -> Result<Vec<FileRecord>> {
        self.source.list()
    }

    /// Normalize and validate `filters`, fetch a snapshot, and rank it
    ///
    /// # Errors
    /// Returns error if:
    /// - Filters contain an inverted size or date range
    /// - The source cannot be listed
    pub fn search(&self, filters: &SearchFilters, limit: usize) -> Result<Vec<ScoredResult>> {
        let filters = filters.normalized();
        filters.validate()?;
        let snapshot = self.snapshot()?;
        Ok(search(&snapshot, &filters, limit))
    }

    /// Score the snapshot entry at `path`, or `None` if there is none
    ///
    /// # Errors
    /// Returns error if:
    /// - Filters contain an inverted size or date range
    /// - The source cannot be listed
    pub fn score(
        &self,
        path: &str,
        filters: &SearchFilters,
    ) -> Result<Option<(FileRecord, MatchOutcome)>> {
        let filters = filters.normalized();
        filters.validate()?;
        let found = self.snapshot()?.into_iter().find(|file| file.path == path);
        Ok(found.map(|file| {
            let outcome = matcher::score(&file, &filters);
            (file, outcome)
        }))
    }
}
