//! Per-file matching and scoring
//!
//! Dimensions are evaluated in a fixed order: keywords, extensions, content
//! types, folders, size range, date range. The order fixes the order of the
//! reason fragments; the score itself is a plain sum of contributions,
//! capped at 1.

use std::fmt;

use crate::category::{self, Category};
use crate::filters::SearchFilters;
use crate::fuzzy;
use crate::types::{FileRecord, LISTED_ALL_REASON, REASON_SEPARATOR};

/// Keyword found in the file name
pub const NAME_WEIGHT: f32 = 0.40;
/// Keyword found elsewhere in the path
pub const PATH_WEIGHT: f32 = 0.25;
/// Keyword names the file's category
pub const CATEGORY_WEIGHT: f32 = 0.30;
/// Keyword equals the file's extension
pub const EXTENSION_KEYWORD_WEIGHT: f32 = 0.35;
/// Multiplier applied to fuzzy similarity
pub const SIMILARITY_WEIGHT: f32 = 0.30;
/// Similarity must exceed this to count
pub const SIMILARITY_THRESHOLD: f32 = 0.30;
/// Extension filter matched
pub const EXTENSION_FILTER_WEIGHT: f32 = 0.30;
/// Content type filter matched
pub const CONTENT_TYPE_WEIGHT: f32 = 0.20;
/// Folder filter matched
pub const FOLDER_WEIGHT: f32 = 0.15;

/// Stem tokens shorter than this are not compared for similarity
pub const MIN_TOKEN_LEN: usize = 3;

/// Hard filter that removed a file, or lack of relevance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    /// Extension not in the extension filter
    Extension,
    /// Neither content type nor category in the content type filter
    ContentType,
    /// Smaller than `minSize`
    TooSmall,
    /// Larger than `maxSize`
    TooLarge,
    /// Modified before `modifiedAfter`
    TooOld,
    /// Modified after `modifiedBefore`
    TooNew,
    /// Passed every hard filter but nothing contributed to the score
    NotRelevant,
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Extension => "extension not in filter",
            Self::ContentType => "content type not in filter",
            Self::TooSmall => "smaller than minimum size",
            Self::TooLarge => "larger than maximum size",
            Self::TooOld => "modified before the requested range",
            Self::TooNew => "modified after the requested range",
            Self::NotRelevant => "no filter contributed to the score",
        })
    }
}

/// Outcome of scoring one file against one filter set
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    /// Why the file was left out, `None` when included
    pub exclusion: Option<Exclusion>,
    /// Accumulated score capped at 1, zero when excluded
    pub score:     f32,
    /// Reason fragments in discovery order, empty when excluded
    pub reasons:   Vec<String>,
}

impl MatchOutcome {
    const fn excluded(exclusion: Exclusion) -> Self {
        Self { exclusion: Some(exclusion), score: 0.0, reasons: Vec::new() }
    }

    /// Whether the file belongs in the candidate set
    #[must_use]
    pub const fn included(&self) -> bool {
        self.exclusion.is_none()
    }

    /// Reasons joined with `"; "`, or the list-all default when there are none
    #[must_use]
    pub fn reason(&self) -> String {
        if self.reasons.is_empty() {
            LISTED_ALL_REASON.to_string()
        } else {
            self.reasons.join(REASON_SEPARATOR)
        }
    }
}

/// A file together with the attributes derived from its name and path
#[derive(Debug)]
pub(crate) struct Classified<'a> {
    pub(crate) file:       &'a FileRecord,
    pub(crate) extension:  String,
    pub(crate) category:   Category,
    pub(crate) folder:     &'a str,
    name_lower:            String,
    path_lower:            String,
    stem_tokens:           Vec<String>,
}

impl<'a> Classified<'a> {
    pub(crate) fn new(file: &'a FileRecord) -> Self {
        let (extension, category) = category::classify(&file.name);
        let name_lower = file.name.to_lowercase();
        let stem = name_lower.rsplit_once('.').map_or(name_lower.as_str(), |(stem, _)| stem);
        let stem_tokens = stem
            .split(|c: char| !c.is_alphanumeric())
            .filter(|token| token.chars().count() >= MIN_TOKEN_LEN)
            .map(str::to_string)
            .collect();

        Self {
            file,
            extension,
            category,
            folder: category::folder_of(&file.path),
            path_lower: file.path.to_lowercase(),
            name_lower,
            stem_tokens,
        }
    }

    /// Similarity of `keyword` to the full name
    ///
    /// Below the threshold, stem tokens are tried as misspelling targets with
    /// the plain bigram index. A token that contains the keyword or is
    /// contained in it is a different word, not a misspelling, and is skipped.
    fn similarity(&self, keyword: &str) -> f32 {
        let full = fuzzy::similarity(&self.name_lower, keyword);
        if full > SIMILARITY_THRESHOLD {
            return full;
        }
        self.stem_tokens
            .iter()
            .filter(|token| !token.contains(keyword) && !keyword.contains(token.as_str()))
            .map(|token| fuzzy::jaccard(token, keyword))
            .fold(full, f32::max)
    }
}

/// Which keyword rule fired
#[derive(Debug, Clone, Copy, PartialEq)]
enum KeywordHit {
    Name,
    Path,
    Category(Category),
    Extension,
    Similar(f32),
}

/// A keyword rule: returns a hit when it applies to the lowercase keyword
type KeywordRule = fn(&Classified<'_>, &str) -> Option<KeywordHit>;

/// Keyword rules in priority order; the first hit wins
const KEYWORD_RULES: [KeywordRule; 5] = [
    |file, kw| file.name_lower.contains(kw).then_some(KeywordHit::Name),
    |file, kw| file.path_lower.contains(kw).then_some(KeywordHit::Path),
    |file, kw| {
        file.category.as_str().contains(kw).then_some(KeywordHit::Category(file.category))
    },
    |file, kw| (file.extension == kw).then_some(KeywordHit::Extension),
    |file, kw| {
        let similarity = file.similarity(kw);
        (similarity > SIMILARITY_THRESHOLD).then_some(KeywordHit::Similar(similarity))
    },
];

impl KeywordHit {
    fn weight(self) -> f32 {
        match self {
            Self::Name => NAME_WEIGHT,
            Self::Path => PATH_WEIGHT,
            Self::Category(_) => CATEGORY_WEIGHT,
            Self::Extension => EXTENSION_KEYWORD_WEIGHT,
            Self::Similar(similarity) => similarity * SIMILARITY_WEIGHT,
        }
    }

    fn reason(self, keyword: &str, extension: &str) -> String {
        match self {
            Self::Name => format!("Name contains \"{keyword}\""),
            Self::Path => format!("Path contains \"{keyword}\""),
            Self::Category(category) => format!("File type is {category}"),
            Self::Extension => format!("Extension is .{extension}"),
            Self::Similar(similarity) => {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let percent = (similarity * 100.0).round() as u32;
                format!("Similar to \"{keyword}\" ({percent}%)")
            },
        }
    }
}

/// Score one file against `filters`
///
/// Never fails: filters are assumed to be validated already.
#[must_use]
pub fn score(file: &FileRecord, filters: &SearchFilters) -> MatchOutcome {
    score_classified(&Classified::new(file), filters)
}

pub(crate) fn score_classified(file: &Classified<'_>, filters: &SearchFilters) -> MatchOutcome {
    let mut score = 0.0_f32;
    let mut reasons = Vec::new();

    for keyword in &filters.keywords {
        if keyword.is_empty() {
            continue;
        }
        let lowered = keyword.to_lowercase();
        if let Some(hit) = KEYWORD_RULES.iter().find_map(|rule| rule(file, &lowered)) {
            score += hit.weight();
            reasons.push(hit.reason(keyword, &file.extension));
        }
    }

    if !filters.extensions.is_empty() {
        let matched = filters
            .extensions
            .iter()
            .any(|ext| ext.trim_start_matches('.').eq_ignore_ascii_case(&file.extension));
        if !matched {
            return MatchOutcome::excluded(Exclusion::Extension);
        }
        score += EXTENSION_FILTER_WEIGHT;
        reasons.push(format!("Extension .{} matches", file.extension));
    }

    if !filters.content_types.is_empty() {
        let content_type = file.file.content_type.to_lowercase();
        let matched = filters.content_types.iter().any(|wanted| {
            let wanted = wanted.to_lowercase();
            content_type.contains(&wanted) || file.category.as_str() == wanted
        });
        if !matched {
            return MatchOutcome::excluded(Exclusion::ContentType);
        }
        score += CONTENT_TYPE_WEIGHT;
        reasons.push("Content type matches".to_string());
    }

    if !filters.folders.is_empty() {
        let folder = file.folder.to_lowercase();
        if filters.folders.iter().any(|wanted| folder.contains(&wanted.to_lowercase())) {
            score += FOLDER_WEIGHT;
            reasons.push("In matching folder".to_string());
        }
    }

    let size = file.file.size;
    if filters.min_size.is_some_and(|min| size < min) {
        return MatchOutcome::excluded(Exclusion::TooSmall);
    }
    if filters.max_size.is_some_and(|max| size > max) {
        return MatchOutcome::excluded(Exclusion::TooLarge);
    }

    let modified = file.file.last_modified;
    if filters.modified_after.is_some_and(|after| modified < after) {
        return MatchOutcome::excluded(Exclusion::TooOld);
    }
    if filters.modified_before.is_some_and(|before| modified > before) {
        return MatchOutcome::excluded(Exclusion::TooNew);
    }

    if score <= 0.0 && !filters.is_unconstrained() {
        return MatchOutcome::excluded(Exclusion::NotRelevant);
    }

    MatchOutcome { exclusion: None, score: score.min(1.0), reasons }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn record(path: &str, size: u64, content_type: &str) -> FileRecord {
        FileRecord {
            name: category::name_of(path).to_string(),
            path: path.to_string(),
            size,
            content_type: content_type.to_string(),
            last_modified: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
        }
    }

    fn keywords(words: &[&str]) -> SearchFilters {
        SearchFilters {
            keywords: words.iter().map(|w| (*w).to_string()).collect(),
            ..SearchFilters::default()
        }
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_name_match() {
        let file = record("docs/Report.pdf", 10, "application/pdf");
        let outcome = score(&file, &keywords(&["REPORT"]));
        assert!(outcome.included());
        assert!(close(outcome.score, NAME_WEIGHT));
        assert_eq!(outcome.reason(), "Name contains \"REPORT\"");
    }

    #[test]
    fn test_path_match() {
        let file = record("finance/2024/summary.pdf", 10, "application/pdf");
        let outcome = score(&file, &keywords(&["finance"]));
        assert!(close(outcome.score, PATH_WEIGHT));
        assert_eq!(outcome.reasons, vec!["Path contains \"finance\""]);
    }

    #[test]
    fn test_category_match() {
        let file = record("holiday.jpg", 10, "image/jpeg");
        let outcome = score(&file, &keywords(&["image"]));
        assert!(close(outcome.score, CATEGORY_WEIGHT));
        assert_eq!(outcome.reasons, vec!["File type is image"]);
    }

    #[test]
    fn test_category_substring_match() {
        let file = record("deck.pptx", 10, DEFAULT);
        let outcome = score(&file, &keywords(&["present"]));
        assert_eq!(outcome.reasons, vec!["File type is presentation"]);
    }

    const DEFAULT: &str = crate::types::DEFAULT_CONTENT_TYPE;

    #[test]
    fn test_extension_rule_is_shadowed_by_name() {
        // The lowercase name always ends with the extension, so the name rule
        // answers first.
        let file = record("src/main.rs", 10, DEFAULT);
        let outcome = score(&file, &keywords(&["rs"]));
        assert!(close(outcome.score, NAME_WEIGHT));
        assert_eq!(outcome.reasons, vec!["Name contains \"rs\""]);

        let classified = Classified::new(&file);
        let hit = KEYWORD_RULES[3](&classified, "rs");
        assert_eq!(hit, Some(KeywordHit::Extension));
        assert!(close(KeywordHit::Extension.weight(), EXTENSION_KEYWORD_WEIGHT));
        assert_eq!(KeywordHit::Extension.reason("rs", "rs"), "Extension is .rs");
    }

    #[test]
    fn test_name_beats_path() {
        let file = record("report/report.pdf", 10, "application/pdf");
        let outcome = score(&file, &keywords(&["report"]));
        assert_eq!(outcome.reasons.len(), 1);
        assert!(close(outcome.score, NAME_WEIGHT));
    }

    #[test]
    fn test_each_keyword_contributes() {
        let file = record("finance/invoice.pdf", 10, "application/pdf");
        let outcome = score(&file, &keywords(&["invoice", "finance", "document"]));
        assert!(close(outcome.score, NAME_WEIGHT + PATH_WEIGHT + CATEGORY_WEIGHT));
        assert_eq!(
            outcome.reason(),
            "Name contains \"invoice\"; Path contains \"finance\"; File type is document"
        );
    }

    #[test]
    fn test_fuzzy_match_on_stem_token() {
        let file = record("invoice_final.docx", 10, DEFAULT);
        let outcome = score(&file, &keywords(&["invioce"]));
        assert!(outcome.included());
        assert!(close(outcome.score, 3.0 / 9.0 * SIMILARITY_WEIGHT));
        assert_eq!(outcome.reasons, vec!["Similar to \"invioce\" (33%)"]);
    }

    #[test]
    fn test_fuzzy_prefers_full_name() {
        // 5 shared bigrams of 16 against the full name
        let file = record("q3_report_v2.pdf", 10, DEFAULT);
        let outcome = score(&file, &keywords(&["reports"]));
        assert!(close(outcome.score, 5.0 / 16.0 * SIMILARITY_WEIGHT));
        assert_eq!(outcome.reasons, vec!["Similar to \"reports\" (31%)"]);
    }

    #[test]
    fn test_suffixed_keyword_is_not_a_misspelling() {
        // 4 shared bigrams of 17 against the full name; the "final" token
        // is contained in the keyword and does not count.
        let file = record("invoice_final.docx", 10, DEFAULT);
        let outcome = score(&file, &keywords(&["finals"]));
        assert_eq!(outcome.exclusion, Some(Exclusion::NotRelevant));
    }

    #[test]
    fn test_fuzzy_never_outranks_path() {
        let file = record("reports/q3_report_v2.pdf", 10, DEFAULT);
        let classified = Classified::new(&file);
        assert!(classified.similarity("reports") * SIMILARITY_WEIGHT < PATH_WEIGHT);
        assert_eq!(score(&file, &keywords(&["reports"])).reasons, vec![
            "Path contains \"reports\""
        ]);
    }

    #[test]
    fn test_similarity_threshold_is_strict() {
        // {ab, bc, cd} against 10 name bigrams: exactly 3 of 10
        let file = record("ab_bc_cd.zz", 10, DEFAULT);
        assert!(close(fuzzy::similarity("ab_bc_cd.zz", "abcd"), SIMILARITY_THRESHOLD));
        let outcome = score(&file, &keywords(&["abcd"]));
        assert_eq!(outcome.exclusion, Some(Exclusion::NotRelevant));
        assert!(outcome.reasons.is_empty());
    }

    #[test]
    fn test_short_tokens_ignored_for_similarity() {
        let file = record("a_b.txt", 10, DEFAULT);
        let outcome = score(&file, &keywords(&["cat"]));
        assert_eq!(outcome.exclusion, Some(Exclusion::NotRelevant));
    }

    #[test]
    fn test_no_keyword_hit_is_not_relevant() {
        let file = record("holiday.jpg", 10, "image/jpeg");
        let outcome = score(&file, &keywords(&["spreadsheet"]));
        assert_eq!(outcome.exclusion, Some(Exclusion::NotRelevant));
        assert_eq!(outcome.score, 0.0);
    }

    #[test]
    fn test_extension_filter() {
        let filters =
            SearchFilters { extensions: vec!["pdf".to_string()], ..SearchFilters::default() };
        let pdf = score(&record("a.PDF", 1, "application/pdf"), &filters);
        assert!(close(pdf.score, EXTENSION_FILTER_WEIGHT));
        assert_eq!(pdf.reasons, vec!["Extension .pdf matches"]);

        let docx = score(&record("report.docx", 1, DEFAULT), &filters);
        assert_eq!(docx.exclusion, Some(Exclusion::Extension));
    }

    #[test]
    fn test_extension_filter_overrides_keyword_score() {
        let filters = SearchFilters {
            keywords: vec!["report".to_string()],
            extensions: vec!["pdf".to_string()],
            ..SearchFilters::default()
        };
        let outcome = score(&record("report.docx", 1, DEFAULT), &filters);
        assert!(!outcome.included());
        assert!(outcome.reasons.is_empty());
    }

    #[test]
    fn test_content_type_filter_by_mime() {
        let filters =
            SearchFilters { content_types: vec!["image/".to_string()], ..SearchFilters::default() };
        let outcome = score(&record("scan.heic", 1, "image/heic"), &filters);
        assert!(close(outcome.score, CONTENT_TYPE_WEIGHT));
        assert_eq!(outcome.reasons, vec!["Content type matches"]);
    }

    #[test]
    fn test_content_type_filter_by_category() {
        let filters =
            SearchFilters { content_types: vec!["Video".to_string()], ..SearchFilters::default() };
        assert!(score(&record("clip.mkv", 1, DEFAULT), &filters).included());
        assert_eq!(
            score(&record("song.mp3", 1, "audio/mpeg"), &filters).exclusion,
            Some(Exclusion::ContentType)
        );
    }

    #[test]
    fn test_folder_filter_is_soft() {
        let filters = SearchFilters {
            keywords: vec!["report".to_string()],
            folders: vec!["Work".to_string()],
            ..SearchFilters::default()
        };
        let inside = score(&record("work/q1/report.pdf", 1, DEFAULT), &filters);
        assert!(close(inside.score, NAME_WEIGHT + FOLDER_WEIGHT));
        assert_eq!(inside.reason(), "Name contains \"report\"; In matching folder");

        let outside = score(&record("home/report.pdf", 1, DEFAULT), &filters);
        assert!(outside.included());
        assert!(close(outside.score, NAME_WEIGHT));
    }

    #[test]
    fn test_folder_filter_matches_root() {
        let filters = SearchFilters { folders: vec!["/".to_string()], ..SearchFilters::default() };
        assert!(score(&record("top.txt", 1, DEFAULT), &filters).included());
    }

    #[test]
    fn test_size_range() {
        let filters = SearchFilters {
            keywords: vec!["clip".to_string()],
            min_size: Some(100),
            max_size: Some(200),
            ..SearchFilters::default()
        };
        assert_eq!(
            score(&record("clip.mp4", 99, DEFAULT), &filters).exclusion,
            Some(Exclusion::TooSmall)
        );
        assert_eq!(
            score(&record("clip.mp4", 201, DEFAULT), &filters).exclusion,
            Some(Exclusion::TooLarge)
        );
        assert!(score(&record("clip.mp4", 100, DEFAULT), &filters).included());
        assert!(score(&record("clip.mp4", 200, DEFAULT), &filters).included());
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let filters = SearchFilters {
            keywords: vec!["notes".to_string()],
            modified_after: Some(at),
            modified_before: Some(at),
            ..SearchFilters::default()
        };
        assert!(score(&record("notes.md", 1, DEFAULT), &filters).included());

        let later = SearchFilters {
            modified_after: Some(Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap()),
            ..filters.clone()
        };
        assert_eq!(
            score(&record("notes.md", 1, DEFAULT), &later).exclusion,
            Some(Exclusion::TooOld)
        );

        let earlier = SearchFilters {
            modified_after: None,
            modified_before: Some(Utc.with_ymd_and_hms(2024, 5, 31, 0, 0, 0).unwrap()),
            ..filters
        };
        assert_eq!(
            score(&record("notes.md", 1, DEFAULT), &earlier).exclusion,
            Some(Exclusion::TooNew)
        );
    }

    #[test]
    fn test_hard_only_filters_need_relevance() {
        let filters = SearchFilters { max_size: Some(1_000), ..SearchFilters::default() };
        let outcome = score(&record("tiny.txt", 1, DEFAULT), &filters);
        assert_eq!(outcome.exclusion, Some(Exclusion::NotRelevant));
    }

    #[test]
    fn test_empty_filters_list_everything() {
        let outcome = score(&record("anything.bin", 1, DEFAULT), &SearchFilters::default());
        assert!(outcome.included());
        assert_eq!(outcome.score, 0.0);
        assert_eq!(outcome.reason(), LISTED_ALL_REASON);
    }

    #[test]
    fn test_blank_keyword_is_skipped() {
        let outcome = score(&record("x.pdf", 1, DEFAULT), &keywords(&[""]));
        assert_eq!(outcome.exclusion, Some(Exclusion::NotRelevant));
    }

    #[test]
    fn test_score_is_capped() {
        let filters = SearchFilters {
            keywords: vec!["budget".to_string(), "q3".to_string(), "xlsx".to_string()],
            extensions: vec!["xlsx".to_string()],
            content_types: vec!["spreadsheet".to_string()],
            folders: vec!["finance".to_string()],
            ..SearchFilters::default()
        };
        let outcome = score(&record("finance/q3_budget.xlsx", 1, DEFAULT), &filters);
        assert!(outcome.included());
        assert!(close(outcome.score, 1.0));
        assert_eq!(
            outcome.reason(),
            "Name contains \"budget\"; Name contains \"q3\"; Name contains \"xlsx\"; \
             Extension .xlsx matches; Content type matches; In matching folder"
        );
    }
}
