//! Structured search filters
//!
//! Filters arrive as JSON from an upstream intent parser. Decoding is lenient
//! about absence (missing keys and `null`s both mean "unconstrained") but
//! strict about malformed values, which surface as [`Error::InvalidFilter`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// Fallback keywords must be longer than this many characters
pub const MIN_FALLBACK_KEYWORD_LEN: usize = 2;

/// Filter dimensions for one search
///
/// An empty list or `None` places no constraint on its dimension. Keywords and
/// folders only add score; extensions, content types, sizes and dates exclude.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchFilters {
    /// Free terms matched against name, path, category and extension
    #[serde(deserialize_with = "null_as_empty")]
    pub keywords:        Vec<String>,
    /// Lowercase extensions without the leading dot
    #[serde(deserialize_with = "null_as_empty")]
    pub extensions:      Vec<String>,
    /// Category names or raw MIME substrings
    #[serde(deserialize_with = "null_as_empty")]
    pub content_types:   Vec<String>,
    /// Folder name substrings
    #[serde(deserialize_with = "null_as_empty")]
    pub folders:         Vec<String>,
    /// Inclusive lower size bound in bytes
    pub min_size:        Option<u64>,
    /// Inclusive upper size bound in bytes
    pub max_size:        Option<u64>,
    /// Inclusive lower bound on the last write
    #[serde(deserialize_with = "optional_timestamp")]
    pub modified_after:  Option<DateTime<Utc>>,
    /// Inclusive upper bound on the last write
    #[serde(deserialize_with = "optional_timestamp")]
    pub modified_before: Option<DateTime<Utc>>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

fn optional_timestamp<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => {
            parse_timestamp(&raw).map(Some).map_err(|_| {
                serde::de::Error::custom(format_args!("unrecognized timestamp '{raw}'"))
            })
        },
        _ => Ok(None),
    }
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (UTC midnight)
///
/// # Errors
/// Returns [`Error::InvalidFilter`] if `raw` is neither.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| Error::invalid_filter(&format!("unrecognized timestamp '{raw}'")))
}

/// Trimmed, non-blank entries of `items`, optionally lowercased
fn clean(items: &[String], lowercase: bool) -> Vec<String> {
    items
        .iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(|item| if lowercase { item.to_lowercase() } else { item.to_string() })
        .collect()
}

impl SearchFilters {
    /// Decode filters from intent parser JSON
    ///
    /// # Errors
    /// Returns [`Error::InvalidFilter`] if the JSON is malformed or a value has
    /// the wrong type.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::invalid_filter(&e.to_string()))
    }

    /// Keyword-only filters derived from raw query text
    ///
    /// Used when no structured intent is available: the query is lowercased,
    /// split on whitespace, and words of two characters or fewer are dropped.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let keywords = query
            .to_lowercase()
            .split_whitespace()
            .filter(|word| word.chars().count() > MIN_FALLBACK_KEYWORD_LEN)
            .map(str::to_string)
            .collect();
        Self { keywords, ..Self::default() }
    }

    /// True when no dimension is constrained
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        self.keywords.is_empty()
            && self.extensions.is_empty()
            && self.content_types.is_empty()
            && self.folders.is_empty()
            && self.min_size.is_none()
            && self.max_size.is_none()
            && self.modified_after.is_none()
            && self.modified_before.is_none()
    }

    /// Copy with blanks dropped and case-insensitive dimensions lowercased
    ///
    /// Keywords keep their case since it shows up in reasons. Extensions also
    /// lose a leading dot.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let extensions = clean(&self.extensions, true)
            .into_iter()
            .map(|ext| ext.trim_start_matches('.').to_string())
            .filter(|ext| !ext.is_empty())
            .collect();

        Self {
            keywords: clean(&self.keywords, false),
            extensions,
            content_types: clean(&self.content_types, true),
            folders: clean(&self.folders, true),
            ..self.clone()
        }
    }

    /// Reject ranges that cannot match anything
    ///
    /// # Errors
    /// Returns [`Error::InvalidFilter`] if `minSize > maxSize` or
    /// `modifiedAfter > modifiedBefore`.
    pub fn validate(&self) -> Result<()> {
        if let (Some(min), Some(max)) = (self.min_size, self.max_size) {
            if min > max {
                return Err(Error::invalid_filter(&format!(
                    "minSize {min} is larger than maxSize {max}"
                )));
            }
        }
        if let (Some(after), Some(before)) = (self.modified_after, self.modified_before) {
            if after > before {
                return Err(Error::invalid_filter(&format!(
                    "modifiedAfter {} is later than modifiedBefore {}",
                    after.to_rfc3339(),
                    before.to_rfc3339()
                )));
            }
        }
        Ok(())
    }

    /// Append keywords not already present, keeping first-seen order
    pub fn merge_keywords<I, S>(&mut self, extra: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for keyword in extra {
            let keyword = keyword.into();
            if !self.keywords.contains(&keyword) {
                self.keywords.push(keyword);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_default_is_unconstrained() {
        assert!(SearchFilters::default().is_unconstrained());
    }

    #[test]
    fn test_any_dimension_constrains() {
        let filters = SearchFilters { min_size: Some(0), ..SearchFilters::default() };
        assert!(!filters.is_unconstrained());
        let filters =
            SearchFilters { folders: vec!["work".to_string()], ..SearchFilters::default() };
        assert!(!filters.is_unconstrained());
    }

    #[test]
    fn test_from_json_full() {
        let json = r#"{
            "keywords": ["invoice"],
            "extensions": ["pdf"],
            "contentTypes": ["document"],
            "folders": ["finance"],
            "minSize": 1024,
            "maxSize": 10485760,
            "modifiedAfter": "2024-01-01",
            "modifiedBefore": "2024-06-01T12:30:00Z",
            "userIntent": "find my invoices"
        }"#;
        let filters = SearchFilters::from_json(json).unwrap();
        assert_eq!(filters.keywords, vec!["invoice"]);
        assert_eq!(filters.extensions, vec!["pdf"]);
        assert_eq!(filters.content_types, vec!["document"]);
        assert_eq!(filters.folders, vec!["finance"]);
        assert_eq!(filters.min_size, Some(1024));
        assert_eq!(filters.max_size, Some(10_485_760));
        assert_eq!(
            filters.modified_after,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            filters.modified_before,
            Some(Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_from_json_nulls_are_unconstrained() {
        let json = r#"{
            "keywords": null,
            "extensions": null,
            "contentTypes": [],
            "minSize": null,
            "modifiedAfter": null,
            "modifiedBefore": ""
        }"#;
        let filters = SearchFilters::from_json(json).unwrap();
        assert!(filters.is_unconstrained());
    }

    #[test]
    fn test_from_json_empty_object() {
        assert!(SearchFilters::from_json("{}").unwrap().is_unconstrained());
    }

    #[test]
    fn test_from_json_bad_date() {
        let err = SearchFilters::from_json(r#"{"modifiedAfter": "last tuesday"}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidFilter(_)));
    }

    #[test]
    fn test_from_json_bad_size() {
        let err = SearchFilters::from_json(r#"{"minSize": -5}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidFilter(_)));
    }

    #[test]
    fn test_parse_timestamp_offsets() {
        let ts = parse_timestamp("2024-06-01T02:00:00+02:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
        let ts = parse_timestamp("2024-06-01T00:00:00.000").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_from_query() {
        let filters = SearchFilters::from_query("Find my Q3 budget spreadsheet");
        assert_eq!(filters.keywords, vec!["find", "budget", "spreadsheet"]);
        assert!(filters.extensions.is_empty());
    }

    #[test]
    fn test_from_query_blank() {
        assert!(SearchFilters::from_query("   ").is_unconstrained());
    }

    #[test]
    fn test_normalized() {
        let filters = SearchFilters {
            keywords: vec![" Report ".to_string(), String::new()],
            extensions: vec![".PDF".to_string(), "docx".to_string(), ".".to_string()],
            content_types: vec!["Image".to_string(), "  ".to_string()],
            folders: vec!["Work".to_string()],
            min_size: Some(1),
            ..SearchFilters::default()
        };
        let normalized = filters.normalized();
        assert_eq!(normalized.keywords, vec!["Report"]);
        assert_eq!(normalized.extensions, vec!["pdf", "docx"]);
        assert_eq!(normalized.content_types, vec!["image"]);
        assert_eq!(normalized.folders, vec!["work"]);
        assert_eq!(normalized.min_size, Some(1));
    }

    #[test]
    fn test_validate_ranges() {
        let ok = SearchFilters { min_size: Some(5), max_size: Some(5), ..SearchFilters::default() };
        assert!(ok.validate().is_ok());

        let inverted =
            SearchFilters { min_size: Some(10), max_size: Some(5), ..SearchFilters::default() };
        assert!(matches!(inverted.validate(), Err(Error::InvalidFilter(_))));

        let inverted_dates = SearchFilters {
            modified_after: Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()),
            modified_before: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            ..SearchFilters::default()
        };
        assert!(matches!(inverted_dates.validate(), Err(Error::InvalidFilter(_))));
    }

    #[test]
    fn test_merge_keywords_dedups_in_order() {
        let mut filters = SearchFilters {
            keywords: vec!["budget".to_string(), "q3".to_string()],
            ..SearchFilters::default()
        };
        filters.merge_keywords(["q3", "forecast", "budget", "forecast"]);
        assert_eq!(filters.keywords, vec!["budget", "q3", "forecast"]);
    }
}
