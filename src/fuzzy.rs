//! Bigram similarity
//!
//! Cheap fuzzy matching for per-query scans: a Jaccard index over the sets of
//! overlapping two-character windows of both strings.

use std::collections::HashSet;

/// Similarity returned when one string contains the other
pub const SUBSTRING_SIMILARITY: f32 = 0.85;

/// Set of overlapping two-character windows; empty below two characters
fn bigrams(s: &str) -> HashSet<(char, char)> {
    let chars: Vec<char> = s.chars().collect();
    chars.windows(2).map(|w| (w[0], w[1])).collect()
}

/// Similarity of `a` and `b` in `[0, 1]`
///
/// Case-insensitive. Equal strings score 1, containment scores
/// [`SUBSTRING_SIMILARITY`], anything else scores the Jaccard index of the two
/// bigram sets (0 when both sets are empty).
#[must_use]
pub fn similarity(a: &str, b: &str) -> f32 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();

    if a == b {
        return 1.0;
    }
    if a.contains(&b) || b.contains(&a) {
        return SUBSTRING_SIMILARITY;
    }
    jaccard(&a, &b)
}

/// Jaccard index of the bigram sets of `a` and `b`, case-sensitive
///
/// No equality or containment shortcut; 0 when both sets are empty.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn jaccard(a: &str, b: &str) -> f32 {
    let left = bigrams(a);
    let right = bigrams(b);
    let intersection = left.intersection(&right).count();
    let union = left.len() + right.len() - intersection;
    if union == 0 {
        return 0.0;
    }

    intersection as f32 / union as f32
}
