//! Text normalization and similarity scoring for shape text.
//!
//! Everything compared by the matcher and the verifier goes through
//! [`normalize_for_comparison`] first, so template text that differs only in
//! case, punctuation, spacing or Unicode composition compares equal.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Regex to collapse runs of whitespace (including newlines) into one space.
static WHITESPACE_COLLAPSE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Regex to find the integer a shape name ends with ("Content Placeholder 2").
static TRAILING_NUMBER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*$").unwrap());

/// Normalize a string for comparison purposes.
///
/// Applies NFKC, lowercases, drops punctuation and collapses whitespace.
pub fn normalize_for_comparison(text: &str) -> String {
    let composed: String = text.nfkc().collect();
    let kept: String = composed
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    WHITESPACE_COLLAPSE_REGEX
        .replace_all(kept.trim(), " ")
        .into_owned()
}

/// Lowercase word set of a text, after normalization.
pub fn word_set(text: &str) -> BTreeSet<String> {
    normalize_for_comparison(text)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Dice coefficient of the lowercase word sets of two texts.
///
/// Returns `2·|A∩B| / (|A|+|B|)`, or 0.0 when either side has no words.
pub fn dice_coefficient(a: &str, b: &str) -> f64 {
    let words_a = word_set(a);
    let words_b = word_set(b);

    if words_a.is_empty() || words_b.is_empty() {
        return 0.0;
    }

    let shared = words_a.intersection(&words_b).count() as f64;
    2.0 * shared / (words_a.len() + words_b.len()) as f64
}

/// Calculate similarity between two already-normalized strings.
///
/// Returns a score from 0.0 (completely different) to 1.0 (exact match).
/// Uses a combination of exact match, containment, and word overlap.
fn calculate_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    // Exact match
    if a == b {
        return 1.0;
    }

    // One contains the other
    if a.contains(b) || b.contains(a) {
        let shorter = a.chars().count().min(b.chars().count()) as f64;
        let longer = a.chars().count().max(b.chars().count()) as f64;
        return shorter / longer;
    }

    // Word overlap (Jaccard similarity)
    let words_a: BTreeSet<&str> = a.split_whitespace().collect();
    let words_b: BTreeSet<&str> = b.split_whitespace().collect();

    if words_a.is_empty() || words_b.is_empty() {
        return 0.0;
    }

    let intersection = words_a.intersection(&words_b).count() as f64;
    let union = words_a.union(&words_b).count() as f64;

    intersection / union
}

/// Lowercase and collapse whitespace, keeping punctuation and symbols.
fn collapse_whitespace(text: &str) -> String {
    let composed: String = text.nfkc().collect::<String>().to_lowercase();
    WHITESPACE_COLLAPSE_REGEX
        .replace_all(composed.trim(), " ")
        .into_owned()
}

/// Similarity of what a shape shows to what it was meant to show.
///
/// Text made only of symbols ("→ → →", "…") has nothing left after
/// normalization and is compared with only whitespace and case folded.
pub fn text_similarity(expected: &str, actual: &str) -> f64 {
    let (a, b) = (normalize_for_comparison(expected), normalize_for_comparison(actual));
    if a.is_empty() || b.is_empty() {
        return calculate_similarity(&collapse_whitespace(expected), &collapse_whitespace(actual));
    }
    calculate_similarity(&a, &b)
}

/// The integer a name ends with, if any.
///
/// "Content Placeholder 2" gives 2, "Title1" gives 1, "Subtitle" gives none.
pub fn trailing_number(name: &str) -> Option<u32> {
    TRAILING_NUMBER_REGEX
        .captures(name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_for_comparison() {
        assert_eq!(normalize_for_comparison("Quarterly Results!"), "quarterly results");
        assert_eq!(
            normalize_for_comparison("  Click   to add\ntext  "),
            "click to add text"
        );
        assert_eq!(normalize_for_comparison("It's Well"), "its well");
    }

    #[test]
    fn test_normalize_applies_nfkc() {
        // Fullwidth letters and the "fi" ligature fold to ASCII.
        assert_eq!(normalize_for_comparison("ＡＢＣ ﬁle"), "abc file");
    }

    #[test]
    fn test_word_set_is_lowercase_and_deduplicated() {
        let words = word_set("Revenue revenue GREW");
        assert_eq!(words.len(), 2);
        assert!(words.contains("revenue"));
        assert!(words.contains("grew"));
    }

    #[test]
    fn test_dice_coefficient() {
        assert_eq!(dice_coefficient("revenue grew", "Revenue grew"), 1.0);
        assert_eq!(dice_coefficient("revenue grew", "costs fell"), 0.0);
        assert_eq!(dice_coefficient("", "anything"), 0.0);

        // {a, b} vs {b, c}: 2·1 / 4
        assert_eq!(dice_coefficient("a b", "b c"), 0.5);
    }

    #[test]
    fn test_calculate_similarity() {
        // Exact match
        assert_eq!(calculate_similarity("quarterly results", "quarterly results"), 1.0);

        // One contains the other
        let sim = calculate_similarity("quarterly results", "quarterly results for q3");
        assert!(sim > 0.5 && sim < 1.0);

        // Word overlap
        assert_eq!(calculate_similarity("grew revenue", "revenue grew"), 1.0);

        // Partial overlap
        let sim = calculate_similarity("revenue grew", "revenue fell");
        assert!(sim > 0.0 && sim < 1.0);

        // No overlap
        assert_eq!(calculate_similarity("revenue grew", "click to add text"), 0.0);
    }

    #[test]
    fn test_text_similarity_ignores_case_and_punctuation() {
        assert_eq!(text_similarity("Revenue grew 12% YoY", "revenue grew 12 yoy."), 1.0);
    }

    #[test]
    fn test_text_similarity_of_symbol_only_text() {
        assert_eq!(text_similarity("→ → →", "→  →\n→"), 1.0);
        assert_eq!(text_similarity("…", "…"), 1.0);
        assert_eq!(text_similarity("→ → →", "Click to add text"), 0.0);
    }

    #[test]
    fn test_trailing_number() {
        assert_eq!(trailing_number("Content Placeholder 2"), Some(2));
        assert_eq!(trailing_number("Title1"), Some(1));
        assert_eq!(trailing_number("SlideNum3 "), Some(3));
        assert_eq!(trailing_number("Subtitle"), None);
        assert_eq!(trailing_number("2 Column Text"), None);
    }
}
