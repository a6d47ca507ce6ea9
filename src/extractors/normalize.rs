// src/extractors/normalize.rs
//! Comparison keys for section titles.
//!
//! TOC lines and requested labels go through the same functions so that
//! spacing, case and trailing numbering never decide a match.

/// Normalizes a raw title line into a comparison-ready form.
///
/// Whitespace runs collapse to one space, the text is lowercased and
/// trimmed, and everything after the last alphabetic character is dropped
/// (dot leaders, page numbers, decorative periods).
pub fn normalize_label(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let lowered = collapsed.to_lowercase();

    match lowered.char_indices().rev().find(|(_, c)| c.is_alphabetic()) {
        Some((idx, c)) => lowered[..idx + c.len_utf8()].trim().to_string(),
        None => String::new(),
    }
}

/// `normalize_label` with punctuation removed, used for containment checks.
pub fn comparison_key(raw: &str) -> String {
    let normalized = normalize_label(raw);
    let stripped: String = normalized
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `comparison_key` without spaces. OCR splits and merges words freely, so
/// the similarity ratio is computed on this form.
pub fn compact_key(raw: &str) -> String {
    comparison_key(raw).chars().filter(|c| !c.is_whitespace()).collect()
}

/// Splits a cell that may hold several labels ("2.1 Elupaik, 2.2 Ohud")
/// into individual trimmed labels.
pub fn split_labels(cell: &str) -> Vec<String> {
    cell.split([',', ';', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_strips_leaders_and_page() {
        assert_eq!(normalize_label("2.1   Elupaik ........ 12"), "2.1 elupaik");
        assert_eq!(normalize_label("  Kokkuvõte.  "), "kokkuvõte");
        assert_eq!(normalize_label("\t2.2.1.1\tElupaiganõudlus ....... 7\n"), "2.2.1.1 elupaiganõudlus");
    }

    #[test]
    fn test_normalize_without_letters_is_empty() {
        assert_eq!(normalize_label("2.1 ....... 12"), "");
        assert_eq!(normalize_label(""), "");
    }

    #[test]
    fn test_comparison_key_drops_punctuation() {
        assert_eq!(comparison_key("2.1. Elupaik ....... 12"), "21 elupaik");
        assert_eq!(comparison_key("Ohud (inimtegevus)"), "ohud inimtegevus");
    }

    #[test]
    fn test_compact_key_removes_spaces() {
        assert_eq!(compact_key("2.1 Elu paik"), "21elupaik");
    }

    #[test]
    fn test_split_labels() {
        assert_eq!(
            split_labels("2.1 Elupaik, 2.2 Ohud;  ,3 Kokkuvõte"),
            vec!["2.1 Elupaik", "2.2 Ohud", "3 Kokkuvõte"]
        );
        assert!(split_labels(" , ").is_empty());
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(s in "[a-zA-ZõäöüÕÄÖÜšžŠŽ0-9 .\t\n]{0,40}") {
            let once = normalize_label(&s);
            prop_assert_eq!(normalize_label(&once), once);
        }

        #[test]
        fn comparison_key_is_idempotent(s in "[a-zA-ZõäöüÕÄÖÜ0-9 .,()\t]{0,40}") {
            let once = comparison_key(&s);
            prop_assert_eq!(comparison_key(&once), once);
        }
    }
}
