// src/extractors/mentions.rs
//! Whole-document heuristics for reports without a usable table of
//! contents, and for choosing between several candidate reports.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

use crate::utils::error::ExtractError;

// Trailing registry qualifier, e.g. "veetallaja (LC)".
static QUALIFIER_SUFFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\([^()]*\)\s*$").expect("Failed to compile QUALIFIER_SUFFIX_RE"));

static PARAGRAPH_BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[ \t\r\f]*\n").expect("Failed to compile PARAGRAPH_BREAK_RE"));

/// Strips a trailing parenthesised qualifier from a species name.
pub fn species_stem(name: &str) -> &str {
    let trimmed = name.trim();
    match QUALIFIER_SUFFIX_RE.find(trimmed) {
        Some(m) if m.start() > 0 => trimmed[..m.start()].trim_end(),
        _ => trimmed,
    }
}

/// Case-insensitive count of literal occurrences of `name` in `text`.
pub fn count_mentions(text: &str, name: &str) -> usize {
    let name = name.trim();
    if name.is_empty() {
        return 0;
    }
    text.to_lowercase().matches(&name.to_lowercase()).count()
}

/// Paragraphs (separated by blank lines) that mention `name` as a whole
/// word, with their whitespace collapsed.
pub fn paragraphs_mentioning(text: &str, name: &str) -> Result<Vec<String>, ExtractError> {
    let name = name.trim();
    if name.is_empty() {
        return Ok(Vec::new());
    }
    let word = RegexBuilder::new(&format!(r"\b{}\b", regex::escape(name)))
        .case_insensitive(true)
        .build()
        .map_err(|e| ExtractError::RegexError(e.to_string()))?;

    Ok(PARAGRAPH_BREAK_RE
        .split(text)
        .filter(|para| word.is_match(para))
        .map(|para| para.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|para| !para.is_empty())
        .collect())
}

/// Picks the candidate whose text mentions `name` most often.
///
/// Candidates are `(id, text)` pairs; ties go to the earlier candidate and
/// `None` means no candidate mentions the name at all.
pub fn most_mentioned<'a>(candidates: &'a [(String, String)], name: &str) -> Option<&'a str> {
    let mut best: Option<(&str, usize)> = None;
    for (id, text) in candidates {
        let mentions = count_mentions(text, name);
        tracing::debug!("{} mentions of '{}' in {}", mentions, name, id);
        if mentions > 0 && best.map_or(true, |(_, n)| mentions > n) {
            best = Some((id.as_str(), mentions));
        }
    }
    best.map(|(id, _)| id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_species_stem() {
        assert_eq!(species_stem("veetallaja (LC)"), "veetallaja");
        assert_eq!(species_stem("  merikotkas  "), "merikotkas");
        assert_eq!(species_stem("(LC)"), "(LC)");
    }

    #[test]
    fn test_count_mentions_ignores_case() {
        let text = "Veetallaja pesitseb rannikul. VEETALLAJA arvukus ja veetallajad.";
        assert_eq!(count_mentions(text, "veetallaja"), 3);
        assert_eq!(count_mentions(text, ""), 0);
    }

    #[test]
    fn test_paragraphs_mentioning_whole_word() {
        let text = "Sissejuhatus kavale.\n\n\
            Veetallaja pesitseb\n   kivistel saartel.\n \n\
            Veetallajad rändavad.\n\n\
            Ohud: veetallaja pesad hävivad.";
        let paras = paragraphs_mentioning(text, "veetallaja").unwrap();
        assert_eq!(
            paras,
            vec!["Veetallaja pesitseb kivistel saartel.", "Ohud: veetallaja pesad hävivad."]
        );
    }

    #[test]
    fn test_most_mentioned() {
        let candidates = vec![
            ("a.pdf".to_string(), "merikotkas".to_string()),
            ("b.pdf".to_string(), "merikotkas, Merikotkas".to_string()),
            ("c.pdf".to_string(), "merikotkas merikotkas".to_string()),
        ];
        assert_eq!(most_mentioned(&candidates, "merikotkas"), Some("b.pdf"));
        assert_eq!(most_mentioned(&candidates, "kaljukotkas"), None);
    }
}
