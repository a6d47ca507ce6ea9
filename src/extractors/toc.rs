// src/extractors/toc.rs
//! Table-of-contents discovery in plain report text.
//!
//! Reports converted with `pdftotext -layout` (or OCR) carry their table of
//! contents as dot-leader lines: `2.1 Elupaik ............ 12`. The scan
//! starts at the first TOC marker and stops once the text has clearly left
//! the TOC, i.e. more than `max_non_toc_run` consecutive non-blank lines
//! lack the dot-leader shape.

use std::ops::Range;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::utils::error::ExtractError;

pub const DEFAULT_TOC_MARKER: &str = "Sisukord";
pub const DEFAULT_MIN_LEADER_DOTS: usize = 5;
pub const DEFAULT_MAX_NON_TOC_RUN: usize = 10;

/// Which lines after the marker are kept as TOC entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TocLineMode {
    /// Only `<title> ..... <page>` lines.
    #[default]
    DotLeaders,
    /// Also accepts non-dotted lines, folding them into the dot-leader line
    /// that follows. Keeps headings whose page reference wrapped onto
    /// another line.
    Loose,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TocConfig {
    pub marker: String,
    pub min_leader_dots: usize,
    pub max_non_toc_run: usize,
    pub cross_page_breaks: bool,
    pub line_mode: TocLineMode,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            marker: DEFAULT_TOC_MARKER.to_string(),
            min_leader_dots: DEFAULT_MIN_LEADER_DOTS,
            max_non_toc_run: DEFAULT_MAX_NON_TOC_RUN,
            cross_page_breaks: true,
            line_mode: TocLineMode::DotLeaders,
        }
    }
}

impl TocConfig {
    /// Pattern for a TOC-shaped line; captures the title and page number.
    fn line_pattern(&self) -> Result<Regex, ExtractError> {
        let dots = self.min_leader_dots.max(1);
        let pattern = format!(r"^(?P<label>.*?)\s*\.{{{},}}\s*(?P<page>\d+)\s*$", dots);
        Regex::new(&pattern).map_err(|e| ExtractError::RegexError(e.to_string()))
    }
}

/// One line of the table of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    /// 0-based line number in the document.
    pub line_no: usize,
    /// The trimmed TOC line as printed, leaders and page included.
    pub line: String,
    /// Heading text as it should appear in the body: the line without
    /// dot leaders and page number.
    pub label: String,
    pub page: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocRegion {
    pub entries: Vec<TocEntry>,
    /// Line holding the marker.
    pub start_line: usize,
    /// Last accepted TOC line (inclusive).
    pub end_line: usize,
    /// Byte range in the document, marker line through the last accepted
    /// line and its line break.
    pub span: Range<usize>,
}

impl TocRegion {
    /// Accepted TOC lines, one per line.
    pub fn text(&self) -> String {
        self.entries
            .iter()
            .map(|e| e.line.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The document with the TOC region cut out.
    pub fn body(&self, document: &str) -> String {
        let mut body = String::with_capacity(document.len().saturating_sub(self.span.len()));
        body.push_str(&document[..self.span.start]);
        body.push_str(&document[self.span.end..]);
        body
    }

    /// Maps a byte offset in `body()` back to the original document.
    pub fn document_offset(&self, body_offset: usize) -> usize {
        if body_offset < self.span.start {
            body_offset
        } else {
            body_offset + self.span.len()
        }
    }
}

/// Finds the table of contents that follows the first `config.marker`.
///
/// Returns `ExtractError::TocNotFound` when the marker is missing or no
/// dot-leader line follows it; callers fall back to whole-document search.
pub fn find_table_of_contents(text: &str, config: &TocConfig) -> Result<TocRegion, ExtractError> {
    if text.trim().is_empty() || config.marker.is_empty() {
        return Err(ExtractError::TocNotFound);
    }
    let marker_pos = text.find(&config.marker).ok_or(ExtractError::TocNotFound)?;
    let line_pattern = config.line_pattern()?;

    let region_start = text[..marker_pos].rfind('\n').map_or(0, |i| i + 1);
    let start_line = text[..region_start].matches('\n').count();
    tracing::debug!("TOC marker '{}' found on line {}", config.marker, start_line);

    let mut entries = Vec::new();
    let mut pending = Vec::new();
    let mut last_toc_line: Option<(usize, usize)> = None; // (line_no, end offset)
    let mut non_toc_run = 0usize;
    let mut offset = region_start;

    for (i, raw_line) in text[region_start..].split_inclusive('\n').enumerate() {
        let line_no = start_line + i;
        let line_start = offset;
        offset += raw_line.len();

        if i > 0 && !config.cross_page_breaks && raw_line.contains('\u{c}') {
            tracing::trace!("Stopping TOC scan at page break on line {}", line_no);
            break;
        }

        let trimmed = raw_line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(caps) = line_pattern.captures(trimmed) {
            let label = caps.name("label").map_or("", |m| m.as_str()).trim();
            let page = caps.name("page").and_then(|m| m.as_str().parse().ok());
            entries.push(fold_wrapped(&mut pending, line_no, trimmed, label, page));
            last_toc_line = Some((line_no, line_start + raw_line.len()));
            non_toc_run = 0;
            continue;
        }

        non_toc_run += 1;
        if non_toc_run > config.max_non_toc_run {
            tracing::trace!("Leaving TOC after {} non-TOC lines (line {})", non_toc_run, line_no);
            break;
        }
        if i > 0 && config.line_mode == TocLineMode::Loose {
            pending.push((line_no, trimmed));
        }
    }

    let (end_line, region_end) = last_toc_line.ok_or(ExtractError::TocNotFound)?;
    tracing::debug!(
        "TOC spans lines {}..={} with {} entries",
        start_line,
        end_line,
        entries.len()
    );

    Ok(TocRegion {
        entries,
        start_line,
        end_line,
        span: region_start..region_end,
    })
}

/// Builds the entry for a dot-leader line, prefixing the wrapped lines that
/// preceded it. Drains `pending`.
fn fold_wrapped(
    pending: &mut Vec<(usize, &str)>,
    line_no: usize,
    line: &str,
    label: &str,
    page: Option<u32>,
) -> TocEntry {
    if pending.is_empty() {
        return TocEntry { line_no, line: line.to_string(), label: label.to_string(), page };
    }

    let first_line = pending[0].0;
    let wrapped = pending.drain(..).map(|(_, l)| l).collect::<Vec<_>>().join(" ");
    tracing::trace!("Folding wrapped TOC heading '{}' into line {}", wrapped, line_no);
    TocEntry {
        line_no: first_line,
        line: format!("{} {}", wrapped, line),
        label: format!("{} {}", wrapped, label).trim().to_string(),
        page,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "Liigi kaitse tegevuskava\n\
        \n\
        Sisukord\n\
        1 Sissejuhatus ................ 3\n\
        2 Liigi kirjeldus ............. 5\n\
        2.1 Elupaik ...................12\n\
        \n\
        2.2 Ohud ......................15\n\
        3 Kokkuvõte ................... 20\n\
        \n\
        1 Sissejuhatus\n\
        Tekst sissejuhatusest.\n\
        2 Liigi kirjeldus\n\
        2.1 Elupaik\n\
        Elupaiga kirjeldus.\n\
        2.2 Ohud\n\
        Ohtude kirjeldus.\n\
        3 Kokkuvõte\n\
        Kokkuvõtte tekst.\n";

    #[test]
    fn test_finds_dot_leader_toc() {
        let toc = find_table_of_contents(REPORT, &TocConfig::default()).unwrap();
        let labels: Vec<_> = toc.entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["1 Sissejuhatus", "2 Liigi kirjeldus", "2.1 Elupaik", "2.2 Ohud", "3 Kokkuvõte"]
        );
        assert_eq!(toc.entries[2].page, Some(12));
        assert_eq!(toc.start_line, 2);
        assert_eq!(toc.end_line, 8);
        assert!(REPORT[toc.span.clone()].starts_with("Sisukord"));
        assert!(toc.text().starts_with("1 Sissejuhatus"));
    }

    #[test]
    fn test_body_excludes_toc() {
        let toc = find_table_of_contents(REPORT, &TocConfig::default()).unwrap();
        let body = toc.body(REPORT);
        assert!(!body.contains("Sisukord"));
        assert!(!body.contains("......"));
        assert!(body.starts_with("Liigi kaitse tegevuskava"));
        assert!(body.contains("2.1 Elupaik\nElupaiga kirjeldus."));

        let in_body = body.find("2.1 Elupaik\n").unwrap();
        let in_doc = toc.document_offset(in_body);
        assert!(REPORT[in_doc..].starts_with("2.1 Elupaik\nElupaiga"));
        assert_eq!(toc.document_offset(0), 0);
    }

    #[test]
    fn test_missing_marker_is_not_found() {
        let text = "1 Sissejuhatus ........ 3\nTekst.";
        assert_eq!(
            find_table_of_contents(text, &TocConfig::default()),
            Err(ExtractError::TocNotFound)
        );
        assert_eq!(
            find_table_of_contents("   \n ", &TocConfig::default()),
            Err(ExtractError::TocNotFound)
        );
    }

    #[test]
    fn test_heading_list_without_leaders_is_not_found() {
        let text = "Sisukord\nSissejuhatus\nElupaik\nOhud\n\nSissejuhatus\nTekst.";
        assert_eq!(
            find_table_of_contents(text, &TocConfig::default()),
            Err(ExtractError::TocNotFound)
        );
    }

    #[test]
    fn test_stops_after_long_non_toc_run() {
        let mut text = String::from("Sisukord\n1 Esimene ........ 2\n");
        for i in 0..11 {
            text.push_str(&format!("Vahetekst {}\n", i));
        }
        text.push_str("2 Hiline ........ 9\n");

        let toc = find_table_of_contents(&text, &TocConfig::default()).unwrap();
        assert_eq!(toc.entries.len(), 1);
        assert_eq!(toc.entries[0].label, "1 Esimene");
    }

    #[test]
    fn test_short_gap_is_bridged() {
        let text = "Sisukord\n1 Esimene ........ 2\nlk\n\n2 Teine ........ 4\nSisu.";
        let toc = find_table_of_contents(text, &TocConfig::default()).unwrap();
        assert_eq!(toc.entries.len(), 2);
    }

    #[test]
    fn test_page_break_handling() {
        let text = "Sisukord\n1 Esimene ........ 2\n\u{c}2 Teine ........ 4\nSisu.";
        let crossing = find_table_of_contents(text, &TocConfig::default()).unwrap();
        assert_eq!(crossing.entries.len(), 2);

        let config = TocConfig { cross_page_breaks: false, ..TocConfig::default() };
        let single_page = find_table_of_contents(text, &config).unwrap();
        assert_eq!(single_page.entries.len(), 1);
    }

    #[test]
    fn test_loose_mode_keeps_wrapped_headings() {
        let text = "Sisukord\n\
            2.3 Populatsiooni muutused\n\
            Eestis .......... 14\n\
            Pärast TOC-i\n\
            Body.";
        let config = TocConfig { line_mode: TocLineMode::Loose, ..TocConfig::default() };
        let toc = find_table_of_contents(text, &config).unwrap();
        assert_eq!(toc.entries.len(), 1);
        assert_eq!(toc.entries[0].label, "2.3 Populatsiooni muutused Eestis");
        assert_eq!(toc.entries[0].line, "2.3 Populatsiooni muutused Eestis .......... 14");
        assert_eq!(toc.entries[0].line_no, 1);
        assert_eq!(toc.entries[0].page, Some(14));
        assert_eq!(toc.end_line, 2);
        assert!(!toc.text().contains("Pärast"));

        // Without loose mode the wrapped first half is not an entry.
        let strict = find_table_of_contents(text, &TocConfig::default()).unwrap();
        assert_eq!(strict.entries[0].label, "Eestis");
    }

    #[test]
    fn test_loose_mode_only_folds_into_following_entry() {
        let text = "Sisukord
            2.2 Ohud ....... 9
            2.3 Populatsiooni muutused
            Eestis .......... 14
            3 Kokkuvõte ..... 20
            
            2.2 Ohud
            Tekst.";
        let config = TocConfig { line_mode: TocLineMode::Loose, ..TocConfig::default() };
        let toc = find_table_of_contents(text, &config).unwrap();
        let labels: Vec<_> = toc.entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["2.2 Ohud", "2.3 Populatsiooni muutused Eestis", "3 Kokkuvõte"]);
    }

    #[test]
    fn test_custom_marker_and_dots() {
        let text = "Contents\nIntro ... 1\nBody text.";
        let config = TocConfig {
            marker: "Contents".to_string(),
            min_leader_dots: 3,
            ..TocConfig::default()
        };
        let toc = find_table_of_contents(text, &config).unwrap();
        assert_eq!(toc.entries[0].label, "Intro");
        assert_eq!(toc.entries[0].page, Some(1));
    }
}
