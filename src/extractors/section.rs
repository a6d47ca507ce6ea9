// src/extractors/section.rs

// --- Imports ---
use std::collections::BTreeMap;

use regex::Regex;
use serde::Serialize;

use crate::config::LocatorConfig;
use crate::extractors::matcher::{MatchKind, SectionMatcher};
use crate::extractors::toc::{find_table_of_contents, TocRegion};
use crate::utils::error::ExtractError;

// --- Data Structures ---
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedSection {
    pub request: String,     // The label as the caller asked for it
    pub toc_label: String,   // Heading text of the matched TOC entry
    pub toc_index: usize,    // Position of that entry in TOC order
    pub match_kind: MatchKind,
    pub score: f64,
    pub body_offset: usize,  // Byte offset of the heading in the body
    pub content: String,     // Heading plus text up to the next TOC heading
}

/// A requested label that could not be located, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingSection {
    pub label: String,
    pub reason: ExtractError,
}

#[derive(Debug, Clone, Default)]
pub struct LocatedSections {
    pub found: Vec<ExtractedSection>,
    pub missing: Vec<MissingSection>,
}

impl LocatedSections {
    pub fn get(&self, label: &str) -> Option<&ExtractedSection> {
        self.found.iter().find(|s| s.request == label)
    }

    /// Label to span mapping; labels that were not located are absent.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.found
            .iter()
            .map(|s| (s.request.clone(), s.content.clone()))
            .collect()
    }

    /// All spans in request order, separated by a blank line.
    pub fn joined(&self) -> String {
        self.found
            .iter()
            .map(|s| s.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn is_empty(&self) -> bool {
        self.found.is_empty()
    }
}

// --- Span Extraction ---

/// Returns the body text from the first occurrence of `start` up to (not
/// including) the first occurrence of `end` after it, trimmed. Without an
/// end, or when the end heading does not occur after the start, the span
/// runs to the end of the body.
pub fn extract_span(
    body: &str,
    start: &str,
    end: Option<&str>,
    flexible_whitespace: bool,
) -> Result<String, ExtractError> {
    extract_span_at(body, start, end, flexible_whitespace).map(|(_, span)| span)
}

fn extract_span_at(
    body: &str,
    start: &str,
    end: Option<&str>,
    flexible_whitespace: bool,
) -> Result<(usize, String), ExtractError> {
    let (start_pos, start_len) = find_heading(body, start, flexible_whitespace)?
        .ok_or_else(|| ExtractError::SectionBodyNotFound(start.to_string()))?;

    let search_from = start_pos + start_len;
    let end_pos = match end {
        Some(end_label) => find_heading(&body[search_from..], end_label, flexible_whitespace)?
            .map(|(pos, _)| search_from + pos),
        None => None,
    };
    if end.is_some() && end_pos.is_none() {
        tracing::debug!("End heading {:?} not found after '{}', taking rest of body", end, start);
    }

    let span = &body[start_pos..end_pos.unwrap_or(body.len())];
    Ok((start_pos, span.trim().to_string()))
}

/// Byte position and length of the first occurrence of `label` in `haystack`.
fn find_heading(
    haystack: &str,
    label: &str,
    flexible_whitespace: bool,
) -> Result<Option<(usize, usize)>, ExtractError> {
    let label = label.trim();
    if label.is_empty() {
        return Ok(None);
    }
    if !flexible_whitespace {
        return Ok(haystack.find(label).map(|pos| (pos, label.len())));
    }

    let pattern = label
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");
    let re = Regex::new(&pattern).map_err(|e| ExtractError::RegexError(e.to_string()))?;
    Ok(re.find(haystack).map(|m| (m.start(), m.len())))
}

// --- Main Locator Structure ---
pub struct SectionLocator {
    config: LocatorConfig,
    matcher: SectionMatcher,
}

impl SectionLocator {
    pub fn new(config: LocatorConfig) -> Self {
        let matcher = SectionMatcher::new(config.strategy, config.similarity_threshold);
        Self { config, matcher }
    }

    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    /// Locates every requested label in `text`.
    ///
    /// Fails only when the document has no discoverable table of contents.
    /// Labels that miss the TOC or whose heading is absent from the body are
    /// reported in `missing`; the remaining labels are still processed.
    pub fn locate<S: AsRef<str>>(&self, text: &str, labels: &[S]) -> Result<LocatedSections, ExtractError> {
        let toc = find_table_of_contents(text, &self.config.toc)?;
        let body = toc.body(text);
        Ok(self.locate_in(&toc, &body, labels))
    }

    /// Same as `locate` for callers that already hold the TOC and body.
    pub fn locate_in<S: AsRef<str>>(&self, toc: &TocRegion, body: &str, labels: &[S]) -> LocatedSections {
        let mut located = LocatedSections::default();

        for label in labels {
            let label = label.as_ref().trim();
            if label.is_empty() {
                continue;
            }
            match self.locate_one(toc, body, label) {
                Ok(section) => {
                    tracing::debug!("Located '{}' ({} bytes)", label, section.content.len());
                    located.found.push(section);
                }
                Err(reason) => {
                    tracing::warn!("Skipping section '{}': {}", label, reason);
                    located.missing.push(MissingSection { label: label.to_string(), reason });
                }
            }
        }

        tracing::info!(
            "Located {} of {} requested sections",
            located.found.len(),
            located.found.len() + located.missing.len()
        );
        located
    }

    fn locate_one(&self, toc: &TocRegion, body: &str, label: &str) -> Result<ExtractedSection, ExtractError> {
        let matched = self
            .matcher
            .find(label, &toc.entries)
            .ok_or_else(|| ExtractError::SectionNotInToc(label.to_string()))?;

        // The boundary is always the next entry in TOC order.
        let next = toc.entries.get(matched.index + 1).map(|e| e.label.as_str());
        let (body_offset, content) =
            extract_span_at(body, &matched.entry.label, next, self.config.flexible_whitespace)?;

        Ok(ExtractedSection {
            request: label.to_string(),
            toc_label: matched.entry.label.clone(),
            toc_index: matched.index,
            match_kind: matched.kind,
            score: matched.score,
            body_offset,
            content,
        })
    }
}

impl Default for SectionLocator {
    fn default() -> Self {
        Self::new(LocatorConfig::default())
    }
}
