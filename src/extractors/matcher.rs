// src/extractors/matcher.rs
//! Matching requested section labels against TOC entries.

use rapidfuzz::distance::indel;
use serde::{Deserialize, Serialize};

use crate::extractors::normalize::{compact_key, comparison_key};
use crate::extractors::toc::TocEntry;

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum MatchStrategy {
    /// Request key must be a substring of the entry key.
    Containment,
    /// Similarity ratio of the compact keys must exceed the threshold.
    Similarity,
    /// Containment over all entries first, similarity only if that fails.
    #[default]
    ContainmentThenSimilarity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchKind {
    Containment,
    Similarity,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TocMatch<'a> {
    /// Position of the entry in TOC order.
    pub index: usize,
    pub entry: &'a TocEntry,
    pub kind: MatchKind,
    /// 1.0 for containment, the ratio otherwise.
    pub score: f64,
}

#[derive(Debug, Clone)]
pub struct SectionMatcher {
    strategy: MatchStrategy,
    similarity_threshold: f64,
}

impl Default for SectionMatcher {
    fn default() -> Self {
        Self::new(MatchStrategy::default(), DEFAULT_SIMILARITY_THRESHOLD)
    }
}

impl SectionMatcher {
    pub fn new(strategy: MatchStrategy, similarity_threshold: f64) -> Self {
        Self { strategy, similarity_threshold }
    }

    /// Finds the first TOC entry (in TOC order) that the request matches.
    pub fn find<'a>(&self, request: &str, entries: &'a [TocEntry]) -> Option<TocMatch<'a>> {
        let found = match self.strategy {
            MatchStrategy::Containment => self.find_containing(request, entries),
            MatchStrategy::Similarity => self.find_similar(request, entries),
            MatchStrategy::ContainmentThenSimilarity => self
                .find_containing(request, entries)
                .or_else(|| self.find_similar(request, entries)),
        };

        match &found {
            Some(m) => tracing::debug!(
                "Matched '{}' to TOC entry {} '{}' ({:?}, {:.3})",
                request,
                m.index,
                m.entry.label,
                m.kind,
                m.score
            ),
            None => tracing::debug!("No TOC entry matches '{}'", request),
        }
        found
    }

    fn find_containing<'a>(&self, request: &str, entries: &'a [TocEntry]) -> Option<TocMatch<'a>> {
        let key = comparison_key(request);
        if key.is_empty() {
            return None;
        }
        entries
            .iter()
            .enumerate()
            .find(|(_, entry)| comparison_key(&entry.line).contains(&key))
            .map(|(index, entry)| TocMatch { index, entry, kind: MatchKind::Containment, score: 1.0 })
    }

    fn find_similar<'a>(&self, request: &str, entries: &'a [TocEntry]) -> Option<TocMatch<'a>> {
        let key = compact_key(request);
        if key.is_empty() {
            return None;
        }
        entries.iter().enumerate().find_map(|(index, entry)| {
            let score = similarity_ratio(&key, &compact_key(&entry.line));
            (score > self.similarity_threshold)
                .then_some(TocMatch { index, entry, kind: MatchKind::Similarity, score })
        })
    }
}

/// Ratio of matching characters, `2 * M / (len(a) + len(b))`.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    indel::normalized_similarity(a.chars(), b.chars())
}
