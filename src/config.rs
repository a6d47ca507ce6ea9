// src/config.rs
use serde::{Deserialize, Serialize};

use crate::extractors::matcher::{MatchStrategy, DEFAULT_SIMILARITY_THRESHOLD};
use crate::extractors::toc::TocConfig;

/// Heuristic knobs of the section locator. Built from CLI flags (with
/// environment fallbacks) in `main`, or deserialized by library callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    pub toc: TocConfig,
    pub strategy: MatchStrategy,
    /// Similarity ratio a title must exceed to count as a fuzzy match.
    pub similarity_threshold: f64,
    /// Let any whitespace run in the body stand in for a space in the
    /// heading. Off means the heading must appear verbatim.
    pub flexible_whitespace: bool,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            toc: TocConfig::default(),
            strategy: MatchStrategy::default(),
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            flexible_whitespace: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::toc::TocLineMode;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{ "similarity_threshold": 0.85, "toc": { "marker": "Contents", "line_mode": "loose" } }"#;
        let config: LocatorConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.similarity_threshold, 0.85);
        assert_eq!(config.toc.marker, "Contents");
        assert_eq!(config.toc.line_mode, TocLineMode::Loose);
        assert_eq!(config.toc.max_non_toc_run, 10);
        assert_eq!(config.strategy, MatchStrategy::ContainmentThenSimilarity);
        assert!(!config.flexible_whitespace);
    }
}
