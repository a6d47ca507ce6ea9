// src/reports/labels.rs
//! Section labels chosen by the language model.
//!
//! The model is asked to return a JSON object keyed by topic name whose
//! values are TOC headings. Replies arrive wrapped in prose or code fences,
//! with single strings or lists, so parsing is lenient about the envelope
//! and strict about the schema: anything that does not fit yields an empty
//! `SectionLabels`.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::extractors::normalize::split_labels;
use crate::reports::models::{ReportRow, Topic};

static FENCED_JSON_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").expect("Failed to compile FENCED_JSON_RE")
});

// Placeholder values the model uses for "no such section".
const EMPTY_MARKERS: [&str; 4] = ["na", "n/a", "-", "puudub"];

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LabelValue {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionLabels {
    by_topic: BTreeMap<Topic, Vec<String>>,
}

impl SectionLabels {
    pub fn labels_for(&self, topic: Topic) -> &[String] {
        self.by_topic.get(&topic).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn insert(&mut self, topic: Topic, cell: &str) {
        let labels: Vec<String> = split_labels(cell)
            .into_iter()
            .filter(|l| !EMPTY_MARKERS.contains(&l.to_lowercase().as_str()))
            .collect();
        if !labels.is_empty() {
            self.by_topic.entry(topic).or_default().extend(labels);
        }
    }

    pub fn topics(&self) -> impl Iterator<Item = (Topic, &[String])> {
        self.by_topic.iter().map(|(t, l)| (*t, l.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.by_topic.is_empty()
    }

    /// Labels taken from the topic columns of a species row.
    pub fn from_row(row: &ReportRow) -> Self {
        let mut labels = Self::default();
        for topic in Topic::ALL {
            if let Some(cell) = row.get(topic.column_name()) {
                labels.insert(topic, cell);
            }
        }
        labels
    }
}

/// Parses a model reply into topic labels. Never fails: a reply without a
/// JSON object, or whose object does not fit the topic schema, gives an
/// empty result and a warning.
pub fn parse_section_labels(response: &str) -> SectionLabels {
    let Some(json) = json_object(response) else {
        tracing::warn!("No JSON object in model reply ({} chars)", response.len());
        return SectionLabels::default();
    };

    let raw: BTreeMap<Topic, Option<LabelValue>> = match serde_json::from_str(json) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!("Model reply does not match the topic schema: {}", e);
            return SectionLabels::default();
        }
    };

    let mut labels = SectionLabels::default();
    for (topic, value) in raw {
        match value {
            Some(LabelValue::One(cell)) => labels.insert(topic, &cell),
            Some(LabelValue::Many(cells)) => cells.iter().for_each(|cell| labels.insert(topic, cell)),
            None => {}
        }
    }
    labels
}

fn json_object(response: &str) -> Option<&str> {
    if let Some(caps) = FENCED_JSON_RE.captures(response) {
        return caps.get(1).map(|m| m.as_str());
    }
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    (end > start).then(|| &response[start..=end])
}
