// src/reports/models.rs
use std::fmt;

use serde::{Deserialize, Serialize};

pub const SPECIES_COLUMN: &str = "Estonian Name";
pub const STRATEGY_FILE_COLUMN: &str = "strategy_file";
pub const EXTRACTED_TEXT_COLUMN: &str = "Extracted_Text";
pub const NOT_PRESENT: &str = "Not Present";

/// Research topics a species report is mined for. The serde names are the
/// Estonian column headers used in the species tables and LLM replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Topic {
    #[serde(rename = "Elupaik")]
    Habitat,
    #[serde(rename = "Elupaiga seisund")]
    HabitatCondition,
    #[serde(rename = "Ohud")]
    Threats,
    #[serde(rename = "Populatsiooni muutused Eestis")]
    PopulationTrend,
    #[serde(rename = "Uuringud")]
    Studies,
    #[serde(rename = "Seisund ELis")]
    EuStatus,
    #[serde(rename = "Kokkuvõte")]
    Summary,
}

impl Topic {
    pub const ALL: [Topic; 7] = [
        Topic::Habitat,
        Topic::HabitatCondition,
        Topic::Threats,
        Topic::PopulationTrend,
        Topic::Studies,
        Topic::EuStatus,
        Topic::Summary,
    ];

    pub fn column_name(self) -> &'static str {
        match self {
            Topic::Habitat => "Elupaik",
            Topic::HabitatCondition => "Elupaiga seisund",
            Topic::Threats => "Ohud",
            Topic::PopulationTrend => "Populatsiooni muutused Eestis",
            Topic::Studies => "Uuringud",
            Topic::EuStatus => "Seisund ELis",
            Topic::Summary => "Kokkuvõte",
        }
    }

    /// Column that receives the located text for this topic.
    pub fn output_column(self) -> String {
        format!("{} tekst", self.column_name())
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// One row of a species table, columns kept in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportRow {
    fields: Vec<(String, String)>,
}

impl ReportRow {
    pub fn new<K: Into<String>, V: Into<String>>(fields: impl IntoIterator<Item = (K, V)>) -> Self {
        Self {
            fields: fields.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == column)
            .map(|(_, v)| v.as_str())
    }

    /// Sets a column, appending it when the row does not have it yet.
    pub fn set(&mut self, column: &str, value: impl Into<String>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| k == column) {
            Some((_, v)) => *v = value,
            None => self.fields.push((column.to_string(), value)),
        }
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn species(&self, column: &str) -> &str {
        self.get(column).unwrap_or_default().trim()
    }

    /// Report files listed for the species; the cell may hold several.
    pub fn strategy_files(&self) -> Vec<String> {
        self.get(STRATEGY_FILE_COLUMN)
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty() && *s != NOT_PRESENT)
            .map(str::to_string)
            .collect()
    }
}

/// A species table: header order plus rows.
#[derive(Debug, Clone, Default)]
pub struct ReportTable {
    pub headers: Vec<String>,
    pub rows: Vec<ReportRow>,
}

impl ReportTable {
    /// Header list covering every column any row carries, original
    /// columns first.
    pub fn all_headers(&self) -> Vec<String> {
        let mut headers = self.headers.clone();
        for row in &self.rows {
            for (k, _) in row.fields() {
                if !headers.contains(k) {
                    headers.push(k.clone());
                }
            }
        }
        headers
    }
}
