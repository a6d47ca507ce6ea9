// src/pipeline.rs
//! Batch orchestration over a species table.
//!
//! Each row names one or more converted reports. The pipeline picks the
//! report, gathers the section labels for the row, locates the sections and
//! writes the text back into the row. No row failure stops the batch.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::extractors::mentions::{most_mentioned, paragraphs_mentioning, species_stem};
use crate::extractors::section::{ExtractedSection, SectionLocator};
use crate::extractors::toc::find_table_of_contents;
use crate::reports::labels::{parse_section_labels, SectionLabels};
use crate::reports::models::{
    ReportRow, Topic, EXTRACTED_TEXT_COLUMN, NOT_PRESENT, SPECIES_COLUMN, STRATEGY_FILE_COLUMN,
};
use crate::reports::reader::{read_report_text, text_path_for};
use crate::utils::error::{ExtractError, ReportError};
use crate::utils::text_debug::save_annotated_text;

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub species_column: String,
    /// Column holding a raw model reply with section labels. When the
    /// reply is missing or unusable, the topic columns are used instead.
    pub response_column: Option<String>,
    /// Use paragraphs mentioning the species when a report has no TOC.
    pub mention_fallback: bool,
    /// Directory for annotated copies of each report text.
    pub debug_dir: Option<PathBuf>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            species_column: SPECIES_COLUMN.to_string(),
            response_column: None,
            mention_fallback: true,
            debug_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowStatus {
    /// Sections were located through the TOC.
    Located { found: usize, missing: usize },
    /// No TOC; text came from paragraphs mentioning the species.
    Fallback { paragraphs: usize },
    /// No report file is listed, or none mentions the species.
    NoReport,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct RowOutcome {
    pub row: ReportRow,
    pub status: RowStatus,
    pub sections: Vec<(Topic, ExtractedSection)>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub rows: usize,
    pub located: usize,
    pub fallback: usize,
    pub no_report: usize,
    pub failed: usize,
    pub sections_found: usize,
    pub sections_missing: usize,
}

impl RunSummary {
    fn record(&mut self, status: &RowStatus) {
        self.rows += 1;
        match status {
            RowStatus::Located { found, missing } => {
                self.located += 1;
                self.sections_found += found;
                self.sections_missing += missing;
            }
            RowStatus::Fallback { .. } => self.fallback += 1,
            RowStatus::NoReport => self.no_report += 1,
            RowStatus::Failed(_) => self.failed += 1,
        }
    }
}

pub struct Pipeline {
    locator: SectionLocator,
    reports_dir: PathBuf,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(locator: SectionLocator, reports_dir: impl Into<PathBuf>, options: PipelineOptions) -> Self {
        Self { locator, reports_dir: reports_dir.into(), options }
    }

    pub fn run(&self, rows: Vec<ReportRow>) -> (Vec<RowOutcome>, RunSummary) {
        let mut summary = RunSummary::default();
        let outcomes: Vec<RowOutcome> = rows
            .into_iter()
            .map(|row| {
                let outcome = self.process_row(row);
                summary.record(&outcome.status);
                outcome
            })
            .collect();

        tracing::info!(
            "Processed {} rows: {} located, {} fallback, {} without report, {} failed",
            summary.rows,
            summary.located,
            summary.fallback,
            summary.no_report,
            summary.failed
        );
        (outcomes, summary)
    }

    pub fn process_row(&self, mut row: ReportRow) -> RowOutcome {
        let species = row.species(&self.options.species_column).to_string();
        let stem = species_stem(&species).to_string();

        let (report, text) = match self.choose_report(&row, &stem) {
            Ok(Some(chosen)) => chosen,
            Ok(None) => {
                tracing::info!("No report for '{}'", species);
                row.set(STRATEGY_FILE_COLUMN, NOT_PRESENT);
                return RowOutcome { row, status: RowStatus::NoReport, sections: Vec::new() };
            }
            Err(e) => {
                tracing::error!("Could not read report for '{}': {}", species, e);
                return RowOutcome { row, status: RowStatus::Failed(e.to_string()), sections: Vec::new() };
            }
        };
        row.set(STRATEGY_FILE_COLUMN, report.as_str());

        let labels = self.labels_for(&row);
        let toc = match find_table_of_contents(&text, &self.locator.config().toc) {
            Ok(toc) => toc,
            Err(ExtractError::TocNotFound) if self.options.mention_fallback => {
                tracing::warn!("No table of contents in {}, falling back to species mentions", report);
                return self.mention_fallback(row, &text, &stem);
            }
            Err(e) => {
                tracing::warn!("Skipping {} for '{}': {}", report, species, e);
                return RowOutcome { row, status: RowStatus::Failed(e.to_string()), sections: Vec::new() };
            }
        };

        let body = toc.body(&text);
        let mut sections = Vec::new();
        let mut missing = 0;
        for (topic, topic_labels) in labels.topics() {
            let located = self.locator.locate_in(&toc, &body, topic_labels);
            missing += located.missing.len();
            if !located.is_empty() {
                row.set(&topic.output_column(), located.joined());
            }
            sections.extend(located.found.into_iter().map(|s| (topic, s)));
        }

        let extracted = sections
            .iter()
            .map(|(_, s)| s.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        if !extracted.is_empty() {
            row.set(EXTRACTED_TEXT_COLUMN, extracted);
        }

        if let Some(dir) = &self.options.debug_dir {
            let mut marks = vec![
                (toc.span.start, "TOC START".to_string()),
                (toc.span.end, "TOC END".to_string()),
            ];
            marks.extend(sections.iter().map(|(topic, s)| {
                (toc.document_offset(s.body_offset), format!("{}: {}", topic, s.toc_label))
            }));
            let path = annotated_path(dir, &report);
            if let Err(e) = save_annotated_text(&text, &path, &marks) {
                tracing::warn!("Failed to save annotated text for {}: {}", report, e);
            }
        }

        let status = RowStatus::Located { found: sections.len(), missing };
        RowOutcome { row, status, sections }
    }

    /// Picks the report for a row and reads its text. With several listed
    /// reports, the one mentioning the species most wins.
    fn choose_report(&self, row: &ReportRow, stem: &str) -> Result<Option<(String, String)>, ReportError> {
        let files = row.strategy_files();
        match files.as_slice() {
            [] => Ok(None),
            [single] => {
                let text = read_report_text(&text_path_for(&self.reports_dir, single))?;
                Ok(Some((single.clone(), text)))
            }
            many => {
                let mut candidates = Vec::new();
                for file in many {
                    match read_report_text(&text_path_for(&self.reports_dir, file)) {
                        Ok(text) => candidates.push((file.clone(), text)),
                        Err(e) => tracing::warn!("Skipping candidate report {}: {}", file, e),
                    }
                }
                let Some(best) = most_mentioned(&candidates, stem).map(str::to_string) else {
                    return Ok(None);
                };
                tracing::debug!("Chose {} among {} reports for '{}'", best, many.len(), stem);
                Ok(candidates.into_iter().find(|(file, _)| *file == best))
            }
        }
    }

    fn labels_for(&self, row: &ReportRow) -> SectionLabels {
        if let Some(reply) = self
            .options
            .response_column
            .as_deref()
            .and_then(|column| row.get(column))
            .filter(|reply| !reply.trim().is_empty())
        {
            let labels = parse_section_labels(reply);
            if !labels.is_empty() {
                return labels;
            }
        }
        SectionLabels::from_row(row)
    }

    fn mention_fallback(&self, mut row: ReportRow, text: &str, stem: &str) -> RowOutcome {
        let paragraphs = match paragraphs_mentioning(text, stem) {
            Ok(paragraphs) => paragraphs,
            Err(e) => {
                return RowOutcome { row, status: RowStatus::Failed(e.to_string()), sections: Vec::new() };
            }
        };
        if !paragraphs.is_empty() {
            row.set(EXTRACTED_TEXT_COLUMN, paragraphs.join("\n"));
        }
        let status = RowStatus::Fallback { paragraphs: paragraphs.len() };
        RowOutcome { row, status, sections: Vec::new() }
    }
}

fn annotated_path(dir: &Path, report: &str) -> PathBuf {
    let stem = Path::new(report)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    dir.join(format!("{}_annotated.txt", stem))
}
