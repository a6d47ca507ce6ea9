// src/reports/mod.rs
pub mod labels;
pub mod models;
pub mod reader;

pub use labels::{parse_section_labels, SectionLabels};
pub use models::{ReportRow, ReportTable, Topic};
