// src/utils/error.rs
use thiserror::Error;

// Errors raised while locating sections inside one report text.
// Every variant is recoverable at the label or document level.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Table of contents not found")]
    TocNotFound,

    #[error("Section not in table of contents: {0}")]
    SectionNotInToc(String),

    #[error("Section heading not found in document body: {0}")]
    SectionBodyNotFound(String),

    #[error("Regular expression error: {0}")]
    RegexError(String),
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Report text not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing column: {0}")]
    MissingColumn(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Report input failed: {0}")]
    Report(#[from] ReportError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Data processing failed: {0}")]
    Processing(String),
}
