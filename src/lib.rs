// src/lib.rs
//! Locates named sections in plain-text species conservation reports by
//! way of their table of contents ("Sisukord"), and runs that over a
//! species table in batch.

pub mod config;
pub mod extractors;
pub mod pipeline;
pub mod reports;
pub mod storage;
pub mod utils;

pub use config::LocatorConfig;
pub use extractors::{ExtractedSection, LocatedSections, SectionLocator};
pub use utils::error::ExtractError;
