// src/extractors/mod.rs
pub mod matcher;
pub mod mentions;
pub mod normalize;
pub mod section;
pub mod toc;

// Re-export key extraction types for convenience
pub use matcher::{MatchKind, MatchStrategy, SectionMatcher, TocMatch};
pub use section::{extract_span, ExtractedSection, LocatedSections, MissingSection, SectionLocator};
pub use toc::{find_table_of_contents, TocConfig, TocEntry, TocLineMode, TocRegion};
