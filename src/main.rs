// src/main.rs
use std::path::PathBuf;

use clap::Parser;
use report_sections::extractors::matcher::MatchStrategy;
use report_sections::extractors::toc::{TocConfig, TocLineMode};
use report_sections::pipeline::{Pipeline, PipelineOptions};
use report_sections::reports::models::SPECIES_COLUMN;
use report_sections::reports::reader::read_report_table;
use report_sections::reports::ReportTable;
use report_sections::storage::StorageManager;
use report_sections::utils::{self, AppError};
use report_sections::{LocatorConfig, SectionLocator};

/// Command Line Interface for the report section locator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Species table (CSV) with a `strategy_file` column
    #[arg(short, long)]
    input_csv: PathBuf,

    /// Directory holding the converted report texts (`*_cleaned.txt`)
    #[arg(short, long, default_value = "strategy_materials")]
    reports_dir: PathBuf,

    /// Output directory for the updated table and metadata
    #[arg(short, long, default_value = "./output")]
    output_dir: PathBuf,

    /// File name of the updated table inside the output directory
    #[arg(long, default_value = "updated_output.csv")]
    output_file: String,

    /// Text that opens the table of contents
    #[arg(long, env = "TOC_MARKER", default_value = "Sisukord")]
    toc_marker: String,

    /// Minimum run of leader dots that makes a line a TOC line
    #[arg(long, env = "TOC_MIN_LEADER_DOTS", default_value_t = 5)]
    min_leader_dots: usize,

    /// Consecutive non-TOC lines after which the TOC is considered over
    #[arg(long, env = "TOC_MAX_NON_TOC_RUN", default_value_t = 10)]
    max_non_toc_run: usize,

    /// Stop the TOC at the first page break
    #[arg(long)]
    single_page_toc: bool,

    /// Keep non-dotted lines inside the TOC as entries
    #[arg(long)]
    loose_toc: bool,

    /// How requested labels are matched against TOC entries
    #[arg(long, value_enum, default_value = "containment-then-similarity")]
    strategy: MatchStrategy,

    /// Similarity ratio a TOC entry must exceed to match
    #[arg(long, env = "SIMILARITY_THRESHOLD", default_value_t = 0.9)]
    similarity_threshold: f64,

    /// Accept any whitespace run where a heading has a space
    #[arg(long)]
    flexible_whitespace: bool,

    /// Column holding the species name
    #[arg(long, default_value = SPECIES_COLUMN)]
    species_column: String,

    /// Column holding a raw model reply with section labels (optional)
    #[arg(long)]
    response_column: Option<String>,

    /// Leave rows without a TOC empty instead of collecting species mentions
    #[arg(long)]
    no_mention_fallback: bool,

    /// Also save every located section as a text file
    #[arg(long)]
    save_sections: bool,

    /// Debug mode - verbose logging and annotated report copies
    #[arg(short, long)]
    debug: bool,
}

impl Args {
    fn locator_config(&self) -> Result<LocatorConfig, AppError> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(AppError::Config(format!(
                "similarity threshold must be within 0..=1, got {}",
                self.similarity_threshold
            )));
        }
        if self.toc_marker.trim().is_empty() {
            return Err(AppError::Config("TOC marker must not be empty".to_string()));
        }

        Ok(LocatorConfig {
            toc: TocConfig {
                marker: self.toc_marker.clone(),
                min_leader_dots: self.min_leader_dots,
                max_non_toc_run: self.max_non_toc_run,
                cross_page_breaks: !self.single_page_toc,
                line_mode: if self.loose_toc { TocLineMode::Loose } else { TocLineMode::DotLeaders },
            },
            strategy: self.strategy,
            similarity_threshold: self.similarity_threshold,
            flexible_whitespace: self.flexible_whitespace,
        })
    }
}

fn main() -> Result<(), AppError> {
    // 1. Parse CLI Arguments
    let args = Args::parse();

    // 2. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging(args.debug);
    tracing::info!("Starting processing for args: {:?}", args);

    // 3. Build the locator from the CLI thresholds
    let config = args.locator_config()?;
    tracing::debug!("Locator config: {:?}", config);
    let locator = SectionLocator::new(config);

    // 4. Initialize storage
    let storage = StorageManager::new(&args.output_dir)?;
    let debug_dir = if args.debug {
        let dir = storage.base_dir().join("debug");
        std::fs::create_dir_all(&dir)?;
        Some(dir)
    } else {
        None
    };

    // 5. Load the species table
    let table = read_report_table(&args.input_csv)?;
    if table.rows.is_empty() {
        return Err(AppError::Config(format!("No rows in {}", args.input_csv.display())));
    }

    // 6. Process each row
    let options = PipelineOptions {
        species_column: args.species_column.clone(),
        response_column: args.response_column.clone(),
        mention_fallback: !args.no_mention_fallback,
        debug_dir,
    };
    let pipeline = Pipeline::new(locator, &args.reports_dir, options);
    let ReportTable { headers, rows } = table;
    let (outcomes, summary) = pipeline.run(rows);

    // 7. Persist results
    if args.save_sections {
        for outcome in &outcomes {
            let species = outcome.row.species(&args.species_column);
            if let Err(e) = storage.save_sections(species, &outcome.sections) {
                tracing::error!("Failed to save sections for '{}': {}", species, e);
            }
        }
    }

    let updated = ReportTable {
        headers,
        rows: outcomes.into_iter().map(|o| o.row).collect(),
    };
    storage.write_table(&args.output_file, &updated)?;
    storage.save_run_metadata(&summary)?;

    tracing::info!(
        "Processing finished. Rows with sections: {}, fallback: {}, failures: {}",
        summary.located,
        summary.fallback,
        summary.failed
    );

    if summary.located == 0 && summary.fallback == 0 && summary.failed > 0 {
        return Err(AppError::Processing(format!(
            "Failed to extract any sections from {} rows",
            summary.failed
        )));
    }

    Ok(())
}
