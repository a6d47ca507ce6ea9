// src/storage/mod.rs
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::extractors::section::ExtractedSection;
use crate::reports::models::{ReportTable, Topic};
use crate::utils::error::StorageError;

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Writes the species table, including every column added during the run.
    pub fn write_table(&self, file_name: &str, table: &ReportTable) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(file_name);
        let headers = table.all_headers();

        let mut writer = csv::Writer::from_path(&file_path)?;
        writer.write_record(&headers)?;
        for row in &table.rows {
            writer.write_record(headers.iter().map(|h| row.get(h).unwrap_or_default()))?;
        }
        writer.flush().map_err(StorageError::IoError)?;

        tracing::info!("Saved {} rows to {}", table.rows.len(), file_path.display());
        Ok(file_path)
    }

    /// Saves one located section as text under `<base>/<species>/`.
    pub fn save_section(
        &self,
        species: &str,
        topic: Topic,
        index: usize,
        section: &ExtractedSection,
    ) -> Result<PathBuf, StorageError> {
        let target_dir = self.base_dir.join(file_safe(species));
        if !target_dir.exists() {
            fs::create_dir_all(&target_dir).map_err(StorageError::IoError)?;
        }

        let filename = format!("{}_{}.txt", file_safe(topic.column_name()), index + 1);
        let file_path = target_dir.join(filename);
        fs::write(&file_path, &section.content).map_err(StorageError::IoError)?;

        tracing::debug!("Saved section '{}' to {}", section.toc_label, file_path.display());
        Ok(file_path)
    }

    /// Saves a row's sections, numbering files within each topic.
    pub fn save_sections(
        &self,
        species: &str,
        sections: &[(Topic, ExtractedSection)],
    ) -> Result<Vec<PathBuf>, StorageError> {
        let mut per_topic: BTreeMap<Topic, usize> = BTreeMap::new();
        let mut paths = Vec::with_capacity(sections.len());
        for (topic, section) in sections {
            let index = per_topic.entry(*topic).or_default();
            paths.push(self.save_section(species, *topic, *index, section)?);
            *index += 1;
        }
        Ok(paths)
    }

    /// Saves run metadata in JSON format
    pub fn save_run_metadata<T: Serialize>(&self, summary: &T) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join("run_meta.json");

        let metadata = serde_json::json!({
            "summary": summary,
            "extraction_timestamp": chrono::Utc::now().to_rfc3339(),
        });

        let metadata_str = serde_json::to_string_pretty(&metadata)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, metadata_str).map_err(StorageError::IoError)?;

        tracing::info!("Saved metadata to {}", file_path.display());
        Ok(file_path)
    }
}

/// Lowercased name usable as a file or directory name.
fn file_safe(name: &str) -> String {
    let safe: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    let safe = safe.trim_matches('_').to_string();
    if safe.is_empty() {
        "unnamed".to_string()
    } else {
        safe
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::matcher::MatchKind;
    use crate::reports::models::ReportRow;

    fn section(content: &str) -> ExtractedSection {
        ExtractedSection {
            request: "Ohud".to_string(),
            toc_label: "2.2 Ohud".to_string(),
            toc_index: 2,
            match_kind: MatchKind::Containment,
            score: 1.0,
            body_offset: 0,
            content: content.to_string(),
        }
    }

    #[test]
    fn test_write_table_includes_added_columns() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(dir.path().join("out")).unwrap();

        let mut first = ReportRow::new([("Estonian Name", "merikotkas"), ("strategy_file", "a.pdf")]);
        first.set("Extracted_Text", "2.2 Ohud\nHäirimine, mürgitus");
        let second = ReportRow::new([("Estonian Name", "kaljukotkas"), ("strategy_file", "Not Present")]);
        let table = ReportTable {
            headers: vec!["Estonian Name".to_string(), "strategy_file".to_string()],
            rows: vec![first, second],
        };

        let path = storage.write_table("updated_output.csv", &table).unwrap();
        let mut reader = csv::Reader::from_path(path).unwrap();
        assert_eq!(reader.headers().unwrap(), vec!["Estonian Name", "strategy_file", "Extracted_Text"]);
        let records: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(&records[0][2], "2.2 Ohud\nHäirimine, mürgitus");
        assert_eq!(&records[1][2], "");
    }

    #[test]
    fn test_save_section_and_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(dir.path()).unwrap();

        let path = storage
            .save_section("Merikotkas (LC)", Topic::Threats, 0, &section("2.2 Ohud\nTekst"))
            .unwrap();
        assert_eq!(path, dir.path().join("merikotkas__lc").join("ohud_1.txt"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "2.2 Ohud\nTekst");

        let meta = storage.save_run_metadata(&serde_json::json!({ "rows": 3 })).unwrap();
        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(meta).unwrap()).unwrap();
        assert_eq!(value["summary"]["rows"], 3);
        assert!(value["extraction_timestamp"].is_string());
    }

    #[test]
    fn test_save_sections_numbers_files_per_topic() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(dir.path()).unwrap();
        let sections = vec![
            (Topic::Habitat, section("2.1 Elupaik")),
            (Topic::Habitat, section("2.4 Toitumisalad")),
            (Topic::Threats, section("2.2 Ohud")),
        ];

        let paths = storage.save_sections("merikotkas", &sections).unwrap();
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["elupaik_1.txt", "elupaik_2.txt", "ohud_1.txt"]);
        assert_eq!(fs::read_to_string(&paths[2]).unwrap(), "2.2 Ohud");
    }

    #[test]
    fn test_file_safe() {
        assert_eq!(file_safe("Populatsiooni muutused Eestis"), "populatsiooni_muutused_eestis");
        assert_eq!(file_safe("Kokkuvõte"), "kokkuvõte");
        assert_eq!(file_safe(" () "), "unnamed");
    }
}
