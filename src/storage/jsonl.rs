//! JSONL (JSON Lines) storage.
//!
//! JSONL is the source of truth for normalized match records.
//! Each line is a valid JSON object representing one entity.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use super::{StorageConfig, StorageError};
use crate::models::MatchRecord;

/// Entity types for JSONL storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityType {
    Match,
    Report,
}

impl EntityType {
    /// Get the filename for this entity type.
    pub fn filename(&self) -> &'static str {
        match self {
            EntityType::Match => "matches.jsonl",
            EntityType::Report => "reports.jsonl",
        }
    }

    /// Full path of this entity's file.
    pub fn path(&self, config: &StorageConfig) -> PathBuf {
        let dir = match self {
            EntityType::Match => config.normalized_dir(),
            EntityType::Report => config.derived_dir(),
        };
        dir.join(self.filename())
    }
}

/// JSONL file writer.
pub struct JsonlWriter<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: Serialize> JsonlWriter<T> {
    /// Create a new JSONL writer for the given path.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Create a writer for a specific entity type.
    pub fn for_entity(config: &StorageConfig, entity: EntityType) -> Self {
        Self::new(entity.path(config))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure the parent directory exists.
    fn ensure_dir(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Append a single entity to the file.
    pub fn append(&self, entity: &T) -> Result<(), StorageError> {
        self.ensure_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = BufWriter::new(file);
        let json = serde_json::to_string(entity)?;
        writeln!(writer, "{}", json)?;
        writer.flush()?;

        debug!("Appended entity to {:?}", self.path);
        Ok(())
    }

    /// Write entities, replacing the entire file.
    pub fn write_all(&self, entities: &[T]) -> Result<usize, StorageError> {
        self.ensure_dir()?;

        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        let mut count = 0;

        for entity in entities {
            let json = serde_json::to_string(entity)?;
            writeln!(writer, "{}", json)?;
            count += 1;
        }

        writer.flush()?;
        info!("Wrote {} entities to {:?}", count, self.path);

        Ok(count)
    }
}

/// JSONL file reader.
pub struct JsonlReader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonlReader<T> {
    /// Create a new JSONL reader for the given path.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Create a reader for a specific entity type.
    pub fn for_entity(config: &StorageConfig, entity: EntityType) -> Self {
        Self::new(entity.path(config))
    }

    /// Check if the file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read all entities from the file.
    ///
    /// A missing file reads as empty. Lines that fail to parse are logged
    /// and skipped.
    pub fn read_all(&self) -> Result<Vec<T>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut entities = Vec::new();
        let mut line_num = 0;

        for line in reader.lines() {
            line_num += 1;
            let line = line?;

            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str(&line) {
                Ok(entity) => entities.push(entity),
                Err(e) => {
                    warn!(
                        "Failed to parse line {} in {:?}: {}",
                        line_num, self.path, e
                    );
                }
            }
        }

        debug!("Read {} entities from {:?}", entities.len(), self.path);
        Ok(entities)
    }

    /// Read the last entity in the file, if any.
    pub fn read_last(&self) -> Result<Option<T>, StorageError> {
        Ok(self.read_all()?.pop())
    }
}

/// Read all normalized match records.
pub fn read_matches(config: &StorageConfig) -> Result<Vec<MatchRecord>, StorageError> {
    JsonlReader::<MatchRecord>::for_entity(config, EntityType::Match).read_all()
}

/// Replace the normalized match file, sorted by date then submission time.
pub fn write_matches(
    config: &StorageConfig,
    records: &mut [MatchRecord],
) -> Result<usize, StorageError> {
    records.sort_by_key(|r| (r.date, r.created_at));
    JsonlWriter::<MatchRecord>::for_entity(config, EntityType::Match).write_all(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    use crate::models::{Pair, SetScore};

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct TestEntity {
        id: String,
        value: u32,
    }

    fn test_config(temp_dir: &TempDir) -> StorageConfig {
        StorageConfig::new(temp_dir.path().to_path_buf())
    }

    fn record(date: &str, winner: &str) -> MatchRecord {
        MatchRecord::new(
            NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
            Pair::new(winner, "Carol"),
            Pair::new("Bob", "Dave"),
            vec![SetScore::new(6, 2), SetScore::new(6, 3)],
        )
    }

    #[test]
    fn test_jsonl_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.jsonl");

        let entities = vec![
            TestEntity {
                id: "1".to_string(),
                value: 100,
            },
            TestEntity {
                id: "2".to_string(),
                value: 200,
            },
        ];

        let writer: JsonlWriter<TestEntity> = JsonlWriter::new(path.clone());
        assert_eq!(writer.write_all(&entities).unwrap(), 2);

        let reader: JsonlReader<TestEntity> = JsonlReader::new(path);
        assert_eq!(reader.read_all().unwrap(), entities);
    }

    #[test]
    fn test_jsonl_append_and_read_last() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("append.jsonl");

        let writer: JsonlWriter<TestEntity> = JsonlWriter::new(path.clone());
        let reader: JsonlReader<TestEntity> = JsonlReader::new(path);
        assert_eq!(reader.read_last().unwrap(), None);

        for value in [1, 2] {
            writer
                .append(&TestEntity {
                    id: value.to_string(),
                    value,
                })
                .unwrap();
        }

        assert!(reader.exists());
        assert_eq!(reader.read_all().unwrap().len(), 2);
        assert_eq!(reader.read_last().unwrap().map(|e| e.value), Some(2));
    }

    #[test]
    fn test_jsonl_read_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let reader: JsonlReader<TestEntity> =
            JsonlReader::new(temp_dir.path().join("nonexistent.jsonl"));

        assert!(!reader.exists());
        assert!(reader.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_jsonl_skips_bad_lines() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.jsonl");
        fs::write(
            &path,
            "{\"id\":\"1\",\"value\":1}\nnot json\n\n{\"id\":\"2\",\"value\":2}\n",
        )
        .unwrap();

        let reader: JsonlReader<TestEntity> = JsonlReader::new(path);
        assert_eq!(reader.read_all().unwrap().len(), 2);
    }

    #[test]
    fn test_entity_paths() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        assert_eq!(
            EntityType::Match.path(&config),
            config.normalized_dir().join("matches.jsonl")
        );
        let writer: JsonlWriter<TestEntity> = JsonlWriter::for_entity(&config, EntityType::Report);
        assert_eq!(writer.path(), config.derived_dir().join("reports.jsonl"));
    }

    #[test]
    fn test_write_matches_sorted_by_date() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        let mut records = vec![record("2025-03-10", "Alice"), record("2025-03-01", "Eve")];
        assert_eq!(write_matches(&config, &mut records).unwrap(), 2);

        let read = read_matches(&config).unwrap();
        assert_eq!(read.len(), 2);
        assert_eq!(read[0].pair1.player1, "Eve");
        assert_eq!(read[1].pair1.player1, "Alice");
    }
}
