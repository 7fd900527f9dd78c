//! Loader for on-disk catalogs, responses and batches
//!
//! A data directory holds:
//! - questions.json: array of question definitions
//! - responses.json: array of respondent records (one object per row)
//!
//! Batches (segments + cuts) live in their own JSON file. Malformed input is
//! rejected here, before anything reaches the validator or the executor.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::dataset::{Dataset, DatasetError};

use super::errors::{parse_json, SpecError};
use super::spec::{BatchSpec, CutSpec, SegmentSpec};
use super::types::Catalog;

/// Default separator used when joining multi-choice arrays
const DEFAULT_DELIMITER: &str = ";";

/// File name of the question catalog inside a data directory
pub const QUESTIONS_FILE: &str = "questions.json";
/// File name of the responses inside a data directory
pub const RESPONSES_FILE: &str = "responses.json";

/// Loader errors
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid specification in '{path}': {source}")]
    Spec {
        path: PathBuf,
        #[source]
        source: SpecError,
    },

    #[error("invalid responses in '{path}': {source}")]
    Dataset {
        path: PathBuf,
        #[source]
        source: DatasetError,
    },
}

/// Result type for loader operations
pub type LoadResult<T> = Result<T, LoadError>;

/// Reads the catalog and responses of one data directory.
pub struct DataLoader {
    data_dir: PathBuf,
}

impl DataLoader {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn questions_path(&self) -> PathBuf {
        self.data_dir.join(QUESTIONS_FILE)
    }

    pub fn responses_path(&self) -> PathBuf {
        self.data_dir.join(RESPONSES_FILE)
    }

    /// Loads and checks the question catalog.
    pub fn load_catalog(&self) -> LoadResult<Catalog> {
        load_catalog(&self.questions_path())
    }

    /// Loads the responses as an in-memory dataset.
    ///
    /// Array cells (multi-choice answers) are joined with `delimiter`.
    pub fn load_dataset(&self, delimiter: &str) -> LoadResult<Dataset> {
        load_dataset_with_delimiter(&self.responses_path(), delimiter)
    }

    /// SHA-256 over the catalog and responses files, for reproducibility checks.
    pub fn fingerprint(&self) -> LoadResult<String> {
        fingerprint_files(&[self.questions_path(), self.responses_path()])
    }
}

/// Loads a question catalog (JSON array of questions).
pub fn load_catalog(path: &Path) -> LoadResult<Catalog> {
    let value = read_json(path)?;
    Catalog::from_json(&value).map_err(|source| spec_error(path, source))
}

/// Loads a JSON array of segment specs; segment ids must be unique.
pub fn load_segments(path: &Path) -> LoadResult<Vec<SegmentSpec>> {
    let value = read_json(path)?;
    let batch = BatchSpec {
        segments: parse_json(&value, "segment specs").map_err(|source| spec_error(path, source))?,
        cuts: Vec::new(),
    };
    batch.check_unique_ids().map_err(|source| spec_error(path, source))?;
    Ok(batch.segments)
}

/// Loads a JSON array of cut specs; cut ids must be unique.
pub fn load_cuts(path: &Path) -> LoadResult<Vec<CutSpec>> {
    let value = read_json(path)?;
    let batch = BatchSpec {
        segments: Vec::new(),
        cuts: parse_json(&value, "cut specs").map_err(|source| spec_error(path, source))?,
    };
    batch.check_unique_ids().map_err(|source| spec_error(path, source))?;
    Ok(batch.cuts)
}

/// Loads a batch of segments and cuts.
pub fn load_batch(path: &Path) -> LoadResult<BatchSpec> {
    let value = read_json(path)?;
    BatchSpec::from_json(&value).map_err(|source| spec_error(path, source))
}

/// Loads respondent records with the default multi-choice delimiter.
pub fn load_dataset(path: &Path) -> LoadResult<Dataset> {
    load_dataset_with_delimiter(path, DEFAULT_DELIMITER)
}

/// Loads respondent records (JSON array of objects) as a dataset.
pub fn load_dataset_with_delimiter(path: &Path, delimiter: &str) -> LoadResult<Dataset> {
    let value = read_json(path)?;
    Dataset::from_records(&value, delimiter).map_err(|source| LoadError::Dataset {
        path: path.to_path_buf(),
        source,
    })
}

/// Hashes the concatenated contents of `paths` in order.
pub fn fingerprint_files<P: AsRef<Path>>(paths: &[P]) -> LoadResult<String> {
    let mut hasher = Sha256::new();
    for path in paths {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        hasher.update(&bytes);
    }

    Ok(hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect())
}

fn spec_error(path: &Path, source: SpecError) -> LoadError {
    LoadError::Spec {
        path: path.to_path_buf(),
        source,
    }
}

fn read_json(path: &Path) -> LoadResult<Value> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Scalar;
    use serde_json::json;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, value: &Value) {
        fs::write(dir.join(name), serde_json::to_string(value).unwrap()).unwrap();
    }

    #[test]
    fn test_load_catalog_and_dataset() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            QUESTIONS_FILE,
            &json!([
                {"question_id": "Q_NPS", "label": "Recommend?", "type": "nps_0_10"},
                {"question_id": "Q_FEATURES", "label": "Features", "type": "multi_choice",
                 "options": [{"code": "A", "label": "A"}, {"code": "B", "label": "B"}]}
            ]),
        );
        write(
            tmp.path(),
            RESPONSES_FILE,
            &json!([
                {"Q_NPS": 10, "Q_FEATURES": ["A", "B"]},
                {"Q_NPS": null, "Q_FEATURES": "B"}
            ]),
        );

        let loader = DataLoader::new(tmp.path());
        let catalog = loader.load_catalog().unwrap();
        assert_eq!(catalog.len(), 2);

        let dataset = loader.load_dataset(";").unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.column_names(), vec!["Q_NPS", "Q_FEATURES"]);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let loader = DataLoader::new(tmp.path());
        assert!(matches!(loader.load_catalog(), Err(LoadError::Io { .. })));
    }

    #[test]
    fn test_invalid_json_reported_with_path() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(QUESTIONS_FILE), "{not json").unwrap();

        let err = DataLoader::new(tmp.path()).load_catalog().unwrap_err();
        assert!(matches!(err, LoadError::Json { .. }));
        assert!(err.to_string().contains(QUESTIONS_FILE));
    }

    #[test]
    fn test_fingerprint_is_stable_and_content_sensitive() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), QUESTIONS_FILE, &json!([]));
        write(tmp.path(), RESPONSES_FILE, &json!([]));

        let loader = DataLoader::new(tmp.path());
        let first = loader.fingerprint().unwrap();
        assert_eq!(first.len(), 64);
        assert_eq!(first, loader.fingerprint().unwrap());

        write(tmp.path(), RESPONSES_FILE, &json!([{"Q1": 1}]));
        assert_ne!(first, loader.fingerprint().unwrap());
    }

    #[test]
    fn test_load_batch() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("batch.json");
        write(
            tmp.path(),
            "batch.json",
            &json!({
                "segments": [{"segment_id": "s1", "name": "S1",
                              "definition": {"kind": "eq", "question_id": "Q1", "value": 1}}],
                "cuts": [{"cut_id": "c1", "metric": {"type": "mean", "question_id": "Q1"}}]
            }),
        );

        let batch = load_batch(&path).unwrap();
        assert_eq!(batch.segments.len(), 1);
        assert_eq!(batch.cuts.len(), 1);
    }

    #[test]
    fn test_load_segments_and_cuts_separately() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "segments.json",
            &json!([{"segment_id": "s1", "name": "S1",
                     "definition": {"kind": "range", "question_id": "Q1", "min": 1}}]),
        );
        write(
            tmp.path(),
            "cuts.json",
            &json!([
                {"cut_id": "c1", "metric": {"type": "mean", "question_id": "Q1"}},
                {"cut_id": "c1", "metric": {"type": "frequency", "question_id": "Q1"}}
            ]),
        );

        let segments = load_segments(&tmp.path().join("segments.json")).unwrap();
        assert_eq!(segments[0].segment_id, "s1");

        let err = load_cuts(&tmp.path().join("cuts.json")).unwrap_err();
        assert!(matches!(err, LoadError::Spec { .. }));
    }

    #[test]
    fn test_load_dataset_by_path() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "rows.json", &json!([{"Q1": ["A", "B"]}]));

        let dataset = load_dataset(&tmp.path().join("rows.json")).unwrap();
        assert_eq!(
            dataset.column("Q1").and_then(|c| c.get(0)),
            Some(&Scalar::from("A;B"))
        );
    }
}
