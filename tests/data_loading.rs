//! Data Loading Tests
//!
//! Tests for the on-disk boundary:
//! - Malformed input is rejected before validation or execution
//! - Loading is deterministic and fingerprinted
//! - A loaded data directory runs end to end

use std::fs;
use std::path::Path;

use serde_json::{json, Value};
use surveycut::cli::{render_csv, validation_report};
use surveycut::executor::CutExecutor;
use surveycut::schema::{
    fingerprint_files, load_batch, load_catalog, load_cuts, load_dataset, load_segments,
    DataLoader, LoadError, Scalar,
};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn write(dir: &Path, name: &str, value: &Value) {
    fs::write(dir.join(name), serde_json::to_string_pretty(value).unwrap()).unwrap();
}

fn setup_data_dir() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "questions.json",
        &json!([
            {"question_id": "Q_PLAN", "label": "Plan", "type": "single_choice",
             "options": [{"code": 1, "label": "Free"}, {"code": 2, "label": "Pro"}]},
            {"question_id": "Q_NPS", "label": "Recommend", "type": "nps_0_10"},
            {"question_id": "Q_FEATURES", "label": "Features", "type": "multi_choice",
             "options": [{"code": "A", "label": "Alerts"}, {"code": "B", "label": "Billing"}]}
        ]),
    );
    write(
        tmp.path(),
        "responses.json",
        &json!([
            {"Q_PLAN": 1, "Q_NPS": 10, "Q_FEATURES": ["A", "B"]},
            {"Q_PLAN": 2, "Q_NPS": 4,  "Q_FEATURES": ["B"]},
            {"Q_PLAN": 2, "Q_NPS": 9, "Q_FEATURES": "  "},
            {"Q_NPS": 8}
        ]),
    );
    write(
        tmp.path(),
        "batch.json",
        &json!({
            "segments": [
                {"segment_id": "pro", "name": "Pro plan",
                 "definition": {"kind": "eq", "question_id": "Q_PLAN", "value": "2"},
                 "intended_partition": true, "notes": "paying users"}
            ],
            "cuts": [
                {"cut_id": "nps_by_plan", "metric": {"type": "nps", "question_id": "Q_NPS"},
                 "dimensions": [{"kind": "segment", "id": "pro"}]},
                {"cut_id": "features", "metric": {"type": "frequency", "question_id": "Q_FEATURES"},
                 "output": {"chart": "bar"}}
            ]
        }),
    );
    tmp
}

// =============================================================================
// Loading Tests
// =============================================================================

/// Catalog, dataset and batch load from a data directory.
#[test]
fn test_load_data_dir() {
    let tmp = setup_data_dir();
    let catalog = load_catalog(&tmp.path().join("questions.json")).unwrap();
    assert_eq!(catalog.len(), 3);

    let dataset = load_dataset(&tmp.path().join("responses.json")).unwrap();
    assert_eq!(dataset.len(), 4);
    let features = dataset.column("Q_FEATURES").unwrap();
    assert_eq!(features.get(0), Some(&Scalar::from("A;B")));
    // blank strings and absent keys are missing answers
    assert_eq!(features.get(2), None);
    assert_eq!(features.get(3), None);

    let batch = load_batch(&tmp.path().join("batch.json")).unwrap();
    assert!(batch.segments[0].intended_partition);
    assert_eq!(batch.cuts[1].output.get("chart"), Some(&json!("bar")));
}

/// Unknown tagged-union kinds are rejected at load time.
#[test]
fn test_unknown_kinds_rejected() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "segments.json",
        &json!([{"segment_id": "s", "name": "S",
                 "definition": {"kind": "fuzzy", "question_id": "Q_PLAN"}}]),
    );
    write(
        tmp.path(),
        "cuts.json",
        &json!([{"cut_id": "c", "metric": {"type": "nps", "question_id": "Q_NPS"},
                 "dimensions": [{"kind": "respondent", "id": "x"}]}]),
    );

    assert!(matches!(
        load_segments(&tmp.path().join("segments.json")),
        Err(LoadError::Spec { .. })
    ));
    assert!(matches!(
        load_cuts(&tmp.path().join("cuts.json")),
        Err(LoadError::Spec { .. })
    ));
}

/// Duplicate ids in a batch are rejected.
#[test]
fn test_duplicate_ids_rejected() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "batch.json",
        &json!({"cuts": [
            {"cut_id": "c", "metric": {"type": "nps", "question_id": "Q_NPS"}},
            {"cut_id": "c", "metric": {"type": "mean", "question_id": "Q_NPS"}}
        ]}),
    );
    let err = load_batch(&tmp.path().join("batch.json")).unwrap_err();
    assert!(err.to_string().contains("batch.json"));
}

/// Responses must be an array of objects.
#[test]
fn test_responses_must_be_records() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "responses.json", &json!({"Q_NPS": [1, 2]}));
    assert!(matches!(
        load_dataset(&tmp.path().join("responses.json")),
        Err(LoadError::Dataset { .. })
    ));
}

/// Fingerprints are stable and cover every file.
#[test]
fn test_fingerprint() {
    let tmp = setup_data_dir();
    let loader = DataLoader::new(tmp.path());
    let a = loader.fingerprint().unwrap();
    assert_eq!(a, loader.fingerprint().unwrap());
    assert_eq!(
        a,
        fingerprint_files(&[tmp.path().join("questions.json"), tmp.path().join("responses.json")])
            .unwrap()
    );

    write(tmp.path(), "responses.json", &json!([]));
    assert_ne!(a, loader.fingerprint().unwrap());
}

// =============================================================================
// End-to-End Tests
// =============================================================================

/// A clean batch validates and executes without errors.
#[test]
fn test_validate_then_execute() {
    let tmp = setup_data_dir();
    let loader = DataLoader::new(tmp.path());
    let catalog = loader.load_catalog().unwrap();
    let dataset = loader.load_dataset(";").unwrap();
    let batch = load_batch(&tmp.path().join("batch.json")).unwrap();

    let (report, valid) = validation_report(&catalog, &batch);
    assert!(valid, "{}", report);

    let result = CutExecutor::new(&dataset, &catalog)
        .with_segments(&batch.segments)
        .execute_cuts(&batch.cuts);
    assert!(result.is_success());
    // the string code "2" matches the numeric plan column
    assert_eq!(result.segments_computed.get("pro"), Some(&2));

    let csv = render_csv(&result);
    assert!(csv.contains("# cut_id: nps_by_plan"));
    assert!(csv.contains("# cut_id: features"));
}

/// The JSON form of a result carries tables, errors and segments.
#[test]
fn test_result_json_shape() {
    let tmp = setup_data_dir();
    let loader = DataLoader::new(tmp.path());
    let catalog = loader.load_catalog().unwrap();
    let dataset = loader.load_dataset(";").unwrap();
    let batch = load_batch(&tmp.path().join("batch.json")).unwrap();

    let result = CutExecutor::new(&dataset, &catalog)
        .with_segments(&batch.segments)
        .execute_cuts(&batch.cuts);
    let value = serde_json::to_value(&result).unwrap();

    assert_eq!(value["segments_computed"], json!({"pro": 2}));
    assert!(value["errors"].as_array().unwrap().is_empty());
    assert!(value.get("segment_errors").is_none());

    let features = &value["tables"][1];
    assert_eq!(features["metric_type"], "frequency");
    assert_eq!(features["result_data"]["distribution"][0]["value"], "B");
    assert_eq!(features["result_data"]["distribution"][0]["percentage"], json!(100.0));
}
