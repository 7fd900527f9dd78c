//! CLI command implementations
//!
//! Both commands follow the same load sequence:
//! 1. Engine configuration (optional file, defaults otherwise)
//! 2. Question catalog from the data directory
//! 3. Batch file (segments + cuts)
//! 4. Responses, for `execute` only
//!
//! Load failures are fatal. Per-cut failures are not: they are reported in
//! the output and turn the exit status non-zero.

use std::collections::BTreeSet;
use std::path::Path;

use serde_json::{json, Value};

use crate::config::EngineConfig;
use crate::executor::{CutExecutor, ExecutionResult};
use crate::observability::{log_event_with_fields, Event, Logger};
use crate::schema::{load_batch, BatchSpec, Catalog, DataLoader};
use crate::validator::{validate_all_cuts, validate_all_segments};

use super::args::{Command, OutputFormat};
use super::errors::CliResult;
use super::io::{write_error, write_response, write_text};

/// Parse arguments and run the selected command.
///
/// Returns whether every segment and cut succeeded. Fatal errors are also
/// written to stdout as an error envelope.
pub fn run() -> CliResult<bool> {
    let cli = super::args::Cli::parse_args();
    match run_command(cli.command) {
        Ok(success) => Ok(success),
        Err(e) => {
            write_error(e.code_str(), e.message())?;
            Err(e)
        }
    }
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<bool> {
    match cmd {
        Command::Validate { data, batch } => validate(&data, &batch),
        Command::Execute {
            data,
            batch,
            config,
            format,
        } => execute(&data, &batch, config.as_deref(), format),
    }
}

/// Validate a batch against the catalog without touching responses
pub fn validate(data_dir: &Path, batch_path: &Path) -> CliResult<bool> {
    let loader = DataLoader::new(data_dir);
    let catalog = load_catalog(&loader)?;
    let batch = load_batch(batch_path)?;

    let (report, valid) = validation_report(&catalog, &batch);
    write_response(report)?;

    Ok(valid)
}

/// Execute a batch and print the results
pub fn execute(
    data_dir: &Path,
    batch_path: &Path,
    config_path: Option<&Path>,
    format: OutputFormat,
) -> CliResult<bool> {
    let config = load_config(config_path)?;

    let loader = DataLoader::new(data_dir);
    let catalog = load_catalog(&loader)?;
    let batch = load_batch(batch_path)?;

    let dataset = loader.load_dataset(&config.multi_choice_delimiter)?;
    log_event_with_fields(
        Event::DatasetLoaded,
        &[
            ("rows", &dataset.len().to_string()),
            ("columns", &dataset.column_names().len().to_string()),
        ],
    );
    let fingerprint = loader.fingerprint()?;

    let executor = CutExecutor::new(&dataset, &catalog)
        .with_segments(&batch.segments)
        .with_config(config);
    let result = executor.execute_cuts(&batch.cuts);

    match format {
        OutputFormat::Json => {
            let mut data = serde_json::to_value(&result)?;
            if let Some(obj) = data.as_object_mut() {
                obj.insert("metrics".into(), serde_json::to_value(executor.metrics().snapshot())?);
                obj.insert("fingerprint".into(), Value::String(fingerprint));
            }
            write_response(data)?;
        }
        OutputFormat::Csv => write_text(&render_csv(&result))?,
    }

    Ok(result.is_success())
}

/// Builds the `validate` report; the flag is false when anything failed.
pub fn validation_report(catalog: &Catalog, batch: &BatchSpec) -> (Value, bool) {
    let segment_errors = validate_all_segments(&batch.segments, catalog);

    // Cuts may only reference segments that would be materialized
    let valid_segments: BTreeSet<String> = batch
        .segments
        .iter()
        .filter(|s| !segment_errors.contains_key(&s.segment_id))
        .map(|s| s.segment_id.clone())
        .collect();
    let cut_errors = validate_all_cuts(&batch.cuts, catalog, &valid_segments);

    let valid = segment_errors.is_empty() && cut_errors.is_empty();
    let report = json!({
        "valid": valid,
        "segments": batch.segments.len(),
        "cuts": batch.cuts.len(),
        "segment_errors": segment_errors,
        "cut_errors": cut_errors,
    });

    (report, valid)
}

/// Renders one CSV block per table, then one comment line per failed cut.
pub fn render_csv(result: &ExecutionResult) -> String {
    let mut out = String::new();

    for table in &result.tables {
        out.push_str(&format!("# cut_id: {}\n", table.cut_id));
        for warning in &table.warnings {
            out.push_str(&format!("# warning: {}\n", warning));
        }
        out.push_str(&table.to_csv());
        out.push('\n');
    }

    for error in &result.errors {
        out.push_str(&format!(
            "# error: {} [{}] {}\n",
            error.cut_id, error.kind, error.error
        ));
    }

    out
}

fn load_config(path: Option<&Path>) -> CliResult<EngineConfig> {
    let config = match path {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    Logger::set_min_severity(config.severity());
    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("parallel", &config.parallel.to_string()),
            ("min_base_size", &config.min_base_size.to_string()),
            ("warn_base_size", &config.warn_base_size.to_string()),
        ],
    );

    Ok(config)
}

fn load_catalog(loader: &DataLoader) -> CliResult<Catalog> {
    let catalog = loader.load_catalog()?;
    log_event_with_fields(
        Event::CatalogLoaded,
        &[("questions", &catalog.len().to_string())],
    );
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CutSpec, DimensionSpec, FilterExpr, MetricSpec, MetricType, Question, QuestionType, SegmentSpec};
    use std::fs;
    use tempfile::TempDir;

    fn catalog() -> Catalog {
        Catalog::new(vec![Question::new("Q_NPS", "Recommend", QuestionType::Nps)]).unwrap()
    }

    #[test]
    fn test_validation_report_flags_bad_cut() {
        let batch = BatchSpec {
            segments: vec![SegmentSpec::new("hi", "High", FilterExpr::range("Q_NPS", Some(9.0), None))],
            cuts: vec![
                CutSpec::new("ok", MetricSpec::new(MetricType::Nps, "Q_NPS"))
                    .with_dimension(DimensionSpec::segment("hi")),
                CutSpec::new("bad", MetricSpec::new(MetricType::Mean, "Q_GONE")),
            ],
        };

        let (report, valid) = validation_report(&catalog(), &batch);
        assert!(!valid);
        assert!(report["segment_errors"].as_object().unwrap().is_empty());
        assert!(report["cut_errors"].get("ok").is_none());
        assert_eq!(report["cut_errors"]["bad"][0]["code"], "unknown_question");
    }

    #[test]
    fn test_rejected_segment_invalidates_dependent_cut() {
        let batch = BatchSpec {
            segments: vec![SegmentSpec::new("ghost", "Ghost", FilterExpr::eq("Q_GONE", 1))],
            cuts: vec![CutSpec::new("c1", MetricSpec::new(MetricType::Nps, "Q_NPS"))
                .with_dimension(DimensionSpec::segment("ghost"))],
        };

        let (report, _) = validation_report(&catalog(), &batch);
        assert_eq!(report["cut_errors"]["c1"][0]["code"], "unknown_dimension");
    }

    #[test]
    fn test_execute_missing_data_dir_is_load_error() {
        let tmp = TempDir::new().unwrap();
        let batch = tmp.path().join("batch.json");
        fs::write(&batch, r#"{"cuts": []}"#).unwrap();

        let err = execute(&tmp.path().join("nope"), &batch, None, OutputFormat::Json).unwrap_err();
        assert_eq!(err.code_str(), "SURVEYCUT_CLI_LOAD_ERROR");
    }

    #[test]
    fn test_render_csv_blocks() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("questions.json"),
            r#"[{"question_id": "Q_NPS", "label": "Recommend", "type": "nps_0_10"}]"#,
        )
        .unwrap();
        fs::write(tmp.path().join("responses.json"), r#"[{"Q_NPS": 10}, {"Q_NPS": 2}]"#).unwrap();

        let loader = DataLoader::new(tmp.path());
        let catalog = loader.load_catalog().unwrap();
        let dataset = loader.load_dataset(";").unwrap();
        let cuts = vec![
            CutSpec::new("c1", MetricSpec::new(MetricType::Nps, "Q_NPS")),
            CutSpec::new("c2", MetricSpec::new(MetricType::Mean, "Q_GONE")),
        ];
        let result = CutExecutor::new(&dataset, &catalog).execute_cuts(&cuts);

        let csv = render_csv(&result);
        assert!(csv.starts_with("# cut_id: c1\n# warning: Base size (2)"));
        assert!(csv.contains("nps,promoters_count"));
        assert!(csv.contains("# error: c2 [validation_failed]"));
    }
}
