use gene_census::chart::{self, ChartData};
use gene_census::config::Settings;
use gene_census::data::loader::{load_dataset, DatasetPaths};
use gene_census::data::model::Partition;
use gene_census::data::schema::Column;
use gene_census::error::LoadError;
use gene_census::report;
use gene_census::sample::{write_sample, SampleSpec};
use gene_census::summary::DatasetSummary;

fn small_sample() -> SampleSpec {
    SampleSpec {
        train: 140,
        test: 40,
        validation: 20,
        leaked: 6,
        seed: 11,
    }
}

#[test]
fn sample_to_report_and_json() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_sample(dir.path(), &small_sample()).unwrap();
    let dataset = load_dataset(&paths).unwrap();
    assert_eq!(dataset.len(), 200);
    assert_eq!(dataset.partition(Partition::Validation).len(), 20);

    let settings = Settings::default();
    let summary = DatasetSummary::compute(&dataset, &settings.analysis, Column::GeneType);
    assert_eq!(summary.total_rows, 200);
    assert!(summary.leaked_sequences >= 1);

    let mut out = Vec::new();
    report::text::write_report(&mut out, &summary).unwrap();
    let text = String::from_utf8(out).unwrap();
    for title in [
        "DNA Dataset Summary Report",
        "1. Dataset Overview",
        "3. Label Analysis (GeneType)",
        "6. Data Leakage",
        "8. Sample Data",
    ] {
        assert!(text.contains(title), "missing {title}");
    }
    assert!(text.contains("train.csv"));

    let json_path = dir.path().join("summary.json");
    report::json::write(&json_path, &summary).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(value["total_rows"], 200);
    assert_eq!(value["files"].as_array().map(Vec::len), Some(3));
}

#[test]
fn sample_to_charts() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_sample(&dir.path().join("data"), &small_sample()).unwrap();
    let dataset = load_dataset(&paths).unwrap();

    let settings = Settings::default();
    let data = ChartData::compute(&dataset, &settings.analysis, Column::GeneType);
    let out = dir.path().join("charts");
    let written = chart::render_all(&data, &settings.style, &out).unwrap();

    assert_eq!(written.len(), 8);
    for path in &written {
        let svg = std::fs::read_to_string(path).unwrap();
        assert!(svg.starts_with("<svg"), "{} is not svg", path.display());
        assert!(svg.trim_end().ends_with("</svg>"));
    }
    assert!(out.join("08_summary_dashboard.svg").exists());
}

#[test]
fn missing_partition_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_sample(dir.path(), &small_sample()).unwrap();
    std::fs::remove_file(&paths.validation).unwrap();

    match load_dataset(&DatasetPaths::in_dir(dir.path())) {
        Err(LoadError::Io { path, .. }) => assert!(path.ends_with("validation.csv")),
        other => panic!("expected Io error, got {other:?}"),
    }
}
