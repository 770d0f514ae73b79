//! End-to-end pipeline tests against an in-memory page
//!
//! Exercises generation, extraction, validation and the written artifacts
//! without a browser.

mod common;

use std::path::Path;
use std::time::Duration;

use analysis_e2e::cases::{generate_cases, DEFAULT_SEED};
use analysis_e2e::extractor::{ExtractorConfig, FieldExtractor};
use analysis_e2e::runner::RunnerConfig;
use analysis_e2e::{E2eError, FieldId, TestRunner};
use tempfile::TempDir;

use common::{format_brl, ScriptedDriver};

const BASE_URL: &str = "http://127.0.0.1:8080/analiseContratual.html";

fn fast_extractor() -> ExtractorConfig {
    ExtractorConfig {
        settle_delay: Duration::ZERO,
        ..Default::default()
    }
}

fn runner(output_dir: &Path) -> TestRunner {
    TestRunner::with_config(RunnerConfig {
        base_url: BASE_URL.to_string(),
        extractor: fast_extractor(),
        output_dir: output_dir.to_path_buf(),
        ..Default::default()
    })
    .unwrap()
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn scripted_page_formats_like_intl() {
    assert_eq!(format_brl(31200.0), "R$\u{a0}31.200,00");
    assert_eq!(format_brl(650.5), "R$\u{a0}650,50");
    assert_eq!(format_brl(1_234_567.89), "R$\u{a0}1.234.567,89");
}

#[tokio::test]
async fn twenty_cases_produce_complete_artifacts() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("results");
    let cases = generate_cases(20, DEFAULT_SEED);
    let mut driver = ScriptedDriver::new();

    let outcome = runner(&out).run_with_driver(&mut driver, &cases).await.unwrap();

    assert_eq!(outcome.report.len(), 20);
    assert_eq!(outcome.report.flagged(), 0);
    assert_eq!(driver.navigations.len(), 20);
    assert_eq!(driver.reads.len(), 20 * FieldId::COUNT);
    assert_eq!(driver.closed, 1);

    let json = read_json(&outcome.paths.report);
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 20);
    for (position, entry) in entries.iter().enumerate() {
        assert_eq!(entry["case_index"], position + 1);
        assert_eq!(entry["extracted"].as_object().unwrap().len(), FieldId::COUNT);
        assert_eq!(entry["params"], serde_json::to_value(&cases[position]).unwrap());
        assert!(entry["alerts"].as_array().unwrap().is_empty());
    }

    let csv = std::fs::read_to_string(&outcome.paths.summary).unwrap();
    assert_eq!(csv.lines().count(), 21);
}

#[tokio::test]
async fn cases_load_in_generation_order() {
    let tmp = TempDir::new().unwrap();
    let cases = generate_cases(5, 42);
    let extractor = FieldExtractor::new(BASE_URL, fast_extractor()).unwrap();
    let mut driver = ScriptedDriver::new();

    runner(tmp.path()).run_with_driver(&mut driver, &cases).await.unwrap();

    let expected: Vec<String> = cases.iter().map(|c| extractor.case_url(c).to_string()).collect();
    assert_eq!(driver.navigations, expected);
}

#[tokio::test]
async fn extracted_text_is_trimmed() {
    let cases = generate_cases(1, DEFAULT_SEED);
    let extractor = FieldExtractor::new(BASE_URL, fast_extractor()).unwrap();
    let mut driver = ScriptedDriver::new();

    let extracted = extractor.extract(&mut driver, &cases[0]).await.unwrap();

    assert_eq!(extracted.get(FieldId::PercentPaid), Some("40%"));
    assert_eq!(extracted.read_count(), FieldId::COUNT);
}

#[tokio::test]
async fn timed_out_field_is_absent_and_siblings_are_still_read() {
    let tmp = TempDir::new().unwrap();
    let cases = generate_cases(3, DEFAULT_SEED);
    let mut driver = ScriptedDriver::timing_out("#valorTotalFinanciamento");
    driver.financing_offset = 500.0;

    let outcome = runner(tmp.path()).run_with_driver(&mut driver, &cases).await.unwrap();

    assert_eq!(driver.reads.len(), 3 * FieldId::COUNT);
    for case in outcome.report.cases() {
        assert_eq!(case.extracted.get(FieldId::TotalFinancing), None);
        assert_eq!(case.extracted.read_count(), FieldId::COUNT - 1);
        assert!(case.extracted.get(FieldId::Scenario2Discount).is_some());
        // the wrong total was never read, so it cannot be flagged
        assert!(case.alerts.is_empty(), "{:?}", case.alerts);
    }

    let json = read_json(&outcome.paths.report);
    assert!(json[0]["extracted"]["valorTotalFinanciamento"].is_null());
}

#[tokio::test]
async fn element_without_text_is_absent() {
    let cases = generate_cases(1, DEFAULT_SEED);
    let extractor = FieldExtractor::new(BASE_URL, fast_extractor()).unwrap();
    let mut driver = ScriptedDriver::new();
    driver.empty.insert("#saldoBancoResultado".to_string());

    let extracted = extractor.extract(&mut driver, &cases[0]).await.unwrap();

    assert_eq!(extracted.get(FieldId::BankBalance), None);
    assert_eq!(extracted.read_count(), FieldId::COUNT - 1);
}

#[tokio::test]
async fn wrong_financing_total_raises_one_alert_per_case() {
    let tmp = TempDir::new().unwrap();
    let cases = generate_cases(4, DEFAULT_SEED);
    let mut driver = ScriptedDriver::new();
    driver.financing_offset = 1.0;

    let outcome = runner(tmp.path()).run_with_driver(&mut driver, &cases).await.unwrap();

    assert_eq!(outcome.report.flagged(), 4);
    for case in outcome.report.cases() {
        assert_eq!(case.alerts.len(), 1);
        assert!(case.alerts[0].starts_with("valorTotalFinanciamento mismatch: expected "));
    }

    let mut reader = csv::Reader::from_path(&outcome.paths.summary).unwrap();
    for record in reader.records() {
        let record = record.unwrap();
        assert!(record[9].starts_with("valorTotalFinanciamento mismatch"));
    }
}

#[tokio::test]
async fn sub_unit_rounding_is_tolerated() {
    let tmp = TempDir::new().unwrap();
    let cases = generate_cases(4, DEFAULT_SEED);
    let mut driver = ScriptedDriver::new();
    driver.financing_offset = 0.4;

    let outcome = runner(tmp.path()).run_with_driver(&mut driver, &cases).await.unwrap();

    assert_eq!(outcome.report.flagged(), 0);
}

#[tokio::test]
async fn navigation_failure_aborts_without_artifacts() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("results");
    let cases = generate_cases(5, DEFAULT_SEED);
    let mut driver = ScriptedDriver::new();
    driver.fail_navigation_at = Some(2);

    let err = runner(&out).run_with_driver(&mut driver, &cases).await.unwrap_err();

    assert!(matches!(err, E2eError::Navigation { .. }), "{err}");
    assert_eq!(driver.navigations.len(), 2);
    assert_eq!(driver.closed, 1);
    assert!(!out.exists());
}

#[tokio::test]
async fn empty_run_still_writes_headers() {
    let tmp = TempDir::new().unwrap();
    let mut driver = ScriptedDriver::new();

    let outcome = runner(tmp.path()).run_with_driver(&mut driver, &[]).await.unwrap();

    assert!(outcome.report.is_empty());
    assert_eq!(driver.closed, 1);
    assert_eq!(std::fs::read_to_string(&outcome.paths.summary).unwrap().lines().count(), 1);
}
