//! Run report and its on-disk artifacts

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::cases::ScenarioParams;
use crate::error::E2eResult;
use crate::fields::{ExtractedFields, FieldId};
use crate::validator::expected_financing_total;

pub const REPORT_FILE: &str = "results.json";
pub const SUMMARY_FILE: &str = "results.csv";

const SUMMARY_HEADER: [&str; 10] = [
    "case_index",
    "valorBem",
    "saldoBanco",
    "totalParcelas",
    "valorParcela",
    "parcelasPagas",
    "valorTotalFinanciamento",
    "extracted_valorTotalFinanciamento",
    "saldoBancoResultado",
    "alerts",
];

/// Outcome of one scenario
#[derive(Debug, Clone, Serialize)]
pub struct CaseResult {
    pub case_index: usize,
    pub params: ScenarioParams,
    pub extracted: ExtractedFields,
    pub alerts: Vec<String>,
}

/// Results of a run, in generation order.
///
/// Case indices are assigned here, starting at 1, so they always match the
/// order in which cases were recorded.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Report {
    cases: Vec<CaseResult>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the next case and return its index.
    pub fn record(&mut self, params: ScenarioParams, extracted: ExtractedFields, alerts: Vec<String>) -> usize {
        let case_index = self.cases.len() + 1;
        self.cases.push(CaseResult {
            case_index,
            params,
            extracted,
            alerts,
        });
        case_index
    }

    pub fn cases(&self) -> &[CaseResult] {
        &self.cases
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Number of cases with at least one alert
    pub fn flagged(&self) -> usize {
        self.cases.iter().filter(|c| !c.alerts.is_empty()).count()
    }
}

/// Where a run's artifacts were written
#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub report: PathBuf,
    pub summary: PathBuf,
}

/// Writes the JSON report and CSV summary into one directory.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Overwrite both artifacts, creating the directory if needed.
    pub fn write(&self, report: &Report) -> E2eResult<ReportPaths> {
        std::fs::create_dir_all(&self.output_dir)?;

        let paths = ReportPaths {
            report: self.output_dir.join(REPORT_FILE),
            summary: self.output_dir.join(SUMMARY_FILE),
        };
        write_json(&paths.report, report)?;
        write_csv(&paths.summary, report)?;

        info!(
            "Results written to: {} and {}",
            paths.report.display(),
            paths.summary.display()
        );
        Ok(paths)
    }
}

fn write_json(path: &Path, report: &Report) -> E2eResult<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}

fn write_csv(path: &Path, report: &Report) -> E2eResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(SUMMARY_HEADER)?;

    for case in report.cases() {
        let p = &case.params;
        let expected_total = expected_financing_total(p)
            .map(|total| format!("{:?}", total))
            .unwrap_or_default();
        writer.write_record([
            case.case_index.to_string().as_str(),
            p.asset_value.as_str(),
            p.bank_balance.as_str(),
            p.total_installments.as_str(),
            p.installment_value.as_str(),
            p.installments_paid.as_str(),
            expected_total.as_str(),
            case.extracted.get(FieldId::TotalFinancing).unwrap_or_default(),
            case.extracted.get(FieldId::BankBalance).unwrap_or_default(),
            case.alerts.join("; ").as_str(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
