//! Main runner that drives every scenario through one browser session

use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

use crate::cases::ScenarioParams;
use crate::driver::BrowserDriver;
use crate::error::E2eResult;
use crate::extractor::{ExtractorConfig, FieldExtractor};
use crate::playwright::{PlaywrightConfig, PlaywrightSession};
use crate::report::{Report, ReportPaths, ReportWriter};
use crate::validator::validate;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080/analiseContratual.html";

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub report: Report,
    pub paths: ReportPaths,
    pub duration_ms: u64,
}

/// Configuration for the runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Page under test; scenario parameters are appended as a query string
    pub base_url: String,
    pub extractor: ExtractorConfig,
    pub playwright: PlaywrightConfig,
    pub output_dir: PathBuf,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            extractor: ExtractorConfig::default(),
            playwright: PlaywrightConfig::default(),
            output_dir: PathBuf::from("test-results"),
        }
    }
}

/// Runs scenarios strictly in order and writes the report once at the end.
pub struct TestRunner {
    extractor: FieldExtractor,
    playwright_config: PlaywrightConfig,
    writer: ReportWriter,
}

impl TestRunner {
    /// Create a runner with custom configuration
    pub fn with_config(config: RunnerConfig) -> E2eResult<Self> {
        Ok(Self {
            extractor: FieldExtractor::new(&config.base_url, config.extractor)?,
            playwright_config: config.playwright,
            writer: ReportWriter::new(config.output_dir),
        })
    }

    /// Launch Playwright and run every case through it.
    pub async fn run(&self, cases: &[ScenarioParams]) -> E2eResult<RunOutcome> {
        let mut session = PlaywrightSession::launch(self.playwright_config.clone()).await?;
        self.run_with_driver(&mut session, cases).await
    }

    /// Run every case through `driver`, close it, then write the artifacts.
    ///
    /// The driver is closed whether or not the cases succeed. Nothing is
    /// written when a case fails to load.
    pub async fn run_with_driver<D: BrowserDriver + ?Sized>(
        &self,
        driver: &mut D,
        cases: &[ScenarioParams],
    ) -> E2eResult<RunOutcome> {
        let start = Instant::now();

        let collected = self.collect(driver, cases).await;
        if let Err(e) = driver.close().await {
            warn!("Failed to close browser session: {}", e);
        }
        let report = collected?;

        let paths = self.writer.write(&report)?;
        let duration_ms = start.elapsed().as_millis() as u64;

        info!(
            "Run finished: {} case(s), {} with alerts ({} ms)",
            report.len(),
            report.flagged(),
            duration_ms
        );

        Ok(RunOutcome {
            report,
            paths,
            duration_ms,
        })
    }

    /// Extract and validate every case, in order.
    pub async fn collect<D: BrowserDriver + ?Sized>(
        &self,
        driver: &mut D,
        cases: &[ScenarioParams],
    ) -> E2eResult<Report> {
        let total = cases.len();
        let mut report = Report::new();

        info!("Running {} case(s)...", total);

        for (position, params) in cases.iter().enumerate() {
            info!("[{}/{}] Loading: {}", position + 1, total, self.extractor.case_url(params));

            let extracted = self.extractor.extract(driver, params).await?;
            let alerts = validate(params, &extracted);
            for alert in &alerts {
                warn!("case {}: {}", position + 1, alert);
            }

            report.record(params.clone(), extracted, alerts);
        }

        Ok(report)
    }
}
