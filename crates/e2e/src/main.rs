//! Acceptance harness entry point
//!
//! Run with: cargo run --package analysis-e2e -- --cases 20

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use analysis_e2e::cases::{generate_cases, DEFAULT_CASE_COUNT, DEFAULT_SEED};
use analysis_e2e::playwright::{Browser, PlaywrightConfig};
use analysis_e2e::runner::{RunnerConfig, DEFAULT_BASE_URL};
use analysis_e2e::server::{wait_for_page, ServerProbeConfig};
use analysis_e2e::{E2eResult, TestRunner};

#[derive(Parser, Debug)]
#[command(name = "analysis-e2e")]
#[command(about = "Acceptance harness for the contract analysis page")]
struct Args {
    /// Address of the page under test
    #[arg(long, env = "TEST_URL_BASE", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Number of scenarios to generate
    #[arg(short, long, default_value_t = DEFAULT_CASE_COUNT)]
    cases: usize,

    /// Seed for scenario generation
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Output directory for results.json and results.csv
    #[arg(short, long, default_value = "test-results")]
    output: PathBuf,

    /// Browser to use (chromium, firefox, webkit)
    #[arg(long, default_value = "chromium")]
    browser: String,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Wait up to this many seconds for the page server before starting (0 checks once)
    #[arg(long)]
    wait_for_server: Option<u64>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .with_target(false)
        .init();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to create tokio runtime: {}", e);
            std::process::exit(2);
        }
    };

    if let Err(e) = rt.block_on(async_main(args)) {
        eprintln!("Error: {}", e);
        std::process::exit(2);
    }
}

async fn async_main(args: Args) -> E2eResult<()> {
    if let Some(secs) = args.wait_for_server {
        let probe = ServerProbeConfig {
            startup_timeout: Duration::from_secs(secs),
            ..Default::default()
        };
        wait_for_page(&args.base_url, &probe).await?;
    }

    let config = RunnerConfig {
        base_url: args.base_url,
        playwright: PlaywrightConfig {
            browser: Browser::from_name(&args.browser),
            headless: !args.headed,
            ..Default::default()
        },
        output_dir: args.output,
        ..Default::default()
    };
    let runner = TestRunner::with_config(config)?;

    let cases = generate_cases(args.cases, args.seed);
    info!("Generated {} case(s) with seed {}", cases.len(), args.seed);

    let outcome = runner.run(&cases).await?;
    info!("Done: {} case(s) in {} ms", outcome.report.len(), outcome.duration_ms);
    Ok(())
}
