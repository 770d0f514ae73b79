//! Contract analysis page acceptance harness
//!
//! Drives `analiseContratual.html` in a real browser with seeded scenarios
//! passed as query parameters, reads back the rendered result fields and
//! checks them against values computed from the scenario itself.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        TestRunner                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  generate_cases(n, seed) -> Vec<ScenarioParams>             │
//! │  for each case, in order:                                   │
//! │    FieldExtractor::extract(driver, params)                  │
//! │      ├── navigate(base_url?params, networkidle)             │
//! │      └── read_text(#id, 1s) x 15 -> ExtractedFields         │
//! │    validate(params, extracted) -> alerts                    │
//! │    Report::record(params, extracted, alerts)                │
//! │  driver.close()                                             │
//! │  ReportWriter::write(report) -> results.json, results.csv   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  BrowserDriver                                              │
//! │    └── PlaywrightSession (node driver, JSON lines)          │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod cases;
pub mod driver;
pub mod error;
pub mod extractor;
pub mod fields;
pub mod locale;
pub mod playwright;
pub mod report;
pub mod runner;
pub mod server;
pub mod validator;

pub use cases::{generate_cases, ScenarioParams};
pub use driver::{BrowserDriver, WaitPolicy};
pub use error::{E2eError, E2eResult};
pub use fields::{ExtractedFields, FieldId};
pub use locale::parse_brl;
pub use report::{CaseResult, Report, ReportWriter};
pub use runner::{RunnerConfig, TestRunner};
