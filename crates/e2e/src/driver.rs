//! Browser session seam
//!
//! The harness only needs two things from a browser: load a URL and read an
//! element's text. [`crate::playwright::PlaywrightSession`] is the real
//! implementation; tests substitute an in-memory one.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::E2eResult;

/// When a navigation counts as finished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WaitPolicy {
    Load,
    DomContentLoaded,
    #[default]
    NetworkIdle,
}

impl WaitPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaitPolicy::Load => "load",
            WaitPolicy::DomContentLoaded => "domcontentloaded",
            WaitPolicy::NetworkIdle => "networkidle",
        }
    }
}

/// A single long-lived page that can be navigated and queried.
#[async_trait]
pub trait BrowserDriver: Send {
    /// Load `url` and wait until `wait` is satisfied.
    ///
    /// Errors here are fatal for the run.
    async fn navigate(&mut self, url: &str, wait: WaitPolicy) -> E2eResult<()>;

    /// Text content of the first element matching `selector`.
    ///
    /// `Ok(None)` means the element exists but has no text content.
    async fn read_text(&mut self, selector: &str, timeout: Duration) -> E2eResult<Option<String>>;

    /// Release the browser. Called exactly once, at the end of a run.
    async fn close(&mut self) -> E2eResult<()>;
}
