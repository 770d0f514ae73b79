//! Per-case page load and field extraction

use std::time::Duration;

use tracing::{debug, warn};
use url::Url;

use crate::cases::ScenarioParams;
use crate::driver::{BrowserDriver, WaitPolicy};
use crate::error::E2eResult;
use crate::fields::{ExtractedFields, FieldId};

/// Timing knobs for one extraction pass.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub wait_policy: WaitPolicy,

    /// Pause after the wait policy is met, for the page script to render
    pub settle_delay: Duration,

    /// Bound on each individual field read
    pub field_timeout: Duration,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            wait_policy: WaitPolicy::NetworkIdle,
            settle_delay: Duration::from_millis(250),
            field_timeout: Duration::from_millis(1000),
        }
    }
}

/// Loads the page for a scenario and reads back every result field.
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    base_url: Url,
    config: ExtractorConfig,
}

impl FieldExtractor {
    pub fn new(base_url: &str, config: ExtractorConfig) -> E2eResult<Self> {
        Ok(Self {
            base_url: Url::parse(base_url)?,
            config,
        })
    }

    /// Page address with the scenario appended as query parameters.
    pub fn case_url(&self, params: &ScenarioParams) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut().extend_pairs(params.query_pairs());
        url
    }

    /// Navigate to the scenario and read all fields.
    ///
    /// A navigation failure is returned as an error. A field that cannot be
    /// read is recorded as absent and the remaining fields are still read.
    pub async fn extract<D: BrowserDriver + ?Sized>(
        &self,
        driver: &mut D,
        params: &ScenarioParams,
    ) -> E2eResult<ExtractedFields> {
        let url = self.case_url(params);
        driver.navigate(url.as_str(), self.config.wait_policy).await?;
        tokio::time::sleep(self.config.settle_delay).await;

        let mut extracted = ExtractedFields::default();
        for field in FieldId::ALL {
            let value = match driver.read_text(&field.selector(), self.config.field_timeout).await {
                Ok(text) => text.map(|t| t.trim().to_string()),
                Err(e) if e.is_timeout() => {
                    debug!("Field {} not rendered in time", field);
                    None
                }
                Err(e) => {
                    warn!("Field {} unreadable: {}", field, e);
                    None
                }
            };
            extracted.set(field, value);
        }

        Ok(extracted)
    }
}
