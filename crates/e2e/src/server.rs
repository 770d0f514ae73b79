//! Page server readiness probe

use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::{E2eError, E2eResult};

/// How long and how often to poll the page before giving up
#[derive(Debug, Clone)]
pub struct ServerProbeConfig {
    pub startup_timeout: Duration,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
}

impl Default for ServerProbeConfig {
    fn default() -> Self {
        Self {
            startup_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(100),
            request_timeout: Duration::from_secs(2),
        }
    }
}

/// Poll the page under test until it answers with a success status.
///
/// The harness never starts the server itself; this turns a missing dev
/// server into a clear error before a browser is launched. At least one
/// request is made even with a zero timeout.
pub async fn wait_for_page(url: &str, config: &ServerProbeConfig) -> E2eResult<()> {
    let client = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()?;

    let start = Instant::now();
    let mut attempts = 0;

    loop {
        attempts += 1;

        match client.get(url).send().await {
            Ok(resp) if resp.status().is_success() => {
                info!("Page reachable at {} after {} attempt(s)", url, attempts);
                return Ok(());
            }
            Ok(resp) => {
                debug!("{} answered {}, retrying", url, resp.status());
            }
            Err(e) if e.is_connect() => {
                if attempts == 1 {
                    info!("No page server at {} yet, polling", url);
                }
            }
            Err(e) => {
                warn!("Fetching {} failed: {}", url, e);
            }
        }

        if start.elapsed() >= config.startup_timeout {
            break;
        }
        sleep(config.poll_interval).await;
    }

    Err(E2eError::ServerHealthCheck(attempts))
}
