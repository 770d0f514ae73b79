//! Playwright browser automation
//!
//! A single Node.js driver process is started per run. It owns one browser,
//! one context and one page, and answers newline-delimited JSON requests on
//! stdin. Every request carries an id; replies to requests we stopped
//! waiting for are discarded so they cannot be mistaken for later answers.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command as TokioCommand};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::driver::{BrowserDriver, WaitPolicy};
use crate::error::{E2eError, E2eResult};

/// Extra time granted on the Rust side beyond the timeout Playwright enforces.
const REPLY_SLACK: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "firefox" => Browser::Firefox,
            "webkit" => Browser::Webkit,
            _ => Browser::Chromium,
        }
    }
}

/// Configuration for Playwright
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    pub browser: Browser,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,

    /// Directory `require('playwright')` resolves from
    pub node_modules: PathBuf,

    /// Time allowed for the browser to start
    pub launch_timeout: Duration,

    /// Time allowed for one navigation to satisfy its wait policy
    pub navigation_timeout: Duration,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            browser: Browser::Chromium,
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            node_modules: PathBuf::from("node_modules"),
            launch_timeout: Duration::from_secs(30),
            navigation_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct DriverReply {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    ready: bool,
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    timeout: bool,
}

/// One browser, one context, one page, reused for every case of a run.
pub struct PlaywrightSession {
    child: Child,
    stdin: ChildStdin,
    replies: Lines<BufReader<ChildStdout>>,
    next_id: u64,
    navigation_timeout: Duration,
    closed: bool,

    // the driver script lives here until the session is dropped
    _script_dir: TempDir,
}

impl PlaywrightSession {
    /// Start the driver process and wait for the browser to come up.
    pub async fn launch(config: PlaywrightConfig) -> E2eResult<Self> {
        check_playwright_installed()?;

        let script_dir = tempfile::tempdir()?;
        let script_path = script_dir.path().join("driver.js");
        std::fs::write(&script_path, build_script(&config))?;

        info!(
            "Launching {} ({})",
            config.browser.as_str(),
            if config.headless { "headless" } else { "headed" }
        );

        let mut cmd = TokioCommand::new("node");
        cmd.arg(&script_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        if std::env::var_os("NODE_PATH").is_none() {
            cmd.env("NODE_PATH", absolute(&config.node_modules)?);
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| E2eError::Playwright(format!("Failed to spawn node: {}", e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| E2eError::Playwright("driver stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| E2eError::Playwright("driver stdout unavailable".to_string()))?;

        let mut session = Self {
            child,
            stdin,
            replies: BufReader::new(stdout).lines(),
            next_id: 0,
            navigation_timeout: config.navigation_timeout,
            closed: false,
            _script_dir: script_dir,
        };

        session.wait_ready(config.launch_timeout).await?;
        info!("Browser ready");
        Ok(session)
    }

    async fn wait_ready(&mut self, deadline: Duration) -> E2eResult<()> {
        timeout(deadline, wait_for_ready(&mut self.replies))
            .await
            .map_err(|_| E2eError::Timeout("browser launch".to_string()))?
    }

    /// Send one request and wait for the reply carrying the same id.
    async fn request(&mut self, mut body: Value, deadline: Duration, what: &str) -> E2eResult<DriverReply> {
        self.next_id += 1;
        let id = self.next_id;
        body["id"] = json!(id);

        let mut line = serde_json::to_string(&body)?;
        line.push('\n');
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.flush().await?;

        timeout(deadline, wait_for_reply(&mut self.replies, id))
            .await
            .map_err(|_| E2eError::Timeout(what.to_string()))?
    }
}

#[async_trait]
impl BrowserDriver for PlaywrightSession {
    async fn navigate(&mut self, url: &str, wait: WaitPolicy) -> E2eResult<()> {
        let timeout_ms = self.navigation_timeout.as_millis() as u64;
        let deadline = self.navigation_timeout + REPLY_SLACK;
        let body = json!({
            "op": "navigate",
            "url": url,
            "wait_until": wait.as_str(),
            "timeout_ms": timeout_ms,
        });
        let reply = self
            .request(body, deadline, url)
            .await
            .map_err(|e| E2eError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        if reply.ok {
            Ok(())
        } else {
            Err(E2eError::Navigation {
                url: url.to_string(),
                reason: reply.error.unwrap_or_else(|| "unknown error".to_string()),
            })
        }
    }

    async fn read_text(&mut self, selector: &str, wait: Duration) -> E2eResult<Option<String>> {
        let body = json!({
            "op": "read_text",
            "selector": selector,
            "timeout_ms": wait.as_millis() as u64,
        });
        let reply = self.request(body, wait + REPLY_SLACK, selector).await?;

        match reply {
            DriverReply { ok: true, text, .. } => Ok(text),
            DriverReply { timeout: true, .. } => Err(E2eError::Timeout(selector.to_string())),
            DriverReply { error, .. } => Err(E2eError::Playwright(
                error.unwrap_or_else(|| format!("read of {} failed", selector)),
            )),
        }
    }

    async fn close(&mut self) -> E2eResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        info!("Closing browser");
        if let Err(e) = self.request(json!({ "op": "close" }), Duration::from_secs(10), "browser close").await {
            warn!("Browser did not close cleanly: {}", e);
        }

        match timeout(Duration::from_secs(5), self.child.wait()).await {
            Ok(Ok(status)) if status.success() => Ok(()),
            Ok(Ok(status)) => {
                warn!("Driver exited with {}", status);
                Ok(())
            }
            Ok(Err(e)) => Err(e.into()),
            Err(_) => {
                warn!("Driver still running after close, killing it");
                self.child.kill().await?;
                Ok(())
            }
        }
    }
}

async fn wait_for_ready<R: AsyncBufRead + Unpin>(replies: &mut Lines<R>) -> E2eResult<()> {
    loop {
        let reply = next_reply(replies).await?;
        if reply.ready {
            return Ok(());
        }
        debug!("Ignoring driver output before ready: {:?}", reply);
    }
}

async fn wait_for_reply<R: AsyncBufRead + Unpin>(replies: &mut Lines<R>, id: u64) -> E2eResult<DriverReply> {
    loop {
        let reply = next_reply(replies).await?;
        match reply.id {
            Some(reply_id) if reply_id == id => return Ok(reply),
            other => debug!("Discarding stale driver reply (id {:?})", other),
        }
    }
}

async fn next_reply<R: AsyncBufRead + Unpin>(replies: &mut Lines<R>) -> E2eResult<DriverReply> {
    loop {
        let line = replies
            .next_line()
            .await?
            .ok_or_else(|| E2eError::Playwright("driver exited unexpectedly".to_string()))?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<DriverReply>(&line) {
            Ok(reply) => return Ok(reply),
            // page console output and Playwright warnings share stdout
            Err(_) => debug!("driver: {}", line),
        }
    }
}

/// Check if Playwright is installed
fn check_playwright_installed() -> E2eResult<()> {
    let output = Command::new("npx")
        .args(["playwright", "--version"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match output {
        Ok(status) if status.success() => Ok(()),
        _ => Err(E2eError::PlaywrightNotFound),
    }
}

fn absolute(path: &Path) -> E2eResult<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Build the long-running driver script
pub fn build_script(config: &PlaywrightConfig) -> String {
    format!(
        r#"
const playwright = require('playwright');
const readline = require('readline');

const reply = (message) =>
  new Promise((resolve) => process.stdout.write(JSON.stringify(message) + '\n', resolve));

(async () => {{
  const browser = await playwright.{browser}.launch({{ headless: {headless} }});
  const context = await browser.newContext({{
    viewport: {{ width: {width}, height: {height} }}
  }});
  const page = await context.newPage();
  const lines = readline.createInterface({{ input: process.stdin, terminal: false }});

  await reply({{ ready: true }});

  for await (const line of lines) {{
    if (!line.trim()) continue;
    let request;
    try {{
      request = JSON.parse(line);
    }} catch (error) {{
      await reply({{ ok: false, error: 'malformed request: ' + error.message }});
      continue;
    }}
    const id = request.id;
    try {{
      if (request.op === 'navigate') {{
        await page.goto(request.url, {{ waitUntil: request.wait_until, timeout: request.timeout_ms }});
        await reply({{ id, ok: true }});
      }} else if (request.op === 'read_text') {{
        const text = await page.locator(request.selector).textContent({{ timeout: request.timeout_ms }});
        await reply({{ id, ok: true, text }});
      }} else if (request.op === 'close') {{
        await browser.close();
        await reply({{ id, ok: true }});
        process.exit(0);
      }} else {{
        await reply({{ id, ok: false, error: 'unknown op: ' + request.op }});
      }}
    }} catch (error) {{
      await reply({{ id, ok: false, error: error.message, timeout: error.name === 'TimeoutError' }});
    }}
  }}

  await browser.close();
}})().catch((error) => {{
  console.error(error.stack || error.message);
  process.exit(1);
}});
"#,
        browser = config.browser.as_str(),
        headless = config.headless,
        width = config.viewport_width,
        height = config.viewport_height,
    )
}
