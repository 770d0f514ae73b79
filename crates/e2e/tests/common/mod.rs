//! In-memory stand-in for the analysis page

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use analysis_e2e::{BrowserDriver, E2eError, E2eResult, FieldId, WaitPolicy};
use async_trait::async_trait;
use url::Url;

/// Renders the page's formulas from the query string and records every call.
#[derive(Default)]
pub struct ScriptedDriver {
    /// Added to the rendered financing total
    pub financing_offset: f64,
    /// Selectors whose reads time out
    pub timeouts: HashSet<String>,
    /// Selectors whose element has no text content
    pub empty: HashSet<String>,
    /// Zero-based navigation that fails
    pub fail_navigation_at: Option<usize>,

    pub navigations: Vec<String>,
    pub reads: Vec<String>,
    pub closed: usize,
    page: HashMap<String, String>,
}

impl ScriptedDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timing_out(selector: &str) -> Self {
        let mut driver = Self::new();
        driver.timeouts.insert(selector.to_string());
        driver
    }

    fn render(&self, url: &str) -> HashMap<String, String> {
        let url = Url::parse(url).expect("driver received a valid url");
        let query: HashMap<String, String> = url.query_pairs().into_owned().collect();
        let number = |name: &str| -> f64 { query[name].parse().expect("numeric parameter") };

        let mut page: HashMap<String, String> = FieldId::ALL
            .iter()
            .map(|field| (field.selector(), "R$\u{a0}0,00".to_string()))
            .collect();
        page.insert(FieldId::PercentPaid.selector(), "40%".to_string());
        page.insert(FieldId::OverdueCharges.selector(), "—".to_string());
        page.insert(
            FieldId::TotalFinancing.selector(),
            format_brl(number("totalParcelas") * number("valorParcela") + self.financing_offset),
        );
        page.insert(FieldId::BankBalance.selector(), format_brl(number("saldoBanco")));
        page
    }
}

#[async_trait]
impl BrowserDriver for ScriptedDriver {
    async fn navigate(&mut self, url: &str, wait: WaitPolicy) -> E2eResult<()> {
        assert_eq!(wait, WaitPolicy::NetworkIdle);
        if self.fail_navigation_at == Some(self.navigations.len()) {
            return Err(E2eError::Navigation {
                url: url.to_string(),
                reason: "net::ERR_CONNECTION_REFUSED".to_string(),
            });
        }
        self.navigations.push(url.to_string());
        self.page = self.render(url);
        Ok(())
    }

    async fn read_text(&mut self, selector: &str, _timeout: Duration) -> E2eResult<Option<String>> {
        self.reads.push(selector.to_string());
        if self.timeouts.contains(selector) {
            return Err(E2eError::Timeout(selector.to_string()));
        }
        if self.empty.contains(selector) {
            return Ok(None);
        }
        match self.page.get(selector) {
            Some(text) => Ok(Some(format!("  {}\n", text))),
            None => Err(E2eError::Timeout(selector.to_string())),
        }
    }

    async fn close(&mut self) -> E2eResult<()> {
        self.closed += 1;
        Ok(())
    }
}

/// Format like `Intl.NumberFormat('pt-BR', { style: 'currency', currency: 'BRL' })`.
pub fn format_brl(value: f64) -> String {
    let cents = (value * 100.0).round() as i64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::new();
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }
    format!("R$\u{a0}{},{:02}", grouped, cents % 100)
}

