use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use valuation_core::{FinancialStatement, MarketDataProvider, StatementSet, ValuationError};

use crate::{build_http_client, DEFAULT_TIMEOUT};

pub const POLYGON_BASE_URL: &str = "https://api.polygon.io";

/// Annual reports requested per ticker. Only the latest is valued, the rest give context in logs.
const ANNUAL_PERIODS: u32 = 4;

#[derive(Clone)]
pub struct PolygonClient {
    api_key: String,
    base_url: String,
    client: Client,
}

impl PolygonClient {
    pub fn new(api_key: String) -> Self {
        Self::with_options(api_key, POLYGON_BASE_URL.to_string(), DEFAULT_TIMEOUT)
    }

    pub fn with_options(api_key: String, base_url: String, timeout: Duration) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client: build_http_client(timeout),
        }
    }

    /// Send a request once. Failures are reported, never retried.
    async fn send_request(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, ValuationError> {
        let response = builder
            .send()
            .await
            .map_err(|e| ValuationError::ApiError(e.to_string()))?;
        tracing::debug!("Polygon {} -> {}", response.url().path(), response.status());
        Ok(response)
    }

    /// Get annual financial statements, most recent period first
    pub async fn get_annual_financials(&self, symbol: &str, limit: u32) -> Result<StatementSet, ValuationError> {
        let url = format!("{}/vX/reference/financials", self.base_url);
        let limit = limit.to_string();

        let response = self.send_request(
            self.client.get(&url).query(&[
                ("ticker", symbol),
                ("timeframe", "annual"),
                ("order", "desc"),
                ("sort", "period_of_report_date"),
                ("limit", limit.as_str()),
                ("apiKey", self.api_key.as_str()),
            ])
        ).await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let fin_response: FinancialsResponse = response
            .json()
            .await
            .map_err(|e| ValuationError::ApiError(e.to_string()))?;

        Ok(statements_from_response(fin_response))
    }

    /// Get ticker details
    pub async fn get_ticker_details(&self, symbol: &str) -> Result<TickerDetails, ValuationError> {
        let url = format!("{}/v3/reference/tickers/{}", self.base_url, symbol);

        let response = self.send_request(
            self.client.get(&url).query(&[("apiKey", &self.api_key)])
        ).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ValuationError::DataUnavailable(format!("unknown ticker {}", symbol)));
        }
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let details_response: TickerDetailsResponse = response
            .json()
            .await
            .map_err(|e| ValuationError::ApiError(e.to_string()))?;

        Ok(details_response.results)
    }
}

async fn status_error(response: reqwest::Response) -> ValuationError {
    ValuationError::ApiError(format!(
        "HTTP {}: {}",
        response.status(),
        response.text().await.unwrap_or_default()
    ))
}

/// Each report becomes one column. Rows are indexed by the vendor key and by its display label.
fn statements_from_response(response: FinancialsResponse) -> StatementSet {
    let mut set = StatementSet::default();

    for report in response.results {
        let period = report
            .end_date
            .clone()
            .unwrap_or_else(|| format!("{} {}", report.fiscal_year, report.fiscal_period));

        set.income.push_period(period.clone());
        set.cash_flow.push_period(period.clone());

        fill_statement(&mut set.income, &report.financials.income_statement, &period);
        fill_statement(&mut set.cash_flow, &report.financials.cash_flow_statement, &period);
    }

    set
}

fn fill_statement(statement: &mut FinancialStatement, items: &HashMap<String, LineItem>, period: &str) {
    for (key, item) in items {
        let Some(value) = item.value else { continue };
        statement.insert(key.as_str(), period, value);
        if let Some(label) = &item.label {
            if label != key {
                statement.insert(label.as_str(), period, value);
            }
        }
    }
}

#[async_trait]
impl MarketDataProvider for PolygonClient {
    async fn financial_statements(&self, symbol: &str) -> Result<StatementSet, ValuationError> {
        let set = self.get_annual_financials(symbol, ANNUAL_PERIODS).await?;
        if set.income.is_empty() {
            return Err(ValuationError::DataUnavailable(format!(
                "no annual financials reported for {}",
                symbol
            )));
        }
        tracing::info!(
            "Fetched {} annual periods for {} (latest: {})",
            set.income.periods().len(),
            symbol,
            set.income.latest_period().unwrap_or("n/a")
        );
        Ok(set)
    }

    async fn market_cap(&self, symbol: &str) -> Result<Option<f64>, ValuationError> {
        let details = self.get_ticker_details(symbol).await?;
        tracing::debug!("Market cap for {}: {:?}", details.ticker, details.market_cap);
        Ok(details.market_cap)
    }
}

// Response structures
#[derive(Debug, Deserialize)]
struct FinancialsResponse {
    #[serde(default)]
    results: Vec<FinancialResult>,
}

#[derive(Debug, Deserialize)]
struct FinancialResult {
    #[serde(default)]
    end_date: Option<String>,
    #[serde(default)]
    fiscal_period: String,
    #[serde(default)]
    fiscal_year: String,
    financials: FinancialStatements,
}

#[derive(Debug, Deserialize)]
struct FinancialStatements {
    #[serde(default)]
    income_statement: HashMap<String, LineItem>,
    #[serde(default)]
    cash_flow_statement: HashMap<String, LineItem>,
}

#[derive(Debug, Deserialize)]
struct LineItem {
    #[serde(default)]
    value: Option<f64>,
    #[serde(default)]
    label: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TickerDetailsResponse {
    results: TickerDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerDetails {
    pub ticker: String,
    #[serde(default)]
    pub market_cap: Option<f64>,
}
