use async_trait::async_trait;
use std::path::PathBuf;

use crate::{NewsArticle, StatementSet, ValuationError};

/// Source of financial statements and market capitalization
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Annual income and cash-flow statements, most recent period first.
    async fn financial_statements(&self, symbol: &str) -> Result<StatementSet, ValuationError>;

    /// Current market capitalization, `None` when the provider does not report one.
    async fn market_cap(&self, symbol: &str) -> Result<Option<f64>, ValuationError>;
}

/// Source of recent news articles
#[async_trait]
pub trait NewsProvider: Send + Sync {
    async fn recent_articles(&self, symbol: &str, limit: usize) -> Result<Vec<NewsArticle>, ValuationError>;
}

/// Scores free text on a [-1, 1] polarity scale.
pub trait PolarityScorer: Send + Sync {
    fn polarity(&self, text: &str) -> f64;
}

/// Data handed to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub symbol: String,
    pub title: String,
    pub discounted_fcfs: Vec<f64>,
    pub market_cap: f64,
}

impl ChartSpec {
    pub fn new(symbol: &str, discounted_fcfs: &[f64], market_cap: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            title: format!("{} - {}-Year DCF Valuation", symbol, discounted_fcfs.len()),
            discounted_fcfs: discounted_fcfs.to_vec(),
            market_cap,
        }
    }

    /// (year, value) points, years starting at 1.
    pub fn points(&self) -> Vec<(u32, f64)> {
        self.discounted_fcfs
            .iter()
            .enumerate()
            .map(|(i, v)| (i as u32 + 1, *v))
            .collect()
    }
}

/// Renders the discounted cash flow chart, returning where it was written.
pub trait ChartRenderer: Send + Sync {
    fn render(&self, chart: &ChartSpec) -> Result<PathBuf, ValuationError>;
}
