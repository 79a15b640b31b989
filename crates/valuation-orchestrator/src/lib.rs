use chrono::Utc;
use fundamental_analysis::DcfValuator;
use sentiment_analysis::{adjust_upside, SentimentAdjuster};
use valuation_core::{ChartRenderer, ChartSpec, DcfParameters, MarketDataProvider, ValuationError};

pub mod report;
pub use report::{format_thousands, format_usd, ValuationReport};

/// Trim and upper-case a user-entered ticker. Returns `None` for blank input.
pub fn normalize_symbol(input: &str) -> Option<String> {
    let symbol = input.trim().to_uppercase();
    if symbol.is_empty() {
        None
    } else {
        Some(symbol)
    }
}

/// Runs one valuation: FCF, DCF, sentiment, chart, strictly in that order.
pub struct ValuationOrchestrator {
    market_data: Box<dyn MarketDataProvider>,
    valuator: DcfValuator,
    sentiment: SentimentAdjuster,
    /// Optional chart output; evaluations run without one in headless use
    chart_renderer: Option<Box<dyn ChartRenderer>>,
}

impl ValuationOrchestrator {
    pub fn new(
        market_data: Box<dyn MarketDataProvider>,
        params: DcfParameters,
        sentiment: SentimentAdjuster,
    ) -> Self {
        Self {
            market_data,
            valuator: DcfValuator::new(params),
            sentiment,
            chart_renderer: None,
        }
    }

    /// Render a chart at the end of each successful evaluation
    pub fn with_chart_renderer(mut self, renderer: Box<dyn ChartRenderer>) -> Self {
        self.chart_renderer = Some(renderer);
        self
    }

    pub fn parameters(&self) -> &DcfParameters {
        self.valuator.parameters()
    }

    /// Evaluate `symbol`.
    ///
    /// Returns early with `DataUnavailable`, `InvalidFcf` or `InvalidParameters`;
    /// news and chart problems only degrade the report.
    pub async fn evaluate(&self, symbol: &str) -> Result<ValuationReport, ValuationError> {
        tracing::info!("Starting DCF evaluation for {}", symbol);

        let valuation = match self.valuator.valuate(self.market_data.as_ref(), symbol).await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("DCF analysis for {} failed ({}): {}", symbol, e.category(), e);
                return Err(e);
            }
        };

        let sentiment = self.sentiment.assess(symbol).await;
        let adjusted_upside = adjust_upside(valuation.upside_percent, sentiment.score);

        let chart_path = self.chart_renderer.as_ref().and_then(|renderer| {
            let chart = ChartSpec::new(symbol, &valuation.discounted_fcfs, valuation.market_cap);
            match renderer.render(&chart) {
                Ok(path) => {
                    tracing::info!("Chart for {} written to {}", symbol, path.display());
                    Some(path)
                }
                Err(e) => {
                    tracing::warn!("Chart for {} not rendered: {}", symbol, e);
                    None
                }
            }
        });

        tracing::info!(
            "Finished {}: upside {:.2}%, sentiment {:.2}, adjusted {:.2}%",
            symbol,
            valuation.upside_percent,
            sentiment.score,
            adjusted_upside
        );

        Ok(ValuationReport {
            symbol: symbol.to_string(),
            timestamp: Utc::now(),
            valuation,
            sentiment,
            adjusted_upside,
            chart_path,
        })
    }
}
