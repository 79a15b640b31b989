//! dcf: interactive discounted-cash-flow valuation for one ticker.
//!
//! Reads a ticker from stdin, estimates free cash flow from the latest annual
//! statements, projects it, compares against market cap and blends in news
//! sentiment when a NewsAPI key is configured.
//!
//! Usage:
//!   POLYGON_API_KEY=... cargo run -p dcf-cli
//!   echo MSFT | DCF_YEARS=10 cargo run -p dcf-cli
//!   DCF_CHART=off cargo run -p dcf-cli          # skip the PNG chart

mod charts;
mod config;

use charts::PngChartRenderer;
use config::AppConfig;
use market_data::{NewsApiClient, PolygonClient};
use sentiment_analysis::SentimentAdjuster;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use valuation_core::{NewsProvider, ValuationError};
use valuation_orchestrator::{normalize_symbol, ValuationOrchestrator};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dcf_cli=info,valuation_orchestrator=info,warn".into()),
        )
        .with_writer(io::stderr)
        .init();

    let config = AppConfig::from_env()?;

    let Some(symbol) = prompt_symbol()? else {
        println!("No ticker entered.");
        return Ok(ExitCode::FAILURE);
    };

    let orchestrator = build_orchestrator(&config);

    let params = orchestrator.parameters();
    tracing::info!(
        "DCF parameters: {} years, discount {:.2}%, growth {:.2}%",
        params.years,
        params.discount_rate * 100.0,
        params.growth_rate * 100.0
    );

    println!("Evaluating: {}", symbol);
    println!("{}", "-".repeat(50));

    match orchestrator.evaluate(&symbol).await {
        Ok(report) => {
            print!("{}", report);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            println!("{}", diagnostic(&e));
            Ok(ExitCode::FAILURE)
        }
    }
}

fn prompt_symbol() -> anyhow::Result<Option<String>> {
    print!("Enter stock ticker (e.g., AAPL): ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(normalize_symbol(&line))
}

fn build_orchestrator(config: &AppConfig) -> ValuationOrchestrator {
    let polygon = PolygonClient::with_options(
        config.polygon_api_key.clone(),
        config.polygon_base_url.clone(),
        config.http_timeout,
    );

    let news = config.news_api_key.as_ref().map(|key| {
        Box::new(NewsApiClient::with_options(
            key.clone(),
            config.news_api_base_url.clone(),
            config.http_timeout,
        )) as Box<dyn NewsProvider>
    });
    if news.is_none() {
        tracing::info!("NEWS_API_KEY not set, sentiment will be neutral");
    }

    let orchestrator = ValuationOrchestrator::new(
        Box::new(polygon),
        config.dcf,
        SentimentAdjuster::with_lexicon(news),
    );

    match &config.chart_dir {
        Some(dir) => orchestrator.with_chart_renderer(Box::new(PngChartRenderer::new(dir.clone()))),
        None => orchestrator,
    }
}

/// One-line console explanation for an evaluation error.
fn diagnostic(error: &ValuationError) -> String {
    if !error.is_fatal() {
        return format!("Warning ({}): {}", error.category(), error);
    }
    match error {
        ValuationError::DataUnavailable(reason) => {
            format!("Error fetching financials: {}", reason)
        }
        ValuationError::InvalidFcf(fcf) => format!(
            "Free cash flow is {:.0}; a DCF valuation needs positive cash flow.",
            fcf
        ),
        ValuationError::InvalidParameters(reason) => {
            format!("Invalid DCF parameters: {}", reason)
        }
        other => format!("Valuation failed ({}): {}", other.category(), other),
    }
}
