//! HTTP clients for the external market data and news services.

pub mod news;
pub mod polygon;

pub use news::{NewsApiClient, NEWS_API_BASE_URL};
pub use polygon::{PolygonClient, TickerDetails, POLYGON_BASE_URL};

use std::time::Duration;

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

fn build_http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}
