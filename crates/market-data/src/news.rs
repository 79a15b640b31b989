use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use valuation_core::{NewsArticle, NewsProvider, ValuationError};

use crate::{build_http_client, DEFAULT_TIMEOUT};

pub const NEWS_API_BASE_URL: &str = "https://newsapi.org";

/// Client for the newsapi.org `everything` endpoint.
#[derive(Clone)]
pub struct NewsApiClient {
    api_key: String,
    base_url: String,
    client: Client,
}

impl NewsApiClient {
    pub fn new(api_key: String) -> Self {
        Self::with_options(api_key, NEWS_API_BASE_URL.to_string(), DEFAULT_TIMEOUT)
    }

    pub fn with_options(api_key: String, base_url: String, timeout: Duration) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client: build_http_client(timeout),
        }
    }

    /// Most recent articles matching `query`
    pub async fn get_everything(&self, query: &str, page_size: usize) -> Result<Vec<NewsArticle>, ValuationError> {
        let url = format!("{}/v2/everything", self.base_url);
        let page_size_param = page_size.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", query),
                ("sortBy", "publishedAt"),
                ("pageSize", page_size_param.as_str()),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ValuationError::ApiError(e.to_string()))?;

        let status = response.status();
        let body: NewsApiResponse = response
            .json()
            .await
            .map_err(|e| ValuationError::ApiError(format!("HTTP {}: {}", status, e)))?;

        if !status.is_success() || body.status != "ok" {
            return Err(ValuationError::ApiError(format!(
                "HTTP {} ({}): {}",
                status,
                body.code.unwrap_or_else(|| "unknown".to_string()),
                body.message.unwrap_or_default()
            )));
        }

        Ok(articles_from_response(body.articles, page_size))
    }
}

/// Title-less entries carry nothing to score and are dropped.
fn articles_from_response(articles: Vec<NewsApiArticle>, limit: usize) -> Vec<NewsArticle> {
    articles
        .into_iter()
        .filter_map(|a| {
            let title = a.title.filter(|t| !t.trim().is_empty())?;
            Some(NewsArticle {
                title,
                description: a.description,
                source: a.source.and_then(|s| s.name),
                url: a.url,
                published_at: a
                    .published_at
                    .as_deref()
                    .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
                    .map(|dt| dt.with_timezone(&Utc)),
            })
        })
        .take(limit)
        .collect()
}

#[async_trait]
impl NewsProvider for NewsApiClient {
    async fn recent_articles(&self, symbol: &str, limit: usize) -> Result<Vec<NewsArticle>, ValuationError> {
        self.get_everything(symbol, limit).await.map_err(|e| match e {
            ValuationError::ApiError(msg) => ValuationError::NewsUnavailable(msg),
            other => other,
        })
    }
}

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    status: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
struct NewsApiArticle {
    #[serde(default)]
    source: Option<NewsApiSource>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(rename = "publishedAt", default)]
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsApiSource {
    #[serde(default)]
    name: Option<String>,
}
