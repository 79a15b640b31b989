use valuation_core::{NewsProvider, PolarityScorer, ValuationError};

use crate::LexiconScorer;

/// Upside percentage points added per unit of sentiment. Fixed, not calibrated.
pub const SENTIMENT_WEIGHT: f64 = 50.0;

/// Most recent articles considered per evaluation.
pub const MAX_ARTICLES: usize = 5;

/// Blend sentiment into the DCF upside.
pub fn adjust_upside(upside_percent: f64, sentiment: f64) -> f64 {
    upside_percent + sentiment * SENTIMENT_WEIGHT
}

/// Outcome of the best-effort sentiment step.
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentAssessment {
    /// Mean polarity in [-1, 1]; exactly 0 without articles.
    pub score: f64,
    pub article_count: usize,
    /// Why sentiment fell back to neutral, if it did.
    pub degradation: Option<ValuationError>,
}

impl SentimentAssessment {
    fn neutral(degradation: ValuationError) -> Self {
        Self {
            score: 0.0,
            article_count: 0,
            degradation: Some(degradation),
        }
    }
}

pub struct SentimentAdjuster {
    /// `None` when no news credential is configured.
    news: Option<Box<dyn NewsProvider>>,
    scorer: Box<dyn PolarityScorer>,
}

impl SentimentAdjuster {
    pub fn new(news: Option<Box<dyn NewsProvider>>, scorer: Box<dyn PolarityScorer>) -> Self {
        Self { news, scorer }
    }

    /// Adjuster scoring with the built-in [`LexiconScorer`].
    pub fn with_lexicon(news: Option<Box<dyn NewsProvider>>) -> Self {
        Self::new(news, Box::new(LexiconScorer::new()))
    }

    pub fn is_configured(&self) -> bool {
        self.news.is_some()
    }

    /// Up to [`MAX_ARTICLES`] texts ("title. description") for `symbol`.
    ///
    /// Without a configured provider this returns `ConfigurationAbsent` and makes no request.
    pub async fn fetch_news(&self, symbol: &str) -> Result<Vec<String>, ValuationError> {
        let provider = self.news.as_ref().ok_or_else(|| {
            ValuationError::ConfigurationAbsent("no news API key configured".to_string())
        })?;

        let articles = provider
            .recent_articles(symbol, MAX_ARTICLES)
            .await
            .map_err(|e| match e {
                ValuationError::NewsUnavailable(_) => e,
                other => ValuationError::NewsUnavailable(other.to_string()),
            })?;

        Ok(articles
            .iter()
            .take(MAX_ARTICLES)
            .map(|a| a.scoring_text())
            .collect())
    }

    /// Mean polarity of `texts`, 0 for none.
    pub fn score_sentiment(&self, texts: &[String]) -> f64 {
        if texts.is_empty() {
            return 0.0;
        }
        let total: f64 = texts.iter().map(|t| self.scorer.polarity(t)).sum();
        total / texts.len() as f64
    }

    /// Fetch and score news for `symbol`. Never fails: problems degrade to a neutral score.
    pub async fn assess(&self, symbol: &str) -> SentimentAssessment {
        let texts = match self.fetch_news(symbol).await {
            Ok(texts) => texts,
            Err(e @ ValuationError::ConfigurationAbsent(_)) => {
                tracing::info!("Skipping sentiment analysis for {}: {}", symbol, e);
                return SentimentAssessment::neutral(e);
            }
            Err(e) => {
                tracing::warn!("Sentiment for {} falls back to neutral: {}", symbol, e);
                return SentimentAssessment::neutral(e);
            }
        };

        let score = self.score_sentiment(&texts);
        tracing::info!("Sentiment for {}: {:.2} over {} articles", symbol, score, texts.len());

        SentimentAssessment {
            score,
            article_count: texts.len(),
            degradation: None,
        }
    }
}
