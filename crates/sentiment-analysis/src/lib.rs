//! News sentiment scoring and the sentiment adjustment of DCF upside.

pub mod adjuster;
pub mod lexicon;

pub use adjuster::{adjust_upside, SentimentAdjuster, SentimentAssessment, MAX_ARTICLES, SENTIMENT_WEIGHT};
pub use lexicon::LexiconScorer;
