use std::collections::HashSet;
use valuation_core::PolarityScorer;

const POSITIVE_WORDS: &[&str] = &[
    "bullish", "rally", "surge", "gain", "gains", "profit", "growth", "beat", "beats",
    "upgrade", "outperform", "strong", "positive", "rise", "rises", "increase",
    "breakthrough", "innovation", "success", "exceed", "exceeds", "momentum",
    "buy", "recommend", "optimistic", "record", "high", "advance", "good", "great",
    "excellent", "best", "soar", "soars", "jump", "jumps", "win", "wins",
    // Financial-specific terms
    "dividend", "buyback", "repurchase", "accretive", "upside",
    "recovery", "rebound", "expansion", "robust", "accelerating",
    "overweight", "raised", "upgraded", "outpacing", "tailwind",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bearish", "decline", "declines", "loss", "losses", "fall", "falls", "plunge",
    "crash", "miss", "misses", "downgrade", "underperform", "weak", "negative", "drop",
    "drops", "decrease", "concern", "concerns", "risk", "fail", "fails", "disappoint",
    "disappointing", "slump", "sell", "warning", "pessimistic", "low", "retreat",
    "fear", "trouble", "bad", "worst", "tumble", "tumbles", "sink", "sinks",
    // Financial-specific terms
    "dilution", "dilutive", "headwind", "lawsuit", "litigation",
    "recall", "investigation", "probe", "default", "bankruptcy",
    "restructuring", "layoff", "layoffs", "downside", "overvalued", "bubble",
    "underweight", "lowered", "suspended",
];

const NEGATION_WORDS: &[&str] = &[
    "not", "no", "never", "don't", "doesn't", "didn't", "isn't", "aren't",
    "wasn't", "weren't", "won't", "wouldn't", "couldn't", "shouldn't", "hardly",
    "barely", "neither", "nor", "without",
];

/// How many words back a negation still flips an opinion word.
const NEGATION_WINDOW: usize = 3;

/// Word-list polarity scorer.
///
/// Every opinion word votes +1 or -1 (flipped when a negation precedes it within
/// [`NEGATION_WINDOW`] words). The polarity is the mean vote, so it always lies in
/// [-1, 1], and text without opinion words scores 0.
pub struct LexiconScorer {
    positive: HashSet<&'static str>,
    negative: HashSet<&'static str>,
    negations: HashSet<&'static str>,
}

impl LexiconScorer {
    pub fn new() -> Self {
        Self {
            positive: POSITIVE_WORDS.iter().copied().collect(),
            negative: NEGATIVE_WORDS.iter().copied().collect(),
            negations: NEGATION_WORDS.iter().copied().collect(),
        }
    }

    fn tokenize(text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | '.' | '!' | '?' | ':' | '"' | '(' | ')'))
            .filter(|w| !w.is_empty())
            .map(|w| w.replace('\u{2019}', "'"))
            .collect()
    }
}

impl PolarityScorer for LexiconScorer {
    fn polarity(&self, text: &str) -> f64 {
        let words = Self::tokenize(text);

        let negation_positions: Vec<usize> = words
            .iter()
            .enumerate()
            .filter(|(_, w)| self.negations.contains(w.as_str()))
            .map(|(i, _)| i)
            .collect();

        let mut total: i32 = 0;
        let mut opinion_words: i32 = 0;

        for (i, word) in words.iter().enumerate() {
            let vote = if self.positive.contains(word.as_str()) {
                1
            } else if self.negative.contains(word.as_str()) {
                -1
            } else {
                continue;
            };

            let negated = negation_positions
                .iter()
                .any(|&neg_pos| neg_pos < i && (i - neg_pos) <= NEGATION_WINDOW);

            total += if negated { -vote } else { vote };
            opinion_words += 1;
        }

        if opinion_words == 0 {
            0.0
        } else {
            total as f64 / opinion_words as f64
        }
    }
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_text() {
        let scorer = LexiconScorer::new();
        assert_eq!(scorer.polarity("Apple shares rally after record quarter"), 1.0);
    }

    #[test]
    fn test_negative_text() {
        let scorer = LexiconScorer::new();
        assert_eq!(scorer.polarity("Regulators open probe; shares plunge."), -1.0);
    }

    #[test]
    fn test_mixed_text_is_averaged() {
        let scorer = LexiconScorer::new();
        // strong (+1), growth (+1), lawsuit (-1)
        let score = scorer.polarity("Strong growth overshadowed by lawsuit");
        assert!((score - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_negation_flips_vote() {
        let scorer = LexiconScorer::new();
        assert_eq!(scorer.polarity("Results were not strong"), -1.0);
        assert_eq!(scorer.polarity("The company doesn't expect a loss"), 1.0);
    }

    #[test]
    fn test_negation_outside_window_ignored() {
        let scorer = LexiconScorer::new();
        assert_eq!(scorer.polarity("No one expected such a strong quarter"), 1.0);
    }

    #[test]
    fn test_neutral_and_empty_text() {
        let scorer = LexiconScorer::new();
        assert_eq!(scorer.polarity("The annual meeting is on Tuesday."), 0.0);
        assert_eq!(scorer.polarity(""), 0.0);
    }

    #[test]
    fn test_polarity_is_bounded() {
        let scorer = LexiconScorer::new();
        let texts = [
            "beat beat beat beat surge rally",
            "crash crash not crash",
            "Shares didn't fall, they soared to a record high.",
        ];
        for text in texts {
            let p = scorer.polarity(text);
            assert!((-1.0..=1.0).contains(&p), "{} -> {}", text, p);
        }
    }
}
