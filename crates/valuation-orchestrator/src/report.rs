use chrono::{DateTime, Utc};
use sentiment_analysis::SentimentAssessment;
use std::fmt;
use std::path::PathBuf;
use valuation_core::ValuationResult;

/// Everything one evaluation run produced.
#[derive(Debug, Clone)]
pub struct ValuationReport {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub valuation: ValuationResult,
    pub sentiment: SentimentAssessment,
    pub adjusted_upside: f64,
    pub chart_path: Option<PathBuf>,
}

/// Whole-unit amount with thousands separators, e.g. `-1,234,568`.
pub fn format_thousands(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rounded = format!("{:.0}", value.abs());
    let mut grouped = String::with_capacity(rounded.len() + rounded.len() / 3 + 1);
    for (i, ch) in rounded.chars().enumerate() {
        if i > 0 && (rounded.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0.0 && rounded != "0" {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Dollar amount without cents, e.g. `$21,000,000`.
pub fn format_usd(value: f64) -> String {
    let formatted = format_thousands(value);
    match formatted.strip_prefix('-') {
        Some(abs) => format!("-${}", abs),
        None => format!("${}", formatted),
    }
}

impl fmt::Display for ValuationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = &self.valuation;
        let c = &v.components;

        writeln!(f, "FCF Components for {} ({}):", self.symbol, c.period)?;
        writeln!(f, "  EBIT: {}", format_thousands(c.ebit))?;
        writeln!(f, "  Depreciation: {}", format_thousands(c.depreciation))?;
        writeln!(f, "  CapEx: {}", format_thousands(c.capex))?;
        writeln!(f, "  Change in WC: {}", format_thousands(c.working_capital_change))?;
        writeln!(f, "  > Free Cash Flow: {}", format_thousands(v.free_cash_flow()))?;
        if !c.is_complete() {
            let missing: Vec<&str> = c.missing_fields.iter().map(|m| m.to_label()).collect();
            writeln!(f, "  (not reported, counted as zero: {})", missing.join(", "))?;
        }
        writeln!(f)?;

        writeln!(f, "Intrinsic Value:  {}", format_usd(v.intrinsic_value))?;
        writeln!(f, "Market Cap:       {}", format_usd(v.market_cap))?;
        if v.market_cap > 0.0 {
            writeln!(f, "Upside Potential: {:.2}%", v.upside_percent)?;
        } else {
            writeln!(f, "Upside Potential: {:.2}% (no market cap reported)", v.upside_percent)?;
        }
        writeln!(f)?;

        writeln!(
            f,
            "Discounted cash flows ({:.1}% discount rate, {:.1}% growth):",
            v.parameters.discount_rate * 100.0,
            v.parameters.growth_rate * 100.0
        )?;
        for (year, dcf) in v.discounted_fcfs.iter().enumerate() {
            writeln!(f, "  Year {}: {}", year + 1, format_usd(*dcf))?;
        }
        writeln!(f, "  Terminal: {}", format_usd(v.discounted_terminal_value))?;
        writeln!(f)?;

        match &self.sentiment.degradation {
            None => writeln!(
                f,
                "Sentiment Score (avg): {:.2} ({} articles)",
                self.sentiment.score, self.sentiment.article_count
            )?,
            Some(reason) => writeln!(
                f,
                "Sentiment Score (avg): {:.2} (neutral, {})",
                self.sentiment.score, reason
            )?,
        }
        writeln!(f, "Adjusted Upside Potential: {:.2}%", self.adjusted_upside)?;

        if let Some(path) = &self.chart_path {
            writeln!(f)?;
            writeln!(f, "Chart: {}", path.display())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0.0), "0");
        assert_eq!(format_thousands(999.4), "999");
        assert_eq!(format_thousands(1_000.0), "1,000");
        assert_eq!(format_thousands(21_000_000.0), "21,000,000");
        assert_eq!(format_thousands(-1_234_567.8), "-1,234,568");
        assert_eq!(format_thousands(-0.3), "0");
    }

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(3_450_000_000_000.0), "$3,450,000,000,000");
        assert_eq!(format_usd(-12_500.0), "-$12,500");
    }
}
