use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::ValuationError;

/// A financial statement table: line-item label (row) by reporting period (column).
///
/// Periods keep the order the provider returned them in, most recent first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialStatement {
    periods: Vec<String>,
    rows: HashMap<String, HashMap<String, f64>>,
}

impl FinancialStatement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a period column. Columns are appended in call order.
    pub fn push_period(&mut self, period: impl Into<String>) {
        let period = period.into();
        if !self.periods.contains(&period) {
            self.periods.push(period);
        }
    }

    /// Set a cell, registering the period column if it is new.
    pub fn insert(&mut self, label: impl Into<String>, period: impl Into<String>, value: f64) {
        let period = period.into();
        self.push_period(period.clone());
        self.rows.entry(label.into()).or_default().insert(period, value);
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_value(mut self, label: &str, period: &str, value: f64) -> Self {
        self.insert(label, period, value);
        self
    }

    pub fn periods(&self) -> &[String] {
        &self.periods
    }

    /// First column as returned by the provider.
    pub fn latest_period(&self) -> Option<&str> {
        self.periods.first().map(String::as_str)
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.rows.contains_key(label)
    }

    pub fn value(&self, label: &str, period: &str) -> Option<f64> {
        self.rows.get(label).and_then(|row| row.get(period)).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }
}

/// Income statement and cash-flow statement for one ticker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementSet {
    pub income: FinancialStatement,
    pub cash_flow: FinancialStatement,
}

/// The four line items free cash flow is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FcfField {
    Ebit,
    Depreciation,
    CapitalExpenditure,
    WorkingCapitalChange,
}

impl FcfField {
    pub fn to_label(&self) -> &'static str {
        match self {
            FcfField::Ebit => "EBIT",
            FcfField::Depreciation => "Depreciation",
            FcfField::CapitalExpenditure => "CapEx",
            FcfField::WorkingCapitalChange => "Change in WC",
        }
    }
}

impl fmt::Display for FcfField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_label())
    }
}

/// FCF inputs for one reporting period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FcfComponents {
    pub period: String,
    pub ebit: f64,
    pub depreciation: f64,
    pub capex: f64,
    pub working_capital_change: f64,
    /// Fields that were absent from the statements and counted as zero.
    #[serde(default)]
    pub missing_fields: Vec<FcfField>,
}

impl FcfComponents {
    /// EBIT + depreciation - capex - change in working capital.
    pub fn free_cash_flow(&self) -> f64 {
        self.ebit + self.depreciation - self.capex - self.working_capital_change
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields.is_empty()
    }
}

/// Longest projection horizon accepted by [`DcfParameters::validate`].
pub const MAX_PROJECTION_YEARS: u32 = 100;

/// Inputs of the DCF model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DcfParameters {
    /// Explicit projection horizon in years.
    pub years: u32,
    pub discount_rate: f64,
    pub growth_rate: f64,
}

impl Default for DcfParameters {
    fn default() -> Self {
        Self {
            years: 5,
            discount_rate: 0.10,
            growth_rate: 0.05,
        }
    }
}

impl DcfParameters {
    /// Reject inputs for which the Gordon growth terminal value is undefined.
    pub fn validate(&self) -> Result<(), ValuationError> {
        if self.years == 0 || self.years > MAX_PROJECTION_YEARS {
            return Err(ValuationError::InvalidParameters(format!(
                "projection horizon must be between 1 and {} years, got {}",
                MAX_PROJECTION_YEARS, self.years
            )));
        }
        if !self.discount_rate.is_finite() || !self.growth_rate.is_finite() {
            return Err(ValuationError::InvalidParameters(
                "discount and growth rates must be finite".to_string(),
            ));
        }
        if self.discount_rate <= -1.0 || self.growth_rate <= -1.0 {
            return Err(ValuationError::InvalidParameters(
                "rates must be greater than -100%".to_string(),
            ));
        }
        if self.discount_rate <= self.growth_rate {
            return Err(ValuationError::InvalidParameters(format!(
                "discount rate ({:.4}) must exceed growth rate ({:.4}) for a finite terminal value",
                self.discount_rate, self.growth_rate
            )));
        }
        Ok(())
    }
}

/// Pure output of the DCF projection, before the market comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcfProjection {
    pub future_fcfs: Vec<f64>,
    pub discounted_fcfs: Vec<f64>,
    pub terminal_value: f64,
    pub discounted_terminal_value: f64,
    pub intrinsic_value: f64,
}

/// DCF valuation of one company compared against its market capitalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    pub symbol: String,
    pub components: FcfComponents,
    pub parameters: DcfParameters,
    pub intrinsic_value: f64,
    pub market_cap: f64,
    /// (intrinsic - market cap) / market cap * 100; 0 when market cap is not positive.
    pub upside_percent: f64,
    pub future_fcfs: Vec<f64>,
    pub discounted_fcfs: Vec<f64>,
    pub terminal_value: f64,
    pub discounted_terminal_value: f64,
}

impl ValuationResult {
    pub fn free_cash_flow(&self) -> f64 {
        self.components.free_cash_flow()
    }
}

/// News article as returned by the news collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl NewsArticle {
    /// Title and description joined into the unit of text that gets scored.
    pub fn scoring_text(&self) -> String {
        format!("{}. {}", self.title, self.description.as_deref().unwrap_or(""))
    }
}
