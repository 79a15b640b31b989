//! Row labels accepted for each FCF input, highest priority first.
//!
//! Vendors disagree on line-item names. The human-readable labels come first; the
//! snake_case keys after them are Polygon financials keys. Polygon reports EBIT and
//! depreciation (both on the income statement) but neither capital expenditure nor
//! working-capital change, so those two have no vendor key.

use valuation_core::FcfField;

pub const EBIT: &[&str] = &["Operating Income", "EBIT", "operating_income_loss"];

pub const DEPRECIATION: &[&str] = &[
    "Depreciation",
    "Depreciation & Amortization",
    "Depreciation and Amortization",
    "depreciation_and_amortization",
];

pub const CAPITAL_EXPENDITURE: &[&str] = &[
    "Capital Expenditures",
    "Capital expenditure",
];

pub const WORKING_CAPITAL_CHANGE: &[&str] = &[
    "Change in Working Capital",
    "Changes in working capital",
];

pub fn candidates(field: FcfField) -> &'static [&'static str] {
    match field {
        FcfField::Ebit => EBIT,
        FcfField::Depreciation => DEPRECIATION,
        FcfField::CapitalExpenditure => CAPITAL_EXPENDITURE,
        FcfField::WorkingCapitalChange => WORKING_CAPITAL_CHANGE,
    }
}
