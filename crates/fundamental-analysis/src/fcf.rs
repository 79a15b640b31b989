use valuation_core::{FcfComponents, FcfField, FinancialStatement, MarketDataProvider, StatementSet, ValuationError};

use crate::labels;
use crate::resolver::resolve_field_checked;

/// Any failure while gathering market data counts as missing data.
pub(crate) fn into_data_unavailable(err: ValuationError) -> ValuationError {
    match err {
        ValuationError::DataUnavailable(_) => err,
        other => ValuationError::DataUnavailable(other.to_string()),
    }
}

/// FCF inputs for the latest period of `statements`.
///
/// The latest period is the first income-statement column. Cash-flow items are read
/// from the same column. Depreciation falls back to the income statement, where some
/// vendors report it. Any item that cannot be found counts as zero and is listed in
/// `missing_fields`.
pub fn fcf_from_statements(statements: &StatementSet) -> Result<FcfComponents, ValuationError> {
    let period = statements
        .income
        .latest_period()
        .ok_or_else(|| ValuationError::DataUnavailable("income statement has no reporting periods".to_string()))?;

    let mut missing_fields = Vec::new();
    let mut or_missing = |found: Option<f64>, field: FcfField| -> f64 {
        found.unwrap_or_else(|| {
            missing_fields.push(field);
            0.0
        })
    };

    let income = &statements.income;
    let cash_flow = &statements.cash_flow;
    let ebit = or_missing(resolve_in(&[income], FcfField::Ebit, period), FcfField::Ebit);
    let depreciation = or_missing(
        resolve_in(&[cash_flow, income], FcfField::Depreciation, period),
        FcfField::Depreciation,
    );
    let capex = or_missing(
        resolve_in(&[cash_flow], FcfField::CapitalExpenditure, period),
        FcfField::CapitalExpenditure,
    );
    let working_capital_change = or_missing(
        resolve_in(&[cash_flow], FcfField::WorkingCapitalChange, period),
        FcfField::WorkingCapitalChange,
    );

    Ok(FcfComponents {
        period: period.to_string(),
        ebit,
        depreciation,
        capex,
        working_capital_change,
        missing_fields,
    })
}

/// First statement in `sources` that resolves `field` for `period`.
fn resolve_in(sources: &[&FinancialStatement], field: FcfField, period: &str) -> Option<f64> {
    sources
        .iter()
        .find_map(|statement| resolve_field_checked(statement, labels::candidates(field), period))
}

/// Fetch statements for `symbol` and compute its latest free cash flow.
pub async fn estimate_fcf(provider: &dyn MarketDataProvider, symbol: &str) -> Result<FcfComponents, ValuationError> {
    let statements = provider
        .financial_statements(symbol)
        .await
        .map_err(into_data_unavailable)?;

    let components = fcf_from_statements(&statements)?;

    tracing::info!(
        "FCF components for {} ({}): EBIT {:.0}, Depreciation {:.0}, CapEx {:.0}, Change in WC {:.0} -> FCF {:.0}",
        symbol,
        components.period,
        components.ebit,
        components.depreciation,
        components.capex,
        components.working_capital_change,
        components.free_cash_flow()
    );
    if !components.is_complete() {
        tracing::warn!(
            "{}: {:?} not reported for {}, counted as zero",
            symbol,
            components.missing_fields,
            components.period
        );
    }

    Ok(components)
}
