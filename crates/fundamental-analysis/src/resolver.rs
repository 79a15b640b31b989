use valuation_core::FinancialStatement;

/// Value of the first candidate label that has an entry for `period`.
///
/// A label present in the statement but without a value for `period` is skipped,
/// the next candidate is tried.
pub fn resolve_field_checked(statement: &FinancialStatement, candidate_labels: &[&str], period: &str) -> Option<f64> {
    candidate_labels
        .iter()
        .find_map(|label| statement.value(label, period))
}

/// Like [`resolve_field_checked`] but an unmatched field counts as zero.
pub fn resolve_field(statement: &FinancialStatement, candidate_labels: &[&str], period: &str) -> f64 {
    resolve_field_checked(statement, candidate_labels, period).unwrap_or(0.0)
}
