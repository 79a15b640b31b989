use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use valuation_core::{FinancialStatement, MarketDataProvider, StatementSet, ValuationError};

/// In-memory market data with call counters.
pub struct StubMarketData {
    pub statements: Result<StatementSet, ValuationError>,
    pub market_cap: Result<Option<f64>, ValuationError>,
    pub statement_calls: AtomicUsize,
    pub market_cap_calls: AtomicUsize,
}

impl StubMarketData {
    pub fn new(statements: StatementSet, market_cap: Option<f64>) -> Self {
        Self {
            statements: Ok(statements),
            market_cap: Ok(market_cap),
            statement_calls: AtomicUsize::new(0),
            market_cap_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: ValuationError) -> Self {
        Self {
            statements: Err(error.clone()),
            market_cap: Err(error),
            statement_calls: AtomicUsize::new(0),
            market_cap_calls: AtomicUsize::new(0),
        }
    }

    pub fn market_cap_calls(&self) -> usize {
        self.market_cap_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataProvider for StubMarketData {
    async fn financial_statements(&self, _symbol: &str) -> Result<StatementSet, ValuationError> {
        self.statement_calls.fetch_add(1, Ordering::SeqCst);
        self.statements.clone()
    }

    async fn market_cap(&self, _symbol: &str) -> Result<Option<f64>, ValuationError> {
        self.market_cap_calls.fetch_add(1, Ordering::SeqCst);
        self.market_cap.clone()
    }
}

/// Statements whose latest period yields the given FCF (EBIT only, other fields zero).
pub fn statements_with_ebit(ebit: f64) -> StatementSet {
    StatementSet {
        income: FinancialStatement::new().with_value("Operating Income", "FY2024", ebit),
        cash_flow: FinancialStatement::new()
            .with_value("Depreciation", "FY2024", 0.0)
            .with_value("Capital Expenditures", "FY2024", 0.0)
            .with_value("Change in Working Capital", "FY2024", 0.0),
    }
}
