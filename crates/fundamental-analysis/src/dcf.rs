use valuation_core::{DcfParameters, DcfProjection, MarketDataProvider, ValuationError, ValuationResult};

use crate::fcf::{estimate_fcf, into_data_unavailable};

/// Project `fcf` over the horizon, discount it, and add a Gordon growth terminal value.
///
/// Fails with `InvalidParameters` when the terminal value would be undefined or the
/// projection overflows, and with `InvalidFcf` when `fcf` is not strictly positive.
pub fn project(fcf: f64, params: &DcfParameters) -> Result<DcfProjection, ValuationError> {
    params.validate()?;
    if !(fcf > 0.0) {
        return Err(ValuationError::InvalidFcf(fcf));
    }

    let g = params.growth_rate;
    let r = params.discount_rate;
    let years = params.years as i32;

    let future_fcfs: Vec<f64> = (1..=years)
        .map(|i| fcf * (1.0_f64 + g).powi(i))
        .collect();

    let discounted_fcfs: Vec<f64> = future_fcfs
        .iter()
        .zip(1..=years)
        .map(|(f, i)| f / (1.0_f64 + r).powi(i))
        .collect();

    let final_year_fcf = fcf * (1.0_f64 + g).powi(years);
    let terminal_value = final_year_fcf * (1.0 + g) / (r - g);
    let discounted_terminal_value = terminal_value / (1.0_f64 + r).powi(years);

    let intrinsic_value = discounted_fcfs.iter().sum::<f64>() + discounted_terminal_value;
    if !intrinsic_value.is_finite() || future_fcfs.iter().any(|f| !f.is_finite()) {
        return Err(ValuationError::InvalidParameters(format!(
            "{} years at {:.4} growth and {:.4} discount overflows the projection",
            params.years, g, r
        )));
    }

    Ok(DcfProjection {
        future_fcfs,
        discounted_fcfs,
        terminal_value,
        discounted_terminal_value,
        intrinsic_value,
    })
}

/// Percentage by which `intrinsic_value` exceeds `market_cap`.
///
/// Reported as 0 when the market cap is not positive; that is a convention, not a ratio.
pub fn upside_percent(intrinsic_value: f64, market_cap: f64) -> f64 {
    if market_cap > 0.0 {
        (intrinsic_value - market_cap) / market_cap * 100.0
    } else {
        0.0
    }
}

pub struct DcfValuator {
    params: DcfParameters,
}

impl DcfValuator {
    pub fn new(params: DcfParameters) -> Self {
        Self { params }
    }

    pub fn parameters(&self) -> &DcfParameters {
        &self.params
    }

    /// Value `symbol` from its latest annual free cash flow.
    ///
    /// Market cap is fetched only after the projection succeeded.
    pub async fn valuate(&self, provider: &dyn MarketDataProvider, symbol: &str) -> Result<ValuationResult, ValuationError> {
        self.params.validate()?;

        let components = estimate_fcf(provider, symbol).await?;
        let projection = project(components.free_cash_flow(), &self.params)?;

        let market_cap = match provider.market_cap(symbol).await.map_err(into_data_unavailable)? {
            Some(cap) => cap,
            None => {
                tracing::warn!("No market cap reported for {}, upside reported as 0", symbol);
                0.0
            }
        };
        let upside = upside_percent(projection.intrinsic_value, market_cap);

        tracing::info!(
            "DCF for {}: intrinsic {:.0}, market cap {:.0}, upside {:.2}%",
            symbol,
            projection.intrinsic_value,
            market_cap,
            upside
        );

        Ok(ValuationResult {
            symbol: symbol.to_string(),
            components,
            parameters: self.params,
            intrinsic_value: projection.intrinsic_value,
            market_cap,
            upside_percent: upside,
            future_fcfs: projection.future_fcfs,
            discounted_fcfs: projection.discounted_fcfs,
            terminal_value: projection.terminal_value,
            discounted_terminal_value: projection.discounted_terminal_value,
        })
    }
}

impl Default for DcfValuator {
    fn default() -> Self {
        Self::new(DcfParameters::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{statements_with_ebit, StubMarketData};
    use approx::assert_relative_eq;

    #[test]
    fn test_reference_projection() {
        let projection = project(1_000_000.0, &DcfParameters::default()).unwrap();

        let expected_future = [1_050_000.0, 1_102_500.0, 1_157_625.0, 1_215_506.25, 1_276_281.5625];
        assert_eq!(projection.future_fcfs.len(), 5);
        for (actual, expected) in projection.future_fcfs.iter().zip(expected_future) {
            assert_relative_eq!(*actual, expected, max_relative = 1e-12);
        }

        assert_relative_eq!(projection.discounted_fcfs[0], 954_545.454_545_454_5, max_relative = 1e-12);
        assert_relative_eq!(projection.terminal_value, 26_801_912.8125, max_relative = 1e-12);
        assert_relative_eq!(projection.discounted_terminal_value, 16_641_879.164_053_62, max_relative = 1e-12);
        // Five years of growth plus a perpetuity collapse to fcf * (1 + g) / (r - g).
        assert_relative_eq!(projection.intrinsic_value, 21_000_000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_non_positive_fcf_rejected() {
        for fcf in [0.0, -1.0, -5_000_000.0, f64::NAN] {
            let result = project(fcf, &DcfParameters::default());
            assert!(matches!(result, Err(ValuationError::InvalidFcf(_))), "fcf {}", fcf);
        }
    }

    #[test]
    fn test_equal_rates_rejected() {
        let params = DcfParameters {
            years: 5,
            discount_rate: 0.08,
            growth_rate: 0.08,
        };
        assert!(matches!(project(1_000.0, &params), Err(ValuationError::InvalidParameters(_))));

        let inverted = DcfParameters { growth_rate: 0.12, ..params };
        assert!(matches!(project(1_000.0, &inverted), Err(ValuationError::InvalidParameters(_))));
    }

    #[test]
    fn test_overflowing_projection_rejected() {
        let params = DcfParameters { years: 100, discount_rate: 1001.0, growth_rate: 1000.0 };
        assert!(params.validate().is_ok());

        let result = project(1_000_000.0, &params);
        assert!(matches!(result, Err(ValuationError::InvalidParameters(ref m)) if m.contains("overflows")));
    }

    #[test]
    fn test_intrinsic_value_increases_with_growth() {
        let values: Vec<f64> = [0.0, 0.02, 0.04, 0.06, 0.08, 0.095]
            .iter()
            .map(|&g| {
                let params = DcfParameters { years: 5, discount_rate: 0.10, growth_rate: g };
                project(250_000.0, &params).unwrap().intrinsic_value
            })
            .collect();

        assert!(values.iter().all(|v| *v > 0.0));
        assert!(values.windows(2).all(|w| w[1] > w[0]), "{:?}", values);
    }

    #[test]
    fn test_intrinsic_value_decreases_with_discount_rate() {
        let values: Vec<f64> = [0.04, 0.06, 0.08, 0.10, 0.15, 0.30]
            .iter()
            .map(|&r| {
                let params = DcfParameters { years: 7, discount_rate: r, growth_rate: 0.03 };
                project(250_000.0, &params).unwrap().intrinsic_value
            })
            .collect();

        assert!(values.iter().all(|v| *v > 0.0));
        assert!(values.windows(2).all(|w| w[1] < w[0]), "{:?}", values);
    }

    #[test]
    fn test_negative_growth_still_values() {
        let params = DcfParameters { years: 3, discount_rate: 0.09, growth_rate: -0.02 };
        let projection = project(100.0, &params).unwrap();
        assert!(projection.future_fcfs.windows(2).all(|w| w[1] < w[0]));
        assert!(projection.intrinsic_value > 0.0);
    }

    #[test]
    fn test_upside_percent() {
        assert_relative_eq!(upside_percent(150.0, 100.0), 50.0);
        assert_relative_eq!(upside_percent(80.0, 100.0), -20.0);
        assert_eq!(upside_percent(150.0, 0.0), 0.0);
        assert_eq!(upside_percent(150.0, -10.0), 0.0);
    }

    #[tokio::test]
    async fn test_valuate_end_to_end() {
        let provider = StubMarketData::new(statements_with_ebit(1_000_000.0), Some(20_000_000.0));
        let result = DcfValuator::default().valuate(&provider, "ACME").await.unwrap();

        assert_eq!(result.symbol, "ACME");
        assert_relative_eq!(result.intrinsic_value, 21_000_000.0, max_relative = 1e-12);
        assert_relative_eq!(result.upside_percent, 5.0, max_relative = 1e-9);
        assert_eq!(result.discounted_fcfs.len(), 5);
        assert_eq!(provider.market_cap_calls(), 1);
    }

    #[tokio::test]
    async fn test_valuate_negative_fcf_skips_market_cap() {
        let provider = StubMarketData::new(statements_with_ebit(-2_000.0), Some(1_000.0));
        let result = DcfValuator::default().valuate(&provider, "ACME").await;

        assert!(matches!(result, Err(ValuationError::InvalidFcf(fcf)) if fcf == -2_000.0));
        assert_eq!(provider.market_cap_calls(), 0);
    }

    #[tokio::test]
    async fn test_valuate_missing_market_cap_gives_zero_upside() {
        let provider = StubMarketData::new(statements_with_ebit(1_000.0), None);
        let result = DcfValuator::default().valuate(&provider, "ACME").await.unwrap();

        assert_eq!(result.market_cap, 0.0);
        assert_eq!(result.upside_percent, 0.0);
    }

    #[tokio::test]
    async fn test_valuate_rejects_parameters_before_fetching() {
        let provider = StubMarketData::new(statements_with_ebit(1_000.0), Some(1.0));
        let valuator = DcfValuator::new(DcfParameters { years: 5, discount_rate: 0.05, growth_rate: 0.05 });
        let result = valuator.valuate(&provider, "ACME").await;

        assert!(matches!(result, Err(ValuationError::InvalidParameters(_))));
        assert_eq!(provider.statement_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }
}
