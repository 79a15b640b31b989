use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValuationError {
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Free cash flow is not positive ({0:.0}); DCF is undefined")]
    InvalidFcf(f64),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("News unavailable: {0}")]
    NewsUnavailable(String),

    #[error("Configuration absent: {0}")]
    ConfigurationAbsent(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Render error: {0}")]
    RenderError(String),
}

impl ValuationError {
    /// Whether the error ends an evaluation run. News and chart problems only degrade it.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            ValuationError::NewsUnavailable(_)
                | ValuationError::ConfigurationAbsent(_)
                | ValuationError::RenderError(_)
        )
    }

    /// Short category name used in console diagnostics.
    pub fn category(&self) -> &'static str {
        match self {
            ValuationError::DataUnavailable(_) => "DataUnavailable",
            ValuationError::InvalidFcf(_) => "InvalidFCF",
            ValuationError::InvalidParameters(_) => "InvalidParameters",
            ValuationError::NewsUnavailable(_) => "NewsUnavailable",
            ValuationError::ConfigurationAbsent(_) => "ConfigurationAbsent",
            ValuationError::ApiError(_) => "ApiError",
            ValuationError::RenderError(_) => "RenderError",
        }
    }
}
