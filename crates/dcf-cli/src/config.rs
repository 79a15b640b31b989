use anyhow::{anyhow, Context, Result};
use market_data::{NEWS_API_BASE_URL, POLYGON_BASE_URL};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use valuation_core::DcfParameters;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Runtime settings, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub polygon_api_key: String,
    pub polygon_base_url: String,
    /// `None` skips sentiment analysis.
    pub news_api_key: Option<String>,
    pub news_api_base_url: String,
    pub dcf: DcfParameters,
    /// `None` disables chart output.
    pub chart_dir: Option<PathBuf>,
    pub http_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let polygon_api_key = get("POLYGON_API_KEY").ok_or_else(|| anyhow!("POLYGON_API_KEY not set"))?;

        let defaults = DcfParameters::default();
        let dcf = DcfParameters {
            years: parse_or(get("DCF_YEARS"), "DCF_YEARS", defaults.years)?,
            discount_rate: parse_or(get("DCF_DISCOUNT_RATE"), "DCF_DISCOUNT_RATE", defaults.discount_rate)?,
            growth_rate: parse_or(get("DCF_GROWTH_RATE"), "DCF_GROWTH_RATE", defaults.growth_rate)?,
        };
        dcf.validate().map_err(|e| anyhow!("invalid DCF settings: {}", e))?;

        let chart_enabled = match get("DCF_CHART").map(|v| v.to_ascii_lowercase()) {
            Some(v) => !matches!(v.as_str(), "0" | "false" | "off" | "no"),
            None => true,
        };
        let chart_dir = chart_enabled.then(|| {
            get("DCF_CHART_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(std::env::temp_dir)
        });

        let timeout_secs: u64 = parse_or(get("HTTP_TIMEOUT_SECS"), "HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(anyhow!("HTTP_TIMEOUT_SECS must be at least 1"));
        }

        Ok(Self {
            polygon_api_key,
            polygon_base_url: get("POLYGON_BASE_URL").unwrap_or_else(|| POLYGON_BASE_URL.to_string()),
            news_api_key: get("NEWS_API_KEY"),
            news_api_base_url: get("NEWS_API_BASE_URL").unwrap_or_else(|| NEWS_API_BASE_URL.to_string()),
            dcf,
            chart_dir,
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", key, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("POLYGON_API_KEY", "pk")]).unwrap();

        assert_eq!(config.polygon_api_key, "pk");
        assert_eq!(config.polygon_base_url, POLYGON_BASE_URL);
        assert_eq!(config.news_api_key, None);
        assert_eq!(config.dcf, DcfParameters::default());
        assert_eq!(config.chart_dir, Some(std::env::temp_dir()));
        assert_eq!(config.http_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_missing_polygon_key_is_error() {
        let err = config_from(&[("NEWS_API_KEY", "nk")]).unwrap_err();
        assert!(err.to_string().contains("POLYGON_API_KEY"));

        assert!(config_from(&[("POLYGON_API_KEY", "  ")]).is_err());
    }

    #[test]
    fn test_blank_news_key_is_absent() {
        let config = config_from(&[("POLYGON_API_KEY", "pk"), ("NEWS_API_KEY", "")]).unwrap();
        assert_eq!(config.news_api_key, None);

        let config = config_from(&[("POLYGON_API_KEY", "pk"), ("NEWS_API_KEY", "nk")]).unwrap();
        assert_eq!(config.news_api_key.as_deref(), Some("nk"));
    }

    #[test]
    fn test_dcf_overrides() {
        let config = config_from(&[
            ("POLYGON_API_KEY", "pk"),
            ("DCF_YEARS", "10"),
            ("DCF_DISCOUNT_RATE", "0.09"),
            ("DCF_GROWTH_RATE", "0.03"),
        ])
        .unwrap();

        assert_eq!(config.dcf.years, 10);
        assert_eq!(config.dcf.discount_rate, 0.09);
        assert_eq!(config.dcf.growth_rate, 0.03);
    }

    #[test]
    fn test_malformed_number_is_error() {
        let err = config_from(&[("POLYGON_API_KEY", "pk"), ("DCF_YEARS", "five")]).unwrap_err();
        assert!(err.to_string().contains("DCF_YEARS"));
    }

    #[test]
    fn test_growth_not_below_discount_is_error() {
        let result = config_from(&[
            ("POLYGON_API_KEY", "pk"),
            ("DCF_DISCOUNT_RATE", "0.05"),
            ("DCF_GROWTH_RATE", "0.05"),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_chart_toggle_and_dir() {
        let config = config_from(&[("POLYGON_API_KEY", "pk"), ("DCF_CHART", "off")]).unwrap();
        assert_eq!(config.chart_dir, None);

        let config = config_from(&[("POLYGON_API_KEY", "pk"), ("DCF_CHART_DIR", "/srv/charts")]).unwrap();
        assert_eq!(config.chart_dir, Some(PathBuf::from("/srv/charts")));
    }

    #[test]
    fn test_zero_timeout_is_error() {
        assert!(config_from(&[("POLYGON_API_KEY", "pk"), ("HTTP_TIMEOUT_SECS", "0")]).is_err());
    }
}
