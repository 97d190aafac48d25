use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

pub const DEFAULT_API_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Runtime configuration for the dashboard core.
///
/// Every field has a default, so a partial JSON document (or `{}`) is a
/// valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the CoinGecko v3 API, without a trailing slash.
    pub api_base_url: String,

    /// Optional CoinGecko demo API key, sent as `x-cg-demo-api-key`.
    pub api_key: Option<String>,

    /// Quote currency for market charts (e.g., "usd").
    pub vs_currency: String,

    /// Quiet window of the debounced search, in milliseconds.
    pub search_debounce_ms: u64,

    /// Queries with at most this many characters show the trending list
    /// instead of hitting the search endpoint.
    pub short_query_max_len: usize,

    /// History window for the home page sparklines.
    pub home_chart_days: u32,

    /// History window for the detail page chart.
    pub detail_chart_days: u32,

    /// Per-request timeout. `None` leaves requests unbounded.
    pub request_timeout_secs: Option<u64>,

    /// UTC offset used for chart labels. `None` follows the local time
    /// zone, per timestamp.
    pub utc_offset_secs: Option<i32>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_key: None,
            vs_currency: "usd".to_string(),
            search_debounce_ms: 500,
            short_query_max_len: 2,
            home_chart_days: 1,
            detail_chart_days: 121,
            request_timeout_secs: None,
            utc_offset_secs: None,
        }
    }
}

impl Settings {
    /// Parse settings from JSON and validate them.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.api_base_url.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "api_base_url must not be empty".into(),
            ));
        }
        if self.vs_currency.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "vs_currency must not be empty".into(),
            ));
        }
        if self.home_chart_days == 0 || self.detail_chart_days == 0 {
            return Err(CoreError::ValidationError(format!(
                "chart windows must be at least one day (home: {}, detail: {})",
                self.home_chart_days, self.detail_chart_days
            )));
        }
        if let Some(offset) = self.utc_offset_secs {
            if FixedOffset::east_opt(offset).is_none() {
                return Err(CoreError::ValidationError(format!(
                    "utc_offset_secs out of range: {offset}"
                )));
            }
        }
        Ok(())
    }

    /// Pinned offset for chart labels; `None` means local time.
    pub fn label_offset(&self) -> Option<FixedOffset> {
        self.utc_offset_secs.and_then(FixedOffset::east_opt)
    }

    pub fn search_debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.search_debounce_ms)
    }
}
