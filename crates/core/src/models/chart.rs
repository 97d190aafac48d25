use serde::{Deserialize, Serialize};

/// How a sample timestamp is rendered as a chart axis label.
///
/// The home view charts one day of data, so points are labelled with the
/// time of day; the detail view charts months, so points carry a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelStyle {
    /// `3:04:05 PM`
    TimeOfDay,
    /// `1/15/2025`
    Date,
}

impl LabelStyle {
    /// chrono format string for this style (US locale ordering).
    pub fn format_str(&self) -> &'static str {
        match self {
            LabelStyle::TimeOfDay => "%-I:%M:%S %p",
            LabelStyle::Date => "%-m/%-d/%Y",
        }
    }
}

/// Direction of the most recent price move in a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceTrend {
    Up,
    Down,
}

impl std::fmt::Display for PriceTrend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceTrend::Up => write!(f, "▲"),
            PriceTrend::Down => write!(f, "▼"),
        }
    }
}
