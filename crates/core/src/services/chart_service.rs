use chrono::{DateTime, FixedOffset, Local};

use crate::models::chart::{LabelStyle, PriceTrend};
use crate::models::price::{PricePoint, PriceSample};

/// Turns raw market-chart samples into chart-ready series.
///
/// The core computes labels and trends; the frontend only renders.
///
/// With no pinned offset, labels follow the local time zone and each
/// timestamp gets the offset in effect at that instant, so a series that
/// crosses a DST change is labelled correctly on both sides.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChartService {
    offset: Option<FixedOffset>,
}

impl ChartService {
    pub fn new(offset: Option<FixedOffset>) -> Self {
        Self { offset }
    }

    /// Labels in the local time zone.
    pub fn local() -> Self {
        Self { offset: None }
    }

    /// Labels at a fixed UTC offset.
    pub fn fixed(offset: FixedOffset) -> Self {
        Self {
            offset: Some(offset),
        }
    }

    /// The pinned offset, or `None` when labels follow the local zone.
    pub fn offset(&self) -> Option<FixedOffset> {
        self.offset
    }

    /// Render one timestamp as a label in this service's time zone.
    /// Returns `None` for timestamps chrono cannot represent.
    pub fn label(&self, timestamp_ms: i64, style: LabelStyle) -> Option<String> {
        let utc = DateTime::from_timestamp_millis(timestamp_ms)?;
        let label = match self.offset {
            Some(offset) => utc.with_timezone(&offset).format(style.format_str()),
            None => utc.with_timezone(&Local).format(style.format_str()),
        };
        Some(label.to_string())
    }

    /// Map samples to labelled points, keeping the input order.
    /// Samples with unrepresentable timestamps are dropped with a warning.
    pub fn to_price_points(&self, samples: &[PriceSample], style: LabelStyle) -> Vec<PricePoint> {
        let mut points = Vec::with_capacity(samples.len());
        for sample in samples {
            match self.label(sample.timestamp_ms, style) {
                Some(label) => points.push(PricePoint {
                    label,
                    price: sample.price,
                }),
                None => tracing::warn!(
                    timestamp_ms = sample.timestamp_ms,
                    price = sample.price,
                    "dropping price sample with unrepresentable timestamp"
                ),
            }
        }
        points
    }

    /// Direction of the last move in a series: compares the final two points.
    /// `None` when there are fewer than two points or the price is unchanged.
    pub fn price_trend(points: &[PricePoint]) -> Option<PriceTrend> {
        let [.., previous, current] = points else {
            return None;
        };
        if current.price > previous.price {
            Some(PriceTrend::Up)
        } else if current.price < previous.price {
            Some(PriceTrend::Down)
        } else {
            None
        }
    }
}
