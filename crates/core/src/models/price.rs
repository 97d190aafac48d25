use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A raw market-chart sample as returned by the API: (timestamp, price).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    /// Unix timestamp in milliseconds
    pub timestamp_ms: i64,
    pub price: f64,
}

/// A single chart point: a human-readable time label and a price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub label: String,
    pub price: f64,
}

/// Per-coin price history, keyed by coin id.
///
/// Each coin's series is fetched independently and stored wholesale:
/// inserting an id replaces only that id's series, and entries are never
/// removed. Series keep the order the API returned them in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphMap {
    entries: HashMap<String, Vec<PricePoint>>,
}

impl GraphMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the series for `coin_id`. Other ids are untouched.
    pub fn insert(&mut self, coin_id: impl Into<String>, points: Vec<PricePoint>) {
        self.entries.insert(coin_id.into(), points);
    }

    pub fn get(&self, coin_id: &str) -> Option<&[PricePoint]> {
        self.entries.get(coin_id).map(Vec::as_slice)
    }

    pub fn contains(&self, coin_id: &str) -> bool {
        self.entries.contains_key(coin_id)
    }

    /// Number of coins with a stored series.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids with a stored series, sorted for deterministic output.
    pub fn coin_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Total number of points across all series.
    pub fn total_points(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }
}
