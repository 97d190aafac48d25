// ═══════════════════════════════════════════════════════════════════
// Shared test helpers — scripted market-data provider and fixtures
// ═══════════════════════════════════════════════════════════════════

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use cryptox_core::errors::CoreError;
use cryptox_core::models::coin::Coin;
use cryptox_core::models::detail::CoinDetail;
use cryptox_core::models::price::PriceSample;
use cryptox_core::models::settings::Settings;
use cryptox_core::providers::traits::MarketDataProvider;

/// 2025-01-15T00:00:00Z
pub const BASE_TS_MS: i64 = 1_736_899_200_000;

/// A request the mock provider received, recorded before any delay.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Search(String),
    Trending,
    MarketChart(String, u32),
    Detail(String),
}

/// Provider that answers from in-memory fixtures.
///
/// Failures and delays are keyed by `"search:<query>"`, `"trending"`,
/// `"chart:<id>"` and `"detail:<id>"`. Delays use `tokio::time`, so they
/// follow the paused test clock.
#[derive(Default)]
pub struct MockProvider {
    calls: Mutex<Vec<Call>>,
    trending: Mutex<Vec<Coin>>,
    search: Mutex<HashMap<String, Vec<Coin>>>,
    charts: Mutex<HashMap<String, Vec<PriceSample>>>,
    details: Mutex<HashMap<String, serde_json::Value>>,
    failures: Mutex<HashSet<String>>,
    delays: Mutex<HashMap<String, Duration>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trending(self, coins: Vec<Coin>) -> Self {
        *self.trending.lock().unwrap() = coins;
        self
    }

    pub fn with_search(self, query: &str, coins: Vec<Coin>) -> Self {
        self.search.lock().unwrap().insert(query.to_string(), coins);
        self
    }

    pub fn with_chart(self, coin_id: &str, samples: Vec<PriceSample>) -> Self {
        self.set_chart(coin_id, samples);
        self
    }

    pub fn with_detail(self, coin_id: &str, detail: serde_json::Value) -> Self {
        self.details
            .lock()
            .unwrap()
            .insert(coin_id.to_string(), detail);
        self
    }

    pub fn failing(self, key: &str) -> Self {
        self.set_failing(key);
        self
    }

    pub fn delayed(self, key: &str, delay: Duration) -> Self {
        self.delays.lock().unwrap().insert(key.to_string(), delay);
        self
    }

    pub fn set_failing(&self, key: &str) {
        self.failures.lock().unwrap().insert(key.to_string());
    }

    pub fn set_chart(&self, coin_id: &str, samples: Vec<PriceSample>) {
        self.charts
            .lock()
            .unwrap()
            .insert(coin_id.to_string(), samples);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn search_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Search(q) => Some(q),
                _ => None,
            })
            .collect()
    }

    /// Coin ids of market chart requests, sorted.
    pub fn chart_calls(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::MarketChart(id, _) => Some(id),
                _ => None,
            })
            .collect();
        ids.sort();
        ids
    }

    async fn enter(&self, call: Call, key: String) -> Result<(), CoreError> {
        self.calls.lock().unwrap().push(call);
        let delay = self.delays.lock().unwrap().get(&key).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failures.lock().unwrap().contains(&key) {
            return Err(CoreError::Network(format!("mock failure: {key}")));
        }
        Ok(())
    }
}

#[async_trait]
impl MarketDataProvider for MockProvider {
    fn name(&self) -> &str {
        "Mock"
    }

    async fn search_coins(&self, query: &str) -> Result<Vec<Coin>, CoreError> {
        self.enter(Call::Search(query.to_string()), format!("search:{query}"))
            .await?;
        Ok(self
            .search
            .lock()
            .unwrap()
            .get(query)
            .cloned()
            .unwrap_or_default())
    }

    async fn trending_coins(&self) -> Result<Vec<Coin>, CoreError> {
        self.enter(Call::Trending, "trending".to_string()).await?;
        Ok(self.trending.lock().unwrap().clone())
    }

    async fn market_chart(&self, coin_id: &str, days: u32) -> Result<Vec<PriceSample>, CoreError> {
        self.enter(
            Call::MarketChart(coin_id.to_string(), days),
            format!("chart:{coin_id}"),
        )
        .await?;
        self.charts
            .lock()
            .unwrap()
            .get(coin_id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(format!("chart for {coin_id}")))
    }

    async fn coin_detail(&self, coin_id: &str) -> Result<CoinDetail, CoreError> {
        self.enter(Call::Detail(coin_id.to_string()), format!("detail:{coin_id}"))
            .await?;
        self.details
            .lock()
            .unwrap()
            .get(coin_id)
            .cloned()
            .map(CoinDetail::new)
            .ok_or_else(|| CoreError::NotFound(format!("detail for {coin_id}")))
    }
}

// ── Fixtures ────────────────────────────────────────────────────────

/// Default settings with UTC labels, so label assertions are stable.
pub fn test_settings() -> Settings {
    Settings {
        utc_offset_secs: Some(0),
        ..Settings::default()
    }
}

pub fn coin(id: &str) -> Coin {
    Coin::new(id, id.to_uppercase(), format!("https://img.example/{id}.png"))
}

/// `n` trending coins `coin-0`..`coin-{n-1}` with BTC prices.
pub fn trending_coins(n: usize) -> Vec<Coin> {
    (0..n)
        .map(|i| coin(&format!("coin-{i}")).with_price_btc(0.0001 * (i + 1) as f64))
        .collect()
}

/// Samples five minutes apart starting at `BASE_TS_MS`.
pub fn samples(prices: &[f64]) -> Vec<PriceSample> {
    prices
        .iter()
        .enumerate()
        .map(|(i, &price)| PriceSample {
            timestamp_ms: BASE_TS_MS + i as i64 * 300_000,
            price,
        })
        .collect()
}

/// Samples one day apart starting at `BASE_TS_MS`.
pub fn daily_samples(prices: &[f64]) -> Vec<PriceSample> {
    prices
        .iter()
        .enumerate()
        .map(|(i, &price)| PriceSample {
            timestamp_ms: BASE_TS_MS + i as i64 * 86_400_000,
            price,
        })
        .collect()
}

pub fn detail(id: &str, usd: f64) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "symbol": id.chars().take(3).collect::<String>(),
        "name": id.to_uppercase(),
        "image": { "large": format!("https://img.example/{id}.png") },
        "market_data": { "current_price": { "usd": usd } }
    })
}

/// Let spawned tasks whose timers already fired run to their next await.
pub async fn run_pending() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

/// In-memory log sink for `capture_logs`.
#[derive(Clone, Default)]
struct LogBuffer(std::sync::Arc<Mutex<Vec<u8>>>);

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a thread-local subscriber and return its result together
/// with everything it logged.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .without_time()
        .with_writer(move || writer.clone())
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    let bytes = buffer.0.lock().unwrap_or_else(|e| e.into_inner()).clone();
    (result, String::from_utf8_lossy(&bytes).into_owned())
}
