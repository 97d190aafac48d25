use async_trait::async_trait;
use reqwest::{Client, Request, RequestBuilder, Url};
use serde::Deserialize;
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::coin::Coin;
use crate::models::detail::CoinDetail;
use crate::models::price::PriceSample;
use crate::models::settings::Settings;
use super::traits::MarketDataProvider;

const PROVIDER_NAME: &str = "CoinGecko";
const API_KEY_HEADER: &str = "x-cg-demo-api-key";

/// CoinGecko v3 API provider.
///
/// - **Free**: works without a key; a demo key raises the rate limit.
/// - **Endpoints**: `/search`, `/search/trending`, `/coins/{id}/market_chart`, `/coins/{id}`
///
/// Requests are built and parsed in separate public steps
/// (`*_request` / `parse_*`) so URL shapes and response normalization can
/// be checked without touching the network.
pub struct CoinGeckoProvider {
    client: Client,
    base_url: String,
    vs_currency: String,
    api_key: Option<String>,
}

impl CoinGeckoProvider {
    pub fn new() -> Self {
        Self::from_settings(&Settings::default())
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let mut builder = Client::builder();
        if let Some(secs) = settings.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            base_url: settings.api_base_url.clone(),
            vs_currency: settings.vs_currency.clone(),
            api_key: settings.api_key.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ── Request builders ────────────────────────────────────────────

    /// `GET /search?query={query}`
    pub fn search_request(&self, query: &str) -> Result<Request, CoreError> {
        let url = self.endpoint(&["search"])?;
        Ok(self.get(url).query(&[("query", query)]).build()?)
    }

    /// `GET /search/trending`
    pub fn trending_request(&self) -> Result<Request, CoreError> {
        let url = self.endpoint(&["search", "trending"])?;
        Ok(self.get(url).build()?)
    }

    /// `GET /coins/{id}/market_chart?vs_currency={vs}&days={days}`
    pub fn market_chart_request(&self, coin_id: &str, days: u32) -> Result<Request, CoreError> {
        let url = self.endpoint(&["coins", coin_id, "market_chart"])?;
        let days = days.to_string();
        Ok(self
            .get(url)
            .query(&[("vs_currency", self.vs_currency.as_str()), ("days", days.as_str())])
            .build()?)
    }

    /// `GET /coins/{id}?localization=false&market_data=true`
    pub fn coin_detail_request(&self, coin_id: &str) -> Result<Request, CoreError> {
        let url = self.endpoint(&["coins", coin_id])?;
        Ok(self
            .get(url)
            .query(&[("localization", "false"), ("market_data", "true")])
            .build()?)
    }

    // ── Response parsers ────────────────────────────────────────────

    /// Normalize a `/search` body: `{coins: [{id, name, large}]}`.
    pub fn parse_search(body: &str) -> Result<Vec<Coin>, CoreError> {
        let resp: SearchResponse = serde_json::from_str(body)
            .map_err(|e| api_error(format!("Failed to parse search response: {e}")))?;
        Ok(resp.coins.into_iter().map(Coin::from).collect())
    }

    /// Normalize a `/search/trending` body: `{coins: [{item: {id, name, large, price_btc}}]}`.
    pub fn parse_trending(body: &str) -> Result<Vec<Coin>, CoreError> {
        let resp: TrendingResponse = serde_json::from_str(body)
            .map_err(|e| api_error(format!("Failed to parse trending response: {e}")))?;
        Ok(resp.coins.into_iter().map(|entry| Coin::from(entry.item)).collect())
    }

    /// Extract `prices` from a market chart body, keeping API order.
    pub fn parse_market_chart(body: &str) -> Result<Vec<PriceSample>, CoreError> {
        let resp: MarketChartResponse = serde_json::from_str(body)
            .map_err(|e| api_error(format!("Failed to parse market chart: {e}")))?;
        Ok(resp
            .prices
            .into_iter()
            .map(|(timestamp, price)| PriceSample {
                timestamp_ms: timestamp as i64,
                price,
            })
            .collect())
    }

    /// Wrap a detail body without interpreting it.
    pub fn parse_coin_detail(body: &str) -> Result<CoinDetail, CoreError> {
        let raw: serde_json::Value = serde_json::from_str(body)
            .map_err(|e| api_error(format!("Failed to parse coin detail: {e}")))?;
        if !raw.is_object() {
            return Err(api_error("Coin detail response is not a JSON object".into()));
        }
        Ok(CoinDetail::new(raw))
    }

    // ── Internals ───────────────────────────────────────────────────

    fn endpoint(&self, segments: &[&str]) -> Result<Url, CoreError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            CoreError::ValidationError(format!("Invalid API base URL '{}': {e}", self.base_url))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                CoreError::ValidationError(format!("API base URL cannot take a path: '{}'", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get(&self, url: Url) -> RequestBuilder {
        let builder = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json");
        match &self.api_key {
            Some(key) => builder.header(API_KEY_HEADER, key),
            None => builder,
        }
    }

    async fn fetch_body(&self, request: Request) -> Result<String, CoreError> {
        let body = self
            .client
            .execute(request)
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body)
    }
}

impl Default for CoinGeckoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CoinGeckoProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoinGeckoProvider")
            .field("base_url", &self.base_url)
            .field("vs_currency", &self.vs_currency)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn api_error(message: String) -> CoreError {
    CoreError::Api {
        provider: PROVIDER_NAME.into(),
        message,
    }
}

// ── CoinGecko API response types ────────────────────────────────────

#[derive(Deserialize)]
struct SearchResponse {
    coins: Vec<SearchCoin>,
}

#[derive(Deserialize)]
struct SearchCoin {
    id: String,
    name: String,
    large: String,
}

#[derive(Deserialize)]
struct TrendingResponse {
    coins: Vec<TrendingEntry>,
}

#[derive(Deserialize)]
struct TrendingEntry {
    item: TrendingItem,
}

#[derive(Deserialize)]
struct TrendingItem {
    id: String,
    name: String,
    large: String,
    price_btc: Option<f64>,
}

#[derive(Deserialize)]
struct MarketChartResponse {
    prices: Vec<(f64, f64)>, // [timestamp_ms, price]
}

impl From<SearchCoin> for Coin {
    fn from(c: SearchCoin) -> Self {
        Coin::new(c.id, c.name, c.large)
    }
}

impl From<TrendingItem> for Coin {
    fn from(item: TrendingItem) -> Self {
        Coin {
            id: item.id,
            name: item.name,
            image: item.large,
            price_btc: item.price_btc,
        }
    }
}

#[async_trait]
impl MarketDataProvider for CoinGeckoProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn search_coins(&self, query: &str) -> Result<Vec<Coin>, CoreError> {
        let body = self.fetch_body(self.search_request(query)?).await?;
        Self::parse_search(&body)
    }

    async fn trending_coins(&self) -> Result<Vec<Coin>, CoreError> {
        let body = self.fetch_body(self.trending_request()?).await?;
        Self::parse_trending(&body)
    }

    async fn market_chart(&self, coin_id: &str, days: u32) -> Result<Vec<PriceSample>, CoreError> {
        let body = self
            .fetch_body(self.market_chart_request(coin_id, days)?)
            .await?;
        Self::parse_market_chart(&body)
    }

    async fn coin_detail(&self, coin_id: &str) -> Result<CoinDetail, CoreError> {
        let body = self.fetch_body(self.coin_detail_request(coin_id)?).await?;
        Self::parse_coin_detail(&body)
    }
}
