use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::coin::Coin;
use crate::models::detail::CoinDetail;
use crate::models::price::PriceSample;

/// Source of market data for the dashboard stores.
///
/// `CoinGeckoProvider` is the production implementation; tests plug in
/// mocks. Stores only ever see this trait, so swapping the data source
/// touches nothing else.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Free-text coin search, normalized to `Coin` summaries.
    async fn search_coins(&self, query: &str) -> Result<Vec<Coin>, CoreError>;

    /// Currently trending coins, normalized to `Coin` summaries.
    async fn trending_coins(&self) -> Result<Vec<Coin>, CoreError>;

    /// Price history for `coin_id` over the last `days` days, in the order
    /// the API returned it.
    async fn market_chart(&self, coin_id: &str, days: u32) -> Result<Vec<PriceSample>, CoreError>;

    /// Full detail record for `coin_id`, unmodified.
    async fn coin_detail(&self, coin_id: &str) -> Result<CoinDetail, CoreError>;
}
