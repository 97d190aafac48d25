use serde::{Deserialize, Serialize};

/// Normalized summary of a coin, shared by the search and trending lists.
///
/// Both CoinGecko list endpoints are mapped into this one shape so the UI
/// never has to care which endpoint produced a coin. `id` is the join key
/// into the per-coin price history (`GraphMap`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    /// CoinGecko API id (e.g., "bitcoin", "ethereum")
    pub id: String,

    /// Display name (e.g., "Bitcoin")
    pub name: String,

    /// URL of the large coin logo
    pub image: String,

    /// Price in BTC. Only the trending endpoint reports it.
    pub price_btc: Option<f64>,
}

impl Coin {
    pub fn new(id: impl Into<String>, name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            image: image.into(),
            price_btc: None,
        }
    }

    /// Builder-style setter for the BTC price.
    pub fn with_price_btc(mut self, price_btc: f64) -> Self {
        self.price_btc = Some(price_btc);
        self
    }
}
