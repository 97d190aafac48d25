use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Full coin record from the detail endpoint, kept exactly as received.
///
/// The shape is large and changes often upstream, so it is not modelled.
/// The accessors below only read well-known fields for convenience.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoinDetail(Value);

impl CoinDetail {
    pub fn new(raw: Value) -> Self {
        Self(raw)
    }

    /// The untouched JSON document.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    pub fn id(&self) -> Option<&str> {
        self.0.get("id")?.as_str()
    }

    pub fn name(&self) -> Option<&str> {
        self.0.get("name")?.as_str()
    }

    pub fn symbol(&self) -> Option<&str> {
        self.0.get("symbol")?.as_str()
    }

    /// Large logo URL (`image.large`).
    pub fn image(&self) -> Option<&str> {
        self.0.get("image")?.get("large")?.as_str()
    }

    /// `market_data.current_price.<currency>`; currency is matched lowercase.
    pub fn current_price(&self, currency: &str) -> Option<f64> {
        self.0
            .get("market_data")?
            .get("current_price")?
            .get(currency.to_lowercase())?
            .as_f64()
    }
}

impl From<Value> for CoinDetail {
    fn from(raw: Value) -> Self {
        Self(raw)
    }
}
