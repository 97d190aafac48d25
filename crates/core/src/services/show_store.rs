use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;

use crate::errors::CoreError;
use crate::models::chart::LabelStyle;
use crate::models::detail::CoinDetail;
use crate::models::price::PricePoint;
use crate::models::settings::Settings;
use crate::providers::traits::MarketDataProvider;
use crate::services::chart_service::ChartService;

/// Everything the coin detail page renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShowState {
    /// Long-range price history, labelled by date.
    pub graph_data: Vec<PricePoint>,
    /// Detail record as returned by the API.
    pub coin_data: Option<CoinDetail>,
}

/// State holder for the coin detail page.
///
/// Unlike `HomeStore` there is no loading or error state: a failed fetch
/// leaves the state as it was and hands the error back to the caller.
#[derive(Clone)]
pub struct ShowStore {
    inner: Arc<ShowInner>,
}

struct ShowInner {
    provider: Arc<dyn MarketDataProvider>,
    chart: ChartService,
    chart_days: u32,
    state: watch::Sender<ShowState>,
}

impl std::fmt::Debug for ShowStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("ShowStore")
            .field("provider", &self.inner.provider.name())
            .field("coin", &state.coin_data.as_ref().and_then(CoinDetail::id))
            .field("points", &state.graph_data.len())
            .finish()
    }
}

impl ShowStore {
    pub fn new(provider: Arc<dyn MarketDataProvider>, settings: &Settings) -> Self {
        let (state, _) = watch::channel(ShowState::default());
        Self {
            inner: Arc::new(ShowInner {
                provider,
                chart: ChartService::new(settings.label_offset()),
                chart_days: settings.detail_chart_days,
                state,
            }),
        }
    }

    /// Current state, cloned.
    pub fn snapshot(&self) -> ShowState {
        self.inner.state.borrow().clone()
    }

    /// Receiver that is notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<ShowState> {
        self.inner.state.subscribe()
    }

    /// Load the price history and detail record for `coin_id`.
    ///
    /// Both requests run concurrently and both must succeed; the two
    /// fields are then replaced in a single update. On failure nothing
    /// is stored.
    pub async fn fetch_data(&self, coin_id: &str) -> Result<(), CoreError> {
        let provider = &self.inner.provider;
        let (samples, detail) = tokio::try_join!(
            provider.market_chart(coin_id, self.inner.chart_days),
            provider.coin_detail(coin_id)
        )
        .inspect_err(|e| tracing::error!(coin_id, error = %e, "error fetching coin data"))?;

        let graph_data = self.inner.chart.to_price_points(&samples, LabelStyle::Date);
        tracing::debug!(coin_id, points = graph_data.len(), "fetched coin data");

        self.inner.state.send_modify(|s| {
            s.graph_data = graph_data;
            s.coin_data = Some(detail);
        });
        Ok(())
    }
}
