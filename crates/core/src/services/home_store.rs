use serde::Serialize;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::models::chart::{LabelStyle, PriceTrend};
use crate::models::coin::Coin;
use crate::models::price::{GraphMap, PricePoint};
use crate::models::settings::Settings;
use crate::providers::traits::MarketDataProvider;
use crate::services::chart_service::ChartService;
use crate::services::debounce::Debouncer;

/// Number of coins shown in the home page grid.
pub const VISIBLE_COINS: usize = 6;
/// Number of trending coins shown in the home page side list.
pub const TRENDING_PREVIEW: usize = 10;

pub const SEARCH_ERROR: &str = "Failed to search coins";
pub const TRENDING_ERROR: &str = "Failed to fetch trending coins";

/// Everything the home page renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HomeState {
    /// Current search box contents.
    pub query: String,
    /// Coins currently listed: search results, or the trending list.
    pub coins: Vec<Coin>,
    /// Baseline list from the trending endpoint.
    pub trending: Vec<Coin>,
    pub loading: bool,
    /// User-facing message from the last failed search/trending fetch.
    pub error: Option<String>,
    /// One-day price history per coin id.
    pub graphs: GraphMap,
}

impl HomeState {
    /// Coins for the home grid (first `VISIBLE_COINS`).
    pub fn visible_coins(&self) -> &[Coin] {
        &self.coins[..self.coins.len().min(VISIBLE_COINS)]
    }

    /// Coins for the trending side list (first `TRENDING_PREVIEW`).
    pub fn trending_preview(&self) -> &[Coin] {
        &self.trending[..self.trending.len().min(TRENDING_PREVIEW)]
    }

    /// Up/down indicator for a coin from its last two graph points.
    pub fn price_trend(&self, coin_id: &str) -> Option<PriceTrend> {
        ChartService::price_trend(self.graphs.get(coin_id)?)
    }

    /// Series for the large chart: the first visible coin's history.
    /// `None` until there is a coin and its graph has loaded.
    pub fn headline_graph(&self) -> Option<&[PricePoint]> {
        let first = self.visible_coins().first()?;
        self.graphs.get(&first.id)
    }
}

/// State holder for the home page.
///
/// Cloning is cheap and every clone shares the same state. Actions run on
/// the tokio runtime; state changes are published through a `watch`
/// channel, so consumers either take a `snapshot()` or `subscribe()`.
///
/// A store created inside a runtime keeps a handle to it, and its sync
/// actions (`set_query`, `search_coins`) may then be called from any
/// thread, such as a UI thread. A store created outside a runtime spawns on
/// the caller's current runtime and panics without one.
#[derive(Clone)]
pub struct HomeStore {
    inner: Arc<HomeInner>,
}

struct HomeInner {
    provider: Arc<dyn MarketDataProvider>,
    chart: ChartService,
    chart_days: u32,
    short_query_max_len: usize,
    state: watch::Sender<HomeState>,
    search: Debouncer,
    runtime: Option<Handle>,
    /// Spawned tasks (debounced searches, per-coin graph fetches).
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl std::fmt::Debug for HomeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("HomeStore")
            .field("provider", &self.inner.provider.name())
            .field("query", &state.query)
            .field("coins", &state.coins.len())
            .field("graphs", &state.graphs.len())
            .field("loading", &state.loading)
            .finish()
    }
}

impl HomeStore {
    pub fn new(provider: Arc<dyn MarketDataProvider>, settings: &Settings) -> Self {
        let (state, _) = watch::channel(HomeState::default());
        let runtime = Handle::try_current().ok();
        Self {
            inner: Arc::new(HomeInner {
                provider,
                chart: ChartService::new(settings.label_offset()),
                chart_days: settings.home_chart_days,
                short_query_max_len: settings.short_query_max_len,
                state,
                search: Debouncer::with_runtime(settings.search_debounce(), runtime.clone()),
                runtime,
                tasks: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Current state, cloned.
    pub fn snapshot(&self) -> HomeState {
        self.inner.state.borrow().clone()
    }

    /// Receiver that is notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<HomeState> {
        self.inner.state.subscribe()
    }

    // ── Actions ─────────────────────────────────────────────────────

    /// Replace the query, then schedule a debounced search.
    ///
    /// # Panics
    ///
    /// Panics when the store was created outside a tokio runtime and this
    /// is called outside one too.
    pub fn set_query(&self, value: impl Into<String>) {
        let value = value.into();
        self.inner.state.send_modify(|s| s.query = value);
        self.search_coins();
    }

    /// Schedule a search for the current query after the debounce window.
    ///
    /// Calls inside the window coalesce into one. When the timer fires, a
    /// query of `short_query_max_len` characters or fewer restores the trending
    /// list without a request; otherwise the search endpoint is queried.
    ///
    /// # Panics
    ///
    /// Same runtime requirement as [`HomeStore::set_query`].
    pub fn search_coins(&self) {
        let store = self.clone();
        let handle = self
            .inner
            .search
            .call(move || async move { store.run_search().await });
        self.track(handle);
    }

    /// Load the trending list, then fetch every trending coin's graph in
    /// the background.
    pub async fn fetch_coins(&self) {
        let _loading = self.begin_loading();

        match self.inner.provider.trending_coins().await {
            Ok(coins) => {
                let ids: Vec<String> = coins.iter().map(|c| c.id.clone()).collect();
                tracing::debug!(count = ids.len(), "fetched trending coins");
                self.inner.state.send_modify(|s| {
                    s.coins = coins.clone();
                    s.trending = coins;
                });
                for id in ids {
                    self.spawn_graph_fetch(id);
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "error fetching trending coins");
                self.inner
                    .state
                    .send_modify(|s| s.error = Some(TRENDING_ERROR.to_string()));
            }
        }
    }

    /// Fetch one coin's short-range history into the GraphMap.
    ///
    /// Failures are logged and otherwise ignored: they never set `error`
    /// and never touch other coins' entries.
    pub async fn fetch_coin_graph_data(&self, coin_id: &str) {
        match self
            .inner
            .provider
            .market_chart(coin_id, self.inner.chart_days)
            .await
        {
            Ok(samples) => {
                let points = self
                    .inner
                    .chart
                    .to_price_points(&samples, LabelStyle::TimeOfDay);
                let id = coin_id.to_string();
                self.inner.state.send_modify(|s| s.graphs.insert(id, points));
            }
            Err(e) => {
                tracing::warn!(coin_id, error = %e, "error fetching graph data");
            }
        }
    }

    // ── Task lifecycle ──────────────────────────────────────────────

    /// Wait until every background task spawned so far (and any they spawn)
    /// has finished.
    pub async fn settle(&self) {
        loop {
            let pending = std::mem::take(&mut *self.lock_tasks());
            if pending.is_empty() {
                return;
            }
            for handle in pending {
                if let Err(e) = handle.await {
                    if e.is_panic() {
                        tracing::error!(error = %e, "home store task panicked");
                    }
                }
            }
        }
    }

    /// Number of background tasks that have not finished yet.
    pub fn pending_tasks(&self) -> usize {
        let mut tasks = self.lock_tasks();
        tasks.retain(|h| !h.is_finished());
        tasks.len()
    }

    /// Cancel the pending search and abort every background task.
    pub fn shutdown(&self) {
        self.inner.search.cancel();
        for handle in std::mem::take(&mut *self.lock_tasks()) {
            handle.abort();
        }
    }

    // ── Internals ───────────────────────────────────────────────────

    async fn run_search(&self) {
        let query = self.inner.state.borrow().query.clone();

        if query.chars().count() <= self.inner.short_query_max_len {
            self.inner
                .state
                .send_modify(|s| s.coins = s.trending.clone());
            return;
        }

        let _loading = self.begin_loading();
        match self.inner.provider.search_coins(&query).await {
            Ok(coins) => {
                tracing::debug!(query = %query, count = coins.len(), "search completed");
                self.inner.state.send_modify(|s| s.coins = coins);
            }
            Err(e) => {
                tracing::error!(query = %query, error = %e, "error searching coins");
                self.inner
                    .state
                    .send_modify(|s| s.error = Some(SEARCH_ERROR.to_string()));
            }
        }
    }

    fn spawn_graph_fetch(&self, coin_id: String) {
        let store = self.clone();
        let task = async move {
            store.fetch_coin_graph_data(&coin_id).await;
        };
        let handle = match &self.inner.runtime {
            Some(runtime) => runtime.spawn(task),
            None => tokio::spawn(task),
        };
        self.track(handle);
    }

    /// Set `loading`, clear `error`; `loading` is cleared again when the
    /// guard drops, including when the owning task is aborted.
    fn begin_loading(&self) -> LoadingGuard<'_> {
        self.inner.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });
        LoadingGuard {
            state: &self.inner.state,
        }
    }

    fn track(&self, handle: JoinHandle<()>) {
        let mut tasks = self.lock_tasks();
        tasks.retain(|h| !h.is_finished());
        tasks.push(handle);
    }

    fn lock_tasks(&self) -> std::sync::MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.inner.tasks.lock().unwrap_or_else(|e| e.into_inner())
    }
}

struct LoadingGuard<'a> {
    state: &'a watch::Sender<HomeState>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|s| s.loading = false);
    }
}
