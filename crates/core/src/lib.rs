pub mod errors;
pub mod models;
pub mod providers;
pub mod services;

use std::sync::Arc;

use errors::CoreError;
use models::settings::Settings;
use providers::coingecko::CoinGeckoProvider;
use providers::traits::MarketDataProvider;
use services::home_store::HomeStore;
use services::show_store::ShowStore;

/// Main entry point for the CryptoX core library.
///
/// One instance per running application: it owns the market-data provider
/// and the two page stores, and is handed by reference to whatever renders
/// them. Call `shutdown()` on teardown to stop background fetches.
#[must_use]
pub struct CryptoDashboard {
    settings: Settings,
    provider: Arc<dyn MarketDataProvider>,
    home: HomeStore,
    show: ShowStore,
}

impl std::fmt::Debug for CryptoDashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoDashboard")
            .field("provider", &self.provider.name())
            .field("settings", &self.settings)
            .field("home", &self.home)
            .field("show", &self.show)
            .finish()
    }
}

impl CryptoDashboard {
    /// Build a dashboard backed by the public CoinGecko API.
    pub fn new(settings: Settings) -> Result<Self, CoreError> {
        settings.validate()?;
        let provider = Arc::new(CoinGeckoProvider::from_settings(&settings));
        Ok(Self::build(settings, provider))
    }

    /// Build a dashboard on top of any market-data provider.
    pub fn with_provider(
        settings: Settings,
        provider: Arc<dyn MarketDataProvider>,
    ) -> Result<Self, CoreError> {
        settings.validate()?;
        Ok(Self::build(settings, provider))
    }

    fn build(settings: Settings, provider: Arc<dyn MarketDataProvider>) -> Self {
        let home = HomeStore::new(Arc::clone(&provider), &settings);
        let show = ShowStore::new(Arc::clone(&provider), &settings);
        Self {
            settings,
            provider,
            home,
            show,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Store backing the home/search page.
    #[must_use]
    pub fn home(&self) -> &HomeStore {
        &self.home
    }

    /// Store backing the coin detail page.
    #[must_use]
    pub fn show(&self) -> &ShowStore {
        &self.show
    }

    /// Stop the pending search and abort in-flight background fetches.
    /// Store state stays readable afterwards.
    pub fn shutdown(&self) {
        tracing::debug!("shutting down dashboard");
        self.home.shutdown();
    }
}
