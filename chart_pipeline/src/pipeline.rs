//! Request-to-spec orchestration.
//!
//! One [`ChartRequest`] runs through: bars → indicators (over the full
//! history) → lookback cut → pivots and volume labels → company metadata and
//! fundamentals (both optional) → [`assemble`]. Only missing market data is
//! fatal.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    assembler::{AssemblyInput, assemble},
    config::ChartConfig,
    errors::Error,
    fundamentals::{Cancellation, FundamentalsFetcher},
    indicators::enrich,
    models::{
        cadence::{Cadence, lookback_start},
        chart_spec::ChartSpec,
        request_params::BarsRequest,
    },
    providers::MarketDataProvider,
    theme::ThemeName,
};

/// What the front-end asks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartRequest {
    pub ticker: String,
    #[serde(default)]
    pub weekly: bool,
    /// Style name; unknown names use the default theme.
    #[serde(default)]
    pub theme: Option<String>,
    /// Months of history shown; defaults per cadence.
    #[serde(default)]
    pub lookback_months: Option<u32>,
}

impl ChartRequest {
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            weekly: false,
            theme: None,
            lookback_months: None,
        }
    }

    pub fn weekly(mut self, weekly: bool) -> Self {
        self.weekly = weekly;
        self
    }

    pub fn theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = Some(theme.into());
        self
    }

    pub fn lookback_months(mut self, months: u32) -> Self {
        self.lookback_months = Some(months);
        self
    }

    pub fn cadence(&self) -> Cadence {
        Cadence::from_weekly_flag(self.weekly)
    }

    pub fn theme_name(&self) -> ThemeName {
        self.theme
            .as_deref()
            .map_or(ThemeName::DEFAULT, ThemeName::lookup)
    }

    pub fn effective_lookback_months(&self) -> u32 {
        self.lookback_months
            .unwrap_or_else(|| self.cadence().default_lookback_months())
    }
}

pub struct ChartPipeline {
    provider: Arc<dyn MarketDataProvider>,
    fundamentals: Option<FundamentalsFetcher>,
    config: ChartConfig,
}

impl ChartPipeline {
    /// A pipeline without a fundamentals source; charts never carry a banner.
    pub fn new(provider: Arc<dyn MarketDataProvider>, config: ChartConfig) -> Self {
        Self {
            provider,
            fundamentals: None,
            config,
        }
    }

    pub fn with_fundamentals(mut self, fetcher: FundamentalsFetcher) -> Self {
        self.fundamentals = Some(fetcher);
        self
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    /// Builds the chart spec for `request`, showing the lookback window that
    /// ends at `as_of`.
    ///
    /// # Errors
    ///
    /// - [`Error::TickerNotFound`] when the provider does not know the ticker.
    /// - [`Error::DataUnavailable`] when there are no bars, or none inside the
    ///   lookback window.
    /// - [`Error::Provider`] for any other market-data failure.
    pub async fn build(
        &self,
        request: &ChartRequest,
        as_of: DateTime<Utc>,
        cancel: &Cancellation,
    ) -> Result<ChartSpec, Error> {
        let ticker = request.ticker.trim().to_uppercase();
        let cadence = request.cadence();

        let series = self
            .provider
            .fetch_bars(&BarsRequest::new(ticker.clone(), cadence))
            .await?;
        let full = enrich(series)?;

        let months = request.effective_lookback_months();
        let visible = full.since(lookback_start(as_of, months));
        if visible.is_empty() {
            return Err(Error::DataUnavailable(ticker));
        }
        log::debug!(
            "{ticker}: {} of {} {cadence} bars inside the {months}-month lookback",
            visible.len(),
            full.len()
        );

        let pivots = self.config.zigzag().detect(visible.bars());
        let volume_labels = self.config.volume_spikes().select(&visible);

        let meta = match self.provider.fetch_company_meta(&ticker).await {
            Ok(meta) => meta,
            Err(err) => {
                log::warn!("{ticker}: continuing without company metadata: {err}");
                None
            }
        };

        let fundamentals = match &self.fundamentals {
            Some(fetcher) => fetcher.fetch_available(&ticker, cancel).await,
            None => None,
        };

        let theme = request.theme_name().config();
        Ok(assemble(AssemblyInput {
            enriched: &visible,
            pivots,
            volume_labels,
            fundamentals: fundamentals.as_ref(),
            meta: meta.as_ref(),
            theme,
            headroom: self.config.layout.headroom,
        }))
    }
}
