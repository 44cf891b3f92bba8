//! Provider abstraction for market data sources.
//!
//! This module defines the [`MarketDataProvider`] trait, the single interface
//! the pipeline uses to get bars and company metadata, whatever the vendor.
//! It is object safe so a provider can be picked at runtime
//! (`Arc<dyn MarketDataProvider>`).
//!
//! # Example
//!
//! ```rust
//! # use chart_pipeline::models::{bar_series::BarSeries, company::CompanyMeta, request_params::BarsRequest};
//! # use chart_pipeline::providers::{MarketDataProvider, errors::ProviderError};
//! # use async_trait::async_trait;
//! struct MyProvider;
//! #[async_trait]
//! impl MarketDataProvider for MyProvider {
//!     async fn fetch_bars(&self, request: &BarsRequest) -> Result<BarSeries, ProviderError> {
//!         Ok(BarSeries::new(request.symbol.clone(), request.cadence, vec![]))
//!     }
//!
//!     async fn fetch_company_meta(&self, _symbol: &str) -> Result<Option<CompanyMeta>, ProviderError> {
//!         Ok(None)
//!     }
//! }
//! ```
pub mod errors;
pub mod json_file;
pub mod resample;

use async_trait::async_trait;

use crate::{
    models::{bar_series::BarSeries, company::CompanyMeta, request_params::BarsRequest},
    providers::errors::ProviderError,
};

pub use json_file::JsonFileProvider;

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Full available history of `request.symbol`, ascending.
    ///
    /// [`ProviderError::TickerNotFound`] when the symbol is unknown.
    async fn fetch_bars(&self, request: &BarsRequest) -> Result<BarSeries, ProviderError>;

    /// `Ok(None)` when the provider has no metadata for the symbol.
    async fn fetch_company_meta(&self, symbol: &str) -> Result<Option<CompanyMeta>, ProviderError>;
}
