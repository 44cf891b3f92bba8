//! Market data from local JSON quote files.
//!
//! Each symbol lives in `{dir}/{SYMBOL}.json`:
//!
//! ```json
//! {
//!   "meta": { "shortName": "Acme Corp.", "industry": "Widgets", "sector": "Industrials" },
//!   "bars": [ { "t": "2024-01-02T00:00:00Z", "o": 10.0, "h": 11.0, "l": 9.5, "c": 10.5, "v": 120000 } ]
//! }
//! ```
//!
//! Bars on disk are daily; weekly requests are resampled on load. The `meta`
//! block read alongside the bars is kept, so a chart build parses each file
//! once.

use std::{collections::HashMap, io, path::PathBuf, sync::Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{
    models::{
        bar::Bar, bar_series::BarSeries, cadence::Cadence, company::CompanyMeta,
        request_params::BarsRequest,
    },
    providers::{MarketDataProvider, errors::ProviderError, resample::resample_weekly},
};

#[derive(Deserialize, Debug)]
struct FileBar {
    #[serde(rename = "t")]
    timestamp: DateTime<Utc>,
    #[serde(rename = "o")]
    open: f64,
    #[serde(rename = "h")]
    high: f64,
    #[serde(rename = "l")]
    low: f64,
    #[serde(rename = "c")]
    close: f64,
    #[serde(rename = "v")]
    volume: f64,
}

#[derive(Deserialize, Debug)]
struct QuoteFile {
    #[serde(default)]
    meta: Option<CompanyMeta>,
    bars: Vec<FileBar>,
}

pub struct JsonFileProvider {
    dir: PathBuf,
    meta_cache: Mutex<HashMap<String, Option<CompanyMeta>>>,
}

impl JsonFileProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            meta_cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}.json", symbol.to_uppercase()))
    }

    async fn load(&self, symbol: &str) -> Result<QuoteFile, ProviderError> {
        validate_symbol(symbol)?;
        let path = self.path_for(symbol);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(ProviderError::TickerNotFound(symbol.to_uppercase()));
            }
            Err(err) => return Err(err.into()),
        };
        log::debug!("loaded quote file {}", path.display());
        let file: QuoteFile = serde_json::from_str(&raw)?;
        self.remember_meta(symbol, file.meta.clone())?;
        Ok(file)
    }

    fn remember_meta(&self, symbol: &str, meta: Option<CompanyMeta>) -> Result<(), ProviderError> {
        self.meta_cache
            .lock()
            .map_err(|_| ProviderError::Internal("meta cache lock poisoned".into()))?
            .insert(symbol.to_uppercase(), meta);
        Ok(())
    }

    fn cached_meta(&self, symbol: &str) -> Result<Option<Option<CompanyMeta>>, ProviderError> {
        let cache = self
            .meta_cache
            .lock()
            .map_err(|_| ProviderError::Internal("meta cache lock poisoned".into()))?;
        Ok(cache.get(&symbol.to_uppercase()).cloned())
    }
}

/// Symbols become file names, so only plain ticker characters are accepted.
fn validate_symbol(symbol: &str) -> Result<(), ProviderError> {
    let ok = !symbol.is_empty()
        && symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='))
        && !symbol.starts_with('.');
    if ok {
        Ok(())
    } else {
        Err(ProviderError::Validation(format!("invalid symbol: {symbol:?}")))
    }
}

#[async_trait]
impl MarketDataProvider for JsonFileProvider {
    async fn fetch_bars(&self, request: &BarsRequest) -> Result<BarSeries, ProviderError> {
        let file = self.load(&request.symbol).await?;

        let mut bars: Vec<Bar> = file
            .bars
            .into_iter()
            .map(|fb| Bar {
                timestamp: fb.timestamp,
                open: fb.open,
                high: fb.high,
                low: fb.low,
                close: fb.close,
                volume: fb.volume,
            })
            .collect();
        bars.sort_by_key(|b| b.timestamp);
        bars.dedup_by_key(|b| b.timestamp);

        if request.cadence == Cadence::Weekly {
            bars = resample_weekly(&bars);
        }

        Ok(BarSeries::new(request.symbol.to_uppercase(), request.cadence, bars))
    }

    async fn fetch_company_meta(
        &self,
        symbol: &str,
    ) -> Result<Option<CompanyMeta>, ProviderError> {
        if let Some(meta) = self.cached_meta(symbol)? {
            return Ok(meta);
        }
        Ok(self.load(symbol).await?.meta)
    }
}
