use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chart_pipeline::{
    Error,
    config::ChartConfig,
    fundamentals::{
        Cancellation, FundamentalsFetcher, RetryPolicy, SnapshotResponse, SnapshotSource,
        source::SnapshotTableParser,
    },
    indicators::SeriesKey,
    models::{
        bar::Bar, bar_series::BarSeries, cadence::Cadence, company::CompanyMeta,
        request_params::BarsRequest,
    },
    pipeline::{ChartPipeline, ChartRequest},
    pivots::Direction,
    providers::{MarketDataProvider, errors::ProviderError},
};
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use indexmap::IndexMap;

/// Serves one fixed daily history for "ACME".
struct MemoryProvider {
    bars: Vec<Bar>,
    meta: Result<Option<CompanyMeta>, String>,
}

#[async_trait]
impl MarketDataProvider for MemoryProvider {
    async fn fetch_bars(&self, request: &BarsRequest) -> Result<BarSeries, ProviderError> {
        if request.symbol != "ACME" {
            return Err(ProviderError::TickerNotFound(request.symbol.clone()));
        }
        Ok(BarSeries::new("ACME", request.cadence, self.bars.clone()))
    }

    async fn fetch_company_meta(
        &self,
        _symbol: &str,
    ) -> Result<Option<CompanyMeta>, ProviderError> {
        self.meta.clone().map_err(ProviderError::Api)
    }
}

struct StaticSource(SnapshotResponse);

#[async_trait]
impl SnapshotSource for StaticSource {
    async fn fetch_snapshot(&self, _ticker: &str) -> Result<SnapshotResponse, ProviderError> {
        Ok(self.0.clone())
    }
}

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// Rises 100 -> 150 over bars 0..=50, drops 15% to 127.5 at bar 60, then
/// climbs to 170 at bar 119. Volume is flat except a 3x burst at bar 100.
fn swing_bars() -> Vec<Bar> {
    (0..120)
        .map(|i| {
            let close = match i {
                0..=50 => 100.0 + i as f64,
                51..=60 => 150.0 - 2.25 * (i - 50) as f64,
                _ => 127.5 + (i - 60) as f64 * (42.5 / 59.0),
            };
            Bar {
                timestamp: start() + ChronoDuration::days(i),
                open: close,
                high: close * 1.01,
                low: close * 0.99,
                close,
                volume: if i == 100 { 3_000_000.0 } else { 1_000_000.0 },
            }
        })
        .collect()
}

fn acme_meta() -> CompanyMeta {
    CompanyMeta {
        short_name: Some("Acme Corp.".into()),
        industry: Some("Widgets".into()),
        sector: Some("Industrials".into()),
    }
}

fn pipeline(bars: Vec<Bar>) -> ChartPipeline {
    let provider = MemoryProvider {
        bars,
        meta: Ok(Some(acme_meta())),
    };
    ChartPipeline::new(Arc::new(provider), ChartConfig::default())
}

fn snapshot_table() -> SnapshotResponse {
    let table: IndexMap<String, String> = [
        ("Shs Float", "850.20M"),
        ("P/E", "31.24"),
        ("P/S", "8.06"),
        ("P/B", "12.00"),
        ("Inst Own", "65.40%"),
        ("Insider Own", "1.23%"),
        ("Short Float", "3.25%"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    SnapshotResponse::Table(table)
}

#[tokio::test]
async fn swing_series_yields_peak_valley_and_volume_label() {
    let as_of = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
    let spec = pipeline(swing_bars())
        .build(&ChartRequest::new("acme"), as_of, &Cancellation::none())
        .await
        .unwrap();

    assert_eq!(spec.bars.len(), 120);
    let pivots: Vec<_> = spec.pivots.iter().map(|p| (p.index, p.direction)).collect();
    assert!(pivots.contains(&(50, Direction::Peak)), "{pivots:?}");
    assert!(pivots.contains(&(60, Direction::Valley)), "{pivots:?}");
    for pair in spec.pivots.windows(2) {
        assert_ne!(pair[0].direction, pair[1].direction);
        assert!(pair[0].index < pair[1].index);
    }
    let peak = spec.pivots.iter().find(|p| p.index == 50).unwrap();
    assert_eq!(peak.price, swing_bars()[50].high);
    assert_eq!(peak.timestamp, swing_bars()[50].timestamp);

    assert_eq!(spec.volume_labels.len(), 1);
    assert_eq!(spec.volume_labels[0].index, 100);
    assert_eq!(spec.volume_labels[0].label, "288%\n3.0M");

    assert_eq!(spec.watermark.title, "ACME, 1D");
    assert_eq!(spec.watermark.subtitle, "Acme Corp");
    assert_eq!(spec.watermark.sector, "Industrials");
    assert_eq!(spec.banner, None);
}

#[tokio::test]
async fn lookback_keeps_indicators_warmed_on_full_history() {
    let as_of = Utc.with_ymd_and_hms(2024, 4, 29, 0, 0, 0).unwrap();
    let spec = pipeline(swing_bars())
        .build(
            &ChartRequest::new("ACME").lookback_months(1),
            as_of,
            &Cancellation::none(),
        )
        .await
        .unwrap();

    let cut = Utc.with_ymd_and_hms(2024, 3, 29, 0, 0, 0).unwrap();
    assert_eq!(spec.bars.len(), 32);
    assert_eq!(spec.bars[0].timestamp, cut);

    let sma50 = spec
        .overlays
        .iter()
        .find(|o| o.key == SeriesKey::Sma50)
        .unwrap();
    assert_eq!(sma50.values.len(), spec.bars.len());
    assert!(sma50.values.iter().all(Option::is_some));
}

#[tokio::test]
async fn empty_window_and_unknown_ticker_are_errors() {
    let far_future = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
    let err = pipeline(swing_bars())
        .build(
            &ChartRequest::new("ACME").lookback_months(1),
            far_future,
            &Cancellation::none(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::DataUnavailable(t) if t == "ACME"));

    let err = pipeline(vec![])
        .build(&ChartRequest::new("ACME"), far_future, &Cancellation::none())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::DataUnavailable(_)));

    let err = pipeline(swing_bars())
        .build(&ChartRequest::new("NOPE"), far_future, &Cancellation::none())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::TickerNotFound(t) if t == "NOPE"));
}

#[tokio::test]
async fn weekly_request_uses_weekly_overlays_and_label() {
    let as_of = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
    let spec = pipeline(swing_bars())
        .build(
            &ChartRequest::new("ACME").weekly(true).theme("light"),
            as_of,
            &Cancellation::none(),
        )
        .await
        .unwrap();

    assert_eq!(spec.cadence, Cadence::Weekly);
    assert_eq!(spec.watermark.title, "ACME, 1W");
    let keys: Vec<_> = spec.overlays.iter().map(|o| o.key).collect();
    assert_eq!(keys, vec![SeriesKey::Sma10, SeriesKey::Sma30, SeriesKey::VolumeSma10]);
}

#[tokio::test]
async fn fundamentals_fill_the_banner() {
    let as_of = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
    let fetcher = FundamentalsFetcher::new(
        Arc::new(StaticSource(snapshot_table())),
        RetryPolicy::default(),
    );
    let spec = pipeline(swing_bars())
        .with_fundamentals(fetcher)
        .build(&ChartRequest::new("ACME"), as_of, &Cancellation::none())
        .await
        .unwrap();

    let banner = spec.banner.unwrap();
    assert!(
        banner.starts_with("Float: 850M    PE 31.2    PS 8.1    PB 12.0    Inst.Own 65.4%    Ins.Own 1.2%    ADR 2.0%"),
        "{banner}"
    );
    assert!(banner.ends_with("Short Float 3.25%"), "{banner}");
}

#[tokio::test(start_paused = true)]
async fn unavailable_fundamentals_and_meta_degrade_gracefully() {
    let as_of = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
    let provider = MemoryProvider {
        bars: swing_bars(),
        meta: Err("metadata service down".into()),
    };
    let fetcher = FundamentalsFetcher::new(
        Arc::new(StaticSource(SnapshotResponse::Unavailable { status: 503 })),
        RetryPolicy {
            backoff: Duration::from_secs(10),
            max_attempts: None,
        },
    );
    let pipeline =
        ChartPipeline::new(Arc::new(provider), ChartConfig::default()).with_fundamentals(fetcher);

    let cancel = Cancellation::with_timeout(Duration::from_secs(25));
    let spec = pipeline
        .build(&ChartRequest::new("ACME"), as_of, &cancel)
        .await
        .unwrap();

    assert_eq!(spec.banner, None);
    assert_eq!(spec.watermark.subtitle, "");
    assert_eq!(spec.watermark.sector, "");
    assert_eq!(spec.watermark.title, "ACME, 1D");
}

#[tokio::test]
async fn block_page_leaves_no_banner() {
    let as_of = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
    let parsed = SnapshotTableParser::new()
        .unwrap()
        .parse("<html><body>Access denied</body></html>");
    let fetcher = FundamentalsFetcher::new(
        Arc::new(StaticSource(SnapshotResponse::Table(parsed))),
        RetryPolicy::default(),
    );

    let spec = pipeline(swing_bars())
        .with_fundamentals(fetcher)
        .build(&ChartRequest::new("ACME"), as_of, &Cancellation::none())
        .await
        .unwrap();

    assert_eq!(spec.banner, None);
    assert_eq!(spec.watermark.title, "ACME, 1D");
}
