//! Chart spec assembly: joins the enriched series, its annotations, the
//! fundamentals and the theme into one [`ChartSpec`].

use crate::{
    fundamentals::Fundamentals,
    indicators::{EnrichedSeries, average_range},
    models::{
        bar::Bar,
        chart_spec::{ChartSpec, FigureLayout, OverlaySeries, Panel, PriceAxis, Watermark},
        company::CompanyMeta,
    },
    pivots::PivotPoint,
    theme::{Overlay, ThemeConfig},
    volume::VolumeAnomaly,
};

/// Fraction of the visible price range left free above the highest high.
pub const DEFAULT_HEADROOM: f64 = 0.4;

/// Bars averaged for the ADR figure in the banner.
const BANNER_ADR_BARS: usize = 20;

pub struct AssemblyInput<'a> {
    /// Bars and indicators to display (already cut to the lookback window).
    pub enriched: &'a EnrichedSeries,
    pub pivots: Vec<PivotPoint>,
    pub volume_labels: Vec<VolumeAnomaly>,
    pub fundamentals: Option<&'a Fundamentals>,
    pub meta: Option<&'a CompanyMeta>,
    pub theme: &'static ThemeConfig,
    pub headroom: f64,
}

pub fn assemble(input: AssemblyInput<'_>) -> ChartSpec {
    let AssemblyInput {
        enriched,
        pivots,
        volume_labels,
        fundamentals,
        meta,
        theme,
        headroom,
    } = input;
    let ticker = enriched.series.symbol.to_uppercase();
    let cadence = enriched.series.cadence;
    let bars = enriched.bars();

    let panels = theme.overlays(cadence);
    let place = |panel: Panel, overlays: &[Overlay]| -> Vec<OverlaySeries> {
        overlays
            .iter()
            .map(|o| OverlaySeries {
                panel,
                key: o.series,
                color: o.color,
                width: o.width,
                values: enriched.get(o.series).clone(),
            })
            .collect()
    };
    let mut overlays = place(Panel::Price, panels.price);
    overlays.extend(place(Panel::Volume, panels.volume));

    let banner = fundamentals.map(|f| banner_text(f, average_range(bars, BANNER_ADR_BARS)));

    log::debug!(
        "assembled {ticker} {cadence} chart: {} bars, {} overlays, {} pivots, {} volume labels, banner: {}",
        bars.len(),
        overlays.len(),
        pivots.len(),
        volume_labels.len(),
        banner.is_some()
    );

    ChartSpec {
        watermark: watermark(&ticker, cadence.label(), meta),
        ticker,
        cadence,
        theme,
        figure: FigureLayout::default(),
        price_axis: PriceAxis {
            top: price_top(bars, headroom),
            log_scale: theme.log_scale,
        },
        bars: bars.to_vec(),
        overlays,
        pivots,
        volume_labels,
        banner,
    }
}

/// `max(high) + headroom * (max(high) - min(low))` over bars with finite prices.
pub fn price_top(bars: &[Bar], headroom: f64) -> Option<f64> {
    let max_high = bars
        .iter()
        .map(|b| b.high)
        .filter(|h| h.is_finite())
        .reduce(f64::max)?;
    let min_low = bars
        .iter()
        .map(|b| b.low)
        .filter(|l| l.is_finite())
        .reduce(f64::min)?;
    Some(max_high + headroom * (max_high - min_low))
}

pub fn watermark(ticker: &str, cadence_label: &str, meta: Option<&CompanyMeta>) -> Watermark {
    let meta = meta.cloned().unwrap_or_default();
    Watermark {
        title: format!("{ticker}, {cadence_label}"),
        subtitle: meta.short_name.unwrap_or_default().replace('.', ""),
        sector: meta.sector.unwrap_or_default(),
    }
}

/// One-line fundamentals summary. `adr` is a fraction, like every percentage
/// field of [`Fundamentals`]; missing values print as `-`.
pub fn banner_text(f: &Fundamentals, adr: Option<f64>) -> String {
    let float = match f.shares_float {
        Some(millions) if millions > 1000.0 => format!("{:.2}B", millions / 1000.0),
        Some(millions) => format!("{}M", millions.trunc() as i64),
        None => "-".to_string(),
    };
    format!(
        "Float: {float}    PE {}    PS {}    PB {}    Inst.Own {}    Ins.Own {}    ADR {}    Short Float {}",
        number(f.pe, 1),
        number(f.ps, 1),
        number(f.pb, 1),
        percent(f.inst_own, 1),
        percent(f.insider_own, 1),
        percent(adr, 1),
        percent(f.short_float, 2),
    )
}

fn number(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}"),
        None => "-".to_string(),
    }
}

fn percent(fraction: Option<f64>, decimals: usize) -> String {
    match fraction {
        Some(v) => format!("{:.decimals$}%", v * 100.0),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::{
        indicators::{SeriesKey, enrich},
        models::{bar_series::BarSeries, cadence::Cadence},
        theme::{IBD, QULLAMAGGIE, STOCKBEE},
    };

    fn enriched(cadence: Cadence) -> EnrichedSeries {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let bars = (0..30)
            .map(|i| {
                let close = 100.0 + i as f64;
                Bar {
                    timestamp: start + Duration::days(i),
                    open: close,
                    high: close + 2.0,
                    low: close - 2.0,
                    close,
                    volume: 1_000_000.0,
                }
            })
            .collect();
        enrich(BarSeries::new("acme", cadence, bars)).unwrap()
    }

    fn fundamentals() -> Fundamentals {
        Fundamentals {
            ticker: "ACME".into(),
            pe: Some(31.24),
            ps: Some(8.06),
            pb: Some(12.0),
            inst_own: Some(0.654),
            insider_own: Some(0.0123),
            shares_float: Some(2350.0),
            short_float: Some(0.0325),
            ..Fundamentals::default()
        }
    }

    fn input<'a>(
        enriched: &'a EnrichedSeries,
        fundamentals: Option<&'a Fundamentals>,
        meta: Option<&'a CompanyMeta>,
        theme: &'static ThemeConfig,
    ) -> AssemblyInput<'a> {
        AssemblyInput {
            enriched,
            pivots: vec![],
            volume_labels: vec![],
            fundamentals,
            meta,
            theme,
            headroom: DEFAULT_HEADROOM,
        }
    }

    #[test]
    fn banner_formats_every_field() {
        let text = banner_text(&fundamentals(), Some(0.0412));
        insta::assert_snapshot!(text, @"Float: 2.35B    PE 31.2    PS 8.1    PB 12.0    Inst.Own 65.4%    Ins.Own 1.2%    ADR 4.1%    Short Float 3.25%");
    }

    #[test]
    fn banner_small_float_and_missing_fields() {
        let f = Fundamentals {
            ticker: "TINY".into(),
            shares_float: Some(850.7),
            ..Fundamentals::default()
        };
        insta::assert_snapshot!(banner_text(&f, None), @"Float: 850M    PE -    PS -    PB -    Inst.Own -    Ins.Own -    ADR -    Short Float -");
    }

    #[test]
    fn watermark_strips_dots_and_tolerates_missing_meta() {
        let meta = CompanyMeta {
            short_name: Some("Acme Corp. Inc.".into()),
            industry: Some("Widgets".into()),
            sector: Some("Industrials".into()),
        };
        let mark = watermark("ACME", "1W", Some(&meta));
        insta::assert_snapshot!(format!("{} | {} | {}", mark.title, mark.subtitle, mark.sector), @"ACME, 1W | Acme Corp Inc | Industrials");

        let bare = watermark("ACME", "1D", None);
        assert_eq!(bare.title, "ACME, 1D");
        assert_eq!(bare.subtitle, "");
        assert_eq!(bare.sector, "");
    }

    #[test]
    fn price_top_adds_headroom_over_visible_range() {
        let series = enriched(Cadence::Daily);
        // highs 102..=131, lows 98..=127
        let top = price_top(series.bars(), 0.4).unwrap();
        assert!((top - (131.0 + 0.4 * 33.0)).abs() < 1e-9);
        assert_eq!(price_top(&[], 0.4), None);
    }

    #[test]
    fn daily_overlays_follow_theme() {
        let series = enriched(Cadence::Daily);
        let spec = assemble(input(&series, None, None, &QULLAMAGGIE));

        let keys: Vec<_> = spec.overlays.iter().map(|o| (o.panel, o.key)).collect();
        assert_eq!(
            keys,
            vec![
                (Panel::Price, SeriesKey::Ema9),
                (Panel::Price, SeriesKey::Ema21),
                (Panel::Price, SeriesKey::Sma50),
                (Panel::Volume, SeriesKey::VolumeSma50),
            ]
        );
        assert!(spec.overlays.iter().all(|o| o.values.len() == spec.bars.len()));
        assert_eq!(spec.banner, None);
        assert_eq!(spec.watermark.title, "ACME, 1D");
        assert_eq!(spec.ticker, "ACME");
    }

    #[test]
    fn weekly_cadence_selects_weekly_overlays() {
        let series = enriched(Cadence::Weekly);
        let spec = assemble(input(&series, None, None, &IBD));
        let keys: Vec<_> = spec.overlays.iter().map(|o| o.key).collect();
        assert_eq!(keys, vec![SeriesKey::Sma10, SeriesKey::Sma30, SeriesKey::VolumeSma10]);
        assert_eq!(spec.watermark.title, "ACME, 1W");
    }

    #[test]
    fn banner_present_only_with_fundamentals() {
        let series = enriched(Cadence::Daily);
        let f = fundamentals();
        let spec = assemble(input(&series, Some(&f), None, &STOCKBEE));

        assert!(spec.overlays.is_empty());
        let banner = spec.banner.unwrap();
        assert!(banner.starts_with("Float: 2.35B    PE 31.2"));
        assert!(banner.contains("ADR "));
    }

    #[test]
    fn spec_serialises_for_the_renderer() {
        let series = enriched(Cadence::Daily);
        let spec = assemble(input(&series, None, None, &QULLAMAGGIE));
        let json = serde_json::to_value(&spec).unwrap();

        assert_eq!(json["theme"]["name"], "qullamaggie");
        assert_eq!(json["figure"]["grid_rows"], 21);
        assert_eq!(json["overlays"][0]["key"], "ema9");
        assert!(json["banner"].is_null());
    }
}
