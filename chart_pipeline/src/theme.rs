//! Theme registry.
//!
//! Every theme is a `'static` [`ThemeConfig`]; lookups never allocate and never
//! fail. Unknown names resolve to [`ThemeName::DEFAULT`].

use std::{fmt, str::FromStr};

use serde::Serialize;
use thiserror::Error;

use crate::{indicators::SeriesKey, models::cadence::Cadence};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeName {
    Qullamaggie,
    Ibd,
    Light,
    Stockbee,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown theme: {0}")]
pub struct UnknownTheme(pub String);

impl ThemeName {
    /// Used for any unrecognised style name.
    pub const DEFAULT: ThemeName = ThemeName::Qullamaggie;

    pub const ALL: [ThemeName; 4] = [
        ThemeName::Qullamaggie,
        ThemeName::Ibd,
        ThemeName::Light,
        ThemeName::Stockbee,
    ];

    /// Case-insensitive, total lookup.
    pub fn lookup(name: &str) -> ThemeName {
        name.parse().unwrap_or_else(|err: UnknownTheme| {
            log::debug!("{err}, using {}", ThemeName::DEFAULT);
            ThemeName::DEFAULT
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeName::Qullamaggie => "qullamaggie",
            ThemeName::Ibd => "ibd",
            ThemeName::Light => "light",
            ThemeName::Stockbee => "stockbee",
        }
    }

    pub fn config(self) -> &'static ThemeConfig {
        match self {
            ThemeName::Qullamaggie => &QULLAMAGGIE,
            ThemeName::Ibd => &IBD,
            ThemeName::Light => &LIGHT,
            ThemeName::Stockbee => &STOCKBEE,
        }
    }
}

impl Default for ThemeName {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for ThemeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeName {
    type Err = UnknownTheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ThemeName::ALL
            .into_iter()
            .find(|name| name.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownTheme(s.to_string()))
    }
}

/// Theme for `name`, falling back to the default theme.
pub fn lookup(name: &str) -> &'static ThemeConfig {
    ThemeName::lookup(name).config()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpDown {
    pub up: &'static str,
    pub down: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarketColors {
    pub candle: UpDown,
    pub edge: UpDown,
    pub wick: UpDown,
    pub ohlc: UpDown,
    pub volume: UpDown,
    pub volume_edge: UpDown,
    pub alpha: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotType {
    Candle,
    Ohlc,
}

/// One indicator line drawn on a panel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Overlay {
    pub series: SeriesKey,
    pub color: &'static str,
    pub width: f64,
}

/// Overlays per panel. Either list may be empty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PanelOverlays {
    pub price: &'static [Overlay],
    pub volume: &'static [Overlay],
}

#[derive(Debug, PartialEq, Serialize)]
pub struct ThemeConfig {
    pub name: ThemeName,
    pub base_style: &'static str,
    pub market_colors: MarketColors,
    pub face_color: &'static str,
    pub figure_color: &'static str,
    pub grid_color: &'static str,
    pub grid_style: &'static str,
    pub y_on_right: bool,
    pub font: &'static str,
    pub plot_type: PlotType,
    pub foreground: &'static str,
    pub background: &'static str,
    /// Colour of the fundamentals banner text.
    pub banner_color: &'static str,
    pub daily: PanelOverlays,
    pub weekly_overlays: PanelOverlays,
    /// Forces the weekly overlay set regardless of cadence.
    pub weekly: bool,
    pub log_scale: bool,
}

impl ThemeConfig {
    /// Overlay set for a chart of the given cadence.
    pub fn overlays(&self, cadence: Cadence) -> &PanelOverlays {
        if cadence.is_weekly() || self.weekly {
            &self.weekly_overlays
        } else {
            &self.daily
        }
    }
}

const LINE_WIDTH: f64 = 1.2;

const fn line(series: SeriesKey, color: &'static str) -> Overlay {
    Overlay {
        series,
        color,
        width: LINE_WIDTH,
    }
}

const fn up_down(up: &'static str, down: &'static str) -> UpDown {
    UpDown { up, down }
}

const NO_OVERLAYS: PanelOverlays = PanelOverlays {
    price: &[],
    volume: &[],
};

/// Shared by the monochrome candle themes.
const MONO_COLORS: MarketColors = MarketColors {
    candle: up_down("#ffffff", "#000000"),
    edge: up_down("#000000", "#000000"),
    wick: up_down("#000000", "#000000"),
    ohlc: up_down("green", "red"),
    volume: up_down("#ffffff", "#000000"),
    volume_edge: up_down("#808080", "#000000"),
    alpha: 1.0,
};

const SMA_DAILY: PanelOverlays = PanelOverlays {
    price: &[
        line(SeriesKey::Sma10, "red"),
        line(SeriesKey::Sma20, "blue"),
        line(SeriesKey::Sma50, "green"),
    ],
    volume: &[line(SeriesKey::VolumeSma50, "black")],
};

const SMA_WEEKLY: PanelOverlays = PanelOverlays {
    price: &[line(SeriesKey::Sma10, "red"), line(SeriesKey::Sma30, "blue")],
    volume: &[line(SeriesKey::VolumeSma10, "black")],
};

pub static QULLAMAGGIE: ThemeConfig = ThemeConfig {
    name: ThemeName::Qullamaggie,
    base_style: "binance-dark",
    market_colors: MarketColors {
        candle: up_down("#00ff00", "#ff0000"),
        edge: up_down("#00ff00", "#ff0000"),
        wick: up_down("#00ff00", "#ff0000"),
        ohlc: up_down("green", "red"),
        volume: up_down("#00ff00", "#ff0000"),
        volume_edge: up_down("#00ff00", "#ff0000"),
        alpha: 1.0,
    },
    face_color: "#000000",
    figure_color: "#000000",
    grid_color: "#2c2e31",
    grid_style: "--",
    y_on_right: true,
    font: "DejaVu Sans",
    plot_type: PlotType::Candle,
    foreground: "#ffffff",
    background: "#000000",
    banner_color: "#ffffff",
    daily: PanelOverlays {
        price: &[
            line(SeriesKey::Ema9, "red"),
            line(SeriesKey::Ema21, "yellow"),
            line(SeriesKey::Sma50, "green"),
        ],
        volume: &[line(SeriesKey::VolumeSma50, "white")],
    },
    weekly_overlays: PanelOverlays {
        price: &[line(SeriesKey::Sma10, "red"), line(SeriesKey::Sma30, "yellow")],
        volume: &[line(SeriesKey::VolumeSma10, "white")],
    },
    weekly: false,
    log_scale: false,
};

pub static IBD: ThemeConfig = ThemeConfig {
    name: ThemeName::Ibd,
    base_style: "ibd",
    market_colors: MarketColors {
        candle: up_down("#2A3FE5", "#DB39AD"),
        edge: up_down("#00ff00", "#ff0000"),
        wick: up_down("#00ff00", "#ff0000"),
        ohlc: up_down("#2A3FE5", "#DB39AD"),
        volume: up_down("#2A3FE5", "#DB39AD"),
        volume_edge: up_down("#2A3FE5", "#DB39AD"),
        alpha: 1.0,
    },
    face_color: "#ffffff",
    figure_color: "#ffffff",
    grid_color: "#2c2e31",
    grid_style: "--",
    y_on_right: true,
    font: "Arial",
    plot_type: PlotType::Ohlc,
    foreground: "#000000",
    background: "#ffffff",
    banner_color: "#000000",
    daily: SMA_DAILY,
    weekly_overlays: SMA_WEEKLY,
    weekly: false,
    log_scale: false,
};

pub static LIGHT: ThemeConfig = ThemeConfig {
    name: ThemeName::Light,
    base_style: "binance-dark",
    market_colors: MONO_COLORS,
    face_color: "#ffffff",
    figure_color: "#ffffff",
    grid_color: "#2c2e31",
    grid_style: "--",
    y_on_right: true,
    font: "Arial",
    plot_type: PlotType::Candle,
    foreground: "#000000",
    background: "#ffffff",
    banner_color: "#000000",
    daily: SMA_DAILY,
    weekly_overlays: SMA_WEEKLY,
    weekly: false,
    log_scale: false,
};

/// Bare price and volume, no indicator lines.
pub static STOCKBEE: ThemeConfig = ThemeConfig {
    name: ThemeName::Stockbee,
    base_style: "binance-dark",
    market_colors: MONO_COLORS,
    face_color: "#ffffff",
    figure_color: "#ffffff",
    grid_color: "#2c2e31",
    grid_style: "--",
    y_on_right: true,
    font: "Arial",
    plot_type: PlotType::Candle,
    foreground: "#000000",
    background: "#ffffff",
    banner_color: "#000000",
    daily: NO_OVERLAYS,
    weekly_overlays: NO_OVERLAYS,
    weekly: false,
    log_scale: false,
};
