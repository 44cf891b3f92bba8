//! Renderer-agnostic description of one annotated chart.
//!
//! A [`ChartSpec`] carries everything the renderer needs: the bars to draw,
//! which derived series go on which panel and in what colour, where the pivot
//! markers and volume labels sit, and the watermark and banner text. It
//! serialises to JSON for the renderer hand-off.

use serde::Serialize;

use crate::{
    indicators::{Series, SeriesKey},
    models::{bar::Bar, cadence::Cadence},
    pivots::PivotPoint,
    theme::ThemeConfig,
    volume::VolumeAnomaly,
};

#[derive(Debug, Clone, Serialize)]
pub struct ChartSpec {
    pub ticker: String,
    pub cadence: Cadence,
    pub theme: &'static ThemeConfig,
    pub figure: FigureLayout,
    pub price_axis: PriceAxis,
    pub bars: Vec<Bar>,
    pub overlays: Vec<OverlaySeries>,
    pub pivots: Vec<PivotPoint>,
    pub volume_labels: Vec<VolumeAnomaly>,
    pub watermark: Watermark,
    /// Fundamentals line across the top of the price panel, when available.
    pub banner: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Panel {
    Price,
    Volume,
}

/// Rows of the figure grid a panel occupies. Panels span every column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PanelPlacement {
    pub row: u16,
    pub rowspan: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FigureLayout {
    pub width_in: f64,
    pub height_in: f64,
    pub grid_rows: u16,
    pub grid_cols: u16,
    pub price_panel: PanelPlacement,
    pub volume_panel: PanelPlacement,
}

impl Default for FigureLayout {
    fn default() -> Self {
        Self {
            width_in: 16.0,
            height_in: 9.0,
            grid_rows: 21,
            grid_cols: 29,
            price_panel: PanelPlacement {
                row: 0,
                rowspan: 17,
            },
            volume_panel: PanelPlacement {
                row: 17,
                rowspan: 4,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceAxis {
    /// Upper limit of the price axis; `None` when the bars carry no usable
    /// prices.
    pub top: Option<f64>,
    pub log_scale: bool,
}

/// A derived series placed on a panel with its line style.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlaySeries {
    pub panel: Panel,
    pub key: SeriesKey,
    pub color: &'static str,
    pub width: f64,
    pub values: Series,
}

/// Faint centred text behind the price panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Watermark {
    /// `"{TICKER}, 1D"` or `"{TICKER}, 1W"`.
    pub title: String,
    pub subtitle: String,
    pub sector: String,
}
