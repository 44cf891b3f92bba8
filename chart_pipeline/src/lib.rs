//! Chart enrichment and annotation pipeline.
//!
//! Turns a ticker's OHLCV history into a themed, annotated, renderer-agnostic
//! [`ChartSpec`](models::chart_spec::ChartSpec): indicator overlays, zig-zag
//! pivots, volume-spike labels, a watermark, and a fundamentals banner when a
//! quote snapshot is available. Entry point: [`pipeline::ChartPipeline`].

pub mod assembler;
pub mod config;
pub mod errors;
pub mod fundamentals;
pub mod indicators;
pub mod io;
pub mod models;
pub mod pipeline;
pub mod pivots;
pub mod providers;
pub mod theme;
pub mod volume;

pub use errors::Error;
