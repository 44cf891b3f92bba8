use std::{error::Error, path::PathBuf, sync::Arc, time::Duration};

use chart_pipeline::{
    config::{ChartConfig, load_config_path},
    fundamentals::{Cancellation, FinvizSource, FundamentalsFetcher},
    io::{JsonFileSink, SpecSink},
    models::cadence::Cadence,
    pipeline::{ChartPipeline, ChartRequest},
    providers::JsonFileProvider,
};
use chrono::{DateTime, NaiveDate, Utc};
use clap::Parser;

/// Builds an annotated chart spec for one ticker and writes it as JSON.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Ticker symbol (e.g. "NVDA")
    ticker: String,

    /// Bar cadence: daily (1d) or weekly (1w)
    #[arg(long, default_value_t = Cadence::Daily)]
    cadence: Cadence,

    /// Shorthand for --cadence weekly
    #[arg(long, conflicts_with = "cadence")]
    weekly: bool,

    /// Chart style: qullamaggie, ibd, light or stockbee
    #[arg(long, default_value = "qullamaggie")]
    style: String,

    /// Months of history to show (default 9 daily, 40 weekly)
    #[arg(long)]
    offset: Option<u32>,

    /// Directory holding one {TICKER}.json quote file per symbol
    #[arg(long)]
    data_dir: PathBuf,

    /// Path to the config file (chart_pipeline.toml); falls back to CHART_PIPELINE_CONFIG
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Give up on fundamentals after this many seconds
    #[arg(long, default_value = "60")]
    timeout_secs: u64,

    /// Skip the fundamentals banner entirely
    #[arg(long)]
    no_fundamentals: bool,

    /// Last day of the chart window, YYYY-MM-DD (default: now)
    #[arg(long)]
    as_of: Option<NaiveDate>,

    /// Output file (default: {TICKER}.chart.json)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

fn as_of_instant(day: Option<NaiveDate>) -> DateTime<Utc> {
    day.and_then(|d| d.and_hms_opt(23, 59, 59))
        .map(|dt| dt.and_utc())
        .unwrap_or_else(Utc::now)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config_path(path)?,
        None => ChartConfig::from_env()?,
    };

    let provider = Arc::new(JsonFileProvider::new(&cli.data_dir));
    let mut pipeline = ChartPipeline::new(provider, config.clone());
    if config.fundamentals.enabled && !cli.no_fundamentals {
        let source = FinvizSource::new(config.finviz_options())?;
        pipeline = pipeline.with_fundamentals(FundamentalsFetcher::new(
            Arc::new(source),
            config.retry_policy(),
        ));
    }

    let mut request = ChartRequest::new(&cli.ticker)
        .weekly(cli.weekly || cli.cadence.is_weekly())
        .theme(&cli.style);
    if let Some(months) = cli.offset {
        request = request.lookback_months(months);
    }

    let cancel = Cancellation::with_timeout(Duration::from_secs(cli.timeout_secs));
    let spec = pipeline
        .build(&request, as_of_instant(cli.as_of), &cancel)
        .await?;

    let out = cli
        .out
        .unwrap_or_else(|| PathBuf::from(format!("{}.chart.json", spec.ticker)));
    let written = JsonFileSink::new(out).write(&spec).await?;
    println!("{}", written.display());
    Ok(())
}
