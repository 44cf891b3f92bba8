//! Fundamentals fetcher.
//!
//! Fetches the quote-snapshot table for a ticker from a [`SnapshotSource`],
//! retrying transient failures with a fixed backoff until the
//! [`RetryPolicy`] runs out or the caller's [`Cancellation`] fires, then
//! parses the table into a [`Fundamentals`] record.

pub mod fields;
pub mod retry;
pub mod source;

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

pub use fields::MalformedField;
pub use retry::{CancelHandle, Cancellation, RetryPolicy};
pub use source::{FinvizOptions, FinvizSource, SnapshotResponse, SnapshotSource};

/// Valuation, ownership and profitability metrics of one company.
///
/// Percentages are fractions (`0.125` for 12.5%). `shares_float` is in
/// millions of shares. `None` means the source had no usable value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Fundamentals {
    pub ticker: String,
    pub forward_pe: Option<f64>,
    pub pe: Option<f64>,
    pub peg: Option<f64>,
    pub ps: Option<f64>,
    pub pb: Option<f64>,
    pub pfcf: Option<f64>,
    pub insider_own: Option<f64>,
    pub inst_own: Option<f64>,
    pub inst_trans: Option<f64>,
    pub shares_float: Option<f64>,
    pub short_float: Option<f64>,
    pub roa: Option<f64>,
    pub roe: Option<f64>,
    pub roi: Option<f64>,
    pub gross_margin: Option<f64>,
    pub oper_margin: Option<f64>,
    pub profit_margin: Option<f64>,
    pub sales_surprise: Option<f64>,
    pub eps_surprise: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FundamentalsError {
    /// The source answered that it does not know the ticker. Never retried.
    #[error("no fundamentals for ticker: {0}")]
    TickerNotFound(String),

    /// The source answered but its page carried no snapshot fields. Never
    /// retried.
    #[error("no snapshot fields on the quote page for ticker: {0}")]
    EmptySnapshot(String),

    /// No table could be obtained.
    #[error("fundamentals source unavailable after {attempts} attempt(s) (cancelled: {cancelled})")]
    SourceUnavailable { attempts: u32, cancelled: bool },
}

pub struct FundamentalsFetcher {
    source: Arc<dyn SnapshotSource>,
    policy: RetryPolicy,
}

impl FundamentalsFetcher {
    pub fn new(source: Arc<dyn SnapshotSource>, policy: RetryPolicy) -> Self {
        Self { source, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetches and parses the snapshot for `ticker`.
    ///
    /// # Errors
    ///
    /// - [`FundamentalsError::TickerNotFound`] on a not-found answer, after a
    ///   single request.
    /// - [`FundamentalsError::EmptySnapshot`] when a successful answer has no
    ///   snapshot fields, also without retrying.
    /// - [`FundamentalsError::SourceUnavailable`] when the attempts run out or
    ///   `cancel` fires, whether during a request or a backoff wait.
    pub async fn fetch(
        &self,
        ticker: &str,
        cancel: &Cancellation,
    ) -> Result<Fundamentals, FundamentalsError> {
        let mut attempts: u32 = 0;
        loop {
            if cancel.is_cancelled() {
                return Err(unavailable(attempts, true));
            }

            attempts += 1;
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(unavailable(attempts, true)),
                outcome = self.source.fetch_snapshot(ticker) => outcome,
            };

            match outcome {
                Ok(SnapshotResponse::Table(table)) => {
                    log::debug!("{ticker}: snapshot table with {} cells", table.len());
                    return Fundamentals::from_table(ticker, &table)
                        .ok_or_else(|| FundamentalsError::EmptySnapshot(ticker.to_string()));
                }
                Ok(SnapshotResponse::NotFound) => {
                    return Err(FundamentalsError::TickerNotFound(ticker.to_string()));
                }
                Ok(SnapshotResponse::Unavailable { status }) => {
                    log::warn!("{ticker}: snapshot attempt {attempts} got status {status}");
                }
                Err(err) => {
                    log::warn!("{ticker}: snapshot attempt {attempts} failed: {err}");
                }
            }

            if self.policy.exhausted(attempts) {
                return Err(unavailable(attempts, false));
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(unavailable(attempts, true)),
                _ = tokio::time::sleep(self.policy.backoff) => {}
            }
        }
    }

    /// Like [`fetch`](Self::fetch) but degrades every failure to `None`.
    pub async fn fetch_available(
        &self,
        ticker: &str,
        cancel: &Cancellation,
    ) -> Option<Fundamentals> {
        match self.fetch(ticker, cancel).await {
            Ok(fundamentals) => Some(fundamentals),
            Err(err) => {
                log::warn!("{ticker}: continuing without fundamentals: {err}");
                None
            }
        }
    }
}

fn unavailable(attempts: u32, cancelled: bool) -> FundamentalsError {
    FundamentalsError::SourceUnavailable {
        attempts,
        cancelled,
    }
}
